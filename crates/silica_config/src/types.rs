//! Configuration types deserialized from `silica.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level synthesis configuration parsed from `silica.toml`.
#[derive(Debug, Deserialize)]
pub struct SynthesisConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Target device settings.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Per-member synthesis settings, keyed by fully qualified member name.
    #[serde(default)]
    pub members: BTreeMap<String, MemberConfig>,
}

impl SynthesisConfig {
    /// The number of physical state-machine instances to generate for the
    /// named member. Members without an explicit entry get one instance.
    pub fn target_instance_count(&self, member: &str) -> u32 {
        self.members
            .get(member)
            .map(|config| config.target_instance_count)
            .unwrap_or(1)
    }
}

/// Core project metadata required in every `silica.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Target device settings.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// The name of the clock signal every generated process is sensitive to.
    #[serde(default = "default_clock_signal")]
    pub clock_signal: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            clock_signal: default_clock_signal(),
        }
    }
}

fn default_clock_signal() -> String {
    "clk".to_string()
}

/// Synthesis settings for a single member.
#[derive(Debug, Deserialize)]
pub struct MemberConfig {
    /// How many physical state-machine instances to generate.
    #[serde(default = "default_target_instance_count")]
    pub target_instance_count: u32,
}

fn default_target_instance_count() -> u32 {
    1
}

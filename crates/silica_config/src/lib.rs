//! Parsing and validation of `silica.toml` synthesis configuration files.
//!
//! The configuration tells the composition passes how much hardware to
//! spend: most importantly, how many physical state-machine instances each
//! member gets, which the invocation proxy builder arbitrates access to.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{DeviceConfig, MemberConfig, ProjectMeta, SynthesisConfig};

//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::SynthesisConfig;
use std::path::Path;

/// Loads and validates a `silica.toml` configuration from a project directory.
///
/// Reads `<project_dir>/silica.toml`, parses it, and validates required
/// fields.
pub fn load_config(project_dir: &Path) -> Result<SynthesisConfig, ConfigError> {
    let config_path = project_dir.join("silica.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `silica.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SynthesisConfig, ConfigError> {
    let config: SynthesisConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are
/// consistent.
fn validate_config(config: &SynthesisConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.version.is_empty() {
        return Err(ConfigError::MissingField("project.version".to_string()));
    }
    for (member, settings) in &config.members {
        if settings.target_instance_count == 0 {
            return Err(ConfigError::ValidationError(format!(
                "member '{member}' has a target instance count of zero"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "sample"
version = "0.1.0"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "sample");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.device.clock_signal, "clk");
        assert!(config.members.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "sample"
version = "0.1.0"
description = "image processing accelerator"

[device]
clock_signal = "sys_clk"

[members."Sample::Run()"]
target_instance_count = 4

[members."Sample::Helper()"]
target_instance_count = 2
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.device.clock_signal, "sys_clk");
        assert_eq!(config.target_instance_count("Sample::Run()"), 4);
        assert_eq!(config.target_instance_count("Sample::Helper()"), 2);
        assert_eq!(config.target_instance_count("Sample::Unlisted()"), 1);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_version_errors() {
        let toml = r#"
[project]
name = "sample"
version = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn zero_instance_count_errors() {
        let toml = r#"
[project]
name = "sample"
version = "0.1.0"

[members."Sample::Run()"]
target_instance_count = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

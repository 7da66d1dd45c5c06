//! Input validation and configuration lints

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{StepConfig, StepInputs};

/// Check that the required inputs are present and non-empty
pub fn validate_inputs(inputs: &StepInputs) -> Result<()> {
    if is_missing(inputs.version.as_deref()) {
        return Err(ConfigError::MissingVersion.into());
    }

    if is_missing(inputs.changelog_path.as_deref()) {
        return Err(ConfigError::MissingChangelogPath.into());
    }

    Ok(())
}

/// Same checks as [`validate_inputs`], for an already built configuration
pub fn validate_config(config: &StepConfig) -> Result<()> {
    if is_missing(Some(&config.version)) {
        return Err(ConfigError::MissingVersion.into());
    }

    if is_missing(Some(&config.changelog_path)) {
        return Err(ConfigError::MissingChangelogPath.into());
    }

    Ok(())
}

/// Non-fatal problems with a loaded configuration.
///
/// The step still runs with whatever it was given; these only surface as
/// warnings.
pub fn lint_config(config: &StepConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let version = config.version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    if let Err(e) = semver::Version::parse(version) {
        debug!(version = %config.version, error = %e, "version is not semver");
        warnings.push(format!(
            "Version '{}' is not a valid semantic version: {}",
            config.version, e
        ));
    }

    if config.release_config_supplied {
        if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(&config.release_config) {
            warnings.push(format!("Release config is not valid YAML: {}", e));
        }
    }

    warnings
}

fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

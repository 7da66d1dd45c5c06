//! Turning raw step inputs into a `StepConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::tools::ToolSpec;

use super::defaults::{DEFAULT_EXPORT_KEY, DEFAULT_RELEASE_CONFIG};
use super::types::{ExportTarget, OutputMode, StepConfig, StepInputs};
use super::validation::validate_inputs;

/// Build the step configuration from raw inputs.
///
/// Required inputs are checked first; nothing else is resolved until they
/// pass. An empty release configuration falls back to the embedded default.
pub fn load_config(inputs: &StepInputs, working_dir: &Path) -> Result<StepConfig> {
    validate_inputs(inputs)?;

    let version = inputs.version.clone().unwrap_or_default();
    let changelog_path = inputs.changelog_path.clone().unwrap_or_default();
    let supplied = inputs
        .release_config
        .as_deref()
        .filter(|content| !content.is_empty());

    if supplied.is_none() {
        debug!("no release config supplied, using embedded default");
    }

    let config = StepConfig {
        version,
        changelog_path,
        release_config: supplied.unwrap_or(DEFAULT_RELEASE_CONFIG).to_string(),
        release_config_supplied: supplied.is_some(),
        working_dir: working_dir.to_path_buf(),
        output_mode: OutputMode::default(),
        export_key: DEFAULT_EXPORT_KEY.to_string(),
        export_target: ExportTarget::default(),
        github_env_file: None,
        git_sync: None,
        stream_to_stderr: false,
        tool: ToolSpec::releaseman(),
    };

    info!(
        version = %config.version,
        changelog_path = %config.changelog_path,
        working_dir = %config.working_dir.display(),
        "step config loaded"
    );
    Ok(config)
}

/// Current working directory, as a configuration error on failure
pub fn current_working_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| ConfigError::WorkingDirectory(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;

    #[test]
    fn test_load_config_uses_default_release_config() {
        let inputs = StepInputs::new("1.2.0", "/tmp/CHANGELOG.md").with_release_config("");
        let config = load_config(&inputs, Path::new("/work")).unwrap();

        assert_eq!(config.version, "1.2.0");
        assert_eq!(config.changelog_path, "/tmp/CHANGELOG.md");
        assert_eq!(config.release_config, DEFAULT_RELEASE_CONFIG);
        assert!(!config.release_config_supplied);
        assert_eq!(
            config.release_config_path(),
            PathBuf::from("/work/release_config.yml")
        );
        assert_eq!(config.export_key, "BITRSE_CHANGELOG");
        assert_eq!(config.output_mode, OutputMode::Capture);
        assert!(config.git_sync.is_none());
    }

    #[test]
    fn test_load_config_keeps_supplied_release_config() {
        let inputs = StepInputs::new("2.0.0", "CHANGELOG.md")
            .with_release_config("release:\n  development_branch: main\n");
        let config = load_config(&inputs, Path::new("/work")).unwrap();

        assert_eq!(config.release_config, "release:\n  development_branch: main\n");
        assert!(config.release_config_supplied);
        assert_eq!(config.changelog_file(), PathBuf::from("/work/CHANGELOG.md"));
    }

    #[test]
    fn test_load_config_rejects_missing_version() {
        let inputs = StepInputs {
            version: Some(String::new()),
            changelog_path: Some("CHANGELOG.md".to_string()),
            release_config: None,
        };
        let err = load_config(&inputs, Path::new("/work")).unwrap_err();
        assert!(matches!(err, StepError::Config(ConfigError::MissingVersion)));
    }

    #[test]
    fn test_load_config_rejects_missing_changelog_path() {
        let inputs = StepInputs {
            version: Some("1.0.0".to_string()),
            changelog_path: None,
            release_config: None,
        };
        let err = load_config(&inputs, Path::new("/work")).unwrap_err();
        assert!(matches!(
            err,
            StepError::Config(ConfigError::MissingChangelogPath)
        ));
    }
}

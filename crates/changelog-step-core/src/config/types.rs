//! Configuration types

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_SYNC_BRANCH, RELEASE_CONFIG_FILE};
use crate::tools::ToolSpec;

/// Raw step inputs, as handed over by the CI host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInputs {
    /// Next version (`new_version`)
    pub version: Option<String>,
    /// Changelog output path (`changelog_pth`)
    pub changelog_path: Option<String>,
    /// Release configuration YAML (`release_config`)
    pub release_config: Option<String>,
}

impl StepInputs {
    /// Create inputs from the two required values
    pub fn new(version: impl Into<String>, changelog_path: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            changelog_path: Some(changelog_path.into()),
            release_config: None,
        }
    }

    /// Set the release configuration content
    pub fn with_release_config(mut self, content: impl Into<String>) -> Self {
        self.release_config = Some(content.into());
        self
    }
}

/// How the changelog tool's output is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Capture combined output, then read the changelog back and export it
    #[default]
    Capture,
    /// Pass output straight through; leave the changelog file for the caller
    Stream,
}

impl OutputMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Stream => "stream",
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "capture" => Ok(Self::Capture),
            "stream" => Ok(Self::Stream),
            other => Err(format!(
                "invalid output mode: {}, use 'capture' or 'stream'",
                other
            )),
        }
    }
}

/// Where the changelog is exported in capture mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    /// envman when available, otherwise `$GITHUB_ENV`
    #[default]
    Auto,
    /// Bitrise `envman add`
    Envman,
    /// GitHub Actions `$GITHUB_ENV` file
    GithubEnv,
    /// Do not export, only report
    None,
}

impl ExportTarget {
    /// Get the target name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Envman => "envman",
            Self::GithubEnv => "github-env",
            Self::None => "none",
        }
    }
}

impl FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "envman" => Ok(Self::Envman),
            "github-env" | "github" => Ok(Self::GithubEnv),
            "none" => Ok(Self::None),
            other => Err(format!(
                "invalid export target: {}, use 'auto', 'envman', 'github-env' or 'none'",
                other
            )),
        }
    }
}

/// Git refresh performed before generating the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSync {
    /// Branch to check out after fetching
    pub branch: String,
}

impl Default for GitSync {
    fn default() -> Self {
        Self {
            branch: DEFAULT_SYNC_BRANCH.to_string(),
        }
    }
}

/// Validated configuration for one step run
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Version the changelog is generated for
    pub version: String,
    /// Changelog path, passed to the tool verbatim
    pub changelog_path: String,
    /// Release configuration content (supplied or default)
    pub release_config: String,
    /// Whether `release_config` came from the caller
    pub release_config_supplied: bool,
    /// Directory the step runs in
    pub working_dir: PathBuf,
    /// Output handling for the tool invocation
    pub output_mode: OutputMode,
    /// Variable the changelog is exported under
    pub export_key: String,
    /// Export mechanism
    pub export_target: ExportTarget,
    /// GitHub Actions env file (`$GITHUB_ENV`), when running there
    pub github_env_file: Option<PathBuf>,
    /// Optional git refresh before generation
    pub git_sync: Option<GitSync>,
    /// In stream mode, send the tool's stdout to stderr
    pub stream_to_stderr: bool,
    /// Changelog tool and how to install it
    pub tool: ToolSpec,
}

impl StepConfig {
    /// Set the output mode
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Set the export key
    pub fn with_export_key(mut self, key: impl Into<String>) -> Self {
        self.export_key = key.into();
        self
    }

    /// Set the export target
    pub fn with_export_target(mut self, target: ExportTarget) -> Self {
        self.export_target = target;
        self
    }

    /// Set the GitHub Actions env file
    pub fn with_github_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.github_env_file = Some(path.into());
        self
    }

    /// Enable git sync
    pub fn with_git_sync(mut self, sync: GitSync) -> Self {
        self.git_sync = Some(sync);
        self
    }

    /// Send streamed tool stdout to stderr, leaving stdout to the caller
    pub fn with_stream_to_stderr(mut self, enabled: bool) -> Self {
        self.stream_to_stderr = enabled;
        self
    }

    /// Set the tool spec
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = tool;
        self
    }

    /// Release configuration exactly as the caller gave it, empty when the
    /// default is in use
    pub fn release_config_input(&self) -> &str {
        if self.release_config_supplied {
            &self.release_config
        } else {
            ""
        }
    }

    /// Location of `release_config.yml`
    pub fn release_config_path(&self) -> PathBuf {
        self.working_dir.join(RELEASE_CONFIG_FILE)
    }

    /// Changelog location, resolved against the working directory
    pub fn changelog_file(&self) -> PathBuf {
        let path = Path::new(&self.changelog_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

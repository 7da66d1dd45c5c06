//! Error types for the changelog step

use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::StepStage;

/// Result type alias using StepError
pub type Result<T> = std::result::Result<T, StepError>;

/// Main error type for step operations
#[derive(Debug, Error)]
pub enum StepError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dependency installation errors
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Filesystem errors
    #[error(transparent)]
    File(#[from] FileError),

    /// Subprocess errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Environment export errors
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl StepError {
    /// The stage a failure of this kind halts
    pub fn stage(&self) -> StepStage {
        match self {
            Self::Config(_) => StepStage::Validate,
            Self::Tool(_) => StepStage::EnsureTool,
            Self::File(FileError::ExistenceCheck { .. } | FileError::Write { .. }) => {
                StepStage::EnsureConfig
            }
            Self::File(FileError::Read { .. }) => StepStage::Publish,
            Self::Command(CommandError::Spawn { stage, .. })
            | Self::Command(CommandError::Failed { stage, .. }) => *stage,
            Self::Export(_) => StepStage::Publish,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Next version is empty or unset
    #[error("Next version not defined")]
    MissingVersion,

    /// Changelog path is empty or unset
    #[error("Changelog path not defined")]
    MissingChangelogPath,

    /// Working directory could not be determined
    #[error("Failed to get working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}

/// Dependency installation errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Installer ran but did not succeed
    #[error("Failed to install {tool}: {output}")]
    InstallFailed { tool: String, output: String },

    /// Installer could not be started
    #[error("Failed to install {tool}: {source}")]
    InstallerUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Filesystem errors
#[derive(Debug, Error)]
pub enum FileError {
    /// Could not determine whether a path exists
    #[error("Failed to check if {} exists: {source}", .path.display())]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a file
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write a file
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Subprocess errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be spawned
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        stage: StepStage,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("Command `{command}` failed ({}){}", describe_code(.code), describe_output(.output))]
    Failed {
        stage: StepStage,
        command: String,
        code: Option<i32>,
        output: String,
    },
}

/// Environment export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// The exporter reported a failure
    #[error("Failed to export {key} via {target}: {reason}")]
    Failed {
        key: String,
        target: String,
        reason: String,
    },

    /// Automatic target selection found nothing usable
    #[error("No export target available for {0} (envman not found and GITHUB_ENV not set)")]
    NoTarget(String),

    /// IO error while writing an env file
    #[error("IO error exporting {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn describe_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{}", output)
    }
}

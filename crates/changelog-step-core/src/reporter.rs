//! Step progress reporting

use std::path::PathBuf;

use crate::workflow::StepStage;

/// Events emitted while the step runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// Effective inputs, reported once before anything runs
    Configured {
        version: String,
        changelog_path: String,
        release_config: String,
    },
    /// A stage is starting
    StageStarted(StepStage),
    /// Something looks off but the run continues
    Warning(String),
    /// The tool was already on PATH
    ToolFound { tool: String, path: PathBuf },
    /// The tool is missing and is being installed
    Installing { tool: String, command: String },
    /// Installation finished
    ToolInstalled { tool: String, program: String },
    /// The release config was written
    ConfigWritten { path: PathBuf },
    /// The release config already existed
    ConfigKept { path: PathBuf },
    /// A command is about to run
    Running { command: String },
    /// The changelog was generated and read back
    Changelog { content: String },
    /// The changelog was left on disk without being exported
    ChangelogWritten { path: PathBuf },
    /// The changelog was published
    Exported { key: String, target: String },
}

/// Receives step progress
pub trait StepReporter: Send + Sync {
    /// Handle a step event
    fn report(&self, event: &StepEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl StepReporter for TracingReporter {
    fn report(&self, event: &StepEvent) {
        match event {
            StepEvent::Configured {
                version,
                changelog_path,
                release_config,
            } => {
                tracing::info!(
                    new_version = %version,
                    changelog_pth = %changelog_path,
                    "configs"
                );
                tracing::debug!("release_config:\n{}", release_config);
            }
            StepEvent::StageStarted(stage) => {
                tracing::debug!(stage = stage.as_str(), "stage started");
            }
            StepEvent::Warning(message) => tracing::warn!("{}", message),
            StepEvent::ToolFound { tool, path } => {
                tracing::info!(tool = %tool, path = %path.display(), "tool found");
            }
            StepEvent::Installing { tool, command } => {
                tracing::info!(tool = %tool, "installing: $ {}", command);
            }
            StepEvent::ToolInstalled { tool, program } => {
                tracing::info!(tool = %tool, program = %program, "tool installed");
            }
            StepEvent::ConfigWritten { path } => {
                tracing::info!(path = %path.display(), "release config written");
            }
            StepEvent::ConfigKept { path } => {
                tracing::info!(path = %path.display(), "release config exists, keeping it");
            }
            StepEvent::Running { command } => tracing::info!("$ {}", command),
            StepEvent::Changelog { content } => {
                tracing::info!(bytes = content.len(), "changelog generated");
            }
            StepEvent::ChangelogWritten { path } => {
                tracing::info!(path = %path.display(), "changelog written");
            }
            StepEvent::Exported { key, target } => {
                tracing::info!(key = %key, target = %target, "changelog exported");
            }
        }
    }
}

/// Reporter that discards events
#[derive(Debug, Default)]
pub struct NoopReporter;

impl StepReporter for NoopReporter {
    fn report(&self, _event: &StepEvent) {}
}

//! Step stages

use std::fmt;

use serde::Serialize;

/// Ordered stages of a step run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStage {
    /// Check required inputs
    Validate,
    /// Make sure the changelog tool is installed
    EnsureTool,
    /// Make sure `release_config.yml` exists
    EnsureConfig,
    /// Refresh git refs (only when enabled)
    SyncGit,
    /// Run the changelog tool
    Generate,
    /// Read the changelog back and export it
    Publish,
}

impl StepStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::EnsureTool => "ensure-tool",
            Self::EnsureConfig => "ensure-config",
            Self::SyncGit => "sync-git",
            Self::Generate => "generate",
            Self::Publish => "publish",
        }
    }

    /// Get all stages in order
    pub fn all() -> &'static [StepStage] {
        &[
            Self::Validate,
            Self::EnsureTool,
            Self::EnsureConfig,
            Self::SyncGit,
            Self::Generate,
            Self::Publish,
        ]
    }
}

impl fmt::Display for StepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Publishing values to later pipeline steps

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ExportTarget, StepConfig};
use crate::error::{ExportError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::tools::ToolResolver;

/// Makes a key/value pair visible to subsequent steps
pub trait EnvExporter: Send + Sync {
    /// Short name of the mechanism, used in logs
    fn name(&self) -> &'static str;

    /// Export `value` under `key`
    fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// Bitrise `envman add --key KEY`, value on stdin
pub struct EnvmanExporter {
    runner: Arc<dyn CommandRunner>,
}

impl EnvmanExporter {
    /// Create an exporter that runs envman through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn command(key: &str, value: &str) -> CommandSpec {
        CommandSpec::new("envman")
            .args(["add", "--key", key])
            .with_stdin(value)
    }
}

impl EnvExporter for EnvmanExporter {
    fn name(&self) -> &'static str {
        "envman"
    }

    fn export(&self, key: &str, value: &str) -> Result<()> {
        let spec = Self::command(key, value);
        debug!(command = %spec.printable(), bytes = value.len(), "exporting with envman");

        let output = self.runner.output(&spec).map_err(|e| ExportError::Failed {
            key: key.to_string(),
            target: self.name().to_string(),
            reason: e.to_string(),
        })?;

        if !output.success {
            return Err(ExportError::Failed {
                key: key.to_string(),
                target: self.name().to_string(),
                reason: output.combined_trimmed(),
            }
            .into());
        }

        info!(key, "exported with envman");
        Ok(())
    }
}

/// GitHub Actions env file, using the multi-line `KEY<<DELIM` form
pub struct GithubEnvExporter {
    path: PathBuf,
}

impl GithubEnvExporter {
    /// Create an exporter appending to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pick a heredoc delimiter that does not occur in `value`
    fn delimiter(value: &str) -> String {
        let mut delimiter = "EOF".to_string();
        let mut n = 0;
        while value.lines().any(|line| line == delimiter) {
            n += 1;
            delimiter = format!("EOF_{}", n);
        }
        delimiter
    }

    /// The Actions runner joins the lines between the markers with `\n`, so the
    /// newline before the closing delimiter is never part of the value.
    fn entry(key: &str, value: &str) -> String {
        let delimiter = Self::delimiter(value);
        format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
    }
}

impl EnvExporter for GithubEnvExporter {
    fn name(&self) -> &'static str {
        "github-env"
    }

    fn export(&self, key: &str, value: &str) -> Result<()> {
        let io_err = |source| ExportError::Io {
            key: key.to_string(),
            source,
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(Self::entry(key, value).as_bytes())
            .map_err(io_err)?;

        info!(key, path = %self.path.display(), "exported to GitHub env file");
        Ok(())
    }
}

/// Reports the value without exporting it anywhere
#[derive(Debug, Default)]
pub struct LogExporter;

impl EnvExporter for LogExporter {
    fn name(&self) -> &'static str {
        "none"
    }

    fn export(&self, key: &str, value: &str) -> Result<()> {
        info!(key, bytes = value.len(), "export disabled, value not published");
        Ok(())
    }
}

/// Choose the exporter for the configured target.
///
/// `Auto` prefers envman when it is on PATH and falls back to the GitHub env
/// file.
pub fn exporter_for(
    config: &StepConfig,
    resolver: &dyn ToolResolver,
    runner: Arc<dyn CommandRunner>,
) -> Result<Box<dyn EnvExporter>> {
    let github = || -> Result<Box<dyn EnvExporter>> {
        match &config.github_env_file {
            Some(path) => Ok(Box::new(GithubEnvExporter::new(path))),
            None => Err(ExportError::NoTarget(config.export_key.clone()).into()),
        }
    };

    match config.export_target {
        ExportTarget::Envman => Ok(Box::new(EnvmanExporter::new(runner))),
        ExportTarget::GithubEnv => github(),
        ExportTarget::None => Ok(Box::new(LogExporter)),
        ExportTarget::Auto => {
            if resolver.locate("envman").is_some() {
                Ok(Box::new(EnvmanExporter::new(runner)))
            } else {
                github()
            }
        }
    }
}

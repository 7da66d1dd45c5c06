//! The step runner
//!
//! Runs the stages in order, halting at the first failure:
//! validate, ensure-tool, ensure-config, sync-git (optional), generate,
//! publish.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{lint_config, validate_config, GitSync, OutputMode, StepConfig};
use crate::error::{CommandError, Result};
use crate::export::{exporter_for, EnvExporter};
use crate::fs::{read_file, write_if_absent, FileStore, LocalFileStore};
use crate::process::{run_checked, CommandRunner, CommandSpec, SystemCommandRunner};
use crate::reporter::{StepEvent, StepReporter, TracingReporter};
use crate::tools::{ensure_tool, ToolResolver, WhichResolver};

use super::stage::StepStage;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Version the changelog was generated for
    pub version: String,
    /// Changelog path as given
    pub changelog_path: String,
    /// Output handling used for the tool
    pub output_mode: OutputMode,
    /// Program the tool was invoked as
    pub tool: String,
    /// Whether the tool was installed during this run
    pub tool_installed: bool,
    /// Whether `release_config.yml` was created during this run
    pub config_written: bool,
    /// Whether git refs were refreshed
    pub git_synced: bool,
    /// Changelog content (capture mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    /// Variable the changelog was exported under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_key: Option<String>,
    /// Export mechanism used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_via: Option<String>,
    /// Non-fatal warnings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Runs the changelog step against injectable capabilities
pub struct StepRunner {
    resolver: Arc<dyn ToolResolver>,
    runner: Arc<dyn CommandRunner>,
    files: Arc<dyn FileStore>,
    exporter: Option<Arc<dyn EnvExporter>>,
    reporter: Arc<dyn StepReporter>,
}

impl Default for StepRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRunner {
    /// Create a runner backed by the real system
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(WhichResolver::new()),
            runner: Arc::new(SystemCommandRunner::new()),
            files: Arc::new(LocalFileStore::new()),
            exporter: None,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Set the tool resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn ToolResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the command runner
    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Set the file store
    pub fn with_files(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = files;
        self
    }

    /// Use `exporter` instead of picking one from the config
    pub fn with_exporter(mut self, exporter: Arc<dyn EnvExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Set the reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn StepReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run every stage for `config`
    pub fn run(&self, config: &StepConfig) -> Result<StepOutcome> {
        self.reporter.report(&StepEvent::Configured {
            version: config.version.clone(),
            changelog_path: config.changelog_path.clone(),
            release_config: config.release_config_input().to_string(),
        });

        self.enter(StepStage::Validate);
        validate_config(config)?;
        let warnings = lint_config(config);
        for warning in &warnings {
            self.reporter.report(&StepEvent::Warning(warning.clone()));
        }

        self.enter(StepStage::EnsureTool);
        let tool = ensure_tool(
            &config.tool,
            self.resolver.as_ref(),
            self.runner.as_ref(),
            self.reporter.as_ref(),
        )?;

        self.enter(StepStage::EnsureConfig);
        let config_path = config.release_config_path();
        let config_written =
            write_if_absent(self.files.as_ref(), &config_path, &config.release_config)?;
        self.reporter.report(&if config_written {
            StepEvent::ConfigWritten { path: config_path }
        } else {
            StepEvent::ConfigKept { path: config_path }
        });

        let git_synced = match &config.git_sync {
            Some(sync) => {
                self.enter(StepStage::SyncGit);
                self.sync_git(config, sync)?;
                true
            }
            None => false,
        };

        self.enter(StepStage::Generate);
        let command = generate_command(&tool.program, config);
        self.reporter.report(&StepEvent::Running {
            command: command.printable(),
        });

        let mut outcome = StepOutcome {
            version: config.version.clone(),
            changelog_path: config.changelog_path.clone(),
            output_mode: config.output_mode,
            tool: tool.program.clone(),
            tool_installed: tool.installed,
            config_written,
            git_synced,
            changelog: None,
            exported_key: None,
            exported_via: None,
            warnings,
        };

        match config.output_mode {
            OutputMode::Capture => {
                let output = run_checked(self.runner.as_ref(), &command, StepStage::Generate)?;
                debug!(output = %output.combined_trimmed(), "changelog tool finished");

                self.enter(StepStage::Publish);
                let changelog = read_file(self.files.as_ref(), &config.changelog_file())?;
                self.reporter.report(&StepEvent::Changelog {
                    content: changelog.clone(),
                });

                let via = self.export(config, &changelog)?;
                self.reporter.report(&StepEvent::Exported {
                    key: config.export_key.clone(),
                    target: via.to_string(),
                });

                outcome.changelog = Some(changelog);
                outcome.exported_key = Some(config.export_key.clone());
                outcome.exported_via = Some(via.to_string());
            }
            OutputMode::Stream => {
                self.stream(&command)?;
                self.reporter.report(&StepEvent::ChangelogWritten {
                    path: config.changelog_file(),
                });
            }
        }

        info!(
            version = %outcome.version,
            tool_installed = outcome.tool_installed,
            config_written = outcome.config_written,
            exported = outcome.exported_key.is_some(),
            "changelog step finished"
        );
        Ok(outcome)
    }

    fn enter(&self, stage: StepStage) {
        debug!(stage = stage.as_str(), "entering stage");
        self.reporter.report(&StepEvent::StageStarted(stage));
    }

    fn sync_git(&self, config: &StepConfig, sync: &GitSync) -> Result<()> {
        let commands = [
            CommandSpec::new("git").args(["fetch", "--all", "--tags", "--prune"]),
            CommandSpec::new("git").args(["checkout", sync.branch.as_str()]),
        ];

        for command in commands {
            let command = command.with_cwd(&config.working_dir);
            self.reporter.report(&StepEvent::Running {
                command: command.printable(),
            });
            run_checked(self.runner.as_ref(), &command, StepStage::SyncGit)?;
        }

        Ok(())
    }

    fn stream(&self, command: &CommandSpec) -> Result<()> {
        let status = self
            .runner
            .stream(command)
            .map_err(|source| CommandError::Spawn {
                stage: StepStage::Generate,
                command: command.printable(),
                source,
            })?;

        if !status.success {
            return Err(CommandError::Failed {
                stage: StepStage::Generate,
                command: command.printable(),
                code: status.exit_code,
                output: String::new(),
            }
            .into());
        }

        Ok(())
    }

    fn export(&self, config: &StepConfig, changelog: &str) -> Result<&'static str> {
        match &self.exporter {
            Some(exporter) => {
                exporter.export(&config.export_key, changelog)?;
                Ok(exporter.name())
            }
            None => {
                let exporter =
                    exporter_for(config, self.resolver.as_ref(), Arc::clone(&self.runner))?;
                exporter.export(&config.export_key, changelog)?;
                Ok(exporter.name())
            }
        }
    }
}

/// `releaseman --ci create-changelog --version <v> --changelog-path <p>`
fn generate_command(program: &str, config: &StepConfig) -> CommandSpec {
    let command = CommandSpec::new(program)
        .args([
            "--ci",
            "create-changelog",
            "--version",
            config.version.as_str(),
            "--changelog-path",
            config.changelog_path.as_str(),
        ])
        .with_cwd(&config.working_dir);

    if config.output_mode == OutputMode::Stream && config.stream_to_stderr {
        command.with_stdout_to_stderr()
    } else {
        command
    }
}

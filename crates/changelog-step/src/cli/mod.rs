//! CLI definition and step invocation

pub mod output;
mod reporter;

use std::path::PathBuf;
use std::sync::Arc;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tracing::info;

use changelog_step_core::config::{
    current_working_dir, DEFAULT_EXPORT_KEY, DEFAULT_SYNC_BRANCH, ENV_CHANGELOG_PATH,
    ENV_NEW_VERSION, ENV_RELEASE_CONFIG,
};
use changelog_step_core::{
    load_config, ExportTarget, GitSync, OutputMode, StepConfig, StepInputs, StepReporter,
    StepRunner, TracingReporter,
};

use reporter::ConsoleReporter;

/// Generate a changelog with releaseman and publish it to later CI steps
#[derive(Debug, Parser)]
#[command(name = "changelog-step")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Version to generate the changelog for
    #[arg(long = "new-version", env = ENV_NEW_VERSION, value_name = "VERSION")]
    pub new_version: Option<String>,

    /// Where releaseman writes the changelog
    #[arg(long, env = ENV_CHANGELOG_PATH, value_name = "PATH")]
    pub changelog_path: Option<String>,

    /// Release configuration YAML, written to release_config.yml if that file is missing
    #[arg(long, env = ENV_RELEASE_CONFIG, value_name = "YAML", hide_env_values = true)]
    pub release_config: Option<String>,

    /// How releaseman output is handled: capture (read back and export) or stream
    #[arg(long, env = "changelog_output_mode", default_value = "capture")]
    pub mode: OutputMode,

    /// Variable the changelog is exported under
    #[arg(long, env = "changelog_export_key", default_value = DEFAULT_EXPORT_KEY)]
    pub export_key: String,

    /// Export mechanism: auto, envman, github-env or none
    #[arg(long, env = "changelog_export_target", default_value = "auto")]
    pub export_to: ExportTarget,

    /// GitHub Actions env file
    #[arg(long, env = "GITHUB_ENV", hide = true)]
    pub github_env: Option<PathBuf>,

    /// Fetch tags and check out a branch before generating
    #[arg(
        long,
        env = "sync_git",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub sync_git: bool,

    /// Branch checked out when --sync-git is on
    #[arg(long, env = "sync_git_branch", default_value = DEFAULT_SYNC_BRANCH)]
    pub sync_git_branch: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long)]
    pub directory: Option<PathBuf>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON summary of the run
    Json,
}

impl Cli {
    /// Raw step inputs from flags and environment
    pub fn inputs(&self) -> StepInputs {
        StepInputs {
            version: self.new_version.clone(),
            changelog_path: self.changelog_path.clone(),
            release_config: self.release_config.clone(),
        }
    }

    /// Build the step configuration for `working_dir`
    pub fn step_config(&self, working_dir: &std::path::Path) -> changelog_step_core::Result<StepConfig> {
        let mut config = load_config(&self.inputs(), working_dir)?
            .with_output_mode(self.mode)
            .with_export_key(self.export_key.clone())
            .with_export_target(self.export_to)
            .with_stream_to_stderr(self.format == OutputFormat::Json);

        if let Some(path) = &self.github_env {
            config = config.with_github_env_file(path);
        }

        if self.sync_git {
            config = config.with_git_sync(GitSync {
                branch: self.sync_git_branch.clone(),
            });
        }

        Ok(config)
    }

    fn working_dir(&self) -> changelog_step_core::Result<PathBuf> {
        let cwd = current_working_dir()?;
        Ok(match &self.directory {
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    fn reporter(&self) -> Arc<dyn StepReporter> {
        if self.quiet || self.format == OutputFormat::Json {
            Arc::new(TracingReporter)
        } else {
            Arc::new(ConsoleReporter::new(self.verbose))
        }
    }

    /// Run the step
    pub fn execute(&self) -> anyhow::Result<()> {
        let working_dir = self.working_dir()?;
        info!(working_dir = %working_dir.display(), "executing changelog step");

        let config = self.step_config(&working_dir)?;
        let outcome = StepRunner::new()
            .with_reporter(self.reporter())
            .run(&config)?;

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["changelog-step"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_build_config() {
        let cli = parse(&[
            "--new-version",
            "1.2.0",
            "--changelog-path",
            "/tmp/CHANGELOG.md",
            "--release-config",
            "",
            "--mode",
            "stream",
            "--export-to",
            "github-env",
            "--export-key",
            "CHANGELOG",
            "--github-env",
            "/tmp/github_env",
        ]);

        let config = cli.step_config(Path::new("/work")).unwrap();

        assert_eq!(config.version, "1.2.0");
        assert_eq!(config.changelog_path, "/tmp/CHANGELOG.md");
        assert!(!config.release_config_supplied);
        assert_eq!(config.output_mode, OutputMode::Stream);
        assert_eq!(config.export_target, ExportTarget::GithubEnv);
        assert_eq!(config.export_key, "CHANGELOG");
        assert_eq!(config.github_env_file, Some(PathBuf::from("/tmp/github_env")));
        assert!(config.git_sync.is_none());
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--new-version", "1.0.0", "--changelog-path", "CHANGELOG.md"]);
        assert_eq!(cli.mode, OutputMode::Capture);
        assert_eq!(cli.export_key, "BITRSE_CHANGELOG");
        assert_eq!(cli.sync_git_branch, "master");
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_sync_git_accepts_yes() {
        let cli = parse(&[
            "--new-version",
            "1.0.0",
            "--changelog-path",
            "CHANGELOG.md",
            "--sync-git",
            "yes",
            "--sync-git-branch",
            "develop",
        ]);

        let config = cli.step_config(Path::new("/work")).unwrap();
        assert_eq!(
            config.git_sync,
            Some(GitSync {
                branch: "develop".to_string()
            })
        );
    }

    #[test]
    fn test_missing_version_is_config_error() {
        let cli = parse(&["--new-version", "", "--changelog-path", "CHANGELOG.md"]);
        let err = cli.step_config(Path::new("/work")).unwrap_err();
        assert_eq!(err.to_string(), "Next version not defined");
    }

    #[test]
    fn test_missing_version_writes_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        let cli = parse(&["-C", &dir, "--new-version", "", "--changelog-path", "CHANGELOG.md"]);

        assert!(cli.execute().is_err());
        assert!(!temp.path().join("release_config.yml").exists());
    }

    #[test]
    fn test_json_format_keeps_streamed_output_off_stdout() {
        let cli = parse(&[
            "--new-version",
            "1.0.0",
            "--changelog-path",
            "CHANGELOG.md",
            "--mode",
            "stream",
            "--format",
            "json",
        ]);
        assert!(cli.step_config(Path::new("/work")).unwrap().stream_to_stderr);

        let cli = parse(&["--new-version", "1.0.0", "--changelog-path", "CHANGELOG.md"]);
        assert!(!cli.step_config(Path::new("/work")).unwrap().stream_to_stderr);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Cli::try_parse_from(["changelog-step", "--mode", "tee"]);
        assert!(result.is_err());
    }
}

//! Human-readable step progress

use changelog_step_core::{StepEvent, StepReporter, StepStage};

use super::output;

/// Prints step events to the console
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a console reporter
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl StepReporter for ConsoleReporter {
    fn report(&self, event: &StepEvent) {
        match event {
            StepEvent::Configured {
                version,
                changelog_path,
                release_config,
            } => {
                println!("{}", output::header("Configs:"));
                println!("{}", output::key_value("new_version", version));
                println!("{}", output::key_value("changelog_pth", changelog_path));
                println!("{}", output::key_value("release_config", ""));
                for line in release_config.lines() {
                    println!("    {}", line);
                }
                println!();
            }
            StepEvent::StageStarted(StepStage::Generate) => {
                println!();
                println!("{}", output::header("Generating changelog..."));
            }
            StepEvent::StageStarted(stage) => {
                if self.verbose {
                    output::info(&format!("Stage: {}", stage));
                }
            }
            StepEvent::Warning(message) => output::warning(message),
            StepEvent::ToolFound { tool, path } => {
                if self.verbose {
                    output::info(&format!(
                        "Using {} at {}",
                        tool,
                        output::path_style().apply_to(path.display())
                    ));
                }
            }
            StepEvent::Installing { tool, command } => {
                output::info(&format!("Installing {}", tool));
                output::command(command);
            }
            StepEvent::ToolInstalled { tool, program } => {
                output::success(&format!("Installed {} ({})", tool, program));
            }
            StepEvent::ConfigWritten { path } => {
                output::success(&format!(
                    "Created {}",
                    output::path_style().apply_to(path.display())
                ));
            }
            StepEvent::ConfigKept { path } => {
                output::info(&format!(
                    "Using existing {}",
                    output::path_style().apply_to(path.display())
                ));
            }
            StepEvent::Running { command } => output::command(command),
            StepEvent::Changelog { content } => {
                println!();
                println!("{}", output::header("Changelog:"));
                println!("{}", content);
            }
            StepEvent::ChangelogWritten { path } => {
                output::success(&format!(
                    "Changelog written to {}",
                    output::path_style().apply_to(path.display())
                ));
            }
            StepEvent::Exported { key, target } => {
                println!();
                if target == "none" {
                    output::info(&format!("Export disabled, {} was not published", key));
                } else {
                    output::success(&format!(
                        "The changelog content is available in the {} environment variable",
                        key
                    ));
                }
            }
        }
    }
}

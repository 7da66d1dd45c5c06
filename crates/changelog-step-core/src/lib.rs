//! Changelog Step Core - library behind the releaseman changelog CI step
//!
//! The step makes sure `releaseman` is installed and `release_config.yml`
//! exists, runs the tool for a version, then publishes the resulting
//! changelog to later pipeline steps. Process execution, file access, tool
//! lookup and export are traits so the whole sequence runs against fakes in
//! tests.

pub mod config;
pub mod error;
pub mod export;
pub mod fs;
pub mod process;
pub mod reporter;
pub mod tools;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{load_config, ExportTarget, GitSync, OutputMode, StepConfig, StepInputs};
pub use error::{Result, StepError};
pub use export::{EnvExporter, EnvmanExporter, GithubEnvExporter, LogExporter};
pub use fs::{FileStore, LocalFileStore};
pub use process::{CommandOutput, CommandRunner, CommandSpec, CommandStatus, SystemCommandRunner};
pub use reporter::{NoopReporter, StepEvent, StepReporter, TracingReporter};
pub use tools::{ToolResolver, ToolSpec, WhichResolver};
pub use workflow::{StepOutcome, StepRunner, StepStage};

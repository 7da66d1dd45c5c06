//! Subprocess execution
//!
//! Every external program the step touches (the changelog tool, its
//! installer, envman, git) goes through a [`CommandRunner`], so tests can
//! record invocations instead of spawning processes.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::debug;

use crate::error::{CommandError, Result};
use crate::workflow::StepStage;

/// A command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory (defaults to the current one)
    pub cwd: Option<PathBuf>,
    /// Data written to the process's stdin
    pub stdin: Option<String>,
    /// When streaming, send the child's stdout to this process's stderr
    pub stdout_to_stderr: bool,
}

impl CommandSpec {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            stdout_to_stderr: false,
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Feed `input` to the process on stdin
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Keep this process's stdout free of the child's output when streaming
    pub fn with_stdout_to_stderr(mut self) -> Self {
        self.stdout_to_stderr = true;
        self
    }

    /// Shell-like rendering for logs, e.g. `go install "a b"`
    pub fn printable(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.chars().any(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited successfully
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub exit_code: Option<i32>,
    /// stdout and stderr, interleaved in the order the process wrote them
    pub output: String,
}

impl CommandOutput {
    /// A successful result with the given output
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    /// A failed result with the given exit code and output
    pub fn failed(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            output: output.into(),
        }
    }

    /// Combined output without surrounding whitespace
    pub fn combined_trimmed(&self) -> String {
        self.output.trim().to_string()
    }
}

/// Exit status of a streamed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Whether the process exited successfully
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub exit_code: Option<i32>,
}

/// Runs external commands.
///
/// A non-zero exit is reported in the returned value; `Err` means the
/// process could not be run at all.
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr through one pipe
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput>;

    /// Run to completion with stdout and stderr inherited from this process
    fn stream(&self, spec: &CommandSpec) -> io::Result<CommandStatus>;
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for SystemCommandRunner {
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let start = Instant::now();
        let (mut reader, writer) = io::pipe()?;
        let mut cmd = Self::command(spec);
        cmd.stdout(writer.try_clone()?);
        cmd.stderr(writer);
        cmd.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd.spawn()?;
        // The command holds write ends of the pipe; the read below only ends once they are closed
        drop(cmd);

        // Feed stdin from a separate thread so a chatty child cannot block on a full stdout pipe
        let writer = match (child.stdin.take(), spec.stdin.clone()) {
            (Some(mut stdin), Some(input)) => Some(std::thread::spawn(move || {
                stdin.write_all(input.as_bytes())
            })),
            _ => None,
        };

        let mut captured = Vec::new();
        reader.read_to_end(&mut captured)?;
        let status = child.wait()?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(command = %spec.printable(), "child closed stdin early");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(io::Error::other("stdin writer thread panicked")),
            }
        }

        debug!(
            command = %spec.printable(),
            exit_code = ?status.code(),
            duration_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(CommandOutput {
            success: status.success(),
            exit_code: status.code(),
            output: String::from_utf8_lossy(&captured).to_string(),
        })
    }

    fn stream(&self, spec: &CommandSpec) -> io::Result<CommandStatus> {
        let start = Instant::now();
        let mut cmd = Self::command(spec);
        cmd.stdout(if spec.stdout_to_stderr {
            Stdio::from(io::stderr())
        } else {
            Stdio::inherit()
        });
        cmd.stderr(Stdio::inherit());
        cmd.stdin(Stdio::null());

        let status = cmd.status()?;

        debug!(
            command = %spec.printable(),
            exit_code = ?status.code(),
            duration_ms = start.elapsed().as_millis() as u64,
            "streamed command finished"
        );

        Ok(CommandStatus {
            success: status.success(),
            exit_code: status.code(),
        })
    }
}

/// Run `spec` with captured output and treat a non-zero exit as an error
pub(crate) fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    stage: StepStage,
) -> Result<CommandOutput> {
    let output = runner.output(spec).map_err(|source| CommandError::Spawn {
        stage,
        command: spec.printable(),
        source,
    })?;

    if !output.success {
        return Err(CommandError::Failed {
            stage,
            command: spec.printable(),
            code: output.exit_code,
            output: output.combined_trimmed(),
        }
        .into());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_quotes_spaces() {
        let spec = CommandSpec::new("releaseman")
            .args(["--ci", "create-changelog"])
            .arg("--changelog-path")
            .arg("my docs/CHANGELOG.md");
        assert_eq!(
            spec.printable(),
            "releaseman --ci create-changelog --changelog-path \"my docs/CHANGELOG.md\""
        );
    }

    #[test]
    fn test_combined_trimmed() {
        assert_eq!(CommandOutput::ok("  out\nerr\n").combined_trimmed(), "out\nerr");
        assert_eq!(CommandOutput::failed(1, " nope ").combined_trimmed(), "nope");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_interleaves_stdout_and_stderr() {
        let spec = CommandSpec::new("sh").args(["-c", "echo one; echo two >&2; echo three"]);
        let output = SystemCommandRunner::new().output(&spec).unwrap();

        assert!(output.success);
        assert_eq!(output.output, "one\ntwo\nthree\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_keeps_output_order() {
        let spec = CommandSpec::new("sh").args([
            "-c",
            "echo 'fetching tags'; echo 'error: no tags' >&2; echo 'aborting'; exit 1",
        ]);
        let err = run_checked(&SystemCommandRunner::new(), &spec, StepStage::Generate).unwrap_err();

        match err {
            crate::error::StepError::Command(CommandError::Failed { output, .. }) => {
                assert_eq!(output, "fetching tags\nerror: no tags\naborting");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_feeds_stdin() {
        let spec = CommandSpec::new("cat").with_stdin("line one\nline two");
        let output = SystemCommandRunner::new().output(&spec).unwrap();

        assert!(output.success);
        assert_eq!(output.output, "line one\nline two");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let output = SystemCommandRunner::new().output(&spec).unwrap();

        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));

        let status = SystemCommandRunner::new().stream(&spec).unwrap();
        assert!(!status.success);
        assert_eq!(status.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_to_stderr_still_reports_status() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo diverted; exit 4"])
            .with_stdout_to_stderr();
        let status = SystemCommandRunner::new().stream(&spec).unwrap();

        assert!(!status.success);
        assert_eq!(status.exit_code, Some(4));
    }

    #[test]
    fn test_system_runner_missing_program_is_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4821");
        assert!(SystemCommandRunner::new().output(&spec).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_maps_failure() {
        let spec = CommandSpec::new("sh").args(["-c", "echo bad >&2; exit 1"]);
        let err = run_checked(&SystemCommandRunner::new(), &spec, StepStage::Generate).unwrap_err();

        match err {
            crate::error::StepError::Command(CommandError::Failed { code, output, stage, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(output, "bad");
                assert_eq!(stage, StepStage::Generate);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

//! Changelog tool detection and installation

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{RELEASEMAN_BIN, RELEASEMAN_MODULE};
use crate::error::{Result, ToolError};
use crate::process::{CommandRunner, CommandSpec};
use crate::reporter::{StepEvent, StepReporter};

/// An executable the step depends on, and how to get it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Executable name looked up on PATH
    pub name: String,
    /// Command that installs the executable
    pub install: CommandSpec,
    /// Directories the installer may drop the executable into
    pub install_dirs: Vec<PathBuf>,
}

impl ToolSpec {
    /// Create a tool spec
    pub fn new(name: impl Into<String>, install: CommandSpec) -> Self {
        Self {
            name: name.into(),
            install,
            install_dirs: Vec::new(),
        }
    }

    /// Add a directory to search after installation
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dirs.push(dir.into());
        self
    }

    /// releaseman, installed with `go install`
    pub fn releaseman() -> Self {
        let install = CommandSpec::new("go").args([
            "install".to_string(),
            format!("{}@latest", RELEASEMAN_MODULE),
        ]);
        Self {
            name: RELEASEMAN_BIN.to_string(),
            install,
            install_dirs: go_bin_dirs(),
        }
    }

    fn find_in_install_dirs(&self) -> Option<PathBuf> {
        let file_name = format!("{}{}", self.name, std::env::consts::EXE_SUFFIX);
        self.install_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }
}

/// Where `go install` puts binaries: `$GOBIN`, each `$GOPATH/bin`, `~/go/bin`
fn go_bin_dirs() -> Vec<PathBuf> {
    let mut bin_dirs = Vec::new();

    if let Some(gobin) = std::env::var_os("GOBIN").filter(|v| !v.is_empty()) {
        bin_dirs.push(PathBuf::from(gobin));
    }
    if let Some(gopath) = std::env::var_os("GOPATH") {
        bin_dirs.extend(std::env::split_paths(&gopath).map(|p| p.join("bin")));
    }
    if let Some(home) = dirs::home_dir() {
        bin_dirs.push(home.join("go").join("bin"));
    }

    bin_dirs.dedup();
    bin_dirs
}

/// Finds executables on the search path
pub trait ToolResolver: Send + Sync {
    /// Full path of `name`, if it can be found
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves executables with the `which` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichResolver;

impl WhichResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }
}

impl ToolResolver for WhichResolver {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(tool = name, error = %e, "tool not found on PATH");
                None
            }
        }
    }
}

/// How the tool will be invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResolution {
    /// Path or bare name passed to the runner
    pub program: String,
    /// Whether the tool had to be installed this run
    pub installed: bool,
}

/// Make sure the tool is available, installing it once if it is not
pub fn ensure_tool(
    spec: &ToolSpec,
    resolver: &dyn ToolResolver,
    runner: &dyn CommandRunner,
    reporter: &dyn StepReporter,
) -> Result<ToolResolution> {
    if let Some(path) = resolver.locate(&spec.name) {
        debug!(tool = %spec.name, path = %path.display(), "tool already installed");
        reporter.report(&StepEvent::ToolFound {
            tool: spec.name.clone(),
            path: path.clone(),
        });
        return Ok(ToolResolution {
            program: path.to_string_lossy().to_string(),
            installed: false,
        });
    }

    info!(tool = %spec.name, command = %spec.install.printable(), "installing tool");
    reporter.report(&StepEvent::Installing {
        tool: spec.name.clone(),
        command: spec.install.printable(),
    });

    let output = runner
        .output(&spec.install)
        .map_err(|source| ToolError::InstallerUnavailable {
            tool: spec.name.clone(),
            source,
        })?;

    if !output.success {
        return Err(ToolError::InstallFailed {
            tool: spec.name.clone(),
            output: output.combined_trimmed(),
        }
        .into());
    }

    let program = match resolver
        .locate(&spec.name)
        .or_else(|| spec.find_in_install_dirs())
    {
        Some(path) => path.to_string_lossy().to_string(),
        None => {
            warn!(tool = %spec.name, "installed tool not found on PATH, invoking by name");
            spec.name.clone()
        }
    };

    reporter.report(&StepEvent::ToolInstalled {
        tool: spec.name.clone(),
        program: program.clone(),
    });

    Ok(ToolResolution {
        program,
        installed: true,
    })
}

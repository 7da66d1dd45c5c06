//! In-memory fakes for the step's capability traits

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::export::EnvExporter;
use crate::fs::FileStore;
use crate::process::{CommandOutput, CommandRunner, CommandSpec, CommandStatus};
use crate::tools::ToolResolver;

type Responder = Arc<dyn Fn(&CommandSpec) -> io::Result<CommandOutput> + Send + Sync>;

/// Records every command and answers with canned results
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responders: Vec<(String, Responder)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands for `program` with `output`
    pub fn respond(self, program: &str, output: CommandOutput) -> Self {
        self.respond_with(program, move |_| Ok(output.clone()))
    }

    /// Answer commands for `program` by calling `f`
    pub fn respond_with<F>(mut self, program: &str, f: F) -> Self
    where
        F: Fn(&CommandSpec) -> io::Result<CommandOutput> + Send + Sync + 'static,
    {
        self.responders.push((program.to_string(), Arc::new(f)));
        self
    }

    /// Make `program` fail to spawn
    pub fn fail_spawn(self, program: &str) -> Self {
        self.respond_with(program, |_| {
            Err(io::Error::new(io::ErrorKind::NotFound, "program not found"))
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn printed_calls(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::printable).collect()
    }

    fn answer(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());

        let program_name = Path::new(&spec.program)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.responders
            .iter()
            .find(|(program, _)| *program == spec.program || *program == program_name)
            .map(|(_, responder)| responder(spec))
            .unwrap_or_else(|| Ok(CommandOutput::ok("")))
    }
}

impl CommandRunner for RecordingRunner {
    fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.answer(spec)
    }

    fn stream(&self, spec: &CommandSpec) -> io::Result<CommandStatus> {
        let output = self.answer(spec)?;
        Ok(CommandStatus {
            success: output.success,
            exit_code: output.exit_code,
        })
    }
}

/// Resolves a fixed set of tools
#[derive(Default)]
pub struct FixedResolver {
    tools: HashMap<String, PathBuf>,
}

impl FixedResolver {
    /// Nothing is installed
    pub fn absent() -> Self {
        Self::default()
    }

    /// Only the tool at `path` is installed
    pub fn present(path: impl Into<PathBuf>) -> Self {
        Self::absent().with(path)
    }

    /// Also resolve the tool at `path`, keyed by its file name
    pub fn with(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.tools.insert(name, path);
        self
    }
}

impl ToolResolver for FixedResolver {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.tools.get(name).cloned()
    }
}

/// Files kept in a map
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Put a file in place without counting it as a write by the step
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().unwrap().clone()
    }
}

impl FileStore for MemoryFileStore {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.writes.lock().unwrap().push(path.to_path_buf());
        self.insert(path, content);
        Ok(())
    }
}

/// Keeps exported pairs in memory
#[derive(Default)]
pub struct RecordingExporter {
    exports: Mutex<Vec<(String, String)>>,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.exports.lock().unwrap().clone()
    }
}

impl EnvExporter for RecordingExporter {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn export(&self, key: &str, value: &str) -> Result<()> {
        self.exports
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

//! TestWorld pattern for declarative integration test setup.
//!
//! Each world owns a temp directory holding a trace directory and a config
//! file. The config file always exists so a developer's own
//! `~/.config/tlatrace/config.toml` never leaks into test runs.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::fixtures::{SampleFiles, TraceBuilder};
use crate::process::BackgroundProcess;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use tlatrace_testing::TestWorld;
/// use tlatrace_testing::fixtures::DIEHARD_TRACE;
///
/// let world = TestWorld::new().with_sample(DIEHARD_TRACE, "trace_1");
/// let dir = world.trace_dir().to_string_lossy().to_string();
/// let result = world.run(&["summary", &dir]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    trace_dir: PathBuf,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
    samples: SampleFiles,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let trace_dir = temp_dir.path().join("traces");
        let config_path = temp_dir.path().join("config.toml");

        std::fs::create_dir_all(&trace_dir).expect("Failed to create trace dir");
        std::fs::write(&config_path, "").expect("Failed to create config file");

        Self {
            temp_dir,
            trace_dir,
            config_path,
            env_vars: HashMap::new(),
            samples: SampleFiles::new(),
        }
    }

    /// Directory the trace files are placed in.
    pub fn trace_dir(&self) -> &Path {
        &self.trace_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the temp directory root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn samples(&self) -> &SampleFiles {
        &self.samples
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Replace the config file contents.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config file");
        self
    }

    /// Copy a sample into the trace directory under `dest_name`.
    pub fn with_sample(self, sample_name: &str, dest_name: &str) -> Self {
        self.samples
            .copy_to(sample_name, &self.trace_dir.join(dest_name))
            .expect("Failed to copy sample");
        self
    }

    /// Write a rendered trace into the trace directory.
    pub fn with_trace(self, dest_name: &str, trace: &TraceBuilder) -> Self {
        trace
            .write_to(&self.trace_dir.join(dest_name))
            .expect("Failed to write trace");
        self
    }

    /// Files currently in the trace directory, sorted by name.
    pub fn trace_files(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.trace_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--config").arg(&self.config_path);
        cmd.current_dir(self.temp_dir.path());
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// A configured `tlatrace` command, ready for more arguments.
    #[allow(deprecated)]
    pub fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("tlatrace")
            .map_err(|e| anyhow::anyhow!("Failed to find tlatrace binary: {}", e))?;
        self.configure_command(&mut cmd);
        Ok(cmd)
    }

    /// Execute the binary with `args` and capture its output.
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = self.command()?;
        cmd.args(args);
        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl TestWorld {
    /// Start the binary in the background with `args`.
    #[allow(deprecated)]
    pub fn spawn(&self, args: &[&str]) -> Result<BackgroundProcess> {
        let bin = assert_cmd::cargo::cargo_bin("tlatrace");
        let mut cmd = std::process::Command::new(bin);
        cmd.arg("--config")
            .arg(&self.config_path)
            .args(args)
            .current_dir(self.temp_dir.path());
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        Ok(BackgroundProcess::spawn_piped(cmd)?)
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

//! Sample TLC output and helpers to place it in test directories.
//!
//! Samples live in `crates/tlatrace-testing/samples/`:
//! - `diehard.trace`: the 7-step DieHard counterexample as a trace file
//! - `diehard_prefix.trace`: its first 3 steps
//! - `diehard_mc.out`: the same counterexample as raw `-tool` TLC output
//! - `diamond.dot`: a 4-node state graph with two root-to-leaf paths
//! - `broken.trace`: a trace whose second state has an unclosed sequence

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DIEHARD_TRACE: &str = "diehard.trace";
pub const DIEHARD_PREFIX_TRACE: &str = "diehard_prefix.trace";
pub const DIEHARD_LOG: &str = "diehard_mc.out";
pub const DIAMOND_DOT: &str = "diamond.dot";
pub const BROKEN_TRACE: &str = "broken.trace";

/// Sample file manager for test data.
pub struct SampleFiles {
    samples_dir: PathBuf,
}

impl Default for SampleFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleFiles {
    pub fn new() -> Self {
        let samples_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples");
        Self { samples_dir }
    }

    pub fn path(&self, sample_name: &str) -> PathBuf {
        self.samples_dir.join(sample_name)
    }

    pub fn read(&self, sample_name: &str) -> Result<String> {
        let path = self.path(sample_name);
        fs::read_to_string(&path).with_context(|| format!("missing sample {}", path.display()))
    }

    /// Copy a sample file to a destination.
    pub fn copy_to(&self, sample_name: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(self.path(sample_name), dest)
            .with_context(|| format!("failed to copy sample {}", sample_name))?;
        Ok(())
    }
}

/// Renders trace-file text from variable assignments given as literal text.
///
/// ```
/// use tlatrace_testing::TraceBuilder;
///
/// let text = TraceBuilder::new()
///     .state(&[("x", "0")])
///     .action_state("Inc", &[("x", "1")])
///     .build();
/// assert!(text.contains("STATE_2 =="));
/// ```
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    module: String,
    states: Vec<(Option<String>, Vec<(String, String)>)>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            module: "MC_trace".to_string(),
            states: Vec::new(),
        }
    }

    pub fn module(mut self, name: &str) -> Self {
        self.module = name.to_string();
        self
    }

    pub fn state(mut self, vars: &[(&str, &str)]) -> Self {
        self.states.push((None, owned(vars)));
        self
    }

    pub fn action_state(mut self, action: &str, vars: &[(&str, &str)]) -> Self {
        self.states.push((Some(action.to_string()), owned(vars)));
        self
    }

    pub fn build(&self) -> String {
        let dashes = "-".repeat(16);
        let header = format!("{} MODULE {} {}", dashes, self.module, dashes);
        let mut out = format!("{}\n", header);
        for (idx, (action, vars)) in self.states.iter().enumerate() {
            if let Some(action) = action {
                out.push_str(&format!("\\* <{}>\n", action));
            }
            out.push_str(&format!("STATE_{} ==\n", idx + 1));
            for (name, value) in vars {
                out.push_str(&format!("/\\ {} = {}\n", name, value));
            }
            out.push('\n');
        }
        out.push_str(&"=".repeat(header.len()));
        out.push('\n');
        out
    }

    pub fn write_to(&self, dest: &Path) -> Result<()> {
        fs::write(dest, self.build())?;
        Ok(())
    }
}

fn owned(vars: &[(&str, &str)]) -> Vec<(String, String)> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

//! Which files in a trace directory are traces.

use crate::Result;
use crate::config::IngestConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Trace files start with a prefix; the finish file also counts as a trace
/// but is never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFilter {
    prefix: String,
    finish_file: String,
}

impl TraceFilter {
    pub fn new(prefix: impl Into<String>, finish_file: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            finish_file: finish_file.into(),
        }
    }

    pub fn from_config(ingest: &IngestConfig) -> Self {
        Self::new(&ingest.trace_prefix, &ingest.finish_file)
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(&self.prefix) || name == self.finish_file)
    }

    pub fn is_finish_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name == self.finish_file)
    }
}

/// Trace files directly inside `dir`, sorted by name
pub fn scan_traces(dir: &Path, filter: &TraceFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && filter.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }
    log::debug!("found {} trace files in {}", files.len(), dir.display());
    Ok(files)
}

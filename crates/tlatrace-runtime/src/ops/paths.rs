use crate::{Error, Result};
use crate::config::Config;
use crate::ops::summary::POLL_INTERVAL;
use crate::pool::{JobError, TaskGroup};
use crate::shutdown::Shutdown;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tlatrace_engine::{PathsLine, ProgressGate, StateGraph, trace_file_name};
use tlatrace_parser::{NodeId, read_dot_file};

#[derive(Debug, Clone)]
pub enum PathsProgress {
    /// Graph read; `pairs` enumeration jobs follow
    Loaded {
        roots: usize,
        leaves: usize,
        vertices: usize,
    },
    Submitted {
        pairs: u64,
    },
    Progress(PathsLine),
    Failed {
        pair: Option<usize>,
        error: String,
    },
    Interrupted,
    Finished(PathsLine),
}

/// Enumerate the simple paths of one (root, leaf) pair, writing each as a
/// trace file when `save_dir` is set. Returns the number of paths.
pub fn process_pair(
    graph: &StateGraph,
    pair: usize,
    root: NodeId,
    leaf: NodeId,
    save_dir: Option<&Path>,
) -> Result<u64> {
    let mut count = 0u64;
    for (idx, path) in graph.all_simple_paths(root, leaf).enumerate() {
        if let Some(dir) = save_dir {
            let name = trace_file_name(pair, idx);
            let text = graph.render_trace(&name, &path)?;
            std::fs::write(dir.join(&name), text)?;
        }
        count += 1;
    }
    log::debug!("pair {} ({} -> {}): {} paths", pair, root, leaf, count);
    Ok(count)
}

/// Every simple root-to-leaf path of a DOT state graph
pub struct PathsService {
    workers: usize,
    gate: ProgressGate,
    shutdown: Shutdown,
}

impl PathsService {
    pub fn new(config: &Config) -> Self {
        Self {
            workers: config.pool.workers(),
            gate: config.progress.gate(),
            shutdown: Shutdown::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn run<F>(&self, dot_file: &Path, save_dir: Option<&Path>, mut on_progress: F) -> Result<PathsLine>
    where
        F: FnMut(PathsProgress),
    {
        let graph = Arc::new(StateGraph::from_dot(read_dot_file(dot_file, save_dir.is_some())?));
        let pairs = graph.pairs();
        on_progress(PathsProgress::Loaded {
            roots: graph.roots().len(),
            leaves: graph.leaves().len(),
            vertices: graph.vertices(),
        });

        if let Some(dir) = save_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut group: TaskGroup<(usize, Result<u64>)> = TaskGroup::new(self.workers)?;
        let mut line = PathsLine {
            processed: 0,
            submitted: 0,
            all: pairs.len() as u64,
            paths: 0,
        };
        for (pair, (root, leaf)) in pairs.into_iter().enumerate() {
            if self.shutdown.is_requested() {
                break;
            }
            let graph = Arc::clone(&graph);
            let dir: Option<PathBuf> = save_dir.map(Path::to_path_buf);
            group.submit(move || (pair, process_pair(&graph, pair, root, leaf, dir.as_deref())));
        }
        line.submitted = group.submitted();
        on_progress(PathsProgress::Submitted {
            pairs: line.submitted,
        });

        let mut gate = self.gate.clone();
        let mut cancelled = false;
        while !group.is_empty() {
            if self.shutdown.is_requested() && !cancelled {
                cancelled = true;
                group.cancel_pending();
                on_progress(PathsProgress::Interrupted);
            }
            let report = match group.next_completed(POLL_INTERVAL) {
                Some(Ok((_, Ok(paths)))) => {
                    line.processed += 1;
                    line.paths += paths;
                    gate.completed(line.processed)
                }
                Some(Ok((pair, Err(err)))) => {
                    log::warn!("path enumeration failed for pair {}: {}", pair, err);
                    on_progress(PathsProgress::Failed {
                        pair: Some(pair),
                        error: err.to_string(),
                    });
                    false
                }
                Some(Err(JobError::Cancelled)) => false,
                Some(Err(err)) => {
                    let err = Error::from(err);
                    log::warn!("{}", err);
                    on_progress(PathsProgress::Failed {
                        pair: None,
                        error: err.to_string(),
                    });
                    false
                }
                None => gate.tick(),
            };
            if report {
                on_progress(PathsProgress::Progress(line));
            }
        }

        on_progress(PathsProgress::Finished(line));
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tlatrace_parser::{ReaderOptions, read_trace};

    const GRAPH: &str = "digraph {\n\
        1 [label=\"/\\\\ x = 1\"];\n\
        2 [label=\"/\\\\ x = 2\"];\n\
        3 [label=\"/\\\\ x = 3\"];\n\
        4 [label=\"/\\\\ x = 4\"];\n\
        5 [label=\"/\\\\ x = 5\"];\n\
        1 -> 2 [label=\"A\"];\n\
        1 -> 3 [label=\"B\"];\n\
        2 -> 4 [label=\"C\"];\n\
        3 -> 4 [label=\"C\"];\n\
        5 -> 3 [label=\"E\"];\n\
        }\n";

    #[test]
    fn test_counts_paths_without_saving() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let dot = dir.path().join("states.dot");
        std::fs::write(&dot, GRAPH)?;

        let mut loaded = None;
        let line = PathsService::new(&Config::default()).run(&dot, None, |e| {
            if let PathsProgress::Loaded { roots, leaves, vertices } = e {
                loaded = Some((roots, leaves, vertices));
            }
        })?;

        assert_eq!(loaded, Some((2, 1, 5)));
        // 1 -> 4 twice, 5 -> 4 once
        assert_eq!(line.all, 2);
        assert_eq!(line.processed, 2);
        assert_eq!(line.paths, 3);
        Ok(())
    }

    #[test]
    fn test_saved_paths_read_back() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let dot = dir.path().join("states.dot");
        std::fs::write(&dot, GRAPH)?;
        let save = dir.path().join("out");

        PathsService::new(&Config::default()).run(&dot, Some(&save), |_| {})?;

        let mut names: Vec<_> = std::fs::read_dir(&save)?
            .filter_map(|e| e.ok()?.file_name().into_string().ok())
            .collect();
        names.sort();
        assert_eq!(names, vec!["trace_0_0", "trace_0_1", "trace_1_0"]);

        let states = read_trace(save.join("trace_1_0"), ReaderOptions::default())?;
        let actions: Vec<_> = states.iter().map(|s| s.action()).collect();
        assert_eq!(actions, vec![None, Some("E"), Some("C")]);
        Ok(())
    }
}

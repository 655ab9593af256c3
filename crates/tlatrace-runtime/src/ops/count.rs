use crate::{Error, Result};
use crate::config::Config;
use crate::ops::summary::POLL_INTERVAL;
use crate::pool::{JobError, TaskGroup};
use crate::scan::{TraceFilter, scan_traces};
use crate::shutdown::Shutdown;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tlatrace_engine::{CountLine, CountTotals, HashFileReducer, HashFileWriter, ProgressGate};
use tlatrace_parser::{ReaderOptions, TraceReader};
use tlatrace_types::CanonicalDigest;

#[derive(Debug, Clone)]
pub enum CountProgress {
    Progress(CountLine),
    /// Every trace file found has been submitted
    Submitted {
        files: u64,
    },
    /// Every submitted job is done and the hash file is flushed
    MapFinished {
        lines: u64,
    },
    Failed {
        file: Option<PathBuf>,
        error: String,
    },
    Interrupted,
    ReduceFinished(CountTotals),
}

/// State digests of one trace, in order
pub fn hash_trace(path: &Path, options: &Arc<ReaderOptions>) -> Result<Vec<CanonicalDigest>> {
    let mut digests = Vec::new();
    for state in TraceReader::open(path, Arc::clone(options))? {
        digests.push(state?.digest());
    }
    Ok(digests)
}

/// Two-phase unique trace and distinct state count backed by a hash file
pub struct CountService {
    options: Arc<ReaderOptions>,
    filter: TraceFilter,
    workers: usize,
    gate: ProgressGate,
    shutdown: Shutdown,
}

impl CountService {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            options: Arc::new(config.reader_options()?),
            filter: TraceFilter::from_config(&config.ingest),
            workers: config.pool.workers(),
            gate: config.progress.gate(),
            shutdown: Shutdown::new(),
        })
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Hash every trace in `trace_dir` into a fresh `hash_file`, one line per
    /// trace. Returns the number of traces submitted.
    pub fn produce<F>(&self, trace_dir: &Path, hash_file: &Path, mut on_progress: F) -> Result<u64>
    where
        F: FnMut(CountProgress),
    {
        if hash_file.exists() {
            std::fs::remove_file(hash_file)?;
        }
        let out = OpenOptions::new().create(true).append(true).open(hash_file)?;
        let mut writer = HashFileWriter::new(BufWriter::new(out));

        let mut group: TaskGroup<(PathBuf, Result<Vec<CanonicalDigest>>)> = TaskGroup::new(self.workers)?;
        for file in scan_traces(trace_dir, &self.filter)? {
            if self.shutdown.is_requested() {
                break;
            }
            let options = Arc::clone(&self.options);
            group.submit(move || {
                let result = hash_trace(&file, &options);
                (file, result)
            });
        }
        let submitted = group.submitted();
        on_progress(CountProgress::Submitted { files: submitted });

        let mut gate = self.gate.clone();
        let mut processed = 0u64;
        let mut cancelled = false;
        while !group.is_empty() {
            if self.shutdown.is_requested() && !cancelled {
                cancelled = true;
                group.cancel_pending();
                on_progress(CountProgress::Interrupted);
            }
            let report = match group.next_completed(POLL_INTERVAL) {
                Some(Ok((_, Ok(digests)))) => {
                    writer.append(&digests)?;
                    processed += 1;
                    gate.completed(processed)
                }
                Some(Ok((file, Err(err)))) => {
                    log::warn!("skipping {}: {}", file.display(), err);
                    on_progress(CountProgress::Failed {
                        file: Some(file),
                        error: err.to_string(),
                    });
                    false
                }
                Some(Err(JobError::Cancelled)) => false,
                Some(Err(err)) => {
                    let err = Error::from(err);
                    log::warn!("{}", err);
                    on_progress(CountProgress::Failed {
                        file: None,
                        error: err.to_string(),
                    });
                    false
                }
                None => gate.tick(),
            };
            if report {
                on_progress(CountProgress::Progress(CountLine::Producing {
                    processed,
                    submitted,
                }));
            }
        }

        writer.flush()?;
        on_progress(CountProgress::MapFinished {
            lines: writer.lines(),
        });
        Ok(submitted)
    }

    /// Count unique traces and distinct states in `hash_file`.
    ///
    /// `submitted` is the number of traces the producing pass submitted;
    /// when unknown the processed count stands in for it.
    pub fn reduce<F>(&self, hash_file: &Path, submitted: Option<u64>, mut on_progress: F) -> Result<CountTotals>
    where
        F: FnMut(CountProgress),
    {
        let reader = BufReader::new(File::open(hash_file)?);
        let mut gate = self.gate.clone();
        let line = |totals: CountTotals| CountLine::Reducing {
            unique_traces: totals.unique_traces,
            processed: totals.processed,
            submitted: submitted.unwrap_or(totals.processed),
            distinct_states: totals.distinct_states,
            total_states: totals.total_states,
        };

        let totals = HashFileReducer::new().reduce(reader, |totals| {
            if gate.completed(totals.processed) {
                on_progress(CountProgress::Progress(line(totals)));
            }
        })?;

        on_progress(CountProgress::Progress(line(totals)));
        on_progress(CountProgress::ReduceFinished(totals));
        Ok(totals)
    }
}

use crate::{Error, Result};
use crate::config::Config;
use crate::pool::{JobError, TaskGroup};
use crate::scan::{TraceFilter, scan_traces};
use crate::shutdown::Shutdown;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tlatrace_engine::{AggregateStats, PartialStats, ProgressGate, SummaryLine, SummaryReport};
use tlatrace_parser::{ReaderOptions, TraceReader};

/// Longest the coordinator blocks waiting for a job
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub enum SummaryProgress {
    /// Every file found has been submitted
    Submitted {
        files: u64,
    },
    Progress(SummaryLine),
    Failed {
        file: Option<PathBuf>,
        error: String,
    },
    /// First interrupt seen; queued files are dropped
    Interrupted,
    /// Final line with both histograms
    Finished(SummaryReport),
}

/// Reads one trace file into its statistics
#[derive(Debug, Clone)]
pub struct SummaryMapper {
    options: Arc<ReaderOptions>,
    filter: TraceFilter,
    delete: bool,
}

impl SummaryMapper {
    pub fn new(options: Arc<ReaderOptions>, filter: TraceFilter, delete: bool) -> Self {
        Self {
            options,
            filter,
            delete,
        }
    }

    /// Full pass over `path`. With deletion on, the file is removed once its
    /// statistics are complete, unless it is the finish file.
    ///
    /// A failed delete is logged; the statistics still count.
    pub fn process_file(&self, path: &Path) -> Result<PartialStats> {
        let mut stats = PartialStats::new(path);
        for state in TraceReader::open(path, Arc::clone(&self.options))? {
            stats.record(&state?);
        }

        if self.delete && !self.filter.is_finish_file(path) {
            remove_processed(path);
        }
        Ok(stats)
    }
}

/// Delete a trace whose statistics are complete. Returns whether it is gone.
fn remove_processed(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("deleted {}", path.display());
            true
        }
        Err(err) => {
            log::warn!("could not delete {}: {}", path.display(), err);
            false
        }
    }
}

type MapResult = (PathBuf, Result<PartialStats>);

/// Submits files to the pool, each processed by the shared mapper
pub struct Dispatcher {
    mapper: Arc<SummaryMapper>,
    group: TaskGroup<MapResult>,
}

impl Dispatcher {
    pub fn new(mapper: SummaryMapper, workers: usize) -> Result<Self> {
        Ok(Self {
            mapper: Arc::new(mapper),
            group: TaskGroup::new(workers)?,
        })
    }

    pub fn submit(&mut self, path: PathBuf) {
        let mapper = Arc::clone(&self.mapper);
        self.group.submit(move || {
            let result = mapper.process_file(&path);
            (path, result)
        });
    }

    pub fn next_completed(&mut self, wait: Duration) -> Option<std::result::Result<MapResult, JobError>> {
        self.group.next_completed(wait)
    }

    pub fn cancel_pending(&mut self) {
        self.group.cancel_pending();
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    pub fn submitted(&self) -> u64 {
        self.group.submitted()
    }
}

/// Owns the aggregate while jobs complete; shared by summary and watch
pub(crate) struct Coordinator {
    dispatcher: Dispatcher,
    stats: AggregateStats,
    gate: ProgressGate,
    cancelled: bool,
}

impl Coordinator {
    pub(crate) fn new(dispatcher: Dispatcher, gate: ProgressGate) -> Self {
        Self {
            dispatcher,
            stats: AggregateStats::new(),
            gate,
            cancelled: false,
        }
    }

    pub(crate) fn submit(&mut self, path: PathBuf) {
        self.dispatcher.submit(path);
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.dispatcher.submitted()
    }

    fn line(&self) -> SummaryLine {
        SummaryLine::new(&self.stats, self.dispatcher.submitted())
    }

    /// Merge at most one completed job, reporting through the gate.
    /// Returns false when nothing completed within `wait`.
    pub(crate) fn poll<F>(&mut self, wait: Duration, on_progress: &mut F) -> bool
    where
        F: FnMut(SummaryProgress),
    {
        let completed = self.dispatcher.next_completed(wait);
        let merged = completed.is_some();
        match completed {
            Some(Ok((_, Ok(partial)))) => {
                self.stats.merge(partial);
                if self.gate.completed(self.stats.processed()) {
                    on_progress(SummaryProgress::Progress(self.line()));
                }
            }
            Some(Ok((file, Err(err)))) => {
                log::warn!("skipping {}: {}", file.display(), err);
                self.stats.record_failure();
                on_progress(SummaryProgress::Failed {
                    file: Some(file),
                    error: err.to_string(),
                });
            }
            Some(Err(JobError::Cancelled)) => {}
            Some(Err(err)) => {
                let err = Error::from(err);
                log::warn!("{}", err);
                self.stats.record_failure();
                on_progress(SummaryProgress::Failed {
                    file: None,
                    error: err.to_string(),
                });
            }
            None => {
                if self.gate.tick() {
                    on_progress(SummaryProgress::Progress(self.line()));
                }
            }
        }
        merged
    }

    /// Merge every job that has already completed, without waiting
    pub(crate) fn poll_ready<F>(&mut self, on_progress: &mut F)
    where
        F: FnMut(SummaryProgress),
    {
        while self.poll(Duration::ZERO, on_progress) {}
    }

    /// Stop waiting on queued jobs after the first interrupt
    pub(crate) fn check_shutdown<F>(&mut self, shutdown: &Shutdown, on_progress: &mut F)
    where
        F: FnMut(SummaryProgress),
    {
        if shutdown.is_requested() && !self.cancelled {
            self.cancelled = true;
            self.dispatcher.cancel_pending();
            on_progress(SummaryProgress::Interrupted);
        }
    }

    pub(crate) fn drain<F>(&mut self, shutdown: &Shutdown, on_progress: &mut F)
    where
        F: FnMut(SummaryProgress),
    {
        while !self.dispatcher.is_empty() {
            self.check_shutdown(shutdown, on_progress);
            self.poll(POLL_INTERVAL, on_progress);
        }
    }

    pub(crate) fn finish<F>(mut self, on_progress: &mut F) -> AggregateStats
    where
        F: FnMut(SummaryProgress),
    {
        self.stats.finalize();
        on_progress(SummaryProgress::Finished(SummaryReport::new(
            &self.stats,
            self.dispatcher.submitted(),
        )));
        self.stats
    }
}

/// Distinct states, diameters and actions over a directory of traces
pub struct SummaryService {
    options: Arc<ReaderOptions>,
    filter: TraceFilter,
    delete: bool,
    workers: usize,
    gate: ProgressGate,
    shutdown: Shutdown,
}

impl SummaryService {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            options: Arc::new(config.reader_options()?),
            filter: TraceFilter::from_config(&config.ingest),
            delete: config.ingest.delete_processed,
            workers: config.pool.workers(),
            gate: config.progress.gate(),
            shutdown: Shutdown::new(),
        })
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn filter(&self) -> &TraceFilter {
        &self.filter
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    pub(crate) fn coordinator(&self) -> Result<Coordinator> {
        let mapper = SummaryMapper::new(Arc::clone(&self.options), self.filter.clone(), self.delete);
        let dispatcher = Dispatcher::new(mapper, self.workers)?;
        Ok(Coordinator::new(dispatcher, self.gate.clone()))
    }

    pub fn run<F>(&self, trace_dir: &Path, mut on_progress: F) -> Result<AggregateStats>
    where
        F: FnMut(SummaryProgress),
    {
        let files = scan_traces(trace_dir, &self.filter)?;
        let mut coordinator = self.coordinator()?;

        for file in files {
            if self.shutdown.is_requested() {
                break;
            }
            coordinator.submit(file);
        }
        on_progress(SummaryProgress::Submitted {
            files: coordinator.submitted(),
        });

        coordinator.drain(&self.shutdown, &mut on_progress);
        Ok(coordinator.finish(&mut on_progress))
    }
}

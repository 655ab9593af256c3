use crate::output::{ReportSink, WriteStatus};
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tlatrace_runtime::{Config, CountProgress, CountService, Shutdown};

/// Hash `trace_dir` into `hash_file`, then count it. Without a trace
/// directory only the counting pass runs.
pub fn handle(
    config: &Config,
    trace_dir: Option<&Path>,
    hash_file: &Path,
    shutdown: Shutdown,
    out: &mut ReportSink,
) -> Result<()> {
    let service = CountService::new(config)?.with_shutdown(shutdown);

    let mut status = WriteStatus::default();
    let submitted = match trace_dir {
        Some(dir) => Some(
            service
                .produce(dir, hash_file, |event| status.record(render(event, out)))
                .with_context(|| format!("hashing {} failed", dir.display()))?,
        ),
        None => None,
    };

    service
        .reduce(hash_file, submitted, |event| status.record(render(event, out)))
        .with_context(|| format!("counting {} failed", hash_file.display()))?;

    status.into_result().context("failed to write report")
}

fn render(event: CountProgress, out: &mut ReportSink) -> io::Result<()> {
    match event {
        CountProgress::Progress(line) => out.line(line),
        CountProgress::Submitted { files } => {
            log::info!("{} trace files submitted", files);
            out.line("Submit finished")
        }
        CountProgress::MapFinished { lines } => {
            log::info!("{} hash lines written", lines);
            out.line("Map finished")
        }
        CountProgress::Failed { file, error } => {
            match file {
                Some(file) => eprintln!("Warning: skipped {}: {}", file.display(), error),
                None => eprintln!("Warning: {}", error),
            }
            Ok(())
        }
        CountProgress::Interrupted => out.line("Interrupted"),
        CountProgress::ReduceFinished(_) => out.line("Reduce finished"),
    }
}

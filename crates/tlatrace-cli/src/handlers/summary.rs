use crate::output::{ReportSink, WriteStatus};
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tlatrace_runtime::{Config, Shutdown, SummaryProgress, SummaryService};

pub fn handle(config: &Config, trace_dir: &Path, shutdown: Shutdown, out: &mut ReportSink) -> Result<()> {
    let service = SummaryService::new(config)?.with_shutdown(shutdown);

    let mut status = WriteStatus::default();
    service
        .run(trace_dir, |event| status.record(render(event, out)))
        .with_context(|| format!("summary of {} failed", trace_dir.display()))?;

    status.into_result().context("failed to write report")
}

/// Report lines for one summary event; shared with `watch`
pub(crate) fn render(event: SummaryProgress, out: &mut ReportSink) -> io::Result<()> {
    match event {
        SummaryProgress::Submitted { files } => {
            log::info!("{} trace files submitted", files);
            out.line("Map finished")
        }
        SummaryProgress::Progress(line) => out.line(line),
        SummaryProgress::Failed { file, error } => {
            match file {
                Some(file) => eprintln!("Warning: skipped {}: {}", file.display(), error),
                None => eprintln!("Warning: {}", error),
            }
            Ok(())
        }
        SummaryProgress::Interrupted => out.line("Interrupted"),
        SummaryProgress::Finished(report) => {
            out.line("Reduce finished")?;
            out.line(report)
        }
    }
}

use super::summary::render;
use crate::output::{ReportSink, WriteStatus};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tlatrace_runtime::{Config, Shutdown, SummaryService, WatchService};

pub fn handle(
    config: &Config,
    trace_dir: &Path,
    poll_interval: Duration,
    shutdown: Shutdown,
    out: &mut ReportSink,
) -> Result<()> {
    let summary = SummaryService::new(config)?.with_shutdown(shutdown);
    let service = WatchService::new(summary).with_poll_interval(poll_interval);

    out.line(format_args!(
        "Watching {} until {} appears",
        trace_dir.display(),
        config.ingest.finish_file
    ))
    .context("failed to write report")?;

    let mut status = WriteStatus::default();
    service
        .run(trace_dir, |event| status.record(render(event, out)))
        .with_context(|| format!("watching {} failed", trace_dir.display()))?;

    status.into_result().context("failed to write report")
}

use crate::output::{ReportSink, WriteStatus};
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tlatrace_runtime::{Config, PathsProgress, PathsService, Shutdown};

pub fn handle(
    config: &Config,
    dot_file: &Path,
    save_dir: Option<&Path>,
    shutdown: Shutdown,
    out: &mut ReportSink,
) -> Result<()> {
    let service = PathsService::new(config).with_shutdown(shutdown);

    let mut status = WriteStatus::default();
    service
        .run(dot_file, save_dir, |event| status.record(render(event, out)))
        .with_context(|| format!("path enumeration over {} failed", dot_file.display()))?;

    status.into_result().context("failed to write report")
}

fn render(event: PathsProgress, out: &mut ReportSink) -> io::Result<()> {
    match event {
        PathsProgress::Loaded {
            roots,
            leaves,
            vertices,
        } => out.line(format_args!(
            "done. root: {}, leaves: {}, vertices: {}",
            roots, leaves, vertices
        )),
        PathsProgress::Submitted { .. } => out.line("Submit finished"),
        PathsProgress::Progress(line) => out.line(line),
        PathsProgress::Failed { pair, error } => {
            match pair {
                Some(pair) => eprintln!("Warning: pair {} failed: {}", pair, error),
                None => eprintln!("Warning: {}", error),
            }
            Ok(())
        }
        PathsProgress::Interrupted => out.line("Interrupted"),
        PathsProgress::Finished(line) => {
            out.line("Map/reduce finished")?;
            out.line(line)
        }
    }
}

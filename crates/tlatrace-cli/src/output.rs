//! Destination for report lines.
//!
//! Progress goes to stdout unless a log file is given, in which case the file
//! is truncated and every line is flushed as it is written so it can be
//! followed while a long run is in progress.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct ReportSink {
    out: Box<dyn Write>,
}

impl ReportSink {
    pub fn new(out: impl Write + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn open(log_file: Option<&Path>) -> io::Result<Self> {
        match log_file {
            Some(path) => Ok(Self::new(BufWriter::new(File::create(path)?))),
            None => Ok(Self::stdout()),
        }
    }

    pub fn line(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}

/// First write error seen while a service runs; the service itself keeps going
#[derive(Debug, Default)]
pub struct WriteStatus {
    error: Option<io::Error>,
}

impl WriteStatus {
    pub fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result
            && self.error.is_none()
        {
            self.error = Some(err);
        }
    }

    pub fn into_result(self) -> io::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

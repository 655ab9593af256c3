use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tlatrace_parser::read_trace;
use tlatrace_runtime::Config;
use tlatrace_types::json::write_states;

pub fn handle(config: &Config, trace_file: &Path, output: Option<&Path>, indent: Option<usize>) -> Result<()> {
    let options = config.reader_options()?;
    let states = read_trace(trace_file, options)
        .with_context(|| format!("failed to read {}", trace_file.display()))?;
    log::debug!("{}: {} states", trace_file.display(), states.len());

    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_states(&states, indent, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_states(&states, indent, &mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

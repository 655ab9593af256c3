use super::args::{Cli, Commands};
use super::handlers;
use crate::output::ReportSink;
use crate::types::LogLevel;
use anyhow::{Context, Result};
use std::time::Duration;
use tlatrace_runtime::{Config, Shutdown};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Commands::Summary {
            trace_dir,
            progress,
            remove,
            finish_file,
            prefix,
        } => {
            progress.apply(&mut config);
            apply_ingest(&mut config, remove, finish_file, prefix);
            let mut out = open_sink(progress.log_file.as_deref())?;
            let shutdown = install_shutdown()?;
            handlers::summary::handle(&config, &trace_dir, shutdown, &mut out)
        }

        Commands::Count {
            trace_dir,
            hash_file,
            reduce_only,
            progress,
        } => {
            progress.apply(&mut config);
            let hash_file = hash_file.unwrap_or_else(|| config.ingest.hash_file.clone());
            let trace_dir = if reduce_only { None } else { trace_dir };
            let mut out = open_sink(progress.log_file.as_deref())?;
            let shutdown = install_shutdown()?;
            handlers::count::handle(&config, trace_dir.as_deref(), &hash_file, shutdown, &mut out)
        }

        Commands::Paths {
            dot_file,
            save_dir,
            progress,
        } => {
            progress.apply(&mut config);
            let mut out = open_sink(progress.log_file.as_deref())?;
            let shutdown = install_shutdown()?;
            handlers::paths::handle(&config, &dot_file, save_dir.as_deref(), shutdown, &mut out)
        }

        Commands::Read {
            trace_file,
            output,
            indent,
            no_actions,
        } => {
            if no_actions {
                config.decoder.track_actions = false;
            }
            handlers::read::handle(&config, &trace_file, output.as_deref(), indent)
        }

        Commands::Watch {
            trace_dir,
            progress,
            remove,
            finish_file,
            prefix,
            poll_ms,
        } => {
            progress.apply(&mut config);
            apply_ingest(&mut config, remove, finish_file, prefix);
            let mut out = open_sink(progress.log_file.as_deref())?;
            let shutdown = install_shutdown()?;
            handlers::watch::handle(
                &config,
                &trace_dir,
                Duration::from_millis(poll_ms),
                shutdown,
                &mut out,
            )
        }
    }
}

fn init_logging(level: LogLevel) {
    // RUST_LOG still wins over --log-level
    let env = env_logger::Env::default().default_filter_or(level.to_string());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn apply_ingest(config: &mut Config, remove: bool, finish_file: Option<String>, prefix: Option<String>) {
    if remove {
        config.ingest.delete_processed = true;
    }
    if let Some(name) = finish_file {
        config.ingest.finish_file = name;
    }
    if let Some(prefix) = prefix {
        config.ingest.trace_prefix = prefix;
    }
}

fn open_sink(log_file: Option<&std::path::Path>) -> Result<ReportSink> {
    ReportSink::open(log_file).with_context(|| match log_file {
        Some(path) => format!("failed to open log file {}", path.display()),
        None => "failed to open stdout".to_string(),
    })
}

fn install_shutdown() -> Result<Shutdown> {
    let shutdown = Shutdown::new();
    shutdown
        .install_ctrlc_handler()
        .context("failed to install Ctrl-C handler")?;
    Ok(shutdown)
}

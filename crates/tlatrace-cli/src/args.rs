use crate::types::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tlatrace_runtime::Config;

#[derive(Parser)]
#[command(name = "tlatrace")]
#[command(about = "Decode, deduplicate and summarize TLC model-checker traces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $TLATRACE_CONFIG, then ~/.config/tlatrace/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that runs a worker pool
#[derive(Args, Debug, Clone, Default)]
pub struct ProgressArgs {
    /// Worker count (default: available parallelism)
    #[arg(short = 'p', long)]
    pub workers: Option<usize>,

    /// Report every N completed jobs, besides the time-based reports
    #[arg(short = 'n', long)]
    pub every: Option<u64>,

    /// Seconds between time-based reports
    #[arg(long)]
    pub period: Option<f64>,

    /// Write progress to this file instead of stdout
    #[arg(short = 'l', long)]
    pub log_file: Option<PathBuf>,
}

impl ProgressArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.pool.workers = Some(workers);
        }
        if let Some(every) = self.every {
            config.progress.every_n_traces = every;
        }
        if let Some(period) = self.period {
            config.progress.period_secs = period;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Distinct states, diameters and actions over a directory of traces
    Summary {
        trace_dir: PathBuf,

        #[command(flatten)]
        progress: ProgressArgs,

        /// Delete each trace once processed (the finish file is kept)
        #[arg(short = 'r', long)]
        remove: bool,

        #[arg(long)]
        finish_file: Option<String>,

        /// File name prefix of trace files
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Unique traces and distinct states through an on-disk hash file
    Count {
        #[arg(required_unless_present = "reduce_only")]
        trace_dir: Option<PathBuf>,

        /// Hash file written by the first pass and read by the second
        #[arg(short = 'f', long)]
        hash_file: Option<PathBuf>,

        /// Skip hashing and count an existing hash file
        #[arg(long)]
        reduce_only: bool,

        #[command(flatten)]
        progress: ProgressArgs,
    },

    /// Enumerate every simple root-to-leaf path of a DOT state graph
    Paths {
        dot_file: PathBuf,

        /// Write each path as a trace file into this directory
        #[arg(short = 's', long)]
        save_dir: Option<PathBuf>,

        #[command(flatten)]
        progress: ProgressArgs,
    },

    /// Decode one trace file or raw TLC output into JSON
    Read {
        trace_file: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Pretty-print with this many spaces
        #[arg(short = 'i', long)]
        indent: Option<usize>,

        /// Leave out the `_action` field
        #[arg(long)]
        no_actions: bool,
    },

    /// Summary over a directory that is still being written, until the finish file appears
    Watch {
        trace_dir: PathBuf,

        #[command(flatten)]
        progress: ProgressArgs,

        #[arg(short = 'r', long)]
        remove: bool,

        #[arg(long)]
        finish_file: Option<String>,

        #[arg(long)]
        prefix: Option<String>,

        /// Directory poll interval in milliseconds
        #[arg(long, default_value = "500")]
        poll_ms: u64,
    },
}

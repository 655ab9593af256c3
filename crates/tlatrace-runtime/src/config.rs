use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tlatrace_engine::ProgressGate;
use tlatrace_parser::{DecoderOptions, ReaderOptions, RenameVariables, decode};

const DEFAULT_PERIOD_SECS: f64 = 5.0;

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TLATRACE_CONFIG environment variable (with tilde expansion)
/// 3. `<config dir>/tlatrace/config.toml`
///
/// `None` when no config directory exists; the defaults apply then.
pub fn resolve_config_path(explicit_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("TLATRACE_CONFIG") {
        return Some(expand_tilde(&env_path));
    }

    dirs::config_dir().map(|dir| dir.join("tlatrace").join("config.toml"))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker count; available parallelism when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl PoolConfig {
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    pub period_secs: f64,
    /// Report every n processed traces; 0 keeps reports time-based
    pub every_n_traces: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            every_n_traces: 0,
        }
    }
}

impl ProgressConfig {
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.period_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_PERIOD_SECS))
    }

    pub fn gate(&self) -> ProgressGate {
        ProgressGate::new(self.period(), self.every_n_traces)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    pub trace_prefix: String,
    /// Written last by the producer; processed but never deleted
    pub finish_file: String,
    pub delete_processed: bool,
    pub hash_file: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            trace_prefix: "trace_".to_string(),
            finish_file: "MC.out".to_string(),
            delete_processed: false,
            hash_file: PathBuf::from("hashfile"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecoderConfig {
    pub track_actions: bool,
    /// Bare identifier -> literal text it stands for
    pub symbols: BTreeMap<String, String>,
    /// Variable renames applied while reading
    pub rename: BTreeMap<String, String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            track_actions: true,
            symbols: BTreeMap::new(),
            rename: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub progress: ProgressConfig,
    pub ingest: IngestConfig,
    pub decoder: DecoderConfig,
}

impl Config {
    /// Load from the resolved path, falling back to defaults
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Immutable reader setup shared by every job
    pub fn reader_options(&self) -> Result<ReaderOptions> {
        let mut decoder = DecoderOptions::default();
        for (name, literal) in &self.decoder.symbols {
            let value = decode(literal)
                .map_err(|e| Error::Config(format!("symbol {} = {:?}: {}", name, literal, e)))?;
            decoder = decoder.with_symbol(name.clone(), value);
        }

        let mut options = ReaderOptions::new()
            .with_decoder(decoder)
            .with_actions(self.decoder.track_actions);
        if !self.decoder.rename.is_empty() {
            let renames: RenameVariables = self
                .decoder
                .rename
                .iter()
                .map(|(from, to)| (from.clone(), to.clone()))
                .collect();
            options = options.with_variable_hook(renames);
        }
        Ok(options)
    }
}

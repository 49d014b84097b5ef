use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// The full runtime configuration for one pass. Everything the pipeline
/// needs arrives through this object; no component reads the environment on
/// its own.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub inbound: InboundConfig,
    pub archive: ArchiveConfig,
    pub gfa: GfaConfig,
    pub lookup: Option<LookupConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

impl RunConfig {
    pub fn trace_loaded(&self) {
        info!(
            inbound_dir = %self.inbound.dir.display(),
            prefix = %self.inbound.prefix,
            originals_dir = %self.archive.originals_dir.display(),
            parsed_dir = %self.archive.parsed_dir.display(),
            data_dir = %self.gfa.data_dir.display(),
            count_dir = %self.gfa.count_dir.display(),
            lookup_configured = self.lookup.is_some(),
            "Loaded RunConfig"
        );
        if let Some(lookup) = &self.lookup {
            lookup.trace_loaded();
        }
        debug!(config = ?self, "RunConfig loaded (full debug)");
    }
}

/// Where arrival files land and how they are recognized.
#[derive(Debug, Serialize, Deserialize)]
pub struct InboundConfig {
    pub dir: PathBuf,
    /// Filename prefix the export drop uses, e.g. `BUL_ANNEX`.
    pub prefix: String,
}

/// Where originals and parsed batches are archived.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub originals_dir: PathBuf,
    pub parsed_dir: PathBuf,
}

/// The GFA hand-off directories. Data and count files go to separate
/// directories swept by the GFA side.
#[derive(Debug, Serialize, Deserialize)]
pub struct GfaConfig {
    pub data_dir: PathBuf,
    pub count_dir: PathBuf,
}

/// The optional pickup-mapper service.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupConfig {
    pub base_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u64,
}

fn default_lookup_timeout() -> u64 {
    10
}

impl LookupConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            timeout_seconds = self.timeout_seconds,
            "Loaded LookupConfig"
        );
    }
}

/// Logging level and optional file destination.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "INFO".to_string(),
            path: None,
        }
    }
}

/// Installs the global tracing subscriber from the loaded log settings.
/// Called once, from `main`, after configuration has been loaded.
pub fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&log.level)
        .map_err(|e| anyhow::anyhow!("invalid log level {:?}: {}", log.level, e))?;
    match &log.path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("cannot open log file {:?}: {}", path, e))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

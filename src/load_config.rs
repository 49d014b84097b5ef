use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use crate::config::RunConfig;

/// Environment override for the log level, e.g. `DEBUG` or `INFO`.
pub const ENV_LOG_LEVEL: &str = "ANNEX_BRIDGE__LOG_LEVEL";
/// Environment override for the log file path.
pub const ENV_LOG_PATH: &str = "ANNEX_BRIDGE__LOG_PATH";

/// Loads the static YAML config file and merges the optional environment
/// overrides for logging. Returns a fully merged RunConfig or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: RunConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        info!(level = %level, "Log level overridden from environment");
        config.log.level = level;
    }
    if let Ok(log_path) = std::env::var(ENV_LOG_PATH) {
        info!(path = %log_path, "Log path overridden from environment");
        config.log.path = Some(PathBuf::from(log_path));
    }

    if config.inbound.prefix.is_empty() {
        error!("inbound.prefix must not be empty");
        anyhow::bail!("inbound.prefix must not be empty");
    }
    if let Some(lookup) = &config.lookup {
        if lookup.base_url.is_empty() {
            error!("lookup.base_url must not be empty when the lookup section is present");
            anyhow::bail!("lookup.base_url must not be empty when the lookup section is present");
        }
    }

    info!(
        inbound_dir = %config.inbound.dir.display(),
        prefix = %config.inbound.prefix,
        "Config loaded and merged successfully"
    );

    Ok(config)
}

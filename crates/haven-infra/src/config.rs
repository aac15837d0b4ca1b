//! Global configuration loader for Haven.
//!
//! Reads `config.toml` from the data directory (`~/.haven/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;
use std::time::Duration;

use haven_types::config::GlobalConfig;

use crate::filesystem::config_path;

/// Upper bound on the simulated counselor reply delay.
const MAX_REPLY_DELAY: Duration = Duration::from_secs(30);

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`GlobalConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            GlobalConfig::default()
        }
    }
}

/// The simulated counselor reply delay, capped at 30 seconds.
pub fn resolve_reply_delay(config: &GlobalConfig) -> Duration {
    Duration::from_millis(config.counselor_reply_delay_ms).min(MAX_REPLY_DELAY)
}

//! Configuration loader for HealthMate.
//!
//! Reads `config.toml` from the data directory (`~/.healthmate/` by default)
//! and deserializes it into [`HealthmateConfig`]. Falls back to sensible
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use healthmate_types::config::{BackendKind, HealthmateConfig, ModelConfig};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HEALTHMATE_DATA_DIR";

/// Environment variable overriding the model directory.
pub const MODEL_DIR_ENV: &str = "HEALTHMATE_MODEL_DIR";

/// Resolve the data directory.
///
/// `HEALTHMATE_DATA_DIR` if set, else `~/.healthmate`, else `./.healthmate`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".healthmate");
    }

    PathBuf::from(".healthmate")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`HealthmateConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(data_dir: &Path) -> HealthmateConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return HealthmateConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return HealthmateConfig::default();
        }
    };

    match toml::from_str::<HealthmateConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            HealthmateConfig::default()
        }
    }
}

/// Command-line overrides for the model section.
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    pub model_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
}

/// Resolve the effective model config.
///
/// Priority (highest first):
/// 1. CLI flags (`--model-dir`, `--backend`)
/// 2. `HEALTHMATE_MODEL_DIR` (model directory only)
/// 3. `[model]` in `config.toml`
pub fn resolve_model_config(
    file: &ModelConfig,
    env_model_dir: Option<String>,
    overrides: &ModelOverrides,
) -> ModelConfig {
    let mut config = file.clone();

    if let Some(dir) = env_model_dir.filter(|d| !d.trim().is_empty()) {
        config.path = PathBuf::from(dir);
    }
    if let Some(dir) = &overrides.model_dir {
        config.path = dir.clone();
    }
    if let Some(backend) = overrides.backend {
        config.backend = backend;
    }

    config
}

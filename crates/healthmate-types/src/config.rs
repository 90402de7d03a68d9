//! Global configuration types for HealthMate.
//!
//! `HealthmateConfig` represents the top-level `config.toml` that selects
//! the generation backend, the model location, and the API server address.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.healthmate/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthmateConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Which generation backend serves the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process inference over a local model directory.
    #[default]
    Local,
    /// An OpenAI-compatible completions server hosting the same model.
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(format!("invalid backend: '{other}'")),
        }
    }
}

/// Compute device selection for the local backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreference {
    /// Use the accelerator when present (f16), else the CPU (f32).
    #[default]
    Auto,
    Cpu,
    Cuda,
}

/// Model location and backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory holding `config.json`, `tokenizer.json` and the
    /// `*.safetensors` weights (local backend).
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub device: DevicePreference,

    /// Base URL of the completions server (remote backend).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent to the completions server (remote backend).
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Environment variable holding the server's API key, if it needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/tinyllama")
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_model_name() -> String {
    "tinyllama".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_model_path(),
            device: DevicePreference::default(),
            base_url: default_base_url(),
            model: default_model_name(),
            api_key_env: None,
        }
    }
}

/// REST API bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Live sessions kept before the least recently used one is evicted.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds of inactivity after which a session is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_sessions() -> usize {
    1000
}

fn default_session_idle_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

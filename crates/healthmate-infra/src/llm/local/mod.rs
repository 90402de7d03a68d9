//! Local backend: in-process Llama-family causal LM via candle.
//!
//! The model directory must contain a HuggingFace-style layout:
//! `config.json`, `tokenizer.json` and one or more `*.safetensors` shards.
//! Loading and generation are CPU/GPU bound and run on the blocking pool.

mod model;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use candle_core::{DType, Device};

use healthmate_core::llm::box_generator::BoxTextGenerator;
use healthmate_core::llm::generator::TextGenerator;
use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::config::DevicePreference;
use healthmate_types::error::{GenerationError, LoadError};
use healthmate_types::llm::{GenerationConfig, GenerationResult};

pub use model::LlamaModel;

/// Files every local model directory must provide.
pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Loads a [`LlamaModel`] from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalModelLoader {
    model_dir: PathBuf,
    device: DevicePreference,
}

impl LocalModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>, device: DevicePreference) -> Self {
        Self {
            model_dir: model_dir.into(),
            device,
        }
    }
}

impl ModelLoader for LocalModelLoader {
    fn describe(&self) -> String {
        format!("local:{}", self.model_dir.display())
    }

    async fn load(&self) -> Result<BoxTextGenerator, LoadError> {
        let dir = self.model_dir.clone();
        let preference = self.device;

        let model = tokio::task::spawn_blocking(move || {
            let files = ModelFiles::discover(&dir)?;
            let (device, dtype) = select_device(preference)?;
            LlamaModel::load(&files, device, dtype)
        })
        .await
        .map_err(|e| LoadError::Backend(format!("model loader task failed: {e}")))??;

        Ok(BoxTextGenerator::new(LocalGenerator {
            model: Arc::new(model),
        }))
    }
}

/// Paths of the files making up a local model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: Vec<PathBuf>,
}

impl ModelFiles {
    /// Check the directory layout without reading any weights.
    pub fn discover(dir: &Path) -> Result<Self, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::ModelNotFound(dir.to_path_buf()));
        }

        let config = dir.join(CONFIG_FILE);
        if !config.is_file() {
            return Err(LoadError::MissingFile(config));
        }

        let tokenizer = dir.join(TOKENIZER_FILE);
        if !tokenizer.is_file() {
            return Err(LoadError::MissingFile(tokenizer));
        }

        let entries = std::fs::read_dir(dir)
            .map_err(|e| LoadError::Weights(format!("cannot list {}: {e}", dir.display())))?;
        let mut weights: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "safetensors"))
            .collect();
        weights.sort();

        if weights.is_empty() {
            return Err(LoadError::MissingFile(dir.join("model.safetensors")));
        }

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}

/// Pick the compute device and weight precision.
///
/// CUDA runs in f16, CPU in f32.
fn select_device(preference: DevicePreference) -> Result<(Device, DType), LoadError> {
    let device = match preference {
        DevicePreference::Cpu => Device::Cpu,
        DevicePreference::Cuda => {
            Device::new_cuda(0).map_err(|e| LoadError::Device(e.to_string()))?
        }
        DevicePreference::Auto => {
            Device::cuda_if_available(0).map_err(|e| LoadError::Device(e.to_string()))?
        }
    };
    let dtype = if device.is_cuda() { DType::F16 } else { DType::F32 };
    tracing::info!(device = ?device, dtype = ?dtype, "Selected compute device");
    Ok((device, dtype))
}

/// [`TextGenerator`] over a loaded [`LlamaModel`].
///
/// Cheap to clone; every call runs on the blocking pool with its own KV cache.
#[derive(Clone)]
pub struct LocalGenerator {
    model: Arc<LlamaModel>,
}

impl TextGenerator for LocalGenerator {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult, GenerationError> {
        let model = Arc::clone(&self.model);
        let prompt = prompt.to_string();
        let config = config.clone();
        let seed = sampling_seed();

        tokio::task::spawn_blocking(move || model.generate(&prompt, &config, seed))
            .await
            .map_err(|e| GenerationError::WorkerPanicked(e.to_string()))?
    }
}

fn sampling_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(299_792_458)
}

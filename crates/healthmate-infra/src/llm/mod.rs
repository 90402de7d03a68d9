//! Generation backends and the factory that picks one from config.

pub mod local;
pub mod remote;

use healthmate_core::llm::box_generator::BoxTextGenerator;
use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::config::{BackendKind, ModelConfig};
use healthmate_types::error::LoadError;

use self::local::LocalModelLoader;
use self::remote::RemoteModelLoader;

/// The configured generation backend.
///
/// An enum rather than a trait object: `ModelLoader` uses RPITIT and is not
/// object-safe, and the set of backends is closed.
#[derive(Debug, Clone)]
pub enum ModelBackend {
    Local(LocalModelLoader),
    Remote(RemoteModelLoader),
}

impl ModelBackend {
    /// Build the loader described by the resolved model config.
    pub fn from_config(config: &ModelConfig) -> Self {
        match config.backend {
            BackendKind::Local => {
                ModelBackend::Local(LocalModelLoader::new(config.path.clone(), config.device))
            }
            BackendKind::Remote => ModelBackend::Remote(RemoteModelLoader::new(
                config.base_url.clone(),
                config.model.clone(),
                config.api_key_env.clone(),
            )),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ModelBackend::Local(_) => BackendKind::Local,
            ModelBackend::Remote(_) => BackendKind::Remote,
        }
    }
}

impl ModelLoader for ModelBackend {
    fn describe(&self) -> String {
        match self {
            ModelBackend::Local(loader) => loader.describe(),
            ModelBackend::Remote(loader) => loader.describe(),
        }
    }

    async fn load(&self) -> Result<BoxTextGenerator, LoadError> {
        match self {
            ModelBackend::Local(loader) => loader.load().await,
            ModelBackend::Remote(loader) => loader.load().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use healthmate_core::llm::provider::ModelProvider;
    use healthmate_types::llm::ModelStatus;

    #[test]
    fn test_from_config_local_default() {
        let backend = ModelBackend::from_config(&ModelConfig::default());
        assert_eq!(backend.kind(), BackendKind::Local);
        assert_eq!(backend.describe(), "local:models/tinyllama");
    }

    #[test]
    fn test_from_config_remote() {
        let config = ModelConfig {
            backend: BackendKind::Remote,
            base_url: "http://gpu-box:8000/v1".to_string(),
            model: "TinyLlama/TinyLlama-1.1B-Chat-v1.0".to_string(),
            ..ModelConfig::default()
        };
        let backend = ModelBackend::from_config(&config);
        assert_eq!(backend.kind(), BackendKind::Remote);
        assert!(backend.describe().contains("gpu-box:8000"));
    }

    #[tokio::test]
    async fn test_provider_reports_failed_local_load() {
        let config = ModelConfig {
            path: PathBuf::from("/definitely/not/a/model/dir"),
            ..ModelConfig::default()
        };
        let provider = ModelProvider::new(ModelBackend::from_config(&config));

        let err = provider.get().await.unwrap_err();
        assert!(matches!(err, LoadError::ModelNotFound(_)));
        assert!(!provider.is_loaded());
        assert!(matches!(provider.status(), ModelStatus::Failed { .. }));
    }
}

//! Model provider: the single initialization point for the model handle.
//!
//! The model is loaded on first use and the resulting [`BoxTextGenerator`]
//! is cached for the rest of the process. A failed load is not cached, so
//! a later access tries again.

use std::sync::RwLock;

use tokio::sync::OnceCell;
use tracing::{error, info};

use healthmate_types::error::LoadError;
use healthmate_types::llm::ModelStatus;

use super::box_generator::BoxTextGenerator;

/// Trait for loading a generation backend.
///
/// Implementations live in healthmate-infra.
pub trait ModelLoader: Send + Sync {
    /// Short description of what will be loaded (backend and location).
    fn describe(&self) -> String;

    /// Load the tokenizer and model and return a generation handle.
    fn load(&self) -> impl std::future::Future<Output = Result<BoxTextGenerator, LoadError>> + Send;
}

/// Process-wide, lazily initialized model handle.
///
/// Share one `ModelProvider` (behind an `Arc`) across every chat session;
/// the handle it hands out is read-only.
pub struct ModelProvider<L> {
    loader: L,
    handle: OnceCell<BoxTextGenerator>,
    last_error: RwLock<Option<String>>,
}

impl<L: ModelLoader> ModelProvider<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            handle: OnceCell::new(),
            last_error: RwLock::new(None),
        }
    }

    /// Return the cached handle, loading the model on first use.
    ///
    /// Concurrent first callers wait on the same load.
    pub async fn get(&self) -> Result<BoxTextGenerator, LoadError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let target = self.loader.describe();
                info!(target = %target, "Loading model");
                match self.loader.load().await {
                    Ok(generator) => {
                        info!(backend = generator.name(), "Model loaded");
                        self.set_last_error(None);
                        Ok(generator)
                    }
                    Err(e) => {
                        error!(target = %target, error = %e, "Model load failed");
                        self.set_last_error(Some(e.to_string()));
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(handle.clone())
    }

    /// Whether a handle is cached.
    pub fn is_loaded(&self) -> bool {
        self.handle.initialized()
    }

    /// Current load state, for display.
    pub fn status(&self) -> ModelStatus {
        if let Some(handle) = self.handle.get() {
            return ModelStatus::Ready {
                backend: handle.name().to_string(),
            };
        }
        match self.last_error.read().ok().and_then(|guard| guard.clone()) {
            Some(message) => ModelStatus::Failed { message },
            None => ModelStatus::NotLoaded,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn set_last_error(&self, message: Option<String>) {
        if let Ok(mut guard) = self.last_error.write() {
            *guard = message;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock loader and generator shared by the chat tests.

    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use healthmate_types::error::{GenerationError, LoadError};
    use healthmate_types::llm::{GenerationConfig, GenerationResult};

    use crate::llm::box_generator::BoxTextGenerator;
    use crate::llm::generator::TextGenerator;

    use super::ModelLoader;

    /// Generator that echoes the prompt followed by a canned reply, and
    /// records every prompt it receives.
    pub struct CannedGenerator {
        pub reply: Result<String, String>,
        pub prompts: Arc<Mutex<Vec<String>>>,
        pub echo_prompt: bool,
    }

    impl CannedGenerator {
        pub fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
                echo_prompt: true,
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
                echo_prompt: true,
            }
        }
    }

    impl TextGenerator for CannedGenerator {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(
            &self,
            prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<GenerationResult, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(GenerationResult {
                    generated_text: if self.echo_prompt {
                        format!("{prompt}{reply}")
                    } else {
                        reply.clone()
                    },
                }),
                Err(message) => Err(GenerationError::Inference(message.clone())),
            }
        }
    }

    /// Loader that fails while `broken` is set and counts load attempts.
    pub struct MockLoader {
        pub reply: Result<String, String>,
        pub broken: AtomicBool,
        pub loads: AtomicUsize,
        pub prompts: Arc<Mutex<Vec<String>>>,
    }

    impl MockLoader {
        pub fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                broken: AtomicBool::new(false),
                loads: AtomicUsize::new(0),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn broken() -> Self {
            let loader = Self::ok("unused");
            loader.broken.store(true, Ordering::SeqCst);
            loader
        }

        pub fn generation_failure(message: &str) -> Self {
            let mut loader = Self::ok("unused");
            loader.reply = Err(message.to_string());
            loader
        }

        pub fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    impl ModelLoader for MockLoader {
        fn describe(&self) -> String {
            "mock:/models/test".to_string()
        }

        async fn load(&self) -> Result<BoxTextGenerator, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.broken.load(Ordering::SeqCst) {
                return Err(LoadError::ModelNotFound("/models/test".into()));
            }
            Ok(BoxTextGenerator::new(CannedGenerator {
                reply: self.reply.clone(),
                prompts: self.prompts.clone(),
                echo_prompt: true,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::testing::MockLoader;
    use super::*;

    #[tokio::test]
    async fn test_loads_once_and_caches() {
        let provider = ModelProvider::new(MockLoader::ok("hi"));
        assert_eq!(provider.status(), ModelStatus::NotLoaded);
        assert!(!provider.is_loaded());

        provider.get().await.unwrap();
        provider.get().await.unwrap();
        provider.get().await.unwrap();

        assert_eq!(provider.loader().load_count(), 1);
        assert!(provider.is_loaded());
        assert_eq!(
            provider.status(),
            ModelStatus::Ready {
                backend: "canned".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_and_retried() {
        let provider = ModelProvider::new(MockLoader::broken());

        let err = provider.get().await.unwrap_err();
        assert!(matches!(err, LoadError::ModelNotFound(_)));
        assert!(matches!(provider.status(), ModelStatus::Failed { .. }));
        assert!(!provider.is_loaded());

        // Still failing: another attempt is made, not a cached error.
        assert!(provider.get().await.is_err());
        assert_eq!(provider.loader().load_count(), 2);

        // Path fixed: the next access succeeds and the failure is cleared.
        provider.loader().broken.store(false, Ordering::SeqCst);
        provider.get().await.unwrap();
        assert!(provider.status().is_ready());
        assert_eq!(provider.loader().load_count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_loads_once() {
        let provider = Arc::new(ModelProvider::new(MockLoader::ok("hi")));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let provider = provider.clone();
            tasks.push(tokio::spawn(async move { provider.get().await.is_ok() }));
        }
        for task in tasks {
            assert!(task.await.unwrap());
        }

        assert_eq!(provider.loader().load_count(), 1);
    }
}

//! BoxTextGenerator -- object-safe dynamic dispatch wrapper for TextGenerator.
//!
//! 1. Define an object-safe `TextGeneratorDyn` trait with boxed futures
//! 2. Blanket-impl `TextGeneratorDyn` for all `T: TextGenerator`
//! 3. `BoxTextGenerator` wraps `Arc<dyn TextGeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use healthmate_types::error::GenerationError;
use healthmate_types::llm::{GenerationConfig, GenerationResult};

use super::generator::TextGenerator;

/// Object-safe version of [`TextGenerator`] with boxed futures.
pub trait TextGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        config: &'a GenerationConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, GenerationError>> + Send + 'a>>;
}

impl<T: TextGenerator> TextGeneratorDyn for T {
    fn name(&self) -> &str {
        TextGenerator::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        config: &'a GenerationConfig,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate(prompt, config))
    }
}

/// Type-erased generation handle.
///
/// Clones share the same underlying backend, so one loaded model can serve
/// every chat session in the process.
#[derive(Clone)]
pub struct BoxTextGenerator {
    inner: Arc<dyn TextGeneratorDyn>,
}

impl BoxTextGenerator {
    /// Wrap a concrete `TextGenerator`.
    pub fn new<T: TextGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Arc::new(generator),
        }
    }

    /// Human-readable backend name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Generate a continuation of `prompt`.
    pub async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult, GenerationError> {
        self.inner.generate_boxed(prompt, config).await
    }
}

impl std::fmt::Debug for BoxTextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxTextGenerator")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResult, GenerationError> {
            Ok(GenerationResult {
                generated_text: format!("{prompt}[{}]", config.max_new_tokens),
            })
        }
    }

    #[tokio::test]
    async fn test_box_delegates_to_inner() {
        let generator = BoxTextGenerator::new(EchoGenerator);
        assert_eq!(generator.name(), "echo");

        let result = generator
            .generate("hi", &GenerationConfig::healthmate())
            .await
            .unwrap();
        assert_eq!(result.generated_text, "hi[250]");
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let a = BoxTextGenerator::new(EchoGenerator);
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }
}

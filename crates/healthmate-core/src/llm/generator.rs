//! TextGenerator trait definition.
//!
//! This is the black-box boundary to the inference engine: a prompt and
//! sampling parameters go in, generated text comes out.

use healthmate_types::error::GenerationError;
use healthmate_types::llm::{GenerationConfig, GenerationResult};

/// Trait for text-generation backends (local weights, completions server).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap in
/// [`super::box_generator::BoxTextGenerator`] for dynamic dispatch.
///
/// Implementations live in healthmate-infra.
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "local", "remote").
    fn name(&self) -> &str;

    /// Generate a continuation of `prompt`.
    ///
    /// The returned text echoes the prompt followed by the continuation.
    fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> impl std::future::Future<Output = Result<GenerationResult, GenerationError>> + Send;
}

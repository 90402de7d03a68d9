use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the model and tokenizer.
///
/// Cloneable so the model provider can report the last failure without
/// holding on to the original error.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("model directory not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("required model file missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid model config: {0}")]
    InvalidConfig(String),

    #[error("failed to load tokenizer: {0}")]
    Tokenizer(String),

    #[error("failed to load model weights: {0}")]
    Weights(String),

    #[error("compute device unavailable: {0}")]
    Device(String),

    #[error("generation backend unavailable: {0}")]
    Backend(String),
}

/// Errors raised by a single generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to decode generated tokens: {0}")]
    Decode(String),

    #[error("backend error (status {status:?}): {message}")]
    Backend { status: Option<u16>, message: String },

    #[error("generation worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Errors surfaced to the user for one chat submission.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("no quick question at index {index} (there are {count})")]
    InvalidQuickQuestion { index: usize, count: usize },
}

//! Text-generation request/response types for HealthMate.
//!
//! These model the data shapes crossing the generation backend boundary:
//! the sampling parameters, the prompt pieces, and the raw backend output.

use serde::{Deserialize, Serialize};

/// Sampling parameters passed to the generation backend.
///
/// HealthMate always generates with [`GenerationConfig::healthmate`]; the
/// values are fixed for behavioral parity and are not user-configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of tokens generated after the prompt.
    pub max_new_tokens: usize,
    /// Sample from the distribution (`false` means greedy decoding).
    pub do_sample: bool,
    pub temperature: f64,
    pub top_p: f64,
    /// Penalty applied to logits of tokens already present in the context.
    pub repetition_penalty: f32,
    /// Stop on, and pad with, the model's end-of-sequence token.
    pub stop_at_eos: bool,
}

impl GenerationConfig {
    /// The fixed parameters every HealthMate reply is generated with.
    pub const fn healthmate() -> Self {
        Self {
            max_new_tokens: 250,
            do_sample: true,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.2,
            stop_at_eos: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::healthmate()
    }
}

/// The pieces a prompt is built from.
///
/// Only the latest user utterance is carried; earlier turns never reach
/// the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_utterance: String,
}

/// Raw output of a generation backend.
///
/// Like a text-generation pipeline, `generated_text` echoes the prompt
/// followed by the newly generated continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub generated_text: String,
}

/// Load state of the process-wide model handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    /// No load has been attempted yet.
    NotLoaded,
    /// A handle is cached and ready.
    Ready { backend: String },
    /// The most recent load attempt failed.
    Failed { message: String },
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthmate_parameters() {
        let config = GenerationConfig::healthmate();
        assert_eq!(config.max_new_tokens, 250);
        assert!(config.do_sample);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
        assert!((config.top_p - 0.9).abs() < f64::EPSILON);
        assert!((config.repetition_penalty - 1.2).abs() < f32::EPSILON);
        assert!(config.stop_at_eos);
    }

    #[test]
    fn test_default_is_healthmate() {
        assert_eq!(GenerationConfig::default(), GenerationConfig::healthmate());
    }

    #[test]
    fn test_model_status_serde() {
        let status = ModelStatus::Ready {
            backend: "local".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"state":"ready","backend":"local"}"#);
        assert!(status.is_ready());

        let json = serde_json::to_string(&ModelStatus::NotLoaded).unwrap();
        assert_eq!(json, r#"{"state":"not_loaded"}"#);
    }
}

//! Response generator: one utterance in, one reply out.
//!
//! Pipeline: emergency check -> prompt -> single generation call ->
//! extraction -> optional banner. Only the given utterance reaches the
//! model; earlier turns are never part of the prompt.

use tracing::{Instrument, debug, info_span, warn};

use healthmate_types::error::GenerationError;
use healthmate_types::llm::GenerationConfig;

use crate::llm::box_generator::BoxTextGenerator;

use super::prompt::{build_prompt, extract_reply, generation_request};
use super::triage::{is_emergency, with_banner};

/// Reply used when the model produced nothing after the assistant marker.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I couldn't come up with an answer. Please try rephrasing your question.";

/// Turns utterances into assistant replies using a loaded model.
pub struct ResponseGenerator {
    generator: BoxTextGenerator,
    config: GenerationConfig,
}

impl ResponseGenerator {
    /// Create a generator using the fixed HealthMate sampling parameters.
    pub fn new(generator: BoxTextGenerator) -> Self {
        Self {
            generator,
            config: GenerationConfig::healthmate(),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Produce the reply for `utterance`.
    ///
    /// Makes exactly one generation attempt; a backend failure is returned
    /// as-is.
    pub async fn respond(&self, utterance: &str) -> Result<String, GenerationError> {
        let emergency = is_emergency(utterance);
        if emergency {
            warn!("Emergency keyword detected in utterance");
        }

        let prompt = build_prompt(&generation_request(utterance));

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.system = self.generator.name(),
            gen_ai.request.max_tokens = self.config.max_new_tokens,
            gen_ai.request.temperature = self.config.temperature,
            gen_ai.request.top_p = self.config.top_p,
            healthmate.emergency = emergency,
        );

        let result = self
            .generator
            .generate(&prompt, &self.config)
            .instrument(span)
            .await?;

        let mut reply = extract_reply(&result.generated_text);
        if reply.is_empty() {
            debug!("Model returned an empty reply, using fallback text");
            reply = EMPTY_REPLY_FALLBACK;
        }

        Ok(if emergency {
            with_banner(reply)
        } else {
            reply.to_string()
        })
    }
}

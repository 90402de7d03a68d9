//! Prompt template and reply extraction.
//!
//! The model was trained on `<|system|>` / `<|user|>` / `<|assistant|>`
//! turn markers, each block closed by `<|end|>`. The utterance is inserted
//! verbatim: a user who types a marker can shift the model's turn
//! boundaries. That is a known limitation of the template.

use healthmate_types::llm::GenerationRequest;

pub const SYSTEM_MARKER: &str = "<|system|>\n";
pub const USER_MARKER: &str = "<|user|>\n";
pub const ASSISTANT_MARKER: &str = "<|assistant|>\n";
pub const END_MARKER: &str = "<|end|>\n";

/// Instruction placed in the system block of every prompt.
pub const SYSTEM_INSTRUCTION: &str =
    "You are HealthMate AI, a medical assistant. Provide clear info and a disclaimer.";

/// Build the generation request for one utterance.
pub fn generation_request(utterance: &str) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        user_utterance: utterance.to_string(),
    }
}

/// Render the prompt: system block, user block, open assistant block.
pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "{SYSTEM_MARKER}{}{END_MARKER}{USER_MARKER}{}{END_MARKER}{ASSISTANT_MARKER}",
        request.system_instruction, request.user_utterance
    )
}

/// Keep what follows the last assistant marker, trimmed.
///
/// Without a marker (the model ignored the template) the whole text is used.
pub fn extract_reply(generated_text: &str) -> &str {
    let reply = match generated_text.rfind(ASSISTANT_MARKER) {
        Some(pos) => &generated_text[pos + ASSISTANT_MARKER.len()..],
        None => generated_text,
    };
    reply.trim()
}

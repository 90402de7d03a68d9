//! Wire types for the OpenAI-compatible `/completions` endpoint.

use serde::{Deserialize, Serialize};

use healthmate_types::llm::GenerationConfig;

/// Request body for `POST {base_url}/completions`.
///
/// `repetition_penalty` is a vLLM / TGI extension; llama.cpp reads
/// `repeat_penalty` instead, so both are sent.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: usize,
    pub temperature: f64,
    pub top_p: f64,
    pub repetition_penalty: f32,
    pub repeat_penalty: f32,
    pub stream: bool,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, config: &GenerationConfig) -> Self {
        // Greedy decoding is expressed as temperature 0 on this API.
        let temperature = if config.do_sample { config.temperature } else { 0.0 };
        Self {
            model,
            prompt,
            max_tokens: config.max_new_tokens,
            temperature,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
            repeat_penalty: config.repetition_penalty,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

/// Error body returned by most OpenAI-compatible servers.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

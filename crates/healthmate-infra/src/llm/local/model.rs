use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::llama::{Cache, Config, Llama, LlamaConfig, LlamaEosToks};
use candle_transformers::utils::apply_repeat_penalty;
use tokenizers::Tokenizer;
use tracing::debug;

use healthmate_types::error::{GenerationError, LoadError};
use healthmate_types::llm::{GenerationConfig, GenerationResult};

use super::ModelFiles;

/// End-of-sequence token used when `config.json` does not name one.
const FALLBACK_EOS: &str = "</s>";

/// A loaded Llama model with its tokenizer. Read-only after load.
pub struct LlamaModel {
    llama: Llama,
    config: Config,
    tokenizer: Tokenizer,
    device: Device,
    dtype: DType,
    eos_token_ids: Vec<u32>,
}

impl LlamaModel {
    pub fn load(files: &ModelFiles, device: Device, dtype: DType) -> Result<Self, LoadError> {
        let raw = std::fs::read(&files.config)
            .map_err(|e| LoadError::InvalidConfig(format!("{}: {e}", files.config.display())))?;
        let llama_config: LlamaConfig =
            serde_json::from_slice(&raw).map_err(|e| LoadError::InvalidConfig(e.to_string()))?;
        let config = llama_config.into_config(false);

        let tokenizer =
            Tokenizer::from_file(&files.tokenizer).map_err(|e| LoadError::Tokenizer(e.to_string()))?;

        // SAFETY: the safetensors files are memory-mapped read-only and not
        // modified while the model is alive.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&files.weights, dtype, &device) }
            .map_err(|e| LoadError::Weights(e.to_string()))?;
        let llama = Llama::load(vb, &config).map_err(|e| LoadError::Weights(e.to_string()))?;

        let eos_token_ids = match &config.eos_token_id {
            Some(LlamaEosToks::Single(id)) => vec![*id],
            Some(LlamaEosToks::Multiple(ids)) => ids.clone(),
            None => tokenizer.token_to_id(FALLBACK_EOS).into_iter().collect(),
        };

        Ok(Self {
            llama,
            config,
            tokenizer,
            device,
            dtype,
            eos_token_ids,
        })
    }

    /// Run one blocking generation.
    ///
    /// The returned text is the prompt followed by the decoded continuation.
    pub fn generate(
        &self,
        prompt: &str,
        params: &GenerationConfig,
        seed: u64,
    ) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();

        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| GenerationError::Tokenization(e.to_string()))?;
        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();
        check_prompt_fits(prompt_len, self.config.max_position_embeddings)?;

        let mut cache =
            Cache::new(true, self.dtype, &self.config, &self.device).map_err(inference)?;
        let sampling = if params.do_sample {
            Sampling::TopP {
                p: params.top_p,
                temperature: params.temperature,
            }
        } else {
            Sampling::ArgMax
        };
        let mut logits_processor = LogitsProcessor::from_sampling(seed, sampling);

        let mut index_pos = 0;
        for step in 0..params.max_new_tokens {
            if tokens.len() >= self.config.max_position_embeddings {
                debug!(tokens = tokens.len(), "Context window full, stopping");
                break;
            }

            let context_size = if step > 0 { 1 } else { tokens.len() };
            let context = &tokens[tokens.len().saturating_sub(context_size)..];
            let input = Tensor::new(context, &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(inference)?;
            let logits = self
                .llama
                .forward(&input, index_pos, &mut cache)
                .and_then(|l| l.squeeze(0))
                .and_then(|l| l.to_dtype(DType::F32))
                .map_err(inference)?;
            index_pos += context.len();

            let logits = if params.repetition_penalty == 1.0 {
                logits
            } else {
                apply_repeat_penalty(&logits, params.repetition_penalty, &tokens).map_err(inference)?
            };

            let next = logits_processor.sample(&logits).map_err(inference)?;
            if params.stop_at_eos && self.eos_token_ids.contains(&next) {
                break;
            }
            tokens.push(next);
        }

        let continuation = self
            .tokenizer
            .decode(&tokens[prompt_len..], true)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let generated = tokens.len() - prompt_len;
        let elapsed = started.elapsed();
        debug!(
            prompt_tokens = prompt_len,
            generated_tokens = generated,
            tokens_per_sec = generated as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            "Local generation finished"
        );

        Ok(GenerationResult {
            generated_text: format!("{prompt}{continuation}"),
        })
    }
}

fn inference(e: candle_core::Error) -> GenerationError {
    GenerationError::Inference(e.to_string())
}

/// Reject a prompt that leaves no room in the context window for a reply.
fn check_prompt_fits(prompt_tokens: usize, max_positions: usize) -> Result<(), GenerationError> {
    if prompt_tokens >= max_positions {
        return Err(GenerationError::Inference(format!(
            "prompt exceeds context window ({prompt_tokens} tokens, limit {max_positions})"
        )));
    }
    Ok(())
}

//! Infrastructure layer for HealthMate.
//!
//! Contains implementations of the generation ports defined in
//! `healthmate-core`: in-process inference over a local model directory
//! (candle), an OpenAI-compatible completions client, and the
//! configuration/data-directory loaders.

pub mod config;
pub mod llm;

//! Conversation pipeline and generation ports for HealthMate.
//!
//! This crate defines the "ports" (generator and loader traits) that the
//! infrastructure layer implements, plus the pipeline logic built on them.
//! It depends only on `healthmate-types` -- never on `healthmate-infra`.

pub mod chat;
pub mod llm;

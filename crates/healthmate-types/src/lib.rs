//! Shared domain types for HealthMate.
//!
//! This crate contains the types shared by every layer of the workspace:
//! chat turns, generation parameters, configuration, and the error enums
//! for model loading, generation, and chat sessions.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;

//! The HealthMate conversation pipeline.
//!
//! - `triage`: emergency keyword detection and the alert banner
//! - `prompt`: prompt template and reply extraction
//! - `conversation`: the per-session, append-only turn store
//! - `responder`: one utterance in, one post-processed reply out
//! - `session`: submit/clear event handling over a conversation
//! - `shortcuts`: canned quick questions and inert quick actions

pub mod conversation;
pub mod prompt;
pub mod responder;
pub mod session;
pub mod shortcuts;
pub mod triage;

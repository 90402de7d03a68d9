//! HTTP/REST API layer for HealthMate.
//!
//! Axum-based JSON API at `/api/v1/` with the envelope response format and
//! permissive CORS.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

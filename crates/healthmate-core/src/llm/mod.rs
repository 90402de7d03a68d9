//! Text generation abstractions for HealthMate.
//!
//! - `TextGenerator`: RPITIT trait for concrete generation backends
//! - `BoxTextGenerator`: object-safe, cheaply cloneable wrapper
//! - `ModelProvider`: initialize-once holder of the process-wide handle

pub mod box_generator;
pub mod generator;
pub mod provider;

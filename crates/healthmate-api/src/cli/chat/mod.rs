//! Interactive terminal chat for HealthMate.
//!
//! Welcome banner, greeting, async line input, a spinner while the model
//! generates, markdown-rendered replies and slash commands. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

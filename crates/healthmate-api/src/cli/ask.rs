//! One-shot `healthmate ask`.

use std::time::Instant;

use healthmate_core::chat::session::ChatSession;
use healthmate_core::llm::provider::ModelLoader;

use crate::cli::chat::renderer::ChatRenderer;
use crate::cli::spinner;
use crate::state::AppState;

/// Ask a single question in a fresh, greeting-less session and print the reply.
///
/// Any load or generation failure is returned, so the process exits non-zero.
pub async fn ask<L: ModelLoader>(
    state: &AppState<L>,
    question: &str,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut session = ChatSession::empty();

    let thinking = (!json && !quiet).then(|| spinner("thinking..."));
    let started = Instant::now();
    let result = session.on_submit(&state.provider, question).await;
    if let Some(thinking) = thinking {
        thinking.finish_and_clear();
    }
    let view = result?;
    let elapsed = started.elapsed().as_millis() as u64;

    if json {
        let output = serde_json::json!({
            "question": question,
            "reply": view.reply,
            "response_time_ms": elapsed,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ChatRenderer::new().print_reply(&view.reply, elapsed);
    }

    Ok(())
}

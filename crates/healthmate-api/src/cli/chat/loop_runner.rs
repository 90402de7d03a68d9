//! Main chat loop orchestration.
//!
//! Loads the model up front so a load failure is shown once in the banner,
//! then keeps reading input. A failed load is retried on the next message.

use std::time::Instant;

use console::style;

use healthmate_core::chat::session::ChatSession;
use healthmate_core::chat::shortcuts::{QuickAction, quick_question};
use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::error::ChatError;

use crate::cli::spinner;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Something to hand to the session.
enum Submission<'a> {
    Text(&'a str),
    /// Zero-based quick question index.
    Quick(usize),
}

/// Run the interactive chat loop until Ctrl+D or `/exit`.
pub async fn run_chat_loop<L: ModelLoader>(state: &AppState<L>) -> anyhow::Result<()> {
    let mut session = ChatSession::new();
    let renderer = ChatRenderer::new();

    let loading = spinner("loading model...");
    let load = state.provider.get().await;
    loading.finish_and_clear();

    print_welcome_banner(
        &state.provider.loader().describe(),
        &state.provider.status(),
        &session.id().to_string(),
    );
    if let Err(e) = &load {
        eprintln!("  {} Model unavailable: {e}", style("!").red().bold());
        eprintln!(
            "  {}",
            style("Check --model-dir or HEALTHMATE_MODEL_DIR. Messages will retry the load.").dim()
        );
        eprintln!();
    }

    for turn in session.turns() {
        renderer.print_turn(turn);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Take care! Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        let Some(command) = commands::parse(&text) else {
            submit(state, &mut session, &renderer, Submission::Text(&text)).await;
            continue;
        };

        match command {
            ChatCommand::Help => commands::print_help(),
            ChatCommand::Quick(None) => commands::print_quick_questions(),
            ChatCommand::Quick(Some(n)) => {
                submit(state, &mut session, &renderer, Submission::Quick(n - 1)).await;
            }
            ChatCommand::Clear => {
                session.clear();
                chat_input.clear_screen();
                println!("  {}", style("Conversation cleared.").dim());
                println!();
            }
            ChatCommand::History => {
                println!();
                if session.turns().is_empty() {
                    println!("  {}", style("No messages yet.").dim());
                    println!();
                }
                for turn in session.turns() {
                    renderer.print_turn(turn);
                }
            }
            ChatCommand::Hospitals => print_notice(&session, QuickAction::Hospitals),
            ChatCommand::Emergency => print_notice(&session, QuickAction::Emergency),
            ChatCommand::Exit => {
                println!("\n  {}", style("Take care! Session ended.").dim());
                break;
            }
            ChatCommand::Unknown(name) => {
                println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                );
            }
        }
    }

    tracing::info!(session_id = %session.id(), turns = session.turns().len(), "Chat ended");
    Ok(())
}

async fn submit<L: ModelLoader>(
    state: &AppState<L>,
    session: &mut ChatSession,
    renderer: &ChatRenderer,
    submission: Submission<'_>,
) {
    let thinking = spinner("thinking...");
    let started = Instant::now();

    let result = match submission {
        Submission::Text(text) => session.on_submit(&state.provider, text).await,
        Submission::Quick(index) => {
            if let Some(label) = quick_question(index) {
                thinking.println(format!("  {} {label}", style("You >").green().bold()));
            }
            session.on_quick_question(&state.provider, index).await
        }
    };
    thinking.finish_and_clear();

    match result {
        Ok(view) => {
            let elapsed = started.elapsed().as_millis() as u64;
            renderer.print_reply(&view.reply, elapsed);
        }
        Err(ChatError::Load(e)) => {
            eprintln!("\n  {} Model unavailable: {e}\n", style("!").red().bold());
        }
        Err(ChatError::Generation(e)) => {
            eprintln!("\n  {} Could not generate a reply: {e}", style("!").red().bold());
            eprintln!("  {}", style("Type a message to retry, /exit to quit.").dim());
            eprintln!();
        }
        Err(e @ ChatError::InvalidQuickQuestion { .. }) => {
            eprintln!("\n  {} {e}\n", style("?").yellow().bold());
        }
    }
}

fn print_notice(session: &ChatSession, action: QuickAction) {
    let notice = session.on_quick_action(action);
    let styled = match action {
        QuickAction::Emergency => style(notice).red().bold(),
        QuickAction::Hospitals => style(notice).cyan(),
    };
    println!("\n  {styled}\n");
}

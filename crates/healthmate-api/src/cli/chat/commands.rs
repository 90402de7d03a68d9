//! Slash command parsing for the chat loop.

use console::style;

use healthmate_core::chat::shortcuts::QUICK_QUESTIONS;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// `/quick` lists the quick questions; `/quick n` sends number `n` (1-based).
    Quick(Option<usize>),
    /// Drop every turn and clear the screen.
    Clear,
    History,
    Hospitals,
    Emergency,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/quick" | "/qq" => match arg {
            None => ChatCommand::Quick(None),
            Some(n) => match n.parse::<usize>() {
                Ok(n) if (1..=QUICK_QUESTIONS.len()).contains(&n) => ChatCommand::Quick(Some(n)),
                _ => ChatCommand::Unknown(format!(
                    "/quick expects a number from 1 to {}",
                    QUICK_QUESTIONS.len()
                )),
            },
        },
        "/clear" | "/cls" => ChatCommand::Clear,
        "/history" => ChatCommand::History,
        "/hospitals" | "/hospital" => ChatCommand::Hospitals,
        "/emergency" | "/sos" => ChatCommand::Emergency,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/quick [n]", "List quick questions, or send number n"),
        ("/clear", "Clear the conversation"),
        ("/history", "Show the conversation so far"),
        ("/hospitals", "Find hospitals"),
        ("/emergency", "Emergency contact number"),
        ("/exit", "End the chat"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, description) in rows {
        println!("  {:<12} {}", style(command).cyan(), description);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}

pub fn print_quick_questions() {
    println!();
    println!("  {}", style("Quick questions:").bold());
    for (i, label) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  {} {label}", style(format!("{}.", i + 1)).cyan());
    }
    println!("  {}", style("Send one with /quick <number>").dim());
    println!();
}

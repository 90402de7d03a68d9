//! Welcome banner shown when a terminal chat starts.

use console::style;

use healthmate_types::llm::ModelStatus;

/// Print the HealthMate banner with the model source and load state.
pub fn print_welcome_banner(model: &str, status: &ModelStatus, session_id: &str) {
    println!();
    println!("  🩺 {}", style("HealthMate AI").cyan().bold());
    println!("  {}", style("Your health information assistant").dim());
    println!();
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!("  {}   {}", style("Status:").bold(), status_label(status));
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!(
        "  {}",
        style("Not a substitute for professional medical advice.").yellow()
    );
    println!(
        "  {}",
        style("Type /help for commands, /quick for common questions, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

fn status_label(status: &ModelStatus) -> String {
    match status {
        ModelStatus::NotLoaded => format!("{}", style("not loaded").dim()),
        ModelStatus::Ready { backend } => format!("{} ({backend})", style("ready").green()),
        ModelStatus::Failed { .. } => format!("{}", style("unavailable").red().bold()),
    }
}

//! Terminal rendering of chat turns.
//!
//! Reply text goes through `termimad`. The emergency banner stored at the
//! start of a reply is markup, not prose, so it is swapped for a red alert
//! line before rendering.

use console::style;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use healthmate_core::chat::triage::{EMERGENCY_ALERT, split_banner};
use healthmate_types::chat::{Role, Turn};

pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render assistant content: alert line (if any) then markdown body.
    pub fn render_content(&self, content: &str) -> String {
        let (emergency, body) = split_banner(content);
        let mut output = String::new();
        if emergency {
            output.push_str(&format!(
                "{}\n\n",
                style(format!(" {EMERGENCY_ALERT} ")).white().on_red().bold()
            ));
        }
        output.push_str(&self.skin.term_text(body).to_string());
        output
    }

    /// Print a full turn with its speaker label and time.
    pub fn print_turn(&self, turn: &Turn) {
        match turn.role {
            Role::User => {
                println!("  {} {}", style("You >").green().bold(), turn.content);
            }
            Role::Assistant => {
                println!("  {}", style("HealthMate").cyan().bold());
                self.print_indented(&self.render_content(&turn.content));
            }
        }
        println!("  {}", style(&turn.time).dim());
        println!();
    }

    /// Print a fresh reply with a timing footer.
    pub fn print_reply(&self, turn: &Turn, response_ms: u64) {
        println!();
        println!("  {}", style("HealthMate").cyan().bold());
        self.print_indented(&self.render_content(&turn.content));
        println!(
            "  {}",
            style(format!("{} · {:.1}s", turn.time, response_ms as f64 / 1000.0)).dim()
        );
        println!();
    }

    fn print_indented(&self, text: &str) {
        for line in text.trim_end().lines() {
            println!("  {line}");
        }
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

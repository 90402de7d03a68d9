//! CLI command definitions for the `healthmate` binary.

pub mod ask;
pub mod chat;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

use healthmate_infra::config::ModelOverrides;
use healthmate_types::config::BackendKind;

/// HealthMate: a health-information chat assistant backed by a local language model.
#[derive(Parser)]
#[command(name = "healthmate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Model directory (overrides config.toml and HEALTHMATE_MODEL_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Generation backend: local or remote.
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Defaults to `chat` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn model_overrides(&self) -> ModelOverrides {
        ModelOverrides {
            model_dir: self.model_dir.clone(),
            backend: self.backend,
        }
    }

    /// Log filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,healthmate=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat in the terminal.
    Chat,

    /// Ask a single question and print the reply.
    Ask {
        /// The question; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Address to bind (default from config.toml, else 127.0.0.1).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config.toml, else 3000).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Cyan "thinking" spinner shared by the chat loop and `ask`.
pub fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

//! HealthMate CLI and REST API entry point.
//!
//! Binary name: `healthmate`
//!
//! Parses CLI arguments, sets up tracing, resolves configuration, then runs
//! the terminal chat, a one-shot question, or the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use healthmate_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_directive(), cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    // Shell completions don't need app state
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "healthmate", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(&cli.model_overrides()).await;

    let result = match cli.command {
        None | Some(Commands::Chat) => cli::chat::loop_runner::run_chat_loop(&state).await,
        Some(Commands::Ask { question }) => {
            cli::ask::ask(&state, &question.join(" "), cli.json, cli.quiet).await
        }
        Some(Commands::Serve { host, port }) => serve(state, host, port).await,
        Some(Commands::Completions { .. }) => Ok(()),
    };

    shutdown_tracing();
    result
}

/// Load the model, then serve the REST API until Ctrl+C or SIGTERM.
///
/// A load failure is reported and the server still starts; requests retry
/// the load and get 503 until it succeeds.
async fn serve(state: AppState, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);

    let loading = cli::spinner("loading model...");
    let load = state.provider.get().await;
    loading.finish_and_clear();
    match load {
        Ok(generator) => println!(
            "  {} Model ready ({})",
            style("✓").green().bold(),
            generator.name()
        ),
        Err(e) => eprintln!(
            "  {} Model unavailable: {e}. Requests will retry the load.",
            style("!").red().bold()
        ),
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} HealthMate API listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

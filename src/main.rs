//! `flashreveal` - timer-driven reveal in the terminal

use clap::Parser;
use tokio_util::sync::CancellationToken;

use flashreveal::cli::args::Cli;
use flashreveal::cli::commands;
use flashreveal::error::ExitCode;
use flashreveal::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(settings) = cli.log_settings() {
        init_logging(&settings);
    }

    let cancel = CancellationToken::new();

    // First signal cancels the running reveal, second one exits immediately
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to register SIGTERM handler");
                    return;
                }
            };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
        shutdown.cancel();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

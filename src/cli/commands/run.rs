//! `run` command: play the reveal in the terminal.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::config::{ConfigLoader, ConfigOverrides, LoaderOptions};
use crate::error::FlashRevealError;
use crate::observability::events::EventEmitter;
use crate::observability::metrics;
use crate::random::source_for;
use crate::render::{ColorChoice, OutputFormat, Renderer, use_ansi};
use crate::reveal::{Phase, RevealMachine};

/// Load the configuration, then play `--rounds` reveals.
///
/// Cancellation (Ctrl-C / SIGTERM) stops the current round, cancels the
/// session timers and returns normally.
///
/// # Errors
///
/// Returns a config error if the configuration is invalid, or an I/O error
/// if the events file cannot be created or stdout is closed.
pub async fn run(
    args: &RunArgs,
    color: ColorChoice,
    cancel: &CancellationToken,
) -> Result<(), FlashRevealError> {
    if args.print_metrics {
        metrics::init_metrics()?;
    }

    let loader = ConfigLoader::new(LoaderOptions {
        overrides: ConfigOverrides {
            flash_interval_ms: args.flash_interval_ms,
            particle_count: args.particle_count,
        },
        ..LoaderOptions::default()
    });
    let loaded = loader.load_optional(args.config.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }
    let config = loaded.config;

    let events = match args.events.as_deref() {
        Some(path) if path.as_os_str() == "-" => EventEmitter::stderr(),
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let machine = RevealMachine::with_emitter(&config, source_for(args.seed), Arc::new(events))?;
    tracing::info!(
        interval = %humantime::format_duration(config.flash_interval()),
        rounds = args.rounds,
        seed = ?args.seed,
        "starting reveal"
    );

    let stdout = std::io::stdout();
    let ansi = args.format == OutputFormat::Human && use_ansi(color, &stdout);
    let mut renderer = Renderer::new(
        stdout,
        args.format,
        config.labels.clone(),
        ansi,
    );

    let outcome = play(&machine, &mut renderer, args.rounds, args.linger, cancel).await;
    machine.shutdown();

    if args.print_metrics
        && let Some(text) = metrics::render()
    {
        print!("{text}");
    }

    let completed = outcome?;
    tracing::info!(completed, "reveal finished");
    Ok(())
}

/// Drives `machine` through `rounds` reveals, rendering every snapshot.
///
/// Each round starts a session, renders until the reveal, then keeps the
/// reveal on screen for `linger`. Rounds after the first reset the machine
/// first. Returns the number of reveals shown; cancellation ends early.
///
/// # Errors
///
/// Returns an I/O error if the renderer's writer fails.
pub async fn play<W: Write>(
    machine: &RevealMachine,
    renderer: &mut Renderer<W>,
    rounds: u32,
    linger: Duration,
    cancel: &CancellationToken,
) -> Result<u32, FlashRevealError> {
    let mut rx = machine.subscribe();
    let initial = rx.borrow_and_update().clone();
    renderer.render(&initial)?;

    let mut completed = 0;
    for round in 1..=rounds {
        if round > 1 {
            renderer.again(round)?;
            machine.reset();
            rx.mark_unchanged();
        }
        if machine.start().is_none() {
            tracing::warn!(round, "reveal already in progress");
            break;
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!(round, "interrupted");
                    return Ok(completed);
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Ok(completed);
                    }
                    let snapshot = rx.borrow_and_update().clone();
                    renderer.render(&snapshot)?;
                    if snapshot.phase == Phase::Revealed {
                        break;
                    }
                }
            }
        }
        completed += 1;

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(completed),
            () = tokio::time::sleep(linger) => {}
        }
    }
    Ok(completed)
}

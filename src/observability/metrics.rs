//! Metrics collection.
//!
//! Counters and gauges for reveal sessions recorded through the `metrics`
//! facade. A Prometheus recorder can be installed without an HTTP listener
//! so the CLI can print a text exposition on exit.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::FlashRevealError;
use crate::reveal::Phase;

/// Handle of the installed recorder, set once.
static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

const PHASES: [Phase; 3] = [Phase::Idle, Phase::Flashing, Phase::Revealed];

/// Installs the global Prometheus recorder.
///
/// Repeated calls return the existing handle.
///
/// # Errors
///
/// Returns `FlashRevealError::Io` if another recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, FlashRevealError> {
    if let Some(handle) = PROMETHEUS.get() {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| FlashRevealError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(PROMETHEUS.get_or_init(|| handle).clone())
}

/// Renders the current metrics in Prometheus text format, if installed.
#[must_use]
pub fn render() -> Option<String> {
    PROMETHEUS.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(
        "flashreveal_sessions_started_total",
        "Flashing sessions started"
    );
    describe_counter!(
        "flashreveal_sessions_completed_total",
        "Flashing sessions that reached the reveal"
    );
    describe_counter!("flashreveal_resets_total", "Resets by phase left");
    describe_counter!(
        "flashreveal_commands_ignored_total",
        "Commands ignored because of the current phase"
    );
    describe_counter!("flashreveal_flashes_total", "Label alternations applied");
    describe_histogram!(
        "flashreveal_total_flashes",
        "Flash count drawn per session"
    );
    describe_gauge!(
        "flashreveal_current_phase",
        "Currently active phase (1 = active)"
    );
}

/// Records a session start and its drawn flash total.
pub fn record_session_started(total_flashes: u32) {
    counter!("flashreveal_sessions_started_total").increment(1);
    histogram!("flashreveal_total_flashes").record(f64::from(total_flashes));
}

/// Records a completed session.
pub fn record_session_completed() {
    counter!("flashreveal_sessions_completed_total").increment(1);
}

/// Records one tick.
pub fn record_flash() {
    counter!("flashreveal_flashes_total").increment(1);
}

/// Records a reset out of `from`.
pub fn record_reset(from: Phase) {
    counter!("flashreveal_resets_total", "from" => from.as_str()).increment(1);
}

/// Records a command ignored in `phase`.
pub fn record_ignored(command: &'static str, phase: Phase) {
    counter!(
        "flashreveal_commands_ignored_total",
        "command" => command,
        "phase" => phase.as_str()
    )
    .increment(1);
}

/// Sets the phase gauge: `1` for the active phase, `0` for the others.
pub fn set_current_phase(phase: Phase) {
    for p in PHASES {
        let value = if p == phase { 1.0 } else { 0.0 };
        gauge!("flashreveal_current_phase", "phase" => p.as_str()).set(value);
    }
}

//! Logging initialization for `flashreveal`.
//!
//! Diagnostics go to stderr through `tracing`, either as compact human
//! lines or as one JSON object per event. Verbosity flags raise the level
//! of the crate's own targets only; dependencies stay at `warn` unless
//! `FLASHREVEAL_LOG_LEVEL` says otherwise. Session tasks run inside a
//! `session` span, so JSON lines carry the session id they belong to.

use clap::ValueEnum;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Environment variable holding a full filter directive. Overrides `-v`.
pub const LOG_LEVEL_ENV: &str = "FLASHREVEAL_LOG_LEVEL";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "FLASHREVEAL_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Human,
    /// Newline-delimited JSON, one object per event.
    Json,
}

/// Resolved logging options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Output format.
    pub format: LogFormat,
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Whether human output may use ANSI colors.
    pub ansi: bool,
}

/// Maps a verbosity level to a filter directive.
///
/// Level 0 keeps everything at `warn`. Levels 1 and 2 raise `flashreveal`
/// targets to `info` and `debug`; level 3 and above trace the crate and
/// let dependencies log at `info`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,flashreveal=info",
        2 => "warn,flashreveal=debug",
        _ => "info,flashreveal=trace",
    }
}

/// Builds the event filter. A parseable `env_directive` wins over
/// `verbosity`; an unparseable one is ignored.
#[must_use]
pub fn build_filter(verbosity: u8, env_directive: Option<&str>) -> EnvFilter {
    env_directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Builds a subscriber for `settings` writing to `writer`.
pub fn build_subscriber<W>(
    settings: &LogSettings,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let show_target = settings.verbosity >= 2;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_writer(writer);

    match settings.format {
        LogFormat::Human => Box::new(builder.compact().with_ansi(settings.ansi).finish()),
        LogFormat::Json => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        ),
    }
}

/// Installs the global subscriber on stderr.
///
/// Returns `false` if a subscriber was already installed; repeated calls
/// are harmless.
pub fn init_logging(settings: &LogSettings) -> bool {
    let env = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(settings.verbosity, env.as_deref());
    let subscriber = build_subscriber(settings, filter, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

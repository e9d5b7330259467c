//! CLI argument definitions
//!
//! All Clap derive structs for `flashreveal` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::logging::{LOG_FORMAT_ENV, LogFormat, LogSettings};
use crate::render::use_ansi;

pub use crate::render::{ColorChoice, OutputFormat};

// ============================================================================
// Root CLI
// ============================================================================

/// Timer-driven reveal: flashing labels, a fixed outcome and a balloon field.
#[derive(Parser, Debug)]
#[command(name = "flashreveal", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable diagnostic logging. Command output and errors are still printed.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic log format on stderr.
    #[arg(long, default_value = "human", global = true, env = LOG_FORMAT_ENV)]
    pub log_format: LogFormat,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "FLASHREVEAL_COLOR")]
    pub color: ColorChoice,
}

impl Cli {
    /// Logging options for these flags, or `None` under `--quiet`.
    #[must_use]
    pub fn log_settings(&self) -> Option<LogSettings> {
        if self.quiet {
            return None;
        }
        let ansi = self.log_format == LogFormat::Human && use_ansi(self.color, &std::io::stderr());
        Some(LogSettings {
            format: self.log_format,
            verbosity: self.verbose,
            ansi,
        })
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reveal in the terminal.
    Run(RunArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Print one generated particle field.
    Particles(ParticlesArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "FLASHREVEAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for reproducible draws.
    #[arg(long, env = "FLASHREVEAL_SEED")]
    pub seed: Option<u64>,

    /// Override the tick period in milliseconds.
    #[arg(long)]
    pub flash_interval_ms: Option<u64>,

    /// Override the number of balloons per reveal.
    #[arg(long)]
    pub particle_count: Option<usize>,

    /// How long the reveal stays on screen (e.g. `3s`, `500ms`).
    #[arg(long, default_value = "3s", value_parser = parse_duration)]
    pub linger: Duration,

    /// Number of reveals to play back to back.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: u32,

    /// Write JSONL lifecycle events to this file (`-` for stderr).
    #[arg(long, env = "FLASHREVEAL_EVENTS_FILE")]
    pub events: Option<PathBuf>,

    /// Print Prometheus metrics on exit.
    #[arg(long)]
    pub print_metrics: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `particles`.
#[derive(Args, Debug)]
pub struct ParticlesArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "FLASHREVEAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for reproducible draws.
    #[arg(long, env = "FLASHREVEAL_SEED")]
    pub seed: Option<u64>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

// ============================================================================
// Tests
// ============================================================================

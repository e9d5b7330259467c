//! Error types for `flashreveal`
//!
//! Domain errors for configuration and the reveal state machine, aggregated
//! into [`FlashRevealError`] which maps onto process exit codes.
//!
//! Invalid state transitions (starting while already flashing, resetting
//! while idle) are not errors: the state machine treats them as no-ops.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `flashreveal` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Reveal state machine error (rejected command)
    pub const REVEAL_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `flashreveal` operations.
#[derive(Debug, Error)]
pub enum FlashRevealError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reveal state machine error
    #[error(transparent)]
    Reveal(#[from] RevealError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlashRevealError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Reveal(_) => ExitCode::REVEAL_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// Malformed configuration is fatal: there is no runtime recovery for a
/// zero flash interval or an empty palette, so these surface at
/// construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {source_name}: {}", summarize(.errors))]
    ValidationError {
        /// File path, or `"<inline>"` for programmatic configs
        source_name: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// One or more files checked by `validate` were rejected
    #[error("{failed} of {total} configuration file(s) failed validation")]
    FilesRejected {
        /// Files rejected
        failed: usize,
        /// Files checked
        total: usize,
    },
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., `"particle_bounds.size"`)
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Reveal Errors
// ============================================================================

/// Errors raised by explicit reveal commands.
///
/// Only commands that would otherwise silently corrupt a running session
/// produce errors; plain `start`/`reset` misuse is a no-op instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevealError {
    /// The flash interval is latched for the running session
    #[error("flash interval is latched while flashing (session {session})")]
    IntervalLatched {
        /// Session that holds the latched interval
        session: u64,
    },

    /// A zero interval would spin the periodic timer
    #[error("flash interval must be greater than zero")]
    ZeroInterval,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `flashreveal` operations.
pub type Result<T> = std::result::Result<T, FlashRevealError>;

// ============================================================================
// Tests
// ============================================================================

//! Configuration loader
//!
//! Loading pipeline:
//! 1. Read the file (size-limited)
//! 2. YAML parsing into [`RevealConfig`]
//! 3. `FLASHREVEAL_*` environment overrides
//! 4. Command-line overrides
//! 5. Validation (all issues collected)
//! 6. Freeze with `Arc`

use crate::config::schema::RevealConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "FLASHREVEAL_";

// ============================================================================
// Public API
// ============================================================================

/// Limits that keep a configuration within sane resource use.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of particles in a field.
    pub max_particles: usize,

    /// Flashing phases longer than this produce a warning.
    pub max_session_length: Duration,

    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_particles: 10_000,
            max_session_length: Duration::from_secs(10 * 60),
            max_config_size: 1024 * 1024,
        }
    }
}

/// Values supplied on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `flash_interval_ms`.
    pub flash_interval_ms: Option<u64>,
    /// Replaces `particle_count`.
    pub particle_count: Option<usize>,
}

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits applied during validation.
    pub config_limits: ConfigLimits,

    /// Command-line overrides, applied after the environment.
    pub overrides: ConfigOverrides,

    /// Skip `FLASHREVEAL_*` environment overrides.
    pub ignore_env: bool,
}

/// Result of loading a configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<RevealConfig>,

    /// Warnings encountered during validation.
    pub warnings: Vec<ValidationIssue>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, too large or unparseable,
    /// if an environment override is malformed, or if validation fails.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let content = self.read(path)?;
        self.load_str(&content, &path.display().to_string())
    }

    /// Loads a configuration from YAML text.
    ///
    /// `source_name` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is unparseable, an environment override
    /// is malformed, or validation fails.
    pub fn load_str(&self, yaml: &str, source_name: &str) -> Result<LoadResult, ConfigError> {
        let config = parse_yaml(yaml, Path::new(source_name))?;
        self.finish(config, source_name)
    }

    /// Builds the configuration from defaults, environment and overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment override is malformed or
    /// validation fails.
    pub fn load_default(&self) -> Result<LoadResult, ConfigError> {
        self.finish(RevealConfig::default(), "<defaults>")
    }

    /// Loads `path` when given, defaults otherwise.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`] and [`ConfigLoader::load_default`].
    pub fn load_optional(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        path.map_or_else(|| self.load_default(), |p| self.load(p))
    }

    fn read(&self, path: &Path) -> Result<String, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let limit = self.options.config_limits.max_config_size;
        if metadata.len() > limit {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            });
        }

        std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: e.to_string(),
        })
    }

    fn finish(
        &self,
        mut config: RevealConfig,
        source_name: &str,
    ) -> Result<LoadResult, ConfigError> {
        if !self.options.ignore_env {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        }
        apply_overrides(&mut config, &self.options.overrides);

        let result = Validator::new().validate(&config, &self.options.config_limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                source_name: source_name.to_string(),
                errors: result.errors,
            });
        }

        for warning in &result.warnings {
            tracing::debug!(path = %warning.path, "{}", warning.message);
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings: result.warnings,
        })
    }
}

// ============================================================================
// Pipeline stages
// ============================================================================

/// Parses YAML into a config, mapping parser errors to [`ConfigError::ParseError`].
///
/// An empty document yields the default configuration.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] with the line number when available.
pub fn parse_yaml(yaml: &str, path: &Path) -> Result<RevealConfig, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(RevealConfig::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
        path: PathBuf::from(path),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

/// Applies `FLASHREVEAL_*` overrides read through `lookup`.
///
/// Recognized keys: `FLASH_INTERVAL_MS`, `FLASH_COUNT_MIN`,
/// `FLASH_COUNT_MAX_EXCLUSIVE`, `PARTICLE_COUNT`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a variable is set but is not
/// a non-negative integer.
pub fn apply_env_overrides<F>(config: &mut RevealConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env_number(&lookup, "FLASH_INTERVAL_MS")? {
        config.flash_interval_ms = v;
    }
    if let Some(v) = env_number(&lookup, "FLASH_COUNT_MIN")? {
        config.flash_count_range.min = v;
    }
    if let Some(v) = env_number(&lookup, "FLASH_COUNT_MAX_EXCLUSIVE")? {
        config.flash_count_range.max_exclusive = v;
    }
    if let Some(v) = env_number(&lookup, "PARTICLE_COUNT")? {
        config.particle_count = v;
    }
    Ok(())
}

/// Applies command-line overrides.
pub fn apply_overrides(config: &mut RevealConfig, overrides: &ConfigOverrides) {
    if let Some(ms) = overrides.flash_interval_ms {
        config.flash_interval_ms = ms;
    }
    if let Some(count) = overrides.particle_count {
        config.particle_count = count;
    }
}

fn env_number<F, T>(lookup: &F, suffix: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let key = format!("{ENV_PREFIX}{suffix}");
    let Some(raw) = lookup(&key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            field: key,
            value: raw,
            expected: "a non-negative integer".to_string(),
        })
}

// ============================================================================
// Tests
// ============================================================================

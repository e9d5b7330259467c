//! Configuration validation
//!
//! Semantic checks on a deserialized [`RevealConfig`]. Validation collects
//! ALL issues rather than stopping at the first, so a single run reports
//! everything wrong with a file.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{Bounds, RevealConfig};
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every error and warning found.
    pub fn validate(&mut self, config: &RevealConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_timing(config, limits);
        self.validate_particles(config, limits);
        self.validate_palette(config);
        self.validate_labels(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Timing
    // ========================================================================

    fn validate_timing(&mut self, config: &RevealConfig, limits: &ConfigLimits) {
        if config.flash_interval_ms == 0 {
            self.add_error("flash_interval_ms", "Flash interval must be greater than zero");
        }

        let range = config.flash_count_range;
        if range.is_empty() {
            self.add_error(
                "flash_count_range",
                format!(
                    "Range [{}, {}) is empty; max_exclusive must exceed min",
                    range.min, range.max_exclusive
                ),
            );
        }
        if range.min == 0 {
            self.add_error(
                "flash_count_range.min",
                "At least one flash is required before the reveal",
            );
        }

        if config.flash_interval_ms > 0
            && !range.is_empty()
            && config.max_session_length() > limits.max_session_length
        {
            self.add_warning(
                "flash_count_range",
                format!(
                    "Flashing may last up to {}, longer than {}",
                    humantime::format_duration(config.max_session_length()),
                    humantime::format_duration(limits.max_session_length)
                ),
            );
        }
    }

    // ========================================================================
    // Particles
    // ========================================================================

    fn validate_particles(&mut self, config: &RevealConfig, limits: &ConfigLimits) {
        if config.particle_count == 0 {
            self.add_error(
                "particle_count",
                "Particle count must be greater than zero",
            );
        } else if config.particle_count > limits.max_particles {
            self.add_error(
                "particle_count",
                format!(
                    "Particle count {} exceeds limit {}",
                    config.particle_count, limits.max_particles
                ),
            );
        }

        let bounds = &config.particle_bounds;
        self.validate_bounds("particle_bounds.position", bounds.position);
        self.validate_bounds("particle_bounds.size", bounds.size);
        self.validate_bounds("particle_bounds.duration", bounds.duration);
        self.validate_bounds("particle_bounds.delay", bounds.delay);

        if bounds.position.max > 100.0 {
            self.add_warning(
                "particle_bounds.position.max",
                "Positions above 100% place balloons off screen",
            );
        }
        if bounds.size.min <= 0.0 && bounds.size.max > 0.0 {
            self.add_warning(
                "particle_bounds.size.min",
                "Zero-sized balloons are invisible",
            );
        }
    }

    fn validate_bounds(&mut self, path: &str, bounds: Bounds) {
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            self.add_error(path, "Bounds must be finite numbers");
            return;
        }
        if bounds.min < 0.0 {
            self.add_error(path, format!("Lower bound {} is negative", bounds.min));
        }
        if bounds.min > bounds.max {
            self.add_error(
                path,
                format!("Lower bound {} exceeds upper bound {}", bounds.min, bounds.max),
            );
        }
    }

    // ========================================================================
    // Palette & labels
    // ========================================================================

    fn validate_palette(&mut self, config: &RevealConfig) {
        if config.color_palette.is_empty() {
            self.add_error("color_palette", "Palette must contain at least one color");
            return;
        }

        for (i, color) in config.color_palette.iter().enumerate() {
            if !is_hex_color(color) {
                self.add_error(
                    &format!("color_palette[{i}]"),
                    format!("'{color}' is not a #rrggbb color"),
                );
            }
        }
    }

    fn validate_labels(&mut self, config: &RevealConfig) {
        let labels = &config.labels;
        for (path, text) in [
            ("labels.ready", &labels.ready),
            ("labels.a", &labels.a),
            ("labels.b", &labels.b),
        ] {
            if text.trim().is_empty() {
                self.add_error(path, "Label text cannot be empty");
            }
        }
        if labels.a == labels.b {
            self.add_warning("labels", "Both flashing labels are identical");
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}

/// Returns `true` for `#rrggbb` strings.
#[must_use]
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FlashCountRange;

    fn validate(config: &RevealConfig) -> ValidationResult {
        Validator::new().validate(config, &ConfigLimits::default())
    }

    fn has_error_at(result: &ValidationResult, path: &str) -> bool {
        result.errors.iter().any(|e| e.path == path)
    }

    #[test]
    fn test_default_config_valid() {
        let result = validate(&RevealConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_zero_interval() {
        let config = RevealConfig {
            flash_interval_ms: 0,
            ..Default::default()
        };
        let result = validate(&config);
        assert!(has_error_at(&result, "flash_interval_ms"));
    }

    #[test]
    fn test_empty_flash_range() {
        let config = RevealConfig {
            flash_count_range: FlashCountRange {
                min: 10,
                max_exclusive: 10,
            },
            ..Default::default()
        };
        assert!(has_error_at(&validate(&config), "flash_count_range"));
    }

    #[test]
    fn test_zero_min_flashes() {
        let config = RevealConfig {
            flash_count_range: FlashCountRange {
                min: 0,
                max_exclusive: 4,
            },
            ..Default::default()
        };
        assert!(has_error_at(&validate(&config), "flash_count_range.min"));
    }

    #[test]
    fn test_empty_palette() {
        let config = RevealConfig {
            color_palette: vec![],
            ..Default::default()
        };
        assert!(has_error_at(&validate(&config), "color_palette"));
    }

    #[test]
    fn test_bad_palette_entry() {
        let config = RevealConfig {
            color_palette: vec!["#fecdd3".to_string(), "pink".to_string()],
            ..Default::default()
        };
        let result = validate(&config);
        assert!(has_error_at(&result, "color_palette[1]"));
        assert!(!has_error_at(&result, "color_palette[0]"));
    }

    #[test]
    fn test_inverted_bounds() {
        let mut config = RevealConfig::default();
        config.particle_bounds.size = Bounds::new(88.0, 36.0);
        assert!(has_error_at(&validate(&config), "particle_bounds.size"));
    }

    #[test]
    fn test_non_finite_bounds() {
        let mut config = RevealConfig::default();
        config.particle_bounds.delay = Bounds::new(0.0, f64::INFINITY);
        assert!(has_error_at(&validate(&config), "particle_bounds.delay"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = RevealConfig {
            flash_interval_ms: 0,
            particle_count: 0,
            color_palette: vec![],
            ..Default::default()
        };
        let result = validate(&config);
        assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    }

    #[test]
    fn test_particle_limit() {
        let config = RevealConfig {
            particle_count: ConfigLimits::default().max_particles + 1,
            ..Default::default()
        };
        assert!(has_error_at(&validate(&config), "particle_count"));
    }

    #[test]
    fn test_long_session_warns() {
        let config = RevealConfig {
            flash_interval_ms: 60_000,
            ..Default::default()
        };
        let result = validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "flash_count_range"));
    }

    #[test]
    fn test_identical_labels_warn() {
        let mut config = RevealConfig::default();
        config.labels.a = "GIRL".to_string();
        let result = validate(&config);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#FB7185"));
        assert!(!is_hex_color("#fb718"));
        assert!(!is_hex_color("fb71855"));
        assert!(!is_hex_color("#gggggg"));
    }
}

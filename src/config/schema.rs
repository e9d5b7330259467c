//! Configuration schema
//!
//! Typed structs deserialized from YAML. Every field has a default, so an
//! empty document (or no file at all) yields the stock reveal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default tick period in milliseconds.
pub const DEFAULT_FLASH_INTERVAL_MS: u64 = 120;

/// Default lower bound of the total-flash draw (inclusive).
pub const DEFAULT_FLASH_COUNT_MIN: u32 = 16;

/// Default upper bound of the total-flash draw (exclusive).
pub const DEFAULT_FLASH_COUNT_MAX_EXCLUSIVE: u32 = 28;

/// Default number of balloons in a revealed field.
pub const DEFAULT_PARTICLE_COUNT: usize = 28;

/// Soft to vibrant pinks.
pub const DEFAULT_PALETTE: [&str; 5] = ["#fecdd3", "#fda4af", "#fb7185", "#f472b6", "#fbcfe8"];

// ============================================================================
// Root
// ============================================================================

/// Complete reveal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Period of the flashing tick, in milliseconds.
    pub flash_interval_ms: u64,

    /// Range the per-session total flash count is drawn from.
    pub flash_count_range: FlashCountRange,

    /// Number of particles materialized on reveal.
    pub particle_count: usize,

    /// Sampling bounds for each particle attribute.
    pub particle_bounds: ParticleBounds,

    /// Colors particles are drawn from, as `#rrggbb`.
    pub color_palette: Vec<String>,

    /// Display texts for each label (renderer only).
    pub labels: LabelTexts,
}

impl RevealConfig {
    /// Flash interval as a [`Duration`].
    #[must_use]
    pub const fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    /// Longest possible flashing phase under this configuration.
    #[must_use]
    pub fn max_session_length(&self) -> Duration {
        let flashes = self.flash_count_range.max_exclusive.saturating_sub(1);
        self.flash_interval().saturating_mul(flashes)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            flash_interval_ms: DEFAULT_FLASH_INTERVAL_MS,
            flash_count_range: FlashCountRange::default(),
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_bounds: ParticleBounds::default(),
            color_palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            labels: LabelTexts::default(),
        }
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// Half-open integer range `[min, max_exclusive)` for the total flash draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashCountRange {
    /// Smallest flash count that can be drawn.
    pub min: u32,
    /// One past the largest flash count that can be drawn.
    pub max_exclusive: u32,
}

impl FlashCountRange {
    /// Returns `true` when no value can be drawn.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.max_exclusive <= self.min
    }
}

impl Default for FlashCountRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_FLASH_COUNT_MIN,
            max_exclusive: DEFAULT_FLASH_COUNT_MAX_EXCLUSIVE,
        }
    }
}

/// Closed float range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Bounds {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` when `value` lies within the range (inclusive).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Sampling bounds for particle attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleBounds {
    /// Horizontal position, percent of the viewport width.
    pub position: Bounds,
    /// Balloon width; height is `size * 1.25`.
    pub size: Bounds,
    /// Float-up animation duration, seconds.
    pub duration: Bounds,
    /// Delay before the animation starts, seconds.
    pub delay: Bounds,
}

impl Default for ParticleBounds {
    fn default() -> Self {
        Self {
            position: Bounds::new(2.0, 98.0),
            size: Bounds::new(36.0, 88.0),
            duration: Bounds::new(8.0, 14.0),
            delay: Bounds::new(0.0, 6.0),
        }
    }
}

// ============================================================================
// Label texts
// ============================================================================

/// Texts the renderer shows for each label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelTexts {
    /// Shown while idle.
    pub ready: String,
    /// First flashing label.
    pub a: String,
    /// Second flashing label, also the revealed outcome.
    pub b: String,
}

impl Default for LabelTexts {
    fn default() -> Self {
        Self {
            ready: "Ready?".to_string(),
            a: "BOY".to_string(),
            b: "GIRL".to_string(),
        }
    }
}

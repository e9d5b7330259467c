//! Balloon particle field generation.
//!
//! A field is materialized once per entry into the revealed phase and is
//! never mutated afterwards. Each descriptor is sampled independently.

use std::sync::Arc;

use serde::Serialize;

use crate::config::schema::{ParticleBounds, RevealConfig};
use crate::error::{ConfigError, Severity, ValidationIssue};
use crate::random::{ParameterSource, choose};

/// Height-to-width ratio of a drawn balloon.
pub const BALLOON_ASPECT: f64 = 1.25;

/// One decorative balloon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleDescriptor {
    /// Index within its field.
    pub id: usize,
    /// Horizontal position, percent of the viewport width.
    pub horizontal_position: f64,
    /// Balloon width.
    pub size: f64,
    /// Float-up animation duration, seconds.
    pub animation_duration: f64,
    /// Delay before the animation starts, seconds.
    pub animation_delay: f64,
    /// Fill color, `#rrggbb`.
    pub color: String,
}

impl ParticleDescriptor {
    /// Drawn height of the balloon.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.size * BALLOON_ASPECT
    }
}

/// Produces particle fields of a fixed size within fixed bounds.
#[derive(Debug, Clone)]
pub struct ParticleFieldGenerator {
    count: usize,
    bounds: ParticleBounds,
    palette: Arc<[String]>,
}

impl ParticleFieldGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when `count` is zero or the
    /// palette is empty; neither can produce a visible field.
    pub fn new(
        count: usize,
        bounds: ParticleBounds,
        palette: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        if count == 0 {
            errors.push(issue("particle_count", "Particle count must be greater than zero"));
        }
        if palette.is_empty() {
            errors.push(issue("color_palette", "Palette must contain at least one color"));
        }
        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                source_name: "<particles>".to_string(),
                errors,
            });
        }

        Ok(Self {
            count,
            bounds,
            palette: palette.into(),
        })
    }

    /// Creates a generator from the particle section of a config.
    ///
    /// # Errors
    ///
    /// See [`ParticleFieldGenerator::new`].
    pub fn from_config(config: &RevealConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.particle_count,
            config.particle_bounds,
            config.color_palette.clone(),
        )
    }

    /// Number of particles per field.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Bounds particles are sampled within.
    #[must_use]
    pub const fn bounds(&self) -> &ParticleBounds {
        &self.bounds
    }

    /// Samples a fresh field of exactly [`count`](Self::count) particles.
    pub fn generate(&self, source: &mut dyn ParameterSource) -> Vec<ParticleDescriptor> {
        let b = &self.bounds;
        (0..self.count)
            .map(|id| ParticleDescriptor {
                id,
                horizontal_position: source.uniform(b.position.min, b.position.max),
                size: source.uniform(b.size.min, b.size.max),
                animation_duration: source.uniform(b.duration.min, b.duration.max),
                animation_delay: source.uniform(b.delay.min, b.delay.max),
                // palette is non-empty by construction
                color: choose(&mut *source, &self.palette[..])
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect()
    }
}

fn issue(path: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.to_string(),
        severity: Severity::Error,
    }
}

//! `particles` command: print one generated balloon field.

use std::io::Write;

use crate::cli::args::{OutputFormat, ParticlesArgs};
use crate::config::{ConfigLoader, RevealConfig};
use crate::error::FlashRevealError;
use crate::particles::{ParticleDescriptor, ParticleFieldGenerator};
use crate::random::source_for;

/// Generate a field from the configured bounds and print it.
///
/// # Errors
///
/// Returns a config error if the configuration cannot be loaded, or an
/// I/O error if stdout is closed.
pub fn run(args: &ParticlesArgs) -> Result<(), FlashRevealError> {
    let loaded = ConfigLoader::with_defaults().load_optional(args.config.as_deref())?;
    let field = generate(&loaded.config, args.seed)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_field(&mut out, &field, args.format)?;
    Ok(())
}

/// Draws one field using `seed` (entropy when `None`).
///
/// # Errors
///
/// Returns a config error for an empty palette or zero count.
pub fn generate(
    config: &RevealConfig,
    seed: Option<u64>,
) -> Result<Vec<ParticleDescriptor>, FlashRevealError> {
    let generator = ParticleFieldGenerator::from_config(config)?;
    let mut source = source_for(seed);
    tracing::debug!(count = generator.count(), ?seed, "generating particle field");
    Ok(generator.generate(source.as_mut()))
}

fn write_field(
    out: &mut impl Write,
    field: &[ParticleDescriptor],
    format: OutputFormat,
) -> Result<(), FlashRevealError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, field)?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            writeln!(
                out,
                "{:>3}  {:<8} {:>6} {:>6} {:>6} {:>6} {:>6}",
                "id", "color", "x%", "w", "h", "rise", "delay"
            )?;
            for p in field {
                writeln!(
                    out,
                    "{:>3}  {:<8} {:>6.1} {:>6.1} {:>6.1} {:>6.2} {:>6.2}",
                    p.id,
                    p.color,
                    p.horizontal_position,
                    p.size,
                    p.height(),
                    p.animation_duration,
                    p.animation_delay
                )?;
            }
        }
    }
    Ok(())
}

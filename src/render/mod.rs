//! Terminal renderer
//!
//! Turns [`RevealSnapshot`]s into terminal output: the current label and a
//! "Shuffling… N" progress line while flashing, the outcome banner and the
//! balloon field once revealed. JSON mode writes one object per snapshot.

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use serde_json::json;

use crate::config::schema::LabelTexts;
use crate::particles::ParticleDescriptor;
use crate::reveal::{Label, Phase, RevealSnapshot};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const LABEL_A_COLOR: &str = "\x1b[38;2;96;165;250m";
const LABEL_B_COLOR: &str = "\x1b[38;2;244;114;182m";

/// Column width of the label in the progress line.
const LABEL_WIDTH: usize = 8;

/// Output format for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Resolves whether ANSI escapes should be written to `stream`.
///
/// `Auto` requires a terminal and an unset `NO_COLOR`.
#[must_use]
pub fn use_ansi(color: ColorChoice, stream: &impl IsTerminal) -> bool {
    match color {
        ColorChoice::Auto => stream.is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Writes snapshots to a terminal (or any writer).
pub struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
    labels: LabelTexts,
    ansi: bool,
}

impl<W: Write> Renderer<W> {
    /// Creates a renderer.
    pub const fn new(out: W, format: OutputFormat, labels: LabelTexts, ansi: bool) -> Self {
        Self {
            out,
            format,
            labels,
            ansi,
        }
    }

    /// Renders one snapshot.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn render(&mut self, snapshot: &RevealSnapshot) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => self.render_human(snapshot),
            OutputFormat::Json => self.render_json(snapshot),
        }
    }

    /// Prints the between-rounds marker.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn again(&mut self, round: u32) -> io::Result<()> {
        match self.format {
            OutputFormat::Human => writeln!(self.out, "\nAgain! (round {round})"),
            OutputFormat::Json => {
                writeln!(self.out, "{}", json!({ "type": "again", "round": round }))
            }
        }?;
        self.out.flush()
    }

    /// Consumes the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_human(&mut self, s: &RevealSnapshot) -> io::Result<()> {
        match s.phase {
            Phase::Idle => writeln!(self.out, "{}", self.labels.ready)?,
            Phase::Flashing => {
                let label = self.paint_label(s.label, LABEL_WIDTH);
                match s.total_flashes {
                    Some(total) => writeln!(
                        self.out,
                        "{label} Shuffling… {} / {total}",
                        s.flash_count
                    )?,
                    None => writeln!(self.out, "{label} Shuffling… {}", s.flash_count)?,
                }
            }
            Phase::Revealed => {
                let label = self.paint_label(s.label, 0);
                writeln!(self.out, "\nIt's a {label}!")?;
                writeln!(self.out, "{} balloons:", s.particles.len())?;
                for p in s.particles.iter() {
                    let line = self.balloon_line(p);
                    writeln!(self.out, "  {line}")?;
                }
            }
        }
        self.out.flush()
    }

    fn render_json(&mut self, s: &RevealSnapshot) -> io::Result<()> {
        let value = json!({
            "phase": s.phase,
            "label": s.label,
            "text": s.label.text(&self.labels),
            "flash_count": s.flash_count,
            "total_flashes": s.total_flashes,
            "session": s.session,
            "particles": &*s.particles,
        });
        writeln!(self.out, "{value}")?;
        self.out.flush()
    }

    /// Label text left-aligned to `width`, padded before any escapes are
    /// added so colored and plain output share the same columns.
    fn paint_label(&self, label: Label, width: usize) -> String {
        let text = format!("{:<width$}", label.text(&self.labels));
        if !self.ansi {
            return text;
        }
        let color = match label {
            Label::Ready => return format!("{BOLD}{text}{RESET}"),
            Label::A => LABEL_A_COLOR,
            Label::B => LABEL_B_COLOR,
        };
        format!("{BOLD}{color}{text}{RESET}")
    }

    fn balloon_line(&self, p: &ParticleDescriptor) -> String {
        let marker = match (self.ansi, hex_rgb(&p.color)) {
            (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m●{RESET}"),
            _ => "●".to_string(),
        };
        format!(
            "{marker} {color} x={x:5.1}% {w:.0}×{h:.0} rise {d:.1}s delay {delay:.1}s",
            color = p.color,
            x = p.horizontal_position,
            w = p.size,
            h = p.height(),
            d = p.animation_duration,
            delay = p.animation_delay,
        )
    }
}

impl<W: Write> std::fmt::Debug for Renderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("format", &self.format)
            .field("ansi", &self.ansi)
            .finish_non_exhaustive()
    }
}

/// Parses `#rrggbb` into its components.
#[must_use]
pub fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn renderer(format: OutputFormat) -> Renderer<Vec<u8>> {
        Renderer::new(Vec::new(), format, LabelTexts::default(), false)
    }

    fn output(r: Renderer<Vec<u8>>) -> String {
        String::from_utf8(r.into_inner()).unwrap()
    }

    fn flashing(count: u32) -> RevealSnapshot {
        RevealSnapshot {
            phase: Phase::Flashing,
            label: Label::B,
            flash_count: count,
            total_flashes: Some(20),
            particles: Arc::from(Vec::new()),
            session: 1,
            flash_interval: Duration::from_millis(120),
        }
    }

    fn revealed() -> RevealSnapshot {
        RevealSnapshot {
            phase: Phase::Revealed,
            label: Label::B,
            flash_count: 0,
            total_flashes: None,
            particles: Arc::from(vec![ParticleDescriptor {
                id: 0,
                horizontal_position: 50.0,
                size: 40.0,
                animation_duration: 10.0,
                animation_delay: 1.5,
                color: "#fb7185".to_string(),
            }]),
            session: 1,
            flash_interval: Duration::from_millis(120),
        }
    }

    #[test]
    fn test_idle_shows_ready() {
        let mut r = renderer(OutputFormat::Human);
        r.render(&RevealSnapshot::initial(Duration::from_millis(120)))
            .unwrap();
        assert_eq!(output(r), "Ready?\n");
    }

    #[test]
    fn test_flashing_shows_progress() {
        let mut r = renderer(OutputFormat::Human);
        r.render(&flashing(7)).unwrap();
        let out = output(r);
        assert!(out.starts_with("GIRL"));
        assert!(out.contains("Shuffling… 7 / 20"));
    }

    #[test]
    fn test_revealed_lists_balloons() {
        let mut r = renderer(OutputFormat::Human);
        r.render(&revealed()).unwrap();
        let out = output(r);
        assert!(out.contains("It's a GIRL!"));
        assert!(out.contains("1 balloons:"));
        assert!(out.contains("#fb7185"));
        assert!(out.contains("40×50"));
    }

    #[test]
    fn test_ansi_colors_balloons() {
        let mut r = Renderer::new(Vec::new(), OutputFormat::Human, LabelTexts::default(), true);
        r.render(&revealed()).unwrap();
        let out = output(r);
        assert!(out.contains("\x1b[38;2;251;113;133m●"));
    }

    #[test]
    fn test_ansi_label_column_matches_plain() {
        let mut plain = renderer(OutputFormat::Human);
        plain.render(&flashing(7)).unwrap();
        assert_eq!(output(plain), "GIRL     Shuffling… 7 / 20\n");

        let mut colored =
            Renderer::new(Vec::new(), OutputFormat::Human, LabelTexts::default(), true);
        colored.render(&flashing(7)).unwrap();
        let out = output(colored);
        assert_eq!(
            out,
            format!("{BOLD}{LABEL_B_COLOR}GIRL    {RESET} Shuffling… 7 / 20\n")
        );
    }

    #[test]
    fn test_revealed_label_is_not_padded() {
        let mut r = Renderer::new(Vec::new(), OutputFormat::Human, LabelTexts::default(), true);
        r.render(&revealed()).unwrap();
        assert!(output(r).contains(&format!("It's a {BOLD}{LABEL_B_COLOR}GIRL{RESET}!")));
    }

    #[test]
    fn test_explicit_color_choices() {
        let stdout = std::io::stdout();
        assert!(use_ansi(ColorChoice::Always, &stdout));
        assert!(!use_ansi(ColorChoice::Never, &stdout));
        assert!(!use_ansi(ColorChoice::Never, &std::io::stderr()));
    }

    #[test]
    fn test_json_line_per_snapshot() {
        let mut r = renderer(OutputFormat::Json);
        r.render(&flashing(3)).unwrap();
        r.render(&revealed()).unwrap();
        let out = output(r);
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["phase"], "flashing");
        assert_eq!(lines[0]["flash_count"], 3);
        assert_eq!(lines[1]["phase"], "revealed");
        assert_eq!(lines[1]["text"], "GIRL");
        assert_eq!(lines[1]["particles"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_again_marker() {
        let mut r = renderer(OutputFormat::Human);
        r.again(2).unwrap();
        assert!(output(r).contains("Again! (round 2)"));
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#fecdd3"), Some((0xfe, 0xcd, 0xd3)));
        assert_eq!(hex_rgb("fecdd3"), None);
        assert_eq!(hex_rgb("#fecdd"), None);
        assert_eq!(hex_rgb("#zzzzzz"), None);
    }
}

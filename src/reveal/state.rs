//! Reveal state representation
//!
//! Phase and label enums plus the immutable [`RevealSnapshot`] published to
//! renderers after every change.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::schema::LabelTexts;
use crate::particles::ParticleDescriptor;

/// Lifecycle of one reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a start command. Initial state.
    #[default]
    Idle,
    /// Alternating labels until the completion timer fires.
    Flashing,
    /// Outcome shown, particle field live.
    Revealed,
}

impl Phase {
    /// Lowercase name for logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Flashing => "flashing",
            Self::Revealed => "revealed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Displayed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Shown only while idle.
    #[default]
    Ready,
    /// First flashing label.
    A,
    /// Second flashing label.
    B,
}

impl Label {
    /// Next label in the flashing alternation.
    ///
    /// `A` and `B` swap; `Ready` enters the alternation at `A`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::Ready | Self::B => Self::A,
        }
    }

    /// Display text for this label.
    #[must_use]
    pub fn text(self, texts: &LabelTexts) -> &str {
        match self {
            Self::Ready => &texts.ready,
            Self::A => &texts.a,
            Self::B => &texts.b,
        }
    }
}

/// Label every reveal settles on.
///
/// The outcome is predetermined: it does not depend on how many flashes
/// were shown or on which label was on screen when flashing stopped.
pub const REVEAL_OUTCOME: Label = Label::B;

/// Immutable view of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealSnapshot {
    /// Current phase.
    pub phase: Phase,
    /// Current label.
    pub label: Label,
    /// Ticks applied in the current flashing session.
    pub flash_count: u32,
    /// Flashes drawn for the current session; `None` outside flashing.
    pub total_flashes: Option<u32>,
    /// Balloon field; empty unless revealed.
    pub particles: Arc<[ParticleDescriptor]>,
    /// Identifier of the most recent flashing session (0 before the first).
    pub session: u64,
    /// Tick period for the next (or running) session.
    pub flash_interval: Duration,
}

impl RevealSnapshot {
    /// Initial idle snapshot.
    #[must_use]
    pub fn initial(flash_interval: Duration) -> Self {
        Self::idle(0, flash_interval)
    }

    pub(crate) fn idle(session: u64, flash_interval: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            label: Label::Ready,
            flash_count: 0,
            total_flashes: None,
            particles: Arc::from(Vec::new()),
            session,
            flash_interval,
        }
    }

    /// Time from start to completion for the running session.
    #[must_use]
    pub fn session_length(&self) -> Option<Duration> {
        self.total_flashes
            .map(|n| self.flash_interval.saturating_mul(n))
    }

    /// Checks the cross-field invariants:
    /// label is `Ready` iff idle, particles present iff revealed, and a
    /// flash total exists iff flashing.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let idle = self.phase == Phase::Idle;
        let revealed = self.phase == Phase::Revealed;
        let flashing = self.phase == Phase::Flashing;
        (self.label == Label::Ready) == idle
            && !self.particles.is_empty() == revealed
            && self.total_flashes.is_some() == flashing
            && (flashing || self.flash_count == 0)
    }
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// `start()` accepted.
    Start,
    /// Completion timer fired.
    Completion,
    /// `reset()` accepted.
    Reset,
}

/// Record of a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase left.
    pub from: Phase,
    /// Phase entered.
    pub to: Phase,
    /// Session the transition belongs to.
    pub session: u64,
    /// What caused it.
    pub reason: TransitionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_alternation() {
        assert_eq!(Label::A.toggled(), Label::B);
        assert_eq!(Label::B.toggled(), Label::A);
        assert_eq!(Label::Ready.toggled(), Label::A);
        assert_eq!(Label::A.toggled().toggled(), Label::A);
    }

    #[test]
    fn test_label_text() {
        let texts = LabelTexts::default();
        assert_eq!(Label::Ready.text(&texts), "Ready?");
        assert_eq!(Label::A.text(&texts), "BOY");
        assert_eq!(REVEAL_OUTCOME.text(&texts), "GIRL");
    }

    #[test]
    fn test_initial_snapshot_consistent() {
        let snap = RevealSnapshot::initial(Duration::from_millis(120));
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.session, 0);
        assert!(snap.is_consistent());
        assert_eq!(snap.session_length(), None);
    }

    #[test]
    fn test_inconsistent_snapshot_detected() {
        let mut snap = RevealSnapshot::initial(Duration::from_millis(120));
        snap.label = Label::B;
        assert!(!snap.is_consistent());
    }

    #[test]
    fn test_session_length() {
        let mut snap = RevealSnapshot::initial(Duration::from_millis(100));
        snap.phase = Phase::Flashing;
        snap.label = Label::A;
        snap.total_flashes = Some(20);
        assert!(snap.is_consistent());
        assert_eq!(snap.session_length(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Flashing.to_string(), "flashing");
        assert_eq!(
            serde_json::to_string(&Phase::Revealed).unwrap(),
            "\"revealed\""
        );
    }
}

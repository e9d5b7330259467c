//! Reveal state machine
//!
//! [`RevealMachine`] owns the phase, label and flash counters, arms and
//! cancels the session timers, and publishes a [`RevealSnapshot`] to
//! subscribers after every change.
//!
//! All mutation happens inside the watch channel's lock, so commands and
//! timer callbacks never interleave. Timer callbacks carry the session id
//! they were armed for and re-check it (together with the phase) before
//! touching state, which makes a callback that was already in flight when
//! its session got cancelled a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::config::schema::{FlashCountRange, RevealConfig};
use crate::config::validation::Validator;
use crate::config::ConfigLimits;
use crate::error::{ConfigError, RevealError};
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::particles::ParticleFieldGenerator;
use crate::random::{ParameterSource, RngSource};

use super::session::SessionHandle;
use super::state::{
    Label, Phase, REVEAL_OUTCOME, RevealSnapshot, Transition, TransitionReason,
};

/// State and collaborators shared with the session task.
pub(crate) struct Shared {
    state: watch::Sender<RevealSnapshot>,
    source: Mutex<Box<dyn ParameterSource>>,
    generator: ParticleFieldGenerator,
    flash_range: FlashCountRange,
    events: Arc<EventEmitter>,
}

/// The reveal state machine.
///
/// Commands (`start`, `reset`, `toggle`) are synchronous and never fail:
/// a command that does not apply to the current phase is ignored and
/// returns `None`. `start` spawns the session timers and must therefore be
/// called from within a Tokio runtime.
pub struct RevealMachine {
    shared: Arc<Shared>,
    session: Mutex<Option<SessionHandle>>,
}

impl RevealMachine {
    /// Creates a machine in the idle phase that emits no events.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `config` is malformed
    /// (zero interval, empty flash range, empty palette, ...).
    pub fn new(
        config: &RevealConfig,
        source: Box<dyn ParameterSource>,
    ) -> Result<Self, ConfigError> {
        Self::with_emitter(config, source, Arc::new(EventEmitter::noop()))
    }

    /// Creates a machine in the idle phase that routes lifecycle events to
    /// `events`.
    ///
    /// # Errors
    ///
    /// See [`RevealMachine::new`].
    pub fn with_emitter(
        config: &RevealConfig,
        source: Box<dyn ParameterSource>,
        events: Arc<EventEmitter>,
    ) -> Result<Self, ConfigError> {
        let result = Validator::new().validate(config, &ConfigLimits::default());
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                source_name: "<inline>".to_string(),
                errors: result.errors,
            });
        }

        let generator = ParticleFieldGenerator::from_config(config)?;
        let (state, _) = watch::channel(RevealSnapshot::initial(config.flash_interval()));

        Ok(Self {
            shared: Arc::new(Shared {
                state,
                source: Mutex::new(source),
                generator,
                flash_range: config.flash_count_range,
                events,
            }),
            session: Mutex::new(None),
        })
    }

    /// Creates a machine drawing from operating-system entropy.
    ///
    /// # Errors
    ///
    /// See [`RevealMachine::new`].
    pub fn with_entropy(config: &RevealConfig) -> Result<Self, ConfigError> {
        Self::new(config, Box::new(RngSource::from_entropy()))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Starts a flashing session from idle or revealed.
    ///
    /// Cancels any outstanding timers, clears the particle field, shows
    /// label `A`, draws the session's flash total and arms the tick and
    /// completion timers with the current flash interval. Ignored while
    /// already flashing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> Option<Transition> {
        let mut slot = lock(&self.session);
        let started = Instant::now();

        let mut armed = None;
        self.shared.state.send_if_modified(|s| {
            if s.phase == Phase::Flashing {
                return false;
            }
            let total = {
                let mut source = lock(&self.shared.source);
                source.uniform_int(self.shared.flash_range.min, self.shared.flash_range.max_exclusive)
            };
            let session = s.session + 1;
            armed = Some((s.phase, session, total, s.flash_interval));
            *s = RevealSnapshot {
                phase: Phase::Flashing,
                label: Label::A,
                flash_count: 0,
                total_flashes: Some(total),
                particles: Arc::from(Vec::new()),
                session,
                flash_interval: s.flash_interval,
            };
            true
        });

        let Some((from, session, total, interval)) = armed else {
            self.ignored("start", Phase::Flashing);
            return None;
        };

        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = Some(SessionHandle::spawn(
            Arc::clone(&self.shared),
            session,
            total,
            interval,
            started,
        ));
        drop(slot);

        info!(
            session,
            total_flashes = total,
            interval_ms = duration_ms(interval),
            "reveal started"
        );
        metrics::record_session_started(total);
        metrics::set_current_phase(Phase::Flashing);
        self.shared.events.emit(Event::RevealStarted {
            timestamp: Utc::now(),
            session,
            total_flashes: total,
            flash_interval_ms: duration_ms(interval),
        });

        Some(Transition {
            from,
            to: Phase::Flashing,
            session,
            reason: TransitionReason::Start,
        })
    }

    /// Returns to idle from any phase, cancelling pending timers.
    ///
    /// Ignored (state unchanged, no notification) when already idle.
    pub fn reset(&self) -> Option<Transition> {
        let mut slot = lock(&self.session);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let mut left = None;
        self.shared.state.send_if_modified(|s| {
            if s.phase == Phase::Idle {
                return false;
            }
            left = Some((s.phase, s.session));
            *s = RevealSnapshot::idle(s.session, s.flash_interval);
            true
        });
        drop(slot);

        let Some((from, session)) = left else {
            self.ignored("reset", Phase::Idle);
            return None;
        };

        info!(session, from = %from, "reveal reset");
        metrics::record_reset(from);
        metrics::set_current_phase(Phase::Idle);
        self.shared.events.emit(Event::RevealReset {
            timestamp: Utc::now(),
            session,
            from_phase: from,
        });

        Some(Transition {
            from,
            to: Phase::Idle,
            session,
            reason: TransitionReason::Reset,
        })
    }

    /// Single-button control: start from idle, reset from revealed,
    /// nothing while flashing.
    ///
    /// # Panics
    ///
    /// Panics if it starts a session outside a Tokio runtime.
    pub fn toggle(&self) -> Option<Transition> {
        match self.phase() {
            Phase::Idle => self.start(),
            Phase::Revealed => self.reset(),
            Phase::Flashing => {
                self.ignored("toggle", Phase::Flashing);
                None
            }
        }
    }

    /// Changes the tick period used by the next session.
    ///
    /// # Errors
    ///
    /// Returns [`RevealError::ZeroInterval`] for a zero duration and
    /// [`RevealError::IntervalLatched`] while flashing; the running
    /// session keeps the interval it started with.
    pub fn set_flash_interval(&self, interval: Duration) -> Result<(), RevealError> {
        if interval.is_zero() {
            return Err(RevealError::ZeroInterval);
        }

        let mut outcome = Ok(());
        self.shared.state.send_if_modified(|s| {
            if s.phase == Phase::Flashing {
                outcome = Err(RevealError::IntervalLatched { session: s.session });
                return false;
            }
            if s.flash_interval == interval {
                return false;
            }
            s.flash_interval = interval;
            true
        });

        if outcome.is_ok() {
            debug!(interval_ms = duration_ms(interval), "flash interval updated");
        }
        outcome
    }

    /// Cancels pending timers without changing state.
    ///
    /// A machine shut down mid-flash stays in the flashing phase until the
    /// next `reset`.
    pub fn shutdown(&self) {
        if let Some(previous) = lock(&self.session).take() {
            previous.cancel();
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RevealSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase
    }

    /// Subscribes to state changes.
    ///
    /// The receiver sees the current snapshot immediately and is notified
    /// after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RevealSnapshot> {
        self.shared.state.subscribe()
    }

    /// Returns `true` while a session task is still running.
    #[must_use]
    pub fn has_live_timers(&self) -> bool {
        lock(&self.session)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Particles generated per reveal.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.shared.generator.count()
    }

    fn ignored(&self, command: &'static str, phase: Phase) {
        debug!(command, phase = %phase, "command ignored");
        metrics::record_ignored(command, phase);
        self.shared.events.emit(Event::CommandIgnored {
            timestamp: Utc::now(),
            command: command.to_string(),
            phase,
        });
    }
}

impl Drop for RevealMachine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RevealMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.shared.state.borrow();
        f.debug_struct("RevealMachine")
            .field("phase", &snap.phase)
            .field("label", &snap.label)
            .field("session", &snap.session)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Timer callbacks
// ============================================================================

impl Shared {
    /// Applies one periodic tick. Returns `false` if `session` is no longer
    /// the flashing session, telling the caller to stop its timers.
    pub(crate) fn tick(&self, session: u64) -> bool {
        let mut applied = None;
        self.state.send_if_modified(|s| {
            if s.session != session || s.phase != Phase::Flashing {
                return false;
            }
            s.label = s.label.toggled();
            s.flash_count = s.flash_count.saturating_add(1);
            applied = Some((s.label, s.flash_count));
            true
        });

        let Some((label, flash_count)) = applied else {
            return false;
        };
        trace!(session, ?label, flash_count, "flash");
        metrics::record_flash();
        self.events.emit(Event::Flashed {
            timestamp: Utc::now(),
            session,
            label,
            flash_count,
        });
        true
    }

    /// Ends the flashing phase of `session`: settles on the fixed outcome and
    /// materializes a fresh particle field. Ignored for stale sessions.
    pub(crate) fn complete(&self, session: u64) {
        let mut revealed = None;
        self.state.send_if_modified(|s| {
            if s.session != session || s.phase != Phase::Flashing {
                return false;
            }
            let particles = {
                let mut source = lock(&self.source);
                self.generator.generate(source.as_mut())
            };
            revealed = Some((s.flash_count, particles.len()));
            *s = RevealSnapshot {
                phase: Phase::Revealed,
                label: REVEAL_OUTCOME,
                flash_count: 0,
                total_flashes: None,
                particles: particles.into(),
                session,
                flash_interval: s.flash_interval,
            };
            true
        });

        let Some((flashes_shown, particle_count)) = revealed else {
            debug!(session, "stale completion ignored");
            return;
        };
        info!(session, flashes_shown, particle_count, "revealed");
        metrics::record_session_completed();
        metrics::set_current_phase(Phase::Revealed);
        self.events.emit(Event::Revealed {
            timestamp: Utc::now(),
            session,
            label: REVEAL_OUTCOME,
            flashes_shown,
            particle_count,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

//! Structured event stream.
//!
//! Discrete, typed lifecycle events emitted by the reveal state machine.
//! Events are serialized as newline-delimited JSON (JSONL) and carry a
//! monotonically increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reveal::{Label, Phase};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a reveal.
///
/// Each variant is tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A flashing session began.
    RevealStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session: u64,
        /// Flashes drawn for this session.
        total_flashes: u32,
        /// Latched tick period in milliseconds.
        flash_interval_ms: u64,
    },

    /// One label alternation.
    Flashed {
        /// When the tick applied.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session: u64,
        /// Label now shown.
        label: Label,
        /// Ticks applied so far in this session.
        flash_count: u32,
    },

    /// The outcome was revealed.
    Revealed {
        /// When the completion fired.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session: u64,
        /// Final label.
        label: Label,
        /// Ticks applied before completion.
        flashes_shown: u32,
        /// Size of the new particle field.
        particle_count: usize,
    },

    /// The machine returned to idle.
    RevealReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Most recent session identifier.
        session: u64,
        /// Phase left.
        from_phase: Phase,
    },

    /// A command arrived in a phase that does not accept it.
    CommandIgnored {
        /// When the command arrived.
        timestamp: DateTime<Utc>,
        /// Command name (`"start"`, `"reset"`).
        command: String,
        /// Phase at the time.
        phase: Phase,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as one JSON line and flushes. Serialization or I/O
/// failures are dropped; observability must never break a reveal.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// stdout belongs to the terminal renderer.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

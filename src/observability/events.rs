//! Structured event stream for `manhunt`.
//!
//! Discrete, typed events emitted while a match runs. Events are
//! serialized as newline-delimited JSON (JSONL) and include a monotonically
//! increasing sequence number for ordering guarantees.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::host::PlayerId;
use crate::phase::MatchPhase;
use crate::victory::Winner;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a match.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A start request was accepted and the lobby opened.
    MatchStarted {
        /// When the match started.
        timestamp: DateTime<Utc>,
        /// Players online when the start was accepted.
        online_players: usize,
    },

    /// The live phase changed.
    PhaseChanged {
        /// When the transition was committed.
        timestamp: DateTime<Utc>,
        /// Phase that was left.
        from: MatchPhase,
        /// Phase that was entered.
        to: MatchPhase,
    },

    /// Runner and Hunters were chosen.
    TeamsAssigned {
        /// When teams were assigned.
        timestamp: DateTime<Utc>,
        /// The chosen Runner.
        runner: PlayerId,
        /// Everyone else.
        hunters: Vec<PlayerId>,
    },

    /// The border crossed a 25 % step.
    BorderMilestone {
        /// When the milestone was reached.
        timestamp: DateTime<Utc>,
        /// 25, 50, 75, or 100.
        percent: u8,
        /// Diameter at the milestone.
        diameter: f64,
    },

    /// A Hunter was permanently eliminated.
    HunterEliminated {
        /// When the elimination happened.
        timestamp: DateTime<Utc>,
        /// The eliminated Hunter.
        player: PlayerId,
    },

    /// The match was decided.
    Victory {
        /// When the outcome was accepted.
        timestamp: DateTime<Utc>,
        /// Winning side.
        winner: Winner,
        /// Human-readable reason.
        reason: String,
    },

    /// The match was forced back to idle.
    MatchStopped {
        /// When the stop happened.
        timestamp: DateTime<Utc>,
        /// Phase the match was in.
        phase: MatchPhase,
        /// Human-readable stop cause.
        cause: String,
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
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are silently dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

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
    /// Returns an I/O error if the file cannot be created or opened.
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

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

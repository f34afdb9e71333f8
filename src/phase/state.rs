//! Match phase representation.
//!
//! The live phase is held in a [`PhaseCell`], an atomic that only moves
//! through compare-and-exchange so a request that expected a different
//! prior phase fails instead of clobbering a newer transition.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MatchPhase {
    /// No match in progress.
    Idle = 0,
    /// Countdown while players gather.
    Lobby = 1,
    /// Teams assigned; the Runner has a head start.
    Preparation = 2,
    /// The hunt is on and the border shrinks.
    Running = 3,
    /// Outcome decided; everyone observes.
    Ending = 4,
}

impl MatchPhase {
    /// Every phase in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Lobby,
        Self::Preparation,
        Self::Running,
        Self::Ending,
    ];

    /// Whether the adjacency table allows moving from `self` to `to`.
    ///
    /// ```text
    /// Idle        -> Lobby
    /// Lobby       -> Preparation | Idle
    /// Preparation -> Running     | Idle
    /// Running     -> Ending      | Idle
    /// Ending      -> Idle
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Lobby)
                | (Self::Lobby, Self::Preparation | Self::Idle)
                | (Self::Preparation, Self::Running | Self::Idle)
                | (Self::Running, Self::Ending | Self::Idle)
                | (Self::Ending, Self::Idle)
        )
    }

    /// Whether a match is in progress.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Lobby => "lobby",
            Self::Preparation => "preparation",
            Self::Running => "running",
            Self::Ending => "ending",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Lobby,
            2 => Self::Preparation,
            3 => Self::Running,
            4 => Self::Ending,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free holder of the live phase.
///
/// Readers load without coordination; only the engine writes.
pub struct PhaseCell {
    current: AtomicU8,
}

impl PhaseCell {
    /// Creates a cell in [`MatchPhase::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AtomicU8::new(MatchPhase::Idle as u8),
        }
    }

    /// Returns the live phase.
    #[must_use]
    pub fn load(&self) -> MatchPhase {
        MatchPhase::from_u8(self.current.load(Ordering::SeqCst))
    }

    /// Attempts to atomically move from `from` to `to`.
    ///
    /// Returns `true` if the cell held `from` and now holds `to`.
    /// Adjacency is the caller's concern.
    pub fn try_transition(&self, from: MatchPhase, to: MatchPhase) -> bool {
        self.current
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Unconditionally stores `to`, returning the previous phase.
    pub fn force(&self, to: MatchPhase) -> MatchPhase {
        MatchPhase::from_u8(self.current.swap(to as u8, Ordering::SeqCst))
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhaseCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseCell")
            .field("current", &self.load())
            .finish()
    }
}

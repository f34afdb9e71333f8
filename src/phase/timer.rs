//! Delayed and repeating engine timers.
//!
//! A timer is a spawned task that sleeps and then sends a [`Signal`] back
//! to the engine. It owns a child [`CancellationToken`] of the engine's
//! root token, so shutting the engine down stops every timer. Each signal
//! carries the match epoch and, for phase-scoped timers, the phase it was
//! armed in; the engine drops signals whose stamp no longer matches.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::host::PlayerId;
use crate::phase::MatchPhase;

/// What a timer is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// One-second lobby countdown step.
    LobbyTick,
    /// Automatic advance to the given phase.
    AutoAdvance(MatchPhase),
    /// End of the pause between a victory and the ending phase.
    VictoryDelay,
    /// End of the Runner's reconnect window.
    RunnerGrace,
    /// A dead Hunter is due to respawn.
    HunterRespawn(PlayerId),
}

/// Timer expiry stamped with when it was armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    /// Match the timer belongs to.
    pub epoch: u64,
    /// Phase the timer is scoped to, if any.
    pub phase: Option<MatchPhase>,
    /// Purpose.
    pub kind: TimerKind,
}

/// Messages background tasks send back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A timer expired.
    Timer(TimerFired),
    /// The border scheduler reported progress.
    BorderProgress {
        /// Match the report belongs to.
        epoch: u64,
        /// Progress in `[0, 1]`.
        progress: f64,
    },
}

/// Cancels one timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Stops the timer. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called or the engine stopped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Spawns timers that report to one engine.
#[derive(Debug, Clone)]
pub struct Timers {
    tx: mpsc::UnboundedSender<Signal>,
    root: CancellationToken,
}

impl Timers {
    /// Creates a spawner reporting on `tx`, scoped under `root`.
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<Signal>, root: CancellationToken) -> Self {
        Self { tx, root }
    }

    /// Fires `fired` once after `delay`.
    pub fn once(&self, delay: Duration, fired: TimerFired) -> TimerHandle {
        let token = self.root.child_token();
        let cancel = token.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if !cancel.is_cancelled() {
                        let _ = tx.send(Signal::Timer(fired));
                    }
                }
            }
        });

        TimerHandle { token }
    }

    /// Fires `fired` immediately and then every `period` until cancelled.
    pub fn repeating(&self, period: Duration, fired: TimerFired) -> TimerHandle {
        let token = self.root.child_token();
        let cancel = token.clone();
        let tx = self.tx.clone();
        let period = period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if cancel.is_cancelled() || tx.send(Signal::Timer(fired.clone())).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        TimerHandle { token }
    }

    /// Sender for background tasks that report on their own schedule.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<Signal> {
        self.tx.clone()
    }

    /// The engine's root token.
    #[must_use]
    pub fn root(&self) -> &CancellationToken {
        &self.root
    }
}

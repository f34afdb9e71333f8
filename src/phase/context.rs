//! Mutable match state shared by the engine and its phase handlers.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;

use crate::border::BorderScheduler;
use crate::config::MatchConfig;
use crate::error::TeamError;
use crate::host::{MatchHost, Notice, PlayerId};
use crate::observability::EventEmitter;
use crate::phase::event::MatchEvent;
use crate::phase::timer::{Signal, TimerFired, TimerHandle, TimerKind, Timers};
use crate::phase::MatchPhase;
use crate::team::{Assignment, TeamRegistry};
use crate::victory::VictoryOutcome;

/// Everything a handler may read or change.
///
/// Owned by the engine task; handlers receive it by `&mut` for the
/// duration of one callback. Transitions are never performed directly:
/// handlers queue them with [`request_transition`](Self::request_transition)
/// and the engine commits them after the callback returns.
pub struct MatchContext {
    /// Frozen configuration.
    pub config: Arc<MatchConfig>,
    /// Game-server collaborator.
    pub host: Arc<dyn MatchHost>,
    /// Runner/Hunter roster.
    pub roster: TeamRegistry,
    /// Border shrink driver.
    pub border: BorderScheduler,
    /// Outcome of the current match, once decided.
    pub outcome: Option<VictoryOutcome>,
    /// Sticky: the border reached its final size this match.
    pub final_border_reached: bool,
    pub(crate) phase: MatchPhase,
    pub(crate) epoch: u64,
    pub(crate) pending: VecDeque<(MatchPhase, MatchPhase)>,
    timers: Timers,
    rng: StdRng,
    emitter: Arc<EventEmitter>,
    events: broadcast::Sender<MatchEvent>,
}

impl MatchContext {
    pub(crate) fn new(
        config: Arc<MatchConfig>,
        host: Arc<dyn MatchHost>,
        timers: Timers,
        emitter: Arc<EventEmitter>,
        events: broadcast::Sender<MatchEvent>,
    ) -> Self {
        let rng = config
            .engine
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let border = BorderScheduler::new(
            config.engine.border_poll_interval,
            timers.root().clone(),
        );

        Self {
            roster: TeamRegistry::new(config.players.min_players),
            border,
            outcome: None,
            final_border_reached: false,
            phase: MatchPhase::Idle,
            epoch: 0,
            pending: VecDeque::new(),
            config,
            host,
            timers,
            rng,
            emitter,
            events,
        }
    }

    /// Phase the handler is running in.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Identifier of the current match; bumped on every start.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Asks the engine to move from the current phase to `to`.
    ///
    /// Dropped if the phase has changed by the time the engine commits it.
    pub fn request_transition(&mut self, to: MatchPhase) {
        self.pending.push_back((self.phase, to));
    }

    /// Arms a one-shot timer that only fires while the current phase lasts.
    pub fn schedule(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.timers.once(delay, self.stamp(Some(self.phase), kind))
    }

    /// Arms a one-shot timer that fires in any phase of the current match.
    pub fn schedule_for_match(&self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.timers.once(delay, self.stamp(None, kind))
    }

    /// Arms a phase-scoped timer that fires now and then every `period`.
    pub fn schedule_repeating(&self, period: Duration, kind: TimerKind) -> TimerHandle {
        self.timers.repeating(period, self.stamp(Some(self.phase), kind))
    }

    fn stamp(&self, phase: Option<MatchPhase>, kind: TimerKind) -> TimerFired {
        TimerFired {
            epoch: self.epoch,
            phase,
            kind,
        }
    }

    /// Starts the border shrink for this match from the configured sizes.
    pub fn start_border(&mut self) {
        let tx = self.timers.sender();
        let epoch = self.epoch;
        let border = &self.config.border;
        self.border.start(
            border.initial_size,
            border.final_size,
            self.config.durations.border_shrink,
            move |progress| {
                let _ = tx.send(Signal::BorderProgress { epoch, progress });
            },
        );
    }

    /// Assigns teams from the players currently online.
    ///
    /// # Errors
    ///
    /// Propagates [`TeamError`] when too few players are online.
    pub fn assign_teams(&mut self) -> Result<Assignment, TeamError> {
        let online = self.host.online_players();
        self.roster.assign_teams(&online, &mut self.rng)
    }

    /// Sends a notice to everyone.
    pub fn broadcast(&self, notice: &Notice) {
        self.host.broadcast(notice);
    }

    /// Sends a notice to one player.
    pub fn whisper(&self, player: &PlayerId, notice: &Notice) {
        self.host.whisper(player, notice);
    }

    /// Publishes to subscribers and the JSONL stream.
    pub fn publish(&self, event: MatchEvent) {
        self.emitter.emit(event.record());
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchContext")
            .field("phase", &self.phase)
            .field("epoch", &self.epoch)
            .field("roster", &self.roster)
            .field("outcome", &self.outcome)
            .field("final_border_reached", &self.final_border_reached)
            .finish_non_exhaustive()
    }
}

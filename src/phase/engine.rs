//! Match orchestrator.
//!
//! A single task owns all mutable match state. Public calls arrive over
//! an mpsc channel from [`MatchHandle`]; timer expiries and border
//! reports arrive over a second channel; a 20 Hz tick drives handler
//! updates. All three are branches of one `select!`, so every operation
//! is serialized and a transition (exit, publish, enter, arm) is never
//! interleaved with anything else.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::border::BorderState;
use crate::config::MatchConfig;
use crate::error::{MatchError, StartError};
use crate::host::{MatchHost, Notice, PlayerId, Role};
use crate::observability::{EventEmitter, metrics};
use crate::phase::context::MatchContext;
use crate::phase::event::MatchEvent;
use crate::phase::handlers::Handlers;
use crate::phase::state::{MatchPhase, PhaseCell};
use crate::phase::timer::{Signal, TimerFired, TimerHandle, TimerKind, Timers};
use crate::team::RosterSnapshot;
use crate::victory::{VictoryOutcome, VictoryTrigger, Winner};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

/// Player lifecycle facts reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A player connected.
    Joined(PlayerId),
    /// The Runner lost their connection.
    RunnerDisconnected(PlayerId),
    /// The Runner came back.
    RunnerReconnected(PlayerId),
    /// A Hunter lost their connection.
    HunterDisconnected(PlayerId),
    /// A Hunter died.
    HunterEliminated(PlayerId),
    /// The Runner died.
    RunnerEliminated(PlayerId),
}

/// Point-in-time view of the whole match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStatus {
    /// Live phase.
    pub phase: MatchPhase,
    /// Current roster.
    pub roster: RosterSnapshot,
    /// Border state.
    pub border: BorderState,
    /// Outcome, once decided.
    pub outcome: Option<VictoryOutcome>,
}

#[derive(Debug)]
enum Command {
    Start(oneshot::Sender<Result<(), StartError>>),
    ForceStop(oneshot::Sender<bool>),
    Victory {
        outcome: VictoryOutcome,
        reply: oneshot::Sender<bool>,
    },
    Trigger {
        trigger: VictoryTrigger,
        reply: oneshot::Sender<bool>,
    },
    Player {
        event: PlayerEvent,
        reply: oneshot::Sender<()>,
    },
    Status(oneshot::Sender<MatchStatus>),
}

/// The match actor.
pub struct MatchEngine {
    ctx: MatchContext,
    handlers: Handlers,
    phase: Arc<PhaseCell>,
    commands: mpsc::Receiver<Command>,
    signals: mpsc::UnboundedReceiver<Signal>,
    shutdown: CancellationToken,
    advance: Option<TimerHandle>,
    victory_delay: Option<TimerHandle>,
    grace: Option<TimerHandle>,
    respawns: HashMap<PlayerId, TimerHandle>,
}

impl MatchEngine {
    /// Creates an engine and the handle that drives it.
    ///
    /// Nothing runs until [`run`](Self::run) is awaited, typically via
    /// [`spawn`](Self::spawn).
    #[must_use]
    pub fn new(
        config: Arc<MatchConfig>,
        host: Arc<dyn MatchHost>,
        emitter: Arc<EventEmitter>,
    ) -> (Self, MatchHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let shutdown = CancellationToken::new();
        let phase = Arc::new(PhaseCell::new());

        let timers = Timers::new(signal_tx, shutdown.clone());
        let ctx = MatchContext::new(config, host, timers, emitter, events_tx.clone());

        let engine = Self {
            ctx,
            handlers: Handlers::default(),
            phase: Arc::clone(&phase),
            commands: command_rx,
            signals: signal_rx,
            shutdown: shutdown.clone(),
            advance: None,
            victory_delay: None,
            grace: None,
            respawns: HashMap::new(),
        };
        let handle = MatchHandle {
            commands: command_tx,
            phase,
            events: events_tx,
            shutdown,
        };
        (engine, handle)
    }

    /// Creates an engine and runs it on a new tokio task.
    #[must_use]
    pub fn spawn(
        config: Arc<MatchConfig>,
        host: Arc<dyn MatchHost>,
        emitter: Arc<EventEmitter>,
    ) -> (MatchHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(config, host, emitter);
        (handle, tokio::spawn(engine.run()))
    }

    /// Runs until shutdown or until every handle is dropped.
    ///
    /// An active match is force-stopped on the way out.
    pub async fn run(mut self) {
        let mut tick = tokio::time::interval(self.ctx.config.engine.tick_period());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("match engine started");

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                }
                Some(signal) = self.signals.recv() => self.handle_signal(signal),
                _ = tick.tick() => self.tick(),
            }
            self.drain_requests();
        }

        self.force_stop("shutdown");
        self.shutdown.cancel();
        debug!("match engine stopped");
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let _ = reply.send(self.request_start());
            }
            Command::ForceStop(reply) => {
                let stopped = self.force_stop("operator");
                if stopped {
                    self.ctx
                        .broadcast(&Notice::info("The match was stopped by an operator."));
                }
                let _ = reply.send(stopped);
            }
            Command::Victory { outcome, reply } => {
                let _ = reply.send(self.handle_victory(outcome));
            }
            Command::Trigger { trigger, reply } => {
                let _ = reply.send(self.report_trigger(trigger));
            }
            Command::Player { event, reply } => {
                self.handle_player_event(event);
                let _ = reply.send(());
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Timer(fired) => self.on_timer(fired),
            Signal::BorderProgress { epoch, progress } => {
                if epoch != self.ctx.epoch || self.phase.load() != MatchPhase::Running {
                    debug!(progress, "dropping stale border report");
                    return;
                }
                if let Some(handler) = self.handlers.get(MatchPhase::Running) {
                    handler.on_border_progress(&mut self.ctx, progress);
                }
            }
        }
    }

    fn tick(&mut self) {
        let phase = self.phase.load();
        let result = self
            .handlers
            .get(phase)
            .map_or(Ok(()), |handler| handler.update(&mut self.ctx));
        if let Err(err) = result {
            self.fail(&err, "update failed");
        }
    }

    fn on_timer(&mut self, fired: TimerFired) {
        let current = self.phase.load();
        if fired.epoch != self.ctx.epoch || fired.phase.is_some_and(|p| p != current) {
            debug!(kind = ?fired.kind, %current, "dropping stale timer");
            return;
        }

        match fired.kind {
            TimerKind::AutoAdvance(to) => {
                self.advance = None;
                self.transition(current, to);
            }
            TimerKind::VictoryDelay => {
                self.victory_delay = None;
                self.transition(current, MatchPhase::Ending);
            }
            TimerKind::RunnerGrace => self.on_runner_grace_expired(),
            TimerKind::HunterRespawn(hunter) => self.respawn_hunter(&hunter),
            kind @ TimerKind::LobbyTick => {
                let result = self
                    .handlers
                    .get(current)
                    .map_or(Ok(()), |handler| handler.on_timer(&mut self.ctx, &kind));
                if let Err(err) = result {
                    self.fail(&err, "timer failed");
                }
            }
        }
    }

    fn drain_requests(&mut self) {
        while let Some((from, to)) = self.ctx.pending.pop_front() {
            self.transition(from, to);
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn request_start(&mut self) -> Result<(), StartError> {
        let phase = self.phase.load();
        let online = self.ctx.host.online_players().len();
        let players = &self.ctx.config.players;

        let rejection = if phase.is_active() {
            Some(StartError::AlreadyActive { phase })
        } else if online < players.min_players {
            Some(StartError::NotEnoughPlayers {
                online,
                min: players.min_players,
            })
        } else if online > players.max_players {
            Some(StartError::TooManyPlayers {
                online,
                max: players.max_players,
            })
        } else {
            None
        };

        if let Some(err) = rejection {
            warn!(%err, "start request rejected");
            self.ctx
                .broadcast(&Notice::error(format!("Cannot start the match: {err}")));
            return Err(err);
        }

        self.ctx.epoch += 1;
        self.ctx.outcome = None;
        self.ctx.final_border_reached = false;
        info!(online, epoch = self.ctx.epoch, "match starting");
        self.ctx.publish(MatchEvent::MatchStarted {
            online_players: online,
        });

        self.transition(MatchPhase::Idle, MatchPhase::Lobby);
        Ok(())
    }

    fn transition(&mut self, from: MatchPhase, to: MatchPhase) {
        if let Err(err) = self.try_transition(from, to) {
            let cause = match err {
                MatchError::InvalidTransition { .. } => "invalid transition",
                _ => "setup failed",
            };
            self.fail(&err, cause);
        }
    }

    fn try_transition(&mut self, from: MatchPhase, to: MatchPhase) -> Result<(), MatchError> {
        let current = self.phase.load();
        if current != from {
            debug!(%from, %to, %current, "dropping stale transition request");
            return Ok(());
        }
        if !from.can_transition_to(to) {
            return Err(MatchError::InvalidTransition { from, to });
        }
        if !self.phase.try_transition(from, to) {
            debug!(%from, %to, "lost transition race");
            return Ok(());
        }

        self.cancel_phase_timers(from);
        if let Some(handler) = self.handlers.get(from) {
            handler.on_exit(&mut self.ctx);
        }
        self.ctx.phase = to;
        self.publish_change(from, to);

        if to == MatchPhase::Idle {
            self.teardown();
            return Ok(());
        }

        if let Some(handler) = self.handlers.get(to) {
            debug!(phase = %handler.phase(), "entering phase");
            handler.on_enter(&mut self.ctx)?;
        }
        self.arm_advance(to);
        if to == MatchPhase::Running {
            self.check_hunters_remaining();
        }
        Ok(())
    }

    fn arm_advance(&mut self, entered: MatchPhase) {
        let durations = &self.ctx.config.durations;
        let (next, delay): (MatchPhase, Duration) = match entered {
            MatchPhase::Preparation => (MatchPhase::Running, durations.preparation),
            MatchPhase::Ending => (MatchPhase::Idle, durations.ending),
            _ => return,
        };
        self.advance = Some(self.ctx.schedule(delay, TimerKind::AutoAdvance(next)));
    }

    fn publish_change(&self, from: MatchPhase, to: MatchPhase) {
        info!(%from, %to, "phase changed");
        metrics::record_phase_transition(from, to);
        metrics::set_current_phase(to, Some(from));
        self.ctx.publish(MatchEvent::PhaseChanged { from, to });
    }

    fn fail(&mut self, err: &MatchError, cause: &'static str) {
        error!(%err, cause, "match error, stopping match");
        self.ctx
            .broadcast(&Notice::error(format!("The match was stopped: {err}")));
        self.force_stop(cause);
    }

    /// Forces the match back to idle. Returns `false` if already idle.
    fn force_stop(&mut self, cause: &'static str) -> bool {
        let phase = self.phase.load();
        if !phase.is_active() {
            return false;
        }

        self.cancel_match_timers();
        if let Some(handler) = self.handlers.get(phase) {
            handler.on_exit(&mut self.ctx);
        }
        self.phase.force(MatchPhase::Idle);
        self.ctx.phase = MatchPhase::Idle;
        self.publish_change(phase, MatchPhase::Idle);
        self.ctx.publish(MatchEvent::MatchStopped {
            phase,
            cause: cause.to_string(),
        });
        metrics::record_forced_stop(cause);
        info!(%phase, cause, "match force-stopped");

        self.teardown();
        true
    }

    fn teardown(&mut self) {
        for handler in self.handlers.all() {
            handler.cleanup(&mut self.ctx);
        }
        self.cancel_match_timers();
        self.ctx.border.reset();
        self.ctx.host.stop_hunter_tracking();

        let roster = self.ctx.roster.snapshot();
        let mut players: BTreeSet<PlayerId> =
            self.ctx.host.online_players().into_iter().collect();
        players.extend(roster.runner);
        players.extend(roster.hunters);
        for player in &players {
            self.ctx.host.reset_player(player);
        }

        self.ctx.roster.reset();
        self.ctx.final_border_reached = false;
        self.ctx.pending.clear();
        debug!(players = players.len(), "match torn down");
    }

    fn cancel_phase_timers(&mut self, leaving: MatchPhase) {
        if let Some(timer) = self.advance.take() {
            timer.cancel();
        }
        if let Some(timer) = self.victory_delay.take() {
            timer.cancel();
        }
        if leaving == MatchPhase::Running {
            self.cancel_respawns();
        }
    }

    fn cancel_match_timers(&mut self) {
        self.cancel_phase_timers(MatchPhase::Running);
        if let Some(timer) = self.grace.take() {
            timer.cancel();
        }
    }

    fn cancel_respawns(&mut self) {
        for (_, timer) in self.respawns.drain() {
            timer.cancel();
        }
    }

    // ------------------------------------------------------------------
    // Victory
    // ------------------------------------------------------------------

    fn handle_victory(&mut self, outcome: VictoryOutcome) -> bool {
        let phase = self.phase.load();
        if phase != MatchPhase::Running {
            debug!(%phase, %outcome, "ignoring victory outside running phase");
            return false;
        }
        if let Some(existing) = &self.ctx.outcome {
            debug!(%existing, %outcome, "match already decided");
            return false;
        }

        info!(winner = %outcome.winner, reason = %outcome.reason, "match decided");
        metrics::record_victory(outcome.winner);
        self.ctx.broadcast(&Notice::manhunt(outcome.to_string()));
        self.ctx.publish(MatchEvent::Victory(outcome.clone()));
        self.ctx.outcome = Some(outcome);

        let delay = self.ctx.config.timers.victory_delay;
        self.victory_delay = Some(self.ctx.schedule(delay, TimerKind::VictoryDelay));
        true
    }

    fn report_trigger(&mut self, trigger: VictoryTrigger) -> bool {
        if !self.ctx.config.victory.is_enabled(trigger) {
            debug!(%trigger, "victory trigger disabled");
            return false;
        }
        self.handle_victory(trigger.outcome())
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Joined(player) => self.player_joined(&player),
            PlayerEvent::RunnerDisconnected(player) => self.runner_disconnected(&player),
            PlayerEvent::RunnerReconnected(player) => self.runner_reconnected(&player),
            PlayerEvent::HunterDisconnected(player) => self.hunter_disconnected(&player),
            PlayerEvent::HunterEliminated(player) => self.hunter_died(&player),
            PlayerEvent::RunnerEliminated(player) => self.runner_died(&player),
        }
    }

    fn in_play(&self) -> bool {
        matches!(
            self.phase.load(),
            MatchPhase::Preparation | MatchPhase::Running
        )
    }

    fn player_joined(&mut self, player: &PlayerId) {
        match self.phase.load() {
            MatchPhase::Idle | MatchPhase::Lobby => {}
            MatchPhase::Ending => self.ctx.host.set_observer(player),
            MatchPhase::Preparation | MatchPhase::Running => {
                let roster = &self.ctx.roster;
                if roster.is_runner(player) {
                    self.runner_reconnected(player);
                } else if roster.is_hunter(player) && !roster.is_eliminated(player) {
                    self.ctx.host.apply_role(player, Role::Hunter);
                } else {
                    self.ctx.host.set_observer(player);
                    self.ctx.whisper(
                        player,
                        &Notice::info("A match is in progress. You are spectating."),
                    );
                }
            }
        }
    }

    fn runner_disconnected(&mut self, player: &PlayerId) {
        if !self.in_play() || !self.ctx.roster.is_runner(player) {
            debug!(%player, "ignoring runner disconnect");
            return;
        }
        if self.grace.is_some() {
            return;
        }

        let grace = self.ctx.config.timers.runner_disconnect_grace;
        info!(runner = %player, ?grace, "runner disconnected");
        self.ctx.broadcast(&Notice::manhunt(format!(
            "The Runner disconnected! They have {} to return.",
            humantime::format_duration(grace)
        )));
        self.grace = Some(self.ctx.schedule_for_match(grace, TimerKind::RunnerGrace));
    }

    fn runner_reconnected(&mut self, player: &PlayerId) {
        if !self.in_play() || !self.ctx.roster.is_runner(player) {
            return;
        }
        if let Some(timer) = self.grace.take() {
            timer.cancel();
            info!(runner = %player, "runner reconnected");
            self.ctx
                .broadcast(&Notice::manhunt("The Runner is back in the game!"));
        }
        self.ctx.host.apply_role(player, Role::Runner);
    }

    fn on_runner_grace_expired(&mut self) {
        self.grace = None;
        match self.phase.load() {
            MatchPhase::Running => {
                if !self.report_trigger(VictoryTrigger::RunnerDisconnectTimeout) {
                    warn!("runner disconnect timeout did not decide the match");
                }
            }
            MatchPhase::Preparation => {
                self.ctx.broadcast(&Notice::error(
                    "The Runner did not return. The match was cancelled.",
                ));
                self.force_stop("runner disconnect timeout");
            }
            phase => debug!(%phase, "runner grace expired with nothing to do"),
        }
    }

    fn hunter_disconnected(&mut self, player: &PlayerId) {
        if let Some(timer) = self.respawns.remove(player) {
            timer.cancel();
        }
        if !self.ctx.roster.remove_hunter(player) {
            return;
        }

        info!(hunter = %player, "hunter left the match");
        if self.phase.load() == MatchPhase::Running {
            self.check_hunters_remaining();
        }
    }

    /// Hands the Runner the win once no active Hunter is left.
    ///
    /// Also checked on entering the hunt: every Hunter may have left during
    /// preparation.
    fn check_hunters_remaining(&mut self) {
        if !self.ctx.roster.is_assigned() || !self.ctx.roster.active_hunters().is_empty() {
            return;
        }
        info!("no active hunters left");
        if !self.report_trigger(VictoryTrigger::LastHunterStanding) {
            warn!("running with no hunters and the match is undecided");
        }
    }

    fn hunter_died(&mut self, player: &PlayerId) {
        if self.phase.load() != MatchPhase::Running {
            debug!(%player, "ignoring hunter death outside running phase");
            return;
        }
        if !self.ctx.roster.is_hunter(player) || self.ctx.roster.is_eliminated(player) {
            debug!(%player, "ignoring death of non-active hunter");
            return;
        }

        if !self.ctx.final_border_reached {
            let delay = self.ctx.config.timers.hunter_respawn_delay;
            let timer = self
                .ctx
                .schedule(delay, TimerKind::HunterRespawn(player.clone()));
            if let Some(previous) = self.respawns.insert(player.clone(), timer) {
                previous.cancel();
            }
            self.ctx.whisper(
                player,
                &Notice::info(format!(
                    "You will respawn near the Runner in {}.",
                    humantime::format_duration(delay)
                )),
            );
            return;
        }

        if self.ctx.roster.eliminate_hunter(player) {
            info!(hunter = %player, "hunter eliminated");
            metrics::record_hunter_elimination();
            self.ctx.host.set_observer(player);
            self.ctx.broadcast(&Notice::manhunt(format!(
                "{player} has been eliminated!"
            )));
            self.ctx.publish(MatchEvent::HunterEliminated {
                player: player.clone(),
            });

            if self.ctx.roster.active_hunters().is_empty() {
                self.report_trigger(VictoryTrigger::LastHunterStanding);
            }
        }
    }

    fn respawn_hunter(&mut self, hunter: &PlayerId) {
        self.respawns.remove(hunter);
        if !self.ctx.roster.is_hunter(hunter) || self.ctx.roster.is_eliminated(hunter) {
            return;
        }
        let Some(runner) = self.ctx.roster.runner().cloned() else {
            return;
        };
        if !self.ctx.host.is_online(&runner) || !self.ctx.host.is_online(hunter) {
            debug!(%hunter, %runner, "skipping respawn, a player is offline");
            return;
        }
        debug!(%hunter, %runner, "respawning hunter");
        self.ctx.host.respawn_hunter(
            hunter,
            &runner,
            self.ctx.config.players.hunter_respawn_radius,
        );
    }

    fn runner_died(&mut self, player: &PlayerId) {
        if self.ctx.roster.is_runner(player) {
            self.report_trigger(VictoryTrigger::RunnerEliminated);
        }
    }

    fn status(&self) -> MatchStatus {
        MatchStatus {
            phase: self.phase.load(),
            roster: self.ctx.roster.snapshot(),
            border: self.ctx.border.state(),
            outcome: self.ctx.outcome.clone(),
        }
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("phase", &self.phase.load())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable, async front door to a running [`MatchEngine`].
///
/// Every method except [`current_phase`](Self::current_phase),
/// [`is_active`](Self::is_active), [`subscribe`](Self::subscribe), and
/// [`shutdown`](Self::shutdown) waits for the engine to process the
/// request, so effects are visible once the call returns.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    commands: mpsc::Sender<Command>,
    phase: Arc<PhaseCell>,
    events: broadcast::Sender<MatchEvent>,
    shutdown: CancellationToken,
}

impl MatchHandle {
    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MatchError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| MatchError::EngineStopped)?;
        response.await.map_err(|_| MatchError::EngineStopped)
    }

    async fn notify(&self, event: PlayerEvent) -> Result<(), MatchError> {
        self.call(|reply| Command::Player { event, reply }).await
    }

    /// Starts a match from idle.
    ///
    /// # Errors
    ///
    /// Returns a [`StartError`] if a match is active, the online count is
    /// outside the configured bounds, or the engine has stopped.
    pub async fn request_start(&self) -> Result<(), StartError> {
        self.call(Command::Start)
            .await
            .unwrap_or(Err(StartError::EngineStopped))
    }

    /// Forces the match back to idle. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn force_stop(&self) -> Result<bool, MatchError> {
        self.call(Command::ForceStop).await
    }

    /// Live phase, read without involving the engine task.
    #[must_use]
    pub fn current_phase(&self) -> MatchPhase {
        self.phase.load()
    }

    /// Whether a match is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current_phase().is_active()
    }

    /// Receives every [`MatchEvent`] published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    /// Declares a Runner victory. Returns `true` if it decided the match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn handle_runner_victory(
        &self,
        reason: impl Into<String>,
    ) -> Result<bool, MatchError> {
        let outcome = VictoryOutcome::new(Winner::Runner, reason);
        self.call(|reply| Command::Victory { outcome, reply }).await
    }

    /// Declares a Hunter victory. Returns `true` if it decided the match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn handle_hunter_victory(
        &self,
        reason: impl Into<String>,
    ) -> Result<bool, MatchError> {
        let outcome = VictoryOutcome::new(Winner::Hunters, reason);
        self.call(|reply| Command::Victory { outcome, reply }).await
    }

    /// Reports a game event from the trigger catalogue.
    ///
    /// Returns `true` if the trigger is enabled and decided the match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn report_trigger(&self, trigger: VictoryTrigger) -> Result<bool, MatchError> {
        self.call(|reply| Command::Trigger { trigger, reply }).await
    }

    /// The Runner lost their connection.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_runner_disconnected(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::RunnerDisconnected(player)).await
    }

    /// The Runner came back.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_runner_reconnected(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::RunnerReconnected(player)).await
    }

    /// A Hunter lost their connection.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_hunter_disconnected(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::HunterDisconnected(player)).await
    }

    /// A Hunter died.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_hunter_eliminated(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::HunterEliminated(player)).await
    }

    /// The Runner died.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_runner_eliminated(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::RunnerEliminated(player)).await
    }

    /// A player connected.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn notify_player_joined(&self, player: PlayerId) -> Result<(), MatchError> {
        self.notify(PlayerEvent::Joined(player)).await
    }

    /// Full status snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn status(&self) -> Result<MatchStatus, MatchError> {
        self.call(Command::Status).await
    }

    /// Roster snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn roster(&self) -> Result<RosterSnapshot, MatchError> {
        Ok(self.status().await?.roster)
    }

    /// Border snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn border(&self) -> Result<BorderState, MatchError> {
        Ok(self.status().await?.border)
    }

    /// Outcome of the current or most recent match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine has stopped.
    pub async fn outcome(&self) -> Result<Option<VictoryOutcome>, MatchError> {
        Ok(self.status().await?.outcome)
    }

    /// Stops the engine; an active match is force-stopped first.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

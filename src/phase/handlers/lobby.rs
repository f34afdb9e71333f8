//! Lobby: countdown while players gather.

use std::time::Duration;

use tracing::{debug, info};

use super::PhaseHandler;
use crate::error::MatchError;
use crate::host::{LobbyStatus, Notice};
use crate::phase::MatchPhase;
use crate::phase::context::MatchContext;
use crate::phase::timer::{TimerHandle, TimerKind};

/// Counts down one step per second and starts preparation at zero.
///
/// The first step runs on entry, so with a 60 s lobby the countdown
/// announces `60` immediately and reaches zero 60 s later. If too few
/// players are online at zero the countdown starts over.
#[derive(Debug, Default)]
pub struct LobbyHandler {
    remaining: u64,
    countdown: Option<TimerHandle>,
    last_status: Option<LobbyStatus>,
}

impl LobbyHandler {
    fn lobby_seconds(ctx: &MatchContext) -> u64 {
        ctx.config.durations.lobby.as_secs().max(1)
    }

    fn step(&mut self, ctx: &mut MatchContext) {
        let remaining = self.remaining;

        if remaining == 0 {
            let online = ctx.host.online_players().len();
            let required = ctx.config.players.min_players;
            if online >= required {
                info!(online, "lobby countdown finished");
                ctx.request_transition(MatchPhase::Preparation);
            } else {
                info!(online, required, "lobby countdown restarted");
                ctx.broadcast(&Notice::error(format!(
                    "Not enough players to start ({online}/{required}). Restarting countdown."
                )));
                self.remaining = Self::lobby_seconds(ctx);
            }
            return;
        }

        if ctx.config.lobby.announce_at.contains(&remaining) {
            ctx.broadcast(&Notice::info(format!(
                "Match starts in {remaining} second{}",
                if remaining == 1 { "" } else { "s" }
            )));
        }
        self.remaining = remaining - 1;
    }
}

impl PhaseHandler for LobbyHandler {
    fn phase(&self) -> MatchPhase {
        MatchPhase::Lobby
    }

    fn on_enter(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError> {
        ctx.host
            .prepare_lobby()
            .map_err(|e| MatchError::SetupFailed {
                phase: MatchPhase::Lobby,
                reason: e.to_string(),
            })?;

        self.remaining = Self::lobby_seconds(ctx);
        self.last_status = None;
        self.countdown =
            Some(ctx.schedule_repeating(Duration::from_secs(1), TimerKind::LobbyTick));
        ctx.broadcast(&Notice::manhunt("A manhunt is starting! Gather in the lobby."));
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut MatchContext) {
        if let Some(timer) = self.countdown.take() {
            timer.cancel();
        }
    }

    fn update(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError> {
        let status = LobbyStatus {
            online: ctx.host.online_players().len(),
            required: ctx.config.players.min_players,
            seconds_remaining: self.remaining,
        };
        if self.last_status != Some(status) {
            ctx.host.show_lobby_status(&status);
            self.last_status = Some(status);
        }
        Ok(())
    }

    fn cleanup(&mut self, ctx: &mut MatchContext) {
        if let Some(timer) = self.countdown.take() {
            timer.cancel();
        }
        self.last_status = None;
        self.remaining = 0;
        ctx.host.release_lobby();
    }

    fn on_timer(&mut self, ctx: &mut MatchContext, kind: &TimerKind) -> Result<(), MatchError> {
        if *kind == TimerKind::LobbyTick {
            self.step(ctx);
        } else {
            debug!(?kind, "lobby ignoring timer");
        }
        Ok(())
    }
}

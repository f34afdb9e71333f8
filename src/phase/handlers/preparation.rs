//! Preparation: build the arena, pick teams, give the Runner a head start.

use tracing::info;

use super::PhaseHandler;
use crate::error::MatchError;
use crate::host::{Notice, Role};
use crate::phase::MatchPhase;
use crate::phase::context::MatchContext;
use crate::phase::event::MatchEvent;

/// Sets up the arena and the roster.
///
/// The advance to running is armed by the engine once this returns.
#[derive(Debug, Default)]
pub struct PreparationHandler;

impl PhaseHandler for PreparationHandler {
    fn phase(&self) -> MatchPhase {
        MatchPhase::Preparation
    }

    fn on_enter(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError> {
        let border = ctx.config.border.initial_size;
        let spawn_radius = ctx.config.players.hunter_spawn_radius;
        ctx.host
            .prepare_arena(border, spawn_radius)
            .map_err(|e| MatchError::SetupFailed {
                phase: MatchPhase::Preparation,
                reason: e.to_string(),
            })?;

        let assignment = ctx.assign_teams()?;
        let runner = assignment.runner.clone();
        info!(%runner, hunters = assignment.hunters.len(), "teams assigned");

        for (player, role) in assignment.roles() {
            ctx.host.apply_role(player, role);
            let notice = match role {
                Role::Runner => Notice::success(
                    "You are the Runner! Survive, and defeat the dragon to win.",
                ),
                Role::Hunter => Notice::success(format!(
                    "You are a Hunter! Track down {runner} before they finish."
                )),
            };
            ctx.whisper(player, &notice);
        }

        ctx.publish(MatchEvent::TeamsAssigned {
            runner: runner.clone(),
            hunters: assignment.hunters.iter().cloned().collect(),
        });

        let head_start = humantime::format_duration(ctx.config.durations.preparation);
        ctx.broadcast(&Notice::manhunt(format!(
            "{runner} is the Runner! Hunters are released in {head_start}."
        )));
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut MatchContext) {}

    fn cleanup(&mut self, ctx: &mut MatchContext) {
        ctx.host.release_arena();
    }
}

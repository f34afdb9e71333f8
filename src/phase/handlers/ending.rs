//! Ending: everyone watches while the result sinks in.

use tracing::info;

use super::PhaseHandler;
use crate::error::MatchError;
use crate::host::Notice;
use crate::phase::MatchPhase;
use crate::phase::context::MatchContext;

/// Puts everyone into observer mode and announces the result.
#[derive(Debug, Default)]
pub struct EndingHandler;

impl PhaseHandler for EndingHandler {
    fn phase(&self) -> MatchPhase {
        MatchPhase::Ending
    }

    fn on_enter(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError> {
        for player in ctx.host.online_players() {
            ctx.host.set_observer(&player);
        }

        let summary = ctx.outcome.as_ref().map_or_else(
            || "Match over. No winner was decided.".to_string(),
            |outcome| format!("Match over. {outcome}"),
        );
        info!(%summary, "match ending");
        ctx.broadcast(&Notice::manhunt(summary));
        ctx.broadcast(&Notice::info(format!(
            "Returning to idle in {}.",
            humantime::format_duration(ctx.config.durations.ending)
        )));
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut MatchContext) {
        ctx.roster.reset();
    }
}

//! Running: the hunt itself.

use tracing::info;

use super::PhaseHandler;
use crate::error::MatchError;
use crate::host::Notice;
use crate::observability::metrics;
use crate::phase::MatchPhase;
use crate::phase::context::MatchContext;
use crate::phase::event::MatchEvent;

const MILESTONES: [u8; 4] = [25, 50, 75, 100];

/// Starts tracking and the border, and narrates the shrink.
#[derive(Debug, Default)]
pub struct RunningHandler {
    announced: Vec<u8>,
}

impl PhaseHandler for RunningHandler {
    fn phase(&self) -> MatchPhase {
        MatchPhase::Running
    }

    fn on_enter(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError> {
        let runner = ctx
            .roster
            .runner()
            .cloned()
            .ok_or_else(|| MatchError::SetupFailed {
                phase: MatchPhase::Running,
                reason: "no runner assigned".to_string(),
            })?;
        let hunters: Vec<_> = ctx.roster.active_hunters().into_iter().collect();

        self.announced.clear();
        ctx.host.start_hunter_tracking(&runner, &hunters);
        ctx.host.set_border_diameter(ctx.config.border.initial_size);
        ctx.start_border();

        ctx.broadcast(&Notice::manhunt("The hunt is on! Hunters have been released."));
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut MatchContext) {
        ctx.host.stop_hunter_tracking();
        ctx.border.stop();
    }

    fn cleanup(&mut self, ctx: &mut MatchContext) {
        self.announced.clear();
        ctx.border.reset();
    }

    fn on_border_progress(&mut self, ctx: &mut MatchContext, progress: f64) {
        let diameter = ctx.border.state().diameter_at(progress);
        ctx.host.set_border_diameter(diameter);
        metrics::set_border_progress(progress);

        for percent in MILESTONES {
            if progress * 100.0 >= f64::from(percent) && !self.announced.contains(&percent) {
                self.announced.push(percent);
                ctx.broadcast(&Notice::info(format!(
                    "The border has shrunk {percent}% ({diameter:.0} blocks across)"
                )));
                ctx.publish(MatchEvent::BorderMilestone { percent, diameter });
            }
        }

        if progress >= 1.0 && !ctx.final_border_reached {
            ctx.final_border_reached = true;
            info!(diameter, "border reached final size");
            ctx.broadcast(&Notice::manhunt(
                "The border has reached its final size. Dead Hunters no longer respawn!",
            ));
        }
    }
}

//! Per-phase behaviour.
//!
//! Each non-idle phase has one handler. The engine calls `on_enter`
//! exactly once when the phase is entered and `on_exit` exactly once
//! when it is left; `update` runs on every tick in between. `cleanup`
//! runs on every handler whenever the match returns to idle, whether
//! or not that handler was ever entered.

mod ending;
mod lobby;
mod preparation;
mod running;

pub use ending::EndingHandler;
pub use lobby::LobbyHandler;
pub use preparation::PreparationHandler;
pub use running::RunningHandler;

use crate::error::MatchError;
use crate::phase::MatchPhase;
use crate::phase::context::MatchContext;
use crate::phase::timer::TimerKind;

/// Behaviour of one match phase.
pub trait PhaseHandler: Send {
    /// Phase this handler drives.
    fn phase(&self) -> MatchPhase;

    /// Sets the phase up.
    ///
    /// # Errors
    ///
    /// Any error aborts the entry and forces the match back to idle.
    fn on_enter(&mut self, ctx: &mut MatchContext) -> Result<(), MatchError>;

    /// Tears down what `on_enter` started. Must cancel every timer it armed.
    fn on_exit(&mut self, ctx: &mut MatchContext);

    /// Periodic work while the phase is live.
    ///
    /// # Errors
    ///
    /// Any error forces the match back to idle.
    fn update(&mut self, _ctx: &mut MatchContext) -> Result<(), MatchError> {
        Ok(())
    }

    /// Full reset on return to idle. Safe when `on_enter` never ran.
    fn cleanup(&mut self, _ctx: &mut MatchContext) {}

    /// A timer armed by this handler fired.
    ///
    /// # Errors
    ///
    /// Any error forces the match back to idle.
    fn on_timer(&mut self, _ctx: &mut MatchContext, _kind: &TimerKind) -> Result<(), MatchError> {
        Ok(())
    }

    /// The border scheduler reported progress.
    fn on_border_progress(&mut self, _ctx: &mut MatchContext, _progress: f64) {}
}

/// One handler per non-idle phase.
#[derive(Debug, Default)]
pub struct Handlers {
    lobby: LobbyHandler,
    preparation: PreparationHandler,
    running: RunningHandler,
    ending: EndingHandler,
}

impl Handlers {
    /// Handler for `phase`; idle has none.
    pub fn get(&mut self, phase: MatchPhase) -> Option<&mut dyn PhaseHandler> {
        match phase {
            MatchPhase::Idle => None,
            MatchPhase::Lobby => Some(&mut self.lobby),
            MatchPhase::Preparation => Some(&mut self.preparation),
            MatchPhase::Running => Some(&mut self.running),
            MatchPhase::Ending => Some(&mut self.ending),
        }
    }

    /// Every handler, in lifecycle order.
    pub fn all(&mut self) -> [&mut dyn PhaseHandler; 4] {
        [
            &mut self.lobby,
            &mut self.preparation,
            &mut self.running,
            &mut self.ending,
        ]
    }
}

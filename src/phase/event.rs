//! Typed match events fanned out to subscribers.

use chrono::Utc;
use serde::Serialize;

use crate::host::PlayerId;
use crate::observability::Event;
use crate::phase::MatchPhase;
use crate::victory::VictoryOutcome;

/// Something observable happened in the match.
///
/// Delivered over a `tokio::sync::broadcast` channel obtained from
/// [`MatchHandle::subscribe`](crate::phase::MatchHandle::subscribe); the
/// same events are written to the JSONL stream with a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// A start request was accepted.
    MatchStarted {
        /// Players online at acceptance.
        online_players: usize,
    },
    /// The live phase changed.
    PhaseChanged {
        /// Phase that was left.
        from: MatchPhase,
        /// Phase that was entered.
        to: MatchPhase,
    },
    /// Runner and Hunters were chosen.
    TeamsAssigned {
        /// The Runner.
        runner: PlayerId,
        /// The Hunters, sorted.
        hunters: Vec<PlayerId>,
    },
    /// The border crossed a 25 % step.
    BorderMilestone {
        /// 25, 50, 75, or 100.
        percent: u8,
        /// Diameter at the milestone.
        diameter: f64,
    },
    /// A Hunter was permanently eliminated.
    HunterEliminated {
        /// Who.
        player: PlayerId,
    },
    /// The match was decided.
    Victory(VictoryOutcome),
    /// The match was forced back to idle.
    MatchStopped {
        /// Phase at the time of the stop.
        phase: MatchPhase,
        /// Why.
        cause: String,
    },
}

impl MatchEvent {
    /// Timestamped record for the JSONL stream.
    #[must_use]
    pub fn record(&self) -> Event {
        let timestamp = Utc::now();
        match self.clone() {
            Self::MatchStarted { online_players } => Event::MatchStarted {
                timestamp,
                online_players,
            },
            Self::PhaseChanged { from, to } => Event::PhaseChanged {
                timestamp,
                from,
                to,
            },
            Self::TeamsAssigned { runner, hunters } => Event::TeamsAssigned {
                timestamp,
                runner,
                hunters,
            },
            Self::BorderMilestone { percent, diameter } => Event::BorderMilestone {
                timestamp,
                percent,
                diameter,
            },
            Self::HunterEliminated { player } => Event::HunterEliminated { timestamp, player },
            Self::Victory(outcome) => Event::Victory {
                timestamp,
                winner: outcome.winner,
                reason: outcome.reason,
            },
            Self::MatchStopped { phase, cause } => Event::MatchStopped {
                timestamp,
                phase,
                cause,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::victory::VictoryTrigger;

    #[test]
    fn victory_record_carries_winner_and_reason() {
        let event = MatchEvent::Victory(VictoryTrigger::DragonSlain.outcome());
        let json = serde_json::to_value(event.record()).unwrap();
        assert_eq!(json["type"], "Victory");
        assert_eq!(json["winner"], "runner");
        assert_eq!(json["reason"], "Runner defeated the Dragon!");
    }

    #[test]
    fn subscriber_form_is_snake_case_tagged() {
        let event = MatchEvent::PhaseChanged {
            from: MatchPhase::Idle,
            to: MatchPhase::Lobby,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["to"], "lobby");
    }
}

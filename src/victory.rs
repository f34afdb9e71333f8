//! Victory outcomes and the catalogue of conditions that can produce them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side that won the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// The Runner survived or completed the objective.
    Runner,
    /// The Hunter team caught or outlasted the Runner.
    Hunters,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runner => f.write_str("Runner"),
            Self::Hunters => f.write_str("Hunters"),
        }
    }
}

/// Result of a match, produced at most once per match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryOutcome {
    /// Winning side.
    pub winner: Winner,
    /// Human-readable reason.
    pub reason: String,
}

impl VictoryOutcome {
    /// Creates a new outcome.
    #[must_use]
    pub fn new(winner: Winner, reason: impl Into<String>) -> Self {
        Self {
            winner,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for VictoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Victory: {}", self.winner, self.reason)
    }
}

/// Game events that can decide a match.
///
/// Detection lives with the host; the engine only decides whether a
/// reported trigger is enabled and which side it favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VictoryTrigger {
    /// The Runner landed the killing blow on the dragon.
    DragonSlain,
    /// The Runner crafted the victory item.
    VictoryItemCrafted,
    /// Every Hunter has been permanently eliminated.
    LastHunterStanding,
    /// The Runner died.
    RunnerEliminated,
    /// The Runner stayed disconnected past the grace window.
    RunnerDisconnectTimeout,
}

impl VictoryTrigger {
    /// Every known trigger, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::DragonSlain,
        Self::VictoryItemCrafted,
        Self::LastHunterStanding,
        Self::RunnerEliminated,
        Self::RunnerDisconnectTimeout,
    ];

    /// Side this trigger awards the match to.
    #[must_use]
    pub const fn winner(self) -> Winner {
        match self {
            Self::DragonSlain | Self::VictoryItemCrafted | Self::LastHunterStanding => {
                Winner::Runner
            }
            Self::RunnerEliminated | Self::RunnerDisconnectTimeout => Winner::Hunters,
        }
    }

    /// Canonical reason text announced with the outcome.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::DragonSlain => "Runner defeated the Dragon!",
            Self::VictoryItemCrafted => "Runner crafted the victory item!",
            Self::LastHunterStanding => "All hunters eliminated",
            Self::RunnerEliminated => "Runner eliminated",
            Self::RunnerDisconnectTimeout => "Runner disconnect timeout",
        }
    }

    /// Stable kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DragonSlain => "dragon-slain",
            Self::VictoryItemCrafted => "victory-item-crafted",
            Self::LastHunterStanding => "last-hunter-standing",
            Self::RunnerEliminated => "runner-eliminated",
            Self::RunnerDisconnectTimeout => "runner-disconnect-timeout",
        }
    }

    /// Outcome this trigger produces.
    #[must_use]
    pub fn outcome(self) -> VictoryOutcome {
        VictoryOutcome::new(self.winner(), self.reason())
    }
}

impl fmt::Display for VictoryTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VictoryTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown victory trigger '{s}'"))
    }
}

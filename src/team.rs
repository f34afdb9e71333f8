//! Team registry.
//!
//! Tracks the single Runner, the Hunter set, and which Hunters are
//! permanently out. The eliminated set is always a subset of the Hunter
//! set and the Runner is never a Hunter.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::error::TeamError;
use crate::host::{PlayerId, Role};

/// Result of a successful team assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The chosen Runner.
    pub runner: PlayerId,
    /// Everyone else.
    pub hunters: BTreeSet<PlayerId>,
}

impl Assignment {
    /// Every participant paired with their role, Runner first.
    pub fn roles(&self) -> impl Iterator<Item = (&PlayerId, Role)> {
        std::iter::once((&self.runner, Role::Runner))
            .chain(self.hunters.iter().map(|h| (h, Role::Hunter)))
    }
}

/// Point-in-time copy of the roster for status queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterSnapshot {
    /// Current Runner, if assigned.
    pub runner: Option<PlayerId>,
    /// All Hunters, eliminated or not.
    pub hunters: BTreeSet<PlayerId>,
    /// Hunters that are permanently out.
    pub eliminated: BTreeSet<PlayerId>,
}

impl RosterSnapshot {
    /// Hunters still in play.
    #[must_use]
    pub fn active_hunters(&self) -> BTreeSet<PlayerId> {
        self.hunters.difference(&self.eliminated).cloned().collect()
    }
}

/// Runner/Hunter roster for one match.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    min_participants: usize,
    runner: Option<PlayerId>,
    hunters: BTreeSet<PlayerId>,
    eliminated: BTreeSet<PlayerId>,
}

impl TeamRegistry {
    /// Creates an empty registry requiring `min_players` participants.
    ///
    /// The floor is always two: one Runner and one Hunter.
    #[must_use]
    pub fn new(min_players: usize) -> Self {
        Self {
            min_participants: min_players.max(2),
            runner: None,
            hunters: BTreeSet::new(),
            eliminated: BTreeSet::new(),
        }
    }

    /// Picks one participant uniformly at random as Runner; everyone
    /// else becomes a Hunter. Any previous roster is discarded.
    ///
    /// Duplicate ids in `participants` are counted once.
    ///
    /// # Errors
    ///
    /// Returns [`TeamError::NotEnoughParticipants`] when fewer distinct
    /// participants than the minimum are offered. The roster is left
    /// untouched in that case.
    pub fn assign_teams<R: Rng + ?Sized>(
        &mut self,
        participants: &[PlayerId],
        rng: &mut R,
    ) -> Result<Assignment, TeamError> {
        let distinct: Vec<PlayerId> = participants
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if distinct.len() < self.min_participants {
            return Err(TeamError::NotEnoughParticipants {
                count: distinct.len(),
                min: self.min_participants,
            });
        }

        let runner = distinct
            .choose(rng)
            .cloned()
            .ok_or(TeamError::NotEnoughParticipants {
                count: 0,
                min: self.min_participants,
            })?;

        let hunters: BTreeSet<PlayerId> =
            distinct.into_iter().filter(|p| *p != runner).collect();

        self.runner = Some(runner.clone());
        self.hunters.clone_from(&hunters);
        self.eliminated.clear();

        Ok(Assignment { runner, hunters })
    }

    /// Current Runner, if assigned.
    #[must_use]
    pub const fn runner(&self) -> Option<&PlayerId> {
        self.runner.as_ref()
    }

    /// Whether `player` is the Runner.
    #[must_use]
    pub fn is_runner(&self, player: &PlayerId) -> bool {
        self.runner.as_ref() == Some(player)
    }

    /// Whether `player` is a Hunter (eliminated or not).
    #[must_use]
    pub fn is_hunter(&self, player: &PlayerId) -> bool {
        self.hunters.contains(player)
    }

    /// Whether `player` is a permanently eliminated Hunter.
    #[must_use]
    pub fn is_eliminated(&self, player: &PlayerId) -> bool {
        self.eliminated.contains(player)
    }

    /// Whether `player` is on either team.
    #[must_use]
    pub fn is_participant(&self, player: &PlayerId) -> bool {
        self.is_runner(player) || self.is_hunter(player)
    }

    /// Role of `player`, if they are on the roster.
    #[must_use]
    pub fn role_of(&self, player: &PlayerId) -> Option<Role> {
        if self.is_runner(player) {
            Some(Role::Runner)
        } else if self.is_hunter(player) {
            Some(Role::Hunter)
        } else {
            None
        }
    }

    /// Marks an active Hunter as permanently out.
    ///
    /// Returns `true` only if this call changed the roster.
    pub fn eliminate_hunter(&mut self, player: &PlayerId) -> bool {
        self.hunters.contains(player) && self.eliminated.insert(player.clone())
    }

    /// Hunters that are not eliminated.
    #[must_use]
    pub fn active_hunters(&self) -> BTreeSet<PlayerId> {
        self.hunters.difference(&self.eliminated).cloned().collect()
    }

    /// All Hunters, eliminated or not.
    #[must_use]
    pub const fn hunters(&self) -> &BTreeSet<PlayerId> {
        &self.hunters
    }

    /// Removes a Hunter from the roster entirely.
    ///
    /// Returns `true` if `player` was a Hunter.
    pub fn remove_hunter(&mut self, player: &PlayerId) -> bool {
        self.eliminated.remove(player);
        self.hunters.remove(player)
    }

    /// Whether a Runner has been assigned.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.runner.is_some()
    }

    /// Clears the roster.
    pub fn reset(&mut self) {
        self.runner = None;
        self.hunters.clear();
        self.eliminated.clear();
    }

    /// Copies the roster for status queries.
    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            runner: self.runner.clone(),
            hunters: self.hunters.clone(),
            eliminated: self.eliminated.clone(),
        }
    }
}

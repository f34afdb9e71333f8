//! Host collaborator interface.
//!
//! The match engine never touches worlds, inventories, or chat directly.
//! Everything with a side effect on the game server goes through
//! [`MatchHost`], a narrow fire-and-forget interface whose only return
//! contract is success or failure of the setup calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Unique player handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a new `PlayerId` from a handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Team a participant plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single pursued participant.
    Runner,
    /// A member of the pursuing team.
    Hunter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runner => f.write_str("Runner"),
            Self::Hunter => f.write_str("Hunter"),
        }
    }
}

/// Presentation tone of a notice; the host decides how to render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Neutral status information.
    Info,
    /// Confirmation addressed to a player.
    Success,
    /// Something went wrong or was rejected.
    Error,
    /// Match narration (eliminations, victories).
    Manhunt,
}

/// A message for one player or for everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// How the message should be presented.
    pub tone: Tone,
    /// Plain message text.
    pub text: String,
}

impl Notice {
    /// Creates an informational notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            text: text.into(),
        }
    }

    /// Creates a success notice.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            text: text.into(),
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            text: text.into(),
        }
    }

    /// Creates a match-narration notice.
    #[must_use]
    pub fn manhunt(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Manhunt,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.tone {
            Tone::Info => "[INFO]",
            Tone::Success => "[SUCCESS]",
            Tone::Error => "[ERROR]",
            Tone::Manhunt => "[MANHUNT]",
        };
        write!(f, "{prefix} {}", self.text)
    }
}

/// Lobby state pushed to the host's HUD hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStatus {
    /// Players currently online.
    pub online: usize,
    /// Players needed to start.
    pub required: usize,
    /// Seconds left on the countdown.
    pub seconds_remaining: u64,
}

/// Side-effecting capabilities the engine consumes from the game server.
///
/// All calls are made from the engine task and must not block. Only the
/// two `prepare_*` calls have a return contract: an error aborts the
/// phase entry that requested it and forces the match back to idle.
pub trait MatchHost: Send + Sync + 'static {
    /// Players currently connected.
    fn online_players(&self) -> Vec<PlayerId>;

    /// Whether `player` is currently connected.
    fn is_online(&self, player: &PlayerId) -> bool {
        self.online_players().iter().any(|p| p == player)
    }

    /// Sends a notice to everyone.
    fn broadcast(&self, notice: &Notice);

    /// Sends a notice to a single player.
    fn whisper(&self, player: &PlayerId, notice: &Notice);

    /// Creates the lobby area and gathers online players into it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Lobby`] if the lobby cannot be created.
    fn prepare_lobby(&self) -> Result<(), HostError>;

    /// Creates the match arena with its border at `border_diameter`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Arena`] if the arena cannot be created.
    fn prepare_arena(&self, border_diameter: f64, hunter_spawn_radius: f64)
    -> Result<(), HostError>;

    /// Moves the play-area boundary to `diameter`.
    fn set_border_diameter(&self, diameter: f64);

    /// Puts `player` into the competitive state for `role`.
    fn apply_role(&self, player: &PlayerId, role: Role);

    /// Puts `player` into the non-competitive observer state.
    fn set_observer(&self, player: &PlayerId);

    /// Respawns a dead Hunter within `radius` of the Runner.
    fn respawn_hunter(&self, hunter: &PlayerId, runner: &PlayerId, radius: f64);

    /// Starts giving Hunters a bearing on the Runner.
    fn start_hunter_tracking(&self, runner: &PlayerId, hunters: &[PlayerId]);

    /// Stops Hunter tracking. Must be safe to call when not tracking.
    fn stop_hunter_tracking(&self);

    /// Returns `player` to a neutral, non-match state.
    fn reset_player(&self, player: &PlayerId);

    /// Tears down the lobby area. Must be safe when none exists.
    fn release_lobby(&self) {}

    /// Tears down the match arena. Must be safe when none exists.
    fn release_arena(&self) {}

    /// Receives lobby status whenever it changes.
    fn show_lobby_status(&self, _status: &LobbyStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_display_prefixes_tone() {
        assert_eq!(Notice::info("hello").to_string(), "[INFO] hello");
        assert_eq!(Notice::error("nope").to_string(), "[ERROR] nope");
        assert_eq!(Notice::manhunt("run").to_string(), "[MANHUNT] run");
        assert_eq!(Notice::success("ok").to_string(), "[SUCCESS] ok");
    }

    #[test]
    fn player_id_serializes_transparently() {
        let id = PlayerId::new("steve");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"steve\"");
        assert_eq!(id.to_string(), "steve");
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Runner.to_string(), "Runner");
        assert_eq!(Role::Hunter.to_string(), "Hunter");
    }
}

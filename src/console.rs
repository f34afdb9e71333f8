//! Headless console.
//!
//! [`ConsoleHost`] is a [`MatchHost`] that keeps its "world" in memory
//! and prints every notice and side effect as a line of text. The
//! [`Console`] reads operator commands (one per line, shell-quoted) and
//! turns them into engine calls, so a whole match can be played from a
//! terminal or a script.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{HostError, MatchError};
use crate::host::{LobbyStatus, MatchHost, Notice, PlayerId, Role};
use crate::phase::{MatchHandle, MatchStatus};
use crate::victory::VictoryTrigger;

/// Command words understood by the console.
pub const COMMANDS: [&str; 9] = [
    "start", "stop", "join", "leave", "die", "win", "status", "help", "quit",
];

// ============================================================================
// Host
// ============================================================================

/// What a connected player is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Not in a match.
    Neutral,
    /// Playing with a role.
    Playing(Role),
    /// Watching.
    Observer,
}

/// In-memory host that narrates to a writer.
pub struct ConsoleHost {
    players: Mutex<BTreeMap<PlayerId, PlayerState>>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleHost")
            .field("players", &*self.players())
            .finish_non_exhaustive()
    }
}

impl ConsoleHost {
    /// Creates a host that writes to `out`.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            players: Mutex::new(BTreeMap::new()),
            out: Mutex::new(out),
        }
    }

    /// Creates a host that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Marks `player` online. Returns `false` if they already were.
    pub fn connect(&self, player: &PlayerId) -> bool {
        let mut players = self.players();
        if players.contains_key(player) {
            return false;
        }
        players.insert(player.clone(), PlayerState::Neutral);
        true
    }

    /// Marks `player` offline. Returns `false` if they were not online.
    pub fn disconnect(&self, player: &PlayerId) -> bool {
        self.players().remove(player).is_some()
    }

    /// State of an online player.
    #[must_use]
    pub fn state_of(&self, player: &PlayerId) -> Option<PlayerState> {
        self.players().get(player).copied()
    }

    fn players(&self) -> MutexGuard<'_, BTreeMap<PlayerId, PlayerState>> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, player: &PlayerId, state: PlayerState) {
        if let Some(slot) = self.players().get_mut(player) {
            *slot = state;
        }
    }

    /// Writes one line; output failures are ignored.
    pub fn say(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl MatchHost for ConsoleHost {
    fn online_players(&self) -> Vec<PlayerId> {
        self.players().keys().cloned().collect()
    }

    fn is_online(&self, player: &PlayerId) -> bool {
        self.players().contains_key(player)
    }

    fn broadcast(&self, notice: &Notice) {
        self.say(&notice.to_string());
    }

    fn whisper(&self, player: &PlayerId, notice: &Notice) {
        self.say(&format!("(to {player}) {notice}"));
    }

    fn prepare_lobby(&self) -> Result<(), HostError> {
        self.say("* lobby ready");
        Ok(())
    }

    fn prepare_arena(&self, border_diameter: f64, hunter_spawn_radius: f64) -> Result<(), HostError> {
        self.say(&format!(
            "* arena ready: border {border_diameter:.0}, hunters spawn within {hunter_spawn_radius:.0}"
        ));
        Ok(())
    }

    fn set_border_diameter(&self, diameter: f64) {
        debug!(diameter, "border moved");
    }

    fn apply_role(&self, player: &PlayerId, role: Role) {
        self.set_state(player, PlayerState::Playing(role));
    }

    fn set_observer(&self, player: &PlayerId) {
        self.set_state(player, PlayerState::Observer);
    }

    fn respawn_hunter(&self, hunter: &PlayerId, runner: &PlayerId, radius: f64) {
        self.set_state(hunter, PlayerState::Playing(Role::Hunter));
        self.say(&format!("* {hunter} respawned within {radius:.0} of {runner}"));
    }

    fn start_hunter_tracking(&self, runner: &PlayerId, hunters: &[PlayerId]) {
        debug!(%runner, hunters = hunters.len(), "tracking started");
    }

    fn stop_hunter_tracking(&self) {
        debug!("tracking stopped");
    }

    fn reset_player(&self, player: &PlayerId) {
        self.set_state(player, PlayerState::Neutral);
    }

    fn release_arena(&self) {
        debug!("arena released");
    }

    fn show_lobby_status(&self, status: &LobbyStatus) {
        debug!(
            online = status.online,
            required = status.required,
            remaining = status.seconds_remaining,
            "lobby status"
        );
    }
}

// ============================================================================
// Commands
// ============================================================================

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a match.
    Start,
    /// Force the match back to idle.
    Stop,
    /// Connect a player.
    Join(PlayerId),
    /// Disconnect a player.
    Leave(PlayerId),
    /// A player died.
    Die(PlayerId),
    /// Report a victory trigger.
    Win(VictoryTrigger),
    /// Print the match status.
    Status,
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
}

/// Why a console line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unbalanced quotes.
    #[error("could not split input (check quoting)")]
    Quoting,
    /// The first word is not a command.
    #[error("unknown command '{word}'{}", did_you_mean(.suggestion))]
    Unknown {
        /// What was typed.
        word: String,
        /// Closest known command, if any is close.
        suggestion: Option<String>,
    },
    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// The argument is not a known victory trigger.
    #[error("{message}{}", did_you_mean(.suggestion))]
    Trigger {
        /// Parse failure text.
        message: String,
        /// Closest trigger name, if any is close.
        suggestion: Option<String>,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

/// Returns the closest candidate if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(|c| (c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

/// Parses one console line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns a [`ParseError`] describing what is wrong with the line.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = shlex::split(trimmed).ok_or(ParseError::Quoting)?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let player = |usage: &'static str| match args {
        [name] => Ok(PlayerId::new(name.as_str())),
        _ => Err(ParseError::Usage(usage)),
    };
    let bare = |command: ConsoleCommand, usage: &'static str| {
        if args.is_empty() {
            Ok(command)
        } else {
            Err(ParseError::Usage(usage))
        }
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => bare(ConsoleCommand::Start, "start")?,
        "stop" => bare(ConsoleCommand::Stop, "stop")?,
        "status" => bare(ConsoleCommand::Status, "status")?,
        "help" => bare(ConsoleCommand::Help, "help")?,
        "quit" | "exit" => bare(ConsoleCommand::Quit, "quit")?,
        "join" => ConsoleCommand::Join(player("join <player>")?),
        "leave" => ConsoleCommand::Leave(player("leave <player>")?),
        "die" => ConsoleCommand::Die(player("die <player>")?),
        "win" => {
            let [name] = args else {
                return Err(ParseError::Usage("win <trigger>"));
            };
            let trigger = name.parse::<VictoryTrigger>().map_err(|message| {
                ParseError::Trigger {
                    message,
                    suggestion: suggest(name, VictoryTrigger::ALL.map(VictoryTrigger::name)),
                }
            })?;
            ConsoleCommand::Win(trigger)
        }
        other => {
            return Err(ParseError::Unknown {
                word: other.to_string(),
                suggestion: suggest(other, COMMANDS),
            });
        }
    };
    Ok(Some(command))
}

/// Renders a status snapshot as text.
#[must_use]
pub fn format_status(status: &MatchStatus) -> String {
    use std::fmt::Write as _;

    let mut text = format!("phase: {}", status.phase);
    if let Some(runner) = &status.roster.runner {
        let _ = write!(text, "\nrunner: {runner}");
    }
    if !status.roster.hunters.is_empty() {
        let hunters: Vec<String> = status
            .roster
            .hunters
            .iter()
            .map(|h| {
                if status.roster.eliminated.contains(h) {
                    format!("{h} (out)")
                } else {
                    h.to_string()
                }
            })
            .collect();
        let _ = write!(text, "\nhunters: {}", hunters.join(", "));
    }
    if status.border.active || status.border.final_reached {
        let _ = write!(
            text,
            "\nborder: {:.0} ({:.0}%)",
            status.border.diameter(),
            status.border.progress * 100.0
        );
    }
    if let Some(outcome) = &status.outcome {
        let _ = write!(text, "\noutcome: {outcome}");
    }
    text
}

// ============================================================================
// Console
// ============================================================================

/// Whether the console should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop reading.
    Quit,
}

/// Binds console commands to an engine.
#[derive(Debug, Clone)]
pub struct Console {
    handle: MatchHandle,
    host: std::sync::Arc<ConsoleHost>,
}

impl Console {
    /// Creates a console driving `handle` through `host`.
    #[must_use]
    pub const fn new(handle: MatchHandle, host: std::sync::Arc<ConsoleHost>) -> Self {
        Self { handle, host }
    }

    /// The engine this console drives.
    #[must_use]
    pub const fn handle(&self) -> &MatchHandle {
        &self.handle
    }

    /// Runs one command.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EngineStopped`] if the engine is gone.
    pub async fn execute(&self, command: ConsoleCommand) -> Result<Flow, MatchError> {
        match command {
            ConsoleCommand::Start => {
                // Rejections are already broadcast by the engine.
                let _ = self.handle.request_start().await;
            }
            ConsoleCommand::Stop => {
                if !self.handle.force_stop().await? {
                    self.host.say("no match is running");
                }
            }
            ConsoleCommand::Join(player) => {
                if self.host.connect(&player) {
                    self.host.say(&format!("* {player} joined"));
                    self.handle.notify_player_joined(player).await?;
                } else {
                    self.host.say(&format!("{player} is already online"));
                }
            }
            ConsoleCommand::Leave(player) => {
                if !self.host.disconnect(&player) {
                    self.host.say(&format!("{player} is not online"));
                    return Ok(Flow::Continue);
                }
                self.host.say(&format!("* {player} left"));
                let roster = self.handle.roster().await?;
                if roster.runner.as_ref() == Some(&player) {
                    self.handle.notify_runner_disconnected(player).await?;
                } else if roster.hunters.contains(&player) {
                    self.handle.notify_hunter_disconnected(player).await?;
                }
            }
            ConsoleCommand::Die(player) => {
                let roster = self.handle.roster().await?;
                if roster.runner.as_ref() == Some(&player) {
                    self.handle.notify_runner_eliminated(player).await?;
                } else if roster.hunters.contains(&player) {
                    self.handle.notify_hunter_eliminated(player).await?;
                } else {
                    self.host.say(&format!("{player} is not playing"));
                }
            }
            ConsoleCommand::Win(trigger) => {
                if !self.handle.report_trigger(trigger).await? {
                    self.host
                        .say(&format!("'{trigger}' did not decide the match"));
                }
            }
            ConsoleCommand::Status => {
                let status = self.handle.status().await?;
                self.host.say(&format_status(&status));
            }
            ConsoleCommand::Help => {
                self.host.say(&format!("commands: {}", COMMANDS.join(", ")));
            }
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Reads commands from `input` until EOF, `quit`, or cancellation.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails, or a match error if the
    /// engine stops underneath the console.
    pub async fn run<R>(&self, input: R, cancel: CancellationToken) -> Result<(), crate::error::ManhuntError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let line = tokio::select! {
                () = cancel.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else { break };

            match parse_command(&line) {
                Ok(Some(command)) => {
                    if self.execute(command).await? == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "rejected console input");
                    self.host.say(&format!("error: {err}"));
                }
            }
        }
        Ok(())
    }
}

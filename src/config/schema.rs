//! Match configuration schema.
//!
//! Every field has a default so an empty section, or an empty file
//! section, is never an error. Durations accept either whole seconds
//! (`60`) or humantime strings (`"1m"`, `"20m"`, `"1h 30s"`).

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::victory::VictoryTrigger;

/// Immutable tunables for one match engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MatchConfig {
    /// Phase lengths.
    pub durations: DurationConfig,
    /// Play-area boundary.
    pub border: BorderConfig,
    /// Player-count bounds and spawn radii.
    pub players: PlayerConfig,
    /// Lobby countdown announcements.
    pub lobby: LobbyConfig,
    /// Short delays used during the running phase.
    pub timers: TimerConfig,
    /// Enabled victory conditions.
    pub victory: VictoryConfig,
    /// Engine cadence and randomness.
    pub engine: EngineConfig,
}

/// Phase lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DurationConfig {
    /// Lobby countdown length.
    #[serde(with = "duration_format")]
    pub lobby: Duration,
    /// Runner head start before the hunt begins.
    #[serde(with = "duration_format")]
    pub preparation: Duration,
    /// Time for the border to go from initial to final size.
    #[serde(with = "duration_format")]
    pub border_shrink: Duration,
    /// Observer period after a victory.
    #[serde(with = "duration_format")]
    pub ending: Duration,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            lobby: Duration::from_secs(60),
            preparation: Duration::from_secs(30),
            border_shrink: Duration::from_secs(20 * 60),
            ending: Duration::from_secs(10),
        }
    }
}

/// Border diameters in blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BorderConfig {
    /// Diameter when the running phase starts.
    pub initial_size: f64,
    /// Diameter once the shrink completes.
    pub final_size: f64,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            initial_size: 4000.0,
            final_size: 100.0,
        }
    }
}

/// Player-count bounds and spawn radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlayerConfig {
    /// Fewest online players a match may start with.
    pub min_players: usize,
    /// Most online players a match may start with.
    pub max_players: usize,
    /// Radius around the Runner where Hunters first spawn.
    pub hunter_spawn_radius: f64,
    /// Radius around the Runner where dead Hunters respawn.
    pub hunter_respawn_radius: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 10,
            hunter_spawn_radius: 500.0,
            hunter_respawn_radius: 100.0,
        }
    }
}

/// Lobby countdown announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LobbyConfig {
    /// Seconds-remaining values at which the countdown is broadcast.
    pub announce_at: BTreeSet<u64>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            announce_at: [60, 30, 15, 10, 5, 4, 3, 2, 1].into_iter().collect(),
        }
    }
}

/// Short delays used during the running phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimerConfig {
    /// Pause between announcing a victory and entering the ending phase.
    #[serde(with = "duration_format")]
    pub victory_delay: Duration,
    /// Delay before a dead Hunter respawns near the Runner.
    #[serde(with = "duration_format")]
    pub hunter_respawn_delay: Duration,
    /// How long a disconnected Runner has to come back.
    #[serde(with = "duration_format")]
    pub runner_disconnect_grace: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            victory_delay: Duration::from_secs(5),
            hunter_respawn_delay: Duration::from_secs(5),
            runner_disconnect_grace: Duration::from_secs(5 * 60),
        }
    }
}

/// Enabled victory conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct VictoryConfig {
    /// Triggers the engine honours when reported.
    pub triggers: BTreeSet<VictoryTrigger>,
}

impl Default for VictoryConfig {
    fn default() -> Self {
        Self {
            triggers: VictoryTrigger::ALL.into_iter().collect(),
        }
    }
}

impl VictoryConfig {
    /// Whether `trigger` is enabled.
    #[must_use]
    pub fn is_enabled(&self, trigger: VictoryTrigger) -> bool {
        self.triggers.contains(&trigger)
    }
}

/// Engine cadence and randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Update ticks per second.
    pub tick_rate: u32,
    /// How often the border scheduler recomputes progress.
    #[serde(with = "duration_format")]
    pub border_poll_interval: Duration,
    /// Fixed seed for Runner selection; random when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            border_poll_interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Period between two update ticks.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

/// Serde adapter accepting integer seconds or humantime strings.
pub mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    /// Serializes as a humantime string (e.g. `"20m"`).
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    /// Deserializes from whole seconds or a humantime string.
    ///
    /// # Errors
    ///
    /// Returns a custom error if the string is not a valid duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => humantime::parse_duration(text.trim())
                .map_err(|e| serde::de::Error::custom(format!("invalid duration '{text}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = MatchConfig::default();
        assert_eq!(config.durations.lobby, Duration::from_secs(60));
        assert_eq!(config.durations.preparation, Duration::from_secs(30));
        assert_eq!(config.durations.border_shrink, Duration::from_secs(1200));
        assert_eq!(config.durations.ending, Duration::from_secs(10));
        assert!((config.border.initial_size - 4000.0).abs() < f64::EPSILON);
        assert!((config.border.final_size - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.players.min_players, 2);
        assert_eq!(config.players.max_players, 10);
        assert_eq!(config.timers.runner_disconnect_grace, Duration::from_secs(300));
        assert_eq!(config.engine.tick_rate, 20);
        assert_eq!(config.victory.triggers.len(), VictoryTrigger::ALL.len());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config: MatchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn durations_accept_seconds_and_humantime() {
        let yaml = "durations:\n  lobby: 90\n  border-shrink: 15m\n";
        let config: MatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.durations.lobby, Duration::from_secs(90));
        assert_eq!(config.durations.border_shrink, Duration::from_secs(900));
        assert_eq!(config.durations.ending, Duration::from_secs(10));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let yaml = "durations:\n  lobby: soon\n";
        assert!(serde_yaml::from_str::<MatchConfig>(yaml).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "players:\n  min: 3\n";
        assert!(serde_yaml::from_str::<MatchConfig>(yaml).is_err());
    }

    #[test]
    fn victory_triggers_can_be_narrowed() {
        let yaml = "victory:\n  triggers: [dragon-slain, runner-eliminated]\n";
        let config: MatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.victory.is_enabled(VictoryTrigger::DragonSlain));
        assert!(!config.victory.is_enabled(VictoryTrigger::VictoryItemCrafted));
    }

    #[test]
    fn tick_period_from_rate() {
        let engine = EngineConfig::default();
        assert_eq!(engine.tick_period(), Duration::from_millis(50));
    }

    #[test]
    fn durations_serialize_as_humantime() {
        let yaml = serde_yaml::to_string(&DurationConfig::default()).unwrap();
        assert!(yaml.contains("border-shrink"));
        assert!(yaml.contains("20m"));
    }
}

//! Configuration validation.
//!
//! Runs on the fully deserialized [`MatchConfig`]. Validation collects
//! every issue instead of stopping at the first one so an operator can
//! fix a file in one pass.

use std::time::Duration;

use crate::config::schema::MatchConfig;
use crate::error::{Severity, ValidationIssue};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &MatchConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_players(config);
        self.validate_border(config);
        self.validate_durations(config);
        self.validate_engine(config);
        self.validate_victory(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_players(&mut self, config: &MatchConfig) {
        let players = &config.players;

        // A match needs one Runner and at least one Hunter.
        if players.min_players < 2 {
            self.add_error(
                "players.min-players",
                &format!("must be at least 2, got {}", players.min_players),
            );
        }

        if players.max_players < players.min_players {
            self.add_error(
                "players.max-players",
                &format!(
                    "must not be below min-players ({} < {})",
                    players.max_players, players.min_players
                ),
            );
        }

        if !players.hunter_spawn_radius.is_finite() || players.hunter_spawn_radius < 0.0 {
            self.add_error("players.hunter-spawn-radius", "must be a non-negative number");
        }

        if !players.hunter_respawn_radius.is_finite() || players.hunter_respawn_radius < 0.0 {
            self.add_error(
                "players.hunter-respawn-radius",
                "must be a non-negative number",
            );
        }
    }

    fn validate_border(&mut self, config: &MatchConfig) {
        let border = &config.border;

        if !border.initial_size.is_finite() || border.initial_size <= 0.0 {
            self.add_error("border.initial-size", "must be a positive number");
        }

        if !border.final_size.is_finite() || border.final_size <= 0.0 {
            self.add_error("border.final-size", "must be a positive number");
        }

        if border.final_size > border.initial_size {
            self.add_error(
                "border.final-size",
                &format!(
                    "must not exceed initial-size ({} > {})",
                    border.final_size, border.initial_size
                ),
            );
        }
    }

    fn validate_durations(&mut self, config: &MatchConfig) {
        let durations = &config.durations;

        if durations.lobby.is_zero() {
            self.add_error("durations.lobby", "must be longer than zero");
        }

        if durations.border_shrink.is_zero() {
            self.add_warning(
                "durations.border-shrink",
                "border reaches its final size immediately; hunters will never respawn",
            );
        }

        let lobby_secs = durations.lobby.as_secs();
        if let Some(&first) = config.lobby.announce_at.last() {
            if first > lobby_secs {
                self.add_warning(
                    "lobby.announce-at",
                    &format!("announcement at {first}s is never reached by a {lobby_secs}s lobby"),
                );
            }
        }

        if config.timers.runner_disconnect_grace < Duration::from_secs(1) {
            self.add_warning(
                "timers.runner-disconnect-grace",
                "a Runner disconnect decides the match almost immediately",
            );
        }
    }

    fn validate_engine(&mut self, config: &MatchConfig) {
        if config.engine.tick_rate == 0 {
            self.add_error("engine.tick-rate", "must be at least 1");
        }

        if config.engine.border_poll_interval.is_zero() {
            self.add_error("engine.border-poll-interval", "must be longer than zero");
        }
    }

    fn validate_victory(&mut self, config: &MatchConfig) {
        if config.victory.triggers.is_empty() {
            self.add_warning(
                "victory.triggers",
                "no victory triggers enabled; matches can only end by force-stop",
            );
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

//! Error types for `manhunt`
//!
//! This module provides the error hierarchy used by the match engine,
//! the configuration loader, and the command-line surface, plus the
//! process exit codes derived from it.

use std::path::PathBuf;
use thiserror::Error;

use crate::host::PlayerId;
use crate::phase::MatchPhase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `manhunt` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Match engine error (engine stopped, invariant violation)
    pub const MATCH_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `manhunt` operations.
///
/// Aggregates all domain-specific errors and maps them to exit codes.
#[derive(Debug, Error)]
pub enum ManhuntError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Match engine error
    #[error(transparent)]
    Match(#[from] MatchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ManhuntError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Match(_) => ExitCode::MATCH_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "players.min_players")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Match Engine Errors
// ============================================================================

/// Errors raised inside the match engine.
///
/// None of these escape a running engine: the orchestrator catches them at
/// its boundary, logs them, and converts them into a forced stop.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A transition outside the adjacency table was requested
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition {
        /// Phase the match was in
        from: MatchPhase,
        /// Phase that was requested
        to: MatchPhase,
    },

    /// A phase could not finish its setup
    #[error("setup failed while entering {phase}: {reason}")]
    SetupFailed {
        /// Phase whose entry failed
        phase: MatchPhase,
        /// Human-readable cause
        reason: String,
    },

    /// Team assignment failed
    #[error(transparent)]
    Team(#[from] TeamError),

    /// The host collaborator reported a failure
    #[error(transparent)]
    Host(#[from] HostError),

    /// The engine task is no longer running
    #[error("match engine is not running")]
    EngineStopped,
}

/// Reasons a start request is rejected.
///
/// These are operator errors: the engine reports them through the
/// messaging collaborator and leaves the phase untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// A match is already in progress
    #[error("a match is already running ({phase})")]
    AlreadyActive {
        /// Phase the running match is in
        phase: MatchPhase,
    },

    /// Fewer players are online than the configured minimum
    #[error("not enough players: {online} online, need at least {min}")]
    NotEnoughPlayers {
        /// Players currently online
        online: usize,
        /// Configured minimum
        min: usize,
    },

    /// More players are online than the configured maximum
    #[error("too many players: {online} online, maximum is {max}")]
    TooManyPlayers {
        /// Players currently online
        online: usize,
        /// Configured maximum
        max: usize,
    },

    /// The engine task is no longer running
    #[error("match engine is not running")]
    EngineStopped,
}

/// Team registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    /// Not enough participants to form a Runner and at least one Hunter
    #[error("cannot assign teams: {count} participants, need at least {min}")]
    NotEnoughParticipants {
        /// Participants offered
        count: usize,
        /// Required minimum
        min: usize,
    },
}

/// Failures reported by the host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The lobby area could not be prepared
    #[error("lobby preparation failed: {0}")]
    Lobby(String),

    /// The match arena could not be prepared
    #[error("arena preparation failed: {0}")]
    Arena(String),

    /// An operation targeted a player the host does not know
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `manhunt` operations.
pub type Result<T> = std::result::Result<T, ManhuntError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::MATCH_ERROR, 5);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_match_error_exit_code() {
        let err: ManhuntError = MatchError::InvalidTransition {
            from: MatchPhase::Idle,
            to: MatchPhase::Ending,
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::MATCH_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: ManhuntError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: ManhuntError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = MatchError::InvalidTransition {
            from: MatchPhase::Lobby,
            to: MatchPhase::Ending,
        };
        assert_eq!(err.to_string(), "invalid phase transition: lobby -> ending");
    }

    #[test]
    fn test_start_error_display() {
        let err = StartError::NotEnoughPlayers { online: 1, min: 2 };
        assert_eq!(
            err.to_string(),
            "not enough players: 1 online, need at least 2"
        );
    }

    #[test]
    fn test_team_error_converts_to_match_error() {
        let err: MatchError = TeamError::NotEnoughParticipants { count: 1, min: 2 }.into();
        assert!(matches!(err, MatchError::Team(_)));
        assert!(err.to_string().contains("1 participants"));
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "players.min_players".to_string(),
            message: "must be at least 2".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: must be at least 2 at players.min_players"
        );
    }

    #[test]
    fn test_config_error_env_var_display() {
        let err = ConfigError::EnvVarNotSet {
            var: "LOBBY_SECONDS".to_string(),
            location: "durations.lobby".to_string(),
        };
        assert!(err.to_string().contains("LOBBY_SECONDS"));
        assert!(err.to_string().contains("durations.lobby"));
    }
}

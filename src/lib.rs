//! `manhunt` - match orchestration for Runner-versus-Hunters games
//!
//! The library drives one match at a time through
//! `Idle → Lobby → Preparation → Running → Ending → Idle`. A single engine
//! task owns the phase, the roster, the shrinking border and every timer;
//! the game server is reached only through the [`host::MatchHost`] trait.

pub mod border;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod observability;
pub mod phase;
pub mod team;
pub mod victory;

//! Match phase engine
//!
//! Drives one match through `Idle -> Lobby -> Preparation -> Running ->
//! Ending -> Idle`, with a forced return to idle from any active phase.
//!
//! # Architecture
//!
//! - [`PhaseCell`] - Lock-free live phase, advanced via CAS
//! - [`MatchEngine`] - Actor owning all match state
//! - [`MatchHandle`] - Cloneable async API to the actor
//! - [`handlers`] - Per-phase behaviour behind [`PhaseHandler`]
//! - [`timer`] - Cancellable delayed work reporting back to the actor

pub mod context;
pub mod engine;
pub mod event;
pub mod handlers;
pub mod state;
pub mod timer;

pub use context::MatchContext;
pub use engine::{MatchEngine, MatchHandle, MatchStatus, PlayerEvent};
pub use event::MatchEvent;
pub use handlers::PhaseHandler;
pub use state::{MatchPhase, PhaseCell};
pub use timer::{TimerHandle, TimerKind};

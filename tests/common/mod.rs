//! Shared integration-test harness: a recording `MatchHost`, a fast match
//! configuration, and helpers for stepping a match through virtual time.

#![allow(dead_code)]

use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use manhunt::config::MatchConfig;
use manhunt::error::HostError;
use manhunt::host::{LobbyStatus, MatchHost, Notice, PlayerId, Role};
use manhunt::observability::EventEmitter;
use manhunt::phase::{MatchEngine, MatchEvent, MatchHandle, MatchPhase};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Everything the engine asked the host to do.
#[derive(Debug, Default)]
pub struct Record {
    pub broadcasts: Vec<Notice>,
    pub whispers: Vec<(PlayerId, Notice)>,
    pub roles: Vec<(PlayerId, Role)>,
    pub observers: Vec<PlayerId>,
    pub respawns: Vec<PlayerId>,
    pub resets: Vec<PlayerId>,
    pub diameters: Vec<f64>,
    pub lobby_status: Vec<LobbyStatus>,
    pub arenas: usize,
    pub arena_releases: usize,
    pub tracking: bool,
}

/// `MatchHost` that records every call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    online: Mutex<Vec<PlayerId>>,
    record: Mutex<Record>,
    fail_arena: bool,
}

impl RecordingHost {
    pub fn with_players(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            online: Mutex::new(names.iter().map(|n| PlayerId::from(*n)).collect()),
            ..Self::default()
        })
    }

    pub fn failing_arena(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            online: Mutex::new(names.iter().map(|n| PlayerId::from(*n)).collect()),
            fail_arena: true,
            ..Self::default()
        })
    }

    pub fn connect(&self, name: &str) {
        let player = PlayerId::from(name);
        let mut online = self.online.lock().unwrap();
        if !online.contains(&player) {
            online.push(player);
        }
    }

    pub fn disconnect(&self, player: &PlayerId) {
        self.online.lock().unwrap().retain(|p| p != player);
    }

    pub fn record(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap()
    }

    pub fn broadcast_texts(&self) -> Vec<String> {
        self.record()
            .broadcasts
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn broadcast_contains(&self, needle: &str) -> bool {
        self.broadcast_texts().iter().any(|t| t.contains(needle))
    }

    pub fn whispers_to(&self, player: &PlayerId) -> Vec<String> {
        self.record()
            .whispers
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, n)| n.text.clone())
            .collect()
    }
}

impl MatchHost for RecordingHost {
    fn online_players(&self) -> Vec<PlayerId> {
        self.online.lock().unwrap().clone()
    }

    fn broadcast(&self, notice: &Notice) {
        self.record().broadcasts.push(notice.clone());
    }

    fn whisper(&self, player: &PlayerId, notice: &Notice) {
        self.record().whispers.push((player.clone(), notice.clone()));
    }

    fn prepare_lobby(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn prepare_arena(&self, _border: f64, _radius: f64) -> Result<(), HostError> {
        if self.fail_arena {
            return Err(HostError::Arena("world generation failed".into()));
        }
        self.record().arenas += 1;
        Ok(())
    }

    fn set_border_diameter(&self, diameter: f64) {
        self.record().diameters.push(diameter);
    }

    fn apply_role(&self, player: &PlayerId, role: Role) {
        self.record().roles.push((player.clone(), role));
    }

    fn set_observer(&self, player: &PlayerId) {
        self.record().observers.push(player.clone());
    }

    fn respawn_hunter(&self, hunter: &PlayerId, _runner: &PlayerId, _radius: f64) {
        self.record().respawns.push(hunter.clone());
    }

    fn start_hunter_tracking(&self, _runner: &PlayerId, _hunters: &[PlayerId]) {
        self.record().tracking = true;
    }

    fn stop_hunter_tracking(&self) {
        self.record().tracking = false;
    }

    fn reset_player(&self, player: &PlayerId) {
        self.record().resets.push(player.clone());
    }

    fn release_arena(&self) {
        self.record().arena_releases += 1;
    }

    fn show_lobby_status(&self, status: &LobbyStatus) {
        self.record().lobby_status.push(*status);
    }
}

/// Short phases so a full match fits in a few virtual seconds.
///
/// Lobby 3 s, preparation 2 s, border shrink 8 s, ending 2 s.
pub fn fast_config() -> MatchConfig {
    let mut config = MatchConfig::default();
    config.durations.lobby = Duration::from_secs(3);
    config.durations.preparation = Duration::from_secs(2);
    config.durations.border_shrink = Duration::from_secs(8);
    config.durations.ending = Duration::from_secs(2);
    config.timers.runner_disconnect_grace = Duration::from_secs(10);
    config.engine.seed = Some(7);
    config
}

/// A spawned engine plus its host and an event subscription.
pub struct Harness {
    pub host: Arc<RecordingHost>,
    pub handle: MatchHandle,
    pub events: broadcast::Receiver<MatchEvent>,
    pub engine: JoinHandle<()>,
}

impl Harness {
    pub fn spawn(config: MatchConfig, host: Arc<RecordingHost>) -> Self {
        let (handle, engine) = MatchEngine::spawn(
            Arc::new(config),
            Arc::clone(&host) as Arc<dyn MatchHost>,
            Arc::new(EventEmitter::noop()),
        );
        let events = handle.subscribe();
        Self {
            host,
            handle,
            events,
            engine,
        }
    }

    /// Polls until the live phase is `phase`, failing after `within`.
    pub async fn wait_for(&self, phase: MatchPhase, within: Duration) {
        let deadline = tokio::time::Instant::now() + within;
        while self.handle.current_phase() != phase {
            assert!(
                tokio::time::Instant::now() < deadline,
                "still in {} after {within:?}, expected {phase}",
                self.handle.current_phase()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Starts a match and waits until the hunt is on.
    pub async fn start_running(&self) {
        self.handle.request_start().await.unwrap();
        self.wait_for(MatchPhase::Running, Duration::from_secs(10))
            .await;
    }

    /// Returns the Runner and the sorted Hunters of the current match.
    pub async fn teams(&self) -> (PlayerId, Vec<PlayerId>) {
        let roster = self.handle.roster().await.unwrap();
        let runner = roster.runner.expect("runner assigned");
        (runner, roster.hunters.into_iter().collect())
    }

    /// Everything published so far.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

/// Runs the built binary to completion with `stdin` piped in.
pub fn run_binary(args: &[&str], stdin: &str) -> Output {
    use std::io::Write;

    let mut child = Command::new(env!("CARGO_BIN_EXE_manhunt"))
        .args(args)
        .env_remove("MANHUNT_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn manhunt");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for manhunt")
}

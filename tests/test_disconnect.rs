mod common;

use std::time::Duration;

use common::{Harness, RecordingHost, fast_config};
use manhunt::host::{PlayerId, Role};
use manhunt::phase::{MatchEvent, MatchPhase};
use manhunt::victory::{VictoryTrigger, Winner};

#[tokio::test(start_paused = true)]
async fn runner_grace_expiry_gives_hunters_the_win() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.start_running().await;
    let (runner, _) = h.teams().await;

    h.host.disconnect(&runner);
    h.handle.notify_runner_disconnected(runner).await.unwrap();
    assert!(h.host.broadcast_contains("The Runner disconnected!"));

    tokio::time::sleep(Duration::from_millis(9_900)).await;
    assert!(h.handle.outcome().await.unwrap().is_none());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let outcome = h.handle.outcome().await.unwrap().expect("decided");
    assert_eq!(outcome.winner, Winner::Hunters);
    assert_eq!(
        outcome.reason,
        VictoryTrigger::RunnerDisconnectTimeout.reason()
    );
}

#[tokio::test(start_paused = true)]
async fn runner_reconnect_cancels_grace_and_restores_role() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.start_running().await;
    let (runner, _) = h.teams().await;

    h.host.disconnect(&runner);
    h.handle
        .notify_runner_disconnected(runner.clone())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    h.host.connect(runner.as_str());
    h.handle.notify_player_joined(runner.clone()).await.unwrap();
    assert!(h.host.broadcast_contains("The Runner is back"));

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(h.handle.outcome().await.unwrap().is_none());
    assert_eq!(h.handle.current_phase(), MatchPhase::Running);

    let runner_roles = h
        .host
        .record()
        .roles
        .iter()
        .filter(|(p, role)| *p == runner && *role == Role::Runner)
        .count();
    assert_eq!(runner_roles, 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_runner_disconnect_keeps_original_deadline() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.start_running().await;
    let (runner, _) = h.teams().await;

    h.handle
        .notify_runner_disconnected(runner.clone())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;
    h.handle.notify_runner_disconnected(runner).await.unwrap();

    tokio::time::sleep(Duration::from_millis(4_100)).await;
    assert!(h.handle.outcome().await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn runner_grace_expiry_during_preparation_cancels_match() {
    let mut config = fast_config();
    config.durations.preparation = Duration::from_secs(30);
    let mut h = Harness::spawn(config, RecordingHost::with_players(&["alice", "bob"]));
    h.handle.request_start().await.unwrap();
    h.wait_for(MatchPhase::Preparation, Duration::from_secs(5))
        .await;
    let (runner, _) = h.teams().await;

    h.handle.notify_runner_disconnected(runner).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_100)).await;

    assert_eq!(h.handle.current_phase(), MatchPhase::Idle);
    assert!(h.host.broadcast_contains("The Runner did not return"));
    assert!(h.drain_events().iter().any(|e| matches!(
        e,
        MatchEvent::MatchStopped { cause, .. } if cause == "runner disconnect timeout"
    )));
}

#[tokio::test(start_paused = true)]
async fn runner_grace_survives_preparation_to_running() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.handle.request_start().await.unwrap();
    h.wait_for(MatchPhase::Preparation, Duration::from_secs(5))
        .await;
    let (runner, _) = h.teams().await;

    h.handle.notify_runner_disconnected(runner).await.unwrap();
    h.wait_for(MatchPhase::Running, Duration::from_secs(3)).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    let outcome = h.handle.outcome().await.unwrap().expect("decided");
    assert_eq!(outcome.winner, Winner::Hunters);
}

#[tokio::test(start_paused = true)]
async fn last_hunter_leaving_gives_runner_the_win() {
    let h = Harness::spawn(
        fast_config(),
        RecordingHost::with_players(&["alice", "bob", "carol"]),
    );
    h.start_running().await;
    let (_, hunters) = h.teams().await;

    h.host.disconnect(&hunters[0]);
    h.handle
        .notify_hunter_disconnected(hunters[0].clone())
        .await
        .unwrap();
    assert!(h.handle.outcome().await.unwrap().is_none());
    assert_eq!(h.handle.roster().await.unwrap().hunters.len(), 1);

    h.host.disconnect(&hunters[1]);
    h.handle
        .notify_hunter_disconnected(hunters[1].clone())
        .await
        .unwrap();
    let outcome = h.handle.outcome().await.unwrap().expect("decided");
    assert_eq!(outcome.winner, Winner::Runner);
    assert_eq!(outcome.reason, VictoryTrigger::LastHunterStanding.reason());
}

#[tokio::test(start_paused = true)]
async fn hunters_gone_before_the_hunt_give_runner_the_win() {
    let mut h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.handle.request_start().await.unwrap();
    h.wait_for(MatchPhase::Preparation, Duration::from_secs(5))
        .await;
    let (_, hunters) = h.teams().await;

    h.host.disconnect(&hunters[0]);
    h.handle
        .notify_hunter_disconnected(hunters[0].clone())
        .await
        .unwrap();
    assert!(h.handle.outcome().await.unwrap().is_none());

    h.wait_for(MatchPhase::Running, Duration::from_secs(3)).await;
    let outcome = h.handle.outcome().await.unwrap().expect("decided on entry");
    assert_eq!(outcome.winner, Winner::Runner);
    assert_eq!(outcome.reason, VictoryTrigger::LastHunterStanding.reason());

    h.wait_for(MatchPhase::Ending, Duration::from_secs(6)).await;
    let victories = h
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, MatchEvent::Victory(_)))
        .count();
    assert_eq!(victories, 1);
}

#[tokio::test(start_paused = true)]
async fn departed_hunter_returns_as_observer() {
    let h = Harness::spawn(
        fast_config(),
        RecordingHost::with_players(&["alice", "bob", "carol"]),
    );
    h.start_running().await;
    let (_, hunters) = h.teams().await;
    let leaver = hunters[0].clone();

    h.host.disconnect(&leaver);
    h.handle
        .notify_hunter_disconnected(leaver.clone())
        .await
        .unwrap();
    h.host.connect(leaver.as_str());
    h.handle.notify_player_joined(leaver.clone()).await.unwrap();

    assert!(h.host.record().observers.contains(&leaver));
    assert!(
        h.host
            .whispers_to(&leaver)
            .iter()
            .any(|w| w.contains("spectating"))
    );
}

#[tokio::test(start_paused = true)]
async fn rejoining_hunter_gets_role_back() {
    let h = Harness::spawn(
        fast_config(),
        RecordingHost::with_players(&["alice", "bob", "carol"]),
    );
    h.start_running().await;
    let (_, hunters) = h.teams().await;

    h.handle
        .notify_player_joined(hunters[1].clone())
        .await
        .unwrap();
    let hunter_roles = h
        .host
        .record()
        .roles
        .iter()
        .filter(|(p, role)| *p == hunters[1] && *role == Role::Hunter)
        .count();
    assert_eq!(hunter_roles, 2);
}

#[tokio::test(start_paused = true)]
async fn newcomer_during_match_spectates() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice", "bob"]));
    h.start_running().await;

    h.host.connect("zoe");
    h.handle.notify_player_joined("zoe".into()).await.unwrap();

    assert!(h.host.record().observers.contains(&"zoe".into()));
    assert!(
        !h.handle
            .roster()
            .await
            .unwrap()
            .hunters
            .contains(&PlayerId::from("zoe"))
    );
}

#[tokio::test(start_paused = true)]
async fn join_while_idle_does_nothing() {
    let h = Harness::spawn(fast_config(), RecordingHost::with_players(&["alice"]));
    h.host.connect("bob");
    h.handle.notify_player_joined("bob".into()).await.unwrap();

    let record = h.host.record();
    assert!(record.observers.is_empty());
    assert!(record.whispers.is_empty());
}

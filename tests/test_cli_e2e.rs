mod common;

use std::io::Write;

use common::run_binary;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_human() {
    let output = run_binary(&["version"], "");
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("manhunt "), "unexpected output: {text}");
    assert!(text.contains('.'));
}

#[test]
fn version_json() {
    let output = run_binary(&["version", "--format", "json"], "");
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "manhunt");
    assert!(parsed["version"].is_string());
}

#[test]
fn completions_bash() {
    let output = run_binary(&["completions", "bash"], "");
    assert!(output.status.success());
    assert!(stdout(&output).contains("manhunt"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_accepts_good_config() {
    let file = config_file("players:\n  min-players: 3\n");
    let output = run_binary(&["validate", file.path().to_str().unwrap()], "");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains(": ok"));
}

#[test]
fn validate_rejects_bad_config_with_config_exit_code() {
    let file = config_file("players:\n  min-players: 1\n");
    let output = run_binary(&["-q", "validate", file.path().to_str().unwrap()], "");
    assert_eq!(output.status.code(), Some(2));
    let text = stdout(&output);
    assert!(text.contains("invalid"), "unexpected output: {text}");
    assert!(text.contains("players.min-players"), "unexpected output: {text}");
}

#[test]
fn validate_missing_file_fails() {
    let output = run_binary(&["-q", "validate", "/nonexistent/match.yaml"], "");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_strict_fails_on_warnings() {
    let file = config_file("victory:\n  triggers: []\n");
    let path = file.path().to_str().unwrap();

    let lenient = run_binary(&["-q", "validate", path], "");
    assert!(lenient.status.success());

    let strict = run_binary(&["-q", "validate", "--strict", path], "");
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_substitutes_process_environment() {
    let file = config_file("durations:\n  lobby: ${MANHUNT_TEST_LOBBY}\n");
    let validate = |lobby: &str| {
        std::process::Command::new(env!("CARGO_BIN_EXE_manhunt"))
            .args(["-q", "validate", "--strict", file.path().to_str().unwrap()])
            .env("MANHUNT_TEST_LOBBY", lobby)
            .output()
            .unwrap()
    };

    // A lobby shorter than the first announcement is only a warning.
    assert!(validate("90s").status.success());
    assert_eq!(validate("5s").status.code(), Some(2));
}

#[test]
fn validate_json_reports_each_file() {
    let good = config_file("");
    let bad = config_file("border:\n  final-size: 9000\n");
    let output = run_binary(
        &[
            "-q",
            "validate",
            "--format",
            "json",
            good.path().to_str().unwrap(),
            bad.path().to_str().unwrap(),
        ],
        "",
    );
    assert_eq!(output.status.code(), Some(2));

    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_console_session() {
    let output = run_binary(
        &["-q", "run", "--no-events", "--player", "alice"],
        "join bob\njoin bob\nstatus\nstrat\nleave carol\nquit\n",
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = stdout(&output);
    assert!(text.contains("* bob joined"), "{text}");
    assert!(text.contains("bob is already online"), "{text}");
    assert!(text.contains("phase: idle"), "{text}");
    assert!(text.contains("did you mean 'start'"), "{text}");
    assert!(text.contains("carol is not online"), "{text}");
}

#[test]
fn run_auto_start_with_too_few_players_is_reported() {
    let output = run_binary(
        &["-q", "run", "--no-events", "--auto-start", "-p", "alice"],
        "",
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("Cannot start the match"));
}

#[test]
fn run_starts_a_match_and_stops_it() {
    let output = run_binary(
        &["-q", "run", "--no-events", "-p", "alice", "-p", "bob"],
        "start\nstatus\nstop\nstatus\n",
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("phase: lobby"), "{text}");
    assert!(text.contains("The match was stopped by an operator."), "{text}");
    assert!(text.contains("phase: idle"), "{text}");
}

#[test]
fn run_with_invalid_config_exits_with_config_code() {
    let file = config_file("players:\n  min-players: 0\n");
    let output = run_binary(
        &[
            "-q",
            "run",
            "--no-events",
            "--config",
            file.path().to_str().unwrap(),
        ],
        "",
    );
    assert_eq!(output.status.code(), Some(2));
}

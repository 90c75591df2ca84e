//! End-to-end tests for the survey CLI against an isolated data directory.

use std::process::Command;

fn waypoint(data_dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_waypoint-cli"))
        .env("WAYPOINT_DATA_DIR", data_dir)
        .args(args)
        .output()
        .expect("failed to run waypoint-cli")
}

#[test]
fn test_survey_list() {
    let dir = tempfile::tempdir().unwrap();
    let out = waypoint(dir.path(), &["survey", "list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("career-survey"));
    assert!(stdout.contains("personality-test"));
}

#[test]
fn test_unknown_survey_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = waypoint(dir.path(), &["survey", "status", "nope"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("unknown survey"));
}

#[test]
fn test_branch_choice_persists_across_invocations() {
    let dir = tempfile::tempdir().unwrap();

    let out = waypoint(dir.path(), &["survey", "branch", "career-survey", "yes"]);
    assert!(out.status.success());

    let out = waypoint(dir.path(), &["survey", "status", "career-survey"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("\"state\": \"in_module\""));

    // Choosing again is refused; the gate is immutable until reset.
    let out = waypoint(dir.path(), &["survey", "branch", "career-survey", "no"]);
    assert!(!out.status.success());
}

#[test]
fn test_answer_and_advance() {
    let dir = tempfile::tempdir().unwrap();
    waypoint(dir.path(), &["survey", "branch", "personality-test", "yes"]);

    // personality-test has no gate, so branch fails; answering works directly.
    let out = waypoint(
        dir.path(),
        &["survey", "answer", "personality-test", "p_big_picture", "--choice", "a"],
    );
    assert!(out.status.success());

    // Advancing with an unanswered required question on the step fails.
    let out = waypoint(dir.path(), &["survey", "next", "personality-test"]);
    assert!(!out.status.success());

    let out = waypoint(
        dir.path(),
        &["survey", "answer", "personality-test", "p_details", "--choice", "b"],
    );
    assert!(out.status.success());

    let out = waypoint(dir.path(), &["survey", "next", "personality-test"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("\"step_index\": 1"));
}

#[test]
fn test_reset_clears_state() {
    let dir = tempfile::tempdir().unwrap();
    waypoint(dir.path(), &["survey", "branch", "career-survey", "yes"]);

    let out = waypoint(dir.path(), &["survey", "reset", "career-survey"]);
    assert!(out.status.success());

    let out = waypoint(dir.path(), &["survey", "status", "career-survey"]);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("\"state\": \"branch_selection\""));
}

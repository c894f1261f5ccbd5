//! Integration tests for the bloom binary.
//!
//! These tests verify end-to-end behavior including:
//! - Completing and quitting workouts
//! - Ledger persistence across runs
//! - Unlocks, modifiers, evolution, and cycle rollover
//! - The journal and its CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bloom"))
}

fn complete(data_dir: &Path, id: &str) -> assert_cmd::assert::Assert {
    cli()
        .arg("start")
        .arg(id)
        .arg("--auto-complete")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
}

fn read_state(data_dir: &Path) -> serde_json::Value {
    let content = fs::read_to_string(data_dir.join("state.json")).expect("Failed to read state");
    serde_json::from_str(&content).expect("State should be valid JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle-aware workout coach"));
}

#[test]
fn test_default_command_shows_status() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to Bloom"))
        .stdout(predicate::str::contains("Bloom: Seedling (0 XP)"))
        .stdout(predicate::str::contains("Streak: 0"));
}

#[test]
fn test_completion_updates_ledger_and_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete(data_dir, "m1")
        .stdout(predicate::str::contains("Workout complete! +18 XP"))
        .stdout(predicate::str::contains("Total: 18 XP"));

    let state = read_state(data_dir);
    assert_eq!(state["totalXP"], 18);
    assert_eq!(state["streak"], 1);
    assert_eq!(state["completedIds"][0], "m1");
    assert_eq!(state["completedByPhase"]["menstrual"], 1);
    assert_eq!(state["cyclePhaseFlags"]["menstrual"], true);

    let journal = fs::read_to_string(data_dir.join("journal.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 1);
    assert!(journal.contains("\"kind\":\"completed\""));
}

#[test]
fn test_quit_resets_streak_and_keeps_xp() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete(data_dir, "m0");
    cli()
        .arg("start")
        .arg("m1")
        .arg("--auto-quit")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout quit"));

    let state = read_state(data_dir);
    assert_eq!(state["totalXP"], 8);
    assert_eq!(state["streak"], 0);
    assert_eq!(state["completedIds"].as_array().unwrap().len(), 1);

    // Quits are not journaled
    let journal = fs::read_to_string(data_dir.join("journal.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 1);
}

#[test]
fn test_streak_bonus_after_three_completions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for _ in 0..3 {
        complete(data_dir, "m0").stdout(predicate::str::contains("streak bonus").not());
    }
    complete(data_dir, "m0").stdout(predicate::str::contains("+1 streak bonus"));

    let state = read_state(data_dir);
    assert_eq!(state["totalXP"], 33);
    assert_eq!(state["streak"], 4);
    assert_eq!(state["completedByPhase"]["menstrual"], 4);
    assert_eq!(state["completedIds"].as_array().unwrap().len(), 1);
}

#[test]
fn test_locked_workout_requires_phase_completions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("start")
        .arg("f2")
        .arg("--auto-complete")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));

    cli()
        .arg("list")
        .arg("--phase")
        .arg("follicular")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("complete 2 more follicular"));

    complete(data_dir, "f1");
    complete(data_dir, "f1");
    complete(data_dir, "f2").stdout(predicate::str::contains("+28 XP"));
}

#[test]
fn test_unknown_workout() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("preview")
        .arg("zz9")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown workout: zz9"));
}

#[test]
fn test_modifier_substitutes_exercises() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("preview")
        .arg("o1")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Replacing:").not());

    cli()
        .arg("modifier")
        .arg("low-impact")
        .arg("on")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("preview")
        .arg("o1")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Replacing: Burpees"));

    let state = read_state(data_dir);
    assert_eq!(state["modifiers"]["lowImpactOnly"], true);
    assert_eq!(state["modifiers"]["noFloorWork"], false);
}

#[test]
fn test_evolution_after_all_four_phases() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete(data_dir, "m0");
    complete(data_dir, "f1");
    complete(data_dir, "o1").stdout(predicate::str::contains("evolved").not());
    complete(data_dir, "l1")
        .stdout(predicate::str::contains("Your Bloom evolved"))
        .stdout(predicate::str::contains("Shimmer"));

    let state = read_state(data_dir);
    assert_eq!(state["evolutionCount"], 1);
    for phase in ["menstrual", "follicular", "ovulatory", "luteal"] {
        assert_eq!(state["cyclePhaseFlags"][phase], false, "{} flag", phase);
    }

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Evolutions: 1 (Shimmer"))
        .stdout(predicate::str::contains("Sprout"));
}

#[test]
fn test_reflection_recorded_with_response() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("start")
        .arg("m0")
        .arg("--auto-complete")
        .arg("--feeling")
        .arg("easy")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Good sign. Try the next workout up when you're ready.",
        ));

    let journal = fs::read_to_string(data_dir.join("journal.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 2);
    assert!(journal.contains("\"feeling\":\"easy\""));

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("completed m0"))
        .stdout(predicate::str::contains("felt      m0   Easy"));
}

#[test]
fn test_history_export_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let csv_path = data_dir.join("export.csv");

    complete(data_dir, "l2");
    cli()
        .arg("history")
        .arg("--export")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 entries"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("kind,id,at,workout_id,phase"));
    assert!(lines.next().unwrap().starts_with("completed,"));
}

#[test]
fn test_empty_history() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts recorded yet"));
}

#[test]
fn test_onboarding_persists() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("onboard")
        .arg("--cycle-start")
        .arg("2024-03-01")
        .arg("--today")
        .arg("2024-03-08")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Follicular phase"));

    let state = read_state(data_dir);
    assert_eq!(state["hasOnboarded"], true);
    assert_eq!(state["cycleStartDate"], "2024-03-01");
    assert_eq!(state["lastObservedPhase"], "follicular");

    cli()
        .arg("--today")
        .arg("2024-03-08")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome").not())
        .stdout(predicate::str::contains("Cycle day 8"));
}

#[test]
fn test_cycle_rollover_clears_partial_progress() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["cycle", "set-start", "2024-01-01", "--today", "2024-01-20"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("day 20, Luteal phase"));

    cli()
        .args(["start", "l1", "--auto-complete", "--today", "2024-01-20"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
    assert_eq!(read_state(data_dir)["cyclePhaseFlags"]["luteal"], true);

    cli()
        .args(["status", "--today", "2024-01-30"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("A new cycle has begun"))
        .stdout(predicate::str::contains("Cycle day 2: Menstrual phase"));

    let state = read_state(data_dir);
    assert_eq!(state["cyclePhaseFlags"]["luteal"], false);
    assert_eq!(state["lastObservedPhase"], "menstrual");
    assert_eq!(state["totalXP"], 24);

    // Same phase again: nothing new to report
    cli()
        .args(["status", "--today", "2024-01-31"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("A new cycle has begun").not());
}

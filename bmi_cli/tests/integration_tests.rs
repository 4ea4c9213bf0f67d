//! Integration tests for the `bmi` binary.
//!
//! These tests verify end-to-end behavior including:
//! - Calculation output and classification
//! - History persistence, ordering and lookup
//! - Clearing history
//! - Input validation

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI with an isolated config directory
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bmi"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn calc(data_dir: &Path, weight: &str, height: &str) -> Command {
    let mut cmd = cli(data_dir);
    cmd.args(["calc", "--age", "30", "--weight", weight, "--height", height]);
    cmd
}

fn history_path(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("bmi_calculation_history.json")
}

fn stored_history(data_dir: &Path) -> Vec<serde_json::Value> {
    let text = fs::read_to_string(history_path(data_dir)).expect("Failed to read history");
    serde_json::from_str(&text).expect("History is not a JSON array")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("bmi"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Body mass index calculator with local history",
        ));
}

#[test]
fn test_calc_adult_metric() {
    let temp_dir = setup_test_dir();

    calc(temp_dir.path(), "70", "175")
        .assert()
        .success()
        .stdout(predicate::str::contains("22.9 kg/m²"))
        .stdout(predicate::str::contains("Normal weight"))
        .stdout(predicate::str::contains("Saved to history"));

    let history = stored_history(temp_dir.path());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["category"], "Normal weight");
    assert_eq!(history[0]["ageCategory"], "adult");
    assert_eq!(history[0]["gender"], "male");
    assert_eq!(history[0]["useMetric"], true);
    assert_eq!(history[0]["weight"], 70.0);
}

#[test]
fn test_calc_infant_uses_infant_table() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "calc",
            "--age",
            "1",
            "--weight",
            "9",
            "--height",
            "70",
            "--age-category",
            "infant",
            "--gender",
            "female",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("18.4 kg/m²"))
        .stdout(predicate::str::contains("Overweight"))
        .stdout(predicate::str::contains("BMI Scale (Infant)"))
        .stdout(predicate::str::contains("Infant (0-2 years), 1 years, Female"));
}

#[test]
fn test_calc_imperial() {
    let temp_dir = setup_test_dir();

    // 154.3 lbs, 68.9 in is roughly 70 kg, 175 cm
    calc(temp_dir.path(), "154.3", "68.9")
        .arg("--imperial")
        .assert()
        .success()
        .stdout(predicate::str::contains("22.9 kg/m²"))
        .stdout(predicate::str::contains("154.3 lbs, 68.9 in"));

    let history = stored_history(temp_dir.path());
    assert_eq!(history[0]["useMetric"], false);
}

#[test]
fn test_no_save_does_not_record() {
    let temp_dir = setup_test_dir();

    calc(temp_dir.path(), "70", "175")
        .arg("--no-save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not saved"));

    assert!(!history_path(temp_dir.path()).exists());
}

#[test]
fn test_history_lists_newest_first() {
    let temp_dir = setup_test_dir();

    calc(temp_dir.path(), "50", "175").assert().success();
    calc(temp_dir.path(), "100", "175").assert().success();

    let output = cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 calculation(s)"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();

    let obese = text.find("Obese").expect("newest entry missing");
    let under = text.find("Underweight").expect("oldest entry missing");
    assert!(obese < under, "expected newest entry first:\n{}", text);
}

#[test]
fn test_empty_history() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No calculations yet"));
}

#[test]
fn test_show_by_timestamp() {
    let temp_dir = setup_test_dir();
    calc(temp_dir.path(), "85", "180").assert().success();

    let history = stored_history(temp_dir.path());
    let timestamp = history[0]["timestamp"].as_str().unwrap().to_string();

    cli(temp_dir.path())
        .args(["show", &timestamp])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overweight"));

    cli(temp_dir.path())
        .args(["show", "1999-01-01T00:00:00.000Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no calculation recorded"));
}

#[test]
fn test_clear_history() {
    let temp_dir = setup_test_dir();
    calc(temp_dir.path(), "70", "175").assert().success();
    assert!(history_path(temp_dir.path()).exists());

    cli(temp_dir.path())
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("History cleared"));

    assert!(!history_path(temp_dir.path()).exists());
    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No calculations yet"));
}

#[test]
fn test_clear_declined_keeps_history() {
    let temp_dir = setup_test_dir();
    calc(temp_dir.path(), "70", "175").assert().success();

    cli(temp_dir.path())
        .arg("clear")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("History kept"));

    assert_eq!(stored_history(temp_dir.path()).len(), 1);
}

#[test]
fn test_invalid_input_rejected() {
    let temp_dir = setup_test_dir();

    calc(temp_dir.path(), "0", "175")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));

    calc(temp_dir.path(), "heavy", "175")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a number"));

    calc(temp_dir.path(), "70", "175")
        .args(["--gender", "robot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown gender"));

    assert!(!history_path(temp_dir.path()).exists());
}

#[test]
fn test_config_defaults_apply() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/bmi");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[defaults]\nage_category = \"child\"\ngender = \"female\"\n",
    )
    .unwrap();

    calc(temp_dir.path(), "40", "140").assert().success();

    let history = stored_history(temp_dir.path());
    assert_eq!(history[0]["ageCategory"], "child");
    assert_eq!(history[0]["gender"], "female");
}

#[test]
fn test_degenerate_height_keeps_earlier_history() {
    let temp_dir = setup_test_dir();

    calc(temp_dir.path(), "60", "175").assert().success();
    calc(temp_dir.path(), "65", "175").assert().success();

    // Positive and finite, but squares to zero metres: BMI is infinite
    calc(temp_dir.path(), "70", "1e-200")
        .assert()
        .success()
        .stdout(predicate::str::contains("Obese"))
        .stdout(predicate::str::contains("Saved to history"));

    calc(temp_dir.path(), "80", "175").assert().success();

    let history = stored_history(temp_dir.path());
    assert_eq!(history.len(), 4);
    assert!(history[2]["bmi"].is_null());
    assert_eq!(history[2]["category"], "Obese");

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 calculation(s)"));
}

//! Command-line smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn claimcheck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("claimcheck").unwrap_or_else(|_| unreachable!());
    cmd.current_dir(dir.path())
        .env_remove("CLAIMCHECK_API_KEY")
        .env_remove("GOOGLE_GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("CLAIMCHECK_CHECKPOINT_DIR")
        .env_remove("CLAIMCHECK_RESULTS_DIR");
    cmd
}

fn tempdir() -> TempDir {
    TempDir::new().unwrap_or_else(|_| unreachable!())
}

#[test]
fn help_lists_commands() {
    let dir = tempdir();
    claimcheck(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze-multiple"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn analyze_without_input_is_rejected() {
    let dir = tempdir();
    claimcheck(&dir)
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide claim text"));
}

#[test]
fn analyze_without_api_key_fails_before_any_call() {
    let dir = tempdir();
    claimcheck(&dir)
        .args(["analyze", "A method of pitching a rotor blade."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key configured"));
    assert!(!dir.path().join("data").exists());
}

#[test]
fn missing_claims_file_is_reported() {
    let dir = tempdir();
    claimcheck(&dir)
        .args(["analyze-multiple", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn risk_threshold_is_range_checked() {
    let dir = tempdir();
    claimcheck(&dir)
        .args(["search", "(ABST/\"rotor\")", "--risk-threshold", "11"])
        .assert()
        .failure();
}

#[test]
fn unknown_source_is_rejected() {
    let dir = tempdir();
    claimcheck(&dir)
        .args(["search", "q", "--source", "bing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown source"));
}

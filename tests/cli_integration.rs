//! Binary-level tests for the `scribe` command line.

use assert_cmd::Command;
use predicates::prelude::*;

fn scribe() -> Command {
    let mut cmd = Command::cargo_bin("scribe").unwrap();
    cmd.env_remove("GEMINI_API_KEYS")
        .env_remove("GEMINI_API_KEY")
        .env_remove("SCRIBE_PORT")
        .env_remove("SCRIBE_HOST");
    cmd
}

#[test]
fn test_help_lists_commands() {
    scribe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("credentials"));
}

#[test]
fn test_config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scribe.toml");

    scribe()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[server]"));
    assert!(content.contains("[credentials]"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scribe.toml");
    std::fs::write(&path, "# existing").unwrap();

    scribe()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_credentials_json_never_prints_tokens() {
    let dir = tempfile::tempdir().unwrap();

    scribe()
        .current_dir(dir.path())
        .env("GEMINI_API_KEYS", "secret-one, secret-two,,secret-three")
        .args(["credentials", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"size\": 3"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_credentials_without_keys_fails() {
    let dir = tempfile::tempdir().unwrap();

    scribe()
        .current_dir(dir.path())
        .arg("credentials")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_serve_without_keys_fails_fast() {
    let dir = tempfile::tempdir().unwrap();

    scribe()
        .current_dir(dir.path())
        .args(["serve", "--port", "18089"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_completions_bash() {
    scribe()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scribe"));
}

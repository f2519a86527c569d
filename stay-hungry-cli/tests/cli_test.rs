use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the real home directory and API
fn stay_hungry(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stay-hungry").unwrap();
    cmd.env("STAY_HUNGRY_HOME", home.path())
        .env("STAY_HUNGRY_STORAGE_PATH", home.path().join("storage"))
        .env("STAY_HUNGRY_API_URL", "http://127.0.0.1:9")
        .env_remove("STAY_HUNGRY_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_command() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = stay_hungry(&home);
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Stay Hungry Gym"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("analytics"))
        .stdout(predicate::str::contains("progress"));
}

#[test]
fn test_version_command() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = stay_hungry(&home);
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = stay_hungry(&home);
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("complete -F"))
        .stdout(predicate::str::contains("stay-hungry"));
}

#[test]
fn test_whoami_when_logged_out() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = stay_hungry(&home);
    cmd.arg("whoami");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in"));
}

#[test]
fn test_gated_command_requires_login() {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = stay_hungry(&home);
    cmd.arg("progress");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_config_init_and_show() {
    let home = tempfile::tempdir().unwrap();

    stay_hungry(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(home.path().join("config.toml").exists());

    stay_hungry(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("heartbeat_seconds = 15"));
}

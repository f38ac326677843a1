use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn berth() -> Command {
    Command::cargo_bin("berth").unwrap()
}

#[test]
fn test_show_config_defaults() {
    berth()
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[pool]"))
        .stdout(predicate::str::contains("capacity = 10"))
        .stdout(predicate::str::contains("addr = \"127.0.0.1:8003\""));
}

#[test]
fn test_show_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("berth.toml");
    fs::write(&path, "[pool]\ninitial_size = 2\ncapacity = 6\n").unwrap();

    berth()
        .args(["show-config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("initial_size = 2"))
        .stdout(predicate::str::contains("capacity = 6"));
}

#[test]
fn test_show_config_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("berth.toml");
    fs::write(&path, "[pool]\ninitial_size = 4\ncapacity = 2\n").unwrap();

    berth()
        .args(["show-config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid capacity settings"));
}

#[test]
fn test_exercise_with_spawned_server() {
    berth()
        .args([
            "exercise",
            "--spawn-server",
            "--workers",
            "2",
            "--rounds",
            "5",
            "--initial-size",
            "1",
            "--capacity",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("exchanges: 10"))
        .stdout(predicate::str::contains("failures: 0"));
}

#[test]
fn test_exercise_rejects_zero_capacity() {
    berth()
        .args(["exercise", "--spawn-server", "--capacity", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid exercise settings"));
}

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("schatzkarte").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Treasure-map learning progress server"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("schatzkarte").unwrap();
    cmd.arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_cli_catalog() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("schatzkarte").unwrap();
    cmd.arg("--db")
        .arg(temp.path().join("test.db"))
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("meister_berg"));
}

#[test]
fn test_cli_map_week_zero() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("schatzkarte").unwrap();
    cmd.arg("--db")
        .arg(temp.path().join("test.db"))
        .arg("map")
        .arg("u1")
        .arg("--week")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"current\""))
        .stdout(predicate::str::contains("festung"));
}

#[test]
fn test_cli_stats_fresh_user() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("schatzkarte").unwrap();
    cmd.arg("--db")
        .arg(temp.path().join("test.db"))
        .arg("stats")
        .arg("u1")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_xp\": 0"));
}

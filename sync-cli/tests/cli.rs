//! End-to-end tests for the twinsync binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn twinsync(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("twinsync").unwrap();
    cmd.arg("--data-dir").arg(data_dir).env("RUST_LOG", "warn");
    cmd
}

fn import(dir: &TempDir, side: &str, contents: &str) {
    let file = dir.path().join(format!("list-{}.txt", side));
    std::fs::write(&file, contents).unwrap();
    twinsync(dir.path())
        .arg("import")
        .arg(side)
        .arg(&file)
        .assert()
        .success();
}

// ===========================================
// Inspection Commands
// ===========================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("twinsync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn status_on_fresh_data_dir() {
    let dir = TempDir::new().unwrap();
    twinsync(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cluster A"))
        .stdout(predicate::str::contains("(not set)"))
        .stdout(predicate::str::contains("api.allorigins.win"));
}

#[test]
fn sources_are_persisted() {
    let dir = TempDir::new().unwrap();
    twinsync(dir.path())
        .args(["sources", "--url-a", "https://lists.example/a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sources updated."));

    twinsync(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://lists.example/a.txt"));

    let raw = std::fs::read_to_string(dir.path().join("console-state.json")).unwrap();
    assert!(raw.contains("\"url_a\""));
}

#[test]
fn unknown_side_is_rejected() {
    let dir = TempDir::new().unwrap();
    twinsync(dir.path())
        .args(["validate", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown side"));
}

// ===========================================
// Import / Validate
// ===========================================

#[test]
fn imported_valid_list_validates() {
    let dir = TempDir::new().unwrap();
    import(&dir, "a", "10.0.0.1:8080\n192.168.0.10:3128\n");

    twinsync(dir.path())
        .args(["validate", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 proxies, all valid"));
}

#[test]
fn validate_reports_invalid_lines() {
    let dir = TempDir::new().unwrap();
    import(&dir, "b", "10.0.0.1:8080\nbogus\n10.0.0.256:80\n");

    twinsync(dir.path())
        .args(["validate", "b"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid: bogus"))
        .stdout(predicate::str::contains("invalid: 10.0.0.256:80"))
        .stderr(predicate::str::contains("2 invalid proxy line(s)"));
}

// ===========================================
// Sync
// ===========================================

#[test]
fn sync_without_sources_fails() {
    let dir = TempDir::new().unwrap();
    twinsync(dir.path())
        .arg("sync")
        .assert()
        .failure()
        .stdout(predicate::str::contains("no source URL"))
        .stderr(predicate::str::contains("no source URL configured"));
}

#[test]
fn sync_against_unreachable_relay_reports_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("twinsync.toml"),
        "[sync]\nrelay_endpoint = \"http://127.0.0.1:9/?url=\"\nmax_retries = 1\nbase_delay_ms = 1\n",
    )
    .unwrap();
    let log_file = dir.path().join("session.log");

    twinsync(dir.path())
        .args(["sync", "--url-a", "http://lists.example/a.txt", "--log-file"])
        .arg(&log_file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cluster A: error"))
        .stdout(predicate::str::contains("Cluster B: idle"));

    let log = std::fs::read_to_string(&log_file).unwrap();
    assert_eq!(log.lines().filter(|l| l.contains(" WARNING ")).count(), 2);
    assert!(log.lines().any(|l| l.contains(" ERROR ")));

    // The override is stored for the next session
    let raw = std::fs::read_to_string(dir.path().join("console-state.json")).unwrap();
    assert!(raw.contains("http://lists.example/a.txt"));
}

// ===========================================
// Run
// ===========================================

#[test]
fn run_aborts_on_invalid_manual_list() {
    let dir = TempDir::new().unwrap();
    import(&dir, "a", "not-a-proxy\n");

    twinsync(dir.path())
        .args(["run", "--ticks", "1", "--tick-secs", "0.01"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Run aborted"))
        .stderr(predicate::str::contains("Cluster A has 1 invalid proxy line(s)"));
}

#[test]
fn run_charts_requested_ticks() {
    let dir = TempDir::new().unwrap();
    import(&dir, "a", "10.0.0.1:80\n");

    let output = twinsync(dir.path())
        .args([
            "run",
            "--ticks",
            "2",
            "--tick-secs",
            "0.05",
            "--target",
            "1000",
            "--velocity",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run started"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let chart_lines = stdout.lines().filter(|l| l.contains('#')).count();
    assert_eq!(chart_lines, 3, "seed point plus two ticks:\n{}", stdout);
}

#[test]
fn run_rejects_zero_tick() {
    let dir = TempDir::new().unwrap();
    twinsync(dir.path())
        .args(["run", "--ticks", "1", "--tick-secs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_secs"));
}

#[test]
fn bad_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("twinsync.toml"), "[simulator]\ntick_secs = \"soon\"\n").unwrap();

    twinsync(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

use assert_cmd::Command;
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

fn chmod(path: &Path, mode: u32) {
    fs::set_permissions(path, Permissions::from_mode(mode)).unwrap();
}

/// `wikiguard` pointed at `root`, with no config file in play.
fn wikiguard(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wikiguard").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(root.path().join("no-such-config.toml"))
        .arg("--root")
        .arg(root.path());
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn resolve_rejects_traversal_with_not_found_code() {
    let root = TempDir::new().unwrap();
    let output = wikiguard(&root)
        .args(["resolve", "/../../etc/passwd"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("wikiguard:"));
}

#[test]
fn resolve_guesses_extension() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("setup.md"), "# Setup").unwrap();

    let output = wikiguard(&root).args(["resolve", "/setup"]).output().unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with("setup.md"));
}

#[test]
fn resolve_json_reports_index() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs/index.md"), "# Docs").unwrap();

    let output = wikiguard(&root)
        .args(["--json", "resolve", "/docs"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(report["index"], true);
    assert_eq!(report["exists"], true);
    assert!(report["resolved"].as_str().unwrap().ends_with("index.md"));
}

#[test]
fn access_json_on_world_readable_page() {
    let root = TempDir::new().unwrap();
    chmod(root.path(), 0o755);
    fs::write(root.path().join("page.md"), "hello").unwrap();
    chmod(&root.path().join("page.md"), 0o644);

    let output = wikiguard(&root)
        .args(["access", "/page", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let verdicts: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(verdicts["read"], true);
    assert_eq!(verdicts["write"], false);
    assert_eq!(verdicts["delete"], false);
}

#[test]
fn anonymous_read_of_private_file_is_denied() {
    let root = TempDir::new().unwrap();
    chmod(root.path(), 0o755);
    fs::write(root.path().join("secret.md"), "hush").unwrap();
    chmod(&root.path().join("secret.md"), 0o600);

    let output = wikiguard(&root).args(["read", "/secret"]).output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
}

#[test]
fn authenticated_write_then_read() {
    let root = TempDir::new().unwrap();

    let output = wikiguard(&root)
        .args(["write", "/notes.md", "--authenticated"])
        .write_stdin("remember the milk")
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = wikiguard(&root)
        .args(["read", "/notes", "--authenticated"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "remember the milk");
}

#[test]
fn authenticated_delete_removes_file() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("old.md"), "bye").unwrap();

    let output = wikiguard(&root)
        .args(["delete", "/old.md", "--authenticated"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(!root.path().join("old.md").exists());
}

#[test]
fn throttle_replays_growing_delays() {
    let root = TempDir::new().unwrap();
    let output = wikiguard(&root)
        .args(["throttle", "--attempts", "3", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    let delays: Vec<u64> = reports
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["delay_ms"].as_u64().unwrap())
        .collect();
    assert_eq!(delays, vec![0, 1_000, 2_000]);
}

#[test]
fn throttle_successes_stay_at_zero() {
    let root = TempDir::new().unwrap();
    let output = wikiguard(&root)
        .args(["throttle", "--attempts", "4", "--success", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert!(reports
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["delay_ms"] == 0));
}

#[test]
fn malformed_config_fails_with_generic_code() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("config.toml");
    fs::write(&config, "[throttle\n").unwrap();

    let output = Command::cargo_bin("wikiguard")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["resolve", "/"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

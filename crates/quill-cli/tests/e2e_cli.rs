//! End-to-end CLI workflows.
//!
//! Each test runs the `quill` binary as a subprocess against a snapshot in
//! an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the quill binary, with its data dir and user
/// config dir inside `dir`.
fn quill(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("quill"));
    cmd.current_dir(dir);
    cmd.env("QUILL_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env_remove("QUILL_DATA_DIR");
    cmd.env_remove("FORMAT");
    cmd.arg("--data-dir").arg(dir.join("data"));
    cmd
}

fn json_of(dir: &Path, args: &[&str]) -> Value {
    let output = quill(dir)
        .arg("--json")
        .args(args)
        .output()
        .expect("quill should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn error_code(dir: &Path, args: &[&str]) -> String {
    let output = quill(dir)
        .arg("--json")
        .args(args)
        .output()
        .expect("quill should not crash");
    assert!(!output.status.success(), "{args:?} should fail");
    let value: Value =
        serde_json::from_slice(&output.stderr).expect("errors should be JSON in --json mode");
    value["error"]["error_code"]
        .as_str()
        .expect("error should carry a code")
        .to_string()
}

fn work_ids(dir: &Path) -> Vec<String> {
    json_of(dir, &["show"])["works"]
        .as_array()
        .expect("works array")
        .iter()
        .map(|w| w["id"].as_str().expect("work id").to_string())
        .collect()
}

fn dispatch(dir: &Path, action: &Value) {
    quill(dir)
        .arg("dispatch")
        .arg(action.to_string())
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn fresh_data_dir_shows_the_demo_project() {
    let dir = TempDir::new().expect("temp dir");
    let summary = json_of(dir.path(), &["show"]);

    assert_eq!(summary["works"][0]["title"], "The Silent Echo");
    assert_eq!(summary["works"][0]["characters"], 2);
    assert_eq!(summary["works"][0]["chapters"][0]["scenes"][0]["blocks"], 3);
}

#[test]
fn dispatched_actions_persist_between_runs() {
    let dir = TempDir::new().expect("temp dir");
    dispatch(
        dir.path(),
        &json!({"type": "ADD_WORK", "payload": {"title": "Second Draft"}}),
    );

    assert!(dir.path().join("data/quill-state.json").exists());
    let summary = json_of(dir.path(), &["show"]);
    let titles: Vec<_> = summary["works"]
        .as_array()
        .expect("works array")
        .iter()
        .map(|w| w["title"].as_str().expect("title").to_string())
        .collect();
    assert_eq!(titles, vec!["The Silent Echo", "Second Draft"]);
}

#[test]
fn dispatch_reads_stdin() {
    let dir = TempDir::new().expect("temp dir");
    quill(dir.path())
        .args(["dispatch", "-"])
        .write_stdin(r#"{"type": "TOGGLE_FOCUS_MODE"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("dispatched TOGGLE_FOCUS_MODE"));
}

#[test]
fn malformed_action_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    quill(dir.path())
        .args(["dispatch", r#"{"type": "NOT_A_THING"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid action JSON"));
}

#[test]
fn export_reset_import_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let backup = dir.path().join("backup.json");
    dispatch(
        dir.path(),
        &json!({"type": "ADD_WORK", "payload": {"title": "Kept"}}),
    );
    quill(dir.path())
        .args(["export", "--output"])
        .arg(&backup)
        .assert()
        .success();

    quill(dir.path()).arg("reset").assert().success();
    assert_eq!(work_ids(dir.path()).len(), 1);

    let report = json_of(
        dir.path(),
        &["import", backup.to_str().expect("utf8 path"), "--strict"],
    );
    assert_eq!(report["works"], 2);
    assert_eq!(work_ids(dir.path()).len(), 2);
}

#[test]
fn export_to_stdout_is_a_backup() {
    let dir = TempDir::new().expect("temp dir");
    let output = quill(dir.path())
        .arg("export")
        .output()
        .expect("export should not crash");
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("backup is JSON");
    assert!(value["works"].is_array());
    assert_eq!(value["activeTab"], "writing");
}

#[test]
fn import_of_garbage_has_a_code() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("garbage.json");
    fs::write(&path, "definitely not json").expect("write");
    assert_eq!(
        error_code(dir.path(), &["import", path.to_str().expect("utf8 path")]),
        "Q2001"
    );

    fs::write(&path, r#"{"chapters": []}"#).expect("write");
    assert_eq!(
        error_code(dir.path(), &["import", path.to_str().expect("utf8 path")]),
        "Q2002"
    );
}

#[test]
fn strict_import_rejects_what_permissive_import_accepts() {
    let dir = TempDir::new().expect("temp dir");
    let output = quill(dir.path())
        .arg("export")
        .output()
        .expect("export should not crash");
    let mut backup: Value = serde_json::from_slice(&output.stdout).expect("backup is JSON");
    let text_block = backup["blocks"][0]["id"].clone();
    backup["blocks"][1]["linkedLensIds"] = json!([text_block]);
    let path = dir.path().join("broken.json");
    fs::write(&path, backup.to_string()).expect("write");
    let path = path.to_str().expect("utf8 path");

    assert_eq!(error_code(dir.path(), &["import", path, "--strict"]), "Q2003");

    quill(dir.path()).args(["import", path]).assert().success();
    quill(dir.path())
        .arg("verify")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL link-target"));
}

#[test]
fn strict_import_can_come_from_project_config() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join(".quill")).expect("mkdir");
    fs::write(
        dir.path().join(".quill/config.toml"),
        "[import]\nstrict = true\n",
    )
    .expect("write config");

    let output = quill(dir.path())
        .arg("export")
        .output()
        .expect("export should not crash");
    let mut backup: Value = serde_json::from_slice(&output.stdout).expect("backup is JSON");
    backup["scenes"][0]["characterIds"] = json!(["nobody"]);
    let path = dir.path().join("dangling.json");
    fs::write(&path, backup.to_string()).expect("write");

    assert_eq!(
        error_code(dir.path(), &["import", path.to_str().expect("utf8 path")]),
        "Q2003"
    );
}

#[test]
fn broken_config_is_a_config_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join(".quill")).expect("mkdir");
    fs::write(dir.path().join(".quill/config.toml"), "[storage\n").expect("write config");
    assert_eq!(error_code(dir.path(), &["show"]), "Q1001");
}

#[test]
fn compile_whole_work_to_stdout() {
    let dir = TempDir::new().expect("temp dir");
    let work = work_ids(dir.path()).remove(0);

    quill(dir.path())
        .args(["compile", "--work", work.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Chapter 1: The Awakening\n\n"))
        .stdout(predicate::str::contains("silver locket"))
        .stdout(predicate::str::contains("Chapter 2: Shadows"))
        .stdout(predicate::str::contains("Crucial evidence").not());
}

#[test]
fn compile_into_directory_names_the_file_after_the_work() {
    let dir = TempDir::new().expect("temp dir");
    let work = work_ids(dir.path()).remove(0);
    let out = dir.path().join("out");
    fs::create_dir_all(&out).expect("mkdir");

    let report = json_of(
        dir.path(),
        &["compile", "--work", &work, "--output", out.to_str().expect("utf8 path")],
    );

    let file = out.join("the_silent_echo_compiled.txt");
    assert_eq!(report["path"], file.to_str().expect("utf8 path"));
    let text = fs::read_to_string(&file).expect("compiled file");
    assert_eq!(text, report["text"].as_str().expect("text"));
}

#[test]
fn compile_single_scene_skips_chapter_header() {
    let dir = TempDir::new().expect("temp dir");
    let summary = json_of(dir.path(), &["show"]);
    let work = summary["works"][0]["id"].as_str().expect("work id");
    let scene = summary["works"][0]["chapters"][0]["scenes"][1]["id"]
        .as_str()
        .expect("scene id");

    let report = json_of(dir.path(), &["compile", "--work", work, "--scene", scene]);
    let text = report["text"].as_str().expect("text");
    assert!(!text.contains("Chapter 1"));
    assert!(!text.contains("silver locket"));
}

#[test]
fn compile_unknown_work_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    assert_eq!(
        error_code(dir.path(), &["compile", "--work", "missing"]),
        "Q2004"
    );
}

#[test]
fn find_then_replace_in_active_document() {
    let dir = TempDir::new().expect("temp dir");
    let found = json_of(dir.path(), &["find", "LOCKET"]);
    let hits = found["matches"].as_array().expect("matches").len();
    assert!(hits > 0);

    let replaced = json_of(dir.path(), &["find", "locket", "--replace", "pendant"]);
    assert!(replaced["replacedBlocks"].as_u64().expect("count") > 0);

    let after = json_of(dir.path(), &["find", "locket"]);
    assert!(after["matches"].as_array().expect("matches").is_empty());
    let pendants = json_of(dir.path(), &["find", "pendant"]);
    assert_eq!(pendants["matches"].as_array().expect("matches").len(), hits);
}

#[test]
fn verify_passes_on_demo_project() {
    let dir = TempDir::new().expect("temp dir");
    quill(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("verify: success"));
}

#[test]
fn reset_restores_after_deleting_everything() {
    let dir = TempDir::new().expect("temp dir");
    let work = work_ids(dir.path()).remove(0);
    dispatch(dir.path(), &json!({"type": "DELETE_WORK", "payload": work}));
    assert!(work_ids(dir.path()).is_empty());

    let report = json_of(dir.path(), &["reset"]);
    assert_eq!(report["ok"], true);
    assert_eq!(work_ids(dir.path()).len(), 1);
}

#[test]
fn data_dir_env_is_honored() {
    let dir = TempDir::new().expect("temp dir");
    let env_dir = dir.path().join("from-env");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("quill"));
    cmd.current_dir(dir.path())
        .env("QUILL_LOG", "error")
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("QUILL_DATA_DIR", &env_dir)
        .args(["dispatch", r#"{"type": "TOGGLE_SHOW_DESCRIPTIONS"}"#])
        .assert()
        .success();
    assert!(env_dir.join("quill-state.json").exists());
}

//! End-to-end tests of the `enumcov` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use enumcov_testkit::{color_program, snapshot};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PARTIAL: &str = r##"Dictionary<Color, string> ColorToHex = new()
    {
        { Color.Red, "#FF0000" },
    };"##;

const COMPLETE: &str = r##"Dictionary<Color, string> ColorToHex = new()
    {
        [Color.Red] = "#FF0000",
        [Color.Green] = "#00FF00",
        [Color.Blue] = "#0000FF",
    };"##;

fn enumcov() -> Command {
    Command::cargo_bin("enumcov").expect("enumcov binary")
}

/// A root with `Program.cs` and its snapshot at `program.snapshot.json`.
fn repo_with(body: &str) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    write_program(td.path(), body);
    td
}

fn write_program(root: &Path, body: &str) {
    let text = color_program(body);
    fs::write(root.join("Program.cs"), &text).expect("write source");
    let s = snapshot("Program.cs", &text).expect("parse");
    fs::write(
        root.join("program.snapshot.json"),
        serde_json::to_string_pretty(&s).expect("serialize snapshot"),
    )
    .expect("write snapshot");
}

#[test]
fn check_prints_compiler_style_lines_and_writes_reports() {
    let temp = repo_with(PARTIAL);

    enumcov()
        .current_dir(temp.path())
        .args(["check", "--snapshot", "program.snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Program.cs:14:31: warning[EXHAUSTIVEDICT0001]: Dictionary 'ColorToHex' need to define values for the following keys: Color.Green, Color.Blue",
        ))
        .stdout(predicate::str::contains("1 diagnostic(s) in 1 site(s)"));

    let out = temp.path().join("artifacts/enumcov");
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["verdict"]["status"], "warn");
    assert!(out.join("report.md").exists());
}

#[test]
fn check_fail_on_warnings_exits_2() {
    let temp = repo_with(PARTIAL);

    enumcov()
        .current_dir(temp.path())
        .args(["check", "--snapshot", "program.snapshot.json", "--fail-on-warnings"])
        .assert()
        .code(2);
}

#[test]
fn complete_map_checks_clean() {
    let temp = repo_with(COMPLETE);

    enumcov()
        .current_dir(temp.path())
        .args(["check", "--snapshot", "program.snapshot.json", "--fail-on-warnings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 diagnostic(s) in 1 site(s)"));
}

#[test]
fn deny_patterns_suppress_rules() {
    let temp = repo_with(PARTIAL);

    enumcov()
        .current_dir(temp.path())
        .args([
            "check",
            "--snapshot",
            "program.snapshot.json",
            "--deny",
            "EXHAUSTIVEDICT*",
            "--fail-on-warnings",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 diagnostic(s)"));
}

#[test]
fn unreadable_snapshot_fails_the_check() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("snapshots")).unwrap();
    fs::write(temp.path().join("snapshots/bad.snapshot.json"), "{ nope").unwrap();

    enumcov()
        .current_dir(temp.path())
        .args(["check", "--snapshot", "snapshots"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("json parse error"));
}

#[test]
fn fix_writes_artifacts_without_touching_sources() {
    let temp = repo_with(PARTIAL);
    let before = fs::read_to_string(temp.path().join("Program.cs")).unwrap();

    enumcov()
        .current_dir(temp.path())
        .args(["fix", "--snapshot", "program.snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Program.cs: Add missing values from enum: Color.Green, Color.Blue",
        ));

    let out = temp.path().join("artifacts/enumcov");
    assert!(out.join("fixes.json").exists());
    assert!(out.join("fixes.md").exists());
    let patch = fs::read_to_string(out.join("patch.diff")).unwrap();
    assert!(patch.contains("{ Color.Green, TODO }, { Color.Blue, TODO }"));
    assert_eq!(fs::read_to_string(temp.path().join("Program.cs")).unwrap(), before);
}

#[test]
fn fix_apply_completes_the_map() {
    let temp = repo_with(PARTIAL);

    enumcov()
        .current_dir(temp.path())
        .args(["fix", "--snapshot", "program.snapshot.json", "--apply", "--placeholder", "null"])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 1, skipped 0, failed 0 (1 file(s) modified)"));

    let fixed = fs::read_to_string(temp.path().join("Program.cs")).unwrap();
    assert!(fixed.contains(r##"{ Color.Red, "#FF0000" }, { Color.Green, null }, { Color.Blue, null },"##));
    assert!(temp.path().join("Program.cs.enumcov.bak").exists());
    assert!(temp.path().join("artifacts/enumcov/apply.json").exists());

    // The applied text is what a fresh snapshot sees.
    let s = snapshot("Program.cs", &fixed).expect("parse fixed");
    fs::write(
        temp.path().join("program.snapshot.json"),
        serde_json::to_string(&s).unwrap(),
    )
    .unwrap();
    enumcov()
        .current_dir(temp.path())
        .args(["check", "--snapshot", "program.snapshot.json", "--fail-on-warnings"])
        .assert()
        .success();
}

#[test]
fn apply_refuses_a_changed_file() {
    let temp = repo_with(PARTIAL);

    enumcov()
        .current_dir(temp.path())
        .args(["fix", "--snapshot", "program.snapshot.json"])
        .assert()
        .success();

    let edited = fs::read_to_string(temp.path().join("Program.cs"))
        .unwrap()
        .replace("#FF0000", "#FF0001");
    fs::write(temp.path().join("Program.cs"), &edited).unwrap();

    enumcov()
        .current_dir(temp.path())
        .arg("apply")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("changed since the fix was computed"));
    assert_eq!(fs::read_to_string(temp.path().join("Program.cs")).unwrap(), edited);
}

#[test]
fn apply_dry_run_reports_without_writing() {
    let temp = repo_with(PARTIAL);
    let before = fs::read_to_string(temp.path().join("Program.cs")).unwrap();

    enumcov()
        .current_dir(temp.path())
        .args(["fix", "--snapshot", "program.snapshot.json"])
        .assert()
        .success();
    enumcov()
        .current_dir(temp.path())
        .args(["apply", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 0, skipped 1, failed 0"));

    assert_eq!(fs::read_to_string(temp.path().join("Program.cs")).unwrap(), before);
}

#[test]
fn config_file_sets_placeholder_and_disables_backups() {
    let temp = repo_with(PARTIAL);
    fs::write(
        temp.path().join("enumcov.toml"),
        "[fix]\nplaceholder = \"\\\"?\\\"\"\n\n[apply]\nbackup = false\n",
    )
    .unwrap();

    enumcov()
        .current_dir(temp.path())
        .args(["fix", "--snapshot", "program.snapshot.json", "--apply"])
        .assert()
        .success();

    let fixed = fs::read_to_string(temp.path().join("Program.cs")).unwrap();
    assert!(fixed.contains(r#"{ Color.Blue, "?" }"#));
    assert!(!temp.path().join("Program.cs.enumcov.bak").exists());
}

#[test]
fn explain_by_key_and_unknown_rule() {
    enumcov()
        .args(["explain", "missing-keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Id:        EXHAUSTIVEDICT0001"))
        .stdout(predicate::str::contains("REMEDIATION"));

    enumcov()
        .args(["explain", "no-such-rule"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown rule: 'no-such-rule'"));
}

#[test]
fn list_rules_json_has_every_rule() {
    let output = enumcov()
        .args(["list-rules", "--format", "json"])
        .output()
        .expect("run list-rules");
    assert!(output.status.success());

    let rules: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = rules.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["EXHAUSTIVEDICT0001", "EXHAUSTIVEDICT0002", "EXHAUSTIVEDICT0003"]);
    assert_eq!(rules[0]["fixes"][0], "enumcov.add_missing_entries");
}

//! Applying fix plans to files on disk.

use camino::Utf8PathBuf;
use enumcov_edit::{ApplyOptions, apply_fix_plan, sha256_hex};
use enumcov_types::ToolInfo;
use enumcov_types::apply::ApplyStatus;
use enumcov_types::fix::{FixEdit, FixPlan};
use enumcov_types::span::Span;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const SOURCE: &str = "class P\n{\n    Map = new() { { Color.Red, 1 } };\n}\n";

fn repo_with(path: &str, text: &str) -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 root");
    let file = root.join(path);
    fs::create_dir_all(file.parent().expect("parent")).expect("mkdir");
    fs::write(&file, text).expect("write source");
    (td, root)
}

fn add_blue(path: &str, against: &str) -> FixEdit {
    let start = SOURCE.find("{ {").expect("list start");
    let end = SOURCE.find(" };").expect("list end") + 2;
    FixEdit {
        diagnostic_id: "d-1".to_string(),
        fix_key: "enumcov.add_missing_entries".to_string(),
        title: "Add missing values from enum".to_string(),
        path: path.to_string(),
        document_sha256: sha256_hex(against.as_bytes()),
        span: Span::new(start, end),
        replacement: "{ { Color.Red, 1 }, { Color.Blue, TODO } }".to_string(),
        added: vec!["Color.Blue".to_string()],
    }
}

fn plan(edits: Vec<FixEdit>) -> FixPlan {
    FixPlan::new(ToolInfo::enumcov("0.0.0"), edits)
}

#[test]
fn applies_edits_and_writes_a_backup() {
    let (_td, root) = repo_with("src/P.cs", SOURCE);
    let plan = plan(vec![add_blue("src/P.cs", SOURCE)]);

    let (report, patch) =
        apply_fix_plan(&root, &plan, ToolInfo::enumcov("0.0.0"), &ApplyOptions::default())
            .expect("apply");

    let written = fs::read_to_string(root.join("src/P.cs")).expect("read back");
    assert_eq!(
        written,
        "class P\n{\n    Map = new() { { Color.Red, 1 }, { Color.Blue, TODO } };\n}\n"
    );
    let backup = fs::read_to_string(root.join("src/P.cs.enumcov.bak")).expect("backup");
    assert_eq!(backup, SOURCE);

    assert!(report.applied);
    assert_eq!(report.schema, "enumcov.apply.v1");
    assert_eq!(report.summary.applied, 1);
    assert_eq!(report.summary.files_modified, 1);
    assert_eq!(report.results[0].status, ApplyStatus::Applied);
    assert_eq!(
        report.results[0].sha256_before.as_deref(),
        Some(sha256_hex(SOURCE.as_bytes()).as_str())
    );
    assert_eq!(
        report.results[0].sha256_after.as_deref(),
        Some(sha256_hex(written.as_bytes()).as_str())
    );
    assert!(patch.contains("diff --git a/src/P.cs b/src/P.cs"));
    assert!(patch.contains("+    Map = new() { { Color.Red, 1 }, { Color.Blue, TODO } };"));
}

#[test]
fn dry_run_leaves_files_alone() {
    let (_td, root) = repo_with("P.cs", SOURCE);
    let plan = plan(vec![add_blue("P.cs", SOURCE)]);
    let opts = ApplyOptions {
        dry_run: true,
        ..ApplyOptions::default()
    };

    let (report, patch) =
        apply_fix_plan(&root, &plan, ToolInfo::enumcov("0.0.0"), &opts).expect("apply");

    assert_eq!(fs::read_to_string(root.join("P.cs")).unwrap(), SOURCE);
    assert!(!root.join("P.cs.enumcov.bak").exists());
    assert!(!report.applied);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.results[0].status, ApplyStatus::Skipped);
    assert!(!patch.is_empty());
}

#[test]
fn changed_file_is_reported_as_failed_and_untouched() {
    let edited = SOURCE.replace("class P", "class Q");
    let (_td, root) = repo_with("P.cs", &edited);
    let plan = plan(vec![add_blue("P.cs", SOURCE)]);

    let (report, patch) =
        apply_fix_plan(&root, &plan, ToolInfo::enumcov("0.0.0"), &ApplyOptions::default())
            .expect("apply");

    assert_eq!(fs::read_to_string(root.join("P.cs")).unwrap(), edited);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.files_modified, 0);
    assert_eq!(report.results[0].status, ApplyStatus::Failed);
    assert!(
        report.results[0]
            .message
            .as_deref()
            .unwrap_or_default()
            .contains("changed since the fix was computed")
    );
    assert!(patch.is_empty());
}

#[test]
fn missing_file_fails_only_its_own_edits() {
    let (_td, root) = repo_with("P.cs", SOURCE);
    let plan = plan(vec![add_blue("Gone.cs", SOURCE), add_blue("P.cs", SOURCE)]);
    let opts = ApplyOptions {
        backup: false,
        ..ApplyOptions::default()
    };

    let (report, _) =
        apply_fix_plan(&root, &plan, ToolInfo::enumcov("0.0.0"), &opts).expect("apply");

    assert_eq!(report.summary.attempted, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.applied, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Gone.cs: read failed"));
    assert!(!root.join("P.cs.enumcov.bak").exists());
}

#[test]
fn paths_leaving_the_root_are_refused() {
    let td = tempfile::tempdir().expect("tempdir");
    let base = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 root");
    let root = base.join("repo");
    fs::create_dir_all(&root).expect("mkdir");
    fs::write(root.join("P.cs"), SOURCE).expect("write source");
    let outside = base.join("outside.cs");
    fs::write(&outside, SOURCE).expect("write outside");

    let plan = plan(vec![
        add_blue("../outside.cs", SOURCE),
        add_blue(outside.as_str(), SOURCE),
        add_blue("P.cs", SOURCE),
    ]);

    let (report, patch) =
        apply_fix_plan(&root, &plan, ToolInfo::enumcov("0.0.0"), &ApplyOptions::default())
            .expect("apply");

    assert_eq!(fs::read_to_string(&outside).unwrap(), SOURCE);
    assert!(!base.join("outside.cs.enumcov.bak").exists());
    assert_eq!(report.summary.attempted, 3);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(report.summary.applied, 1);
    assert_eq!(report.errors.len(), 2);
    assert!(
        report
            .errors
            .iter()
            .all(|e| e.contains("is not a relative path under the apply root"))
    );
    assert!(!patch.contains("outside.cs"));
    assert_ne!(fs::read_to_string(root.join("P.cs")).unwrap(), SOURCE);
}

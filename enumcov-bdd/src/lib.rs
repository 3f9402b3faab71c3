//! Workspace helpers for the enumcov acceptance suite.
//!
//! A scenario workspace is a temp directory holding `Program.cs` and the snapshot the toy host
//! produces for it. Artifacts land in the default `artifacts/enumcov` directory.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use enumcov_types::apply::ApplyReport;
use enumcov_types::fix::FixPlan;
use enumcov_types::report::CheckReport;
use fs_err as fs;

pub const PROGRAM_FILE: &str = "Program.cs";
pub const SNAPSHOT_FILE: &str = "program.snapshot.json";

/// Write `Program.cs` with `body` declared under `[Exhaustive]` next to `enum Color`.
pub fn write_color_program(root: &Utf8Path, body: &str) -> anyhow::Result<()> {
    let text = enumcov_testkit::color_program(body.trim());
    fs::write(root.join(PROGRAM_FILE), text)?;
    Ok(())
}

/// Snapshot `Program.cs` as it is on disk and write it next to the source.
pub fn refresh_snapshot(root: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    let text = fs::read_to_string(root.join(PROGRAM_FILE))?;
    let snapshot =
        enumcov_testkit::snapshot(PROGRAM_FILE, &text).context("parse Program.cs")?;
    let path = root.join(SNAPSHOT_FILE);
    let json = serde_json::to_string_pretty(&snapshot).context("serialize snapshot")?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn artifacts_dir(root: &Utf8Path) -> Utf8PathBuf {
    root.join("artifacts").join("enumcov")
}

pub fn read_report(root: &Utf8Path) -> anyhow::Result<CheckReport> {
    let path = artifacts_dir(root).join("report.json");
    let s = fs::read_to_string(&path)?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path))
}

pub fn read_plan(root: &Utf8Path) -> anyhow::Result<FixPlan> {
    let path = artifacts_dir(root).join("fixes.json");
    let s = fs::read_to_string(&path)?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path))
}

pub fn read_apply(root: &Utf8Path) -> anyhow::Result<ApplyReport> {
    let path = artifacts_dir(root).join("apply.json");
    let s = fs::read_to_string(&path)?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_written_next_to_the_program() {
        let td = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(td.path()).unwrap();

        write_color_program(root, "Dictionary<Color, string> ColorToHex;").unwrap();
        let path = refresh_snapshot(root).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["schema"], "enumcov.snapshot.v1");
        assert_eq!(json["documents"][0]["path"], PROGRAM_FILE);
    }

    #[test]
    fn missing_artifacts_are_errors() {
        let td = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(td.path()).unwrap();
        assert!(read_report(root).is_err());
        assert!(read_plan(root).is_err());
    }
}

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use enumcov_types::schema::ENUMCOV_SNAPSHOT_V1;
use enumcov_types::snapshot::SourceSnapshot;
use fs_err as fs;
use glob::glob;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub path: Utf8PathBuf,
    pub snapshot: Result<SourceSnapshot, SnapshotLoadError>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },

    #[error("unsupported schema {found:?}, expected \"enumcov.snapshot.v1\"")]
    Schema { found: String },
}

/// Load one snapshot file, or every `*.snapshot.json` below a directory.
///
/// A file that cannot be read or parsed still yields an entry carrying the error, so one broken
/// input does not hide the others. Entries are sorted by path.
pub fn load_snapshots(input: &Utf8Path) -> anyhow::Result<Vec<LoadedSnapshot>> {
    if !input.is_dir() {
        return Ok(vec![load_snapshot_file(input)]);
    }

    let pattern = input.join("**/*.snapshot.json");
    let pattern_str = pattern.as_str();
    debug!(pattern = %pattern_str, "scanning for snapshots");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob **/*.snapshot.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();
        out.push(load_snapshot_file(&Utf8PathBuf::from(path)));
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

pub fn load_snapshot_file(path: &Utf8Path) -> LoadedSnapshot {
    let snapshot = match fs::read_to_string(path) {
        Ok(s) => parse_snapshot(&s),
        Err(e) => Err(SnapshotLoadError::Io {
            message: e.to_string(),
        }),
    };
    LoadedSnapshot {
        path: path.to_path_buf(),
        snapshot,
    }
}

fn parse_snapshot(json: &str) -> Result<SourceSnapshot, SnapshotLoadError> {
    let snapshot: SourceSnapshot =
        serde_json::from_str(json).map_err(|e| SnapshotLoadError::Json {
            message: e.to_string(),
        })?;
    if snapshot.schema != ENUMCOV_SNAPSHOT_V1 {
        return Err(SnapshotLoadError::Schema {
            found: snapshot.schema,
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root(td: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8")
    }

    #[test]
    fn directory_scan_is_sorted_and_tolerant() {
        let td = tempfile::tempdir().unwrap();
        let dir = root(&td);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(
            dir.join("nested/b.snapshot.json"),
            r#"{ "schema": "enumcov.snapshot.v1" }"#,
        )
        .unwrap();
        std::fs::write(dir.join("a.snapshot.json"), "{ not json").unwrap();
        std::fs::write(dir.join("ignored.json"), "{}").unwrap();

        let loaded = load_snapshots(&dir).unwrap();
        let names: Vec<_> = loaded
            .iter()
            .map(|l| l.path.strip_prefix(&dir).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.snapshot.json", "nested/b.snapshot.json"]);
        assert!(matches!(
            loaded[0].snapshot,
            Err(SnapshotLoadError::Json { .. })
        ));
        assert!(loaded[1].snapshot.is_ok());
    }

    #[test]
    fn single_file_with_foreign_schema_is_rejected() {
        let td = tempfile::tempdir().unwrap();
        let file = root(&td).join("x.json");
        std::fs::write(&file, r#"{ "schema": "sensor.report.v1" }"#).unwrap();

        let loaded = load_snapshots(&file).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded[0].snapshot.as_ref().unwrap_err(),
            &SnapshotLoadError::Schema {
                found: "sensor.report.v1".to_string()
            }
        );
    }

    #[test]
    fn missing_file_is_an_io_error_entry() {
        let loaded = load_snapshots(Utf8Path::new("/definitely/not/here.snapshot.json")).unwrap();
        assert!(matches!(loaded[0].snapshot, Err(SnapshotLoadError::Io { .. })));
    }
}

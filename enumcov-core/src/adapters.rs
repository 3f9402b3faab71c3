//! Default filesystem-backed port implementations.

use crate::load::{LoadedSnapshot, load_snapshots};
use crate::ports::{SnapshotSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use enumcov_types::snapshot::SourceSnapshot;
use fs_err as fs;

/// Loads a snapshot file, or every `*.snapshot.json` under a directory.
#[derive(Debug, Clone)]
pub struct FsSnapshotSource {
    pub input: Utf8PathBuf,
}

impl FsSnapshotSource {
    pub fn new(input: Utf8PathBuf) -> Self {
        Self { input }
    }
}

impl SnapshotSource for FsSnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>> {
        load_snapshots(&self.input).with_context(|| format!("load snapshots from {}", self.input))
    }
}

/// In-memory snapshot source for embedding and testing. Sorted by path on construction to match
/// `FsSnapshotSource`.
#[derive(Debug, Clone)]
pub struct InMemorySnapshotSource {
    snapshots: Vec<LoadedSnapshot>,
}

impl InMemorySnapshotSource {
    pub fn new(mut snapshots: Vec<LoadedSnapshot>) -> Self {
        snapshots.sort_by(|a, b| a.path.cmp(&b.path));
        Self { snapshots }
    }

    pub fn single(path: impl Into<Utf8PathBuf>, snapshot: SourceSnapshot) -> Self {
        Self::new(vec![LoadedSnapshot {
            path: path.into(),
            snapshot: Ok(snapshot),
        }])
    }
}

impl SnapshotSource for InMemorySnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>> {
        Ok(self.snapshots.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

//! Port traits abstracting all I/O away from the pipeline.

use crate::load::LoadedSnapshot;
use camino::Utf8Path;

/// Source of host snapshots.
pub trait SnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

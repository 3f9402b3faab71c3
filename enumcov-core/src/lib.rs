//! Embeddable core library for enumcov.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into an editor
//! integration or another host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SnapshotSource`](ports::SnapshotSource) loads host snapshots
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_check`](pipeline::run_check) analyzes snapshots into a report
//! - [`run_fix`](pipeline::run_fix) proposes edits for missing entries
//! - [`run_apply`](pipeline::run_apply) applies a previously written fix plan

pub mod adapters;
mod load;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use load::{LoadedSnapshot, SnapshotLoadError, load_snapshot_file, load_snapshots};

// Re-exported so embedders can configure analysis without depending on enumcov-domain.
pub use enumcov_domain::{AnalyzerConfig, ContainerShape, FixStyle};

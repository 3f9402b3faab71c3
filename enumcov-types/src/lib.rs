//! Shared DTOs (schemas-as-code) for the enumcov workspace.
//!
//! # Design constraints
//! - Snapshots are produced by a host (compiler front-end, language server, ...) and read here
//!   tolerantly: unknown fields are ignored, optional fields may be absent.
//! - Reports, fix plans and apply results are written to disk. Prefer adding optional fields over
//!   changing semantics.

pub mod apply;
pub mod diagnostic;
pub mod fix;
pub mod report;
pub mod snapshot;
pub mod span;

/// Schema identifiers.
pub mod schema {
    pub const ENUMCOV_SNAPSHOT_V1: &str = "enumcov.snapshot.v1";
    pub const ENUMCOV_REPORT_V1: &str = "enumcov.report.v1";
    pub const ENUMCOV_FIXES_V1: &str = "enumcov.fixes.v1";
    pub const ENUMCOV_APPLY_V1: &str = "enumcov.apply.v1";
}

/// Tool identity stamped into every artifact.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl ToolInfo {
    pub fn enumcov(version: impl Into<String>) -> Self {
        Self {
            name: "enumcov".to_string(),
            version: Some(version.into()),
            commit: None,
        }
    }
}

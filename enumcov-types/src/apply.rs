use crate::ToolInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub root: String,
    pub applied: bool,

    #[serde(default)]
    pub results: Vec<ApplyResult>,

    pub summary: ApplySummary,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApplyReport {
    pub fn new(tool: ToolInfo, root: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::ENUMCOV_APPLY_V1.to_string(),
            tool,
            root: root.into(),
            applied: false,
            results: vec![],
            summary: ApplySummary::default(),
            errors: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub diagnostic_id: String,
    pub path: String,
    pub status: ApplyStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_before: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Applied,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplySummary {
    pub attempted: u64,
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub files_modified: u64,
}

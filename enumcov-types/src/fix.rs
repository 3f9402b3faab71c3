use crate::ToolInfo;
use crate::diagnostic::SiteFailure;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A proposed textual replacement inside one document.
///
/// `document_sha256` pins the edit to the exact text it was computed against; applying it to any
/// other text is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixEdit {
    pub diagnostic_id: String,
    pub fix_key: String,
    pub title: String,
    pub path: String,
    pub document_sha256: String,
    pub span: Span,
    pub replacement: String,

    /// Enum members the edit adds entries for, formatted `Type.Member`.
    #[serde(default)]
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixPlan {
    pub schema: String,
    pub tool: ToolInfo,

    #[serde(default)]
    pub edits: Vec<FixEdit>,

    /// Sites whose edit could not be synthesized.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SiteFailure>,

    pub summary: FixSummary,
}

impl FixPlan {
    pub fn new(tool: ToolInfo, edits: Vec<FixEdit>) -> Self {
        let files = edits
            .iter()
            .map(|e| e.path.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len() as u64;
        let entries_added = edits.iter().map(|e| e.added.len() as u64).sum();
        let summary = FixSummary {
            edits: edits.len() as u64,
            files,
            entries_added,
            patch_bytes: None,
        };
        Self {
            schema: crate::schema::ENUMCOV_FIXES_V1.to_string(),
            tool,
            edits,
            failures: Vec::new(),
            summary,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixSummary {
    pub edits: u64,
    pub files: u64,
    pub entries_added: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_bytes: Option<u64>,
}

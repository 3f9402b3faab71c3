use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub span: Span,

    /// 1-based.
    pub line: u64,

    /// 1-based, in chars.
    pub column: u64,
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Deterministic id: the same finding at the same place always gets the same id.
    pub id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub location: Location,

    /// Positional message arguments, `{0}`, `{1}`, ...
    #[serde(default)]
    pub message_args: Vec<String>,

    pub message: String,
}

/// A site whose analysis aborted. Other sites are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFailure {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    pub message: String,
}

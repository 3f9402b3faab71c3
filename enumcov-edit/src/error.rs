//! Error types for enumcov-edit.
//!
//! Precondition failures (exit code 2) mean the edits do not fit the text they were given:
//! the document changed, two edits overlap, or the target path leaves the apply root. Runtime errors (exit code 1) are I/O and
//! everything else.

use enumcov_types::span::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// The text no longer hashes to the value the edit was computed against.
    #[error("{path} changed since the fix was computed (expected sha256 {expected}, found {actual})")]
    StaleDocument {
        path: String,
        expected: String,
        actual: String,
    },

    /// The edit span lies outside the text, splits a character, or overlaps another edit.
    #[error("{path}: edit at {span:?} conflicts: {message}")]
    Conflict {
        path: String,
        span: Span,
        message: String,
    },

    /// The edit names an absolute path or climbs out of the apply root.
    #[error("{path} is not a relative path under the apply root")]
    OutsideRoot { path: String },
}

impl EditError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, EditError::Precondition(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::Precondition(_) => 2,
            EditError::Runtime(_) => 1,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_document_reports_exit_code_2() {
        let err = EditError::from(PreconditionError::StaleDocument {
            path: "P.cs".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        });
        assert!(err.is_precondition());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("precondition failed"));
        assert!(err.to_string().contains("expected sha256 aa"));
    }

    #[test]
    fn runtime_error_reports_exit_code_1() {
        let err = EditError::from(anyhow::anyhow!("boom"));
        assert!(!err.is_precondition());
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("runtime error"));
    }

    #[test]
    fn escaping_paths_are_preconditions() {
        let err = EditError::from(PreconditionError::OutsideRoot {
            path: "../P.cs".to_string(),
        });
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("../P.cs is not a relative path"));
    }

    #[test]
    fn conflict_display_names_the_span() {
        let err = PreconditionError::Conflict {
            path: "P.cs".to_string(),
            span: Span::new(3, 9),
            message: "overlaps the previous edit".to_string(),
        };
        assert!(err.to_string().contains("P.cs"));
        assert!(err.to_string().contains("overlaps"));
    }
}

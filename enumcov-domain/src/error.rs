use enumcov_types::span::Span;
use thiserror::Error;

/// A declaration node reached the analysis in a shape the host's routing guarantees rule out.
///
/// Fatal for the one site being analyzed; other sites continue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("unhandled node kind '{kind}': only field and property declarations are analyzed")]
    UnexpectedNode { kind: &'static str },

    #[error("field declaration at {}..{} declares no variables", span.start, span.end)]
    EmptyField { span: Span },
}

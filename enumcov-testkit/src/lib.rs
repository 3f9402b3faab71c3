//! A toy host for tests: parses a small C#-like language into an `enumcov.snapshot.v1`
//! [`SourceSnapshot`], so analysis, fixes and edits can be exercised on real source text.
//!
//! Supported: `using`, `namespace`, `enum` (with integer values), `class`/`struct` bodies,
//! attributes, fields and auto-properties, and the initializer expressions the analysis cares
//! about (`new() { ... }` in pair and indexer form, `[]`, casts, member access, literals,
//! invocations).
//!
//! Resolution rules:
//! - `Dictionary<,>`, `List<>` and `HashSet<>` resolve to `System.Collections.Generic` unless a
//!   class of the same name is declared locally.
//! - `[Exhaustive]` resolves to the marker identity when written `ExhaustiveDictionary.Exhaustive`
//!   or when the document has `using ExhaustiveDictionary;`. A locally declared
//!   `ExhaustiveAttribute` class shadows it with a local identity.
//! - Locally declared types get module [`LOCAL_MODULE`].

mod lexer;
mod parser;

use enumcov_types::snapshot::{HostInfo, SourceSnapshot};
use thiserror::Error;

pub use parser::LOCAL_MODULE;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}:{offset}: {message}")]
pub struct ParseError {
    pub path: String,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(path: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            offset,
            message: message.into(),
        }
    }
}

/// Collects documents and builds one snapshot over all of them.
#[derive(Debug, Clone, Default)]
pub struct ToyHost {
    documents: Vec<(String, String)>,
}

impl ToyHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.push((path.into(), text.into()));
        self
    }

    pub fn add_document(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.documents.push((path.into(), text.into()));
    }

    pub fn snapshot(&self) -> Result<SourceSnapshot, ParseError> {
        let host = HostInfo {
            name: "enumcov-testkit".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        };
        parser::build_snapshot(host, &self.documents)
    }
}

/// Snapshot of a single document.
pub fn snapshot(path: &str, text: &str) -> Result<SourceSnapshot, ParseError> {
    ToyHost::new().with_document(path, text).snapshot()
}

/// The `Color { Red, Green, Blue }` program with `body` as the single `[Exhaustive]` member.
pub fn color_program(body: &str) -> String {
    format!(
        "using System.Collections.Generic;\nusing ExhaustiveDictionary;\n\nenum Color\n{{\n    Red,\n    Green,\n    Blue,\n}}\n\nclass Program\n{{\n    [Exhaustive]\n    {body}\n}}\n"
    )
}

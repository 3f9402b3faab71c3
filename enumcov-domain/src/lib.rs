//! Domain logic: decide whether an enum-keyed map declaration covers every enum member, report
//! what is missing or duplicated, and synthesize edits that add the missing entries.
//!
//! This crate owns *what* is wrong and *what* the fix text is. It does not own how edits are
//! applied to files; that's the `enumcov-edit` crate. It never parses source text: all syntax and
//! semantic facts arrive through the [`SemanticModel`] port over a host-exported snapshot.

mod analyzer;
mod classify;
mod coverage;
mod declaration;
mod emit;
mod error;
mod extract;
mod fixers;
mod ports;
pub mod rules;

pub use analyzer::{AnalysisRun, Analyzer, AnalyzerConfig, SiteOutcome, SiteReport};
pub use classify::{
    Classification, ContainerShape, DomainMember, EnumDomain, IneligibleReason, MapTypeInfo,
    classify, map_type_info,
};
pub use coverage::{CoverageResult, compare};
pub use declaration::{Declaration, DeclarationKind, InitializerForm};
pub use emit::{DiagnosticEmitter, deterministic_diagnostic_id};
pub use error::AnalysisError;
pub use extract::{EntryForm, EntryStyle, ProvidedEntry, entry_forms, extract_entries};
pub use fixers::{
    AddMissingEntriesFixer, FixBatch, FixContext, FixStyle, FixSynthesizer, Fixer, FixerMeta,
    builtin_fixer_metas, builtin_fixers, document_sha256,
};
pub use ports::{SemanticModel, SnapshotModel};

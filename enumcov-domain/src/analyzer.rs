use crate::classify::{Classification, ContainerShape, classify};
use crate::coverage::compare;
use crate::declaration::{Declaration, InitializerForm};
use crate::emit::DiagnosticEmitter;
use crate::error::AnalysisError;
use crate::extract::extract_entries;
use crate::ports::{SemanticModel, SnapshotModel};
use crate::rules::{self, DUPLICATED_ENTRY, EXHAUSTIVE, NOT_APPLICABLE, RuleDescriptor};
use enumcov_types::diagnostic::{Diagnostic, SiteFailure};
use enumcov_types::snapshot::{DeclarationNode, SourceSnapshot, SymbolIdentity};
use enumcov_types::span::Span;
use rayon::prelude::*;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Identity an attribute must resolve to for a declaration to opt in.
    pub marker: SymbolIdentity,
    pub container: ContainerShape,
    /// Rule id glob patterns that are never emitted.
    pub deny: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            marker: SymbolIdentity::new(
                "ExhaustiveDictionary",
                "ExhaustiveDictionary.ExhaustiveAttribute",
            ),
            container: ContainerShape::default(),
            deny: Vec::new(),
        }
    }
}

/// Terminal state of one analyzed site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOutcome {
    /// Not opted in. Never diagnosed.
    NotMarked,
    /// Opted in, but the host could not resolve the declared or key type.
    Unresolved,
    /// Opted in on something other than an enum-keyed map.
    Ineligible,
    /// Eligible, and no diagnostic was emitted. Denied rules count as not emitted.
    Covered,
    MissingReported,
    DuplicateReported,
    Both,
}

impl SiteOutcome {
    /// Outcome of an eligible site, by which of its diagnostics were emitted.
    fn from_emitted(missing: bool, duplicated: bool) -> Self {
        match (missing, duplicated) {
            (false, false) => SiteOutcome::Covered,
            (true, false) => SiteOutcome::MissingReported,
            (false, true) => SiteOutcome::DuplicateReported,
            (true, true) => SiteOutcome::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub outcome: SiteOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of analyzing a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRun {
    /// Sorted by path, span start, rule id.
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<SiteFailure>,
    pub sites_analyzed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze every field and property of every document. Sites run in parallel; a failing site
    /// is recorded and does not affect the others.
    pub fn analyze(&self, snapshot: &SourceSnapshot) -> AnalysisRun {
        let model = SnapshotModel::new(snapshot);
        let emitters: Vec<_> = snapshot
            .documents
            .iter()
            .map(|doc| DiagnosticEmitter::new(&doc.path, &doc.text))
            .collect();

        let sites: Vec<(usize, &DeclarationNode)> = snapshot
            .documents
            .iter()
            .enumerate()
            .flat_map(|(i, doc)| {
                doc.nodes
                    .iter()
                    .filter(|n| !matches!(n, DeclarationNode::Other))
                    .map(move |n| (i, n))
            })
            .collect();

        let results: Vec<Result<SiteReport, SiteFailure>> = sites
            .par_iter()
            .map(|&(i, node)| {
                let emitter = &emitters[i];
                self.analyze_site(emitter, node, &model)
                    .map_err(|err| {
                        error!(path = emitter.path(), "site analysis aborted: {}", err);
                        SiteFailure {
                            path: emitter.path().to_string(),
                            span: node.span(),
                            message: err.to_string(),
                        }
                    })
            })
            .collect();

        let mut run = AnalysisRun {
            sites_analyzed: sites.len() as u64,
            ..AnalysisRun::default()
        };
        for result in results {
            match result {
                Ok(report) => run.diagnostics.extend(report.diagnostics),
                Err(failure) => run.failures.push(failure),
            }
        }

        run.diagnostics.sort_by(|a, b| {
            (&a.location.path, a.location.span.start, &a.rule_id).cmp(&(
                &b.location.path,
                b.location.span.start,
                &b.rule_id,
            ))
        });
        run.failures
            .sort_by(|a, b| (&a.path, a.span).cmp(&(&b.path, b.span)));

        debug!(
            "analyzed {} sites: {} diagnostics, {} failures",
            run.sites_analyzed,
            run.diagnostics.len(),
            run.failures.len()
        );
        run
    }

    /// Normalize, classify, extract and compare one declaration, then emit its diagnostics.
    pub fn analyze_site(
        &self,
        emitter: &DiagnosticEmitter<'_>,
        node: &DeclarationNode,
        model: &dyn SemanticModel,
    ) -> Result<SiteReport, AnalysisError> {
        let decl = Declaration::from_node(node, model, &self.config.marker)?;
        let mut diagnostics = Vec::new();

        let outcome = match classify(&decl, model, &self.config.container) {
            Classification::NotMarked => SiteOutcome::NotMarked,
            Classification::Unresolved => {
                debug!(
                    path = emitter.path(),
                    site = decl.name(),
                    "marked declaration has an unresolved type; skipping"
                );
                SiteOutcome::Unresolved
            }
            Classification::NotApplicable(reason) => {
                debug!(path = emitter.path(), site = decl.name(), ?reason, "not applicable");
                self.push(
                    &mut diagnostics,
                    emitter,
                    &NOT_APPLICABLE,
                    decl.declared_type.span,
                    vec![decl.name().to_string(), decl.declared_type.text.clone()],
                );
                SiteOutcome::Ineligible
            }
            Classification::Eligible { domain, .. } => {
                let provided = extract_entries(&decl, model);
                let coverage = compare(&domain, &provided);

                let missing = !coverage.missing.is_empty()
                    && self.push(
                        &mut diagnostics,
                        emitter,
                        &EXHAUSTIVE,
                        exhaustive_location(&decl),
                        vec![
                            decl.name().to_string(),
                            rules::format_members(&coverage.missing),
                        ],
                    );
                let duplicated = !coverage.duplicated.is_empty()
                    && self.push(
                        &mut diagnostics,
                        emitter,
                        &DUPLICATED_ENTRY,
                        decl.identifier.span,
                        vec![
                            decl.name().to_string(),
                            rules::format_members(&coverage.duplicated),
                        ],
                    );
                SiteOutcome::from_emitted(missing, duplicated)
            }
        };

        Ok(SiteReport {
            outcome,
            diagnostics,
        })
    }

    fn push(
        &self,
        out: &mut Vec<Diagnostic>,
        emitter: &DiagnosticEmitter<'_>,
        rule: &RuleDescriptor,
        span: Span,
        args: Vec<String>,
    ) -> bool {
        if rules::is_denied(&self.config.deny, rule.id) {
            debug!(rule_id = rule.id, "rule denied by configuration");
            return false;
        }
        out.push(emitter.emit(rule, span, args));
        true
    }
}

/// Without an entry list the type span is reported instead of the identifier.
pub(crate) fn exhaustive_location(decl: &Declaration<'_>) -> Span {
    match decl.initializer_form {
        InitializerForm::Absent | InitializerForm::EmptyLiteral => decl.declared_type.span,
        InitializerForm::ConstructedWithEntries | InitializerForm::Unrecognized => {
            decl.identifier.span
        }
    }
}

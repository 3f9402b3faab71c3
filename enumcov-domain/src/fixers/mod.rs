use crate::analyzer::AnalyzerConfig;
use crate::extract::EntryStyle;
use crate::ports::{SemanticModel, SnapshotModel};
use anyhow::Context;
use enumcov_types::diagnostic::{Diagnostic, SiteFailure};
use enumcov_types::fix::FixEdit;
use enumcov_types::snapshot::{DocumentSnapshot, SourceSnapshot};
use sha2::{Digest, Sha256};
use tracing::{debug, error};

mod add_missing_entries;

pub use add_missing_entries::AddMissingEntriesFixer;

/// Static description of a fixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixerMeta {
    pub fix_key: &'static str,
    pub title: &'static str,
    /// Rule ids this fixer can act on.
    pub rule_ids: &'static [&'static str],
}

/// Text templates for synthesized entries. `{key}` and `{value}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixStyle {
    /// Value text of every appended entry.
    pub placeholder: String,
    pub pair_template: String,
    pub indexer_template: String,
}

impl Default for FixStyle {
    fn default() -> Self {
        Self {
            placeholder: "TODO".to_string(),
            pair_template: "{ {key}, {value} }".to_string(),
            indexer_template: "[{key}] = {value}".to_string(),
        }
    }
}

impl FixStyle {
    pub fn render(&self, style: EntryStyle, key: &str) -> String {
        let template = match style {
            EntryStyle::Pair => &self.pair_template,
            EntryStyle::Indexer => &self.indexer_template,
        };
        template
            .replace("{key}", key)
            .replace("{value}", &self.placeholder)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixContext {
    pub analysis: AnalyzerConfig,
    pub style: FixStyle,
}

pub trait Fixer: Send + Sync {
    fn meta(&self) -> FixerMeta;

    /// Re-derive the facts for `diagnostic` from `document` and propose an edit, or `None` when
    /// the current text no longer warrants one.
    fn propose(
        &self,
        ctx: &FixContext,
        document: &DocumentSnapshot,
        model: &dyn SemanticModel,
        diagnostic: &Diagnostic,
    ) -> anyhow::Result<Option<FixEdit>>;
}

pub fn builtin_fixers() -> Vec<Box<dyn Fixer>> {
    vec![Box::new(AddMissingEntriesFixer)]
}

pub fn builtin_fixer_metas() -> Vec<FixerMeta> {
    builtin_fixers().iter().map(|f| f.meta()).collect()
}

/// Hex SHA-256 of a document's text.
pub fn document_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Runs the fixer registry over accepted diagnostics.
pub struct FixSynthesizer {
    ctx: FixContext,
    fixers: Vec<Box<dyn Fixer>>,
}

impl FixSynthesizer {
    pub fn new(ctx: FixContext) -> Self {
        Self {
            ctx,
            fixers: builtin_fixers(),
        }
    }

    pub fn with_fixers(ctx: FixContext, fixers: Vec<Box<dyn Fixer>>) -> Self {
        Self { ctx, fixers }
    }

    /// Propose edits for `diagnostics` against the documents in `snapshot`. Edits are sorted by
    /// path and position. A fixer error is recorded against its diagnostic's site and the
    /// remaining diagnostics are still fixed.
    pub fn propose_all(&self, snapshot: &SourceSnapshot, diagnostics: &[Diagnostic]) -> FixBatch {
        let model = SnapshotModel::new(snapshot);
        let mut batch = FixBatch::default();

        for diagnostic in diagnostics {
            let Some(document) = snapshot.document(&diagnostic.location.path) else {
                debug!(
                    "no document {} for diagnostic {}",
                    diagnostic.location.path, diagnostic.id
                );
                continue;
            };

            for fixer in &self.fixers {
                let meta = fixer.meta();
                if !meta.rule_ids.contains(&diagnostic.rule_id.as_str()) {
                    continue;
                }
                let proposed = fixer
                    .propose(&self.ctx, document, &model, diagnostic)
                    .with_context(|| format!("{} for diagnostic {}", meta.fix_key, diagnostic.id));
                match proposed {
                    Ok(Some(edit)) => batch.edits.push(edit),
                    Ok(None) => {}
                    Err(err) => {
                        error!(path = %diagnostic.location.path, "fix aborted: {:#}", err);
                        batch.failures.push(SiteFailure {
                            path: diagnostic.location.path.clone(),
                            span: Some(diagnostic.location.span),
                            message: format!("{err:#}"),
                        });
                    }
                }
            }
        }

        batch
            .edits
            .sort_by(|a, b| (&a.path, a.span.start).cmp(&(&b.path, b.span.start)));
        batch
    }
}

/// Edits proposed for a batch of diagnostics, plus the sites whose fixer failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixBatch {
    pub edits: Vec<FixEdit>,
    pub failures: Vec<SiteFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::rules::EXHAUSTIVE;
    use enumcov_types::snapshot::{DeclarationNode, Expr, ExprNode};
    use enumcov_types::span::Span;

    #[test]
    fn templates_substitute_key_and_placeholder() {
        let style = FixStyle::default();
        assert_eq!(style.render(EntryStyle::Pair, "Color.Red"), "{ Color.Red, TODO }");
        assert_eq!(style.render(EntryStyle::Indexer, "Color.Red"), "[Color.Red] = TODO");

        let custom = FixStyle {
            placeholder: "default!".to_string(),
            ..FixStyle::default()
        };
        assert_eq!(
            custom.render(EntryStyle::Indexer, "Color.Blue"),
            "[Color.Blue] = default!"
        );
    }

    const TWO_MAPS: &str = r#"using System.Collections.Generic;
using ExhaustiveDictionary;

enum Color { Red, Green, Blue }

class Program
{
    [Exhaustive]
    Dictionary<Color, string> First = new() { { Color.Red, "r" } };

    [Exhaustive]
    Dictionary<Color, string> Second = new() { { Color.Red, "r" } };
}
"#;

    fn move_entry_list_out_of_the_document(s: &mut SourceSnapshot, name: &str) {
        for node in &mut s.documents[0].nodes {
            let DeclarationNode::Field { variables, .. } = node else {
                continue;
            };
            let Some(first) = variables.first_mut() else {
                continue;
            };
            if first.name.text != name {
                continue;
            }
            if let Some(Expr {
                node:
                    ExprNode::ObjectCreation {
                        initializer: Some(list),
                    },
                ..
            }) = first.initializer.as_mut()
            {
                list.span = Span::new(10_000, 10_010);
            }
        }
    }

    #[test]
    fn a_failing_site_does_not_drop_fixes_for_other_sites() {
        let mut s = enumcov_testkit::snapshot("P.cs", TWO_MAPS).expect("parse");
        move_entry_list_out_of_the_document(&mut s, "Second");

        let missing: Vec<Diagnostic> = Analyzer::default()
            .analyze(&s)
            .diagnostics
            .into_iter()
            .filter(|d| d.rule_id == EXHAUSTIVE.id)
            .collect();
        assert_eq!(missing.len(), 2);

        let batch = FixSynthesizer::new(FixContext::default()).propose_all(&s, &missing);

        assert_eq!(batch.edits.len(), 1);
        let first = missing
            .iter()
            .find(|d| d.message_args[0] == "First")
            .expect("First diagnostic");
        assert_eq!(batch.edits[0].diagnostic_id, first.id);
        assert_eq!(batch.edits[0].added, vec!["Color.Green", "Color.Blue"]);

        assert_eq!(batch.failures.len(), 1);
        let failure = &batch.failures[0];
        assert_eq!(failure.path, "P.cs");
        assert!(failure.message.contains("enumcov.add_missing_entries"));
        assert!(failure.message.contains("outside P.cs"));
    }

    #[test]
    fn document_hash_is_hex_sha256() {
        assert_eq!(
            document_sha256(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn builtin_registry_fixes_missing_keys() {
        let metas = builtin_fixer_metas();
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].fix_key, "enumcov.add_missing_entries");
        assert_eq!(metas[0].rule_ids, &["EXHAUSTIVEDICT0001"]);
    }
}

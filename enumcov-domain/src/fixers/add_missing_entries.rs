use crate::classify::{Classification, classify};
use crate::coverage::compare;
use crate::declaration::{Declaration, InitializerForm};
use crate::extract::{EntryStyle, entry_forms, extract_entries};
use crate::fixers::{FixContext, Fixer, FixerMeta, document_sha256};
use crate::ports::SemanticModel;
use crate::rules::EXHAUSTIVE;
use anyhow::Context;
use enumcov_types::diagnostic::Diagnostic;
use enumcov_types::fix::FixEdit;
use enumcov_types::snapshot::{DeclarationNode, DocumentSnapshot};
use tracing::debug;

/// Appends one placeholder entry per missing enum member to a `new() { ... }` entry list.
pub struct AddMissingEntriesFixer;

impl AddMissingEntriesFixer {
    const FIX_KEY: &'static str = "enumcov.add_missing_entries";
    const TITLE: &'static str = "Add missing values from enum";

    fn site<'d>(
        document: &'d DocumentSnapshot,
        diagnostic: &Diagnostic,
    ) -> Option<&'d DeclarationNode> {
        let offset = diagnostic.location.span.start;
        document
            .nodes
            .iter()
            .find(|n| n.span().is_some_and(|s| s.contains(offset)))
    }
}

impl Fixer for AddMissingEntriesFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            fix_key: Self::FIX_KEY,
            title: Self::TITLE,
            rule_ids: &["EXHAUSTIVEDICT0001"],
        }
    }

    fn propose(
        &self,
        ctx: &FixContext,
        document: &DocumentSnapshot,
        model: &dyn SemanticModel,
        diagnostic: &Diagnostic,
    ) -> anyhow::Result<Option<FixEdit>> {
        if diagnostic.rule_id != EXHAUSTIVE.id {
            return Ok(None);
        }
        let Some(node) = Self::site(document, diagnostic) else {
            debug!("diagnostic {} no longer points at a declaration", diagnostic.id);
            return Ok(None);
        };

        let decl = Declaration::from_node(node, model, &ctx.analysis.marker)?;
        if diagnostic.message_args.first().map(String::as_str) != Some(decl.name()) {
            debug!(
                "diagnostic {} was raised for another declaration than {}",
                diagnostic.id,
                decl.name()
            );
            return Ok(None);
        }
        if decl.initializer_form != InitializerForm::ConstructedWithEntries {
            return Ok(None);
        }
        let Some(list) = decl.entry_list() else {
            return Ok(None);
        };
        let Classification::Eligible { domain, .. } =
            classify(&decl, model, &ctx.analysis.container)
        else {
            return Ok(None);
        };

        let coverage = compare(&domain, &extract_entries(&decl, model));
        if coverage.missing.is_empty() {
            return Ok(None);
        }

        let style = EntryStyle::detect(&entry_forms(list));
        let added: Vec<String> = coverage.missing.iter().map(|m| m.display.clone()).collect();
        let new_entries = added
            .iter()
            .map(|key| ctx.style.render(style, key))
            .collect::<Vec<_>>()
            .join(", ");

        let list_text = list
            .span
            .slice(&document.text)
            .with_context(|| {
                format!("entry list span {:?} is outside {}", list.span, document.path)
            })?;

        let replacement = match list.entries.last() {
            Some(last) => {
                let split = last.span.end.checked_sub(list.span.start).with_context(|| {
                    format!("last entry of {} starts before its list", decl.name())
                })?;
                let head = list_text.get(..split).with_context(|| {
                    format!("last entry of {} ends outside its list", decl.name())
                })?;
                let tail = list_text.get(split..).unwrap_or_default();
                format!("{head}, {new_entries}{tail}")
            }
            None => format!("{{ {new_entries} }}"),
        };

        Ok(Some(FixEdit {
            diagnostic_id: diagnostic.id.clone(),
            fix_key: Self::FIX_KEY.to_string(),
            title: Self::TITLE.to_string(),
            path: document.path.clone(),
            document_sha256: document_sha256(&document.text),
            span: list.span,
            replacement,
            added,
        }))
    }
}

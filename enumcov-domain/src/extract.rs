use crate::declaration::{Declaration, InitializerForm};
use crate::ports::SemanticModel;
use enumcov_types::snapshot::{ConstantValue, Expr, ExprNode, InitializerList};
use enumcov_types::span::Span;

/// One syntactic entry of an initializer list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryForm<'a> {
    /// `{ key, value }`
    Pair {
        key: &'a Expr,
        value: Option<&'a Expr>,
    },
    /// `[key] = value`
    Indexer { key: &'a Expr, value: &'a Expr },
}

impl<'a> EntryForm<'a> {
    pub fn key(&self) -> &'a Expr {
        match *self {
            EntryForm::Pair { key, .. } | EntryForm::Indexer { key, .. } => key,
        }
    }

    pub fn value(&self) -> Option<&'a Expr> {
        match *self {
            EntryForm::Pair { value, .. } => value,
            EntryForm::Indexer { value, .. } => Some(value),
        }
    }

    pub fn style(&self) -> EntryStyle {
        match self {
            EntryForm::Pair { .. } => EntryStyle::Pair,
            EntryForm::Indexer { .. } => EntryStyle::Indexer,
        }
    }

    fn from_expr(expr: &'a Expr) -> Option<Self> {
        match &expr.node {
            ExprNode::ComplexElement { elements } => {
                let key = elements.first()?;
                Some(EntryForm::Pair {
                    key,
                    value: elements.get(1),
                })
            }
            ExprNode::Assignment { left, right } => match &left.node {
                ExprNode::ImplicitElementAccess { arguments } if arguments.len() == 1 => {
                    Some(EntryForm::Indexer {
                        key: &arguments[0],
                        value: right,
                    })
                }
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryStyle {
    #[default]
    Pair,
    Indexer,
}

impl EntryStyle {
    /// Style of the first recognized entry, or `Pair` for a list without any.
    pub fn detect(forms: &[EntryForm<'_>]) -> Self {
        forms.first().map(EntryForm::style).unwrap_or_default()
    }
}

/// A key present in the initializer whose expression folded to a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedEntry {
    pub value: ConstantValue,
    /// Span of the key expression.
    pub span: Span,
}

/// Recognized entries of an entry list, in source order. Entries in neither form are skipped.
pub fn entry_forms(list: &InitializerList) -> Vec<EntryForm<'_>> {
    list.entries.iter().filter_map(EntryForm::from_expr).collect()
}

/// The multiset of constant keys a declaration's initializer provides.
///
/// Absent, empty-literal and unrecognized initializers provide nothing. Keys that do not fold
/// to a constant are left out.
pub fn extract_entries(decl: &Declaration<'_>, model: &dyn SemanticModel) -> Vec<ProvidedEntry> {
    if decl.initializer_form != InitializerForm::ConstructedWithEntries {
        return Vec::new();
    }
    let Some(list) = decl.entry_list() else {
        return Vec::new();
    };

    entry_forms(list)
        .iter()
        .filter_map(|form| {
            let key = form.key();
            model.fold_constant(key).map(|value| ProvidedEntry {
                value,
                span: key.span,
            })
        })
        .collect()
}

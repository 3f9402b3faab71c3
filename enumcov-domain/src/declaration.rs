use crate::error::AnalysisError;
use crate::ports::SemanticModel;
use enumcov_types::snapshot::{
    AttributeNode, DeclarationNode, Expr, ExprNode, Ident, InitializerList, SymbolIdentity,
    TypeRef,
};
use enumcov_types::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Field,
    Property,
}

/// How the declaration's initializer is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializerForm {
    /// No initializer at all.
    Absent,
    /// Empty collection shorthand, `[]`.
    EmptyLiteral,
    /// Construction with an entry list, `new() { ... }`.
    ConstructedWithEntries,
    /// Anything else: factory calls, non-empty collection literals, `new()` without a list.
    Unrecognized,
}

/// Field- and property-shaped declarations normalized into one descriptor.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    pub kind: DeclarationKind,
    pub span: Span,
    pub identifier: &'a Ident,
    pub declared_type: &'a TypeRef,
    pub attributes: &'a [AttributeNode],
    pub has_marker_attribute: bool,
    pub initializer: Option<&'a Expr>,
    pub initializer_form: InitializerForm,
}

impl<'a> Declaration<'a> {
    /// Normalize a field or property node. Fields contribute their first declared variable.
    pub fn from_node(
        node: &'a DeclarationNode,
        model: &dyn SemanticModel,
        marker: &SymbolIdentity,
    ) -> Result<Self, AnalysisError> {
        let (kind, span, attributes, declared_type, identifier, initializer) = match node {
            DeclarationNode::Field {
                span,
                attributes,
                type_ref,
                variables,
            } => {
                let first = variables
                    .first()
                    .ok_or(AnalysisError::EmptyField { span: *span })?;
                (
                    DeclarationKind::Field,
                    *span,
                    attributes.as_slice(),
                    type_ref,
                    &first.name,
                    first.initializer.as_ref(),
                )
            }
            DeclarationNode::Property {
                span,
                attributes,
                type_ref,
                name,
                initializer,
            } => (
                DeclarationKind::Property,
                *span,
                attributes.as_slice(),
                type_ref,
                name,
                initializer.as_ref(),
            ),
            DeclarationNode::Other => {
                return Err(AnalysisError::UnexpectedNode {
                    kind: node.kind_name(),
                });
            }
        };

        let has_marker_attribute = attributes
            .iter()
            .any(|attr| model.resolve_attribute(attr) == Some(marker));

        Ok(Self {
            kind,
            span,
            identifier,
            declared_type,
            attributes,
            has_marker_attribute,
            initializer,
            initializer_form: initializer_form(initializer),
        })
    }

    pub fn name(&self) -> &str {
        &self.identifier.text
    }

    /// The entry list of a `new() { ... }` initializer.
    pub fn entry_list(&self) -> Option<&'a InitializerList> {
        match self.initializer.map(|e| &e.node) {
            Some(ExprNode::ObjectCreation {
                initializer: Some(list),
            }) => Some(list),
            _ => None,
        }
    }
}

fn initializer_form(initializer: Option<&Expr>) -> InitializerForm {
    let Some(expr) = initializer else {
        return InitializerForm::Absent;
    };
    match &expr.node {
        ExprNode::CollectionLiteral { elements } if elements.is_empty() => {
            InitializerForm::EmptyLiteral
        }
        ExprNode::ObjectCreation {
            initializer: Some(_),
        } => InitializerForm::ConstructedWithEntries,
        _ => InitializerForm::Unrecognized,
    }
}

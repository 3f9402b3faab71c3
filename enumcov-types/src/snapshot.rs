//! Host-exported view of one compilation: document text, declaration syntax and the semantic
//! facts (type symbols, folded constants, resolved attribute identities) enumcov needs.
//!
//! enumcov never parses source text itself. A host fills these structures from its own syntax
//! tree and semantic model and hands them over as `enumcov.snapshot.v1` JSON.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// Schema identifier, e.g. "enumcov.snapshot.v1".
    pub schema: String,

    #[serde(default)]
    pub host: HostInfo,

    #[serde(default)]
    pub documents: Vec<DocumentSnapshot>,

    #[serde(default)]
    pub types: Vec<TypeSymbol>,
}

impl SourceSnapshot {
    pub fn new(host: HostInfo) -> Self {
        Self {
            schema: crate::schema::ENUMCOV_SNAPSHOT_V1.to_string(),
            host,
            documents: vec![],
            types: vec![],
        }
    }

    pub fn document(&self, path: &str) -> Option<&DocumentSnapshot> {
        self.documents.iter().find(|d| d.path == path)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub path: String,

    /// Exact text the spans in `nodes` refer to.
    pub text: String,

    #[serde(default)]
    pub nodes: Vec<DeclarationNode>,
}

/// Resolved identity of a declared symbol: defining module plus fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolIdentity {
    pub module: String,
    pub qualified_name: String,
}

impl SymbolIdentity {
    pub fn new(module: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualified_name: qualified_name.into(),
        }
    }

    /// Last `.`-separated segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

impl fmt::Display for SymbolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.qualified_name, self.module)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub span: Span,

    /// Attribute name as written.
    pub name: String,

    /// Identity the host resolved the attribute to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolIdentity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub span: Span,

    /// Type as written, e.g. `Dictionary<Color, string>`.
    pub text: String,

    /// Id of the resolved `TypeSymbol`, if the host could resolve it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    pub name: Ident,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Expr>,
}

/// A declaration-level syntax node.
///
/// Only `field` and `property` are analyzed; every other kind is carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationNode {
    Field {
        span: Span,
        #[serde(default)]
        attributes: Vec<AttributeNode>,
        type_ref: TypeRef,
        #[serde(default)]
        variables: Vec<VariableNode>,
    },
    Property {
        span: Span,
        #[serde(default)]
        attributes: Vec<AttributeNode>,
        type_ref: TypeRef,
        name: Ident,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<Expr>,
    },
    #[serde(other)]
    Other,
}

impl DeclarationNode {
    pub fn span(&self) -> Option<Span> {
        match self {
            DeclarationNode::Field { span, .. } | DeclarationNode::Property { span, .. } => {
                Some(*span)
            }
            DeclarationNode::Other => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclarationNode::Field { .. } => "field",
            DeclarationNode::Property { .. } => "property",
            DeclarationNode::Other => "other",
        }
    }
}

/// An expression node plus the host's constant-folding result for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub span: Span,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<ConstantValue>,

    pub node: ExprNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExprNode {
    /// Shorthand collection expression, e.g. `[]` or `[a, b]`.
    CollectionLiteral {
        #[serde(default)]
        elements: Vec<Expr>,
    },
    /// Target-typed construction, e.g. `new() { ... }`.
    ObjectCreation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<InitializerList>,
    },
    /// Braced element list inside an initializer, e.g. `{ Color.Red, "#f00" }`.
    ComplexElement {
        #[serde(default)]
        elements: Vec<Expr>,
    },
    Assignment {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Receiver-less element access, e.g. the `[Color.Red]` in `[Color.Red] = "#f00"`.
    ImplicitElementAccess {
        #[serde(default)]
        arguments: Vec<Expr>,
    },
    MemberAccess {
        text: String,
    },
    Literal {
        text: String,
    },
    Cast {
        type_text: String,
        operand: Box<Expr>,
    },
    Invocation {
        callee: String,
        #[serde(default)]
        arguments: Vec<Expr>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializerList {
    pub span: Span,

    #[serde(default)]
    pub entries: Vec<Expr>,
}

/// Compile-time constant produced by the host's folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Int(i64),
    UInt(u64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::UInt(v) => write!(f, "{v}"),
            ConstantValue::Bool(v) => write!(f, "{v}"),
            ConstantValue::Str(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Enum,
    Class,
    Struct,
    Interface,
    Primitive,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub id: String,
    pub kind: TypeKind,

    /// Unparameterized original definition.
    pub definition: SymbolIdentity,

    #[serde(default)]
    pub type_arguments: Vec<String>,

    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberSymbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSymbol {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<ConstantValue>,
}

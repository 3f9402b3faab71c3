use enumcov_types::snapshot::{
    AttributeNode, ConstantValue, Expr, MemberSymbol, SourceSnapshot, SymbolIdentity, TypeRef,
    TypeSymbol,
};
use std::collections::HashMap;

/// Read-only access to the host's semantic facts.
///
/// enumcov-domain depends only on this capability surface, so the analysis can be driven by a
/// snapshot, by an in-process host, or by a fake in tests.
pub trait SemanticModel: Sync {
    fn type_symbol(&self, id: &str) -> Option<&TypeSymbol>;

    fn resolve_type(&self, type_ref: &TypeRef) -> Option<&TypeSymbol> {
        type_ref.symbol.as_deref().and_then(|id| self.type_symbol(id))
    }

    /// Constant-valued members of an enum, in declaration order.
    fn enum_members<'a>(&'a self, ty: &'a TypeSymbol) -> Vec<&'a MemberSymbol> {
        ty.members.iter().filter(|m| m.constant.is_some()).collect()
    }

    /// Constant value of `expr`, or `None` when it does not fold.
    fn fold_constant(&self, expr: &Expr) -> Option<ConstantValue> {
        expr.constant.clone()
    }

    fn resolve_attribute<'a>(&'a self, attr: &'a AttributeNode) -> Option<&'a SymbolIdentity> {
        attr.symbol.as_ref()
    }
}

/// `SemanticModel` backed by a host-exported `SourceSnapshot`.
#[derive(Debug, Clone)]
pub struct SnapshotModel<'a> {
    types: HashMap<&'a str, &'a TypeSymbol>,
}

impl<'a> SnapshotModel<'a> {
    pub fn new(snapshot: &'a SourceSnapshot) -> Self {
        let types = snapshot
            .types
            .iter()
            .map(|t| (t.id.as_str(), t))
            .collect();
        Self { types }
    }
}

impl SemanticModel for SnapshotModel<'_> {
    fn type_symbol(&self, id: &str) -> Option<&TypeSymbol> {
        self.types.get(id).copied()
    }
}

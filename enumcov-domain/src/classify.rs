use crate::declaration::Declaration;
use crate::ports::SemanticModel;
use enumcov_types::snapshot::{ConstantValue, SymbolIdentity, TypeKind, TypeSymbol};
use serde::{Deserialize, Serialize};

/// The generic associative container a marked declaration must be an instance of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerShape {
    #[serde(flatten)]
    pub identity: SymbolIdentity,
    pub arity: usize,
}

impl Default for ContainerShape {
    fn default() -> Self {
        Self {
            identity: SymbolIdentity::new(
                "System.Collections.Generic",
                "System.Collections.Generic.Dictionary",
            ),
            arity: 2,
        }
    }
}

/// Key/value view of a declared type. `key_type`/`value_type` are only meaningful when
/// `is_eligible_container` holds.
#[derive(Debug, Clone, Copy)]
pub struct MapTypeInfo<'a> {
    pub is_eligible_container: bool,
    pub key_type: Option<&'a TypeSymbol>,
    pub value_type: Option<&'a TypeSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainMember {
    /// Member name as declared, e.g. `Red`.
    pub name: String,
    /// `EnclosingEnumType.MemberName`, e.g. `Color.Red`.
    pub display: String,
    pub value: ConstantValue,
}

/// All constant members of an enum key type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDomain {
    pub enum_type: SymbolIdentity,
    pub members: Vec<DomainMember>,
}

impl EnumDomain {
    pub fn from_symbol(model: &dyn SemanticModel, ty: &TypeSymbol) -> Self {
        let type_name = ty.definition.simple_name();
        let members = model
            .enum_members(ty)
            .into_iter()
            .filter_map(|m| {
                let value = m.constant.clone()?;
                Some(DomainMember {
                    name: m.name.clone(),
                    display: format!("{}.{}", type_name, m.name),
                    value,
                })
            })
            .collect();
        Self {
            enum_type: ty.definition.clone(),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// The declared type is not the target container.
    NotAContainer,
    /// The container's key type is not an enum.
    KeyNotEnum,
}

#[derive(Debug, Clone)]
pub enum Classification<'a> {
    /// No marker attribute: the declaration is not opted in.
    NotMarked,
    /// The host could not resolve the declared type or its key type.
    Unresolved,
    /// Marked, but not an enum-keyed instance of the container.
    NotApplicable(IneligibleReason),
    Eligible {
        map: MapTypeInfo<'a>,
        domain: EnumDomain,
    },
}

/// Resolve the declared type and check it against the container shape by exact identity of its
/// unparameterized definition.
pub fn map_type_info<'m>(
    decl: &Declaration<'_>,
    model: &'m dyn SemanticModel,
    container: &ContainerShape,
) -> Option<MapTypeInfo<'m>> {
    let ty = model.resolve_type(decl.declared_type)?;
    let is_eligible_container =
        ty.definition == container.identity && ty.type_arguments.len() == container.arity;
    if !is_eligible_container {
        return Some(MapTypeInfo {
            is_eligible_container,
            key_type: None,
            value_type: None,
        });
    }

    let key_type = ty.type_arguments.first().and_then(|id| model.type_symbol(id));
    let value_type = ty.type_arguments.get(1).and_then(|id| model.type_symbol(id));
    Some(MapTypeInfo {
        is_eligible_container,
        key_type,
        value_type,
    })
}

pub fn classify<'m>(
    decl: &Declaration<'_>,
    model: &'m dyn SemanticModel,
    container: &ContainerShape,
) -> Classification<'m> {
    if !decl.has_marker_attribute {
        return Classification::NotMarked;
    }

    let Some(map) = map_type_info(decl, model, container) else {
        return Classification::Unresolved;
    };
    if !map.is_eligible_container {
        return Classification::NotApplicable(IneligibleReason::NotAContainer);
    }

    let Some(key_type) = map.key_type else {
        return Classification::Unresolved;
    };
    if key_type.kind != TypeKind::Enum {
        return Classification::NotApplicable(IneligibleReason::KeyNotEnum);
    }

    Classification::Eligible {
        map,
        domain: EnumDomain::from_symbol(model, key_type),
    }
}

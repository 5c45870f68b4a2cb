//! What a scope can bind a name to (spec §4.1).

use crate::model::value::{NodePath, PropertyValue};
use crate::registry::types::TypeId;

/// A user-defined enumeration, declared inline and referenced as
/// `Type::variant` in expressions (spec §4.2 "enumerator reference").
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<(String, i64)>,
}

impl EnumDef {
    pub fn variant_value(&self, name: &str) -> Option<i64> {
        self.variants.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

/// One of the five things a name in scope can resolve to (spec §4.1:
/// "component type, parameter value, enum/struct definition, elaborated
/// node (for in-progress siblings), property alias").
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    ComponentType(TypeId),
    Parameter(PropertyValue),
    Enum(EnumDef),
    /// An already-elaborated sibling, addressed by path from the root
    /// being built (spec §4.1 "in-progress elaborated tree").
    ElaboratedNode(NodePath),
    /// `property_alias` — a user name that stands in for a built-in
    /// property (rare in practice, but named explicitly in §4.1).
    PropertyAlias(String),
}

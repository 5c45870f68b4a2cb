//! Property values (spec §3 "Property values") and node references.
//!
//! Mirrors the teacher's "tagged union as a closed sum type" fix from its
//! own design notes (§9 "Property values as a tagged union"): a proper
//! Rust enum instead of a struct-plus-tag.

use std::fmt;

use crate::core::Ident;

/// A path from the root to some other elaborated node, expressed as an
/// ordered chain of child indices. Per the design notes (§9 "Parent/child
/// cycles are forbidden"), a node that refers to another node as a
/// property value stores this path rather than a pointer, and resolves it
/// on demand by walking from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// A concrete property value (spec §3). Equality is structural.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Enum { type_name: Ident, name: Ident, value: i64 },
    Ref(NodePath),
}

impl PropertyValue {
    /// Name of the dynamic kind, used in `TypeMismatch` diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::Enum { .. } => "enum",
            Self::Ref(_) => "reference",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            // SystemRDL permits 0/1 to coerce to boolean properties, but
            // never a boolean back into an integer slot; exposed here only
            // for callers that already know the static schema allows it.
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::Enum { type_name, name, .. } => write!(f, "{type_name}::{name}"),
            Self::Ref(path) => write!(f, "{path}"),
        }
    }
}

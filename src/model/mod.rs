//! The elaborated model's data types (spec §3) and the built-in property
//! schema (spec §4.1, §9).

pub mod node;
pub mod schema;
pub mod value;

pub use node::{ArrayDim, ComponentKind, ElaboratedNode, FieldBits};
pub use schema::{PropertyDef, PropertySchema, PropertyType};
pub use value::{NodePath, PropertyValue};

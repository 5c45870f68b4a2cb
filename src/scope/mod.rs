//! Symbol & Scope Table (spec §4.1): lexically scoped name resolution for
//! component types, parameter bindings, enum definitions, and in-progress
//! elaborated siblings.

pub mod symbol;
pub mod table;

pub use symbol::{Binding, EnumDef};
pub use table::{ScopeGuard, SymbolTable};

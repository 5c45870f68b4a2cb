//! Identifier representation.
//!
//! Identifiers (component names, property names, parameter names) are
//! compared and hashed constantly during elaboration — once per scope
//! lookup, once per property assignment. [`SmolStr`] keeps short names
//! (the overwhelming majority of SystemRDL identifiers) inline and
//! `Copy`-cheap to clone without a heap allocation, which is the
//! dedication this crate actually needs; there is no separate
//! process-wide interning table on top of it.

use smol_str::SmolStr;

/// An identifier — cheap to clone and compare.
pub type Ident = SmolStr;

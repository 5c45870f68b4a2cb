//! # rdl-elab
//!
//! Elaboration core for SystemRDL 2.0 register description models.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! elaborate   → Instantiator: Pass 1 (type registration) + Pass 2 (instantiation)
//!   ↓
//! validate    → Post-elaboration Validator: field layout, address overlap
//!   ↓
//! eval        → Expression evaluator, integer literal parsing
//!   ↓
//! registry    → Component Type Registry
//!   ↓
//! scope       → Symbol & Scope Table
//!   ↓
//! model       → Elaborated model types, built-in property schema
//!   ↓
//! ast         → Parsed syntax tree contract (input), AST JSON
//!   ↓
//! interchange → Elaborated-model JSON (output)
//!   ↓
//! core        → Span, Ident, diagnostics
//! ```

pub mod ast;
pub mod core;
pub mod elaborate;
pub mod eval;
pub mod interchange;
pub mod model;
pub mod registry;
pub mod scope;
pub mod validate;

pub use core::{Diagnostic, ElabError, Severity};
pub use elaborate::ElaboratorConfig;
pub use model::ElaboratedNode;

/// A short-lived, single-invocation elaborator (spec §3 "Lifecycles": "The
/// elaborator itself is a short-lived, single-invocation object").
///
/// Construct one per elaboration run; it holds only the configuration, not
/// any state from a previous run.
#[derive(Debug, Clone, Default)]
pub struct Elaborator {
    config: ElaboratorConfig,
}

impl Elaborator {
    pub fn new(config: ElaboratorConfig) -> Self {
        Self { config }
    }

    /// Run both passes of the Instantiator over a forest of top-level
    /// items (the children of a `CompilationUnit`) and return the
    /// elaborated root together with every diagnostic raised along the way.
    pub fn elaborate(&self, items: &[ast::AstNode]) -> (Option<ElaboratedNode>, Vec<Diagnostic>) {
        elaborate::elaborate(items, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;

    #[test]
    fn elaborator_runs_a_minimal_model() {
        let root = builder::explicit_inst("addrmap", builder::body(vec![]), "top", builder::InstSuffix::default());
        let unit = builder::compilation_unit(vec![root]);
        let elaborator = Elaborator::new(ElaboratorConfig::default());
        let (root, diags) = elaborator.elaborate(unit.children());
        assert!(diags.iter().all(|d| !d.is_error()));
        assert_eq!(root.unwrap().instance_name.as_str(), "top");
    }
}

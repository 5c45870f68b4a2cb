//! Declared-but-uninstantiated component type blueprints (spec §3
//! "Component type", §4.3).

use crate::ast::AstNode;
use crate::core::Ident;
use crate::model::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A component type as registered in Pass 1 (spec §4.4): its kind, the
/// scope it was declared in (for nested-visibility lookups), and its
/// *unresolved* body — we keep the AST subtree rather than a translated
/// IR, since "Types are immutable once registered. They capture no
/// addresses" (spec §3) and the body is only interpreted once per
/// instantiation site during Pass 2.
#[derive(Debug, Clone)]
pub struct ComponentType {
    pub kind: ComponentKind,
    pub name: Option<Ident>,
    /// The `ParameterList` AST node, if the type declares formals.
    pub params: Option<AstNode>,
    /// The `Body` AST node.
    pub body: AstNode,
    /// Scope the type was declared in — nested type declarations are
    /// visible there and in any inner scope, but not above (spec §4.3).
    pub declared_in_scope: usize,
}

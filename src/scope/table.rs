//! The lexically scoped symbol table (spec §4.1).

use rustc_hash::FxHashMap;

use crate::core::{ElabError, Ident};
use crate::scope::symbol::Binding;

#[derive(Debug)]
pub(crate) struct Scope {
    parent: Option<usize>,
    bindings: FxHashMap<Ident, Binding>,
}

impl Scope {
    fn new(parent: Option<usize>) -> Self {
        Self { parent, bindings: FxHashMap::default() }
    }
}

/// A stack of lexical scopes. The lexical root scope is created empty;
/// the built-in property/enum tables the spec describes living there
/// (spec §4.1) are served by [`crate::model::schema::PropertySchema`]
/// instead of being copied into scope bindings, so there is exactly one
/// place that owns them (spec §5: "read-only after construction").
#[derive(Debug)]
pub struct SymbolTable {
    pub(crate) scopes: Vec<Scope>,
    current: usize,
}

/// RAII guard returned by [`SymbolTable::enter_scope`]. Dropping it
/// restores the current scope to what it was before entry — "guaranteed
/// release on all exit paths, even on error" (spec §4.1), the same
/// discipline the teacher's own acquire/release pairs follow via
/// `parking_lot` guards elsewhere in its codebase.
pub struct ScopeGuard<'a> {
    table: &'a mut SymbolTable,
    parent: usize,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.table.current = self.parent;
    }
}

impl ScopeGuard<'_> {
    pub fn scope_id(&self) -> usize {
        self.table.current
    }

    pub fn table(&mut self) -> &mut SymbolTable {
        self.table
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::new(None)], current: 0 }
    }

    pub fn current_scope_id(&self) -> usize {
        self.current
    }

    pub fn enter_scope(&mut self) -> ScopeGuard<'_> {
        let parent = self.current;
        self.enter_scope_with_parent(parent)
    }

    /// Enter a new scope whose *lexical* parent is `lexical_parent`
    /// rather than the currently active scope — used when instantiating
    /// a type whose body was declared somewhere other than the call
    /// site, so names inside it resolve against where it was written,
    /// not where it's used (spec §4.3: "visible in the lexical scope in
    /// which they appear..., but not above"). The guard still restores
    /// `current` to whatever it was before this call on drop.
    pub fn enter_scope_with_parent(&mut self, lexical_parent: usize) -> ScopeGuard<'_> {
        let restore = self.current;
        let id = self.scopes.len();
        self.scopes.push(Scope::new(Some(lexical_parent)));
        self.current = id;
        ScopeGuard { table: self, parent: restore }
    }

    /// Declare a name in the *current* scope. Fails if the name is
    /// already bound in this scope (shadowing of outer scopes is
    /// allowed, per spec §4.1).
    pub fn declare(&mut self, name: Ident, binding: Binding) -> Result<(), ElabError> {
        let scope = &mut self.scopes[self.current];
        if scope.bindings.contains_key(&name) {
            return Err(ElabError::DuplicateName(name.to_string()));
        }
        scope.bindings.insert(name, binding);
        Ok(())
    }

    /// Look up `name`, walking from the current scope outward.
    pub fn lookup(&self, name: &str) -> Result<&Binding, ElabError> {
        self.lookup_from(self.current, name)
    }

    /// Look up `name` starting from a specific scope (used when
    /// resolving inside a freshly entered child scope whose id we
    /// already have, without re-reading `current_scope_id`).
    pub fn lookup_from(&self, mut scope_id: usize, name: &str) -> Result<&Binding, ElabError> {
        loop {
            let scope = &self.scopes[scope_id];
            if let Some(binding) = scope.bindings.get(name) {
                return Ok(binding);
            }
            match scope.parent {
                Some(parent) => scope_id = parent,
                None => return Err(ElabError::UnresolvedName(name.to_string())),
            }
        }
    }

    pub fn try_lookup(&self, name: &str) -> Option<&Binding> {
        self.lookup(name).ok()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::PropertyValue;

    #[test]
    fn shadowing_outer_scope_is_allowed() {
        let mut table = SymbolTable::new();
        table.declare("N".into(), Binding::Parameter(PropertyValue::Int(4))).unwrap();
        {
            let mut guard = table.enter_scope();
            guard
                .table()
                .declare("N".into(), Binding::Parameter(PropertyValue::Int(8)))
                .unwrap();
            match guard.table().lookup("N").unwrap() {
                Binding::Parameter(PropertyValue::Int(8)) => {}
                other => panic!("unexpected binding: {other:?}"),
            }
        }
        match table.lookup("N").unwrap() {
            Binding::Parameter(PropertyValue::Int(4)) => {}
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[test]
    fn duplicate_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        table.declare("a".into(), Binding::Parameter(PropertyValue::Int(1))).unwrap();
        let err = table.declare("a".into(), Binding::Parameter(PropertyValue::Int(2))).unwrap_err();
        assert_eq!(err, ElabError::DuplicateName("a".to_string()));
    }

    #[test]
    fn unresolved_name_fails() {
        let table = SymbolTable::new();
        let err = table.lookup("missing").unwrap_err();
        assert_eq!(err, ElabError::UnresolvedName("missing".to_string()));
    }

    #[test]
    fn guard_restores_scope_on_drop() {
        let mut table = SymbolTable::new();
        let root = table.current_scope_id();
        {
            let guard = table.enter_scope();
            assert_ne!(guard.scope_id(), root);
        }
        assert_eq!(table.current_scope_id(), root);
    }
}

//! Component Type Registry (spec §4.3).

use crate::core::{ElabError, Ident};
use crate::registry::types::{ComponentType, TypeId};
use crate::scope::{Binding, SymbolTable};

#[derive(Debug, Default)]
pub struct ComponentTypeRegistry {
    types: Vec<ComponentType>,
}

impl ComponentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type, binding `name` in the current scope of
    /// `scope_table`. Fails with `DuplicateType` if the name is already
    /// bound to a type in that scope (spec §4.3 `register`).
    pub fn register_named(
        &mut self,
        scope_table: &mut SymbolTable,
        name: Ident,
        ty: ComponentType,
    ) -> Result<TypeId, ElabError> {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        match scope_table.declare(name.clone(), Binding::ComponentType(id)) {
            Ok(()) => Ok(id),
            Err(ElabError::DuplicateName(_)) => Err(ElabError::DuplicateType(name.to_string())),
            Err(other) => Err(other),
        }
    }

    /// Register a type with no name binding — used for the inline
    /// anonymous-type-then-instance form (`reg { ... } r1;`), which the
    /// spec permits "used only once" (§4.4 Pass 1).
    pub fn register_anonymous(&mut self, ty: ComponentType) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Resolve a type name visible from `scope_id` (spec §4.3 `resolve`).
    pub fn resolve(&self, scope_table: &SymbolTable, scope_id: usize, name: &str) -> Result<TypeId, ElabError> {
        match scope_table.lookup_from(scope_id, name) {
            Ok(Binding::ComponentType(id)) => Ok(*id),
            Ok(_) => Err(ElabError::UnresolvedType(name.to_string())),
            Err(_) => Err(ElabError::UnresolvedType(name.to_string())),
        }
    }

    pub fn get(&self, id: TypeId) -> &ComponentType {
        &self.types[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;
    use crate::model::ComponentKind;

    fn dummy_type(kind: ComponentKind) -> ComponentType {
        ComponentType {
            kind,
            name: None,
            params: None,
            body: builder::body(vec![]),
            declared_in_scope: 0,
        }
    }

    #[test]
    fn duplicate_named_type_fails() {
        let mut registry = ComponentTypeRegistry::new();
        let mut scope = SymbolTable::new();
        registry
            .register_named(&mut scope, "rf_t".into(), dummy_type(ComponentKind::RegFile))
            .unwrap();
        let err = registry
            .register_named(&mut scope, "rf_t".into(), dummy_type(ComponentKind::RegFile))
            .unwrap_err();
        assert_eq!(err, ElabError::DuplicateType("rf_t".to_string()));
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = ComponentTypeRegistry::new();
        let scope = SymbolTable::new();
        let err = registry.resolve(&scope, scope.current_scope_id(), "missing_t").unwrap_err();
        assert_eq!(err, ElabError::UnresolvedType("missing_t".to_string()));
    }
}

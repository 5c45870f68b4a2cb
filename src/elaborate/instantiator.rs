//! The Instantiator (spec §4.4): Pass 1 registers every named component
//! type; Pass 2 walks the top-level instance recursively, materializing
//! elaborated nodes with resolved parameters, addresses, and properties.

use indexmap::IndexMap;

use crate::ast::{AstNode, RuleKind};
use crate::core::{Diagnostic, ElabError, Ident, Span};
use crate::elaborate::address::{AddressingMode, Cursor};
use crate::elaborate::properties::{self, DefaultsStack};
use crate::elaborate::ElaboratorConfig;
use crate::eval::Evaluator;
use crate::model::value::NodePath;
use crate::model::{ComponentKind, ElaboratedNode, FieldBits, PropertySchema, PropertyValue};
use crate::registry::{ComponentType, ComponentTypeRegistry};
use crate::scope::{Binding, EnumDef, SymbolTable};
use crate::validate;

/// Run the full elaboration core over a forest of top-level items (the
/// children of a `CompilationUnit`): register every named type (Pass 1),
/// then instantiate the first top-level instance declaration found
/// (Pass 2), conventionally a single `addrmap` (spec §4.4).
pub fn elaborate(
    items: &[AstNode],
    config: &ElaboratorConfig,
) -> (Option<ElaboratedNode>, Vec<Diagnostic>) {
    let mut scope = SymbolTable::new();
    let mut registry = ComponentTypeRegistry::new();
    let schema = PropertySchema::new();
    let mut diagnostics = Vec::new();

    let root_scope = scope.current_scope_id();
    declare_builtin_enums(&mut scope, &schema);
    tracing::debug!(item_count = items.len(), "elaborate_pass1: registering component types");
    run_pass1(&mut scope, &mut registry, items, root_scope, &mut diagnostics);

    let Some(root_inst) = items
        .iter()
        .find(|i| i.is_rule(RuleKind::ComponentInst) || i.is_rule(RuleKind::ExplicitComponentInst))
    else {
        diagnostics.push(Diagnostic::error(
            ElabError::Unsupported("no top-level instance declaration found".into()),
            None,
        ));
        return (None, diagnostics);
    };

    let mut defaults = DefaultsStack::default();
    defaults.push();
    let mut dummy_cursor = Cursor::new(0);
    tracing::debug!("elaborate_pass2: instantiating root");
    let root = instantiate(
        &mut scope,
        &mut registry,
        &schema,
        config,
        &mut defaults,
        &mut diagnostics,
        root_inst,
        root_scope,
        0,
        &mut dummy_cursor,
        None,
        config.default_addressing_mode,
        NodePath::root(),
        0,
    );
    defaults.pop();

    if diagnostics.iter().any(Diagnostic::is_error) {
        (None, diagnostics)
    } else {
        (root, diagnostics)
    }
}

/// Seed the root scope with the SystemRDL built-in enums (`sw`, `hw`,
/// `onread`, `onwrite`, `addressing`) so `Type::variant` expressions
/// resolve against them (spec §4.1).
fn declare_builtin_enums(scope: &mut SymbolTable, schema: &PropertySchema) {
    for (type_name, variants) in schema.enum_types() {
        let def = EnumDef {
            name: type_name.to_string(),
            variants: variants.iter().enumerate().map(|(i, v)| (v.to_string(), i as i64)).collect(),
        };
        let _ = scope.declare(Ident::new(type_name), Binding::Enum(def));
    }
}

// ---------------------------------------------------------------------
// Pass 1: type registration
// ---------------------------------------------------------------------

fn run_pass1(
    scope: &mut SymbolTable,
    registry: &mut ComponentTypeRegistry,
    items: &[AstNode],
    scope_id: usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for item in items {
        if item.is_rule(RuleKind::ComponentNamedDef) {
            pass1_named_def(scope, registry, item, scope_id, diagnostics);
        }
    }
}

fn pass1_named_def(
    scope: &mut SymbolTable,
    registry: &mut ComponentTypeRegistry,
    def: &AstNode,
    scope_id: usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(kind) = ComponentKind::from_keyword(def.text()) else {
        diagnostics.push(Diagnostic::error(
            ElabError::Unsupported(format!("unknown component kind '{}'", def.text())),
            Some(def.span().clone()),
        ));
        return;
    };
    let name = def.first_terminal().map(|s| s.to_string());
    let params = def.first_child_of_kind(RuleKind::ParameterList).cloned();
    let body = def
        .first_child_of_kind(RuleKind::Body)
        .cloned()
        .unwrap_or_else(|| AstNode::rule(RuleKind::Body, "", Span::synthetic(), vec![]));

    let ty = ComponentType {
        kind,
        name: name.as_deref().map(Ident::new),
        params,
        body: body.clone(),
        declared_in_scope: scope_id,
    };

    if let Some(name) = &name {
        tracing::debug!(name = %name, kind = kind.as_str(), "registered named component type");
        if let Err(e) = registry.register_named(scope, Ident::new(name.as_str()), ty) {
            diagnostics.push(Diagnostic::error(e, Some(def.span().clone())));
        }
    } else {
        tracing::trace!(kind = kind.as_str(), "registered anonymous component type");
        registry.register_anonymous(ty);
    }

    // Nested type declarations are visible in the scope this type's body
    // introduces, and any inner scope, but not above (spec §4.3).
    let inner_scope = scope.enter_scope_with_parent(scope_id).scope_id();
    run_pass1(scope, registry, body.children(), inner_scope, diagnostics);
}

// ---------------------------------------------------------------------
// Pass 2: instantiation
// ---------------------------------------------------------------------

struct ResolvedInstance {
    kind: ComponentKind,
    type_name: Option<Ident>,
    params: Option<AstNode>,
    body: AstNode,
    declared_in_scope: usize,
}

fn resolve_instance(
    scope: &SymbolTable,
    registry: &ComponentTypeRegistry,
    inst_node: &AstNode,
    calling_scope_id: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedInstance> {
    match inst_node.kind() {
        Some(RuleKind::ComponentInst) => {
            let type_name = inst_node.text();
            match registry.resolve(scope, calling_scope_id, type_name) {
                Ok(id) => {
                    let ty = registry.get(id);
                    Some(ResolvedInstance {
                        kind: ty.kind,
                        type_name: ty.name.clone(),
                        params: ty.params.clone(),
                        body: ty.body.clone(),
                        declared_in_scope: ty.declared_in_scope,
                    })
                }
                Err(e) => {
                    diagnostics.push(Diagnostic::error(e, Some(inst_node.span().clone())));
                    None
                }
            }
        }
        Some(RuleKind::ExplicitComponentInst) => {
            let Some(kind) = ComponentKind::from_keyword(inst_node.text()) else {
                diagnostics.push(Diagnostic::error(
                    ElabError::Unsupported(format!("unknown component kind '{}'", inst_node.text())),
                    Some(inst_node.span().clone()),
                ));
                return None;
            };
            let body = inst_node.children().first().cloned().unwrap_or_else(|| {
                AstNode::rule(RuleKind::Body, "", Span::synthetic(), vec![])
            });
            Some(ResolvedInstance {
                kind,
                type_name: None,
                params: None,
                body,
                declared_in_scope: calling_scope_id,
            })
        }
        _ => {
            diagnostics.push(Diagnostic::error(
                ElabError::Unsupported("expected an instance declaration".into()),
                Some(inst_node.span().clone()),
            ));
            None
        }
    }
}

/// Evaluate every actual parameter eagerly against the call site scope,
/// matching by name first, then by position (spec §4.4 step 2).
fn eval_actuals(
    scope: &SymbolTable,
    calling_scope_id: usize,
    inst_node: &AstNode,
) -> Result<IndexMap<String, PropertyValue>, ElabError> {
    let mut by_name = IndexMap::new();
    let mut positional = Vec::new();
    if let Some(list) = inst_node.first_child_of_kind(RuleKind::ActualParameterList) {
        let evaluator = Evaluator::new(scope, calling_scope_id);
        for actual in list.children() {
            let Some(expr) = actual.children().first() else { continue };
            let value = eval_plain(&evaluator, expr)?;
            if actual.text().is_empty() {
                positional.push(value);
            } else {
                by_name.insert(actual.text().to_string(), value);
            }
        }
    }
    // Stash positionals under numeric keys; resolved against formals by
    // the caller, which knows the formal order.
    let mut result = by_name;
    for (i, value) in positional.into_iter().enumerate() {
        result.insert(format!("#{i}"), value);
    }
    Ok(result)
}

fn eval_plain(evaluator: &Evaluator, expr: &AstNode) -> Result<PropertyValue, ElabError> {
    use crate::eval::EvalResult;
    Ok(match evaluator.eval(expr)? {
        EvalResult::Num { value, .. } => PropertyValue::Int(value),
        EvalResult::Bool(b) => PropertyValue::Bool(b),
        EvalResult::Str(s) => PropertyValue::Str(s),
        EvalResult::EnumRef { type_name, name, value } => {
            PropertyValue::Enum { type_name: Ident::new(&type_name), name: Ident::new(&name), value }
        }
        EvalResult::Ref(path) => PropertyValue::Ref(path),
        EvalResult::Keyword(kw) => PropertyValue::Str(kw),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn instantiate(
    scope: &mut SymbolTable,
    registry: &mut ComponentTypeRegistry,
    schema: &PropertySchema,
    config: &ElaboratorConfig,
    defaults: &mut DefaultsStack,
    diagnostics: &mut Vec<Diagnostic>,
    inst_node: &AstNode,
    calling_scope_id: usize,
    parent_base: u64,
    cursor: &mut Cursor,
    parent_kind: Option<ComponentKind>,
    container_addressing_mode: AddressingMode,
    node_path: NodePath,
    depth: u32,
) -> Option<ElaboratedNode> {
    if depth > config.max_elaboration_depth {
        diagnostics.push(Diagnostic::error(
            ElabError::Unsupported("maximum elaboration depth exceeded".into()),
            Some(inst_node.span().clone()),
        ));
        return None;
    }

    let resolved = resolve_instance(scope, registry, inst_node, calling_scope_id, diagnostics)?;
    let inst_name = inst_node.first_terminal().unwrap_or("").to_string();
    tracing::trace!(inst_name = %inst_name, depth, "materializing instance");

    // `this` is the instance under construction; `parent` is whichever
    // node owns the body it's declared in, i.e. `node_path` with its
    // last segment dropped (spec §4.2 "this/parent navigational
    // references").
    let this_path = Some(node_path.clone());
    let parent_path = (!node_path.0.is_empty())
        .then(|| NodePath(node_path.0[..node_path.0.len() - 1].to_vec()));

    if let Some(parent_kind) = parent_kind {
        if !parent_kind.allows_child(resolved.kind) {
            diagnostics.push(Diagnostic::error(
                ElabError::IllegalChild {
                    parent: parent_kind.as_str().to_string(),
                    child: resolved.kind.as_str().to_string(),
                },
                Some(inst_node.span().clone()),
            ));
            return None;
        }
    }

    let actuals = match eval_actuals(scope, calling_scope_id, inst_node) {
        Ok(a) => a,
        Err(e) => {
            diagnostics.push(Diagnostic::error(e, Some(inst_node.span().clone())));
            IndexMap::new()
        }
    };

    let mut guard = scope.enter_scope_with_parent(resolved.declared_in_scope);
    let new_scope_id = guard.scope_id();

    let mut used_actual_names: Vec<String> = Vec::new();
    if let Some(formal_list) = &resolved.params {
        for (index, formal) in formal_list.children_of_kind(RuleKind::ParameterDef).enumerate() {
            let formal_name = formal.first_terminal().unwrap_or("").to_string();
            let by_name_key = formal_name.clone();
            let positional_key = format!("#{index}");
            let value = if let Some(v) = actuals.get(&by_name_key) {
                used_actual_names.push(by_name_key);
                Some(v.clone())
            } else if let Some(v) = actuals.get(&positional_key) {
                used_actual_names.push(positional_key);
                Some(v.clone())
            } else {
                None
            };
            let value = match value {
                Some(v) => v,
                None => {
                    let table = guard.table();
                    let default_expr = formal.children().iter().find(|c| c.expr_child().is_some() || c.kind().map(|k| {
                        matches!(k, RuleKind::ExprLiteralInt | RuleKind::ExprLiteralBool | RuleKind::ExprLiteralStr | RuleKind::ExprIdent | RuleKind::ExprEnumRef | RuleKind::ExprUnaryOp | RuleKind::ExprBinaryOp | RuleKind::ExprTernary | RuleKind::ExprConcat | RuleKind::ExprReplicate)
                    }).unwrap_or(false));
                    match default_expr {
                        Some(expr) => {
                            let evaluator = Evaluator::new(table, new_scope_id)
                                .with_navigation(this_path.clone(), parent_path.clone());
                            match eval_plain(&evaluator, expr) {
                                Ok(v) => v,
                                Err(e) => {
                                    diagnostics.push(Diagnostic::error(e, Some(formal.span().clone())));
                                    PropertyValue::Int(0)
                                }
                            }
                        }
                        None => {
                            diagnostics.push(Diagnostic::error(
                                ElabError::BadParameter(formal_name.clone()),
                                Some(formal.span().clone()),
                            ));
                            PropertyValue::Int(0)
                        }
                    }
                }
            };
            let _ = guard.table().declare(Ident::new(&formal_name), Binding::Parameter(value));
        }
    }
    for key in actuals.keys() {
        if !used_actual_names.contains(key) && !key.starts_with('#') {
            diagnostics.push(Diagnostic::error(
                ElabError::BadParameter(key.clone()),
                Some(inst_node.span().clone()),
            ));
        }
    }

    // Array dimensions, evaluated in the new scope (so a regfile's `N`
    // formal is visible to its own `r[N]` member, per spec §4.4 step 4).
    let mut array_dims: Vec<u64> = Vec::new();
    {
        let evaluator = Evaluator::new(guard.table(), new_scope_id)
            .with_navigation(this_path.clone(), parent_path.clone());
        for dim in inst_node.children_of_kind(RuleKind::ArrayDim) {
            let Some(expr) = dim.children().first() else { continue };
            match eval_plain(&evaluator, expr).and_then(|v| {
                v.as_int().ok_or_else(|| ElabError::TypeMismatch {
                    expected: "integer".into(),
                    found: v.kind_name().into(),
                })
            }) {
                Ok(size) => {
                    if size == 0 {
                        diagnostics.push(Diagnostic::error(
                            ElabError::BadParameter("array dimension must be non-zero".into()),
                            Some(dim.span().clone()),
                        ));
                    } else if (size as u64) > u64::from(config.max_array_elements) {
                        diagnostics.push(Diagnostic::error(ElabError::OverflowInWidth, Some(dim.span().clone())));
                    } else {
                        array_dims.push(size as u64);
                    }
                }
                Err(e) => diagnostics.push(Diagnostic::error(e, Some(dim.span().clone()))),
            }
        }
    }

    let mut node = ElaboratedNode::new(resolved.kind, Ident::new(&inst_name), resolved.type_name.clone());

    if resolved.kind == ComponentKind::Field {
        elaborate_field_body(
            guard.table(),
            schema,
            defaults,
            diagnostics,
            inst_node,
            &resolved.body,
            new_scope_id,
            this_path,
            parent_path,
            &mut node,
        );
        guard.table().declare(Ident::new(&inst_name), Binding::ElaboratedNode(node_path.clone())).ok();
        return Some(node);
    }

    let mut explicit_stride: Option<u64> = None;
    let mut explicit_align: Option<u64> = None;
    let mut explicit_addr: Option<u64> = None;
    {
        let evaluator = Evaluator::new(guard.table(), new_scope_id)
            .with_navigation(this_path.clone(), parent_path.clone());
        if let Some(n) = inst_node.first_child_of_kind(RuleKind::InstAddrFixed) {
            if let Some(expr) = n.children().first() {
                match eval_plain(&evaluator, expr).and_then(|v| v.as_int().ok_or_else(|| ElabError::TypeMismatch {
                    expected: "integer".into(),
                    found: v.kind_name().into(),
                })) {
                    Ok(v) => explicit_addr = Some(v as u64),
                    Err(e) => diagnostics.push(Diagnostic::error(e, Some(n.span().clone()))),
                }
            }
        }
        if let Some(n) = inst_node.first_child_of_kind(RuleKind::InstAddrStride) {
            if let Some(expr) = n.children().first() {
                if let Ok(Some(v)) = eval_plain(&evaluator, expr).map(|v| v.as_int()) {
                    explicit_stride = Some(v as u64);
                }
            }
        }
        if let Some(n) = inst_node.first_child_of_kind(RuleKind::InstAddrAlign) {
            if let Some(expr) = n.children().first() {
                if let Ok(Some(v)) = eval_plain(&evaluator, expr).map(|v| v.as_int()) {
                    explicit_align = Some(v as u64);
                }
            }
        }
    }

    // Mode-driven placement (no explicit `@`/`%=`) can't be resolved
    // until this instance's own size is known: `regalign` aligns to the
    // element size, `fullalign` to the next power-of-two of it (spec
    // §4.4 step 5). Place provisionally at the cursor's current
    // (unaligned, i.e. `compact`) position, elaborate the body to learn
    // the real size, then re-run the mode against that size and shift
    // this instance and everything already placed inside it.
    let mode_driven = explicit_addr.is_none() && explicit_align.is_none();
    let mut this_base = if let Some(offset) = explicit_addr {
        parent_base + offset
    } else {
        if let Some(align) = explicit_align {
            cursor.align(align);
        }
        cursor.position()
    };

    node.absolute_address = this_base;
    defaults.push();
    let (children, local_props) = elaborate_container_body(
        guard.table(),
        registry,
        schema,
        config,
        defaults,
        diagnostics,
        &resolved.body,
        new_scope_id,
        this_base,
        resolved.kind,
        depth,
        &node_path,
        this_path.clone(),
        parent_path.clone(),
    );
    defaults.pop();
    node.children = children;

    let regwidth_default = local_props
        .get("regwidth")
        .and_then(PropertyValue::as_int)
        .or_else(|| properties::effective_value(None, defaults, schema, "regwidth").and_then(|v| v.as_int()))
        .unwrap_or(32);

    node.properties = local_props;
    for name in applicable_props(resolved.kind) {
        if !node.properties.contains_key(*name) {
            if let Some(value) = properties::effective_value(None, defaults, schema, name) {
                node.properties.insert(name.to_string(), value);
            }
        }
    }

    match resolved.kind {
        ComponentKind::Reg => {
            validate::finalize_register(&mut node, regwidth_default.max(0) as u32, inst_node.span(), diagnostics);
        }
        ComponentKind::AddrMap | ComponentKind::RegFile | ComponentKind::Mem => {
            validate::check_no_overlap(&node.children, inst_node.span(), diagnostics);
            node.size = node
                .children
                .iter()
                .map(ElaboratedNode::footprint_end)
                .max()
                .map(|end| end.saturating_sub(this_base))
                .unwrap_or(0);
        }
        ComponentKind::Field => unreachable!("handled above"),
    }

    let element_size = node.size.max(1);
    let element_count = array_dims.first().copied().unwrap_or(1);
    let stride = explicit_stride.unwrap_or(element_size);

    if mode_driven {
        let full_footprint = crate::elaborate::address::span(element_size, element_count, stride);
        cursor.apply_mode(container_addressing_mode, element_size, full_footprint);
        let aligned = cursor.position();
        if aligned != this_base {
            let delta = aligned - this_base;
            node.absolute_address = aligned;
            for child in &mut node.children {
                shift_subtree(child, delta);
            }
            this_base = aligned;
        }
    }

    if resolved.kind == ComponentKind::Reg && this_base % node.size.max(1) != 0 && node.size > 0 {
        let msg = ElabError::MisalignedAddress(inst_name.clone());
        if config.treat_misaligned_address_as_error {
            tracing::error!(inst_name = %inst_name, address = this_base, "misaligned register address");
            diagnostics.push(Diagnostic::error(msg, Some(inst_node.span().clone())));
        } else {
            tracing::warn!(inst_name = %inst_name, address = this_base, "misaligned register address");
            diagnostics.push(Diagnostic::warning(msg, Some(inst_node.span().clone())));
        }
    }

    if !array_dims.is_empty() {
        node.array_dimensions = array_dims
            .iter()
            .map(|size| crate::model::ArrayDim { size: *size, stride })
            .collect();
    }

    if explicit_addr.is_some() {
        cursor.advance_past(this_base, crate::elaborate::address::span(element_size, element_count, stride));
    } else {
        // The cursor still sits exactly at `this_base` (nothing consumed
        // it yet); `take_and_advance` both confirms that and moves past
        // this instance's full footprint for the next sibling.
        cursor.take_and_advance(element_size, element_count, stride);
    }

    guard.table().declare(Ident::new(&inst_name), Binding::ElaboratedNode(node_path)).ok();
    Some(node)
}

/// Add `delta` to a node's own address and every descendant's, used
/// after a mode-driven placement is re-aligned against a now-known size.
fn shift_subtree(node: &mut ElaboratedNode, delta: u64) {
    node.absolute_address = node.absolute_address.saturating_add(delta);
    for child in &mut node.children {
        shift_subtree(child, delta);
    }
}

fn applicable_props(kind: ComponentKind) -> &'static [&'static str] {
    match kind {
        ComponentKind::Field => &["sw", "hw", "onread", "onwrite", "woclr", "woset", "wclr", "reset", "desc"],
        ComponentKind::Reg => &["regwidth", "accesswidth", "sw", "desc"],
        ComponentKind::RegFile => &["sw", "desc"],
        ComponentKind::Mem => &["sw", "memwidth", "mementries", "desc"],
        ComponentKind::AddrMap => &["addressing", "desc"],
    }
}

#[allow(clippy::too_many_arguments)]
fn elaborate_container_body(
    scope: &mut SymbolTable,
    registry: &mut ComponentTypeRegistry,
    schema: &PropertySchema,
    config: &ElaboratorConfig,
    defaults: &mut DefaultsStack,
    diagnostics: &mut Vec<Diagnostic>,
    body: &AstNode,
    body_scope_id: usize,
    base_addr: u64,
    kind: ComponentKind,
    depth: u32,
    node_path: &NodePath,
    this_path: Option<NodePath>,
    parent_path: Option<NodePath>,
) -> (Vec<ElaboratedNode>, IndexMap<String, PropertyValue>) {
    let mut children: Vec<ElaboratedNode> = Vec::new();
    let mut local_props: IndexMap<String, PropertyValue> = IndexMap::new();
    let mut cursor = Cursor::new(base_addr);
    // Updated in place the moment an `addressing = ...;` assignment is
    // seen; governs the cursor policy for instances later in this same
    // body (spec §4.4: "If the parent is an addrmap with declared
    // addressing = ...").
    let mut addressing_mode = config.default_addressing_mode;

    for item in body.children() {
        match item.kind() {
            Some(RuleKind::LocalPropertyAssignment) => {
                if let Some(expr) = item.children().first() {
                    let evaluator = Evaluator::new(scope, body_scope_id)
                        .with_navigation(this_path.clone(), parent_path.clone());
                    match properties::eval_property_value(&evaluator, schema, kind, item.text(), expr) {
                        Ok(value) => {
                            if item.text() == "addressing" {
                                if let PropertyValue::Enum { name, .. } = &value {
                                    if let Some(mode) = AddressingMode::from_str(name.as_str()) {
                                        addressing_mode = mode;
                                    }
                                }
                            }
                            local_props.insert(item.text().to_string(), value);
                        }
                        Err(e) => diagnostics.push(Diagnostic::error(e, Some(item.span().clone()))),
                    }
                }
            }
            Some(RuleKind::DefaultPropertyAssignment) => {
                if let Some(expr) = item.children().first() {
                    let evaluator = Evaluator::new(scope, body_scope_id)
                        .with_navigation(this_path.clone(), parent_path.clone());
                    match properties::eval_property_value(&evaluator, schema, kind, item.text(), expr) {
                        Ok(value) => defaults.current_mut().set(item.text().to_string(), value),
                        Err(e) => diagnostics.push(Diagnostic::error(e, Some(item.span().clone()))),
                    }
                }
            }
            Some(RuleKind::DynamicPropertyAssignment) => {
                apply_dynamic_assignment(
                    scope,
                    schema,
                    diagnostics,
                    item,
                    body_scope_id,
                    this_path.clone(),
                    parent_path.clone(),
                    &mut children,
                );
            }
            Some(RuleKind::ComponentInst) | Some(RuleKind::ExplicitComponentInst) => {
                let child_index = children.len();
                let child_path = node_path.child(child_index);
                let child = instantiate(
                    scope,
                    registry,
                    schema,
                    config,
                    defaults,
                    diagnostics,
                    item,
                    body_scope_id,
                    base_addr,
                    &mut cursor,
                    Some(kind),
                    addressing_mode,
                    child_path,
                    depth + 1,
                );
                if let Some(child) = child {
                    children.push(child);
                }
            }
            _ => {}
        }
    }

    (children, local_props)
}

#[allow(clippy::too_many_arguments)]
fn apply_dynamic_assignment(
    scope: &SymbolTable,
    schema: &PropertySchema,
    diagnostics: &mut Vec<Diagnostic>,
    item: &AstNode,
    body_scope_id: usize,
    this_path: Option<NodePath>,
    parent_path: Option<NodePath>,
    children: &mut [ElaboratedNode],
) {
    let Some(path_node) = item.first_child_of_kind(RuleKind::InstancePath) else { return };
    let segments: Vec<&str> = path_node.children().iter().map(AstNode::text).collect();
    let Some((first, rest)) = segments.split_first() else { return };
    let Some(mut target) = children.iter_mut().find(|c| c.instance_name.as_str() == *first) else {
        diagnostics.push(Diagnostic::error(
            ElabError::ForwardReference(first.to_string()),
            Some(item.span().clone()),
        ));
        return;
    };
    for segment in rest {
        match target.child_named_mut(segment) {
            Some(next) => target = next,
            None => {
                diagnostics.push(Diagnostic::error(
                    ElabError::ForwardReference(segment.to_string()),
                    Some(item.span().clone()),
                ));
                return;
            }
        }
    }
    let Some(expr) = item.children().get(1) else { return };
    let evaluator = Evaluator::new(scope, body_scope_id).with_navigation(this_path, parent_path);
    match properties::eval_property_value(&evaluator, schema, target.kind, item.text(), expr) {
        Ok(value) => {
            target.properties.insert(item.text().to_string(), value);
        }
        Err(e) => diagnostics.push(Diagnostic::error(e, Some(item.span().clone()))),
    }
}

#[allow(clippy::too_many_arguments)]
fn elaborate_field_body(
    scope: &mut SymbolTable,
    schema: &PropertySchema,
    defaults: &mut DefaultsStack,
    diagnostics: &mut Vec<Diagnostic>,
    inst_node: &AstNode,
    body: &AstNode,
    body_scope_id: usize,
    this_path: Option<NodePath>,
    parent_path: Option<NodePath>,
    node: &mut ElaboratedNode,
) {
    let mut local_props: IndexMap<String, PropertyValue> = IndexMap::new();
    for item in body.children() {
        if let Some(RuleKind::LocalPropertyAssignment) = item.kind() {
            if let Some(expr) = item.children().first() {
                let evaluator = Evaluator::new(scope, body_scope_id)
                    .with_navigation(this_path.clone(), parent_path.clone());
                match properties::eval_property_value(&evaluator, schema, ComponentKind::Field, item.text(), expr) {
                    Ok(value) => {
                        local_props.insert(item.text().to_string(), value);
                    }
                    Err(e) => diagnostics.push(Diagnostic::error(e, Some(item.span().clone()))),
                }
            }
        }
    }

    node.field_bits = Some(derive_field_bits(inst_node, &local_props, diagnostics));
    node.properties = local_props;
    for name in applicable_props(ComponentKind::Field) {
        if !node.properties.contains_key(*name) {
            if let Some(value) = properties::effective_value(None, defaults, schema, name) {
                node.properties.insert(name.to_string(), value);
            }
        }
    }
    node.size = 0;
}

fn derive_field_bits(
    inst_node: &AstNode,
    local_props: &IndexMap<String, PropertyValue>,
    diagnostics: &mut Vec<Diagnostic>,
) -> FieldBits {
    let range = inst_node.first_child_of_kind(RuleKind::RangeSuffix);
    let prop_int = |name: &str| local_props.get(name).and_then(PropertyValue::as_int).map(|v| v as u32);

    let (msb, lsb) = match range {
        Some(r) if r.text() == "explicit" => {
            let msb = eval_const_u32(&r.children()[0]);
            let lsb = eval_const_u32(&r.children()[1]);
            (msb, lsb)
        }
        Some(r) if r.text() == "width" => {
            let width = eval_const_u32(&r.children()[0]);
            let lsb = prop_int("lsb").unwrap_or(0);
            (lsb + width.saturating_sub(1), lsb)
        }
        _ => {
            let lsb = prop_int("lsb").unwrap_or(0);
            let msb = prop_int("msb").unwrap_or_else(|| lsb + prop_int("width").unwrap_or(1).saturating_sub(1));
            (msb, lsb)
        }
    };

    if msb < lsb {
        diagnostics.push(Diagnostic::error(
            ElabError::BitRangeInconsistent(inst_node.first_terminal().unwrap_or("").to_string()),
            Some(inst_node.span().clone()),
        ));
        return FieldBits { lsb: 0, msb: 0, width: 1 };
    }
    FieldBits { lsb, msb, width: msb - lsb + 1 }
}

/// A field's bit-range suffix is always a literal-ish constant in
/// practice; fall back to 0 rather than threading a full evaluator
/// through for what is almost always `int_lit`.
fn eval_const_u32(expr: &AstNode) -> u32 {
    crate::eval::parse_int_literal(expr.text()).map(|(v, _)| v as u32).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;

    fn run(top_level_items: Vec<AstNode>) -> (Option<ElaboratedNode>, Vec<Diagnostic>) {
        let unit = builder::compilation_unit(top_level_items);
        elaborate(unit.children(), &ElaboratorConfig::default())
    }

    #[test]
    fn scenario_a_simple_two_register_chip() {
        let reg1 = builder::explicit_inst(
            "reg",
            builder::body(vec![builder::explicit_inst(
                "field",
                builder::body(vec![builder::local_assign("sw", builder::ident("rw"))]),
                "data",
                builder::InstSuffix { range: Some(builder::range_msb_lsb(31, 0)), ..Default::default() },
            )]),
            "reg1",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(0))), ..Default::default() },
        );
        let reg2 = builder::explicit_inst(
            "reg",
            builder::body(vec![builder::explicit_inst(
                "field",
                builder::body(vec![builder::local_assign("sw", builder::ident("rw"))]),
                "status",
                builder::InstSuffix { range: Some(builder::range_msb_lsb(7, 0)), ..Default::default() },
            )]),
            "reg2",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(4))), ..Default::default() },
        );
        let root = builder::explicit_inst(
            "addrmap",
            builder::body(vec![reg1, reg2]),
            "simple_chip",
            builder::InstSuffix::default(),
        );
        let (root, diags) = run(vec![root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].absolute_address, 0x0);
        assert_eq!(root.children[0].size, 4);
        assert_eq!(root.children[1].absolute_address, 0x4);
        assert_eq!(root.children[1].children.len(), 2);
        let reserved = root.children[1].children.iter().find(|f| f.instance_name.starts_with("RESERVED_")).unwrap();
        assert_eq!(reserved.instance_name.as_str(), "RESERVED_31_8");
    }

    #[test]
    fn scenario_c_field_overlap_fails() {
        let reg = builder::explicit_inst(
            "reg",
            builder::body(vec![
                builder::explicit_inst(
                    "field",
                    builder::body(vec![]),
                    "a",
                    builder::InstSuffix { range: Some(builder::range_msb_lsb(7, 0)), ..Default::default() },
                ),
                builder::explicit_inst(
                    "field",
                    builder::body(vec![]),
                    "b",
                    builder::InstSuffix { range: Some(builder::range_msb_lsb(3, 0)), ..Default::default() },
                ),
            ]),
            "r",
            builder::InstSuffix::default(),
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(root.is_none());
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::FieldOverlap { .. })));
    }

    #[test]
    fn scenario_d_register_overlap_fails() {
        let reg_a = builder::explicit_inst(
            "reg",
            builder::body(vec![builder::local_assign("regwidth", builder::int_lit(32))]),
            "regA",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(0))), ..Default::default() },
        );
        let reg_b = builder::explicit_inst(
            "reg",
            builder::body(vec![builder::local_assign("regwidth", builder::int_lit(32))]),
            "regB",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(2))), ..Default::default() },
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg_a, reg_b]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(root.is_none());
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::AddressOverlap { .. })));
    }

    #[test]
    fn scenario_f_dynamic_property_assignment() {
        let reg = builder::explicit_inst(
            "reg",
            builder::body(vec![builder::explicit_inst(
                "field",
                builder::body(vec![builder::local_assign("sw", builder::ident("rw"))]),
                "a",
                builder::InstSuffix { range: Some(builder::range_msb_lsb(7, 0)), ..Default::default() },
            )]),
            "r",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(0))), ..Default::default() },
        );
        let dynamic = builder::dynamic_assign(&["r", "a"], "reset", builder::sized_int_lit("8'h5A"));
        let root = builder::explicit_inst(
            "addrmap",
            builder::body(vec![reg, dynamic]),
            "m",
            builder::InstSuffix::default(),
        );
        let (root, diags) = run(vec![root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        let field = &root.children[0].children[0];
        assert_eq!(field.property("reset"), Some(&PropertyValue::Int(0x5A)));
    }

    #[test]
    fn scenario_e_parameterized_regfile_array() {
        let field = builder::explicit_inst(
            "field",
            builder::body(vec![builder::local_assign("sw", builder::ident("rw"))]),
            "f",
            builder::InstSuffix { range: Some(builder::range_msb_lsb(7, 0)), ..Default::default() },
        );
        let array_reg = builder::explicit_inst(
            "reg",
            builder::body(vec![field]),
            "r",
            builder::InstSuffix {
                dims: vec![builder::array_dim(builder::ident("N"))],
                addr_fixed: Some(builder::addr_fixed(builder::int_lit(0))),
                stride: Some(builder::addr_stride(builder::int_lit(4))),
                ..Default::default()
            },
        );
        let rf_type = builder::named_def(
            "regfile",
            Some("rf_t"),
            Some(builder::param_list(vec![builder::param_def("N", Some(builder::int_lit(4)))])),
            builder::body(vec![array_reg]),
        );
        let rf_inst = builder::inst(
            "rf_t",
            "rf",
            builder::InstSuffix {
                actuals: Some(builder::actual_param_list(vec![builder::actual_param(Some("N"), builder::int_lit(3))])),
                addr_fixed: Some(builder::addr_fixed(builder::int_lit(0x100))),
                ..Default::default()
            },
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![rf_inst]), "top", builder::InstSuffix::default());
        let (root, diags) = run(vec![rf_type, root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        let rf = &root.children[0];
        assert_eq!(rf.absolute_address, 0x100);
        assert_eq!(rf.children.len(), 1);
        let r = &rf.children[0];
        assert_eq!(r.absolute_address, 0x100);
        assert_eq!(r.array_dimensions, vec![crate::model::ArrayDim { size: 3, stride: 4 }]);
        assert_eq!(rf.size, 0xC);
    }

    #[test]
    fn regalign_mode_aligns_to_resolved_element_size() {
        let reg_a = builder::explicit_inst(
            "reg",
            builder::body(vec![
                builder::local_assign("regwidth", builder::int_lit(8)),
                builder::explicit_inst(
                    "field",
                    builder::body(vec![]),
                    "f",
                    builder::InstSuffix { range: Some(builder::range_msb_lsb(7, 0)), ..Default::default() },
                ),
            ]),
            "regA",
            builder::InstSuffix::default(),
        );
        let reg_b = builder::explicit_inst(
            "reg",
            builder::body(vec![
                builder::local_assign("regwidth", builder::int_lit(32)),
                builder::explicit_inst(
                    "field",
                    builder::body(vec![]),
                    "f",
                    builder::InstSuffix { range: Some(builder::range_msb_lsb(31, 0)), ..Default::default() },
                ),
            ]),
            "regB",
            builder::InstSuffix::default(),
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg_a, reg_b]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        // regA is 1 byte wide at 0x0; the default `regalign` mode must align
        // regB (4 bytes wide) up to its own size, not pack it at 0x1.
        assert_eq!(root.children[0].absolute_address, 0x0);
        assert_eq!(root.children[0].size, 1);
        assert_eq!(root.children[1].absolute_address, 0x4);
        assert_eq!(root.children[1].size, 4);
    }

    #[test]
    fn this_and_parent_resolve_to_node_paths() {
        let reg = builder::explicit_inst(
            "reg",
            builder::body(vec![
                builder::local_assign("self_ref", builder::ident("this")),
                builder::local_assign("up_ref", builder::ident("parent")),
            ]),
            "r",
            builder::InstSuffix { addr_fixed: Some(builder::addr_fixed(builder::int_lit(0))), ..Default::default() },
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg]), "top", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        let r = &root.children[0];
        assert_eq!(r.property("self_ref"), Some(&PropertyValue::Ref(NodePath(vec![0]))));
        assert_eq!(r.property("up_ref"), Some(&PropertyValue::Ref(NodePath::root())));
    }

    #[test]
    fn enum_reference_resolves_predefined_access_enum() {
        let field = builder::explicit_inst(
            "field",
            builder::body(vec![builder::local_assign("sw", builder::enum_ref("sw", "rw"))]),
            "f",
            builder::InstSuffix { range: Some(builder::range_msb_lsb(0, 0)), ..Default::default() },
        );
        let reg = builder::explicit_inst("reg", builder::body(vec![field]), "r", builder::InstSuffix::default());
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let root = root.unwrap();
        let f = &root.children[0].children[0];
        match f.property("sw") {
            Some(PropertyValue::Enum { name, .. }) => assert_eq!(name.as_str(), "rw"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn illegal_child_rejected() {
        let field = builder::explicit_inst("field", builder::body(vec![]), "f", builder::InstSuffix { range: Some(builder::range_msb_lsb(0, 0)), ..Default::default() });
        let root = builder::explicit_inst("addrmap", builder::body(vec![field]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(root.is_none());
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::IllegalChild { .. })));
    }

    #[test]
    fn array_dimension_zero_fails() {
        let reg = builder::explicit_inst(
            "reg",
            builder::body(vec![]),
            "r",
            builder::InstSuffix { dims: vec![builder::array_dim(builder::int_lit(0))], ..Default::default() },
        );
        let root = builder::explicit_inst("addrmap", builder::body(vec![reg]), "m", builder::InstSuffix::default());
        let (root, diags) = run(vec![root]);
        assert!(root.is_none());
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::BadParameter(_))));
    }
}

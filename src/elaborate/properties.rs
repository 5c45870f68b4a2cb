//! Property resolution within an instance body (spec §4.4 "Property
//! handling inside a body").

use indexmap::IndexMap;

use crate::ast::AstNode;
use crate::core::{ElabError, Ident};
use crate::eval::{EvalResult, Evaluator};
use crate::model::{ComponentKind, PropertySchema, PropertyType, PropertyValue};

/// One frame of `default` assignments collected for the body currently
/// being elaborated. Cascades to descendants until the scope that
/// introduced it is left (spec §4.4: "acts as a cascaded default for
/// descendants of the current scope until overridden").
#[derive(Debug, Default)]
pub struct DefaultsFrame {
    values: IndexMap<String, PropertyValue>,
}

impl DefaultsFrame {
    pub fn set(&mut self, name: String, value: PropertyValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }
}

/// The stack of enclosing `default` frames, innermost last.
#[derive(Debug, Default)]
pub struct DefaultsStack(Vec<DefaultsFrame>);

impl DefaultsStack {
    pub fn push(&mut self) {
        self.0.push(DefaultsFrame::default());
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    pub fn current_mut(&mut self) -> &mut DefaultsFrame {
        self.0.last_mut().expect("default frame stack underflow: push/pop mismatched")
    }

    /// Nearest enclosing default for `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// Resolve a bareword the evaluator couldn't place (`rw`, `rclr`, ...)
/// into a concrete enum value, using the declared variant set of the
/// property it's being assigned to. The evaluator itself can't do this:
/// several property families share variant spellings (`sw=rw` vs.
/// `hw=rw`), so the reconciliation has to happen at the assignment site.
pub fn reconcile_keyword(
    schema: &PropertySchema,
    prop_name: &str,
    keyword: &str,
) -> Result<PropertyValue, ElabError> {
    let def = schema
        .get(prop_name)
        .ok_or_else(|| ElabError::UnresolvedName(keyword.to_string()))?;
    match &def.ty {
        PropertyType::Enum(type_name, variants) => {
            if let Some(pos) = variants.iter().position(|v| *v == keyword) {
                Ok(PropertyValue::Enum {
                    type_name: Ident::new(*type_name),
                    name: Ident::new(keyword),
                    value: pos as i64,
                })
            } else {
                Err(ElabError::TypeMismatch {
                    expected: format!("one of {variants:?}"),
                    found: keyword.to_string(),
                })
            }
        }
        _ => Err(ElabError::TypeMismatch { expected: "value".to_string(), found: keyword.to_string() }),
    }
}

/// Evaluate a property assignment's value expression into a concrete
/// [`PropertyValue`], reconciling bare keywords and type-checking the
/// result against the schema (spec invariant 6).
pub fn eval_property_value(
    evaluator: &Evaluator,
    schema: &PropertySchema,
    kind: ComponentKind,
    prop_name: &str,
    expr: &AstNode,
) -> Result<PropertyValue, ElabError> {
    let result = evaluator.eval(expr)?;
    let value = match result {
        EvalResult::Num { value, .. } => PropertyValue::Int(value),
        EvalResult::Bool(b) => PropertyValue::Bool(b),
        EvalResult::Str(s) => PropertyValue::Str(s),
        EvalResult::Keyword(kw) => reconcile_keyword(schema, prop_name, &kw)?,
        EvalResult::EnumRef { type_name, name, value } => {
            PropertyValue::Enum { type_name: Ident::new(&type_name), name: Ident::new(&name), value }
        }
        EvalResult::Ref(path) => PropertyValue::Ref(path),
    };
    schema
        .type_check(prop_name, kind, &value)
        .map_err(|(expected, found)| ElabError::TypeMismatch { expected, found })?;
    Ok(value)
}

/// Effective value of a property on a node under elaboration: explicit
/// local assignment, else the nearest enclosing `default`, else the
/// built-in schema default, else absent (spec §4.4 "Property
/// inheritance").
pub fn effective_value(
    local: Option<&PropertyValue>,
    defaults: &DefaultsStack,
    schema: &PropertySchema,
    prop_name: &str,
) -> Option<PropertyValue> {
    local
        .cloned()
        .or_else(|| defaults.lookup(prop_name).cloned())
        .or_else(|| schema.builtin_default(prop_name))
}

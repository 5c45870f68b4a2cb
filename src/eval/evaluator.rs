//! Expression Evaluator (spec §4.2): reduces a SystemRDL constant
//! expression to a concrete value.

use crate::ast::{AstNode, RuleKind};
use crate::core::ElabError;
use crate::eval::literal::parse_int_literal;
use crate::model::value::NodePath;
use crate::scope::{Binding, SymbolTable};

/// The result of evaluating an expression, before it is reconciled
/// against a target property's declared type (spec §4.2 "Result
/// contract"). A bare identifier that isn't a parameter/node reference is
/// kept as [`EvalResult::Keyword`] rather than failing outright — whether
/// it denotes `sw=rw` or is simply unresolved depends on the property
/// it's being assigned to, which the evaluator doesn't know about.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Num { value: i64, width: Option<u32> },
    Bool(bool),
    Str(String),
    Keyword(String),
    EnumRef { type_name: String, name: String, value: i64 },
    Ref(NodePath),
}

impl EvalResult {
    pub fn as_num(&self) -> Result<(i64, Option<u32>), ElabError> {
        match self {
            Self::Num { value, width } => Ok((*value, *width)),
            Self::Bool(b) => Ok((*b as i64, None)),
            other => Err(ElabError::TypeMismatch {
                expected: "integer".into(),
                found: other.kind_name().into(),
            }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ElabError> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Num { value, .. } => Ok(*value != 0),
            other => Err(ElabError::TypeMismatch {
                expected: "boolean".into(),
                found: other.kind_name().into(),
            }),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Num { .. } => "integer",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::Keyword(_) => "identifier",
            Self::EnumRef { .. } => "enum",
            Self::Ref(_) => "reference",
        }
    }
}

/// Evaluates expressions against a scope chain. `this`/`parent`
/// resolve to node paths supplied by the caller (the instantiator),
/// since the evaluator itself holds no notion of "current node".
pub struct Evaluator<'a> {
    scope: &'a SymbolTable,
    scope_id: usize,
    this_path: Option<NodePath>,
    parent_path: Option<NodePath>,
}

impl<'a> Evaluator<'a> {
    pub fn new(scope: &'a SymbolTable, scope_id: usize) -> Self {
        Self { scope, scope_id, this_path: None, parent_path: None }
    }

    pub fn with_navigation(mut self, this_path: Option<NodePath>, parent_path: Option<NodePath>) -> Self {
        self.this_path = this_path;
        self.parent_path = parent_path;
        self
    }

    pub fn eval(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let Some(kind) = expr.kind() else {
            return Err(ElabError::Unsupported("expected an expression, found a terminal".into()));
        };
        match kind {
            RuleKind::ExprLiteralInt => {
                let (value, width) = parse_int_literal(expr.text())?;
                Ok(EvalResult::Num { value, width })
            }
            RuleKind::ExprLiteralBool => Ok(EvalResult::Bool(expr.text() == "true")),
            RuleKind::ExprLiteralStr => Ok(EvalResult::Str(expr.text().to_string())),
            RuleKind::ExprIdent => self.eval_ident(expr.text()),
            RuleKind::ExprEnumRef => self.eval_enum_ref(expr.text()),
            RuleKind::ExprUnaryOp => self.eval_unary(expr),
            RuleKind::ExprBinaryOp => self.eval_binary(expr),
            RuleKind::ExprTernary => self.eval_ternary(expr),
            RuleKind::ExprConcat => self.eval_concat(expr),
            RuleKind::ExprReplicate => self.eval_replicate(expr),
            other => Err(ElabError::Unsupported(format!("'{other}' is not an expression"))),
        }
    }

    fn eval_ident(&self, name: &str) -> Result<EvalResult, ElabError> {
        match name {
            "this" => self
                .this_path
                .clone()
                .map(EvalResult::Ref)
                .ok_or_else(|| ElabError::UnresolvedName("this".into())),
            "parent" => self
                .parent_path
                .clone()
                .map(EvalResult::Ref)
                .ok_or_else(|| ElabError::UnresolvedName("parent".into())),
            _ => match self.scope.lookup_from(self.scope_id, name) {
                Ok(Binding::Parameter(value)) => Ok(value_to_eval_result(value)),
                Ok(Binding::ElaboratedNode(path)) => Ok(EvalResult::Ref(path.clone())),
                Ok(Binding::Enum(_) | Binding::ComponentType(_) | Binding::PropertyAlias(_)) => {
                    Err(ElabError::TypeMismatch {
                        expected: "value".into(),
                        found: "type or alias".into(),
                    })
                }
                // Not found anywhere in scope: might still be a built-in
                // access-type/behavior keyword (`rw`, `woclr`, ...) whose
                // legality depends on which property it's assigned to.
                Err(_) => Ok(EvalResult::Keyword(name.to_string())),
            },
        }
    }

    fn eval_enum_ref(&self, text: &str) -> Result<EvalResult, ElabError> {
        let (type_name, variant) = text
            .split_once("::")
            .ok_or_else(|| ElabError::Unsupported(format!("malformed enum reference '{text}'")))?;
        match self.scope.lookup_from(self.scope_id, type_name) {
            Ok(Binding::Enum(def)) => {
                let value = def
                    .variant_value(variant)
                    .ok_or_else(|| ElabError::UnresolvedName(text.to_string()))?;
                Ok(EvalResult::EnumRef { type_name: type_name.to_string(), name: variant.to_string(), value })
            }
            _ => Err(ElabError::UnresolvedName(type_name.to_string())),
        }
    }

    fn eval_unary(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let operand = self.eval(&expr.children()[0])?;
        match expr.text() {
            "-" => {
                let (v, w) = operand.as_num()?;
                Ok(EvalResult::Num { value: v.wrapping_neg(), width: w })
            }
            "+" => operand.as_num().map(|(v, w)| EvalResult::Num { value: v, width: w }),
            "~" => {
                let (v, w) = operand.as_num()?;
                Ok(EvalResult::Num { value: mask_to_width(!v, w), width: w })
            }
            "!" => Ok(EvalResult::Bool(!operand.as_bool()?)),
            op => Err(ElabError::Unsupported(format!("unknown unary operator '{op}'"))),
        }
    }

    fn eval_binary(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let lhs = self.eval(&expr.children()[0])?;
        let rhs = self.eval(&expr.children()[1])?;
        let op = expr.text();
        match op {
            "&&" => return Ok(EvalResult::Bool(lhs.as_bool()? && rhs.as_bool()?)),
            "||" => return Ok(EvalResult::Bool(lhs.as_bool()? || rhs.as_bool()?)),
            "==" => return Ok(EvalResult::Bool(values_equal(&lhs, &rhs))),
            "!=" => return Ok(EvalResult::Bool(!values_equal(&lhs, &rhs))),
            _ => {}
        }
        let (a, wa) = lhs.as_num()?;
        let (b, wb) = rhs.as_num()?;
        let width = wa.or(wb);
        let result = match op {
            "+" => a.wrapping_add(b),
            "-" => a.wrapping_sub(b),
            "*" => a.wrapping_mul(b),
            "/" => {
                if b == 0 {
                    return Err(ElabError::DivisionByZero);
                }
                a.wrapping_div(b)
            }
            "%" => {
                if b == 0 {
                    return Err(ElabError::DivisionByZero);
                }
                a.wrapping_rem(b)
            }
            "&" => a & b,
            "|" => a | b,
            "^" => a ^ b,
            "**" => {
                if b < 0 {
                    return Err(ElabError::Unsupported("negative exponent".into()));
                }
                a.wrapping_pow(b as u32)
            }
            "<<" => {
                if b < 0 {
                    return Err(ElabError::BadShift);
                }
                mask_to_width(a.wrapping_shl(b as u32), width)
            }
            ">>" => {
                if b < 0 {
                    return Err(ElabError::BadShift);
                }
                a.wrapping_shr(b as u32)
            }
            "<" => return Ok(EvalResult::Bool(a < b)),
            "<=" => return Ok(EvalResult::Bool(a <= b)),
            ">" => return Ok(EvalResult::Bool(a > b)),
            ">=" => return Ok(EvalResult::Bool(a >= b)),
            other => return Err(ElabError::Unsupported(format!("unknown binary operator '{other}'"))),
        };
        Ok(EvalResult::Num { value: result, width })
    }

    fn eval_ternary(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let cond = self.eval(&expr.children()[0])?.as_bool()?;
        if cond {
            self.eval(&expr.children()[1])
        } else {
            self.eval(&expr.children()[2])
        }
    }

    fn eval_concat(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let mut value: i64 = 0;
        let mut total_width: u32 = 0;
        for child in expr.children() {
            let (v, w) = self.eval(child)?.as_num()?;
            let w = w.ok_or_else(|| {
                ElabError::Unsupported("concatenation operands must have a known width".into())
            })?;
            if total_width + w > 64 {
                return Err(ElabError::OverflowInWidth);
            }
            value = (value << w) | mask_to_width(v, Some(w));
            total_width += w;
        }
        Ok(EvalResult::Num { value, width: Some(total_width) })
    }

    fn eval_replicate(&self, expr: &AstNode) -> Result<EvalResult, ElabError> {
        let (count, _) = self.eval(&expr.children()[0])?.as_num()?;
        if count < 0 {
            return Err(ElabError::Unsupported("replication count must be non-negative".into()));
        }
        let (part_value, part_width) = self.eval(&expr.children()[1])?.as_num()?;
        let part_width = part_width.ok_or_else(|| {
            ElabError::Unsupported("replication operand must have a known width".into())
        })?;
        let total_width = part_width.checked_mul(count as u32).ok_or(ElabError::OverflowInWidth)?;
        if total_width > 64 {
            return Err(ElabError::OverflowInWidth);
        }
        let mut value: i64 = 0;
        for _ in 0..count {
            value = (value << part_width) | mask_to_width(part_value, Some(part_width));
        }
        Ok(EvalResult::Num { value, width: Some(total_width) })
    }
}

fn mask_to_width(value: i64, width: Option<u32>) -> i64 {
    match width {
        Some(w) if w < 64 => value & ((1i64 << w) - 1),
        _ => value,
    }
}

fn values_equal(a: &EvalResult, b: &EvalResult) -> bool {
    match (a, b) {
        (EvalResult::Num { value: va, .. }, EvalResult::Num { value: vb, .. }) => va == vb,
        (EvalResult::Bool(a), EvalResult::Bool(b)) => a == b,
        (EvalResult::Str(a), EvalResult::Str(b)) => a == b,
        (EvalResult::Keyword(a), EvalResult::Keyword(b)) => a == b,
        (EvalResult::EnumRef { value: va, .. }, EvalResult::EnumRef { value: vb, .. }) => va == vb,
        _ => false,
    }
}

fn value_to_eval_result(value: &crate::model::value::PropertyValue) -> EvalResult {
    use crate::model::value::PropertyValue as PV;
    match value {
        PV::Int(v) => EvalResult::Num { value: *v, width: None },
        PV::Bool(v) => EvalResult::Bool(*v),
        PV::Str(v) => EvalResult::Str(v.clone()),
        PV::Enum { type_name, name, value } => {
            EvalResult::EnumRef { type_name: type_name.to_string(), name: name.to_string(), value: *value }
        }
        PV::Ref(path) => EvalResult::Ref(path.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;
    use crate::scope::Binding;

    fn eval_in_fresh_scope(expr: &AstNode) -> Result<EvalResult, ElabError> {
        let scope = SymbolTable::new();
        Evaluator::new(&scope, scope.current_scope_id()).eval(expr)
    }

    #[test]
    fn arithmetic() {
        let expr = builder::binary("+", builder::int_lit(2), builder::binary("*", builder::int_lit(3), builder::int_lit(4)));
        assert_eq!(eval_in_fresh_scope(&expr).unwrap(), EvalResult::Num { value: 14, width: None });
    }

    #[test]
    fn division_by_zero() {
        let expr = builder::binary("/", builder::int_lit(1), builder::int_lit(0));
        assert_eq!(eval_in_fresh_scope(&expr).unwrap_err(), ElabError::DivisionByZero);
    }

    #[test]
    fn negative_shift_fails() {
        let expr = builder::binary("<<", builder::int_lit(1), builder::int_lit(-1));
        assert_eq!(eval_in_fresh_scope(&expr).unwrap_err(), ElabError::BadShift);
    }

    #[test]
    fn ternary_picks_branch() {
        let expr = builder::ternary(builder::bool_lit(true), builder::int_lit(1), builder::int_lit(2));
        assert_eq!(eval_in_fresh_scope(&expr).unwrap(), EvalResult::Num { value: 1, width: None });
    }

    #[test]
    fn parameter_reference_resolves() {
        let mut scope = SymbolTable::new();
        scope
            .declare("N".into(), Binding::Parameter(crate::model::value::PropertyValue::Int(4)))
            .unwrap();
        let expr = builder::ident("N");
        let result = Evaluator::new(&scope, scope.current_scope_id()).eval(&expr).unwrap();
        assert_eq!(result, EvalResult::Num { value: 4, width: None });
    }

    #[test]
    fn unresolved_keyword_is_deferred() {
        let expr = builder::ident("rw");
        let result = eval_in_fresh_scope(&expr).unwrap();
        assert_eq!(result, EvalResult::Keyword("rw".to_string()));
    }

    #[test]
    fn concat_combines_widths() {
        let expr = builder::concat(vec![builder::sized_int_lit("4'hF"), builder::sized_int_lit("4'h0")]);
        assert_eq!(eval_in_fresh_scope(&expr).unwrap(), EvalResult::Num { value: 0xF0, width: Some(8) });
    }

    #[test]
    fn replicate_repeats_pattern() {
        let expr = builder::replicate(builder::int_lit(3), builder::sized_int_lit("2'b01"));
        assert_eq!(eval_in_fresh_scope(&expr).unwrap(), EvalResult::Num { value: 0b01_01_01, width: Some(6) });
    }
}

//! Programmatic construction of [`AstNode`] trees.
//!
//! Scenario and unit tests build trees through these helpers instead of
//! round-tripping through SystemRDL source text, since the lexer/parser
//! is a separate collaborator out of scope for this crate (spec §1, §6) —
//! the same way the teacher's own HIR/semantic tests construct syntax
//! trees directly rather than re-parsing source in every test.

use crate::ast::kind::RuleKind;
use crate::ast::node::AstNode;
use crate::core::Span;

fn syn() -> Span {
    Span::synthetic()
}

// ---- Expressions ----

pub fn int_lit(value: i64) -> AstNode {
    AstNode::rule(RuleKind::ExprLiteralInt, value.to_string(), syn(), vec![])
}

/// A width-annotated literal, e.g. `8'd42`, stored verbatim so the
/// evaluator can parse the width prefix itself (spec §4.2).
pub fn sized_int_lit(text: &str) -> AstNode {
    AstNode::rule(RuleKind::ExprLiteralInt, text, syn(), vec![])
}

pub fn bool_lit(value: bool) -> AstNode {
    AstNode::rule(RuleKind::ExprLiteralBool, value.to_string(), syn(), vec![])
}

pub fn str_lit(value: &str) -> AstNode {
    AstNode::rule(RuleKind::ExprLiteralStr, value, syn(), vec![])
}

pub fn ident(name: &str) -> AstNode {
    AstNode::rule(RuleKind::ExprIdent, name, syn(), vec![])
}

pub fn enum_ref(type_name: &str, variant: &str) -> AstNode {
    AstNode::rule(RuleKind::ExprEnumRef, format!("{type_name}::{variant}"), syn(), vec![])
}

pub fn unary(op: &str, operand: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ExprUnaryOp, op, syn(), vec![operand])
}

pub fn binary(op: &str, lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ExprBinaryOp, op, syn(), vec![lhs, rhs])
}

pub fn ternary(cond: AstNode, if_true: AstNode, if_false: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ExprTernary, "", syn(), vec![cond, if_true, if_false])
}

pub fn concat(parts: Vec<AstNode>) -> AstNode {
    AstNode::rule(RuleKind::ExprConcat, "", syn(), parts)
}

pub fn replicate(count: AstNode, part: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ExprReplicate, "", syn(), vec![count, part])
}

// ---- Property assignments ----

pub fn local_assign(prop: &str, value: AstNode) -> AstNode {
    AstNode::rule(RuleKind::LocalPropertyAssignment, prop, syn(), vec![value])
}

pub fn default_assign(prop: &str, value: AstNode) -> AstNode {
    AstNode::rule(RuleKind::DefaultPropertyAssignment, prop, syn(), vec![value])
}

pub fn dynamic_assign(path: &[&str], prop: &str, value: AstNode) -> AstNode {
    let segments: Vec<AstNode> =
        path.iter().map(|s| AstNode::terminal(*s, syn())).collect();
    let path_node = AstNode::rule(RuleKind::InstancePath, "", syn(), segments);
    AstNode::rule(RuleKind::DynamicPropertyAssignment, prop, syn(), vec![path_node, value])
}

// ---- Bit ranges ----

pub fn range_msb_lsb(msb: u32, lsb: u32) -> AstNode {
    AstNode::rule(RuleKind::RangeSuffix, "explicit", syn(), vec![int_lit(msb as i64), int_lit(lsb as i64)])
}

pub fn range_width(width: u32) -> AstNode {
    AstNode::rule(RuleKind::RangeSuffix, "width", syn(), vec![int_lit(width as i64)])
}

// ---- Parameters ----

pub fn param_def(name: &str, default: Option<AstNode>) -> AstNode {
    let mut children = vec![AstNode::terminal(name, syn())];
    children.extend(default);
    AstNode::rule(RuleKind::ParameterDef, name, syn(), children)
}

pub fn param_list(params: Vec<AstNode>) -> AstNode {
    AstNode::rule(RuleKind::ParameterList, "", syn(), params)
}

pub fn actual_param(name: Option<&str>, value: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ActualParameter, name.unwrap_or(""), syn(), vec![value])
}

pub fn actual_param_list(params: Vec<AstNode>) -> AstNode {
    AstNode::rule(RuleKind::ActualParameterList, "", syn(), params)
}

// ---- Bodies and type definitions ----

pub fn body(items: Vec<AstNode>) -> AstNode {
    AstNode::rule(RuleKind::Body, "", syn(), items)
}

pub fn named_def(kind_keyword: &str, name: Option<&str>, params: Option<AstNode>, body: AstNode) -> AstNode {
    let mut children = Vec::new();
    if let Some(name) = name {
        children.push(AstNode::terminal(name, syn()));
    }
    children.extend(params);
    children.push(body);
    AstNode::rule(RuleKind::ComponentNamedDef, kind_keyword, syn(), children)
}

// ---- Instances ----

pub struct InstSuffix {
    pub actuals: Option<AstNode>,
    pub dims: Vec<AstNode>,
    pub addr_fixed: Option<AstNode>,
    pub stride: Option<AstNode>,
    pub align: Option<AstNode>,
    pub range: Option<AstNode>,
}

impl Default for InstSuffix {
    fn default() -> Self {
        Self { actuals: None, dims: Vec::new(), addr_fixed: None, stride: None, align: None, range: None }
    }
}

pub fn array_dim(size: AstNode) -> AstNode {
    AstNode::rule(RuleKind::ArrayDim, "", syn(), vec![size])
}

pub fn addr_fixed(expr: AstNode) -> AstNode {
    AstNode::rule(RuleKind::InstAddrFixed, "", syn(), vec![expr])
}

pub fn addr_stride(expr: AstNode) -> AstNode {
    AstNode::rule(RuleKind::InstAddrStride, "", syn(), vec![expr])
}

pub fn addr_align(expr: AstNode) -> AstNode {
    AstNode::rule(RuleKind::InstAddrAlign, "", syn(), vec![expr])
}

/// `<type_name> <inst_name> ...;` — references an already-registered type.
pub fn inst(type_name: &str, inst_name: &str, suffix: InstSuffix) -> AstNode {
    let mut children = vec![AstNode::terminal(inst_name, syn())];
    children.extend(suffix.actuals);
    children.extend(suffix.dims);
    children.extend(suffix.addr_fixed);
    children.extend(suffix.stride);
    children.extend(suffix.align);
    children.extend(suffix.range);
    AstNode::rule(RuleKind::ComponentInst, type_name, syn(), children)
}

/// `<kind> { <body> } <inst_name> ...;` — anonymous type instantiated in place.
pub fn explicit_inst(kind_keyword: &str, body: AstNode, inst_name: &str, suffix: InstSuffix) -> AstNode {
    let mut children = vec![body, AstNode::terminal(inst_name, syn())];
    children.extend(suffix.dims);
    children.extend(suffix.addr_fixed);
    children.extend(suffix.stride);
    children.extend(suffix.align);
    children.extend(suffix.range);
    AstNode::rule(RuleKind::ExplicitComponentInst, kind_keyword, syn(), children)
}

pub fn compilation_unit(items: Vec<AstNode>) -> AstNode {
    AstNode::rule(RuleKind::CompilationUnit, "", syn(), items)
}

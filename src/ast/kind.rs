//! The closed set of parse-tree rule labels the elaboration core
//! understands (spec §6: "every node carries a rule label from the
//! closed set defined by the grammar").
//!
//! This is deliberately a flat, closed enum rather than an open string —
//! the teacher's own `SyntaxKind` (`src/parser/syntax_kind.rs`) makes the
//! same call for the same reason: a closed sum type lets every match in
//! the instantiator be exhaustive instead of falling through to a
//! catch-all `Unsupported` on a typo.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Top-level container of one compilation unit's body items.
    CompilationUnit,

    /// `component_named_def`: `<kind> <name> #(<params>) { <body> }`
    ComponentNamedDef,
    /// Formal parameter list of a `component_named_def`.
    ParameterList,
    /// One formal parameter: name, optional declared type text, optional default expr.
    ParameterDef,
    /// Body of a component type or an explicit instance: ordered body items.
    Body,

    /// `component_inst`: `<type_name> <inst_name> #(<actuals>) [<dims>] @<off> += <stride> %= <align>;`
    ComponentInst,
    /// `explicit_component_inst`: anonymous-type instance, `<kind> { <body> } <inst_name> ...;`
    ExplicitComponentInst,
    /// Actual parameter list passed at an instantiation site.
    ActualParameterList,
    /// One actual parameter: optional name (for by-name binding) + value expr.
    ActualParameter,
    /// One array dimension's size expression.
    ArrayDim,
    /// `@ <expr>` fixed address offset.
    InstAddrFixed,
    /// `+= <expr>` array stride.
    InstAddrStride,
    /// `%= <expr>` alignment.
    InstAddrAlign,

    /// `p = expr;`
    LocalPropertyAssignment,
    /// `a.b.p = expr;`
    DynamicPropertyAssignment,
    /// `default p = expr;`
    DefaultPropertyAssignment,
    /// Dotted path used by a dynamic property assignment's left-hand side.
    InstancePath,

    /// `name[msb:lsb]` or `name[width]` — a field's bit-range suffix.
    RangeSuffix,

    // ---- Expressions ----
    ExprLiteralInt,
    ExprLiteralBool,
    ExprLiteralStr,
    /// Bare identifier reference (parameter, `this`, `parent`, or an enum/const name).
    ExprIdent,
    ExprEnumRef,
    ExprUnaryOp,
    ExprBinaryOp,
    ExprTernary,
    ExprConcat,
    ExprReplicate,
}

impl RuleKind {
    /// The wire name used by the AST JSON interchange format (spec §6),
    /// e.g. `component_named_def`, `component_inst`, `range_suffix`.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::CompilationUnit => "compilation_unit",
            Self::ComponentNamedDef => "component_named_def",
            Self::ParameterList => "parameter_list",
            Self::ParameterDef => "parameter_def",
            Self::Body => "body",
            Self::ComponentInst => "component_inst",
            Self::ExplicitComponentInst => "explicit_component_inst",
            Self::ActualParameterList => "actual_parameter_list",
            Self::ActualParameter => "actual_parameter",
            Self::ArrayDim => "array_dim",
            Self::InstAddrFixed => "inst_addr_fixed",
            Self::InstAddrStride => "inst_addr_stride",
            Self::InstAddrAlign => "inst_addr_align",
            Self::LocalPropertyAssignment => "local_property_assignment",
            Self::DynamicPropertyAssignment => "dynamic_property_assignment",
            Self::DefaultPropertyAssignment => "default_property_assignment",
            Self::InstancePath => "instance_path",
            Self::RangeSuffix => "range_suffix",
            Self::ExprLiteralInt => "expr_literal_int",
            Self::ExprLiteralBool => "expr_literal_bool",
            Self::ExprLiteralStr => "expr_literal_str",
            Self::ExprIdent => "expr_ident",
            Self::ExprEnumRef => "expr_enum_ref",
            Self::ExprUnaryOp => "expr_unary_op",
            Self::ExprBinaryOp => "expr_binary_op",
            Self::ExprTernary => "expr_ternary",
            Self::ExprConcat => "expr_concat",
            Self::ExprReplicate => "expr_replicate",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "compilation_unit" => Self::CompilationUnit,
            "component_named_def" => Self::ComponentNamedDef,
            "parameter_list" => Self::ParameterList,
            "parameter_def" => Self::ParameterDef,
            "body" => Self::Body,
            "component_inst" => Self::ComponentInst,
            "explicit_component_inst" => Self::ExplicitComponentInst,
            "actual_parameter_list" => Self::ActualParameterList,
            "actual_parameter" => Self::ActualParameter,
            "array_dim" => Self::ArrayDim,
            "inst_addr_fixed" => Self::InstAddrFixed,
            "inst_addr_stride" => Self::InstAddrStride,
            "inst_addr_align" => Self::InstAddrAlign,
            "local_property_assignment" => Self::LocalPropertyAssignment,
            "dynamic_property_assignment" => Self::DynamicPropertyAssignment,
            "default_property_assignment" => Self::DefaultPropertyAssignment,
            "instance_path" => Self::InstancePath,
            "range_suffix" => Self::RangeSuffix,
            "expr_literal_int" => Self::ExprLiteralInt,
            "expr_literal_bool" => Self::ExprLiteralBool,
            "expr_literal_str" => Self::ExprLiteralStr,
            "expr_ident" => Self::ExprIdent,
            "expr_enum_ref" => Self::ExprEnumRef,
            "expr_unary_op" => Self::ExprUnaryOp,
            "expr_binary_op" => Self::ExprBinaryOp,
            "expr_ternary" => Self::ExprTernary,
            "expr_concat" => Self::ExprConcat,
            "expr_replicate" => Self::ExprReplicate,
            _ => return None,
        })
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

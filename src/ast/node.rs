//! The parse-tree node type the elaboration core consumes (spec §6).
//!
//! Two variants, matching the AST JSON schema exactly: a `Rule` node
//! carries a closed-set label, its own text (used for the handful of
//! rules where the label alone doesn't carry enough information — an
//! operator symbol, a component kind keyword, a referenced type name —
//! see the per-field doc comments on [`RuleKind`]) and an ordered list of
//! children; a `Terminal` is a leaf token.

use crate::ast::kind::RuleKind;
use crate::core::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Rule {
        kind: RuleKind,
        text: String,
        span: Span,
        children: Vec<AstNode>,
    },
    Terminal {
        text: String,
        span: Span,
    },
}

impl AstNode {
    pub fn rule(kind: RuleKind, text: impl Into<String>, span: Span, children: Vec<AstNode>) -> Self {
        Self::Rule { kind, text: text.into(), span, children }
    }

    pub fn terminal(text: impl Into<String>, span: Span) -> Self {
        Self::Terminal { text: text.into(), span }
    }

    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            Self::Rule { kind, .. } => Some(*kind),
            Self::Terminal { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Rule { text, .. } => text,
            Self::Terminal { text, .. } => text,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::Rule { span, .. } => span,
            Self::Terminal { span, .. } => span,
        }
    }

    pub fn children(&self) -> &[AstNode] {
        match self {
            Self::Rule { children, .. } => children,
            Self::Terminal { .. } => &[],
        }
    }

    pub fn is_rule(&self, kind: RuleKind) -> bool {
        self.kind() == Some(kind)
    }

    /// All direct children with the given rule kind, in source order.
    pub fn children_of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &AstNode> {
        self.children().iter().filter(move |c| c.is_rule(kind))
    }

    pub fn first_child_of_kind(&self, kind: RuleKind) -> Option<&AstNode> {
        self.children_of_kind(kind).next()
    }

    /// First direct child that is a bare `Terminal` (used to fetch an
    /// instance/parameter name sitting alongside structured children).
    pub fn first_terminal(&self) -> Option<&str> {
        self.children().iter().find_map(|c| match c {
            Self::Terminal { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// The single child expression of a node that wraps exactly one
    /// expression (e.g. a property assignment's value, an array dim's
    /// size). Expression nodes are distinguished from structural/
    /// terminal children by rule kind.
    pub fn expr_child(&self) -> Option<&AstNode> {
        self.children().iter().find(|c| {
            matches!(
                c.kind(),
                Some(
                    RuleKind::ExprLiteralInt
                        | RuleKind::ExprLiteralBool
                        | RuleKind::ExprLiteralStr
                        | RuleKind::ExprIdent
                        | RuleKind::ExprEnumRef
                        | RuleKind::ExprUnaryOp
                        | RuleKind::ExprBinaryOp
                        | RuleKind::ExprTernary
                        | RuleKind::ExprConcat
                        | RuleKind::ExprReplicate
                )
            )
        })
    }
}

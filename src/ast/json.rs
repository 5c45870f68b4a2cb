//! AST JSON (de)serialization (spec §6 "AST JSON (secondary interface)").
//!
//! This is the wire format a grammar/parser collaborator would emit and
//! that `rdl-elaborate` reads as its input. We parse through
//! `serde_json::Value` rather than deriving `Deserialize` directly on
//! [`AstNode`], because the two node shapes are discriminated by a
//! `"type"` tag ("rule" vs "terminal") with disjoint field sets that
//! don't map cleanly onto a single derive.

use std::rc::Rc;

use serde_json::Value;

use crate::ast::kind::RuleKind;
use crate::ast::node::AstNode;
use crate::core::{ElabError, Span};

const FORMAT_TAG: &str = "SystemRDL_AST";

/// Parse a full AST JSON document (the `{"format": ..., "ast": [...]}`
/// envelope) into the forest of top-level items it names.
pub fn parse_document(json_text: &str, file: Option<Rc<str>>) -> Result<Vec<AstNode>, ElabError> {
    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| ElabError::Unsupported(format!("invalid AST JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ElabError::Unsupported("AST JSON root is not an object".into()))?;
    if let Some(fmt) = obj.get("format").and_then(Value::as_str) {
        if fmt != FORMAT_TAG {
            return Err(ElabError::Unsupported(format!("unexpected AST JSON format '{fmt}'")));
        }
    }
    let ast = obj
        .get("ast")
        .and_then(Value::as_array)
        .ok_or_else(|| ElabError::Unsupported("AST JSON missing 'ast' array".into()))?;
    ast.iter().map(|v| parse_node(v, &file)).collect()
}

fn parse_node(value: &Value, file: &Option<Rc<str>>) -> Result<AstNode, ElabError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ElabError::Unsupported("AST JSON node is not an object".into()))?;
    let node_type = obj.get("type").and_then(Value::as_str).unwrap_or("");
    match node_type {
        "terminal" => {
            let text = obj.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            let line = obj.get("line").and_then(Value::as_u64).unwrap_or(0) as u32;
            let column = obj.get("column").and_then(Value::as_u64).unwrap_or(0) as u32;
            Ok(AstNode::terminal(text, Span::new(file.clone(), line, column)))
        }
        "rule" => {
            let rule_name = obj
                .get("rule_name")
                .and_then(Value::as_str)
                .ok_or_else(|| ElabError::Unsupported("rule node missing rule_name".into()))?;
            let kind = RuleKind::from_wire_name(rule_name)
                .ok_or_else(|| ElabError::Unsupported(format!("unknown rule_name '{rule_name}'")))?;
            let text = obj.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            let line = obj.get("start_line").and_then(Value::as_u64).unwrap_or(0) as u32;
            let column = obj.get("start_column").and_then(Value::as_u64).unwrap_or(0) as u32;
            let children = obj
                .get("children")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(|c| parse_node(c, file)).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(AstNode::rule(kind, text, Span::new(file.clone(), line, column), children))
        }
        other => Err(ElabError::Unsupported(format!("unknown AST JSON node type '{other}'"))),
    }
}

/// Serialize a forest of top-level items back to the AST JSON envelope.
/// Used by round-trip tests (spec §8 P5 is stated for the elaborated
/// model; this mirrors the same discipline for the AST form).
pub fn to_document(items: &[AstNode]) -> Value {
    serde_json::json!({
        "format": FORMAT_TAG,
        "version": "1.0",
        "ast": items.iter().map(to_value).collect::<Vec<_>>(),
    })
}

fn to_value(node: &AstNode) -> Value {
    match node {
        AstNode::Terminal { text, span } => serde_json::json!({
            "type": "terminal",
            "text": text,
            "line": span.line,
            "column": span.column,
        }),
        AstNode::Rule { kind, text, span, children } => serde_json::json!({
            "type": "rule",
            "rule_name": kind.wire_name(),
            "text": text,
            "start_line": span.line,
            "start_column": span.column,
            "stop_line": span.line,
            "stop_column": span.column,
            "children": children.iter().map(to_value).collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder;

    #[test]
    fn round_trips_through_json() {
        let original = vec![builder::compilation_unit(vec![builder::named_def(
            "addrmap",
            Some("top"),
            None,
            builder::body(vec![]),
        )])];
        let doc = to_document(&original);
        let text = serde_json::to_string(&doc).unwrap();
        let parsed = parse_document(&text, None).unwrap();
        assert_eq!(parsed[0].kind(), Some(RuleKind::CompilationUnit));
        assert_eq!(
            parsed[0].children()[0].kind(),
            Some(RuleKind::ComponentNamedDef)
        );
    }
}

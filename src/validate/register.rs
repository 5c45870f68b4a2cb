//! Per-register validation and reserved-field gap synthesis (spec §4.5
//! "Per register").

use indexmap::IndexMap;

use crate::core::{Diagnostic, ElabError, Ident, Span};
use crate::model::{ComponentKind, ElaboratedNode, FieldBits, PropertyValue};

fn reserved_field(lsb: u32, msb: u32) -> ElaboratedNode {
    let mut node = ElaboratedNode::new(
        ComponentKind::Field,
        Ident::new(&format!("RESERVED_{msb}_{lsb}")),
        None,
    );
    node.field_bits = Some(FieldBits { lsb, msb, width: msb - lsb + 1 });
    node.properties = IndexMap::new();
    node.properties.insert(
        "sw".to_string(),
        PropertyValue::Enum { type_name: Ident::new("sw"), name: Ident::new("r"), value: 1 },
    );
    node.properties.insert(
        "hw".to_string(),
        PropertyValue::Enum { type_name: Ident::new("hw"), name: Ident::new("na"), value: 3 },
    );
    node.properties.insert("desc".to_string(), PropertyValue::Str("reserved".to_string()));
    node
}

/// Sort a register's fields by `lsb`, check overlap and range, fill
/// uncovered bit ranges with synthesized reserved fields, and fix up the
/// register's own `size` (spec §4.5 steps 1-5, invariants P1/P7).
pub fn finalize_register(
    node: &mut ElaboratedNode,
    regwidth: u32,
    span: &Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    node.children.sort_by_key(|f| f.field_bits.map(|b| b.lsb).unwrap_or(0));

    for pair in node.children.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if let (Some(pb), Some(nb)) = (prev.field_bits, next.field_bits) {
            if pb.msb >= nb.lsb {
                diagnostics.push(Diagnostic::error(
                    ElabError::FieldOverlap {
                        first: prev.instance_name.to_string(),
                        second: next.instance_name.to_string(),
                    },
                    Some(span.clone()),
                ));
            }
        }
    }

    for field in &node.children {
        if let Some(bits) = field.field_bits {
            if bits.msb >= regwidth {
                diagnostics.push(Diagnostic::error(
                    ElabError::FieldOutOfRange(field.instance_name.to_string()),
                    Some(span.clone()),
                ));
            }
        }
    }

    let mut gaps = Vec::new();
    let mut next_free: u32 = 0;
    for field in &node.children {
        let Some(bits) = field.field_bits else { continue };
        if bits.lsb > next_free {
            gaps.push((next_free, bits.lsb - 1));
        }
        next_free = next_free.max(bits.msb + 1);
    }
    if regwidth > 0 && next_free < regwidth {
        gaps.push((next_free, regwidth - 1));
    }

    for (a, b) in gaps {
        node.children.push(reserved_field(a, b));
    }
    node.children.sort_by_key(|f| f.field_bits.map(|b| b.lsb).unwrap_or(0));

    node.size = u64::from(regwidth).div_ceil(8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Span;

    fn field(name: &str, lsb: u32, msb: u32) -> ElaboratedNode {
        let mut node = ElaboratedNode::new(ComponentKind::Field, Ident::new(name), None);
        node.field_bits = Some(FieldBits { lsb, msb, width: msb - lsb + 1 });
        node
    }

    #[test]
    fn fills_single_gap() {
        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        reg.children.push(field("data", 0, 7));
        let mut diags = Vec::new();
        finalize_register(&mut reg, 32, &Span::synthetic(), &mut diags);
        assert!(diags.is_empty());
        assert_eq!(reg.children.len(), 2);
        assert_eq!(reg.children[1].instance_name.as_str(), "RESERVED_31_8");
        assert_eq!(reg.size, 4);
    }

    #[test]
    fn zero_fields_synthesizes_single_reserved_span() {
        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        let mut diags = Vec::new();
        finalize_register(&mut reg, 32, &Span::synthetic(), &mut diags);
        assert_eq!(reg.children.len(), 1);
        assert_eq!(reg.children[0].instance_name.as_str(), "RESERVED_31_0");
    }

    #[test]
    fn full_coverage_synthesizes_nothing() {
        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        reg.children.push(field("data", 0, 31));
        let mut diags = Vec::new();
        finalize_register(&mut reg, 32, &Span::synthetic(), &mut diags);
        assert_eq!(reg.children.len(), 1);
    }

    #[test]
    fn overlap_reported() {
        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        reg.children.push(field("a", 0, 7));
        reg.children.push(field("b", 0, 3));
        let mut diags = Vec::new();
        finalize_register(&mut reg, 32, &Span::synthetic(), &mut diags);
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::FieldOverlap { .. })));
    }

    #[test]
    fn bit_gap_scenario_b() {
        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        reg.children.push(field("ctrl", 0, 0));
        reg.children.push(field("status", 4, 7));
        reg.children.push(field("data", 16, 23));
        reg.children.push(field("enable", 31, 31));
        let mut diags = Vec::new();
        finalize_register(&mut reg, 32, &Span::synthetic(), &mut diags);
        assert!(diags.is_empty());
        let reserved: Vec<&str> = reg
            .children
            .iter()
            .filter(|f| f.instance_name.starts_with("RESERVED_"))
            .map(|f| f.instance_name.as_str())
            .collect();
        assert_eq!(reserved, vec!["RESERVED_3_1", "RESERVED_15_8", "RESERVED_30_24"]);
    }
}

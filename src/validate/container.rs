//! Per-container address-overlap validation (spec §4.5 "Per container").

use crate::core::{Diagnostic, ElabError, Span};
use crate::model::ElaboratedNode;

/// Check that a container's children occupy non-overlapping byte ranges.
/// Does not reorder `children` — the check is against a sorted view, the
/// output tree keeps source order (spec §3 "children: ordered list").
pub fn check_no_overlap(children: &[ElaboratedNode], span: &Span, diagnostics: &mut Vec<Diagnostic>) {
    let mut order: Vec<&ElaboratedNode> = children.iter().collect();
    order.sort_by_key(|c| c.absolute_address);
    for pair in order.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.footprint_end() > next.absolute_address {
            diagnostics.push(Diagnostic::error(
                ElabError::AddressOverlap {
                    first: prev.instance_name.to_string(),
                    second: next.instance_name.to_string(),
                },
                Some(span.clone()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ident;
    use crate::model::ComponentKind;

    fn reg_at(name: &str, addr: u64, size: u64) -> ElaboratedNode {
        let mut node = ElaboratedNode::new(ComponentKind::Reg, Ident::new(name), None);
        node.absolute_address = addr;
        node.size = size;
        node
    }

    #[test]
    fn non_overlapping_children_pass() {
        let children = vec![reg_at("a", 0x0, 4), reg_at("b", 0x4, 4)];
        let mut diags = Vec::new();
        check_no_overlap(&children, &Span::synthetic(), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn overlapping_children_fail() {
        let children = vec![reg_at("regA", 0x0, 4), reg_at("regB", 0x2, 4)];
        let mut diags = Vec::new();
        check_no_overlap(&children, &Span::synthetic(), &mut diags);
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::AddressOverlap { .. })));
    }

    #[test]
    fn array_footprint_extends_past_last_element() {
        let mut array_reg = reg_at("r", 0x100, 4);
        array_reg.array_dimensions = vec![crate::model::ArrayDim { size: 3, stride: 4 }];
        let children = vec![array_reg, reg_at("next", 0x104, 4)];
        let mut diags = Vec::new();
        check_no_overlap(&children, &Span::synthetic(), &mut diags);
        assert!(diags.iter().any(|d| matches!(d.error, ElabError::AddressOverlap { .. })));
    }
}

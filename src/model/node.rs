//! The elaborated model (spec §3 "Elaborated node").

use indexmap::IndexMap;

use crate::core::Ident;
use crate::model::value::PropertyValue;

/// The closed set of component kinds (spec §3 "Component kinds").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    AddrMap,
    RegFile,
    Reg,
    Field,
    Mem,
}

impl ComponentKind {
    /// Legal child kinds per spec §3.
    pub fn legal_children(self) -> &'static [ComponentKind] {
        use ComponentKind::*;
        match self {
            AddrMap => &[AddrMap, RegFile, Reg, Mem],
            RegFile => &[RegFile, Reg],
            Reg => &[Field],
            Mem => &[Reg],
            Field => &[],
        }
    }

    pub fn allows_child(self, child: ComponentKind) -> bool {
        self.legal_children().contains(&child)
    }

    /// Whether this kind's children advance a byte cursor (addrmap,
    /// regfile, mem) as opposed to occupying bit positions (reg's fields).
    pub fn is_byte_addressed_container(self) -> bool {
        matches!(self, ComponentKind::AddrMap | ComponentKind::RegFile | ComponentKind::Mem)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddrMap => "addrmap",
            Self::RegFile => "regfile",
            Self::Reg => "reg",
            Self::Field => "field",
            Self::Mem => "mem",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "addrmap" => Some(Self::AddrMap),
            "regfile" => Some(Self::RegFile),
            "reg" => Some(Self::Reg),
            "field" => Some(Self::Field),
            "mem" => Some(Self::Mem),
            _ => None,
        }
    }
}

/// One dimension of an array instance: its size and the byte stride
/// between consecutive elements (spec §4.4 step 4–5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDim {
    pub size: u64,
    pub stride: u64,
}

/// A field's derived bit-range attributes (spec §3 "Elaborated node").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldBits {
    pub lsb: u32,
    pub msb: u32,
    pub width: u32,
}

/// The elaboration output: a fully concrete instance tree.
///
/// Ownership is exclusive (spec §3 "Lifecycles"): a node's `children`
/// vector is the sole owner of its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct ElaboratedNode {
    pub kind: ComponentKind,
    pub instance_name: Ident,
    pub type_name: Option<Ident>,
    pub absolute_address: u64,
    pub size: u64,
    pub array_dimensions: Vec<ArrayDim>,
    /// `Some` only for `Field` nodes (spec §3 "Fields additionally carry...").
    pub field_bits: Option<FieldBits>,
    pub properties: IndexMap<String, PropertyValue>,
    pub children: Vec<ElaboratedNode>,
}

impl ElaboratedNode {
    pub fn new(kind: ComponentKind, instance_name: Ident, type_name: Option<Ident>) -> Self {
        Self {
            kind,
            instance_name,
            type_name,
            absolute_address: 0,
            size: 0,
            array_dimensions: Vec::new(),
            field_bits: None,
            properties: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Exclusive end of this node's own byte range: `[absolute_address, end)`.
    /// For an array instance this is just the first element's end; use
    /// [`Self::footprint_end`] for the range the whole array occupies.
    pub fn end_address(&self) -> u64 {
        self.absolute_address + self.size
    }

    /// Exclusive end of the byte range this instance occupies including
    /// every array element through the last (spec §4.4 step 7, "the last
    /// child's end"). Equal to `end_address()` for non-array instances.
    pub fn footprint_end(&self) -> u64 {
        match self.array_dimensions.first() {
            Some(dim) => self.absolute_address + dim.stride.saturating_mul(dim.size.saturating_sub(1)) + self.size,
            None => self.end_address(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Look up a child by instance name (used by dynamic property
    /// assignment resolution, spec §4.1).
    pub fn child_named(&self, name: &str) -> Option<&ElaboratedNode> {
        self.children.iter().find(|c| c.instance_name.as_str() == name)
    }

    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut ElaboratedNode> {
        self.children.iter_mut().find(|c| c.instance_name.as_str() == name)
    }

    /// Resolve a [`NodePath`](crate::model::value::NodePath) against this node treated as the root.
    pub fn resolve_path(&self, path: &crate::model::value::NodePath) -> Option<&ElaboratedNode> {
        let mut node = self;
        for &idx in &path.0 {
            node = node.children.get(idx)?;
        }
        Some(node)
    }
}

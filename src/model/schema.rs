//! The SystemRDL built-in property schema (spec §4.1, §5).
//!
//! "The only shared resource is the process-wide SystemRDL built-in
//! property schema, which is read-only after construction" (spec §5). We
//! honor that literally: [`PropertySchema`] has no global/static storage,
//! it is built fresh in [`PropertySchema::new`] and handed to the
//! elaborator at construction time, same as the teacher builds its
//! built-in keyword/property tables once per parser instance rather than
//! behind a `lazy_static`.

use rustc_hash::FxHashMap;

use crate::core::Ident;
use crate::model::node::ComponentKind;
use crate::model::value::PropertyValue;

/// The declared type of a property, used for invariant 6 ("every property
/// present on a node, its value's kind matches the property's declared
/// type").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Int,
    Bool,
    Str,
    /// An enumerated property whose legal values are the named variants.
    Enum(&'static str, &'static [&'static str]),
    Ref,
}

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: &'static str,
    pub ty: PropertyType,
    pub default: Option<PropertyValue>,
    /// Kinds this property may be assigned on; empty means "any kind".
    pub applies_to: &'static [ComponentKind],
}

/// The full table of built-in properties, keyed by name.
pub struct PropertySchema {
    props: FxHashMap<&'static str, PropertyDef>,
}

const SW_VALUES: &[&str] = &["rw", "r", "w", "rw1", "w1", "na"];
const HW_VALUES: &[&str] = &["rw", "r", "w", "na"];
const ONREAD_VALUES: &[&str] = &["rclr", "rset", "ruser"];
const ONWRITE_VALUES: &[&str] =
    &["woclr", "woset", "wot", "wzc", "wzs", "wzt", "wclr", "wset", "wuser"];
const ADDRESSING_VALUES: &[&str] = &["compact", "regalign", "fullalign"];

impl PropertySchema {
    pub fn new() -> Self {
        use ComponentKind::*;
        let defs: Vec<PropertyDef> = vec![
            PropertyDef {
                name: "sw",
                ty: PropertyType::Enum("sw", SW_VALUES),
                default: Some(enum_value("sw", "rw")),
                applies_to: &[Field, Reg, RegFile, Mem],
            },
            PropertyDef {
                name: "hw",
                ty: PropertyType::Enum("hw", HW_VALUES),
                default: Some(enum_value("hw", "rw")),
                applies_to: &[Field],
            },
            PropertyDef {
                name: "onread",
                ty: PropertyType::Enum("onread", ONREAD_VALUES),
                default: None,
                applies_to: &[Field],
            },
            PropertyDef {
                name: "onwrite",
                ty: PropertyType::Enum("onwrite", ONWRITE_VALUES),
                default: None,
                applies_to: &[Field],
            },
            PropertyDef {
                name: "woclr",
                ty: PropertyType::Bool,
                default: Some(PropertyValue::Bool(false)),
                applies_to: &[Field],
            },
            PropertyDef {
                name: "woset",
                ty: PropertyType::Bool,
                default: Some(PropertyValue::Bool(false)),
                applies_to: &[Field],
            },
            PropertyDef {
                name: "wclr",
                ty: PropertyType::Bool,
                default: Some(PropertyValue::Bool(false)),
                applies_to: &[Field],
            },
            PropertyDef {
                name: "reset",
                ty: PropertyType::Int,
                default: Some(PropertyValue::Int(0)),
                applies_to: &[Field],
            },
            PropertyDef {
                name: "desc",
                ty: PropertyType::Str,
                default: None,
                applies_to: &[],
            },
            PropertyDef {
                name: "name",
                ty: PropertyType::Str,
                default: None,
                applies_to: &[],
            },
            PropertyDef {
                name: "regwidth",
                ty: PropertyType::Int,
                default: Some(PropertyValue::Int(32)),
                applies_to: &[Reg],
            },
            PropertyDef {
                name: "accesswidth",
                ty: PropertyType::Int,
                default: None,
                applies_to: &[Reg],
            },
            PropertyDef {
                name: "memwidth",
                ty: PropertyType::Int,
                default: Some(PropertyValue::Int(32)),
                applies_to: &[Mem],
            },
            PropertyDef {
                name: "mementries",
                ty: PropertyType::Int,
                default: None,
                applies_to: &[Mem],
            },
            PropertyDef {
                name: "fieldwidth",
                ty: PropertyType::Int,
                default: None,
                applies_to: &[Field],
            },
            PropertyDef {
                name: "addressing",
                ty: PropertyType::Enum("addressing", ADDRESSING_VALUES),
                default: Some(enum_value("addressing", "regalign")),
                applies_to: &[AddrMap],
            },
        ];
        let props = defs.into_iter().map(|d| (d.name, d)).collect();
        Self { props }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDef> {
        self.props.get(name)
    }

    /// The built-in enum types this schema defines (`sw`, `hw`,
    /// `onread`, `onwrite`, `addressing`), for pre-declaring them in the
    /// root scope so `Type::variant` expressions can resolve them (spec
    /// §4.1: "pre-defined enums (sw/hw access values, onread/onwrite
    /// behaviors)").
    pub fn enum_types(&self) -> Vec<(&'static str, &'static [&'static str])> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.props
            .values()
            .filter_map(|def| match def.ty {
                PropertyType::Enum(name, variants) => Some((name, variants)),
                _ => None,
            })
            .filter(|(name, _)| seen.insert(*name))
            .collect()
    }

    /// The SystemRDL built-in default for `p`, if any (spec §4.4 "Property
    /// inheritance"'s final fallback).
    pub fn builtin_default(&self, name: &str) -> Option<PropertyValue> {
        self.props.get(name).and_then(|d| d.default.clone())
    }

    /// Check a value's dynamic kind against the declared schema type,
    /// allowing the 0/1-to-boolean coercion spec §4.2 calls out.
    pub fn type_check(
        &self,
        prop_name: &str,
        kind: ComponentKind,
        value: &PropertyValue,
    ) -> Result<(), (String, String)> {
        let Some(def) = self.props.get(prop_name) else {
            // User-defined properties are untyped as far as this schema
            // is concerned; anything goes.
            return Ok(());
        };
        if !def.applies_to.is_empty() && !def.applies_to.contains(&kind) {
            return Err((
                format!("property valid on {:?}", def.applies_to),
                format!("{} component", kind.as_str()),
            ));
        }
        let ok = match (&def.ty, value) {
            (PropertyType::Int, PropertyValue::Int(_)) => true,
            (PropertyType::Int, PropertyValue::Bool(_)) => true,
            (PropertyType::Bool, PropertyValue::Bool(_)) => true,
            (PropertyType::Bool, PropertyValue::Int(0 | 1)) => true,
            (PropertyType::Str, PropertyValue::Str(_)) => true,
            (PropertyType::Enum(expected_ty, variants), PropertyValue::Enum { type_name, name, .. }) => {
                type_name.as_str() == *expected_ty && variants.contains(&name.as_str())
            }
            (PropertyType::Ref, PropertyValue::Ref(_)) => true,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err((format!("{:?}", def.ty), value.kind_name().to_string()))
        }
    }
}

fn enum_value(type_name: &str, name: &str) -> PropertyValue {
    let value = match (type_name, name) {
        ("sw", v) | ("hw", v) => SW_VALUES.iter().position(|x| *x == v).unwrap_or(0) as i64,
        ("addressing", v) => ADDRESSING_VALUES.iter().position(|x| *x == v).unwrap_or(0) as i64,
        _ => 0,
    };
    PropertyValue::Enum {
        type_name: Ident::new(type_name),
        name: Ident::new(name),
        value,
    }
}

impl Default for PropertySchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use rstest::rstest;

    // The built-in schema is immutable once constructed, so every test in
    // this module can safely share one instance.
    static SCHEMA: Lazy<PropertySchema> = Lazy::new(PropertySchema::new);

    #[test]
    fn sw_default_is_rw() {
        let def = SCHEMA.get("sw").unwrap();
        match &def.default {
            Some(PropertyValue::Enum { name, .. }) => assert_eq!(name.as_str(), "rw"),
            _ => panic!("expected enum default"),
        }
    }

    #[test]
    fn hw_does_not_apply_to_reg() {
        assert!(SCHEMA.type_check("hw", ComponentKind::Reg, &PropertyValue::Int(0)).is_err());
    }

    #[test]
    fn enum_types_covers_every_enum_property_once() {
        let types = SCHEMA.enum_types();
        assert!(types.iter().any(|(name, _)| *name == "sw"));
        assert!(types.iter().any(|(name, _)| *name == "addressing"));
        assert_eq!(types.iter().filter(|(name, _)| *name == "sw").count(), 1);
    }

    #[test]
    fn bool_accepts_zero_one_coercion() {
        assert!(SCHEMA.type_check("woclr", ComponentKind::Field, &PropertyValue::Int(1)).is_ok());
    }

    #[rstest]
    #[case("sw", ComponentKind::Field, PropertyValue::Bool(true))]
    #[case("reset", ComponentKind::Field, PropertyValue::Str("not a number".to_string()))]
    #[case("desc", ComponentKind::Reg, PropertyValue::Int(5))]
    #[case("addressing", ComponentKind::AddrMap, PropertyValue::Str("compact".to_string()))]
    fn type_check_rejects_mismatched_value(
        #[case] prop_name: &str,
        #[case] kind: ComponentKind,
        #[case] value: PropertyValue,
    ) {
        assert!(SCHEMA.type_check(prop_name, kind, &value).is_err());
    }

    #[rstest]
    #[case("regwidth", ComponentKind::Reg, PropertyValue::Int(32))]
    #[case("desc", ComponentKind::Field, PropertyValue::Str("a field".to_string()))]
    #[case("woclr", ComponentKind::Field, PropertyValue::Bool(false))]
    fn type_check_accepts_matching_value(
        #[case] prop_name: &str,
        #[case] kind: ComponentKind,
        #[case] value: PropertyValue,
    ) {
        assert!(SCHEMA.type_check(prop_name, kind, &value).is_ok());
    }
}

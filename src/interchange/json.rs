//! Elaborated-model JSON (spec §6 "Output: elaborated model and its JSON
//! form"), the interchange format template/report-generation collaborators
//! consume downstream of this core.

use serde_json::{Map, Value};

use crate::model::{ComponentKind, ElaboratedNode, PropertyValue};

const FORMAT_TAG: &str = "SystemRDL_ElaboratedModel";

/// Serialize a root elaborated node to the `{"format": ..., "model": [...]}`
/// envelope.
pub fn to_document(root: &ElaboratedNode) -> Value {
    serde_json::json!({
        "format": FORMAT_TAG,
        "version": "1.0",
        "model": [to_value(root)],
    })
}

fn to_value(node: &ElaboratedNode) -> Value {
    let mut obj = Map::new();
    obj.insert("node_type".to_string(), Value::String(node.kind.as_str().to_string()));
    obj.insert("inst_name".to_string(), Value::String(node.instance_name.to_string()));
    obj.insert("absolute_address".to_string(), Value::String(format!("0x{:x}", node.absolute_address)));
    obj.insert("size".to_string(), Value::Number(node.size.into()));

    if !node.array_dimensions.is_empty() {
        obj.insert(
            "array_dimensions".to_string(),
            Value::Array(
                node.array_dimensions
                    .iter()
                    .map(|dim| serde_json::json!({ "size": dim.size }))
                    .collect(),
            ),
        );
    }

    if node.kind == ComponentKind::Field {
        if let Some(bits) = node.field_bits {
            obj.insert("lsb".to_string(), Value::Number(bits.lsb.into()));
            obj.insert("msb".to_string(), Value::Number(bits.msb.into()));
            obj.insert("width".to_string(), Value::Number(bits.width.into()));
        }
    }

    if !node.properties.is_empty() {
        let mut props = Map::new();
        for (name, value) in &node.properties {
            props.insert(name.clone(), property_to_value(value));
        }
        obj.insert("properties".to_string(), Value::Object(props));
    }

    if !node.children.is_empty() {
        obj.insert("children".to_string(), Value::Array(node.children.iter().map(to_value).collect()));
    }

    Value::Object(obj)
}

fn property_to_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Int(v) => Value::Number((*v).into()),
        PropertyValue::Bool(v) => Value::Bool(*v),
        PropertyValue::Str(v) => Value::String(v.clone()),
        // Enum properties serialize as their variant name, not the
        // backing integer (spec §9 Open Questions: "Enum properties
        // serialize as ... the variant name").
        PropertyValue::Enum { name, .. } => Value::String(name.to_string()),
        PropertyValue::Ref(path) => Value::String(path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ident;
    use crate::model::{ArrayDim, FieldBits};

    #[test]
    fn serializes_minimal_node() {
        let node = ElaboratedNode::new(ComponentKind::AddrMap, Ident::new("top"), None);
        let doc = to_document(&node);
        assert_eq!(doc["format"], "SystemRDL_ElaboratedModel");
        assert_eq!(doc["model"][0]["node_type"], "addrmap");
        assert_eq!(doc["model"][0]["absolute_address"], "0x0");
        assert!(doc["model"][0].get("properties").is_none());
        assert!(doc["model"][0].get("children").is_none());
    }

    #[test]
    fn serializes_field_bits_and_array_dims() {
        let mut field = ElaboratedNode::new(ComponentKind::Field, Ident::new("f"), None);
        field.field_bits = Some(FieldBits { lsb: 0, msb: 7, width: 8 });
        field.properties.insert("sw".to_string(), PropertyValue::Str("rw".to_string()));

        let mut reg = ElaboratedNode::new(ComponentKind::Reg, Ident::new("r"), None);
        reg.absolute_address = 0x100;
        reg.size = 4;
        reg.array_dimensions = vec![ArrayDim { size: 3, stride: 4 }];
        reg.children.push(field);

        let value = to_value(&reg);
        assert_eq!(value["absolute_address"], "0x100");
        assert_eq!(value["array_dimensions"][0]["size"], 3);
        assert_eq!(value["children"][0]["lsb"], 0);
        assert_eq!(value["children"][0]["properties"]["sw"], "rw");
    }
}

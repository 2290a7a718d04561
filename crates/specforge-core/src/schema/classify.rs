//! Schema classification

use serde_json::Value as JsonValue;

use super::node::{Combinator, SchemaExt, SchemaNode};
use super::types::{PrimitiveType, SchemaFormat, TypeInfo};

/// Classify a schema into its canonical [`TypeInfo`].
///
/// Total and side-effect free: any node, including ones that never went
/// through validation, maps to exactly one classification. Precedence is
/// `$ref`, then `oneOf`/`anyOf`/`allOf`, then `enum`, then the declared type.
pub fn classify(schema: &SchemaNode) -> TypeInfo {
    classify_node(schema.as_json())
}

fn classify_node(node: &JsonValue) -> TypeInfo {
    if let Some(reference) = node.reference() {
        return TypeInfo::Reference {
            name: reference_name(reference).to_string(),
        };
    }

    for combinator in Combinator::ALL {
        let members = node.combinator(combinator);
        if !members.is_empty() {
            let members = members.iter().map(classify_node).collect();
            return match combinator {
                Combinator::OneOf => TypeInfo::OneOf { members },
                Combinator::AnyOf => TypeInfo::AnyOf { members },
                Combinator::AllOf => TypeInfo::AllOf { members },
            };
        }
    }

    let primitive = node.schema_type().and_then(PrimitiveType::from_type_name);
    let values = node.enum_values();
    if !values.is_empty() {
        return TypeInfo::Enum {
            primitive: primitive.unwrap_or(PrimitiveType::String),
            values: values.to_vec(),
        };
    }

    match node.schema_type() {
        Some("object") => classify_object(node),
        None if node.has_properties() || node.additional_properties().is_some() => {
            classify_object(node)
        }
        Some("array") => TypeInfo::Array {
            items: Box::new(node.items().map(classify_node).unwrap_or(TypeInfo::Any)),
        },
        _ => match primitive {
            Some(primitive) => TypeInfo::Primitive {
                primitive,
                format: node.format().and_then(SchemaFormat::from_name),
            },
            None => TypeInfo::Any,
        },
    }
}

fn classify_object(node: &JsonValue) -> TypeInfo {
    let properties = node
        .properties()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    let additional_properties = match node.additional_properties() {
        Some(JsonValue::Bool(allowed)) => *allowed,
        Some(JsonValue::Object(_)) => true,
        _ => false,
    };
    TypeInfo::Object {
        properties,
        additional_properties,
    }
}

/// Last segment of a reference, e.g. `Pet` for `#/components/schemas/Pet`
fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

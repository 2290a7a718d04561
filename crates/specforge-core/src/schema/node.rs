//! Schema nodes and read accessors over raw schema trees

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::EnclosingSchema;

/// Composition keywords that combine several schemas into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `oneOf`
    OneOf,
    /// `anyOf`
    AnyOf,
    /// `allOf`
    AllOf,
}

impl Combinator {
    /// All combinators, in classification precedence order
    pub const ALL: [Combinator; 3] = [Combinator::OneOf, Combinator::AnyOf, Combinator::AllOf];

    /// The keyword as written in a schema
    pub fn keyword(self) -> &'static str {
        match self {
            Combinator::OneOf => "oneOf",
            Combinator::AnyOf => "anyOf",
            Combinator::AllOf => "allOf",
        }
    }
}

/// A single schema definition, kept as the raw document node it was parsed from.
///
/// Keeping the raw node means no keyword is lost to a lossy typed model; use
/// [`SchemaNode::to_oas`] when a typed `openapiv3` view is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaNode(JsonValue);

impl SchemaNode {
    /// Wrap a document node
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// Get a reference to the raw node
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    /// Get the underlying raw node
    pub fn into_json(self) -> JsonValue {
        self.0
    }

    /// Typed view of this node.
    ///
    /// Fails when the node cannot be read as a schema or a reference.
    pub fn to_oas(&self) -> crate::Result<openapiv3::ReferenceOr<openapiv3::Schema>> {
        Ok(serde_json::from_value(self.0.clone())?)
    }

    /// Refer to this node as an inline enclosing schema
    pub fn to_enclosing_schema(self) -> EnclosingSchema {
        EnclosingSchema::InlineModel(self)
    }
}

impl From<JsonValue> for SchemaNode {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// Keyword accessors shared by [`SchemaNode`] and raw nested nodes.
pub trait SchemaExt {
    /// The node being inspected
    fn node(&self) -> &JsonValue;

    /// Declared `type`. For a type list the first non-`null` entry is used.
    fn schema_type(&self) -> Option<&str> {
        match self.node().get("type")? {
            JsonValue::String(typ) => Some(typ.as_str()),
            JsonValue::Array(types) => types
                .iter()
                .filter_map(JsonValue::as_str)
                .find(|typ| *typ != "null"),
            _ => None,
        }
    }

    /// The `properties` map, if it is a map
    fn properties(&self) -> Option<&Map<String, JsonValue>> {
        self.node().get("properties").and_then(JsonValue::as_object)
    }

    /// Whether a non-empty `properties` map is declared
    fn has_properties(&self) -> bool {
        self.properties().is_some_and(|props| !props.is_empty())
    }

    /// The `items` sub-schema
    fn items(&self) -> Option<&JsonValue> {
        self.node().get("items")
    }

    /// The `additionalProperties` value
    fn additional_properties(&self) -> Option<&JsonValue> {
        self.node().get("additionalProperties")
    }

    /// Members of a combinator, empty when absent
    fn combinator(&self, combinator: Combinator) -> &[JsonValue] {
        self.node()
            .get(combinator.keyword())
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether any combinator has members
    fn has_combinator(&self) -> bool {
        Combinator::ALL
            .iter()
            .any(|c| !self.combinator(*c).is_empty())
    }

    /// Allowed `enum` values, empty when absent
    fn enum_values(&self) -> &[JsonValue] {
        self.node()
            .get("enum")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Declared `format`
    fn format(&self) -> Option<&str> {
        self.node().get("format").and_then(JsonValue::as_str)
    }

    /// Target of a `$ref`
    fn reference(&self) -> Option<&str> {
        self.node().get("$ref").and_then(JsonValue::as_str)
    }
}

impl SchemaExt for JsonValue {
    fn node(&self) -> &JsonValue {
        self
    }
}

impl SchemaExt for SchemaNode {
    fn node(&self) -> &JsonValue {
        &self.0
    }
}

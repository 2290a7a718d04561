//! Schema type classifications consumed by code generation

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Primitive OpenAPI type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// String type
    String,
    /// Number type (float/double)
    Number,
    /// Integer type
    Integer,
    /// Boolean type
    Boolean,
}

impl PrimitiveType {
    /// Map an OpenAPI `type` name onto a primitive, if it is one
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Common schema formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Base64 encoded bytes
    Byte,
    /// Raw binary
    Binary,
    /// Password hint
    Password,
    /// Date format (e.g., 2025-05-29)
    Date,
    /// Date-time format (e.g., 2025-05-29T20:07:42-04:00)
    DateTime,
    /// Time format (e.g., 20:07:42)
    Time,
    /// Duration format (e.g., P1DT2H)
    Duration,
    /// Email format
    Email,
    /// Hostname format
    Hostname,
    /// IPv4 format
    Ipv4,
    /// IPv6 format
    Ipv6,
    /// URI format
    Uri,
    /// URI reference format
    #[serde(rename = "uri-reference", alias = "uri-ref")]
    UriRef,
    /// UUID format
    Uuid,
}

impl SchemaFormat {
    /// Parse a `format` value; unknown formats give `None`
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(JsonValue::String(name.to_string())).ok()
    }
}

/// Canonical classification of a schema node.
///
/// Every schema maps to exactly one variant. Nested schemas (array items,
/// combinator members) are classified recursively.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeInfo {
    /// An object with named properties
    Object {
        /// Declared property names, in declaration order
        properties: Vec<String>,
        /// Whether extra keys are allowed via `additionalProperties`
        #[serde(rename = "additionalProperties")]
        additional_properties: bool,
    },
    /// A list of items
    Array {
        /// Classification of the item schema
        items: Box<TypeInfo>,
    },
    /// A scalar, optionally refined by a format
    Primitive {
        /// Base scalar type
        primitive: PrimitiveType,
        /// Recognised `format`, if any
        format: Option<SchemaFormat>,
    },
    /// A closed set of literal values
    Enum {
        /// Scalar type of the values
        primitive: PrimitiveType,
        /// Allowed values, in declaration order
        values: Vec<JsonValue>,
    },
    /// Exactly one of the members
    OneOf {
        /// Member classifications
        members: Vec<TypeInfo>,
    },
    /// Any of the members
    AnyOf {
        /// Member classifications
        members: Vec<TypeInfo>,
    },
    /// All of the members
    AllOf {
        /// Member classifications
        members: Vec<TypeInfo>,
    },
    /// A reference to a named schema
    Reference {
        /// Name of the referenced schema
        name: String,
    },
    /// No constraint on the shape
    Any,
}

impl TypeInfo {
    /// Whether this is an object classification
    pub fn is_object(&self) -> bool {
        matches!(self, TypeInfo::Object { .. })
    }

    /// Whether this is a `oneOf`, `anyOf` or `allOf` classification
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            TypeInfo::OneOf { .. } | TypeInfo::AnyOf { .. } | TypeInfo::AllOf { .. }
        )
    }
}

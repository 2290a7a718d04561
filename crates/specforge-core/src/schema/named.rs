//! Named schemas of a specification

use serde::Serialize;

use super::{classify, SchemaNode, TypeInfo};

/// A schema registered under a unique name in `components.schemas`.
///
/// The classification is computed once, when the value is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSchema {
    name: String,
    type_info: TypeInfo,
    schema: SchemaNode,
}

impl NamedSchema {
    /// Create a named schema, classifying it
    pub fn new(name: impl Into<String>, schema: SchemaNode) -> Self {
        let type_info = classify(&schema);
        Self {
            name: name.into(),
            type_info,
            schema,
        }
    }

    /// Name of the schema
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema node
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Cached classification
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }
}

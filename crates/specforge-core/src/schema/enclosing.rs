//! Enclosing schema references.
//!
//! Consumers that need "the schema this one is nested in" get it either as a
//! name in the specification's schema table or as an inline node that has no
//! name. [`EnclosingSchema::resolve`] hides the difference.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::{NamedSchema, SchemaNode};
use crate::Error;

/// Lookup of named schemas
pub trait SchemaRegistry {
    /// Find a schema by name
    fn lookup(&self, name: &str) -> Option<&NamedSchema>;
}

impl<S: BuildHasher> SchemaRegistry for HashMap<String, NamedSchema, S> {
    fn lookup(&self, name: &str) -> Option<&NamedSchema> {
        self.get(name)
    }
}

impl SchemaRegistry for BTreeMap<String, NamedSchema> {
    fn lookup(&self, name: &str) -> Option<&NamedSchema> {
        self.get(name)
    }
}

impl SchemaRegistry for [NamedSchema] {
    fn lookup(&self, name: &str) -> Option<&NamedSchema> {
        self.iter().find(|schema| schema.name() == name)
    }
}

impl SchemaRegistry for Vec<NamedSchema> {
    fn lookup(&self, name: &str) -> Option<&NamedSchema> {
        self.as_slice().lookup(name)
    }
}

/// The schema a nested schema belongs to, given by name or inline
#[derive(Debug, Clone, PartialEq)]
pub enum EnclosingSchema {
    /// A named schema, looked up on demand
    Name(String),
    /// An already available schema node
    InlineModel(SchemaNode),
}

impl EnclosingSchema {
    /// Get the schema node this reference stands for.
    ///
    /// `Name` is looked up in `registry` and fails with
    /// [`Error::SchemaNotFound`] when absent; `InlineModel` is returned as is.
    pub fn resolve<'a, R>(&'a self, registry: &'a R) -> crate::Result<&'a SchemaNode>
    where
        R: SchemaRegistry + ?Sized,
    {
        match self {
            EnclosingSchema::Name(name) => registry
                .lookup(name)
                .map(NamedSchema::schema)
                .ok_or_else(|| Error::SchemaNotFound(name.clone())),
            EnclosingSchema::InlineModel(schema) => Ok(schema),
        }
    }

    /// Schema name, for the `Name` variant
    pub fn name(&self) -> Option<&str> {
        match self {
            EnclosingSchema::Name(name) => Some(name),
            EnclosingSchema::InlineModel(_) => None,
        }
    }
}

impl From<SchemaNode> for EnclosingSchema {
    fn from(schema: SchemaNode) -> Self {
        EnclosingSchema::InlineModel(schema)
    }
}

impl From<String> for EnclosingSchema {
    fn from(name: String) -> Self {
        EnclosingSchema::Name(name)
    }
}

impl From<&str> for EnclosingSchema {
    fn from(name: &str) -> Self {
        EnclosingSchema::Name(name.to_string())
    }
}

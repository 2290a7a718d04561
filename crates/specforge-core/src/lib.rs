//! specforge Core Library
//!
//! This library merges an OpenAPI base document with overlay fragments, parses
//! the result, and checks that every schema has a shape code generators can
//! rely on before handing out classified schemas.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod parser;
pub mod schema;
pub mod source;
pub mod validation;

pub use crate::{
    config::Config,
    error::{Error, Result},
    model::SpecModel,
    parser::{ParseOptions, SpecParser},
    schema::{EnclosingSchema, NamedSchema, SchemaNode, SchemaRegistry, TypeInfo},
    source::SourceApi,
    validation::{validate, ValidationError, ValidationReport},
};

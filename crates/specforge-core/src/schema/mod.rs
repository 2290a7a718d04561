//! Schema nodes, classification and enclosing references

mod classify;
mod enclosing;
mod named;
mod node;
mod types;

pub use classify::classify;
pub use enclosing::{EnclosingSchema, SchemaRegistry};
pub use named::NamedSchema;
pub use node::{Combinator, SchemaExt, SchemaNode};
pub use types::{PrimitiveType, SchemaFormat, TypeInfo};

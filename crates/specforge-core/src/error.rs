//! Error handling for the specforge library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use specforge_core::error::{Error, Result};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(Error::SchemaNotFound(name.to_string()))
//! }
//!
//! assert_eq!(lookup("Pet").unwrap_err().to_string(), "Schema 'Pet' not found");
//! ```

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for specforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for specforge operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// The merged text could not be turned into a specification model
    #[error("Failed to parse the API specification: {0}")]
    Parse(String),

    /// One or more schemas broke a structural rule
    #[error("Invalid models or api file:\n{}", join_messages(.0))]
    InvalidSpec(Vec<ValidationError>),

    /// A schema name could not be resolved against a registry
    #[error("Schema '{0}' not found")]
    SchemaNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\t{}", e.message()))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Configuration for specforge runs.
//!
//! This module defines the `Config` struct naming the base specification, the
//! overlay fragments applied on top of it, and parser settings. The
//! configuration can be created programmatically or loaded from a YAML, JSON
//! or TOML file.
//!
//! # Examples
//!
//! ```no_run
//! use specforge_core::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> specforge_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("openapi.yaml");
//! config.fragments.push("overlays/pagination.yaml".into());
//!
//! // Or load from a config file
//! let config = Config::from_file("specforge.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::parser::ParseOptions;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for merging and validating a specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the base OpenAPI document
    pub base_spec: PathBuf,

    /// Fragments merged over the base, in order
    #[serde(default)]
    pub fragments: Vec<PathBuf>,

    /// Directory relative file references are resolved from.
    /// Defaults to the directory of `base_spec`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Whether references into other files are inlined
    #[serde(default = "default_resolve_external_refs")]
    pub resolve_external_refs: bool,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(base_spec: impl Into<PathBuf>) -> Self {
        Self {
            base_spec: base_spec.into(),
            fragments: Vec::new(),
            base_dir: None,
            resolve_external_refs: default_resolve_external_refs(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            crate::Error::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config = match ConfigFormat::of(path) {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::of(path) {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Directory used to resolve relative file references
    pub fn resolved_base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| {
            self.base_spec
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }

    /// Parser options derived from this configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            resolve_external_refs: self.resolve_external_refs,
            ..ParseOptions::default()
        }
    }
}

fn default_resolve_external_refs() -> bool {
    true
}

enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

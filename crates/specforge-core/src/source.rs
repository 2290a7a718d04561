//! The merged, validated and classified API source.
//!
//! [`SourceApi`] is where everything comes together: fragments are merged over
//! the base document, the result is parsed, every schema is validated, and only
//! then are the named schemas classified and exposed. A `SourceApi` that
//! exists is one that passed validation.
//!
//! # Examples
//!
//! ```
//! use specforge_core::{SourceApi, SpecParser, TypeInfo};
//!
//! let base = r#"
//! openapi: 3.0.0
//! info: {title: Pets, version: "1"}
//! paths: {}
//! components:
//!   schemas:
//!     Pet:
//!       type: object
//!       properties:
//!         name: {type: string}
//! "#;
//! let fragment = "components: {schemas: {Pet: {properties: {age: {type: integer}}}}}";
//!
//! let api = SourceApi::create(base, [fragment], ".", &SpecParser::default())?;
//! let pet = api.schema("Pet").unwrap();
//! assert!(matches!(pet.type_info(), TypeInfo::Object { properties, .. } if properties.len() == 2));
//! # Ok::<(), specforge_core::Error>(())
//! ```

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::merge::merge_documents;
use crate::model::SpecModel;
use crate::parser::SpecParser;
use crate::schema::{NamedSchema, SchemaRegistry};
use crate::validation::validate;
use crate::Error;

// External imports (alphabetized)
use tokio::fs;

/// A specification built from a base document and its fragments
#[derive(Debug, Clone)]
pub struct SourceApi {
    raw_spec: String,
    base_dir: PathBuf,
    model: SpecModel,
    schemas: Vec<NamedSchema>,
}

impl SourceApi {
    /// Merge `fragments` over `base` in order, then build the source.
    pub fn create<I, S>(
        base: &str,
        fragments: I,
        base_dir: impl Into<PathBuf>,
        parser: &SpecParser,
    ) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let combined = merge_documents(base, fragments)?;
        Self::new(combined, base_dir, parser)
    }

    /// Like [`SourceApi::create`], resolving file references from the current directory
    pub fn create_in_current_dir<I, S>(
        base: &str,
        fragments: I,
        parser: &SpecParser,
    ) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base_dir = std::env::current_dir()?;
        Self::create(base, fragments, base_dir, parser)
    }

    /// Read the files named by `config` and build the source from them
    pub async fn from_config(config: &Config, parser: &SpecParser) -> crate::Result<Self> {
        let base = read_spec_file(&config.base_spec).await?;
        let mut fragments = Vec::with_capacity(config.fragments.len());
        for fragment in &config.fragments {
            fragments.push(read_spec_file(fragment).await?);
        }
        Self::create(&base, &fragments, config.resolved_base_dir(), parser)
    }

    /// Parse, validate and classify already merged specification text.
    ///
    /// Fails with [`Error::InvalidSpec`] carrying every violation when any
    /// schema breaks a structural rule.
    pub fn new(
        raw_spec: impl Into<String>,
        base_dir: impl Into<PathBuf>,
        parser: &SpecParser,
    ) -> crate::Result<Self> {
        let raw_spec = raw_spec.into();
        let base_dir = base_dir.into();

        let model = parser.parse(&raw_spec, &base_dir)?;
        let errors = validate(&model);
        if !errors.is_empty() {
            return Err(Error::InvalidSpec(errors));
        }

        let schemas: Vec<NamedSchema> = model
            .schemas()
            .map(|(name, schema)| NamedSchema::new(name, schema.clone()))
            .collect();
        log::debug!(
            "Loaded '{}' {} with {} schemas",
            model.title(),
            model.version(),
            schemas.len()
        );

        Ok(Self {
            raw_spec,
            base_dir,
            model,
            schemas,
        })
    }

    /// The merged specification text
    pub fn raw_spec(&self) -> &str {
        &self.raw_spec
    }

    /// Directory relative file references were resolved from
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The parsed model
    pub fn model(&self) -> &SpecModel {
        &self.model
    }

    /// Every named schema, classified, in declaration order
    pub fn all_schemas(&self) -> &[NamedSchema] {
        &self.schemas
    }

    /// Look up a named schema
    pub fn schema(&self, name: &str) -> Option<&NamedSchema> {
        self.schemas.lookup(name)
    }
}

impl SchemaRegistry for SourceApi {
    fn lookup(&self, name: &str) -> Option<&NamedSchema> {
        self.schema(name)
    }
}

async fn read_spec_file(path: &Path) -> crate::Result<String> {
    fs::read_to_string(path).await.map_err(|e| {
        Error::config(format!(
            "Failed to read specification {}: {}",
            path.display(),
            e
        ))
    })
}

//! Specification parsing.
//!
//! [`SpecParser`] turns merged specification text into a [`SpecModel`]. It is a
//! plain value owned by the caller; nothing about it is global.
//!
//! # Examples
//!
//! ```
//! use specforge_core::parser::SpecParser;
//! use std::path::Path;
//!
//! let text = "openapi: 3.0.0\ninfo:\n  title: Demo\n  version: '1'\npaths: {}\n";
//! let model = SpecParser::default().parse(text, Path::new(".")).unwrap();
//! assert_eq!(model.title(), "Demo");
//! ```

// Internal imports (std, crate)
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::merge::decode_document;
use crate::model::SpecModel;
use crate::Error;

// External imports (alphabetized)
use serde_json::{json, Map, Value as JsonValue};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Options controlling how references are handled while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Inline `$ref`s that point into other files
    pub resolve_external_refs: bool,
    /// Maximum nesting of external references before giving up
    pub max_ref_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            resolve_external_refs: true,
            max_ref_depth: 32,
        }
    }
}

/// Parser for merged specification text
#[derive(Debug, Clone, Default)]
pub struct SpecParser {
    options: ParseOptions,
}

impl SpecParser {
    /// Create a parser with the given options
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Options this parser was built with
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse specification text into a model.
    ///
    /// Relative file references are read from `base_dir`. Internal `#/...`
    /// references are kept as they are. A schema that refers back to itself
    /// through external files is registered under `components.schemas` and
    /// referenced from there. Every failure is reported as [`Error::Parse`].
    pub fn parse(&self, text: &str, base_dir: &Path) -> crate::Result<SpecModel> {
        let mut document = decode_document(text).map_err(|e| {
            Error::parse(format!(
                "cannot decode document: {}. Check that the merged text is valid YAML or JSON",
                e
            ))
        })?;

        if self.options.resolve_external_refs {
            RefResolver::new(&self.options, base_dir, &document).inline_document(&mut document)?;
        }

        SpecModel::from_document(document)
    }
}

/// A file and a JSON pointer into it
type RefTarget = (PathBuf, String);

/// State for inlining the external references of one document.
///
/// Files are read and decoded once per parse. Targets currently being
/// expanded are kept on a stack so a recursive schema is referenced by name
/// instead of being expanded forever.
struct RefResolver<'a> {
    options: &'a ParseOptions,
    base_dir: &'a Path,
    documents: HashMap<PathBuf, JsonValue>,
    /// Targets being expanded, and whether each one is itself just a `$ref`
    in_progress: Vec<(RefTarget, bool)>,
    names: HashMap<RefTarget, String>,
    taken: HashSet<String>,
    hoisted: Vec<(String, RefTarget)>,
}

impl<'a> RefResolver<'a> {
    fn new(options: &'a ParseOptions, base_dir: &'a Path, document: &JsonValue) -> Self {
        let mut names = HashMap::new();
        let mut taken = HashSet::new();
        let schemas = document
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(JsonValue::as_object);
        for (name, schema) in schemas.into_iter().flatten() {
            taken.insert(name.clone());
            let target = schema
                .get("$ref")
                .and_then(JsonValue::as_str)
                .filter(|reference| !is_remote(reference))
                .and_then(|reference| locate(reference, base_dir, None));
            if let Some((file, pointer)) = target {
                names
                    .entry((canonical(&file), pointer))
                    .or_insert_with(|| name.clone());
            }
        }

        Self {
            options,
            base_dir,
            documents: HashMap::new(),
            in_progress: Vec::new(),
            names,
            taken,
            hoisted: Vec::new(),
        }
    }

    fn inline_document(mut self, document: &mut JsonValue) -> crate::Result<()> {
        let base_dir = self.base_dir;
        self.inline(document, base_dir, None)?;

        let mut next = 0;
        while next < self.hoisted.len() {
            let (name, target) = self.hoisted[next].clone();
            next += 1;
            let reference = format!("{}#{}", target.0.display(), target.1);
            let schema = self.resolve(&reference, target)?;
            log::debug!("Registered recursive schema '{}' from {}", name, reference);
            schema_table(document)?.insert(name, schema);
        }
        Ok(())
    }

    /// Replace external `$ref` objects with the nodes they point to.
    ///
    /// `source` is the file the current node was read from, if any; internal
    /// references inside such a node point into that file, not the document.
    fn inline(
        &mut self,
        node: &mut JsonValue,
        base_dir: &Path,
        source: Option<&Path>,
    ) -> crate::Result<()> {
        if let Some(reference) = node.get("$ref").and_then(JsonValue::as_str) {
            if let Some(target) = locate(reference, base_dir, source) {
                let reference = reference.to_string();
                *node = self.resolve(&reference, target)?;
                return Ok(());
            }
        }

        match node {
            JsonValue::Object(fields) => {
                for value in fields.values_mut() {
                    self.inline(value, base_dir, source)?;
                }
            }
            JsonValue::Array(items) => {
                for item in items.iter_mut() {
                    self.inline(item, base_dir, source)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        reference: &str,
        (file, pointer): RefTarget,
    ) -> crate::Result<JsonValue> {
        if is_remote(reference) {
            return Err(reference_error(format!(
                "remote reference '{}' cannot be resolved without network access",
                reference
            )));
        }
        let target = (canonical(&file), pointer);

        if let Some(position) = self.in_progress.iter().position(|(t, _)| *t == target) {
            if self.in_progress[position..].iter().all(|(_, alias)| *alias) {
                return Err(reference_error(format!(
                    "reference '{}' only points to other references, a reference cycle",
                    reference
                )));
            }
            let name = self.name_for(&target);
            log::debug!("Reference '{}' is recursive, using schema '{}'", reference, name);
            return Ok(json!({ "$ref": format!("{}{}", SCHEMA_REF_PREFIX, name) }));
        }
        if self.in_progress.len() >= self.options.max_ref_depth {
            return Err(reference_error(format!(
                "reference '{}' is nested more than {} levels deep",
                reference, self.options.max_ref_depth
            )));
        }

        let mut node = self.load(reference, &target)?;
        let alias = node.get("$ref").is_some();
        let file_dir = target.0.parent().map(Path::to_path_buf).unwrap_or_default();
        let source = target.0.clone();

        self.in_progress.push((target, alias));
        let inlined = self.inline(&mut node, &file_dir, Some(source.as_path()));
        self.in_progress.pop();
        inlined?;
        Ok(node)
    }

    fn load(
        &mut self,
        reference: &str,
        (file, pointer): &RefTarget,
    ) -> crate::Result<JsonValue> {
        let document = match self.documents.entry(file.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::debug!("Reading external reference '{}' from {}", reference, file.display());
                let text = std::fs::read_to_string(file).map_err(|e| {
                    reference_error(format!(
                        "cannot read external reference '{}' at {}: {}",
                        reference,
                        file.display(),
                        e
                    ))
                })?;
                let document = decode_document(&text).map_err(|e| {
                    reference_error(format!(
                        "cannot decode external reference '{}': {}",
                        reference, e
                    ))
                })?;
                entry.insert(document)
            }
        };

        if pointer.is_empty() {
            return Ok(document.clone());
        }
        document.pointer(pointer).cloned().ok_or_else(|| {
            reference_error(format!(
                "external reference '{}' points to a missing node",
                reference
            ))
        })
    }

    /// Name a recursive target is registered under, hoisting it if needed
    fn name_for(&mut self, target: &RefTarget) -> String {
        if let Some(name) = self.names.get(target) {
            return name.clone();
        }

        let (file, pointer) = target;
        let stem = match pointer.rsplit('/').next().filter(|s| !s.is_empty()) {
            Some(segment) => segment.replace("~1", "/").replace("~0", "~"),
            None => file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Schema".to_string()),
        };
        let mut name = stem.clone();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{}{}", stem, suffix);
            suffix += 1;
        }

        self.taken.insert(name.clone());
        self.names.insert(target.clone(), name.clone());
        self.hoisted.push((name.clone(), target.clone()));
        name
    }
}

/// Where a `$ref` points, or `None` for references into the document itself
fn locate(reference: &str, base_dir: &Path, source: Option<&Path>) -> Option<RefTarget> {
    match (reference.split_once('#'), source) {
        (Some(("", _)), None) => None,
        (Some(("", pointer)), Some(file)) => Some((file.to_path_buf(), pointer.to_string())),
        (Some((file, pointer)), _) => Some((base_dir.join(file), pointer.to_string())),
        (None, _) => Some((base_dir.join(reference), String::new())),
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn schema_table(document: &mut JsonValue) -> crate::Result<&mut Map<String, JsonValue>> {
    let not_a_mapping = || Error::parse("'components.schemas' is not a mapping");
    let root = document
        .as_object_mut()
        .ok_or_else(|| Error::parse("document root is not a mapping"))?;
    let components = root
        .entry("components")
        .or_insert_with(|| JsonValue::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(not_a_mapping)?;
    let schemas = components
        .entry("schemas")
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if schemas.is_null() {
        *schemas = JsonValue::Object(Map::new());
    }
    schemas.as_object_mut().ok_or_else(not_a_mapping)
}

/// A parse error for a reference that could not be followed
fn reference_error(reason: String) -> Error {
    Error::parse(format!(
        "{}. This is commonly due to an external schema reference that is unresolvable, \
         possibly due to a lack of internet connection",
        reason
    ))
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "openapi: 3.0.0\ninfo:\n  title: Test API\n  version: 1.0.0\npaths: {}\n";

    #[test]
    fn test_parse_minimal_spec() -> crate::Result<()> {
        let model = SpecParser::default().parse(HEADER, Path::new("."))?;
        assert_eq!(model.title(), "Test API");
        assert_eq!(model.schemas().count(), 0);
        Ok(())
    }

    #[test]
    fn test_remote_reference_suggests_network_problem() {
        let text = format!(
            "{}components:\n  schemas:\n    Pet:\n      $ref: 'https://example.com/pet.yaml#/Pet'\n",
            HEADER
        );
        let err = SpecParser::default()
            .parse(&text, Path::new("."))
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/pet.yaml#/Pet"));
        assert!(msg.contains("external schema reference"));
        assert!(msg.contains("internet connection"));
    }

    #[test]
    fn test_relative_file_reference_is_inlined() -> crate::Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("models.yaml"),
            "Pet:\n  type: object\n  properties:\n    owner:\n      $ref: '#/Owner'\nOwner:\n  type: string\n",
        )?;
        let text = format!(
            "{}components:\n  schemas:\n    Pet:\n      $ref: 'models.yaml#/Pet'\n",
            HEADER
        );

        let model = SpecParser::default().parse(&text, dir.path())?;
        let pet = model.schema("Pet").expect("Pet schema");
        assert_eq!(pet.as_json()["type"], "object");
        assert_eq!(pet.as_json()["properties"]["owner"]["type"], "string");
        Ok(())
    }

    #[test]
    fn test_missing_file_reference_is_parse_error() -> crate::Result<()> {
        let dir = tempdir()?;
        let text = format!(
            "{}components:\n  schemas:\n    Pet:\n      $ref: 'missing.yaml#/Pet'\n",
            HEADER
        );
        let err = SpecParser::default().parse(&text, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("missing.yaml#/Pet"));
        Ok(())
    }

    #[test]
    fn test_reference_cycle_is_bounded() -> crate::Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("a.yaml"), "$ref: 'b.yaml'\n")?;
        std::fs::write(dir.path().join("b.yaml"), "$ref: 'a.yaml'\n")?;
        let text = format!(
            "{}components:\n  schemas:\n    Loop:\n      $ref: 'a.yaml'\n",
            HEADER
        );
        let err = SpecParser::default().parse(&text, dir.path()).unwrap_err();
        assert!(err.to_string().contains("reference cycle"));
        Ok(())
    }

    #[test]
    fn test_self_recursive_external_schema_is_referenced_by_name() -> crate::Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("models.yaml"),
            "Node:\n  type: object\n  properties:\n    value:\n      type: string\n    child:\n      $ref: '#/Node'\n",
        )?;
        let text = format!(
            "{}components:\n  schemas:\n    Node:\n      $ref: 'models.yaml#/Node'\n",
            HEADER
        );

        let model = SpecParser::default().parse(&text, dir.path())?;
        let node = model.schema("Node").expect("Node schema");
        assert_eq!(node.as_json()["properties"]["value"]["type"], "string");
        assert_eq!(
            node.as_json()["properties"]["child"]["$ref"],
            "#/components/schemas/Node"
        );
        assert_eq!(model.schemas().count(), 1);
        Ok(())
    }

    #[test]
    fn test_recursive_schema_without_a_name_is_registered() -> crate::Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("models.yaml"),
            "TreeNode:\n  type: object\n  properties:\n    children:\n      type: array\n      items:\n        $ref: '#/TreeNode'\n",
        )?;
        let text = format!(
            "{}components:\n  schemas:\n    Tree:\n      type: object\n      properties:\n        root:\n          $ref: 'models.yaml#/TreeNode'\n",
            HEADER
        );

        let model = SpecParser::default().parse(&text, dir.path())?;
        let names: Vec<&str> = model.schemas().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Tree", "TreeNode"]);

        let tree = model.schema("Tree").expect("Tree schema");
        let root = &tree.as_json()["properties"]["root"];
        assert_eq!(root["type"], "object");
        assert_eq!(
            root["properties"]["children"]["items"]["$ref"],
            "#/components/schemas/TreeNode"
        );
        let registered = model.schema("TreeNode").expect("TreeNode schema");
        assert_eq!(
            registered.as_json()["properties"]["children"]["items"]["$ref"],
            "#/components/schemas/TreeNode"
        );
        Ok(())
    }

    #[test]
    fn test_repeated_references_into_one_file() -> crate::Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("models.yaml"),
            "Tag:\n  type: string\nOwner:\n  type: object\n  properties:\n    tag:\n      $ref: '#/Tag'\n",
        )?;
        let text = format!(
            "{}components:\n  schemas:\n    Pet:\n      type: object\n      properties:\n        tag:\n          $ref: 'models.yaml#/Tag'\n        owner:\n          $ref: 'models.yaml#/Owner'\n        other:\n          $ref: 'models.yaml#/Tag'\n",
            HEADER
        );

        let model = SpecParser::default().parse(&text, dir.path())?;
        let props = &model.schema("Pet").expect("Pet schema").as_json()["properties"];
        assert_eq!(props["tag"], props["other"]);
        assert_eq!(props["owner"]["properties"]["tag"]["type"], "string");
        Ok(())
    }

    #[test]
    fn test_header_errors_do_not_blame_references() {
        let err = SpecParser::default()
            .parse(
                "swagger: '2.0'\nopenapi: '2.0'\ninfo:\n  title: Old\n  version: '1'\n",
                Path::new("."),
            )
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unsupported OpenAPI version '2.0'"));
        assert!(!msg.contains("internet connection"));

        let err = SpecParser::default()
            .parse("openapi: [3.0", Path::new("."))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("valid YAML or JSON"));
        assert!(!msg.contains("internet connection"));
    }

    #[test]
    fn test_external_references_left_alone_when_disabled() -> crate::Result<()> {
        let parser = SpecParser::new(ParseOptions {
            resolve_external_refs: false,
            ..Default::default()
        });
        let text = format!(
            "{}components:\n  schemas:\n    Pet:\n      $ref: 'https://example.com/pet.yaml'\n",
            HEADER
        );
        let model = parser.parse(&text, Path::new("."))?;
        assert_eq!(
            model.schema("Pet").map(|s| s.as_json()["$ref"].clone()),
            Some(serde_json::json!("https://example.com/pet.yaml"))
        );
        Ok(())
    }

    #[test]
    fn test_malformed_text_is_parse_error() {
        let err = SpecParser::default()
            .parse("openapi: [3.0", Path::new("."))
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}

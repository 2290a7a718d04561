//! Parsed specification model

use serde_json::Value as JsonValue;

use crate::schema::SchemaNode;
use crate::Error;

/// A parsed OpenAPI 3.x specification.
///
/// Holds the resolved document alongside the pieces every consumer needs:
/// the declared version, the typed `info` block and the schema table in
/// declaration order.
#[derive(Debug, Clone)]
pub struct SpecModel {
    document: JsonValue,
    openapi: String,
    info: openapiv3::Info,
    schemas: Vec<(String, SchemaNode)>,
}

impl SpecModel {
    /// Build a model from a resolved document, checking its header
    pub(crate) fn from_document(document: JsonValue) -> crate::Result<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| Error::parse("document root is not a mapping"))?;

        let openapi = root
            .get("openapi")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::parse("missing 'openapi' version field"))?;
        if !openapi.starts_with("3.") {
            return Err(Error::parse(format!(
                "unsupported OpenAPI version '{}', expected 3.x",
                openapi
            )));
        }

        let info = root
            .get("info")
            .ok_or_else(|| Error::parse("missing 'info' object"))?;
        let info: openapiv3::Info = serde_json::from_value(info.clone())
            .map_err(|e| Error::parse(format!("invalid 'info' object: {}", e)))?;

        let schemas = match root.get("components").and_then(|c| c.get("schemas")) {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Object(map)) => map
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::new(schema.clone())))
                .collect(),
            Some(_) => return Err(Error::parse("'components.schemas' is not a mapping")),
        };

        Ok(Self {
            openapi: openapi.to_string(),
            info,
            schemas,
            document,
        })
    }

    /// Get a reference to the resolved document
    pub fn document(&self) -> &JsonValue {
        &self.document
    }

    /// The declared `openapi` version
    pub fn openapi_version(&self) -> &str {
        &self.openapi
    }

    /// The typed `info` block
    pub fn info(&self) -> &openapiv3::Info {
        &self.info
    }

    /// Get the title of the API
    pub fn title(&self) -> &str {
        &self.info.title
    }

    /// Get the version of the API
    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Named schemas from `components.schemas`, in declaration order
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
    }

    /// Look up a schema from `components.schemas` by name
    pub fn schema(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, schema)| schema)
    }

    /// Resolve an internal reference such as `#/components/schemas/Pet`.
    ///
    /// Returns `None` for external references and for pointers that do not
    /// lead anywhere in the document.
    pub fn resolve_reference(&self, reference: &str) -> Option<&JsonValue> {
        let pointer = reference.strip_prefix('#')?;
        self.document.pointer(pointer)
    }

    /// Typed `openapiv3` view of the whole document
    pub fn openapi(&self) -> crate::Result<openapiv3::OpenAPI> {
        serde_json::from_value(self.document.clone())
            .map_err(|e| Error::parse(format!("document is not a valid OpenAPI model: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore() -> JsonValue {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {},
            "components": {
                "schemas": {
                    "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
                    "Error": {"type": "object"}
                }
            }
        })
    }

    #[test]
    fn test_model_exposes_header_and_schemas() -> crate::Result<()> {
        let model = SpecModel::from_document(petstore())?;
        assert_eq!(model.openapi_version(), "3.0.3");
        assert_eq!(model.title(), "Petstore");
        assert_eq!(model.version(), "1.0.0");
        let names: Vec<&str> = model.schemas().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Pet", "Error"]);
        assert!(model.schema("Pet").is_some());
        assert!(model.schema("Owner").is_none());
        Ok(())
    }

    #[test]
    fn test_resolve_reference() -> crate::Result<()> {
        let model = SpecModel::from_document(petstore())?;
        assert!(model.resolve_reference("#/components/schemas/Pet").is_some());
        assert!(model.resolve_reference("#/components/schemas/Owner").is_none());
        assert!(model.resolve_reference("other.yaml#/Pet").is_none());
        Ok(())
    }

    #[test]
    fn test_typed_view() -> crate::Result<()> {
        let model = SpecModel::from_document(petstore())?;
        let openapi = model.openapi()?;
        assert_eq!(openapi.info.title, "Petstore");
        Ok(())
    }

    #[test]
    fn test_rejects_swagger_v2_and_missing_info() {
        let swagger = json!({"swagger": "2.0", "info": {"title": "x", "version": "1"}});
        assert!(matches!(SpecModel::from_document(swagger), Err(Error::Parse(_))));

        let no_info = json!({"openapi": "3.0.0"});
        let err = SpecModel::from_document(no_info).unwrap_err();
        assert!(err.to_string().contains("missing 'info' object"));
    }

    #[test]
    fn test_rejects_non_mapping_schema_table() {
        let doc = json!({
            "openapi": "3.0.0",
            "info": {"title": "x", "version": "1"},
            "components": {"schemas": ["Pet"]}
        });
        assert!(matches!(SpecModel::from_document(doc), Err(Error::Parse(_))));
    }
}

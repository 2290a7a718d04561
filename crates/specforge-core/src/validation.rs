//! Structural validation of named schemas.
//!
//! Code generation relies on a few shape rules that OpenAPI itself does not
//! enforce. [`validate`] checks them all in one pass and returns every
//! violation, so a broken spec can be fixed in one go instead of one error at
//! a time.

// Internal imports (std, crate)
use std::fmt;

use crate::model::SpecModel;
use crate::schema::SchemaExt;

// External imports (alphabetized)
use serde_json::Value as JsonValue;

/// A single structural rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human readable description of the violation
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Rule violations, schema-level first, then property-level
    pub errors: Vec<ValidationError>,
    /// Accepted oddities worth telling the user about
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether no rule was violated
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every named schema, logging warnings and returning the violations.
///
/// Never fails: an empty result means the model is fit for classification.
pub fn validate(model: &SpecModel) -> Vec<ValidationError> {
    let report = inspect(model);
    for warning in &report.warnings {
        log::warn!("{}", warning);
    }
    report.errors
}

/// Run every rule and collect both violations and warnings.
///
/// Schema-level rules run over all schemas before property-level rules run
/// over all properties.
pub fn inspect(model: &SpecModel) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (name, schema) in model.schemas() {
        let object_like = schema.schema_type() == Some("object") || schema.has_properties();
        if schema.has_combinator() && object_like {
            report.errors.push(ValidationError::new(format!(
                "'{}' schema contains an invalid combination of properties and `oneOf | anyOf | allOf`. \
                 Do not use properties and a combiner at the same level.",
                name
            )));
        } else if schema.schema_type().is_none() && schema.has_properties() {
            report.warnings.push(format!(
                "Schema '{}' has 'type: null' but defines properties. Assuming: 'type: object'",
                name
            ));
        }
    }

    for (_, schema) in model.schemas() {
        let Some(properties) = schema.properties() else {
            continue;
        };
        for (name, property) in properties {
            let items_missing = property.schema_type() == Some("array")
                && !property
                    .items()
                    .is_some_and(|items| is_resolvable(model, items));
            if items_missing {
                report.errors.push(ValidationError::new(format!(
                    "Array type '{}' cannot be parsed to a Schema. Check your input",
                    name
                )));
            } else if !is_resolvable(model, property) {
                report.errors.push(ValidationError::new(format!(
                    "Property '{}' cannot be parsed to a Schema. Check your input",
                    name
                )));
            }
        }
    }

    report
}

/// Whether a node can be read as a schema.
///
/// Internal references must point somewhere in the document. External
/// references that were not inlined cannot be checked and are accepted.
/// `type` may be a single name or, as in OpenAPI 3.1, a list of names.
fn is_resolvable(model: &SpecModel, node: &JsonValue) -> bool {
    let Some(fields) = node.as_object() else {
        return false;
    };
    if let Some(reference) = node.reference() {
        return !reference.starts_with('#') || model.resolve_reference(reference).is_some();
    }

    let type_ok = match fields.get("type") {
        None | Some(JsonValue::String(_)) => true,
        Some(JsonValue::Array(names)) => {
            !names.is_empty() && names.iter().all(JsonValue::is_string)
        }
        Some(_) => false,
    };
    let properties_ok = fields
        .get("properties")
        .map_or(true, JsonValue::is_object);
    type_ok && properties_ok
}

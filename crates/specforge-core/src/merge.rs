//! Document tree merging for base specifications and overlay fragments.
//!
//! Documents are decoded into `serde_json::Value` trees (YAML is a superset of
//! JSON, so both formats go through the YAML decoder) and merged field by field.
//! Arrays are merged as a union keyed on deep structural equality.
//!
//! # Examples
//!
//! ```
//! use specforge_core::merge::merge;
//! use serde_json::json;
//!
//! let merged = merge(&json!({"tags": [1, 2]}), &json!({"tags": [2, 3]}));
//! assert_eq!(merged, json!({"tags": [1, 2, 3]}));
//! ```

// External imports (alphabetized)
use serde_json::Value as JsonValue;

/// Decode YAML or JSON text into a document tree.
///
/// Non-string mapping keys (e.g. unquoted response codes like `200:`) are
/// converted to strings. Blank text decodes to `null`.
pub fn decode_document(text: &str) -> crate::Result<JsonValue> {
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(serde_json::to_value(&yaml)?)
}

/// Encode a document tree as YAML text.
pub fn encode_document(document: &JsonValue) -> crate::Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Merge `incoming` over `current`, returning a new tree.
///
/// Neither input is modified. For each field of `incoming`:
/// - two arrays are unioned: an element deep-equal to an existing one is merged
///   into it in place, anything else is appended;
/// - an object in `current` is merged into recursively;
/// - anything else is replaced by the incoming value.
pub fn merge(current: &JsonValue, incoming: &JsonValue) -> JsonValue {
    let mut merged = current.clone();
    merge_into(&mut merged, incoming);
    merged
}

/// Left fold of `fragments` over `base`. Later fragments win on conflicts.
pub fn merge_all<'a, I>(base: &JsonValue, fragments: I) -> JsonValue
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    let mut merged = base.clone();
    for fragment in fragments {
        merge_into(&mut merged, fragment);
    }
    merged
}

/// Decode, merge and re-encode a base document and its fragments.
pub fn merge_documents<I, S>(base: &str, fragments: I) -> crate::Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged = decode_document(base)?;
    for (index, fragment) in fragments.into_iter().enumerate() {
        log::debug!("Merging fragment #{}", index + 1);
        let fragment = decode_document(fragment.as_ref())?;
        merge_into(&mut merged, &fragment);
    }
    encode_document(&merged)
}

fn merge_into(current: &mut JsonValue, incoming: &JsonValue) {
    let Some(incoming_fields) = incoming.as_object() else {
        return;
    };
    let Some(current_fields) = current.as_object_mut() else {
        return;
    };

    for (field, incoming_node) in incoming_fields {
        if let Some(current_node) = current_fields.get_mut(field) {
            if let (JsonValue::Array(current_items), JsonValue::Array(incoming_items)) =
                (&mut *current_node, incoming_node)
            {
                union_arrays(current_items, incoming_items);
                continue;
            }
            if current_node.is_object() {
                merge_into(current_node, incoming_node);
                continue;
            }
        }
        current_fields.insert(field.clone(), incoming_node.clone());
    }
}

fn union_arrays(current: &mut Vec<JsonValue>, incoming: &[JsonValue]) {
    for item in incoming {
        match current.iter().position(|existing| existing == item) {
            Some(index) => merge_into(&mut current[index], item),
            None => current.push(item.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pet_base() -> JsonValue {
        json!({
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } }
                    }
                }
            }
        })
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let doc = json!({
            "openapi": "3.0.0",
            "tags": [{"name": "pets"}, {"name": "store"}],
            "paths": {"/pets": {"get": {"parameters": [{"name": "limit", "in": "query"}]}}}
        });
        assert_eq!(merge(&doc, &doc), doc);
    }

    #[test]
    fn test_merge_with_empty_fragment_is_identity() {
        let doc = pet_base();
        assert_eq!(merge(&doc, &json!({})), doc);
        assert_eq!(merge(&doc, &JsonValue::Null), doc);
    }

    #[test]
    fn test_array_union_preserves_order_without_duplicates() {
        let merged = merge(&json!({"values": [1, 2]}), &json!({"values": [2, 3]}));
        assert_eq!(merged, json!({"values": [1, 2, 3]}));
    }

    #[test]
    fn test_array_union_dedupes_repeated_incoming_elements() {
        let merged = merge(&json!({"values": [1]}), &json!({"values": [3, 3]}));
        assert_eq!(merged, json!({"values": [1, 3]}));
    }

    #[test]
    fn test_array_of_dissimilar_objects_appends() {
        let merged = merge(
            &json!({"parameters": [{"name": "limit", "in": "query"}]}),
            &json!({"parameters": [{"name": "limit", "in": "header"}]}),
        );
        assert_eq!(
            merged["parameters"],
            json!([{"name": "limit", "in": "query"}, {"name": "limit", "in": "header"}])
        );
    }

    #[test]
    fn test_fragment_adds_property_to_schema() {
        let fragment = json!({
            "components": {
                "schemas": {
                    "Pet": { "properties": { "age": { "type": "integer" } } }
                }
            }
        });
        let merged = merge(&pet_base(), &fragment);
        let props = &merged["components"]["schemas"]["Pet"]["properties"];
        assert_eq!(props["name"], json!({"type": "string"}));
        assert_eq!(props["age"], json!({"type": "integer"}));
        assert_eq!(merged["components"]["schemas"]["Pet"]["type"], "object");
    }

    #[test]
    fn test_scalar_and_mismatched_fields_take_incoming_value() {
        let merged = merge(
            &json!({"title": "old", "version": [1], "servers": "none"}),
            &json!({"title": "new", "version": "2", "servers": {"url": "x"}}),
        );
        assert_eq!(
            merged,
            json!({"title": "new", "version": "2", "servers": {"url": "x"}})
        );
    }

    #[test]
    fn test_object_is_kept_when_incoming_is_scalar() {
        let merged = merge(&json!({"info": {"title": "a"}}), &json!({"info": "b"}));
        assert_eq!(merged, json!({"info": {"title": "a"}}));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let base = json!({"list": [{"a": 1}], "obj": {"x": 1}});
        let fragment = json!({"list": [{"b": 2}], "obj": {"y": 2}});
        let base_before = base.clone();
        let fragment_before = fragment.clone();

        let first = merge(&base, &fragment);
        let second = merge(&base, &fragment);

        assert_eq!(base, base_before);
        assert_eq!(fragment, fragment_before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_all_later_fragments_win() {
        let base = json!({"info": {"title": "base", "version": "1"}});
        let first = json!({"info": {"title": "first"}});
        let second = json!({"info": {"title": "second"}});
        let merged = merge_all(&base, [&first, &second]);
        assert_eq!(merged, json!({"info": {"title": "second", "version": "1"}}));
    }

    #[test]
    fn test_merge_documents_from_yaml_text() -> crate::Result<()> {
        let base = r#"
openapi: 3.0.0
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"#;
        let fragment = r#"{"components": {"schemas": {"Pet": {"properties": {"age": {"type": "integer"}}}}}}"#;
        let merged = merge_documents(base, [fragment, ""])?;
        let merged = decode_document(&merged)?;
        let props = &merged["components"]["schemas"]["Pet"]["properties"];
        assert!(props.get("name").is_some());
        assert!(props.get("age").is_some());
        Ok(())
    }

    #[test]
    fn test_decode_document_stringifies_numeric_keys() -> crate::Result<()> {
        let doc = decode_document("responses:\n  200:\n    description: ok\n")?;
        assert_eq!(doc["responses"]["200"]["description"], "ok");
        Ok(())
    }

    #[test]
    fn test_decode_document_rejects_malformed_yaml() {
        assert!(decode_document("a: [1, 2").is_err());
    }
}

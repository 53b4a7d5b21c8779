//! JSON Schema parser.
//!
//! Handles the subset needed to extract field names, types, nesting, and
//! nullability: `type` (including type arrays like `["string","null"]`),
//! `properties`, `items`, `required` arrays, `anyOf`/`oneOf` unions, and
//! the `date`/`time`/`date-time` string formats. Everything else in the
//! vocabulary is ignored, and unknown `type` names degrade to `any`.

use std::collections::BTreeSet;

use schema_drift_core::{ParsedSchema, ScalarKind, TypeNode, join_path, union_of};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ParseError, Result};

/// Parses a JSON Schema document. The selector is meaningless for this
/// dialect and is ignored; the schema's `title` becomes the label when
/// present.
///
/// # Examples
///
/// ```
/// use schema_drift_dialects::jsonschema;
///
/// let text = r#"{
///     "title": "User",
///     "type": "object",
///     "properties": {
///         "id": {"type": "integer"},
///         "email": {"type": ["string", "null"]}
///     },
///     "required": ["id"]
/// }"#;
/// let schema = jsonschema::parse(text, None).unwrap();
/// assert_eq!(schema.label, "User");
/// assert_eq!(
///     schema.root.canonical_form(),
///     "{email: union(missing|str), id: int}"
/// );
/// assert!(schema.required.contains("id"));
/// ```
pub fn parse(source: &str, _selector: Option<&str>) -> Result<ParsedSchema> {
    let document: Value = serde_json::from_str(source)?;
    let Some(top) = document.as_object() else {
        return Err(ParseError::syntax(None, "JSON Schema root must be an object"));
    };

    let label = top
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("jsonschema")
        .to_string();

    let mut required = BTreeSet::new();
    let root = build_node(&document, "", &mut required);
    if !matches!(root, TypeNode::Object(_)) {
        return Err(ParseError::syntax(
            None,
            "top-level JSON Schema must describe an object with properties",
        ));
    }

    Ok(ParsedSchema::new(root, required, label))
}

fn build_node(schema: &Value, path: &str, required: &mut BTreeSet<String>) -> TypeNode {
    let Some(object) = schema.as_object() else {
        return TypeNode::any();
    };

    if let Some(variants) = object
        .get("anyOf")
        .or_else(|| object.get("oneOf"))
        .and_then(Value::as_array)
    {
        return union_of(
            variants
                .iter()
                .map(|variant| build_node(variant, path, required))
                .collect(),
        );
    }

    match object.get("type") {
        Some(Value::String(name)) => build_typed(name, object, path, required),
        Some(Value::Array(names)) => union_of(
            names
                .iter()
                .filter_map(Value::as_str)
                .map(|name| build_typed(name, object, path, required))
                .collect(),
        ),
        // Schemas may omit `type` and rely on `properties` alone.
        None if object.contains_key("properties") => {
            build_typed("object", object, path, required)
        }
        _ => TypeNode::any(),
    }
}

fn build_typed(
    type_name: &str,
    object: &Map<String, Value>,
    path: &str,
    required: &mut BTreeSet<String>,
) -> TypeNode {
    match type_name {
        "object" => {
            let Some(properties) = object.get("properties").and_then(Value::as_object) else {
                return TypeNode::opaque();
            };
            let required_names: BTreeSet<&str> = object
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let fields: Vec<(String, TypeNode)> = properties
                .iter()
                .map(|(name, sub)| {
                    let field_path = join_path(path, name);
                    if required_names.contains(name.as_str()) {
                        required.insert(field_path.clone());
                    }
                    (name.clone(), build_node(sub, &field_path, required))
                })
                .collect();
            TypeNode::object(fields)
        }
        "array" => match object.get("items") {
            Some(items) => TypeNode::array(build_node(items, path, required)),
            None => TypeNode::unknown_array(),
        },
        "string" => {
            let kind = match object.get("format").and_then(Value::as_str) {
                Some("date") => ScalarKind::Date,
                Some("time") => ScalarKind::Time,
                Some("date-time") => ScalarKind::Timestamp,
                _ => ScalarKind::Str,
            };
            TypeNode::scalar(kind)
        }
        "integer" => TypeNode::scalar(ScalarKind::Int),
        "number" => TypeNode::scalar(ScalarKind::Float),
        "boolean" => TypeNode::scalar(ScalarKind::Bool),
        "null" => TypeNode::missing(),
        other => {
            debug!(token = %other, "unknown JSON Schema type, defaulting to any");
            TypeNode::any()
        }
    }
}

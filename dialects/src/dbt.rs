//! dbt schema parser.
//!
//! Reads either a dbt `schema.yml` properties file (models → columns with
//! `data_type`, `constraints`, and `tests`) or a compiled `manifest.json`
//! (nodes → columns). Column `data_type` strings are SQL type tokens and
//! reuse the SQL type-token normalization, so `ARRAY<...>`, trailing `[]`,
//! and `(precision,scale)` behave identically across the two dialects.
//! A column is required when it carries a `not_null` constraint or test.

use std::collections::{BTreeMap, BTreeSet};

use schema_drift_core::{ParsedSchema, TypeNode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::sql;

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    models: Vec<ModelSpec>,
}

#[derive(Debug, Deserialize)]
struct ModelSpec {
    name: String,
    #[serde(default)]
    columns: Vec<ColumnSpec>,
}

#[derive(Debug, Deserialize)]
struct ColumnSpec {
    name: String,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    constraints: Vec<ConstraintSpec>,
    #[serde(default)]
    tests: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct ConstraintSpec {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    nodes: BTreeMap<String, ManifestNode>,
}

#[derive(Debug, Deserialize)]
struct ManifestNode {
    name: String,
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default)]
    columns: BTreeMap<String, ManifestColumn>,
}

#[derive(Debug, Deserialize)]
struct ManifestColumn {
    name: String,
    #[serde(default)]
    data_type: Option<String>,
}

/// Parses a dbt `schema.yml` properties file or compiled `manifest.json`
/// (detected by the leading `{`) and returns the schema of one model.
///
/// Model selection mirrors the SQL table rules: case-insensitive exact
/// match, lexicographically first model when no selector is given.
///
/// # Examples
///
/// ```
/// use schema_drift_dialects::dbt;
///
/// let yml = "\
/// version: 2
/// models:
///   - name: users
///     columns:
///       - name: id
///         data_type: bigint
///         constraints:
///           - type: not_null
///       - name: email
///         data_type: varchar
/// ";
/// let schema = dbt::parse(yml, Some("users")).unwrap();
/// assert_eq!(schema.root.canonical_form(), "{email: str, id: int}");
/// assert!(schema.required.contains("id"));
/// ```
pub fn parse(source: &str, selector: Option<&str>) -> Result<ParsedSchema> {
    if source.trim_start().starts_with('{') {
        parse_manifest(source, selector)
    } else {
        parse_schema_file(source, selector)
    }
}

fn parse_schema_file(source: &str, selector: Option<&str>) -> Result<ParsedSchema> {
    let file: SchemaFile = serde_yaml::from_str(source)?;
    if file.models.is_empty() {
        return Err(ParseError::syntax(None, "no models found in dbt schema file"));
    }

    let model = select_by_name(
        &file.models,
        selector,
        |model: &ModelSpec| model.name.as_str(),
    )?;
    debug!(model = %model.name, columns = model.columns.len(), "parsing dbt model");

    let mut columns: Vec<(String, TypeNode)> = Vec::new();
    let mut required = BTreeSet::new();
    for column in &model.columns {
        let ty = data_type_node(column.data_type.as_deref())?;
        if column_is_not_null(column) {
            required.insert(column.name.clone());
        }
        columns.push((column.name.clone(), ty));
    }

    Ok(ParsedSchema::new(
        TypeNode::object(columns),
        required,
        model.name.clone(),
    ))
}

fn parse_manifest(source: &str, selector: Option<&str>) -> Result<ParsedSchema> {
    let manifest: Manifest = serde_json::from_str(source)?;
    let models: Vec<&ManifestNode> = manifest
        .nodes
        .values()
        .filter(|node| {
            node.resource_type
                .as_deref()
                .is_none_or(|kind| kind == "model")
        })
        .collect();
    if models.is_empty() {
        return Err(ParseError::syntax(None, "no model nodes found in dbt manifest"));
    }

    let model = select_by_name(&models, selector, |node: &&ManifestNode| node.name.as_str())?;
    debug!(model = %model.name, columns = model.columns.len(), "parsing dbt manifest node");

    let mut columns: Vec<(String, TypeNode)> = Vec::new();
    for column in model.columns.values() {
        columns.push((
            column.name.clone(),
            data_type_node(column.data_type.as_deref())?,
        ));
    }

    // Compiled manifests carry no nullability information; every column
    // defaults to optional.
    Ok(ParsedSchema::new(
        TypeNode::object(columns),
        BTreeSet::new(),
        model.name.clone(),
    ))
}

fn data_type_node(data_type: Option<&str>) -> Result<TypeNode> {
    match data_type {
        Some(token) => sql::normalize_type_token(token, None),
        None => Ok(TypeNode::any()),
    }
}

fn column_is_not_null(column: &ColumnSpec) -> bool {
    if column
        .constraints
        .iter()
        .any(|constraint| constraint.kind == "not_null")
    {
        return true;
    }
    column.tests.iter().any(|test| match test {
        serde_yaml::Value::String(name) => name == "not_null",
        serde_yaml::Value::Mapping(entries) => entries
            .keys()
            .any(|key| key.as_str() == Some("not_null")),
        _ => false,
    })
}

fn select_by_name<'a, T>(
    items: &'a [T],
    selector: Option<&str>,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    match selector {
        None => Ok(items
            .iter()
            .min_by(|a, b| {
                name_of(a)
                    .to_lowercase()
                    .cmp(&name_of(b).to_lowercase())
            })
            .expect("items checked non-empty")),
        Some(requested) => {
            let matches: Vec<&T> = items
                .iter()
                .filter(|item| name_of(item).eq_ignore_ascii_case(requested))
                .collect();
            match matches.len() {
                1 => Ok(matches[0]),
                0 => Err(ParseError::SelectorNotFound {
                    name: requested.to_string(),
                    available: items.iter().map(|item| name_of(item).to_string()).collect(),
                }),
                _ => Err(ParseError::AmbiguousSelector {
                    name: requested.to_string(),
                    candidates: matches.iter().map(|item| name_of(item).to_string()).collect(),
                }),
            }
        }
    }
}

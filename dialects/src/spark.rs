//! Spark `printSchema()` text parser.
//!
//! Parses the indented tree Spark prints for a DataFrame schema:
//!
//! ```text
//! root
//!  |-- user_id: long (nullable = false)
//!  |-- tags: array (nullable = true)
//!  |    |-- element: string (containsNull = true)
//!  |-- address: struct (nullable = true)
//!  |    |-- city: string (nullable = true)
//! ```
//!
//! Depth is the number of `|` markers before the `--` arrow. `struct` rows
//! open a nested field scope; `array` rows are followed by an `element` row
//! giving the element shape; `map` rows keep their key/value children
//! opaque. The type vocabulary is table-driven, with unknown names
//! degrading to `any`. `nullable = false` adds the field's dotted path to
//! the required set; `containsNull` on element rows never does, since
//! presence is a property of the holding field, not the element.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use schema_drift_core::{ParsedSchema, ScalarKind, TypeNode, join_path};
use tracing::debug;

use crate::error::{ParseError, Result};

static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*((?:\|\s*)+)--\s*([\w.]+)\s*:\s*([A-Za-z_]+(?:\([^)]*\))?)\s*(?:\((?:nullable|containsNull|valueContainsNull)\s*=\s*(true|false)\))?",
    )
    .expect("static regex must compile")
});

#[derive(Debug)]
struct Row {
    depth: usize,
    name: String,
    type_name: String,
    nullable: bool,
    line: usize,
}

/// Parses `printSchema()` output. The selector is meaningless for this
/// dialect and is ignored.
///
/// # Examples
///
/// ```
/// use schema_drift_dialects::spark;
///
/// let text = "\
/// root
///  |-- id: long (nullable = false)
///  |-- name: string (nullable = true)
/// ";
/// let schema = spark::parse(text, None).unwrap();
/// assert_eq!(schema.root.canonical_form(), "{id: int, name: str}");
/// assert!(schema.required.contains("id"));
/// ```
pub fn parse(source: &str, _selector: Option<&str>) -> Result<ParsedSchema> {
    let rows = collect_rows(source);
    if rows.is_empty() {
        return Err(ParseError::syntax(
            None,
            "no printSchema rows found (expected ` |-- name: type` lines)",
        ));
    }

    let mut required = BTreeSet::new();
    let mut pos = 0usize;
    let fields = parse_fields(&rows, &mut pos, 1, "", &mut required)?;
    if pos < rows.len() {
        let row = &rows[pos];
        return Err(ParseError::syntax(
            Some(row.line),
            format!("unexpected indentation at field `{}`", row.name),
        ));
    }

    Ok(ParsedSchema::new(
        TypeNode::object(fields),
        required,
        "spark",
    ))
}

fn collect_rows(source: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    for (number, line) in source.lines().enumerate() {
        let Some(caps) = ROW_RE.captures(line) else {
            continue;
        };
        rows.push(Row {
            depth: caps[1].matches('|').count(),
            name: caps[2].to_string(),
            type_name: caps[3].to_string(),
            nullable: caps.get(4).is_none_or(|flag| flag.as_str() == "true"),
            line: number + 1,
        });
    }
    rows
}

fn parse_fields(
    rows: &[Row],
    pos: &mut usize,
    depth: usize,
    prefix: &str,
    required: &mut BTreeSet<String>,
) -> Result<Vec<(String, TypeNode)>> {
    let mut fields: Vec<(String, TypeNode)> = Vec::new();

    while *pos < rows.len() {
        let row = &rows[*pos];
        if row.depth < depth {
            break;
        }
        if row.depth > depth {
            return Err(ParseError::syntax(
                Some(row.line),
                format!("unexpected indentation at field `{}`", row.name),
            ));
        }
        *pos += 1;

        let path = join_path(prefix, &row.name);
        let ty = parse_row_type(rows, pos, row, depth, &path, required)?;
        if !row.nullable {
            required.insert(path);
        }
        fields.push((row.name.clone(), ty));
    }

    Ok(fields)
}

fn parse_row_type(
    rows: &[Row],
    pos: &mut usize,
    row: &Row,
    depth: usize,
    path: &str,
    required: &mut BTreeSet<String>,
) -> Result<TypeNode> {
    match base_type(&row.type_name).as_str() {
        "struct" => {
            let children = parse_fields(rows, pos, depth + 1, path, required)?;
            Ok(TypeNode::object(children))
        }
        "array" => {
            let element = parse_array_element(rows, pos, depth + 1, path, required)?;
            Ok(TypeNode::array(element))
        }
        "map" => {
            skip_children(rows, pos, depth);
            Ok(TypeNode::opaque())
        }
        name => Ok(scalar_for(name)),
    }
}

/// Consumes the `element` row under an array field and returns the element
/// shape. The element's own nullability (`containsNull`) is deliberately
/// not recorded: presence is never encoded on array element types.
fn parse_array_element(
    rows: &[Row],
    pos: &mut usize,
    depth: usize,
    path: &str,
    required: &mut BTreeSet<String>,
) -> Result<TypeNode> {
    if *pos >= rows.len() || rows[*pos].depth != depth || rows[*pos].name != "element" {
        return Ok(TypeNode::any());
    }
    let row = &rows[*pos];
    *pos += 1;

    match base_type(&row.type_name).as_str() {
        "struct" => {
            let children = parse_fields(rows, pos, depth + 1, path, required)?;
            Ok(TypeNode::object(children))
        }
        "array" => {
            let inner = parse_array_element(rows, pos, depth + 1, path, required)?;
            Ok(TypeNode::array(inner))
        }
        "map" => {
            skip_children(rows, pos, depth);
            Ok(TypeNode::opaque())
        }
        name => Ok(scalar_for(name)),
    }
}

fn skip_children(rows: &[Row], pos: &mut usize, depth: usize) {
    while *pos < rows.len() && rows[*pos].depth > depth {
        *pos += 1;
    }
}

fn base_type(type_name: &str) -> String {
    let lower = type_name.to_lowercase();
    match lower.find('(') {
        Some(open) => lower[..open].trim().to_string(),
        None => lower.trim().to_string(),
    }
}

fn scalar_for(name: &str) -> TypeNode {
    let kind = match name {
        "string" | "varchar" | "char" | "binary" => ScalarKind::Str,
        "integer" | "int" | "long" | "bigint" | "short" | "smallint" | "byte" | "tinyint" => {
            ScalarKind::Int
        }
        "double" | "float" | "decimal" | "real" => ScalarKind::Float,
        "boolean" => ScalarKind::Bool,
        "date" => ScalarKind::Date,
        "timestamp" | "timestamp_ntz" | "timestamp_ltz" => ScalarKind::Timestamp,
        "null" | "void" => ScalarKind::Missing,
        other => {
            debug!(token = %other, "unknown Spark type token, defaulting to any");
            ScalarKind::Any
        }
    };
    TypeNode::scalar(kind)
}

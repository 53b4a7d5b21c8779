//! Sampled data-record ingestion.
//!
//! Accepts NDJSON (one record per line) or a top-level JSON array, infers
//! each record's type tree, and reduces them with the union algebra — in
//! parallel, which is sound because union is commutative and associative.
//! The presence set falls out of the merged tree: a path is required
//! exactly when its type was never unioned with `missing`.
//!
//! Input-size bounding (reservoir sampling, capped record counts) is the
//! caller's responsibility; this parser folds whatever it is handed.

use rayon::prelude::*;
use schema_drift_core::{
    MergeConfig, ParsedSchema, TypeNode, infer_value, required_from_tree, union,
};
use serde_json::Value;
use tracing::warn;

use crate::error::{ParseError, Result};

/// Parses sampled records and returns the merged, inferred schema under the
/// fixed label `records`.
///
/// Malformed JSON fails fast with the offending line number; records that
/// are not JSON objects are skipped with a warning rather than degrading
/// the merged root.
///
/// # Examples
///
/// ```
/// use schema_drift_core::MergeConfig;
/// use schema_drift_dialects::records;
///
/// let ndjson = "\
/// {\"a\": 1, \"b\": \"x\"}
/// {\"a\": \"two\"}
/// ";
/// let schema = records::parse(ndjson, &MergeConfig::default()).unwrap();
/// assert_eq!(
///     schema.root.canonical_form(),
///     "{a: union(int|str), b: union(missing|str)}"
/// );
/// assert!(schema.required.contains("a"));
/// assert!(!schema.required.contains("b"));
/// ```
pub fn parse(source: &str, config: &MergeConfig) -> Result<ParsedSchema> {
    let values = read_records(source)?;
    if values.is_empty() {
        return Err(ParseError::syntax(None, "no records found"));
    }

    let (objects, other): (Vec<Value>, Vec<Value>) =
        values.into_iter().partition(Value::is_object);
    if !other.is_empty() {
        warn!(skipped = other.len(), "skipping non-object records");
    }
    if objects.is_empty() {
        return Err(ParseError::syntax(None, "no object-shaped records found"));
    }

    let root = objects
        .into_par_iter()
        .map(|record| infer_value(&record, config))
        .reduce(TypeNode::any, |left, right| union(&left, &right));
    let required = required_from_tree(&root);

    Ok(ParsedSchema::new(root, required, "records"))
}

fn read_records(source: &str) -> Result<Vec<Value>> {
    if source.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(source)?;
        return Ok(values);
    }

    let lines: Vec<(usize, &str)> = source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    lines
        .par_iter()
        .map(|(number, line)| {
            serde_json::from_str::<Value>(line).map_err(|err| {
                ParseError::syntax(Some(number + 1), format!("invalid JSON record: {err}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndjson_merge_with_presence() {
        let ndjson = "\
{\"id\": 1, \"name\": \"ada\"}
{\"id\": 2}
";
        let schema = parse(ndjson, &MergeConfig::default()).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{id: int, name: union(missing|str)}"
        );
        assert_eq!(schema.required.iter().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(schema.label, "records");
    }

    #[test]
    fn test_json_array_input() {
        let text = r#"[{"a": 1}, {"a": "x"}]"#;
        let schema = parse(text, &MergeConfig::default()).unwrap();
        assert_eq!(schema.root.canonical_form(), "{a: union(int|str)}");
    }

    #[test]
    fn test_non_object_records_are_skipped() {
        let text = "{\"a\": 1}\n42\n";
        let schema = parse(text, &MergeConfig::default()).unwrap();
        assert_eq!(schema.root.canonical_form(), "{a: int}");
    }

    #[test]
    fn test_only_non_object_records_is_an_error() {
        let err = parse("1\n2\n", &MergeConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got: {err}");
    }

    #[test]
    fn test_malformed_line_fails_with_line_number() {
        let err = parse("{\"a\": 1}\n{broken\n", &MergeConfig::default()).unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = parse("\n\n", &MergeConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got: {err}");
    }

    #[test]
    fn test_temporal_fields_in_records() {
        let ndjson = "{\"created_at\": \"2024-06-01T10:00:00Z\", \"day\": \"2024-06-01\"}\n";
        let schema = parse(ndjson, &MergeConfig::default()).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{created_at: timestamp, day: date}"
        );
    }
}

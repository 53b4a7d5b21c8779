//! Sample merging: folding observed data records into one inferred tree.
//!
//! Each record is inferred into a [`TypeNode`] and folded through the union
//! algebra, so the merged result is independent of record order. Inference
//! behavior is controlled by an explicit [`MergeConfig`] passed into every
//! entry point; there is no implicit global configuration.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use tracing::debug;

use crate::{union, ScalarKind, TypeNode};

/// Inference options for sample merging.
///
/// # Examples
///
/// ```
/// use schema_drift_core::MergeConfig;
///
/// let config = MergeConfig::default();
/// assert!(config.infer_temporal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    /// Detect ISO date/time/timestamp strings and type them as
    /// `date`/`time`/`timestamp` instead of `str`.
    pub infer_temporal: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            infer_temporal: true,
        }
    }
}

/// Folds sampled records into one inferred type tree.
///
/// Absent fields degrade to `union(T|missing)` purely through the union
/// algebra; heterogeneous values become unions. Never fails: an empty
/// sample set yields an empty object tree (which normalization collapses
/// to the opaque `object` scalar).
///
/// Input-size bounding is the caller's responsibility; this function folds
/// whatever it is handed.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{merge_samples, MergeConfig};
/// use serde_json::json;
///
/// let merged = merge_samples(
///     vec![json!({"a": 1}), json!({"a": "x"})],
///     &MergeConfig::default(),
/// );
/// assert_eq!(merged.canonical_form(), "{a: union(int|str)}");
/// ```
pub fn merge_samples<I>(records: I, config: &MergeConfig) -> TypeNode
where
    I: IntoIterator<Item = Value>,
{
    let mut merged: Option<TypeNode> = None;
    let mut count = 0usize;

    for record in records {
        count += 1;
        let inferred = infer_value(&record, config);
        merged = Some(match merged.take() {
            Some(acc) => union(&acc, &inferred),
            None => inferred,
        });
    }

    debug!(records = count, "merged samples");
    merged.unwrap_or_else(TypeNode::empty_object)
}

/// Infers the type tree of a single JSON value.
///
/// `null` infers as `missing`, so nullable-in-data fields merge to
/// `union(T|missing)` with no extra rule. Empty arrays infer as the unknown
/// sentinel `[any]`, which loses to any populated element shape on merge.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{infer_value, MergeConfig};
/// use serde_json::json;
///
/// let config = MergeConfig::default();
/// assert_eq!(infer_value(&json!(3), &config).canonical_form(), "int");
/// assert_eq!(infer_value(&json!([]), &config).canonical_form(), "[any]");
/// assert_eq!(
///     infer_value(&json!("2024-06-01"), &config).canonical_form(),
///     "date"
/// );
/// ```
pub fn infer_value(value: &Value, config: &MergeConfig) -> TypeNode {
    match value {
        Value::Null => TypeNode::missing(),
        Value::Bool(_) => TypeNode::scalar(ScalarKind::Bool),
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                TypeNode::scalar(ScalarKind::Int)
            } else {
                TypeNode::scalar(ScalarKind::Float)
            }
        }
        Value::String(text) => TypeNode::scalar(infer_string_kind(text, config)),
        Value::Array(items) => {
            if items.is_empty() {
                TypeNode::unknown_array()
            } else {
                let mut element: Option<TypeNode> = None;
                for item in items {
                    let inferred = infer_value(item, config);
                    element = Some(match element.take() {
                        Some(acc) => union(&acc, &inferred),
                        None => inferred,
                    });
                }
                TypeNode::array(element.expect("non-empty array"))
            }
        }
        Value::Object(fields) => TypeNode::Object(
            fields
                .iter()
                .map(|(name, item)| (name.clone(), infer_value(item, config)))
                .collect(),
        ),
    }
}

fn infer_string_kind(text: &str, config: &MergeConfig) -> ScalarKind {
    if !config.infer_temporal || text.is_empty() {
        return ScalarKind::Str;
    }

    if DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    {
        return ScalarKind::Timestamp;
    }
    if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() {
        return ScalarKind::Date;
    }
    if NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok() {
        return ScalarKind::Time;
    }

    ScalarKind::Str
}

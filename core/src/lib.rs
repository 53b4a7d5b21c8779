//! Canonical type-tree model, union algebra, sample merging, and diffing.
//!
//! This crate defines the foundational types for normalizing schemas from
//! heterogeneous sources into one comparable representation:
//!
//! - [`TypeNode`] — the canonical recursive tree (scalar/array/object/union)
//!   with a stable textual form used as the cross-parser equality key.
//! - [`ParsedSchema`] — the universal parser output contract: a tree, a
//!   presence set of required dotted paths, and a source label.
//! - [`normalize`] / [`union`] / [`union_of`] — canonicalization and the
//!   commutative, associative union algebra.
//! - [`inject_presence`] / [`required_from_tree`] — converting between
//!   declared presence (SQL `NOT NULL`, Protobuf `required`) and the
//!   data-derived `union(T|missing)` encoding.
//! - [`merge_samples`] — folding sampled data records into one inferred
//!   tree via the union algebra.
//! - [`diff`] — the report engine classifying differences between two
//!   schemas into adds/removes, type mismatches, presence issues, and
//!   field relocations.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use schema_drift_core::{diff, ParsedSchema, ScalarKind, TypeNode};
//!
//! let declared = ParsedSchema::new(
//!     TypeNode::object([
//!         ("id", TypeNode::scalar(ScalarKind::Int)),
//!         ("name", TypeNode::scalar(ScalarKind::Str)),
//!     ]),
//!     BTreeSet::from(["id".to_string()]),
//!     "users",
//! );
//! let observed = ParsedSchema::new(
//!     TypeNode::object([
//!         ("id", TypeNode::scalar(ScalarKind::Int)),
//!         ("name", TypeNode::scalar(ScalarKind::Str)),
//!     ]),
//!     BTreeSet::from(["id".to_string(), "name".to_string()]),
//!     "sampled",
//! );
//!
//! let report = diff(&declared, &observed);
//! // `name` is optional on the left, mandatory on the right.
//! assert_eq!(report.presence_issues.len(), 1);
//! assert!(report.type_mismatches.is_empty());
//! ```

mod diff;
mod merge;
mod normalize;
mod paths;
mod presence;
mod types;

pub use diff::{DiffReport, Relocation, TypeChange, diff};
pub use merge::{MergeConfig, infer_value, merge_samples};
pub use normalize::{normalize, union, union_of};
pub use paths::{all_paths, join_path, leaf_name};
pub use presence::{inject_presence, required_from_tree};
pub use types::{ParsedSchema, ScalarKind, TypeNode};

//! Canonical type-tree definitions for schema modeling.
//!
//! This module defines the core data model used to represent a schema from
//! any dialect: a recursive [`TypeNode`] tree plus a presence set of dotted
//! field paths. The types are designed for serialization with [`serde`] so
//! trees and reports can round-trip through JSON.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Leaf type vocabulary shared by every dialect.
///
/// The set is closed: dialect parsers map their own type names onto these
/// kinds and degrade anything unrecognized to [`ScalarKind::Any`].
/// [`ScalarKind::Missing`] encodes absence (a field not present in a sample,
/// or a nullable column); [`ScalarKind::Object`] is the opaque object kind
/// used where structure exists but is not introspected (e.g. `map<K,V>`
/// fields or unexploded SQL `STRUCT<...>` columns).
///
/// # Examples
///
/// ```
/// use schema_drift_core::ScalarKind;
///
/// assert_eq!(ScalarKind::Int.name(), "int");
/// assert_eq!(ScalarKind::Missing.name(), "missing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Integer numbers of any width.
    Int,
    /// Floating-point and fixed-decimal numbers.
    Float,
    /// Booleans.
    Bool,
    /// Strings, including bytes-like types.
    Str,
    /// Calendar dates without a time component.
    Date,
    /// Times of day without a date component.
    Time,
    /// Full timestamps, with or without zone.
    Timestamp,
    /// Unknown type; matches everything downstream.
    Any,
    /// Absence: a field not present, or a null value.
    Missing,
    /// Opaque object whose fields are not introspected.
    Object,
}

impl ScalarKind {
    /// Canonical lowercase name used in the textual tree form.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Any => "any",
            Self::Missing => "missing",
            Self::Object => "object",
        }
    }
}

/// Canonical recursive representation of a schema.
///
/// Trees are immutable values: every transform (normalization, union,
/// presence injection) rebuilds rather than mutates, so a parsed tree can be
/// reused across any number of comparisons without aliasing concerns.
///
/// Equality, ordering, and hashing all key on the canonical textual form
/// ([`TypeNode::canonical_form`]), so two structurally equal trees compare
/// equal regardless of object-field insertion order.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{ScalarKind, TypeNode};
///
/// let tree = TypeNode::object([
///     ("id", TypeNode::scalar(ScalarKind::Int)),
///     ("tags", TypeNode::array(TypeNode::scalar(ScalarKind::Str))),
/// ]);
/// assert_eq!(tree.canonical_form(), "{id: int, tags: [str]}");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNode {
    /// A leaf type.
    Scalar(ScalarKind),
    /// An array with exactly one element shape. The empty/unknown sentinel
    /// is an array whose element is `Scalar(Any)`.
    Array(Box<TypeNode>),
    /// An object with named fields. Insertion order is irrelevant to
    /// equality and relevant only for display.
    Object(IndexMap<String, TypeNode>),
    /// A union of at least two distinct members: flattened, deduplicated,
    /// and sorted by canonical form. Built via [`crate::union_of`].
    Union(Vec<TypeNode>),
}

impl TypeNode {
    /// Creates a scalar leaf.
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }

    /// The `any` scalar: unknown type, matches everything.
    pub const fn any() -> Self {
        Self::Scalar(ScalarKind::Any)
    }

    /// The `missing` scalar: absence of a value.
    pub const fn missing() -> Self {
        Self::Scalar(ScalarKind::Missing)
    }

    /// The opaque `object` scalar.
    pub const fn opaque() -> Self {
        Self::Scalar(ScalarKind::Object)
    }

    /// Creates an array of the given element shape.
    pub fn array(element: TypeNode) -> Self {
        Self::Array(Box::new(element))
    }

    /// The empty/unknown array sentinel, `[any]`.
    pub fn unknown_array() -> Self {
        Self::array(Self::any())
    }

    /// Creates an object from name/type pairs, preserving insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_drift_core::{ScalarKind, TypeNode};
    ///
    /// let obj = TypeNode::object([("a", TypeNode::scalar(ScalarKind::Bool))]);
    /// assert_eq!(obj.canonical_form(), "{a: bool}");
    /// ```
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeNode)>,
    {
        Self::Object(
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// An object with no fields.
    pub fn empty_object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Returns `true` for the `any` scalar.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Scalar(ScalarKind::Any))
    }

    /// Returns `true` for the `missing` scalar.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Scalar(ScalarKind::Missing))
    }

    /// Returns `true` if this node is `missing` or a union containing it.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_drift_core::{union_of, ScalarKind, TypeNode};
    ///
    /// let nullable = union_of(vec![TypeNode::scalar(ScalarKind::Int), TypeNode::missing()]);
    /// assert!(nullable.includes_missing());
    /// assert!(!TypeNode::scalar(ScalarKind::Int).includes_missing());
    /// ```
    pub fn includes_missing(&self) -> bool {
        match self {
            Self::Scalar(ScalarKind::Missing) => true,
            Self::Union(members) => members.iter().any(TypeNode::is_missing),
            _ => false,
        }
    }

    /// Returns the node with any `missing` union members removed.
    ///
    /// A bare `missing` scalar is returned unchanged: absence with no other
    /// observed type has no more specific core to expose.
    pub fn without_missing(&self) -> TypeNode {
        match self {
            Self::Union(members) => {
                let kept: Vec<TypeNode> = members
                    .iter()
                    .filter(|member| !member.is_missing())
                    .cloned()
                    .collect();
                match kept.len() {
                    0 => self.clone(),
                    1 => kept.into_iter().next().expect("len checked"),
                    _ => Self::Union(kept),
                }
            }
            other => other.clone(),
        }
    }

    /// Canonical textual form: the equality/ordering key.
    ///
    /// Scalars render as their kind name, arrays as `[elem]`, objects as
    /// `{k: v, ...}` with keys sorted, unions as `union(a|b|...)` with
    /// members sorted lexicographically and deduplicated. The form is
    /// stable and deterministic so it can serve as a cross-parser
    /// comparison key.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_drift_core::{union_of, ScalarKind, TypeNode};
    ///
    /// let u = union_of(vec![
    ///     TypeNode::scalar(ScalarKind::Str),
    ///     TypeNode::scalar(ScalarKind::Int),
    /// ]);
    /// assert_eq!(u.canonical_form(), "union(int|str)");
    /// ```
    pub fn canonical_form(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Array(element) => format!("[{}]", element.canonical_form()),
            Self::Object(fields) => {
                let mut rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {}", ty.canonical_form()))
                    .collect();
                rendered.sort();
                format!("{{{}}}", rendered.join(", "))
            }
            Self::Union(members) => {
                let mut rendered: Vec<String> =
                    members.iter().map(TypeNode::canonical_form).collect();
                rendered.sort();
                rendered.dedup();
                format!("union({})", rendered.join("|"))
            }
        }
    }

    /// Display form: like [`canonical_form`](Self::canonical_form) but with
    /// object fields in insertion order.
    pub fn display_form(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Array(element) => format!("[{}]", element.display_form()),
            Self::Object(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {}", ty.display_form()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Self::Union(members) => {
                let mut rendered: Vec<String> =
                    members.iter().map(TypeNode::display_form).collect();
                rendered.sort();
                rendered.dedup();
                format!("union({})", rendered.join("|"))
            }
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_form())
    }
}

impl PartialEq for TypeNode {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_form() == other.canonical_form()
    }
}

impl Eq for TypeNode {}

impl PartialOrd for TypeNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical_form().cmp(&other.canonical_form())
    }
}

impl std::hash::Hash for TypeNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_form().hash(state);
    }
}

/// Universal output contract of every dialect parser.
///
/// `root` is always a [`TypeNode::Object`] at top level; `required` is the
/// set of dotted paths that are mandatory (non-nullable) at the object
/// level; `label` names the source (table, message, or model name).
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use schema_drift_core::{ParsedSchema, ScalarKind, TypeNode};
///
/// let schema = ParsedSchema::new(
///     TypeNode::object([("id", TypeNode::scalar(ScalarKind::Int))]),
///     BTreeSet::from(["id".to_string()]),
///     "users",
/// );
/// assert_eq!(schema.label, "users");
/// assert!(schema.required.contains("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSchema {
    /// The canonical type tree; always an object at top level.
    pub root: TypeNode,
    /// Dotted paths required (non-nullable) at the object level.
    pub required: BTreeSet<String>,
    /// Source name: table, message, model, or a fixed dialect label.
    pub label: String,
}

impl ParsedSchema {
    /// Creates a parsed schema from its parts.
    pub fn new(root: TypeNode, required: BTreeSet<String>, label: impl Into<String>) -> Self {
        Self {
            root,
            required,
            label: label.into(),
        }
    }

    /// Returns the schema with its tree normalized.
    pub fn normalized(&self) -> Self {
        Self {
            root: crate::normalize(&self.root),
            required: self.required.clone(),
            label: self.label.clone(),
        }
    }

    /// Returns the normalized tree with presence injected from `required`:
    /// the comparison-ready form consumed by the diff engine.
    pub fn comparison_tree(&self) -> TypeNode {
        crate::inject_presence(&crate::normalize(&self.root), &self.required)
    }
}

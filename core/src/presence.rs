//! Presence injection and extraction.
//!
//! A presence set records which dotted paths are mandatory at the object
//! level. Reference schemas (SQL DDL, Protobuf) declare presence explicitly;
//! data-derived schemas encode optionality through `union(T|missing)`.
//! [`inject_presence`] rewrites a reference tree so the two styles become
//! directly comparable; [`required_from_tree`] recovers a presence set from
//! a data-derived tree.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::paths::join_path;
use crate::{union, TypeNode};

/// Rewrites every field whose path is not in `required` to `union(T|missing)`.
///
/// Wrapping happens at the field level only: array element types are never
/// wrapped (optionality of an array field wraps the whole array type, not
/// its element), though object fields *inside* an array element are still
/// visited under the holding field's path. Idempotent: a field already
/// unioned with `missing` is unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use schema_drift_core::{inject_presence, ScalarKind, TypeNode};
///
/// let tree = TypeNode::object([
///     ("id", TypeNode::scalar(ScalarKind::Int)),
///     ("name", TypeNode::scalar(ScalarKind::Str)),
/// ]);
/// let required = BTreeSet::from(["id".to_string()]);
///
/// let injected = inject_presence(&tree, &required);
/// assert_eq!(
///     injected.canonical_form(),
///     "{id: int, name: union(missing|str)}"
/// );
/// // Idempotent.
/// assert_eq!(inject_presence(&injected, &required), injected);
/// ```
pub fn inject_presence(tree: &TypeNode, required: &BTreeSet<String>) -> TypeNode {
    match tree {
        TypeNode::Object(fields) => TypeNode::Object(inject_fields(fields, "", required)),
        other => other.clone(),
    }
}

fn inject_fields(
    fields: &IndexMap<String, TypeNode>,
    prefix: &str,
    required: &BTreeSet<String>,
) -> IndexMap<String, TypeNode> {
    let mut out = IndexMap::new();
    for (name, ty) in fields {
        let path = join_path(prefix, name);
        let inner = descend(ty, &path, required);
        let wrapped = if required.contains(&path) {
            inner
        } else {
            union(&inner, &TypeNode::missing())
        };
        out.insert(name.clone(), wrapped);
    }
    out
}

fn descend(ty: &TypeNode, path: &str, required: &BTreeSet<String>) -> TypeNode {
    match ty {
        TypeNode::Object(fields) => TypeNode::Object(inject_fields(fields, path, required)),
        TypeNode::Array(element) => TypeNode::array(descend(element, path, required)),
        TypeNode::Union(members) => crate::union_of(
            members
                .iter()
                .map(|member| descend(member, path, required))
                .collect(),
        ),
        TypeNode::Scalar(_) => ty.clone(),
    }
}

/// Derives the presence set naturally encoded in a data-derived tree: the
/// paths whose type was never unioned with `missing`.
///
/// This is the inverse convention to [`inject_presence`]: a field observed
/// in every sample has no `missing` member and is therefore required.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{required_from_tree, union_of, ScalarKind, TypeNode};
///
/// let tree = TypeNode::object([
///     ("id", TypeNode::scalar(ScalarKind::Int)),
///     (
///         "name",
///         union_of(vec![TypeNode::scalar(ScalarKind::Str), TypeNode::missing()]),
///     ),
/// ]);
///
/// let required = required_from_tree(&tree);
/// assert!(required.contains("id"));
/// assert!(!required.contains("name"));
/// ```
pub fn required_from_tree(tree: &TypeNode) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_required(tree, "", &mut out);
    out
}

fn collect_required(node: &TypeNode, prefix: &str, out: &mut BTreeSet<String>) {
    if let TypeNode::Object(fields) = node {
        for (name, ty) in fields {
            let path = join_path(prefix, name);
            if !ty.includes_missing() {
                out.insert(path.clone());
            }
            collect_required_value(ty, &path, out);
        }
    }
}

fn collect_required_value(node: &TypeNode, path: &str, out: &mut BTreeSet<String>) {
    match node {
        TypeNode::Object(_) => collect_required(node, path, out),
        TypeNode::Array(element) => collect_required_value(element, path, out),
        TypeNode::Union(members) => {
            for member in members {
                collect_required_value(member, path, out);
            }
        }
        TypeNode::Scalar(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all_paths, ScalarKind};

    fn sample_tree() -> TypeNode {
        TypeNode::object([
            ("id", TypeNode::scalar(ScalarKind::Int)),
            (
                "user",
                TypeNode::object([("email", TypeNode::scalar(ScalarKind::Str))]),
            ),
            (
                "tags",
                TypeNode::array(TypeNode::scalar(ScalarKind::Str)),
            ),
        ])
    }

    #[test]
    fn test_inject_with_all_paths_required_is_noop() {
        let tree = sample_tree();
        let required = all_paths(&tree);
        assert_eq!(inject_presence(&tree, &required), tree);
    }

    #[test]
    fn test_inject_with_empty_required_wraps_every_leaf() {
        let tree = sample_tree();
        let injected = inject_presence(&tree, &BTreeSet::new());
        assert_eq!(
            injected.canonical_form(),
            "{id: union(int|missing), tags: union([str]|missing), \
             user: union(missing|{email: union(missing|str)})}"
        );
    }

    #[test]
    fn test_array_element_type_is_never_wrapped() {
        let tree = TypeNode::object([(
            "tags",
            TypeNode::array(TypeNode::scalar(ScalarKind::Str)),
        )]);

        let injected = inject_presence(&tree, &BTreeSet::new());
        // The whole array is optional; the element stays a bare `str`.
        assert_eq!(injected.canonical_form(), "{tags: union([str]|missing)}");
    }

    #[test]
    fn test_fields_inside_array_elements_use_holding_field_path() {
        let tree = TypeNode::object([(
            "items",
            TypeNode::array(TypeNode::object([(
                "x",
                TypeNode::scalar(ScalarKind::Int),
            )])),
        )]);
        let required = BTreeSet::from(["items".to_string(), "items.x".to_string()]);

        assert_eq!(inject_presence(&tree, &required), tree);

        let only_holder = BTreeSet::from(["items".to_string()]);
        let injected = inject_presence(&tree, &only_holder);
        assert_eq!(
            injected.canonical_form(),
            "{items: [{x: union(int|missing)}]}"
        );
    }

    #[test]
    fn test_required_from_tree_roundtrips_injection() {
        let tree = sample_tree();
        let required = BTreeSet::from(["id".to_string(), "user.email".to_string()]);
        let injected = inject_presence(&tree, &required);
        assert_eq!(required_from_tree(&injected), required);
    }
}

//! Dotted field-path helpers.
//!
//! Paths are dot-delimited (`user.address.city`) and never contain
//! array-index segments: an array is referenced by the field that holds it,
//! so fields inside an array-of-object keep the holding field's name as
//! their prefix. Duplicate leaf names under different parents are
//! distinguished only by their full dotted prefix.

use std::collections::BTreeSet;

use crate::TypeNode;

/// Joins a path prefix and a field name.
///
/// # Examples
///
/// ```
/// use schema_drift_core::join_path;
///
/// assert_eq!(join_path("", "id"), "id");
/// assert_eq!(join_path("user.address", "city"), "user.address.city");
/// ```
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Returns the last segment of a dotted path.
///
/// # Examples
///
/// ```
/// use schema_drift_core::leaf_name;
///
/// assert_eq!(leaf_name("user.address.city"), "city");
/// assert_eq!(leaf_name("id"), "id");
/// ```
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Collects every field path in the tree, at any depth.
///
/// Descends through object fields, array elements (without emitting index
/// segments), and union members.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{all_paths, ScalarKind, TypeNode};
///
/// let tree = TypeNode::object([(
///     "items",
///     TypeNode::array(TypeNode::object([("x", TypeNode::scalar(ScalarKind::Int))])),
/// )]);
/// let paths = all_paths(&tree);
/// assert!(paths.contains("items"));
/// assert!(paths.contains("items.x"));
/// ```
pub fn all_paths(tree: &TypeNode) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_object_paths(tree, "", &mut out);
    out
}

fn collect_object_paths(node: &TypeNode, prefix: &str, out: &mut BTreeSet<String>) {
    if let TypeNode::Object(fields) = node {
        for (name, ty) in fields {
            let path = join_path(prefix, name);
            out.insert(path.clone());
            collect_value_paths(ty, &path, out);
        }
    }
}

fn collect_value_paths(node: &TypeNode, path: &str, out: &mut BTreeSet<String>) {
    match node {
        TypeNode::Object(_) => collect_object_paths(node, path, out),
        TypeNode::Array(element) => collect_value_paths(element, path, out),
        TypeNode::Union(members) => {
            for member in members {
                collect_value_paths(member, path, out);
            }
        }
        TypeNode::Scalar(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{union_of, ScalarKind};

    #[test]
    fn test_all_paths_skips_array_indices() {
        let tree = TypeNode::object([(
            "experience",
            TypeNode::array(TypeNode::object([(
                "company_id",
                TypeNode::scalar(ScalarKind::Int),
            )])),
        )]);

        let paths = all_paths(&tree);
        assert_eq!(
            paths.into_iter().collect::<Vec<_>>(),
            vec!["experience".to_string(), "experience.company_id".to_string()]
        );
    }

    #[test]
    fn test_all_paths_descends_union_members() {
        let tree = TypeNode::object([(
            "user",
            union_of(vec![
                TypeNode::object([("email", TypeNode::scalar(ScalarKind::Str))]),
                TypeNode::missing(),
            ]),
        )]);

        let paths = all_paths(&tree);
        assert!(paths.contains("user"));
        assert!(paths.contains("user.email"));
    }

    #[test]
    fn test_leaf_name_of_nested_path() {
        assert_eq!(leaf_name("a.b.c"), "c");
    }
}

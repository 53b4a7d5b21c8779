//! Structural schema diffing and change classification.
//!
//! The diff engine consumes two parsed schemas, prepares each side's
//! comparison tree (normalize + presence injection), and walks both object
//! trees in lockstep. Every difference is classified as a structural
//! add/remove, a true type mismatch, or a presence-only change, and fields
//! that kept their name but moved to a different dotted path are reported
//! as relocations.
//!
//! The engine never fails: any two valid trees produce a report, possibly
//! one where everything differs.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::paths::{all_paths, join_path, leaf_name};
use crate::{ParsedSchema, TypeNode};

/// One path whose type differs between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChange {
    /// Dotted path of the differing field.
    pub path: String,
    /// Canonical form of the left-side type.
    pub left: String,
    /// Canonical form of the right-side type.
    pub right: String,
}

/// A field name present on both sides but at different dotted paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// The shared leaf field name.
    pub name: String,
    /// All dotted paths carrying the name on the left side.
    pub left_paths: Vec<String>,
    /// All dotted paths carrying the name on the right side.
    pub right_paths: Vec<String>,
}

/// Categorized result of comparing two schemas.
///
/// All vectors are deterministically ordered (paths and names sorted), so
/// reports are directly comparable and stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Paths present only in the left schema (subtree roots only).
    pub only_in_left: Vec<String>,
    /// Paths present only in the right schema (subtree roots only).
    pub only_in_right: Vec<String>,
    /// Paths whose types genuinely differ.
    pub type_mismatches: Vec<TypeChange>,
    /// Paths whose types differ only in optionality.
    pub presence_issues: Vec<TypeChange>,
    /// Same-name fields living at different paths on each side.
    pub path_relocations: Vec<Relocation>,
}

impl DiffReport {
    /// Returns `true` when the two schemas compared equal.
    pub fn is_empty(&self) -> bool {
        self.only_in_left.is_empty()
            && self.only_in_right.is_empty()
            && self.type_mismatches.is_empty()
            && self.presence_issues.is_empty()
            && self.path_relocations.is_empty()
    }

    /// Total number of reported changes.
    pub fn change_count(&self) -> usize {
        self.only_in_left.len()
            + self.only_in_right.len()
            + self.type_mismatches.len()
            + self.presence_issues.len()
            + self.path_relocations.len()
    }

    fn sort(&mut self) {
        self.only_in_left.sort();
        self.only_in_right.sort();
        self.type_mismatches.sort_by(|a, b| a.path.cmp(&b.path));
        self.presence_issues.sort_by(|a, b| a.path.cmp(&b.path));
        self.path_relocations.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// Compares two parsed schemas and classifies every difference.
///
/// Both sides are normalized and have their presence sets injected before
/// comparison, so a reference schema's declared `NOT NULL` columns line up
/// against a data-derived schema's natural `union(T|missing)` encoding.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use schema_drift_core::{diff, ParsedSchema, ScalarKind, TypeNode};
///
/// let left = ParsedSchema::new(
///     TypeNode::object([("id", TypeNode::scalar(ScalarKind::Int))]),
///     BTreeSet::from(["id".to_string()]),
///     "left",
/// );
/// let right = ParsedSchema::new(
///     TypeNode::object([("id", TypeNode::scalar(ScalarKind::Str))]),
///     BTreeSet::from(["id".to_string()]),
///     "right",
/// );
///
/// let report = diff(&left, &right);
/// assert_eq!(report.type_mismatches.len(), 1);
/// assert_eq!(report.type_mismatches[0].path, "id");
/// ```
pub fn diff(left: &ParsedSchema, right: &ParsedSchema) -> DiffReport {
    let left_tree = left.comparison_tree();
    let right_tree = right.comparison_tree();

    let mut report = DiffReport::default();
    diff_roots(&left_tree, &right_tree, &mut report);
    detect_relocations(&left_tree, &right_tree, &mut report);
    report.sort();
    debug!(
        left = %left.label,
        right = %right.label,
        changes = report.change_count(),
        "diffed schemas"
    );
    report
}

fn diff_roots(left: &TypeNode, right: &TypeNode, report: &mut DiffReport) {
    match (left, right) {
        (TypeNode::Object(left_fields), TypeNode::Object(right_fields)) => {
            diff_fields(left_fields, right_fields, "", report);
        }
        _ => {
            // Non-object roots violate the parser contract but must still
            // produce a report rather than an error.
            if left != right {
                report.type_mismatches.push(TypeChange {
                    path: String::new(),
                    left: left.canonical_form(),
                    right: right.canonical_form(),
                });
            }
        }
    }
}

fn diff_fields(
    left: &IndexMap<String, TypeNode>,
    right: &IndexMap<String, TypeNode>,
    prefix: &str,
    report: &mut DiffReport,
) {
    for (name, left_ty) in left {
        let path = join_path(prefix, name);
        match right.get(name) {
            Some(right_ty) => diff_types(left_ty, right_ty, &path, report),
            None => report.only_in_left.push(path),
        }
    }
    for name in right.keys() {
        if !left.contains_key(name) {
            report.only_in_right.push(join_path(prefix, name));
        }
    }
}

fn diff_types(left: &TypeNode, right: &TypeNode, path: &str, report: &mut DiffReport) {
    if left == right {
        return;
    }

    let left_core = left.without_missing();
    let right_core = right.without_missing();

    if loosely_equal(&left_core, &right_core) {
        if left.includes_missing() != right.includes_missing() {
            report.presence_issues.push(TypeChange {
                path: path.to_string(),
                left: left.canonical_form(),
                right: right.canonical_form(),
            });
        }
        return;
    }

    match (&left_core, &right_core) {
        (TypeNode::Object(left_fields), TypeNode::Object(right_fields)) => {
            diff_fields(left_fields, right_fields, path, report);
        }
        (TypeNode::Array(left_elem), TypeNode::Array(right_elem)) => {
            match (left_elem.as_ref(), right_elem.as_ref()) {
                (TypeNode::Object(left_fields), TypeNode::Object(right_fields)) => {
                    // Array fields keep the holding field's path; no index
                    // segments are emitted.
                    diff_fields(left_fields, right_fields, path, report);
                }
                _ => report.type_mismatches.push(TypeChange {
                    path: path.to_string(),
                    left: left.canonical_form(),
                    right: right.canonical_form(),
                }),
            }
        }
        _ => report.type_mismatches.push(TypeChange {
            path: path.to_string(),
            left: left.canonical_form(),
            right: right.canonical_form(),
        }),
    }
}

/// Loose type equivalence used before reporting a mismatch: `any` matches
/// everything, and the opaque `object` scalar matches any object shape
/// (an unexploded SQL `STRUCT` lines up against a structurally-observed
/// object). Applied element-wise through arrays.
fn loosely_equal(left: &TypeNode, right: &TypeNode) -> bool {
    if left == right || left.is_any() || right.is_any() {
        return true;
    }
    match (left, right) {
        (TypeNode::Scalar(crate::ScalarKind::Object), TypeNode::Object(_))
        | (TypeNode::Object(_), TypeNode::Scalar(crate::ScalarKind::Object)) => true,
        (TypeNode::Array(left_elem), TypeNode::Array(right_elem)) => {
            loosely_equal(left_elem, right_elem)
        }
        _ => false,
    }
}

fn detect_relocations(left: &TypeNode, right: &TypeNode, report: &mut DiffReport) {
    let left_paths = all_paths(left);
    let right_paths = all_paths(right);

    let mut by_name: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for path in &left_paths {
        by_name
            .entry(leaf_name(path))
            .or_default()
            .0
            .insert(path.as_str());
    }
    for path in &right_paths {
        by_name
            .entry(leaf_name(path))
            .or_default()
            .1
            .insert(path.as_str());
    }

    for (name, (left_set, right_set)) in by_name {
        if left_set.is_empty() || right_set.is_empty() || left_set == right_set {
            continue;
        }
        let moved_out = left_set.difference(&right_set).next().is_some();
        let moved_in = right_set.difference(&left_set).next().is_some();
        // A pure add or remove is not a relocation; the name must have
        // vanished from one path and appeared at another.
        if moved_out && moved_in {
            report.path_relocations.push(Relocation {
                name: name.to_string(),
                left_paths: left_set.iter().map(|p| p.to_string()).collect(),
                right_paths: right_set.iter().map(|p| p.to_string()).collect(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all_paths, union_of, ScalarKind};

    fn schema(root: TypeNode, label: &str) -> ParsedSchema {
        let required = all_paths(&root);
        ParsedSchema::new(root, required, label)
    }

    fn int() -> TypeNode {
        TypeNode::scalar(ScalarKind::Int)
    }

    fn str_ty() -> TypeNode {
        TypeNode::scalar(ScalarKind::Str)
    }

    #[test]
    fn test_equal_schemas_produce_empty_report() {
        let tree = TypeNode::object([("id", int()), ("name", str_ty())]);
        let report = diff(&schema(tree.clone(), "a"), &schema(tree, "b"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_structural_adds_and_removes() {
        let left = schema(TypeNode::object([("a", int()), ("b", str_ty())]), "left");
        let right = schema(TypeNode::object([("a", int()), ("c", int())]), "right");

        let report = diff(&left, &right);
        assert_eq!(report.only_in_left, vec!["b"]);
        assert_eq!(report.only_in_right, vec!["c"]);
        assert!(report.type_mismatches.is_empty());
    }

    #[test]
    fn test_type_mismatch_reports_canonical_forms() {
        let left = schema(TypeNode::object([("a", int())]), "left");
        let right = schema(TypeNode::object([("a", str_ty())]), "right");

        let report = diff(&left, &right);
        assert_eq!(report.type_mismatches.len(), 1);
        let change = &report.type_mismatches[0];
        assert_eq!(change.path, "a");
        assert_eq!(change.left, "int");
        assert_eq!(change.right, "str");
    }

    #[test]
    fn test_presence_only_change_is_not_a_type_mismatch() {
        let tree = TypeNode::object([("id", int()), ("name", str_ty())]);
        let strict = ParsedSchema::new(tree.clone(), all_paths(&tree), "strict");
        let loose = ParsedSchema::new(
            tree,
            std::collections::BTreeSet::from(["id".to_string()]),
            "loose",
        );

        let report = diff(&strict, &loose);
        assert!(report.type_mismatches.is_empty());
        assert_eq!(report.presence_issues.len(), 1);
        let issue = &report.presence_issues[0];
        assert_eq!(issue.path, "name");
        assert_eq!(issue.left, "str");
        assert_eq!(issue.right, "union(missing|str)");
    }

    #[test]
    fn test_diff_symmetry_on_relabeling() {
        let left = schema(
            TypeNode::object([("a", int()), ("b", str_ty()), ("x", int())]),
            "left",
        );
        let right = schema(TypeNode::object([("a", str_ty()), ("c", int())]), "right");

        let forward = diff(&left, &right);
        let backward = diff(&right, &left);
        assert_eq!(forward.only_in_left, backward.only_in_right);
        assert_eq!(forward.only_in_right, backward.only_in_left);
    }

    #[test]
    fn test_relocation_detection() {
        let left = schema(
            TypeNode::object([("company_id", int()), ("name", str_ty())]),
            "left",
        );
        let right = schema(
            TypeNode::object([
                ("name", str_ty()),
                (
                    "experience",
                    TypeNode::array(TypeNode::object([("company_id", int())])),
                ),
            ]),
            "right",
        );

        let report = diff(&left, &right);
        assert_eq!(report.path_relocations.len(), 1);
        let relocation = &report.path_relocations[0];
        assert_eq!(relocation.name, "company_id");
        assert_eq!(relocation.left_paths, vec!["company_id"]);
        assert_eq!(relocation.right_paths, vec!["experience.company_id"]);
        // A relocated field is never a type mismatch.
        assert!(report.type_mismatches.is_empty());
    }

    #[test]
    fn test_nested_fields_diff_under_dotted_paths() {
        let left = schema(
            TypeNode::object([(
                "user",
                TypeNode::object([("email", str_ty()), ("age", int())]),
            )]),
            "left",
        );
        let right = schema(
            TypeNode::object([(
                "user",
                TypeNode::object([("email", str_ty()), ("age", str_ty())]),
            )]),
            "right",
        );

        let report = diff(&left, &right);
        assert_eq!(report.type_mismatches.len(), 1);
        assert_eq!(report.type_mismatches[0].path, "user.age");
    }

    #[test]
    fn test_array_of_object_fields_diff_without_index_segments() {
        let left = schema(
            TypeNode::object([(
                "items",
                TypeNode::array(TypeNode::object([("x", int())])),
            )]),
            "left",
        );
        let right = schema(
            TypeNode::object([(
                "items",
                TypeNode::array(TypeNode::object([("x", str_ty()), ("y", int())])),
            )]),
            "right",
        );

        let report = diff(&left, &right);
        assert_eq!(report.type_mismatches.len(), 1);
        assert_eq!(report.type_mismatches[0].path, "items.x");
        assert_eq!(report.only_in_right, vec!["items.y"]);
    }

    #[test]
    fn test_engine_never_fails_on_dissimilar_trees() {
        let left = schema(
            TypeNode::object([("a", TypeNode::object([("b", int())]))]),
            "left",
        );
        let right = schema(
            TypeNode::object([("a", TypeNode::array(str_ty()))]),
            "right",
        );

        let report = diff(&left, &right);
        assert_eq!(report.type_mismatches.len(), 1);
        assert_eq!(report.type_mismatches[0].path, "a");
    }

    #[test]
    fn test_any_matches_every_type() {
        let left = schema(TypeNode::object([("v", TypeNode::any())]), "left");
        let right = schema(TypeNode::object([("v", TypeNode::array(int()))]), "right");
        assert!(diff(&left, &right).is_empty());
    }

    #[test]
    fn test_opaque_object_matches_structural_object() {
        let left = schema(TypeNode::object([("meta", TypeNode::opaque())]), "left");
        let right = schema(
            TypeNode::object([("meta", TypeNode::object([("k", str_ty())]))]),
            "right",
        );

        let report = diff(&left, &right);
        assert!(report.type_mismatches.is_empty(), "{:?}", report.type_mismatches);
    }

    #[test]
    fn test_mixed_union_difference_is_a_type_mismatch() {
        let left = schema(
            TypeNode::object([("v", union_of(vec![int(), str_ty()]))]),
            "left",
        );
        let right = schema(TypeNode::object([("v", int())]), "right");

        let report = diff(&left, &right);
        assert_eq!(report.type_mismatches.len(), 1);
        assert_eq!(report.type_mismatches[0].left, "union(int|str)");
        assert_eq!(report.type_mismatches[0].right, "int");
    }
}

//! Tree normalization and the union algebra.
//!
//! [`normalize`] canonicalizes a type tree so structurally-equal schemas
//! compare equal; [`union`] merges two trees observed from different
//! samples or sources. The union operation is commutative and associative,
//! which is what makes parallel or order-independent sample folding sound.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{ScalarKind, TypeNode};

/// Canonicalizes a type tree.
///
/// Recursively collapses empty-container sentinels (an object with no
/// fields becomes the opaque `object` scalar; the unknown-element array
/// stays the generic `[any]`), flattens and sorts unions, deduplicates
/// members, and drops `any` from any union that still has a more specific
/// member. Idempotent: normalizing twice is the same as normalizing once.
///
/// Never fails; partial or degenerate input degrades toward `any`.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{normalize, TypeNode};
///
/// let raw = TypeNode::object([("meta", TypeNode::empty_object())]);
/// let tree = normalize(&raw);
/// assert_eq!(tree.canonical_form(), "{meta: object}");
/// assert_eq!(normalize(&tree), tree);
/// ```
pub fn normalize(node: &TypeNode) -> TypeNode {
    match node {
        TypeNode::Scalar(kind) => TypeNode::Scalar(*kind),
        TypeNode::Array(element) => TypeNode::array(normalize(element)),
        TypeNode::Object(fields) => {
            if fields.is_empty() {
                TypeNode::opaque()
            } else {
                TypeNode::Object(
                    fields
                        .iter()
                        .map(|(name, ty)| (name.clone(), normalize(ty)))
                        .collect(),
                )
            }
        }
        TypeNode::Union(members) => union_of(members.iter().map(normalize).collect()),
    }
}

/// Merges two type trees observed for the same position.
///
/// Commutative and associative. Identical nodes return themselves; distinct
/// scalars form a union; objects merge key-wise with a key absent on either
/// side treated as `missing` (so the merged field becomes `union(T|missing)`);
/// arrays merge element shapes, with a populated element shape always
/// winning over the unknown sentinel. Mismatched kinds fall back to a union
/// of both sides, with object-shaped sides degraded to the opaque `object`
/// scalar name.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{union, ScalarKind, TypeNode};
///
/// let a = TypeNode::object([("a", TypeNode::scalar(ScalarKind::Int))]);
/// let b = TypeNode::object([("a", TypeNode::scalar(ScalarKind::Str))]);
/// assert_eq!(union(&a, &b).canonical_form(), "{a: union(int|str)}");
/// ```
pub fn union(a: &TypeNode, b: &TypeNode) -> TypeNode {
    if a == b {
        return a.clone();
    }
    union_of(vec![a.clone(), b.clone()])
}

/// Builds a canonical union from arbitrary members.
///
/// Flattens nested unions, coalesces object members key-wise and array
/// members element-wise, deduplicates by canonical form, drops `any` when a
/// more specific member remains, and sorts members lexicographically. An
/// empty member list yields `any`; a single surviving member is returned
/// unwrapped. The result depends only on the flattened member multiset,
/// which is what makes [`union`] associative.
///
/// # Examples
///
/// ```
/// use schema_drift_core::{union_of, ScalarKind, TypeNode};
///
/// let members = vec![
///     TypeNode::scalar(ScalarKind::Any),
///     TypeNode::scalar(ScalarKind::Int),
/// ];
/// assert_eq!(union_of(members).canonical_form(), "int");
/// ```
pub fn union_of(members: Vec<TypeNode>) -> TypeNode {
    let mut flat = Vec::new();
    flatten_into(members, &mut flat);

    let mut object_acc: Option<IndexMap<String, TypeNode>> = None;
    let mut array_acc: Option<TypeNode> = None;
    let mut scalars: Vec<TypeNode> = Vec::new();

    for member in flat {
        match member {
            TypeNode::Object(fields) => {
                object_acc = Some(match object_acc.take() {
                    Some(acc) => object_union(&acc, &fields),
                    None => fields,
                });
            }
            TypeNode::Array(element) => {
                array_acc = Some(match array_acc.take() {
                    Some(acc) => array_union(&acc, &element),
                    None => *element,
                });
            }
            other => scalars.push(other),
        }
    }

    // An object member keeps its structure only alongside `missing`/`any`;
    // any other co-member degrades it to the opaque `object` scalar name.
    let mixed_with_object = array_acc.is_some()
        || scalars.iter().any(|member| {
            !matches!(
                member,
                TypeNode::Scalar(ScalarKind::Missing) | TypeNode::Scalar(ScalarKind::Any)
            )
        });

    let mut rest = scalars;
    if let Some(fields) = object_acc {
        if mixed_with_object {
            rest.push(TypeNode::opaque());
        } else {
            rest.push(TypeNode::Object(fields));
        }
    }
    if let Some(element) = array_acc {
        rest.push(TypeNode::array(element));
    }

    let mut seen = BTreeSet::new();
    let mut unique: Vec<TypeNode> = Vec::new();
    for member in rest {
        if seen.insert(member.canonical_form()) {
            unique.push(member);
        }
    }

    // `missing` does not count as "more specific": `union(any|missing)`
    // keeps its `any`, otherwise an optional unknown-typed field would
    // collapse to bare absence.
    if unique
        .iter()
        .any(|member| !member.is_any() && !member.is_missing())
    {
        unique.retain(|member| !member.is_any());
    }
    unique.sort();

    match unique.len() {
        0 => TypeNode::any(),
        1 => unique.into_iter().next().expect("len checked"),
        _ => TypeNode::Union(unique),
    }
}

fn flatten_into(members: Vec<TypeNode>, out: &mut Vec<TypeNode>) {
    for member in members {
        match member {
            TypeNode::Union(inner) => flatten_into(inner, out),
            other => out.push(other),
        }
    }
}

fn object_union(
    left: &IndexMap<String, TypeNode>,
    right: &IndexMap<String, TypeNode>,
) -> IndexMap<String, TypeNode> {
    let mut fields: IndexMap<String, TypeNode> = IndexMap::new();

    for (name, left_ty) in left {
        let merged = match right.get(name) {
            Some(right_ty) => union(left_ty, right_ty),
            None => union(left_ty, &TypeNode::missing()),
        };
        fields.insert(name.clone(), merged);
    }

    for (name, right_ty) in right {
        if !left.contains_key(name) {
            fields.insert(name.clone(), union(right_ty, &TypeNode::missing()));
        }
    }

    fields
}

fn array_union(left: &TypeNode, right: &TypeNode) -> TypeNode {
    // A populated element shape always wins over the unknown sentinel.
    if left.is_any() {
        return right.clone();
    }
    if right.is_any() {
        return left.clone();
    }
    union(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeNode {
        TypeNode::scalar(ScalarKind::Int)
    }

    fn str_ty() -> TypeNode {
        TypeNode::scalar(ScalarKind::Str)
    }

    fn bool_ty() -> TypeNode {
        TypeNode::scalar(ScalarKind::Bool)
    }

    fn sample_trees() -> Vec<TypeNode> {
        vec![
            int(),
            str_ty(),
            bool_ty(),
            TypeNode::missing(),
            TypeNode::any(),
            TypeNode::opaque(),
            TypeNode::object([("a", int())]),
            TypeNode::object([("b", str_ty())]),
            TypeNode::array(int()),
            TypeNode::unknown_array(),
            union_of(vec![int(), TypeNode::missing()]),
        ]
    }

    #[test]
    fn test_union_is_commutative() {
        let samples = sample_trees();
        for a in &samples {
            for b in &samples {
                assert_eq!(union(a, b), union(b, a), "union({a}, {b}) not commutative");
            }
        }
    }

    #[test]
    fn test_union_is_associative() {
        let samples = sample_trees();
        for a in &samples {
            for b in &samples {
                for c in &samples {
                    assert_eq!(
                        union(&union(a, b), c),
                        union(a, &union(b, c)),
                        "union not associative over ({a}, {b}, {c})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_union_of_identical_nodes_is_identity() {
        let obj = TypeNode::object([("a", int())]);
        assert_eq!(union(&obj, &obj), obj);
    }

    #[test]
    fn test_object_union_marks_absent_keys_missing() {
        let left = TypeNode::object([("a", int()), ("b", str_ty())]);
        let right = TypeNode::object([("a", int())]);

        let merged = union(&left, &right);
        assert_eq!(merged.canonical_form(), "{a: int, b: union(missing|str)}");
    }

    #[test]
    fn test_populated_array_shape_wins_over_unknown() {
        let populated = TypeNode::array(int());
        let unknown = TypeNode::unknown_array();

        assert_eq!(union(&populated, &unknown), populated);
        assert_eq!(union(&unknown, &populated), populated);
    }

    #[test]
    fn test_mismatched_kinds_degrade_object_to_scalar_name() {
        let obj = TypeNode::object([("a", int())]);
        let merged = union(&obj, &int());
        assert_eq!(merged.canonical_form(), "union(int|object)");
    }

    #[test]
    fn test_missing_does_not_degrade_object_side() {
        let obj = TypeNode::object([("a", int())]);
        let merged = union(&obj, &TypeNode::missing());
        assert_eq!(merged.canonical_form(), "union(missing|{a: int})");
    }

    #[test]
    fn test_any_is_dropped_when_more_specific_member_exists() {
        assert_eq!(union(&TypeNode::any(), &int()), int());
        assert_eq!(
            union_of(vec![TypeNode::any(), int(), str_ty()]).canonical_form(),
            "union(int|str)"
        );
    }

    #[test]
    fn test_any_survives_union_with_missing_alone() {
        // An optional unknown-typed field must not collapse to bare absence.
        let merged = union(&TypeNode::any(), &TypeNode::missing());
        assert_eq!(merged.canonical_form(), "union(any|missing)");

        assert_eq!(
            union_of(vec![int(), TypeNode::any(), TypeNode::missing()]).canonical_form(),
            "union(int|missing)"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let messy = TypeNode::object([
            ("u", TypeNode::Union(vec![str_ty(), int(), TypeNode::any()])),
            ("e", TypeNode::empty_object()),
            ("arr", TypeNode::array(TypeNode::Union(vec![TypeNode::any()]))),
        ]);

        let once = normalize(&messy);
        let twice = normalize(&once);
        assert_eq!(once, twice);
        assert_eq!(
            once.canonical_form(),
            "{arr: [any], e: object, u: union(int|str)}"
        );
    }

    #[test]
    fn test_normalize_collapses_empty_object_to_opaque() {
        assert_eq!(normalize(&TypeNode::empty_object()), TypeNode::opaque());
    }

    #[test]
    fn test_union_coalesces_object_members_across_unions() {
        let nullable_obj = union(&TypeNode::object([("x", int())]), &TypeNode::missing());
        let merged = union(&nullable_obj, &TypeNode::object([("y", str_ty())]));
        assert_eq!(
            merged.canonical_form(),
            "union(missing|{x: union(int|missing), y: union(missing|str)})"
        );
    }
}

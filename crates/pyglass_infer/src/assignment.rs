//! Target typing for tuple-unpacking assignments.
//!
//! Given `a, (b, c) = expr` and the tuple type of `expr`, finds the element
//! type that lands on a particular target. The pattern tree is a light
//! stand-in for the host's expression nodes: targets, nested tuples, and
//! parenthesized groups.

use pyglass_types::{ExprId, TupleType, TypeKind};

/// One node of an unpacking target pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPattern {
    /// A plain assignment target.
    Target(ExprId),
    /// A nested tuple of targets.
    Tuple(Vec<TargetPattern>),
    /// A parenthesized group around a single node.
    Parenthesized(Box<TargetPattern>),
}

/// Type assigned to `target` when `assigned` is unpacked over `pattern`.
///
/// Arity must agree unless the assigned tuple is homogeneous. Nested tuple
/// patterns recurse into tuple-typed elements; anything else resolves to
/// `None`.
pub fn target_type_from_tuple_assignment(
    target: ExprId,
    pattern: &[TargetPattern],
    assigned: &TupleType,
) -> Option<TypeKind> {
    let arity_matches = assigned.is_homogeneous() || assigned.fixed_len() == Some(pattern.len());
    if !arity_matches {
        return None;
    }

    if let Some(index) = pattern
        .iter()
        .position(|node| matches!(node, TargetPattern::Target(id) if *id == target))
    {
        return assigned.element(index).cloned();
    }

    for (index, node) in pattern.iter().enumerate() {
        let mut node = node;
        while let TargetPattern::Parenthesized(inner) = node {
            node = inner;
        }
        if let TargetPattern::Tuple(inner_pattern) = node {
            if let Some(TypeKind::Tuple(inner_tuple)) = assigned.element(index) {
                if let Some(found) =
                    target_type_from_tuple_assignment(target, inner_pattern, inner_tuple)
                {
                    return Some(found);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyglass_types::ClassId;

    fn tuple_class() -> ClassId {
        ClassId::new(0)
    }

    fn instance(raw: u32) -> TypeKind {
        TypeKind::class_instance(ClassId::new(raw))
    }

    #[test]
    fn direct_target_takes_its_position() {
        let a = ExprId::new(1);
        let b = ExprId::new(2);
        let pattern = vec![TargetPattern::Target(a), TargetPattern::Target(b)];
        let assigned = TupleType::fixed(tuple_class(), vec![instance(10), instance(11)]);

        assert_eq!(
            target_type_from_tuple_assignment(b, &pattern, &assigned),
            Some(instance(11))
        );
    }

    #[test]
    fn arity_mismatch_yields_nothing() {
        let a = ExprId::new(1);
        let pattern = vec![TargetPattern::Target(a)];
        let assigned = TupleType::fixed(tuple_class(), vec![instance(10), instance(11)]);

        assert_eq!(target_type_from_tuple_assignment(a, &pattern, &assigned), None);
    }

    #[test]
    fn homogeneous_tuple_ignores_arity() {
        let a = ExprId::new(1);
        let b = ExprId::new(2);
        let c = ExprId::new(3);
        let pattern = vec![
            TargetPattern::Target(a),
            TargetPattern::Target(b),
            TargetPattern::Target(c),
        ];
        let assigned = TupleType::homogeneous(tuple_class(), instance(10));

        assert_eq!(
            target_type_from_tuple_assignment(c, &pattern, &assigned),
            Some(instance(10))
        );
    }

    #[test]
    fn nested_pattern_recurses_into_tuple_elements() {
        let a = ExprId::new(1);
        let b = ExprId::new(2);
        let c = ExprId::new(3);
        let inner = TypeKind::Tuple(TupleType::fixed(
            tuple_class(),
            vec![instance(20), instance(21)],
        ));
        let assigned = TupleType::fixed(tuple_class(), vec![instance(10), inner]);
        let pattern = vec![
            TargetPattern::Target(a),
            TargetPattern::Parenthesized(Box::new(TargetPattern::Tuple(vec![
                TargetPattern::Target(b),
                TargetPattern::Target(c),
            ]))),
        ];

        assert_eq!(
            target_type_from_tuple_assignment(c, &pattern, &assigned),
            Some(instance(21))
        );
    }

    #[test]
    fn absent_target_yields_nothing() {
        let a = ExprId::new(1);
        let missing = ExprId::new(9);
        let pattern = vec![TargetPattern::Target(a)];
        let assigned = TupleType::fixed(tuple_class(), vec![instance(10)]);

        assert_eq!(
            target_type_from_tuple_assignment(missing, &pattern, &assigned),
            None
        );
    }
}

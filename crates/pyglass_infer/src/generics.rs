//! Generic-variable collection and the substitution map.
//!
//! [`Substitutions`] is insertion-ordered: seeding order from the receiver
//! is observable through snapshots and keeps unification deterministic.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use pyglass_types::{TypeKind, TypeVarType};

use crate::environment::{callable_signature, MatchContext};

/// Accumulated bindings from generic variables to concrete types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
    map: IndexMap<TypeVarType, TypeKind>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, var: &TypeVarType) -> Option<&TypeKind> {
        self.map.get(var)
    }

    pub fn contains(&self, var: &TypeVarType) -> bool {
        self.map.contains_key(var)
    }

    pub fn insert(&mut self, var: TypeVarType, ty: TypeKind) -> Option<TypeKind> {
        self.map.insert(var, ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVarType, &TypeKind)> {
        self.map.iter()
    }
}

/// Depth-first walk gathering the free generic variables of a type.
///
/// `visited` de-duplicates subtrees: the type tree is an owned value graph,
/// so structural equality is the cycle guard here. Deferred function types
/// are expanded through the evaluation context.
pub fn collect_generics(
    ty: &TypeKind,
    ctx: &MatchContext<'_>,
    collected: &mut IndexSet<TypeVarType>,
    visited: &mut HashSet<TypeKind>,
) {
    if !visited.insert(ty.clone()) {
        return;
    }
    match ty {
        TypeKind::TypeVar(var) => {
            collected.insert(var.clone());
        }
        TypeKind::Union(union) => {
            for member in union.members() {
                collect_generics(member, ctx, collected, visited);
            }
        }
        TypeKind::Tuple(tuple) => {
            if tuple.is_homogeneous() {
                if let Some(element) = tuple.element(0) {
                    collect_generics(element, ctx, collected, visited);
                }
            } else {
                for element in tuple.fixed_elements() {
                    collect_generics(element, ctx, collected, visited);
                }
            }
        }
        TypeKind::Collection(collection) => {
            for element in collection.element_types() {
                collect_generics(element, ctx, collected, visited);
            }
        }
        TypeKind::Callable(_) | TypeKind::Function(_) => {
            if let Some(signature) = callable_signature(ty, ctx.eval) {
                if let Some(params) = &signature.params {
                    for param in params {
                        collect_generics(&param.ty, ctx, collected, visited);
                    }
                }
                collect_generics(&signature.ret, ctx, collected, visited);
            }
        }
        TypeKind::Unknown | TypeKind::Class(_) | TypeKind::Structural(_) => {}
    }
}

/// Whether any generic variable occurs inside the type.
pub fn has_generics(ty: &TypeKind, ctx: &MatchContext<'_>) -> bool {
    let mut collected = IndexSet::new();
    collect_generics(ty, ctx, &mut collected, &mut HashSet::new());
    !collected.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SimpleEvalContext;
    use pyglass_types::{
        CallableParam, CallableSignature, CallableType, ClassId, CollectionType, FunctionId,
        SimpleClassRegistry, TupleType,
    };

    fn var(name: &str) -> TypeVarType {
        TypeVarType::new(name)
    }

    #[test]
    fn collects_variables_across_shapes_in_order() {
        let registry = SimpleClassRegistry::with_builtins();
        let eval = SimpleEvalContext::new();
        let ctx = MatchContext::new(&registry, &eval);

        let list = ClassId::new(0);
        let ty = TypeKind::union(vec![
            TypeKind::Collection(CollectionType::new(
                list,
                vec![TypeKind::TypeVar(var("T"))],
            )),
            TypeKind::Tuple(TupleType::fixed(
                list,
                vec![TypeKind::TypeVar(var("U")), TypeKind::TypeVar(var("T"))],
            )),
        ]);

        let mut collected = IndexSet::new();
        collect_generics(&ty, &ctx, &mut collected, &mut HashSet::new());
        let names: Vec<&str> = collected.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["T", "U"]);
    }

    #[test]
    fn walks_callable_parameters_and_return() {
        let registry = SimpleClassRegistry::with_builtins();
        let eval = SimpleEvalContext::new();
        let ctx = MatchContext::new(&registry, &eval);

        let callable = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::new("x", TypeKind::TypeVar(var("T")))]),
            TypeKind::TypeVar(var("R")),
        ));
        assert!(has_generics(&callable, &ctx));
    }

    #[test]
    fn expands_deferred_functions_through_the_context() {
        let registry = SimpleClassRegistry::with_builtins();
        let mut eval = SimpleEvalContext::new();
        let function = FunctionId::new(1);
        eval.set_function_signature(
            function,
            CallableSignature::new(None, TypeKind::TypeVar(var("T"))),
        );
        let ctx = MatchContext::new(&registry, &eval);

        assert!(has_generics(&TypeKind::Function(function), &ctx));
    }

    #[test]
    fn concrete_types_carry_no_generics() {
        let registry = SimpleClassRegistry::with_builtins();
        let eval = SimpleEvalContext::new();
        let ctx = MatchContext::new(&registry, &eval);

        let int = TypeKind::class_instance(ClassId::new(0));
        assert!(!has_generics(&int, &ctx));
        assert!(!has_generics(&TypeKind::Unknown, &ctx));
    }
}

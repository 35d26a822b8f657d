//! Application of a substitution map over a type tree.
//!
//! Substitution only reads the map; it never records new bindings. Types
//! without generic variables are returned untouched, everything else is
//! rebuilt fresh. Variables resolve with a dual-form fallback (a binding
//! recorded for the class form serves the instance form and vice versa) and
//! chained variable bindings are chased behind a visited-set guard, so a
//! cyclic map terminates instead of recursing forever.

use std::collections::HashSet;

use pyglass_types::{
    CallableParam, CallableType, CollectionType, TupleType, TypeKind, TypeVarType,
};

use crate::environment::{callable_signature, MatchContext};
use crate::generics::{has_generics, Substitutions};

/// Rewrites `ty` under `substitutions`.
pub fn substitute(
    ty: &TypeKind,
    substitutions: &Substitutions,
    ctx: &MatchContext<'_>,
) -> TypeKind {
    if !has_generics(ty, ctx) {
        return ty.clone();
    }
    match ty {
        TypeKind::TypeVar(var) => substitute_type_var(var, substitutions),
        TypeKind::Union(union) => {
            let members = union
                .members()
                .iter()
                .map(|member| substitute(member, substitutions, ctx))
                .collect();
            TypeKind::union(members)
        }
        TypeKind::Collection(collection) => {
            let elements = collection
                .element_types()
                .iter()
                .map(|element| substitute(element, substitutions, ctx))
                .collect();
            let mut fresh = CollectionType::new(collection.class, elements);
            fresh.definition = collection.definition;
            TypeKind::Collection(fresh)
        }
        TypeKind::Tuple(tuple) => {
            let mut fresh = if tuple.is_homogeneous() {
                let element = tuple.element(0).cloned().unwrap_or_default();
                TupleType::homogeneous(tuple.class, substitute(&element, substitutions, ctx))
            } else {
                let elements = tuple
                    .fixed_elements()
                    .iter()
                    .map(|element| substitute(element, substitutions, ctx))
                    .collect();
                TupleType::fixed(tuple.class, elements)
            };
            fresh.definition = tuple.definition;
            TypeKind::Tuple(fresh)
        }
        TypeKind::Callable(_) | TypeKind::Function(_) => {
            match callable_signature(ty, ctx.eval) {
                Some(signature) => {
                    let params = signature.params.as_ref().map(|params| {
                        params
                            .iter()
                            .map(|param| substitute_param(param, substitutions, ctx))
                            .collect()
                    });
                    let ret = substitute(&signature.ret, substitutions, ctx);
                    let mut fresh = CallableType::new(params, ret);
                    if let TypeKind::Callable(callable) = ty {
                        fresh.callable = callable.callable;
                    }
                    TypeKind::Callable(fresh)
                }
                None => ty.clone(),
            }
        }
        _ => ty.clone(),
    }
}

/// A source-backed parameter is kept as declared; a synthetic one is rebuilt
/// around the substituted type.
fn substitute_param(
    param: &CallableParam,
    substitutions: &Substitutions,
    ctx: &MatchContext<'_>,
) -> CallableParam {
    if param.source.is_some() {
        return param.clone();
    }
    CallableParam {
        ty: substitute(&param.ty, substitutions, ctx),
        ..param.clone()
    }
}

fn substitute_type_var(var: &TypeVarType, substitutions: &Substitutions) -> TypeKind {
    let mut visited: HashSet<TypeVarType> = HashSet::new();
    let mut current = var.clone();
    let mut result = lookup_with_dual_form(&current, substitutions);

    while let Some(TypeKind::TypeVar(next)) = result.clone() {
        if next == current {
            break;
        }
        if !visited.insert(next.clone()) {
            break;
        }
        match lookup_with_dual_form(&next, substitutions) {
            Some(deeper) => {
                current = next;
                result = Some(deeper);
            }
            None => break,
        }
    }

    result.unwrap_or_default()
}

/// Direct lookup, then the dual-form fallback: an instance-form variable may
/// have been bound through its class form, and vice versa. Only instantiable
/// bindings convert between forms.
fn lookup_with_dual_form(var: &TypeVarType, substitutions: &Substitutions) -> Option<TypeKind> {
    if let Some(found) = substitutions.get(var) {
        return Some(found.clone());
    }
    if !var.definition {
        let bound = substitutions.get(&var.to_class_form())?;
        if bound.definition_flag().is_some() {
            return Some(bound.to_instance_form());
        }
        None
    } else {
        let bound = substitutions.get(&var.to_instance_form())?;
        if bound.definition_flag().is_some() {
            return Some(bound.to_class_form());
        }
        None
    }
}

//! The compatibility decision procedure.
//!
//! `match_types` answers whether a value of the actual type can be used
//! where the expected type is required. The decision is a precedence-ordered
//! cascade over the `(expected, actual)` shape pair; earlier rules pre-empt
//! later ones. The matcher never fails: a negative answer must be provable,
//! everything else is admitted.
//!
//! When a substitution map is supplied, encountering a generic variable on
//! the expected side records or checks a binding. On a negative result the
//! map is left in an indeterminate state; callers that need rollback must
//! copy it beforehand.

pub mod numeric;

use pyglass_types::{
    names, BuiltinTypes, ClassId, ClassRegistry, TupleType, TypeKind, UnionType,
};

use crate::environment::{callable_signature, AccessDirection, MatchContext, MemberCandidate};
use crate::generics::Substitutions;
use crate::render::display_type;

/// Compatibility check without substitution tracking. Generic variables on
/// the expected side are only compared by name through the final fallback,
/// exactly as if no unification were in progress.
pub fn match_types(expected: &TypeKind, actual: &TypeKind, ctx: &MatchContext<'_>) -> bool {
    match_impl(expected, actual, ctx, None, true)
}

/// Compatibility check that records generic-variable bindings into
/// `substitutions`.
pub fn match_types_with(
    expected: &TypeKind,
    actual: &TypeKind,
    ctx: &MatchContext<'_>,
    substitutions: &mut Substitutions,
) -> bool {
    match_impl(expected, actual, ctx, Some(substitutions), true)
}

fn match_impl(
    expected: &TypeKind,
    actual: &TypeKind,
    ctx: &MatchContext<'_>,
    mut substitutions: Option<&mut Substitutions>,
    recursive: bool,
) -> bool {
    let builtins = BuiltinTypes::new(ctx.registry);

    // Universal top types: `object` admits everything, `type` admits every
    // class-form type.
    if let TypeKind::Class(class) = expected {
        if !class.definition {
            match ctx.registry.class_name(class.class) {
                Some(names::OBJECT) if Some(class.class) == builtins.class_named(names::OBJECT) => {
                    return true;
                }
                Some(names::TYPE) if Some(class.class) == builtins.class_named(names::TYPE) => {
                    if actual.definition_flag() == Some(true) {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }

    // Class-vs-instance disjointness, unless the expected side is a variable
    // that accepts both forms.
    if let (Some(expected_definition), Some(actual_definition)) =
        (expected.definition_flag(), actual.definition_flag())
    {
        let both_accepting =
            matches!(expected, TypeKind::TypeVar(var) if var.accepts_both_forms());
        if !both_accepting && expected_definition != actual_definition {
            return false;
        }
    }

    // The legacy string root widens to `str | unicode` before matching.
    if let TypeKind::Class(class) = actual {
        if !class.definition
            && ctx.registry.class_name(class.class) == Some(names::BASESTRING)
            && Some(class.class) == builtins.class_named(names::BASESTRING)
        {
            let widened = builtins.str_or_unicode_type();
            return match_impl(expected, &widened, ctx, substitutions, recursive);
        }
    }

    // Generic variable on the expected side: check the bound, then check or
    // record the binding. The `recursive` flag limits re-entry through an
    // existing binding to a single step.
    if let TypeKind::TypeVar(var) = expected {
        if substitutions.is_some() {
            let mut bound = var.bound.as_deref().cloned();
            if var.definition {
                bound = bound.map(|b| {
                    if b.definition_flag().is_some() {
                        b.to_class_form()
                    } else {
                        b
                    }
                });
            }
            let bound_ty = bound.clone().unwrap_or_default();
            if !match_impl(&bound_ty, actual, ctx, substitutions.as_deref_mut(), recursive) {
                return false;
            }
            let existing = substitutions.as_deref().and_then(|s| s.get(var).cloned());
            if let Some(existing) = existing {
                if expected == actual {
                    return true;
                }
                if recursive {
                    return match_impl(&existing, actual, ctx, substitutions, false);
                }
                return false;
            }
            if !matches!(actual, TypeKind::Unknown) {
                if let Some(subs) = substitutions.as_deref_mut() {
                    subs.insert(var.clone(), actual.clone());
                }
            } else if let Some(bound) = bound {
                if let Some(subs) = substitutions.as_deref_mut() {
                    subs.insert(var.clone(), bound);
                }
            }
            return true;
        }
    }

    // Absence of information on either side is admitted.
    if matches!(expected, TypeKind::Unknown) || matches!(actual, TypeKind::Unknown) {
        return true;
    }
    if is_unknown(actual, true) {
        return true;
    }

    // A union on the actual side matches when some member does, after the
    // fixed-tuple widening special case.
    if let TypeKind::Union(actual_union) = actual {
        if let TypeKind::Tuple(expected_tuple) = expected {
            if let Some(arity) = expected_tuple.fixed_len() {
                if consists_of_same_arity_tuples(actual_union, arity) {
                    return match_positions_against_union(
                        expected_tuple,
                        arity,
                        actual_union,
                        ctx,
                        substitutions.as_deref_mut(),
                        recursive,
                    );
                }
            }
        }
        for member in actual_union.members() {
            if match_impl(expected, member, ctx, substitutions.as_deref_mut(), recursive) {
                return true;
            }
        }
        return false;
    }

    // A union on the expected side matches when some member admits the
    // actual type. Concrete members are tried before generic variables so
    // substitution commits to concrete alternatives first.
    if let TypeKind::Union(expected_union) = expected {
        let concrete = expected_union
            .members()
            .iter()
            .filter(|member| !matches!(member, TypeKind::TypeVar(_)));
        let generic = expected_union
            .members()
            .iter()
            .filter(|member| matches!(member, TypeKind::TypeVar(_)));
        for member in concrete.chain(generic) {
            if match_impl(member, actual, ctx, substitutions.as_deref_mut(), recursive) {
                return true;
            }
        }
        return false;
    }

    // Both sides class-backed.
    if let (Some(expected_class), Some(actual_class)) = (expected.as_class(), actual.as_class()) {
        match (expected, actual) {
            (TypeKind::Tuple(expected_tuple), TypeKind::Tuple(actual_tuple)) => {
                return match_tuples(
                    expected_tuple,
                    actual_tuple,
                    ctx,
                    substitutions,
                    recursive,
                );
            }
            (TypeKind::Collection(expected_collection), TypeKind::Tuple(actual_tuple)) => {
                if !match_classes(expected_class.class, actual_class.class, ctx.registry) {
                    return false;
                }
                let expected_element = expected_collection.iterated_item();
                let actual_element = actual_tuple.iterated_item();
                return match_impl(
                    &expected_element,
                    &actual_element,
                    ctx,
                    substitutions,
                    recursive,
                );
            }
            (TypeKind::Collection(expected_collection), _) => {
                if !match_classes(expected_class.class, actual_class.class, ctx.registry) {
                    return false;
                }
                let actual_elements: &[TypeKind] = match actual {
                    TypeKind::Collection(actual_collection) => actual_collection.element_types(),
                    _ => &[],
                };
                for (index, expected_element) in
                    expected_collection.element_types().iter().enumerate()
                {
                    let actual_element = actual_elements
                        .get(index)
                        .cloned()
                        .unwrap_or_default();
                    if !match_impl(
                        expected_element,
                        &actual_element,
                        ctx,
                        substitutions.as_deref_mut(),
                        recursive,
                    ) {
                        return false;
                    }
                }
                return true;
            }
            _ => {}
        }

        if match_classes(expected_class.class, actual_class.class, ctx.registry) {
            return true;
        }
        if actual_class.definition
            && ctx.registry.class_name(expected_class.class) == Some(names::CALLABLE)
        {
            return true;
        }
        if expected == actual {
            return true;
        }
    }

    // A closure satisfies an expected class named `Callable`.
    if matches!(actual, TypeKind::Function(_)) {
        if let Some(expected_class) = expected.as_class() {
            if ctx.registry.class_name(expected_class.class) == Some(names::CALLABLE) {
                return true;
            }
        }
    }

    // Structural rules.
    if let TypeKind::Structural(actual_structural) = actual {
        if actual_structural.inferred_from_usages {
            return true;
        }
    }
    if let (TypeKind::Structural(expected_structural), TypeKind::Structural(actual_structural)) =
        (expected, actual)
    {
        if expected_structural.inferred_from_usages {
            return true;
        }
        return actual_structural
            .attribute_names()
            .is_superset(expected_structural.attribute_names());
    }
    if let TypeKind::Structural(expected_structural) = expected {
        if let Some(actual_class) = actual.as_class() {
            if overrides_get_attr(actual_class.class, ctx) {
                return true;
            }
            let actual_members = ctx.registry.member_names(actual_class.class, true);
            return expected_structural
                .attribute_names()
                .iter()
                .all(|attribute| actual_members.contains(attribute));
        }
    }
    if let TypeKind::Structural(actual_structural) = actual {
        if let Some(expected_class) = expected.as_class() {
            let expected_members = ctx.registry.member_names(expected_class.class, true);
            return actual_structural
                .attribute_names()
                .iter()
                .all(|attribute| expected_members.contains(attribute));
        }
    }

    // Callable against callable: positional parameters up to the shorter
    // list, then return types. Parameter checking runs in the same matcher
    // direction as everything else; contravariance is not enforced here.
    if callable_flag(expected) && callable_flag(actual) {
        if let (Some(expected_signature), Some(actual_signature)) = (
            callable_signature(expected, ctx.eval),
            callable_signature(actual, ctx.eval),
        ) {
            if let (Some(expected_params), Some(actual_params)) =
                (&expected_signature.params, &actual_signature.params)
            {
                for (expected_param, actual_param) in expected_params.iter().zip(actual_params) {
                    if !match_impl(
                        &expected_param.ty,
                        &actual_param.ty,
                        ctx,
                        substitutions.as_deref_mut(),
                        recursive,
                    ) {
                        return false;
                    }
                }
            }
            if !match_impl(
                &expected_signature.ret,
                &actual_signature.ret,
                ctx,
                substitutions,
                recursive,
            ) {
                return false;
            }
            return true;
        }
    }

    // Numeric promotion over class names; a missing name is admitted.
    numeric::matches_numeric_names(
        fallback_name(expected, ctx.registry).as_deref(),
        fallback_name(actual, ctx.registry).as_deref(),
    )
}

fn callable_flag(ty: &TypeKind) -> bool {
    match ty {
        TypeKind::Callable(callable) => callable.callable,
        TypeKind::Function(_) => true,
        _ => false,
    }
}

fn consists_of_same_arity_tuples(union: &UnionType, arity: usize) -> bool {
    union.members().iter().all(|member| match member {
        TypeKind::Tuple(tuple) => tuple.fixed_len().map_or(true, |len| len == arity),
        _ => false,
    })
}

/// Retries a fixed-tuple match against a union of tuples by widening every
/// expected position to the union of the member types at that position.
fn match_positions_against_union(
    expected: &TupleType,
    arity: usize,
    actual: &UnionType,
    ctx: &MatchContext<'_>,
    mut substitutions: Option<&mut Substitutions>,
    recursive: bool,
) -> bool {
    for index in 0..arity {
        let position_types = actual
            .members()
            .iter()
            .filter_map(|member| match member {
                TypeKind::Tuple(tuple) => tuple.element(index).cloned(),
                _ => None,
            })
            .collect();
        let widened = TypeKind::union(position_types);
        let expected_element = expected.element(index).cloned().unwrap_or_default();
        if !match_impl(
            &expected_element,
            &widened,
            ctx,
            substitutions.as_deref_mut(),
            recursive,
        ) {
            return false;
        }
    }
    true
}

fn match_tuples(
    expected: &TupleType,
    actual: &TupleType,
    ctx: &MatchContext<'_>,
    mut substitutions: Option<&mut Substitutions>,
    recursive: bool,
) -> bool {
    match (expected.fixed_len(), actual.fixed_len()) {
        (Some(expected_len), Some(actual_len)) => {
            if expected_len != actual_len {
                return false;
            }
            for index in 0..expected_len {
                let expected_element = expected.element(index).cloned().unwrap_or_default();
                let actual_element = actual.element(index).cloned().unwrap_or_default();
                if !match_impl(
                    &expected_element,
                    &actual_element,
                    ctx,
                    substitutions.as_deref_mut(),
                    recursive,
                ) {
                    return false;
                }
            }
            true
        }
        (None, Some(actual_len)) => {
            let expected_element = expected.iterated_item();
            for index in 0..actual_len {
                let actual_element = actual.element(index).cloned().unwrap_or_default();
                if !match_impl(
                    &expected_element,
                    &actual_element,
                    ctx,
                    substitutions.as_deref_mut(),
                    recursive,
                ) {
                    return false;
                }
            }
            true
        }
        (Some(_), None) => false,
        (None, None) => {
            let expected_element = expected.iterated_item();
            let actual_element = actual.iterated_item();
            match_impl(
                &expected_element,
                &actual_element,
                ctx,
                substitutions,
                recursive,
            )
        }
    }
}

/// Nominal class admittance: unresolved descriptors, nominal and ABC
/// subclassing, the legacy str-under-unicode rule, unresolved ancestors,
/// and name equality across otherwise-unrelated descriptors.
pub fn match_classes(expected: ClassId, actual: ClassId, registry: &dyn ClassRegistry) -> bool {
    let expected_name = registry.class_name(expected);
    let actual_name = registry.class_name(actual);
    if expected_name.is_none() || actual_name.is_none() {
        return true;
    }
    if registry.is_subclass_of(actual, expected) {
        return true;
    }
    if registry.is_abc_subclass_of(actual, expected) {
        return true;
    }
    if actual_name == Some(names::STR) && expected_name == Some(names::UNICODE) {
        return true;
    }
    if registry.has_unresolved_ancestors(actual) {
        return true;
    }
    expected_name == actual_name
}

/// Whether a type conveys no usable information. With
/// `generics_are_unknown`, unbound generic variables count as unknown; a
/// union is unknown when any member is.
pub fn is_unknown(ty: &TypeKind, generics_are_unknown: bool) -> bool {
    match ty {
        TypeKind::Unknown => true,
        TypeKind::TypeVar(_) => generics_are_unknown,
        TypeKind::Union(union) => union
            .members()
            .iter()
            .any(|member| is_unknown(member, generics_are_unknown)),
        _ => false,
    }
}

/// Tri-state callability: `None` means undecidable. For unions the members
/// are scanned in order; an undecidable member wins over a later callable
/// one.
pub fn is_callable(ty: &TypeKind) -> Option<bool> {
    match ty {
        TypeKind::Unknown => None,
        TypeKind::Union(union) => {
            for member in union.members() {
                if is_callable(member)? {
                    return Some(true);
                }
            }
            Some(false)
        }
        TypeKind::Callable(callable) => Some(callable.callable),
        TypeKind::Function(_) => Some(true),
        TypeKind::Structural(structural) if structural.inferred_from_usages => Some(true),
        _ => Some(false),
    }
}

/// Strips the synthesized-absence members from a weak union; every other
/// type passes through unchanged.
pub fn to_non_weak(ty: &TypeKind, registry: &dyn ClassRegistry) -> TypeKind {
    if let TypeKind::Union(union) = ty {
        if union.is_weak() {
            return union.retain(|member| {
                if matches!(member, TypeKind::Unknown) {
                    return false;
                }
                !matches!(
                    member.as_class(),
                    Some(view) if registry.class_name(view.class) == Some(names::NONE_TYPE)
                )
            });
        }
    }
    ty.clone()
}

/// Whether the class customizes attribute access: `__getattr__` always
/// counts, `__getattribute__` only when it is not the builtin definition.
pub fn overrides_get_attr(class: ClassId, ctx: &MatchContext<'_>) -> bool {
    if resolve_class_member(class, names::GETATTR, ctx).is_some() {
        return true;
    }
    match resolve_class_member(class, names::GETATTRIBUTE, ctx) {
        Some(candidate) => {
            let builtin = candidate.builtin
                || candidate
                    .class
                    .is_some_and(|declaring| {
                        ctx.registry.is_builtin_member(declaring, names::GETATTRIBUTE)
                    });
            !builtin
        }
        None => false,
    }
}

fn resolve_class_member(
    class: ClassId,
    name: &str,
    ctx: &MatchContext<'_>,
) -> Option<MemberCandidate> {
    let class_type = ctx.eval.class_type_of(class);
    if matches!(class_type, TypeKind::Unknown) {
        return None;
    }
    ctx.eval
        .resolve_member(&class_type, name, AccessDirection::Read)
        .into_iter()
        .next()
}

/// Name used by the numeric fallback. Callables render their signature so
/// that two different shapes never collide on an absent name.
fn fallback_name(ty: &TypeKind, registry: &dyn ClassRegistry) -> Option<String> {
    match ty {
        TypeKind::TypeVar(var) => Some(var.name.clone()),
        TypeKind::Structural(structural) => structural.name.clone(),
        TypeKind::Callable(_) | TypeKind::Function(_) => Some(display_type(ty, registry)),
        _ => ty
            .as_class()
            .and_then(|view| registry.class_name(view.class))
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SimpleEvalContext;
    use pyglass_types::{
        CallableParam, CallableType, ClassType, CollectionType, FunctionId, SimpleClassRegistry,
        StructuralType, TypeVarType,
    };

    struct Fixture {
        registry: SimpleClassRegistry,
        eval: SimpleEvalContext,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: SimpleClassRegistry::with_builtins(),
                eval: SimpleEvalContext::new(),
            }
        }

        fn ctx(&self) -> MatchContext<'_> {
            MatchContext::new(&self.registry, &self.eval)
        }

        fn class(&self, name: &str) -> ClassId {
            self.registry.class_by_name(name).expect(name)
        }

        fn instance(&self, name: &str) -> TypeKind {
            TypeKind::class_instance(self.class(name))
        }
    }

    #[test]
    fn object_admits_everything() {
        let fixture = Fixture::new();
        let object = fixture.instance(names::OBJECT);
        assert!(match_types(&object, &fixture.instance(names::STR), &fixture.ctx()));
        assert!(match_types(&object, &TypeKind::Unknown, &fixture.ctx()));
        assert!(match_types(
            &object,
            &TypeKind::class_definition(fixture.class(names::INT)),
            &fixture.ctx(),
        ));
    }

    #[test]
    fn type_admits_only_class_forms() {
        let fixture = Fixture::new();
        let type_type = fixture.instance(names::TYPE);
        let int_definition = TypeKind::class_definition(fixture.class(names::INT));
        assert!(match_types(&type_type, &int_definition, &fixture.ctx()));
        assert!(!match_types(&type_type, &fixture.instance(names::STR), &fixture.ctx()));
    }

    #[test]
    fn class_and_instance_forms_are_disjoint() {
        let fixture = Fixture::new();
        let int_instance = fixture.instance(names::INT);
        let int_definition = TypeKind::class_definition(fixture.class(names::INT));
        assert!(!match_types(&int_instance, &int_definition, &fixture.ctx()));
        assert!(!match_types(&int_definition, &int_instance, &fixture.ctx()));
    }

    #[test]
    fn both_accepting_variable_crosses_the_form_gap() {
        let fixture = Fixture::new();
        let var = TypeKind::TypeVar(TypeVarType::new("T"));
        let int_definition = TypeKind::class_definition(fixture.class(names::INT));
        let mut substitutions = Substitutions::new();
        assert!(match_types_with(
            &var,
            &int_definition,
            &fixture.ctx(),
            &mut substitutions,
        ));
        assert_eq!(
            substitutions.get(&TypeVarType::new("T")),
            Some(&int_definition)
        );
    }

    #[test]
    fn basestring_widens_to_the_string_family() {
        let fixture = Fixture::new();
        let basestring = fixture.instance(names::BASESTRING);
        assert!(match_types(&fixture.instance(names::STR), &basestring, &fixture.ctx()));
        assert!(match_types(&fixture.instance(names::UNICODE), &basestring, &fixture.ctx()));
        assert!(!match_types(&fixture.instance(names::INT), &basestring, &fixture.ctx()));
    }

    #[test]
    fn nominal_subclass_is_admitted() {
        let fixture = Fixture::new();
        assert!(match_types(
            &fixture.instance(names::INT),
            &fixture.instance(names::BOOL),
            &fixture.ctx(),
        ));
        assert!(!match_types(
            &fixture.instance(names::BOOL),
            &fixture.instance(names::STR),
            &fixture.ctx(),
        ));
    }

    #[test]
    fn match_classes_covers_the_admittance_ladder() {
        let mut registry = SimpleClassRegistry::with_builtins();
        let object = registry.class_by_name(names::OBJECT).expect("object");
        let abc = registry.define_with_bases("Sized", &[object]);
        let list = registry.class_by_name(names::LIST).expect("list");
        registry.register_abc(abc, list);

        let orphan = registry.define("Orphan");
        registry.mark_unresolved_ancestors(orphan);
        let duplicate = registry.define("list");

        assert!(match_classes(abc, list, &registry), "ABC registration");
        assert!(match_classes(object, orphan, &registry), "unresolved ancestors");
        assert!(match_classes(list, duplicate, &registry), "name equality");
        assert!(
            match_classes(list, ClassId::new(9_999), &registry),
            "unresolved descriptor"
        );
        let unicode = registry.class_by_name(names::UNICODE).expect("unicode");
        let str_class = registry.class_by_name(names::STR).expect("str");
        assert!(match_classes(unicode, str_class, &registry), "legacy str under unicode");
        assert!(!match_classes(str_class, unicode, &registry));
    }

    #[test]
    fn union_on_the_actual_side_needs_one_member() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let union = TypeKind::union(vec![fixture.instance(names::STR), fixture.instance(names::BOOL)]);
        assert!(match_types(&int, &union, &fixture.ctx()));

        let no_fit = TypeKind::union(vec![fixture.instance(names::STR), fixture.instance(names::LIST)]);
        assert!(!match_types(&int, &no_fit, &fixture.ctx()));
    }

    #[test]
    fn union_on_the_expected_side_tries_concrete_members_first() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let expected = TypeKind::union(vec![
            TypeKind::TypeVar(TypeVarType::new("T")),
            int.clone(),
        ]);
        let mut substitutions = Substitutions::new();
        assert!(match_types_with(&expected, &int, &fixture.ctx(), &mut substitutions));
        assert!(
            substitutions.is_empty(),
            "the concrete alternative should win before the variable binds"
        );
    }

    #[test]
    fn tuple_widening_retries_against_positional_unions() {
        let fixture = Fixture::new();
        let tuple_class = fixture.class(names::TUPLE);
        let int = fixture.instance(names::INT);
        let s = fixture.instance(names::STR);

        let expected = TypeKind::Tuple(TupleType::fixed(
            tuple_class,
            vec![TypeKind::union(vec![int.clone(), s.clone()]), int.clone()],
        ));
        let actual = TypeKind::union(vec![
            TypeKind::Tuple(TupleType::fixed(tuple_class, vec![int.clone(), int.clone()])),
            TypeKind::Tuple(TupleType::fixed(tuple_class, vec![s.clone(), int.clone()])),
        ]);
        assert!(match_types(&expected, &actual, &fixture.ctx()));

        let mismatched = TypeKind::union(vec![
            TypeKind::Tuple(TupleType::fixed(tuple_class, vec![int])),
            TypeKind::Tuple(TupleType::fixed(tuple_class, vec![s.clone(), s])),
        ]);
        assert!(
            !match_types(&expected, &mismatched, &fixture.ctx()),
            "arity mismatch disables widening and no member fits on its own"
        );
    }

    #[test]
    fn collection_elements_are_padded_with_unknown() {
        let fixture = Fixture::new();
        let list = fixture.class(names::LIST);
        let expected = TypeKind::Collection(CollectionType::new(
            list,
            vec![fixture.instance(names::INT)],
        ));
        let bare = fixture.instance(names::LIST);
        assert!(match_types(&expected, &bare, &fixture.ctx()));
    }

    #[test]
    fn class_definition_satisfies_expected_callable_class() {
        let fixture = Fixture::new();
        let callable_definition = TypeKind::class_definition(fixture.class(names::CALLABLE));
        let int_definition = TypeKind::class_definition(fixture.class(names::INT));
        assert!(match_types(&callable_definition, &int_definition, &fixture.ctx()));
    }

    #[test]
    fn function_satisfies_expected_callable_class() {
        let fixture = Fixture::new();
        let callable_class = fixture.instance(names::CALLABLE);
        let function = TypeKind::Function(FunctionId::new(1));
        assert!(match_types(&callable_class, &function, &fixture.ctx()));
    }

    #[test]
    fn structural_rules_follow_attribute_containment() {
        let mut fixture = Fixture::new();
        let object = fixture.class(names::OBJECT);
        let with_members = fixture.registry.define_with_bases("WithMembers", &[object]);
        fixture.registry.add_member(with_members, "foo");
        fixture.registry.add_member(with_members, "bar");
        fixture.registry.add_member(with_members, "baz");
        let missing = fixture.registry.define_with_bases("MissingBar", &[object]);
        fixture.registry.add_member(missing, "foo");

        let expected = TypeKind::Structural(StructuralType::declared(
            "HasFooBar",
            ["foo".to_string(), "bar".to_string()],
        ));
        assert!(match_types(
            &expected,
            &TypeKind::class_instance(with_members),
            &fixture.ctx(),
        ));
        assert!(!match_types(
            &expected,
            &TypeKind::class_instance(missing),
            &fixture.ctx(),
        ));
    }

    #[test]
    fn get_attr_override_satisfies_any_structural_expectation() {
        let mut fixture = Fixture::new();
        let object = fixture.class(names::OBJECT);
        let dynamic = fixture.registry.define_with_bases("Dynamic", &[object]);
        let dynamic_type = TypeKind::class_definition(dynamic);
        fixture.eval.set_class_type(dynamic, dynamic_type.clone());
        fixture.eval.add_member_resolution(
            dynamic_type,
            names::GETATTR,
            MemberCandidate::new(Some(dynamic), false),
        );

        let expected = TypeKind::Structural(StructuralType::declared(
            "Anything",
            ["whatever".to_string()],
        ));
        assert!(match_types(
            &expected,
            &TypeKind::class_instance(dynamic),
            &fixture.ctx(),
        ));
    }

    #[test]
    fn builtin_getattribute_does_not_count_as_override() {
        let mut fixture = Fixture::new();
        let object = fixture.class(names::OBJECT);
        let plain = fixture.registry.define_with_bases("Plain", &[object]);
        fixture.registry.mark_builtin_member(plain, names::GETATTRIBUTE);
        let plain_type = TypeKind::class_definition(plain);
        fixture.eval.set_class_type(plain, plain_type.clone());
        fixture.eval.add_member_resolution(
            plain_type,
            names::GETATTRIBUTE,
            MemberCandidate::new(Some(plain), true),
        );

        assert!(!overrides_get_attr(plain, &fixture.ctx()));
    }

    #[test]
    fn inferred_structural_actual_is_always_admitted() {
        let fixture = Fixture::new();
        let inferred = TypeKind::Structural(StructuralType::inferred(["foo".to_string()]));
        assert!(match_types(&fixture.instance(names::INT), &inferred, &fixture.ctx()));
    }

    #[test]
    fn declared_structural_pair_compares_attribute_sets() {
        let fixture = Fixture::new();
        let expected = TypeKind::Structural(StructuralType::declared(
            "Small",
            ["foo".to_string()],
        ));
        let actual = TypeKind::Structural(StructuralType::declared(
            "Big",
            ["foo".to_string(), "bar".to_string()],
        ));
        assert!(match_types(&expected, &actual, &fixture.ctx()));
        assert!(!match_types(&actual, &expected, &fixture.ctx()));
    }

    #[test]
    fn callable_parameters_match_covariantly() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let bool_ty = fixture.instance(names::BOOL);
        let s = fixture.instance(names::STR);

        let expected = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::anonymous(int.clone())]),
            s.clone(),
        ));
        let narrower = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::anonymous(bool_ty)]),
            s.clone(),
        ));
        assert!(match_types(&expected, &narrower, &fixture.ctx()));

        let wrong_return = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::anonymous(int.clone())]),
            int,
        ));
        assert!(!match_types(&expected, &wrong_return, &fixture.ctx()));
    }

    #[test]
    fn any_signature_callable_short_circuits_parameters() {
        let fixture = Fixture::new();
        let s = fixture.instance(names::STR);
        let expected = TypeKind::Callable(CallableType::new(None, s.clone()));
        let actual = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::anonymous(fixture.instance(names::INT))]),
            s,
        ));
        assert!(match_types(&expected, &actual, &fixture.ctx()));
    }

    #[test]
    fn not_callable_wrapper_falls_out_of_the_callable_rule() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let bool_ty = fixture.instance(names::BOOL);
        let s = fixture.instance(names::STR);

        let expected = TypeKind::Callable(CallableType::new(
            Some(vec![CallableParam::anonymous(int)]),
            s.clone(),
        ));
        let compatible = CallableType::new(Some(vec![CallableParam::anonymous(bool_ty)]), s);
        assert!(match_types(
            &expected,
            &TypeKind::Callable(compatible.clone()),
            &fixture.ctx(),
        ));
        // The same signature behind a non-callable wrapper skips the
        // callable rule and only name equality remains.
        assert!(!match_types(
            &expected,
            &TypeKind::Callable(compatible.not_callable()),
            &fixture.ctx(),
        ));
    }

    #[test]
    fn type_var_without_substitutions_compares_by_name() {
        let fixture = Fixture::new();
        let var = TypeKind::TypeVar(TypeVarType::new("T"));
        assert!(!match_types(&var, &fixture.instance(names::INT), &fixture.ctx()));
        assert!(match_types(&var, &TypeKind::TypeVar(TypeVarType::new("T")), &fixture.ctx()));
    }

    #[test]
    fn bound_variable_rejects_types_outside_the_bound() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let var = TypeKind::TypeVar(TypeVarType::bounded("N", int.clone()));

        let mut substitutions = Substitutions::new();
        assert!(match_types_with(
            &var,
            &fixture.instance(names::BOOL),
            &fixture.ctx(),
            &mut substitutions,
        ));
        let mut substitutions = Substitutions::new();
        assert!(!match_types_with(
            &var,
            &fixture.instance(names::STR),
            &fixture.ctx(),
            &mut substitutions,
        ));
    }

    #[test]
    fn unknown_actual_binds_the_variable_to_its_bound() {
        let fixture = Fixture::new();
        let int = fixture.instance(names::INT);
        let var = TypeVarType::bounded("N", int.clone());

        let mut substitutions = Substitutions::new();
        assert!(match_types_with(
            &TypeKind::TypeVar(var.clone()),
            &TypeKind::Unknown,
            &fixture.ctx(),
            &mut substitutions,
        ));
        assert_eq!(substitutions.get(&var), Some(&int));
    }

    #[test]
    fn is_unknown_sees_through_unions_and_variables() {
        assert!(is_unknown(&TypeKind::Unknown, true));
        assert!(is_unknown(&TypeKind::TypeVar(TypeVarType::new("T")), true));
        assert!(!is_unknown(&TypeKind::TypeVar(TypeVarType::new("T")), false));

        let registry = SimpleClassRegistry::with_builtins();
        let int = TypeKind::class_instance(registry.class_by_name(names::INT).expect("int"));
        let union = TypeKind::union(vec![int.clone(), TypeKind::TypeVar(TypeVarType::new("T"))]);
        assert!(is_unknown(&union, true));
        assert!(!is_unknown(&int, true));
    }

    #[test]
    fn is_callable_union_scan_respects_member_order() {
        let registry = SimpleClassRegistry::with_builtins();
        let int = TypeKind::class_instance(registry.class_by_name(names::INT).expect("int"));
        let callable = TypeKind::Callable(CallableType::new(None, TypeKind::Unknown));

        assert_eq!(is_callable(&callable), Some(true));
        assert_eq!(is_callable(&int), Some(false));
        assert_eq!(is_callable(&TypeKind::Unknown), None);

        let callable_member = TypeKind::union(vec![TypeKind::Function(FunctionId::new(1)), int.clone()]);
        assert_eq!(is_callable(&callable_member), Some(true));

        let undecidable_member = TypeKind::union(vec![TypeKind::Unknown, callable]);
        assert_eq!(
            is_callable(&undecidable_member),
            None,
            "an undecidable member pre-empts a later callable one"
        );

        let inferred = TypeKind::Structural(StructuralType::inferred(["call".to_string()]));
        assert_eq!(is_callable(&inferred), Some(true));
    }

    #[test]
    fn weak_union_strips_none_type_on_demand() {
        let registry = SimpleClassRegistry::with_builtins();
        let int = TypeKind::class_instance(registry.class_by_name(names::INT).expect("int"));
        let none = TypeKind::class_instance(registry.class_by_name(names::NONE_TYPE).expect("NoneType"));
        let weak = TypeKind::weak_union(vec![int.clone(), none]);

        assert_eq!(to_non_weak(&weak, &registry), int);
        assert_eq!(to_non_weak(&int, &registry), int);
    }

    #[test]
    fn unresolved_class_descriptors_are_admitted() {
        let fixture = Fixture::new();
        let unresolved = ClassType {
            class: ClassId::new(5_000),
            definition: false,
        };
        let expected = TypeKind::Class(unresolved.clone());
        assert!(match_types(&expected, &TypeKind::Class(unresolved), &fixture.ctx()));
        assert!(match_types(&expected, &fixture.instance(names::INT), &fixture.ctx()));
    }
}

use std::time::Instant;

use pyglass_infer::{match_types, match_types_with, substitute, MatchContext, Substitutions};
use pyglass_infer::environment::SimpleEvalContext;
use pyglass_types::{
    names, CollectionType, SimpleClassRegistry, TupleType, TypeKind, TypeVarType,
};

fn nested_list(registry: &SimpleClassRegistry, depth: usize, leaf: TypeKind) -> TypeKind {
    let list = registry.class_by_name(names::LIST).expect("list");
    let mut ty = leaf;
    for _ in 0..depth {
        ty = TypeKind::Collection(CollectionType::new(list, vec![ty]));
    }
    ty
}

fn wide_tuple_union(registry: &SimpleClassRegistry, width: usize) -> (TypeKind, TypeKind) {
    let tuple = registry.class_by_name(names::TUPLE).expect("tuple");
    let int = TypeKind::class_instance(registry.class_by_name(names::INT).expect("int"));
    let bool_ty = TypeKind::class_instance(registry.class_by_name(names::BOOL).expect("bool"));

    let expected = TypeKind::Tuple(TupleType::fixed(tuple, vec![int.clone(); 4]));
    let members = (0..width)
        .map(|index| {
            let mut elements = vec![int.clone(); 4];
            elements[index % 4] = bool_ty.clone();
            TypeKind::Tuple(TupleType::fixed(tuple, elements))
        })
        .collect();
    (expected, TypeKind::union(members))
}

fn run_scenario(label: &str, size: usize, iterations: u32, scenario: impl Fn() -> bool) {
    let start = Instant::now();
    let mut admitted = 0u32;
    for _ in 0..iterations {
        if scenario() {
            admitted += 1;
        }
    }
    let elapsed = start.elapsed();
    println!(
        "{label}: size={size} iterations={iterations} admitted={admitted} elapsed_ms={:.2}",
        elapsed.as_secs_f64() * 1000.0
    );
}

fn main() {
    let registry = SimpleClassRegistry::with_builtins();
    let eval = SimpleEvalContext::new();
    let ctx = MatchContext::new(&registry, &eval);

    let int = TypeKind::class_instance(registry.class_by_name(names::INT).expect("int"));
    let bool_ty = TypeKind::class_instance(registry.class_by_name(names::BOOL).expect("bool"));

    for depth in [4usize, 16, 64] {
        let expected = nested_list(&registry, depth, int.clone());
        let actual = nested_list(&registry, depth, bool_ty.clone());
        run_scenario("deep-collection-match", depth, 1_000, || {
            match_types(&expected, &actual, &ctx)
        });
    }

    for width in [4usize, 32, 128] {
        let (expected, actual) = wide_tuple_union(&registry, width);
        run_scenario("tuple-union-widening", width, 1_000, || {
            match_types(&expected, &actual, &ctx)
        });
    }

    for depth in [4usize, 16, 64] {
        let generic = nested_list(&registry, depth, TypeKind::TypeVar(TypeVarType::new("T")));
        let concrete = nested_list(&registry, depth, int.clone());
        run_scenario("unify-and-substitute", depth, 1_000, || {
            let mut substitutions = Substitutions::new();
            match_types_with(&generic, &concrete, &ctx, &mut substitutions)
                && substitute(&generic, &substitutions, &ctx) == concrete
        });
    }
}

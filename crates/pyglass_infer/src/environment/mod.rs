//! Evaluation-context contract between the engine and its host.
//!
//! The engine never walks an AST or a symbol table itself. Everything it
//! needs from the surrounding program - expression types, class instance
//! types, member resolution, deferred function signatures - is asked through
//! [`TypeEvalContext`]. [`SimpleEvalContext`] is the map-backed default used
//! by hosts with precomputed answers and by the test suites.

use std::collections::HashMap;

use pyglass_types::{
    CallableSignature, ClassId, ClassRegistry, ExprId, FunctionId, TypeKind,
};

use crate::provider::TypeProvider;

/// Direction of a member access during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessDirection {
    #[default]
    Read,
    Write,
}

/// One resolution result for a member lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberCandidate {
    /// Class that declares the member, when known.
    pub class: Option<ClassId>,
    /// Whether the member resolves to its builtin definition rather than a
    /// user override.
    pub builtin: bool,
}

impl MemberCandidate {
    pub fn new(class: Option<ClassId>, builtin: bool) -> Self {
        Self { class, builtin }
    }
}

/// Host-provided answers about the surrounding program.
pub trait TypeEvalContext {
    /// Inferred type of an expression; `Unknown` when unavailable.
    fn type_of(&self, expr: ExprId) -> TypeKind;

    /// Type of the class object itself; `Unknown` when unavailable.
    fn class_type_of(&self, class: ClassId) -> TypeKind;

    /// Resolves a member on a type, best candidates first.
    fn resolve_member(
        &self,
        ty: &TypeKind,
        name: &str,
        direction: AccessDirection,
    ) -> Vec<MemberCandidate>;

    /// Signature of a deferred function type.
    fn function_signature(&self, function: FunctionId) -> Option<CallableSignature>;
}

/// Callable view of a type: explicit callables answer with their own
/// signature, deferred function types through the context. A function the
/// context knows nothing about degrades to "any signature".
pub fn callable_signature(ty: &TypeKind, eval: &dyn TypeEvalContext) -> Option<CallableSignature> {
    match ty {
        TypeKind::Callable(callable) => Some(callable.signature()),
        TypeKind::Function(function) => Some(
            eval.function_signature(*function)
                .unwrap_or_else(|| CallableSignature::new(None, TypeKind::Unknown)),
        ),
        _ => None,
    }
}

/// Everything a single match needs: the class registry, the evaluation
/// context, and the injected type-provider extensions.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub registry: &'a dyn ClassRegistry,
    pub eval: &'a dyn TypeEvalContext,
    pub providers: &'a [Box<dyn TypeProvider>],
}

impl<'a> MatchContext<'a> {
    pub fn new(registry: &'a dyn ClassRegistry, eval: &'a dyn TypeEvalContext) -> Self {
        Self {
            registry,
            eval,
            providers: &[],
        }
    }

    pub fn with_providers(
        registry: &'a dyn ClassRegistry,
        eval: &'a dyn TypeEvalContext,
        providers: &'a [Box<dyn TypeProvider>],
    ) -> Self {
        Self {
            registry,
            eval,
            providers,
        }
    }
}

/// Map-backed evaluation context.
#[derive(Debug, Default)]
pub struct SimpleEvalContext {
    expr_types: HashMap<ExprId, TypeKind>,
    class_types: HashMap<ClassId, TypeKind>,
    functions: HashMap<FunctionId, CallableSignature>,
    members: HashMap<(TypeKind, String), Vec<MemberCandidate>>,
}

impl SimpleEvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_expr_type(&mut self, expr: ExprId, ty: TypeKind) {
        self.expr_types.insert(expr, ty);
    }

    pub fn set_class_type(&mut self, class: ClassId, ty: TypeKind) {
        self.class_types.insert(class, ty);
    }

    pub fn set_function_signature(&mut self, function: FunctionId, signature: CallableSignature) {
        self.functions.insert(function, signature);
    }

    pub fn add_member_resolution(&mut self, ty: TypeKind, name: &str, candidate: MemberCandidate) {
        self.members
            .entry((ty, name.to_string()))
            .or_default()
            .push(candidate);
    }
}

impl TypeEvalContext for SimpleEvalContext {
    fn type_of(&self, expr: ExprId) -> TypeKind {
        self.expr_types.get(&expr).cloned().unwrap_or_default()
    }

    fn class_type_of(&self, class: ClassId) -> TypeKind {
        self.class_types.get(&class).cloned().unwrap_or_default()
    }

    fn resolve_member(
        &self,
        ty: &TypeKind,
        name: &str,
        _direction: AccessDirection,
    ) -> Vec<MemberCandidate> {
        self.members
            .get(&(ty.clone(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn function_signature(&self, function: FunctionId) -> Option<CallableSignature> {
        self.functions.get(&function).cloned()
    }
}

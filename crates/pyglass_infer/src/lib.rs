//! pyglass_infer - type compatibility and generic unification for pyglass.
//!
//! Given an *expected* type (an annotation) and an *actual* type (inferred
//! from an expression), the engine decides whether the actual value can be
//! used where the expected type is required, accumulating generic-variable
//! substitutions along the way. The substitution map can then rewrite
//! callable signatures to produce call-site return types.
//!
//! The engine is synchronous, performs no I/O, and never fails: absence of
//! information is answered optimistically, which is the gradual-typing
//! contract. All mutable state lives in the caller-owned [`Substitutions`].

pub mod assignment;
pub mod calls;
pub mod environment;
pub mod facts;
pub mod generics;
pub mod matcher;
pub mod provider;
pub mod render;
pub mod substitute;

pub use assignment::{target_type_from_tuple_assignment, TargetPattern};
pub use calls::{unify_generic_call, unify_receiver, CallSite};
pub use environment::{
    callable_signature, AccessDirection, MatchContext, MemberCandidate, SimpleEvalContext,
    TypeEvalContext,
};
pub use facts::SubstitutionSnapshot;
pub use generics::{collect_generics, has_generics, Substitutions};
pub use matcher::{
    is_callable, is_unknown, match_classes, match_types, match_types_with, overrides_get_attr,
    to_non_weak,
};
pub use provider::TypeProvider;
pub use render::display_type;
pub use substitute::substitute;

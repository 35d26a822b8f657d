//! Type-provider extension point.
//!
//! Extensions contribute generic knowledge about classes the engine cannot
//! see in annotations, e.g. a stub-derived generic view of a class or an
//! explicit variable-to-type table. Providers are injected as a plain list
//! when the [`MatchContext`](crate::environment::MatchContext) is built;
//! there is no process-global registry, and the order of providers is not
//! significant.

use pyglass_types::{ClassId, TypeKind, TypeVarType};

use crate::environment::TypeEvalContext;

/// Extension queries consulted while seeding receiver substitutions.
pub trait TypeProvider {
    /// Generic view of a class, matched against the receiver type to
    /// discover variable bindings.
    fn generic_type(&self, _class: ClassId, _eval: &dyn TypeEvalContext) -> Option<TypeKind> {
        None
    }

    /// Explicit variable-to-type bindings for a class. Entries for variables
    /// already bound are ignored by the caller.
    fn generic_substitutions(
        &self,
        _class: ClassId,
        _eval: &dyn TypeEvalContext,
    ) -> Vec<(TypeVarType, TypeKind)> {
        Vec::new()
    }
}

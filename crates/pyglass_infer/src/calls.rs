//! Call-site unification: seeding substitutions from the receiver and
//! running every argument through the matcher.
//!
//! The argument-to-parameter mapping arrives already built; this module only
//! drives the matcher over it. Failure is a `None` result - "no compatible
//! overload" - and is distinct from success with unknowns left in the map.

use std::collections::HashSet;

use indexmap::IndexSet;
use pyglass_types::{CallableParam, ClassView, ExprId, TypeKind};
use tracing::debug;

use crate::environment::MatchContext;
use crate::generics::{collect_generics, Substitutions};
use crate::matcher::match_types_with;

/// Seeds a substitution map from a call receiver.
///
/// Every variable occurring in the receiver type is first bound to itself so
/// later matches can discover its concrete binding. Each class alternative
/// of the receiver (unions flattened) is then offered to the registered
/// type providers: a generic view is matched against the receiver type, and
/// explicit binding tables are merged for variables not yet present.
pub fn unify_receiver(receiver: Option<ExprId>, ctx: &MatchContext<'_>) -> Substitutions {
    let mut substitutions = Substitutions::new();
    let receiver_type = receiver
        .map(|expr| ctx.eval.type_of(expr))
        .unwrap_or_default();

    let mut generics = IndexSet::new();
    collect_generics(&receiver_type, ctx, &mut generics, &mut HashSet::new());
    for var in &generics {
        substitutions.insert(var.clone(), TypeKind::TypeVar(var.clone()));
    }

    if !matches!(receiver_type, TypeKind::Unknown) {
        for view in class_alternatives(&receiver_type) {
            for provider in ctx.providers {
                if let Some(generic_view) = provider.generic_type(view.class, ctx.eval) {
                    match_types_with(&generic_view, &receiver_type, ctx, &mut substitutions);
                }
                for (var, binding) in provider.generic_substitutions(view.class, ctx.eval) {
                    if matches!(binding, TypeKind::Unknown) {
                        continue;
                    }
                    if !substitutions.contains(&var) {
                        substitutions.insert(var, binding);
                    }
                }
            }
        }
    }

    substitutions
}

/// Unifies a generic call: receiver seeding, then every argument against
/// its parameter in declaration order. Container parameters (`*args`,
/// `**kwargs`) collect their argument types and are matched once, at the
/// end, against the union of what they collected.
pub fn unify_generic_call(
    receiver: Option<ExprId>,
    arguments: &[(ExprId, CallableParam)],
    ctx: &MatchContext<'_>,
) -> Option<Substitutions> {
    let mut substitutions = unify_receiver(receiver, ctx);

    let mut positional_param: Option<&CallableParam> = None;
    let mut positional_types = Vec::new();
    let mut keyword_param: Option<&CallableParam> = None;
    let mut keyword_types = Vec::new();

    for (index, (argument, parameter)) in arguments.iter().enumerate() {
        let actual = ctx.eval.type_of(*argument);
        if parameter.positional_container {
            positional_param.get_or_insert(parameter);
            positional_types.push(actual);
        } else if parameter.keyword_container {
            keyword_param.get_or_insert(parameter);
            keyword_types.push(actual);
        } else if !match_types_with(&parameter.ty, &actual, ctx, &mut substitutions) {
            debug!("generic call unification failed at argument {index}");
            return None;
        }
    }

    if let Some(parameter) = positional_param {
        let collected = TypeKind::union(positional_types);
        if !match_types_with(&parameter.ty, &collected, ctx, &mut substitutions) {
            debug!("positional container rejected its collected argument types");
            return None;
        }
    }
    if let Some(parameter) = keyword_param {
        let collected = TypeKind::union(keyword_types);
        if !match_types_with(&parameter.ty, &collected, ctx, &mut substitutions) {
            debug!("keyword container rejected its collected argument types");
            return None;
        }
    }

    Some(substitutions)
}

fn class_alternatives(ty: &TypeKind) -> Vec<ClassView> {
    match ty {
        TypeKind::Union(union) => union
            .members()
            .iter()
            .flat_map(class_alternatives)
            .collect(),
        _ => ty.as_class().into_iter().collect(),
    }
}

/// The three call-site shapes the engine distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSite {
    /// A plain call; the receiver is the callee qualifier unless the callee
    /// resolved to a static method. `implicit_parameters` counts the
    /// parameters consumed by the binding itself (e.g. a bound `self`).
    Call {
        qualifier: Option<ExprId>,
        arguments: Vec<ExprId>,
        static_receiver: bool,
        implicit_parameters: usize,
    },
    /// A subscription; the operand is the receiver and the index the only
    /// argument.
    Subscription { operand: ExprId, index: ExprId },
    /// A binary operator; receiver and argument swap when the resolved
    /// operator is a reflected right-hand variant.
    Binary {
        left: ExprId,
        right: ExprId,
        reflected: bool,
    },
}

impl CallSite {
    pub fn receiver(&self) -> Option<ExprId> {
        match self {
            CallSite::Call {
                qualifier,
                static_receiver,
                ..
            } => {
                if *static_receiver {
                    None
                } else {
                    *qualifier
                }
            }
            CallSite::Subscription { operand, .. } => Some(*operand),
            CallSite::Binary {
                left,
                right,
                reflected,
            } => Some(if *reflected { *right } else { *left }),
        }
    }

    pub fn arguments(&self) -> Vec<ExprId> {
        match self {
            CallSite::Call { arguments, .. } => arguments.clone(),
            CallSite::Subscription { index, .. } => vec![*index],
            CallSite::Binary {
                left,
                right,
                reflected,
            } => vec![if *reflected { *left } else { *right }],
        }
    }

    /// Drops the parameters already consumed by the call shape: the implicit
    /// count for plain calls, the receiver slot for subscriptions and
    /// binary operators.
    pub fn explicit_parameters<'p>(&self, parameters: &'p [CallableParam]) -> &'p [CallableParam] {
        let offset = match self {
            CallSite::Call {
                implicit_parameters,
                ..
            } => *implicit_parameters,
            CallSite::Subscription { .. } | CallSite::Binary { .. } => 1,
        };
        &parameters[offset.min(parameters.len())..]
    }
}

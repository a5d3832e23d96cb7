//! `isinstance` guards
//!
//! A condition of the form `isinstance(x, C)` where `x` is a plain variable
//! narrows `x` to `C` inside the guarded branch. The classification also
//! says whether the guard can be decided statically, which lets the checker
//! skip branches that can never run.

use crate::ast::{unwrap_parens, Expr, ExprKind};
use crate::binder::ConditionalTypeBinder;
use crate::symbol::{Symbol, VarRef};
use crate::type_map::TypeMap;
use crate::typeops::{erase_typevars, TypeOracle};
use crate::types::Type;

/// Classes whose instances never overlap with each other
const PRIMITIVE_CLASSES: [&str; 4] = [
    "builtins.int",
    "builtins.float",
    "builtins.str",
    "builtins.bytes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsinstanceKind {
    /// Outcome depends on the runtime value
    Overlapping,
    /// The variable's current type already guarantees the check passes
    AlwaysTrue,
    /// The check can never pass
    AlwaysFalse,
}

#[derive(Debug, Clone)]
pub struct IsinstanceCheck {
    pub var: VarRef,
    /// Type the variable has when the check passes
    pub target: Type,
    pub kind: IsinstanceKind,
}

/// Recognise `isinstance(var, C)` in a condition already inferred into
/// `type_map`
pub fn find_isinstance_check(
    expr: &Expr,
    type_map: &TypeMap,
    binder: &ConditionalTypeBinder,
    oracle: &dyn TypeOracle,
) -> Option<IsinstanceCheck> {
    let ExprKind::Call(call) = &unwrap_parens(expr).kind else {
        return None;
    };
    let ExprKind::Name(callee) = &unwrap_parens(&call.callee).kind else {
        return None;
    };
    if callee.fullname != "builtins.isinstance" || call.args.len() != 2 {
        return None;
    }
    let ExprKind::Name(subject) = &unwrap_parens(&call.args[0]).kind else {
        return None;
    };
    let Symbol::Var(var) = &subject.node else {
        return None;
    };
    let target = isinstance_target(&call.args[1], type_map)?;

    let kind = match binder.get(var) {
        Some(current) if oracle.is_proper_subtype(&current, &target) => IsinstanceKind::AlwaysTrue,
        Some(current) if !is_overlapping_types(&current, &target) => IsinstanceKind::AlwaysFalse,
        _ => IsinstanceKind::Overlapping,
    };
    Some(IsinstanceCheck {
        var: var.clone(),
        target,
        kind,
    })
}

/// Instance type named by the class argument of `isinstance`
fn isinstance_target(expr: &Expr, type_map: &TypeMap) -> Option<Type> {
    let ty = type_map.get(expr.id)?;
    let sig = ty.items().into_iter().next()?;
    if !sig.is_type_obj {
        return None;
    }
    Some(erase_typevars(&sig.ret_type))
}

/// Can a value have both types at once? Only distinct primitive classes are
/// known to be disjoint.
pub fn is_overlapping_types(left: &Type, right: &Type) -> bool {
    match (left, right) {
        (Type::Instance(l), Type::Instance(r)) => {
            l.class == r.class
                || !(PRIMITIVE_CLASSES.contains(&l.name.as_str())
                    && PRIMITIVE_CLASSES.contains(&r.name.as_str()))
        }
        _ => true,
    }
}

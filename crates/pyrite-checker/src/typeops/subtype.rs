//! Subtype, proper subtype and same-type relations

use super::{erase_typevars, NominalOracle, TypeOracle};
use crate::types::{ArgKind, CallableType, InstanceType, Type};

pub(super) fn is_subtype(o: &NominalOracle<'_>, left: &Type, right: &Type) -> bool {
    if left.is_dynamic() || right.is_dynamic() {
        return true;
    }
    match (left, right) {
        (Type::Void, _) => right.is_void(),
        (_, Type::Void) => false,
        (Type::NoneTyp, _) => true,
        (Type::TypeVar(l), Type::TypeVar(r)) if l.id == r.id => true,
        (Type::TypeVar(l), _) => is_subtype(o, &l.upper_bound, right),
        (_, Type::TypeVar(_)) => false,
        (Type::Overloaded(items), _) => items
            .iter()
            .any(|item| is_subtype(o, &Type::Callable(item.clone()), right)),
        (_, Type::Overloaded(items)) => items
            .iter()
            .all(|item| is_subtype(o, left, &Type::Callable(item.clone()))),
        (Type::Callable(l), Type::Callable(r)) => is_callable_subtype(o, l, r),
        (Type::Tuple(l), Type::Tuple(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| is_subtype(o, a, b))
        }
        (Type::Instance(l), Type::Instance(r)) => is_instance_subtype(o, l, r),
        (Type::Tuple(_) | Type::Callable(_), Type::Instance(r)) => o
            .fallback_instance(left)
            .is_some_and(|fallback| is_instance_subtype(o, &fallback, r)),
        _ => false,
    }
}

/// Nominal check with covariant type arguments
fn is_instance_subtype(o: &NominalOracle<'_>, left: &InstanceType, right: &InstanceType) -> bool {
    match o.map_instance_to_supertype(left, right.class) {
        Some(mapped) => mapped
            .args
            .iter()
            .zip(&right.args)
            .all(|(a, b)| is_subtype(o, a, b)),
        None => false,
    }
}

/// Is `left` usable wherever a function of type `right` is expected?
fn is_callable_subtype(o: &NominalOracle<'_>, left: &CallableType, right: &CallableType) -> bool {
    if !left.variables.is_empty() || !right.variables.is_empty() {
        return match (
            erase_typevars(&Type::Callable(left.clone())),
            erase_typevars(&Type::Callable(right.clone())),
        ) {
            (Type::Callable(l), Type::Callable(r)) => is_callable_subtype(o, &l, &r),
            _ => false,
        };
    }
    if right.is_type_obj && !left.is_type_obj {
        return false;
    }
    if !is_subtype(o, &left.ret_type, &right.ret_type) {
        return false;
    }
    if left.min_args() > right.min_args() {
        return false;
    }
    if right.is_var_arg() && !left.is_var_arg() {
        return false;
    }
    if left.max_fixed_args() < right.max_fixed_args() && !left.is_var_arg() {
        return false;
    }

    let left_star = kind_type(left, ArgKind::Star);
    let left_star2 = kind_type(left, ArgKind::Star2);
    let mut position = 0;
    for (i, right_ty) in right.arg_types.iter().enumerate() {
        let left_ty = match right.arg_kinds[i] {
            ArgKind::Pos | ArgKind::Opt => {
                let ty = positional_type(left, position).or(left_star);
                position += 1;
                ty
            }
            ArgKind::Star => left_star,
            ArgKind::Named => named_type(left, right.arg_names[i].as_deref()).or(left_star2),
            ArgKind::Star2 => left_star2,
        };
        match left_ty {
            Some(left_ty) if is_subtype(o, right_ty, left_ty) => {}
            _ => return false,
        }
    }
    true
}

fn positional_type(sig: &CallableType, position: usize) -> Option<&Type> {
    sig.arg_types
        .iter()
        .zip(&sig.arg_kinds)
        .filter(|(_, kind)| matches!(kind, ArgKind::Pos | ArgKind::Opt))
        .nth(position)
        .map(|(ty, _)| ty)
}

fn kind_type(sig: &CallableType, kind: ArgKind) -> Option<&Type> {
    sig.arg_kinds
        .iter()
        .position(|k| *k == kind)
        .map(|i| &sig.arg_types[i])
}

fn named_type<'t>(sig: &'t CallableType, name: Option<&str>) -> Option<&'t Type> {
    let name = name?;
    sig.arg_names
        .iter()
        .position(|n| n.as_deref() == Some(name))
        .map(|i| &sig.arg_types[i])
}

pub(super) fn is_proper_subtype(o: &NominalOracle<'_>, left: &Type, right: &Type) -> bool {
    match (left, right) {
        (Type::Instance(l), Type::Instance(r)) => match o.map_instance_to_supertype(l, r.class) {
            Some(mapped) => mapped
                .args
                .iter()
                .zip(&r.args)
                .all(|(a, b)| is_proper_subtype(o, a, b)),
            None => false,
        },
        (Type::Tuple(l), Type::Tuple(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| is_proper_subtype(o, a, b))
        }
        (Type::Tuple(_), Type::Instance(_)) => o
            .fallback_instance(left)
            .is_some_and(|fallback| is_proper_subtype(o, &Type::Instance(fallback), right)),
        _ => o.is_same_type(left, right),
    }
}

pub(super) fn is_same_type(left: &Type, right: &Type) -> bool {
    match (left, right) {
        (Type::Instance(l), Type::Instance(r)) => {
            l.class == r.class && same_types(&l.args, &r.args)
        }
        (Type::Tuple(l), Type::Tuple(r)) => same_types(l, r),
        (Type::Callable(l), Type::Callable(r)) => is_same_callable(l, r),
        (Type::Overloaded(l), Type::Overloaded(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| is_same_callable(a, b))
        }
        (Type::TypeVar(l), Type::TypeVar(r)) => l.id == r.id,
        (Type::Unbound(l), Type::Unbound(r)) => l == r,
        _ => std::mem::discriminant(left) == std::mem::discriminant(right)
            && matches!(left, Type::Any | Type::Void | Type::NoneTyp | Type::Error),
    }
}

fn same_types(left: &[Type], right: &[Type]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| is_same_type(a, b))
}

fn is_same_callable(left: &CallableType, right: &CallableType) -> bool {
    same_types(&left.arg_types, &right.arg_types)
        && left.arg_kinds == right.arg_kinds
        && is_same_type(&left.ret_type, &right.ret_type)
        && left.is_type_obj == right.is_type_obj
        && left.variables.len() == right.variables.len()
}

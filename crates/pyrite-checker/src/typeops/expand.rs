//! Type variable substitution

use crate::types::{CallableType, InstanceType, Type, TypeVarDef};
use std::collections::HashMap;

/// Type variable id to replacement
pub type TypeVarMap = HashMap<i32, Type>;

/// Rebuild `ty`, replacing every type variable for which `f` returns a type.
/// Substituted variables are dropped from generic signatures.
fn substitute(ty: &Type, f: &dyn Fn(&TypeVarDef) -> Option<Type>) -> Type {
    match ty {
        Type::TypeVar(tv) => f(tv).unwrap_or_else(|| ty.clone()),
        Type::Instance(inst) => Type::Instance(InstanceType {
            class: inst.class,
            name: inst.name.clone(),
            args: inst.args.iter().map(|a| substitute(a, f)).collect(),
        }),
        Type::Tuple(items) => Type::Tuple(items.iter().map(|t| substitute(t, f)).collect()),
        Type::Callable(c) => Type::Callable(substitute_callable(c, f)),
        Type::Overloaded(items) => {
            Type::Overloaded(items.iter().map(|c| substitute_callable(c, f)).collect())
        }
        Type::Any | Type::Void | Type::NoneTyp | Type::Unbound(_) | Type::Error => ty.clone(),
    }
}

fn substitute_callable(c: &CallableType, f: &dyn Fn(&TypeVarDef) -> Option<Type>) -> CallableType {
    CallableType {
        arg_types: c.arg_types.iter().map(|t| substitute(t, f)).collect(),
        arg_kinds: c.arg_kinds.clone(),
        arg_names: c.arg_names.clone(),
        ret_type: Box::new(substitute(&c.ret_type, f)),
        variables: c
            .variables
            .iter()
            .filter(|v| f(v).is_none())
            .cloned()
            .collect(),
        is_type_obj: c.is_type_obj,
        name: c.name.clone(),
        implicit: c.implicit,
    }
}

/// Substitute type variables by id
pub fn expand_type(ty: &Type, map: &TypeVarMap) -> Type {
    if map.is_empty() {
        return ty.clone();
    }
    substitute(ty, &|tv| map.get(&tv.id).cloned())
}

/// Substitute class type variables with the arguments of an instance
pub fn expand_type_by_instance(ty: &Type, instance: &InstanceType) -> Type {
    if instance.args.is_empty() {
        return ty.clone();
    }
    let map: TypeVarMap = instance
        .args
        .iter()
        .enumerate()
        .map(|(i, arg)| (i as i32 + 1, arg.clone()))
        .collect();
    expand_type(ty, &map)
}

/// Replace every type variable with `Any`
pub fn erase_typevars(ty: &Type) -> Type {
    substitute(ty, &|_| Some(Type::Any))
}

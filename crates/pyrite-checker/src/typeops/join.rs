//! Least upper bounds

use super::{NominalOracle, TypeOracle};
use crate::types::{InstanceType, Type};

pub(super) fn join_types(o: &NominalOracle<'_>, s: &Type, t: &Type) -> Type {
    match (s, t) {
        (Type::Error, _) | (_, Type::Error) => return Type::Error,
        (Type::Any | Type::Unbound(_), _) | (_, Type::Any | Type::Unbound(_)) => return Type::Any,
        (Type::Void, Type::Void) => return Type::Void,
        (Type::Void, _) | (_, Type::Void) => return Type::Error,
        (Type::NoneTyp, _) => return t.clone(),
        (_, Type::NoneTyp) => return s.clone(),
        _ => {}
    }
    if o.is_same_type(s, t) {
        return s.clone();
    }
    match (s, t) {
        (Type::TypeVar(a), _) => join_types(o, &a.upper_bound, t),
        (_, Type::TypeVar(b)) => join_types(o, s, &b.upper_bound),
        (Type::Instance(a), Type::Instance(b)) => join_instances(o, a, b),
        (Type::Tuple(a), Type::Tuple(b)) if a.len() == b.len() => {
            Type::Tuple(a.iter().zip(b).map(|(x, y)| join_types(o, x, y)).collect())
        }
        (Type::Callable(_), Type::Callable(_)) if o.is_subtype(s, t) => t.clone(),
        (Type::Callable(_), Type::Callable(_)) if o.is_subtype(t, s) => s.clone(),
        _ => {
            let left = o.fallback_instance(s).or_else(|| s.as_instance().cloned());
            let right = o.fallback_instance(t).or_else(|| t.as_instance().cloned());
            match (left, right) {
                (Some(a), Some(b)) => join_instances(o, &a, &b),
                _ => o.object(),
            }
        }
    }
}

fn join_instances(o: &NominalOracle<'_>, a: &InstanceType, b: &InstanceType) -> Type {
    if a.class == b.class {
        let (sa, sb) = (Type::Instance(a.clone()), Type::Instance(b.clone()));
        if o.is_subtype(&sa, &sb) {
            return sb;
        }
        if o.is_subtype(&sb, &sa) {
            return sa;
        }
        let args: Vec<Type> = a
            .args
            .iter()
            .zip(&b.args)
            .map(|(x, y)| join_types(o, x, y))
            .collect();
        if args.iter().any(|arg| matches!(arg, Type::Error)) {
            return o.object();
        }
        return Type::Instance(InstanceType::new(a.class, a.name.clone(), args));
    }

    let b_info = o.classes.get(b.class);
    for &candidate in &o.classes.get(a.class).mro {
        if !b_info.has_base(candidate) {
            continue;
        }
        return match (
            o.map_instance_to_supertype(a, candidate),
            o.map_instance_to_supertype(b, candidate),
        ) {
            (Some(ma), Some(mb)) => join_instances(o, &ma, &mb),
            _ => o.object(),
        };
    }
    o.object()
}

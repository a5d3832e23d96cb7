//! Calls: argument mapping, arity and argument type checks, overload
//! selection and inference of function type arguments

use super::messages;
use super::{void_source, Operand, TypeChecker};
use crate::ast::CallExpr;
use crate::span::Span;
use crate::typeops::{erase_typevars, expand_type, TypeOracle, TypeVarMap};
use crate::types::{ArgKind, CallableType, Type};
use std::collections::{HashMap, HashSet};

/// For each formal argument, the indices of the actual arguments bound to it
pub(crate) fn map_actuals_to_formals(
    actual_kinds: &[ArgKind],
    actual_names: &[Option<String>],
    callee: &CallableType,
) -> Vec<Vec<usize>> {
    let formal_kinds = &callee.arg_kinds;
    let mut map = vec![Vec::new(); formal_kinds.len()];
    let mut j = 0;
    for (i, kind) in actual_kinds.iter().enumerate() {
        match kind {
            ArgKind::Pos | ArgKind::Opt => match formal_kinds.get(j) {
                Some(ArgKind::Pos | ArgKind::Opt) => {
                    map[j].push(i);
                    j += 1;
                }
                Some(ArgKind::Star) => map[j].push(i),
                _ => {}
            },
            ArgKind::Star => {
                while matches!(formal_kinds.get(j), Some(ArgKind::Pos | ArgKind::Opt)) {
                    map[j].push(i);
                    j += 1;
                }
                if formal_kinds.get(j) == Some(&ArgKind::Star) {
                    map[j].push(i);
                }
            }
            ArgKind::Named => {
                let name = actual_names.get(i).and_then(|n| n.as_deref());
                let by_name = name.and_then(|name| {
                    callee.arg_names.iter().zip(formal_kinds).position(|(n, k)| {
                        n.as_deref() == Some(name) && !matches!(k, ArgKind::Star | ArgKind::Star2)
                    })
                });
                let target =
                    by_name.or_else(|| formal_kinds.iter().position(|k| *k == ArgKind::Star2));
                if let Some(k) = target {
                    map[k].push(i);
                }
            }
            ArgKind::Star2 => {
                for (k, formal) in formal_kinds.iter().enumerate() {
                    let unfilled_keyword = k >= j
                        && matches!(formal, ArgKind::Pos | ArgKind::Opt | ArgKind::Named)
                        && map[k].is_empty();
                    if unfilled_keyword || *formal == ArgKind::Star2 {
                        map[k].push(i);
                    }
                }
            }
        }
    }
    map
}

/// Type of one actual as seen by the formal it is bound to; `*args` and
/// `**kwargs` actuals contribute their item type
fn actual_arg_type(arg_type: &Type, actual_kind: ArgKind) -> Type {
    match (actual_kind, arg_type) {
        (ArgKind::Star, Type::Instance(inst)) if inst.name == "builtins.list" => {
            inst.args.first().cloned().unwrap_or(Type::Any)
        }
        (ArgKind::Star2, Type::Instance(inst)) if inst.name == "builtins.dict" => {
            inst.args.get(1).cloned().unwrap_or(Type::Any)
        }
        (ArgKind::Star | ArgKind::Star2, _) => Type::Any,
        _ => arg_type.clone(),
    }
}

pub(crate) fn has_type_vars(ty: &Type) -> bool {
    match ty {
        Type::TypeVar(_) => true,
        Type::Instance(inst) => inst.args.iter().any(has_type_vars),
        Type::Tuple(items) => items.iter().any(has_type_vars),
        Type::Callable(c) => c.arg_types.iter().any(has_type_vars) || has_type_vars(&c.ret_type),
        Type::Overloaded(items) => items
            .iter()
            .any(|c| c.arg_types.iter().any(has_type_vars) || has_type_vars(&c.ret_type)),
        _ => false,
    }
}

/// Collect lower bounds for type variables of `template` matched against
/// `actual`
fn infer_constraints(
    template: &Type,
    actual: &Type,
    oracle: &dyn TypeOracle,
    out: &mut HashMap<i32, Vec<Type>>,
) {
    match (template, actual) {
        (Type::TypeVar(var), _) => out.entry(var.id).or_default().push(actual.clone()),
        (_, actual) if actual.is_dynamic() => {
            let mut ids = Vec::new();
            collect_type_var_ids(template, &mut ids);
            for id in ids {
                out.entry(id).or_default().push(Type::Any);
            }
        }
        (Type::Instance(t), Type::Instance(a)) => {
            if let Some(mapped) = oracle.map_instance_to_supertype(a, t.class) {
                for (targ, aarg) in t.args.iter().zip(&mapped.args) {
                    infer_constraints(targ, aarg, oracle, out);
                }
            }
        }
        (Type::Tuple(t), Type::Tuple(a)) if t.len() == a.len() => {
            for (titem, aitem) in t.iter().zip(a) {
                infer_constraints(titem, aitem, oracle, out);
            }
        }
        (Type::Callable(t), Type::Callable(a)) => {
            for (targ, aarg) in t.arg_types.iter().zip(&a.arg_types) {
                infer_constraints(targ, aarg, oracle, out);
            }
            infer_constraints(&t.ret_type, &a.ret_type, oracle, out);
        }
        (Type::Callable(_), Type::Overloaded(items)) => {
            if let Some(first) = items.first() {
                infer_constraints(template, &Type::Callable(first.clone()), oracle, out);
            }
        }
        _ => {}
    }
}

fn collect_type_var_ids(ty: &Type, out: &mut Vec<i32>) {
    match ty {
        Type::TypeVar(var) => out.push(var.id),
        Type::Instance(inst) => inst.args.iter().for_each(|a| collect_type_var_ids(a, out)),
        Type::Tuple(items) => items.iter().for_each(|a| collect_type_var_ids(a, out)),
        Type::Callable(c) => {
            c.arg_types.iter().for_each(|a| collect_type_var_ids(a, out));
            collect_type_var_ids(&c.ret_type, out);
        }
        _ => {}
    }
}

impl TypeChecker<'_> {
    pub(crate) fn infer_call(&mut self, call: &CallExpr, span: Span) -> Type {
        let callee = self.accept(&call.callee, None);
        let args: Vec<Operand<'_>> = call.args.iter().map(Operand::Expr).collect();
        self.check_call(&callee, &args, &call.arg_kinds, &call.arg_names, span).0
    }

    /// Type check a call; returns the result type and the callee signature
    /// actually used (after overload selection and type argument inference)
    pub(crate) fn check_call(
        &mut self,
        callee: &Type,
        args: &[Operand<'_>],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        span: Span,
    ) -> (Type, Type) {
        match callee {
            Type::Callable(sig) => {
                let formal_to_actual = map_actuals_to_formals(arg_kinds, arg_names, sig);
                let arg_types =
                    self.infer_arg_types_in_context(sig, args, arg_kinds, &formal_to_actual);
                self.check_call_with_types(
                    sig,
                    &arg_types,
                    args,
                    arg_kinds,
                    arg_names,
                    &formal_to_actual,
                    span,
                )
            }
            Type::Overloaded(items) => {
                let arg_types: Vec<Type> =
                    args.iter().map(|a| self.accept_operand(a, None)).collect();
                match self.overload_call_target(items, &arg_types, arg_kinds, arg_names) {
                    Some(sig) => {
                        let formal_to_actual = map_actuals_to_formals(arg_kinds, arg_names, sig);
                        self.check_call_with_types(
                            sig,
                            &arg_types,
                            args,
                            arg_kinds,
                            arg_names,
                            &formal_to_actual,
                            span,
                        )
                    }
                    None => {
                        if let Some(first) = items.first() {
                            self.fail(messages::no_matching_overload(first), span);
                        }
                        (Type::Any, Type::Any)
                    }
                }
            }
            Type::Instance(_) => match self.member_type("__call__", callee) {
                Some(call_method) => {
                    self.check_call(&call_method, args, arg_kinds, arg_names, span)
                }
                None => self.not_callable(callee, args, span),
            },
            ty if ty.is_dynamic() => {
                for arg in args {
                    self.accept_operand(arg, None);
                }
                (Type::Any, Type::Any)
            }
            _ => self.not_callable(callee, args, span),
        }
    }

    fn not_callable(&mut self, callee: &Type, args: &[Operand<'_>], span: Span) -> (Type, Type) {
        self.fail(messages::not_callable(callee), span);
        for arg in args {
            self.accept_operand(arg, None);
        }
        (Type::Any, Type::Any)
    }

    /// Infer actual argument types, using the bound formal as the expected
    /// type when it does not mention type variables
    fn infer_arg_types_in_context(
        &mut self,
        callee: &CallableType,
        args: &[Operand<'_>],
        arg_kinds: &[ArgKind],
        formal_to_actual: &[Vec<usize>],
    ) -> Vec<Type> {
        let mut contexts: Vec<Option<Type>> = vec![None; args.len()];
        for (j, actuals) in formal_to_actual.iter().enumerate() {
            for &i in actuals {
                let star_actual = matches!(arg_kinds.get(i), Some(ArgKind::Star | ArgKind::Star2));
                let formal = &callee.arg_types[j];
                if contexts[i].is_none() && !star_actual && !has_type_vars(formal) {
                    contexts[i] = Some(formal.clone());
                }
            }
        }
        args.iter()
            .zip(contexts)
            .map(|(arg, context)| self.accept_operand(arg, context.as_ref()))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn check_call_with_types(
        &mut self,
        callee: &CallableType,
        arg_types: &[Type],
        args: &[Operand<'_>],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        formal_to_actual: &[Vec<usize>],
        span: Span,
    ) -> (Type, Type) {
        let callee = if callee.variables.is_empty() {
            callee.clone()
        } else {
            self.infer_function_type_arguments(callee, arg_types, arg_kinds, formal_to_actual, span)
        };
        self.check_argument_count(&callee, arg_kinds, arg_names, formal_to_actual, span);
        self.check_argument_types(&callee, arg_types, args, arg_kinds, formal_to_actual, span);
        ((*callee.ret_type).clone(), Type::Callable(callee))
    }

    fn infer_function_type_arguments(
        &mut self,
        callee: &CallableType,
        arg_types: &[Type],
        arg_kinds: &[ArgKind],
        formal_to_actual: &[Vec<usize>],
        span: Span,
    ) -> CallableType {
        let mut from_args: HashMap<i32, Vec<Type>> = HashMap::new();
        for (j, actuals) in formal_to_actual.iter().enumerate() {
            for &i in actuals {
                let actual = actual_arg_type(&arg_types[i], arg_kinds[i]);
                let formal = &callee.arg_types[j];
                infer_constraints(formal, &actual, self.oracle.as_ref(), &mut from_args);
            }
        }
        let mut from_context: HashMap<i32, Vec<Type>> = HashMap::new();
        if let Some(context) = self.type_context().cloned() {
            if !context.is_dynamic() {
                let oracle = self.oracle.as_ref();
                infer_constraints(&callee.ret_type, &context, oracle, &mut from_context);
            }
        }

        let mut map = TypeVarMap::new();
        for (index, var) in callee.variables.iter().enumerate() {
            let bounds = from_args
                .get(&var.id)
                .filter(|b| !b.is_empty())
                .or_else(|| from_context.get(&var.id));
            let mut inferred = match bounds.and_then(|b| b.split_first()) {
                Some((first, rest)) => rest
                    .iter()
                    .fold(first.clone(), |acc, ty| self.oracle.join(&acc, ty)),
                None => Type::NoneTyp,
            };
            if matches!(inferred, Type::Error) {
                self.fail(messages::cannot_infer_type_argument(index + 1, callee), span);
                inferred = Type::Any;
            } else if !var.values.is_empty() && !inferred.is_dynamic() && !inferred.is_none() {
                let allowed = var
                    .values
                    .iter()
                    .find(|v| self.oracle.is_same_type(&inferred, v))
                    .or_else(|| var.values.iter().find(|v| self.oracle.is_subtype(&inferred, v)))
                    .cloned();
                match allowed {
                    Some(value) => inferred = value,
                    None => self.fail(
                        messages::incompatible_typevar_value(index + 1, callee, &inferred),
                        span,
                    ),
                }
            }
            map.insert(var.id, inferred);
        }

        let mut applied = match expand_type(&Type::Callable(callee.clone()), &map) {
            Type::Callable(c) => c,
            _ => callee.clone(),
        };
        applied.variables.clear();
        applied
    }

    fn check_argument_count(
        &mut self,
        callee: &CallableType,
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        formal_to_actual: &[Vec<usize>],
        span: Span,
    ) {
        let mapped: HashSet<usize> = formal_to_actual.iter().flatten().copied().collect();
        let mut too_many = false;
        for (i, kind) in arg_kinds.iter().enumerate() {
            if mapped.contains(&i) {
                continue;
            }
            match kind {
                ArgKind::Named => {
                    let name = arg_names.get(i).cloned().flatten().unwrap_or_default();
                    self.fail(messages::unexpected_keyword_argument(callee, &name), span);
                }
                ArgKind::Pos | ArgKind::Opt if !too_many => {
                    too_many = true;
                    self.fail(messages::too_many_arguments(callee), span);
                }
                _ => {}
            }
        }

        let has_star_actuals = arg_kinds
            .iter()
            .any(|k| matches!(k, ArgKind::Star | ArgKind::Star2));
        let missing = callee
            .arg_kinds
            .iter()
            .zip(formal_to_actual)
            .any(|(kind, actuals)| *kind == ArgKind::Pos && actuals.is_empty());
        if missing && !has_star_actuals && !too_many {
            self.fail(messages::too_few_arguments(callee), span);
        }
    }

    fn check_argument_types(
        &mut self,
        callee: &CallableType,
        arg_types: &[Type],
        args: &[Operand<'_>],
        arg_kinds: &[ArgKind],
        formal_to_actual: &[Vec<usize>],
        span: Span,
    ) {
        for (j, actuals) in formal_to_actual.iter().enumerate() {
            for &i in actuals {
                let actual = actual_arg_type(&arg_types[i], arg_kinds[i]);
                let formal = &callee.arg_types[j];
                if actual.is_void() {
                    let source = args.get(i).and_then(Operand::expr).and_then(void_source);
                    self.fail(messages::does_not_return_value(source), span);
                } else if !self.oracle.is_subtype(&actual, formal) {
                    let msg = messages::incompatible_argument(i + 1, callee, &actual, formal);
                    self.fail(msg, span);
                }
            }
        }
    }

    /// First overload item that accepts the argument types
    fn overload_call_target<'c>(
        &self,
        items: &'c [CallableType],
        arg_types: &[Type],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
    ) -> Option<&'c CallableType> {
        items
            .iter()
            .find(|item| self.matches_signature(item, arg_types, arg_kinds, arg_names))
    }

    fn matches_signature(
        &self,
        sig: &CallableType,
        arg_types: &[Type],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
    ) -> bool {
        let formal_to_actual = map_actuals_to_formals(arg_kinds, arg_names, sig);
        let mapped: HashSet<usize> = formal_to_actual.iter().flatten().copied().collect();
        if mapped.len() != arg_types.len() {
            return false;
        }
        let has_star_actuals = arg_kinds
            .iter()
            .any(|k| matches!(k, ArgKind::Star | ArgKind::Star2));
        let missing = sig
            .arg_kinds
            .iter()
            .zip(&formal_to_actual)
            .any(|(kind, actuals)| *kind == ArgKind::Pos && actuals.is_empty());
        if missing && !has_star_actuals {
            return false;
        }
        formal_to_actual.iter().enumerate().all(|(j, actuals)| {
            let formal = erase_typevars(&sig.arg_types[j]);
            actuals.iter().all(|&i| {
                let actual = actual_arg_type(&arg_types[i], arg_kinds[i]);
                self.oracle.is_subtype(&actual, &formal)
            })
        })
    }
}

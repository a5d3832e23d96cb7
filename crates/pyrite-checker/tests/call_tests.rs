//! Calls, argument checking and type argument inference

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pyrite_checker::ast::{BinaryOp, FuncDef};
use pyrite_checker::{
    error_codes, ArgKind, FuncSpec, InstanceType, Param, StmtKind, TreeBuilder, Type, VarRef,
};
use rstest::rstest;

/// `def f(x: int) -> int: return x`
fn define_f(b: &mut TreeBuilder) -> FuncDef {
    let int = b.builtin("int");
    let x = Param::typed("x", int.clone());
    let x_ref = b.var(&x.var);
    let body = vec![b.ret(Some(x_ref))];
    b.func(FuncSpec::new("f").param(x).returns(int).body(body))
}

fn push_func(b: &mut TreeBuilder, def: FuncDef) {
    let stmt = b.func_stmt(def);
    b.push(stmt);
}

#[derive(Debug, Clone, Copy)]
enum Arg {
    Int,
    Str,
}

#[rstest]
#[case::well_typed(vec![Arg::Int], None)]
#[case::wrong_type(
    vec![Arg::Str],
    Some("Argument 1 to \"f\" has incompatible type \"str\"; expected \"int\"")
)]
#[case::too_few(vec![], Some("Too few arguments for \"f\""))]
#[case::too_many(vec![Arg::Int, Arg::Int], Some("Too many arguments for \"f\""))]
fn test_positional_call(#[case] args: Vec<Arg>, #[case] expected: Option<&str>) {
    let mut b = TreeBuilder::new();
    let f = define_f(&mut b);
    let symbol = f.symbol.clone();
    push_func(&mut b, f);

    let callee = b.func_ref(&symbol);
    let actuals = args
        .iter()
        .map(|arg| match arg {
            Arg::Int => b.int(1),
            Arg::Str => b.str_lit("a"),
        })
        .collect();
    let call = b.call(callee, actuals);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    let result = check(b);
    match expected {
        None => assert_clean(&result),
        Some(message) => assert_eq!(messages(&result), vec![message.to_string()]),
    }
}

#[test]
fn test_unknown_keyword_argument() {
    let mut b = TreeBuilder::new();
    let f = define_f(&mut b);
    let symbol = f.symbol.clone();
    push_func(&mut b, f);

    let callee = b.func_ref(&symbol);
    let one = b.int(1);
    let call = b.call_with(callee, vec![one], vec![ArgKind::Named], vec![Some("y".to_string())]);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    let result = check(b);
    assert_eq!(
        messages(&result),
        vec![
            "Unexpected keyword argument \"y\" for \"f\"".to_string(),
            "Too few arguments for \"f\"".to_string(),
        ]
    );
    assert!(codes(&result).iter().all(|c| c == error_codes::ARG_COUNT));
}

#[test]
fn test_keyword_argument_binds_by_name() {
    let mut b = TreeBuilder::new();
    let f = define_f(&mut b);
    let symbol = f.symbol.clone();
    push_func(&mut b, f);

    let callee = b.func_ref(&symbol);
    let one = b.int(1);
    let call = b.call_with(callee, vec![one], vec![ArgKind::Named], vec![Some("x".to_string())]);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    assert_clean(&check(b));
}

#[test]
fn test_calling_a_non_callable_value() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", Some(b.builtin("int")));
    let callee = b.var(&x);
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    assert_single_error(&check(b), error_codes::NOT_CALLABLE, "\"int\" not callable");
}

#[test]
fn test_no_overload_matches() {
    let mut b = TreeBuilder::new();
    let list = b.prelude().list.expect("builtins.list");
    let int = b.builtin("int");
    let l = b.global_var("l", Some(b.generic(list, vec![int])));
    let base = b.var(&l);
    let key = b.str_lit("a");
    let index = b.index(base, key);
    let stmt = b.expr_stmt(index);
    b.push(stmt);

    assert_single_error(
        &check(b),
        error_codes::NO_MATCHING_OVERLOAD,
        "No overload variant of \"__getitem__\" matches argument types",
    );
}

#[test]
fn test_void_argument_is_reported() {
    let mut b = TreeBuilder::new();
    let f = define_f(&mut b);
    let f_symbol = f.symbol.clone();
    push_func(&mut b, f);
    let g = b.func(FuncSpec::new("g").returns(Type::Void));
    let g_symbol = g.symbol.clone();
    push_func(&mut b, g);

    let inner_callee = b.func_ref(&g_symbol);
    let inner = b.call(inner_callee, vec![]);
    let callee = b.func_ref(&f_symbol);
    let call = b.call(callee, vec![inner]);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    assert_single_error(
        &check(b),
        error_codes::DOES_NOT_RETURN_VALUE,
        "\"g\" does not return a value",
    );
}

// ============================================================================
// Generic functions
// ============================================================================

/// `def first(x: list[T]) -> T: return x[0]`
fn define_first(b: &mut TreeBuilder) -> FuncDef {
    let list = b.prelude().list.expect("builtins.list");
    let t = b.func_type_var("T", 1);
    let x = Param::typed("x", b.generic(list, vec![Type::TypeVar(t.clone())]));
    let x_ref = b.var(&x.var);
    let zero = b.int(0);
    let item = b.index(x_ref, zero);
    let body = vec![b.ret(Some(item))];
    b.func(
        FuncSpec::new("first")
            .type_vars(vec![t.clone()])
            .param(x)
            .returns(Type::TypeVar(t))
            .body(body),
    )
}

#[test]
fn test_type_argument_inferred_from_arguments() {
    let mut b = TreeBuilder::new();
    let list = b.prelude().list.expect("builtins.list");
    let int = b.builtin("int");
    let first = define_first(&mut b);
    let symbol = first.symbol.clone();
    push_func(&mut b, first);

    let l = b.global_var("l", Some(b.generic(list, vec![int.clone()])));
    let y = b.global_var("y", None);
    let y_def = b.def_var(&y);
    let callee = b.func_ref(&symbol);
    let arg = b.var(&l);
    let call = b.call(callee, vec![arg]);
    let stmt = b.assign(vec![y_def], call);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(y.ty(), Some(int));
}

/// `def pick(x: A) -> A` with `A` restricted to `int` or `str`
fn define_pick(b: &mut TreeBuilder, ret: Option<Type>) -> (FuncDef, VarRef) {
    let int = b.builtin("int");
    let str_ = b.builtin("str");
    let a = b.func_type_var("A", 1).with_values(vec![int, str_]);
    let x = Param::typed("x", Type::TypeVar(a.clone()));
    let x_var = x.var.clone();
    let x_ref = b.var(&x_var);
    let body = vec![b.ret(Some(x_ref))];
    let spec = FuncSpec::new("pick")
        .type_vars(vec![a.clone()])
        .param(x)
        .returns(ret.unwrap_or(Type::TypeVar(a)))
        .body(body);
    (b.func(spec), x_var)
}

#[test]
fn test_value_restriction_rejects_other_types() {
    let mut b = TreeBuilder::new();
    let (pick, _) = define_pick(&mut b, None);
    let symbol = pick.symbol.clone();
    push_func(&mut b, pick);

    let callee = b.func_ref(&symbol);
    let arg = b.float(1.5);
    let call = b.call(callee, vec![arg]);
    let stmt = b.expr_stmt(call);
    b.push(stmt);

    assert_single_error(
        &check(b),
        error_codes::CANNOT_INFER_TYPE_ARGUMENT,
        "Type argument 1 of \"pick\" has incompatible value \"float\"",
    );
}

#[test]
fn test_value_restriction_picks_matching_value() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let (pick, _) = define_pick(&mut b, None);
    let symbol = pick.symbol.clone();
    push_func(&mut b, pick);

    let y = b.global_var("y", None);
    let y_def = b.def_var(&y);
    let callee = b.func_ref(&symbol);
    let arg = b.name("True").unwrap();
    let call = b.call(callee, vec![arg]);
    let stmt = b.assign(vec![y_def], call);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(y.ty(), Some(int));
}

#[test]
fn test_body_checked_once_per_restricted_value() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let (pick, x_var) = define_pick(&mut b, Some(int));
    push_func(&mut b, pick);

    let result = check(b);
    assert_eq!(result.diagnostics.len(), 1, "{:#?}", messages(&result));
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code, error_codes::INCOMPATIBLE_RETURN_VALUE);
    assert_eq!(diag.notes, vec!["In instantiation with A = str".to_string()]);
    assert_eq!(diag.function.as_deref(), Some("pick"));
    // Only the specialised copies were checked
    assert_eq!(x_var.ty(), None);
}

/// `def pair(x: T, y: A) -> int: return y` with only `A` restricted
#[test]
fn test_only_leading_type_variable_is_expanded() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let str_ = b.builtin("str");
    let t = b.func_type_var("T", 1);
    let a = b.func_type_var("A", 2).with_values(vec![int.clone(), str_]);
    let x = Param::typed("x", Type::TypeVar(t.clone()));
    let y = Param::typed("y", Type::TypeVar(a.clone()));
    let y_var = y.var.clone();
    let y_ref = b.var(&y_var);
    let body = vec![b.ret(Some(y_ref))];
    let pair = b.func(
        FuncSpec::new("pair")
            .type_vars(vec![t, a])
            .param(x)
            .param(y)
            .returns(int)
            .body(body),
    );
    push_func(&mut b, pair);

    let result = check(b);
    assert_eq!(result.diagnostics.len(), 1, "{:#?}", messages(&result));
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code, error_codes::INCOMPATIBLE_RETURN_VALUE);
    assert!(diag.notes.is_empty());
    // The declared signature itself was checked
    assert!(y_var.ty().is_some());
}

// ============================================================================
// Function definitions
// ============================================================================

#[test]
fn test_init_must_not_declare_return_type() {
    let mut b = TreeBuilder::new();
    let class = b.class("A", &[]);
    let this = b.self_param(class);
    let int = b.builtin("int");
    let init = b.method(class, FuncSpec::new("__init__").param(this).returns(int));
    let defs = vec![b.func_stmt(init)];
    let stmt = b.class_def(class, defs);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INIT_RETURN_TYPE,
        "Cannot define return type for \"__init__\"",
    );
    assert_eq!(result.diagnostics[0].class.as_deref(), Some("A"));
}

#[test]
fn test_dynamic_function_body_is_not_checked() {
    let mut b = TreeBuilder::new();
    let x = Param::untyped("x");
    let x_ref = b.var(&x.var);
    let one = b.int(1);
    let bad = b.op(BinaryOp::Add, x_ref, one);
    let text = b.str_lit("a");
    let two = b.int(2);
    let also_bad = b.op(BinaryOp::Add, text, two);
    let body = vec![b.expr_stmt(bad), b.expr_stmt(also_bad)];
    let f = b.func(FuncSpec::new("f").param(x).body(body));
    push_func(&mut b, f);

    assert_clean(&check(b));
}

#[test]
fn test_star_args_are_lists_inside_the_body() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let list = b.prelude().list.expect("builtins.list");
    let args = Param::typed("args", int.clone()).with_kind(ArgKind::Star);
    let args_var = args.var.clone();
    let f = b.func(FuncSpec::new("f").param(args).returns(Type::Void));
    push_func(&mut b, f);

    let result = check(b);
    assert_clean(&result);
    let expected = Type::Instance(InstanceType::new(list, "builtins.list", vec![int]));
    assert_eq!(args_var.ty(), Some(expected));
}

#[test]
fn test_generator_statement_kind_is_recorded() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let yield_stmt = b.stmt(StmtKind::Yield(one));
    let g = b.func(FuncSpec::new("g").body(vec![yield_stmt]));
    assert!(g.item.is_generator);
}

//! Assignment checking and local variable inference

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pyrite_checker::{error_codes, CallableType, Expr, FuncSpec, TreeBuilder, Type};
use rstest::rstest;

fn int_list(b: &TreeBuilder) -> Type {
    let list = b.prelude().list.expect("builtins.list");
    let int = b.builtin("int");
    b.generic(list, vec![int])
}

// ============================================================================
// Declared targets
// ============================================================================

#[test]
fn test_declared_variable_rejects_incompatible_value() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", Some(b.builtin("int")));
    let value = b.str_lit("a");
    let stmt = b.var_def(vec![x], Some(value), true);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_ASSIGNMENT,
        "Incompatible types in assignment",
    );
}

#[test]
fn test_declared_variable_accepts_subtype() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", Some(b.builtin("int")));
    let value = b.name("True").unwrap();
    let stmt = b.var_def(vec![x], Some(value), true);
    b.push(stmt);

    assert_clean(&check(b));
}

#[test]
fn test_index_assignment_goes_through_setitem() {
    let mut b = TreeBuilder::new();
    let l = b.global_var("l", Some(int_list(&b)));
    let base = b.var(&l);
    let zero = b.int(0);
    let target = b.index(base, zero);
    let value = b.str_lit("a");
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_ARGUMENT,
        "Argument 2 to \"__setitem__\" has incompatible type \"str\"; expected \"int\"",
    );
}

// ============================================================================
// Unpacking
// ============================================================================

#[rstest]
#[case(3, "Too many values to unpack (2 expected, 3 provided)")]
#[case(1, "Need more than 1 values to unpack (2 expected)")]
fn test_unpacking_arity(#[case] provided: i64, #[case] expected_message: &str) {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let items: Vec<_> = (0..provided).map(|i| b.int(i)).collect();
    let value = b.tuple(items);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    let result = check(b);
    assert_single_error(&result, error_codes::VALUE_COUNT_MISMATCH, expected_message);
    assert_eq!(a.ty(), Some(Type::Any));
    assert_eq!(c.ty(), Some(Type::Any));
}

#[test]
fn test_unpacking_infers_each_target() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let str_ = b.builtin("str");
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let one = b.int(1);
    let text = b.str_lit("x");
    let value = b.tuple(vec![one, text]);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(a.ty(), Some(int));
    assert_eq!(c.ty(), Some(str_));
}

#[test]
fn test_unpacking_a_non_sequence() {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let value = b.int(1);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_ASSIGNMENT,
        "Incompatible types in assignment",
    );
}

#[test]
fn test_unpacking_a_list_broadcasts_item_type() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let source = b.global_var("source", Some(int_list(&b)));
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let value = b.var(&source);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(a.ty(), Some(int.clone()));
    assert_eq!(c.ty(), Some(int));
}

#[test]
fn test_unpacking_a_list_display_ignores_its_length() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let items: Vec<_> = (0..3).map(|i| b.int(i)).collect();
    let value = b.list(items);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(a.ty(), Some(int.clone()));
    assert_eq!(c.ty(), Some(int));
}

#[test]
fn test_list_display_item_type_checked_against_each_target() {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", Some(b.builtin("int")));
    let c = b.global_var("c", Some(b.builtin("str")));
    let one = b.int(1);
    let text = b.str_lit("x");
    let display = b.list(vec![one, text]);
    let stmt = b.var_def(vec![a, c], Some(display.clone()), true);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_ASSIGNMENT,
        "Incompatible types in assignment",
    );
    assert_eq!(
        result.type_map.get(display.id).map(ToString::to_string),
        Some("list[object]".to_string())
    );
}

/// `def mk() -> Tuple[T, int]`
fn declare_mk(b: &mut TreeBuilder) -> Expr {
    let int = b.builtin("int");
    let t = b.func_type_var("T", 1);
    let sig = CallableType::simple(vec![], Type::Tuple(vec![Type::TypeVar(t.clone()), int]))
        .with_variables(vec![t]);
    let mk = b.declare_func("mk", sig);
    let callee = b.func_ref(&mk);
    b.call(callee, vec![])
}

#[test]
fn test_unpacked_call_inferred_against_declared_targets() {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", Some(b.builtin("int")));
    let c = b.global_var("c", Some(b.builtin("int")));
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let call = declare_mk(&mut b);
    let stmt = b.assign(vec![target], call.clone());
    b.push(stmt);

    let result = check(b);
    assert_clean(&result);
    assert_eq!(
        result.type_map.get(call.id).map(ToString::to_string),
        Some("Tuple[int, int]".to_string())
    );
}

#[test]
fn test_unpacked_call_without_declared_targets_needs_annotation() {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", None);
    let c = b.global_var("c", None);
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let call = declare_mk(&mut b);
    let stmt = b.assign(vec![target], call);
    b.push(stmt);

    assert_single_error(
        &check(b),
        error_codes::NEED_ANNOTATION,
        "Need type annotation for variable",
    );
}

// ============================================================================
// Placeholders
// ============================================================================

#[test]
fn test_placeholder_takes_declared_type() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let x = b.global_var("x", Some(int.clone()));
    let placeholder = b.undefined(None);
    let stmt = b.var_def(vec![x], Some(placeholder.clone()), true);
    b.push(stmt);

    let result = check(b);
    assert_clean(&result);
    assert_eq!(result.type_map.get(placeholder.id), Some(&int));
}

#[test]
fn test_placeholder_for_several_declared_targets() {
    let mut b = TreeBuilder::new();
    let a = b.global_var("a", Some(b.builtin("int")));
    let c = b.global_var("c", Some(b.builtin("str")));
    let placeholder = b.undefined(None);
    let stmt = b.var_def(vec![a, c], Some(placeholder.clone()), true);
    b.push(stmt);

    let result = check(b);
    assert_clean(&result);
    assert_eq!(
        result.type_map.get(placeholder.id).map(ToString::to_string),
        Some("Tuple[int, str]".to_string())
    );
}

#[test]
fn test_tuple_of_placeholders() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let str_ = b.builtin("str");
    let a = b.global_var("a", Some(int.clone()));
    let c = b.global_var("c", Some(str_.clone()));
    let a_def = b.def_var(&a);
    let c_def = b.def_var(&c);
    let target = b.tuple(vec![a_def, c_def]);
    let first = b.undefined(None);
    let second = b.undefined(None);
    let value = b.tuple(vec![first.clone(), second.clone()]);
    let stmt = b.assign(vec![target], value);
    b.push(stmt);

    let result = check(b);
    assert_clean(&result);
    assert_eq!(result.type_map.get(first.id), Some(&int));
    assert_eq!(result.type_map.get(second.id), Some(&str_));
}

// ============================================================================
// Chained assignment and inference
// ============================================================================

#[test]
fn test_chained_assignment_checks_every_target() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let x = b.global_var("x", Some(b.builtin("str")));
    let y = b.global_var("y", None);
    let x_def = b.def_var(&x);
    let y_def = b.def_var(&y);
    let value = b.int(1);
    let stmt = b.assign(vec![x_def, y_def], value);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_ASSIGNMENT,
        "Incompatible types in assignment",
    );
    assert_eq!(y.ty(), Some(int));
}

#[test]
fn test_none_initializer_needs_annotation() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", None);
    let x_def = b.def_var(&x);
    let value = b.name("None").unwrap();
    let stmt = b.assign(vec![x_def], value);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::NEED_ANNOTATION,
        "Need type annotation for variable",
    );
    assert_eq!(x.ty(), Some(Type::Any));
}

#[test]
fn test_inferred_type_is_not_widened_by_later_assignment() {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    let x = b.global_var("x", None);
    let first = b.def_var(&x);
    let one = b.int(1);
    let stmt = b.assign(vec![first], one);
    b.push(stmt);
    let second = b.var(&x);
    let text = b.str_lit("a");
    let stmt = b.assign(vec![second], text);
    b.push(stmt);

    let result = check(b);
    assert_eq!(x.ty(), Some(int));
    assert_eq!(codes(&result), vec![error_codes::INCOMPATIBLE_ASSIGNMENT.to_string()]);
}

#[test]
fn test_assigning_result_of_void_function() {
    let mut b = TreeBuilder::new();
    let f = b.func(FuncSpec::new("f").returns(Type::Void));
    let symbol = f.symbol.clone();
    let stmt = b.func_stmt(f);
    b.push(stmt);

    let x = b.global_var("x", None);
    let x_def = b.def_var(&x);
    let callee = b.func_ref(&symbol);
    let call = b.call(callee, vec![]);
    let stmt = b.assign(vec![x_def], call);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::DOES_NOT_RETURN_VALUE,
        "\"f\" does not return a value",
    );
    assert_eq!(x.ty(), Some(Type::Any));
}

// ============================================================================
// Generic constructors
// ============================================================================

#[test]
fn test_generic_constructor_uses_declared_type_as_context() {
    let mut b = TreeBuilder::new();
    let list = b.prelude().list.expect("builtins.list");
    let x = b.global_var("x", Some(int_list(&b)));
    let callee = b.class_ref(list);
    let call = b.call(callee, vec![]);
    let stmt = b.var_def(vec![x], Some(call.clone()), true);
    b.push(stmt);

    let result = check(b);
    assert_clean(&result);
    assert_eq!(result.type_map.get(call.id).map(ToString::to_string), Some("list[int]".to_string()));
}

#[test]
fn test_generic_constructor_without_context_needs_annotation() {
    let mut b = TreeBuilder::new();
    let list = b.prelude().list.expect("builtins.list");
    let x = b.global_var("x", None);
    let x_def = b.def_var(&x);
    let callee = b.class_ref(list);
    let call = b.call(callee, vec![]);
    let stmt = b.assign(vec![x_def], call);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::NEED_ANNOTATION,
        "Need type annotation for variable",
    );
}

#[test]
fn test_list_display_items_checked_against_context() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", Some(int_list(&b)));
    let one = b.int(1);
    let text = b.str_lit("a");
    let display = b.list(vec![one, text]);
    let stmt = b.var_def(vec![x], Some(display), true);
    b.push(stmt);

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::INCOMPATIBLE_TYPES,
        "List item 2 has incompatible type \"str\"",
    );
}

#[test]
fn test_stub_method_is_callable_through_instance() {
    let mut b = TreeBuilder::new();
    let counter = b.class("Counter", &[]);
    let int = b.builtin("int");
    b.declare_method(counter, "total", CallableType::simple(vec![], int.clone()));
    let c = b.global_var("c", Some(b.instance(counter)));
    let n = b.global_var("n", None);
    let n_def = b.def_var(&n);
    let receiver = b.var(&c);
    let method = b.member(receiver, "total");
    let call = b.call(method, vec![]);
    let stmt = b.assign(vec![n_def], call);
    b.push(stmt);

    assert_clean(&check(b));
    assert_eq!(n.ty(), Some(int));
}

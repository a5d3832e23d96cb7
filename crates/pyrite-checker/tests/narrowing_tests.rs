//! `isinstance` classification and conditional narrowing

mod common;

use common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use pyrite_checker::ast::{BinaryOp, IfStmt};
use pyrite_checker::{
    error_codes, find_isinstance_check, CallableType, CheckerOptions, ClassId,
    ConditionalTypeBinder, FuncSpec, IsinstanceKind, NominalOracle, Param, Stmt, StmtKind,
    TreeBuilder, Type, TypeChecker, VarRef,
};
use rstest::rstest;

struct Zoo {
    animal: ClassId,
    dog: ClassId,
}

/// `class Animal`, `class Dog(Animal)` with `Dog.bark()`
fn zoo(b: &mut TreeBuilder) -> Zoo {
    let animal = b.class("Animal", &[]);
    let dog = b.class("Dog", &[animal]);
    b.declare_method(dog, "bark", CallableType::simple(vec![], Type::Void));
    Zoo { animal, dog }
}

fn bark(b: &mut TreeBuilder, var: &VarRef) -> Stmt {
    let receiver = b.var(var);
    let method = b.member(receiver, "bark");
    let call = b.call(method, vec![]);
    b.expr_stmt(call)
}

fn bad_operation(b: &mut TreeBuilder) -> Stmt {
    let text = b.str_lit("a");
    let one = b.int(1);
    let sum = b.op(BinaryOp::Add, text, one);
    b.expr_stmt(sum)
}

// ============================================================================
// Classification
// ============================================================================

#[rstest]
#[case::supertype_to_subtype("Animal", "Dog", IsinstanceKind::Overlapping)]
#[case::subtype_to_supertype("Dog", "Animal", IsinstanceKind::AlwaysTrue)]
#[case::same_class("Dog", "Dog", IsinstanceKind::AlwaysTrue)]
#[case::distinct_primitives("int", "str", IsinstanceKind::AlwaysFalse)]
#[case::user_class_and_primitive("Animal", "int", IsinstanceKind::Overlapping)]
fn test_isinstance_classification(
    #[case] declared: &str,
    #[case] target: &str,
    #[case] expected: IsinstanceKind,
) {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let class = |b: &TreeBuilder, name: &str| match name {
        "Animal" => zoo.animal,
        "Dog" => zoo.dog,
        "int" => b.prelude().int.expect("builtins.int"),
        "str" => b.prelude().str.expect("builtins.str"),
        other => panic!("unknown class {other}"),
    };
    let declared_class = class(&b, declared);
    let target_class = class(&b, target);

    let x = b.global_var("x", Some(b.instance(declared_class)));
    let subject = b.var(&x);
    let cond = b.isinstance(subject, target_class).unwrap();
    let stmt = b.expr_stmt(cond.clone());
    b.push(stmt);
    let program = b.build();

    let result = check_program_main(&program, CheckerOptions::default());
    let oracle = NominalOracle::new(&program.classes);
    let binder = ConditionalTypeBinder::new();
    let check = find_isinstance_check(&cond, &result.type_map, &binder, &oracle)
        .expect("isinstance call recognised");

    assert_eq!(check.kind, expected);
    assert!(check.var == x);
    assert_eq!(check.target.to_string(), target);
}

#[test]
fn test_other_calls_are_not_guards() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", Some(b.builtin("int")));
    let len = b.name("len").unwrap();
    let subject = b.var(&x);
    let cond = b.call(len, vec![subject]);
    let stmt = b.expr_stmt(cond.clone());
    b.push(stmt);
    let program = b.build();

    let result = check_program_main(&program, CheckerOptions::default());
    let oracle = NominalOracle::new(&program.classes);
    let binder = ConditionalTypeBinder::new();
    assert!(find_isinstance_check(&cond, &result.type_map, &binder, &oracle).is_none());
}

// ============================================================================
// Narrowing inside functions
// ============================================================================

/// `def f(x: Animal) -> None: <body(x)>`
fn animal_function(
    b: &mut TreeBuilder,
    zoo: &Zoo,
    body: impl FnOnce(&mut TreeBuilder, &VarRef) -> Vec<Stmt>,
) {
    let x = Param::typed("x", b.instance(zoo.animal));
    let x_var = x.var.clone();
    let body = body(b, &x_var);
    let f = b.func(FuncSpec::new("f").param(x).returns(Type::Void).body(body));
    let stmt = b.func_stmt(f);
    b.push(stmt);
}

#[test]
fn test_guarded_branch_sees_narrowed_type() {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let dog = zoo.dog;
    animal_function(&mut b, &zoo, |b, x| {
        let subject = b.var(x);
        let cond = b.isinstance(subject, dog).unwrap();
        let body = vec![bark(b, x)];
        vec![b.if_else(cond, body, None)]
    });

    assert_clean(&check(b));
}

#[test]
fn test_narrowing_ends_with_the_branch() {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let dog = zoo.dog;
    animal_function(&mut b, &zoo, |b, x| {
        let subject = b.var(x);
        let cond = b.isinstance(subject, dog).unwrap();
        let body = vec![bark(b, x)];
        let else_body = vec![bark(b, x)];
        let guarded = b.if_else(cond, body, Some(else_body));
        b.line(5);
        let after = bark(b, x);
        vec![guarded, after]
    });

    let result = check(b);
    // Once from the else branch (line 1) and once after the statement (line 5)
    assert_eq!(
        messages(&result),
        vec![
            "\"Animal\" has no attribute \"bark\"".to_string(),
            "\"Animal\" has no attribute \"bark\"".to_string(),
        ]
    );
    assert_eq!(
        result.diagnostics.iter().map(|d| d.line).collect::<Vec<_>>(),
        vec![1, 5]
    );
    assert!(codes(&result).iter().all(|c| c == error_codes::HAS_NO_ATTRIBUTE));
}

#[test]
fn test_always_false_branch_is_skipped() {
    let mut b = TreeBuilder::new();
    let str_class = b.prelude().str.expect("builtins.str");
    let x = b.global_var("x", Some(b.builtin("int")));
    let subject = b.var(&x);
    let cond = b.isinstance(subject, str_class).unwrap();
    let body = vec![bad_operation(&mut b)];
    let stmt = b.if_else(cond, body, None);
    b.push(stmt);

    assert_clean(&check(b));
}

#[test]
fn test_overlapping_branch_is_checked() {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let x = b.global_var("x", Some(b.instance(zoo.animal)));
    let subject = b.var(&x);
    let cond = b.isinstance(subject, zoo.dog).unwrap();
    let body = vec![bad_operation(&mut b)];
    let stmt = b.if_else(cond, body, None);
    b.push(stmt);

    assert_single_error(
        &check(b),
        error_codes::UNSUPPORTED_OPERAND,
        "Unsupported operand types for + (\"str\" and \"int\")",
    );
}

#[test]
fn test_always_true_branch_skips_the_rest() {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let x = b.global_var("x", Some(b.instance(zoo.dog)));
    let first = b.var(&x);
    let always = b.isinstance(first, zoo.animal).unwrap();
    let second = b.var(&x);
    let other = b.isinstance(second, zoo.dog).unwrap();
    let elif_body = vec![bad_operation(&mut b)];
    let else_body = vec![bad_operation(&mut b)];
    let stmt = b.stmt(StmtKind::If(IfStmt {
        exprs: vec![always, other],
        bodies: vec![vec![], elif_body],
        else_body: Some(else_body),
    }));
    b.push(stmt);

    assert_clean(&check(b));
}

// ============================================================================
// Binder balance
// ============================================================================

/// Nested guards over the given parameters, innermost first in `order`;
/// with `failing` every guarded body also holds an ill-typed operation
fn nested_guards(
    b: &mut TreeBuilder,
    dog: ClassId,
    vars: &[VarRef],
    order: &[usize],
    failing: bool,
) -> Vec<Stmt> {
    let mut body = Vec::new();
    for &i in order.iter().rev() {
        let subject = b.var(&vars[i]);
        let cond = b.isinstance(subject, dog).unwrap();
        let inner_bark = bark(b, &vars[i]);
        let mut inner = vec![inner_bark];
        if failing {
            inner.push(bad_operation(b));
        }
        inner.append(&mut body);
        body = vec![b.if_else(cond, inner, None)];
    }
    body
}

#[test]
fn test_binder_is_balanced_after_an_error_in_a_branch() {
    let mut b = TreeBuilder::new();
    let zoo = zoo(&mut b);
    let x = Param::typed("x", b.instance(zoo.animal));
    let vars = vec![x.var.clone()];
    let body = nested_guards(&mut b, zoo.dog, &vars, &[0, 0], true);
    let f = b.func(FuncSpec::new("f").param(x).returns(Type::Void).body(body));
    let stmt = b.func_stmt(f);
    b.push(stmt);
    let program = b.build();

    let mut checker = TypeChecker::new(&program, CheckerOptions::default());
    let result = checker.check_module("__main__").unwrap();
    assert_eq!(codes(&result), vec![error_codes::UNSUPPORTED_OPERAND.to_string()]);
    assert!(checker.binder().is_empty());
}

proptest! {
    #[test]
    fn prop_binder_is_balanced_after_checking(
        order in proptest::collection::vec(0usize..3, 0..8),
        failing in any::<bool>(),
    ) {
        let mut b = TreeBuilder::new();
        let zoo = zoo(&mut b);
        let params: Vec<Param> = ["a", "c", "d"]
            .iter()
            .map(|name| Param::typed(*name, b.instance(zoo.animal)))
            .collect();
        let vars: Vec<VarRef> = params.iter().map(|p| p.var.clone()).collect();
        let body = nested_guards(&mut b, zoo.dog, &vars, &order, failing);
        let mut spec = FuncSpec::new("f").returns(Type::Void).body(body);
        for param in params {
            spec = spec.param(param);
        }
        let f = b.func(spec);
        let stmt = b.func_stmt(f);
        b.push(stmt);
        let program = b.build();

        let mut checker = TypeChecker::new(&program, CheckerOptions::default());
        let result = checker.check_module("__main__").unwrap();
        let expect_errors = failing && !order.is_empty();
        prop_assert_eq!(!result.diagnostics.is_empty(), expect_errors, "{:?}", result.diagnostics);
        prop_assert!(checker.binder().is_empty());
    }
}

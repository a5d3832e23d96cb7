//! Rendering of check results: diagnostics and type map dumps

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pyrite_checker::{
    check_program, error_codes, CheckerOptions, DiagnosticLevel, FuncSpec, TreeBuilder, Type,
};
use pyrite_config::OutputFormat;

/// `def f() -> int: return "a"` with the return on line 3
fn bad_return() -> TreeBuilder {
    let mut b = TreeBuilder::new();
    let int = b.builtin("int");
    b.line(3);
    let value = b.str_lit("a");
    let body = vec![b.ret(Some(value))];
    b.line(2);
    let f = b.func(FuncSpec::new("f").returns(int).body(body));
    let stmt = b.func_stmt(f);
    b.push(stmt);
    b
}

#[test]
fn test_human_rendering() {
    let result = check(bad_return());
    let output = result.render(OutputFormat::Human).unwrap();

    insta::assert_snapshot!(output.trim_end(), @r###"
    __main__.py: In function "f"
    error[PY3003]: Incompatible return value type
      --> __main__.py:3:1
       = help: Return a value compatible with the declared return type.
    "###);
}

#[test]
fn test_json_rendering() {
    let result = check(bad_return());
    let output = result.render(OutputFormat::Json).unwrap();

    insta::assert_snapshot!(output, @r###"
    [
      {
        "diag_version": 1,
        "level": "error",
        "code": "PY3003",
        "message": "Incompatible return value type",
        "file": "__main__.py",
        "line": 3,
        "column": 1,
        "length": 0,
        "help": "Return a value compatible with the declared return type.",
        "function": "f"
      }
    ]
    "###);
}

#[test]
fn test_clean_module_renders_nothing() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let stmt = b.expr_stmt(one);
    b.push(stmt);

    let result = check(b);
    assert!(!result.has_errors());
    assert_eq!(result.render(OutputFormat::Human).unwrap(), "");
    assert_eq!(result.render(OutputFormat::Json).unwrap(), "[]");
}

#[test]
fn test_type_map_dump() {
    let mut b = TreeBuilder::new();
    let x = b.global_var("x", None);
    let x_def = b.def_var(&x);
    let one = b.int(1);
    let two = b.int(2);
    let display = b.list(vec![one, two]);
    let stmt = b.assign(vec![x_def], display);
    b.push(stmt);

    let dump = check(b).dump();
    assert_eq!(dump.module, "__main__");
    assert_eq!(dump.entries.len(), 4);
    assert!(dump.entries.windows(2).all(|w| w[0].node < w[1].node));
    assert!(dump.entries.iter().all(|e| e.kind == "instance"));
    insta::assert_debug_snapshot!(dump.types, @r###"
    [
        "int",
        "list[int]",
    ]
    "###);
}

#[test]
fn test_missing_builtin_reported_once() {
    let mut b = TreeBuilder::bare();
    b.module("__main__");
    for text in ["a", "b"] {
        let value = b.str_lit(text);
        let stmt = b.expr_stmt(value);
        b.push(stmt);
    }

    let result = check(b);
    assert_single_error(
        &result,
        error_codes::MISSING_BUILTIN,
        "Builtin class \"builtins.str\" is not defined",
    );
    assert_eq!(result.diagnostics[0].line, 1);
    assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Error);
}

#[test]
fn test_check_program_visits_every_user_module() {
    let mut b = TreeBuilder::new();
    b.module("pkg.util");
    let y = b.global_var("y", Some(Type::Any));
    let value = b.int(1);
    let stmt = b.var_def(vec![y], Some(value), true);
    b.push(stmt);

    b.module("__main__");
    let x = b.global_var("x", Some(b.builtin("str")));
    let value = b.int(1);
    let stmt = b.var_def(vec![x], Some(value), true);
    b.push(stmt);
    let program = b.build();

    let results = check_program(&program, CheckerOptions::default()).unwrap();
    let modules: Vec<&str> = results.iter().map(|r| r.module.as_str()).collect();
    assert_eq!(modules, vec!["__main__", "pkg.util"]);
    assert_eq!(results[0].diagnostics.len(), 1);
    assert_eq!(results[0].diagnostics[0].file, "__main__.py");
    assert!(results[1].diagnostics.is_empty());
}

#[test]
fn test_python2_literals() {
    let mut b = TreeBuilder::new();
    let s = b.global_var("s", None);
    let s_def = b.def_var(&s);
    let value = b.expr(pyrite_checker::ExprKind::Unicode("u".into()));
    let stmt = b.assign(vec![s_def], value);
    b.push(stmt);
    let unicode = b.builtin("unicode");

    let result = check_with(b, CheckerOptions::default().with_python_version(2));
    assert_clean(&result);
    assert_eq!(s.ty(), Some(unicode));
}

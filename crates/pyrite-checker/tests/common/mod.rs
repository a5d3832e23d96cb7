//! Shared helpers for checker integration tests
//!
//! Programs are assembled with [`TreeBuilder`]; these helpers run the
//! checker over the `__main__` module and pull out what tests assert on.

#![allow(dead_code)]

use pyrite_checker::{CheckResult, CheckerOptions, Program, TreeBuilder, TypeChecker};

use pretty_assertions::assert_eq;

/// Check the `__main__` module of a finished builder
pub fn check(builder: TreeBuilder) -> CheckResult {
    check_with(builder, CheckerOptions::default())
}

pub fn check_with(builder: TreeBuilder, options: CheckerOptions) -> CheckResult {
    let program = builder.build();
    check_program_main(&program, options)
}

/// Route checker logs through the test harness; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn check_program_main(program: &Program, options: CheckerOptions) -> CheckResult {
    init_tracing();
    let mut checker = TypeChecker::new(program, options);
    match checker.check_module("__main__") {
        Ok(result) => result,
        Err(e) => panic!("module __main__ missing: {e}"),
    }
}

/// Message texts in report order
pub fn messages(result: &CheckResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.message.clone()).collect()
}

/// Error codes in report order
pub fn codes(result: &CheckResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.code.clone()).collect()
}

/// Assert the module checks without any diagnostic
pub fn assert_clean(result: &CheckResult) {
    assert!(
        result.diagnostics.is_empty(),
        "Expected no diagnostics, got: {:#?}",
        messages(result)
    );
}

/// Assert exactly one diagnostic with the given code and message
pub fn assert_single_error(result: &CheckResult, code: &str, message: &str) {
    assert_eq!(
        result.diagnostics.len(),
        1,
        "Expected one diagnostic, got: {:#?}",
        messages(result)
    );
    assert_eq!(result.diagnostics[0].code, code);
    assert_eq!(result.diagnostics[0].message, message);
}

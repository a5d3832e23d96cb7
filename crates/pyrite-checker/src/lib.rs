//! Pyrite checker - static type checking for a Python-like language
//!
//! This library provides the type checking pass over name-resolved trees:
//! - The type algebra and its relations (subtyping, joins, expansion)
//! - Declarations, classes and the resolved syntax tree
//! - Expression inference and statement checking with `isinstance` narrowing
//! - Diagnostics with stable error codes and human or JSON rendering
//!
//! Trees are normally produced by semantic analysis; [`TreeBuilder`]
//! constructs them programmatically.

/// Pyrite checker version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod binder;
pub mod builder;
pub mod diagnostic;
pub mod options;
pub mod prelude;
pub mod span;
pub mod symbol;
pub mod type_map;
pub mod typecheck_dump;
pub mod typechecker;
pub mod typeops;
pub mod types;

// Re-export commonly used types
pub use ast::{Expr, ExprKind, NodeId, Program, Stmt, StmtKind};
pub use binder::ConditionalTypeBinder;
pub use builder::{FuncSpec, Param, TreeBuilder, BUILTINS};
pub use diagnostic::{error_codes, render_diagnostics, Diagnostic, DiagnosticLevel, DIAG_VERSION};
pub use options::CheckerOptions;
pub use prelude::Prelude;
pub use span::Span;
pub use symbol::{ClassId, LookupError, Symbol, SymbolTable, Var, VarRef};
pub use type_map::TypeMap;
pub use typecheck_dump::{TypeEntry, TypeMapDump, TYPEMAP_VERSION};
pub use typechecker::{
    check_program, find_isinstance_check, CheckResult, IsinstanceCheck, IsinstanceKind,
    TypeChecker,
};
pub use typeops::{NominalOracle, TypeOracle};
pub use types::{ArgKind, CallableType, InstanceType, Type, TypeVarDef};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }
}

//! Type checking pass
//!
//! Walks a resolved module top-down, infers the type of every visited
//! expression into a [`TypeMap`] and reports problems as [`Diagnostic`]s.
//! Problems never stop the walk: each one is reported once and checking
//! continues with a safe fallback type.
//!
//! Analysis state that follows the recursion (expected-type context,
//! enclosing function, return type, local scope, narrowed bindings) is only
//! changed through the `with_*` helpers, which restore it when the closure
//! returns.

mod assign;
mod calls;
mod expand;
mod expr;
mod functions;
mod inheritance;
mod members;
pub(crate) mod messages;
pub mod narrowing;
mod statements;

pub use narrowing::{find_isinstance_check, is_overlapping_types, IsinstanceCheck, IsinstanceKind};

use crate::ast::{Expr, ExprKind, Program};
use crate::binder::ConditionalTypeBinder;
use crate::builder::BUILTINS;
use crate::diagnostic::{error_codes, render_diagnostics, Diagnostic};
use crate::options::CheckerOptions;
use crate::span::Span;
use crate::symbol::{ClassId, LookupError, RefKind, Symbol, SymbolTable, SymbolTableNode, VarRef};
use crate::type_map::TypeMap;
use crate::typecheck_dump::TypeMapDump;
use crate::typeops::{expand_type_by_instance, NominalOracle, TypeOracle};
use crate::types::{CallableType, InstanceType, Type, TypeVarDef};
use messages::{Message, Msg};
use pyrite_config::OutputFormat;
use std::collections::BTreeSet;
use tracing::{debug, trace, trace_span};

/// Enclosing function of the code being checked
#[derive(Debug, Clone)]
pub(crate) struct FunctionFrame {
    /// `None` for lambdas
    pub name: Option<String>,
    /// No declared signature: inferred types are replaced by `Any`
    pub dynamic: bool,
    pub is_generator: bool,
}

/// Right-hand side of an assignment or argument of a synthesized call
#[derive(Debug, Clone)]
pub(crate) enum Operand<'e> {
    Expr(&'e Expr),
    /// Value whose type is already known; it is never re-inferred
    Temp(Type),
}

impl<'e> Operand<'e> {
    pub fn expr(&self) -> Option<&'e Expr> {
        match self {
            Operand::Expr(e) => Some(*e),
            Operand::Temp(_) => None,
        }
    }
}

/// Output of checking one module
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub module: String,
    pub type_map: TypeMap,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        render_diagnostics(&self.diagnostics, format)
    }

    pub fn dump(&self) -> TypeMapDump {
        TypeMapDump::from_type_map(self.module.clone(), &self.type_map)
    }
}

/// Check every module of `program` except `builtins`, in name order
pub fn check_program(
    program: &Program,
    options: CheckerOptions,
) -> Result<Vec<CheckResult>, LookupError> {
    let mut checker = TypeChecker::new(program, options);
    program
        .modules
        .keys()
        .filter(|name| name.as_str() != BUILTINS)
        .map(|name| checker.check_module(name))
        .collect()
}

pub struct TypeChecker<'a> {
    program: &'a Program,
    oracle: Box<dyn TypeOracle + 'a>,
    options: CheckerOptions,
    globals: Option<&'a SymbolTable>,
    locals: Option<SymbolTable>,
    file: String,
    type_map: TypeMap,
    binder: ConditionalTypeBinder,
    diagnostics: Vec<Diagnostic>,
    return_types: Vec<Type>,
    type_context: Vec<Option<Type>>,
    function_stack: Vec<FunctionFrame>,
    class_stack: Vec<ClassId>,
    /// Notes naming the type variable instantiation being checked
    instantiations: Vec<String>,
    missing_builtins: BTreeSet<String>,
    next_node_id: u32,
}

impl<'a> TypeChecker<'a> {
    pub fn new(program: &'a Program, options: CheckerOptions) -> Self {
        Self::with_oracle(program, options, Box::new(NominalOracle::new(&program.classes)))
    }

    /// Checker answering type relation queries through `oracle`
    pub fn with_oracle(
        program: &'a Program,
        options: CheckerOptions,
        oracle: Box<dyn TypeOracle + 'a>,
    ) -> Self {
        Self {
            program,
            oracle,
            options,
            globals: None,
            locals: None,
            file: String::new(),
            type_map: TypeMap::new(),
            binder: ConditionalTypeBinder::new(),
            diagnostics: Vec::new(),
            return_types: Vec::new(),
            type_context: Vec::new(),
            function_stack: Vec::new(),
            class_stack: Vec::new(),
            instantiations: Vec::new(),
            missing_builtins: BTreeSet::new(),
            next_node_id: program.next_node_id,
        }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Narrowings currently in effect
    pub fn binder(&self) -> &ConditionalTypeBinder {
        &self.binder
    }

    /// Type check one module; fails only if the module does not exist
    pub fn check_module(&mut self, name: &str) -> Result<CheckResult, LookupError> {
        let module = self.program.module(name)?;
        debug!(module = %name, defs = module.defs.len(), "checking module");

        self.file = module.path.clone();
        self.globals = Some(&module.names);
        self.locals = None;
        self.type_map = TypeMap::new();
        self.binder = ConditionalTypeBinder::new();
        self.diagnostics.clear();
        self.missing_builtins.clear();

        self.check_block(&module.defs);

        for fullname in std::mem::take(&mut self.missing_builtins) {
            let message = messages::missing_builtin(&fullname);
            self.diagnostics.push(
                Diagnostic::error_with_code(message.code, message.text, Span::at_line(1))
                    .with_file(self.file.clone()),
            );
        }

        debug!(
            module = %name,
            nodes = self.type_map.len(),
            diagnostics = self.diagnostics.len(),
            "finished module"
        );
        Ok(CheckResult {
            module: name.to_string(),
            type_map: std::mem::take(&mut self.type_map),
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    /// Infer the type of `expr` under an expected type and record it
    pub(crate) fn accept(&mut self, expr: &Expr, context: Option<&Type>) -> Type {
        let ty = self.with_type_context(context.cloned(), |c| c.infer_expr(expr));
        self.type_map.insert(expr.id, ty.clone());
        if self.is_dynamic_function() {
            Type::Any
        } else {
            ty
        }
    }

    pub(crate) fn accept_operand(&mut self, operand: &Operand<'_>, context: Option<&Type>) -> Type {
        match operand {
            Operand::Expr(e) => self.accept(e, context),
            Operand::Temp(ty) => ty.clone(),
        }
    }

    pub(crate) fn store_type(&mut self, expr: &Expr, ty: Type) {
        self.type_map.insert(expr.id, ty);
    }

    pub(crate) fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// Expected type of the expression being inferred
    pub(crate) fn type_context(&self) -> Option<&Type> {
        self.type_context.last().and_then(Option::as_ref)
    }

    pub(crate) fn is_dynamic_function(&self) -> bool {
        self.function_stack.last().is_some_and(|f| f.dynamic)
    }

    pub(crate) fn alloc_node_id(&mut self) -> &mut u32 {
        &mut self.next_node_id
    }

    // ---- scoped state ----

    pub(crate) fn with_type_context<R>(
        &mut self,
        context: Option<Type>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.type_context.push(context);
        let result = f(self);
        self.type_context.pop();
        result
    }

    pub(crate) fn with_function<R>(
        &mut self,
        frame: FunctionFrame,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let span = trace_span!(
            "function",
            name = frame.name.as_deref().unwrap_or("<lambda>"),
            dynamic = frame.dynamic
        );
        let _entered = span.enter();
        self.function_stack.push(frame);
        let result = f(self);
        self.function_stack.pop();
        result
    }

    pub(crate) fn with_return_type<R>(&mut self, ty: Type, f: impl FnOnce(&mut Self) -> R) -> R {
        self.return_types.push(ty);
        let result = f(self);
        self.return_types.pop();
        result
    }

    /// Fresh local symbol table for a function body
    pub(crate) fn with_local_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = self.locals.replace(SymbolTable::new());
        let result = f(self);
        self.locals = outer;
        result
    }

    pub(crate) fn with_class<R>(&mut self, class: ClassId, f: impl FnOnce(&mut Self) -> R) -> R {
        let span = trace_span!("class", name = %self.program.classes.get(class).name);
        let _entered = span.enter();
        self.class_stack.push(class);
        let result = f(self);
        self.class_stack.pop();
        result
    }

    /// Run `f` with `var` narrowed to a type
    pub(crate) fn with_narrowing<R>(
        &mut self,
        narrowing: Option<(VarRef, Type)>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        match narrowing {
            Some((var, ty)) => {
                trace!(var = %var.name, narrowed = %ty, "narrowing");
                self.binder.push(&var, ty);
                let result = f(self);
                self.binder.pop(&var);
                result
            }
            None => f(self),
        }
    }

    pub(crate) fn with_instantiation<R>(
        &mut self,
        note: Option<String>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        match note {
            Some(note) => {
                self.instantiations.push(note);
                let result = f(self);
                self.instantiations.pop();
                result
            }
            None => f(self),
        }
    }

    /// Bind a name in the current local scope
    pub(crate) fn declare_local(&mut self, var: &VarRef) {
        if let Some(locals) = self.locals.as_mut() {
            locals.insert(var.name.clone(), RefKind::Local, Symbol::Var(var.clone()));
        }
    }

    // ---- reporting ----

    pub(crate) fn fail(&mut self, message: impl Into<Message>, span: Span) {
        let message = message.into();
        let function = self
            .function_stack
            .iter()
            .rev()
            .find_map(|frame| frame.name.clone());
        let class = self
            .class_stack
            .last()
            .map(|id| self.program.classes.get(*id).name.clone());

        let mut diag = Diagnostic::error_with_code(message.code, message.text, span)
            .with_file(self.file.clone())
            .with_context(function, class);
        for note in &self.instantiations {
            diag = diag.with_note(note.clone());
        }
        if let Some(help) = error_codes::help_for(message.code) {
            diag = diag.with_help(help);
        }

        // The same expression may be inferred more than once
        if self.diagnostics.contains(&diag) {
            return;
        }
        trace!(code = message.code, line = span.line, "reported");
        self.diagnostics.push(diag);
    }

    /// Report `sub` not being usable as `sup`
    pub(crate) fn check_subtype(
        &mut self,
        sub: &Type,
        sup: &Type,
        span: Span,
        msg: Msg,
        source: Option<&Expr>,
    ) {
        if !self.oracle.is_subtype(sub, sup) {
            if sub.is_void() {
                self.fail(messages::does_not_return_value(source.and_then(void_source)), span);
            } else {
                self.fail(msg, span);
            }
        }
    }

    pub(crate) fn check_not_void(&mut self, ty: &Type, source: Option<&Expr>, span: Span) {
        if ty.is_void() {
            self.fail(messages::does_not_return_value(source.and_then(void_source)), span);
        }
    }

    // ---- lookup ----

    /// Resolve an unqualified name: locals, then globals, then builtins
    pub(crate) fn lookup(&self, name: &str) -> Option<&SymbolTableNode> {
        if let Some(node) = self.locals.as_ref().and_then(|l| l.get(name)) {
            return Some(node);
        }
        if let Some(node) = self.globals.and_then(|g| g.get(name)) {
            return Some(node);
        }
        self.program
            .modules
            .get(BUILTINS)
            .and_then(|m| m.names.get(name))
    }

    pub(crate) fn lookup_qualified(&self, name: &str) -> Result<Symbol, LookupError> {
        if name.contains('.') {
            self.program.lookup_qualified(name).cloned()
        } else {
            self.lookup(name)
                .map(|node| node.symbol.clone())
                .ok_or_else(|| LookupError::UnknownName {
                    module: self.file.clone(),
                    name: name.to_string(),
                })
        }
    }

    /// Instance of a named class; `Unbound` (and one report per run) if the
    /// class does not exist
    pub(crate) fn named_generic_type(&mut self, fullname: &str, args: Vec<Type>) -> Type {
        match self.lookup_qualified(fullname) {
            Ok(Symbol::Class(id)) => Type::Instance(InstanceType::new(id, fullname, args)),
            _ => {
                if self.missing_builtins.insert(fullname.to_string()) {
                    debug!(name = fullname, "missing builtin class");
                }
                Type::Unbound(fullname.to_string())
            }
        }
    }

    pub(crate) fn named_type(&mut self, fullname: &str) -> Type {
        self.named_generic_type(fullname, Vec::new())
    }

    /// Like [`named_type`](Self::named_type) but silent when absent
    pub(crate) fn named_type_if_exists(&self, fullname: &str) -> Type {
        match self.program.lookup_class(fullname) {
            Ok(id) => Type::Instance(InstanceType::new(id, fullname, Vec::new())),
            Err(_) => Type::Unbound(fullname.to_string()),
        }
    }

    pub(crate) fn bool_type(&mut self) -> Type {
        self.named_type("builtins.bool")
    }

    pub(crate) fn str_type(&mut self) -> Type {
        self.named_type("builtins.str")
    }

    // ---- class types ----

    /// Instance of `class` parameterised by its own type variables
    pub(crate) fn self_instance(&self, class: ClassId) -> InstanceType {
        let info = self.program.classes.get(class);
        let upper = self.named_type_if_exists("builtins.object");
        let args = info
            .type_vars
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Type::TypeVar(TypeVarDef::new(name.clone(), i as i32 + 1, upper.clone()))
            })
            .collect();
        InstanceType::new(class, info.fullname.clone(), args)
    }

    /// Type of a class used as a value: its constructor signature(s)
    pub(crate) fn type_object_type(&self, class: ClassId) -> Type {
        let info = self.program.classes.get(class);
        let instance = self.self_instance(class);
        let upper = self.named_type_if_exists("builtins.object");
        let class_vars: Vec<TypeVarDef> = info
            .type_vars
            .iter()
            .enumerate()
            .map(|(i, name)| TypeVarDef::new(name.clone(), i as i32 + 1, upper.clone()))
            .collect();

        let init = info.mro.iter().find_map(|owner| {
            match self.program.classes.get(*owner).get("__init__") {
                Some(Symbol::Func(f)) => Some((*owner, f.ty.clone())),
                _ => None,
            }
        });
        let signatures: Vec<CallableType> = match init {
            Some((owner, ty)) => {
                let mapped = self.map_type_from_supertype(&ty, class, owner);
                mapped.items().into_iter().map(|sig| sig.bound()).collect()
            }
            None => vec![CallableType::simple(Vec::new(), Type::Void)],
        };

        let mut constructors: Vec<CallableType> = signatures
            .into_iter()
            .map(|mut sig| {
                sig.ret_type = Box::new(Type::Instance(instance.clone()));
                let mut variables = class_vars.clone();
                variables.extend(sig.variables);
                sig.variables = variables;
                sig.is_type_obj = true;
                sig.name = Some(info.name.clone());
                sig
            })
            .collect();
        if constructors.len() == 1 {
            Type::Callable(constructors.remove(0))
        } else {
            Type::Overloaded(constructors)
        }
    }

    /// Rewrite a type declared in `sup` into the type variable context of
    /// its subclass `sub`
    pub(crate) fn map_type_from_supertype(&self, ty: &Type, sub: ClassId, sup: ClassId) -> Type {
        let instance = self.self_instance(sub);
        match self.oracle.map_instance_to_supertype(&instance, sup) {
            Some(mapped) => expand_type_by_instance(ty, &mapped),
            None => ty.clone(),
        }
    }
}

/// Name of the function whose call produced a value, for messages
fn void_source(expr: &Expr) -> Option<&str> {
    let ExprKind::Call(call) = &crate::ast::unwrap_parens(expr).kind else {
        return None;
    };
    match &crate::ast::unwrap_parens(&call.callee).kind {
        ExprKind::Name(name) => Some(name.name.as_str()),
        ExprKind::Member(member) => Some(member.name.as_str()),
        _ => None,
    }
}

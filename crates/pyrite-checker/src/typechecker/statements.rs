//! Statement checking

use super::assign::expand_lvalues;
use super::messages;
use super::narrowing::{find_isinstance_check, IsinstanceKind};
use super::{Operand, TypeChecker};
use crate::ast::{
    unwrap_parens, Expr, ExprKind, ForStmt, IfStmt, RaiseStmt, Stmt, StmtKind, TryStmt, WhileStmt,
    WithStmt,
};
use crate::span::Span;
use crate::types::{ArgKind, Type};
use tracing::trace;

impl TypeChecker<'_> {
    pub(crate) fn check_block(&mut self, block: &[Stmt]) {
        for stmt in block {
            self.check_stmt(stmt);
        }
    }

    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::VarDef(def) => self.check_var_def(def, span),
            StmtKind::Func(def) => self.check_func_def(def),
            StmtKind::OverloadedFunc(def) => self.check_overloaded_func_def(def, span),
            StmtKind::Class(def) => self.check_class_def(def, span),
            StmtKind::Decorator(dec) => self.check_decorator(dec, span),
            StmtKind::Assign(s) => self.check_assignment_stmt(s),
            StmtKind::OperatorAssign(s) => self.check_operator_assignment(s, span),
            StmtKind::Expr(e) => {
                self.accept(e, None);
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), span),
            StmtKind::Yield(e) => self.check_yield(e, span),
            StmtKind::If(s) => self.check_if(s),
            StmtKind::While(s) => self.check_while(s),
            StmtKind::For(s) => self.check_for(s, span),
            StmtKind::With(s) => self.check_with(s),
            StmtKind::Assert(e) => {
                self.accept(e, None);
            }
            StmtKind::Raise(s) => self.check_raise(s),
            StmtKind::Try(s) => self.check_try(s),
            StmtKind::Del(e) => self.check_del(e),
            StmtKind::Print(args) => {
                for arg in args {
                    self.accept(arg, None);
                }
            }
            StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Global(_)
            | StmtKind::Import(_) => {}
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let Some(expected) = self.return_types.last().cloned() else {
            return;
        };
        match value {
            Some(e) => {
                let actual = self.accept(e, Some(&expected));
                if actual.is_any() {
                    return;
                }
                if expected.is_void() {
                    self.fail(messages::NO_RETURN_VALUE_EXPECTED, span);
                } else {
                    self.check_subtype(
                        &actual,
                        &expected,
                        span,
                        messages::INCOMPATIBLE_RETURN_VALUE_TYPE,
                        Some(e),
                    );
                }
            }
            None => {
                let is_generator = self.function_stack.last().is_some_and(|f| f.is_generator);
                if !is_generator && !expected.is_void() && !self.is_dynamic_function() {
                    self.fail(messages::RETURN_VALUE_EXPECTED, span);
                }
            }
        }
    }

    fn check_yield(&mut self, value: &Expr, span: Span) {
        let expected = match self.return_types.last() {
            Some(Type::Instance(inst)) if inst.name == "builtins.Iterator" => {
                inst.args.first().cloned().unwrap_or(Type::Any)
            }
            Some(ty) if ty.is_dynamic() => Type::Any,
            _ => {
                self.fail(messages::INVALID_RETURN_TYPE_FOR_YIELD, span);
                self.accept(value, None);
                return;
            }
        };
        let actual = self.accept(value, Some(&expected));
        self.check_subtype(&actual, &expected, span, messages::INCOMPATIBLE_TYPES, Some(value));
    }

    fn check_if(&mut self, s: &IfStmt) {
        for (cond, body) in s.exprs.iter().zip(&s.bodies) {
            let ty = self.accept(cond, None);
            self.check_not_void(&ty, Some(cond), cond.span);

            let check =
                find_isinstance_check(cond, &self.type_map, &self.binder, self.oracle.as_ref());
            let kind = check.as_ref().map(|c| c.kind);
            if kind == Some(IsinstanceKind::AlwaysFalse) {
                trace!(line = cond.span.line, "branch pruned");
            } else {
                let narrowing = check.map(|c| (c.var, c.target));
                self.with_narrowing(narrowing, |c| c.check_block(body));
            }
            if kind == Some(IsinstanceKind::AlwaysTrue) {
                trace!(line = cond.span.line, "remaining branches pruned");
                return;
            }
        }
        if let Some(else_body) = &s.else_body {
            self.check_block(else_body);
        }
    }

    fn check_while(&mut self, s: &WhileStmt) {
        let ty = self.accept(&s.expr, None);
        self.check_not_void(&ty, Some(&s.expr), s.expr.span);
        self.check_block(&s.body);
        if let Some(else_body) = &s.else_body {
            self.check_block(else_body);
        }
    }

    fn check_for(&mut self, s: &ForStmt, span: Span) {
        let item_type = self.analyse_iterable_item_type(&s.expr);
        self.analyse_index_variables(&s.index, s.is_annotated, item_type, span);
        self.check_block(&s.body);
        if let Some(else_body) = &s.else_body {
            self.check_block(else_body);
        }
    }

    /// Type of the items produced by iterating over `expr`
    pub(crate) fn analyse_iterable_item_type(&mut self, expr: &Expr) -> Type {
        let iterable = self.accept(expr, None);
        self.check_not_void(&iterable, Some(expr), expr.span);
        if iterable.is_void() {
            return Type::Any;
        }

        if let Type::Tuple(items) = &iterable {
            let mut joined = Type::NoneTyp;
            for item in items {
                joined = self.oracle.join(&joined, item);
            }
            if matches!(joined, Type::Error) {
                self.fail(messages::CANNOT_INFER_ITEM_TYPE, expr.span);
                return Type::Any;
            }
            return joined;
        }

        let expected = self.named_generic_type("builtins.Iterable", vec![Type::Any]);
        if !self.oracle.is_subtype(&iterable, &expected) {
            self.fail(messages::ITERABLE_EXPECTED, expr.span);
            return Type::Any;
        }
        let iterator = self.check_method_call("__iter__", &iterable, &[], expr.span);
        let next = self.options.next_method_name();
        self.check_method_call(next, &iterator, &[], expr.span)
    }

    /// Bind loop or comprehension index variables to the item type
    pub(crate) fn analyse_index_variables(
        &mut self,
        index: &[Expr],
        is_annotated: bool,
        item_type: Type,
        span: Span,
    ) {
        if !is_annotated {
            let lvalues: Vec<&Expr> = index.iter().collect();
            self.check_assignments(&lvalues, Operand::Temp(item_type), span);
            return;
        }

        let declared: Vec<Option<Type>> = index
            .iter()
            .map(|e| Some(declared_var_type(e).unwrap_or(Type::Any)))
            .collect();
        if let [target] = declared.as_slice() {
            self.check_single_assignment(
                target.clone(),
                None,
                Operand::Temp(item_type),
                span,
                messages::INCOMPATIBLE_TYPES_IN_FOR,
            );
        } else {
            let indexes = vec![None; declared.len()];
            self.check_multi_assignment(
                &declared,
                &indexes,
                Operand::Temp(item_type),
                span,
                messages::INCOMPATIBLE_TYPES_IN_FOR,
            );
        }
    }

    fn check_with(&mut self, s: &WithStmt) {
        for (expr, target) in s.exprs.iter().zip(&s.targets) {
            let manager = self.accept(expr, None);
            let entered = self.check_method_call("__enter__", &manager, &[], expr.span);
            if let Some(target) = target {
                let lvalues = expand_lvalues(target);
                self.check_assignments(&lvalues, Operand::Temp(entered), target.span);
            }
            let exit_args = [
                Operand::Temp(Type::Any),
                Operand::Temp(Type::Any),
                Operand::Temp(Type::Any),
            ];
            self.check_method_call("__exit__", &manager, &exit_args, expr.span);
        }
        self.check_block(&s.body);
    }

    fn check_raise(&mut self, s: &RaiseStmt) {
        for expr in [&s.expr, &s.from_expr].into_iter().flatten() {
            let ty = self.accept(expr, None);
            self.check_exception_value(&ty, expr.span);
        }
    }

    /// A raised value is an exception instance or an exception class
    fn check_exception_value(&mut self, ty: &Type, span: Span) {
        let base = self.named_type("builtins.BaseException");
        if ty.is_type_obj() {
            let constructed = ty
                .items()
                .first()
                .map(|sig| (*sig.ret_type).clone())
                .unwrap_or(Type::Any);
            if !self.oracle.is_subtype(&constructed, &base) {
                self.fail(messages::INVALID_EXCEPTION_TYPE, span);
            }
        } else {
            self.check_subtype(ty, &base, span, messages::INVALID_EXCEPTION_TYPE, None);
        }
    }

    fn check_try(&mut self, s: &TryStmt) {
        self.check_block(&s.body);
        for (i, handler) in s.handlers.iter().enumerate() {
            if let Some(Some(type_expr)) = s.types.get(i) {
                let caught = self.exception_type(type_expr);
                if let Some(Some(var)) = s.vars.get(i) {
                    self.check_assignments(&[var], Operand::Temp(caught), var.span);
                }
            }
            self.check_block(handler);
        }
        if let Some(else_body) = &s.else_body {
            self.check_block(else_body);
        }
        if let Some(finally_body) = &s.finally_body {
            self.check_block(finally_body);
        }
    }

    /// Instance type bound by an `except` clause
    fn exception_type(&mut self, expr: &Expr) -> Type {
        if let ExprKind::Tuple(items) = &unwrap_parens(expr).kind {
            if items.is_empty() {
                self.fail(messages::UNSUPPORTED_EXCEPTION, expr.span);
                return Type::Any;
            }
            let mut joined: Option<Type> = None;
            for item in items {
                let caught = self.exception_type(item);
                joined = Some(match joined {
                    Some(prev) => self.oracle.join(&prev, &caught),
                    None => caught,
                });
            }
            let item_types = items
                .iter()
                .map(|item| self.type_map.get(item.id).cloned().unwrap_or(Type::Any))
                .collect();
            self.store_type(expr, Type::Tuple(item_types));
            return joined.unwrap_or(Type::Any);
        }

        let ty = self.accept(expr, None);
        if ty.is_dynamic() {
            return Type::Any;
        }
        let base = self.named_type("builtins.BaseException");
        if let Some(sig) = ty.items().first() {
            if sig.is_type_obj && self.oracle.is_subtype(&sig.ret_type, &base) {
                return (*sig.ret_type).clone();
            }
        }
        self.fail(messages::INVALID_EXCEPTION_TYPE, expr.span);
        Type::Any
    }

    fn check_del(&mut self, target: &Expr) {
        if let ExprKind::Index(index) = &unwrap_parens(target).kind {
            let base = self.accept(&index.base, None);
            let args = [Operand::Expr(&index.index)];
            self.check_method_call("__delitem__", &base, &args, target.span);
        }
    }

    /// Call `base.method(*args)` with positional arguments
    pub(crate) fn check_method_call(
        &mut self,
        method: &str,
        base: &Type,
        args: &[Operand<'_>],
        span: Span,
    ) -> Type {
        let callee = self.analyse_member_access(method, base, span);
        let kinds = vec![ArgKind::Pos; args.len()];
        let names = vec![None; args.len()];
        self.check_call(&callee, args, &kinds, &names, span).0
    }
}

fn declared_var_type(expr: &Expr) -> Option<Type> {
    match &unwrap_parens(expr).kind {
        ExprKind::Name(name) => match &name.node {
            crate::symbol::Symbol::Var(var) => var.ty(),
            _ => None,
        },
        _ => None,
    }
}

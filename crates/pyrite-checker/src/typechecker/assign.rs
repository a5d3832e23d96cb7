//! Assignments and local variable inference

use super::messages::{self, Msg};
use super::{Operand, TypeChecker};
use crate::ast::{
    unwrap_parens, AssignmentStmt, Expr, ExprKind, IndexExpr, OperatorAssignmentStmt, VarDef,
};
use crate::span::Span;
use crate::symbol::{RefKind, Symbol, VarRef};
use crate::types::Type;
use tracing::trace;

/// Assignment targets after unpacking a top-level tuple or list target
pub(crate) fn expand_lvalues(lvalue: &Expr) -> Vec<&Expr> {
    let lvalue = unwrap_parens(lvalue);
    match &lvalue.kind {
        ExprKind::Tuple(items) | ExprKind::List(items) => items.iter().map(unwrap_parens).collect(),
        _ => vec![lvalue],
    }
}

/// Can a variable get this type by inference? Types mentioning `None` are
/// not specific enough.
pub(crate) fn is_valid_inferred_type(ty: &Type) -> bool {
    match ty {
        Type::NoneTyp | Type::Void => false,
        Type::Instance(inst) => inst.args.iter().all(is_valid_inferred_type),
        Type::Tuple(items) => items.iter().all(is_valid_inferred_type),
        _ => true,
    }
}

/// What an assignment target needs from the value assigned to it
enum Lvalue<'e> {
    Typed(Type),
    Indexed(&'e IndexExpr),
    /// First assignment to a variable without a declared type
    Inferred(VarRef),
}

impl TypeChecker<'_> {
    /// `a = b = rvalue`: the rvalue is inferred once, against the last target
    pub(crate) fn check_assignment_stmt(&mut self, s: &AssignmentStmt) {
        let Some((last, rest)) = s.lvalues.split_last() else {
            self.accept(&s.rvalue, None);
            return;
        };
        let span = s.rvalue.span;
        self.check_assignments(&expand_lvalues(last), Operand::Expr(&s.rvalue), span);
        if rest.is_empty() {
            return;
        }

        let rvalue_type = if self.is_dynamic_function() {
            Type::Any
        } else {
            self.type_map.get(s.rvalue.id).cloned().unwrap_or(Type::Any)
        };
        for lvalue in rest {
            let rvalue = Operand::Temp(rvalue_type.clone());
            self.check_assignments(&expand_lvalues(lvalue), rvalue, span);
        }
    }

    pub(crate) fn check_assignments(&mut self, lvalues: &[&Expr], rvalue: Operand<'_>, span: Span) {
        if let [lvalue] = lvalues {
            match self.check_lvalue(lvalue) {
                Lvalue::Inferred(var) => {
                    let init_type = self.accept_operand(&rvalue, None);
                    let source = rvalue.expr();
                    self.infer_variable_type(&[Some(var)], &[Some(*lvalue)], init_type, source, span);
                }
                Lvalue::Typed(ty) => {
                    self.check_single_assignment(
                        Some(ty),
                        None,
                        rvalue,
                        span,
                        messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
                    );
                }
                Lvalue::Indexed(index) => {
                    self.check_single_assignment(
                        None,
                        Some(index),
                        rvalue,
                        span,
                        messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
                    );
                }
            }
            return;
        }

        let mut lvalue_types = Vec::with_capacity(lvalues.len());
        let mut index_lvalues = Vec::with_capacity(lvalues.len());
        let mut inferred = Vec::with_capacity(lvalues.len());
        for lvalue in lvalues {
            let (ty, index, var) = match self.check_lvalue(lvalue) {
                Lvalue::Typed(ty) => (Some(ty), None, None),
                Lvalue::Indexed(index) => (None, Some(index), None),
                Lvalue::Inferred(var) => (None, None, Some(var)),
            };
            lvalue_types.push(ty);
            index_lvalues.push(index);
            inferred.push(var);
        }

        let source = rvalue.expr();
        let rvalue_type = self.check_multi_assignment(
            &lvalue_types,
            &index_lvalues,
            rvalue,
            span,
            messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
        );
        if inferred.iter().any(Option::is_some) {
            let targets: Vec<Option<&Expr>> = lvalues.iter().map(|lv| Some(*lv)).collect();
            self.infer_variable_type(&inferred, &targets, rvalue_type, source, span);
        }
    }

    fn check_lvalue<'e>(&mut self, lvalue: &'e Expr) -> Lvalue<'e> {
        let lvalue = unwrap_parens(lvalue);
        match &lvalue.kind {
            ExprKind::Name(name) if name.is_def => match &name.node {
                Symbol::Var(var) => match var.ty() {
                    Some(ty) => {
                        self.store_type(lvalue, ty.clone());
                        Lvalue::Typed(ty)
                    }
                    None => Lvalue::Inferred(var.clone()),
                },
                _ => Lvalue::Typed(self.accept(lvalue, None)),
            },
            ExprKind::Member(member) if member.is_def => {
                self.accept(&member.expr, None);
                match &member.def_var {
                    Some(var) => match var.ty() {
                        Some(ty) => {
                            self.store_type(lvalue, ty.clone());
                            Lvalue::Typed(ty)
                        }
                        None => Lvalue::Inferred(var.clone()),
                    },
                    None => Lvalue::Typed(Type::Any),
                }
            }
            ExprKind::Member(member) => {
                let base = self.accept(&member.expr, None);
                let ty = self.analyse_member_access(&member.name, &base, lvalue.span);
                self.store_type(lvalue, ty.clone());
                Lvalue::Typed(ty)
            }
            ExprKind::Index(index) => Lvalue::Indexed(index),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                let types = items
                    .iter()
                    .map(|item| match self.check_lvalue(item) {
                        Lvalue::Typed(ty) => ty,
                        Lvalue::Inferred(var) => {
                            var.infer(Type::Any);
                            Type::Any
                        }
                        Lvalue::Indexed(_) => Type::Any,
                    })
                    .collect();
                Lvalue::Typed(Type::Tuple(types))
            }
            _ => Lvalue::Typed(self.accept(lvalue, None)),
        }
    }

    /// Check one value against one target; returns the value type when the
    /// value was inferred
    pub(crate) fn check_single_assignment(
        &mut self,
        lvalue_type: Option<Type>,
        index_lvalue: Option<&IndexExpr>,
        rvalue: Operand<'_>,
        span: Span,
        msg: Msg,
    ) -> Option<Type> {
        if let Some(lvalue_type) = lvalue_type {
            if let Operand::Expr(e) = &rvalue {
                if matches!(e.kind, ExprKind::Undefined(None)) {
                    self.store_type(e, lvalue_type.clone());
                    return Some(lvalue_type);
                }
            }
            let rvalue_type = self.accept_operand(&rvalue, Some(&lvalue_type));
            self.check_subtype(&rvalue_type, &lvalue_type, span, msg, rvalue.expr());
            Some(rvalue_type)
        } else if let Some(index) = index_lvalue {
            self.check_indexed_assignment(index, rvalue, span);
            None
        } else {
            Some(self.accept_operand(&rvalue, None))
        }
    }

    /// `base[index] = rvalue` is a call to `base.__setitem__(index, rvalue)`
    fn check_indexed_assignment(&mut self, index: &IndexExpr, rvalue: Operand<'_>, span: Span) {
        let base = self.accept(&index.base, None);
        let args = [Operand::Expr(&index.index), rvalue];
        self.check_method_call("__setitem__", &base, &args, span);
    }

    /// Unpack one value into several targets; returns the value type
    pub(crate) fn check_multi_assignment(
        &mut self,
        lvalue_types: &[Option<Type>],
        index_lvalues: &[Option<&IndexExpr>],
        rvalue: Operand<'_>,
        span: Span,
        msg: Msg,
    ) -> Type {
        let expected = lvalue_types.len();
        let rvalue_expr = rvalue.expr().map(unwrap_parens);

        if let Some(e) = rvalue_expr {
            if matches!(e.kind, ExprKind::Undefined(None)) {
                let declared = Type::Tuple(
                    lvalue_types
                        .iter()
                        .map(|t| t.clone().unwrap_or(Type::Any))
                        .collect(),
                );
                self.store_type(e, declared.clone());
                return declared;
            }
            if let ExprKind::Tuple(items) = &e.kind {
                if items.len() != expected {
                    self.fail(messages::incompatible_value_count(expected, items.len()), span);
                    if let Some(outer) = rvalue.expr() {
                        self.accept(outer, None);
                    }
                    return Type::Any;
                }
                let mut types = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let ty = self
                        .check_single_assignment(
                            lvalue_types[i].clone(),
                            index_lvalues[i],
                            Operand::Expr(item),
                            item.span,
                            msg,
                        )
                        .unwrap_or(Type::Any);
                    types.push(ty);
                }
                let tuple = Type::Tuple(types);
                self.store_type(e, tuple.clone());
                if let Some(outer) = rvalue.expr() {
                    self.store_type(outer, tuple.clone());
                }
                return tuple;
            }
        }

        let mut rvalue_type = self.accept_operand(&rvalue, None);
        let retry = match (&rvalue_type, rvalue.expr()) {
            (Type::Tuple(items), Some(e)) => {
                let context: Vec<Type> = lvalue_types
                    .iter()
                    .enumerate()
                    .filter_map(|(i, declared)| declared.clone().or_else(|| items.get(i).cloned()))
                    .collect();
                Some((e, Type::Tuple(context)))
            }
            _ => None,
        };
        // Infer again with the declared target types as context
        if let Some((e, context)) = retry {
            rvalue_type = self.accept(e, Some(&context));
        }
        match &rvalue_type {
            Type::Tuple(items) => {
                if items.len() != expected {
                    self.fail(messages::incompatible_value_count(expected, items.len()), span);
                } else {
                    for (i, item) in items.iter().enumerate() {
                        self.check_single_assignment(
                            lvalue_types[i].clone(),
                            index_lvalues[i],
                            Operand::Temp(item.clone()),
                            span,
                            msg,
                        );
                    }
                }
            }
            Type::Instance(inst) if inst.name == "builtins.list" => {
                let item = inst.args.first().cloned().unwrap_or(Type::Any);
                for i in 0..expected {
                    self.check_single_assignment(
                        lvalue_types[i].clone(),
                        index_lvalues[i],
                        Operand::Temp(item.clone()),
                        span,
                        msg,
                    );
                }
            }
            ty if ty.is_dynamic() => {
                for i in 0..expected {
                    self.check_single_assignment(
                        lvalue_types[i].clone(),
                        index_lvalues[i],
                        Operand::Temp(Type::Any),
                        span,
                        msg,
                    );
                }
            }
            _ => self.fail(msg, span),
        }
        rvalue_type
    }

    /// Give untyped targets the type of their initializer
    pub(crate) fn infer_variable_type(
        &mut self,
        names: &[Option<VarRef>],
        lvalues: &[Option<&Expr>],
        init_type: Type,
        source: Option<&Expr>,
        span: Span,
    ) {
        if init_type.is_void() {
            self.check_not_void(&init_type, source, span);
            self.infer_all_any(names, lvalues);
            return;
        }
        if !is_valid_inferred_type(&init_type) {
            self.fail(messages::NEED_ANNOTATION_FOR_VAR, span);
            self.infer_all_any(names, lvalues);
            return;
        }

        if let [name] = names {
            if let Some(var) = name {
                self.set_inferred_type(var, lvalues.first().copied().flatten(), init_type);
            }
            return;
        }

        let item_types: Vec<Type> = match &init_type {
            Type::Tuple(items) if items.len() == names.len() => items.clone(),
            Type::Instance(inst) if inst.name == "builtins.list" => {
                vec![inst.args.first().cloned().unwrap_or(Type::Any); names.len()]
            }
            // Arity or shape errors are reported by the multi-assignment check
            _ => vec![Type::Any; names.len()],
        };
        for (i, (name, ty)) in names.iter().zip(item_types).enumerate() {
            if let Some(var) = name {
                self.set_inferred_type(var, lvalues.get(i).copied().flatten(), ty);
            }
        }
    }

    fn infer_all_any(&mut self, names: &[Option<VarRef>], lvalues: &[Option<&Expr>]) {
        for (i, name) in names.iter().enumerate() {
            if let Some(var) = name {
                self.set_inferred_type(var, lvalues.get(i).copied().flatten(), Type::Any);
            }
        }
    }

    fn set_inferred_type(&mut self, var: &VarRef, lvalue: Option<&Expr>, ty: Type) {
        if var.infer(ty.stripped()) {
            trace!(var = %var.name, "inferred variable type");
        }
        if let Some(lvalue) = lvalue {
            self.store_type(lvalue, var.ty().unwrap_or(Type::Any));
        }
    }

    pub(crate) fn check_var_def(&mut self, def: &VarDef, span: Span) {
        let Some(first) = def.items.first() else {
            return;
        };
        let infers_locally = def.kind == RefKind::Local && !def.is_top_level;

        let Some(init) = &def.init else {
            if infers_locally && !first.has_type() && !self.is_dynamic_function() {
                self.fail(messages::NEED_ANNOTATION_FOR_VAR, span);
            }
            return;
        };

        if first.has_type() {
            if let [var] = def.items.as_slice() {
                self.check_single_assignment(
                    var.ty(),
                    None,
                    Operand::Expr(init),
                    span,
                    messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
                );
            } else {
                let declared: Vec<Option<Type>> =
                    def.items.iter().map(|v| Some(v.ty().unwrap_or(Type::Any))).collect();
                let indexes = vec![None; declared.len()];
                self.check_multi_assignment(
                    &declared,
                    &indexes,
                    Operand::Expr(init),
                    span,
                    messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
                );
            }
            return;
        }

        let init_type = self.accept(init, None);
        if infers_locally {
            let names: Vec<Option<VarRef>> = def.items.iter().cloned().map(Some).collect();
            let lvalues = vec![None; names.len()];
            self.infer_variable_type(&names, &lvalues, init_type, Some(init), span);
        }
    }

    pub(crate) fn check_operator_assignment(&mut self, s: &OperatorAssignmentStmt, span: Span) {
        let lvalue_type = self.accept(&s.lvalue, None);
        let Some(method) = s.op.method_name(self.options.python_version) else {
            self.accept(&s.rvalue, None);
            return;
        };
        let rvalue = Operand::Expr(&s.rvalue);
        let (result, _) = self.check_op(method, &lvalue_type, rvalue, s.op.symbol(), span);

        if let ExprKind::Index(index) = &unwrap_parens(&s.lvalue).kind {
            self.check_single_assignment(
                None,
                Some(index),
                Operand::Temp(result),
                span,
                messages::INCOMPATIBLE_TYPES_IN_ASSIGNMENT,
            );
        } else if !self.oracle.is_subtype(&result, &lvalue_type) {
            self.fail(messages::incompatible_operator_assignment(s.op.symbol()), span);
        }
    }
}

//! Expression type inference

use super::calls::has_type_vars;
use super::messages;
use super::narrowing::find_isinstance_check;
use super::{FunctionFrame, Operand, TypeChecker};
use crate::ast::{
    unwrap_parens, BinaryOp, ConditionalExpr, Expr, ExprKind, GeneratorExpr, IndexExpr,
    LambdaExpr, NameExpr, OpExpr, SliceExpr, TypeApplication, UnaryExpr, UnaryOp,
};
use crate::span::Span;
use crate::symbol::Symbol;
use crate::typeops::{expand_type, TypeVarMap};
use crate::types::{CallableType, Type};

impl TypeChecker<'_> {
    /// Infer the type of one expression; use [`accept`](Self::accept) to
    /// also record it
    pub(crate) fn infer_expr(&mut self, expr: &Expr) -> Type {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Name(name) => self.infer_name(name, span),
            ExprKind::Member(member) => {
                let base = self.accept(&member.expr, None);
                self.analyse_member_access(&member.name, &base, span)
            }
            ExprKind::Call(call) => self.infer_call(call, span),
            ExprKind::Paren(inner) => {
                let context = self.type_context().cloned();
                self.accept(inner, context.as_ref())
            }
            ExprKind::Int(_) => self.named_type("builtins.int"),
            ExprKind::Float(_) => self.named_type("builtins.float"),
            ExprKind::Str(_) => self.str_type(),
            ExprKind::Bytes(_) if self.options.python_version >= 3 => {
                self.named_type("builtins.bytes")
            }
            ExprKind::Bytes(_) => self.str_type(),
            ExprKind::Unicode(_) if self.options.python_version >= 3 => self.str_type(),
            ExprKind::Unicode(_) => self.named_type("builtins.unicode"),
            ExprKind::Op(op) => self.infer_op(op, span),
            ExprKind::Unary(unary) => self.infer_unary(unary, span),
            ExprKind::Index(index) => self.infer_index(index, span),
            ExprKind::Cast(cast) => {
                self.accept(&cast.expr, None);
                cast.ty.clone()
            }
            ExprKind::Super(name) => self.infer_super(name, span),
            ExprKind::TypeApplication(app) => self.infer_type_application(app, span),
            ExprKind::TypeVar(_) => Type::Any,
            ExprKind::List(items) => self.infer_sequence_display("builtins.list", "List", items),
            ExprKind::Set(items) => self.infer_sequence_display("builtins.set", "Set", items),
            ExprKind::Tuple(items) => self.infer_tuple_display(items),
            ExprKind::Dict(items) => self.infer_dict_display(items, span),
            ExprKind::Slice(slice) => self.infer_slice(slice),
            ExprKind::Lambda(lambda) => self.infer_lambda(lambda),
            ExprKind::ListComprehension(g) => {
                let context = self.context_item_type("builtins.list");
                let item = self.infer_generator(g, context, span);
                self.named_generic_type("builtins.list", vec![item])
            }
            ExprKind::Generator(g) => {
                let context = self.context_item_type("builtins.Iterator");
                let item = self.infer_generator(g, context, span);
                self.named_generic_type("builtins.Iterator", vec![item])
            }
            ExprKind::Undefined(ty) => ty.clone().unwrap_or(Type::Any),
            ExprKind::Conditional(cond) => self.infer_conditional(cond),
        }
    }

    fn infer_name(&mut self, name: &NameExpr, span: Span) -> Type {
        match &name.node {
            Symbol::Var(var) => match self.binder.get(var) {
                Some(ty) => ty,
                None => {
                    if !self.is_dynamic_function() {
                        self.fail(messages::cannot_determine_type(&name.name), span);
                    }
                    Type::Any
                }
            },
            Symbol::Func(func) => func.ty.clone(),
            Symbol::Class(class) => self.type_object_type(*class),
            Symbol::Module(_) | Symbol::TypeVar(_) => Type::Any,
        }
    }

    fn infer_op(&mut self, e: &OpExpr, span: Span) -> Type {
        match e.op {
            BinaryOp::And | BinaryOp::Or => {
                let left = self.accept(&e.left, None);
                let right = self.accept(&e.right, None);
                self.oracle.join(&left, &right)
            }
            BinaryOp::Is | BinaryOp::IsNot => {
                self.accept(&e.left, None);
                self.accept(&e.right, None);
                self.bool_type()
            }
            BinaryOp::In | BinaryOp::NotIn => {
                let container = self.accept(&e.right, None);
                let item = Operand::Expr(&e.left);
                self.check_op("__contains__", &container, item, e.op.symbol(), span);
                self.bool_type()
            }
            op => {
                let left = self.accept(&e.left, None);
                match op.method_name(self.options.python_version) {
                    Some(method) => {
                        self.check_op(method, &left, Operand::Expr(&e.right), op.symbol(), span).0
                    }
                    None => {
                        self.accept(&e.right, None);
                        Type::Any
                    }
                }
            }
        }
    }

    /// `base.method(arg)` for an operator; returns the result type and the
    /// method signature that was used
    pub(crate) fn check_op(
        &mut self,
        method: &str,
        base: &Type,
        arg: Operand<'_>,
        op: &str,
        span: Span,
    ) -> (Type, Type) {
        if base.is_dynamic() {
            self.accept_operand(&arg, None);
            return (Type::Any, Type::Any);
        }
        let Some(method_type) = self.member_type(method, base) else {
            self.fail(messages::unsupported_left_operand(op, base), span);
            self.accept_operand(&arg, None);
            return (Type::Any, Type::Any);
        };

        let context = match &method_type {
            Type::Callable(sig) => sig
                .arg_types
                .first()
                .filter(|t| !has_type_vars(t))
                .cloned(),
            _ => None,
        };
        let arg_type = self.accept_operand(&arg, context.as_ref());

        let accepts = |sig: &CallableType, checker: &Self| {
            sig.arg_types
                .first()
                .is_some_and(|formal| checker.oracle.is_subtype(&arg_type, formal))
        };
        match &method_type {
            Type::Callable(sig) => {
                if !accepts(sig, &*self) {
                    self.fail(messages::unsupported_operand_types(op, base, &arg_type), span);
                }
                ((*sig.ret_type).clone(), method_type.clone())
            }
            Type::Overloaded(items) => match items.iter().find(|sig| accepts(*sig, &*self)) {
                Some(sig) => ((*sig.ret_type).clone(), Type::Callable(sig.clone())),
                None => {
                    self.fail(messages::unsupported_operand_types(op, base, &arg_type), span);
                    (Type::Any, method_type.clone())
                }
            },
            ty if ty.is_dynamic() => (Type::Any, Type::Any),
            _ => {
                self.fail(messages::unsupported_left_operand(op, base), span);
                (Type::Any, Type::Any)
            }
        }
    }

    fn infer_unary(&mut self, e: &UnaryExpr, span: Span) -> Type {
        let operand = self.accept(&e.expr, None);
        let Some(method) = e.op.method_name() else {
            return self.bool_type();
        };
        if operand.is_dynamic() {
            return Type::Any;
        }
        match self.member_type(method, &operand) {
            Some(method_type) => self.check_call(&method_type, &[], &[], &[], span).0,
            None => {
                self.fail(messages::unsupported_unary_operand(e.op.symbol(), &operand), span);
                Type::Any
            }
        }
    }

    fn infer_index(&mut self, e: &IndexExpr, span: Span) -> Type {
        let base = self.accept(&e.base, None);
        let Type::Tuple(items) = &base else {
            return self.check_method_call("__getitem__", &base, &[Operand::Expr(&e.index)], span);
        };

        self.accept(&e.index, None);
        let literal = match &unwrap_parens(&e.index).kind {
            ExprKind::Int(n) => Some(*n),
            ExprKind::Unary(u) if u.op == UnaryOp::Neg => match &unwrap_parens(&u.expr).kind {
                ExprKind::Int(n) => Some(-n),
                _ => None,
            },
            _ => None,
        };
        let Some(n) = literal else {
            self.fail(messages::TUPLE_INDEX_MUST_BE_AN_INT_LITERAL, span);
            return Type::Any;
        };
        let len = items.len() as i64;
        let position = if n < 0 { n + len } else { n };
        match usize::try_from(position).ok().and_then(|p| items.get(p)) {
            Some(item) => item.clone(),
            None => {
                self.fail(messages::TUPLE_INDEX_OUT_OF_RANGE, span);
                Type::Any
            }
        }
    }

    fn infer_type_application(&mut self, app: &TypeApplication, span: Span) -> Type {
        let ty = self.accept(&app.expr, None);
        let apply = |sig: &CallableType| -> Option<CallableType> {
            if sig.variables.len() != app.types.len() {
                return None;
            }
            let map: TypeVarMap = sig
                .variables
                .iter()
                .map(|v| v.id)
                .zip(app.types.iter().cloned())
                .collect();
            match expand_type(&Type::Callable(sig.clone()), &map) {
                Type::Callable(mut applied) => {
                    applied.variables.clear();
                    Some(applied)
                }
                _ => None,
            }
        };
        let applied = match &ty {
            Type::Callable(sig) => apply(sig).map(Type::Callable),
            Type::Overloaded(items) => items
                .iter()
                .map(apply)
                .collect::<Option<Vec<_>>>()
                .map(Type::Overloaded),
            other if other.is_dynamic() => return Type::Any,
            _ => None,
        };
        applied.unwrap_or_else(|| {
            let expected = ty.items().first().map_or(0, |sig| sig.variables.len());
            self.fail(messages::invalid_type_application(expected, app.types.len()), span);
            Type::Any
        })
    }

    /// Item type of the expected type when it is an instance of `fullname`
    fn context_item_type(&self, fullname: &str) -> Option<Type> {
        match self.type_context() {
            Some(Type::Instance(inst)) if inst.name == fullname && inst.args.len() == 1 => {
                inst.args.first().cloned()
            }
            _ => None,
        }
    }

    fn infer_sequence_display(&mut self, fullname: &str, kind: &str, items: &[Expr]) -> Type {
        if let Some(item_type) = self.context_item_type(fullname) {
            for (i, item) in items.iter().enumerate() {
                let ty = self.accept(item, Some(&item_type));
                if !self.oracle.is_subtype(&ty, &item_type) {
                    self.fail(messages::incompatible_display_item(kind, i + 1, &ty), item.span);
                }
            }
            return self.named_generic_type(fullname, vec![item_type]);
        }

        let mut joined = Type::NoneTyp;
        for item in items {
            let ty = self.accept(item, None);
            joined = self.oracle.join(&joined, &ty);
        }
        if matches!(joined, Type::Error) {
            if let Some(first) = items.first() {
                self.fail(messages::cannot_infer_display_item(kind), first.span);
            }
            joined = Type::Any;
        }
        self.named_generic_type(fullname, vec![joined])
    }

    fn infer_tuple_display(&mut self, items: &[Expr]) -> Type {
        let contexts: Vec<Option<Type>> = match self.type_context() {
            Some(Type::Tuple(expected)) if expected.len() == items.len() => {
                expected.iter().cloned().map(Some).collect()
            }
            _ => vec![None; items.len()],
        };
        Type::Tuple(
            items
                .iter()
                .zip(contexts)
                .map(|(item, context)| self.accept(item, context.as_ref()))
                .collect(),
        )
    }

    fn infer_dict_display(&mut self, items: &[(Expr, Expr)], span: Span) -> Type {
        let expected = match self.type_context() {
            Some(Type::Instance(inst)) if inst.name == "builtins.dict" && inst.args.len() == 2 => {
                Some((inst.args[0].clone(), inst.args[1].clone()))
            }
            _ => None,
        };
        if let Some((key_type, value_type)) = expected {
            for (i, (key, value)) in items.iter().enumerate() {
                let k = self.accept(key, Some(&key_type));
                let v = self.accept(value, Some(&value_type));
                if !self.oracle.is_subtype(&k, &key_type)
                    || !self.oracle.is_subtype(&v, &value_type)
                {
                    let entry = Type::Tuple(vec![k, v]);
                    self.fail(messages::incompatible_display_item("Dict", i + 1, &entry), key.span);
                }
            }
            return self.named_generic_type("builtins.dict", vec![key_type, value_type]);
        }

        let mut keys = Type::NoneTyp;
        let mut values = Type::NoneTyp;
        for (key, value) in items {
            let k = self.accept(key, None);
            let v = self.accept(value, None);
            keys = self.oracle.join(&keys, &k);
            values = self.oracle.join(&values, &v);
        }
        if matches!(keys, Type::Error) || matches!(values, Type::Error) {
            self.fail(messages::cannot_infer_display_item("Dict"), span);
            keys = Type::Any;
            values = Type::Any;
        }
        self.named_generic_type("builtins.dict", vec![keys, values])
    }

    fn infer_slice(&mut self, slice: &SliceExpr) -> Type {
        let int = self.named_type("builtins.int");
        for bound in [&slice.begin, &slice.end, &slice.stride].into_iter().flatten() {
            let ty = self.accept(bound, None);
            if !self.oracle.is_subtype(&ty, &int) {
                self.fail(messages::INVALID_SLICE_INDEX, bound.span);
            }
        }
        self.named_type("builtins.slice")
    }

    /// Lambdas take argument types from an expected callable type
    fn infer_lambda(&mut self, lambda: &LambdaExpr) -> Type {
        let n = lambda.args.len();
        let expected = match self.type_context() {
            Some(Type::Callable(sig)) if sig.arg_types.len() == n => Some(sig.clone()),
            _ => None,
        };
        let (arg_types, ret_context) = match expected {
            Some(sig) => (sig.arg_types, Some(*sig.ret_type)),
            None => (vec![Type::Any; n], None),
        };

        let frame = FunctionFrame {
            name: None,
            dynamic: self.is_dynamic_function(),
            is_generator: false,
        };
        let body_type = self.with_function(frame, |c| {
            c.with_local_scope(|c| {
                for (var, ty) in lambda.args.iter().zip(&arg_types) {
                    var.set_type(ty.clone());
                    c.declare_local(var);
                }
                c.accept(&lambda.body, ret_context.as_ref())
            })
        });

        let names = lambda.args.iter().map(|a| Some(a.name.clone())).collect();
        Type::Callable(CallableType::new(arg_types, lambda.arg_kinds.clone(), names, body_type))
    }

    fn infer_generator(
        &mut self,
        g: &GeneratorExpr,
        item_context: Option<Type>,
        span: Span,
    ) -> Type {
        for (i, sequence) in g.sequences.iter().enumerate() {
            let item_type = self.analyse_iterable_item_type(sequence);
            if let Some(index) = g.indices.get(i) {
                self.analyse_index_variables(index, false, item_type, span);
            }
            for condition in g.conditions.get(i).into_iter().flatten() {
                self.accept(condition, None);
            }
        }
        self.accept(&g.left, item_context.as_ref())
    }

    fn infer_conditional(&mut self, e: &ConditionalExpr) -> Type {
        let context = self.type_context().cloned();
        self.accept(&e.cond, None);
        let check =
            find_isinstance_check(&e.cond, &self.type_map, &self.binder, self.oracle.as_ref());
        let narrowing = check.map(|c| (c.var, c.target));
        let if_type = self.with_narrowing(narrowing, |c| c.accept(&e.if_expr, context.as_ref()));
        let else_type = self.accept(&e.else_expr, context.as_ref());
        self.oracle.join(&if_type, &else_type)
    }
}

//! Copies of function bodies with a type variable substituted
//!
//! A function whose type variable is restricted to a fixed set of values is
//! checked once per value. Each check works on its own copy of the body:
//! node ids are fresh so inferred types of different copies never collide,
//! and every variable local to the function is replaced by a fresh one so
//! inference in one copy cannot leak into another.

use crate::ast::{
    AssignmentStmt, CallExpr, CastExpr, ClassDef, ConditionalExpr, Decorator, Expr, ExprKind,
    ForStmt, FuncDef, FuncItem, GeneratorExpr, IfStmt, IndexExpr, LambdaExpr, MemberExpr, NameExpr,
    NodeId, OpExpr, OperatorAssignmentStmt, OverloadedFuncDef, RaiseStmt, SliceExpr, Stmt,
    StmtKind, TryStmt, TypeApplication, UnaryExpr, VarDef, WhileStmt, WithStmt,
};
use crate::symbol::{RefKind, Symbol, Var, VarRef};
use crate::typeops::{expand_type, TypeVarMap};
use crate::types::{CallableType, Type};
use std::collections::HashMap;

pub(crate) struct FuncExpander<'m> {
    map: &'m TypeVarMap,
    vars: HashMap<VarRef, VarRef>,
    next_id: &'m mut u32,
}

impl<'m> FuncExpander<'m> {
    pub fn expand(item: &FuncItem, map: &'m TypeVarMap, next_id: &'m mut u32) -> FuncItem {
        let mut expander = FuncExpander {
            map,
            vars: HashMap::new(),
            next_id,
        };
        expander.item(item)
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(*self.next_id);
        *self.next_id += 1;
        id
    }

    fn ty(&self, ty: &Type) -> Type {
        expand_type(ty, self.map)
    }

    fn callable(&self, sig: &CallableType) -> CallableType {
        match self.ty(&Type::Callable(sig.clone())) {
            Type::Callable(expanded) => expanded,
            _ => sig.clone(),
        }
    }

    fn fresh_var(&mut self, var: &VarRef) -> VarRef {
        let copy = Var::detailed(
            var.name.clone(),
            var.fullname.clone(),
            var.info,
            var.ty().map(|t| self.ty(&t)),
        );
        self.vars.insert(var.clone(), copy.clone());
        copy
    }

    fn var(&self, var: &VarRef) -> VarRef {
        self.vars.get(var).cloned().unwrap_or_else(|| var.clone())
    }

    fn item(&mut self, item: &FuncItem) -> FuncItem {
        let args = item.args.iter().map(|a| self.fresh_var(a)).collect();
        let init = item
            .init
            .iter()
            .map(|default| default.as_ref().map(|e| self.expr(e)))
            .collect();
        FuncItem {
            args,
            arg_kinds: item.arg_kinds.clone(),
            init,
            body: self.block(&item.body),
            ty: item.ty.as_ref().map(|sig| self.callable(sig)),
            is_generator: item.is_generator,
            span: item.span,
        }
    }

    fn func_def(&mut self, def: &FuncDef) -> FuncDef {
        FuncDef {
            item: self.item(&def.item),
            ..def.clone()
        }
    }

    fn block(&mut self, block: &[Stmt]) -> Vec<Stmt> {
        block.iter().map(|s| self.stmt(s)).collect()
    }

    fn opt_block(&mut self, block: &Option<Vec<Stmt>>) -> Option<Vec<Stmt>> {
        block.as_ref().map(|b| self.block(b))
    }

    fn stmt(&mut self, stmt: &Stmt) -> Stmt {
        let kind = match &stmt.kind {
            StmtKind::VarDef(def) => {
                let init = def.init.as_ref().map(|e| self.expr(e));
                let items = if def.kind == RefKind::Local {
                    def.items.iter().map(|v| self.fresh_var(v)).collect()
                } else {
                    def.items.clone()
                };
                StmtKind::VarDef(VarDef {
                    items,
                    kind: def.kind,
                    is_top_level: def.is_top_level,
                    init,
                })
            }
            StmtKind::Func(def) => StmtKind::Func(self.func_def(def)),
            StmtKind::OverloadedFunc(def) => StmtKind::OverloadedFunc(OverloadedFuncDef {
                items: def.items.iter().map(|d| self.func_def(d)).collect(),
                info: def.info,
                symbol: def.symbol.clone(),
            }),
            StmtKind::Class(def) => StmtKind::Class(ClassDef {
                name: def.name.clone(),
                info: def.info,
                defs: self.block(&def.defs),
            }),
            StmtKind::Decorator(dec) => StmtKind::Decorator(Decorator {
                func: self.func_def(&dec.func),
                decorators: self.exprs(&dec.decorators),
                var: dec.var.clone(),
            }),
            StmtKind::Assign(s) => {
                // The value is evaluated before the targets are bound
                let rvalue = self.expr(&s.rvalue);
                StmtKind::Assign(AssignmentStmt {
                    lvalues: self.exprs(&s.lvalues),
                    rvalue,
                })
            }
            StmtKind::OperatorAssign(s) => StmtKind::OperatorAssign(OperatorAssignmentStmt {
                op: s.op,
                lvalue: self.expr(&s.lvalue),
                rvalue: self.expr(&s.rvalue),
            }),
            StmtKind::Expr(e) => StmtKind::Expr(self.expr(e)),
            StmtKind::Return(value) => StmtKind::Return(value.as_ref().map(|e| self.expr(e))),
            StmtKind::Yield(e) => StmtKind::Yield(self.expr(e)),
            StmtKind::If(s) => StmtKind::If(IfStmt {
                exprs: self.exprs(&s.exprs),
                bodies: s.bodies.iter().map(|b| self.block(b)).collect(),
                else_body: self.opt_block(&s.else_body),
            }),
            StmtKind::While(s) => StmtKind::While(WhileStmt {
                expr: self.expr(&s.expr),
                body: self.block(&s.body),
                else_body: self.opt_block(&s.else_body),
            }),
            StmtKind::For(s) => {
                let expr = self.expr(&s.expr);
                StmtKind::For(ForStmt {
                    index: self.exprs(&s.index),
                    is_annotated: s.is_annotated,
                    expr,
                    body: self.block(&s.body),
                    else_body: self.opt_block(&s.else_body),
                })
            }
            StmtKind::With(s) => {
                let exprs = self.exprs(&s.exprs);
                StmtKind::With(WithStmt {
                    exprs,
                    targets: s
                        .targets
                        .iter()
                        .map(|t| t.as_ref().map(|e| self.expr(e)))
                        .collect(),
                    body: self.block(&s.body),
                })
            }
            StmtKind::Assert(e) => StmtKind::Assert(self.expr(e)),
            StmtKind::Raise(s) => StmtKind::Raise(RaiseStmt {
                expr: s.expr.as_ref().map(|e| self.expr(e)),
                from_expr: s.from_expr.as_ref().map(|e| self.expr(e)),
            }),
            StmtKind::Try(s) => StmtKind::Try(TryStmt {
                body: self.block(&s.body),
                types: s.types.iter().map(|t| t.as_ref().map(|e| self.expr(e))).collect(),
                vars: s.vars.iter().map(|v| v.as_ref().map(|e| self.expr(e))).collect(),
                handlers: s.handlers.iter().map(|h| self.block(h)).collect(),
                else_body: self.opt_block(&s.else_body),
                finally_body: self.opt_block(&s.finally_body),
            }),
            StmtKind::Del(e) => StmtKind::Del(self.expr(e)),
            StmtKind::Print(args) => StmtKind::Print(self.exprs(args)),
            StmtKind::Pass => StmtKind::Pass,
            StmtKind::Break => StmtKind::Break,
            StmtKind::Continue => StmtKind::Continue,
            StmtKind::Global(names) => StmtKind::Global(names.clone()),
            StmtKind::Import(names) => StmtKind::Import(names.clone()),
        };
        Stmt {
            span: stmt.span,
            kind,
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) -> Vec<Expr> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&mut self, expr: &Expr) -> Box<Expr> {
        Box::new(self.expr(expr))
    }

    fn opt_boxed(&mut self, expr: &Option<Box<Expr>>) -> Option<Box<Expr>> {
        expr.as_ref().map(|e| self.boxed(e))
    }

    fn expr(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Name(name) => ExprKind::Name(self.name(name)),
            ExprKind::Member(m) => ExprKind::Member(MemberExpr {
                expr: self.boxed(&m.expr),
                name: m.name.clone(),
                def_var: m.def_var.clone(),
                is_def: m.is_def,
            }),
            ExprKind::Call(call) => ExprKind::Call(CallExpr {
                callee: self.boxed(&call.callee),
                args: self.exprs(&call.args),
                arg_kinds: call.arg_kinds.clone(),
                arg_names: call.arg_names.clone(),
            }),
            ExprKind::Paren(inner) => ExprKind::Paren(self.boxed(inner)),
            ExprKind::Op(op) => ExprKind::Op(OpExpr {
                op: op.op,
                left: self.boxed(&op.left),
                right: self.boxed(&op.right),
            }),
            ExprKind::Unary(u) => ExprKind::Unary(UnaryExpr {
                op: u.op,
                expr: self.boxed(&u.expr),
            }),
            ExprKind::Index(ix) => ExprKind::Index(IndexExpr {
                base: self.boxed(&ix.base),
                index: self.boxed(&ix.index),
            }),
            ExprKind::Cast(cast) => ExprKind::Cast(CastExpr {
                expr: self.boxed(&cast.expr),
                ty: self.ty(&cast.ty),
            }),
            ExprKind::TypeApplication(app) => ExprKind::TypeApplication(TypeApplication {
                expr: self.boxed(&app.expr),
                types: app.types.iter().map(|t| self.ty(t)).collect(),
            }),
            ExprKind::List(items) => ExprKind::List(self.exprs(items)),
            ExprKind::Set(items) => ExprKind::Set(self.exprs(items)),
            ExprKind::Tuple(items) => ExprKind::Tuple(self.exprs(items)),
            ExprKind::Dict(items) => ExprKind::Dict(
                items
                    .iter()
                    .map(|(k, v)| (self.expr(k), self.expr(v)))
                    .collect(),
            ),
            ExprKind::Slice(slice) => ExprKind::Slice(SliceExpr {
                begin: self.opt_boxed(&slice.begin),
                end: self.opt_boxed(&slice.end),
                stride: self.opt_boxed(&slice.stride),
            }),
            ExprKind::Lambda(lambda) => {
                let args = lambda.args.iter().map(|a| self.fresh_var(a)).collect();
                ExprKind::Lambda(LambdaExpr {
                    args,
                    arg_kinds: lambda.arg_kinds.clone(),
                    body: self.boxed(&lambda.body),
                })
            }
            ExprKind::ListComprehension(g) => ExprKind::ListComprehension(self.generator(g)),
            ExprKind::Generator(g) => ExprKind::Generator(self.generator(g)),
            ExprKind::Undefined(ty) => ExprKind::Undefined(ty.as_ref().map(|t| self.ty(t))),
            ExprKind::Conditional(c) => ExprKind::Conditional(ConditionalExpr {
                cond: self.boxed(&c.cond),
                if_expr: self.boxed(&c.if_expr),
                else_expr: self.boxed(&c.else_expr),
            }),
            ExprKind::Int(_)
            | ExprKind::Str(_)
            | ExprKind::Bytes(_)
            | ExprKind::Unicode(_)
            | ExprKind::Float(_)
            | ExprKind::Super(_)
            | ExprKind::TypeVar(_) => expr.kind.clone(),
        };
        Expr {
            id: self.node_id(),
            span: expr.span,
            kind,
        }
    }

    fn name(&mut self, name: &NameExpr) -> NameExpr {
        let node = match &name.node {
            Symbol::Var(var)
                if name.is_def && name.kind == RefKind::Local && !self.vars.contains_key(var) =>
            {
                Symbol::Var(self.fresh_var(var))
            }
            Symbol::Var(var) => Symbol::Var(self.var(var)),
            other => other.clone(),
        };
        NameExpr {
            node,
            ..name.clone()
        }
    }

    /// Index variables are bound before the element expression uses them
    fn generator(&mut self, g: &GeneratorExpr) -> GeneratorExpr {
        let sequences = self.exprs(&g.sequences);
        let indices = g.indices.iter().map(|index| self.exprs(index)).collect();
        let conditions = g.conditions.iter().map(|conds| self.exprs(conds)).collect();
        GeneratorExpr {
            left: self.boxed(&g.left),
            indices,
            sequences,
            conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::types::ArgKind;

    fn name_expr(var: &VarRef, id: u32, is_def: bool) -> Expr {
        Expr {
            id: NodeId(id),
            span: Span::default(),
            kind: ExprKind::Name(NameExpr {
                name: var.name.clone(),
                fullname: var.fullname.clone(),
                kind: RefKind::Local,
                node: Symbol::Var(var.clone()),
                is_def,
            }),
        }
    }

    fn var_of(expr: &Expr) -> VarRef {
        match &expr.kind {
            ExprKind::Name(NameExpr {
                node: Symbol::Var(v), ..
            }) => v.clone(),
            other => panic!("not a variable reference: {:?}", other),
        }
    }

    #[test]
    fn test_locals_are_renamed_consistently() {
        let arg = Var::new("x");
        let local = Var::new("y");
        let item = FuncItem {
            args: vec![arg.clone()],
            arg_kinds: vec![ArgKind::Pos],
            init: vec![None],
            body: vec![
                Stmt {
                    span: Span::default(),
                    kind: StmtKind::Assign(AssignmentStmt {
                        lvalues: vec![name_expr(&local, 1, true)],
                        rvalue: name_expr(&arg, 2, false),
                    }),
                },
                Stmt {
                    span: Span::default(),
                    kind: StmtKind::Return(Some(name_expr(&local, 3, false))),
                },
            ],
            ty: None,
            is_generator: false,
            span: Span::default(),
        };

        let mut next_id = 100;
        let copy = FuncExpander::expand(&item, &TypeVarMap::new(), &mut next_id);
        assert_eq!(next_id, 103);
        assert!(copy.args[0] != arg);

        let StmtKind::Assign(assign) = &copy.body[0].kind else {
            panic!("expected assignment");
        };
        assert!(var_of(&assign.rvalue) == copy.args[0]);
        let defined = var_of(&assign.lvalues[0]);
        assert!(defined != local);

        let StmtKind::Return(Some(returned)) = &copy.body[1].kind else {
            panic!("expected return");
        };
        assert!(var_of(returned) == defined);
        assert!(returned.id.0 >= 100);
    }
}

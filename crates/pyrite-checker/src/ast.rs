//! Resolved syntax tree
//!
//! The checker consumes trees in which every name already carries its
//! declaration. The tree shape is never mutated; the only mutable slots are
//! the type cells inside [`Var`](crate::symbol::Var).

use crate::span::Span;
use crate::symbol::{
    ClassId, ClassTable, FuncRef, LookupError, RefKind, Symbol, SymbolTable, VarRef,
};
use crate::types::{ArgKind, CallableType, Type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of an expression node; keys the type map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Name(NameExpr),
    Member(MemberExpr),
    Call(CallExpr),
    Paren(Box<Expr>),
    Int(i64),
    Str(String),
    Bytes(String),
    Unicode(String),
    Float(f64),
    Op(OpExpr),
    Unary(UnaryExpr),
    Index(IndexExpr),
    Cast(CastExpr),
    /// `super().name`
    Super(String),
    TypeApplication(TypeApplication),
    /// `T = TypeVar('T')`
    TypeVar(String),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Slice(SliceExpr),
    Lambda(LambdaExpr),
    ListComprehension(GeneratorExpr),
    Generator(GeneratorExpr),
    /// `Undefined` (no type: the deferred-value placeholder) or `Undefined(T)`
    Undefined(Option<Type>),
    Conditional(ConditionalExpr),
}

#[derive(Debug, Clone)]
pub struct NameExpr {
    pub name: String,
    pub fullname: String,
    pub kind: RefKind,
    pub node: Symbol,
    /// This occurrence introduces the name
    pub is_def: bool,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub expr: Box<Expr>,
    pub name: String,
    /// Member variable introduced by assigning through `self`
    pub def_var: Option<VarRef>,
    pub is_def: bool,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub arg_kinds: Vec<ArgKind>,
    pub arg_names: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct OpExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TypeApplication {
    pub expr: Box<Expr>,
    pub types: Vec<Type>,
}

#[derive(Debug, Clone)]
pub struct SliceExpr {
    pub begin: Option<Box<Expr>>,
    pub end: Option<Box<Expr>>,
    pub stride: Option<Box<Expr>>,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub args: Vec<VarRef>,
    pub arg_kinds: Vec<ArgKind>,
    pub body: Box<Expr>,
}

/// `left for index in sequence if condition ...`
#[derive(Debug, Clone)]
pub struct GeneratorExpr {
    pub left: Box<Expr>,
    pub indices: Vec<Vec<Expr>>,
    pub sequences: Vec<Expr>,
    pub conditions: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub cond: Box<Expr>,
    pub if_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
    And,
    Or,
}

impl BinaryOp {
    /// Operator method resolved on the left operand (right operand for `in`)
    pub fn method_name(self, python_version: u32) -> Option<&'static str> {
        Some(match self {
            BinaryOp::Add => "__add__",
            BinaryOp::Sub => "__sub__",
            BinaryOp::Mul => "__mul__",
            BinaryOp::Div if python_version >= 3 => "__truediv__",
            BinaryOp::Div => "__div__",
            BinaryOp::FloorDiv => "__floordiv__",
            BinaryOp::Mod => "__mod__",
            BinaryOp::Pow => "__pow__",
            BinaryOp::BitAnd => "__and__",
            BinaryOp::BitOr => "__or__",
            BinaryOp::BitXor => "__xor__",
            BinaryOp::LShift => "__lshift__",
            BinaryOp::RShift => "__rshift__",
            BinaryOp::Eq => "__eq__",
            BinaryOp::Ne => "__ne__",
            BinaryOp::Lt => "__lt__",
            BinaryOp::Gt => "__gt__",
            BinaryOp::Le => "__le__",
            BinaryOp::Ge => "__ge__",
            BinaryOp::In | BinaryOp::NotIn => "__contains__",
            BinaryOp::Is | BinaryOp::IsNot | BinaryOp::And | BinaryOp::Or => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Is => "is",
            BinaryOp::IsNot => "is not",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

impl UnaryOp {
    pub fn method_name(self) -> Option<&'static str> {
        match self {
            UnaryOp::Neg => Some("__neg__"),
            UnaryOp::Pos => Some("__pos__"),
            UnaryOp::Invert => Some("__invert__"),
            UnaryOp::Not => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    VarDef(VarDef),
    Func(FuncDef),
    OverloadedFunc(OverloadedFuncDef),
    Class(ClassDef),
    Decorator(Decorator),
    Assign(AssignmentStmt),
    OperatorAssign(OperatorAssignmentStmt),
    Expr(Expr),
    Return(Option<Expr>),
    Yield(Expr),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    With(WithStmt),
    Assert(Expr),
    Raise(RaiseStmt),
    Try(TryStmt),
    Del(Expr),
    Print(Vec<Expr>),
    Pass,
    Break,
    Continue,
    Global(Vec<String>),
    /// Imports are resolved before checking
    Import(Vec<String>),
}

/// `x, y = init` style declaration with optional explicit types on the vars
#[derive(Debug, Clone)]
pub struct VarDef {
    pub items: Vec<VarRef>,
    pub kind: RefKind,
    /// Declared outside any function
    pub is_top_level: bool,
    pub init: Option<Expr>,
}

/// Shared part of named functions and other function-like nodes
#[derive(Debug, Clone)]
pub struct FuncItem {
    pub args: Vec<VarRef>,
    pub arg_kinds: Vec<ArgKind>,
    /// Default value expressions, one slot per argument
    pub init: Vec<Option<Expr>>,
    pub body: Block,
    /// Declared signature; `None` for a dynamically typed function
    pub ty: Option<CallableType>,
    pub is_generator: bool,
    pub span: Span,
}

impl FuncItem {
    /// Declared signature, or the implicit all-`Any` one
    pub fn function_type(&self) -> CallableType {
        match &self.ty {
            Some(sig) => sig.clone(),
            None => CallableType::implicit(
                self.arg_kinds.clone(),
                self.args.iter().map(|a| Some(a.name.clone())).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,
    pub fullname: String,
    /// Enclosing class for methods
    pub info: Option<ClassId>,
    pub item: FuncItem,
    pub is_abstract: bool,
    /// Earlier definition of the same name this one conditionally replaces
    pub original_def: Option<FuncRef>,
    pub symbol: FuncRef,
}

#[derive(Debug, Clone)]
pub struct OverloadedFuncDef {
    pub items: Vec<FuncDef>,
    pub info: Option<ClassId>,
    pub symbol: FuncRef,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub info: ClassId,
    pub defs: Block,
}

#[derive(Debug, Clone)]
pub struct Decorator {
    pub func: FuncDef,
    /// In source order; the last one is closest to the function
    pub decorators: Vec<Expr>,
    /// Variable that receives the decorated value
    pub var: VarRef,
}

/// `a = b = rvalue`; lvalues in source order
#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub lvalues: Vec<Expr>,
    pub rvalue: Expr,
}

#[derive(Debug, Clone)]
pub struct OperatorAssignmentStmt {
    pub op: BinaryOp,
    pub lvalue: Expr,
    pub rvalue: Expr,
}

/// `if e0: b0 elif e1: b1 ... else: else_body`
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub exprs: Vec<Expr>,
    pub bodies: Vec<Block>,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub expr: Expr,
    pub body: Block,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    /// Index names; each refers to a `Var`
    pub index: Vec<Expr>,
    /// Index variables carry explicit types
    pub is_annotated: bool,
    pub expr: Expr,
    pub body: Block,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct WithStmt {
    pub exprs: Vec<Expr>,
    pub targets: Vec<Option<Expr>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RaiseStmt {
    pub expr: Option<Expr>,
    pub from_expr: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub body: Block,
    /// Caught type expression per handler (`None` for a bare `except`)
    pub types: Vec<Option<Expr>>,
    /// Bound name per handler
    pub vars: Vec<Option<Expr>>,
    pub handlers: Vec<Block>,
    pub else_body: Option<Block>,
    pub finally_body: Option<Block>,
}

/// One source file after semantic analysis
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub path: String,
    pub defs: Block,
    pub names: SymbolTable,
}

/// Every module of a run plus the class arena
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub modules: BTreeMap<String, Module>,
    pub classes: ClassTable,
    /// First node id not used by any tree in the program
    pub next_node_id: u32,
}

impl Program {
    pub fn module(&self, name: &str) -> Result<&Module, LookupError> {
        self.modules
            .get(name)
            .ok_or_else(|| LookupError::UnknownModule(name.to_string()))
    }

    /// Resolve `module.name` (module names may themselves contain dots)
    pub fn lookup_qualified(&self, name: &str) -> Result<&Symbol, LookupError> {
        let parts: Vec<&str> = name.split('.').collect();
        for split in (1..parts.len()).rev() {
            let module_name = parts[..split].join(".");
            let Some(mut module) = self.modules.get(&module_name) else {
                continue;
            };
            for (i, part) in parts[split..].iter().enumerate() {
                let node = module.names.get(part).ok_or_else(|| LookupError::UnknownName {
                    module: module.name.clone(),
                    name: (*part).to_string(),
                })?;
                if i + split == parts.len() - 1 {
                    return Ok(&node.symbol);
                }
                match &node.symbol {
                    Symbol::Module(next) => module = self.module(next)?,
                    _ => return Err(LookupError::UnknownModule(parts[..=i + split].join("."))),
                }
            }
        }
        Err(LookupError::UnknownModule(
            parts.first().copied().unwrap_or_default().to_string(),
        ))
    }

    /// Resolve a qualified name that must denote a class
    pub fn lookup_class(&self, name: &str) -> Result<ClassId, LookupError> {
        match self.lookup_qualified(name)? {
            Symbol::Class(id) => Ok(*id),
            _ => Err(LookupError::NotAClass(name.to_string())),
        }
    }
}

/// Strip any number of enclosing parentheses
pub fn unwrap_parens(mut expr: &Expr) -> &Expr {
    while let ExprKind::Paren(inner) = &expr.kind {
        expr = inner;
    }
    expr
}

/// Whether a block contains a `yield` outside nested functions
pub fn contains_yield(block: &[Stmt]) -> bool {
    block.iter().any(|stmt| match &stmt.kind {
        StmtKind::Yield(_) => true,
        StmtKind::If(s) => {
            s.bodies.iter().any(|b| contains_yield(b))
                || s.else_body.as_deref().is_some_and(contains_yield)
        }
        StmtKind::While(s) => {
            contains_yield(&s.body) || s.else_body.as_deref().is_some_and(contains_yield)
        }
        StmtKind::For(s) => {
            contains_yield(&s.body) || s.else_body.as_deref().is_some_and(contains_yield)
        }
        StmtKind::With(s) => contains_yield(&s.body),
        StmtKind::Try(s) => {
            contains_yield(&s.body)
                || s.handlers.iter().any(|h| contains_yield(h))
                || s.else_body.as_deref().is_some_and(contains_yield)
                || s.finally_body.as_deref().is_some_and(contains_yield)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt {
            span: Span::default(),
            kind,
        }
    }

    fn int_expr(id: u32) -> Expr {
        Expr {
            id: NodeId(id),
            span: Span::default(),
            kind: ExprKind::Int(1),
        }
    }

    #[test]
    fn test_contains_yield_nested() {
        let body = vec![stmt(StmtKind::While(WhileStmt {
            expr: int_expr(0),
            body: vec![stmt(StmtKind::Yield(int_expr(1)))],
            else_body: None,
        }))];
        assert!(contains_yield(&body));
        assert!(!contains_yield(&[stmt(StmtKind::Pass)]));
    }

    #[test]
    fn test_unwrap_parens() {
        let inner = int_expr(2);
        let wrapped = Expr {
            id: NodeId(3),
            span: Span::default(),
            kind: ExprKind::Paren(Box::new(Expr {
                id: NodeId(4),
                span: Span::default(),
                kind: ExprKind::Paren(Box::new(inner)),
            })),
        };
        assert_eq!(unwrap_parens(&wrapped).id, NodeId(2));
    }

    #[test]
    fn test_operator_methods_follow_version() {
        assert_eq!(BinaryOp::Div.method_name(3), Some("__truediv__"));
        assert_eq!(BinaryOp::Div.method_name(2), Some("__div__"));
        assert_eq!(BinaryOp::And.method_name(3), None);
    }
}

//! Construction API for resolved trees
//!
//! Semantic analysis (and the test suite) use [`TreeBuilder`] to produce a
//! [`Program`]: it hands out node ids, registers classes with their MRO and
//! binds every name reference to its declaration.

use crate::ast::*;
use crate::prelude::{self, Prelude};
use crate::span::Span;
use crate::symbol::{
    ClassId, FuncRef, FuncSymbol, LookupError, RefKind, Symbol, SymbolTable, TypeInfo, Var,
    VarRef,
};
use crate::types::{ArgKind, CallableType, InstanceType, Type, TypeVarDef};
use std::collections::BTreeMap;
use std::rc::Rc;

pub const BUILTINS: &str = "builtins";

/// One formal argument of a function under construction
#[derive(Debug, Clone)]
pub struct Param {
    pub var: VarRef,
    pub kind: ArgKind,
    pub ty: Option<Type>,
    pub default: Option<Expr>,
}

impl Param {
    pub fn typed(name: impl Into<String>, ty: Type) -> Self {
        Self {
            var: Var::new(name),
            kind: ArgKind::Pos,
            ty: Some(ty),
            default: None,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            var: Var::new(name),
            kind: ArgKind::Pos,
            ty: None,
            default: None,
        }
    }

    pub fn with_kind(mut self, kind: ArgKind) -> Self {
        self.kind = kind;
        self
    }

    /// Optional argument with a default value
    pub fn with_default(mut self, default: Expr) -> Self {
        self.kind = ArgKind::Opt;
        self.default = Some(default);
        self
    }
}

/// Description of a function or method definition
#[derive(Debug, Clone)]
pub struct FuncSpec {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<Type>,
    pub variables: Vec<TypeVarDef>,
    pub body: Block,
    pub is_abstract: bool,
    pub original_def: Option<FuncRef>,
}

impl FuncSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            ret: None,
            variables: Vec::new(),
            body: Vec::new(),
            is_abstract: false,
            original_def: None,
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.ret = Some(ty);
        self
    }

    pub fn type_vars(mut self, variables: Vec<TypeVarDef>) -> Self {
        self.variables = variables;
        self
    }

    pub fn body(mut self, body: Block) -> Self {
        self.body = body;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark this definition as a conditional redefinition of `original`
    pub fn redefines(mut self, original: FuncRef) -> Self {
        self.original_def = Some(original);
        self
    }

    /// Declared signature; `None` when nothing past `skip` leading
    /// parameters is annotated
    fn signature(&self, skip: usize) -> Option<CallableType> {
        let annotated =
            self.ret.is_some() || self.params.iter().skip(skip).any(|p| p.ty.is_some());
        if !annotated {
            return None;
        }
        let sig = CallableType::new(
            self.params
                .iter()
                .map(|p| p.ty.clone().unwrap_or(Type::Any))
                .collect(),
            self.params.iter().map(|p| p.kind).collect(),
            self.params.iter().map(|p| Some(p.var.name.clone())).collect(),
            self.ret.clone().unwrap_or(Type::Any),
        );
        Some(sig.with_variables(self.variables.clone()))
    }
}

pub struct TreeBuilder {
    program: Program,
    current: String,
    next_id: u32,
    line: usize,
    pub(crate) prelude: Prelude,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Builder with the `builtins` module installed
    pub fn new() -> Self {
        let mut builder = Self::bare();
        builder.prelude = prelude::install(&mut builder);
        builder.module("__main__");
        builder
    }

    /// Builder without any builtins
    pub fn bare() -> Self {
        let mut builder = Self {
            program: Program::default(),
            current: String::new(),
            next_id: 0,
            line: 1,
            prelude: Prelude::default(),
        };
        builder.module(BUILTINS);
        builder
    }

    pub fn prelude(&self) -> &Prelude {
        &self.prelude
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn build(mut self) -> Program {
        self.program.next_node_id = self.next_id;
        self.program
    }

    /// Line attached to nodes created from now on
    pub fn line(&mut self, line: usize) -> &mut Self {
        self.line = line;
        self
    }

    /// Create (or switch to) a module; later definitions land in it
    pub fn module(&mut self, name: &str) -> &mut Self {
        self.program
            .modules
            .entry(name.to_string())
            .or_insert_with(|| Module {
                name: name.to_string(),
                path: format!("{}.py", name.replace('.', "/")),
                defs: Vec::new(),
                names: SymbolTable::new(),
            });
        self.current = name.to_string();
        self
    }

    pub fn current_module(&self) -> &str {
        &self.current
    }

    /// Append a top-level statement to the current module
    pub fn push(&mut self, stmt: Stmt) {
        if let Some(module) = self.program.modules.get_mut(&self.current) {
            module.defs.push(stmt);
        }
    }

    /// Bind a name in the current module's global table
    pub fn define(&mut self, name: &str, symbol: Symbol) {
        if let Some(module) = self.program.modules.get_mut(&self.current) {
            module.names.insert(name, RefKind::Global, symbol);
        }
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.current, name)
    }

    fn span(&self) -> Span {
        Span::at_line(self.line)
    }

    // ---- types ----

    pub fn instance(&self, class: ClassId) -> Type {
        self.generic(class, Vec::new())
    }

    pub fn generic(&self, class: ClassId, args: Vec<Type>) -> Type {
        Type::Instance(self.base(class, args))
    }

    /// Base-class instance for [`generic_class`](Self::generic_class)
    pub fn base(&self, class: ClassId, args: Vec<Type>) -> InstanceType {
        let info = self.program.classes.get(class);
        InstanceType::new(class, info.fullname.clone(), args)
    }

    /// Instance type seen from inside the class: type arguments are the
    /// class's own type variables
    pub fn self_type(&self, class: ClassId) -> Type {
        let info = self.program.classes.get(class);
        let args = info
            .type_vars
            .iter()
            .enumerate()
            .map(|(i, name)| Type::TypeVar(self.class_type_var(name, i as i32 + 1)))
            .collect();
        Type::Instance(InstanceType::new(class, info.fullname.clone(), args))
    }

    /// Instance of a builtin class by short name; `Unbound` if absent
    pub fn builtin(&self, name: &str) -> Type {
        match self.program.classes.by_fullname(&format!("{}.{}", BUILTINS, name)) {
            Some(id) => self.instance(id),
            None => Type::Unbound(name.to_string()),
        }
    }

    pub fn object_type(&self) -> Type {
        match self.prelude.object {
            Some(id) => self.instance(id),
            None => Type::Any,
        }
    }

    fn class_type_var(&self, name: &str, id: i32) -> TypeVarDef {
        TypeVarDef::new(name, id, self.object_type())
    }

    /// Function type variable; ids are negative and start at -1
    pub fn func_type_var(&self, name: &str, id: i32) -> TypeVarDef {
        TypeVarDef::new(name, -id.abs(), self.object_type())
    }

    // ---- classes ----

    /// Declare a class deriving from `bases` (or `object` when empty)
    pub fn class(&mut self, name: &str, bases: &[ClassId]) -> ClassId {
        let bases = bases.iter().map(|id| self.base(*id, Vec::new())).collect();
        self.generic_class(name, &[], bases)
    }

    /// Declare a class with type variables; base instances may mention
    /// them as `TypeVar`s with ids `1..`
    pub fn generic_class(
        &mut self,
        name: &str,
        type_vars: &[&str],
        mut bases: Vec<InstanceType>,
    ) -> ClassId {
        let fullname = self.qualify(name);
        if bases.is_empty() && fullname != "builtins.object" {
            if let Some(object) = self.prelude.object {
                bases.push(self.base(object, Vec::new()));
            }
        }
        let base_ids: Vec<ClassId> = bases.iter().map(|b| b.class).collect();
        let id = self.program.classes.add(TypeInfo {
            id: ClassId(0),
            name: name.to_string(),
            fullname,
            bases,
            mro: Vec::new(),
            names: BTreeMap::new(),
            type_vars: type_vars.iter().map(|s| s.to_string()).collect(),
            is_abstract: false,
        });
        let mro = self.linearize(id, &base_ids);
        self.program.classes.get_mut(id).mro = mro;
        self.define(name, Symbol::Class(id));
        id
    }

    /// C3 linearisation; falls back to depth-first order when the
    /// hierarchy is inconsistent
    fn linearize(&self, id: ClassId, bases: &[ClassId]) -> Vec<ClassId> {
        let classes = &self.program.classes;
        let mut seqs: Vec<Vec<ClassId>> =
            bases.iter().map(|b| classes.get(*b).mro.clone()).collect();
        seqs.push(bases.to_vec());

        let mut result = vec![id];
        loop {
            seqs.retain(|s| !s.is_empty());
            if seqs.is_empty() {
                return result;
            }
            let head = seqs.iter().map(|s| s[0]).find(|candidate| {
                seqs.iter().all(|s| !s[1..].contains(candidate))
            });
            let Some(head) = head else {
                break;
            };
            result.push(head);
            for seq in &mut seqs {
                if seq[0] == head {
                    seq.remove(0);
                }
            }
        }

        let mut fallback = vec![id];
        for base in bases {
            for ancestor in &classes.get(*base).mro {
                if !fallback.contains(ancestor) {
                    fallback.push(*ancestor);
                }
            }
        }
        fallback
    }

    pub fn set_abstract(&mut self, class: ClassId) {
        self.program.classes.get_mut(class).is_abstract = true;
    }

    /// Member variable declared in a class body
    pub fn class_var(&mut self, class: ClassId, name: &str, ty: Option<Type>) -> VarRef {
        let fullname = format!("{}.{}", self.program.classes.get(class).fullname, name);
        let var = Var::detailed(name, fullname, Some(class), ty);
        self.program
            .classes
            .get_mut(class)
            .names
            .insert(name.to_string(), Symbol::Var(var.clone()));
        var
    }

    /// `self` parameter typed with the class's self type
    pub fn self_param(&self, class: ClassId) -> Param {
        Param::typed("self", self.self_type(class))
    }

    /// Register a method stub (no body) taking `self` plus `sig`'s arguments
    pub fn declare_method(&mut self, class: ClassId, name: &str, sig: CallableType) -> FuncRef {
        let sig = self.with_self(class, sig).with_name(name);
        let symbol = self.func_symbol(name, Some(class), Type::Callable(sig), false);
        self.bind_member(class, name, Symbol::Func(symbol.clone()));
        symbol
    }

    pub fn declare_overloaded_method(
        &mut self,
        class: ClassId,
        name: &str,
        items: Vec<CallableType>,
    ) -> FuncRef {
        let items = items
            .into_iter()
            .map(|sig| self.with_self(class, sig).with_name(name))
            .collect();
        let symbol = self.func_symbol(name, Some(class), Type::Overloaded(items), false);
        self.bind_member(class, name, Symbol::Func(symbol.clone()));
        symbol
    }

    /// Register a module-level function stub
    pub fn declare_func(&mut self, name: &str, sig: CallableType) -> FuncRef {
        let symbol = self.func_symbol(name, None, Type::Callable(sig.with_name(name)), false);
        self.define(name, Symbol::Func(symbol.clone()));
        symbol
    }

    fn with_self(&self, class: ClassId, mut sig: CallableType) -> CallableType {
        sig.arg_types.insert(0, self.self_type(class));
        sig.arg_kinds.insert(0, ArgKind::Pos);
        sig.arg_names.insert(0, Some("self".to_string()));
        sig
    }

    fn bind_member(&mut self, class: ClassId, name: &str, symbol: Symbol) {
        self.program
            .classes
            .get_mut(class)
            .names
            .insert(name.to_string(), symbol);
    }

    fn func_symbol(
        &self,
        name: &str,
        info: Option<ClassId>,
        ty: Type,
        is_abstract: bool,
    ) -> FuncRef {
        let fullname = match info {
            Some(class) => format!("{}.{}", self.program.classes.get(class).fullname, name),
            None => self.qualify(name),
        };
        Rc::new(FuncSymbol {
            name: name.to_string(),
            fullname,
            info,
            ty,
            is_abstract,
        })
    }

    // ---- functions ----

    fn func_def(&mut self, spec: FuncSpec, info: Option<ClassId>) -> FuncDef {
        let sig = spec
            .signature(usize::from(info.is_some()))
            .map(|sig| sig.with_name(spec.name.clone()));
        let item = FuncItem {
            args: spec.params.iter().map(|p| p.var.clone()).collect(),
            arg_kinds: spec.params.iter().map(|p| p.kind).collect(),
            init: spec.params.iter().map(|p| p.default.clone()).collect(),
            is_generator: contains_yield(&spec.body),
            body: spec.body,
            ty: sig,
            span: self.span(),
        };
        let ty = Type::Callable(item.function_type().with_name(spec.name.clone()));
        let symbol = self.func_symbol(&spec.name, info, ty, spec.is_abstract);
        FuncDef {
            fullname: symbol.fullname.clone(),
            name: spec.name,
            info,
            item,
            is_abstract: spec.is_abstract,
            original_def: spec.original_def,
            symbol,
        }
    }

    /// Module-level function; its name is bound in the current module
    pub fn func(&mut self, spec: FuncSpec) -> FuncDef {
        let def = self.func_def(spec, None);
        self.define(&def.name, Symbol::Func(def.symbol.clone()));
        def
    }

    /// Method of `class`; the first parameter is the receiver
    pub fn method(&mut self, class: ClassId, spec: FuncSpec) -> FuncDef {
        let def = self.func_def(spec, Some(class));
        self.bind_member(class, &def.name.clone(), Symbol::Func(def.symbol.clone()));
        def
    }

    /// Group already-built definitions into one overloaded definition
    pub fn overloaded(&mut self, items: Vec<FuncDef>) -> Stmt {
        let info = items.first().and_then(|d| d.info);
        let name = items.first().map(|d| d.name.clone()).unwrap_or_default();
        let ty = Type::Overloaded(
            items
                .iter()
                .map(|d| d.item.function_type().with_name(name.clone()))
                .collect(),
        );
        let symbol = self.func_symbol(&name, info, ty, items.iter().all(|d| d.is_abstract));
        match info {
            Some(class) => self.bind_member(class, &name, Symbol::Func(symbol.clone())),
            None => self.define(&name, Symbol::Func(symbol.clone())),
        }
        self.stmt(StmtKind::OverloadedFunc(OverloadedFuncDef {
            items,
            info,
            symbol,
        }))
    }

    /// Decorated function; the decorated name becomes a variable
    pub fn decorated(&mut self, func: FuncDef, decorators: Vec<Expr>) -> Stmt {
        let var = Var::detailed(func.name.clone(), func.fullname.clone(), func.info, None);
        match func.info {
            Some(class) => self.bind_member(class, &func.name.clone(), Symbol::Var(var.clone())),
            None => self.define(&func.name.clone(), Symbol::Var(var.clone())),
        }
        self.stmt(StmtKind::Decorator(Decorator {
            func,
            decorators,
            var,
        }))
    }

    /// Module-level variable
    pub fn global_var(&mut self, name: &str, ty: Option<Type>) -> VarRef {
        let var = Var::detailed(name, self.qualify(name), None, ty);
        self.define(name, Symbol::Var(var.clone()));
        var
    }

    /// Function-local variable; not bound in any global table
    pub fn local_var(&self, name: &str, ty: Option<Type>) -> VarRef {
        Var::detailed(name, name, None, ty)
    }

    // ---- expressions ----

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Expr {
            id,
            span: self.span(),
            kind,
        }
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> Expr {
        self.expr(ExprKind::Float(value))
    }

    pub fn str_lit(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::Str(value.to_string()))
    }

    /// Reference to a global of the current module or a builtin
    pub fn name(&mut self, name: &str) -> Result<Expr, LookupError> {
        let (kind, symbol, fullname) = self.resolve(name)?;
        Ok(self.expr(ExprKind::Name(NameExpr {
            name: name.to_string(),
            fullname,
            kind,
            node: symbol,
            is_def: false,
        })))
    }

    fn resolve(&self, name: &str) -> Result<(RefKind, Symbol, String), LookupError> {
        for module_name in [self.current.as_str(), BUILTINS] {
            let module = self.program.module(module_name)?;
            if let Some(node) = module.names.get(name) {
                return Ok((node.kind, node.symbol.clone(), format!("{}.{}", module_name, name)));
            }
        }
        Err(LookupError::UnknownName {
            module: self.current.clone(),
            name: name.to_string(),
        })
    }

    fn var_expr(&mut self, var: &VarRef, is_def: bool) -> Expr {
        let kind = if var.fullname.contains('.') && var.info.is_none() {
            RefKind::Global
        } else if var.info.is_some() {
            RefKind::Member
        } else {
            RefKind::Local
        };
        self.expr(ExprKind::Name(NameExpr {
            name: var.name.clone(),
            fullname: var.fullname.clone(),
            kind,
            node: Symbol::Var(var.clone()),
            is_def,
        }))
    }

    /// Reference to a variable
    pub fn var(&mut self, var: &VarRef) -> Expr {
        self.var_expr(var, false)
    }

    /// Occurrence that introduces the variable
    pub fn def_var(&mut self, var: &VarRef) -> Expr {
        self.var_expr(var, true)
    }

    pub fn class_ref(&mut self, class: ClassId) -> Expr {
        let info = self.program.classes.get(class);
        let (name, fullname) = (info.name.clone(), info.fullname.clone());
        self.expr(ExprKind::Name(NameExpr {
            name,
            fullname,
            kind: RefKind::Global,
            node: Symbol::Class(class),
            is_def: false,
        }))
    }

    pub fn func_ref(&mut self, func: &FuncRef) -> Expr {
        self.expr(ExprKind::Name(NameExpr {
            name: func.name.clone(),
            fullname: func.fullname.clone(),
            kind: RefKind::Global,
            node: Symbol::Func(func.clone()),
            is_def: false,
        }))
    }

    pub fn member(&mut self, expr: Expr, name: &str) -> Expr {
        self.expr(ExprKind::Member(MemberExpr {
            expr: Box::new(expr),
            name: name.to_string(),
            def_var: None,
            is_def: false,
        }))
    }

    /// `self.name = ...` introducing a member variable
    pub fn member_def(&mut self, expr: Expr, var: &VarRef) -> Expr {
        self.expr(ExprKind::Member(MemberExpr {
            expr: Box::new(expr),
            name: var.name.clone(),
            def_var: Some(var.clone()),
            is_def: true,
        }))
    }

    /// Call with positional arguments
    pub fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        let n = args.len();
        self.call_with(callee, args, vec![ArgKind::Pos; n], vec![None; n])
    }

    pub fn call_with(
        &mut self,
        callee: Expr,
        args: Vec<Expr>,
        arg_kinds: Vec<ArgKind>,
        arg_names: Vec<Option<String>>,
    ) -> Expr {
        self.expr(ExprKind::Call(CallExpr {
            callee: Box::new(callee),
            args,
            arg_kinds,
            arg_names,
        }))
    }

    pub fn op(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Op(OpExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    pub fn unary(&mut self, op: UnaryOp, expr: Expr) -> Expr {
        self.expr(ExprKind::Unary(UnaryExpr {
            op,
            expr: Box::new(expr),
        }))
    }

    pub fn index(&mut self, base: Expr, index: Expr) -> Expr {
        self.expr(ExprKind::Index(IndexExpr {
            base: Box::new(base),
            index: Box::new(index),
        }))
    }

    pub fn paren(&mut self, expr: Expr) -> Expr {
        self.expr(ExprKind::Paren(Box::new(expr)))
    }

    pub fn tuple(&mut self, items: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Tuple(items))
    }

    pub fn list(&mut self, items: Vec<Expr>) -> Expr {
        self.expr(ExprKind::List(items))
    }

    pub fn undefined(&mut self, ty: Option<Type>) -> Expr {
        self.expr(ExprKind::Undefined(ty))
    }

    /// `isinstance(expr, class)`
    pub fn isinstance(&mut self, expr: Expr, class: ClassId) -> Result<Expr, LookupError> {
        let callee = self.name("isinstance")?;
        let target = self.class_ref(class);
        Ok(self.call(callee, vec![expr, target]))
    }

    // ---- statements ----

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            span: self.span(),
            kind,
        }
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn assign(&mut self, lvalues: Vec<Expr>, rvalue: Expr) -> Stmt {
        self.stmt(StmtKind::Assign(AssignmentStmt { lvalues, rvalue }))
    }

    pub fn var_def(&mut self, items: Vec<VarRef>, init: Option<Expr>, is_top_level: bool) -> Stmt {
        let kind = if is_top_level {
            RefKind::Global
        } else {
            RefKind::Local
        };
        self.stmt(StmtKind::VarDef(VarDef {
            items,
            kind,
            is_top_level,
            init,
        }))
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn if_else(&mut self, cond: Expr, body: Block, else_body: Option<Block>) -> Stmt {
        self.stmt(StmtKind::If(IfStmt {
            exprs: vec![cond],
            bodies: vec![body],
            else_body,
        }))
    }

    pub fn func_stmt(&mut self, def: FuncDef) -> Stmt {
        self.stmt(StmtKind::Func(def))
    }

    pub fn class_def(&mut self, class: ClassId, defs: Block) -> Stmt {
        let name = self.program.classes.get(class).name.clone();
        self.stmt(StmtKind::Class(ClassDef {
            name,
            info: class,
            defs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mro_names(b: &TreeBuilder, class: ClassId) -> Vec<String> {
        b.program()
            .classes
            .get(class)
            .mro
            .iter()
            .map(|id| b.program().classes.get(*id).name.clone())
            .collect()
    }

    #[test]
    fn test_diamond_mro_is_c3() {
        let mut b = TreeBuilder::new();
        let a = b.class("A", &[]);
        let left = b.class("B", &[a]);
        let right = b.class("C", &[a]);
        let d = b.class("D", &[left, right]);
        assert_eq!(mro_names(&b, d), vec!["D", "B", "C", "A", "object"]);
    }

    #[test]
    fn test_names_resolve_to_module_then_builtins() {
        let mut b = TreeBuilder::new();
        let x = b.global_var("x", None);
        let expr = b.name("x").unwrap();
        match &expr.kind {
            ExprKind::Name(n) => {
                assert_eq!(n.fullname, "__main__.x");
                assert!(matches!(&n.node, Symbol::Var(v) if *v == x));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(b.name("isinstance").is_ok());
        assert!(b.name("nope").is_err());
    }

    #[test]
    fn test_unannotated_function_is_dynamic() {
        let mut b = TreeBuilder::new();
        let def = b.func(FuncSpec::new("f").param(Param::untyped("x")));
        assert!(def.item.ty.is_none());
        match &def.symbol.ty {
            Type::Callable(sig) => assert!(sig.implicit),
            other => panic!("unexpected {other:?}"),
        }

        let int = b.builtin("int");
        let typed = b.func(FuncSpec::new("g").param(Param::untyped("x")).returns(int.clone()));
        let sig = typed.item.ty.unwrap();
        assert_eq!(sig.arg_types, vec![Type::Any]);
        assert_eq!(*sig.ret_type, int);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let mut b = TreeBuilder::new();
        let one = b.int(1);
        let two = b.int(2);
        assert_ne!(one.id, two.id);
        let program = b.build();
        assert!(program.next_node_id > two.id.0);
    }
}

//! Declarations produced by semantic analysis
//!
//! Variables and function symbols are shared by reference between the
//! declaring node and every name that refers to them. Classes live in a
//! [`ClassTable`] arena and are addressed by [`ClassId`].

use crate::types::{InstanceType, Type, TypeVarDef};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;
use thiserror::Error;

/// Failed lookup of a module-qualified or builtin name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("name '{name}' is not defined in module '{module}'")]
    UnknownName { module: String, name: String },

    #[error("'{0}' does not refer to a class")]
    NotAClass(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// A named storage location
pub struct Var {
    pub name: String,
    pub fullname: String,
    /// Owning class for member variables
    pub info: Option<ClassId>,
    ty: RefCell<Option<Type>>,
}

impl Var {
    pub fn new(name: impl Into<String>) -> VarRef {
        let name = name.into();
        VarRef(Rc::new(Var {
            fullname: name.clone(),
            name,
            info: None,
            ty: RefCell::new(None),
        }))
    }

    pub fn with_type(name: impl Into<String>, ty: Type) -> VarRef {
        let var = Var::new(name);
        var.set_type(ty);
        var
    }

    pub fn detailed(
        name: impl Into<String>,
        fullname: impl Into<String>,
        info: Option<ClassId>,
        ty: Option<Type>,
    ) -> VarRef {
        VarRef(Rc::new(Var {
            name: name.into(),
            fullname: fullname.into(),
            info,
            ty: RefCell::new(ty),
        }))
    }

    /// Declared or inferred type
    pub fn ty(&self) -> Option<Type> {
        self.ty.borrow().clone()
    }

    pub fn has_type(&self) -> bool {
        self.ty.borrow().is_some()
    }

    /// Overwrite the type; used for argument types and decorated names
    pub fn set_type(&self, ty: Type) {
        *self.ty.borrow_mut() = Some(ty);
    }

    /// Record an inferred type. Once a type is present it is frozen and
    /// later inferences are ignored; returns whether the write happened.
    pub fn infer(&self, ty: Type) -> bool {
        let mut slot = self.ty.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(ty);
        true
    }
}

/// Shared handle to a [`Var`]; equality and hashing use identity
#[derive(Clone)]
pub struct VarRef(Rc<Var>);

impl Deref for VarRef {
    type Target = Var;

    fn deref(&self) -> &Var {
        &self.0
    }
}

impl PartialEq for VarRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VarRef {}

impl Hash for VarRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("name", &self.name)
            .field("ty", &self.ty())
            .finish()
    }
}

/// Function or method declaration
#[derive(Debug)]
pub struct FuncSymbol {
    pub name: String,
    pub fullname: String,
    pub info: Option<ClassId>,
    /// Declared signature, or the implicit all-`Any` one for unannotated functions
    pub ty: Type,
    pub is_abstract: bool,
}

pub type FuncRef = Rc<FuncSymbol>;

#[derive(Debug, Clone)]
pub enum Symbol {
    Var(VarRef),
    Func(FuncRef),
    Class(ClassId),
    Module(String),
    TypeVar(TypeVarDef),
}

impl Symbol {
    /// Type of the declaration as stored by semantic analysis (not the
    /// type of a reference to it)
    pub fn declared_type(&self) -> Option<Type> {
        match self {
            Symbol::Var(v) => v.ty(),
            Symbol::Func(f) => Some(f.ty.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    Local,
    Global,
    Member,
}

#[derive(Debug, Clone)]
pub struct SymbolTableNode {
    pub kind: RefKind,
    pub symbol: Symbol,
}

/// Name to declaration mapping for one scope
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolTableNode>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: RefKind, symbol: Symbol) {
        self.entries
            .insert(name.into(), SymbolTableNode { kind, symbol });
    }

    pub fn get(&self, name: &str) -> Option<&SymbolTableNode> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolTableNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Class descriptor built by semantic analysis
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: ClassId,
    pub name: String,
    pub fullname: String,
    pub bases: Vec<InstanceType>,
    /// Linearised method resolution order, starting with the class itself
    pub mro: Vec<ClassId>,
    pub names: BTreeMap<String, Symbol>,
    /// Names of the class type variables; variable `i` has id `i + 1`
    pub type_vars: Vec<String>,
    pub is_abstract: bool,
}

impl TypeInfo {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.names.get(name)
    }

    pub fn has_base(&self, class: ClassId) -> bool {
        self.mro.contains(&class)
    }
}

/// Arena of every class in a program
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: Vec<TypeInfo>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// If `id` was not allocated by this table.
    pub fn get(&self, id: ClassId) -> &TypeInfo {
        &self.classes[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: ClassId) -> &mut TypeInfo {
        &mut self.classes[id.0 as usize]
    }

    /// Reserve an id for a new class; its descriptor is filled in by the caller
    pub(crate) fn add(&mut self, mut info: TypeInfo) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        info.id = id;
        if info.mro.is_empty() {
            info.mro.push(id);
        }
        self.classes.push(info);
        id
    }

    pub fn by_fullname(&self, fullname: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|info| info.fullname == fullname)
            .map(|info| info.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

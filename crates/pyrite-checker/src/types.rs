//! Type algebra
//!
//! Types are immutable values. Relations between them (subtyping, joins,
//! substitution) live in [`crate::typeops`].

use crate::symbol::ClassId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a formal argument accepts actual arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Required positional argument
    Pos,
    /// Positional argument with a default
    Opt,
    /// `*args`
    Star,
    /// Keyword-only argument
    Named,
    /// `**kwargs`
    Star2,
}

/// Type representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// Dynamically typed value, compatible with everything in both directions
    Any,
    /// Result of a call to a function that returns no value
    Void,
    /// Type of the `None` value
    NoneTyp,
    /// Nominal instance, e.g. `list[int]`
    Instance(InstanceType),
    /// Function signature (also used for type objects)
    Callable(CallableType),
    /// Ordered overload alternatives
    Overloaded(Vec<CallableType>),
    /// Fixed-length tuple
    Tuple(Vec<Type>),
    /// Reference to a class or function type variable
    TypeVar(TypeVarDef),
    /// Name semantic analysis could not resolve
    Unbound(String),
    /// Result of a failed type operation
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceType {
    pub class: ClassId,
    /// Fully qualified class name, e.g. `builtins.int`
    pub name: String,
    pub args: Vec<Type>,
}

/// Type variable declaration.
///
/// Class type variables have positive ids (1-based position in the class),
/// function type variables negative ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeVarDef {
    pub name: String,
    pub id: i32,
    /// Finite set of allowed values; empty when unrestricted
    pub values: Vec<Type>,
    pub upper_bound: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableType {
    pub arg_types: Vec<Type>,
    pub arg_kinds: Vec<ArgKind>,
    pub arg_names: Vec<Option<String>>,
    pub ret_type: Box<Type>,
    pub variables: Vec<TypeVarDef>,
    /// Constructor of a class: calling it creates an instance of `ret_type`
    pub is_type_obj: bool,
    /// Name used in messages
    pub name: Option<String>,
    /// Signature synthesized for an unannotated function
    pub implicit: bool,
}

impl InstanceType {
    pub fn new(class: ClassId, name: impl Into<String>, args: Vec<Type>) -> Self {
        Self {
            class,
            name: name.into(),
            args,
        }
    }

    /// Unqualified class name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl TypeVarDef {
    pub fn new(name: impl Into<String>, id: i32, upper_bound: Type) -> Self {
        Self {
            name: name.into(),
            id,
            values: Vec::new(),
            upper_bound: Box::new(upper_bound),
        }
    }

    pub fn with_values(mut self, values: Vec<Type>) -> Self {
        self.values = values;
        self
    }
}

impl CallableType {
    pub fn new(
        arg_types: Vec<Type>,
        arg_kinds: Vec<ArgKind>,
        arg_names: Vec<Option<String>>,
        ret_type: Type,
    ) -> Self {
        Self {
            arg_types,
            arg_kinds,
            arg_names,
            ret_type: Box::new(ret_type),
            variables: Vec::new(),
            is_type_obj: false,
            name: None,
            implicit: false,
        }
    }

    /// Signature with only required positional arguments
    pub fn simple(arg_types: Vec<Type>, ret_type: Type) -> Self {
        let n = arg_types.len();
        Self::new(arg_types, vec![ArgKind::Pos; n], vec![None; n], ret_type)
    }

    /// Signature of an unannotated function: every argument and the result are `Any`
    pub fn implicit(arg_kinds: Vec<ArgKind>, arg_names: Vec<Option<String>>) -> Self {
        let mut sig = Self::new(
            vec![Type::Any; arg_kinds.len()],
            arg_kinds,
            arg_names,
            Type::Any,
        );
        sig.implicit = true;
        sig
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Vec<TypeVarDef>) -> Self {
        self.variables = variables;
        self
    }

    pub fn type_object(mut self) -> Self {
        self.is_type_obj = true;
        self
    }

    /// Number of arguments that must be given
    pub fn min_args(&self) -> usize {
        self.arg_kinds.iter().filter(|k| **k == ArgKind::Pos).count()
    }

    /// Number of arguments that can be given positionally without `*args`
    pub fn max_fixed_args(&self) -> usize {
        self.arg_kinds
            .iter()
            .filter(|k| matches!(k, ArgKind::Pos | ArgKind::Opt))
            .count()
    }

    pub fn is_var_arg(&self) -> bool {
        self.arg_kinds.contains(&ArgKind::Star)
    }

    pub fn is_kw_arg(&self) -> bool {
        self.arg_kinds.contains(&ArgKind::Star2)
    }

    /// Class constructed by this type object, if any
    pub fn type_object_class(&self) -> Option<ClassId> {
        match (self.is_type_obj, self.ret_type.as_ref()) {
            (true, Type::Instance(inst)) => Some(inst.class),
            _ => None,
        }
    }

    /// Signature as seen through an instance: the `self` argument is dropped
    pub fn bound(&self) -> Self {
        let mut sig = self.clone();
        if !sig.arg_types.is_empty() {
            sig.arg_types.remove(0);
            sig.arg_kinds.remove(0);
            sig.arg_names.remove(0);
        }
        sig
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("\"{}\"", name),
            None => "function".to_string(),
        }
    }
}

impl Type {
    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Type::NoneTyp)
    }

    /// Any, or one of the markers that behave like it
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Any | Type::Error | Type::Unbound(_))
    }

    pub fn as_instance(&self) -> Option<&InstanceType> {
        match self {
            Type::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Instance of the class with the given full name
    pub fn is_instance_of(&self, fullname: &str) -> bool {
        matches!(self, Type::Instance(inst) if inst.name == fullname)
    }

    pub fn is_function_like(&self) -> bool {
        matches!(self, Type::Callable(_) | Type::Overloaded(_))
    }

    /// Signatures of a callable or overloaded type
    pub fn items(&self) -> Vec<&CallableType> {
        match self {
            Type::Callable(c) => vec![c],
            Type::Overloaded(items) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_type_obj(&self) -> bool {
        self.items().first().is_some_and(|c| c.is_type_obj)
    }

    /// Method signature as seen from an instance
    pub fn bound_method(&self) -> Type {
        match self {
            Type::Callable(c) => Type::Callable(c.bound()),
            Type::Overloaded(items) => Type::Overloaded(items.iter().map(|c| c.bound()).collect()),
            other => other.clone(),
        }
    }

    /// Drop callable names so the type is usable as a variable type
    pub fn stripped(&self) -> Type {
        match self {
            Type::Callable(c) => {
                let mut c = c.clone();
                c.name = None;
                Type::Callable(c)
            }
            Type::Overloaded(items) => Type::Overloaded(
                items
                    .iter()
                    .map(|c| {
                        let mut c = c.clone();
                        c.name = None;
                        c
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Short tag used by the type map dump
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Any => "any",
            Type::Void => "void",
            Type::NoneTyp => "none",
            Type::Instance(_) => "instance",
            Type::Callable(_) => "callable",
            Type::Overloaded(_) => "overloaded",
            Type::Tuple(_) => "tuple",
            Type::TypeVar(_) => "typevar",
            Type::Unbound(_) => "unbound",
            Type::Error => "error",
        }
    }
}

impl From<InstanceType> for Type {
    fn from(inst: InstanceType) -> Self {
        Type::Instance(inst)
    }
}

impl From<CallableType> for Type {
    fn from(sig: CallableType) -> Self {
        Type::Callable(sig)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for CallableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def ")?;
        if !self.variables.is_empty() {
            let names: Vec<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();
            write!(f, "[{}] ", names.join(", "))?;
        }
        write!(f, "(")?;
        for (i, ty) in self.arg_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let name = self.arg_names.get(i).cloned().flatten();
            match self.arg_kinds.get(i).copied().unwrap_or(ArgKind::Pos) {
                ArgKind::Pos => write!(f, "{}", ty)?,
                ArgKind::Opt => write!(f, "{} =", ty)?,
                ArgKind::Star => write!(f, "*{}", ty)?,
                ArgKind::Named => write!(f, "{}: {}", name.unwrap_or_default(), ty)?,
                ArgKind::Star2 => write!(f, "**{}", ty)?,
            }
        }
        write!(f, ") -> {}", self.ret_type)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "Any"),
            Type::Void | Type::NoneTyp => write!(f, "None"),
            Type::Instance(inst) => {
                write!(f, "{}", inst.short_name())?;
                if !inst.args.is_empty() {
                    write!(f, "[")?;
                    write_list(f, &inst.args)?;
                    write!(f, "]")?;
                }
                Ok(())
            }
            Type::Callable(c) => write!(f, "{}", c),
            Type::Overloaded(items) => {
                write!(f, "Overload(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Type::Tuple(items) => {
                write!(f, "Tuple[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Type::TypeVar(tv) => write!(f, "{}", tv.name),
            Type::Unbound(name) => write!(f, "{}?", name),
            Type::Error => write!(f, "<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Type {
        Type::Instance(InstanceType::new(ClassId(1), "builtins.int", vec![]))
    }

    fn list_of(item: Type) -> Type {
        Type::Instance(InstanceType::new(ClassId(2), "builtins.list", vec![item]))
    }

    #[test]
    fn test_type_display() {
        assert_eq!(int().to_string(), "int");
        assert_eq!(list_of(int()).to_string(), "list[int]");
        assert_eq!(Type::Tuple(vec![int(), Type::Any]).to_string(), "Tuple[int, Any]");
        assert_eq!(Type::Void.to_string(), "None");
    }

    #[test]
    fn test_callable_display() {
        let sig = CallableType::new(
            vec![int(), int(), list_of(int())],
            vec![ArgKind::Pos, ArgKind::Opt, ArgKind::Star],
            vec![None, None, None],
            Type::Void,
        );
        assert_eq!(sig.to_string(), "def (int, int =, *list[int]) -> None");
    }

    #[test]
    fn test_arg_counts() {
        let sig = CallableType::new(
            vec![int(), int(), int()],
            vec![ArgKind::Pos, ArgKind::Opt, ArgKind::Star],
            vec![None, None, None],
            Type::Any,
        );
        assert_eq!(sig.min_args(), 1);
        assert_eq!(sig.max_fixed_args(), 2);
        assert!(sig.is_var_arg());
        assert!(!sig.is_kw_arg());
    }

    #[test]
    fn test_bound_drops_self() {
        let sig = CallableType::simple(vec![Type::Any, int()], int()).with_name("m");
        let bound = sig.bound();
        assert_eq!(bound.arg_types, vec![int()]);
        assert_eq!(bound.name.as_deref(), Some("m"));
    }

    #[test]
    fn test_stripped_removes_names() {
        let sig = Type::Callable(CallableType::simple(vec![], int()).with_name("f"));
        match sig.stripped() {
            Type::Callable(c) => assert!(c.name.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }
}

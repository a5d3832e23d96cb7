//! Attribute access

use super::messages;
use super::TypeChecker;
use crate::span::Span;
use crate::symbol::{ClassId, Symbol};
use crate::typeops::expand_type_by_instance;
use crate::types::{InstanceType, Type};

impl TypeChecker<'_> {
    /// Type of `base.name`, reporting a missing attribute
    pub(crate) fn analyse_member_access(&mut self, name: &str, base: &Type, span: Span) -> Type {
        match self.member_type(name, base) {
            Some(ty) => ty,
            None => {
                self.fail(messages::has_no_attribute(base, name), span);
                Type::Any
            }
        }
    }

    /// Type of `base.name`, or `None` if there is no such attribute
    pub(crate) fn member_type(&mut self, name: &str, base: &Type) -> Option<Type> {
        match base {
            Type::Any | Type::Error | Type::Unbound(_) => Some(Type::Any),
            Type::Instance(instance) => self.instance_member_type(name, instance),
            Type::Tuple(_) => self.fallback_member_type(name, "builtins.tuple"),
            Type::TypeVar(var) => self.member_type(name, &var.upper_bound),
            Type::Callable(_) | Type::Overloaded(_) if base.is_type_obj() => {
                let class = base.items().first().and_then(|sig| sig.type_object_class());
                class
                    .and_then(|class| self.class_attribute_type(name, class))
                    .or_else(|| self.fallback_member_type(name, "builtins.type"))
            }
            Type::Callable(_) | Type::Overloaded(_) => {
                self.fallback_member_type(name, "builtins.function")
            }
            Type::Void | Type::NoneTyp => None,
        }
    }

    fn fallback_member_type(&mut self, name: &str, fullname: &str) -> Option<Type> {
        match self.named_type_if_exists(fullname) {
            Type::Instance(instance) => self.instance_member_type(name, &instance),
            _ => None,
        }
    }

    /// Attribute found through the MRO of `class`, with its defining class
    pub(crate) fn lookup_member(&self, class: ClassId, name: &str) -> Option<(ClassId, Symbol)> {
        let classes = &self.program.classes;
        classes
            .get(class)
            .mro
            .iter()
            .find_map(|owner| classes.get(*owner).get(name).map(|sym| (*owner, sym.clone())))
    }

    fn instance_member_type(&mut self, name: &str, instance: &InstanceType) -> Option<Type> {
        let (owner, symbol) = self.lookup_member(instance.class, name)?;
        let mapped = self.oracle.map_instance_to_supertype(instance, owner);
        let expand = |ty: &Type| match &mapped {
            Some(m) => expand_type_by_instance(ty, m),
            None => ty.clone(),
        };
        Some(match symbol {
            Symbol::Func(func) => expand(&func.ty.bound_method()),
            Symbol::Var(var) => var.ty().map(|ty| expand(&ty)).unwrap_or(Type::Any),
            Symbol::Class(class) => self.type_object_type(class),
            Symbol::Module(_) | Symbol::TypeVar(_) => Type::Any,
        })
    }

    /// Attribute looked up on the class object itself: methods are unbound
    fn class_attribute_type(&mut self, name: &str, class: ClassId) -> Option<Type> {
        let (_, symbol) = self.lookup_member(class, name)?;
        Some(match symbol {
            Symbol::Func(func) => func.ty.clone(),
            Symbol::Var(var) => var.ty().unwrap_or(Type::Any),
            Symbol::Class(class) => self.type_object_type(class),
            Symbol::Module(_) | Symbol::TypeVar(_) => Type::Any,
        })
    }

    /// `super().name` inside a method of the enclosing class
    pub(crate) fn infer_super(&mut self, name: &str, span: Span) -> Type {
        let Some(&class) = self.class_stack.last() else {
            self.fail(messages::SUPER_OUTSIDE_CLASS, span);
            return Type::Any;
        };
        let classes = &self.program.classes;
        let found = classes
            .get(class)
            .mro
            .iter()
            .skip(1)
            .find_map(|base| classes.get(*base).get(name).map(|sym| (*base, sym.clone())));
        match found {
            Some((base, Symbol::Func(func))) => {
                self.map_type_from_supertype(&func.ty.bound_method(), class, base)
            }
            Some((base, Symbol::Var(var))) => match var.ty() {
                Some(ty) => self.map_type_from_supertype(&ty, class, base),
                None => Type::Any,
            },
            Some(_) => Type::Any,
            None => {
                self.fail(messages::super_has_no_attribute(name), span);
                Type::Any
            }
        }
    }
}

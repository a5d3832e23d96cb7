//! Relations over the type algebra
//!
//! The checker asks these questions through the [`TypeOracle`] trait and never
//! looks at how they are answered. [`NominalOracle`] is the default
//! implementation: nominal subtyping through the class MRO with covariant
//! type arguments.

mod expand;
mod join;
mod subtype;

pub use expand::{erase_typevars, expand_type, expand_type_by_instance, TypeVarMap};

use crate::symbol::{ClassId, ClassTable};
use crate::types::{InstanceType, Type};

/// Pure, side-effect free queries over types
pub trait TypeOracle {
    /// Can a value of `left` be used where `right` is expected?
    fn is_subtype(&self, left: &Type, right: &Type) -> bool;

    /// Subtyping without the escape hatch of `Any`
    fn is_proper_subtype(&self, left: &Type, right: &Type) -> bool;

    /// Structural identity, ignoring callable names
    fn is_same_type(&self, left: &Type, right: &Type) -> bool;

    /// Least upper bound; `Type::Error` when there is none
    fn join(&self, left: &Type, right: &Type) -> Type;

    /// View `instance` as an instance of one of its base classes
    fn map_instance_to_supertype(
        &self,
        instance: &InstanceType,
        superclass: ClassId,
    ) -> Option<InstanceType>;

    /// Mutual subtyping
    fn is_equivalent(&self, left: &Type, right: &Type) -> bool {
        self.is_subtype(left, right) && self.is_subtype(right, left)
    }
}

/// Well-known builtin classes the relations need
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTypes {
    pub object: Option<ClassId>,
    pub type_type: Option<ClassId>,
    pub tuple: Option<ClassId>,
    pub function: Option<ClassId>,
}

impl BasicTypes {
    pub fn from_classes(classes: &ClassTable) -> Self {
        Self {
            object: classes.by_fullname("builtins.object"),
            type_type: classes.by_fullname("builtins.type"),
            tuple: classes.by_fullname("builtins.tuple"),
            function: classes.by_fullname("builtins.function"),
        }
    }
}

/// Nominal relations over a class table
pub struct NominalOracle<'a> {
    classes: &'a ClassTable,
    basic: BasicTypes,
}

impl<'a> NominalOracle<'a> {
    pub fn new(classes: &'a ClassTable) -> Self {
        Self {
            classes,
            basic: BasicTypes::from_classes(classes),
        }
    }

    fn instance_of(&self, class: Option<ClassId>) -> Option<InstanceType> {
        class.map(|id| {
            let info = self.classes.get(id);
            InstanceType::new(id, info.fullname.clone(), Vec::new())
        })
    }

    fn object(&self) -> Type {
        self.instance_of(self.basic.object)
            .map(Type::Instance)
            .unwrap_or(Type::Error)
    }

    /// Instance the given structural type falls back to for nominal checks
    fn fallback_instance(&self, ty: &Type) -> Option<InstanceType> {
        match ty {
            Type::Tuple(_) => self.instance_of(self.basic.tuple),
            Type::Callable(c) if c.is_type_obj => self.instance_of(self.basic.type_type),
            Type::Overloaded(items) if items.first().is_some_and(|c| c.is_type_obj) => {
                self.instance_of(self.basic.type_type)
            }
            Type::Callable(_) | Type::Overloaded(_) => self.instance_of(self.basic.function),
            _ => None,
        }
    }
}

impl TypeOracle for NominalOracle<'_> {
    fn is_subtype(&self, left: &Type, right: &Type) -> bool {
        subtype::is_subtype(self, left, right)
    }

    fn is_proper_subtype(&self, left: &Type, right: &Type) -> bool {
        subtype::is_proper_subtype(self, left, right)
    }

    fn is_same_type(&self, left: &Type, right: &Type) -> bool {
        subtype::is_same_type(left, right)
    }

    fn join(&self, left: &Type, right: &Type) -> Type {
        join::join_types(self, left, right)
    }

    fn map_instance_to_supertype(
        &self,
        instance: &InstanceType,
        superclass: ClassId,
    ) -> Option<InstanceType> {
        if instance.class == superclass {
            return Some(instance.clone());
        }
        let info = self.classes.get(instance.class);
        if !info.has_base(superclass) {
            return None;
        }
        for base in &info.bases {
            let mapped = match expand_type_by_instance(&Type::Instance(base.clone()), instance) {
                Type::Instance(mapped) => mapped,
                _ => continue,
            };
            if let Some(found) = self.map_instance_to_supertype(&mapped, superclass) {
                return Some(found);
            }
        }
        None
    }
}

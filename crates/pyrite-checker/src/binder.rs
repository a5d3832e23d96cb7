//! Conditional type binder
//!
//! Keeps a stack of narrowed types per variable. A narrowing is pushed when a
//! guarded branch is entered and popped when it is left; the variable's own
//! declaration is never touched.

use crate::symbol::VarRef;
use crate::types::Type;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ConditionalTypeBinder {
    types: HashMap<VarRef, Vec<Type>>,
}

impl ConditionalTypeBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, var: &VarRef, ty: Type) {
        self.types.entry(var.clone()).or_default().push(ty);
    }

    /// Drop the innermost narrowing of `var`; returns it if there was one
    pub fn pop(&mut self, var: &VarRef) -> Option<Type> {
        let stack = self.types.get_mut(var)?;
        let popped = stack.pop();
        if stack.is_empty() {
            self.types.remove(var);
        }
        popped
    }

    /// Innermost narrowed type, falling back to the declared/inferred type
    pub fn get(&self, var: &VarRef) -> Option<Type> {
        match self.types.get(var).and_then(|stack| stack.last()) {
            Some(ty) => Some(ty.clone()),
            None => var.ty(),
        }
    }

    /// Number of active narrowings for `var`
    pub fn depth(&self, var: &VarRef) -> usize {
        self.types.get(var).map_or(0, Vec::len)
    }

    /// Number of active narrowings over all variables
    pub fn total_depth(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Var;
    use proptest::prelude::*;

    #[test]
    fn test_get_falls_back_to_declared_type() {
        let mut binder = ConditionalTypeBinder::new();
        let x = Var::with_type("x", Type::Any);
        assert_eq!(binder.get(&x), Some(Type::Any));

        binder.push(&x, Type::NoneTyp);
        assert_eq!(binder.get(&x), Some(Type::NoneTyp));

        binder.pop(&x);
        assert_eq!(binder.get(&x), Some(Type::Any));
        assert!(binder.is_empty());
    }

    #[test]
    fn test_untyped_var_without_narrowing() {
        let binder = ConditionalTypeBinder::new();
        assert_eq!(binder.get(&Var::new("y")), None);
    }

    #[test]
    fn test_pop_on_empty_is_harmless() {
        let mut binder = ConditionalTypeBinder::new();
        assert_eq!(binder.pop(&Var::new("z")), None);
    }

    proptest! {
        #[test]
        fn prop_nested_push_pop_restores_depth(ops in proptest::collection::vec(0usize..3, 0..32)) {
            let vars = [Var::new("a"), Var::new("b"), Var::new("c")];
            let mut binder = ConditionalTypeBinder::new();
            for &i in &ops {
                binder.push(&vars[i], Type::Void);
            }
            prop_assert_eq!(binder.total_depth(), ops.len());
            for &i in ops.iter().rev() {
                prop_assert_eq!(binder.pop(&vars[i]), Some(Type::Void));
            }
            prop_assert!(binder.is_empty());
        }
    }
}

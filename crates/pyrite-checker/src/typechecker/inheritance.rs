//! Method override and multiple inheritance compatibility

use super::messages;
use super::TypeChecker;
use crate::span::Span;
use crate::symbol::{ClassId, Symbol};
use crate::types::Type;

impl TypeChecker<'_> {
    /// Compare a method definition against every base class that also
    /// defines `name`. Constructors are exempt.
    pub(crate) fn check_method_override(
        &mut self,
        name: &str,
        class: ClassId,
        ty: &Type,
        span: Span,
    ) {
        if name == "__init__" {
            return;
        }
        let program = self.program;
        let info = program.classes.get(class);
        for &base in info.mro.iter().skip(1) {
            let base_info = program.classes.get(base);
            let Some(base_attr) = base_info.get(name) else {
                continue;
            };
            match base_attr.declared_type() {
                Some(original) if original.is_function_like() => {
                    let original =
                        self.map_type_from_supertype(&original.bound_method(), class, base);
                    self.check_override(&ty.bound_method(), &original, name, &base_info.name, span);
                }
                _ => self.fail(
                    messages::signature_incompatible_with_supertype(name, &base_info.name),
                    span,
                ),
            }
        }
    }

    fn check_override(
        &mut self,
        override_type: &Type,
        original: &Type,
        name: &str,
        supertype: &str,
        span: Span,
    ) {
        match (override_type, original) {
            (Type::Callable(new), Type::Callable(old))
                if new.arg_types.len() == old.arg_types.len() && new.min_args() == old.min_args() =>
            {
                let pairs = old.arg_types.iter().zip(&new.arg_types);
                for (i, (old_arg, new_arg)) in pairs.enumerate() {
                    if !self.oracle.is_equivalent(old_arg, new_arg) {
                        self.fail(
                            messages::argument_incompatible_with_supertype(i + 1, name, supertype),
                            span,
                        );
                    }
                }
                if !self.oracle.is_subtype(&new.ret_type, &old.ret_type) {
                    self.fail(
                        messages::return_type_incompatible_with_supertype(name, supertype),
                        span,
                    );
                }
            }
            _ => {
                if !self.oracle.is_subtype(override_type, original) {
                    self.fail(
                        messages::signature_incompatible_with_supertype(name, supertype),
                        span,
                    );
                }
            }
        }
    }

    /// Names defined by two different bases of `class` must agree unless
    /// `class` itself redefines them
    pub(crate) fn check_multiple_inheritance(&mut self, class: ClassId, span: Span) {
        let program = self.program;
        let info = program.classes.get(class);
        if info.bases.len() <= 1 {
            return;
        }
        let mro = info.mro.get(1..).unwrap_or_default();
        for (i, &base1) in mro.iter().enumerate() {
            let base1_info = program.classes.get(base1);
            for name in base1_info.names.keys() {
                if name == "__init__" || info.names.contains_key(name) {
                    continue;
                }
                for &base2 in &mro[i + 1..] {
                    if program.classes.get(base2).names.contains_key(name) {
                        self.check_compatibility(name, base1, base2, span);
                    }
                }
            }
        }
    }

    fn check_compatibility(&mut self, name: &str, base1: ClassId, base2: ClassId, span: Span) {
        let program = self.program;
        let first_info = program.classes.get(base1);
        let second_info = program.classes.get(base2);
        let first = first_info.get(name).and_then(Symbol::declared_type);
        let second = second_info.get(name).and_then(Symbol::declared_type);

        let compatible = match (first, second) {
            (Some(first), Some(second))
                if first.is_function_like() && second.is_function_like() =>
            {
                self.oracle
                    .is_equivalent(&first.bound_method(), &second.bound_method())
            }
            (Some(first), Some(second)) => self.oracle.is_equivalent(&first, &second),
            // Untyped definitions behave like Any
            _ => true,
        };
        if !compatible {
            self.fail(
                messages::base_class_definitions_incompatible(
                    name,
                    &first_info.name,
                    &second_info.name,
                ),
                span,
            );
        }
    }
}

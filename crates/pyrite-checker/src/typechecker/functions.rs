//! Function, method and class definitions

use super::expand::FuncExpander;
use super::messages;
use super::{FunctionFrame, Operand, TypeChecker};
use crate::ast::{ClassDef, Decorator, FuncDef, FuncItem, OverloadedFuncDef};
use crate::span::Span;
use crate::symbol::ClassId;
use crate::typeops::{expand_type, TypeVarMap};
use crate::types::{ArgKind, CallableType, Type};
use std::borrow::Cow;
use tracing::trace;

impl TypeChecker<'_> {
    pub(crate) fn check_func_def(&mut self, defn: &FuncDef) {
        self.check_func_item(&defn.item, Some(&defn.name), defn.info);

        if let Some(info) = defn.info {
            self.check_method_override(&defn.name, info, &defn.symbol.ty, defn.item.span);
        }

        if let Some(original) = &defn.original_def {
            let new_type = Type::Callable(defn.item.function_type());
            if !self.oracle.is_same_type(&new_type, &original.ty) {
                self.fail(messages::INCOMPATIBLE_CONDITIONAL_FUNCTION_DEF, defn.item.span);
            }
        }
    }

    pub(crate) fn check_overloaded_func_def(&mut self, defn: &OverloadedFuncDef, span: Span) {
        let mut num_abstract = 0;
        for item in &defn.items {
            self.check_func_item(&item.item, Some(&item.name), item.info);
            if item.is_abstract {
                num_abstract += 1;
            }
        }
        if num_abstract != 0 && num_abstract != defn.items.len() {
            self.fail(messages::INCONSISTENT_ABSTRACT_OVERLOAD, span);
        }
        if let Some(info) = defn.info {
            self.check_method_override(&defn.symbol.name, info, &defn.symbol.ty, span);
        }
    }

    /// Check the body once per value of a restricted leading type variable,
    /// or once with the declared signature otherwise
    fn check_func_item(&mut self, item: &FuncItem, name: Option<&str>, info: Option<ClassId>) {
        let frame = FunctionFrame {
            name: name.map(str::to_string),
            dynamic: item.ty.is_none(),
            is_generator: item.is_generator,
        };
        self.with_function(frame, |c| {
            for (item, sig, note) in c.expand_typevars(item) {
                c.with_instantiation(note, |c| {
                    c.with_local_scope(|c| c.check_func_body(&item, &sig, name, info));
                });
            }
        });
    }

    fn expand_typevars<'i>(
        &mut self,
        item: &'i FuncItem,
    ) -> Vec<(Cow<'i, FuncItem>, CallableType, Option<String>)> {
        let sig = item.function_type();
        let restricted = sig.variables.first().filter(|v| !v.values.is_empty()).cloned();
        let Some(var) = restricted else {
            return vec![(Cow::Borrowed(item), sig, None)];
        };

        var.values
            .iter()
            .map(|value| {
                let mut map = TypeVarMap::new();
                map.insert(var.id, value.clone());
                let expanded_sig = match expand_type(&Type::Callable(sig.clone()), &map) {
                    Type::Callable(c) => c,
                    _ => sig.clone(),
                };
                let expanded_item = FuncExpander::expand(item, &map, self.alloc_node_id());
                trace!(var = %var.name, value = %value, "checking instantiation");
                let note = format!("In instantiation with {} = {}", var.name, value);
                (Cow::Owned(expanded_item), expanded_sig, Some(note))
            })
            .collect()
    }

    fn check_func_body(
        &mut self,
        item: &FuncItem,
        sig: &CallableType,
        name: Option<&str>,
        info: Option<ClassId>,
    ) {
        let dynamic = self.is_dynamic_function();
        if info.is_some() && name == Some("__init__") && !sig.ret_type.is_void() && !dynamic {
            self.fail(messages::INIT_MUST_NOT_HAVE_RETURN_TYPE, item.span);
        }

        for ((var, ty), kind) in item.args.iter().zip(&sig.arg_types).zip(&sig.arg_kinds) {
            let arg_type = match kind {
                ArgKind::Star => self.named_generic_type("builtins.list", vec![ty.clone()]),
                ArgKind::Star2 => {
                    let key = self.str_type();
                    self.named_generic_type("builtins.dict", vec![key, ty.clone()])
                }
                _ => ty.clone(),
            };
            var.set_type(arg_type);
            self.declare_local(var);
        }

        for default in item.init.iter().flatten() {
            self.accept(default, None);
        }

        self.with_return_type((*sig.ret_type).clone(), |c| c.check_block(&item.body));
    }

    pub(crate) fn check_decorator(&mut self, dec: &Decorator, span: Span) {
        self.check_func_def(&dec.func);

        let mut sig = Type::Callable(dec.func.item.function_type());
        for decorator in dec.decorators.iter().rev() {
            let decorator_type = self.accept(decorator, None);
            let args = [Operand::Temp(sig)];
            let (result, _) =
                self.check_call(&decorator_type, &args, &[ArgKind::Pos], &[None], span);
            sig = result;
        }
        let sig = match sig {
            Type::Callable(c) => Type::Callable(c.with_name(dec.func.name.clone())),
            Type::Overloaded(items) => Type::Overloaded(
                items
                    .into_iter()
                    .map(|c| c.with_name(dec.func.name.clone()))
                    .collect(),
            ),
            other => other,
        };
        dec.var.set_type(sig);
    }

    pub(crate) fn check_class_def(&mut self, def: &ClassDef, span: Span) {
        self.with_class(def.info, |c| {
            c.check_block(&def.defs);
            c.check_multiple_inheritance(def.info, span);
        });
    }
}

//! Minimal `builtins` module
//!
//! Declares the classes, functions and protocol methods the checker resolves
//! by name. Everything here is a signature stub; there are no bodies.

use crate::builder::TreeBuilder;
use crate::symbol::ClassId;
use crate::types::{ArgKind, CallableType, Type, TypeVarDef};

/// Ids of the builtin classes, `None` in a builder without builtins
#[derive(Debug, Clone, Copy, Default)]
pub struct Prelude {
    pub object: Option<ClassId>,
    pub type_type: Option<ClassId>,
    pub function: Option<ClassId>,
    pub int: Option<ClassId>,
    pub float: Option<ClassId>,
    pub str: Option<ClassId>,
    pub bytes: Option<ClassId>,
    pub unicode: Option<ClassId>,
    pub bool: Option<ClassId>,
    pub list: Option<ClassId>,
    pub dict: Option<ClassId>,
    pub set: Option<ClassId>,
    pub tuple: Option<ClassId>,
    pub slice: Option<ClassId>,
    pub iterable: Option<ClassId>,
    pub iterator: Option<ClassId>,
    pub base_exception: Option<ClassId>,
    pub exception: Option<ClassId>,
}

fn sig(args: Vec<Type>, ret: Type) -> CallableType {
    CallableType::simple(args, ret)
}

fn class_tv(b: &TreeBuilder, name: &str, id: i32) -> Type {
    Type::TypeVar(TypeVarDef::new(name, id, b.object_type()))
}

/// Install the builtins into `b`'s `builtins` module and return their ids
pub(crate) fn install(b: &mut TreeBuilder) -> Prelude {
    b.module(crate::builder::BUILTINS);

    let object = b.class("object", &[]);
    b.prelude.object = Some(object);
    let type_type = b.class("type", &[]);
    let function = b.class("function", &[]);
    let int = b.class("int", &[]);
    let float = b.class("float", &[]);
    let str_ = b.class("str", &[]);
    let bytes = b.class("bytes", &[]);
    let unicode = b.class("unicode", &[]);
    let bool_ = b.class("bool", &[int]);
    let tuple = b.class("tuple", &[]);
    let slice = b.class("slice", &[]);

    let iterable = b.generic_class("Iterable", &["T"], Vec::new());
    b.set_abstract(iterable);
    let t = class_tv(b, "T", 1);
    let iterator = {
        let base = b.base(iterable, vec![t.clone()]);
        b.generic_class("Iterator", &["T"], vec![base])
    };
    b.set_abstract(iterator);
    let list = {
        let base = b.base(iterable, vec![t.clone()]);
        b.generic_class("list", &["T"], vec![base])
    };
    let set = {
        let base = b.base(iterable, vec![t.clone()]);
        b.generic_class("set", &["T"], vec![base])
    };
    let k = class_tv(b, "K", 1);
    let v = class_tv(b, "V", 2);
    let dict = {
        let base = b.base(iterable, vec![k.clone()]);
        b.generic_class("dict", &["K", "V"], vec![base])
    };
    let base_exception = b.class("BaseException", &[]);
    let exception = b.class("Exception", &[base_exception]);

    let obj_t = b.instance(object);
    let int_t = b.instance(int);
    let float_t = b.instance(float);
    let str_t = b.instance(str_);
    let bytes_t = b.instance(bytes);
    let unicode_t = b.instance(unicode);
    let bool_t = b.instance(bool_);
    let slice_t = b.instance(slice);
    let iter_t = b.generic(iterator, vec![t.clone()]);

    // object
    b.declare_method(object, "__init__", sig(vec![], Type::Void));
    b.declare_method(object, "__eq__", sig(vec![obj_t.clone()], bool_t.clone()));
    b.declare_method(object, "__ne__", sig(vec![obj_t.clone()], bool_t.clone()));

    // int
    let optional_any = CallableType::new(
        vec![Type::Any],
        vec![ArgKind::Opt],
        vec![Some("x".into())],
        Type::Void,
    );
    b.declare_method(int, "__init__", optional_any.clone());
    for op in [
        "__add__", "__sub__", "__mul__", "__floordiv__", "__mod__", "__pow__", "__and__",
        "__or__", "__xor__", "__lshift__", "__rshift__", "__div__",
    ] {
        b.declare_method(int, op, sig(vec![int_t.clone()], int_t.clone()));
    }
    b.declare_method(int, "__truediv__", sig(vec![int_t.clone()], float_t.clone()));
    for op in ["__neg__", "__pos__", "__invert__"] {
        b.declare_method(int, op, sig(vec![], int_t.clone()));
    }
    for op in ["__lt__", "__gt__", "__le__", "__ge__"] {
        b.declare_method(int, op, sig(vec![int_t.clone()], bool_t.clone()));
    }

    // float
    b.declare_method(float, "__init__", optional_any.clone());
    for op in ["__add__", "__sub__", "__mul__", "__truediv__", "__div__", "__pow__"] {
        b.declare_method(float, op, sig(vec![float_t.clone()], float_t.clone()));
    }
    for op in ["__neg__", "__pos__"] {
        b.declare_method(float, op, sig(vec![], float_t.clone()));
    }
    for op in ["__lt__", "__gt__", "__le__", "__ge__"] {
        b.declare_method(float, op, sig(vec![float_t.clone()], bool_t.clone()));
    }

    // str / unicode / bytes
    for (class, this) in [(str_, &str_t), (unicode, &unicode_t)] {
        b.declare_method(class, "__init__", optional_any.clone());
        b.declare_method(class, "__add__", sig(vec![this.clone()], this.clone()));
        b.declare_method(class, "__mul__", sig(vec![int_t.clone()], this.clone()));
        b.declare_method(class, "__mod__", sig(vec![Type::Any], this.clone()));
        b.declare_method(class, "__contains__", sig(vec![this.clone()], bool_t.clone()));
        b.declare_method(class, "upper", sig(vec![], this.clone()));
        b.declare_overloaded_method(
            class,
            "__getitem__",
            vec![
                sig(vec![int_t.clone()], this.clone()),
                sig(vec![slice_t.clone()], this.clone()),
            ],
        );
        for op in ["__lt__", "__gt__", "__le__", "__ge__"] {
            b.declare_method(class, op, sig(vec![this.clone()], bool_t.clone()));
        }
    }
    b.declare_method(bytes, "__add__", sig(vec![bytes_t.clone()], bytes_t.clone()));
    b.declare_method(bytes, "__getitem__", sig(vec![int_t.clone()], int_t.clone()));

    // tuple
    b.declare_method(tuple, "__getitem__", sig(vec![int_t.clone()], Type::Any));
    b.declare_method(tuple, "__contains__", sig(vec![obj_t.clone()], bool_t.clone()));
    let any_iter = b.generic(iterator, vec![Type::Any]);
    b.declare_method(tuple, "__iter__", sig(vec![], any_iter));

    // Iterable / Iterator
    b.declare_method(iterable, "__iter__", sig(vec![], iter_t.clone()));
    b.declare_method(iterator, "__iter__", sig(vec![], iter_t.clone()));
    b.declare_method(iterator, "__next__", sig(vec![], t.clone()));
    b.declare_method(iterator, "next", sig(vec![], t.clone()));

    // list
    let list_t = b.generic(list, vec![t.clone()]);
    b.declare_method(list, "__init__", sig(vec![], Type::Void));
    b.declare_method(list, "append", sig(vec![t.clone()], Type::Void));
    b.declare_method(list, "__iter__", sig(vec![], iter_t.clone()));
    b.declare_overloaded_method(
        list,
        "__getitem__",
        vec![
            sig(vec![int_t.clone()], t.clone()),
            sig(vec![slice_t.clone()], list_t.clone()),
        ],
    );
    b.declare_method(list, "__setitem__", sig(vec![int_t.clone(), t.clone()], Type::Void));
    b.declare_method(list, "__delitem__", sig(vec![int_t.clone()], Type::Void));
    b.declare_method(list, "__add__", sig(vec![list_t.clone()], list_t.clone()));
    b.declare_method(list, "__mul__", sig(vec![int_t.clone()], list_t.clone()));
    b.declare_method(list, "__contains__", sig(vec![obj_t.clone()], bool_t.clone()));

    // set
    b.declare_method(set, "__init__", sig(vec![], Type::Void));
    b.declare_method(set, "add", sig(vec![t.clone()], Type::Void));
    b.declare_method(set, "__iter__", sig(vec![], iter_t.clone()));
    b.declare_method(set, "__contains__", sig(vec![obj_t.clone()], bool_t.clone()));

    // dict
    let key_iter = b.generic(iterator, vec![k.clone()]);
    b.declare_method(dict, "__init__", sig(vec![], Type::Void));
    b.declare_method(dict, "__getitem__", sig(vec![k.clone()], v.clone()));
    b.declare_method(dict, "__setitem__", sig(vec![k.clone(), v.clone()], Type::Void));
    b.declare_method(dict, "__delitem__", sig(vec![k.clone()], Type::Void));
    b.declare_method(dict, "__iter__", sig(vec![], key_iter));
    b.declare_method(dict, "__contains__", sig(vec![obj_t.clone()], bool_t.clone()));

    // exceptions
    let star_object = CallableType::new(
        vec![obj_t.clone()],
        vec![ArgKind::Star],
        vec![Some("args".into())],
        Type::Void,
    );
    b.declare_method(base_exception, "__init__", star_object);

    // functions and constants
    b.declare_func("isinstance", sig(vec![obj_t.clone(), Type::Any], bool_t.clone()));
    b.declare_func("len", sig(vec![Type::Any], int_t.clone()));
    let int_list = b.generic(list, vec![int_t.clone()]);
    b.declare_func("range", sig(vec![int_t.clone()], int_list));
    b.global_var("None", Some(Type::NoneTyp));
    b.global_var("True", Some(bool_t.clone()));
    b.global_var("False", Some(bool_t));

    Prelude {
        object: Some(object),
        type_type: Some(type_type),
        function: Some(function),
        int: Some(int),
        float: Some(float),
        str: Some(str_),
        bytes: Some(bytes),
        unicode: Some(unicode),
        bool: Some(bool_),
        list: Some(list),
        dict: Some(dict),
        set: Some(set),
        tuple: Some(tuple),
        slice: Some(slice),
        iterable: Some(iterable),
        iterator: Some(iterator),
        base_exception: Some(base_exception),
        exception: Some(exception),
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TreeBuilder;

    #[test]
    fn test_builtin_classes_resolve() {
        let b = TreeBuilder::new();
        let program = b.program();
        for name in ["object", "int", "str", "list", "dict", "Iterator", "BaseException"] {
            assert!(
                program.lookup_class(&format!("builtins.{}", name)).is_ok(),
                "missing builtins.{}",
                name
            );
        }
    }

    #[test]
    fn test_bool_derives_from_int() {
        let b = TreeBuilder::new();
        let p = b.prelude();
        let info = b.program().classes.get(p.bool.unwrap());
        assert!(info.has_base(p.int.unwrap()));
        assert!(info.has_base(p.object.unwrap()));
    }

    #[test]
    fn test_list_mro_reaches_iterable() {
        let b = TreeBuilder::new();
        let p = b.prelude();
        let list = b.program().classes.get(p.list.unwrap());
        assert_eq!(list.mro.len(), 3);
        assert!(list.has_base(p.iterable.unwrap()));
    }
}

//! Message texts
//!
//! Fixed messages are [`Msg`] constants pairing a code with its text; the
//! functions build messages that mention types or names.

use crate::diagnostic::error_codes as codes;
use crate::types::{CallableType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Msg {
    pub code: &'static str,
    pub text: &'static str,
}

const fn msg(code: &'static str, text: &'static str) -> Msg {
    Msg { code, text }
}

pub(crate) const INCOMPATIBLE_TYPES: Msg = msg(codes::INCOMPATIBLE_TYPES, "Incompatible types");
pub(crate) const INCOMPATIBLE_TYPES_IN_ASSIGNMENT: Msg =
    msg(codes::INCOMPATIBLE_ASSIGNMENT, "Incompatible types in assignment");
pub(crate) const INCOMPATIBLE_RETURN_VALUE_TYPE: Msg =
    msg(codes::INCOMPATIBLE_RETURN_VALUE, "Incompatible return value type");
pub(crate) const NO_RETURN_VALUE_EXPECTED: Msg =
    msg(codes::NO_RETURN_VALUE_EXPECTED, "No return value expected");
pub(crate) const RETURN_VALUE_EXPECTED: Msg =
    msg(codes::RETURN_VALUE_EXPECTED, "Return value expected");
pub(crate) const INVALID_RETURN_TYPE_FOR_YIELD: Msg = msg(
    codes::INVALID_RETURN_TYPE_FOR_YIELD,
    "Iterator function return type expected for \"yield\"",
);
pub(crate) const INVALID_EXCEPTION_TYPE: Msg =
    msg(codes::INVALID_EXCEPTION_TYPE, "Invalid exception type");
pub(crate) const UNSUPPORTED_EXCEPTION: Msg =
    msg(codes::UNSUPPORTED_EXCEPTION, "Unsupported exception");
pub(crate) const ITERABLE_EXPECTED: Msg = msg(codes::ITERABLE_EXPECTED, "Iterable expected");
pub(crate) const CANNOT_INFER_ITEM_TYPE: Msg =
    msg(codes::CANNOT_INFER_ITEM_TYPE, "Cannot infer iterable item type");
pub(crate) const NEED_ANNOTATION_FOR_VAR: Msg =
    msg(codes::NEED_ANNOTATION, "Need type annotation for variable");
pub(crate) const INIT_MUST_NOT_HAVE_RETURN_TYPE: Msg =
    msg(codes::INIT_RETURN_TYPE, "Cannot define return type for \"__init__\"");
pub(crate) const INCONSISTENT_ABSTRACT_OVERLOAD: Msg = msg(
    codes::INCONSISTENT_ABSTRACT_OVERLOAD,
    "Overloaded method has both abstract and non-abstract variants",
);
pub(crate) const INCOMPATIBLE_TYPES_IN_FOR: Msg =
    msg(codes::INCOMPATIBLE_TYPES_IN_FOR, "Incompatible types in for statement");
pub(crate) const INCOMPATIBLE_CONDITIONAL_FUNCTION_DEF: Msg = msg(
    codes::INCOMPATIBLE_CONDITIONAL_FUNCTION_DEF,
    "All conditional function variants must have identical signatures",
);
pub(crate) const SUPER_OUTSIDE_CLASS: Msg =
    msg(codes::SUPER_OUTSIDE_CLASS, "\"super\" used outside class");
pub(crate) const TUPLE_INDEX_OUT_OF_RANGE: Msg =
    msg(codes::INVALID_TUPLE_INDEX, "Tuple index out of range");
pub(crate) const TUPLE_INDEX_MUST_BE_AN_INT_LITERAL: Msg =
    msg(codes::INVALID_TUPLE_INDEX, "Tuple index must be an integer literal");
pub(crate) const INVALID_SLICE_INDEX: Msg =
    msg(codes::INVALID_SLICE_INDEX, "Slice index must be an integer or None");

/// A message built at the report site
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    pub code: &'static str,
    pub text: String,
}

impl From<Msg> for Message {
    fn from(m: Msg) -> Self {
        Message {
            code: m.code,
            text: m.text.to_string(),
        }
    }
}

fn message(code: &'static str, text: String) -> Message {
    Message { code, text }
}

/// `"int"`; types are quoted in messages
fn quoted(ty: &Type) -> String {
    format!("\"{}\"", ty)
}

fn for_callee(callee: &CallableType) -> String {
    match &callee.name {
        Some(name) => format!(" for \"{}\"", name),
        None => String::new(),
    }
}

pub(crate) fn does_not_return_value(source: Option<&str>) -> Message {
    let text = match source {
        Some(name) => format!("\"{}\" does not return a value", name),
        None => "Function does not return a value".to_string(),
    };
    message(codes::DOES_NOT_RETURN_VALUE, text)
}

pub(crate) fn incompatible_value_count(expected: usize, provided: usize) -> Message {
    let text = if expected < provided {
        format!(
            "Too many values to unpack ({} expected, {} provided)",
            expected, provided
        )
    } else {
        format!(
            "Need more than {} values to unpack ({} expected)",
            provided, expected
        )
    };
    message(codes::VALUE_COUNT_MISMATCH, text)
}

pub(crate) fn signature_incompatible_with_supertype(name: &str, supertype: &str) -> Message {
    message(
        codes::SIGNATURE_INCOMPATIBLE_WITH_SUPERTYPE,
        format!(
            "Signature of \"{}\" incompatible with supertype \"{}\"",
            name, supertype
        ),
    )
}

pub(crate) fn argument_incompatible_with_supertype(
    position: usize,
    name: &str,
    supertype: &str,
) -> Message {
    message(
        codes::ARGUMENT_INCOMPATIBLE_WITH_SUPERTYPE,
        format!(
            "Argument {} of \"{}\" incompatible with supertype \"{}\"",
            position, name, supertype
        ),
    )
}

pub(crate) fn return_type_incompatible_with_supertype(name: &str, supertype: &str) -> Message {
    message(
        codes::RETURN_INCOMPATIBLE_WITH_SUPERTYPE,
        format!(
            "Return type of \"{}\" incompatible with supertype \"{}\"",
            name, supertype
        ),
    )
}

pub(crate) fn base_class_definitions_incompatible(name: &str, base1: &str, base2: &str) -> Message {
    message(
        codes::BASE_CLASS_DEFINITIONS_INCOMPATIBLE,
        format!(
            "Definition of \"{}\" in base class \"{}\" is incompatible with definition in base class \"{}\"",
            name, base1, base2
        ),
    )
}

pub(crate) fn incompatible_operator_assignment(op: &str) -> Message {
    message(
        codes::INCOMPATIBLE_OPERATOR_ASSIGNMENT,
        format!("Result type of {} incompatible in assignment", op),
    )
}

pub(crate) fn has_no_attribute(ty: &Type, name: &str) -> Message {
    message(
        codes::HAS_NO_ATTRIBUTE,
        format!("{} has no attribute \"{}\"", quoted(ty), name),
    )
}

pub(crate) fn not_callable(ty: &Type) -> Message {
    message(codes::NOT_CALLABLE, format!("{} not callable", quoted(ty)))
}

pub(crate) fn too_few_arguments(callee: &CallableType) -> Message {
    message(codes::ARG_COUNT, format!("Too few arguments{}", for_callee(callee)))
}

pub(crate) fn too_many_arguments(callee: &CallableType) -> Message {
    message(codes::ARG_COUNT, format!("Too many arguments{}", for_callee(callee)))
}

pub(crate) fn unexpected_keyword_argument(callee: &CallableType, name: &str) -> Message {
    message(
        codes::ARG_COUNT,
        format!("Unexpected keyword argument \"{}\"{}", name, for_callee(callee)),
    )
}

pub(crate) fn incompatible_argument(
    position: usize,
    callee: &CallableType,
    actual: &Type,
    expected: &Type,
) -> Message {
    let target = match &callee.name {
        Some(name) => format!(" to \"{}\"", name),
        None => String::new(),
    };
    message(
        codes::INCOMPATIBLE_ARGUMENT,
        format!(
            "Argument {}{} has incompatible type {}; expected {}",
            position,
            target,
            quoted(actual),
            quoted(expected)
        ),
    )
}

pub(crate) fn unsupported_operand_types(op: &str, left: &Type, right: &Type) -> Message {
    message(
        codes::UNSUPPORTED_OPERAND,
        format!(
            "Unsupported operand types for {} ({} and {})",
            op,
            quoted(left),
            quoted(right)
        ),
    )
}

pub(crate) fn unsupported_left_operand(op: &str, ty: &Type) -> Message {
    message(
        codes::UNSUPPORTED_OPERAND,
        format!("Unsupported left operand type for {} ({})", op, quoted(ty)),
    )
}

pub(crate) fn unsupported_unary_operand(op: &str, ty: &Type) -> Message {
    message(
        codes::UNSUPPORTED_OPERAND,
        format!("Unsupported operand type for unary {} ({})", op, quoted(ty)),
    )
}

pub(crate) fn no_matching_overload(callee: &CallableType) -> Message {
    let name = callee.display_name();
    message(
        codes::NO_MATCHING_OVERLOAD,
        format!("No overload variant of {} matches argument types", name),
    )
}

pub(crate) fn cannot_infer_type_argument(index: usize, callee: &CallableType) -> Message {
    message(
        codes::CANNOT_INFER_TYPE_ARGUMENT,
        format!(
            "Cannot infer type argument {} of {}",
            index,
            callee.display_name()
        ),
    )
}

pub(crate) fn incompatible_typevar_value(
    index: usize,
    callee: &CallableType,
    value: &Type,
) -> Message {
    message(
        codes::CANNOT_INFER_TYPE_ARGUMENT,
        format!(
            "Type argument {} of {} has incompatible value {}",
            index,
            callee.display_name(),
            quoted(value)
        ),
    )
}

pub(crate) fn cannot_determine_type(name: &str) -> Message {
    message(
        codes::CANNOT_DETERMINE_TYPE,
        format!("Cannot determine type of \"{}\"", name),
    )
}

pub(crate) fn incompatible_display_item(kind: &str, index: usize, ty: &Type) -> Message {
    message(
        codes::INCOMPATIBLE_TYPES,
        format!("{} item {} has incompatible type {}", kind, index, quoted(ty)),
    )
}

pub(crate) fn invalid_type_application(expected: usize, given: usize) -> Message {
    let text = if expected == 0 {
        "Type application targets a non-generic function".to_string()
    } else if given > expected {
        format!("Type application has too many types ({} expected)", expected)
    } else {
        format!("Type application has too few types ({} expected)", expected)
    };
    message(codes::INVALID_TYPE_APPLICATION, text)
}

pub(crate) fn super_has_no_attribute(name: &str) -> Message {
    message(
        codes::HAS_NO_ATTRIBUTE,
        format!("\"super\" has no attribute \"{}\"", name),
    )
}

/// Items of a display without an expected type have no common type
pub(crate) fn cannot_infer_display_item(kind: &str) -> Message {
    message(
        codes::CANNOT_INFER_TYPE_ARGUMENT,
        format!("Cannot infer {} item type", kind.to_lowercase()),
    )
}

pub(crate) fn missing_builtin(fullname: &str) -> Message {
    message(
        codes::MISSING_BUILTIN,
        format!("Builtin class \"{}\" is not defined", fullname),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallableType;

    #[test]
    fn test_value_count_wording() {
        assert_eq!(
            incompatible_value_count(2, 3).text,
            "Too many values to unpack (2 expected, 3 provided)"
        );
        assert_eq!(
            incompatible_value_count(3, 2).text,
            "Need more than 2 values to unpack (3 expected)"
        );
    }

    #[test]
    fn test_argument_count_names_callee() {
        let named = CallableType::simple(vec![], Type::Any).with_name("f");
        assert_eq!(too_many_arguments(&named).text, "Too many arguments for \"f\"");
        let anonymous = CallableType::simple(vec![], Type::Any);
        assert_eq!(too_few_arguments(&anonymous).text, "Too few arguments");
    }
}

//! Error code registry
//!
//! Ranges:
//! - PY3xxx: type checking errors
//! - PY9xxx: internal errors

pub const INCOMPATIBLE_TYPES: &str = "PY3001";
pub const INCOMPATIBLE_ASSIGNMENT: &str = "PY3002";
pub const INCOMPATIBLE_RETURN_VALUE: &str = "PY3003";
pub const NO_RETURN_VALUE_EXPECTED: &str = "PY3004";
pub const RETURN_VALUE_EXPECTED: &str = "PY3005";
pub const DOES_NOT_RETURN_VALUE: &str = "PY3006";
pub const INVALID_RETURN_TYPE_FOR_YIELD: &str = "PY3007";
pub const INVALID_EXCEPTION_TYPE: &str = "PY3008";
pub const ITERABLE_EXPECTED: &str = "PY3009";
pub const CANNOT_INFER_ITEM_TYPE: &str = "PY3010";
pub const VALUE_COUNT_MISMATCH: &str = "PY3011";
pub const NEED_ANNOTATION: &str = "PY3012";
pub const INIT_RETURN_TYPE: &str = "PY3013";
pub const INCONSISTENT_ABSTRACT_OVERLOAD: &str = "PY3014";
pub const SIGNATURE_INCOMPATIBLE_WITH_SUPERTYPE: &str = "PY3015";
pub const ARGUMENT_INCOMPATIBLE_WITH_SUPERTYPE: &str = "PY3016";
pub const RETURN_INCOMPATIBLE_WITH_SUPERTYPE: &str = "PY3017";
pub const BASE_CLASS_DEFINITIONS_INCOMPATIBLE: &str = "PY3018";
pub const INCOMPATIBLE_CONDITIONAL_FUNCTION_DEF: &str = "PY3019";
pub const INCOMPATIBLE_OPERATOR_ASSIGNMENT: &str = "PY3020";
pub const INCOMPATIBLE_TYPES_IN_FOR: &str = "PY3021";
pub const HAS_NO_ATTRIBUTE: &str = "PY3022";
pub const NOT_CALLABLE: &str = "PY3023";
pub const ARG_COUNT: &str = "PY3024";
pub const INCOMPATIBLE_ARGUMENT: &str = "PY3025";
pub const UNSUPPORTED_OPERAND: &str = "PY3026";
pub const NO_MATCHING_OVERLOAD: &str = "PY3027";
pub const INVALID_TUPLE_INDEX: &str = "PY3028";
pub const CANNOT_INFER_TYPE_ARGUMENT: &str = "PY3029";
pub const UNSUPPORTED_EXCEPTION: &str = "PY3030";
pub const CANNOT_DETERMINE_TYPE: &str = "PY3031";
pub const SUPER_OUTSIDE_CLASS: &str = "PY3032";
pub const INVALID_TYPE_APPLICATION: &str = "PY3033";
pub const INVALID_SLICE_INDEX: &str = "PY3034";

pub const MISSING_BUILTIN: &str = "PY9001";

/// Error code descriptor
#[derive(Debug, Clone)]
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub description: &'static str,
    pub help: Option<&'static str>,
}

pub fn lookup(code: &str) -> Option<ErrorCodeInfo> {
    ERROR_CODES.iter().find(|e| e.code == code).cloned()
}

pub fn help_for(code: &str) -> Option<&'static str> {
    lookup(code).and_then(|e| e.help)
}

pub fn description_for(code: &str) -> Option<&'static str> {
    lookup(code).map(|e| e.description)
}

pub static ERROR_CODES: &[ErrorCodeInfo] = &[
    ErrorCodeInfo {
        code: INCOMPATIBLE_TYPES,
        description: "Incompatible types",
        help: None,
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_ASSIGNMENT,
        description: "Incompatible types in assignment",
        help: Some("The assigned value must be a subtype of the target's declared type."),
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_RETURN_VALUE,
        description: "Incompatible return value type",
        help: Some("Return a value compatible with the declared return type."),
    },
    ErrorCodeInfo {
        code: NO_RETURN_VALUE_EXPECTED,
        description: "No return value expected",
        help: Some("The function is declared to return None; remove the returned value."),
    },
    ErrorCodeInfo {
        code: RETURN_VALUE_EXPECTED,
        description: "Return value expected",
        help: None,
    },
    ErrorCodeInfo {
        code: DOES_NOT_RETURN_VALUE,
        description: "Function does not return a value",
        help: Some("A call to a function declared to return None cannot be used as a value."),
    },
    ErrorCodeInfo {
        code: INVALID_RETURN_TYPE_FOR_YIELD,
        description: "Iterator function return type expected for yield",
        help: Some("Declare the generator's return type as Iterator[T]."),
    },
    ErrorCodeInfo {
        code: INVALID_EXCEPTION_TYPE,
        description: "Invalid exception type",
        help: Some("Only BaseException subclasses can be raised or caught."),
    },
    ErrorCodeInfo {
        code: ITERABLE_EXPECTED,
        description: "Iterable expected",
        help: None,
    },
    ErrorCodeInfo {
        code: CANNOT_INFER_ITEM_TYPE,
        description: "Cannot infer iterable item type",
        help: None,
    },
    ErrorCodeInfo {
        code: VALUE_COUNT_MISMATCH,
        description: "Wrong number of values to unpack",
        help: None,
    },
    ErrorCodeInfo {
        code: NEED_ANNOTATION,
        description: "Need type annotation for variable",
        help: Some("The initializer does not determine a precise type; annotate the variable."),
    },
    ErrorCodeInfo {
        code: INIT_RETURN_TYPE,
        description: "Cannot define return type for __init__",
        help: None,
    },
    ErrorCodeInfo {
        code: INCONSISTENT_ABSTRACT_OVERLOAD,
        description: "Overloaded method has both abstract and non-abstract variants",
        help: None,
    },
    ErrorCodeInfo {
        code: SIGNATURE_INCOMPATIBLE_WITH_SUPERTYPE,
        description: "Signature incompatible with supertype",
        help: None,
    },
    ErrorCodeInfo {
        code: ARGUMENT_INCOMPATIBLE_WITH_SUPERTYPE,
        description: "Argument incompatible with supertype",
        help: Some("Overriding methods must accept exactly the argument types of the base method."),
    },
    ErrorCodeInfo {
        code: RETURN_INCOMPATIBLE_WITH_SUPERTYPE,
        description: "Return type incompatible with supertype",
        help: None,
    },
    ErrorCodeInfo {
        code: BASE_CLASS_DEFINITIONS_INCOMPATIBLE,
        description: "Base classes define incompatible members",
        help: Some("Override the member in the derived class or make the base definitions agree."),
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_CONDITIONAL_FUNCTION_DEF,
        description: "Conditional function variants must have identical signatures",
        help: None,
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_OPERATOR_ASSIGNMENT,
        description: "Result type of operator assignment is incompatible",
        help: None,
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_TYPES_IN_FOR,
        description: "Incompatible types in for statement",
        help: None,
    },
    ErrorCodeInfo {
        code: HAS_NO_ATTRIBUTE,
        description: "Attribute not found",
        help: None,
    },
    ErrorCodeInfo {
        code: NOT_CALLABLE,
        description: "Value is not callable",
        help: None,
    },
    ErrorCodeInfo {
        code: ARG_COUNT,
        description: "Wrong number of arguments",
        help: Some("Check the function signature for the accepted arguments."),
    },
    ErrorCodeInfo {
        code: INCOMPATIBLE_ARGUMENT,
        description: "Incompatible argument type",
        help: None,
    },
    ErrorCodeInfo {
        code: UNSUPPORTED_OPERAND,
        description: "Unsupported operand types",
        help: None,
    },
    ErrorCodeInfo {
        code: NO_MATCHING_OVERLOAD,
        description: "No overload variant matches the arguments",
        help: None,
    },
    ErrorCodeInfo {
        code: INVALID_TUPLE_INDEX,
        description: "Invalid tuple index",
        help: Some("Tuples can only be indexed with integer literals within range."),
    },
    ErrorCodeInfo {
        code: CANNOT_INFER_TYPE_ARGUMENT,
        description: "Cannot infer type argument",
        help: None,
    },
    ErrorCodeInfo {
        code: UNSUPPORTED_EXCEPTION,
        description: "Unsupported exception expression",
        help: None,
    },
    ErrorCodeInfo {
        code: CANNOT_DETERMINE_TYPE,
        description: "Cannot determine type",
        help: None,
    },
    ErrorCodeInfo {
        code: SUPER_OUTSIDE_CLASS,
        description: "super() used outside a class",
        help: None,
    },
    ErrorCodeInfo {
        code: INVALID_TYPE_APPLICATION,
        description: "Invalid type application",
        help: None,
    },
    ErrorCodeInfo {
        code: INVALID_SLICE_INDEX,
        description: "Slice index must be an integer or None",
        help: None,
    },
    ErrorCodeInfo {
        code: MISSING_BUILTIN,
        description: "Builtin definition not available",
        help: Some("The builtins module is incomplete; this is a setup problem, not a user error."),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_codes() {
        let mut seen = std::collections::HashSet::new();
        for entry in ERROR_CODES {
            assert!(seen.insert(entry.code), "Duplicate error code: {}", entry.code);
        }
    }

    #[test]
    fn test_codes_follow_ranges() {
        for entry in ERROR_CODES {
            assert!(
                entry.code.starts_with("PY3") || entry.code.starts_with("PY9"),
                "{} outside the known ranges",
                entry.code
            );
        }
    }

    #[test]
    fn test_lookup_existing() {
        assert_eq!(description_for(VALUE_COUNT_MISMATCH), Some("Wrong number of values to unpack"));
        assert!(help_for(NEED_ANNOTATION).is_some());
        assert!(lookup("PY0000").is_none());
    }
}

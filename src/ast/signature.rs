use std::collections::HashMap;
use std::fmt;

/// Declared type of a function extension parameter or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// A JSON value, or Nothing
    Value,
    /// A boolean outcome
    Logical,
    /// A node list
    Nodes,
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionType::Value => "ValueType",
            ExpressionType::Logical => "LogicalType",
            ExpressionType::Nodes => "NodesType",
        };
        f.write_str(name)
    }
}

/// Parameter and result types of a function extension.
///
/// Used by the parser to check arity and argument types, and by the
/// evaluator to decide how node list arguments are passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub arg_types: Vec<ExpressionType>,
    pub result_type: ExpressionType,
}

impl FunctionSignature {
    pub fn new(arg_types: Vec<ExpressionType>, result_type: ExpressionType) -> Self {
        FunctionSignature {
            arg_types,
            result_type,
        }
    }
}

/// Function signatures by function name.
pub type FunctionSignatureMap = HashMap<String, FunctionSignature>;

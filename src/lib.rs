//! An RFC 9535 JSONPath query engine.
//!
//! A query goes through three stages: the [lexer] turns text into tokens,
//! the [parser] turns tokens into a [`Query`], and the [evaluator] applies
//! that query to a [`Value`], producing [`JsonPathNode`]s.
//!
//! ```
//! use jpq::{Environment, Value};
//! use serde_json::json;
//!
//! let env = Environment::new();
//! let document = Value::from(json!({"a": 1, "b": {"a": 2}}));
//!
//! let nodes = env.query("$..a", &document).unwrap();
//! let paths: Vec<String> = nodes.iter().map(|node| node.path()).collect();
//! assert_eq!(paths, vec!["$['a']", "$['b']['a']"]);
//! ```
pub mod ast;
pub mod cli;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod node;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{
    BinOp, ExpressionType, FilterExpression, FunctionSignature, FunctionSignatureMap, Query,
    Segment, Selector, Token, TokenKind,
};
pub use environment::{Environment, JsonPath};
pub use error::Error;
pub use evaluator::{EvalContext, EvalError, Evaluator, evaluate};
pub use functions::{
    FilterFunction, FilterValue, FunctionExtensionMap, standard_functions, standard_signatures,
};
pub use lexer::{LexError, Lexer, tokenize};
pub use node::{JsonPathNode, Location, NodeList, PathElement};
pub use parser::{ParseError, Parser, parse, parse_with_signatures};
pub use value::Value;

/// Render a query in canonical JSONPath syntax.
pub fn to_string(query: &Query) -> String {
    query.to_string()
}

/// Is `query` guaranteed to produce at most one node?
pub fn singular_query(query: &Query) -> bool {
    query.is_singular()
}

/// Parse `query` against `signatures` and evaluate it against `document`.
pub fn query<'v>(
    query: &str,
    document: &'v Value,
    functions: &FunctionExtensionMap,
    signatures: &FunctionSignatureMap,
) -> Result<NodeList<'v>, Error> {
    let query = parse_with_signatures(query, signatures)?;
    Ok(evaluate(&query, document, functions, signatures)?)
}

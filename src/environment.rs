//! A function registry with parse and query conveniences.

use std::fmt;
use std::sync::Arc;

use crate::{
    ast::{FunctionSignatureMap, Query},
    error::Error,
    evaluator::{EvalError, Evaluator},
    functions::{FilterFunction, FunctionExtensionMap, signatures_of, standard_functions},
    node::NodeList,
    parser::{ParseError, parse_with_signatures},
    value::Value,
};

/// Function extensions and their signatures, kept in step.
///
/// Queries parsed through an environment are checked against its
/// signatures, and evaluated with its functions.
///
/// # Examples
///
/// ```
/// use jpq::{Environment, Value};
/// use serde_json::json;
///
/// let env = Environment::new();
/// let document = Value::from(json!({"users": [{"name": "a", "tags": [1, 2]}, {"name": "b"}]}));
///
/// let path = env.compile("$.users[?count(@.tags[*]) > 1].name").unwrap();
/// let names = path.find_all(&document).unwrap();
/// assert_eq!(names, vec![&Value::String("a".into())]);
/// ```
#[derive(Clone)]
pub struct Environment {
    functions: FunctionExtensionMap,
    signatures: FunctionSignatureMap,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("functions", &names)
            .finish()
    }
}

impl Environment {
    /// An environment with the standard functions registered.
    pub fn new() -> Self {
        let functions = standard_functions();
        let signatures = signatures_of(&functions);
        Environment {
            functions,
            signatures,
        }
    }

    /// An environment without any functions.
    pub fn empty() -> Self {
        Environment {
            functions: FunctionExtensionMap::new(),
            signatures: FunctionSignatureMap::new(),
        }
    }

    /// Register a function extension, replacing any function with the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, function: impl FilterFunction + 'static) -> &mut Self {
        let name = name.into();
        log::debug!("registering filter function '{}'", name);
        self.signatures.insert(name.clone(), function.signature());
        self.functions.insert(name, Arc::new(function));
        self
    }

    /// Remove a function extension. Returns true if it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.signatures.remove(name);
        self.functions.remove(name).is_some()
    }

    pub fn functions(&self) -> &FunctionExtensionMap {
        &self.functions
    }

    pub fn signatures(&self) -> &FunctionSignatureMap {
        &self.signatures
    }

    /// Parse a query, checking function calls against this environment.
    pub fn parse(&self, query: &str) -> Result<Query, ParseError> {
        parse_with_signatures(query, &self.signatures)
    }

    /// Parse a query into a reusable [`JsonPath`].
    pub fn compile(&self, query: &str) -> Result<JsonPath<'_>, ParseError> {
        Ok(JsonPath {
            env: self,
            query: self.parse(query)?,
        })
    }

    /// Evaluate an already parsed query.
    pub fn evaluate<'v>(&self, query: &Query, document: &'v Value) -> Result<NodeList<'v>, EvalError> {
        Evaluator::new(&self.functions, &self.signatures).eval_query(query, document)
    }

    /// Parse and evaluate a query.
    pub fn query<'v>(&self, query: &str, document: &'v Value) -> Result<NodeList<'v>, Error> {
        let query = self.parse(query)?;
        Ok(self.evaluate(&query, document)?)
    }

    /// Parse and evaluate a query, returning matched values only.
    pub fn find_all<'v>(&self, query: &str, document: &'v Value) -> Result<Vec<&'v Value>, Error> {
        Ok(self.query(query, document)?.into_iter().map(|node| node.value).collect())
    }
}

/// A query compiled against an [`Environment`].
#[derive(Debug, Clone)]
pub struct JsonPath<'e> {
    env: &'e Environment,
    query: Query,
}

impl<'e> JsonPath<'e> {
    pub fn as_query(&self) -> &Query {
        &self.query
    }

    pub fn query<'v>(&self, document: &'v Value) -> Result<NodeList<'v>, EvalError> {
        self.env.evaluate(&self.query, document)
    }

    pub fn find_all<'v>(&self, document: &'v Value) -> Result<Vec<&'v Value>, EvalError> {
        Ok(self.query(document)?.into_iter().map(|node| node.value).collect())
    }
}

impl fmt::Display for JsonPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

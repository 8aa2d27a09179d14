//! Run JSONPath queries against JSON input

use serde_json::json;

use super::CliError;
use crate::{Environment, Value};

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The JSONPath query to execute
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// Emit `{"path", "value"}` objects instead of bare values
    pub nodes: bool,
}

/// Result of a query command
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    /// Matched values, or path/value objects, as a JSON array
    pub result: serde_json::Value,
    pub count: usize,
}

/// Parse a query and return its canonical form
pub fn execute_parse(env: &Environment, query: &str) -> Result<String, CliError> {
    Ok(env.parse(query)?.to_string())
}

/// Execute a query against the JSON input in `options`
pub fn execute_query(env: &Environment, options: &QueryOptions) -> Result<QueryOutput, CliError> {
    let query = env.parse(&options.query)?;

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;
    let document = Value::from(json_value);

    let nodes = env.evaluate(&query, &document)?;
    let count = nodes.len();

    let items = nodes
        .into_iter()
        .map(|node| {
            let value = serde_json::Value::from(node.value.clone());
            if options.nodes {
                json!({ "path": node.path(), "value": value })
            } else {
                value
            }
        })
        .collect();

    Ok(QueryOutput {
        result: serde_json::Value::Array(items),
        count,
    })
}

use thiserror::Error;

use crate::{
    ast::{BinOp, ExpressionType, FilterExpression, FunctionSignatureMap, Query, Segment, Selector, Token},
    functions::{FilterValue, FunctionExtensionMap},
    node::{JsonPathNode, NodeList},
    value::Value,
};

/// Errors that can occur during query evaluation.
///
/// Any error aborts the whole evaluation, there are no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Call to a function with no registered implementation or signature
    #[error("name error: {message}, found {token}")]
    Name { message: String, token: Token },

    /// Index arithmetic that does not fit the target platform
    #[error("index error: {message}, found {token}")]
    Index { message: String, token: Token },

    /// Function called or returning in violation of its signature
    #[error("type error: {message}, found {token}")]
    Type { message: String, token: Token },
}

/// Evaluation context holding both root and current node
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'v> {
    /// The root document (referred to by `$`)
    pub root: &'v Value,
    /// The node being filtered (what `@` refers to)
    pub current: &'v Value,
}

/// The query evaluator.
///
/// Holds read-only references to the function extension tables and applies
/// parsed queries to documents. One evaluator can be used for any number
/// of queries and documents.
pub struct Evaluator<'f> {
    functions: &'f FunctionExtensionMap,
    signatures: &'f FunctionSignatureMap,
}

/// Evaluate `query` against `document`.
///
/// # Examples
///
/// ```
/// use jpq::{evaluate, parse, standard_functions, standard_signatures, Value};
/// use serde_json::json;
///
/// let document = Value::from(json!({"a": [10, 20, 30]}));
/// let query = parse("$.a[-1]").unwrap();
/// let functions = standard_functions();
/// let signatures = standard_signatures();
///
/// let nodes = evaluate(&query, &document, &functions, &signatures).unwrap();
/// assert_eq!(nodes[0].value, &Value::Integer(30));
/// assert_eq!(nodes[0].path(), "$['a'][2]");
/// ```
pub fn evaluate<'v>(
    query: &Query,
    document: &'v Value,
    functions: &FunctionExtensionMap,
    signatures: &FunctionSignatureMap,
) -> Result<NodeList<'v>, EvalError> {
    Evaluator::new(functions, signatures).eval_query(query, document)
}

/// Convert a possibly negative index into an array position.
///
/// Indices still negative after adding `length` map to `length`, which is
/// always out of bounds.
fn normalized_index(length: usize, index: i64, token: &Token) -> Result<usize, EvalError> {
    if index >= 0 {
        return Ok(usize::try_from(index).unwrap_or(usize::MAX));
    }

    let signed_length = i64::try_from(length).map_err(|_| EvalError::Index {
        message: "array index out of range".to_string(),
        token: token.clone(),
    })?;

    let position = signed_length + index;
    if position >= 0 {
        Ok(position as usize)
    } else {
        Ok(length)
    }
}

/// Resolve slice bounds against an array length.
///
/// Returns `(start, stop, step)` ready for iteration, or `None` when the
/// slice selects nothing.
fn slice_bounds(
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
    length: i64,
) -> Option<(i64, i64, i64)> {
    let step = step.unwrap_or(1);
    if step == 0 || length == 0 {
        return None;
    }

    let start = match start {
        None if step > 0 => 0,
        None => length - 1,
        Some(n) if n < 0 => (length + n).max(0),
        Some(n) => n.min(length - 1),
    };

    let stop = match stop {
        None if step > 0 => length,
        None => -1,
        Some(n) if n < 0 => (length + n).max(-1),
        Some(n) => n.min(length),
    };

    Some((start, stop, step))
}

/// The node itself followed by all of its descendants, in pre-order.
///
/// Uses an explicit stack so deeply nested documents cannot overflow the
/// call stack.
fn descendants<'v>(node: &JsonPathNode<'v>) -> NodeList<'v> {
    let mut out = Vec::new();
    let mut stack = vec![node.clone()];

    while let Some(node) = stack.pop() {
        match node.value {
            Value::Object(obj) => {
                for (key, value) in obj.iter().rev() {
                    stack.push(node.child_name(value, key));
                }
            }
            Value::Array(arr) => {
                for (i, value) in arr.iter().enumerate().rev() {
                    stack.push(node.child_index(value, i));
                }
            }
            _ => {}
        }
        out.push(node);
    }

    out
}

impl<'f> Evaluator<'f> {
    pub fn new(functions: &'f FunctionExtensionMap, signatures: &'f FunctionSignatureMap) -> Self {
        Evaluator {
            functions,
            signatures,
        }
    }

    /// Evaluates a query against a JSON document.
    ///
    /// Starts from a single node, the document at the empty location, and
    /// replaces the node list segment by segment.
    pub fn eval_query<'v>(&self, query: &Query, document: &'v Value) -> Result<NodeList<'v>, EvalError> {
        let nodes = self.resolve(query, document, document)?;
        log::debug!("{} matched {} node(s)", query, nodes.len());
        Ok(nodes)
    }

    fn resolve<'v>(
        &self,
        query: &Query,
        start: &'v Value,
        root: &'v Value,
    ) -> Result<NodeList<'v>, EvalError> {
        let mut nodes = vec![JsonPathNode::new(start, Vec::new())];

        for segment in &query.segments {
            nodes = self.resolve_segment(segment, &nodes, root)?;
        }

        Ok(nodes)
    }

    fn resolve_segment<'v>(
        &self,
        segment: &Segment,
        nodes: &[JsonPathNode<'v>],
        root: &'v Value,
    ) -> Result<NodeList<'v>, EvalError> {
        let mut out = Vec::new();

        match segment {
            Segment::Child { selectors } => {
                for node in nodes {
                    for selector in selectors {
                        self.select(selector, node, root, &mut out)?;
                    }
                }
            }
            Segment::Descendant { selectors } => {
                for node in nodes {
                    for descendant in descendants(node) {
                        for selector in selectors {
                            self.select(selector, &descendant, root, &mut out)?;
                        }
                    }
                }
            }
        }

        Ok(out)
    }

    /// Apply one selector to one node, appending matches to `out`.
    fn select<'v>(
        &self,
        selector: &Selector,
        node: &JsonPathNode<'v>,
        root: &'v Value,
        out: &mut NodeList<'v>,
    ) -> Result<(), EvalError> {
        match selector {
            Selector::Name { name } => {
                if let Value::Object(obj) = node.value {
                    if let Some(value) = obj.get(name) {
                        out.push(node.child_name(value, name));
                    }
                }
            }
            Selector::Index { index, token } => {
                if let Value::Array(arr) = node.value {
                    let i = normalized_index(arr.len(), *index, token)?;
                    if let Some(value) = arr.get(i) {
                        out.push(node.child_index(value, i));
                    }
                }
            }
            Selector::Wildcard => match node.value {
                Value::Object(obj) => {
                    for (key, value) in obj {
                        out.push(node.child_name(value, key));
                    }
                }
                Value::Array(arr) => {
                    for (i, value) in arr.iter().enumerate() {
                        out.push(node.child_index(value, i));
                    }
                }
                _ => {}
            },
            Selector::Slice {
                start,
                stop,
                step,
                token,
            } => {
                if let Value::Array(arr) = node.value {
                    let length = i64::try_from(arr.len()).map_err(|_| EvalError::Index {
                        message: "array too long to slice".to_string(),
                        token: token.clone(),
                    })?;

                    if let Some((start, stop, step)) = slice_bounds(*start, *stop, *step, length) {
                        let mut i = start;
                        while (step > 0 && i < stop) || (step < 0 && i > stop) {
                            // Bounds are clamped to 0..length, so `i` is a valid position.
                            let position = i as usize;
                            out.push(node.child_index(&arr[position], position));
                            i += step;
                        }
                    }
                }
            }
            Selector::Filter { expression } => match node.value {
                Value::Object(obj) => {
                    for (key, value) in obj {
                        let ctx = EvalContext {
                            root,
                            current: value,
                        };
                        if self.eval_expr(expression, &ctx)?.is_truthy() {
                            out.push(node.child_name(value, key));
                        }
                    }
                }
                Value::Array(arr) => {
                    for (i, value) in arr.iter().enumerate() {
                        let ctx = EvalContext {
                            root,
                            current: value,
                        };
                        if self.eval_expr(expression, &ctx)?.is_truthy() {
                            out.push(node.child_index(value, i));
                        }
                    }
                }
                _ => {}
            },
        }

        Ok(())
    }

    fn eval_expr<'v>(
        &self,
        expr: &FilterExpression,
        ctx: &EvalContext<'v>,
    ) -> Result<FilterValue<'v>, EvalError> {
        match expr {
            FilterExpression::Null => Ok(FilterValue::owned(Value::Null)),
            FilterExpression::Boolean(b) => Ok(FilterValue::owned(Value::Boolean(*b))),
            FilterExpression::Integer(n) => Ok(FilterValue::owned(Value::Integer(*n))),
            FilterExpression::Float(n) => Ok(FilterValue::owned(Value::Float(*n))),
            FilterExpression::String(s) => Ok(FilterValue::owned(Value::String(s.clone()))),
            FilterExpression::Not(expr) => {
                let value = self.eval_expr(expr, ctx)?;
                Ok(FilterValue::owned(Value::Boolean(!value.is_truthy())))
            }
            FilterExpression::Infix { left, op, right } => {
                let left = self.eval_expr(left, ctx)?;
                let right = self.eval_expr(right, ctx)?;

                let result = match op {
                    BinOp::And => left.is_truthy() && right.is_truthy(),
                    BinOp::Or => left.is_truthy() || right.is_truthy(),
                    _ => compare(&left.unpack_singular(), *op, &right.unpack_singular()),
                };
                Ok(FilterValue::owned(Value::Boolean(result)))
            }
            FilterExpression::RelativeQuery(query) => {
                Ok(FilterValue::Nodes(self.resolve(query, ctx.current, ctx.root)?))
            }
            FilterExpression::RootQuery(query) => {
                Ok(FilterValue::Nodes(self.resolve(query, ctx.root, ctx.root)?))
            }
            FilterExpression::FunctionCall { name, args, token } => {
                self.eval_function_call(name, args, token, ctx)
            }
        }
    }

    fn eval_function_call<'v>(
        &self,
        name: &str,
        args: &[FilterExpression],
        token: &Token,
        ctx: &EvalContext<'v>,
    ) -> Result<FilterValue<'v>, EvalError> {
        let function = self.functions.get(name).ok_or_else(|| EvalError::Name {
            message: format!("undefined filter function '{}'", name),
            token: token.clone(),
        })?;

        let signature = self.signatures.get(name).ok_or_else(|| EvalError::Name {
            message: format!("missing types for filter function '{}'", name),
            token: token.clone(),
        })?;

        if args.len() != signature.arg_types.len() {
            return Err(EvalError::Type {
                message: format!(
                    "{}() takes {} argument(s) but {} were given",
                    name,
                    signature.arg_types.len(),
                    args.len()
                ),
                token: token.clone(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&signature.arg_types) {
            let value = match (self.eval_expr(arg, ctx)?, param) {
                (FilterValue::Nodes(nodes), ExpressionType::Value | ExpressionType::Logical) => {
                    match nodes.len() {
                        0 => FilterValue::Nothing,
                        1 => FilterValue::borrowed(nodes[0].value),
                        n => {
                            log::warn!(
                                "passing {} nodes to {}() for a {} parameter",
                                n,
                                name,
                                param
                            );
                            FilterValue::Nodes(nodes)
                        }
                    }
                }
                (value, _) => value,
            };
            values.push(value);
        }

        let result = function.call(values);

        if signature.result_type == ExpressionType::Nodes
            && !matches!(result, FilterValue::Nodes(_))
        {
            return Err(EvalError::Type {
                message: format!("{}() must return a node list", name),
                token: token.clone(),
            });
        }

        Ok(result)
    }
}

fn compare(left: &FilterValue<'_>, op: BinOp, right: &FilterValue<'_>) -> bool {
    match op {
        BinOp::Equal => equals(left, right),
        BinOp::NotEqual => !equals(left, right),
        BinOp::LessThan => less_than(left, right),
        BinOp::GreaterThan => less_than(right, left),
        BinOp::LessEqual => less_than(left, right) || equals(left, right),
        BinOp::GreaterEqual => less_than(right, left) || equals(left, right),
        BinOp::And | BinOp::Or => false,
    }
}

/// Equality of expression results.
///
/// An empty node list equals Nothing. A single-node list compares by the
/// node's value. Any other node list equals nothing but another empty list.
pub fn equals(left: &FilterValue<'_>, right: &FilterValue<'_>) -> bool {
    match (left, right) {
        (FilterValue::Nodes(a), FilterValue::Nodes(b)) => {
            (a.is_empty() && b.is_empty())
                || (a.len() == 1 && b.len() == 1 && a[0].value.json_eq(b[0].value))
        }
        (FilterValue::Nodes(nodes), other) | (other, FilterValue::Nodes(nodes)) => {
            match (nodes.len(), other) {
                (0, FilterValue::Nothing) => true,
                (1, FilterValue::Value(value)) => nodes[0].value.json_eq(value),
                _ => false,
            }
        }
        (FilterValue::Nothing, FilterValue::Nothing) => true,
        (FilterValue::Value(a), FilterValue::Value(b)) => a.json_eq(b),
        _ => false,
    }
}

/// Ordering of expression results, false unless both sides are strings or
/// both are numbers.
pub fn less_than(left: &FilterValue<'_>, right: &FilterValue<'_>) -> bool {
    match (left, right) {
        (FilterValue::Value(a), FilterValue::Value(b)) => a.json_lt(b),
        _ => false,
    }
}

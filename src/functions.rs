//! Function extensions callable from filter expressions.
//!
//! A function extension is anything implementing [`FilterFunction`]. Its
//! declared parameter and result types are checked by the parser (when a
//! signature table is supplied) and drive argument coercion during
//! evaluation.
//!
//! The five standard functions from RFC 9535 are provided here and
//! registered by [`crate::Environment::new`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use regex::Regex;

use crate::ast::{ExpressionType, FunctionSignature, FunctionSignatureMap};
use crate::node::NodeList;
use crate::value::Value;

/// Result of evaluating a filter expression, and the argument/return type of
/// function extensions.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue<'v> {
    /// Nodes produced by an embedded query or a `NodesType` function
    Nodes(NodeList<'v>),

    /// A JSON value, borrowed from the document or produced by a literal or
    /// a function
    Value(Cow<'v, Value>),

    /// The absence of a value, distinct from `null`
    Nothing,
}

impl<'v> FilterValue<'v> {
    /// Wrap an owned value.
    pub fn owned(value: Value) -> Self {
        FilterValue::Value(Cow::Owned(value))
    }

    /// Wrap a value borrowed from the document.
    pub fn borrowed(value: &'v Value) -> Self {
        FilterValue::Value(Cow::Borrowed(value))
    }

    /// Node lists are truthy when non-empty. Every other result is truthy
    /// unless it is the boolean `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FilterValue::Nodes(nodes) => !nodes.is_empty(),
            FilterValue::Value(value) => !matches!(value.as_ref(), Value::Boolean(false)),
            FilterValue::Nothing => true,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FilterValue::Value(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    /// Replace a single-node list by that node's value.
    pub fn unpack_singular(self) -> Self {
        match self {
            FilterValue::Nodes(nodes) if nodes.len() == 1 => {
                FilterValue::borrowed(nodes[0].value)
            }
            other => other,
        }
    }
}

/// A function extension.
pub trait FilterFunction: Send + Sync {
    /// Declared parameter types, one per argument.
    fn arg_types(&self) -> Vec<ExpressionType>;

    /// Declared result type.
    fn result_type(&self) -> ExpressionType;

    /// Call the function with already coerced arguments.
    ///
    /// Arguments for `NodesType` parameters arrive as node lists. Arguments
    /// for other parameters arrive as values, or `Nothing` when the
    /// argument expression selected no node.
    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v>;

    fn signature(&self) -> FunctionSignature {
        FunctionSignature::new(self.arg_types(), self.result_type())
    }
}

/// Function extensions by name.
pub type FunctionExtensionMap = HashMap<String, Arc<dyn FilterFunction>>;

/// The standard functions, keyed by name.
pub fn standard_functions() -> FunctionExtensionMap {
    let mut functions: FunctionExtensionMap = HashMap::new();
    functions.insert("length".to_string(), Arc::new(Length));
    functions.insert("count".to_string(), Arc::new(Count));
    functions.insert("match".to_string(), Arc::new(Match::default()));
    functions.insert("search".to_string(), Arc::new(Search::default()));
    functions.insert("value".to_string(), Arc::new(ValueOf));
    functions
}

/// Signatures of the standard functions, keyed by name.
pub fn standard_signatures() -> FunctionSignatureMap {
    signatures_of(&standard_functions())
}

/// Collect the declared signature of every function in `functions`.
pub fn signatures_of(functions: &FunctionExtensionMap) -> FunctionSignatureMap {
    functions
        .iter()
        .map(|(name, function)| (name.clone(), function.signature()))
        .collect()
}

/// `length(ValueType) -> ValueType`
///
/// Character count of a string, element count of an array, member count of
/// an object. Nothing for anything else.
pub struct Length;

impl FilterFunction for Length {
    fn arg_types(&self) -> Vec<ExpressionType> {
        vec![ExpressionType::Value]
    }

    fn result_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v> {
        let length = match args.first().and_then(FilterValue::as_value) {
            Some(Value::String(s)) => s.chars().count(),
            Some(Value::Array(arr)) => arr.len(),
            Some(Value::Object(obj)) => obj.len(),
            _ => return FilterValue::Nothing,
        };
        match i64::try_from(length) {
            Ok(n) => FilterValue::owned(Value::Integer(n)),
            Err(_) => FilterValue::Nothing,
        }
    }
}

/// `count(NodesType) -> ValueType`
pub struct Count;

impl FilterFunction for Count {
    fn arg_types(&self) -> Vec<ExpressionType> {
        vec![ExpressionType::Nodes]
    }

    fn result_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v> {
        match args.first() {
            Some(FilterValue::Nodes(nodes)) => match i64::try_from(nodes.len()) {
                Ok(n) => FilterValue::owned(Value::Integer(n)),
                Err(_) => FilterValue::Nothing,
            },
            _ => FilterValue::Nothing,
        }
    }
}

/// `value(NodesType) -> ValueType`
///
/// The value of the only node in a node list, Nothing for empty or
/// multi-node lists.
pub struct ValueOf;

impl FilterFunction for ValueOf {
    fn arg_types(&self) -> Vec<ExpressionType> {
        vec![ExpressionType::Nodes]
    }

    fn result_type(&self) -> ExpressionType {
        ExpressionType::Value
    }

    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v> {
        match args.into_iter().next() {
            Some(FilterValue::Nodes(nodes)) if nodes.len() == 1 => {
                FilterValue::borrowed(nodes[0].value)
            }
            _ => FilterValue::Nothing,
        }
    }
}

/// `match(ValueType, ValueType) -> LogicalType`
///
/// True when the whole of the first argument matches the I-Regexp pattern
/// in the second.
#[derive(Default)]
pub struct Match {
    cache: RegexCache,
}

impl FilterFunction for Match {
    fn arg_types(&self) -> Vec<ExpressionType> {
        vec![ExpressionType::Value, ExpressionType::Value]
    }

    fn result_type(&self) -> ExpressionType {
        ExpressionType::Logical
    }

    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v> {
        let matched = string_args(&args).is_some_and(|(subject, pattern)| {
            self.cache
                .get(&format!("^(?:{})$", translate_iregexp(pattern)))
                .is_some_and(|re| re.is_match(subject))
        });
        FilterValue::owned(Value::Boolean(matched))
    }
}

/// `search(ValueType, ValueType) -> LogicalType`
///
/// True when any substring of the first argument matches the I-Regexp
/// pattern in the second.
#[derive(Default)]
pub struct Search {
    cache: RegexCache,
}

impl FilterFunction for Search {
    fn arg_types(&self) -> Vec<ExpressionType> {
        vec![ExpressionType::Value, ExpressionType::Value]
    }

    fn result_type(&self) -> ExpressionType {
        ExpressionType::Logical
    }

    fn call<'v>(&self, args: Vec<FilterValue<'v>>) -> FilterValue<'v> {
        let found = string_args(&args).is_some_and(|(subject, pattern)| {
            self.cache
                .get(&translate_iregexp(pattern))
                .is_some_and(|re| re.is_match(subject))
        });
        FilterValue::owned(Value::Boolean(found))
    }
}

fn string_args<'a>(args: &'a [FilterValue<'_>]) -> Option<(&'a str, &'a str)> {
    let subject = args.first()?.as_value()?.as_str()?;
    let pattern = args.get(1)?.as_value()?.as_str()?;
    Some((subject, pattern))
}

/// Rewrite an I-Regexp (RFC 9485) pattern into `regex` crate syntax.
///
/// Outside character classes, `.` matches any character except line feed
/// and carriage return, and `^` and `$` are plain characters rather than
/// anchors.
pub fn translate_iregexp(pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut escaped = false;
    let mut in_class = false;

    for ch in pattern.chars() {
        if escaped {
            result.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                result.push(ch);
                escaped = true;
            }
            '[' => {
                in_class = true;
                result.push(ch);
            }
            ']' => {
                in_class = false;
                result.push(ch);
            }
            '.' if !in_class => result.push_str("[^\\n\\r]"),
            '^' | '$' if !in_class => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }
    result
}

const REGEX_CACHE_CAPACITY: usize = 128;

/// Compiled patterns, including patterns that failed to compile.
#[derive(Default)]
struct RegexCache {
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl RegexCache {
    fn get(&self, pattern: &str) -> Option<Regex> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still usable.
        let mut compiled = self
            .compiled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = compiled.get(pattern) {
            return entry.clone();
        }

        let regex = match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::debug!("invalid regular expression {:?}: {}", pattern, e);
                None
            }
        };

        if compiled.len() >= REGEX_CACHE_CAPACITY {
            compiled.clear();
        }
        compiled.insert(pattern.to_string(), regex.clone());
        regex
    }
}

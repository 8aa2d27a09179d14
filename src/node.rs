//! Nodes produced by query evaluation and their locations.

use std::fmt;

use crate::output::quote;
use crate::value::Value;

/// One step in a node's location: an object member name or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    Name(String),
    Index(usize),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Name(name) => write!(f, "[{}]", quote(name)),
            PathElement::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Path from the query root to a node, root first.
pub type Location = Vec<PathElement>;

/// A value in a document together with where it was found.
///
/// Nodes borrow from the queried document and cannot outlive it.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPathNode<'v> {
    pub value: &'v Value,
    pub location: Location,
}

/// Nodes in the order a query produced them.
pub type NodeList<'v> = Vec<JsonPathNode<'v>>;

impl<'v> JsonPathNode<'v> {
    pub fn new(value: &'v Value, location: Location) -> Self {
        JsonPathNode { value, location }
    }

    /// A node for the member `name` of this node.
    pub fn child_name(&self, value: &'v Value, name: &str) -> Self {
        let mut location = self.location.clone();
        location.push(PathElement::Name(name.to_string()));
        JsonPathNode { value, location }
    }

    /// A node for the element at `index` of this node.
    pub fn child_index(&self, value: &'v Value, index: usize) -> Self {
        let mut location = self.location.clone();
        location.push(PathElement::Index(index));
        JsonPathNode { value, location }
    }

    /// Canonical path to this node, like `$['a'][0]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jpq::{JsonPathNode, PathElement, Value};
    ///
    /// let value = Value::Integer(1);
    /// let node = JsonPathNode::new(
    ///     &value,
    ///     vec![PathElement::Name("a".into()), PathElement::Index(0)],
    /// );
    /// assert_eq!(node.path(), "$['a'][0]");
    /// ```
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for element in &self.location {
            path.push_str(&element.to_string());
        }
        path
    }
}

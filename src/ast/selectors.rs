use std::fmt;

use crate::ast::{FilterExpression, Token};
use crate::output::quote;

/// One matching rule within a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Object member by name
    ///
    /// # Examples
    /// ```text
    /// $.name
    /// $['name']
    /// ```
    Name { name: String },

    /// Array element by index, negative indices count from the end
    ///
    /// # Example
    /// ```text
    /// $[-1]
    /// ```
    Index { index: i64, token: Token },

    /// Every member or element (`*`)
    Wildcard,

    /// Array slice, `start:stop:step` with every part optional
    ///
    /// Missing parts stay `None` here. Their defaults depend on the sign of
    /// the step and on the array length, so they are resolved at evaluation
    /// time.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
        token: Token,
    },

    /// Filter (`?expr`)
    Filter { expression: FilterExpression },
}

impl Selector {
    /// Name and index selectors select at most one node.
    pub fn is_singular(&self) -> bool {
        matches!(self, Selector::Name { .. } | Selector::Index { .. })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name { name } => f.write_str(&quote(name)),
            Selector::Index { index, .. } => write!(f, "{}", index),
            Selector::Wildcard => f.write_str("*"),
            Selector::Slice {
                start, stop, step, ..
            } => {
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                f.write_str(":")?;
                if let Some(stop) = stop {
                    write!(f, "{}", stop)?;
                }
                if let Some(step) = step {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
            Selector::Filter { expression } => write!(f, "?{}", expression),
        }
    }
}

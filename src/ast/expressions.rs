use std::fmt;

use crate::ast::{BinOp, Query, Token};
use crate::output::{format_float, quote};

/// Filter expression node.
///
/// Built by the parser for each `?` selector and evaluated once per
/// candidate node.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    // Literals
    /// `null`
    Null,

    /// `true` or `false`
    Boolean(bool),

    /// Literal integer
    Integer(i64),

    /// Literal floating point number
    Float(f64),

    /// String literal, single or double quoted in the source
    String(String),

    // Operations
    /// Logical negation
    ///
    /// # Example
    /// ```text
    /// !@.archived
    /// ```
    Not(Box<FilterExpression>),

    /// Logical or comparison operation
    ///
    /// # Examples
    /// ```text
    /// @.price < 10
    /// @.a && @.b
    /// ```
    Infix {
        left: Box<FilterExpression>,
        op: BinOp,
        right: Box<FilterExpression>,
    },

    // Embedded queries
    /// Query relative to the node being filtered (`@`)
    RelativeQuery(Query),

    /// Query from the document root (`$`)
    RootQuery(Query),

    /// Function extension call
    ///
    /// # Example
    /// ```text
    /// length(@.tags) > 2
    /// ```
    FunctionCall {
        name: String,
        args: Vec<FilterExpression>,
        token: Token,
    },
}

impl FilterExpression {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            FilterExpression::Null
                | FilterExpression::Boolean(_)
                | FilterExpression::Integer(_)
                | FilterExpression::Float(_)
                | FilterExpression::String(_)
        )
    }

    /// The embedded query, if this is a relative or root query.
    pub fn as_query(&self) -> Option<&Query> {
        match self {
            FilterExpression::RelativeQuery(query) | FilterExpression::RootQuery(query) => {
                Some(query)
            }
            _ => None,
        }
    }

    /// Is this a `!`, logical or comparison expression?
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            FilterExpression::Not(_) | FilterExpression::Infix { .. }
        )
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Null => f.write_str("null"),
            FilterExpression::Boolean(b) => write!(f, "{}", b),
            FilterExpression::Integer(n) => write!(f, "{}", n),
            FilterExpression::Float(n) => f.write_str(&format_float(*n)),
            FilterExpression::String(s) => f.write_str(&quote(s)),
            FilterExpression::Not(expr) => match expr.as_ref() {
                FilterExpression::Infix { op, .. } if op.is_comparison() => {
                    write!(f, "!({})", expr)
                }
                _ => write!(f, "!{}", expr),
            },
            FilterExpression::Infix { left, op, right } => {
                if op.is_logical() {
                    write!(f, "({} {} {})", left, op, right)
                } else {
                    write!(f, "{} {} {}", left, op, right)
                }
            }
            FilterExpression::RelativeQuery(query) => query.fmt_with("@", f),
            FilterExpression::RootQuery(query) => query.fmt_with("$", f),
            FilterExpression::FunctionCall { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

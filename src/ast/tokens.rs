use std::fmt;
use std::sync::Arc;

/// Kinds of lexical token in a JSONPath query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifiers
    /// Root node identifier (`$`)
    Root,

    /// Current node identifier (`@`), only meaningful inside filters
    Current,

    // Segment punctuation
    /// Shorthand child segment (`.`)
    Dot,

    /// Descendant segment (`..`)
    DoubleDot,

    /// Start of a bracketed selection
    LBracket,

    /// End of a bracketed selection
    RBracket,

    /// Wildcard selector (`*`)
    Wild,

    /// Filter selector (`?`)
    Filter,

    /// Selector separator
    Comma,

    /// Slice separator
    Colon,

    // Filter expression punctuation
    /// Grouping or function call start
    LParen,

    /// Grouping or function call end
    RParen,

    // Literals
    /// Member name used by the shorthand notations, e.g. `$.name`
    Name,

    /// String literal in single quotes. The token value is unescaped.
    SingleQuoteString,

    /// String literal in double quotes. The token value is unescaped.
    DoubleQuoteString,

    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1
    /// ```
    Int,

    /// Floating point literal, anything with a fraction or an exponent
    ///
    /// # Examples
    /// ```text
    /// 1.5
    /// 1e3
    /// -0.25E-2
    /// ```
    Float,

    /// `true`
    True,

    /// `false`
    False,

    /// `null`
    Null,

    /// Function extension name, always immediately followed by `(`
    Function,

    // Comparison
    /// Equality operator (`==`)
    Eq,

    /// Inequality operator (`!=`)
    Ne,

    /// Less than (`<`)
    Lt,

    /// Less than or equal (`<=`)
    Le,

    /// Greater than (`>`)
    Gt,

    /// Greater than or equal (`>=`)
    Ge,

    // Logical
    /// Logical AND (`&&`)
    And,

    /// Logical OR (`||`)
    Or,

    /// Logical NOT (`!`)
    Not,

    /// End of query
    Eof,
}

/// A single token produced by the lexer.
///
/// Tokens keep a shared handle to the query they came from so that errors
/// raised long after lexing (during evaluation, for example) can still point
/// at the offending part of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What sort of token this is
    pub kind: TokenKind,

    /// Lexeme, or the decoded value for string literals
    pub value: String,

    /// Character offset of the token in `query`
    pub index: usize,

    /// The complete query text
    pub query: Arc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, index: usize, query: Arc<str>) -> Self {
        Token {
            kind,
            value: value.into(),
            index,
            query,
        }
    }

    /// Is this token of the given kind?
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of query at offset {}", self.index),
            _ => write!(f, "'{}' at offset {}", self.value, self.index),
        }
    }
}

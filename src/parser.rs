use thiserror::Error;

use crate::{
    ast::{
        BinOp, ExpressionType, FilterExpression, FunctionSignatureMap, Query, Segment, Selector,
        Token, TokenKind,
    },
    lexer::{LexError, tokenize},
};

/// Largest magnitude allowed for indices and slice bounds (I-JSON safe
/// integers).
const MAX_INDEX: i64 = (1 << 53) - 1;

// Binding powers for filter expression operators.
const PRECEDENCE_LOWEST: u8 = 1;
const PRECEDENCE_LOGICAL_OR: u8 = 3;
const PRECEDENCE_LOGICAL_AND: u8 = 4;
const PRECEDENCE_RELATIONAL: u8 = 5;
const PRECEDENCE_PREFIX: u8 = 7;

/// Errors that can occur while parsing a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Malformed token
    #[error("lexer error: {0}")]
    Lex(#[from] LexError),

    /// Tokens that do not form a valid query
    #[error("syntax error: {message}, found {token}")]
    Syntax { message: String, token: Token },

    /// Call to a function with no known signature
    #[error("name error: {message}, found {token}")]
    Name { message: String, token: Token },

    /// Function call violating its signature, or a function result used
    /// where its type is not allowed
    #[error("type error: {message}, found {token}")]
    Type { message: String, token: Token },
}

impl ParseError {
    fn syntax(message: impl Into<String>, token: &Token) -> Self {
        ParseError::Syntax {
            message: message.into(),
            token: token.clone(),
        }
    }

    fn name(message: impl Into<String>, token: &Token) -> Self {
        ParseError::Name {
            message: message.into(),
            token: token.clone(),
        }
    }

    fn type_error(message: impl Into<String>, token: &Token) -> Self {
        ParseError::Type {
            message: message.into(),
            token: token.clone(),
        }
    }

    /// The token the error was raised at, if it was raised by the parser.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::Syntax { token, .. }
            | ParseError::Name { token, .. }
            | ParseError::Type { token, .. } => Some(token),
        }
    }
}

/// Parse a query without checking function extension calls.
///
/// # Examples
///
/// ```
/// let query = jpq::parse("$.store.book[0].title").unwrap();
/// assert_eq!(query.to_string(), "$['store']['book'][0]['title']");
/// ```
pub fn parse(query: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(query)?;
    Parser::new(tokens).parse_query()
}

/// Parse a query, checking every function call against `signatures`.
pub fn parse_with_signatures(
    query: &str,
    signatures: &FunctionSignatureMap,
) -> Result<Query, ParseError> {
    let tokens = tokenize(query)?;
    Parser::new(tokens).with_signatures(signatures).parse_query()
}

/// Recursive descent JSONPath parser.
///
/// Segments and selectors are parsed by plain recursive descent. Filter
/// expressions use precedence climbing.
pub struct Parser<'s> {
    tokens: Vec<Token>,
    position: usize,
    signatures: Option<&'s FunctionSignatureMap>,
}

impl<'s> Parser<'s> {
    /// Create a parser over a token stream ending in `Eof`.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let (index, query) = match tokens.last() {
                Some(last) => (last.index + last.value.chars().count(), last.query.clone()),
                None => (0, "".into()),
            };
            tokens.push(Token::new(TokenKind::Eof, "", index, query));
        }
        Parser {
            tokens,
            position: 0,
            signatures: None,
        }
    }

    /// Validate function calls against these signatures.
    pub fn with_signatures(mut self, signatures: &'s FunctionSignatureMap) -> Self {
        self.signatures = Some(signatures);
        self
    }

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[(self.position + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::syntax(message, self.current()))
        }
    }

    /// Parse a complete query
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let first = self.current().clone();
        let text = first.query.clone();

        if text.starts_with(|c: char| c.is_whitespace()) {
            return Err(ParseError::syntax("unexpected leading whitespace", &first));
        }

        if !first.is(TokenKind::Root) {
            return Err(ParseError::syntax("expected '$'", &first));
        }
        self.advance();

        let segments = self.parse_segments()?;

        if !self.check(TokenKind::Eof) {
            return Err(ParseError::syntax("expected a segment", self.current()));
        }

        if text.ends_with(|c: char| c.is_whitespace()) {
            return Err(ParseError::syntax("unexpected trailing whitespace", self.current()));
        }

        let query = Query::new(segments);
        log::trace!("parsed {:?} as {}", text, query);
        Ok(query)
    }

    fn parse_segments(&mut self) -> Result<Vec<Segment>, ParseError> {
        let mut segments = vec![];

        loop {
            let segment = match self.current().kind {
                TokenKind::Dot => {
                    let dot = self.advance();
                    let selector = self.parse_shorthand_selector(&dot, 1)?;
                    Segment::Child {
                        selectors: vec![selector],
                    }
                }
                TokenKind::DoubleDot => {
                    let dots = self.advance();
                    let selectors = if self.check(TokenKind::LBracket) {
                        if self.current().index != dots.index + 2 {
                            return Err(ParseError::syntax(
                                "unexpected whitespace after '..'",
                                self.current(),
                            ));
                        }
                        self.parse_bracketed_selection()?
                    } else {
                        vec![self.parse_shorthand_selector(&dots, 2)?]
                    };
                    Segment::Descendant { selectors }
                }
                TokenKind::LBracket => Segment::Child {
                    selectors: self.parse_bracketed_selection()?,
                },
                _ => break,
            };
            segments.push(segment);
        }

        Ok(segments)
    }

    /// Parse the name or `*` following `.` or `..`.
    fn parse_shorthand_selector(&mut self, dots: &Token, width: usize) -> Result<Selector, ParseError> {
        let token = self.current().clone();

        if token.index != dots.index + width {
            return Err(ParseError::syntax(
                format!("unexpected whitespace after '{}'", dots.value),
                &token,
            ));
        }

        match token.kind {
            TokenKind::Name | TokenKind::True | TokenKind::False | TokenKind::Null => {
                self.advance();
                Ok(Selector::Name { name: token.value })
            }
            TokenKind::Wild => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            _ => Err(ParseError::syntax(
                format!("expected a name or '*' after '{}'", dots.value),
                &token,
            )),
        }
    }

    fn parse_bracketed_selection(&mut self) -> Result<Vec<Selector>, ParseError> {
        self.expect(TokenKind::LBracket, "expected '['")?;
        let mut selectors = vec![];

        loop {
            let token = self.current().clone();
            let selector = match token.kind {
                TokenKind::SingleQuoteString | TokenKind::DoubleQuoteString => {
                    self.advance();
                    Selector::Name { name: token.value }
                }
                TokenKind::Wild => {
                    self.advance();
                    Selector::Wildcard
                }
                TokenKind::Filter => self.parse_filter_selector()?,
                TokenKind::Int | TokenKind::Colon => {
                    if token.is(TokenKind::Int) && !self.peek().is(TokenKind::Colon) {
                        self.advance();
                        Selector::Index {
                            index: self.parse_index(&token)?,
                            token,
                        }
                    } else {
                        self.parse_slice_selector()?
                    }
                }
                TokenKind::RBracket if selectors.is_empty() => {
                    return Err(ParseError::syntax("empty bracketed segment", &token));
                }
                _ => {
                    return Err(ParseError::syntax(
                        "unexpected token in bracketed selection",
                        &token,
                    ));
                }
            };
            selectors.push(selector);

            match self.current().kind {
                TokenKind::RBracket => {
                    self.advance();
                    return Ok(selectors);
                }
                TokenKind::Comma => {
                    self.advance();
                    if self.check(TokenKind::RBracket) {
                        return Err(ParseError::syntax("unexpected trailing comma", self.current()));
                    }
                }
                _ => {
                    return Err(ParseError::syntax("expected ',' or ']'", self.current()));
                }
            }
        }
    }

    /// Validate an integer token used as an index or slice bound.
    fn parse_index(&self, token: &Token) -> Result<i64, ParseError> {
        if token.value == "-0" {
            return Err(ParseError::syntax("negative zero is not a valid index", token));
        }
        match token.value.parse::<i64>() {
            Ok(n) if (-MAX_INDEX..=MAX_INDEX).contains(&n) => Ok(n),
            _ => Err(ParseError::syntax("index out of range", token)),
        }
    }

    fn parse_optional_index(&mut self) -> Result<Option<i64>, ParseError> {
        if self.check(TokenKind::Int) {
            let token = self.advance();
            Ok(Some(self.parse_index(&token)?))
        } else {
            Ok(None)
        }
    }

    fn parse_slice_selector(&mut self) -> Result<Selector, ParseError> {
        let token = self.current().clone();
        let start = self.parse_optional_index()?;
        self.expect(TokenKind::Colon, "expected ':'")?;
        let stop = self.parse_optional_index()?;

        let step = if self.check(TokenKind::Colon) {
            self.advance();
            self.parse_optional_index()?
        } else {
            None
        };

        Ok(Selector::Slice {
            start,
            stop,
            step,
            token,
        })
    }

    fn parse_filter_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect(TokenKind::Filter, "expected '?'")?;
        let token = self.current().clone();
        let expression = self.parse_filter_expression(PRECEDENCE_LOWEST)?;
        self.check_test_expression(&expression, &token)?;
        Ok(Selector::Filter { expression })
    }

    fn binary_operator(kind: TokenKind) -> Option<(BinOp, u8)> {
        let op = match kind {
            TokenKind::And => (BinOp::And, PRECEDENCE_LOGICAL_AND),
            TokenKind::Or => (BinOp::Or, PRECEDENCE_LOGICAL_OR),
            TokenKind::Eq => (BinOp::Equal, PRECEDENCE_RELATIONAL),
            TokenKind::Ne => (BinOp::NotEqual, PRECEDENCE_RELATIONAL),
            TokenKind::Lt => (BinOp::LessThan, PRECEDENCE_RELATIONAL),
            TokenKind::Le => (BinOp::LessEqual, PRECEDENCE_RELATIONAL),
            TokenKind::Gt => (BinOp::GreaterThan, PRECEDENCE_RELATIONAL),
            TokenKind::Ge => (BinOp::GreaterEqual, PRECEDENCE_RELATIONAL),
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over binary operators, all left associative.
    fn parse_filter_expression(&mut self, precedence: u8) -> Result<FilterExpression, ParseError> {
        let left_token = self.current().clone();
        let mut left = self.parse_basic_expression()?;
        let mut left_grouped = left_token.is(TokenKind::LParen);

        while let Some((op, op_precedence)) = Self::binary_operator(self.current().kind) {
            if op_precedence <= precedence {
                break;
            }

            let op_token = self.advance();
            let right_token = self.current().clone();
            let right = self.parse_filter_expression(op_precedence)?;

            if op.is_comparison() {
                // A parenthesised operand is a logical expression, whatever it wraps.
                if left_grouped || right_token.is(TokenKind::LParen) {
                    let token = if left_grouped { &left_token } else { &right_token };
                    return Err(ParseError::syntax(
                        "parenthesised expressions are not comparable",
                        token,
                    ));
                }
                self.check_comparable(&left, &left_token)?;
                self.check_comparable(&right, &right_token)?;
            } else {
                self.check_test_expression(&left, &left_token)?;
                self.check_test_expression(&right, &right_token)?;
            }

            log::trace!("infix {} at offset {}", op, op_token.index);
            left_grouped = false;
            left = FilterExpression::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Literals, `!`, grouping, embedded queries and function calls.
    fn parse_basic_expression(&mut self) -> Result<FilterExpression, ParseError> {
        let token = self.current().clone();

        let expr = match token.kind {
            TokenKind::Null => {
                self.advance();
                FilterExpression::Null
            }
            TokenKind::True => {
                self.advance();
                FilterExpression::Boolean(true)
            }
            TokenKind::False => {
                self.advance();
                FilterExpression::Boolean(false)
            }
            TokenKind::Int => {
                self.advance();
                let n = token
                    .value
                    .parse::<i64>()
                    .map_err(|_| ParseError::syntax("invalid integer literal", &token))?;
                FilterExpression::Integer(n)
            }
            TokenKind::Float => {
                self.advance();
                let n = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| ParseError::syntax("invalid float literal", &token))?;
                FilterExpression::Float(n)
            }
            TokenKind::SingleQuoteString | TokenKind::DoubleQuoteString => {
                self.advance();
                FilterExpression::String(token.value)
            }
            TokenKind::Not => {
                self.advance();
                let operand_token = self.current().clone();
                let operand = self.parse_filter_expression(PRECEDENCE_PREFIX)?;
                self.check_test_expression(&operand, &operand_token)?;
                FilterExpression::Not(Box::new(operand))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_filter_expression(PRECEDENCE_LOWEST)?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                expr
            }
            TokenKind::Current => {
                self.advance();
                FilterExpression::RelativeQuery(Query::new(self.parse_segments()?))
            }
            TokenKind::Root => {
                self.advance();
                FilterExpression::RootQuery(Query::new(self.parse_segments()?))
            }
            TokenKind::Function => self.parse_function_call()?,
            TokenKind::Name => {
                return Err(ParseError::syntax(
                    "unexpected name, member names must follow '@' or '$'",
                    &token,
                ));
            }
            _ => {
                return Err(ParseError::syntax(
                    "unexpected token in filter expression",
                    &token,
                ));
            }
        };

        Ok(expr)
    }

    fn parse_function_call(&mut self) -> Result<FilterExpression, ParseError> {
        let token = self.expect(TokenKind::Function, "expected a function name")?;
        self.expect(TokenKind::LParen, "expected '('")?;

        let mut args = vec![];
        let mut arg_tokens = vec![];

        if !self.check(TokenKind::RParen) {
            loop {
                arg_tokens.push(self.current().clone());
                args.push(self.parse_filter_expression(PRECEDENCE_LOWEST)?);

                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "expected ',' or ')'")?;
        self.check_function_call(&token, &args, &arg_tokens)?;

        Ok(FilterExpression::FunctionCall {
            name: token.value.clone(),
            args,
            token,
        })
    }

    /// Declared result type of a function call, when signatures are known.
    fn result_type(&self, expr: &FilterExpression) -> Option<ExpressionType> {
        match expr {
            FilterExpression::FunctionCall { name, .. } => self
                .signatures
                .and_then(|signatures| signatures.get(name))
                .map(|signature| signature.result_type),
            _ => None,
        }
    }

    fn check_function_call(
        &self,
        token: &Token,
        args: &[FilterExpression],
        arg_tokens: &[Token],
    ) -> Result<(), ParseError> {
        let Some(signatures) = self.signatures else {
            return Ok(());
        };

        let name = &token.value;
        let signature = signatures
            .get(name)
            .ok_or_else(|| ParseError::name(format!("unknown function `{}`", name), token))?;

        if args.len() != signature.arg_types.len() {
            return Err(ParseError::type_error(
                format!(
                    "{}() takes {} argument{} but {} were given",
                    name,
                    signature.arg_types.len(),
                    if signature.arg_types.len() == 1 { "" } else { "s" },
                    args.len()
                ),
                token,
            ));
        }

        for (i, ((arg, arg_token), param)) in args
            .iter()
            .zip(arg_tokens)
            .zip(&signature.arg_types)
            .enumerate()
        {
            let non_singular = arg.as_query().is_some_and(|q| !q.is_singular());
            let result = self.result_type(arg);

            let valid = match param {
                ExpressionType::Nodes => true,
                ExpressionType::Value => {
                    !non_singular
                        && !arg.is_logical()
                        && !matches!(
                            result,
                            Some(ExpressionType::Nodes | ExpressionType::Logical)
                        )
                }
                ExpressionType::Logical => {
                    !non_singular
                        && !arg.is_literal()
                        && !matches!(result, Some(ExpressionType::Nodes | ExpressionType::Value))
                }
            };

            if !valid {
                return Err(ParseError::type_error(
                    format!("{}() argument {} must be of {}", name, i + 1, param),
                    arg_token,
                ));
            }
        }

        Ok(())
    }

    /// Operands of comparison operators.
    fn check_comparable(&self, expr: &FilterExpression, token: &Token) -> Result<(), ParseError> {
        match expr {
            FilterExpression::RelativeQuery(query) | FilterExpression::RootQuery(query)
                if !query.is_singular() =>
            {
                Err(ParseError::syntax("non-singular query is not comparable", token))
            }
            FilterExpression::Not(_) | FilterExpression::Infix { .. } => Err(ParseError::syntax(
                "logical expressions are not comparable",
                token,
            )),
            FilterExpression::FunctionCall { name, .. } => match self.result_type(expr) {
                Some(ExpressionType::Logical | ExpressionType::Nodes) => Err(
                    ParseError::type_error(format!("result of {}() is not comparable", name), token),
                ),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Filter selector bodies and operands of `&&`, `||` and `!`.
    fn check_test_expression(&self, expr: &FilterExpression, token: &Token) -> Result<(), ParseError> {
        if expr.is_literal() {
            return Err(ParseError::syntax("filter expression literals must be compared", token));
        }
        match expr {
            FilterExpression::FunctionCall { name, .. }
                if self.result_type(expr) == Some(ExpressionType::Value) =>
            {
                Err(ParseError::type_error(
                    format!("result of {}() must be compared", name),
                    token,
                ))
            }
            _ => Ok(()),
        }
    }
}

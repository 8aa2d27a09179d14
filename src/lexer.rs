use std::sync::Arc;

use thiserror::Error;

use crate::ast::{Token, TokenKind};

/// The first malformed construct found in a query.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (offset {offset})")]
pub struct LexError {
    pub message: String,
    /// Character offset of the malformed construct
    pub offset: usize,
}

impl LexError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        LexError {
            message: message.into(),
            offset,
        }
    }
}

/// Tokenize a complete query, ending with an `Eof` token.
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(query).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    source: Arc<str>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            source: Arc::from(input),
            position: 0,
        }
    }

    /// Read every remaining token, including the trailing `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn token(&self, kind: TokenKind, value: impl Into<String>, index: usize) -> Token {
        Token::new(kind, value, index, Arc::clone(&self.source))
    }

    /// Emit a fixed-width punctuation token starting at the current position.
    fn punct(&mut self, kind: TokenKind, width: usize) -> Token {
        let start = self.position;
        let lexeme: String = self.input[start..start + width].iter().collect();
        self.position += width;
        self.token(kind, lexeme, start)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_name_first(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
    }

    fn is_name_char(ch: char) -> bool {
        Self::is_name_first(ch) || ch.is_ascii_digit()
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_name_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_hex4(&mut self, escape_start: usize) -> Result<u32, LexError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| LexError::new("invalid \\u escape", escape_start))?;
            code = code * 16 + digit;
            self.advance();
        }
        Ok(code)
    }

    /// Decode `\uXXXX`, with the backslash and `u` already consumed.
    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char, LexError> {
        let code = self.read_hex4(escape_start)?;

        match code {
            0xD800..=0xDBFF => {
                if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                    return Err(LexError::new("unpaired high surrogate", escape_start));
                }
                self.advance();
                self.advance();
                let low = self.read_hex4(escape_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(LexError::new("invalid low surrogate", escape_start));
                }
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                char::from_u32(combined)
                    .ok_or_else(|| LexError::new("invalid \\u escape", escape_start))
            }
            0xDC00..=0xDFFF => Err(LexError::new("unpaired low surrogate", escape_start)),
            _ => char::from_u32(code)
                .ok_or_else(|| LexError::new("invalid \\u escape", escape_start)),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let kind = if quote == '\'' {
            TokenKind::SingleQuoteString
        } else {
            TokenKind::DoubleQuoteString
        };
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(self.token(kind, result, start));
                }
                '\\' => {
                    let escape_start = self.position;
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('b') => result.push('\u{08}'),
                        Some('f') => result.push('\u{0c}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('/') => result.push('/'),
                        Some('\\') => result.push('\\'),
                        Some(c) if c == quote => result.push(c),
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape(escape_start)?);
                            continue;
                        }
                        Some(c) => {
                            return Err(LexError::new(
                                format!("invalid escape sequence '\\{}'", c),
                                escape_start,
                            ));
                        }
                        None => {
                            return Err(LexError::new("unclosed string literal", start));
                        }
                    }
                    self.advance();
                }
                c if (c as u32) < 0x20 => {
                    return Err(LexError::new(
                        "invalid control character in string literal",
                        self.position,
                    ));
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new("unclosed string literal", start))
    }

    fn read_digits(&mut self, number: &mut String) -> usize {
        let mut count = 0;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::new("expected a digit after '-'", start));
            }
        }

        let int_start = self.position;
        self.read_digits(&mut number);
        if self.input[int_start] == '0' && self.position - int_start > 1 {
            return Err(LexError::new("leading zeros are not allowed", start));
        }

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            is_float = true;
            number.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                number.push(sign);
                self.advance();
            }
            if self.read_digits(&mut number) == 0 {
                return Err(LexError::new("expected digits in exponent", start));
            }
        }

        if is_float {
            if !number.parse::<f64>().is_ok_and(f64::is_finite) {
                return Err(LexError::new(
                    format!("number '{}' is out of range", number),
                    start,
                ));
            }
            Ok(self.token(TokenKind::Float, number, start))
        } else {
            if number.parse::<i64>().is_err() {
                return Err(LexError::new(
                    format!("integer '{}' is out of range", number),
                    start,
                ));
            }
            Ok(self.token(TokenKind::Int, number, start))
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => self.token(TokenKind::Eof, "", self.position),
            Some('$') => self.punct(TokenKind::Root, 1),
            Some('@') => self.punct(TokenKind::Current, 1),
            Some('.') => {
                if self.peek_char(1) == Some('.') {
                    self.punct(TokenKind::DoubleDot, 2)
                } else {
                    self.punct(TokenKind::Dot, 1)
                }
            }
            Some('[') => self.punct(TokenKind::LBracket, 1),
            Some(']') => self.punct(TokenKind::RBracket, 1),
            Some('(') => self.punct(TokenKind::LParen, 1),
            Some(')') => self.punct(TokenKind::RParen, 1),
            Some(',') => self.punct(TokenKind::Comma, 1),
            Some(':') => self.punct(TokenKind::Colon, 1),
            Some('*') => self.punct(TokenKind::Wild, 1),
            Some('?') => self.punct(TokenKind::Filter, 1),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.punct(TokenKind::Eq, 2)
                } else {
                    return Err(LexError::new(
                        "unexpected '=' (did you mean '=='?)",
                        self.position,
                    ));
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.punct(TokenKind::Ne, 2)
                } else {
                    self.punct(TokenKind::Not, 1)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.punct(TokenKind::Le, 2)
                } else {
                    self.punct(TokenKind::Lt, 1)
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.punct(TokenKind::Ge, 2)
                } else {
                    self.punct(TokenKind::Gt, 1)
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.punct(TokenKind::And, 2)
                } else {
                    return Err(LexError::new(
                        "unexpected '&' (did you mean '&&'?)",
                        self.position,
                    ));
                }
            }
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.punct(TokenKind::Or, 2)
                } else {
                    return Err(LexError::new(
                        "unexpected '|' (did you mean '||'?)",
                        self.position,
                    ));
                }
            }
            Some(quote @ ('"' | '\'')) => self.read_string(quote)?,
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.read_number()?,
            Some(ch) if Self::is_name_first(ch) => {
                let start = self.position;
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => self.token(TokenKind::True, ident, start),
                    "false" => self.token(TokenKind::False, ident, start),
                    "null" => self.token(TokenKind::Null, ident, start),
                    _ if self.current_char() == Some('(') => {
                        self.token(TokenKind::Function, ident, start)
                    }
                    _ => self.token(TokenKind::Name, ident, start),
                }
            }
            Some(ch) => {
                return Err(LexError::new(
                    format!("unexpected character '{}'", ch.escape_debug()),
                    self.position,
                ));
            }
        };

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(query: &str) -> Vec<TokenKind> {
        tokenize(query).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("true false null"),
            vec![TokenKind::True, TokenKind::False, TokenKind::Null, TokenKind::Eof]
        );
    }

    #[test]
    fn test_filter_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("$[?@.x > 5]"),
            vec![Root, LBracket, Filter, Current, Dot, Name, Gt, Int, RBracket, Eof]
        );
    }

    #[test]
    fn test_function_name_requires_paren() {
        let tokens = tokenize("length(@)").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Function);
        let tokens = tokenize("length (@)").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Name);
    }
}

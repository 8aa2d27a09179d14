use thiserror::Error;

use crate::evaluator::EvalError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Any error from parsing or evaluating a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Parse(ParseError::Lex(e))
    }
}

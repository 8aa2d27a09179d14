//! CLI support for jpq
//!
//! Provides programmatic access to the `jpq` command so other tools can
//! embed it without going through a subprocess.

mod query;

pub use query::{QueryOptions, QueryOutput, execute_parse, execute_query};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Parser error
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}

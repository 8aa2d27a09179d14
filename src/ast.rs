//! # JSONPath - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) produced by the parser
//! and walked by the evaluator.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[query]** - Queries and their segments
//! - **[selectors]** - Name, index, wildcard, slice and filter selectors
//! - **[expressions]** - Filter expression nodes
//! - **[operators]** - Logical and comparison operators
//! - **[signature]** - Function extension type signatures
//!
//! ## Quick Start
//!
//! ```text
//! $.store.book[?@.price < 10].title
//! ```
//!
//! This query parses to four child segments: `store`, `book`, a filter, and
//! `title`.
//!
//! ## Core Concepts
//!
//! ### Segments
//!
//! A query is a root identifier followed by segments. Every segment maps
//! each node of the current node list to zero or more new nodes:
//!
//! - **Child** `.name`, `.*`, `[...]` - select from the node's children
//! - **Descendant** `..name`, `..*`, `..[...]` - select from the node and
//!   every node below it
//!
//! ### Selectors
//!
//! A bracketed segment holds one or more comma separated selectors, each
//! applied independently, results concatenated in selector order:
//!
//! ```text
//! $['a', 0, 1:3, *, ?@.x]
//! ```
//!
//! ### Canonical Form
//!
//! Every AST type implements `Display`, rendering canonical JSONPath syntax:
//!
//! ```text
//! $.a..b[?@.c]   =>   $['a']..['b'][?@['c']]
//! ```
pub mod expressions;
pub mod operators;
pub mod query;
pub mod selectors;
pub mod signature;
pub mod tokens;

pub use expressions::FilterExpression;
pub use operators::BinOp;
pub use query::{Query, Segment};
pub use selectors::Selector;
pub use signature::{ExpressionType, FunctionSignature, FunctionSignatureMap};
pub use tokens::{Token, TokenKind};

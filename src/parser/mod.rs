//! Restricted R expression parser
//!
//! This module transforms analyst-supplied expression text into an Abstract
//! Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens), including the string
//!   literal character blacklist
//! - [`parser`]: Parser struct, error types, root rule
//! - `expressions`: the operator precedence levels, subsets and calls
//! - [`ast`]: AST node definitions
//!
//! # Supported Grammar
//!
//! - Symbols, optionally `$`-chained: `A$B$C.D`
//! - Numbers (`1.0`, `5L`, `-0.4`) and single/double quoted strings
//! - Binary operators `+ - * / %in% : ^`
//! - Subsets with at most two slots: `A[]`, `A[i]`, `A[i, j]`, `A[, j]`
//! - Function calls with positional and named arguments
//! - Formulas `lhs ~ rhs` at the root or as a whole argument
//!
//! Anything else (assignment, `::`, braces, unary operators on non-numbers,
//! backticks) is unparseable by construction.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;

use ast::AstNode;
use parser::{ParseError, Parser};

/// Parse `text` as a single expression or formula.
pub fn parse(text: &str) -> Result<AstNode, ParseError> {
    tracing::debug!(len = text.len(), "parsing expression");
    let mut parser = Parser::new(text)?;
    parser.parse_root()
}

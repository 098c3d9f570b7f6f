//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the root parse entry point.
//!
//! # Parser Architecture
//!
//! - This module: Parser struct, error types, token helpers, root rule
//! - `expressions`: formula, operator levels, subsets, calls and primaries
//!
//! Parser methods are split across files using `impl Parser` blocks, so the
//! expression grammar can extend the Parser while sharing its token cursor.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Token sequence not reducible by the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Syntax error at line {}, column {}: expected {expected}, found {found}",
    .location.line,
    .location.column
)]
pub struct SyntaxError {
    pub expected: String,
    pub found: String,
    pub location: SourceLocation,
}

/// Parser error type: either the text could not be tokenized or the tokens
/// do not form a valid expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lexical(err) => err.location,
            ParseError::Syntax(err) => err.location,
        }
    }
}

/// Deepest nesting of groups, call arguments, subset indices and `^` operands
pub const MAX_NESTING_DEPTH: usize = 128;

/// Most binary operators and subsets a single expression may contain
pub const MAX_OPERATIONS: usize = 1024;

/// Recursive descent parser for restricted R expressions
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
    operations: usize,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        tracing::trace!(tokens = tokens.len(), "tokenized expression");
        Ok(Self::from_tokens(tokens))
    }

    /// Parse an already tokenized stream. End-of-input markers are only
    /// honoured in last position; one is supplied when missing.
    pub(crate) fn from_tokens(mut tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map(Token::location)
            .unwrap_or_else(|| SourceLocation::new(1, 1));
        tokens.retain(|token| !matches!(token, Token::Eof(_)));
        tokens.push(Token::Eof(end));
        Self {
            tokens,
            position: 0,
            depth: 0,
            operations: 0,
        }
    }

    /// Parse the whole input as a single expression or formula.
    pub fn parse_root(&mut self) -> Result<AstNode, ParseError> {
        let root = self.parse_formula()?;

        if !self.is_at_end() {
            return Err(self.unexpected("end of input").into());
        }

        Ok(root)
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.unexpected(&format!(
                "an expression nested at most {MAX_NESTING_DEPTH} levels deep"
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Count one operator or subset, failing past [`MAX_OPERATIONS`]
    pub(crate) fn count_operation(&mut self) -> Result<(), SyntaxError> {
        self.operations += 1;
        if self.operations > MAX_OPERATIONS {
            return Err(SyntaxError {
                expected: format!("at most {MAX_OPERATIONS} operators and subsets per expression"),
                found: self.previous().to_string(),
                location: self.previous_location(),
            });
        }
        Ok(())
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Error describing the current token as unexpected
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError {
            expected: expected.to_string(),
            found: self.peek().to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, expected: &str) -> Result<(), SyntaxError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &str) -> Result<String, SyntaxError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected(expected))
        }
    }
}

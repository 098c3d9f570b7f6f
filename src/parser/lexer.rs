//! Lexer (tokenizer) for restricted R expressions
//!
//! Converts raw expression text into a flat [`Token`] stream consumed by the
//! parser. The lexer is also the first line of defense against injection:
//! string literals may not contain anything that could form executable
//! syntax once the literal is handed to R, and any character outside the
//! permitted alphabet is rejected outright. There is no error recovery; the
//! first offending character ends tokenization.

use super::ast::{Quote, SourceLocation};
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals (raw text, kept verbatim for rendering)
    IntLiteral(String, SourceLocation),
    DoubleLiteral(String, SourceLocation),
    StringLiteral(String, Quote, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Operators
    Plus(SourceLocation),   // +
    Minus(SourceLocation),  // -
    Star(SourceLocation),   // *
    Slash(SourceLocation),  // /
    Caret(SourceLocation),  // ^
    Colon(SourceLocation),  // :
    In(SourceLocation),     // %in%
    Tilde(SourceLocation),  // ~
    Dollar(SourceLocation), // $
    Eq(SourceLocation),     // = (named arguments only)

    // Punctuation
    LParen(SourceLocation),   // (
    RParen(SourceLocation),   // )
    LBracket(SourceLocation), // [
    RBracket(SourceLocation), // ]
    Comma(SourceLocation),    // ,

    // End of input
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::DoubleLiteral(_, loc)
            | Token::StringLiteral(_, _, loc)
            | Token::Ident(_, loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Caret(loc)
            | Token::Colon(loc)
            | Token::In(loc)
            | Token::Tilde(loc)
            | Token::Dollar(loc)
            | Token::Eq(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// True when this token can close an operand, in which case a following
    /// `-` is subtraction rather than the sign of a number.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::IntLiteral(..)
                | Token::DoubleLiteral(..)
                | Token::StringLiteral(..)
                | Token::Ident(..)
                | Token::RParen(_)
                | Token::RBracket(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "integer literal {}", n),
            Token::DoubleLiteral(n, _) => write!(f, "number literal {}", n),
            Token::StringLiteral(s, q, _) => {
                write!(f, "string literal {q}{s}{q}", q = q.as_char())
            }
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Caret(_) => write!(f, "'^'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::In(_) => write!(f, "'%in%'"),
            Token::Tilde(_) => write!(f, "'~'"),
            Token::Dollar(_) => write!(f, "'$'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// What went wrong while tokenizing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    #[error("character {0:?} is not allowed inside a string literal")]
    ForbiddenInString(char),
    #[error("assignment arrow '<-' is not allowed inside a string literal")]
    AssignmentInString,
    #[error("quote {found:?} does not match the opening quote {open:?}")]
    MismatchedQuote { open: char, found: char },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexical error at line {}, column {}: {kind}", .location.line, .location.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

impl LexError {
    fn new(kind: LexErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Lexer for restricted R expressions
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given expression text.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            let signed_number_allowed = !tokens.last().is_some_and(Token::ends_operand);
            tokens.push(self.next_token(signed_number_allowed)?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self, signed_number_allowed: bool) -> Result<Token, LexError> {
        let loc = self.current_location();
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof(loc));
        };

        if let Some(quote) = Quote::from_char(ch) {
            return self.string_literal(quote);
        }

        match ch {
            // Numeric literals
            '0'..='9' => self.number_literal(),
            '.' if self.digit_at(1) => self.number_literal(),
            '-' if signed_number_allowed
                && (self.digit_at(1) || (self.peek_ahead(1) == Some('.') && self.digit_at(2))) =>
            {
                self.number_literal()
            }

            // Identifiers
            'a'..='z' | 'A'..='Z' | '.' => Ok(self.identifier()),

            // %in%
            '%' => self.percent_operator(),

            // Single-character operators and punctuation
            _ => {
                let token = match ch {
                    '+' => Token::Plus(loc),
                    '-' => Token::Minus(loc),
                    '*' => Token::Star(loc),
                    '/' => Token::Slash(loc),
                    '^' => Token::Caret(loc),
                    ':' => Token::Colon(loc),
                    '~' => Token::Tilde(loc),
                    '$' => Token::Dollar(loc),
                    '=' => Token::Eq(loc),
                    '(' => Token::LParen(loc),
                    ')' => Token::RParen(loc),
                    '[' => Token::LBracket(loc),
                    ']' => Token::RBracket(loc),
                    ',' => Token::Comma(loc),
                    _ => {
                        return Err(LexError::new(LexErrorKind::UnexpectedCharacter(ch), loc));
                    }
                };
                self.advance();
                Ok(token)
            }
        }
    }

    /// Parse a quoted string literal, enforcing the character blacklist
    fn string_literal(&mut self, quote: Quote) -> Result<Token, LexError> {
        let loc = self.current_location();
        let open = quote.as_char();
        self.advance(); // consume opening quote
        let mut text = String::new();

        loop {
            let here = self.current_location();
            let Some(ch) = self.peek() else {
                return Err(LexError::new(LexErrorKind::UnterminatedString, loc));
            };

            if ch == open {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(text, quote, loc));
            }

            let kind = match ch {
                '\'' | '"' => LexErrorKind::MismatchedQuote { open, found: ch },
                '<' if self.peek_ahead(1) == Some('-') => LexErrorKind::AssignmentInString,
                '(' | ')' | '/' | '\\' | '+' | '*' | '^' | '%' | '=' => {
                    LexErrorKind::ForbiddenInString(ch)
                }
                c if c.is_whitespace() => LexErrorKind::ForbiddenInString(c),
                _ => {
                    text.push(ch);
                    self.advance();
                    continue;
                }
            };
            return Err(LexError::new(kind, here));
        }
    }

    /// Parse numeric literal: `[-]digits[.digits][e[+-]digits][L]`
    fn number_literal(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let mut text = String::new();
        let mut integral = true;

        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        self.take_digits(&mut text);

        if self.peek() == Some('.') {
            integral = false;
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            integral = false;
            self.push_advance(&mut text);
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.push_advance(&mut text);
            }
            if !self.take_digits(&mut text) {
                return Err(LexError::new(LexErrorKind::MalformedNumber(text), loc));
            }
        }

        let is_integer = self.peek() == Some('L');
        if is_integer {
            self.push_advance(&mut text);
            if !integral {
                return Err(LexError::new(LexErrorKind::MalformedNumber(text), loc));
            }
        }

        // `1abc`, `1.2.3`, `5L_`
        if let Some(next) = self.peek() {
            if next.is_ascii_alphanumeric() || next == '.' || next == '_' {
                text.push(next);
                return Err(LexError::new(LexErrorKind::MalformedNumber(text), loc));
            }
        }

        if is_integer {
            Ok(Token::IntLiteral(text, loc))
        } else {
            Ok(Token::DoubleLiteral(text, loc))
        }
    }

    /// Parse identifier: `[A-Za-z.][A-Za-z0-9._]*`
    fn identifier(&mut self) -> Token {
        let loc = self.current_location();
        let mut ident = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Ident(ident, loc)
    }

    /// Parse a `%op%` operator; only `%in%` is part of the grammar
    fn percent_operator(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let mut op = String::from("%");
        self.advance();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                break;
            }
            op.push(ch);
            self.advance();
            if ch == '%' {
                break;
            }
        }

        if op == "%in%" {
            Ok(Token::In(loc))
        } else {
            Err(LexError::new(LexErrorKind::UnsupportedOperator(op), loc))
        }
    }

    /// Append consecutive ASCII digits; returns whether any were consumed
    fn take_digits(&mut self, text: &mut String) -> bool {
        let start = text.len();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text.len() > start
    }

    fn push_advance(&mut self, text: &mut String) {
        if let Some(ch) = self.advance() {
            text.push(ch);
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn digit_at(&self, n: usize) -> bool {
        self.peek_ahead(n).is_some_and(|c| c.is_ascii_digit())
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    fn lex_err(source: &str) -> LexErrorKind {
        Lexer::new(source).tokenize().unwrap_err().kind
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("A(B$c, x = 1)");

        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "A"));
        assert!(matches!(tokens[1], Token::LParen(_)));
        assert!(matches!(tokens[2], Token::Ident(ref s, _) if s == "B"));
        assert!(matches!(tokens[3], Token::Dollar(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "c"));
        assert!(matches!(tokens[5], Token::Comma(_)));
        assert!(matches!(tokens[6], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[7], Token::Eq(_)));
        assert!(matches!(tokens[8], Token::DoubleLiteral(ref s, _) if s == "1"));
        assert!(matches!(tokens[9], Token::RParen(_)));
        assert!(matches!(tokens[10], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * / ^ : %in% ~ [ ]");

        assert!(matches!(tokens[0], Token::Plus(_)));
        assert!(matches!(tokens[1], Token::Minus(_)));
        assert!(matches!(tokens[2], Token::Star(_)));
        assert!(matches!(tokens[3], Token::Slash(_)));
        assert!(matches!(tokens[4], Token::Caret(_)));
        assert!(matches!(tokens[5], Token::Colon(_)));
        assert!(matches!(tokens[6], Token::In(_)));
        assert!(matches!(tokens[7], Token::Tilde(_)));
        assert!(matches!(tokens[8], Token::LBracket(_)));
        assert!(matches!(tokens[9], Token::RBracket(_)));
    }

    #[test]
    fn test_number_forms() {
        let tokens = lex("1.0 5L -0.43151402098822 .5 1e-3");

        assert!(matches!(tokens[0], Token::DoubleLiteral(ref s, _) if s == "1.0"));
        assert!(matches!(tokens[1], Token::IntLiteral(ref s, _) if s == "5L"));
        assert!(matches!(tokens[2], Token::DoubleLiteral(ref s, _) if s == "-0.43151402098822"));
        assert!(matches!(tokens[3], Token::DoubleLiteral(ref s, _) if s == ".5"));
        assert!(matches!(tokens[4], Token::DoubleLiteral(ref s, _) if s == "1e-3"));
    }

    #[test]
    fn test_minus_after_operand_is_subtraction() {
        let tokens = lex("A-1");
        assert!(matches!(tokens[1], Token::Minus(_)));
        assert!(matches!(tokens[2], Token::DoubleLiteral(ref s, _) if s == "1"));

        let tokens = lex("A * -2");
        assert!(matches!(tokens[1], Token::Star(_)));
        assert!(matches!(tokens[2], Token::DoubleLiteral(ref s, _) if s == "-2"));

        let tokens = lex("f(x)-3");
        assert!(matches!(tokens[4], Token::Minus(_)));
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(lex_err("1.5L"), LexErrorKind::MalformedNumber("1.5L".into()));
        assert_eq!(lex_err("1abc"), LexErrorKind::MalformedNumber("1a".into()));
        assert_eq!(lex_err("1e+"), LexErrorKind::MalformedNumber("1e+".into()));
    }

    #[test]
    fn test_identifier_with_dots() {
        let tokens = lex("C.D .hidden x_1");
        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "C.D"));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == ".hidden"));
        assert!(matches!(tokens[2], Token::Ident(ref s, _) if s == "x_1"));
    }

    #[test]
    fn test_string_literal_keeps_quote() {
        let tokens = lex("'D[123]' \"1.2;1.3;-8.5\"");

        match &tokens[0] {
            Token::StringLiteral(s, q, _) => {
                assert_eq!(s, "D[123]");
                assert_eq!(*q, Quote::Single);
            }
            other => panic!("Expected string literal, got {other:?}"),
        }
        match &tokens[1] {
            Token::StringLiteral(s, q, _) => {
                assert_eq!(s, "1.2;1.3;-8.5");
                assert_eq!(*q, Quote::Double);
            }
            other => panic!("Expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn test_string_blacklist() {
        assert_eq!(lex_err("'a(b'"), LexErrorKind::ForbiddenInString('('));
        assert_eq!(lex_err("'a b'"), LexErrorKind::ForbiddenInString(' '));
        assert_eq!(lex_err("'a\tb'"), LexErrorKind::ForbiddenInString('\t'));
        assert_eq!(lex_err("'a/b'"), LexErrorKind::ForbiddenInString('/'));
        assert_eq!(lex_err("'a\\b'"), LexErrorKind::ForbiddenInString('\\'));
        assert_eq!(lex_err("'a=b'"), LexErrorKind::ForbiddenInString('='));
        assert_eq!(lex_err("'a<-b'"), LexErrorKind::AssignmentInString);
        assert_eq!(
            lex_err("'a\""),
            LexErrorKind::MismatchedQuote {
                open: '\'',
                found: '"'
            }
        );
        assert_eq!(lex_err("'abc"), LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_less_than_without_dash_allowed_in_string() {
        let tokens = lex("'a<b'");
        assert!(matches!(tokens[0], Token::StringLiteral(ref s, _, _) if s == "a<b"));
    }

    #[test]
    fn test_unexpected_characters() {
        assert_eq!(lex_err("A <- B"), LexErrorKind::UnexpectedCharacter('<'));
        assert_eq!(lex_err("A; B"), LexErrorKind::UnexpectedCharacter(';'));
        assert_eq!(lex_err("`system`"), LexErrorKind::UnexpectedCharacter('`'));
        assert_eq!(lex_err("{A}"), LexErrorKind::UnexpectedCharacter('{'));
        assert_eq!(lex_err("A > B"), LexErrorKind::UnexpectedCharacter('>'));
    }

    #[test]
    fn test_unsupported_percent_operator() {
        assert_eq!(
            lex_err("A %o% B"),
            LexErrorKind::UnsupportedOperator("%o%".into())
        );
    }

    #[test]
    fn test_error_location() {
        let err = Lexer::new("A(\n  'x y')").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 5));
    }
}

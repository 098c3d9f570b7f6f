//! Expression parsing implementation
//!
//! Recursive descent with one method per precedence level, lowest first:
//!
//! ```text
//! formula        ::= additive? '~' additive | additive
//! additive       ::= multiplicative (('+' | '-') multiplicative)*
//! multiplicative ::= membership (('*' | '/') membership)*
//! membership     ::= range ('%in%' range)*
//! range          ::= exponent (':' exponent)*
//! exponent       ::= postfix ('^' exponent)?
//! postfix        ::= primary ('[' indices ']')*
//! primary        ::= number | string | symbol | call | '(' additive ')'
//! symbol         ::= ident ('$' ident)*
//! call           ::= ident '(' (arg (',' arg)*)? ')'
//! arg            ::= (ident '=')? formula
//! ```
//!
//! All levels are left-associative except `^`. Formulas are only reachable
//! from the root and from function arguments, one `~` each.
//!
//! Groups, call arguments, subset indices and `^` operands each open one
//! nesting level, bounded by
//! [`MAX_NESTING_DEPTH`](crate::parser::parser::MAX_NESTING_DEPTH). Binary operators and
//! subsets are counted against
//! [`MAX_OPERATIONS`](crate::parser::parser::MAX_OPERATIONS). Together the two bound
//! the depth of every AST, so later recursive walks cannot exhaust the stack.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parser::{Parser, SyntaxError};

impl Parser {
    /// Parse formula or plain expression
    pub(crate) fn parse_formula(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        let formula = if self.match_token(&Token::Tilde(loc)) {
            let rhs = Box::new(self.parse_additive()?);
            AstNode::Formula {
                lhs: None,
                rhs,
                location: loc,
            }
        } else {
            let expr = self.parse_additive()?;
            if !self.match_token(&Token::Tilde(self.current_location())) {
                return Ok(expr);
            }
            let loc = self.previous_location();
            let rhs = Box::new(self.parse_additive()?);
            AstNode::Formula {
                lhs: Some(Box::new(expr)),
                rhs,
                location: loc,
            }
        };

        if self.check(&Token::Tilde(self.current_location())) {
            return Err(self.unexpected("at most one '~' per formula"));
        }

        Ok(formula)
    }

    /// Parse additive (+ -)
    pub(crate) fn parse_additive(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };
            self.count_operation()?;

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* /)
    fn parse_multiplicative(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_membership()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else {
                break;
            };
            self.count_operation()?;

            let right = Box::new(self.parse_membership()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse membership (%in%)
    fn parse_membership(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_range()?;

        while self.match_token(&Token::In(self.current_location())) {
            let loc = self.previous_location();
            self.count_operation()?;
            let right = Box::new(self.parse_range()?);
            left = AstNode::BinaryOp {
                op: BinOp::In,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse range (:)
    fn parse_range(&mut self) -> Result<AstNode, SyntaxError> {
        let mut left = self.parse_exponent()?;

        while self.match_token(&Token::Colon(self.current_location())) {
            let loc = self.previous_location();
            self.count_operation()?;
            let right = Box::new(self.parse_exponent()?);
            left = AstNode::BinaryOp {
                op: BinOp::Range,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse exponent (^, right-associative)
    fn parse_exponent(&mut self) -> Result<AstNode, SyntaxError> {
        let base = self.parse_postfix()?;

        if self.match_token(&Token::Caret(self.current_location())) {
            let loc = self.previous_location();
            self.count_operation()?;
            let exponent = Box::new(self.nested(Self::parse_exponent)?);
            return Ok(AstNode::BinaryOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: exponent,
                location: loc,
            });
        }

        Ok(base)
    }

    /// Parse postfix subsetting: primary[...][...]
    fn parse_postfix(&mut self) -> Result<AstNode, SyntaxError> {
        let mut expr = self.parse_primary()?;

        while self.match_token(&Token::LBracket(self.current_location())) {
            let loc = self.previous_location();
            self.count_operation()?;
            let indices = self.nested(Self::parse_subset_indices)?;
            expr = AstNode::Subset {
                base: Box::new(expr),
                indices,
                location: loc,
            };
        }

        Ok(expr)
    }

    /// Parse subset slots after '[' up to and including ']'
    fn parse_subset_indices(&mut self) -> Result<Vec<Option<AstNode>>, SyntaxError> {
        let mut indices = Vec::new();

        if self.match_token(&Token::RBracket(self.current_location())) {
            return Ok(indices);
        }

        loop {
            let open = self.check(&Token::Comma(self.current_location()))
                || self.check(&Token::RBracket(self.current_location()));
            indices.push(if open {
                None
            } else {
                Some(self.parse_additive()?)
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
            if indices.len() == 2 {
                return Err(self.unexpected("']' (subsets take at most two indices)"));
            }
        }

        let close = self.current_location();
        self.expect_token(&Token::RBracket(close), "']' after subset indices")?;

        match indices.as_slice() {
            [Some(_)] | [Some(_), Some(_)] | [None, Some(_)] => Ok(indices),
            [Some(_), None] => Err(SyntaxError {
                expected: "a column index (row-only subsets like [i, ] are not supported)"
                    .to_string(),
                found: "']'".to_string(),
                location: close,
            }),
            _ => Err(SyntaxError {
                expected: "a row or column index ([, ] is not supported)".to_string(),
                found: "']'".to_string(),
                location: close,
            }),
        }
    }

    /// Parse argument list up to (not including) ')'
    fn parse_argument_list(&mut self) -> Result<Vec<Argument>, SyntaxError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_argument()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse a positional or `name = value` argument
    fn parse_argument(&mut self) -> Result<Argument, SyntaxError> {
        let named = matches!(self.peek(), Token::Ident(..))
            && matches!(self.peek_ahead(1), Some(Token::Eq(_)));

        if named {
            let name = self.expect_identifier("argument name")?;
            self.advance(); // consume '='
            let value = self.parse_formula()?;
            return Ok(Argument::named(name, value));
        }

        Ok(Argument::positional(self.parse_formula()?))
    }

    /// Parse primary (literals, symbols, calls, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, SyntaxError> {
        let loc = self.current_location();

        let literal = match self.peek() {
            Token::IntLiteral(text, _) => Some(AstNode::NumberLiteral {
                text: text.clone(),
                kind: NumberKind::Integer,
                location: loc,
            }),
            Token::DoubleLiteral(text, _) => Some(AstNode::NumberLiteral {
                text: text.clone(),
                kind: NumberKind::Double,
                location: loc,
            }),
            Token::StringLiteral(text, quote, _) => Some(AstNode::StringLiteral {
                text: text.clone(),
                quote: *quote,
                location: loc,
            }),
            _ => None,
        };
        if let Some(node) = literal {
            self.advance();
            return Ok(node);
        }

        // Symbol chain or function call
        if let Token::Ident(name, _) = self.peek() {
            let mut segments = vec![name.clone()];
            self.advance();

            while self.match_token(&Token::Dollar(self.current_location())) {
                segments.push(self.expect_identifier("identifier after '$'")?);
            }

            if self.check(&Token::LParen(self.current_location())) {
                if segments.len() > 1 {
                    return Err(self.unexpected("a plain function name before '('"));
                }
                self.advance(); // consume '('
                let args = self.nested(|parser| {
                    let args = parser.parse_argument_list()?;
                    parser.expect_token(
                        &Token::RParen(parser.current_location()),
                        "')' after function arguments",
                    )?;
                    Ok(args)
                })?;
                let name = segments.remove(0);
                return Ok(AstNode::FunctionCall {
                    name,
                    args,
                    location: loc,
                });
            }

            return Ok(AstNode::Symbol {
                segments,
                location: loc,
            });
        }

        // Parenthesized expression
        if self.match_token(&Token::LParen(loc)) {
            let inner = Box::new(self.nested(|parser| {
                let inner = parser.parse_additive()?;
                parser.expect_token(
                    &Token::RParen(parser.current_location()),
                    "')' after expression",
                )?;
                Ok(inner)
            })?);
            return Ok(AstNode::Group {
                inner,
                location: loc,
            });
        }

        Err(self.unexpected("an expression"))
    }
}

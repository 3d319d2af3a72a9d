// Selector parser - converts tokens to an expression tree

use super::lexer::Lexer;
use super::token::Token;
use crate::expression::{CompareOp, ExprKind, Expression, SelectorError, SelectorResult};

pub struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,
}

impl Parser {
    pub fn new(selector: &str) -> SelectorResult<Self> {
        let tokens = Lexer::new(selector).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    /// Parse a complete selector; trailing tokens are an error
    pub fn parse(&mut self) -> SelectorResult<Expression> {
        let expr = self.parse_expression()?;
        if !self.match_token(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Parse expression
    fn parse_expression(&mut self) -> SelectorResult<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> SelectorResult<Expression> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> SelectorResult<Expression> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> SelectorResult<Expression> {
        if self.match_token(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expression::not(operand))
        } else {
            self.parse_predicate()
        }
    }

    /// Parse comparison, BETWEEN, IN, LIKE and IS NULL
    fn parse_predicate(&mut self) -> SelectorResult<Expression> {
        let left = self.parse_addition()?;

        if self.match_token(&Token::Is) {
            self.advance();
            let negated = self.skip_not();
            self.expect_token(Token::Null)?;
            return Ok(negate_if(negated, Expression::is_null(left)));
        }

        // NOT here can only introduce BETWEEN, IN or LIKE
        let negated = self.skip_not();

        match self.current_token() {
            Token::Between => {
                self.advance();
                let lower = self.parse_addition()?;
                self.expect_token(Token::And)?;
                let upper = self.parse_addition()?;
                return Ok(negate_if(negated, Expression::between(left, lower, upper)));
            }
            Token::In => {
                self.advance();
                let items = self.parse_string_list()?;
                return Ok(negate_if(negated, Expression::in_list(left, items)));
            }
            Token::Like => {
                let position = self.current_position();
                self.advance();
                let pattern = Expression::string(self.expect_string()?);
                let escape = if self.match_token(&Token::Escape) {
                    self.advance();
                    Some(Expression::string(self.expect_string()?))
                } else {
                    None
                };
                let like = Expression::like(left, pattern, escape).map_err(|e| {
                    SelectorError::syntax(position, e.to_string())
                })?;
                return Ok(negate_if(negated, like));
            }
            _ if negated => return Err(self.unexpected("BETWEEN, IN or LIKE after NOT")),
            _ => {}
        }

        let op = match self.current_token() {
            Token::Equal => Some((CompareOp::Eq, false)),
            Token::NotEqual => Some((CompareOp::Eq, true)),
            Token::Less => Some((CompareOp::Lt, false)),
            Token::LessEqual => Some((CompareOp::Le, false)),
            Token::Greater => Some((CompareOp::Gt, false)),
            Token::GreaterEqual => Some((CompareOp::Ge, false)),
            _ => None,
        };

        let Some((op, negated)) = op else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_addition()?;

        let comparison = if op == CompareOp::Eq {
            equality(left, right)
        } else {
            Expression::compare(op, left, right)
        };
        Ok(negate_if(negated, comparison))
    }

    /// Parse addition/subtraction expression
    fn parse_addition(&mut self) -> SelectorResult<Expression> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op: fn(Expression, Expression) -> Expression = match self.current_token() {
                Token::Plus => Expression::add,
                Token::Minus => Expression::sub,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplication()?;
            left = op(left, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplication(&mut self) -> SelectorResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op: fn(Expression, Expression) -> Expression = match self.current_token() {
                Token::Star => Expression::mul,
                Token::Slash => Expression::div,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = op(left, right);
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> SelectorResult<Expression> {
        match self.current_token() {
            Token::Plus => {
                self.advance();
                self.parse_unary()
            }
            Token::Minus => {
                let position = self.current_position();
                self.advance();
                // `-` directly before a number is part of the literal, so the
                // full i64 range can be written
                if let Token::Number(n) = self.current_token() {
                    self.advance();
                    return number_literal(&format!("-{}", n), position);
                }
                let operand = self.parse_unary()?;
                Ok(Expression::negate(operand))
            }
            _ => self.parse_primary(),
        }
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> SelectorResult<Expression> {
        let position = self.current_position();
        let at = |e: SelectorError| SelectorError::syntax(position, e.to_string());

        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                number_literal(&n, position)
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::string(s))
            }
            Token::True => {
                self.advance();
                Expression::boolean("TRUE")
            }
            Token::False => {
                self.advance();
                Expression::boolean("FALSE")
            }
            Token::Identifier(name) => {
                self.advance();
                Expression::identifier(&name).map_err(at)
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expr)
            }
            t if t.is_keyword() => Err(SelectorError::syntax(
                position,
                format!("Reserved word {} cannot be used as an operand", t),
            )),
            _ => Err(self.unexpected("an operand")),
        }
    }

    /// Parse `( 'a', 'b', ... )`
    fn parse_string_list(&mut self) -> SelectorResult<Vec<String>> {
        self.expect_token(Token::LeftParen)?;
        let mut items = vec![self.expect_string()?];

        while self.match_token(&Token::Comma) {
            self.advance();
            items.push(self.expect_string()?);
        }

        self.expect_token(Token::RightParen)?;
        Ok(items)
    }

    // Helper methods

    /// Get current token
    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof)
    }

    fn current_position(&self) -> usize {
        self.tokens
            .get(self.position)
            .or(self.tokens.last())
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position < self.tokens.len().saturating_sub(1) {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    /// Consume an optional NOT, reporting whether it was there
    fn skip_not(&mut self) -> bool {
        if self.match_token(&Token::Not) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> SelectorResult<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    /// Expect a string literal
    fn expect_string(&mut self) -> SelectorResult<String> {
        match self.current_token() {
            Token::String(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }

    fn unexpected(&self, expected: &str) -> SelectorError {
        SelectorError::syntax(
            self.current_position(),
            format!("Expected {}, found {}", expected, self.current_token()),
        )
    }
}

/// Exact or approximate numeric literal, by the shape of its text
fn number_literal(text: &str, position: usize) -> SelectorResult<Expression> {
    let approximate = text.contains(['.', 'e', 'E']) || text.ends_with(['d', 'D', 'f', 'F']);
    let literal = if approximate {
        Expression::double(text)
    } else {
        Expression::long(text)
    };
    literal.map_err(|e| SelectorError::syntax(position, e.to_string()))
}

/// `=` picks its operator family from the operand kinds: strings compare as
/// strings, booleans as booleans, numbers numerically. Two untyped operands
/// (identifiers) defer the choice to evaluation time.
fn equality(left: Expression, right: Expression) -> Expression {
    match (left.kind(), right.kind()) {
        (ExprKind::String, _) | (_, ExprKind::String) => Expression::string_eq(left, right),
        (ExprKind::Boolean, _) | (_, ExprKind::Boolean) => Expression::bool_eq(left, right),
        (ExprKind::Any, ExprKind::Any) => Expression::value_eq(left, right),
        _ => Expression::eq(left, right),
    }
}

fn negate_if(negated: bool, expr: Expression) -> Expression {
    if negated {
        Expression::not(expr)
    } else {
        expr
    }
}

/// Parse selector text into an expression tree
pub fn parse_selector(selector: &str) -> SelectorResult<Expression> {
    Parser::new(selector)?.parse()
}

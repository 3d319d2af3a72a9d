// Selector lexer - tokenizes selector text

use super::token::Token;
use crate::expression::{SelectorError, SelectorResult};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> SelectorResult<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '+' => {
                self.advance();
                Token::Plus
            }
            '-' => {
                self.advance();
                Token::Minus
            }
            '*' => {
                self.advance();
                Token::Star
            }
            '/' => {
                self.advance();
                Token::Slash
            }
            '=' => {
                self.advance();
                Token::Equal
            }
            '<' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::LessEqual
                } else if self.current_char == Some('>') {
                    self.advance();
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '\'' => self.read_string()?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if is_identifier_start(c) => self.read_identifier(),
            c => {
                return Err(SelectorError::syntax(
                    self.position,
                    format!("Unexpected character '{}'", c),
                ))
            }
        };

        Ok(token)
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if is_identifier_part(ch) {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a string literal; `''` inside the quotes is one quote
    fn read_string(&mut self) -> SelectorResult<Token> {
        let start = self.position;
        self.advance(); // Skip opening quote
        let mut string = String::new();

        loop {
            match self.current_char {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        string.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance(); // Skip closing quote
                        return Ok(Token::String(string));
                    }
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
                None => {
                    return Err(SelectorError::syntax(start, "Unterminated string literal"));
                }
            }
        }
    }

    /// Read a number: digits, optional fraction, optional exponent, optional
    /// type suffix (`L`, `D`, `F`).
    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        self.take_digits(&mut number);

        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            number.push('.');
            self.advance();
            self.take_digits(&mut number);
        }

        if matches!(self.current_char, Some('e' | 'E')) {
            let sign = self.peek();
            let signed = matches!(sign, Some('+' | '-'));
            let digit_at = if signed { self.position + 2 } else { self.position + 1 };
            if self.input.get(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                number.push(self.current_char.unwrap_or('E'));
                self.advance();
                if signed {
                    number.push(sign.unwrap_or('+'));
                    self.advance();
                }
                self.take_digits(&mut number);
            }
        }

        if let Some(suffix @ ('L' | 'l' | 'D' | 'd' | 'F' | 'f')) = self.current_char {
            if !self.peek().is_some_and(is_identifier_part) {
                number.push(suffix);
                self.advance();
            }
        }

        Token::Number(number)
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Tokenize the entire input, pairing each token with its offset
    pub fn tokenize(&mut self) -> SelectorResult<Vec<(Token, usize)>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let position = self.position;
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, position));
            if done {
                break;
            }
        }

        Ok(tokens)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

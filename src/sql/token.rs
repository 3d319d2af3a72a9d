// Selector tokens for lexical analysis

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    /// Numeric literal text exactly as written, suffix included
    Number(String),
    String(String),

    // Keywords
    And,
    Or,
    Not,
    Between,
    Like,
    Escape,
    In,
    Is,
    Null,
    True,
    False,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,

    Eof,
}

impl Token {
    /// Keywords are case-insensitive
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "BETWEEN" => Some(Token::Between),
            "LIKE" => Some(Token::Like),
            "ESCAPE" => Some(Token::Escape),
            "IN" => Some(Token::In),
            "IS" => Some(Token::Is),
            "NULL" => Some(Token::Null),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::And
                | Token::Or
                | Token::Not
                | Token::Between
                | Token::Like
                | Token::Escape
                | Token::In
                | Token::Is
                | Token::Null
                | Token::True
                | Token::False
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string '{}'", s),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Between => write!(f, "BETWEEN"),
            Token::Like => write!(f, "LIKE"),
            Token::Escape => write!(f, "ESCAPE"),
            Token::In => write!(f, "IN"),
            Token::Is => write!(f, "IS"),
            Token::Null => write!(f, "NULL"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Equal => write!(f, "'='"),
            Token::NotEqual => write!(f, "'<>'"),
            Token::Less => write!(f, "'<'"),
            Token::LessEqual => write!(f, "'<='"),
            Token::Greater => write!(f, "'>'"),
            Token::GreaterEqual => write!(f, "'>='"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_recognition() {
        assert_eq!(Token::keyword_from_str("AND"), Some(Token::And));
        assert_eq!(Token::keyword_from_str("between"), Some(Token::Between));
        assert_eq!(Token::keyword_from_str("Escape"), Some(Token::Escape));
        assert_eq!(Token::keyword_from_str("nUlL"), Some(Token::Null));
        assert_eq!(Token::keyword_from_str("weight"), None);
        assert_eq!(Token::keyword_from_str("SELECT"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(Token::Like.is_keyword());
        assert!(Token::True.is_keyword());
        assert!(!Token::Identifier("x".to_string()).is_keyword());
        assert!(!Token::Plus.is_keyword());
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::NotEqual.to_string(), "'<>'");
        assert_eq!(Token::Eof.to_string(), "end of input");
        assert_eq!(Token::Identifier("x".to_string()).to_string(), "identifier 'x'");
    }
}

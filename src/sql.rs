// Selector text front end - tokens, lexer and parser

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::{parse_selector, Parser};
pub use token::Token;

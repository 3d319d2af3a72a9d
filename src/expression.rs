//! Selector expression engine.
//!
//! This module provides:
//! - The value model (`Truth`, `NumericValue`, `Value`)
//! - Interned leaves (`Identifier`, `Literal`)
//! - The expression tree and its operators
//! - Evaluation against a mapping or a pull-based value provider

pub mod error;
pub mod eval;
pub mod expr;
pub mod identifier;
pub mod intern;
pub mod like;
pub mod literal;
pub mod operator;
pub mod value;

pub use error::{SelectorError, SelectorResult};
pub use eval::{Mapping, ValueProvider};
pub use expr::{ExprKind, Expression, StringSet};
pub use identifier::{is_reserved, Identifier, HEADER_NAMES, RESERVED_WORDS};
pub use like::LikePattern;
pub use literal::Literal;
pub use operator::{ArithOp, CompareOp, ConditionalOp};
pub use value::{NumericValue, Truth, Value};

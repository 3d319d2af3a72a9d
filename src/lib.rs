pub mod expression;
pub mod message;
pub mod selector;
pub mod sql;

pub use expression::{Expression, SelectorError, SelectorResult, Truth, Value, ValueProvider};
pub use message::{Message, MessageProvider};
pub use selector::{Selector, SelectorCache};

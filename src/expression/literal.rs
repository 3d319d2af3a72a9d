//! Constant leaves of a selector tree.

use crate::expression::intern::Interner;
use crate::expression::{NumericValue, SelectorError, SelectorResult, Value};
use std::fmt;
use std::sync::{Arc, LazyLock};

static BOOL_LITERALS: LazyLock<Interner<Literal>> =
    LazyLock::new(|| Interner::new("boolean literal"));
static LONG_LITERALS: LazyLock<Interner<Literal>> =
    LazyLock::new(|| Interner::new("long literal"));
static DOUBLE_LITERALS: LazyLock<Interner<Literal>> =
    LazyLock::new(|| Interner::new("double literal"));

/// A literal keeps the text it was read from, so rendering reproduces the
/// source form (`7E3` stays `7E3`).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    text: String,
    value: Value,
}

impl Literal {
    /// `TRUE` or `FALSE` in any case
    pub fn boolean(text: &str) -> SelectorResult<Arc<Literal>> {
        BOOL_LITERALS.get_or_try_insert(text, || {
            let value = if text.eq_ignore_ascii_case("true") {
                true
            } else if text.eq_ignore_ascii_case("false") {
                false
            } else {
                return Err(SelectorError::InvalidLiteral {
                    kind: "boolean",
                    text: text.to_string(),
                });
            };
            Ok(Literal {
                text: text.to_ascii_uppercase(),
                value: Value::Boolean(value),
            })
        })
    }

    /// Exact numeric literal, with an optional `L` suffix
    pub fn long(text: &str) -> SelectorResult<Arc<Literal>> {
        LONG_LITERALS.get_or_try_insert(text, || {
            let digits = text.strip_suffix(['L', 'l']).unwrap_or(text);
            let n = digits
                .parse::<i64>()
                .map_err(|_| SelectorError::InvalidLiteral {
                    kind: "long",
                    text: text.to_string(),
                })?;
            Ok(Literal {
                text: text.to_string(),
                value: Value::Number(NumericValue::Long(n)),
            })
        })
    }

    /// Approximate numeric literal (`1.5`, `7E3`), with an optional `D`/`F`
    /// suffix
    pub fn double(text: &str) -> SelectorResult<Arc<Literal>> {
        DOUBLE_LITERALS.get_or_try_insert(text, || {
            let digits = text.strip_suffix(['D', 'd', 'F', 'f']).unwrap_or(text);
            // f64::from_str also accepts "inf" and "NaN", which are not literals
            let numeric = digits
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
            let n = digits
                .parse::<f64>()
                .ok()
                .filter(|_| numeric)
                .ok_or_else(|| SelectorError::InvalidLiteral {
                    kind: "double",
                    text: text.to_string(),
                })?;
            Ok(Literal {
                text: text.to_string(),
                value: Value::Number(NumericValue::Double(n)),
            })
        })
    }

    /// String literals are not interned; each call allocates.
    pub fn string(value: impl Into<String>) -> Arc<Literal> {
        let value = value.into();
        Arc::new(Literal {
            text: format!("'{}'", value.replace('\'', "''")),
            value: Value::String(value),
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn interned_count() -> usize {
        BOOL_LITERALS.len() + LONG_LITERALS.len() + DOUBLE_LITERALS.len()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

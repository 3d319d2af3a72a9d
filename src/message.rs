//! A minimal message record and the provider that reads it.
//!
//! Headers and application properties live in separate tables. The
//! provider is stateless; the message being filtered is passed as the
//! correlation token, so one provider serves every message.

use crate::expression::{
    Identifier, Mapping, NumericValue, SelectorError, SelectorResult, Value, ValueProvider,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    headers: Mapping,
    properties: Mapping,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn property_exists(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn clear_properties(&mut self) {
        self.properties.clear();
    }
}

/// Resolves header identifiers from the message headers and every other
/// identifier from its properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageProvider;

impl ValueProvider<Message> for MessageProvider {
    fn get_value(&self, identifier: &Identifier, message: &Message) -> Option<Value> {
        if identifier.is_header() {
            message.header(identifier.name()).cloned()
        } else {
            message.property(identifier.name()).cloned()
        }
    }
}

/// Parse `name=value` into a typed binding.
///
/// The value is read as a quoted string (`'text'`, `''` for a quote), a
/// boolean, an integer (`i64`), a float, or failing all of those a bare
/// string.
pub fn parse_assignment(text: &str) -> SelectorResult<(String, Value)> {
    let Some((name, raw)) = text.split_once('=') else {
        return Err(SelectorError::InvalidAssignment {
            text: text.to_string(),
            reason: "expected NAME=VALUE".to_string(),
        });
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(SelectorError::InvalidAssignment {
            text: text.to_string(),
            reason: "name is empty".to_string(),
        });
    }

    Ok((name.to_string(), parse_value(raw.trim())))
}

fn parse_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Value::String(raw[1..raw.len() - 1].replace("''", "'"));
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(NumericValue::Long(n));
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(NumericValue::Double(n)),
        _ => Value::String(raw.to_string()),
    }
}

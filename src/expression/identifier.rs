//! Named references to message headers and application properties.

use crate::expression::intern::Interner;
use crate::expression::{SelectorError, SelectorResult};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Keywords that can never name an identifier (compared case-insensitively)
pub const RESERVED_WORDS: [&str; 11] = [
    "NULL", "TRUE", "FALSE", "NOT", "AND", "OR", "BETWEEN", "LIKE", "IN", "IS", "ESCAPE",
];

/// Message header fields a selector may reference
pub const HEADER_NAMES: [&str; 6] = [
    "JMSDeliveryMode",
    "JMSPriority",
    "JMSMessageID",
    "JMSTimestamp",
    "JMSCorrelationID",
    "JMSType",
];

static IDENTIFIERS: LazyLock<Interner<Identifier>> = LazyLock::new(|| Interner::new("identifier"));

/// A named lookup. Instances are interned: every identifier with the same
/// name is the same `Arc`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
    is_header: bool,
}

impl Identifier {
    /// Fetch the shared identifier for `name`, creating it on first use.
    pub fn intern(name: &str) -> SelectorResult<Arc<Identifier>> {
        IDENTIFIERS.get_or_try_insert(name, || Identifier::build(name))
    }

    fn build(name: &str) -> SelectorResult<Identifier> {
        if name.is_empty() {
            return Err(SelectorError::InvalidIdentifier {
                name: String::new(),
                reason: "name is empty".to_string(),
            });
        }
        if is_reserved(name) {
            return Err(SelectorError::ReservedIdentifier {
                name: name.to_string(),
            });
        }

        Ok(Identifier {
            name: name.to_string(),
            is_header: HEADER_NAMES.contains(&name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the name is one of [`HEADER_NAMES`] rather than an
    /// application property.
    pub fn is_header(&self) -> bool {
        self.is_header
    }

    /// Number of distinct identifiers interned by this process
    pub fn interned_count() -> usize {
        IDENTIFIERS.len()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let a = Identifier::intern("ident_test_color").unwrap();
        let b = Identifier::intern("ident_test_color").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "ident_test_color");
        assert!(!a.is_header());

        let c = Identifier::intern("ident_test_Color").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_header_flag() {
        assert!(Identifier::intern("JMSType").unwrap().is_header());
        assert!(Identifier::intern("JMSPriority").unwrap().is_header());
        // Header names are case-sensitive
        assert!(!Identifier::intern("jmstype").unwrap().is_header());
    }

    #[test]
    fn test_reserved_words_rejected() {
        for word in RESERVED_WORDS {
            assert!(matches!(
                Identifier::intern(word),
                Err(SelectorError::ReservedIdentifier { .. })
            ));
        }
        assert!(matches!(
            Identifier::intern("between"),
            Err(SelectorError::ReservedIdentifier { .. })
        ));
        assert!(matches!(
            Identifier::intern(""),
            Err(SelectorError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_interned_count_grows_once_per_name() {
        let before = Identifier::interned_count();
        Identifier::intern("ident_test_count_once").unwrap();
        let after_first = Identifier::interned_count();
        assert!(after_first > before);

        // Other tests intern concurrently, so only a lower bound is stable
        Identifier::intern("ident_test_count_once").unwrap();
        assert!(Identifier::interned_count() >= after_first);
        assert!(matches!(
            Identifier::intern("AND"),
            Err(SelectorError::ReservedIdentifier { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Identifier::intern("weight").unwrap().to_string(), "weight");
    }
}

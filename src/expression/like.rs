//! LIKE pattern compilation.
//!
//! `_` matches one character, `%` matches any run of characters, and the
//! optional escape character makes the next character literal. Every other
//! character is literal as well. The result is a fully anchored regex.

use crate::expression::{SelectorError, SelectorResult};
use log::debug;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    escape: Option<char>,
    regex: Regex,
}

impl LikePattern {
    pub fn compile(pattern: &str, escape: Option<char>) -> SelectorResult<Self> {
        let source = translate(pattern, escape)?;
        let regex = Regex::new(&source).map_err(|e| SelectorError::InvalidLikePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        debug!("compiled LIKE '{}' to /{}/", pattern, source);

        Ok(Self {
            pattern: pattern.to_string(),
            escape,
            regex,
        })
    }

    /// Read the escape clause text: exactly one character once trimmed.
    pub fn parse_escape(text: &str) -> SelectorResult<char> {
        let mut chars = text.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SelectorError::InvalidEscape {
                escape: text.to_string(),
            }),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.escape == other.escape
    }
}

fn translate(pattern: &str, escape: Option<char>) -> SelectorResult<String> {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            let Some(next) = chars.next() else {
                return Err(SelectorError::InvalidLikePattern {
                    pattern: pattern.to_string(),
                    reason: "escape character at end of pattern".to_string(),
                });
            };
            push_literal(&mut out, next);
            continue;
        }

        match c {
            '_' => out.push('.'),
            '%' => out.push_str(".*"),
            other => push_literal(&mut out, other),
        }
    }

    out.push('$');
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_anchored() {
        let p = LikePattern::compile("foo%", None).unwrap();
        assert!(p.is_match("foobar"));
        assert!(p.is_match("foo"));
        assert!(!p.is_match("xfoobar"));
    }

    #[test]
    fn test_underscore_single_char() {
        let p = LikePattern::compile("a_c", None).unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("ac"));
        assert!(!p.is_match("abbc"));
    }

    #[test]
    fn test_escape_character() {
        let p = LikePattern::compile("100\\%", Some('\\')).unwrap();
        assert!(p.is_match("100%"));
        assert!(!p.is_match("100x"));
        assert!(!p.is_match("1000"));

        let p = LikePattern::compile("a!_b%", Some('!')).unwrap();
        assert!(p.is_match("a_bcd"));
        assert!(!p.is_match("axbcd"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = LikePattern::compile("a.b(c)*", None).unwrap();
        assert!(p.is_match("a.b(c)*"));
        assert!(!p.is_match("axb(c)"));
    }

    #[test]
    fn test_wildcards_cross_newlines() {
        let p = LikePattern::compile("a%z", None).unwrap();
        assert!(p.is_match("a\nz"));
    }

    #[test]
    fn test_dangling_escape() {
        assert!(matches!(
            LikePattern::compile("abc\\", Some('\\')),
            Err(SelectorError::InvalidLikePattern { .. })
        ));
    }

    #[test]
    fn test_parse_escape() {
        assert_eq!(LikePattern::parse_escape(" \\ ").unwrap(), '\\');
        assert!(LikePattern::parse_escape("ab").is_err());
        assert!(LikePattern::parse_escape("   ").is_err());
    }
}

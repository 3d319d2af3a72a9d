//! Compiled selectors and a shared cache of them.

use crate::expression::{Expression, Mapping, SelectorResult, Truth, ValueProvider};
use crate::sql::parse_selector;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, trace};
use std::fmt;
use std::sync::Arc;

/// Selector text together with the tree it compiles to
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    text: String,
    root: Expression,
}

impl Selector {
    /// Parse and compile selector text
    pub fn parse(text: &str) -> SelectorResult<Self> {
        let root = parse_selector(text)?;
        debug!("compiled selector '{}' as {}", text, root);
        Ok(Self {
            text: text.to_string(),
            root,
        })
    }

    /// Wrap a tree built by hand; its rendering stands in for the text
    pub fn from_expression(root: Expression) -> Self {
        Self {
            text: root.to_string(),
            root,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expression(&self) -> &Expression {
        &self.root
    }

    pub fn evaluate(&self, mapping: &Mapping) -> Truth {
        self.root.evaluate(mapping)
    }

    pub fn evaluate_with<P, C>(&self, provider: &P, correlation: &C) -> Truth
    where
        P: ValueProvider<C> + ?Sized,
        C: ?Sized,
    {
        self.root.evaluate_with(provider, correlation)
    }

    /// Only TRUE selects; FALSE and UNKNOWN both reject
    pub fn matches(&self, mapping: &Mapping) -> bool {
        self.evaluate(mapping).is_true()
    }

    pub fn matches_with<P, C>(&self, provider: &P, correlation: &C) -> bool
    where
        P: ValueProvider<C> + ?Sized,
        C: ?Sized,
    {
        self.evaluate_with(provider, correlation).is_true()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Compiled selectors keyed by their text.
///
/// Each distinct text is compiled once; concurrent callers asking for the
/// same text receive the same `Arc`. Failed compilations are not cached.
#[derive(Default)]
pub struct SelectorCache {
    selectors: DashMap<String, Arc<Selector>>,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, text: &str) -> SelectorResult<Arc<Selector>> {
        if let Some(existing) = self.selectors.get(text) {
            trace!("selector cache hit for '{}'", text);
            return Ok(Arc::clone(existing.value()));
        }

        // The entry guard holds the shard lock, so a racing caller waits
        // here instead of compiling the same text twice.
        match self.selectors.entry(text.to_string()) {
            Entry::Occupied(occupied) => Ok(Arc::clone(occupied.get())),
            Entry::Vacant(vacant) => {
                let selector = Arc::new(Selector::parse(text)?);
                vacant.insert(Arc::clone(&selector));
                Ok(selector)
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<Arc<Selector>> {
        self.selectors.get(text).map(|e| Arc::clone(e.value()))
    }

    pub fn remove(&self, text: &str) -> Option<Arc<Selector>> {
        self.selectors.remove(text).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn clear(&self) {
        self.selectors.clear();
    }
}

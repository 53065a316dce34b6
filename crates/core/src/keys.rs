//! Key builder: canonicalizes natural-key fragments plus a scope into a
//! sorted, de-duplicated set of lookup keys.
//!
//! Sorted order is mandatory: two processes racing to acquire overlapping
//! locks must traverse their derived keys in the same order, or the lock
//! protocol's deadlock-freedom argument does not hold.

use std::collections::BTreeSet;

use crate::error::KeyBuilderError;
use crate::types::{LookupKey, Scope};

/// A canonical, order-stable set of lookup keys derived from a scope and a
/// set of natural-key fragments.
#[derive(Debug, Clone)]
pub struct LookupKeySet {
    scope: Scope,
    keys: Vec<LookupKey>,
}

impl LookupKeySet {
    /// Build the canonical key set.
    ///
    /// Empty (post-trim) fragments are dropped. Duplicate fragments collapse
    /// to a single lookup key. Returns [`KeyBuilderError::NoFragments`] if
    /// nothing remains after filtering.
    pub fn build<I, S>(scope: Scope, fragments: I) -> Result<Self, KeyBuilderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments: BTreeSet<String> = fragments
            .into_iter()
            .map(|f| f.as_ref().trim().to_string())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        if fragments.is_empty() {
            return Err(KeyBuilderError::NoFragments);
        }

        let keys = fragments
            .into_iter()
            .map(|fragment| LookupKey::new(&scope, &fragment))
            .collect();

        Ok(Self { scope, keys })
    }

    /// The scope this set was built for.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The derived lookup keys, in canonical (sorted) order.
    pub fn keys(&self) -> &[LookupKey] {
        &self.keys
    }

    /// The scope-prefix helper `"{scope}|"`, used by prefix scans.
    pub fn scope_prefix(&self) -> String {
        self.scope.prefix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(s: &str) -> Scope {
        Scope::new(s).unwrap()
    }

    #[test]
    fn drops_empty_fragments() {
        let set = LookupKeySet::build(scope("ds1"), ["", "  ", "a"]).unwrap();
        assert_eq!(set.keys().len(), 1);
        assert_eq!(set.keys()[0].as_str(), "ds1|a");
    }

    #[test]
    fn errors_when_all_fragments_empty() {
        let err = LookupKeySet::build(scope("ds1"), ["", "   "]).unwrap_err();
        assert_eq!(err, KeyBuilderError::NoFragments);
    }

    #[test]
    fn deduplicates_fragments() {
        let set = LookupKeySet::build(scope("ds1"), ["a", "a", "b"]).unwrap();
        assert_eq!(set.keys().len(), 2);
    }

    #[test]
    fn is_sorted_regardless_of_input_order() {
        let a = LookupKeySet::build(scope("ds1"), ["zeta", "alpha", "mid"]).unwrap();
        let b = LookupKeySet::build(scope("ds1"), ["alpha", "mid", "zeta"]).unwrap();
        let a_keys: Vec<&str> = a.keys().iter().map(|k| k.as_str()).collect();
        let b_keys: Vec<&str> = b.keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(a_keys, b_keys);
        assert_eq!(a_keys, vec!["ds1|alpha", "ds1|mid", "ds1|zeta"]);
    }

    #[test]
    fn scope_prefix_matches_helper() {
        let set = LookupKeySet::build(scope("ds1"), ["a"]).unwrap();
        assert_eq!(set.scope_prefix(), "ds1|");
    }
}

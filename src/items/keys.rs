//! Case-insensitive key handling.

use std::collections::{BTreeSet, HashMap};

/// Fold a key for case-insensitive comparison.
pub(crate) fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

/// Case-insensitive set of keys that remembers the casing each key was
/// inserted with.
#[derive(Clone, Debug, Default)]
pub(crate) struct KeySet {
    /// Folded key -> key as inserted.
    keys: HashMap<String, String>,
}

impl KeySet {
    /// Insert a key. An existing key keeps its recorded casing.
    pub fn insert(&mut self, key: &str) -> bool {
        let folded = fold_key(key);
        if self.keys.contains_key(&folded) {
            return false;
        }
        self.keys.insert(folded, key.to_string());
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(&fold_key(key)).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(&fold_key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Point-in-time copy of the keys.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.keys.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_membership() {
        let mut set = KeySet::default();
        assert!(set.insert("Cart"));
        assert!(!set.insert("CART"));
        assert!(set.contains("cart"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.snapshot().into_iter().collect::<Vec<_>>(), vec!["Cart"]);

        assert!(set.remove("cArT"));
        assert!(set.is_empty());
        assert!(!set.remove("cart"));
    }

    #[test]
    fn test_fold_non_ascii() {
        assert_eq!(fold_key("ÄRGER"), fold_key("ärger"));
    }
}

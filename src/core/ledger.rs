//! # Ordered Ledger
//!
//! The controller's working state: which view is materialized for which item,
//! in navigation order (bottom of the stack first).
//!
//! ```text
//! entries: [(A, viewA), (B, viewB), (C, viewC)]
//! index:   { A: 0, B: 1, C: 2 }
//! ```
//!
//! Keys are unique. Every mutation goes through this API so the index and
//! the entry order can never disagree.

use std::collections::HashMap;
use std::fmt;

use super::host::{Item, ViewHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError<I> {
    /// The item already has a view in the ledger.
    DuplicateItem(I),
    /// A position outside the ledger was requested.
    OutOfBounds { index: usize, len: usize },
}

impl<I: fmt::Debug> fmt::Display for LedgerError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::DuplicateItem(item) => write!(f, "item {item:?} is already in the ledger"),
            LedgerError::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for ledger of length {len}")
            }
        }
    }
}

impl<I: fmt::Debug> std::error::Error for LedgerError<I> {}

/// Order-preserving map from item to view.
#[derive(Debug, Clone)]
pub struct OrderedLedger<I, V> {
    entries: Vec<(I, V)>,
    index: HashMap<I, usize>,
}

impl<I, V> Default for OrderedLedger<I, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<I: Item, V: ViewHandle> OrderedLedger<I, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `item` on top. Rejects items that are already tracked.
    pub fn insert(&mut self, item: I, view: V) -> Result<(), LedgerError<I>> {
        if self.index.contains_key(&item) {
            return Err(LedgerError::DuplicateItem(item));
        }
        self.index.insert(item.clone(), self.entries.len());
        self.entries.push((item, view));
        Ok(())
    }

    pub fn get(&self, item: &I) -> Option<&V> {
        self.index.get(item).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, item: &I) -> bool {
        self.index.contains_key(item)
    }

    pub fn position(&self, item: &I) -> Option<usize> {
        self.index.get(item).copied()
    }

    /// Find a view by identity.
    pub fn position_of_view(&self, view: &V) -> Option<usize> {
        self.entries.iter().position(|(_, v)| v.is_same(view))
    }

    /// Remove an item from any position, returning its view.
    pub fn remove(&mut self, item: &I) -> Option<V> {
        let at = self.index.remove(item)?;
        let (_, view) = self.entries.remove(at);
        self.reindex_from(at);
        Some(view)
    }

    /// Move the entry at `from` so it ends up at `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<(), LedgerError<I>> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(LedgerError::OutOfBounds { index, len });
            }
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.reindex_from(from.min(to));
        Ok(())
    }

    /// Keep only the first `len` entries. Evicted views are dropped.
    pub fn truncate(&mut self, len: usize) {
        drop(self.split_off(len));
    }

    /// Remove up to `count` entries from the top, returning them bottom first.
    pub fn pop_last(&mut self, count: usize) -> Vec<(I, V)> {
        let keep = self.entries.len().saturating_sub(count);
        self.split_off(keep)
    }

    pub fn last(&self) -> Option<(&I, &V)> {
        self.entries.last().map(|(i, v)| (i, v))
    }

    pub fn items(&self) -> impl Iterator<Item = &I> {
        self.entries.iter().map(|(i, _)| i)
    }

    pub fn views(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&I, &V)> {
        self.entries.iter().map(|(i, v)| (i, v))
    }

    /// True when the key sequence is exactly `items`, in order.
    pub fn matches_items(&self, items: &[I]) -> bool {
        self.entries.len() == items.len()
            && self.entries.iter().zip(items).all(|((a, _), b)| a == b)
    }

    /// Consume the ledger, yielding its entries bottom first.
    pub fn into_entries(self) -> Vec<(I, V)> {
        self.entries
    }

    fn split_off(&mut self, keep: usize) -> Vec<(I, V)> {
        if keep >= self.entries.len() {
            return Vec::new();
        }
        let evicted = self.entries.split_off(keep);
        for (item, _) in &evicted {
            self.index.remove(item);
        }
        evicted
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, (item, _)) in self.entries[start..].iter().enumerate() {
            self.index.insert(item.clone(), start + offset);
        }
    }
}

/// Ledgers are equal when they track the same items with identical views.
impl<I: Item, V: ViewHandle> PartialEq for OrderedLedger<I, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((ia, va), (ib, vb))| ia == ib && va.is_same(vb))
    }
}

impl<I: Item, V: ViewHandle> FromIterator<(I, V)> for OrderedLedger<I, V> {
    /// Later duplicates are skipped.
    fn from_iter<T: IntoIterator<Item = (I, V)>>(iter: T) -> Self {
        let mut ledger = Self::new();
        for (item, view) in iter {
            let _ = ledger.insert(item, view);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn ledger(items: &[&'static str]) -> OrderedLedger<&'static str, Rc<String>> {
        items
            .iter()
            .map(|i| (*i, Rc::new(format!("view-{i}"))))
            .collect()
    }

    fn keys(ledger: &OrderedLedger<&'static str, Rc<String>>) -> Vec<&'static str> {
        ledger.items().copied().collect()
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut l = ledger(&["a", "b"]);
        let err = l.insert("a", Rc::new("again".into())).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateItem("a"));
        assert_eq!(keys(&l), vec!["a", "b"]);
        assert_eq!(l.get(&"a").unwrap().as_str(), "view-a");
    }

    #[test]
    fn test_remove_reindexes_later_entries() {
        let mut l = ledger(&["a", "b", "c", "d"]);
        let removed = l.remove(&"b").unwrap();
        assert_eq!(removed.as_str(), "view-b");
        assert_eq!(keys(&l), vec!["a", "c", "d"]);
        assert_eq!(l.position(&"c"), Some(1));
        assert_eq!(l.position(&"d"), Some(2));
        assert!(l.remove(&"b").is_none());
    }

    #[test]
    fn test_move_to_reorders() {
        let mut l = ledger(&["a", "b", "c"]);
        l.move_to(2, 0).unwrap();
        assert_eq!(keys(&l), vec!["c", "a", "b"]);
        assert_eq!(l.position(&"c"), Some(0));
        assert_eq!(l.position(&"b"), Some(2));

        l.move_to(0, 2).unwrap();
        assert_eq!(keys(&l), vec!["a", "b", "c"]);

        assert_eq!(
            l.move_to(3, 0),
            Err(LedgerError::OutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_pop_last_returns_evicted_bottom_first() {
        let mut l = ledger(&["a", "b", "c"]);
        let evicted = l.pop_last(2);
        let evicted_keys: Vec<_> = evicted.iter().map(|(i, _)| *i).collect();
        assert_eq!(evicted_keys, vec!["b", "c"]);
        assert_eq!(keys(&l), vec!["a"]);
        assert!(!l.contains(&"b"));

        // Popping more than we have empties the ledger.
        assert_eq!(l.pop_last(5).len(), 1);
        assert!(l.is_empty());
    }

    #[test]
    fn test_truncate_beyond_len_is_noop() {
        let mut l = ledger(&["a", "b"]);
        l.truncate(5);
        assert_eq!(l.len(), 2);
        l.truncate(1);
        assert_eq!(keys(&l), vec!["a"]);
    }

    #[test]
    fn test_position_of_view_uses_identity() {
        let l = ledger(&["a", "b"]);
        let b_view = l.get(&"b").unwrap().clone();
        assert_eq!(l.position_of_view(&b_view), Some(1));

        let lookalike = Rc::new("view-b".to_string());
        assert_eq!(l.position_of_view(&lookalike), None);
    }

    #[test]
    fn test_matches_items() {
        let l = ledger(&["a", "b"]);
        assert!(l.matches_items(&["a", "b"]));
        assert!(!l.matches_items(&["b", "a"]));
        assert!(!l.matches_items(&["a"]));
        assert!(OrderedLedger::<&str, Rc<String>>::new().matches_items(&[]));
    }

    #[test]
    fn test_equality_requires_identical_views() {
        let a = ledger(&["a"]);
        let b = ledger(&["a"]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}

//! # Reconciliation
//!
//! Computes the ledger for a new item sequence from the previous one:
//!
//! ```text
//! old:   [A→vA, B→vB, C→vC]
//! items: [A, C, D]
//! new:   [A→vA, C→vC, D→make(D)]     released: [B→vB]
//! ```
//!
//! Views of surviving items move across untouched, new items get exactly one
//! `make` call each, and the result follows `items` order exactly. The only
//! input state is the old ledger itself, so the same inputs always produce
//! the same ledger.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::host::{Item, ViewFactory, ViewHandle};
use super::ledger::OrderedLedger;

/// A reconciled ledger plus what it took to get there.
#[derive(Debug)]
pub struct Reconciliation<I, V> {
    pub ledger: OrderedLedger<I, V>,
    /// Items that received a fresh view, in `items` order.
    pub created: Vec<I>,
    /// Number of views carried over from the old ledger.
    pub reused: usize,
    /// Entries dropped from the old ledger, in their old order.
    pub released: Vec<(I, V)>,
}

/// Build the ledger for `items`, reusing views from `old`.
///
/// `items` must not contain duplicates.
pub fn reconcile<I, V, F>(old: OrderedLedger<I, V>, items: &[I], factory: &mut F) -> OrderedLedger<I, V>
where
    I: Item,
    V: ViewHandle,
    F: ViewFactory<I, V> + ?Sized,
{
    reconcile_detailed(old, items, factory).ledger
}

/// Like [`reconcile`], but also reports created, reused and released entries.
pub fn reconcile_detailed<I, V, F>(
    old: OrderedLedger<I, V>,
    items: &[I],
    factory: &mut F,
) -> Reconciliation<I, V>
where
    I: Item,
    V: ViewHandle,
    F: ViewFactory<I, V> + ?Sized,
{
    let wanted: HashSet<&I> = items.iter().collect();
    debug_assert_eq!(wanted.len(), items.len(), "duplicate items in {items:?}");

    let mut carried: HashMap<I, V> = HashMap::with_capacity(old.len());
    let mut released = Vec::new();
    for (item, view) in old.into_entries() {
        if wanted.contains(&item) {
            carried.insert(item, view);
        } else {
            released.push((item, view));
        }
    }

    let mut ledger = OrderedLedger::with_capacity(items.len());
    let mut created = Vec::new();
    let mut reused = 0;
    for item in items {
        if ledger.contains(item) {
            continue;
        }
        let view = match carried.remove(item) {
            Some(view) => {
                reused += 1;
                view
            }
            None => {
                created.push(item.clone());
                factory.make(item)
            }
        };
        let inserted = ledger.insert(item.clone(), view);
        debug_assert!(inserted.is_ok(), "{item:?} inserted twice");
    }

    debug!(
        "Reconciled {} items: {} reused, {} created, {} released",
        items.len(),
        reused,
        created.len(),
        released.len()
    );

    Reconciliation {
        ledger,
        created,
        reused,
        released,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingFactory, TestView};
    use std::rc::Rc;

    fn build(items: &[&'static str], factory: &mut CountingFactory) -> OrderedLedger<&'static str, TestView> {
        reconcile(OrderedLedger::new(), items, factory)
    }

    fn keys(ledger: &OrderedLedger<&'static str, TestView>) -> Vec<&'static str> {
        ledger.items().copied().collect()
    }

    #[test]
    fn test_empty_old_ledger_creates_everything() {
        let mut factory = CountingFactory::default();
        let ledger = build(&["a", "b", "c"], &mut factory);
        assert_eq!(keys(&ledger), vec!["a", "b", "c"]);
        assert_eq!(factory.made, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_items_yields_empty_ledger() {
        let mut factory = CountingFactory::default();
        let old = build(&["a", "b"], &mut factory);
        let result = reconcile_detailed(old, &[], &mut factory);
        assert!(result.ledger.is_empty());
        assert_eq!(result.released.len(), 2);
        assert_eq!(factory.made.len(), 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut factory = CountingFactory::default();
        let first = build(&["a", "b"], &mut factory);
        let snapshot = first.clone();
        let second = reconcile(first, &["a", "b"], &mut factory);
        assert_eq!(second, snapshot);
        assert_eq!(factory.made.len(), 2);
    }

    #[test]
    fn test_surviving_items_keep_their_views() {
        let mut factory = CountingFactory::default();
        let old = build(&["a", "b", "c"], &mut factory);
        let view_a = old.get(&"a").cloned().unwrap();
        let view_c = old.get(&"c").cloned().unwrap();

        let result = reconcile_detailed(old, &["c", "d", "a"], &mut factory);

        assert_eq!(keys(&result.ledger), vec!["c", "d", "a"]);
        assert!(Rc::ptr_eq(result.ledger.get(&"a").unwrap(), &view_a));
        assert!(Rc::ptr_eq(result.ledger.get(&"c").unwrap(), &view_c));
        assert_eq!(result.created, vec!["d"]);
        assert_eq!(result.reused, 2);
        let released: Vec<_> = result.released.iter().map(|(i, _)| *i).collect();
        assert_eq!(released, vec!["b"]);
    }

    #[test]
    fn test_make_called_once_per_new_item_only() {
        let mut factory = CountingFactory::default();
        let old = build(&["a", "b"], &mut factory);
        factory.made.clear();

        let _ = reconcile(old, &["b", "x", "y"], &mut factory);
        assert_eq!(factory.made, vec!["x", "y"]);
    }

    #[test]
    fn test_order_follows_items_across_permutations() {
        let mut factory = CountingFactory::default();
        let mut ledger = build(&["a", "b", "c", "d"], &mut factory);
        let sequences: [&[&'static str]; 5] = [
            &["d", "c", "b", "a"],
            &["b", "d"],
            &["e", "b", "f", "d"],
            &["f"],
            &["a", "f", "g", "b"],
        ];
        for items in sequences {
            ledger = reconcile(ledger, items, &mut factory);
            assert_eq!(keys(&ledger), items.to_vec());
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_duplicate_items_keep_first_occurrence() {
        let mut factory = CountingFactory::default();
        let ledger = build(&["a", "b", "a"], &mut factory);
        assert_eq!(keys(&ledger), vec!["a", "b"]);
        assert_eq!(factory.made, vec!["a", "b"]);
    }

    #[test]
    fn test_closure_factory() {
        let mut next = 0;
        let mut factory = |item: &u8| {
            next += 1;
            Rc::new((*item, next))
        };
        let ledger = reconcile(OrderedLedger::new(), &[7, 9], &mut factory);
        let views: Vec<_> = ledger.views().map(|v| **v).collect();
        assert_eq!(views, vec![(7, 1), (9, 2)]);
    }
}

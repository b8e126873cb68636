//! # Host Capabilities
//!
//! The traits the core consumes. Nothing here knows about a concrete GUI
//! framework: a native adapter implements these for its navigation
//! container, tab bar and modal presenter, and the `headless` module
//! implements them in memory.
//!
//! ```text
//!   core ──make(item)──────────────▶ ViewFactory
//!   core ──replace(views, animated)▶ HostStack
//!   core ◀──transition(from, to)──── HostStack (delivered by the adapter)
//! ```

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A logical screen identifier. Anything cloneable, comparable and hashable.
pub trait Item: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Item for T {}

/// Handle to a materialized view owned by the host framework.
///
/// Handles are compared by identity, never by content: two views built for
/// the same item are still different views.
pub trait ViewHandle: Clone + fmt::Debug {
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: fmt::Debug> ViewHandle for Rc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

/// Creates a presentable view for an item.
///
/// May allocate. The core calls it at most once per item per reconciliation,
/// and never for an item whose view is already tracked.
pub trait ViewFactory<I, V> {
    fn make(&mut self, item: &I) -> V;
}

impl<I, V, F> ViewFactory<I, V> for F
where
    F: FnMut(&I) -> V,
{
    fn make(&mut self, item: &I) -> V {
        self(item)
    }
}

/// Global counter for observer registrations.
static OBSERVER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies who a host currently reports transitions to.
///
/// Controllers register their id on attach and later compare it against the
/// host's registration to detect a replaced delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn next() -> Self {
        Self(OBSERVER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// A platform navigation container: an ordered stack of views.
pub trait HostStack {
    type View: ViewHandle;

    /// Views currently displayed, bottom first.
    fn current_views(&self) -> Vec<Self::View>;

    /// Replace the whole displayed sequence.
    fn replace(&mut self, views: Vec<Self::View>, animated: bool);

    /// Whether the host environment allows animations at all.
    fn animations_enabled(&self) -> bool {
        true
    }

    /// Route completed-transition notifications to `observer`.
    fn set_transition_observer(&mut self, observer: ObserverId);

    /// Who transition notifications currently go to.
    fn transition_observer(&self) -> Option<ObserverId>;
}

/// A tab container holding a fixed set of views, exactly one selected.
pub trait TabHost {
    type View: ViewHandle;

    fn set_tabs(&mut self, views: Vec<Self::View>);

    fn select(&mut self, index: usize);

    fn selected_index(&self) -> Option<usize>;
}

/// A presenter that shows at most one modal view at a time.
pub trait ModalHost {
    type View: ViewHandle;

    fn present(&mut self, view: Self::View, animated: bool);

    fn dismiss(&mut self, animated: bool);

    fn presented(&self) -> Option<Self::View>;

    fn animations_enabled(&self) -> bool {
        true
    }
}

//! # Store
//!
//! The state layer the controllers observe: one current snapshot, a reducer,
//! and a list of subscribers.
//!
//! ```text
//! dispatch(action) ──▶ reducer(&state, action) ──▶ new snapshot
//!                                                    │
//!                       ┌────────────────────────────┤
//!                       ▼                            ▼
//!              sync subscribers              watch::Receiver
//!              (controllers)                 (async observers)
//! ```
//!
//! Single-threaded: the store lives on the UI loop and hands out `Rc`
//! handles. Subscribers receive the current snapshot immediately, then every
//! change in dispatch order. An action dispatched from inside a subscriber is
//! queued and applied once the current notification round finishes, so no
//! subscriber ever observes two snapshots interleaved.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::{debug, trace};
use tokio::sync::watch;

type Reducer<S, A> = Box<dyn Fn(&S, A) -> S>;
type Callback<S> = Rc<RefCell<dyn FnMut(&S)>>;

/// Anything that accepts actions for the state layer.
pub trait ActionDispatcher<A> {
    fn dispatch(&self, action: A);
}

struct StoreInner<S, A> {
    state: watch::Sender<S>,
    reducer: Reducer<S, A>,
    subscribers: RefCell<Vec<(u64, Callback<S>)>>,
    next_subscriber: Cell<u64>,
    pending: RefCell<VecDeque<A>>,
    dispatching: Cell<bool>,
}

/// Shared handle to a store. Cloning shares the same state.
pub struct Store<S, A> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + PartialEq + 'static,
    A: 'static,
{
    pub fn new(initial: S, reducer: impl Fn(&S, A) -> S + 'static) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            inner: Rc::new(StoreInner {
                state,
                reducer: Box::new(reducer),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(1),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// The latest snapshot.
    pub fn current(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Observe snapshots: `callback` runs now with the current one, then on
    /// every change until the returned subscription is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(&S) + 'static) -> Subscription {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);

        let callback: Callback<S> = Rc::new(RefCell::new(callback));
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::clone(&callback)));
        debug!("Store subscriber {} added", id);

        let current = self.current();
        (&mut *callback.borrow_mut())(&current);

        let weak: Weak<StoreInner<S, A>> = Rc::downgrade(&self.inner);
        let weak: Weak<dyn Unsubscribe> = weak;
        Subscription { id, store: weak }
    }

    /// An async view of the snapshots, starting from the current one.
    pub fn watch(&self) -> watch::Receiver<S> {
        self.inner.state.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn apply(&self, action: A) {
        let next = {
            let current = self.inner.state.borrow();
            (self.inner.reducer)(&*current, action)
        };
        if *self.inner.state.borrow() == next {
            trace!("Action left state unchanged");
            return;
        }
        self.inner.state.send_replace(next.clone());

        // Snapshot the list so callbacks may subscribe or unsubscribe.
        let subscribers: Vec<Callback<S>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in subscribers {
            (&mut *callback.borrow_mut())(&next);
        }
    }
}

impl<S, A> ActionDispatcher<A> for Store<S, A>
where
    S: Clone + PartialEq + 'static,
    A: 'static,
{
    fn dispatch(&self, action: A) {
        self.inner.pending.borrow_mut().push_back(action);
        if self.inner.dispatching.replace(true) {
            debug!("Action queued behind the current dispatch");
            return;
        }
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            match next {
                Some(action) => self.apply(action),
                None => break,
            }
        }
        self.inner.dispatching.set(false);
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: u64);
}

impl<S, A> Unsubscribe for StoreInner<S, A> {
    fn unsubscribe(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

/// Keeps a store subscription alive. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    store: Weak<dyn Unsubscribe>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
            debug!("Store subscriber {} removed", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

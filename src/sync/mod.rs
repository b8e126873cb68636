//! # Sync Controllers
//!
//! Controllers keep a host in step with a store, in both directions:
//!
//! ```text
//!            ┌────────────── Store ◀───────────────┐
//!            │ snapshot                 corrective │ action
//!            ▼                                     │
//!   on_state_changed ──▶ reconcile ──▶ host   host_event(..)
//!                                       │          ▲
//!                                       └─gesture──┘
//! ```
//!
//! - [`stack`]: navigation stacks (ledger + pop detection)
//! - [`tab`]: one selected tab out of a fixed set
//! - [`modal`]: zero or one presented modal
//!
//! A [`Binding`] owns a controller and its store subscription. Host
//! notifications go through [`Binding::host_event`], which releases the
//! controller before dispatching, so the echoed snapshot can re-enter the
//! controller and find the ledger already trimmed.

pub mod modal;
pub mod stack;
pub mod tab;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::core::store::{ActionDispatcher, Store, Subscription};

pub use modal::ModalSyncController;
pub use stack::StackSyncController;
pub use tab::TabSyncController;

/// The state-facing half of a controller.
pub trait SyncController {
    type State;
    type Action;

    /// Bring the host in line with `state`. Returns whether the host was touched.
    fn on_state_changed(&mut self, state: &Self::State) -> bool;
}

/// A controller subscribed to a store.
///
/// Dropping the binding releases the subscription; the store never calls
/// into a controller that is gone.
pub struct Binding<C: SyncController> {
    controller: Rc<RefCell<C>>,
    dispatcher: Box<dyn ActionDispatcher<C::Action>>,
    subscription: Subscription,
}

impl<C> Binding<C>
where
    C: SyncController + 'static,
    C::State: Clone + PartialEq + 'static,
    C::Action: Clone + 'static,
{
    /// Subscribe `controller` to `store`. The current snapshot is applied
    /// before this returns.
    pub fn bind(store: &Store<C::State, C::Action>, controller: C) -> Self {
        let controller = Rc::new(RefCell::new(controller));
        let observer = Rc::clone(&controller);
        let subscription = store.subscribe(move |state| {
            observer.borrow_mut().on_state_changed(state);
        });
        info!("Controller bound to store (subscriber {})", subscription.id());
        Self {
            controller,
            dispatcher: Box::new(store.clone()),
            subscription,
        }
    }

    /// Run a host notification against the controller and dispatch whatever
    /// corrective action it produces. Returns that action.
    pub fn host_event(&self, handle: impl FnOnce(&mut C) -> Option<C::Action>) -> Option<C::Action> {
        let action = handle(&mut *self.controller.borrow_mut());
        if let Some(action) = &action {
            debug!("Dispatching corrective action from subscriber {}", self.subscription.id());
            self.dispatcher.dispatch(action.clone());
        }
        action
    }

    pub fn with_controller<R>(&self, read: impl FnOnce(&C) -> R) -> R {
        read(&self.controller.borrow())
    }
}

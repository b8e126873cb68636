//! # Actions
//!
//! Everything that can change navigation state becomes an action.
//! App code pushes a screen? That's `StackAction::Push(item)`.
//! The user swiped back two screens? The stack controller emits
//! `StackAction::PopItems(2)`.
//!
//! The `update()` functions take the current snapshot and an action, then
//! return the next snapshot. No side effects here. Views are reconciled
//! elsewhere, after the new snapshot is published.
//!
//! ```text
//! State + Action  →  update()  →  New State
//! ```
//!
//! Actions that would break a state invariant (a duplicate stack item, an
//! unknown tab) are logged and leave the state unchanged.

use log::warn;
use serde::{Deserialize, Serialize};

use super::host::Item;
use super::state::{ModalState, StackState, TabState, first_duplicate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackAction<I> {
    Push(I),
    /// Remove `n` items from the top. Saturates at an empty stack.
    PopItems(usize),
    PopToRoot,
    /// Pop everything above `item`.
    PopTo(I),
    SetItems(Vec<I>),
    SetAnimations(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabAction<I> {
    Select(I),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalAction<I> {
    Present(I),
    Dismiss,
}

pub fn update_stack<I: Item>(state: &StackState<I>, action: StackAction<I>) -> StackState<I> {
    let items = state.items();
    match action {
        StackAction::Push(item) => {
            if state.contains(&item) {
                warn!("Ignoring push of {:?}: already on the stack", item);
                return state.clone();
            }
            let mut next = items.to_vec();
            next.push(item);
            state.with_items_unchecked(next)
        }
        StackAction::PopItems(count) => {
            let keep = items.len().saturating_sub(count);
            state.with_items_unchecked(items[..keep].to_vec())
        }
        StackAction::PopToRoot => state.with_items_unchecked(items.iter().take(1).cloned().collect()),
        StackAction::PopTo(item) => match items.iter().position(|i| *i == item) {
            Some(at) => state.with_items_unchecked(items[..=at].to_vec()),
            None => {
                warn!("Ignoring pop to {:?}: not on the stack", item);
                state.clone()
            }
        },
        StackAction::SetItems(next) => {
            if let Some(dup) = first_duplicate(&next) {
                warn!("Ignoring stack replacement: {:?} appears more than once", dup);
                return state.clone();
            }
            state.with_items_unchecked(next)
        }
        StackAction::SetAnimations(enabled) => state.clone().with_animations(enabled),
    }
}

pub fn update_tab<I: Item>(state: &TabState<I>, action: TabAction<I>) -> TabState<I> {
    match action {
        TabAction::Select(item) => {
            if !state.tabs().contains(&item) {
                warn!("Ignoring selection of unknown tab {:?}", item);
                return state.clone();
            }
            state.with_selected_unchecked(item)
        }
    }
}

pub fn update_modal<I: Item>(state: &ModalState<I>, action: ModalAction<I>) -> ModalState<I> {
    let presented = match action {
        ModalAction::Present(item) => Some(item),
        ModalAction::Dismiss => None,
    };
    ModalState {
        presented,
        animations_enabled: state.animations_enabled,
    }
}

//! # Navigation State
//!
//! Immutable snapshots of what the navigation UI should look like. A change
//! always produces a whole new snapshot (see the `action::update_*` reducers); controllers
//! only ever read the latest one.
//!
//! ```text
//! StackState  { items: [Root, Detail], animations_enabled }
//! TabState    { tabs: [Home, Search, Profile], selected: Search }
//! ModalState  { presented: Some(Compose), animations_enabled }
//! ```
//!
//! Stack items are unique: the constructors refuse anything else, so every
//! snapshot a controller sees upholds the invariant the ledger relies on.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::host::Item;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError<I> {
    /// The item appears more than once in a stack.
    DuplicateItem(I),
    /// The selected tab is not one of the tabs.
    UnknownTab(I),
    /// A tab state needs at least one tab.
    NoTabs,
}

impl<I: fmt::Debug> fmt::Display for StateError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::DuplicateItem(item) => write!(f, "item {item:?} appears more than once"),
            StateError::UnknownTab(item) => write!(f, "{item:?} is not one of the tabs"),
            StateError::NoTabs => write!(f, "tab state has no tabs"),
        }
    }
}

impl<I: fmt::Debug> std::error::Error for StateError<I> {}

/// Returns the first repeated item, if any.
pub(crate) fn first_duplicate<I: Item>(items: &[I]) -> Option<&I> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().find(|item| !seen.insert(*item))
}

// ============================================================================
// Stack
// ============================================================================

/// Serialize-only: deserializing would skip the uniqueness check in [`StackState::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackState<I> {
    items: Vec<I>,
    animations_enabled: bool,
}

impl<I: Item> StackState<I> {
    pub fn new(items: Vec<I>) -> Result<Self, StateError<I>> {
        if let Some(dup) = first_duplicate(&items) {
            return Err(StateError::DuplicateItem(dup.clone()));
        }
        Ok(Self {
            items,
            animations_enabled: true,
        })
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            animations_enabled: true,
        }
    }

    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    pub fn top(&self) -> Option<&I> {
        self.items.last()
    }

    pub fn contains(&self, item: &I) -> bool {
        self.items.contains(item)
    }

    /// Same flags, different items. Callers have already checked uniqueness.
    pub(crate) fn with_items_unchecked(&self, items: Vec<I>) -> Self {
        Self {
            items,
            animations_enabled: self.animations_enabled,
        }
    }
}

impl<I: Item> Default for StackState<I> {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Tabs
// ============================================================================

/// Serialize-only for the same reason as [`StackState`]: build it with [`TabState::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabState<I> {
    tabs: Vec<I>,
    selected: I,
}

impl<I: Item> TabState<I> {
    pub fn new(tabs: Vec<I>, selected: I) -> Result<Self, StateError<I>> {
        if tabs.is_empty() {
            return Err(StateError::NoTabs);
        }
        if let Some(dup) = first_duplicate(&tabs) {
            return Err(StateError::DuplicateItem(dup.clone()));
        }
        if !tabs.contains(&selected) {
            return Err(StateError::UnknownTab(selected));
        }
        Ok(Self { tabs, selected })
    }

    /// Select the first tab.
    pub fn first_selected(tabs: Vec<I>) -> Result<Self, StateError<I>> {
        let selected = tabs.first().cloned().ok_or(StateError::NoTabs)?;
        Self::new(tabs, selected)
    }

    pub fn tabs(&self) -> &[I] {
        &self.tabs
    }

    pub fn selected(&self) -> &I {
        &self.selected
    }

    pub fn selected_index(&self) -> usize {
        // `new` guarantees the selection is one of the tabs.
        self.tabs
            .iter()
            .position(|t| *t == self.selected)
            .unwrap_or_default()
    }

    pub(crate) fn with_selected_unchecked(&self, selected: I) -> Self {
        Self {
            tabs: self.tabs.clone(),
            selected,
        }
    }
}

// ============================================================================
// Modal
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState<I> {
    pub presented: Option<I>,
    pub animations_enabled: bool,
}

impl<I> ModalState<I> {
    pub fn hidden() -> Self {
        Self {
            presented: None,
            animations_enabled: true,
        }
    }

    pub fn presenting(item: I) -> Self {
        Self {
            presented: Some(item),
            animations_enabled: true,
        }
    }
}

impl<I> Default for ModalState<I> {
    fn default() -> Self {
        Self::hidden()
    }
}

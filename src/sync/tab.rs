//! # Tab Synchronization
//!
//! One selected tab out of a fixed set. The tab views are materialized once
//! through the reconciler (so a changed tab set keeps the views of surviving
//! tabs), then selection changes only move the host's selection.
//!
//! Taps are host-initiated and observed directly: [`TabSyncController::on_host_selected`]
//! records the new selection and returns the matching `Select` action, so the
//! echoed snapshot is a no-op.

use log::{debug, info, trace};

use crate::core::action::TabAction;
use crate::core::host::{Item, TabHost, ViewFactory};
use crate::core::ledger::OrderedLedger;
use crate::core::reconcile::reconcile;
use crate::core::state::TabState;

use super::{Binding, SyncController};

pub struct TabSyncController<I, H: TabHost, F> {
    host: H,
    factory: F,
    ledger: OrderedLedger<I, H::View>,
    selected: Option<I>,
}

impl<I, H, F> TabSyncController<I, H, F>
where
    I: Item,
    H: TabHost,
    F: ViewFactory<I, H::View>,
{
    pub fn attach(host: H, factory: F) -> Self {
        info!("Tab controller attached");
        Self {
            host,
            factory,
            ledger: OrderedLedger::new(),
            selected: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn selected(&self) -> Option<&I> {
        self.selected.as_ref()
    }

    pub fn ledger(&self) -> &OrderedLedger<I, H::View> {
        &self.ledger
    }

    /// Apply a snapshot. Returns whether the host was touched.
    pub fn apply_state(&mut self, state: &TabState<I>) -> bool {
        let mut touched = false;
        if !self.ledger.matches_items(state.tabs()) {
            let old = std::mem::take(&mut self.ledger);
            self.ledger = reconcile(old, state.tabs(), &mut self.factory);
            self.host.set_tabs(self.ledger.views().cloned().collect());
            // A fresh tab set carries no selection on the host.
            self.selected = None;
            touched = true;
        }

        if self.selected.as_ref() == Some(state.selected()) {
            trace!("Tab selection unchanged");
            return touched;
        }
        self.host.select(state.selected_index());
        if let Some(previous) = self.selected.replace(state.selected().clone()) {
            debug!("Tab {:?} hidden, {:?} shown", previous, state.selected());
        }
        true
    }

    /// The user tapped the tab at `index`.
    pub fn on_host_selected(&mut self, index: usize) -> Option<TabAction<I>> {
        let Some((item, _)) = self.ledger.iter().nth(index) else {
            debug!("Tap on unknown tab index {}, ignoring", index);
            return None;
        };
        if self.selected.as_ref() == Some(item) {
            return None;
        }
        let item = item.clone();
        debug!("Host selected tab {:?}", item);
        self.selected = Some(item.clone());
        Some(TabAction::Select(item))
    }
}

impl<I, H, F> SyncController for TabSyncController<I, H, F>
where
    I: Item,
    H: TabHost,
    F: ViewFactory<I, H::View>,
{
    type State = TabState<I>;
    type Action = TabAction<I>;

    fn on_state_changed(&mut self, state: &TabState<I>) -> bool {
        self.apply_state(state)
    }
}

impl<I, H, F> Binding<TabSyncController<I, H, F>>
where
    I: Item + 'static,
    H: TabHost + 'static,
    F: ViewFactory<I, H::View> + 'static,
{
    pub fn tab_selected(&self, index: usize) -> Option<TabAction<I>> {
        self.host_event(|controller| controller.on_host_selected(index))
    }
}

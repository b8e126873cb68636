//! # Stack Synchronization
//!
//! Drives a [`HostStack`] from [`StackState`] snapshots and turns back
//! gestures the host performed on its own into `PopItems` actions.
//!
//! ```text
//! host:   [login, settings │ A, B, C]
//!          ignored prefix  │ ledger (managed)
//! ```
//!
//! Views that were on the host before `attach` form the ignored prefix. They
//! are passed through unchanged on every replace and never enter the ledger.
//!
//! ## Pop detection
//!
//! When a transition completes from `C` to `A`, both tracked, with `A` below
//! `C`, the host has already removed `B` and `C`. The ledger is trimmed to
//! end at `A` right away and `PopItems(2)` is returned; when the store echoes
//! `[A]` back, the ledger already matches and the host is left alone.

use log::{debug, info, trace, warn};

use crate::core::action::StackAction;
use crate::core::host::{HostStack, Item, ObserverId, ViewFactory};
use crate::core::ledger::OrderedLedger;
use crate::core::reconcile::reconcile;
use crate::core::state::StackState;

use super::{Binding, SyncController};

pub struct StackSyncController<I, H: HostStack, F> {
    host: H,
    factory: F,
    ledger: OrderedLedger<I, H::View>,
    ignored_prefix_count: usize,
    observer: ObserverId,
    integrity_warnings: usize,
}

impl<I, H, F> StackSyncController<I, H, F>
where
    I: Item,
    H: HostStack,
    F: ViewFactory<I, H::View>,
{
    /// Take over the host above whatever it currently shows.
    pub fn attach(mut host: H, factory: F) -> Self {
        let ignored_prefix_count = host.current_views().len();
        let observer = ObserverId::next();
        host.set_transition_observer(observer);
        info!(
            "Stack controller {} attached above {} unmanaged views",
            observer, ignored_prefix_count
        );
        Self {
            host,
            factory,
            ledger: OrderedLedger::new(),
            ignored_prefix_count,
            observer,
            integrity_warnings: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn ledger(&self) -> &OrderedLedger<I, H::View> {
        &self.ledger
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn ignored_prefix_count(&self) -> usize {
        self.ignored_prefix_count
    }

    /// How many times the host was found reporting to someone else.
    pub fn integrity_warnings(&self) -> usize {
        self.integrity_warnings
    }

    /// Apply a snapshot. Returns whether the host stack was replaced.
    pub fn apply_state(&mut self, state: &StackState<I>) -> bool {
        self.check_integrity();
        if self.ledger.matches_items(state.items()) {
            trace!("Stack unchanged at {} items", state.items().len());
            return false;
        }

        let current = self.host.current_views();
        let animated = !current.is_empty() && self.host.animations_enabled() && state.animations_enabled();

        let old = std::mem::take(&mut self.ledger);
        self.ledger = reconcile(old, state.items(), &mut self.factory);

        let mut views: Vec<H::View> = current.into_iter().take(self.ignored_prefix_count).collect();
        views.extend(self.ledger.views().cloned());
        debug!(
            "Replacing host stack with {} views ({} unmanaged), animated: {}",
            views.len(),
            views.len() - self.ledger.len(),
            animated
        );
        self.host.replace(views, animated);
        true
    }

    /// A host transition finished, moving from `from` to `to`.
    ///
    /// Returns `PopItems(n)` when it was a back navigation between two
    /// tracked views; the ledger has then already dropped the popped entries.
    pub fn on_transition_completed(&mut self, from: &H::View, to: &H::View) -> Option<StackAction<I>> {
        self.check_integrity();
        let Some(from_index) = self.ledger.position_of_view(from) else {
            debug!("Transition from untracked view {:?}, ignoring", from);
            return None;
        };
        let Some(to_index) = self.ledger.position_of_view(to) else {
            debug!("Transition to untracked view {:?}, ignoring", to);
            return None;
        };
        if from_index <= to_index {
            trace!("Forward transition {} -> {}", from_index, to_index);
            return None;
        }
        if from_index + 1 != self.ledger.len() {
            warn!(
                "Host transition started at position {} but the tracked top is {}",
                from_index,
                self.ledger.len() - 1
            );
        }

        let pop_count = self.ledger.len() - (to_index + 1);
        let popped = self.ledger.pop_last(pop_count);
        info!(
            "Host popped {:?}; emitting PopItems({})",
            popped.iter().map(|(item, _)| item).collect::<Vec<_>>(),
            pop_count
        );
        Some(StackAction::PopItems(pop_count))
    }

    /// The host revealed `target`; the tracked top is taken as the origin.
    pub fn on_host_popped_to(&mut self, target: &H::View) -> Option<StackAction<I>> {
        let top = self.ledger.last().map(|(_, view)| view.clone())?;
        self.on_transition_completed(&top, target)
    }

    fn check_integrity(&mut self) {
        match self.host.transition_observer() {
            Some(id) if id == self.observer => {}
            other => {
                self.integrity_warnings += 1;
                warn!(
                    "Host reports transitions to {:?} instead of {}; back gestures will not reach the store",
                    other, self.observer
                );
            }
        }
    }
}

impl<I, H, F> SyncController for StackSyncController<I, H, F>
where
    I: Item,
    H: HostStack,
    F: ViewFactory<I, H::View>,
{
    type State = StackState<I>;
    type Action = StackAction<I>;

    fn on_state_changed(&mut self, state: &StackState<I>) -> bool {
        self.apply_state(state)
    }
}

impl<I, H, F> Binding<StackSyncController<I, H, F>>
where
    I: Item + 'static,
    H: HostStack + 'static,
    F: ViewFactory<I, H::View> + 'static,
{
    pub fn transition_completed(&self, from: &H::View, to: &H::View) -> Option<StackAction<I>> {
        self.host_event(|controller| controller.on_transition_completed(from, to))
    }

    pub fn host_popped_to(&self, target: &H::View) -> Option<StackAction<I>> {
        self.host_event(|controller| controller.on_host_popped_to(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::ViewHandle;
    use crate::headless::{MemoryStack, MemoryView, MemoryViewFactory};
    use crate::test_support::stack;

    fn attach(host: &MemoryStack) -> (StackSyncController<&'static str, MemoryStack, MemoryViewFactory>, MemoryViewFactory) {
        let factory = MemoryViewFactory::new();
        (StackSyncController::attach(host.clone(), factory.clone()), factory)
    }

    #[test]
    fn test_first_display_is_unanimated() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        assert!(controller.apply_state(&stack(&["a"])));
        let replacements = host.replacements();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].labels, vec!["a"]);
        assert!(!replacements[0].animated);
    }

    #[test]
    fn test_unchanged_items_do_not_replace() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a", "b"]));
        assert!(!controller.apply_state(&stack(&["a", "b"])));
        assert!(!controller.apply_state(&stack(&["a", "b"]).with_animations(false)));
        assert_eq!(host.replace_count(), 1);
    }

    #[test]
    fn test_animation_policy() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a"]));

        controller.apply_state(&stack(&["a", "b"]));
        assert!(host.replacements()[1].animated);

        controller.apply_state(&stack(&["a"]).with_animations(false));
        assert!(!host.replacements()[2].animated);

        host.set_animations_enabled(false);
        controller.apply_state(&stack(&["a", "c"]));
        assert!(!host.replacements()[3].animated);
    }

    #[test]
    fn test_prefix_views_are_preserved() {
        let login = MemoryView::detached("login");
        let host = MemoryStack::with_views(vec![login.clone()]);
        let (mut controller, _) = attach(&host);
        assert_eq!(controller.ignored_prefix_count(), 1);

        controller.apply_state(&stack(&["a", "b"]));
        assert_eq!(host.labels(), vec!["login", "a", "b"]);
        assert!(host.views()[0].is_same(&login));
        // The host was not empty, so even the first managed push animates.
        assert!(host.replacements()[0].animated);

        controller.apply_state(&stack(&[]));
        assert_eq!(host.labels(), vec!["login"]);
    }

    #[test]
    fn test_pop_detection_truncates_and_emits_once() {
        let host = MemoryStack::new();
        let (mut controller, factory) = attach(&host);
        controller.apply_state(&stack(&["a", "b", "c"]));

        let (from, to) = host.swipe_back(2).unwrap();
        let action = controller.on_transition_completed(&from, &to);
        assert_eq!(action, Some(StackAction::PopItems(2)));
        assert!(controller.ledger().matches_items(&["a"]));

        // The echoed state is already tracked.
        assert!(!controller.apply_state(&stack(&["a"])));
        assert_eq!(host.replace_count(), 1);
        assert_eq!(factory.made(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_forward_and_untracked_transitions_are_ignored() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a", "b"]));
        let views = host.views();

        assert_eq!(controller.on_transition_completed(&views[0], &views[1]), None);

        let (from, to) = host.push_unmanaged(MemoryView::detached("alert")).unwrap();
        assert_eq!(controller.on_transition_completed(&from, &to), None);
        assert!(controller.ledger().matches_items(&["a", "b"]));
    }

    #[test]
    fn test_host_popped_to_uses_tracked_top() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a", "b", "c"]));
        let a = host.views()[0].clone();
        assert_eq!(controller.on_host_popped_to(&a), Some(StackAction::PopItems(2)));
        assert_eq!(controller.on_host_popped_to(&a), None);
    }

    #[test]
    fn test_hijacked_observer_is_reported_not_fatal() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        assert_eq!(host.observer(), Some(controller.observer()));

        host.override_observer(None);
        assert!(controller.apply_state(&stack(&["a"])));
        assert_eq!(controller.integrity_warnings(), 1);
        assert_eq!(host.labels(), vec!["a"]);
    }

    #[test]
    fn test_transition_from_untracked_view_is_ignored() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a", "b"]));
        let a = host.views()[0].clone();

        let stray = MemoryView::detached("b");
        assert_eq!(controller.on_transition_completed(&stray, &a), None);
        assert!(controller.ledger().matches_items(&["a", "b"]));
    }

    #[test]
    fn test_pop_from_below_top_trims_everything_above_target() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a", "b", "c", "d"]));
        let views = host.views();

        let action = controller.on_transition_completed(&views[2], &views[0]);
        assert_eq!(action, Some(StackAction::PopItems(3)));
        assert!(controller.ledger().matches_items(&["a"]));
    }

    #[test]
    fn test_swipe_into_prefix_is_ignored() {
        let host = MemoryStack::with_views(vec![MemoryView::detached("login")]);
        let (mut controller, _) = attach(&host);
        controller.apply_state(&stack(&["a"]));

        let (from, to) = host.swipe_back(1).unwrap();
        assert_eq!(to.label(), "login");
        assert_eq!(controller.on_transition_completed(&from, &to), None);
        assert!(controller.ledger().matches_items(&["a"]));
    }

    #[test]
    fn test_on_state_changed_reports_host_touch() {
        let host = MemoryStack::new();
        let (mut controller, _) = attach(&host);
        assert!(SyncController::on_state_changed(&mut controller, &stack(&["a"])));
        assert!(!SyncController::on_state_changed(&mut controller, &stack(&["a"])));
    }
}

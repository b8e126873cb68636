//! # Modal Synchronization
//!
//! Zero or one presented modal. A changed item dismisses the old view and
//! presents a freshly made one; an interactive dismissal on the host (a
//! swipe-down, a tap outside) is turned into `ModalAction::Dismiss`.
//!
//! This is pop detection with a boolean: the only question is whether the
//! tracked view is still up.

use log::{debug, info, trace};

use crate::core::action::ModalAction;
use crate::core::host::{Item, ModalHost, ViewFactory, ViewHandle};
use crate::core::state::ModalState;

use super::{Binding, SyncController};

pub struct ModalSyncController<I, H: ModalHost, F> {
    host: H,
    factory: F,
    presented: Option<(I, H::View)>,
}

impl<I, H, F> ModalSyncController<I, H, F>
where
    I: Item,
    H: ModalHost,
    F: ViewFactory<I, H::View>,
{
    pub fn attach(host: H, factory: F) -> Self {
        info!("Modal controller attached");
        Self {
            host,
            factory,
            presented: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn presented(&self) -> Option<&I> {
        self.presented.as_ref().map(|(item, _)| item)
    }

    /// Apply a snapshot. Returns whether the host was touched.
    pub fn apply_state(&mut self, state: &ModalState<I>) -> bool {
        if self.presented() == state.presented.as_ref() {
            trace!("Modal unchanged");
            return false;
        }
        let animated = self.host.animations_enabled() && state.animations_enabled;

        if let Some((item, _)) = self.presented.take() {
            // Only the incoming modal animates when one replaces another.
            let dismiss_animated = animated && state.presented.is_none();
            debug!("Dismissing modal {:?}", item);
            self.host.dismiss(dismiss_animated);
        }
        if let Some(item) = &state.presented {
            let view = self.factory.make(item);
            debug!("Presenting modal {:?}", item);
            self.host.present(view.clone(), animated);
            self.presented = Some((item.clone(), view));
        }
        true
    }

    /// The host dismissed `view` on its own.
    pub fn on_host_dismissed(&mut self, view: &H::View) -> Option<ModalAction<I>> {
        match &self.presented {
            Some((_, tracked)) if tracked.is_same(view) => {}
            _ => {
                debug!("Dismissal of untracked view {:?}, ignoring", view);
                return None;
            }
        }
        if let Some((item, _)) = self.presented.take() {
            info!("Host dismissed {:?}; emitting Dismiss", item);
        }
        Some(ModalAction::Dismiss)
    }

    /// Compare the tracked modal with what the host shows. For hosts that do
    /// not report dismissals themselves.
    pub fn detect_dismissal(&mut self) -> Option<ModalAction<I>> {
        let tracked = self.presented.as_ref().map(|(_, view)| view.clone())?;
        match self.host.presented() {
            Some(shown) if shown.is_same(&tracked) => None,
            _ => self.on_host_dismissed(&tracked),
        }
    }
}

impl<I, H, F> SyncController for ModalSyncController<I, H, F>
where
    I: Item,
    H: ModalHost,
    F: ViewFactory<I, H::View>,
{
    type State = ModalState<I>;
    type Action = ModalAction<I>;

    fn on_state_changed(&mut self, state: &ModalState<I>) -> bool {
        self.apply_state(state)
    }
}

impl<I, H, F> Binding<ModalSyncController<I, H, F>>
where
    I: Item + 'static,
    H: ModalHost + 'static,
    F: ViewFactory<I, H::View> + 'static,
{
    pub fn modal_dismissed(&self, view: &H::View) -> Option<ModalAction<I>> {
        self.host_event(|controller| controller.on_host_dismissed(view))
    }

    pub fn detect_dismissal(&self) -> Option<ModalAction<I>> {
        self.host_event(|controller| controller.detect_dismissal())
    }
}

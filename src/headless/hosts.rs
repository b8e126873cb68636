//! In-memory hosts. Each is a cheap, cloneable handle to shared state, the
//! way a native adapter holds a reference to its platform container: the
//! controller owns one clone, the test or replay driver keeps another to
//! simulate gestures and inspect calls.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::view::MemoryViewHandle;
use crate::core::host::{HostStack, ModalHost, ObserverId, TabHost};

fn labels(views: &[MemoryViewHandle]) -> Vec<String> {
    views.iter().map(|v| v.label().to_string()).collect()
}

// ============================================================================
// Navigation stack
// ============================================================================

/// One `replace` call as the host received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub labels: Vec<String>,
    pub animated: bool,
}

#[derive(Debug)]
struct StackInner {
    views: Vec<MemoryViewHandle>,
    replacements: Vec<Replacement>,
    observer: Option<ObserverId>,
    animations_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryStack {
    inner: Rc<RefCell<StackInner>>,
}

impl MemoryStack {
    pub fn new() -> Self {
        Self::with_views(Vec::new())
    }

    /// A host that already shows `views` before any controller attaches.
    pub fn with_views(views: Vec<MemoryViewHandle>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StackInner {
                views,
                replacements: Vec::new(),
                observer: None,
                animations_enabled: true,
            })),
        }
    }

    pub fn set_animations_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().animations_enabled = enabled;
    }

    pub fn views(&self) -> Vec<MemoryViewHandle> {
        self.inner.borrow().views.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        labels(&self.inner.borrow().views)
    }

    pub fn replacements(&self) -> Vec<Replacement> {
        self.inner.borrow().replacements.clone()
    }

    pub fn replace_count(&self) -> usize {
        self.inner.borrow().replacements.len()
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.inner.borrow().observer
    }

    /// Simulate someone else registering for transition notifications.
    pub fn override_observer(&self, observer: Option<ObserverId>) {
        self.inner.borrow_mut().observer = observer;
    }

    /// Simulate a back gesture removing the top `count` views.
    ///
    /// Returns the completed transition `(from, to)`, or `None` when the
    /// stack is not deep enough to pop that far.
    pub fn swipe_back(&self, count: usize) -> Option<(MemoryViewHandle, MemoryViewHandle)> {
        let mut inner = self.inner.borrow_mut();
        if count == 0 || inner.views.len() <= count {
            return None;
        }
        let from = inner.views.last()?.clone();
        let keep = inner.views.len() - count;
        inner.views.truncate(keep);
        let to = inner.views.last()?.clone();
        Some((from, to))
    }

    /// Simulate the host pushing a view the controller does not manage.
    pub fn push_unmanaged(&self, view: MemoryViewHandle) -> Option<(MemoryViewHandle, MemoryViewHandle)> {
        let mut inner = self.inner.borrow_mut();
        let from = inner.views.last()?.clone();
        inner.views.push(view.clone());
        Some((from, view))
    }
}

impl Default for MemoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStack for MemoryStack {
    type View = MemoryViewHandle;

    fn current_views(&self) -> Vec<MemoryViewHandle> {
        self.views()
    }

    fn replace(&mut self, views: Vec<MemoryViewHandle>, animated: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.replacements.push(Replacement {
            labels: labels(&views),
            animated,
        });
        inner.views = views;
    }

    fn animations_enabled(&self) -> bool {
        self.inner.borrow().animations_enabled
    }

    fn set_transition_observer(&mut self, observer: ObserverId) {
        self.inner.borrow_mut().observer = Some(observer);
    }

    fn transition_observer(&self) -> Option<ObserverId> {
        self.observer()
    }
}

// ============================================================================
// Tab bar
// ============================================================================

#[derive(Debug, Default)]
struct TabInner {
    tabs: Vec<MemoryViewHandle>,
    selected: Option<usize>,
    select_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTabBar {
    inner: Rc<RefCell<TabInner>>,
}

impl MemoryTabBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<MemoryViewHandle> {
        self.inner.borrow().tabs.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        labels(&self.inner.borrow().tabs)
    }

    pub fn selected_label(&self) -> Option<String> {
        let inner = self.inner.borrow();
        let index = inner.selected?;
        inner.tabs.get(index).map(|v| v.label().to_string())
    }

    /// Selections requested through [`TabHost::select`], not taps.
    pub fn select_count(&self) -> usize {
        self.inner.borrow().select_count
    }

    /// Simulate the user tapping a tab. Returns false for a missing index.
    pub fn tap(&self, index: usize) -> bool {
        let mut inner = self.inner.borrow_mut();
        if index >= inner.tabs.len() {
            return false;
        }
        inner.selected = Some(index);
        true
    }
}

impl TabHost for MemoryTabBar {
    type View = MemoryViewHandle;

    fn set_tabs(&mut self, views: Vec<MemoryViewHandle>) {
        let mut inner = self.inner.borrow_mut();
        inner.tabs = views;
        inner.selected = None;
    }

    fn select(&mut self, index: usize) {
        let mut inner = self.inner.borrow_mut();
        inner.selected = Some(index);
        inner.select_count += 1;
    }

    fn selected_index(&self) -> Option<usize> {
        self.inner.borrow().selected
    }
}

// ============================================================================
// Modal presenter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalCall {
    Present { label: String, animated: bool },
    Dismiss { animated: bool },
}

#[derive(Debug)]
struct ModalInner {
    presented: Option<MemoryViewHandle>,
    calls: Vec<ModalCall>,
    animations_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryModalHost {
    inner: Rc<RefCell<ModalInner>>,
}

impl MemoryModalHost {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ModalInner {
                presented: None,
                calls: Vec::new(),
                animations_enabled: true,
            })),
        }
    }

    pub fn set_animations_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().animations_enabled = enabled;
    }

    pub fn calls(&self) -> Vec<ModalCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn presented_label(&self) -> Option<String> {
        self.inner
            .borrow()
            .presented
            .as_ref()
            .map(|v| v.label().to_string())
    }

    /// Simulate an interactive dismissal. Returns the view that went away.
    pub fn user_dismiss(&self) -> Option<MemoryViewHandle> {
        self.inner.borrow_mut().presented.take()
    }
}

impl Default for MemoryModalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalHost for MemoryModalHost {
    type View = MemoryViewHandle;

    fn present(&mut self, view: MemoryViewHandle, animated: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ModalCall::Present {
            label: view.label().to_string(),
            animated,
        });
        inner.presented = Some(view);
    }

    fn dismiss(&mut self, animated: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ModalCall::Dismiss { animated });
        inner.presented = None;
    }

    fn presented(&self) -> Option<MemoryViewHandle> {
        self.inner.borrow().presented.clone()
    }

    fn animations_enabled(&self) -> bool {
        self.inner.borrow().animations_enabled
    }
}

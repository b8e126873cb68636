//! # Trace Replay
//!
//! Runs a recorded navigation session against the headless hosts and
//! reports what the hosts saw. A trace is JSON:
//!
//! ```json
//! {
//!   "prefix": ["login"],
//!   "tabs": ["home", "search"],
//!   "steps": [
//!     { "set_stack": ["feed"] },
//!     { "push": "post-42" },
//!     { "swipe_back": 1 },
//!     { "tap_tab": 1 },
//!     { "present": "compose" },
//!     "user_dismiss"
//!   ]
//! }
//! ```
//!
//! App-side steps (`set_stack`, `push`, `pop`, `pop_to_root`, `select_tab`,
//! `present`, `dismiss`, `set_animations`) dispatch to the stores. User-side
//! steps (`swipe_back`, `tap_tab`, `user_dismiss`) act on the host first and
//! the controller reports back, so their corrective actions show up in the
//! report.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::action::{ModalAction, StackAction, TabAction, update_modal, update_stack, update_tab};
use crate::core::state::{ModalState, StackState, TabState};
use crate::core::store::{ActionDispatcher, Store};
use crate::headless::{
    MemoryModalHost, MemoryStack, MemoryTabBar, MemoryView, MemoryViewFactory, ModalCall, Replacement,
};
use crate::sync::{Binding, ModalSyncController, StackSyncController, TabSyncController};

// ============================================================================
// Trace format
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Host views present before the stack controller attaches.
    #[serde(default)]
    pub prefix: Vec<String>,
    /// Fixed tab set; the first tab starts selected. Empty = no tab bar.
    #[serde(default)]
    pub tabs: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    SetStack(Vec<String>),
    Push(String),
    Pop(usize),
    PopToRoot,
    /// User swipes back over `n` screens.
    SwipeBack(usize),
    SelectTab(String),
    /// User taps the tab at an index.
    TapTab(usize),
    Present(String),
    Dismiss,
    UserDismiss,
    SetAnimations(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Whether the hosts allow animations at all.
    pub animations: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self { animations: true }
    }
}

// ============================================================================
// Report
// ============================================================================

/// An action a controller derived from a host gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectiveAction {
    Stack(StackAction<String>),
    Tab(TabAction<String>),
    Modal(ModalAction<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Final stack snapshot.
    pub stack: Vec<String>,
    /// Labels on the host stack, prefix included.
    pub host_stack: Vec<String>,
    pub replacements: Vec<Replacement>,
    pub selected_tab: Option<String>,
    pub tab_selections: usize,
    pub presented: Option<String>,
    pub modal_calls: Vec<ModalCall>,
    pub corrective_actions: Vec<CorrectiveAction>,
    pub views_created: usize,
    pub integrity_warnings: usize,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// `step` is `None` when the trace header itself is invalid.
    InvalidTrace { step: Option<usize>, reason: String },
}

impl ReplayError {
    fn at(step: usize, reason: impl Into<String>) -> Self {
        ReplayError::InvalidTrace {
            step: Some(step),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "trace I/O error: {e}"),
            ReplayError::Parse(e) => write!(f, "trace parse error: {e}"),
            ReplayError::InvalidTrace { step: Some(step), reason } => {
                write!(f, "invalid trace at step {step}: {reason}")
            }
            ReplayError::InvalidTrace { step: None, reason } => write!(f, "invalid trace: {reason}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Io(e) => Some(e),
            ReplayError::Parse(e) => Some(e),
            ReplayError::InvalidTrace { .. } => None,
        }
    }
}

// ============================================================================
// Replay
// ============================================================================

pub fn load_trace(path: &Path) -> Result<Trace, ReplayError> {
    let contents = fs::read_to_string(path).map_err(ReplayError::Io)?;
    let trace = serde_json::from_str(&contents).map_err(ReplayError::Parse)?;
    info!("Loaded trace from {}", path.display());
    Ok(trace)
}

type StackBinding = Binding<StackSyncController<String, MemoryStack, MemoryViewFactory>>;
type TabBinding = Binding<TabSyncController<String, MemoryTabBar, MemoryViewFactory>>;
type ModalBinding = Binding<ModalSyncController<String, MemoryModalHost, MemoryViewFactory>>;
type Tabs = (MemoryTabBar, Store<TabState<String>, TabAction<String>>, TabBinding);

struct Session {
    stack_host: MemoryStack,
    stack_store: Store<StackState<String>, StackAction<String>>,
    stack: StackBinding,
    tabs: Option<Tabs>,
    modal_host: MemoryModalHost,
    modal_store: Store<ModalState<String>, ModalAction<String>>,
    modal: ModalBinding,
    factory: MemoryViewFactory,
    corrective_actions: Vec<CorrectiveAction>,
}

impl Session {
    fn start(trace: &Trace, options: &ReplayOptions) -> Result<Self, ReplayError> {
        let factory = MemoryViewFactory::new();

        let prefix = trace.prefix.iter().map(MemoryView::detached).collect();
        let stack_host = MemoryStack::with_views(prefix);
        stack_host.set_animations_enabled(options.animations);
        let stack_store = Store::new(StackState::empty(), update_stack::<String>);
        let stack = Binding::bind(
            &stack_store,
            StackSyncController::attach(stack_host.clone(), factory.clone()),
        );

        let tabs = if trace.tabs.is_empty() {
            None
        } else {
            let state = TabState::first_selected(trace.tabs.clone()).map_err(|e| ReplayError::InvalidTrace {
                step: None,
                reason: e.to_string(),
            })?;
            let bar = MemoryTabBar::new();
            let store = Store::new(state, update_tab::<String>);
            let binding = Binding::bind(&store, TabSyncController::attach(bar.clone(), factory.clone()));
            Some((bar, store, binding))
        };

        let modal_host = MemoryModalHost::new();
        modal_host.set_animations_enabled(options.animations);
        let modal_store = Store::new(ModalState::hidden(), update_modal::<String>);
        let modal = Binding::bind(
            &modal_store,
            ModalSyncController::attach(modal_host.clone(), factory.clone()),
        );

        Ok(Self {
            stack_host,
            stack_store,
            stack,
            tabs,
            modal_host,
            modal_store,
            modal,
            factory,
            corrective_actions: Vec::new(),
        })
    }

    fn run(&mut self, index: usize, step: &Step) -> Result<(), ReplayError> {
        debug!("Step {}: {:?}", index, step);
        match step {
            Step::SetStack(items) => {
                StackState::new(items.clone()).map_err(|e| ReplayError::at(index, e.to_string()))?;
                self.stack_store.dispatch(StackAction::SetItems(items.clone()));
            }
            Step::Push(item) => self.stack_store.dispatch(StackAction::Push(item.clone())),
            Step::Pop(count) => self.stack_store.dispatch(StackAction::PopItems(*count)),
            Step::PopToRoot => self.stack_store.dispatch(StackAction::PopToRoot),
            Step::SwipeBack(count) => {
                let (from, to) = self
                    .stack_host
                    .swipe_back(*count)
                    .ok_or_else(|| ReplayError::at(index, format!("cannot swipe back {count} screens")))?;
                if let Some(action) = self.stack.transition_completed(&from, &to) {
                    self.corrective_actions.push(CorrectiveAction::Stack(action));
                }
            }
            Step::SelectTab(item) => {
                let (_, store, _) = self.tab_bar(index)?;
                store.dispatch(TabAction::Select(item.clone()));
            }
            Step::TapTab(tab) => {
                let (bar, _, binding) = self.tab_bar(index)?;
                if !bar.tap(*tab) {
                    return Err(ReplayError::at(index, format!("no tab at index {tab}")));
                }
                if let Some(action) = binding.tab_selected(*tab) {
                    self.corrective_actions.push(CorrectiveAction::Tab(action));
                }
            }
            Step::Present(item) => self.modal_store.dispatch(ModalAction::Present(item.clone())),
            Step::Dismiss => self.modal_store.dispatch(ModalAction::Dismiss),
            Step::UserDismiss => {
                let view = self
                    .modal_host
                    .user_dismiss()
                    .ok_or_else(|| ReplayError::at(index, "no modal is presented"))?;
                if let Some(action) = self.modal.modal_dismissed(&view) {
                    self.corrective_actions.push(CorrectiveAction::Modal(action));
                }
            }
            Step::SetAnimations(enabled) => self.stack_store.dispatch(StackAction::SetAnimations(*enabled)),
        }
        Ok(())
    }

    fn tab_bar(&self, index: usize) -> Result<&Tabs, ReplayError> {
        self.tabs
            .as_ref()
            .ok_or_else(|| ReplayError::at(index, "trace declares no tabs"))
    }

    fn report(self) -> ReplayReport {
        let (selected_tab, tab_selections) = match &self.tabs {
            Some((bar, store, _)) => (Some(store.current().selected().clone()), bar.select_count()),
            None => (None, 0),
        };
        ReplayReport {
            stack: self.stack_store.current().items().to_vec(),
            host_stack: self.stack_host.labels(),
            replacements: self.stack_host.replacements(),
            selected_tab,
            tab_selections,
            presented: self.modal_store.current().presented,
            modal_calls: self.modal_host.calls(),
            corrective_actions: self.corrective_actions,
            views_created: self.factory.made_count(),
            integrity_warnings: self.stack.with_controller(|c| c.integrity_warnings()),
        }
    }
}

/// Replay `trace` from an empty stack and no modal.
pub fn replay(trace: &Trace, options: &ReplayOptions) -> Result<ReplayReport, ReplayError> {
    let mut session = Session::start(trace, options)?;
    for (index, step) in trace.steps.iter().enumerate() {
        session.run(index, step)?;
    }
    info!(
        "Replayed {} steps, {} corrective actions",
        trace.steps.len(),
        session.corrective_actions.len()
    );
    Ok(session.report())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(json: &str) -> Trace {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_step_json_forms() {
        let t = trace(r#"{ "steps": [{ "push": "a" }, "pop_to_root", { "swipe_back": 2 }, "user_dismiss"] }"#);
        assert_eq!(
            t.steps,
            vec![
                Step::Push("a".into()),
                Step::PopToRoot,
                Step::SwipeBack(2),
                Step::UserDismiss
            ]
        );
        assert!(t.prefix.is_empty());
        assert!(t.tabs.is_empty());
    }

    #[test]
    fn test_swipe_back_reports_pop() {
        let t = trace(r#"{ "steps": [{ "set_stack": ["a", "b", "c"] }, { "swipe_back": 2 }] }"#);
        let report = replay(&t, &ReplayOptions::default()).unwrap();

        assert_eq!(report.stack, vec!["a"]);
        assert_eq!(report.host_stack, vec!["a"]);
        assert_eq!(
            report.corrective_actions,
            vec![CorrectiveAction::Stack(StackAction::PopItems(2))]
        );
        // The echo of [a] does not replace the host again.
        assert_eq!(report.replacements.len(), 1);
        assert_eq!(report.views_created, 3);
    }

    #[test]
    fn test_prefix_survives_replacements() {
        let t = trace(r#"{ "prefix": ["login"], "steps": [{ "push": "a" }, { "push": "b" }, "pop_to_root"] }"#);
        let report = replay(&t, &ReplayOptions::default()).unwrap();

        assert_eq!(report.host_stack, vec!["login", "a"]);
        assert!(report.replacements.iter().all(|r| r.labels[0] == "login"));
        // Non-empty host stack from the start, so the first replace animates.
        assert!(report.replacements[0].animated);
    }

    #[test]
    fn test_no_animations_option() {
        let t = trace(r#"{ "steps": [{ "push": "a" }, { "push": "b" }, { "present": "m" }] }"#);
        let report = replay(&t, &ReplayOptions { animations: false }).unwrap();
        assert!(report.replacements.iter().all(|r| !r.animated));
        assert_eq!(
            report.modal_calls,
            vec![ModalCall::Present {
                label: "m".into(),
                animated: false
            }]
        );
    }

    #[test]
    fn test_tab_tap_and_select() {
        let t = trace(r#"{ "tabs": ["home", "search"], "steps": [{ "tap_tab": 1 }, { "select_tab": "home" }] }"#);
        let report = replay(&t, &ReplayOptions::default()).unwrap();
        assert_eq!(report.selected_tab.as_deref(), Some("home"));
        assert_eq!(
            report.corrective_actions,
            vec![CorrectiveAction::Tab(TabAction::Select("search".into()))]
        );
        // Initial selection plus the programmatic one; the tap needs none.
        assert_eq!(report.tab_selections, 2);
    }

    #[test]
    fn test_user_dismiss_clears_modal() {
        let t = trace(r#"{ "steps": [{ "present": "compose" }, "user_dismiss"] }"#);
        let report = replay(&t, &ReplayOptions::default()).unwrap();
        assert_eq!(report.presented, None);
        assert_eq!(
            report.corrective_actions,
            vec![CorrectiveAction::Modal(ModalAction::Dismiss)]
        );
        // Only the present call; the host already removed the view.
        assert_eq!(report.modal_calls.len(), 1);
    }

    #[test]
    fn test_invalid_steps() {
        let cases = [
            r#"{ "steps": [{ "set_stack": ["a", "a"] }] }"#,
            r#"{ "steps": [{ "swipe_back": 1 }] }"#,
            r#"{ "steps": [{ "tap_tab": 0 }] }"#,
            r#"{ "steps": ["user_dismiss"] }"#,
        ];
        for json in cases {
            let err = replay(&trace(json), &ReplayOptions::default()).unwrap_err();
            assert!(
                matches!(err, ReplayError::InvalidTrace { step: Some(0), .. }),
                "{json}: {err}"
            );
        }
    }

    #[test]
    fn test_duplicate_tabs_rejected() {
        let err = replay(&trace(r#"{ "tabs": ["a", "a"] }"#), &ReplayOptions::default()).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTrace { step: None, .. }));
    }
}

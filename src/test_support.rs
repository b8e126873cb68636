//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::rc::Rc;

use crate::core::host::ViewFactory;
use crate::core::state::StackState;

pub type TestView = Rc<String>;

/// Records which items it was asked to make a view for.
#[derive(Debug, Default)]
pub struct CountingFactory {
    pub made: Vec<&'static str>,
}

impl ViewFactory<&'static str, TestView> for CountingFactory {
    fn make(&mut self, item: &&'static str) -> TestView {
        self.made.push(*item);
        Rc::new(format!("view-{item}"))
    }
}

/// A stack snapshot from unique items.
pub fn stack(items: &[&'static str]) -> StackState<&'static str> {
    StackState::new(items.to_vec()).expect("test stacks are unique")
}

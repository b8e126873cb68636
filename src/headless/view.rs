use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::core::host::ViewFactory;

/// A stand-in for a native view: an id and the label of the item it shows.
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryView {
    id: u64,
    label: String,
}

pub type MemoryViewHandle = Rc<MemoryView>;

impl MemoryView {
    /// A view no factory made, e.g. a host-owned screen below the managed stack.
    pub fn detached(label: impl Into<String>) -> MemoryViewHandle {
        Rc::new(Self {
            id: 0,
            label: label.into(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Makes `MemoryView`s and records every call. Clones share the id counter
/// and the record.
#[derive(Debug, Clone)]
pub struct MemoryViewFactory {
    next_id: Rc<Cell<u64>>,
    made: Rc<RefCell<Vec<String>>>,
}

impl MemoryViewFactory {
    pub fn new() -> Self {
        Self {
            next_id: Rc::new(Cell::new(1)),
            made: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Labels of every view made so far, in call order.
    pub fn made(&self) -> Vec<String> {
        self.made.borrow().clone()
    }

    pub fn made_count(&self) -> usize {
        self.made.borrow().len()
    }
}

impl Default for MemoryViewFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: fmt::Display> ViewFactory<I, MemoryViewHandle> for MemoryViewFactory {
    fn make(&mut self, item: &I) -> MemoryViewHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let label = item.to_string();
        self.made.borrow_mut().push(label.clone());
        Rc::new(MemoryView { id, label })
    }
}

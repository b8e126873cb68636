//! # Headless Adapter
//!
//! In-memory implementations of the host capabilities. They record every
//! call the controllers make and expose the gestures a user could perform
//! (back swipes, tab taps, interactive dismissals), which is all the replay
//! tool and the tests need from a "GUI".
//!
//! A native adapter has the same shape: wrap the platform container in a
//! handle, implement the host trait, forward its transition callbacks to
//! the matching `Binding` method.

mod hosts;
mod view;

pub use hosts::{MemoryModalHost, MemoryStack, MemoryTabBar, ModalCall, Replacement};
pub use view::{MemoryView, MemoryViewFactory, MemoryViewHandle};

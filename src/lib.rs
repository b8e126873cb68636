//! # navsync
//!
//! Keeps a host's navigation containers (stacks, tab bars, modal
//! presenters) in step with a state store.
//!
//! The store owns *what* is on screen as plain items. Controllers in
//! [`sync`] map items to host views through an ordered ledger, reuse views
//! for items that stay, create views only for new items, and report
//! host-initiated changes (back swipes, tab taps, interactive dismissals)
//! back to the store as ordinary actions.
//!
//! - [`core`]: items, views, ledger, reconciliation, state and store
//! - [`sync`]: stack, tab and modal controllers plus store bindings
//! - [`headless`]: in-memory hosts for tests and the replay tool
//! - [`replay`]: runs a JSON navigation trace against the headless hosts

pub mod core;
pub mod headless;
pub mod replay;
pub mod sync;

#[cfg(test)]
pub mod test_support;

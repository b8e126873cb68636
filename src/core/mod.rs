//! # Core Synchronization Logic
//!
//! Host-agnostic building blocks. Nothing here knows about a concrete GUI
//! framework; hosts and view factories come in through the traits in
//! [`host`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (snapshots)    │
//!                    │  • Action + update()    │
//!                    │  • Ledger + reconcile() │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  Headless  │      │   Native   │      │   Replay   │
//!     │  Adapter   │      │  Adapter   │      │    CLI     │
//!     │ (in-mem)   │      │ (external) │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`host`]: capabilities the core consumes (`ViewFactory`, `HostStack`, ...)
//! - [`ledger`]: `OrderedLedger`, the item → view map in navigation order
//! - [`reconcile`]: builds the next ledger from the previous one
//! - [`state`]: `StackState`, `TabState`, `ModalState` snapshots
//! - [`action`]: actions and the pure `update_*` reducers
//! - [`store`]: the observable store that publishes snapshots
//! - [`config`]: settings for the `navsync` tool

pub mod action;
pub mod config;
pub mod host;
pub mod ledger;
pub mod reconcile;
pub mod state;
pub mod store;

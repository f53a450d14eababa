//! # sync-core
//!
//! Pure logic for itemsync (no I/O, instant tests).
//!
//! This crate implements the status machine that serializes operations on a
//! synced item and decides which completions are still authoritative,
//! without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (remote store, local files) is performed by `sync-client`,
//! which interprets the actions produced by these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod machine;
pub mod queue;
pub mod status;

pub use machine::{Action, Event, Request, Settlement, StatusMachine};
pub use queue::{OpQueue, QueuedOp};
pub use status::{OpId, OpKind, StatusKind, SyncStatus};

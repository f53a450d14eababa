//! # itemsync-scenarios
//!
//! Scenario harness for itemsync.
//!
//! This crate drives real item actors against in-memory and on-disk stores
//! to check the properties callers rely on:
//! - One remote call per item at a time
//! - Queued uploads run in issue order, whatever the previous outcome
//! - Stale completions never overwrite the status
//! - Refused requests leave no trace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertions;
pub mod harness;

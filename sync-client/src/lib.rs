//! # sync-client
//!
//! Keeps local files in step with records in a remote store.
//!
//! Each file is an [`Item`] running as its own task. Requests against an
//! item (upload, download, replace, delete) go through the pure status
//! machine in `sync-core`; this crate performs the I/O it asks for.
//!
//! ## Features
//!
//! - **One operation at a time**: uploads queue behind the in-flight one
//! - **Latest wins**: a [`Reflection`] tells its caller whether its operation
//!   was still the latest when it finished
//! - **Pluggable stores**: [`RecordStore`] for records, `LocalStore` for bytes
//!
//! ## Example
//!
//! ```ignore
//! use itemsync_client::{ItemConfig, MockRecordStore, Tracker};
//! use itemsync_content::MemoryStore;
//!
//! let mut tracker = Tracker::new(Arc::new(remote), Arc::new(local), ItemConfig::default());
//! let item = tracker.open(record, "notes.txt", None).await;
//!
//! if let Some(reflection) = item.upload().await? {
//!     reflection.await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod item;
pub mod registry;
pub mod store;

pub use config::{ItemConfig, DEFAULT_MAILBOX_CAPACITY};
pub use error::ItemError;
pub use item::{Backends, Deletion, Item, ItemHandle, Reflected, Reflection};
pub use registry::Tracker;
pub use store::{DirRecordStore, MockRecordStore, RecordStore, StoreCall, StoreError};

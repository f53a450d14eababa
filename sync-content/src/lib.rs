//! # sync-content
//!
//! Local side of an item: where its bytes live and how they are digested.
//!
//! ```text
//! local bytes ──read──> ContentHasher ──> Digest ──> Record.checksum
//!      ^                                                  |
//!      └──────────────write <── Record.data <── download ─┘
//! ```
//!
//! - [`LocalStore`] - read/write bytes by path ([`FsStore`], [`MemoryStore`])
//! - [`ContentHasher`] - payload digests ([`Blake3Hasher`], [`Sha256Hasher`])
//! - [`HashAlgorithm`] - config-file selection of the hasher
//!
//! ## Example
//!
//! ```rust,ignore
//! use itemsync_content::{FsStore, HashAlgorithm, LocalStore};
//!
//! let store = FsStore::new();
//! let bytes = store.read(Path::new("notes.txt")).await?;
//! let digest = HashAlgorithm::Blake3.hasher().digest(&bytes);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod store;

pub use error::ContentError;
pub use hash::{Blake3Hasher, ContentHasher, HashAlgorithm, Sha256Hasher};
pub use store::{FsStore, LocalStore, MemoryStore};

//! # sync-types
//!
//! Value types shared by every itemsync crate:
//! - [`RecordId`], [`ChangeTag`] - Identity and versioning of remote records
//! - [`Record`], [`Digest`] - The mirrored record and its content checksum
//! - [`SavePolicy`] - How a save treats an existing remote record
//! - [`TypesError`] - Parse errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod record;

pub use error::TypesError;
pub use ids::{ChangeTag, RecordId};
pub use record::{Digest, Record, SavePolicy, DIGEST_SIZE};

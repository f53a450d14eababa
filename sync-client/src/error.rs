//! Error types for sync-client.

use crate::store::StoreError;
use itemsync_content::ContentError;
use itemsync_core::StatusKind;
use itemsync_types::RecordId;
use thiserror::Error;

/// Errors reported by item operations.
///
/// Clone so that every observer of one operation gets the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// `reflect()` was called with no operation in flight.
    #[error("no operation in flight (status: {status})")]
    WrongState {
        /// Status at the time of the call.
        status: StatusKind,
    },

    /// The remote store rejected or failed a call.
    #[error("remote store: {0}")]
    RemoteStore(#[from] StoreError),

    /// Local bytes could not be read or written.
    #[error("local storage: {0}")]
    LocalIo(#[from] ContentError),

    /// A fetched record carries no payload.
    #[error("record {id} has no payload")]
    MissingPayload {
        /// The fetched record.
        id: RecordId,
    },

    /// The item's actor has stopped.
    #[error("item is closed")]
    Closed,
}

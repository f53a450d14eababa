//! Sync status of a single item.
//!
//! [`SyncStatus`] is the externally visible projection of what an item is
//! doing. While an operation is in flight the status carries that
//! operation's [`OpId`]; completions compare their own id against it to
//! find out whether a newer request has taken over.

use itemsync_types::Digest;
use std::fmt;

/// Identity of one issued operation on one item.
///
/// Minted by the status machine from a monotonically increasing counter, so
/// two operations on the same item never share an id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpId(u64);

impl OpId {
    /// Create an OpId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this OpId.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id minted after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({})", self.0)
    }
}

/// The kind of work an operation performs against the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Publish local bytes with a conditional save.
    Upload,
    /// Fetch the remote record and overwrite local bytes.
    Download,
    /// Publish local bytes with an unconditional save.
    Replace,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Upload => "upload",
            OpKind::Download => "download",
            OpKind::Replace => "replace",
        };
        f.write_str(name)
    }
}

/// Current sync status of an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Nothing in flight; the snapshot is believed to match the remote store.
    #[default]
    Synced,
    /// An operation is in flight.
    Networking {
        /// The operation whose completion will decide the next status.
        op: OpId,
    },
    /// The last authoritative operation failed.
    Error {
        /// Description of the failure.
        cause: String,
    },
}

impl SyncStatus {
    /// Derive the status of a freshly opened item from content digests.
    ///
    /// - `local`: digest of the bytes on local storage, `None` if absent
    /// - `base`: checksum recorded at the last successful sync, if known
    /// - `remote`: checksum carried by the remote snapshot
    pub fn derive(local: Option<&Digest>, base: Option<&Digest>, remote: Option<&Digest>) -> Self {
        let Some(remote) = remote else {
            // Never uploaded: local bytes are the only copy.
            return Self::Synced;
        };
        let Some(local) = local else {
            return Self::Error {
                cause: "local copy missing".into(),
            };
        };
        if local == remote || base == Some(remote) {
            Self::Synced
        } else {
            Self::Error {
                cause: "remote record diverged from local copy".into(),
            }
        }
    }

    /// Discriminant without payload.
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Synced => StatusKind::Synced,
            Self::Networking { .. } => StatusKind::Networking,
            Self::Error { .. } => StatusKind::Error,
        }
    }

    /// The in-flight operation, if any.
    pub fn current_op(&self) -> Option<OpId> {
        match self {
            Self::Networking { op } => Some(*op),
            _ => None,
        }
    }

    /// Check if nothing is in flight and no error is pending.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    /// Check if an operation is in flight.
    pub fn is_networking(&self) -> bool {
        matches!(self, Self::Networking { .. })
    }

    /// Check if the item is in error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => f.write_str("synced"),
            Self::Networking { op } => write!(f, "networking ({})", op),
            Self::Error { cause } => write!(f, "error: {}", cause),
        }
    }
}

/// [`SyncStatus`] without its payload, for refusals and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// See [`SyncStatus::Synced`].
    Synced,
    /// See [`SyncStatus::Networking`].
    Networking,
    /// See [`SyncStatus::Error`].
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Synced => "synced",
            StatusKind::Networking => "networking",
            StatusKind::Error => "error",
        };
        f.write_str(name)
    }
}

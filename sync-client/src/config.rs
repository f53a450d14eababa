//! Item configuration.

use itemsync_content::HashAlgorithm;

/// Default mailbox capacity of an item actor.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Configuration shared by the items of one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemConfig {
    /// Bounded capacity of each item's command mailbox.
    pub mailbox_capacity: usize,
    /// Digest algorithm for record checksums.
    pub hash: HashAlgorithm,
}

impl ItemConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mailbox capacity (minimum 1).
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    /// Set the hash algorithm.
    pub fn with_hasher(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            hash: HashAlgorithm::Blake3,
        }
    }
}

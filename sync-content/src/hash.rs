//! Content hashing for record checksums.
//!
//! Uploads stamp every record with a digest of its payload; status derivation
//! compares digests of local bytes against the remote one. BLAKE3 is the
//! default, SHA-256 is available for stores that expect it.

use std::fmt;
use std::sync::Arc;

use itemsync_types::{Digest, DIGEST_SIZE};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Computes content digests.
pub trait ContentHasher: Send + Sync {
    /// Digest of `data`.
    fn digest(&self, data: &[u8]) -> Digest;

    /// Which algorithm this hasher implements.
    fn algorithm(&self) -> HashAlgorithm;
}

/// BLAKE3 content hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

impl ContentHasher for Blake3Hasher {
    fn digest(&self, data: &[u8]) -> Digest {
        Digest::from_bytes(*blake3::hash(data).as_bytes())
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }
}

/// SHA-256 content hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> Digest {
        let out: [u8; DIGEST_SIZE] = Sha256::digest(data).into();
        Digest::from_bytes(out)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

/// Hash algorithm selection, as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 (default).
    #[default]
    Blake3,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Build a shared hasher for this algorithm.
    pub fn hasher(self) -> Arc<dyn ContentHasher> {
        match self {
            HashAlgorithm::Blake3 => Arc::new(Blake3Hasher),
            HashAlgorithm::Sha256 => Arc::new(Sha256Hasher),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Blake3 => f.write_str("blake3"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

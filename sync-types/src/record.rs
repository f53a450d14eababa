//! The remote record mirrored by a local item.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;
use crate::ids::{ChangeTag, RecordId};

/// Size of a content digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Content digest of a record payload.
///
/// Displayed and serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(12);
        s
    }
}

impl FromStr for Digest {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypesError::InvalidDigest(e.to_string()))?;
        let arr: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            TypesError::InvalidDigest(format!("expected {} bytes, got {}", DIGEST_SIZE, b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How the record store treats a save against an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Reject the save unless the stored change tag equals the record's tag.
    IfServerRecordUnchanged,
    /// Overwrite the fields carried by the record regardless of change tag.
    ChangedKeys,
}

/// Last-known state of a remote record.
///
/// `change_tag` is `None` until the record has been saved once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identity of the record.
    pub id: RecordId,
    /// Server version this snapshot was taken at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_tag: Option<ChangeTag>,
    /// File payload.
    #[serde(default, with = "payload_base64", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    /// Digest of `data`, attached by the uploader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Digest>,
}

impl Record {
    /// A record that has never been saved.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            change_tag: None,
            data: None,
            checksum: None,
        }
    }

    /// Attach a payload and its digest.
    pub fn with_payload(mut self, data: Vec<u8>, checksum: Digest) -> Self {
        self.data = Some(data);
        self.checksum = Some(checksum);
        self
    }

    /// Whether the store has ever accepted this record.
    pub fn is_saved(&self) -> bool {
        self.change_tag.is_some()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("change_tag", &self.change_tag)
            .field(
                "data",
                &self.data.as_ref().map(|d| format!("[{} bytes]", d.len())),
            )
            .field("checksum", &self.checksum)
            .finish()
    }
}

mod payload_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::error::StoreError;

/// Length of the per-database salt in bytes.
pub const SALT_LEN: usize = 32;
/// Length of the per-value AES-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Per-database salt. Created once, never rotated.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the OS random source.
    pub fn generate() -> Result<Self, StoreError> {
        let mut bytes = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StoreError::Storage {
                reason: format!("cannot generate random salt: {e}"),
            })?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Rebuild a salt read back from storage; rejects anything but 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        let bytes: [u8; SALT_LEN] = bytes.try_into().map_err(|_| StoreError::Storage {
            reason: format!("stored salt has {} bytes, expected {SALT_LEN}", bytes.len()),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

// Never print salt bytes.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(..)")
    }
}

/// A stored value, either plain text or a sealed ciphertext.
///
/// At the storage boundary this maps onto a `(val, nonce)` row where a null
/// nonce means plain text. The nonce is the only encryption marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Plain(String),
    Sealed {
        /// Base64 of the AES-GCM output (ciphertext followed by tag).
        ciphertext: String,
        nonce: Vec<u8>,
    },
}

impl Entry {
    /// Build an entry from the stored columns.
    pub fn from_columns(val: String, nonce: Option<Vec<u8>>) -> Self {
        match nonce {
            None => Entry::Plain(val),
            Some(nonce) => Entry::Sealed {
                ciphertext: val,
                nonce,
            },
        }
    }

    /// Borrow the `(val, nonce)` column pair for writing.
    pub fn columns(&self) -> (&str, Option<&[u8]>) {
        match self {
            Entry::Plain(value) => (value.as_str(), None),
            Entry::Sealed { ciphertext, nonce } => (ciphertext.as_str(), Some(nonce.as_slice())),
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, Entry::Sealed { .. })
    }
}

/// One row of the record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub entry: Entry,
    /// Time of the last write, assigned by the store.
    pub modified: DateTime<Utc>,
}

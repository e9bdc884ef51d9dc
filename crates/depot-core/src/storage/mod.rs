//! Storage contracts implemented by every Depot backend.

mod memory;

pub use memory::InMemoryStore;

use crate::{
    entry::{Entry, Record, Salt},
    error::StoreError,
};

/// Key to entry mapping with per-record modification times.
///
/// Every operation is a single atomic step against the backend; there is no
/// read-modify-write across calls.
pub trait RecordStore {
    /// Insert `entry` under `key`, or replace the value, nonce and modification
    /// time of an existing record, in one conditional write.
    fn upsert(&self, key: &str, entry: &Entry) -> Result<(), StoreError>;

    /// Exact-match lookup. Fails with `StoreError::NotFound` when absent.
    fn lookup(&self, key: &str) -> Result<Record, StoreError>;

    /// Remove a record (idempotent).
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Plain-text value for `key`, or `None` when the record is missing or sealed.
    fn peek_value(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Owner of the single persistent salt of a database.
pub trait SaltStore {
    /// Return the stored salt, generating and persisting one on first call.
    fn ensure_salt(&mut self) -> Result<Salt, StoreError>;
}

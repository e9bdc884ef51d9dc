//! Core abstractions for Depot: stored entries, the salt, and the record/salt
//! storage contracts. Cryptography and the SQLite backend live in `depot-storage`.

pub mod entry;
pub mod error;
pub mod storage;

pub use entry::{Entry, Record, Salt, NONCE_LEN, SALT_LEN};
pub use error::{DepotError, StoreError};

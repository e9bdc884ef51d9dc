//! Concrete Depot engine: SQLite persistence, per-value AES-GCM encryption
//! with PBKDF2-derived keys, and the `Depot` facade tying them together.

pub mod cipher;
pub mod depot;
pub mod sqlite_store;

pub use depot::Depot;
pub use sqlite_store::SqliteStore;

use std::path::Path;

use chrono::{DateTime, Utc};
use depot_core::{
    storage::{RecordStore, SaltStore},
    Entry, Record, Salt, StoreError,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info, instrument};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS storage (
        modified   INT  DEFAULT (strftime('%s', 'now')),
        key        TEXT UNIQUE NOT NULL,
        val        TEXT NOT NULL,
        nonce      BLOB UNIQUE
    );

    CREATE TABLE IF NOT EXISTS salt (
        data BLOB NOT NULL
    );
";

/// SQLite-backed record and salt store. Owns one connection for its lifetime.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `location`, a file path or `file:` URI,
    /// and create the tables if they are missing.
    pub fn open(location: impl AsRef<Path>) -> Result<Self, StoreError> {
        let location = location.as_ref();
        debug!(?location, "opening sqlite store");
        let conn = Connection::open(location).map_err(StoreError::storage)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a private in-memory database. Contents vanish when dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::storage)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(StoreError::storage)?;
        debug!("schema ready");
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    #[instrument(skip_all, fields(key = %key))]
    fn upsert(&self, key: &str, entry: &Entry) -> Result<(), StoreError> {
        let (val, nonce) = entry.columns();
        self.conn
            .execute(
                "INSERT INTO storage (key, val, nonce)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET
                     modified = (strftime('%s', 'now')),
                     val = excluded.val,
                     nonce = excluded.nonce",
                params![key, val, nonce],
            )
            .map_err(StoreError::storage)?;
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    fn lookup(&self, key: &str) -> Result<Record, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT val, nonce, modified FROM storage WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<Vec<u8>>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(StoreError::storage)?;

        let (val, nonce, modified) = row.ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })?;
        Ok(Record {
            key: key.to_string(),
            entry: Entry::from_columns(val, nonce),
            modified: modified
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .unwrap_or_default(),
        })
    }

    #[instrument(skip_all, fields(key = %key))]
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM storage WHERE key = ?1", params![key])
            .map_err(StoreError::storage)?;
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    fn peek_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT val FROM storage WHERE key = ?1 AND nonce IS NULL",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::storage)
    }
}

impl SaltStore for SqliteStore {
    /// Read-or-create under a write lock so concurrent first opens agree on one salt.
    fn ensure_salt(&mut self) -> Result<Salt, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::storage)?;

        let existing: Option<Vec<u8>> = tx
            .query_row("SELECT data FROM salt ORDER BY rowid LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StoreError::storage)?;

        let salt = match existing {
            Some(bytes) => Salt::from_slice(&bytes)?,
            None => {
                let salt = Salt::generate()?;
                tx.execute(
                    "INSERT INTO salt (data) VALUES (?1)",
                    params![&salt.as_bytes()[..]],
                )
                .map_err(StoreError::storage)?;
                info!("generated salt for new database");
                salt
            }
        };

        tx.commit().map_err(StoreError::storage)?;
        Ok(salt)
    }
}

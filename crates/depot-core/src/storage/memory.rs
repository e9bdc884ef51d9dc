use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;

use super::{RecordStore, SaltStore};
use crate::{
    entry::{Entry, Record, Salt},
    error::StoreError,
};

/// In-memory record and salt store for tests and ephemeral sessions.
/// Nothing survives the process; clones share the same state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, Record>,
    salt: Option<Salt>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|err| StoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })
    }
}

impl RecordStore for InMemoryStore {
    fn upsert(&self, key: &str, entry: &Entry) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let (_, Some(nonce)) = entry.columns() {
            let reused = inner.records.values().any(|r| {
                r.key != key && r.entry.is_sealed() && r.entry.columns().1 == Some(nonce)
            });
            if reused {
                return Err(StoreError::Storage {
                    reason: "nonce already in use".to_string(),
                });
            }
        }
        inner.records.insert(
            key.to_string(),
            Record {
                key: key.to_string(),
                entry: entry.clone(),
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<Record, StoreError> {
        let inner = self.lock()?;
        inner
            .records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.records.remove(key);
        Ok(())
    }

    fn peek_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.lock()?;
        Ok(match inner.records.get(key).map(|r| &r.entry) {
            Some(Entry::Plain(value)) => Some(value.clone()),
            _ => None,
        })
    }
}

impl SaltStore for InMemoryStore {
    fn ensure_salt(&mut self) -> Result<Salt, StoreError> {
        let mut inner = self.lock()?;
        if let Some(existing) = &inner.salt {
            return Ok(existing.clone());
        }

        let salt = Salt::generate()?;
        inner.salt = Some(salt.clone());
        Ok(salt)
    }
}

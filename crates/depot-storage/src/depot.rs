use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use depot_core::{
    storage::{RecordStore, SaltStore},
    DepotError, Entry, Salt,
};
use tracing::{debug, instrument};

use crate::{
    cipher::{self, CipherError},
    sqlite_store::SqliteStore,
};

/// Key-value depot with optional per-value password encryption.
///
/// Holds the store and the database salt for its whole lifetime; the salt is
/// read (or created) once at open and never changes afterwards.
pub struct Depot<S = SqliteStore> {
    store: S,
    salt: Salt,
}

impl Depot<SqliteStore> {
    /// Open or create the SQLite depot at `location` (path or `file:` URI).
    pub fn open(location: impl AsRef<Path>) -> Result<Self, DepotError> {
        let store = SqliteStore::open(location).map_err(DepotError::init)?;
        Self::with_store(store)
    }
}

impl<S: RecordStore + SaltStore> Depot<S> {
    /// Wrap an already opened store, creating its salt if needed.
    pub fn with_store(mut store: S) -> Result<Self, DepotError> {
        let salt = store.ensure_salt().map_err(DepotError::init)?;
        Ok(Self { store, salt })
    }

    /// Store `value` under `key`, replacing any previous entry. With a
    /// password the value is sealed; without one it is stored as plain text.
    #[instrument(skip_all, fields(key = %key, sealed = password.is_some()))]
    pub fn stow(&self, key: &str, value: &str, password: Option<&[u8]>) -> Result<(), DepotError> {
        let entry = match password {
            None => Entry::Plain(value.to_string()),
            Some(password) => {
                let sealed = cipher::encrypt(password, &self.salt, value.as_bytes())
                    .map_err(encryption_err)?;
                Entry::Sealed {
                    ciphertext: STANDARD.encode(&sealed.ciphertext),
                    nonce: sealed.nonce.to_vec(),
                }
            }
        };

        self.store.upsert(key, &entry)?;
        Ok(())
    }

    /// Return the value for `key`. Plain entries ignore `password`; sealed
    /// entries need the password they were stowed with.
    #[instrument(skip_all, fields(key = %key))]
    pub fn fetch(&self, key: &str, password: Option<&[u8]>) -> Result<String, DepotError> {
        let record = self.store.lookup(key)?;
        let (ciphertext, nonce) = match record.entry {
            Entry::Plain(value) => return Ok(value),
            Entry::Sealed { ciphertext, nonce } => (ciphertext, nonce),
        };
        let password = password.ok_or(DepotError::PasswordRequired)?;

        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|e| DepotError::Storage {
                reason: format!("stored ciphertext is not base64: {e}"),
            })?;

        let plaintext = match cipher::decrypt(password, &self.salt, &nonce, &ciphertext) {
            Ok(plaintext) => plaintext,
            Err(CipherError::Authentication) => {
                debug!("authentication failed");
                return Err(DepotError::BadPassword);
            }
            Err(CipherError::NonceLength(len)) => {
                return Err(DepotError::Storage {
                    reason: format!("stored nonce has {len} bytes"),
                })
            }
            Err(err) => return Err(encryption_err(err)),
        };

        String::from_utf8(plaintext).map_err(|e| DepotError::Storage {
            reason: format!("decrypted value is not utf-8: {e}"),
        })
    }

    /// Plain-text value for `key` without touching any password.
    ///
    /// `None` means "missing or sealed"; the two are deliberately
    /// indistinguishable here. Use [`Depot::fetch`] to find out which.
    #[instrument(skip_all, fields(key = %key))]
    pub fn peek(&self, key: &str) -> Result<Option<String>, DepotError> {
        Ok(self.store.peek_value(key)?)
    }

    /// Remove `key`. Removing a missing key succeeds.
    #[instrument(skip_all, fields(key = %key))]
    pub fn drop(&self, key: &str) -> Result<(), DepotError> {
        self.store.delete(key)?;
        Ok(())
    }
}

fn encryption_err(err: CipherError) -> DepotError {
    DepotError::Encryption {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use depot_core::storage::InMemoryStore;

    use super::*;

    fn sqlite_depot() -> (tempfile::TempDir, Depot) {
        let dir = tempfile::tempdir().expect("tempdir");
        let depot = Depot::open(dir.path().join("depot.db")).expect("open depot");
        (dir, depot)
    }

    fn memory_depot() -> Depot<InMemoryStore> {
        Depot::with_store(InMemoryStore::new()).expect("open depot")
    }

    fn check_plain_round_trip<S: RecordStore + SaltStore>(depot: &Depot<S>) {
        depot.stow("plaintext", "testing123", None).expect("stow");
        assert_eq!(
            depot.peek("plaintext").expect("peek").as_deref(),
            Some("testing123")
        );
        assert_eq!(depot.fetch("plaintext", None).expect("fetch"), "testing123");
        // Plain entries ignore any supplied password.
        assert_eq!(
            depot.fetch("plaintext", Some(b"whatever")).expect("fetch"),
            "testing123"
        );

        depot.drop("plaintext").expect("drop");
        assert_eq!(depot.peek("plaintext").expect("peek"), None);
        assert_eq!(
            depot.fetch("plaintext", None),
            Err(DepotError::NotFound {
                key: "plaintext".into()
            })
        );
    }

    fn check_sealed_round_trip<S: RecordStore + SaltStore>(depot: &Depot<S>) {
        let password = b"password";
        depot
            .stow("ciphertext", "testing123", Some(password))
            .expect("stow");
        assert_eq!(depot.peek("ciphertext").expect("peek"), None);
        assert_eq!(
            depot.fetch("ciphertext", Some(password)).expect("fetch"),
            "testing123"
        );

        depot.drop("ciphertext").expect("drop");
        assert_eq!(depot.peek("ciphertext").expect("peek"), None);
        assert!(matches!(
            depot.fetch("ciphertext", Some(password)),
            Err(DepotError::NotFound { .. })
        ));
    }

    #[test]
    fn plain_round_trip_sqlite() {
        let (_dir, depot) = sqlite_depot();
        check_plain_round_trip(&depot);
    }

    #[test]
    fn plain_round_trip_memory() {
        check_plain_round_trip(&memory_depot());
    }

    #[test]
    fn sealed_round_trip_sqlite() {
        let (_dir, depot) = sqlite_depot();
        check_sealed_round_trip(&depot);
    }

    #[test]
    fn sealed_round_trip_memory() {
        check_sealed_round_trip(&memory_depot());
    }

    #[test]
    fn wrong_password_is_bad_password() {
        let (_dir, depot) = sqlite_depot();
        depot
            .stow("ciphertext", "testing123", Some(b"goodpassword"))
            .expect("stow");
        assert_eq!(
            depot.fetch("ciphertext", Some(b"badpassword")),
            Err(DepotError::BadPassword)
        );
        assert_eq!(
            depot.fetch("ciphertext", Some(b"")),
            Err(DepotError::BadPassword)
        );
    }

    #[test]
    fn sealed_entry_without_password_requires_one() {
        let depot = memory_depot();
        depot.stow("k", "v", Some(b"pw")).expect("stow");
        assert_eq!(depot.fetch("k", None), Err(DepotError::PasswordRequired));
    }

    #[test]
    fn overwrite_flips_encryption_state() {
        let (_dir, depot) = sqlite_depot();
        depot.stow("k", "v1", None).expect("stow plain");
        depot.stow("k", "v2", Some(b"pw")).expect("stow sealed");
        assert_eq!(depot.peek("k").expect("peek"), None);
        assert_eq!(depot.fetch("k", Some(b"pw")).expect("fetch"), "v2");

        depot.stow("k", "v3", None).expect("stow plain again");
        assert_eq!(depot.peek("k").expect("peek").as_deref(), Some("v3"));
        assert_eq!(depot.fetch("k", None).expect("fetch"), "v3");
    }

    #[test]
    fn never_stowed_key() {
        let depot = memory_depot();
        assert_eq!(depot.peek("badkey").expect("peek"), None);
        assert_eq!(
            depot.fetch("badkey", None),
            Err(DepotError::NotFound {
                key: "badkey".into()
            })
        );
        depot.drop("badkey").expect("drop of missing key succeeds");
    }

    #[test]
    fn salt_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("depot.db");
        {
            let depot = Depot::open(&path).expect("open");
            depot.stow("first", "one", Some(b"pw")).expect("stow");
        }

        let depot = Depot::open(&path).expect("reopen");
        depot.stow("second", "two", Some(b"pw")).expect("stow");
        assert_eq!(depot.fetch("second", Some(b"pw")).expect("fetch"), "two");
        assert_eq!(depot.fetch("first", Some(b"pw")).expect("fetch"), "one");
    }

    #[test]
    fn sealed_value_is_not_stored_in_clear() {
        let store = InMemoryStore::new();
        let depot = Depot::with_store(store.clone()).expect("open");
        depot.stow("k", "hello-depot", Some(b"pw")).expect("stow");

        let record = store.lookup("k").expect("lookup");
        match record.entry {
            Entry::Sealed { ciphertext, nonce } => {
                assert!(!ciphertext.contains("hello-depot"));
                assert_eq!(nonce.len(), depot_core::NONCE_LEN);
                assert!(STANDARD.decode(ciphertext).is_ok());
            }
            Entry::Plain(_) => panic!("value must be sealed"),
        }
    }

    #[test]
    fn corrupt_ciphertext_encoding_is_storage_error() {
        let store = InMemoryStore::new();
        let depot = Depot::with_store(store.clone()).expect("open");
        store
            .upsert(
                "k",
                &Entry::Sealed {
                    ciphertext: "not base64!".into(),
                    nonce: vec![0; depot_core::NONCE_LEN],
                },
            )
            .unwrap();
        assert!(matches!(
            depot.fetch("k", Some(b"pw")),
            Err(DepotError::Storage { .. })
        ));
    }

    #[test]
    fn open_on_unreachable_location_is_init_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("nested").join("depot.db");
        assert!(matches!(Depot::open(path), Err(DepotError::Init { .. })));
    }
}

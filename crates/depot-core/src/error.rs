use thiserror::Error;

/// Errors produced by record and salt store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Requested key does not exist.
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

impl StoreError {
    pub fn storage<E: ToString>(err: E) -> Self {
        StoreError::Storage {
            reason: err.to_string(),
        }
    }
}

/// Outcome kinds surfaced by the `Depot` facade.
///
/// `BadPassword` covers both a wrong password and a tampered ciphertext or
/// nonce; authenticated encryption cannot tell the two apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepotError {
    /// Backing store unreachable, schema creation failed, or salt generation failed.
    #[error("cannot initialize depot: {reason}")]
    Init { reason: String },
    #[error("key not found: {key}")]
    NotFound { key: String },
    /// The entry is encrypted and no password was supplied.
    #[error("password is needed for decryption")]
    PasswordRequired,
    #[error("bad password")]
    BadPassword,
    #[error("cannot access database: {reason}")]
    Storage { reason: String },
    /// Key derivation or cipher construction failed.
    #[error("cannot encrypt data: {reason}")]
    Encryption { reason: String },
}

impl DepotError {
    /// Map a store failure raised while opening the depot.
    pub fn init(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => DepotError::Init {
                reason: format!("missing {key}"),
            },
            StoreError::Storage { reason } => DepotError::Init { reason },
        }
    }
}

impl From<StoreError> for DepotError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => DepotError::NotFound { key },
            StoreError::Storage { reason } => DepotError::Storage { reason },
        }
    }
}

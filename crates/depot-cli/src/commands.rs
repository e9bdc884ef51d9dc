use std::io::{self, Write};

use color_eyre::Result;
use depot_core::{
    storage::{RecordStore, SaltStore},
    DepotError,
};
use depot_storage::Depot;
use tracing::debug;
use zeroize::Zeroizing;

/// Store `value` under `key`, sealed when a password is given.
pub fn stow<S: RecordStore + SaltStore>(
    depot: &Depot<S>,
    key: &str,
    value: &str,
    password: Option<&[u8]>,
) -> Result<()> {
    depot.stow(key, value, password)?;
    debug!(key, sealed = password.is_some(), "stowed");
    Ok(())
}

/// Resolve the value for `key`, asking for a password only when the entry
/// turns out to be sealed.
pub fn fetch<S, F>(depot: &Depot<S>, key: &str, password: F) -> Result<String>
where
    S: RecordStore + SaltStore,
    F: FnOnce() -> Result<Zeroizing<Vec<u8>>>,
{
    if let Some(value) = depot.peek(key)? {
        return Ok(value);
    }

    match depot.fetch(key, None) {
        Err(DepotError::PasswordRequired) => {
            let password = password()?;
            Ok(depot.fetch(key, Some(password.as_slice()))?)
        }
        other => Ok(other?),
    }
}

pub fn print_value(out: &mut impl Write, value: &str, newline: bool) -> Result<()> {
    if newline {
        writeln!(out, "{value}")?;
    } else {
        write!(out, "{value}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn print_to_stdout(value: &str, newline: bool) -> Result<()> {
    print_value(&mut io::stdout().lock(), value, newline)
}

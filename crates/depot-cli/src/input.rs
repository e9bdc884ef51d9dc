use std::io::{self, BufRead, IsTerminal};

use color_eyre::{eyre::eyre, Result};
use zeroize::Zeroizing;

/// Password used without prompting when set and non-empty.
pub const ENV_PASS: &str = "DEPOT_PASS";

const PROMPT: &str = "PASSWORD: ";

/// Password from `DEPOT_PASS`, or a no-echo prompt on the terminal.
pub fn read_password() -> Result<Zeroizing<Vec<u8>>> {
    if let Some(password) = std::env::var_os(ENV_PASS).filter(|p| !p.is_empty()) {
        return Ok(Zeroizing::new(password.into_encoded_bytes()));
    }

    let password =
        rpassword::prompt_password(PROMPT).map_err(|e| eyre!("password prompt: {e}"))?;
    Ok(Zeroizing::new(password.into_bytes()))
}

/// Read the value to stow from stdin. Secret values typed at a terminal are
/// not echoed.
pub fn read_value(secret: bool) -> Result<Zeroizing<String>> {
    let stdin = io::stdin();
    if secret && stdin.is_terminal() {
        let value = Zeroizing::new(
            rpassword::read_password().map_err(|e| eyre!("value prompt: {e}"))?,
        );
        return Ok(Zeroizing::new(value.trim().to_string()));
    }
    read_line(stdin.lock())
}

fn read_line(mut reader: impl BufRead) -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    reader.read_line(&mut line)?;
    Ok(Zeroizing::new(line.trim().to_string()))
}

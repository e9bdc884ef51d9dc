use std::{
    fs, io,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::eyre, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// User-level configuration loaded from `~/.config/depot/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the database location. `DEPOT_PATH` still wins.
    pub database: Option<PathBuf>,
}

/// Load the user's config. Without a platform config dir (no `HOME`) there is
/// nothing to read, so defaults apply and `DEPOT_PATH` still works.
pub fn load() -> Result<Config> {
    load_from(config_dir())
}

fn load_from(base: Option<PathBuf>) -> Result<Config> {
    match base {
        Some(base) => read_config(&config_file(&base)),
        None => {
            debug!("no config dir available; using defaults");
            Ok(Config::default())
        }
    }
}

/// `<base>/depot/config.toml`.
fn config_file(base: &Path) -> PathBuf {
    base.join("depot").join("config.toml")
}

/// Parse a config file. A missing or blank file yields defaults.
fn read_config(path: &Path) -> Result<Config> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(eyre!("cannot read {}: {err}", path.display())),
    };
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    toml::from_str(&contents).map_err(|e| eyre!("invalid config {}: {e}", path.display()))
}

/// Write the given config to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| eyre!("no config dir available; set HOME"))?;
    write_if_missing(config, &config_file(&base))
}

fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}

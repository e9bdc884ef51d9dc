use std::{fs, path::PathBuf};

use crate::config::Config;
use color_eyre::{eyre::bail, Result};
use depot_storage::Depot;
use tracing::debug;

/// Overrides every other database location when set.
pub const ENV_PATH: &str = "DEPOT_PATH";

/// Open the depot selected by the environment and config.
pub fn open_depot(config: &Config) -> Result<Depot> {
    let location = resolve_location(config)?;
    debug!(?location, "opening depot");
    Ok(Depot::open(&location)?)
}

/// Pick the database location: `DEPOT_PATH`, then the config override, then
/// `$XDG_CONFIG_HOME/depot/depot.db` or `~/.depot/depot.db`.
pub fn resolve_location(config: &Config) -> Result<PathBuf> {
    let env_path = std::env::var_os(ENV_PATH)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    choose_location(env_path, config, xdg_config_home, dirs::home_dir())
}

fn choose_location(
    env_path: Option<PathBuf>,
    config: &Config,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    // Used verbatim; may be a `file:` URI.
    if let Some(path) = env_path {
        return Ok(path);
    }

    let path = match &config.database {
        Some(path) => path.clone(),
        None => match (xdg_config_home, home) {
            (Some(base), _) => base.join("depot").join("depot.db"),
            (None, Some(home)) => home.join(".depot").join("depot.db"),
            (None, None) => bail!("cannot determine a database location; set {ENV_PATH}"),
        },
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_path_wins_and_is_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let env = dir.path().join("not-created").join("depot.db");
        let config = Config {
            database: Some(dir.path().join("config.db")),
        };

        let chosen = choose_location(Some(env.clone()), &config, None, None).expect("choose");
        assert_eq!(chosen, env);
        assert!(!dir.path().join("not-created").exists());
    }

    #[test]
    fn config_override_beats_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            database: Some(dir.path().join("custom").join("depot.db")),
        };

        let chosen = choose_location(None, &config, Some(dir.path().join("xdg")), None)
            .expect("choose");
        assert_eq!(chosen, dir.path().join("custom").join("depot.db"));
        assert!(dir.path().join("custom").is_dir());
    }

    #[test]
    fn prefers_xdg_config_home() {
        let dir = tempfile::tempdir().expect("tempdir");
        let xdg = dir.path().join("xdg");
        let home = dir.path().join("home");

        let chosen = choose_location(None, &Config::default(), Some(xdg.clone()), Some(home))
            .expect("choose");
        assert_eq!(chosen, xdg.join("depot").join("depot.db"));
        assert!(xdg.join("depot").is_dir());
    }

    #[test]
    fn falls_back_to_dot_depot_in_home() {
        let dir = tempfile::tempdir().expect("tempdir");
        let home = dir.path().to_path_buf();

        let chosen =
            choose_location(None, &Config::default(), None, Some(home.clone())).expect("choose");
        assert_eq!(chosen, home.join(".depot").join("depot.db"));
    }

    #[test]
    fn errors_without_any_base_directory() {
        assert!(choose_location(None, &Config::default(), None, None).is_err());
    }
}

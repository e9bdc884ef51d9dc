use clap::{Parser, Subcommand};

const ENV_HELP: &str = "\
Environment Variables:
    DEPOT_PATH  Specifies a non-standard path to the depot's database
                (Defaults to $XDG_CONFIG_HOME/depot/depot.db)
    DEPOT_PASS  Specifies the password to be used to encrypt/decrypt values
                (Be careful with this! It is certainly less secure!)";

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "depot",
    about = "Command-line key-value store with optional per-value encryption",
    version,
    propagate_version = true,
    after_help = ENV_HELP
)]
pub struct Cli {
    /// No newline character will be printed after fetching a value.
    #[arg(short = 'n', long = "no-newline", global = true)]
    pub no_newline: bool,

    /// The provided value is secret and will be encrypted.
    #[arg(short = 's', long = "secret", global = true)]
    pub secret: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a value from stdin and associate it with the given key.
    Stow { key: String },
    /// Print the value associated with the given key to stdout.
    Fetch { key: String },
    /// Remove the given key from the depot.
    Drop { key: String },
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

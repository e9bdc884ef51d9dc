mod cli;
mod commands;
mod config;
mod input;
mod storage;

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the depot engine.
fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command {
        Command::Stow { key } => {
            let depot = storage::open_depot(&config)?;
            let value = input::read_value(cli.secret)?;
            let password = if cli.secret {
                Some(input::read_password()?)
            } else {
                None
            };
            commands::stow(&depot, &key, &value, password.as_ref().map(|p| p.as_slice()))?
        }
        Command::Fetch { key } => {
            let depot = storage::open_depot(&config)?;
            let value = commands::fetch(&depot, &key, input::read_password)?;
            commands::print_to_stdout(&value, !cli.no_newline)?
        }
        Command::Drop { key } => storage::open_depot(&config)?.drop(&key)?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    // stdout carries fetched values, so logs go to stderr and stay quiet by default.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

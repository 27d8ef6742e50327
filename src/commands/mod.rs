pub mod select_command;
pub mod validate_command;

pub use self::{select_command::*, validate_command::*};

use clap::Arg;
use std::error::Error;
use tracing_subscriber::EnvFilter;

pub fn log_level_arg() -> Arg<'static> {
    Arg::new("log_level")
        .long("log-level")
        .value_name("LEVEL")
        .help("Minimum level of the logs written to stderr. RUST_LOG takes precedence.")
        .takes_value(true)
        .global(true)
        .default_value("info")
}

/// Sends the logs to stderr, so that the JSON reports on stdout stay machine-readable.
pub fn init_logging(level: &str) -> Result<(), Box<dyn Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string().into())
}

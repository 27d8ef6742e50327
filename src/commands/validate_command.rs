use crate::epoch_file::{validate_candidates, write_json, EpochDocument};
use crate::{Ed25519Verifier, TransactionValidator};
use clap::{App, Arg, ArgMatches};
use std::error::Error;
use std::path::PathBuf;

struct ValidateCliOptions {
    epoch: PathBuf,
}

impl ValidateCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            epoch: matches
                .value_of("epoch")
                .map(PathBuf::from)
                .ok_or("Missing epoch file.")?,
        })
    }
}

pub fn validate_command() -> App<'static> {
    App::new("validate")
        .version("0.1")
        .about("Checks each proposed transaction against the UTXO snapshot without applying any.")
        .arg(
            Arg::new("epoch")
                .short('e')
                .long("epoch")
                .value_name("FILE")
                .help("JSON document with the UTXO snapshot and the proposed transactions.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_validate_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = ValidateCliOptions::parse(matches)?;
    let document = EpochDocument::load(&options.epoch)?;
    let entries = validate_candidates(&TransactionValidator::new(Ed25519Verifier), &document)?;
    write_json(&entries, None)?;
    Ok(())
}

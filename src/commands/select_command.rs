use crate::epoch_file::{write_json, EpochDocument, EpochReport};
use crate::{AcceptanceOrder, Ed25519Verifier, EpochSelector, TransactionValidator};
use clap::{App, Arg, ArgMatches};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

struct SelectCliOptions {
    epoch: PathBuf,
    order: AcceptanceOrder,
    output: Option<PathBuf>,
}

impl SelectCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            epoch: matches
                .value_of("epoch")
                .map(PathBuf::from)
                .ok_or("Missing epoch file.")?,
            order: matches.value_of_t::<AcceptanceOrder>("order")?,
            output: matches.value_of("output").map(PathBuf::from),
        })
    }
}

pub fn select_command() -> App<'static> {
    App::new("select")
        .version("0.1")
        .about("Processes an epoch and reports the accepted transactions and the resulting UTXOs.")
        .arg(
            Arg::new("epoch")
                .short('e')
                .long("epoch")
                .value_name("FILE")
                .help("JSON document with the UTXO snapshot and the proposed transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_name("fee|arrival")
                .help("Order in which the accepted transactions are reported.")
                .takes_value(true)
                .possible_values(&["fee", "arrival"])
                .default_value("fee"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Where to write the report. Defaults to stdout.")
                .takes_value(true)
                .required(false),
        )
}

pub fn run_select_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SelectCliOptions::parse(matches)?;
    let document = EpochDocument::load(&options.epoch)?;
    info!(
        epoch = %options.epoch.display(),
        utxos = document.utxos.len(),
        candidates = document.candidates.len(),
        "Loaded epoch"
    );

    let selector = EpochSelector::new(TransactionValidator::new(Ed25519Verifier), options.order);
    let epoch = selector.select(document.candidates(), document.pool()?);
    write_json(&EpochReport::new(&epoch), options.output.as_deref())?;
    Ok(())
}

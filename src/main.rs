use clap::{App, AppSettings};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("epoch-ledger")
        .about("Selects the transactions committed in an epoch of a UTXO ledger.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(epoch_ledger_lib::commands::log_level_arg())
        .subcommand(epoch_ledger_lib::commands::select_command())
        .subcommand(epoch_ledger_lib::commands::validate_command())
        .get_matches();

    epoch_ledger_lib::commands::init_logging(matches.value_of("log_level").unwrap_or("info"))?;

    if let Some(matches) = matches.subcommand_matches("select") {
        epoch_ledger_lib::commands::run_select_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("validate") {
        epoch_ledger_lib::commands::run_validate_command(matches)
    } else {
        panic!("Should report help.");
    }
}

pub mod amount;
pub mod commands;
pub mod epoch;
pub mod epoch_file;
pub mod hash;
pub mod ledger;
pub mod public_key;
pub mod signature;
pub mod transaction;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use self::{
    amount::*, epoch::*, hash::*, ledger::*, public_key::*, signature::*, transaction::*,
    utxo_pool::*, validation::*,
};

//! JSON documents used by the command line tool: the epoch to process, and the reports
//! printed after processing or validating it.

use crate::{
    Amount, Epoch, OutputIndex, PublicKey, Rejection, Signature, SignatureVerifier, Transaction,
    TransactionId, TransactionInput, TransactionOutput, TransactionValidator, UtxoId, UtxoPool,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpochFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot entry {utxo_id}: {reason}")]
    InvalidSnapshot {
        utxo_id: UtxoId,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub transaction_id: TransactionId,
    pub output_index: OutputIndex,
    pub amount: Amount,
    pub owner: PublicKey,
}

impl UtxoEntry {
    fn new(utxo_id: &UtxoId, output: &TransactionOutput) -> Self {
        Self {
            transaction_id: *utxo_id.transaction_id(),
            output_index: utxo_id.output_index(),
            amount: output.amount(),
            owner: output.owner().clone(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct InputEntry {
    pub transaction_id: TransactionId,
    pub output_index: OutputIndex,
    #[serde(default)]
    pub signature: Signature,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub inputs: Vec<InputEntry>,
    pub outputs: Vec<TransactionOutput>,
}

impl CandidateEntry {
    pub fn to_transaction(&self) -> Transaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| {
                TransactionInput::new(
                    UtxoId::new(input.transaction_id, input.output_index),
                    input.signature.clone(),
                )
            })
            .collect();
        Transaction::new(inputs, self.outputs.clone())
    }
}

/// The unspent outputs at the start of an epoch, and the transactions proposed during it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EpochDocument {
    pub utxos: Vec<UtxoEntry>,
    pub candidates: Vec<CandidateEntry>,
}

impl EpochDocument {
    pub fn load(path: &Path) -> Result<Self, EpochFileError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EpochFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, EpochFileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the pool from the snapshot entries. Every id must appear once, and no amount
    /// may be negative.
    pub fn pool(&self) -> Result<UtxoPool, EpochFileError> {
        let mut pool = UtxoPool::new();
        for entry in &self.utxos {
            let utxo_id = UtxoId::new(entry.transaction_id, entry.output_index);
            if entry.amount.is_negative() {
                return Err(EpochFileError::InvalidSnapshot {
                    utxo_id,
                    reason: "negative amount",
                });
            }
            let output = TransactionOutput::new(entry.amount, entry.owner.clone());
            if pool.insert(utxo_id, output).is_some() {
                return Err(EpochFileError::InvalidSnapshot {
                    utxo_id,
                    reason: "duplicate id",
                });
            }
        }
        Ok(pool)
    }

    pub fn candidates(&self) -> Vec<Transaction> {
        self.candidates
            .iter()
            .map(CandidateEntry::to_transaction)
            .collect()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AcceptedEntry {
    pub id: TransactionId,
    pub fee: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RejectedEntry {
    pub id: TransactionId,
    pub reason: String,
}

/// The outcome of an epoch: accepted transactions in the reported order, rejected transactions
/// with their reasons, and the resulting unspent outputs ordered by id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EpochReport {
    pub accepted: Vec<AcceptedEntry>,
    pub rejected: Vec<RejectedEntry>,
    pub total_fees: i128,
    pub utxos: Vec<UtxoEntry>,
}

impl EpochReport {
    pub fn new(epoch: &Epoch) -> Self {
        Self {
            accepted: epoch
                .accepted()
                .iter()
                .map(|accepted| AcceptedEntry {
                    id: *accepted.transaction().id(),
                    fee: accepted.fee(),
                })
                .collect(),
            rejected: epoch
                .rejected()
                .iter()
                .map(|rejected| RejectedEntry {
                    id: *rejected.transaction().id(),
                    reason: rejected.reason().to_string(),
                })
                .collect(),
            total_fees: epoch.total_fees(),
            utxos: epoch
                .pool()
                .sorted_entries()
                .into_iter()
                .map(|(utxo_id, output)| UtxoEntry::new(utxo_id, output))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ValidationEntry {
    pub id: TransactionId,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationEntry {
    fn new(transaction: &Transaction, outcome: Result<Amount, Rejection>) -> Self {
        let id = *transaction.id();
        match outcome {
            Ok(fee) => Self {
                id,
                valid: true,
                fee: Some(fee),
                reason: None,
            },
            Err(rejection) => Self {
                id,
                valid: false,
                fee: None,
                reason: Some(rejection.to_string()),
            },
        }
    }
}

/// Validates every candidate against the snapshot on its own. Nothing is applied, so
/// candidates that depend on each other are all judged against the same starting pool.
pub fn validate_candidates<V: SignatureVerifier>(
    validator: &TransactionValidator<V>,
    document: &EpochDocument,
) -> Result<Vec<ValidationEntry>, EpochFileError> {
    let pool = document.pool()?;
    Ok(document
        .candidates()
        .iter()
        .map(|transaction| ValidationEntry::new(transaction, validator.validate(transaction, &pool)))
        .collect())
}

pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), EpochFileError> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(path, json).map_err(|source| EpochFileError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

use crate::{Amount, PublicKey, Sha256, Signature};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

// Bumped whenever the layout of the hashed or signed bytes changes.
const ENCODING_VERSION: u8 = 1;

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        Sha256::from_hex(s).map(Self)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<TransactionId> for String {
    fn from(value: TransactionId) -> Self {
        value.0.to_hex()
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Identifies a transaction output: the transaction that created it, and its position there.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub struct UtxoId {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl UtxoId {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }
}

impl Display for UtxoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionInput {
    // The unspent output this input claims.
    utxo_id: UtxoId,
    // Produced by the owner of the claimed output over `Transaction::signable_payload`.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utxo_id)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: UtxoId, signature: Signature) -> Self {
        Self { utxo_id, signature }
    }

    pub fn unsigned(utxo_id: UtxoId) -> Self {
        Self::new(utxo_id, Signature::empty())
    }

    pub fn utxo_id(&self) -> &UtxoId {
        &self.utxo_id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Amount,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Amount, owner: PublicKey) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

/// An immutable transaction. The id is derived from the content, so any change to the inputs,
/// signatures or outputs produces a different transaction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::hash_transaction_data(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// Returns the identifiers under which the outputs become spendable once the transaction
    /// is accepted.
    pub fn created_utxos(&self) -> impl Iterator<Item = (UtxoId, &TransactionOutput)> + '_ {
        self.outputs.iter().enumerate().map(move |(index, output)| {
            (
                UtxoId::new(self.id, OutputIndex::new(index as u32)),
                output,
            )
        })
    }

    /// Returns a copy of the transaction with the signature of the input at `index` replaced.
    ///
    /// # Panics
    /// If the transaction has no input at `index`.
    pub fn with_signature(self, index: usize, signature: Signature) -> Self {
        let Self {
            mut inputs,
            outputs,
            ..
        } = self;
        let input_count = inputs.len();
        match inputs.get_mut(index) {
            Some(input) => input.signature = signature,
            None => panic!(
                "Cannot sign input: {} of a transaction with: {} inputs.",
                index, input_count
            ),
        }
        Self::new(inputs, outputs)
    }

    /// The bytes that the signature of the input at `index` must cover.
    ///
    /// The payload contains the encoding version, the input index, the claimed outputs of all
    /// inputs up to and including `index`, and all outputs. Signatures are never part of it, so
    /// the inputs can be signed in any order.
    ///
    /// # Panics
    /// If the transaction has no input at `index`. A validator only asks for payloads of
    /// existing inputs, so this is a bug in the caller.
    pub fn signable_payload(&self, index: usize) -> Vec<u8> {
        assert!(
            index < self.inputs.len(),
            "Transaction: {} has no input at index: {}",
            self.id,
            index
        );
        let claims = self.inputs[..=index]
            .iter()
            .map(|input| Self::encode_utxo_id(input.utxo_id()))
            .collect::<Vec<_>>();
        let outputs = Self::encode_outputs(&self.outputs);
        encode(&(ENCODING_VERSION, index as u32, claims, outputs))
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let inputs = inputs
            .iter()
            .map(|input| {
                (
                    Self::encode_utxo_id(input.utxo_id()),
                    input.signature().as_slice(),
                )
            })
            .collect::<Vec<_>>();
        let outputs = Self::encode_outputs(outputs);
        let data = encode(&(ENCODING_VERSION, inputs, outputs));
        TransactionId(Sha256::double_digest(&data))
    }

    fn encode_utxo_id(utxo_id: &UtxoId) -> ([u8; 32], u32) {
        (
            *utxo_id.transaction_id().0.raw(),
            utxo_id.output_index().value(),
        )
    }

    fn encode_outputs(outputs: &[TransactionOutput]) -> Vec<(i64, &[u8])> {
        outputs
            .iter()
            .map(|output| (output.amount().value(), output.owner().as_slice()))
            .collect()
    }
}

// Serializing plain in-memory tuples into a Vec cannot fail; if it does, the encoding is broken.
fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    bincode::serialize(value)
        .unwrap_or_else(|e| panic!("Failed to encode transaction data: {}", e))
}

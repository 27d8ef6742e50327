//! Deterministic keys and transaction builders shared by the unit tests.

use crate::{
    Amount, OutputIndex, PublicKey, Sha256, Signature, Transaction, TransactionId,
    TransactionInput, TransactionOutput, UtxoId, UtxoPool,
};
use ed25519_dalek::{Signer, SigningKey};

pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    pub fn from_seed(seed: u8) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.signing_key.verifying_key().as_bytes().to_vec())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes().to_vec())
    }

    pub fn output(&self, amount: i64) -> TransactionOutput {
        TransactionOutput::new(Amount::new(amount), self.public_key())
    }

    /// Builds a transaction that claims `utxos`, with every input signed by this wallet.
    pub fn spend(&self, utxos: &[UtxoId], outputs: Vec<TransactionOutput>) -> Transaction {
        let signers = utxos.iter().map(|_| self).collect::<Vec<_>>();
        sign_inputs(unsigned(utxos, outputs), &signers)
    }
}

pub fn unsigned(utxos: &[UtxoId], outputs: Vec<TransactionOutput>) -> Transaction {
    let inputs = utxos
        .iter()
        .map(|utxo_id| TransactionInput::unsigned(*utxo_id))
        .collect();
    Transaction::new(inputs, outputs)
}

/// Signs the input at position `i` with `signers[i]`.
pub fn sign_inputs(transaction: Transaction, signers: &[&Wallet]) -> Transaction {
    signers
        .iter()
        .enumerate()
        .fold(transaction, |transaction, (index, signer)| {
            let signature = signer.sign(&transaction.signable_payload(index));
            transaction.with_signature(index, signature)
        })
}

/// An output of a made-up transaction that predates every test epoch.
pub fn genesis_utxo(index: u32) -> UtxoId {
    UtxoId::new(
        TransactionId::new(Sha256::digest(b"genesis")),
        OutputIndex::new(index),
    )
}

/// Creates a pool in which the wallet owns one genesis output per amount.
pub fn funded_pool(owner: &Wallet, amounts: &[i64]) -> (UtxoPool, Vec<UtxoId>) {
    let mut pool = UtxoPool::new();
    let mut utxos = vec![];
    for (index, amount) in amounts.iter().enumerate() {
        let utxo_id = genesis_utxo(index as u32);
        pool.insert(utxo_id, owner.output(*amount));
        utxos.push(utxo_id);
    }
    (pool, utxos)
}

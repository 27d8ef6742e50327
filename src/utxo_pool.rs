use crate::{Transaction, TransactionOutput, UtxoId};
use std::collections::HashMap;

/// A pool of confirmed and unspent transaction outputs.
///
/// Each epoch works on its own copy of the pool (`clone()` is a deep copy), so different
/// epochs never observe each other's changes.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by the transaction that created them and their index
    // in that transaction.
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    pub fn get(&self, utxo_id: &UtxoId) -> Option<&TransactionOutput> {
        self.utxos.get(utxo_id)
    }

    /// Adds the output to the pool, returning the output previously stored under the same id.
    pub fn insert(
        &mut self,
        utxo_id: UtxoId,
        output: TransactionOutput,
    ) -> Option<TransactionOutput> {
        self.utxos.insert(utxo_id, output)
    }

    pub fn remove(&mut self, utxo_id: &UtxoId) -> Option<TransactionOutput> {
        self.utxos.remove(utxo_id)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Lists the unspent outputs ordered by their id, e.g. for reports that must not depend on
    /// the hash map iteration order.
    pub fn sorted_entries(&self) -> Vec<(&UtxoId, &TransactionOutput)> {
        let mut entries = self.utxos.iter().collect::<Vec<_>>();
        entries.sort_by_key(|(utxo_id, _)| **utxo_id);
        entries
    }

    /// Spends the outputs claimed by the transaction and makes its outputs spendable.
    /// The transaction is applied as is, without validation.
    pub fn apply_transaction(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            let spent = self.utxos.remove(input.utxo_id());
            debug_assert!(
                spent.is_some(),
                "Applied transaction: {} spends unknown output: {}",
                transaction.id(),
                input.utxo_id()
            );
        }
        for (utxo_id, output) in transaction.created_utxos() {
            self.utxos.insert(utxo_id, output.clone());
        }
    }
}

impl Extend<(UtxoId, TransactionOutput)> for UtxoPool {
    fn extend<T: IntoIterator<Item = (UtxoId, TransactionOutput)>>(&mut self, iter: T) {
        self.utxos.extend(iter)
    }
}

impl std::iter::FromIterator<(UtxoId, TransactionOutput)> for UtxoPool {
    fn from_iter<T: IntoIterator<Item = (UtxoId, TransactionOutput)>>(iter: T) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

use crate::{Epoch, EpochSelector, SignatureVerifier, Transaction, UtxoPool};

/// A public ledger that processes one epoch of proposed transactions at a time.
///
/// The ledger owns its pool: it starts from a private copy of the snapshot it was created with,
/// and the pool at the end of each epoch is the starting point of the next one.
pub struct Ledger<V> {
    selector: EpochSelector<V>,
    pool: UtxoPool,
}

impl<V: SignatureVerifier> Ledger<V> {
    pub fn new(selector: EpochSelector<V>, snapshot: &UtxoPool) -> Self {
        Self {
            selector,
            pool: snapshot.clone(),
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    /// Checks the transaction against the current pool without applying it.
    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.selector.validator().is_valid(transaction, &self.pool)
    }

    /// Runs one epoch and returns its full outcome. The ledger keeps the resulting pool.
    pub fn process_epoch(&mut self, candidates: Vec<Transaction>) -> Epoch {
        let pool = std::mem::take(&mut self.pool);
        let epoch = self.selector.select(candidates, pool);
        self.pool = epoch.pool().clone();
        epoch
    }

    /// Runs one epoch and returns the accepted transactions in the reported order.
    pub fn handle_transactions(&mut self, candidates: Vec<Transaction>) -> Vec<Transaction> {
        let pool = std::mem::take(&mut self.pool);
        let (accepted, pool) = self.selector.select(candidates, pool).into_parts();
        self.pool = pool;
        accepted
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }
}

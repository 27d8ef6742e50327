use crate::{Amount, Rejection, SignatureVerifier, Transaction, TransactionValidator, UtxoPool};
use tracing::{debug, info};

/// The order in which the accepted transactions of an epoch are reported.
/// The set of accepted transactions is the same for both.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AcceptanceOrder {
    /// Highest fee first. Transactions with equal fees keep their arrival order.
    FeeDescending,
    /// The order in which the transactions were proposed.
    Arrival,
}

impl Default for AcceptanceOrder {
    fn default() -> Self {
        AcceptanceOrder::FeeDescending
    }
}

impl std::str::FromStr for AcceptanceOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fee" => Ok(AcceptanceOrder::FeeDescending),
            "arrival" => Ok(AcceptanceOrder::Arrival),
            _ => Err(format!(
                "Unknown acceptance order: {}. Expected one of: fee, arrival",
                s
            )),
        }
    }
}

/// An accepted transaction together with the fee it pays.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionWithFee {
    transaction: Transaction,
    fee: Amount,
}

impl TransactionWithFee {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RejectedTransaction {
    transaction: Transaction,
    reason: Rejection,
}

impl RejectedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn reason(&self) -> &Rejection {
        &self.reason
    }
}

/// The outcome of processing one epoch.
#[derive(Debug, Clone)]
pub struct Epoch {
    accepted: Vec<TransactionWithFee>,
    rejected: Vec<RejectedTransaction>,
    pool: UtxoPool,
}

impl Epoch {
    /// Accepted transactions in the reported order.
    pub fn accepted(&self) -> &Vec<TransactionWithFee> {
        &self.accepted
    }

    /// Rejected transactions in arrival order.
    pub fn rejected(&self) -> &Vec<RejectedTransaction> {
        &self.rejected
    }

    /// The pool after all accepted transactions have been applied.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.accepted.iter().map(TransactionWithFee::transaction)
    }

    /// The sum of the fees of all accepted transactions.
    /// Each fee fits in 64 bits but their sum may not, so it's computed in 128 bits.
    pub fn total_fees(&self) -> i128 {
        self.accepted
            .iter()
            .map(|accepted| accepted.fee.value() as i128)
            .sum()
    }

    pub fn into_parts(self) -> (Vec<Transaction>, UtxoPool) {
        let transactions = self
            .accepted
            .into_iter()
            .map(TransactionWithFee::into_transaction)
            .collect();
        (transactions, self.pool)
    }
}

/// Selects the transactions to commit in an epoch.
///
/// Candidates are considered once, in the order they were proposed. Each candidate is validated
/// against the pool as modified by the candidates accepted before it, so a transaction may spend
/// outputs created earlier in the same epoch, and the first valid claim on an output wins.
/// The accepted transactions are then reported in the configured order.
///
/// Note that this doesn't search for the set of non-conflicting transactions with the highest
/// total fee: a low-fee transaction that arrives first shuts out a conflicting high-fee one.
pub struct EpochSelector<V> {
    validator: TransactionValidator<V>,
    order: AcceptanceOrder,
}

impl<V: SignatureVerifier> EpochSelector<V> {
    pub fn new(validator: TransactionValidator<V>, order: AcceptanceOrder) -> Self {
        Self { validator, order }
    }

    pub fn validator(&self) -> &TransactionValidator<V> {
        &self.validator
    }

    /// Processes the candidates against `pool`, which the epoch takes ownership of.
    /// Callers that need to keep their snapshot pass in a clone.
    pub fn select(&self, candidates: Vec<Transaction>, mut pool: UtxoPool) -> Epoch {
        let candidate_count = candidates.len();
        let mut accepted = vec![];
        let mut rejected = vec![];
        for transaction in candidates {
            match self.validator.validate(&transaction, &pool) {
                Ok(fee) => {
                    debug!(tx = %transaction.id(), %fee, "Accepted transaction");
                    pool.apply_transaction(&transaction);
                    accepted.push(TransactionWithFee { transaction, fee });
                }
                Err(reason) => {
                    debug!(tx = %transaction.id(), %reason, "Rejected transaction");
                    rejected.push(RejectedTransaction {
                        transaction,
                        reason,
                    });
                }
            }
        }

        if self.order == AcceptanceOrder::FeeDescending {
            // Stable sort, so equal fees keep the arrival order.
            accepted.sort_by(|lhs, rhs| rhs.fee.cmp(&lhs.fee));
        }

        let epoch = Epoch {
            accepted,
            rejected,
            pool,
        };
        info!(
            candidates = candidate_count,
            accepted = epoch.accepted.len(),
            rejected = epoch.rejected.len(),
            fees = %epoch.total_fees(),
            utxos = epoch.pool.len(),
            "Processed epoch"
        );
        epoch
    }
}

use crate::{Amount, OutputIndex, SignatureVerifier, Transaction, UtxoId, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction can't be accepted against a UTXO pool.
/// Rejections are ordinary outcomes of validation, not failures of the validator.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Rejection {
    #[error("input {input_index} claims output {utxo_id} which is not in the pool")]
    MissingUtxo { input_index: usize, utxo_id: UtxoId },
    #[error("input {input_index} is not signed by the owner of output {utxo_id}")]
    InvalidSignature { input_index: usize, utxo_id: UtxoId },
    #[error("input {input_index} claims output {utxo_id} which an earlier input already claims")]
    DuplicateClaim { input_index: usize, utxo_id: UtxoId },
    #[error("output {output_index} has negative amount {amount}")]
    NegativeOutput {
        output_index: OutputIndex,
        amount: Amount,
    },
    #[error("outputs total {outputs} but inputs only provide {inputs}")]
    ValueCreated { inputs: Amount, outputs: Amount },
    #[error("the total value of the transaction overflows")]
    ValueOverflow,
}

/// Checks transactions against a UTXO pool.
///
/// A transaction is valid if all of the following hold:
///   - Every input claims an output that is in the pool.
///   - Every input is signed by the owner of the output it claims.
///   - No output is claimed by more than one input.
///   - No output has a negative amount.
///   - The inputs provide at least as much value as the outputs spend.
///
/// Validation never modifies the pool.
pub struct TransactionValidator<V> {
    verifier: V,
}

impl<V: SignatureVerifier> TransactionValidator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn is_valid(&self, transaction: &Transaction, pool: &UtxoPool) -> bool {
        self.validate(transaction, pool).is_ok()
    }

    /// Returns the fee of the transaction if it's valid, i.e. the value of the inputs that
    /// isn't spent by the outputs, or the first rule the transaction violates.
    pub fn validate(&self, transaction: &Transaction, pool: &UtxoPool) -> Result<Amount, Rejection> {
        let total_input = self.validate_inputs(transaction, pool)?;
        let total_output = Self::validate_outputs(transaction)?;
        if total_output > total_input {
            return Err(Rejection::ValueCreated {
                inputs: total_input,
                outputs: total_output,
            });
        }
        total_input
            .checked_sub(total_output)
            .ok_or(Rejection::ValueOverflow)
    }

    /// Checks each input in order: the claimed output exists, the signature is valid, and the
    /// output hasn't been claimed by an earlier input. Returns the total claimed value.
    fn validate_inputs(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Amount, Rejection> {
        let mut claimed_utxos = HashSet::new();
        let mut total_input = Amount::zero();
        for (input_index, input) in transaction.inputs().iter().enumerate() {
            let utxo_id = *input.utxo_id();
            let claimed_output = pool.get(&utxo_id).ok_or(Rejection::MissingUtxo {
                input_index,
                utxo_id,
            })?;

            let payload = transaction.signable_payload(input_index);
            if !self
                .verifier
                .verify(claimed_output.owner(), &payload, input.signature())
            {
                return Err(Rejection::InvalidSignature {
                    input_index,
                    utxo_id,
                });
            }

            if !claimed_utxos.insert(utxo_id) {
                return Err(Rejection::DuplicateClaim {
                    input_index,
                    utxo_id,
                });
            }

            total_input = total_input
                .checked_add(claimed_output.amount())
                .ok_or(Rejection::ValueOverflow)?;
        }
        Ok(total_input)
    }

    fn validate_outputs(transaction: &Transaction) -> Result<Amount, Rejection> {
        let mut total_output = Amount::zero();
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(Rejection::NegativeOutput {
                    output_index: OutputIndex::new(index as u32),
                    amount: output.amount(),
                });
            }
            total_output = total_output
                .checked_add(output.amount())
                .ok_or(Rejection::ValueOverflow)?;
        }
        Ok(total_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{funded_pool, genesis_utxo, sign_inputs, unsigned, Wallet};
    use crate::{Ed25519Verifier, PublicKey, Signature};
    use std::cell::Cell;

    fn validator() -> TransactionValidator<Ed25519Verifier> {
        TransactionValidator::new(Ed25519Verifier)
    }

    #[test]
    fn spend_with_change_is_valid_and_pays_the_difference() {
        let alice = Wallet::from_seed(1);
        let bob = Wallet::from_seed(2);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&utxos, vec![bob.output(7)]);

        assert!(validator().is_valid(&transaction, &pool));
        assert_eq!(validator().validate(&transaction, &pool), Ok(Amount::new(3)));
    }

    #[test]
    fn validation_does_not_modify_the_pool() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let before = pool.clone();
        let transaction = alice.spend(&utxos, vec![alice.output(10)]);

        assert_eq!(validator().validate(&transaction, &pool), Ok(Amount::zero()));
        assert_eq!(pool, before);
    }

    #[test]
    fn multiple_owners_each_sign_their_input() {
        let alice = Wallet::from_seed(1);
        let bob = Wallet::from_seed(2);
        let mut pool = UtxoPool::new();
        pool.insert(genesis_utxo(0), alice.output(5));
        pool.insert(genesis_utxo(1), bob.output(6));
        let transaction = sign_inputs(
            unsigned(&[genesis_utxo(0), genesis_utxo(1)], vec![bob.output(11)]),
            &[&alice, &bob],
        );

        assert_eq!(validator().validate(&transaction, &pool), Ok(Amount::zero()));
    }

    #[test]
    fn missing_utxo_is_rejected() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&[utxos[0], genesis_utxo(1)], vec![alice.output(1)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::MissingUtxo {
                input_index: 1,
                utxo_id: genesis_utxo(1)
            })
        );
    }

    #[test]
    fn missing_utxo_is_detected_before_checking_signature() {
        let verified = Cell::new(0);
        let counting = |_: &PublicKey, _: &[u8], _: &Signature| {
            verified.set(verified.get() + 1);
            true
        };
        let validator = TransactionValidator::new(counting);
        let transaction = unsigned(&[genesis_utxo(0)], vec![]);

        assert!(!validator.is_valid(&transaction, &UtxoPool::new()));
        assert_eq!(verified.get(), 0);
    }

    #[test]
    fn signature_by_someone_else_is_rejected() {
        let alice = Wallet::from_seed(1);
        let mallory = Wallet::from_seed(3);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = mallory.spend(&utxos, vec![mallory.output(10)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::InvalidSignature {
                input_index: 0,
                utxo_id: utxos[0]
            })
        );
    }

    #[test]
    fn unsigned_input_is_rejected() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = unsigned(&utxos, vec![alice.output(1)]);

        assert!(!validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn signature_over_other_outputs_is_rejected() {
        let alice = Wallet::from_seed(1);
        let mallory = Wallet::from_seed(3);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let honest = alice.spend(&utxos, vec![alice.output(10)]);
        // Reuse alice's signature on a transaction that pays mallory instead.
        let forged = unsigned(&utxos, vec![mallory.output(10)])
            .with_signature(0, honest.inputs()[0].signature().clone());

        assert!(validator().is_valid(&honest, &pool));
        assert!(!validator().is_valid(&forged, &pool));
    }

    #[test]
    fn claiming_the_same_utxo_twice_is_rejected() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&[utxos[0], utxos[0]], vec![alice.output(15)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::DuplicateClaim {
                input_index: 1,
                utxo_id: utxos[0]
            })
        );
    }

    #[test]
    fn signature_is_checked_before_duplicate_claim() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = unsigned(&[utxos[0], utxos[0]], vec![alice.output(1)]);
        // Only the first input is signed; the second repeats the claim without a signature.
        let signature = alice.sign(&transaction.signable_payload(0));
        let transaction = transaction.with_signature(0, signature);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::InvalidSignature {
                input_index: 1,
                utxo_id: utxos[0]
            })
        );
    }

    #[test]
    fn duplicate_claim_is_rejected_even_without_value_creation() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&[utxos[0], utxos[0]], vec![alice.output(1)]);

        assert!(!validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn negative_output_is_rejected() {
        let alice = Wallet::from_seed(1);
        let bob = Wallet::from_seed(2);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&utxos, vec![bob.output(5), alice.output(-1)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::NegativeOutput {
                output_index: OutputIndex::new(1),
                amount: Amount::new(-1)
            })
        );
    }

    #[test]
    fn negative_output_cannot_balance_a_larger_output() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&utxos, vec![alice.output(20), alice.output(-10)]);

        assert!(!validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn spending_more_than_the_inputs_is_rejected() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[4, 5]);
        let transaction = alice.spend(&utxos, vec![alice.output(10)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::ValueCreated {
                inputs: Amount::new(9),
                outputs: Amount::new(10)
            })
        );
    }

    #[test]
    fn overflowing_outputs_are_rejected() {
        let alice = Wallet::from_seed(1);
        let (pool, utxos) = funded_pool(&alice, &[10]);
        let transaction = alice.spend(&utxos, vec![alice.output(i64::MAX), alice.output(1)]);

        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(Rejection::ValueOverflow)
        );
    }

    #[test]
    fn transaction_without_inputs_or_outputs_is_valid() {
        let transaction = unsigned(&[], vec![]);
        assert_eq!(
            validator().validate(&transaction, &UtxoPool::new()),
            Ok(Amount::zero())
        );
    }

    #[test]
    fn rejection_messages_name_the_input() {
        let rejection = Rejection::MissingUtxo {
            input_index: 2,
            utxo_id: genesis_utxo(4),
        };
        let message = rejection.to_string();
        assert!(message.starts_with("input 2 claims output"));
        assert!(message.ends_with(":4 which is not in the pool"));
    }
}

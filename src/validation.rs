use crate::{CryptoError, SignatureVerifier, Transaction, TransactionOutput, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// The reason a transaction was rejected.
/// Every variant means the same thing to the ledger: the transaction is invalid as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Input: {input} claims: {utxo} which is not in the UTXO pool")]
    MissingUtxo { input: usize, utxo: Utxo },

    #[error("Input: {input} claims: {utxo} which is already claimed by another input")]
    DoubleClaim { input: usize, utxo: Utxo },

    #[error("Input: {input} is not signed")]
    MissingSignature { input: usize },

    #[error("Input: {input} signature doesn't verify under the owner of: {utxo}")]
    InvalidSignature { input: usize, utxo: Utxo },

    #[error("Input: {input} signature couldn't be verified: {source}")]
    Unverifiable { input: usize, source: CryptoError },

    #[error("Output: {output} has negative amount: {amount}")]
    NegativeOutput { output: usize, amount: i64 },

    #[error("Outputs total: {output_total} exceeds the claimed total: {input_total}")]
    ValueNotConserved { input_total: i64, output_total: i64 },

    #[error("Total amount overflows")]
    Overflow,
}

/// Responsible for checking a single transaction against a UTXO pool.
/// The checks only read the pool, so the pool is the same after any of them, valid or not.
pub struct TransactionValidator {}

impl TransactionValidator {
    /// Checks that all of the following hold:
    ///   - every claimed output is in the pool
    ///   - no output is claimed twice by the transaction
    ///   - every input is signed by the owner of the output it claims
    ///   - no output amount is negative
    ///   - the outputs don't add up to more than the claimed outputs
    pub fn validate<V: SignatureVerifier + ?Sized>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<(), Rejection> {
        Self::validate_claimed_outputs_exist(transaction, pool)?;
        Self::validate_no_double_claims(transaction)?;
        Self::validate_signatures(transaction, pool, verifier)?;
        Self::validate_outputs_non_negative(transaction)?;
        Self::validate_value_conserved(transaction, pool)
    }

    fn validate_claimed_outputs_exist(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), Rejection> {
        for (input, transaction_input) in transaction.inputs().iter().enumerate() {
            Self::claimed_output(pool, input, transaction_input.utxo())?;
        }
        Ok(())
    }

    fn validate_no_double_claims(transaction: &Transaction) -> Result<(), Rejection> {
        // Keyed by what the inputs claim, not by anything derived from this transaction's
        // own outputs.
        let mut claimed = HashSet::with_capacity(transaction.inputs().len());
        for (input, transaction_input) in transaction.inputs().iter().enumerate() {
            if !claimed.insert(transaction_input.utxo()) {
                return Err(Rejection::DoubleClaim {
                    input,
                    utxo: *transaction_input.utxo(),
                });
            }
        }
        Ok(())
    }

    fn validate_signatures<V: SignatureVerifier + ?Sized>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<(), Rejection> {
        for (input, transaction_input) in transaction.inputs().iter().enumerate() {
            let utxo = transaction_input.utxo();
            let owner = Self::claimed_output(pool, input, utxo)?.public_key();
            let signature = transaction_input
                .signature()
                .ok_or(Rejection::MissingSignature { input })?;
            match verifier.verify(owner, transaction.signing_payload(), signature) {
                Ok(true) => {}
                Ok(false) => return Err(Rejection::InvalidSignature { input, utxo: *utxo }),
                Err(source) => {
                    // Fail closed: a signature that couldn't be checked is not a valid one.
                    warn!(
                        "Couldn't verify signature of input: {} of transaction: {}: {}",
                        input,
                        transaction.id(),
                        source
                    );
                    return Err(Rejection::Unverifiable { input, source });
                }
            }
        }
        Ok(())
    }

    fn validate_outputs_non_negative(transaction: &Transaction) -> Result<(), Rejection> {
        match transaction
            .outputs()
            .iter()
            .enumerate()
            .find(|(_, output)| output.amount() < 0)
        {
            Some((output, transaction_output)) => Err(Rejection::NegativeOutput {
                output,
                amount: transaction_output.amount(),
            }),
            None => Ok(()),
        }
    }

    fn validate_value_conserved(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), Rejection> {
        let mut input_total: i64 = 0;
        for (input, transaction_input) in transaction.inputs().iter().enumerate() {
            let claimed = Self::claimed_output(pool, input, transaction_input.utxo())?;
            input_total = input_total
                .checked_add(claimed.amount())
                .ok_or(Rejection::Overflow)?;
        }

        let output_total = transaction
            .outputs()
            .iter()
            .try_fold(0i64, |total, output| total.checked_add(output.amount()))
            .ok_or(Rejection::Overflow)?;

        if output_total > input_total {
            Err(Rejection::ValueNotConserved {
                input_total,
                output_total,
            })
        } else {
            Ok(())
        }
    }

    fn claimed_output<'a>(
        pool: &'a UtxoPool,
        input: usize,
        utxo: &Utxo,
    ) -> Result<&'a TransactionOutput, Rejection> {
        pool.get(utxo)
            .ok_or(Rejection::MissingUtxo { input, utxo: *utxo })
    }
}

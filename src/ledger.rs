use crate::{
    Ed25519Verifier, Rejection, SignatureVerifier, Transaction, TransactionId,
    TransactionValidator, UtxoPool,
};
use std::collections::HashSet;
use tracing::{debug, info};

/// What happened to a candidate transaction during an epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
    // The same transaction was already applied by this ledger, in this epoch or an earlier one.
    Duplicate,
}

/// Settles batches of proposed transactions against its own copy of a UTXO pool.
///
/// Transactions in a batch are processed in the order they are given, and each one is checked
/// against the pool as it stands after all the earlier acceptances of the same batch. This is
/// greedy: when two transactions claim the same output, whichever comes first wins. No attempt
/// is made to find the largest set of mutually valid transactions.
pub struct Ledger<V: SignatureVerifier = Ed25519Verifier> {
    // Exclusively owned. The pool passed in at construction is never touched.
    pool: UtxoPool,
    verifier: V,
    // Every transaction known to have been applied to the pool. Input-free transactions stay
    // valid after being applied, so they are only kept from being applied twice by this set.
    applied: HashSet<TransactionId>,
}

impl Ledger {
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_verifier(pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> Ledger<V> {
    pub fn with_verifier(pool: &UtxoPool, verifier: V) -> Self {
        let applied = pool
            .iter()
            .map(|(utxo, _)| *utxo.transaction_id())
            .collect();
        Self {
            pool: pool.clone(),
            verifier,
            applied,
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    /// Returns whether the transaction is valid against the current state of the pool.
    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.check(transaction).is_ok()
    }

    /// Same as `is_valid`, but tells which check failed.
    pub fn check(&self, transaction: &Transaction) -> Result<(), Rejection> {
        TransactionValidator::validate(transaction, &self.pool, &self.verifier)
    }

    /// Processes one epoch worth of candidate transactions and returns the accepted ones.
    /// Each accepted transaction spends the outputs it claims and adds its own outputs to the
    /// pool before the next candidate is checked. Rejected candidates are skipped without any
    /// effect on the pool.
    ///
    /// The returned transactions are unique. Their order is unspecified.
    pub fn apply_epoch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.settle_epoch(candidates)
            .into_iter()
            .zip(candidates)
            .filter(|(outcome, _)| *outcome == Outcome::Accepted)
            .map(|(_, transaction)| transaction.clone())
            .collect()
    }

    /// Same as `apply_epoch`, but returns what happened to each candidate, in candidate order.
    pub fn settle_epoch(&mut self, candidates: &[Transaction]) -> Vec<Outcome> {
        let mut accepted = 0;
        let mut outcomes = Vec::with_capacity(candidates.len());
        for transaction in candidates {
            let outcome = if self.applied.contains(transaction.id()) {
                debug!("Transaction: {} already applied", transaction.id());
                Outcome::Duplicate
            } else {
                match self.check(transaction) {
                    Ok(()) => {
                        self.apply(transaction);
                        accepted += 1;
                        debug!("Accepted transaction: {}", transaction.id());
                        Outcome::Accepted
                    }
                    Err(rejection) => {
                        debug!("Rejected transaction: {}: {}", transaction.id(), rejection);
                        Outcome::Rejected(rejection)
                    }
                }
            };
            outcomes.push(outcome);
        }
        info!(
            "Epoch settled. Candidates: {}, accepted: {}, unspent outputs: {}",
            candidates.len(),
            accepted,
            self.pool.len()
        );
        outcomes
    }

    fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.pool.remove(input.utxo());
        }
        for (index, output) in (0..).zip(transaction.outputs()) {
            self.pool.add(transaction.utxo(index), output.clone());
        }
        self.applied.insert(*transaction.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        KeyPair, OutputIndex, Sha256, TransactionId, TransactionOutput, UnsignedTransaction, Utxo,
    };

    struct Fixture {
        pool: UtxoPool,
        k1: KeyPair,
        k2: KeyPair,
        utxo1: Utxo,
    }

    // pool = {utxo1 -> (10, K1)}
    fn fixture() -> Fixture {
        let k1 = KeyPair::generate();
        let utxo1 = Utxo::new(
            TransactionId::new(Sha256::digest(b"genesis")),
            OutputIndex::new(0),
        );
        let mut pool = UtxoPool::new();
        pool.add(utxo1, TransactionOutput::new(10, k1.public_key()));
        Fixture {
            pool,
            k1,
            k2: KeyPair::generate(),
            utxo1,
        }
    }

    fn transfer(from: &KeyPair, utxo: Utxo, amount: i64, to: &KeyPair) -> Transaction {
        UnsignedTransaction::new()
            .claim(utxo)
            .pay(amount, to.public_key())
            .sign(&[from])
            .unwrap()
    }

    #[test]
    fn single_transfer_advances_the_pool() {
        let f = fixture();
        let t1 = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let mut ledger = Ledger::new(&f.pool);

        assert_eq!(ledger.apply_epoch(&[t1.clone()]), vec![t1.clone()]);

        let pool = ledger.pool();
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(&f.utxo1));
        assert_eq!(
            pool.get(&Utxo::new(*t1.id(), OutputIndex::new(0))),
            Some(&TransactionOutput::new(10, f.k2.public_key()))
        );
    }

    #[test]
    fn overspending_transfer_is_rejected() {
        let f = fixture();
        let t1 = transfer(&f.k1, f.utxo1, 15, &f.k2);
        let mut ledger = Ledger::new(&f.pool);

        assert!(!ledger.is_valid(&t1));
        assert!(ledger.apply_epoch(&[t1]).is_empty());
        assert_eq!(ledger.pool(), &f.pool);
    }

    #[test]
    fn caller_pool_is_never_mutated() {
        let f = fixture();
        let before = f.pool.clone();
        let mut ledger = Ledger::new(&f.pool);
        ledger.apply_epoch(&[transfer(&f.k1, f.utxo1, 10, &f.k2)]);
        assert_eq!(f.pool, before);
        assert_ne!(ledger.into_pool(), before);
    }

    #[test]
    fn conflicting_transactions_are_resolved_by_order() {
        let f = fixture();
        let a = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let b = transfer(&f.k1, f.utxo1, 9, &f.k1);

        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[a.clone(), b.clone()]), vec![a.clone()]);

        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[b.clone(), a]), vec![b]);
    }

    #[test]
    fn later_transaction_can_spend_earlier_outputs() {
        let f = fixture();
        let first = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let second = transfer(&f.k2, first.utxo(0), 8, &f.k1);

        let mut ledger = Ledger::new(&f.pool);
        let accepted = ledger.apply_epoch(&[first.clone(), second.clone()]);

        assert_eq!(accepted, vec![first.clone(), second.clone()]);
        assert!(!ledger.pool().contains(&first.utxo(0)));
        assert_eq!(
            ledger.pool().get(&second.utxo(0)),
            Some(&TransactionOutput::new(8, f.k1.public_key()))
        );
    }

    #[test]
    fn spending_an_output_before_it_exists_is_rejected() {
        let f = fixture();
        let first = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let second = transfer(&f.k2, first.utxo(0), 8, &f.k1);

        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[second, first.clone()]), vec![first]);
    }

    #[test]
    fn duplicate_candidate_is_accepted_once() {
        let f = fixture();
        let t1 = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[t1.clone(), t1.clone()]), vec![t1]);
        assert_eq!(ledger.pool().len(), 1);
    }

    #[test]
    fn duplicate_input_free_candidate_is_accepted_once() {
        // Claims nothing and creates nothing of value, so it stays valid after being applied.
        let f = fixture();
        let empty = UnsignedTransaction::new()
            .pay(0, f.k2.public_key())
            .sign(&[])
            .unwrap();
        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[empty.clone(), empty.clone()]), vec![empty]);
        assert_eq!(ledger.pool().len(), 2);
    }

    #[test]
    fn settle_epoch_reports_every_candidate() {
        let f = fixture();
        let overspend = transfer(&f.k1, f.utxo1, 11, &f.k2);
        let t1 = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let conflicting = transfer(&f.k1, f.utxo1, 10, &f.k1);

        let mut ledger = Ledger::new(&f.pool);
        let outcomes = ledger.settle_epoch(&[overspend, t1.clone(), t1, conflicting]);

        assert_eq!(
            outcomes,
            vec![
                Outcome::Rejected(Rejection::ValueNotConserved {
                    input_total: 10,
                    output_total: 11
                }),
                Outcome::Accepted,
                Outcome::Duplicate,
                Outcome::Rejected(Rejection::MissingUtxo {
                    input: 0,
                    utxo: f.utxo1
                }),
            ]
        );
    }

    #[test]
    fn rejected_candidate_does_not_stop_the_epoch() {
        let f = fixture();
        let invalid = transfer(&f.k2, f.utxo1, 10, &f.k2);
        let valid = transfer(&f.k1, f.utxo1, 10, &f.k2);

        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(ledger.apply_epoch(&[invalid, valid.clone()]), vec![valid]);
    }

    #[test]
    fn state_carries_over_to_the_next_epoch() {
        let f = fixture();
        let t1 = transfer(&f.k1, f.utxo1, 10, &f.k2);
        let mut ledger = Ledger::new(&f.pool);
        ledger.apply_epoch(&[t1.clone()]);

        // Already spent in the previous epoch.
        assert!(ledger.apply_epoch(&[t1.clone()]).is_empty());

        let t2 = transfer(&f.k2, t1.utxo(0), 10, &f.k1);
        assert_eq!(ledger.apply_epoch(&[t2.clone()]), vec![t2]);
    }

    #[test]
    fn spent_input_free_output_stays_spent_in_later_epochs() {
        let f = fixture();
        let mint = UnsignedTransaction::new()
            .pay(0, f.k1.public_key())
            .sign(&[])
            .unwrap();
        let spend = transfer(&f.k1, mint.utxo(0), 0, &f.k2);

        let mut ledger = Ledger::new(&f.pool);
        assert_eq!(
            ledger.apply_epoch(&[mint.clone(), spend.clone()]),
            vec![mint.clone(), spend]
        );

        let outcomes = ledger.settle_epoch(&[mint.clone()]);
        assert_eq!(outcomes, vec![Outcome::Duplicate]);
        assert!(!ledger.pool().contains(&mint.utxo(0)));
        assert_eq!(ledger.pool().len(), 2);
    }

    #[test]
    fn transactions_already_in_the_pool_are_not_applied_again() {
        let f = fixture();
        let mint = UnsignedTransaction::new()
            .pay(0, f.k1.public_key())
            .sign(&[])
            .unwrap();
        let mut ledger = Ledger::new(&f.pool);
        ledger.apply_epoch(&[mint.clone()]);

        let mut restarted = Ledger::new(ledger.pool());
        assert!(restarted.apply_epoch(&[mint]).is_empty());
        assert_eq!(restarted.pool(), ledger.pool());
    }
}

use crate::{LedgerError, PublicKey, TransactionOutput, Utxo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pool of confirmed and unspent transaction outputs.
///
/// An identifier is in the pool iff the output it names was created by an accepted transaction
/// and hasn't been spent by another accepted transaction. Entries are only ever inserted or
/// removed, never modified in place.
/// `Clone` is a deep copy, so a clone can be advanced without affecting the original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PoolSnapshot", into = "PoolSnapshot")]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// Adds the output under the given identifier.
    /// The caller guarantees that the identifier isn't in the pool already.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    /// Removes the identifier from the pool, returning the output it named if it was present.
    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Returns all unspent outputs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// Sums up the unspent outputs owned by each public key.
    /// Returns None if the balance of any owner doesn't fit in an i64.
    pub fn balances(&self) -> Option<HashMap<PublicKey, i64>> {
        let mut balances = HashMap::new();
        for output in self.utxos.values() {
            // Ensure that the key exists if it's the first time we're seeing the owner.
            let balance = balances.entry(*output.public_key()).or_insert(0i64);
            *balance = balance.checked_add(output.amount())?;
        }
        Some(balances)
    }

    /// Total value held in the pool, or None if it doesn't fit in an i64.
    pub fn total_value(&self) -> Option<i64> {
        self.utxos
            .values()
            .try_fold(0i64, |total, output| total.checked_add(output.amount()))
    }
}

#[derive(Serialize, Deserialize)]
struct PoolEntry {
    utxo: Utxo,
    output: TransactionOutput,
}

// Snapshot files list the entries sorted by identifier, so the same pool always produces the
// same file.
#[derive(Serialize, Deserialize)]
struct PoolSnapshot {
    utxos: Vec<PoolEntry>,
}

impl From<UtxoPool> for PoolSnapshot {
    fn from(pool: UtxoPool) -> Self {
        let mut utxos = pool
            .utxos
            .into_iter()
            .map(|(utxo, output)| PoolEntry { utxo, output })
            .collect::<Vec<PoolEntry>>();
        utxos.sort_by(|lhs, rhs| lhs.utxo.cmp(&rhs.utxo));
        Self { utxos }
    }
}

impl TryFrom<PoolSnapshot> for UtxoPool {
    type Error = LedgerError;

    fn try_from(snapshot: PoolSnapshot) -> Result<Self, Self::Error> {
        let mut utxos = HashMap::with_capacity(snapshot.utxos.len());
        for PoolEntry { utxo, output } in snapshot.utxos {
            if utxos.insert(utxo, output).is_some() {
                return Err(LedgerError::DuplicateUtxo(utxo));
            }
        }
        Ok(Self { utxos })
    }
}

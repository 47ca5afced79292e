use crate::{KeyPair, LedgerError, PublicKey, Sha256, Signature, Utxo};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
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
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TransactionInput {
    // The output this input claims.
    utxo: Utxo,
    // Made by the key of the claimed output's owner over the transaction's signing payload.
    signature: Option<Signature>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utxo)
    }
}

impl TransactionInput {
    pub fn new(utxo: Utxo, signature: Option<Signature>) -> Self {
        Self { utxo, signature }
    }

    pub fn utxo(&self) -> &Utxo {
        &self.utxo
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TransactionOutput {
    amount: i64,
    public_key: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.amount, self.public_key)
    }
}

impl TransactionOutput {
    pub fn new(amount: i64, public_key: PublicKey) -> Self {
        Self { amount, public_key }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// An immutable transaction. Its id is derived from the inputs (signatures included) and the
/// outputs, and two transactions are equal iff their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TransactionData", into = "TransactionData")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    signing_payload: Vec<u8>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, LedgerError> {
        // Every output must be addressable by an OutputIndex.
        if u32::try_from(outputs.len()).is_err() {
            return Err(LedgerError::InvalidArgument(format!(
                "A transaction can have at most {} outputs, got: {}",
                u32::MAX,
                outputs.len()
            )));
        }
        let claimed = inputs.iter().map(TransactionInput::utxo).collect::<Vec<_>>();
        let signing_payload = encode_signing_payload(&claimed, &outputs)?;
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
            signing_payload,
        })
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

    /// The bytes every input signature is made over: the claimed UTXOs and the outputs, without
    /// any signatures.
    pub fn signing_payload(&self) -> &[u8] {
        &self.signing_payload
    }

    /// Identifier of the UTXO that the output at `index` becomes once the transaction is applied.
    pub fn utxo(&self, index: u32) -> Utxo {
        Utxo::new(self.id, OutputIndex::new(index))
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, LedgerError> {
        let data = bincode::serialize(&(inputs, outputs))?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

// The serialized form. The id and signing payload are always recomputed on the way in.
#[derive(Serialize, Deserialize)]
struct TransactionData {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TryFrom<TransactionData> for Transaction {
    type Error = LedgerError;

    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        Transaction::new(data.inputs, data.outputs)
    }
}

impl From<Transaction> for TransactionData {
    fn from(transaction: Transaction) -> Self {
        Self {
            inputs: transaction.inputs,
            outputs: transaction.outputs,
        }
    }
}

fn encode_signing_payload(
    claimed: &[&Utxo],
    outputs: &[TransactionOutput],
) -> Result<Vec<u8>, LedgerError> {
    Ok(bincode::serialize(&(claimed, outputs))?)
}

/// A transaction that hasn't been signed yet.
/// This is what a wallet builds, signs with the keys of the claimed outputs' owners, and then
/// submits as a `Transaction`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct UnsignedTransaction {
    inputs: Vec<Utxo>,
    outputs: Vec<TransactionOutput>,
}

impl UnsignedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(mut self, utxo: Utxo) -> Self {
        self.inputs.push(utxo);
        self
    }

    pub fn pay(mut self, amount: i64, public_key: PublicKey) -> Self {
        self.outputs.push(TransactionOutput::new(amount, public_key));
        self
    }

    pub fn inputs(&self) -> &Vec<Utxo> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    pub fn signing_payload(&self) -> Result<Vec<u8>, LedgerError> {
        let claimed = self.inputs.iter().collect::<Vec<&Utxo>>();
        encode_signing_payload(&claimed, &self.outputs)
    }

    /// Signs input `i` with `key_pairs[i]`.
    pub fn sign(self, key_pairs: &[&KeyPair]) -> Result<Transaction, LedgerError> {
        if key_pairs.len() != self.inputs.len() {
            return Err(LedgerError::InvalidArgument(format!(
                "Expected: {} keys, one per input, but got: {}",
                self.inputs.len(),
                key_pairs.len()
            )));
        }
        let payload = self.signing_payload()?;
        let signatures = key_pairs
            .iter()
            .map(|key_pair| Some(key_pair.sign(&payload)))
            .collect();
        self.with_signatures(signatures)
    }

    /// Attaches the given signatures as they are, `None` leaving the input unsigned.
    pub fn with_signatures(
        self,
        signatures: Vec<Option<Signature>>,
    ) -> Result<Transaction, LedgerError> {
        if signatures.len() != self.inputs.len() {
            return Err(LedgerError::InvalidArgument(format!(
                "Expected: {} signatures, one per input, but got: {}",
                self.inputs.len(),
                signatures.len()
            )));
        }
        let inputs = self
            .inputs
            .into_iter()
            .zip(signatures)
            .map(|(utxo, signature)| TransactionInput::new(utxo, signature))
            .collect();
        Transaction::new(inputs, self.outputs)
    }
}

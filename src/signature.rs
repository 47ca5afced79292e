use crate::hex_bytes;
use crate::public_key::PUBLIC_KEY_BYTE_COUNT;
use crate::PublicKey;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const SIGNATURE_BYTE_COUNT: usize = 64;
const SECRET_KEY_BYTE_COUNT: usize = 32;

/// Failures of the verification backend itself, as opposed to a signature that doesn't verify.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Public key: {0} is not a valid Ed25519 verification key")]
    InvalidPublicKey(PublicKey),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Signature backend unavailable: {0}")]
    Unavailable(String),
}

/// An Ed25519 signature over the signing payload of a transaction.
#[derive(Debug, Copy, Clone, Hash, Serialize, Deserialize, Eq, PartialEq)]
pub struct Signature(
    #[serde(
        serialize_with = "hex_bytes::serialize",
        deserialize_with = "hex_bytes::deserialize"
    )]
    [u8; SIGNATURE_BYTE_COUNT],
);

impl Signature {
    pub const fn from_raw(bytes: [u8; SIGNATURE_BYTE_COUNT]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTE_COUNT] {
        &self.0
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Verifies signatures on behalf of the validator.
///
/// `Ok(false)` means the signature doesn't verify. `Err` is reserved for failures of the
/// backend or the key material, and must never be read as a valid signature.
pub trait SignatureVerifier {
    fn verify(
        &self,
        public_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<bool, CryptoError>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        public_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<bool, CryptoError> {
        let verifying_key = VerifyingKey::from_bytes(public_key.as_bytes())
            .map_err(|_| CryptoError::InvalidPublicKey(*public_key))?;
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

/// An Ed25519 signing key together with the public key that identifies its owner.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_BYTE_COUNT]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    pub fn from_secret_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidSecretKey(e.to_string()))?;
        let bytes = <[u8; SECRET_KEY_BYTE_COUNT]>::try_from(bytes.as_slice()).map_err(|_| {
            CryptoError::InvalidSecretKey(format!(
                "Expected: {} bytes but got: {}",
                SECRET_KEY_BYTE_COUNT,
                bytes.len()
            ))
        })?;
        Ok(Self::from_secret_bytes(&bytes))
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        let bytes: [u8; PUBLIC_KEY_BYTE_COUNT] = self.signing_key.verifying_key().to_bytes();
        PublicKey::new(bytes)
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_raw(self.signing_key.sign(message).to_bytes())
    }
}

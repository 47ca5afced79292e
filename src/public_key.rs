use crate::hex_bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// The recipient identity of a transaction output: the raw bytes of an Ed25519 verification key.
///
/// The bytes are not checked to be a valid curve point when the key is constructed. A malformed
/// key surfaces as a `CryptoError` when a signature is verified against it.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize, Eq, PartialEq)]
pub struct PublicKey(
    #[serde(
        serialize_with = "hex_bytes::serialize",
        deserialize_with = "hex_bytes::deserialize"
    )]
    [u8; PUBLIC_KEY_BYTE_COUNT],
);

impl PublicKey {
    pub const fn new(bytes: [u8; PUBLIC_KEY_BYTE_COUNT]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        <[u8; PUBLIC_KEY_BYTE_COUNT]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| {
                format!(
                    "Invalid public key length. Expected: {} but got: {} in: {}",
                    PUBLIC_KEY_BYTE_COUNT,
                    bytes.len(),
                    s
                )
            })
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

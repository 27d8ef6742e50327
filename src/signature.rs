use crate::PublicKey;
use ed25519_dalek::Verifier;
use serde::{Deserialize, Serialize};
use std::convert::{TryFrom, TryInto};
use std::fmt::{Display, Formatter};

/// Signature bytes attached to a transaction input.
#[derive(Debug, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Placeholder used while the transaction is being built and the input is not signed yet.
    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }
}

impl TryFrom<String> for Signature {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(value: Signature) -> Self {
        hex::encode(value.0)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Checks that a message was signed by the owner of the public key.
///
/// Implementations must be pure and deterministic: the same inputs always give the same answer.
/// Any function or closure with the matching signature is a verifier, which lets tests swap in
/// a fake signature scheme.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&PublicKey, &[u8], &Signature) -> bool,
{
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        self(public_key, message, signature)
    }
}

/// Verifies Ed25519 signatures.
/// Public keys are the 32-byte compressed points, signatures are 64 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let key_bytes: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] =
            match public_key.as_slice().try_into() {
                Ok(bytes) => bytes,
                Err(_) => return false,
            };
        let verifying_key = match ed25519_dalek::VerifyingKey::from_bytes(&key_bytes) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature.as_slice()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

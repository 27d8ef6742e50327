use sha2::Digest;
use std::convert::TryInto;
use std::fmt::{Display, Formatter};

const SHA256_BYTE_COUNT: usize = 32;

/// Sha-256 is a 256-bit array or 32 bytes.
/// It provides an API to display as hex-encoded string and parse it from a hex-encoded string.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut output = [0; SHA256_BYTE_COUNT];
        output.copy_from_slice(result.as_slice());
        Sha256::from_raw(output)
    }

    /// Hashes the data twice, the way transaction identifiers are derived.
    pub fn double_digest(data: &[u8]) -> Self {
        let first_hash = Self::digest(data);
        Self::digest(first_hash.as_slice())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn raw(&self) -> &[u8; SHA256_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let len = bytes.len();
        let raw: [u8; SHA256_BYTE_COUNT] = bytes.try_into().map_err(|_| {
            format!(
                "Invalid SHA-256 length. Expected: {} but got: {} in: {}",
                SHA256_BYTE_COUNT, len, s
            )
        })?;
        Ok(Sha256::from_raw(raw))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_hello_world() {
        let hash = Sha256::digest(b"hello world");
        assert_eq!(
            hash.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn double_digest_hashes_the_digest() {
        let once = Sha256::digest(b"hello world");
        assert_eq!(
            Sha256::double_digest(b"hello world"),
            Sha256::digest(once.as_slice())
        );
    }

    #[test]
    fn hex_round_trip() {
        let hash = Sha256::digest(b"epoch");
        assert_eq!(Sha256::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let error = Sha256::from_hex("abcd").unwrap_err();
        assert!(error.contains("Expected: 32 but got: 2"));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(Sha256::from_hex("zz").is_err());
    }
}

//! Solana addresses.
//!
//! A Solana address is the Base58 encoding of 32 raw bytes: either an
//! Ed25519 public key or a program-derived address. There is no hashing or
//! checksum step. [`Pubkey`] wraps the raw bytes so that the same value can
//! travel through borsh account layouts, JSON bodies and instruction metas.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;

/// A 32-byte Solana address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_array(&self) -> &[u8; 32] {
        &self.0
    }

    /// Public key of a 32-byte Ed25519 seed.
    pub fn from_signing_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed).verifying_key().to_bytes())
    }

    /// Parse from a byte slice of exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_address(&self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.trim().parse().map_err(de::Error::custom)
    }
}

/// Decode a Solana address string to its 32-byte representation.
///
/// Returns an error if the address is not valid Base58 or does not decode
/// to exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes.
    #[test]
    fn system_program_address() {
        let zeros = Pubkey::default();
        assert_eq!(zeros.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn roundtrip_encode_decode() {
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let bytes = address_to_bytes(address).unwrap();
        assert_eq!(bytes_to_address(&bytes), address);
    }

    #[test]
    fn parse_and_display() {
        let key: Pubkey = "758R2jFfces6Ue5B9rLmRrh8NesiU9dCtDa4bUSBpCMt".parse().unwrap();
        assert_eq!(key.to_string(), "758R2jFfces6Ue5B9rLmRrh8NesiU9dCtDa4bUSBpCMt");
        assert_eq!(key.as_array()[0], 0x5a);
    }

    #[test]
    fn public_key_from_seed_matches_dalek() {
        let seed = [0x11u8; 32];
        let expected = ed25519_dalek::SigningKey::from_bytes(&seed).verifying_key().to_bytes();
        assert_eq!(Pubkey::from_signing_seed(&seed).to_bytes(), expected);
    }

    #[test]
    fn parse_garbage_fails() {
        assert!("not-a-valid-address!!!".parse::<Pubkey>().is_err());
    }

    #[test]
    fn parse_too_short_fails() {
        // "1" decodes to a single zero byte.
        let err = "1".parse::<Pubkey>().unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes"));
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(Pubkey::from_slice(&[7u8; 31]).is_err());
        assert_eq!(Pubkey::from_slice(&[7u8; 32]).unwrap(), Pubkey([7u8; 32]));
    }

    #[test]
    fn serde_uses_base58_string() {
        let key = Pubkey([0u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"11111111111111111111111111111111\"");

        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn serde_rejects_bad_string() {
        let result: Result<Pubkey, _> = serde_json::from_str("\"0OIl\"");
        assert!(result.is_err());
    }

    #[test]
    fn borsh_is_raw_32_bytes() {
        let key = Pubkey([0xAB; 32]);
        let bytes = borsh::to_vec(&key).unwrap();
        assert_eq!(bytes, vec![0xAB; 32]);
        let back: Pubkey = borsh::from_slice(&bytes).unwrap();
        assert_eq!(back, key);
    }
}

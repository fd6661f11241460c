//! secp256k1 key pairs and canonical address derivation.

use alloy::hex;
use alloy::primitives::{keccak256, Address};
use alloy::signers::k256::ecdsa::{SigningKey, VerifyingKey};
use alloy::signers::k256::elliptic_curve::sec1::ToEncodedPoint;
use alloy::signers::local::PrivateKeySigner;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// A secp256k1 private scalar with its public point.
///
/// The address is always derived from the public key on demand; it is a
/// projection, not stored state.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new key pair from the OS random source.
    ///
    /// Fails with [`Error::Entropy`] if the source cannot supply randomness.
    /// Candidate bytes outside the valid scalar range are rejected and
    /// redrawn.
    pub fn generate() -> Result<Self> {
        let mut candidate = Zeroizing::new([0u8; 32]);
        loop {
            OsRng
                .try_fill_bytes(candidate.as_mut())
                .map_err(|e| Error::Entropy(e.to_string()))?;
            if let Ok(signing_key) = SigningKey::from_slice(candidate.as_ref()) {
                return Ok(Self { signing_key });
            }
        }
    }

    /// Reconstruct a key pair from 32 raw private-key bytes.
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| Error::Key(format!("invalid private key: {}", e)))?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a key pair from a hex private key, with or without the
    /// `0x` prefix.
    pub fn from_private_hex(s: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(s).map_err(|e| Error::Key(format!("invalid private key hex: {}", e)))?,
        );
        Self::from_private_bytes(&bytes)
    }

    /// Raw 32-byte private scalar.
    pub fn private_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    /// `0x`-prefixed hex private key.
    pub fn private_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode_prefixed(self.signing_key.to_bytes()))
    }

    /// The public point.
    pub fn public_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// Uncompressed SEC1 public-key bytes (65 bytes, leading `0x04`).
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public_key().to_encoded_point(false).as_bytes().to_vec()
    }

    /// `0x`-prefixed hex of the uncompressed public key.
    pub fn public_hex(&self) -> String {
        hex::encode_prefixed(self.public_bytes())
    }

    /// The address derived from the public key.
    pub fn address(&self) -> Address {
        derive_address(&self.public_key())
    }

    /// Bridge into an alloy signer for callers that need to sign.
    pub fn signer(&self) -> PrivateKeySigner {
        PrivateKeySigner::from_signing_key(self.signing_key.clone())
    }
}

impl std::fmt::Debug for KeyPair {
    // Key material stays out of Debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish()
    }
}

/// Derive the canonical address from a public key: the last 20 bytes of
/// `keccak256` over the uncompressed point, deterministic and pure.
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag byte.
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Parse an uncompressed SEC1 public key from hex.
pub fn parse_public_hex(s: &str) -> Result<VerifyingKey> {
    let bytes =
        hex::decode(s).map_err(|e| Error::Key(format!("invalid public key hex: {}", e)))?;
    VerifyingKey::from_sec1_bytes(&bytes)
        .map_err(|e| Error::Key(format!("invalid public key: {}", e)))
}

//! Serde schema for the Web3 Secret Storage v3 container.
//!
//! The schema is owned by the ecosystem's standard wallet format; this module
//! only mirrors it so files interoperate byte-for-byte with geth and friends.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Supported container version.
pub const KEYSTORE_VERSION: u32 = 3;

/// Supported payload cipher.
pub const CIPHER_AES_128_CTR: &str = "aes-128-ctr";

/// A parsed keystore file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreFile {
    /// Plain-hex address of the contained key. Metadata only; the address is
    /// always re-derived from the decrypted key and cross-checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(alias = "Crypto")]
    pub crypto: CryptoSection,

    pub id: Uuid,

    pub version: u32,
}

/// The encryption envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoSection {
    pub cipher: String,
    pub cipherparams: CipherParams,
    /// Hex-encoded encrypted private key.
    pub ciphertext: String,
    pub kdf: String,
    pub kdfparams: KdfParams,
    /// Hex keccak-256 over `derived[16..32] || ciphertext`.
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    /// Hex-encoded 16-byte CTR initialization vector.
    pub iv: String,
}

/// Key-derivation parameters; the variant must agree with the `kdf` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    Scrypt {
        dklen: u32,
        n: u64,
        p: u32,
        r: u32,
        salt: String,
    },
    Pbkdf2 {
        dklen: u32,
        c: u32,
        prf: String,
        salt: String,
    },
}

impl KeystoreFile {
    /// Parse a container from raw JSON bytes.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let file: KeystoreFile = serde_json::from_slice(json)
            .map_err(|e| Error::Format(format!("malformed keystore JSON: {}", e)))?;
        file.validate()?;
        Ok(file)
    }

    /// Serialize back to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Format(format!("serialize failed: {}", e)))
    }

    /// Structural checks that do not need the passphrase.
    pub fn validate(&self) -> Result<()> {
        if self.version != KEYSTORE_VERSION {
            return Err(Error::Format(format!(
                "unsupported keystore version {}",
                self.version
            )));
        }
        if self.crypto.cipher != CIPHER_AES_128_CTR {
            return Err(Error::Format(format!(
                "unsupported cipher {:?}",
                self.crypto.cipher
            )));
        }
        match (&self.crypto.kdf[..], &self.crypto.kdfparams) {
            ("scrypt", KdfParams::Scrypt { .. }) => Ok(()),
            ("pbkdf2", KdfParams::Pbkdf2 { .. }) => Ok(()),
            (kdf, _) => Err(Error::Format(format!(
                "kdf {:?} does not match its parameters",
                kdf
            ))),
        }
    }
}

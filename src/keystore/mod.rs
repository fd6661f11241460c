//! Encrypted keystore management (Web3 Secret Storage v3).
//!
//! # Data Flow
//! ```text
//! passphrase + cost params
//!     → crypto.rs (scrypt/pbkdf2 KDF, AES-128-CTR, keccak MAC)
//!     → format.rs (versioned JSON container)
//!     → store.rs (UTC-- files on disk: generate, import, export, unlock, delete)
//! ```
//!
//! # Security Constraints
//! - Decrypted key material lives only transiently in memory and is zeroized
//! - Passphrases and private keys are never logged
//! - Files are written compatible with geth-produced keystores, both ways

pub mod crypto;
pub mod format;
pub mod store;

pub use crypto::ScryptParams;
pub use store::{Account, Keystore};

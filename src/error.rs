//! Error types shared across the crate.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors surfaced by the accessor, key generator, and keystore.
///
/// Every failure is returned to the caller; nothing inside the crate logs
/// and terminates, retries, or swallows an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Endpoint unreachable, not speaking JSON-RPC, or the call timed out.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed request parameters, or the node rejected the query.
    #[error("query error: {0}")]
    Query(String),

    /// The node (or the keystore directory) has no record of the entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Keystore MAC mismatch: the passphrase is wrong.
    #[error("could not decrypt key with given passphrase")]
    Decryption,

    /// Malformed or unsupported keystore container.
    #[error("keystore format error: {0}")]
    Format(String),

    /// The OS random source could not supply randomness. Fatal, no retry.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    /// Malformed private or public key material.
    #[error("key error: {0}")]
    Key(String),

    /// The keystore already holds key material for this address.
    #[error("account {0} already exists in keystore")]
    AlreadyExists(Address),

    /// Local filesystem failure while reading or writing keystore files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

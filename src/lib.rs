//! Read-only Ethereum JSON-RPC accessor with key-material utilities.
//!
//! Three pieces, no shared state between them:
//! - [`rpc::NodeAccessor`]: typed read queries against one node endpoint
//! - [`keys::KeyPair`]: secp256k1 key generation and address derivation
//! - [`keystore::Keystore`]: encrypted key files on disk (Web3 Secret
//!   Storage v3)
//!
//! Every failure is returned as an [`Error`]; the crate never terminates the
//! host process.

pub mod config;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod rpc;
pub mod units;

pub use config::NodeConfig;
pub use error::{Error, Result};
pub use keys::{derive_address, KeyPair};
pub use keystore::{Account, Keystore, ScryptParams};
pub use rpc::{parse_address, NodeAccessor};

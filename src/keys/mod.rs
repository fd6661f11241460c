//! Key material generation and address derivation.
//!
//! # Security Constraints
//! - Key bytes come from the OS random source only; entropy failure is a
//!   fatal error, never silently degraded
//! - Private keys are never logged or serialized in plain form by this crate

pub mod keypair;

pub use keypair::{derive_address, parse_public_hex, KeyPair};

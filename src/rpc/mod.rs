//! JSON-RPC node access.
//!
//! # Responsibilities
//! - Connect to a single JSON-RPC endpoint (lazy or eagerly validated)
//! - Typed read-only chain queries: balances, code, blocks, transactions,
//!   receipts
//! - Map transport, query, and missing-entity failures onto distinct error
//!   kinds; no retries, no process termination

pub mod accessor;

pub use accessor::{parse_address, NodeAccessor};

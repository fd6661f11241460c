//! Wei/ether conversion helpers.
//!
//! Balances come off the wire as wei (`U256`). Display conversion divides by
//! 10^18 using exact decimal arithmetic, never floating point.

use alloy::primitives::utils::{self, Unit};
use alloy::primitives::U256;

use crate::error::{Error, Result};

/// Number of wei in one ether (10^18).
pub fn wei_per_ether() -> U256 {
    Unit::ETHER.wei()
}

/// Render a wei amount as a decimal ether string, e.g. `1500000000000000000`
/// becomes `"1.500000000000000000"`.
pub fn format_wei(wei: U256) -> String {
    utils::format_ether(wei)
}

/// Parse a decimal ether string into wei.
///
/// Fails with [`Error::Query`] on malformed amounts or more than 18
/// fractional digits.
pub fn parse_ether(amount: &str) -> Result<U256> {
    utils::parse_ether(amount).map_err(|e| Error::Query(format!("invalid ether amount: {}", e)))
}

use alloy::primitives::{
    U256,
    utils::{format_ether, parse_ether},
};

use crate::errors::ClientError;

/// Converts a user-entered ether amount into wei.
///
/// Precision handling is left to `parse_ether`; the only local rule is that
/// the field must not be empty.
pub fn parse_eth_amount(input: &str) -> Result<U256, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidAmount("amount is empty".to_string()));
    }

    parse_ether(trimmed).map_err(|e| ClientError::InvalidAmount(format!("{trimmed}: {e}")))
}

#[must_use]
pub fn format_eth_amount(wei: U256) -> String {
    format_ether(wei)
}

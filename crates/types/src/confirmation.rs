use alloy::primitives::{TxHash, U256};

/// The parts of a transaction receipt the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

impl ReceiptInfo {
    /// Number of blocks that include the transaction, counting its own.
    #[must_use]
    pub const fn confirmations(&self, head: u64) -> u64 {
        match self.block_number {
            Some(block) if head >= block => head - block + 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub confirmations: u64,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

impl Confirmation {
    #[must_use]
    pub fn gas_cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

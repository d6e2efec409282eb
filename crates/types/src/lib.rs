pub mod amount;
pub mod bindings;
pub mod confirmation;
pub mod errors;
pub mod ui;

#[macro_use]
pub mod macros;

pub use alloy::primitives::{Address, TxHash, U256};

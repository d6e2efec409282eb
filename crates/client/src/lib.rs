pub mod client;
pub mod config;
pub mod logging;
pub mod watcher;

pub use client::{WalletClient, WithdrawOutcome};
pub use config::{ClientConfig, ClientConfigBuilder};

use std::error::Error;
use std::time::Duration;

use alloy::primitives::TxHash;
use derive_more::Display;

/// Every failure a wallet operation can surface.
///
/// Remote failures are classified at the provider boundary so the front end
/// can tell a user cancellation apart from a contract revert or a dead
/// endpoint.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[display("No wallet provider is configured")]
    ProviderUnavailable,

    #[display("No account is connected")]
    NotConnected,

    #[display("Request rejected by user: {_0}")]
    UserRejected(String),

    #[display("Contract call reverted: {_0}")]
    RemoteReverted(String),

    #[display("Network error: {_0}")]
    Network(String),

    #[display("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[display("Invalid amount: {_0}")]
    InvalidAmount(String),

    #[display("Transaction {tx_hash} not confirmed after {}s", waited.as_secs())]
    ConfirmationTimeout { tx_hash: TxHash, waited: Duration },

    #[display("Wait for transaction {tx_hash} was cancelled")]
    Cancelled { tx_hash: TxHash },

    #[display("Confirmation watcher stopped")]
    SubscriptionClosed,

    #[display("Configuration error: {_0}")]
    Config(String),

    #[display("{_0}")]
    Error(String),
}

impl ClientError {
    /// Short category name used for log fields and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::NotConnected => "not_connected",
            Self::UserRejected(_) => "user_rejected",
            Self::RemoteReverted(_) => "remote_reverted",
            Self::Network(_) => "network",
            Self::Rpc { .. } => "rpc",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::SubscriptionClosed => "subscription_closed",
            Self::Config(_) => "config",
            Self::Error(_) => "error",
        }
    }
}

impl Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Error(e.to_string())
    }
}

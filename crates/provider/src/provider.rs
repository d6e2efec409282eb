use dyn_clone::DynClone;
use types::{Address, TxHash, U256, confirmation::ReceiptInfo, errors::ClientError};

/// Account access and chain reads offered by the wallet provider.
#[async_trait::async_trait]
pub trait WalletProvider: Send + DynClone + Sync {
    /// Asks the wallet to expose its accounts, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError>;

    async fn accounts(&self) -> Result<Vec<Address>, ClientError>;

    async fn get_balance(&self, address: Address) -> Result<U256, ClientError>;

    async fn block_number(&self) -> Result<u64, ClientError>;

    // `Ok(None)` while the transaction is still pending.
    async fn transaction_receipt(&self, tx_hash: TxHash)
    -> Result<Option<ReceiptInfo>, ClientError>;
}

dyn_clone::clone_trait_object!(WalletProvider);

/// Typed handle on the deployed FundMe contract.
///
/// Transaction methods return as soon as the wallet accepted the
/// transaction; confirmation is tracked separately.
#[async_trait::async_trait]
pub trait FundMeContract: Send + DynClone + Sync {
    fn address(&self) -> Address;

    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ClientError>;

    async fn withdraw(&self, from: Address) -> Result<TxHash, ClientError>;

    async fn cheaper_withdraw(&self, from: Address) -> Result<TxHash, ClientError>;

    async fn address_to_amount_funded(&self, funder: Address) -> Result<U256, ClientError>;

    async fn time_remaining_for_withdrawal(&self, funder: Address) -> Result<U256, ClientError>;

    async fn funder(&self, index: U256) -> Result<Address, ClientError>;

    async fn owner(&self) -> Result<Address, ClientError>;

    async fn price_feed(&self) -> Result<Address, ClientError>;

    async fn version(&self) -> Result<U256, ClientError>;
}

dyn_clone::clone_trait_object!(FundMeContract);

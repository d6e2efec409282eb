use crate::provider::{FundMeContract, WalletProvider};
use alloy::{
    contract::Error as ContractError,
    network::{EthereumWallet, ReceiptResponse},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{RpcError, TransportError, TransportErrorKind, http::reqwest::Url},
};
use tracing::{debug, info};
use types::{
    Address, TxHash, U256, bindings::FundMe, confirmation::ReceiptInfo, errors::ClientError,
};

/// EIP-1193 "user rejected the request".
const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 "the requested account has not been authorized".
const UNAUTHORIZED_CODE: i64 = 4100;
/// Execution reverted, as reported by geth-style nodes.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Wallet provider backed by a JSON-RPC endpoint.
///
/// Without a private key the endpoint manages and signs for its own
/// accounts. With one, signing happens through an `alloy` local signer and
/// that signer is the only exposed account.
#[derive(Clone)]
pub struct RpcWalletProvider {
    provider: DynProvider,
    local_account: Option<Address>,
}

impl RpcWalletProvider {
    pub fn connect(rpc_url: &str, private_key: Option<&str>) -> Result<Self, ClientError> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| ClientError::Config(format!("Invalid RPC url {rpc_url}: {e}")))?;

        let (provider, local_account) = match private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .trim()
                    .parse()
                    .map_err(|e| ClientError::Config(format!("Invalid private key: {e}")))?;
                let account = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(account))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        info!(
            "Connected wallet provider at {} ({})",
            rpc_url,
            if local_account.is_some() {
                "local signer"
            } else {
                "node-managed accounts"
            }
        );

        Ok(Self {
            provider,
            local_account,
        })
    }
}

#[async_trait::async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        if let Some(account) = self.local_account {
            return Ok(vec![account]);
        }

        self.provider
            .raw_request::<(), Vec<Address>>("eth_requestAccounts".into(), ())
            .await
            .map_err(|e| classify_transport_error(&e))
    }

    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        if let Some(account) = self.local_account {
            return Ok(vec![account]);
        }

        self.provider
            .get_accounts()
            .await
            .map_err(|e| classify_transport_error(&e))
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ClientError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| classify_transport_error(&e))
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| classify_transport_error(&e))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptInfo>, ClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| classify_transport_error(&e))?;

        Ok(receipt.map(|receipt| ReceiptInfo {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
            gas_used: receipt.gas_used(),
            effective_gas_price: receipt.effective_gas_price(),
        }))
    }
}

#[derive(Clone)]
pub struct RpcFundMe {
    contract: FundMe::FundMeInstance<DynProvider>,
}

impl RpcFundMe {
    #[must_use]
    pub fn new(address: Address, wallet: &RpcWalletProvider) -> Self {
        Self {
            contract: FundMe::new(address, wallet.provider.clone()),
        }
    }
}

#[async_trait::async_trait]
impl FundMeContract for RpcFundMe {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ClientError> {
        let pending = self
            .contract
            .fund()
            .from(from)
            .value(value)
            .send()
            .await
            .map_err(|e| classify_contract_error(&e))?;
        debug!("fund transaction submitted: {}", pending.tx_hash());
        Ok(*pending.tx_hash())
    }

    async fn withdraw(&self, from: Address) -> Result<TxHash, ClientError> {
        let pending = self
            .contract
            .withdraw()
            .from(from)
            .send()
            .await
            .map_err(|e| classify_contract_error(&e))?;
        debug!("withdraw transaction submitted: {}", pending.tx_hash());
        Ok(*pending.tx_hash())
    }

    async fn cheaper_withdraw(&self, from: Address) -> Result<TxHash, ClientError> {
        let pending = self
            .contract
            .cheaperWithdraw()
            .from(from)
            .send()
            .await
            .map_err(|e| classify_contract_error(&e))?;
        debug!("cheaperWithdraw transaction submitted: {}", pending.tx_hash());
        Ok(*pending.tx_hash())
    }

    async fn address_to_amount_funded(&self, funder: Address) -> Result<U256, ClientError> {
        self.contract
            .getAddressToAmountFunded(funder)
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }

    async fn time_remaining_for_withdrawal(&self, funder: Address) -> Result<U256, ClientError> {
        self.contract
            .getTimeRemainingForWithdrawal(funder)
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }

    async fn funder(&self, index: U256) -> Result<Address, ClientError> {
        self.contract
            .getFunder(index)
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }

    async fn owner(&self) -> Result<Address, ClientError> {
        self.contract
            .getOwner()
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }

    async fn price_feed(&self) -> Result<Address, ClientError> {
        self.contract
            .getPriceFeed()
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }

    async fn version(&self) -> Result<U256, ClientError> {
        self.contract
            .getVersion()
            .call()
            .await
            .map_err(|e| classify_contract_error(&e))
    }
}

/// Maps a JSON-RPC level failure onto the client error taxonomy.
#[must_use]
pub fn classify_transport_error(error: &TransportError) -> ClientError {
    match error {
        RpcError::ErrorResp(payload) => {
            classify_error_response(payload.code, payload.message.as_ref())
        }
        RpcError::Transport(TransportErrorKind::BackendGone) => ClientError::ProviderUnavailable,
        RpcError::Transport(kind) => ClientError::Network(kind.to_string()),
        RpcError::NullResp => ClientError::Network("empty response from provider".to_string()),
        other => ClientError::Error(other.to_string()),
    }
}

#[must_use]
pub fn classify_contract_error(error: &ContractError) -> ClientError {
    match error {
        ContractError::TransportError(e) => classify_transport_error(e),
        other => ClientError::Error(other.to_string()),
    }
}

#[must_use]
pub fn classify_error_response(code: i64, message: &str) -> ClientError {
    if code == USER_REJECTED_CODE || code == UNAUTHORIZED_CODE {
        ClientError::UserRejected(message.to_string())
    } else if code == EXECUTION_REVERTED_CODE || message.to_lowercase().contains("revert") {
        ClientError::RemoteReverted(message.to_string())
    } else {
        ClientError::Rpc {
            code,
            message: message.to_string(),
        }
    }
}

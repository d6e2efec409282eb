use std::{sync::Arc, time::Duration};

use provider::{
    provider::{FundMeContract, WalletProvider},
    rpc::{RpcFundMe, RpcWalletProvider},
};
use tracing::{error, info, warn};
use types::{
    Address, TxHash, U256,
    amount::{format_eth_amount, parse_eth_amount},
    confirmation::Confirmation,
    errors::ClientError,
    ui::{CONNECTED_LABEL, Control, PROVIDER_PROMPT, UiState},
    wallet_operation_metrics,
};

use crate::{
    config::ClientConfig,
    watcher::{CancelToken, ConfirmationWatcher, WatcherSettings},
};

/// Result of a withdrawal attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Completed(Confirmation),
    /// The signer has nothing funded, so no transaction was sent.
    NothingFunded,
    /// The time lock is still running, so no transaction was sent.
    Locked { remaining: U256 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WithdrawKind {
    Standard,
    Cheaper,
}

struct Connection {
    provider: Box<dyn WalletProvider>,
    contract: Box<dyn FundMeContract>,
    watcher: ConfirmationWatcher,
}

/// Drives the FundMe contract on behalf of a user.
///
/// Each public operation is independent: it runs its remote calls in
/// sequence, logs any failure, records a status line for the front end and
/// returns the typed error. Nothing is retried.
pub struct WalletClient {
    connection: Option<Arc<Connection>>,
    accounts: Vec<Address>,
    ui: UiState,
    confirmation_timeout: Duration,
    cancel: CancelToken,
}

impl WalletClient {
    /// Builds a client around a wallet provider and contract proxy. Must be
    /// called inside a Tokio runtime; the confirmation watcher is spawned
    /// here.
    #[must_use]
    pub fn new(
        provider: Box<dyn WalletProvider>,
        contract: Box<dyn FundMeContract>,
        settings: WatcherSettings,
        confirmation_timeout: Duration,
    ) -> Self {
        let (watcher, _) = ConfirmationWatcher::spawn(dyn_clone::clone_box(&*provider), settings);
        Self {
            connection: Some(Arc::new(Connection {
                provider,
                contract,
                watcher,
            })),
            accounts: Vec::new(),
            ui: UiState::new(),
            confirmation_timeout,
            cancel: CancelToken::new(),
        }
    }

    /// A client for an environment with no wallet provider at all.
    #[must_use]
    pub fn without_provider() -> Self {
        Self {
            connection: None,
            accounts: Vec::new(),
            ui: UiState::new(),
            confirmation_timeout: Duration::ZERO,
            cancel: CancelToken::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let Some(rpc_url) = config.rpc_url.as_deref() else {
            warn!("No RPC endpoint configured; wallet actions are unavailable");
            return Ok(Self::without_provider());
        };

        let contract_address = config.contract_address()?;
        let wallet = RpcWalletProvider::connect(rpc_url, config.private_key.as_deref())?;
        let contract = RpcFundMe::new(contract_address, &wallet);

        Ok(Self::new(
            Box::new(wallet),
            Box::new(contract),
            config.watcher_settings(),
            config.confirmation_timeout(),
        ))
    }

    #[must_use]
    pub const fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.connection.is_some()
    }

    /// Token that aborts the confirmation wait in progress when cancelled.
    /// It re-arms once that wait ends, so later operations are unaffected.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn connect(&mut self) -> Result<Vec<Address>, ClientError> {
        let result = wallet_operation_metrics!("connect", self.run_connect());
        self.finish("connect", result)
    }

    pub async fn fund(&mut self, amount: &str) -> Result<Confirmation, ClientError> {
        let result = wallet_operation_metrics!("fund", self.run_fund(amount));
        self.finish("fund", result)
    }

    pub async fn withdraw(&mut self) -> Result<WithdrawOutcome, ClientError> {
        let result = wallet_operation_metrics!(
            "withdraw",
            self.run_withdraw(WithdrawKind::Standard)
        );
        self.finish("withdraw", result)
    }

    pub async fn cheaper_withdraw(&mut self) -> Result<WithdrawOutcome, ClientError> {
        let result = wallet_operation_metrics!(
            "cheaper_withdraw",
            self.run_withdraw(WithdrawKind::Cheaper)
        );
        self.finish("cheaper_withdraw", result)
    }

    /// Native balance held by the contract.
    pub async fn get_balance(&mut self) -> Result<U256, ClientError> {
        let result = wallet_operation_metrics!("get_balance", self.run_get_balance());
        // Failures are only logged; the status line keeps its last value.
        if let Err(e) = &result {
            log_failure("get_balance", e);
        }
        result
    }

    /// Seconds until the signer may withdraw. Zero re-enables withdrawing
    /// and asks the front end to reload.
    pub async fn get_estimated_time(&mut self) -> Result<U256, ClientError> {
        let result = wallet_operation_metrics!("get_estimated_time", self.run_get_estimated_time());
        self.finish("get_estimated_time", result)
    }

    pub async fn amount_funded(&mut self, funder: Option<Address>) -> Result<U256, ClientError> {
        let result = wallet_operation_metrics!("amount_funded", async {
            let conn = self.require(None)?;
            let funder = match funder {
                Some(funder) => funder,
                None => self.signer(&conn).await?,
            };
            let amount = conn.contract.address_to_amount_funded(funder).await?;
            info!("{} has funded {} ETH", funder, format_eth_amount(amount));
            Ok::<_, ClientError>(amount)
        });
        self.finish("amount_funded", result)
    }

    pub async fn funder(&mut self, index: U256) -> Result<Address, ClientError> {
        let result = wallet_operation_metrics!("funder", async {
            let conn = self.require(None)?;
            conn.contract.funder(index).await
        });
        self.finish("funder", result)
    }

    pub async fn owner(&mut self) -> Result<Address, ClientError> {
        let result = wallet_operation_metrics!("owner", async {
            let conn = self.require(None)?;
            conn.contract.owner().await
        });
        self.finish("owner", result)
    }

    pub async fn version(&mut self) -> Result<U256, ClientError> {
        let result = wallet_operation_metrics!("version", async {
            let conn = self.require(None)?;
            conn.contract.version().await
        });
        self.finish("version", result)
    }

    pub async fn price_feed(&mut self) -> Result<Address, ClientError> {
        let result = wallet_operation_metrics!("price_feed", async {
            let conn = self.require(None)?;
            conn.contract.price_feed().await
        });
        self.finish("price_feed", result)
    }

    /// Starts over from a fresh view of the wallet, the way a page reload
    /// would.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        self.ui.take_reload_request();
        self.ui.reset_labels();
        self.accounts.clear();

        let Some(conn) = self.connection.clone() else {
            return Ok(());
        };

        let accounts = match conn.provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return self.finish("reload", Err(e)),
        };
        if !accounts.is_empty() {
            self.ui.set_label(Control::Connect, CONNECTED_LABEL);
        }
        self.accounts = accounts;
        Ok(())
    }

    async fn run_connect(&mut self) -> Result<Vec<Address>, ClientError> {
        let conn = self.require(Some(Control::Connect))?;

        if let Err(e) = conn.provider.request_accounts().await {
            warn!("Account access was not granted: {}", e);
            return Err(e);
        }
        self.ui.set_label(Control::Connect, CONNECTED_LABEL);

        let accounts = conn.provider.accounts().await?;
        info!("Accounts: {:?}", accounts);
        self.accounts.clone_from(&accounts);
        self.ui
            .set_status(format!("Connected {} account(s)", accounts.len()));
        Ok(accounts)
    }

    async fn run_fund(&mut self, amount: &str) -> Result<Confirmation, ClientError> {
        let conn = self.require(Some(Control::Fund))?;
        info!("Funding with {}...", amount);

        let value = parse_eth_amount(amount)?;
        self.cancel.reset();
        let from = self.signer(&conn).await?;
        let tx_hash = conn.contract.fund(from, value).await?;
        let confirmation = self.await_confirmation(&conn, tx_hash).await?;

        self.ui.set_withdraw_enabled(false);
        self.ui.set_status(format!(
            "Funded {} ETH in block {}",
            format_eth_amount(value),
            confirmation.block_number
        ));
        Ok(confirmation)
    }

    async fn run_withdraw(&mut self, kind: WithdrawKind) -> Result<WithdrawOutcome, ClientError> {
        let conn = self.require(Some(Control::Withdraw))?;
        info!("Withdrawing...");

        self.accounts = conn.provider.request_accounts().await?;
        let from = self.signer(&conn).await?;

        let funded = conn.contract.address_to_amount_funded(from).await?;
        if funded.is_zero() {
            warn!("Insufficient balance");
            self.ui.set_status("Nothing funded from this account");
            return Ok(WithdrawOutcome::NothingFunded);
        }

        let remaining = conn.contract.time_remaining_for_withdrawal(from).await?;
        if !remaining.is_zero() {
            info!("Withdrawal locked for another {}s", remaining);
            self.ui
                .set_status(format!("Withdrawal locked for another {remaining}s"));
            return Ok(WithdrawOutcome::Locked { remaining });
        }

        self.ui.set_withdraw_enabled(true);
        self.cancel.reset();
        let tx_hash = match kind {
            WithdrawKind::Standard => conn.contract.withdraw(from).await?,
            WithdrawKind::Cheaper => conn.contract.cheaper_withdraw(from).await?,
        };
        let confirmation = self.await_confirmation(&conn, tx_hash).await?;

        self.ui.set_status(format!(
            "Withdrawal confirmed in block {}",
            confirmation.block_number
        ));
        Ok(WithdrawOutcome::Completed(confirmation))
    }

    async fn run_get_balance(&mut self) -> Result<U256, ClientError> {
        let conn = self.require(Some(Control::Balance))?;

        let balance = conn.provider.get_balance(conn.contract.address()).await?;
        let formatted = format_eth_amount(balance);
        info!("{}", formatted);
        self.ui.set_status(format!("Contract balance: {formatted} ETH"));
        Ok(balance)
    }

    async fn run_get_estimated_time(&mut self) -> Result<U256, ClientError> {
        // The time control reports a missing provider on the balance label.
        let conn = self.require(Some(Control::Balance))?;

        let from = self.signer(&conn).await?;
        let remaining = conn.contract.time_remaining_for_withdrawal(from).await?;
        info!("{}", remaining);

        if remaining.is_zero() {
            self.ui.set_withdraw_enabled(true);
            self.ui.request_reload();
            self.ui.set_status("Withdrawal is unlocked");
        } else {
            self.ui
                .set_status(format!("Withdrawal unlocks in {remaining}s"));
        }
        Ok(remaining)
    }

    fn require(&mut self, control: Option<Control>) -> Result<Arc<Connection>, ClientError> {
        if let Some(conn) = &self.connection {
            return Ok(Arc::clone(conn));
        }

        if let Some(control) = control {
            self.ui.set_label(control, PROVIDER_PROMPT);
        }
        Err(ClientError::ProviderUnavailable)
    }

    // First known account, asking the provider if none is cached yet.
    async fn signer(&mut self, conn: &Connection) -> Result<Address, ClientError> {
        if let Some(account) = self.accounts.first() {
            return Ok(*account);
        }

        let accounts = conn.provider.accounts().await?;
        let account = accounts.first().copied().ok_or(ClientError::NotConnected)?;
        self.accounts = accounts;
        Ok(account)
    }

    async fn await_confirmation(
        &self,
        conn: &Connection,
        tx_hash: TxHash,
    ) -> Result<Confirmation, ClientError> {
        let result = conn
            .watcher
            .wait_for_confirmation(tx_hash, self.confirmation_timeout, &self.cancel)
            .await;
        self.cancel.reset();
        result
    }

    fn finish<T>(
        &mut self,
        operation: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(e) = &result {
            log_failure(operation, e);
            self.ui.set_status(status_for_error(e));
        }
        result
    }
}

fn log_failure(operation: &str, error: &ClientError) {
    error!(kind = error.kind(), "{} failed: {}", operation, error);
}

/// User-facing wording for each failure category.
#[must_use]
pub fn status_for_error(error: &ClientError) -> String {
    match error {
        ClientError::ProviderUnavailable => PROVIDER_PROMPT.to_string(),
        ClientError::NotConnected => "Connect an account first".to_string(),
        ClientError::UserRejected(_) => "Request was rejected in the wallet".to_string(),
        ClientError::RemoteReverted(reason) => format!("Contract refused the call: {reason}"),
        ClientError::Network(_) => "Could not reach the wallet provider".to_string(),
        ClientError::InvalidAmount(reason) => format!("Invalid amount: {reason}"),
        ClientError::ConfirmationTimeout { tx_hash, waited } => format!(
            "Transaction {tx_hash} still unconfirmed after {}s",
            waited.as_secs()
        ),
        ClientError::Cancelled { tx_hash } => format!("Stopped waiting for {tx_hash}"),
        other => other.to_string(),
    }
}

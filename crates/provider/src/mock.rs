use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::provider::{FundMeContract, WalletProvider};
use alloy::primitives::{keccak256, utils::parse_ether};
use tracing::debug;
use types::{
    Address, TxHash, U256,
    bindings::reverts,
    confirmation::ReceiptInfo,
    errors::ClientError,
};

pub const MOCK_GAS_USED: u64 = 21_000;
pub const MOCK_GAS_PRICE: u128 = 1_000_000_000;
pub const DEFAULT_LOCK_SECS: u64 = 60;
pub const DEFAULT_VERSION: u64 = 4;
const ACCOUNT_COUNT: u8 = 6;

/// A call observed by the mock, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    RequestAccounts,
    Accounts,
    GetBalance(Address),
    BlockNumber,
    TransactionReceipt(TxHash),
    Fund { from: Address, value: U256 },
    Withdraw { from: Address },
    CheaperWithdraw { from: Address },
    AddressToAmountFunded(Address),
    TimeRemaining(Address),
    Funder(U256),
    Owner,
    PriceFeed,
    Version,
}

struct FundMeState {
    address: Address,
    owner: Address,
    price_feed: Address,
    version: U256,
    minimum_funding: U256,
    lock_secs: u64,
    funders: Vec<Address>,
    amount_funded: HashMap<Address, U256>,
    funded_at: HashMap<Address, u64>,
}

struct ChainState {
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    timestamp: u64,
    block_number: u64,
    auto_mine: bool,
    pending: Vec<ReceiptInfo>,
    receipts: HashMap<TxHash, ReceiptInfo>,
    tx_count: u64,
    calls: Vec<MockCall>,
    unreachable: bool,
    reject_account_requests: bool,
    failing_receipt_polls: u32,
    contract: FundMeState,
}

/// In-memory chain playing both the wallet provider and a deployed FundMe
/// contract.
///
/// Contract state changes apply when a transaction is submitted; only its
/// receipt waits for mining. Reverts surface at submission, the way gas
/// estimation reports them on a real node.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    #[must_use]
    pub fn new() -> Self {
        let accounts: Vec<Address> = (1..=ACCOUNT_COUNT).map(Address::with_last_byte).collect();
        let starting_balance = parse_ether("10000").unwrap_or_default();
        let balances = accounts.iter().map(|a| (*a, starting_balance)).collect();

        let contract = FundMeState {
            address: Address::repeat_byte(0xfd),
            owner: accounts[0],
            price_feed: Address::repeat_byte(0xaa),
            version: U256::from(DEFAULT_VERSION),
            minimum_funding: parse_ether("0.025").unwrap_or_default(),
            lock_secs: DEFAULT_LOCK_SECS,
            funders: Vec::new(),
            amount_funded: HashMap::new(),
            funded_at: HashMap::new(),
        };

        Self {
            state: Arc::new(Mutex::new(ChainState {
                accounts,
                balances,
                timestamp: 1_700_000_000,
                block_number: 1,
                auto_mine: true,
                pending: Vec::new(),
                receipts: HashMap::new(),
                tx_count: 0,
                calls: Vec::new(),
                unreachable: false,
                reject_account_requests: false,
                failing_receipt_polls: 0,
                contract,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn provider(&self) -> Box<dyn WalletProvider> {
        Box::new(self.clone())
    }

    #[must_use]
    pub fn contract(&self) -> Box<dyn FundMeContract> {
        Box::new(self.clone())
    }

    /// The deploying account, which owns the contract.
    #[must_use]
    pub fn deployer(&self) -> Address {
        self.state().contract.owner
    }

    #[must_use]
    pub fn account(&self, index: usize) -> Address {
        Address::with_last_byte(u8::try_from(index + 1).unwrap_or(u8::MAX))
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.state().contract.address
    }

    #[must_use]
    pub fn price_feed_address(&self) -> Address {
        self.state().contract.price_feed
    }

    #[must_use]
    pub fn minimum_funding(&self) -> U256 {
        self.state().contract.minimum_funding
    }

    #[must_use]
    pub fn lock_secs(&self) -> u64 {
        self.state().contract.lock_secs
    }

    /// Replaces the accounts the wallet exposes.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state().accounts = accounts;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    pub fn reject_account_requests(&self, reject: bool) {
        self.state().reject_account_requests = reject;
    }

    /// Makes the next `count` receipt lookups fail with a network error.
    pub fn fail_receipt_polls(&self, count: u32) {
        self.state().failing_receipt_polls = count;
    }

    pub fn set_auto_mine(&self, auto_mine: bool) {
        self.state().auto_mine = auto_mine;
    }

    /// Mines one block containing every pending transaction.
    pub fn mine(&self) {
        let mut state = self.state();
        state.block_number += 1;
        let block = state.block_number;
        let pending = std::mem::take(&mut state.pending);
        for mut receipt in pending {
            receipt.block_number = Some(block);
            state.receipts.insert(receipt.tx_hash, receipt);
        }
    }

    /// Moves the chain clock forward.
    pub fn increase_time(&self, secs: u64) {
        self.state().timestamp += secs;
    }

    /// Stores a receipt exactly as the node would return it.
    pub fn insert_receipt(&self, receipt: ReceiptInfo) {
        self.state().receipts.insert(receipt.tx_hash, receipt);
    }

    #[must_use]
    pub fn block(&self) -> u64 {
        self.state().block_number
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    #[must_use]
    pub fn balance_of(&self, address: Address) -> U256 {
        self.state().balances.get(&address).copied().unwrap_or_default()
    }

    fn record(&self, call: MockCall) -> Result<MutexGuard<'_, ChainState>, ClientError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.unreachable {
            return Err(ClientError::Network(
                "error sending request: connection refused".to_string(),
            ));
        }
        Ok(state)
    }

    fn withdraw_all(&self, call: MockCall, from: Address) -> Result<TxHash, ClientError> {
        let mut state = self.record(call)?;
        ensure_account(&state, from)?;

        if from != state.contract.owner {
            return Err(ClientError::RemoteReverted(reverts::NOT_OWNER.to_string()));
        }
        if time_remaining(&state.contract, state.timestamp, from) > 0 {
            return Err(ClientError::RemoteReverted(
                reverts::WITHDRAWAL_LOCKED.to_string(),
            ));
        }

        let gas_cost = gas_cost();
        let contract_address = state.contract.address;
        let contract_balance = state
            .balances
            .insert(contract_address, U256::ZERO)
            .unwrap_or_default();
        let owner_balance = state.balances.entry(from).or_default();
        *owner_balance = (*owner_balance + contract_balance).saturating_sub(gas_cost);

        let funders = std::mem::take(&mut state.contract.funders);
        for funder in funders {
            state.contract.amount_funded.insert(funder, U256::ZERO);
        }

        Ok(submit(&mut state))
    }
}

fn gas_cost() -> U256 {
    U256::from(MOCK_GAS_USED) * U256::from(MOCK_GAS_PRICE)
}

fn ensure_account(state: &ChainState, from: Address) -> Result<(), ClientError> {
    if state.accounts.contains(&from) {
        Ok(())
    } else {
        Err(ClientError::Rpc {
            code: -32000,
            message: format!("unknown account {from}"),
        })
    }
}

fn time_remaining(contract: &FundMeState, now: u64, funder: Address) -> u64 {
    contract
        .funded_at
        .get(&funder)
        .map_or(0, |funded_at| (funded_at + contract.lock_secs).saturating_sub(now))
}

// Assigns a hash and either mines the transaction right away or parks it.
fn submit(state: &mut ChainState) -> TxHash {
    state.tx_count += 1;
    let tx_hash = keccak256(format!("mock-tx-{}", state.tx_count));
    let mut receipt = ReceiptInfo {
        tx_hash,
        block_number: None,
        success: true,
        gas_used: MOCK_GAS_USED,
        effective_gas_price: MOCK_GAS_PRICE,
    };

    if state.auto_mine {
        state.block_number += 1;
        receipt.block_number = Some(state.block_number);
        state.receipts.insert(tx_hash, receipt);
    } else {
        state.pending.push(receipt);
    }

    debug!("mock transaction {} submitted", tx_hash);
    tx_hash
}

#[async_trait::async_trait]
impl WalletProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let state = self.record(MockCall::RequestAccounts)?;
        if state.reject_account_requests {
            return Err(ClientError::UserRejected(
                "User rejected the request.".to_string(),
            ));
        }
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        let state = self.record(MockCall::Accounts)?;
        Ok(state.accounts.clone())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ClientError> {
        let state = self.record(MockCall::GetBalance(address))?;
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        let state = self.record(MockCall::BlockNumber)?;
        Ok(state.block_number)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptInfo>, ClientError> {
        let mut state = self.record(MockCall::TransactionReceipt(tx_hash))?;
        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(ClientError::Network("receipt lookup timed out".to_string()));
        }
        Ok(state.receipts.get(&tx_hash).copied())
    }
}

#[async_trait::async_trait]
impl FundMeContract for MockChain {
    fn address(&self) -> Address {
        self.contract_address()
    }

    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ClientError> {
        let mut state = self.record(MockCall::Fund { from, value })?;
        ensure_account(&state, from)?;

        if value < state.contract.minimum_funding {
            return Err(ClientError::RemoteReverted(reverts::NOT_ENOUGH_ETH.to_string()));
        }

        let total = value + gas_cost();
        let sender_balance = state.balances.get(&from).copied().unwrap_or_default();
        if sender_balance < total {
            return Err(ClientError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".to_string(),
            });
        }

        state.balances.insert(from, sender_balance - total);
        let contract_address = state.contract.address;
        *state.balances.entry(contract_address).or_default() += value;

        let now = state.timestamp;
        let contract = &mut state.contract;
        *contract.amount_funded.entry(from).or_default() += value;
        contract.funders.push(from);
        contract.funded_at.insert(from, now);

        Ok(submit(&mut state))
    }

    async fn withdraw(&self, from: Address) -> Result<TxHash, ClientError> {
        self.withdraw_all(MockCall::Withdraw { from }, from)
    }

    async fn cheaper_withdraw(&self, from: Address) -> Result<TxHash, ClientError> {
        self.withdraw_all(MockCall::CheaperWithdraw { from }, from)
    }

    async fn address_to_amount_funded(&self, funder: Address) -> Result<U256, ClientError> {
        let state = self.record(MockCall::AddressToAmountFunded(funder))?;
        Ok(state
            .contract
            .amount_funded
            .get(&funder)
            .copied()
            .unwrap_or_default())
    }

    async fn time_remaining_for_withdrawal(&self, funder: Address) -> Result<U256, ClientError> {
        let state = self.record(MockCall::TimeRemaining(funder))?;
        Ok(U256::from(time_remaining(
            &state.contract,
            state.timestamp,
            funder,
        )))
    }

    async fn funder(&self, index: U256) -> Result<Address, ClientError> {
        let state = self.record(MockCall::Funder(index))?;
        usize::try_from(index)
            .ok()
            .and_then(|i| state.contract.funders.get(i).copied())
            .ok_or_else(|| ClientError::RemoteReverted("array index out of bounds".to_string()))
    }

    async fn owner(&self) -> Result<Address, ClientError> {
        let state = self.record(MockCall::Owner)?;
        Ok(state.contract.owner)
    }

    async fn price_feed(&self) -> Result<Address, ClientError> {
        let state = self.record(MockCall::PriceFeed)?;
        Ok(state.contract.price_feed)
    }

    async fn version(&self) -> Result<U256, ClientError> {
        let state = self.record(MockCall::Version)?;
        Ok(state.contract.version)
    }
}

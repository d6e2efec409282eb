use std::{collections::HashMap, sync::Arc, time::Duration};

use poll_timer::start_poll_timer;
use provider::provider::WalletProvider;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use types::{
    TxHash,
    confirmation::{Confirmation, ReceiptInfo},
    confirmation_metrics,
    errors::ClientError,
};

const COMMAND_CAPACITY: usize = 64;
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

type Responder = oneshot::Sender<Result<Confirmation, ClientError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    pub required_confirmations: u64,
    pub poll_interval: Duration,
    /// Consecutive failed lookups tolerated per transaction before its
    /// subscribers are rejected.
    pub max_poll_errors: u32,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            required_confirmations: 1,
            poll_interval: Duration::from_secs(1),
            max_poll_errors: 3,
        }
    }
}

/// Cloneable cancellation flag shared between a waiter and whoever may
/// abort it.
#[derive(Clone, Debug)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Re-arms the token for every clone.
    pub fn reset(&self) {
        self.sender.send_replace(false);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes once `cancel` has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

enum WatchCommand {
    Subscribe { tx_hash: TxHash, responder: Responder },
}

#[derive(Default)]
struct PendingConfirmation {
    responders: Vec<Responder>,
    poll_errors: u32,
}

enum PollOutcome {
    Waiting,
    Resolved(Result<Confirmation, ClientError>),
    Failed(ClientError),
}

/// Handle on the background task that tracks submitted transactions until
/// they are confirmed.
///
/// Every subscription is answered exactly once. The task stops when the last
/// handle is dropped.
#[derive(Clone)]
pub struct ConfirmationWatcher {
    commands: mpsc::Sender<WatchCommand>,
}

impl ConfirmationWatcher {
    /// Spawns the watcher on the current Tokio runtime.
    pub fn spawn(
        provider: Box<dyn WalletProvider>,
        settings: WatcherSettings,
    ) -> (Self, JoinHandle<()>) {
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let handle = tokio::spawn(run_watcher(provider, settings, command_rx));
        (Self { commands }, handle)
    }

    /// Registers interest in `tx_hash`. The receiver yields once.
    pub async fn subscribe(
        &self,
        tx_hash: TxHash,
    ) -> Result<oneshot::Receiver<Result<Confirmation, ClientError>>, ClientError> {
        let (responder, receiver) = oneshot::channel();
        self.commands
            .send(WatchCommand::Subscribe { tx_hash, responder })
            .await
            .map_err(|_| ClientError::SubscriptionClosed)?;
        Ok(receiver)
    }

    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<Confirmation, ClientError> {
        info!("Mining {}", tx_hash);
        let receiver = self.subscribe(tx_hash).await?;

        tokio::select! {
            result = receiver => result.unwrap_or(Err(ClientError::SubscriptionClosed)),
            () = tokio::time::sleep(timeout) => {
                warn!("Gave up waiting for {} after {:?}", tx_hash, timeout);
                confirmation_metrics!("timeout");
                Err(ClientError::ConfirmationTimeout { tx_hash, waited: timeout })
            }
            () = cancel.cancelled() => {
                info!("Stopped waiting for {}", tx_hash);
                confirmation_metrics!("cancelled");
                Err(ClientError::Cancelled { tx_hash })
            }
        }
    }
}

async fn run_watcher(
    provider: Box<dyn WalletProvider>,
    settings: WatcherSettings,
    mut commands: mpsc::Receiver<WatchCommand>,
) {
    let (tick_tx, mut ticks) = mpsc::channel(1);
    let timer = start_poll_timer(tick_tx, settings.poll_interval.max(MIN_POLL_INTERVAL), || ());
    let mut pending: HashMap<TxHash, PendingConfirmation> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(WatchCommand::Subscribe { tx_hash, responder }) => {
                    debug!("Watching {} for confirmation", tx_hash);
                    pending.entry(tx_hash).or_default().responders.push(responder);
                }
                None => break,
            },
            Some(()) = ticks.recv() => {
                poll_pending(provider.as_ref(), &settings, &mut pending).await;
            }
        }
    }

    timer.abort();
    debug!("Confirmation watcher stopped");
}

async fn poll_pending(
    provider: &dyn WalletProvider,
    settings: &WatcherSettings,
    pending: &mut HashMap<TxHash, PendingConfirmation>,
) {
    // Waiters that timed out or were cancelled have dropped their receivers.
    pending.retain(|_, entry| {
        entry.responders.retain(|responder| !responder.is_closed());
        !entry.responders.is_empty()
    });
    if pending.is_empty() {
        return;
    }

    let head = provider.block_number().await;
    let required = settings.required_confirmations.max(1);
    let tx_hashes: Vec<TxHash> = pending.keys().copied().collect();

    for tx_hash in tx_hashes {
        let outcome = match &head {
            Ok(head) => match provider.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => evaluate_receipt(&receipt, *head, required),
                Ok(None) => PollOutcome::Waiting,
                Err(e) => PollOutcome::Failed(e),
            },
            Err(e) => PollOutcome::Failed(e.clone()),
        };

        let result = match outcome {
            PollOutcome::Waiting => {
                if let Some(entry) = pending.get_mut(&tx_hash) {
                    entry.poll_errors = 0;
                }
                continue;
            }
            PollOutcome::Resolved(result) => result,
            PollOutcome::Failed(e) => {
                let Some(entry) = pending.get_mut(&tx_hash) else {
                    continue;
                };
                entry.poll_errors += 1;
                warn!(
                    "Lookup for {} failed ({}/{}): {}",
                    tx_hash, entry.poll_errors, settings.max_poll_errors, e
                );
                if entry.poll_errors < settings.max_poll_errors {
                    continue;
                }
                Err(e)
            }
        };

        if let Some(entry) = pending.remove(&tx_hash) {
            match &result {
                Ok(confirmation) => {
                    info!(
                        "Completed with {} confirmations.",
                        confirmation.confirmations
                    );
                    confirmation_metrics!("confirmed");
                }
                Err(e) => {
                    warn!("Transaction {} failed: {}", tx_hash, e);
                    confirmation_metrics!("failed");
                }
            }
            for responder in entry.responders {
                let _ = responder.send(result.clone());
            }
        }
    }
}

fn evaluate_receipt(receipt: &ReceiptInfo, head: u64, required: u64) -> PollOutcome {
    let Some(block_number) = receipt.block_number else {
        return PollOutcome::Waiting;
    };

    if !receipt.success {
        return PollOutcome::Resolved(Err(ClientError::RemoteReverted(format!(
            "transaction {} reverted in block {block_number}",
            receipt.tx_hash
        ))));
    }

    let confirmations = receipt.confirmations(head);
    if confirmations < required {
        return PollOutcome::Waiting;
    }

    PollOutcome::Resolved(Ok(Confirmation {
        tx_hash: receipt.tx_hash,
        block_number,
        confirmations,
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
    }))
}

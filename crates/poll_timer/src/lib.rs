use std::time::Duration;

use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

/// Sends `make_tick()` on `sender` every `tick_interval`.
///
/// The task ends on its own once the receiving side is gone.
pub fn start_poll_timer<T, F>(
    sender: mpsc::Sender<T>,
    tick_interval: Duration,
    make_tick: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn() -> T + Send + 'static,
{
    Handle::current().spawn(async move {
        let mut ticker = interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if sender.send(make_tick()).await.is_err() {
                debug!("Poll timer stopping. No receiver alive");
                break;
            }
        }
    })
}

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::meter::{now_millis, MeterState, MS_1_HR, MS_24_HR};

// First sweep fires a day after startup, later sweeps run hourly.
const INITIAL_DELAY: Duration = Duration::from_millis(MS_24_HR as u64);
const SWEEP_INTERVAL: Duration = Duration::from_millis(MS_1_HR as u64);

/// Handle to the background task that purges day-old events.
///
/// The task parks on a timer between sweeps and holds the meter lock only
/// while popping stale tail entries. It exits on an explicit `stop()` or when
/// the handle is dropped.
pub(crate) struct Purger {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Purger {
    pub(crate) fn spawn(state: Arc<Mutex<MeterState>>) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(state, stop_rx));
        Purger {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub(crate) async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Purger {
    fn drop(&mut self) {
        // Closing the channel wakes the task out of its timer wait and it
        // exits on its own; there is nothing left worth joining.
        self.stop_tx.take();
    }
}

async fn run(state: Arc<Mutex<MeterState>>, mut stop_rx: oneshot::Receiver<()>) {
    info!(
        "auto purge enabled, first sweep in {:?}, then every {:?}",
        INITIAL_DELAY, SWEEP_INTERVAL
    );
    let mut delay = INITIAL_DELAY;
    loop {
        // Ok covers both an explicit stop and the sender side going away
        // with its meter.
        if timeout(delay, &mut stop_rx).await.is_ok() {
            debug!("purge task stopped");
            return;
        }
        let day_old = now_millis() - MS_24_HR;
        let evicted = state.lock().evict_older_than(day_old);
        if evicted > 0 {
            debug!("purge sweep evicted {} day-old events", evicted);
        }
        delay = SWEEP_INTERVAL;
    }
}

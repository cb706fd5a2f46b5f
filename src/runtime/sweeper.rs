//! Background expiry sweep for pending-payment timeouts.
//!
//! A ticker task periodically funnels overdue pending bookings through the
//! reconciler's failure branch, so expiry and explicit payment failure share
//! one release-and-promote path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::PaymentReconciler;
use crate::util::Clock;

/// Handle to a running expiry sweeper.
pub struct SweeperHandle {
    shutdown: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop after its current tick.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Signal shutdown and wait for the task to finish.
    pub async fn stop(self) {
        self.shutdown();
        let _ = self.handle.await;
    }
}

/// Spawn the expiry sweeper on the current Tokio runtime.
#[must_use]
pub fn spawn_expiry_sweeper(
    reconciler: Arc<PaymentReconciler>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) -> SweeperHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it so the loop waits a full
        // interval before the first sweep.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if shutdown_flag.load(Ordering::Acquire) {
                tracing::info!("expiry sweeper shutting down");
                break;
            }
            let expired = reconciler.expire_overdue(clock.now());
            if expired > 0 {
                tracing::warn!(expired, "expired overdue pending bookings");
            }
        }
    });

    SweeperHandle { shutdown, handle }
}

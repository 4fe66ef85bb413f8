//! Cancellation for in-flight requests

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::ServiceError;

#[derive(Debug, Default)]
struct AbortState {
    aborted: AtomicBool,
    notify: Notify,
}

/// A cloneable, one-shot cancellation flag.
///
/// Every clone observes the same state. Once aborted it stays aborted.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    state: Arc<AbortState>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        if !self.state.aborted.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Resolves once the signal is aborted
    pub async fn aborted(&self) {
        loop {
            // Register before checking so an abort in between is not missed
            let notified = self.state.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}

/// Run `future` unless `signal` fires first, in which case it is dropped and
/// `Cancelled` is returned
pub async fn run_abortable<T, F>(signal: &AbortSignal, future: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    if signal.is_aborted() {
        return Err(ServiceError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = signal.aborted() => Err(ServiceError::Cancelled),
        result = future => result,
    }
}

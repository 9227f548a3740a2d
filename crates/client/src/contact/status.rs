//! Tri-state submit indicator that falls back to idle on its own.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// What the contact form shows after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Default)]
struct PendingReset {
    generation: u64,
    handle: Option<AbortHandle>,
}

/// Holds the current [`SubmitStatus`] and resets it to idle after a delay.
///
/// A newer status supersedes any reset still pending for an older one.
pub struct StatusIndicator {
    state: Arc<watch::Sender<SubmitStatus>>,
    pending: Arc<Mutex<PendingReset>>,
    reset_after: Duration,
}

impl StatusIndicator {
    pub fn new(reset_after: Duration) -> Self {
        let (state, _) = watch::channel(SubmitStatus::Idle);
        Self { state: Arc::new(state), pending: Arc::default(), reset_after }
    }

    pub fn get(&self) -> SubmitStatus {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<SubmitStatus> {
        self.state.subscribe()
    }

    /// Show `status`; anything but idle is cleared after the reset delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set(&self, status: SubmitStatus) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.generation += 1;
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
        self.state.send_replace(status);

        if status == SubmitStatus::Idle {
            return;
        }

        let generation = pending.generation;
        let state = Arc::clone(&self.state);
        let shared = Arc::clone(&self.pending);
        let delay = self.reset_after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut pending = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.generation == generation {
                pending.handle = None;
                state.send_replace(SubmitStatus::Idle);
            }
        });
        pending.handle = Some(handle.abort_handle());
    }
}

impl Drop for StatusIndicator {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
    }
}

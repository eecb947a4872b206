//! Caller-side cancellation and deadlines for pool calls.

use crate::error::{CancelReason, Error, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation signal and optional deadline carried by a parse call.
///
/// A cloned context observes the same signal and deadline.
///
/// # Examples
///
/// ```rust
/// use postal_screen::CallContext;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let ctx = CallContext::with_timeout(Duration::from_secs(2));
/// assert!(ctx.err().is_none());
///
/// let (ctx, cancel) = CallContext::cancellable();
/// cancel.cancel();
/// assert!(ctx.err().is_some());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`CallContext`] created with it.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated contexts. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Check if [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context with an absolute deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// A context cancelled through the returned handle.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(receiver),
        };
        (ctx, CancelHandle { sender })
    }

    /// Add or tighten a deadline. An earlier existing deadline is kept.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context has ended, or `None` while it is still live.
    pub fn err(&self) -> Option<CancelReason> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(CancelReason::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Fail with [`Error::Cancelled`] if the context has ended.
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(reason) => Err(Error::Cancelled { reason }),
            None => Ok(()),
        }
    }

    /// Resolves when the context ends. Pends forever for a background
    /// context, or once the cancel handle is dropped without cancelling.
    pub async fn done(&self) -> CancelReason {
        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                    if fired {
                        return;
                    }
                    std::future::pending::<()>().await
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => CancelReason::Canceled,
            _ = expired => CancelReason::DeadlineExceeded,
        }
    }
}

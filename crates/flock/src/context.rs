//! Cancellation signal for polling lock acquisition

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a [`LockContext`] is done
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
struct Signal {
    cancelled: Mutex<bool>,
    wake: Condvar,
    deadline: Option<Instant>,
}

/// A cancellation signal with an optional deadline
///
/// Clones share the same signal, so one thread can cancel a poll running on
/// another. Cancellation takes precedence over the deadline when both apply.
///
/// ```
/// use flock::LockContext;
/// use std::time::Duration;
///
/// let ctx = LockContext::with_timeout(Duration::from_secs(30));
/// assert!(ctx.err().is_none());
///
/// ctx.cancel();
/// assert_eq!(ctx.err(), Some(flock::ContextError::Cancelled));
/// ```
#[derive(Clone)]
pub struct LockContext {
    signal: Arc<Signal>,
}

impl LockContext {
    /// A context that is only done once cancelled
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            signal: Arc::new(Signal {
                cancelled: Mutex::new(false),
                wake: Condvar::new(),
                deadline,
            }),
        }
    }

    /// The instant this context expires, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.signal.deadline
    }

    /// Cancels the context and wakes every thread waiting on it
    pub fn cancel(&self) {
        let mut cancelled = self
            .signal
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.signal.wake.notify_all();
    }

    /// Returns why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ContextError> {
        let cancelled = *self
            .signal
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.classify(cancelled, Instant::now())
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Blocks until the context is done or `timeout` elapses
    ///
    /// Returns the context error if the context is done on return. A zero
    /// timeout checks the context without blocking.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ContextError> {
        let start = Instant::now();
        let wake_at = start.checked_add(timeout);

        let mut cancelled = self
            .signal
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            let now = Instant::now();
            if let Some(err) = self.classify(*cancelled, now) {
                return Some(err);
            }

            // Sleep until whichever comes first: the retry tick or the deadline.
            let until = match (wake_at, self.signal.deadline) {
                (Some(tick), Some(deadline)) => Some(tick.min(deadline)),
                (Some(tick), None) => Some(tick),
                (None, deadline) => deadline,
            };

            cancelled = match until {
                Some(until) => {
                    if until <= now {
                        return None;
                    }
                    self.signal
                        .wake
                        .wait_timeout(cancelled, until - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .signal
                    .wake
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    fn classify(&self, cancelled: bool, now: Instant) -> Option<ContextError> {
        if cancelled {
            return Some(ContextError::Cancelled);
        }
        match self.signal.deadline {
            Some(deadline) if now >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }
}

impl Default for LockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockContext")
            .field("deadline", &self.signal.deadline)
            .field("err", &self.err())
            .finish()
    }
}

//! Error types for file locking

use crate::context::ContextError;
use crate::sys::LockMode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by every fallible [`Flock`](crate::Flock) operation
pub type Result<T> = std::result::Result<T, FlockError>;

/// Error type for lock operations
///
/// A non-blocking attempt that finds the lock held elsewhere is not an error;
/// `try_lock`/`try_rlock` report it as `Ok(false)`.
#[derive(Error, Debug)]
pub enum FlockError {
    /// The backing file could not be opened or created
    #[error("failed to open lock file {}: {source}", .path.display())]
    Open {
        /// Path to the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The OS lock primitive failed
    #[error("failed to take {mode} lock on {}: {source}", .path.display())]
    Lock {
        /// Path to the lock file
        path: PathBuf,
        /// Requested lock mode
        mode: LockMode,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The OS unlock primitive failed; the lock is still considered held
    #[error("failed to unlock {}: {source}", .path.display())]
    Unlock {
        /// Path to the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The lock context was cancelled before the lock was acquired
    #[error("lock acquisition cancelled")]
    Cancelled,

    /// The lock context deadline passed before the lock was acquired
    #[error("lock acquisition deadline exceeded")]
    DeadlineExceeded,
}

impl FlockError {
    /// Returns true if this error came from a cancelled [`LockContext`](crate::LockContext)
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FlockError::Cancelled)
    }

    /// Returns true if this error came from an expired [`LockContext`](crate::LockContext)
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, FlockError::DeadlineExceeded)
    }

    /// Raw OS error code of the underlying I/O failure, if any
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            FlockError::Open { source, .. }
            | FlockError::Lock { source, .. }
            | FlockError::Unlock { source, .. } => source.raw_os_error(),
            FlockError::Cancelled | FlockError::DeadlineExceeded => None,
        }
    }
}

impl From<ContextError> for FlockError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => FlockError::Cancelled,
            ContextError::DeadlineExceeded => FlockError::DeadlineExceeded,
        }
    }
}

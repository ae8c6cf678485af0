//! Cross-process advisory file locking
//!
//! A [`Flock`] is a handle on a lock file that can be held exclusively or
//! shared between readers, taken with a blocking call, a non-blocking attempt,
//! or a polling loop bounded by a [`LockContext`]. The OS lock is the only
//! arbiter between handles and processes; the handle tracks what it holds.
//!
//! Locks are advisory: they only constrain processes that take them too.

mod acquire;
mod context;
mod error;
mod guard;
mod handle;
mod options;
mod sys;

pub use context::{ContextError, LockContext};
pub use error::{FlockError, Result};
pub use guard::FlockGuard;
pub use handle::Flock;
pub use options::{FlockOptions, OpenFlags, DEFAULT_PERMISSIONS};
pub use sys::{LockBackend, LockMode, SystemBackend};

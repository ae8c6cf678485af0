//! RAII guard for automatic lock release

use crate::error::Result;
use crate::handle::Flock;
use crate::sys::{LockBackend, LockMode, SystemBackend};

/// RAII guard over a lock held by a [`Flock`]
///
/// When this guard is dropped, [`Flock::unlock`] is called. An unlock failure
/// during drop is logged; use [`FlockGuard::unlock`] to observe it instead.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct FlockGuard<'a, B: LockBackend = SystemBackend> {
    flock: &'a Flock<B>,
    mode: LockMode,
    released: bool,
}

impl<'a, B: LockBackend> FlockGuard<'a, B> {
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn flock(&self) -> &'a Flock<B> {
        self.flock
    }

    /// Releases the lock now, returning any unlock error
    pub fn unlock(mut self) -> Result<()> {
        self.released = true;
        self.flock.unlock()
    }
}

impl<B: LockBackend> Drop for FlockGuard<'_, B> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.flock.unlock() {
            tracing::warn!("{}", err);
        }
    }
}

impl<B: LockBackend> Flock<B> {
    /// Blocks until an exclusive lock is held and returns a guard releasing it
    ///
    /// The guard releases everything this instance holds when it is dropped.
    /// If the instance was already locked before this call, no new lock is
    /// taken, and dropping the guard still releases the earlier lock.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flock::Flock;
    ///
    /// # fn main() -> Result<(), flock::FlockError> {
    /// let lock = Flock::new("/tmp/my.lock");
    /// let guard = lock.acquire()?;
    /// // Critical section here
    /// drop(guard); // Explicit drop (automatic on scope exit)
    /// # Ok(())
    /// # }
    /// ```
    pub fn acquire(&self) -> Result<FlockGuard<'_, B>> {
        self.lock()?;
        Ok(self.guard(LockMode::Exclusive))
    }

    /// Blocks until a shared lock is held and returns a guard releasing it
    ///
    /// As with [`acquire`](Flock::acquire), dropping the guard also releases
    /// a shared lock taken before this call.
    pub fn acquire_shared(&self) -> Result<FlockGuard<'_, B>> {
        self.rlock()?;
        Ok(self.guard(LockMode::Shared))
    }

    fn guard(&self, mode: LockMode) -> FlockGuard<'_, B> {
        FlockGuard {
            flock: self,
            mode,
            released: false,
        }
    }
}

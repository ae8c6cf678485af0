//! Polling acquisition bounded by a [`LockContext`]

use crate::context::LockContext;
use crate::error::Result;
use crate::handle::Flock;
use crate::sys::LockBackend;
use std::thread;
use std::time::Duration;

impl<B: LockBackend> Flock<B> {
    /// Retries [`try_lock`](Flock::try_lock) every `retry_delay` until it
    /// succeeds, fails with an error, or `ctx` is done
    ///
    /// An already-done context fails before any lock attempt. The context is
    /// checked between attempts only; an in-flight attempt is never
    /// interrupted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flock::{Flock, LockContext};
    /// use std::time::Duration;
    ///
    /// # fn main() -> Result<(), flock::FlockError> {
    /// let lock = Flock::new(std::env::temp_dir().join("my-app.lock"));
    /// let ctx = LockContext::with_timeout(Duration::from_secs(30));
    ///
    /// if lock.try_lock_context(&ctx, Duration::from_millis(678))? {
    ///     lock.unlock()?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn try_lock_context(&self, ctx: &LockContext, retry_delay: Duration) -> Result<bool> {
        poll_until(ctx, retry_delay, || self.try_lock())
    }

    /// Retries [`try_rlock`](Flock::try_rlock) every `retry_delay` until it
    /// succeeds, fails with an error, or `ctx` is done
    pub fn try_rlock_context(&self, ctx: &LockContext, retry_delay: Duration) -> Result<bool> {
        poll_until(ctx, retry_delay, || self.try_rlock())
    }
}

fn poll_until(
    ctx: &LockContext,
    retry_delay: Duration,
    mut attempt: impl FnMut() -> Result<bool>,
) -> Result<bool> {
    if let Some(err) = ctx.err() {
        return Err(err.into());
    }

    loop {
        match attempt() {
            Ok(false) => {}
            terminal => return terminal,
        }

        if retry_delay.is_zero() {
            thread::yield_now();
        }

        if let Some(err) = ctx.wait_timeout(retry_delay) {
            return Err(err.into());
        }
    }
}

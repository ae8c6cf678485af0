//! The lock handle and its acquisition protocol

use crate::error::{FlockError, Result};
use crate::options::{FlockOptions, OpenFlags};
use crate::sys::{LockBackend, LockMode, SystemBackend};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What this instance believes it holds at the OS level
#[derive(Debug, Default)]
struct State {
    file: Option<File>,
    exclusive: bool,
    shared: bool,
}

impl State {
    fn holds(&self, mode: LockMode) -> bool {
        match mode {
            LockMode::Exclusive => self.exclusive,
            LockMode::Shared => self.shared,
        }
    }

    fn mark(&mut self, mode: LockMode) {
        match mode {
            LockMode::Exclusive => self.exclusive = true,
            LockMode::Shared => self.shared = true,
        }
    }

    fn is_unlocked(&self) -> bool {
        !self.exclusive && !self.shared
    }

    /// Closes the handle unless a lock is held through it
    fn release_if_unlocked(&mut self) {
        if self.is_unlocked() {
            self.file = None;
        }
    }
}

/// A cross-process advisory lock on a filesystem path
///
/// The backing file is opened lazily on the first lock attempt and closed
/// again once the instance holds no lock. It is never deleted.
///
/// All methods take `&self`; an internal reader/writer guard serializes
/// threads that share one instance. Mutators hold that guard for the whole
/// OS call, so a blocking [`lock`](Flock::lock) also blocks
/// [`is_locked`](Flock::is_locked) on the same instance until it returns.
///
/// Dropping a `Flock` does not call [`unlock`](Flock::unlock). The descriptor
/// is closed with it, which the OS treats as a release.
///
/// # Examples
///
/// ```no_run
/// use flock::Flock;
///
/// # fn main() -> Result<(), flock::FlockError> {
/// let lock = Flock::new(std::env::temp_dir().join("my-app.lock"));
///
/// if lock.try_lock()? {
///     // Only one process gets here at a time
///     lock.unlock()?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Flock<B: LockBackend = SystemBackend> {
    path: PathBuf,
    options: FlockOptions,
    backend: B,
    state: RwLock<State>,
}

impl Flock<SystemBackend> {
    /// Creates a handle for `path` with the default [`FlockOptions`]
    ///
    /// Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, FlockOptions::default())
    }

    /// Creates a handle for `path` that opens the file with `options`
    pub fn with_options(path: impl Into<PathBuf>, options: FlockOptions) -> Self {
        Self::with_backend(path, options, SystemBackend)
    }
}

impl<B: LockBackend> Flock<B> {
    /// Creates a handle that reaches the OS through `backend`
    pub fn with_backend(path: impl Into<PathBuf>, options: FlockOptions, backend: B) -> Self {
        Self {
            path: path.into(),
            options,
            backend,
            state: RwLock::new(State::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &FlockOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns true if this instance holds an exclusive lock
    pub fn is_locked(&self) -> bool {
        self.read_state().exclusive
    }

    /// Returns true if this instance holds a shared lock
    pub fn is_rlocked(&self) -> bool {
        self.read_state().shared
    }

    /// Takes an exclusive lock, blocking until it is available
    ///
    /// Returns immediately if this instance already holds an exclusive lock.
    /// Prefer [`try_lock`](Flock::try_lock) or
    /// [`try_lock_context`](Flock::try_lock_context) where waiting forever is
    /// not acceptable.
    ///
    /// If this instance holds a shared lock, some Unix-like systems silently
    /// convert that shared lock into an exclusive one, since both are held
    /// through the same descriptor. A later [`unlock`](Flock::unlock) then
    /// releases the exclusive lock, even if the caller thinks it only held a
    /// shared one. Avoid mixing shared and exclusive calls on one instance.
    pub fn lock(&self) -> Result<()> {
        self.acquire_mode(LockMode::Exclusive, true).map(|_| ())
    }

    /// Takes a shared lock, blocking until it is available
    ///
    /// Returns immediately if this instance already holds a shared lock.
    pub fn rlock(&self) -> Result<()> {
        self.acquire_mode(LockMode::Shared, true).map(|_| ())
    }

    /// Attempts an exclusive lock without waiting
    ///
    /// Returns `Ok(false)` when another holder has the lock. The in-process
    /// guard may still make this call wait briefly for other threads using
    /// the same instance.
    pub fn try_lock(&self) -> Result<bool> {
        self.acquire_mode(LockMode::Exclusive, false)
    }

    /// Attempts a shared lock without waiting
    ///
    /// Returns `Ok(false)` when an exclusive holder has the lock.
    pub fn try_rlock(&self) -> Result<bool> {
        self.acquire_mode(LockMode::Shared, false)
    }

    /// Releases whatever lock this instance holds and closes the file
    ///
    /// Returns immediately if nothing is held. On failure the lock is still
    /// considered held, so the call can be retried.
    pub fn unlock(&self) -> Result<()> {
        let mut state = self.write_state();

        let file = match state.file.as_ref() {
            Some(file) if !state.is_unlocked() => file,
            _ => return Ok(()),
        };

        self.backend
            .unlock(file)
            .map_err(|source| FlockError::Unlock {
                path: self.path.clone(),
                source,
            })?;

        state.file = None;
        state.exclusive = false;
        state.shared = false;
        tracing::trace!("released lock on {}", self.path.display());

        Ok(())
    }

    fn acquire_mode(&self, mode: LockMode, blocking: bool) -> Result<bool> {
        let mut state = self.write_state();

        if state.holds(mode) {
            return Ok(true);
        }

        let acquired = self.attempt(&mut state, mode, blocking);
        state.release_if_unlocked();
        acquired
    }

    fn attempt(&self, state: &mut State, mode: LockMode, blocking: bool) -> Result<bool> {
        let mut file = match state.file.take() {
            Some(file) => file,
            None => self.open(self.options.flags)?,
        };

        tracing::trace!(
            "taking {} lock on {} (blocking: {})",
            mode,
            self.path.display(),
            blocking
        );
        let mut outcome = self.call(&file, mode, blocking);

        let reopen = match &outcome {
            Err(err) if !self.backend.is_contended(err) => {
                let reopen = self.backend.should_reopen(err, &file, &self.options);
                tracing::debug!(
                    "{} lock on {} failed ({}), reopen-retry: {}",
                    mode,
                    self.path.display(),
                    err,
                    reopen
                );
                reopen
            }
            _ => false,
        };

        if reopen {
            // Closing the stale descriptor drops any lock it carried.
            drop(file);
            state.exclusive = false;
            state.shared = false;

            file = self.open(self.options.flags.with_read_write())?;
            outcome = self.call(&file, mode, blocking);
        }

        state.file = Some(file);

        match outcome {
            Ok(()) => {
                state.mark(mode);
                Ok(true)
            }
            Err(err) if !blocking && self.backend.is_contended(&err) => Ok(false),
            Err(source) => Err(FlockError::Lock {
                path: self.path.clone(),
                mode,
                source,
            }),
        }
    }

    fn call(&self, file: &File, mode: LockMode, blocking: bool) -> std::io::Result<()> {
        if blocking {
            self.backend.lock(file, mode)
        } else {
            self.backend.try_lock(file, mode)
        }
    }

    fn open(&self, flags: OpenFlags) -> Result<File> {
        let options = self.options.flags(flags);
        self.backend
            .open(&self.path, &options)
            .map_err(|source| FlockError::Open {
                path: self.path.clone(),
                source,
            })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn has_open_file(&self) -> bool {
        self.read_state().file.is_some()
    }
}

impl<B: LockBackend> fmt::Display for Flock<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl<B: LockBackend> fmt::Debug for Flock<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Flock")
            .field("path", &self.path)
            .field("exclusive", &state.exclusive)
            .field("shared", &state.shared)
            .field("open", &state.file.is_some())
            .finish()
    }
}

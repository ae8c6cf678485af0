//! Platform capability interface for the OS lock primitive
//!
//! [`Flock`](crate::Flock) runs one acquisition protocol on every platform and
//! reaches the OS only through [`LockBackend`]. [`SystemBackend`] is the real
//! implementation: `flock(2)` on Unix and `LockFileEx` on Windows, both via
//! the fs2 crate.

use crate::options::FlockOptions;
use fs2::FileExt;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as imp;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as imp;

/// Which lock a caller asks the OS for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// One holder across all processes
    Exclusive,
    /// Many holders; excludes exclusive holders
    Shared,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockMode::Exclusive => f.write_str("exclusive"),
            LockMode::Shared => f.write_str("shared"),
        }
    }
}

/// Operations the acquisition protocol needs from the operating system
pub trait LockBackend: Send + Sync {
    /// Opens (or creates) the backing file
    fn open(&self, path: &Path, options: &FlockOptions) -> io::Result<File>;

    /// Takes a lock, blocking until it is available
    fn lock(&self, file: &File, mode: LockMode) -> io::Result<()>;

    /// Takes a lock without blocking
    ///
    /// Contention must be reported as an error for which
    /// [`is_contended`](LockBackend::is_contended) returns true.
    fn try_lock(&self, file: &File, mode: LockMode) -> io::Result<()>;

    /// Releases whatever lock `file` holds
    fn unlock(&self, file: &File) -> io::Result<()>;

    /// Returns true if `err` means the lock is held elsewhere
    fn is_contended(&self, err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::WouldBlock
            || (err.raw_os_error().is_some()
                && err.raw_os_error() == fs2::lock_contended_error().raw_os_error())
    }

    /// Returns true if `err` should be answered by reopening the file
    /// read-write and retrying the lock once
    fn should_reopen(&self, err: &io::Error, file: &File, options: &FlockOptions) -> bool {
        imp::should_reopen(err, file, options)
    }
}

/// The operating system's own lock primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl LockBackend for SystemBackend {
    fn open(&self, path: &Path, options: &FlockOptions) -> io::Result<File> {
        options.open_options().open(path)
    }

    // Fully qualified calls: std's own File::lock_shared/try_lock_shared/unlock
    // have different signatures and would otherwise shadow the trait methods.
    fn lock(&self, file: &File, mode: LockMode) -> io::Result<()> {
        match mode {
            LockMode::Exclusive => FileExt::lock_exclusive(file),
            LockMode::Shared => FileExt::lock_shared(file),
        }
    }

    fn try_lock(&self, file: &File, mode: LockMode) -> io::Result<()> {
        match mode {
            LockMode::Exclusive => FileExt::try_lock_exclusive(file),
            LockMode::Shared => FileExt::try_lock_shared(file),
        }
    }

    fn unlock(&self, file: &File) -> io::Result<()> {
        FileExt::unlock(file)
    }
}

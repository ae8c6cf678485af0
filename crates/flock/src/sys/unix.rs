//! Reopen-on-error heuristic for Unix-like systems
//!
//! Since Linux 3.4, `flock(2)` on NFSv4 is emulated with `fcntl` record locks,
//! and an exclusive record lock needs a descriptor opened for writing. A
//! read-only descriptor then fails with `EIO` or `EBADF` instead of locking.
//! util-linux's flock(1) answers this by reopening read-write and retrying.

use crate::options::FlockOptions;
use std::fs::File;
use std::io;
use std::os::unix::fs::PermissionsExt;

pub(super) fn should_reopen(err: &io::Error, file: &File, options: &FlockOptions) -> bool {
    if !matches!(err.raw_os_error(), Some(libc::EIO) | Some(libc::EBADF)) {
        return false;
    }

    let metadata = match file.metadata() {
        Ok(metadata) => metadata,
        Err(stat_err) => {
            tracing::debug!("not reopening: stat failed: {}", stat_err);
            return false;
        }
    };

    // Only files we could have created ourselves qualify; anything else is a
    // genuine error.
    let mode = metadata.permissions().mode();
    mode & options.permissions == options.permissions
}

//! Windows has no reopen-on-error path
//!
//! `LockFileEx` locks byte ranges on any handle regardless of its access mode,
//! so the NFS read-only descriptor failure cannot occur.

use crate::options::FlockOptions;
use std::fs::File;
use std::io;

pub(super) fn should_reopen(_err: &io::Error, _file: &File, _options: &FlockOptions) -> bool {
    false
}

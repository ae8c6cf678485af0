//! Test utilities for flock
//!
//! Shared helpers for the flock unit tests, integration tests and the
//! cross-process helper binaries.

use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

/// Creates a temporary directory within `.tmp/` at the crate root
///
/// Lock files created here live on the same filesystem as the checkout.
///
/// # Panics
///
/// Panics if the current directory is unknown or `.tmp/` cannot be created.
///
/// # Examples
///
/// ```rust
/// use flock_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let lock_path = temp.path().join("test.lock");
/// std::fs::write(&lock_path, "").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Returns a unique path inside `dir` where no file exists yet
///
/// The path is reserved by creating a `flock-*` file and removing it again, so
/// a lock taken on it has to create the backing file itself.
pub fn fresh_lock_path(dir: &Path) -> PathBuf {
    let file = Builder::new()
        .prefix("flock-")
        .suffix(".lock")
        .tempfile_in(dir)
        .expect("Failed to create temporary lock file");
    let path = file.path().to_path_buf();
    file.close().expect("Failed to remove temporary lock file");
    path
}

/// Path of the example binary `name` from the package under test
///
/// Integration test binaries live in `target/<profile>/deps/`, and cargo puts
/// the package's examples next to that directory in `examples/`.
///
/// ```no_run
/// use flock_testkit::example_bin;
/// use std::process::Command;
///
/// let mut holder = Command::new(example_bin("hold_until_eof"))
///     .arg("app.lock")
///     .spawn()
///     .unwrap();
/// holder.kill().unwrap();
/// ```
pub fn example_bin(name: &str) -> PathBuf {
    let test_exe = std::env::current_exe().expect("Failed to locate the test binary");
    let profile_dir = test_exe
        .parent()
        .and_then(Path::parent)
        .expect("Test binary should live in target/<profile>/deps");

    profile_dir
        .join("examples")
        .join(name)
        .with_extension(std::env::consts::EXE_EXTENSION)
}

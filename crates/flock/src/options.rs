//! Open configuration for the backing lock file

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;

/// Default permission bits for a newly created lock file (owner read-write)
pub const DEFAULT_PERMISSIONS: u32 = 0o600;

/// Flags used to open the backing file
///
/// Mirrors the subset of [`OpenOptions`] that matters for a lock file. The
/// default is create-if-missing, truncate, read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
    pub append: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            create: true,
            truncate: true,
            append: false,
        }
    }
}

impl OpenFlags {
    /// Read-only access without creation
    ///
    /// Use this to lock a directory, or a file on a read-only filesystem.
    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            create: false,
            truncate: false,
            append: false,
        }
    }

    /// Read-write access to an existing file, without creating or truncating it
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            create: false,
            truncate: false,
            append: false,
        }
    }

    /// These flags with read-write access added
    pub fn with_read_write(self) -> Self {
        Self {
            read: true,
            write: true,
            ..self
        }
    }

    /// Returns true if neither `write` nor `append` is set
    pub fn is_read_only(&self) -> bool {
        !self.write && !self.append
    }
}

/// Configuration used to (re)open the backing file of a [`Flock`](crate::Flock)
///
/// Deserializes with every field optional:
///
/// ```
/// let options: flock::FlockOptions = toml::from_str("permissions = 0o644").unwrap();
/// assert_eq!(options.permissions, 0o644);
/// assert!(options.flags.create);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockOptions {
    /// Flags the file is opened with
    pub flags: OpenFlags,
    /// Permission bits applied when the file is created (Unix only)
    pub permissions: u32,
}

impl Default for FlockOptions {
    fn default() -> Self {
        Self {
            flags: OpenFlags::default(),
            permissions: DEFAULT_PERMISSIONS,
        }
    }
}

impl FlockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the open flags
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replaces the permission bits
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    /// Builds the [`OpenOptions`] these settings describe
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.flags.read)
            .write(self.flags.write)
            .create(self.flags.create)
            .truncate(self.flags.truncate)
            .append(self.flags.append);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.permissions);
        }

        options
    }
}

//! Core types: portable open intents and seek origins.

use std::ops::{BitOr, BitOrAssign};

/// Largest chunk handed to a single OS write call.
///
/// Some platforms (notably Windows on network drives) reject single writes
/// above 64 MiB, so every write is split into segments of at most this size.
pub const MAXIMUM_SEGMENT_SIZE: usize = 32 * 1024 * 1024;

/// Chunk size used by [`Input::read_all`](crate::Input::read_all).
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Permission bits for newly created files (before the process umask).
pub const DEFAULT_MODE: u32 = 0o666;

/// Portable description of how a file should be opened.
///
/// A small set of named booleans. The access flags (`read`/`write`) select
/// the access mode; the rest are orthogonal modifiers. Flags compose with
/// `|`:
///
/// ```rust
/// use lowio::{Access, OpenFlags};
///
/// let flags = OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::TRUNCATE;
/// assert_eq!(flags.access(), Access::WriteOnly);
/// assert!(flags.create && flags.truncate);
/// ```
///
/// The portable layer does not validate combinations. `EXCLUDE` without
/// `CREATE`, for instance, is passed through and left for the OS to accept
/// or reject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Every write goes to the end of the file.
    pub append: bool,
    /// Create the file if it doesn't exist.
    pub create: bool,
    /// Truncate the file to zero length on open.
    pub truncate: bool,
    /// Fail if the file already exists (only meaningful with `create`).
    pub exclusive: bool,
}

impl OpenFlags {
    const NONE: Self = Self {
        read: false,
        write: false,
        append: false,
        create: false,
        truncate: false,
        exclusive: false,
    };

    /// Read-only access.
    pub const READ_ONLY: Self = Self {
        read: true,
        ..Self::NONE
    };

    /// Write-only access.
    pub const WRITE_ONLY: Self = Self {
        write: true,
        ..Self::NONE
    };

    /// Read and write access.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
        ..Self::NONE
    };

    /// Writes go to the end of the file.
    pub const APPEND: Self = Self {
        append: true,
        ..Self::NONE
    };

    /// Create the file if missing.
    pub const CREATE: Self = Self {
        create: true,
        ..Self::NONE
    };

    /// Truncate the file on open.
    pub const TRUNCATE: Self = Self {
        truncate: true,
        ..Self::NONE
    };

    /// Exclusive creation: the file must not exist yet.
    pub const EXCLUDE: Self = Self {
        exclusive: true,
        ..Self::NONE
    };

    /// Resolve the access mode.
    ///
    /// With neither `read` nor `write` set the file is opened read-only,
    /// the same as a POSIX `O_RDONLY` of zero.
    pub const fn access(&self) -> Access {
        match (self.read, self.write) {
            (true, true) => Access::ReadWrite,
            (false, true) => Access::WriteOnly,
            _ => Access::ReadOnly,
        }
    }

    /// Resolve what happens when the file does or doesn't exist.
    ///
    /// Precedence: `create|exclusive` wins over `create|truncate`, which wins
    /// over plain `create`. Without `create`, `truncate` requires the file to
    /// exist.
    pub const fn disposition(&self) -> Disposition {
        match (self.create, self.exclusive, self.truncate) {
            (true, true, _) => Disposition::CreateNew,
            (true, false, true) => Disposition::CreateAlways,
            (true, false, false) => Disposition::OpenAlways,
            (false, _, true) => Disposition::TruncateExisting,
            (false, _, false) => Disposition::OpenExisting,
        }
    }

    /// `true` if every flag set in `other` is also set in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.read || !other.read)
            && (self.write || !other.write)
            && (self.append || !other.append)
            && (self.create || !other.create)
            && (self.truncate || !other.truncate)
            && (self.exclusive || !other.exclusive)
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            read: self.read | rhs.read,
            write: self.write | rhs.write,
            append: self.append | rhs.append,
            create: self.create | rhs.create,
            truncate: self.truncate | rhs.truncate,
            exclusive: self.exclusive | rhs.exclusive,
        }
    }
}

impl BitOrAssign for OpenFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Access mode derived from [`OpenFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// Reading only.
    ReadOnly,
    /// Writing only.
    WriteOnly,
    /// Reading and writing.
    ReadWrite,
}

/// Creation behaviour derived from [`OpenFlags`].
///
/// Mirrors the Windows creation dispositions; on Unix the same behaviour
/// falls out of `O_CREAT`/`O_EXCL`/`O_TRUNC` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Disposition {
    /// Create; fail if the file exists.
    CreateNew,
    /// Create, or truncate an existing file.
    CreateAlways,
    /// Open, creating the file if missing.
    OpenAlways,
    /// Open an existing file and truncate it; fail if missing.
    TruncateExisting,
    /// Open an existing file; fail if missing.
    OpenExisting,
}

/// Reference point for [`seek`](crate::OwnedHandle::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeekOrigin {
    /// From the start of the file.
    Begin,
    /// From the current file position.
    Current,
    /// From the end of the file.
    End,
}

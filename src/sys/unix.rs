//! POSIX file descriptors.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc::c_int;

use super::NativeIo;
use crate::{Access, Error, ErrorKind, OpenFlags, Result, SeekOrigin};

/// Native handle type: a file descriptor.
pub type RawHandle = std::os::fd::RawFd;

/// The invalid descriptor.
pub const INVALID_HANDLE: RawHandle = -1;

// macOS rejects reads above `INT_MAX`.
#[cfg(target_vendor = "apple")]
const READ_LIMIT: usize = c_int::MAX as usize - 1;
#[cfg(not(target_vendor = "apple"))]
const READ_LIMIT: usize = isize::MAX as usize;

/// Arguments for `open(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFlags {
    /// The `O_*` bitmask, always including `O_CLOEXEC`.
    pub oflag: c_int,
}

pub(crate) struct Posix;

impl NativeIo for Posix {
    fn native_flags(flags: OpenFlags) -> NativeFlags {
        let access = match flags.access() {
            Access::ReadOnly => libc::O_RDONLY,
            Access::WriteOnly => libc::O_WRONLY,
            Access::ReadWrite => libc::O_RDWR,
        };
        let modifiers = [
            (flags.append, libc::O_APPEND),
            (flags.create, libc::O_CREAT),
            (flags.truncate, libc::O_TRUNC),
            (flags.exclusive, libc::O_EXCL),
        ];
        let oflag = modifiers
            .iter()
            .filter(|(set, _)| *set)
            .fold(access | libc::O_CLOEXEC, |acc, (_, bit)| acc | bit);
        NativeFlags { oflag }
    }

    fn open(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<RawHandle> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "path contains an interior NUL byte")
        })?;
        let NativeFlags { oflag } = Self::native_flags(flags);
        // SAFETY: `c_path` is NUL-terminated and outlives the call.
        let fd = unsafe { libc::open(c_path.as_ptr(), oflag, mode as libc::c_uint) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(fd)
    }

    fn close(handle: RawHandle) -> Result<()> {
        // SAFETY: plain descriptor close; ownership was given up by the caller.
        if unsafe { libc::close(handle) } != 0 {
            return Err(Error::last_os(
                ErrorKind::CloseFailed,
                format_args!("close failed for fd {handle}"),
            ));
        }
        Ok(())
    }

    fn seek(handle: RawHandle, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let whence = match origin {
            SeekOrigin::Begin => libc::SEEK_SET,
            SeekOrigin::Current => libc::SEEK_CUR,
            SeekOrigin::End => libc::SEEK_END,
        };
        let offset = libc::off_t::try_from(offset).map_err(|_| {
            Error::new(
                ErrorKind::SeekFailed,
                format!("seek offset {offset} out of range"),
            )
        })?;
        // SAFETY: no memory is passed to the kernel.
        let pos = unsafe { libc::lseek(handle, offset, whence) };
        if pos < 0 {
            return Err(Error::last_os(ErrorKind::SeekFailed, "seek failed"));
        }
        Ok(pos as u64)
    }

    fn read(handle: RawHandle, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len().min(READ_LIMIT);
        // SAFETY: `buf` is valid for writes of `len` bytes.
        let n = unsafe { libc::read(handle, buf.as_mut_ptr().cast(), len) };
        if n < 0 {
            return Err(Error::last_os(ErrorKind::ReadFailed, "read failed"));
        }
        Ok(n as usize)
    }

    fn write_segment(handle: RawHandle, segment: &[u8]) -> Result<usize> {
        // SAFETY: `segment` is valid for reads of its whole length.
        let n = unsafe { libc::write(handle, segment.as_ptr().cast(), segment.len()) };
        if n < 0 {
            return Err(Error::last_os(ErrorKind::WriteFailed, "write failed"));
        }
        Ok(n as usize)
    }

    fn truncate(handle: RawHandle) -> Result<()> {
        // SAFETY: no memory is passed to the kernel.
        let pos = unsafe { libc::lseek(handle, 0, libc::SEEK_CUR) };
        if pos < 0 {
            return Err(Error::last_os(
                ErrorKind::TruncateFailed,
                "truncate failed: cannot query position",
            ));
        }
        // SAFETY: as above.
        if unsafe { libc::ftruncate(handle, pos) } != 0 {
            return Err(Error::last_os(ErrorKind::TruncateFailed, "truncate failed"));
        }
        Ok(())
    }

    fn duplicate(handle: RawHandle) -> Result<RawHandle> {
        // SAFETY: no memory is passed to the kernel.
        let fd = unsafe { libc::fcntl(handle, libc::F_DUPFD_CLOEXEC, 0) };
        if fd < 0 {
            return Err(Error::last_os(
                ErrorKind::DuplicateFailed,
                format_args!("duplicate failed for fd {handle}"),
            ));
        }
        Ok(fd)
    }

    fn std_handles() -> [RawHandle; 3] {
        [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO]
    }
}

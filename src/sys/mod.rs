//! # Platform Syscall Adapter
//!
//! Thin, unowned operations on raw native handles.
//!
//! ## Overview
//!
//! Each target provides exactly one implementation of `NativeIo`:
//!
//! | Target | Implementation | Native handle |
//! |--------|----------------|---------------|
//! | Unix | `Posix` | file descriptor (`c_int`) |
//! | Windows | `Win32` | `HANDLE` |
//!
//! The free functions in this module forward to the selected
//! implementation, so nothing above this layer branches on the platform.
//!
//! None of these functions take ownership. Closing is explicit via
//! [`close`]; for automatic cleanup wrap the value in an
//! [`OwnedHandle`](crate::OwnedHandle).
//!
//! ## Error Signalling
//!
//! OS failures are turned into [`Error`](crate::Error)s whose message
//! carries the OS error text. Nothing is retried: a failed call is
//! reported on the spot.

use std::io;
use std::path::Path;

use crate::{OpenFlags, Result, SeekOrigin};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::Posix as Native;
#[cfg(unix)]
pub use unix::{INVALID_HANDLE, NativeFlags, RawHandle};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::Win32 as Native;
#[cfg(windows)]
pub use windows::{INVALID_HANDLE, NativeFlags, RawHandle};

/// The per-platform primitive surface.
///
/// Implementations must behave identically from the caller's point of view:
/// same error kinds, same short-read and full-write contracts.
pub(crate) trait NativeIo {
    /// Translate portable flags into the platform's open arguments.
    fn native_flags(flags: OpenFlags) -> NativeFlags;

    /// Open or create `path`.
    fn open(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<RawHandle>;

    /// Close `handle`. The caller has already checked validity.
    fn close(handle: RawHandle) -> Result<()>;

    /// Move the file pointer; returns the new offset from the start.
    fn seek(handle: RawHandle, offset: i64, origin: SeekOrigin) -> Result<u64>;

    /// Read at most `buf.len()` bytes.
    fn read(handle: RawHandle, buf: &mut [u8]) -> Result<usize>;

    /// Write one segment; returns the count the OS reported.
    fn write_segment(handle: RawHandle, segment: &[u8]) -> Result<usize>;

    /// Truncate at the current file pointer.
    fn truncate(handle: RawHandle) -> Result<()>;

    /// Create a second handle to the same open file.
    fn duplicate(handle: RawHandle) -> Result<RawHandle>;

    /// The process's standard input, output and error handles.
    fn std_handles() -> [RawHandle; 3];
}

/// Returns `true` if `handle` is not the invalid sentinel.
///
/// On Unix any non-negative descriptor is valid; on Windows anything but
/// `INVALID_HANDLE_VALUE`.
#[inline]
pub fn is_valid(handle: RawHandle) -> bool {
    #[cfg(unix)]
    {
        handle >= 0
    }
    #[cfg(windows)]
    {
        handle != INVALID_HANDLE
    }
}

/// Translate portable flags to native open arguments.
pub fn native_flags(flags: OpenFlags) -> NativeFlags {
    Native::native_flags(flags)
}

/// Open `path`, reporting the OS error on failure.
///
/// # Errors
///
/// Whatever the OS reports; an interior NUL in the path is
/// [`io::ErrorKind::InvalidInput`].
pub fn try_open(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<RawHandle> {
    Native::open(path, flags, mode)
}

/// Open `path`, returning [`INVALID_HANDLE`] on failure.
///
/// Use [`try_open`] or [`OwnedHandle::open`](crate::OwnedHandle::open) to
/// find out why an open failed.
pub fn open(path: &Path, flags: OpenFlags, mode: u32) -> RawHandle {
    try_open(path, flags, mode).unwrap_or(INVALID_HANDLE)
}

/// Close `handle` and reset it to [`INVALID_HANDLE`].
///
/// The handle is reset before the OS call, so it is never closed twice even
/// when the close fails. Closing the sentinel is a successful no-op.
///
/// # Errors
///
/// [`ErrorKind::CloseFailed`](crate::ErrorKind::CloseFailed) if the OS
/// rejects the close.
pub fn close(handle: &mut RawHandle) -> Result<()> {
    let raw = std::mem::replace(handle, INVALID_HANDLE);
    if !is_valid(raw) {
        return Ok(());
    }
    Native::close(raw)
}

/// Move the file pointer of `handle`.
///
/// # Errors
///
/// `BadHandle` for the sentinel, `SeekFailed` if the OS call fails.
pub fn seek(handle: RawHandle, offset: i64, origin: SeekOrigin) -> Result<u64> {
    check(handle, "seek")?;
    Native::seek(handle, offset, origin)
}

/// Read at most `buf.len()` bytes from `handle`.
///
/// A short read, including `0` at end of file, is a success.
///
/// # Errors
///
/// `BadHandle` for the sentinel, `ReadFailed` if the OS call fails.
pub fn read(handle: RawHandle, buf: &mut [u8]) -> Result<usize> {
    check(handle, "read")?;
    Native::read(handle, buf)
}

/// Write all of `data` to `handle`.
///
/// The data goes out in segments of at most
/// [`MAXIMUM_SEGMENT_SIZE`](crate::MAXIMUM_SEGMENT_SIZE) bytes. A segment
/// that the OS only partially accepts fails the whole write.
///
/// # Errors
///
/// `BadHandle` for the sentinel, `WriteFailed` on an OS error or a short
/// segment.
pub fn write(handle: RawHandle, data: &[u8]) -> Result<()> {
    check(handle, "write")?;
    for segment in data.chunks(crate::MAXIMUM_SEGMENT_SIZE) {
        let written = Native::write_segment(handle, segment)?;
        if written != segment.len() {
            return Err(crate::Error::new(
                crate::ErrorKind::WriteFailed,
                format!("short write ({written} of {} bytes)", segment.len()),
            ));
        }
    }
    Ok(())
}

/// Truncate the file behind `handle` at its current position.
///
/// # Errors
///
/// `BadHandle` for the sentinel, `TruncateFailed` if the OS call fails.
pub fn truncate(handle: RawHandle) -> Result<()> {
    check(handle, "truncate")?;
    Native::truncate(handle)
}

/// Duplicate `handle`.
///
/// The copy closes independently but shares the file position with the
/// original, as the OS defines it.
///
/// # Errors
///
/// `BadHandle` for the sentinel, `DuplicateFailed` if the OS call fails.
pub fn duplicate(handle: RawHandle) -> Result<RawHandle> {
    check(handle, "duplicate")?;
    Native::duplicate(handle)
}

/// The native handle of the process's standard input.
pub fn stdin() -> RawHandle {
    Native::std_handles()[0]
}

/// The native handle of the process's standard output.
pub fn stdout() -> RawHandle {
    Native::std_handles()[1]
}

/// The native handle of the process's standard error.
pub fn stderr() -> RawHandle {
    Native::std_handles()[2]
}

fn check(handle: RawHandle, operation: &str) -> Result<()> {
    if is_valid(handle) {
        Ok(())
    } else {
        Err(crate::Error::new(
            crate::ErrorKind::BadHandle,
            format!("invalid handle for {operation}"),
        ))
    }
}

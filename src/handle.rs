//! # Owned Handles
//!
//! [`OwnedHandle`] owns exactly one native handle and closes it exactly once.
//!
//! ## States
//!
//! ```text
//!            attach(h)                      attach(h2): close h, then hold h2
//! Invalid ─────────────▶ Valid(h) ──────────────────────────────────────┐
//!    ▲                     │  ▲                                          │
//!    │  detach() / close() │  └──────────────────────────────────────────┘
//!    └─────────────────────┘
//! ```
//!
//! Ownership moves with the value. `std::mem::take` moves the handle out and
//! leaves an invalid one behind. Dropping a valid handle closes it; since
//! `drop` has no error channel, a failure there is only logged. Call
//! [`close`](OwnedHandle::close) to observe it.

use std::fmt;
use std::io;
use std::path::Path;

use crate::sys::{self, RawHandle};
use crate::{Error, ErrorKind, OpenFlags, Result, SeekOrigin};

/// Sole owner of a native file handle.
///
/// # Example
///
/// ```rust,no_run
/// use lowio::{OpenFlags, OwnedHandle, SeekOrigin};
/// use std::path::Path;
///
/// # fn main() -> lowio::Result<()> {
/// let flags = OpenFlags::READ_WRITE | OpenFlags::CREATE;
/// let mut h = OwnedHandle::open(Path::new("data.bin"), flags, lowio::DEFAULT_MODE)?;
/// h.write(b"header")?;
/// h.seek(0, SeekOrigin::Begin)?;
///
/// let mut buf = [0u8; 6];
/// let n = h.read(&mut buf)?;
/// assert_eq!(&buf[..n], b"header");
/// h.close()?;
/// # Ok(())
/// # }
/// ```
pub struct OwnedHandle {
    raw: RawHandle,
}

// A HANDLE is a process-wide kernel object reference, not thread-bound.
#[cfg(windows)]
unsafe impl Send for OwnedHandle {}

impl OwnedHandle {
    /// An invalid handle that owns nothing.
    pub const fn new() -> Self {
        Self {
            raw: sys::INVALID_HANDLE,
        }
    }

    /// Open `path` and take ownership of the result.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::OpenFailed`] naming the path and the OS reason.
    pub fn open(path: &Path, flags: OpenFlags, mode: u32) -> Result<Self> {
        match sys::try_open(path, flags, mode) {
            Ok(raw) => {
                log::trace!("opened {} as {raw:?} ({flags})", path.display());
                Ok(Self { raw })
            }
            Err(e) => {
                log::debug!("open of {} ({flags}) failed: {e}", path.display());
                Err(Error::os(
                    ErrorKind::OpenFailed,
                    format_args!("failed to open \"{}\"", path.display()),
                    e,
                ))
            }
        }
    }

    /// Take ownership of `raw`.
    ///
    /// # Safety
    ///
    /// `raw` must be an open handle that nothing else will close, or the
    /// invalid sentinel.
    pub unsafe fn from_raw(raw: RawHandle) -> Self {
        Self { raw }
    }

    /// The held native value, still owned by `self`.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Returns `true` if a handle is held.
    #[inline]
    pub fn is_valid(&self) -> bool {
        sys::is_valid(self.raw)
    }

    /// Close the held handle, leaving `self` invalid.
    ///
    /// Closing an invalid handle is a successful no-op, so a second close
    /// never fails.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CloseFailed`] if the OS rejects the close. `self` is
    /// invalid afterwards either way; the old value is abandoned.
    pub fn close(&mut self) -> Result<()> {
        if self.is_valid() {
            log::trace!("closing {:?}", self.raw);
        }
        sys::close(&mut self.raw)
    }

    /// Close whatever is held, then take ownership of `raw`.
    ///
    /// # Errors
    ///
    /// If closing the previous handle fails the error is returned and `raw`
    /// is **not** attached; `self` is left invalid.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn attach(&mut self, raw: RawHandle) -> Result<()> {
        self.close()?;
        self.raw = raw;
        Ok(())
    }

    /// Give up ownership without closing; `self` becomes invalid.
    ///
    /// Returns the invalid sentinel if nothing was held.
    pub fn detach(&mut self) -> RawHandle {
        std::mem::replace(&mut self.raw, sys::INVALID_HANDLE)
    }

    /// Consume `self` and return the native value without closing it.
    pub fn into_raw(mut self) -> RawHandle {
        self.detach()
    }

    /// Move the file pointer; returns the new offset from the start.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `SeekFailed`.
    pub fn seek(&self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        sys::seek(self.raw, offset, origin)
    }

    /// Read at most `buf.len()` bytes; a short read is not an error.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `ReadFailed`.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        sys::read(self.raw, buf)
    }

    /// Write all of `data` or fail.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `WriteFailed`.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        sys::write(self.raw, data)
    }

    /// Truncate the file at the current position.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `TruncateFailed`.
    pub fn truncate(&self) -> Result<()> {
        sys::truncate(self.raw)
    }

    /// A new, independently owned handle to the same open file.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `DuplicateFailed`.
    pub fn duplicate(&self) -> Result<Self> {
        sys::duplicate(self.raw).map(|raw| Self { raw })
    }

    /// Duplicate a handle owned elsewhere and attach the copy.
    ///
    /// `raw` itself stays with its owner.
    ///
    /// # Errors
    ///
    /// `DuplicateFailed` if the copy can't be made (nothing changes), or
    /// `CloseFailed` if the currently held handle can't be closed (the copy
    /// is closed again).
    pub fn duplicate_from(&mut self, raw: RawHandle) -> Result<()> {
        let mut copy = sys::duplicate(raw).map_err(|e| match e.kind() {
            ErrorKind::BadHandle => Error::new(
                ErrorKind::DuplicateFailed,
                format!("cannot duplicate: {}", e.message()),
            ),
            _ => e,
        })?;
        if let Err(e) = self.close() {
            let copy_raw = copy;
            if let Err(ce) = sys::close(&mut copy) {
                log::warn!("failed to close duplicate {copy_raw:?}: {ce}");
            }
            return Err(e);
        }
        self.raw = copy;
        Ok(())
    }
}

impl Default for OwnedHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        let raw = self.raw;
        if let Err(e) = self.close() {
            log::warn!("failed to close {raw:?} on drop: {e}");
        }
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("raw", &self.raw)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl io::Read for OwnedHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        OwnedHandle::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for OwnedHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        OwnedHandle::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for OwnedHandle {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, origin) = match pos {
            io::SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
                })?;
                (n, SeekOrigin::Begin)
            }
            io::SeekFrom::Current(n) => (n, SeekOrigin::Current),
            io::SeekFrom::End(n) => (n, SeekOrigin::End),
        };
        OwnedHandle::seek(self, offset, origin).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Seek as _, Write as _};

    fn create(dir: &Path, name: &str) -> OwnedHandle {
        let flags = OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE;
        OwnedHandle::open(&dir.join(name), flags, crate::DEFAULT_MODE).unwrap()
    }

    #[test]
    fn new_is_invalid() {
        let h = OwnedHandle::new();
        assert!(!h.is_valid());
        assert_eq!(h.raw(), sys::INVALID_HANDLE);
        assert!(!OwnedHandle::default().is_valid());
    }

    #[test]
    fn close_twice_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        assert!(h.is_valid());
        h.close().unwrap();
        assert!(!h.is_valid());
        h.close().unwrap();
    }

    #[test]
    fn take_moves_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        let raw = h.raw();

        let h2 = std::mem::take(&mut h);
        assert!(!h.is_valid());
        assert!(h2.is_valid());
        assert_eq!(h2.raw(), raw);
    }

    #[test]
    fn detach_then_reattach() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        let raw = h.detach();
        assert!(!h.is_valid());
        assert!(sys::is_valid(raw));
        assert_eq!(h.detach(), sys::INVALID_HANDLE);

        let mut other = OwnedHandle::new();
        // SAFETY: `raw` was detached above and has no other owner.
        unsafe { other.attach(raw) }.unwrap();
        assert_eq!(other.raw(), raw);
        other.write(b"ok").unwrap();
    }

    #[test]
    fn attach_closes_previous() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        h.write(b"first").unwrap();
        let second = create(dir.path(), "b").into_raw();

        // SAFETY: `second` came from `into_raw` and has no other owner.
        unsafe { h.attach(second) }.unwrap();
        assert_eq!(h.raw(), second);
        h.write(b"second").unwrap();
        drop(h);

        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join("b")).unwrap(), b"second");
    }

    #[test]
    fn open_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = OwnedHandle::open(&path, OpenFlags::READ_ONLY, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert!(err.message().contains("missing.txt"));
        assert!(err.os_error().is_some());
    }

    #[test]
    fn operations_on_invalid_handle() {
        let h = OwnedHandle::new();
        let mut buf = [0u8; 1];
        assert_eq!(h.read(&mut buf).unwrap_err().kind(), ErrorKind::BadHandle);
        assert_eq!(h.write(b"x").unwrap_err().kind(), ErrorKind::BadHandle);
        assert_eq!(h.truncate().unwrap_err().kind(), ErrorKind::BadHandle);
        assert_eq!(h.duplicate().unwrap_err().kind(), ErrorKind::BadHandle);
    }

    #[test]
    fn duplicate_is_independent_for_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        h.write(b"abc").unwrap();

        let d = h.duplicate().unwrap();
        assert_ne!(d.raw(), h.raw());
        h.close().unwrap();

        d.seek(0, SeekOrigin::Begin).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(d.read(&mut buf).unwrap(), 3);
    }

    #[test]
    fn duplicate_from_keeps_source_owned() {
        let dir = tempfile::tempdir().unwrap();
        let src = create(dir.path(), "a");
        let mut h = create(dir.path(), "b");

        h.duplicate_from(src.raw()).unwrap();
        assert!(h.is_valid());
        assert_ne!(h.raw(), src.raw());
        src.write(b"still open").unwrap();
    }

    #[test]
    fn duplicate_from_invalid_reports_duplicate_failed() {
        let mut h = OwnedHandle::new();
        let err = h.duplicate_from(sys::INVALID_HANDLE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateFailed);
    }

    #[test]
    fn std_io_traits() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = create(dir.path(), "a");
        io::Write::write_all(&mut h, b"hello").unwrap();
        h.flush().unwrap();
        assert_eq!(h.stream_position().unwrap(), 5);
        h.rewind().unwrap();

        let mut s = String::new();
        h.read_to_string(&mut s).unwrap();
        assert_eq!(s, "hello");
    }

    #[test]
    fn std_io_error_mapping() {
        let mut h = OwnedHandle::new();
        let err = io::Read::read(&mut h, &mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn debug_shows_validity() {
        let h = OwnedHandle::new();
        assert!(format!("{h:?}").contains("valid: false"));
    }

    #[test]
    fn owned_handle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<OwnedHandle>();
    }

    #[cfg(unix)]
    #[test]
    fn drop_of_unopened_descriptor_is_logged_not_raised() {
        // Far above any descriptor this process has open.
        let unopened: RawHandle = 1 << 20;

        // SAFETY: nothing owns `unopened`; closing it only fails.
        let mut h = unsafe { OwnedHandle::from_raw(unopened) };
        let err = h.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CloseFailed);
        assert!(err.os_error().is_some());
        assert!(!h.is_valid());

        // SAFETY: as above.
        let dropped = unsafe { OwnedHandle::from_raw(unopened) };
        drop(dropped);
    }
}

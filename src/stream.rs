//! Role-specific owners: [`Input`] for reading, [`Output`] for writing.
//!
//! Both open with a fixed intent and otherwise forward to the wrapped
//! [`OwnedHandle`]. The one contract that changes is reading: [`Input::read`]
//! demands exactly the requested length, while [`Input::fetch`] accepts a
//! short read like the layer below.

use std::path::Path;

use crate::sys::RawHandle;
use crate::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MODE, Error, ErrorKind, OpenFlags, OwnedHandle, Result,
    SeekOrigin,
};

/// A file opened for reading.
///
/// # Example
///
/// ```rust,no_run
/// use lowio::Input;
/// use std::path::Path;
///
/// # fn main() -> lowio::Result<()> {
/// let input = Input::from_path(Path::new("header.bin"))?;
/// let mut magic = [0u8; 4];
/// input.read(&mut magic)?; // fails unless all 4 bytes are there
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Input {
    handle: OwnedHandle,
}

impl Input {
    /// An input that holds nothing.
    pub const fn new() -> Self {
        Self {
            handle: OwnedHandle::new(),
        }
    }

    /// Open `path` read-only.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut input = Self::new();
        input.open(path)?;
        Ok(input)
    }

    /// Open `path` read-only, replacing (and closing) any held handle.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::OpenFailed`] naming the path, or `CloseFailed` from
    /// releasing the previous handle.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let raw = crate::sys::try_open(path, OpenFlags::READ_ONLY, DEFAULT_MODE).map_err(|e| {
            Error::os(
                ErrorKind::OpenFailed,
                format_args!("failed to open \"{}\" for reading", path.display()),
                e,
            )
        })?;
        replace(&mut self.handle, raw)
    }

    /// Returns `true` if a handle is held.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Close the held handle.
    ///
    /// # Errors
    ///
    /// `CloseFailed`.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    /// Close any held handle and take ownership of `raw`.
    ///
    /// # Errors
    ///
    /// `CloseFailed` from the previous handle.
    ///
    /// # Safety
    ///
    /// See [`OwnedHandle::from_raw`].
    pub unsafe fn attach(&mut self, raw: RawHandle) -> Result<()> {
        // SAFETY: forwarded contract.
        unsafe { self.handle.attach(raw) }
    }

    /// Give up ownership without closing.
    pub fn detach(&mut self) -> RawHandle {
        self.handle.detach()
    }

    /// Read at most `buf.len()` bytes; returns how many arrived.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `ReadFailed`.
    pub fn fetch(&self, buf: &mut [u8]) -> Result<usize> {
        self.handle.read(buf)
    }

    /// Read exactly `buf.len()` bytes with a single OS read.
    ///
    /// There is no retry: a pipe or terminal that delivers the data in
    /// pieces fails here even though the rest would arrive later. Use
    /// [`fetch`](Self::fetch) in a loop, or [`read_all`](Self::read_all),
    /// for such sources.
    ///
    /// # Errors
    ///
    /// `BadHandle`, `ReadFailed` from the OS, or `ReadFailed` with
    /// "premature end of input" when that one read returns fewer than
    /// `buf.len()` bytes.
    pub fn read(&self, buf: &mut [u8]) -> Result<()> {
        let n = self.handle.read(buf)?;
        if n != buf.len() {
            return Err(Error::new(
                ErrorKind::ReadFailed,
                format!(
                    "premature end of input on {:?} ({n} of {} bytes)",
                    self.handle.raw(),
                    buf.len()
                ),
            ));
        }
        Ok(())
    }

    /// Read everything up to end of input into `out`.
    ///
    /// Reads in chunks of `buffer_size` bytes ([`DEFAULT_BUFFER_SIZE`] when
    /// `None`) until a read returns nothing. Returns the number of bytes
    /// appended.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `ReadFailed`; bytes read before the failure stay in
    /// `out`.
    pub fn read_all(&self, out: &mut Vec<u8>, buffer_size: Option<usize>) -> Result<usize> {
        let mut buffer = vec![0u8; buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1)];
        let mut total = 0;
        loop {
            let n = self.handle.read(&mut buffer)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&buffer[..n]);
            total += n;
        }
    }

    /// Move the file pointer.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `SeekFailed`.
    pub fn seek(&self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        self.handle.seek(offset, origin)
    }

    /// Duplicate `raw` (owned elsewhere) and hold the copy.
    ///
    /// # Errors
    ///
    /// `DuplicateFailed` or `CloseFailed`.
    pub fn duplicate_from(&mut self, raw: RawHandle) -> Result<()> {
        self.handle.duplicate_from(raw)
    }
}

impl From<OwnedHandle> for Input {
    fn from(handle: OwnedHandle) -> Self {
        Self { handle }
    }
}

impl From<Input> for OwnedHandle {
    fn from(input: Input) -> Self {
        input.handle
    }
}

/// A file created (or truncated) for writing.
#[derive(Debug, Default)]
pub struct Output {
    handle: OwnedHandle,
}

impl Output {
    /// An output that holds nothing.
    pub const fn new() -> Self {
        Self {
            handle: OwnedHandle::new(),
        }
    }

    /// Create or truncate `path` for writing.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut output = Self::new();
        output.open(path)?;
        Ok(output)
    }

    /// Create or truncate `path` write-only, replacing any held handle.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CreateFailed`] naming the path, or `CloseFailed` from
    /// releasing the previous handle.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let flags = OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::TRUNCATE;
        let raw = crate::sys::try_open(path, flags, DEFAULT_MODE).map_err(|e| {
            Error::os(
                ErrorKind::CreateFailed,
                format_args!("failed to open \"{}\" for writing", path.display()),
                e,
            )
        })?;
        replace(&mut self.handle, raw)
    }

    /// Returns `true` if a handle is held.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Close the held handle.
    ///
    /// # Errors
    ///
    /// `CloseFailed`.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    /// Close any held handle and take ownership of `raw`.
    ///
    /// # Errors
    ///
    /// `CloseFailed` from the previous handle.
    ///
    /// # Safety
    ///
    /// See [`OwnedHandle::from_raw`].
    pub unsafe fn attach(&mut self, raw: RawHandle) -> Result<()> {
        // SAFETY: forwarded contract.
        unsafe { self.handle.attach(raw) }
    }

    /// Give up ownership without closing.
    pub fn detach(&mut self) -> RawHandle {
        self.handle.detach()
    }

    /// Write all of `data` or fail.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `WriteFailed`.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.handle.write(data)
    }

    /// Move the file pointer.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `SeekFailed`.
    pub fn seek(&self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        self.handle.seek(offset, origin)
    }

    /// Truncate at the current position.
    ///
    /// # Errors
    ///
    /// `BadHandle` or `TruncateFailed`.
    pub fn truncate(&self) -> Result<()> {
        self.handle.truncate()
    }

    /// Duplicate `raw` (owned elsewhere) and hold the copy.
    ///
    /// # Errors
    ///
    /// `DuplicateFailed` or `CloseFailed`.
    pub fn duplicate_from(&mut self, raw: RawHandle) -> Result<()> {
        self.handle.duplicate_from(raw)
    }
}

impl From<OwnedHandle> for Output {
    fn from(handle: OwnedHandle) -> Self {
        Self { handle }
    }
}

impl From<Output> for OwnedHandle {
    fn from(output: Output) -> Self {
        output.handle
    }
}

/// Hand a freshly opened `raw` to `slot`, closing what `slot` held.
///
/// If that close fails, `raw` is closed too rather than leaked.
fn replace(slot: &mut OwnedHandle, raw: RawHandle) -> Result<()> {
    // SAFETY: `raw` was just opened and is owned by nobody else.
    let fresh = unsafe { OwnedHandle::from_raw(raw) };
    slot.close()?;
    *slot = fresh;
    Ok(())
}

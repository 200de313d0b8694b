//! Win32 `HANDLE`s.

use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, DUPLICATE_SAME_ACCESS, DuplicateHandle, ERROR_ACCESS_DENIED, GENERIC_READ,
    GENERIC_WRITE, GetLastError, INVALID_HANDLE_VALUE, NO_ERROR, SetLastError,
};
use windows_sys::Win32::Storage::FileSystem::{
    CREATE_ALWAYS, CREATE_NEW, CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_BEGIN, FILE_CURRENT,
    FILE_END, FILE_GENERIC_WRITE, FILE_SHARE_DELETE, FILE_SHARE_MODE, FILE_SHARE_READ,
    FILE_SHARE_WRITE, FILE_WRITE_DATA, INVALID_SET_FILE_POINTER, OPEN_ALWAYS, OPEN_EXISTING,
    ReOpenFile, ReadFile, SetEndOfFile, SetFilePointer, SetFilePointerEx, TRUNCATE_EXISTING,
    WriteFile,
};
use windows_sys::Win32::System::Console::{
    GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};
use windows_sys::Win32::System::Threading::GetCurrentProcess;

use super::NativeIo;
use crate::{Access, Disposition, Error, ErrorKind, OpenFlags, Result, SeekOrigin};

/// Native handle type: a Win32 `HANDLE`.
pub type RawHandle = std::os::windows::io::RawHandle;

/// `INVALID_HANDLE_VALUE`.
pub const INVALID_HANDLE: RawHandle = INVALID_HANDLE_VALUE;

/// Arguments for `CreateFileW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFlags {
    /// Desired access mask.
    pub access: u32,
    /// Creation disposition.
    pub creation: u32,
    /// Cut the file to zero length right after opening. Set for append with
    /// truncate, whose access mask cannot use a truncating disposition.
    pub truncate_after_open: bool,
}

const SHARE_ALL: FILE_SHARE_MODE = FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE;

pub(crate) struct Win32;

/// Set the length of the file behind `handle` through a second handle that
/// has write-data access. Append handles only carry `FILE_APPEND_DATA`,
/// which `SetEndOfFile` does not accept.
fn set_length_reopened(handle: RawHandle, length: i64) -> Result<()> {
    // SAFETY: `handle` is an open file handle; no memory is passed.
    let full = unsafe { ReOpenFile(handle, GENERIC_WRITE, SHARE_ALL, 0) };
    if full == INVALID_HANDLE_VALUE {
        return Err(Error::last_os(ErrorKind::TruncateFailed, "truncate failed"));
    }
    // SAFETY: `full` is the handle just opened; no out pointer is requested.
    let ok = unsafe {
        SetFilePointerEx(full, length, ptr::null_mut(), FILE_BEGIN) != 0
            && SetEndOfFile(full) != 0
    };
    let result = if ok {
        Ok(())
    } else {
        Err(Error::last_os(ErrorKind::TruncateFailed, "truncate failed"))
    };
    // SAFETY: `full` is owned here and closed once.
    unsafe { CloseHandle(full) };
    result
}

impl NativeIo for Win32 {
    fn native_flags(flags: OpenFlags) -> NativeFlags {
        let write = if flags.append {
            // Append-only data access keeps every write at end of file.
            FILE_GENERIC_WRITE & !FILE_WRITE_DATA
        } else {
            GENERIC_WRITE
        };
        let access = match flags.access() {
            Access::ReadOnly => GENERIC_READ,
            Access::WriteOnly => write,
            Access::ReadWrite => GENERIC_READ | write,
        };
        // Truncating dispositions need FILE_WRITE_DATA, so append opens
        // without them and truncates afterwards.
        let deferred = flags.append && flags.truncate;
        let creation = match flags.disposition() {
            Disposition::CreateNew => CREATE_NEW,
            Disposition::CreateAlways if deferred => OPEN_ALWAYS,
            Disposition::CreateAlways => CREATE_ALWAYS,
            Disposition::OpenAlways => OPEN_ALWAYS,
            Disposition::TruncateExisting if deferred => OPEN_EXISTING,
            Disposition::TruncateExisting => TRUNCATE_EXISTING,
            Disposition::OpenExisting => OPEN_EXISTING,
        };
        NativeFlags {
            access,
            creation,
            truncate_after_open: deferred && creation != CREATE_NEW,
        }
    }

    fn open(path: &Path, flags: OpenFlags, _mode: u32) -> io::Result<RawHandle> {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();
        if wide[..wide.len() - 1].contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path contains an interior NUL character",
            ));
        }
        let NativeFlags {
            access,
            creation,
            truncate_after_open,
        } = Self::native_flags(flags);
        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                access,
                SHARE_ALL,
                ptr::null(),
                creation,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        if truncate_after_open {
            if let Err(e) = set_length_reopened(handle, 0) {
                // SAFETY: `handle` was opened above and is not returned.
                unsafe { CloseHandle(handle) };
                return Err(e.into());
            }
        }
        Ok(handle)
    }

    fn close(handle: RawHandle) -> Result<()> {
        // SAFETY: ownership was given up by the caller.
        if unsafe { CloseHandle(handle) } == 0 {
            return Err(Error::last_os(
                ErrorKind::CloseFailed,
                format_args!("close failed for handle {handle:p}"),
            ));
        }
        Ok(())
    }

    fn seek(handle: RawHandle, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let method = match origin {
            SeekOrigin::Begin => FILE_BEGIN,
            SeekOrigin::Current => FILE_CURRENT,
            SeekOrigin::End => FILE_END,
        };
        let mut high = (offset >> 32) as i32;
        // SAFETY: `high` is a valid in/out location for the call.
        let low = unsafe {
            SetLastError(NO_ERROR);
            SetFilePointer(handle, offset as i32, &mut high, method)
        };
        // An all-ones low part is also a legitimate offset; only the last
        // error tells the two apart.
        if low == INVALID_SET_FILE_POINTER {
            // SAFETY: reads thread-local state only.
            let code = unsafe { GetLastError() };
            if code != NO_ERROR {
                return Err(Error::os(
                    ErrorKind::SeekFailed,
                    "seek failed",
                    io::Error::from_raw_os_error(code as i32),
                ));
            }
        }
        Ok((u64::from(high as u32) << 32) | u64::from(low))
    }

    fn read(handle: RawHandle, buf: &mut [u8]) -> Result<usize> {
        let len = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let mut n_read = 0u32;
        // SAFETY: `buf` is valid for writes of `len` bytes.
        let ok = unsafe { ReadFile(handle, buf.as_mut_ptr(), len, &mut n_read, ptr::null_mut()) };
        if ok == 0 {
            return Err(Error::last_os(ErrorKind::ReadFailed, "read failed"));
        }
        Ok(n_read as usize)
    }

    fn write_segment(handle: RawHandle, segment: &[u8]) -> Result<usize> {
        // Segments never exceed MAXIMUM_SEGMENT_SIZE, which fits in a u32.
        let len = segment.len() as u32;
        let mut written = 0u32;
        // SAFETY: `segment` is valid for reads of `len` bytes.
        let ok = unsafe { WriteFile(handle, segment.as_ptr(), len, &mut written, ptr::null_mut()) };
        if ok == 0 {
            return Err(Error::last_os(ErrorKind::WriteFailed, "write failed"));
        }
        Ok(written as usize)
    }

    fn truncate(handle: RawHandle) -> Result<()> {
        // SAFETY: no memory is passed to the kernel.
        if unsafe { SetEndOfFile(handle) } != 0 {
            return Ok(());
        }
        // SAFETY: reads thread-local state only.
        if unsafe { GetLastError() } != ERROR_ACCESS_DENIED {
            return Err(Error::last_os(ErrorKind::TruncateFailed, "truncate failed"));
        }
        let mut position = 0i64;
        // SAFETY: `position` is a valid out location.
        if unsafe { SetFilePointerEx(handle, 0, &mut position, FILE_CURRENT) } == 0 {
            return Err(Error::last_os(ErrorKind::TruncateFailed, "truncate failed"));
        }
        set_length_reopened(handle, position)
    }

    fn duplicate(handle: RawHandle) -> Result<RawHandle> {
        let mut copy = INVALID_HANDLE_VALUE;
        // SAFETY: `copy` is a valid out location; the pseudo process handle
        // needs no closing.
        let ok = unsafe {
            let process = GetCurrentProcess();
            DuplicateHandle(process, handle, process, &mut copy, 0, 0, DUPLICATE_SAME_ACCESS)
        };
        if ok == 0 {
            return Err(Error::last_os(
                ErrorKind::DuplicateFailed,
                format_args!("duplicate failed for handle {handle:p}"),
            ));
        }
        Ok(copy)
    }

    fn std_handles() -> [RawHandle; 3] {
        // SAFETY: pure queries of process state.
        unsafe {
            [
                GetStdHandle(STD_INPUT_HANDLE),
                GetStdHandle(STD_OUTPUT_HANDLE),
                GetStdHandle(STD_ERROR_HANDLE),
            ]
        }
    }
}

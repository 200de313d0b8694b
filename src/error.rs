//! Error types for low-level handle operations.

use std::fmt;
use std::io;

/// Convenience alias used by every fallible operation in this crate.
///
/// Success values are only reachable through `Ok`, so a failed operation can
/// never be mistaken for one that produced a value.
pub type Result<T = ()> = std::result::Result<T, Error>;

/// The closed set of failure categories.
///
/// Every [`Error`] carries exactly one of these. The set is intentionally
/// fixed: callers may match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// A file could not be opened.
    OpenFailed,
    /// A file could not be created.
    CreateFailed,
    /// The OS refused to close a handle.
    CloseFailed,
    /// The operation was attempted on an invalid handle.
    BadHandle,
    /// A read failed, or returned fewer bytes than were required.
    ReadFailed,
    /// A write failed or was only partially performed.
    WriteFailed,
    /// Moving the file pointer failed.
    SeekFailed,
    /// Truncating the file failed.
    TruncateFailed,
    /// Duplicating a handle failed.
    DuplicateFailed,
    /// An argument (e.g. a mode string) was malformed.
    BadParameter,
}

impl ErrorKind {
    /// Short, stable name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenFailed => "open failed",
            Self::CreateFailed => "create failed",
            Self::CloseFailed => "close failed",
            Self::BadHandle => "bad handle",
            Self::ReadFailed => "read failed",
            Self::WriteFailed => "write failed",
            Self::SeekFailed => "seek failed",
            Self::TruncateFailed => "truncate failed",
            Self::DuplicateFailed => "duplicate failed",
            Self::BadParameter => "bad parameter",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed operation: what went wrong, and a human readable explanation.
///
/// When the failure came from the operating system, the OS error is kept as
/// the [`source`](std::error::Error::source) and its text is already part of
/// the message. The message text is diagnostic only and carries no stability
/// guarantee.
///
/// # Examples
///
/// ```rust
/// use lowio::{Error, ErrorKind};
///
/// let err = Error::new(ErrorKind::BadHandle, "invalid handle for read");
/// assert_eq!(err.kind(), ErrorKind::BadHandle);
/// assert_eq!(err.to_string(), "invalid handle for read");
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<io::Error>,
}

impl Error {
    /// Create an error from a kind and a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error for a failed OS call.
    ///
    /// The message becomes `"<context> (<os error text>)"`.
    pub fn os(kind: ErrorKind, context: impl fmt::Display, source: io::Error) -> Self {
        Self {
            kind,
            message: format!("{context} ({source})"),
            source: Some(source),
        }
    }

    /// Shorthand for [`Error::os`] with [`io::Error::last_os_error`].
    pub(crate) fn last_os(kind: ErrorKind, context: impl fmt::Display) -> Self {
        Self::os(kind, context, io::Error::last_os_error())
    }

    /// The failure category.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The diagnostic message. Empty if none was supplied.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying OS error, if the failure came from a system call.
    #[inline]
    pub fn os_error(&self) -> Option<&io::Error> {
        self.source.as_ref()
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match (&error.source, error.kind) {
            (Some(os), _) => os.kind(),
            (None, ErrorKind::BadParameter | ErrorKind::BadHandle) => io::ErrorKind::InvalidInput,
            (None, ErrorKind::ReadFailed) => io::ErrorKind::UnexpectedEof,
            (None, ErrorKind::WriteFailed) => io::ErrorKind::WriteZero,
            (None, _) => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

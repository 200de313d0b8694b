//! # lowio
//!
//! Owned native file handles and the low-level primitives that operate on
//! them, with the same behaviour on **Unix** (file descriptors) and
//! **Windows** (`HANDLE`s).
//!
//! This crate does no buffering, no async I/O and no metadata. It opens,
//! closes, reads, writes, seeks, truncates and duplicates, and reports every
//! failure as a [`Result`].
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lowio::{Input, Output};
//! use std::path::Path;
//!
//! fn copy_header(src: &Path, dst: &Path) -> lowio::Result<()> {
//!     let input = Input::from_path(src)?;
//!     let mut header = [0u8; 16];
//!     input.read(&mut header)?; // exactly 16 bytes or ReadFailed
//!
//!     let mut output = Output::from_path(dst)?;
//!     output.write(&header)?;
//!     output.close()
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`OwnedHandle`] | Sole owner of a native handle; closes it exactly once |
//! | [`Input`] | Read-only owner with exact-length reads |
//! | [`Output`] | Create/truncate owner for writing |
//! | [`OpenFlags`] | Portable open intent, parsed from `"r"`, `"w+"`, `"ax"`, ... |
//! | [`SeekOrigin`] | Begin / current / end |
//! | [`Error`] / [`ErrorKind`] | Failure category plus diagnostic message |
//!
//! The unowned primitives on raw handles live in [`sys`].
//!
//! ---
//!
//! ## Layers
//!
//! ```text
//! Input / Output      exact reads, fixed open intent
//!        ↓
//! OwnedHandle         ownership, close-once, attach/detach
//!        ↓
//! sys                 one platform implementation, errors normalised
//!        ↓
//! OpenFlags           portable intent → native flags
//! ```
//!
//! ---
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<T, Error>`:
//!
//! ```rust
//! use lowio::{parse_flags, ErrorKind};
//!
//! let err = parse_flags("q").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::BadParameter);
//! assert_eq!(err.to_string(), "invalid open mode 'q' found in \"q\"");
//! ```
//!
//! Nothing is retried. The one place an error is lost is `Drop`: a failed
//! close during drop is logged through the [`log`] facade at `warn` level.
//! Call [`OwnedHandle::close`] to see it.
//!
//! ---
//!
//! ## Thread Safety
//!
//! Handles are `Send` and may move between threads. There is no internal
//! locking; sharing one handle between threads needs external
//! synchronisation.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`OpenFlags`], [`SeekOrigin`], [`ErrorKind`], etc. |

// Private modules
mod error;
mod handle;
mod mode;
mod stream;
mod types;

pub mod sys;

// Public re-exports - error types
pub use error::{Error, ErrorKind, Result};

// Public re-exports - core types
pub use types::{
    Access, DEFAULT_BUFFER_SIZE, DEFAULT_MODE, Disposition, MAXIMUM_SEGMENT_SIZE, OpenFlags,
    SeekOrigin,
};

// Public re-exports - mode strings
pub use mode::{parse_flags, unparse_flags};

// Public re-exports - handles
pub use handle::OwnedHandle;
pub use stream::{Input, Output};

// Public re-exports - native handle vocabulary
pub use sys::{INVALID_HANDLE, RawHandle, is_valid as is_valid_handle};

//! End-to-end tests through the public API.
//!
//! These tests verify that:
//! 1. Mode strings map to the expected flag sets and back
//! 2. Handles open, write, append and close against the real filesystem
//! 3. Ownership moves leave exactly one valid owner
//! 4. Exact reads fail where raw fetches succeed short

use lowio::*;
use std::path::{Path, PathBuf};

fn scratch() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("lowiotest-")
        .tempdir()
        .unwrap()
}

fn read_first_64(path: &Path) -> Vec<u8> {
    let mut bytes = std::fs::read(path).unwrap();
    bytes.truncate(64);
    bytes
}

// =============================================================================
// Mode strings
// =============================================================================

#[test]
fn canonical_mode_strings() {
    let cases = [
        ("r", OpenFlags::READ_ONLY),
        ("w", OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::TRUNCATE),
        ("r+", OpenFlags::READ_WRITE),
        ("w+", OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE),
        (
            "ax",
            OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::APPEND | OpenFlags::EXCLUDE,
        ),
    ];
    for (mode, expected) in cases {
        let flags = parse_flags(mode).unwrap();
        assert_eq!(flags, expected, "mode {mode:?}");
        assert_eq!(unparse_flags(flags), mode);
    }
}

#[test]
fn malformed_mode_strings() {
    for (mode, offending) in [("?", "'?'"), ("r?", "'?'"), ("w+z", "'z'")] {
        let err = parse_flags(mode).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadParameter);
        assert!(err.message().contains(offending), "{}", err.message());
    }
    assert_eq!(parse_flags("").unwrap_err().kind(), ErrorKind::BadParameter);
}

// =============================================================================
// Open / close
// =============================================================================

#[test]
fn create_then_close_invalidates() {
    let dir = scratch();
    let path = dir.path().join("tmp.txt");
    let flags = OpenFlags::CREATE | OpenFlags::WRITE_ONLY | OpenFlags::TRUNCATE;

    let mut raw = sys::open(&path, flags, DEFAULT_MODE);
    assert!(is_valid_handle(raw));

    sys::close(&mut raw).unwrap();
    assert!(!is_valid_handle(raw));
    assert_eq!(raw, INVALID_HANDLE);
}

#[test]
fn exclusive_create_refuses_existing_file() {
    let dir = scratch();
    let path = dir.path().join("once.txt");
    let flags = parse_flags("wx").unwrap();

    let first = OwnedHandle::open(&path, flags, DEFAULT_MODE).unwrap();
    assert!(first.is_valid());
    let err = OwnedHandle::open(&path, flags, DEFAULT_MODE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpenFailed);
}

#[test]
fn truncate_without_create_needs_existing_file() {
    let dir = scratch();
    let path = dir.path().join("absent.txt");
    let flags = OpenFlags::WRITE_ONLY | OpenFlags::TRUNCATE;
    assert!(!is_valid_handle(sys::open(&path, flags, DEFAULT_MODE)));
}

// =============================================================================
// Output and append
// =============================================================================

#[test]
fn write_then_append() {
    let dir = scratch();
    let path: PathBuf = dir.path().join("hello.txt");
    let hello = b"Hello World!";

    let mut output = Output::from_path(&path).unwrap();
    assert!(output.is_valid());
    output.write(hello).unwrap();
    output.close().unwrap();
    assert_eq!(read_first_64(&path), hello);

    let flags = OpenFlags::CREATE | OpenFlags::APPEND | OpenFlags::READ_WRITE;
    let mut h = OwnedHandle::open(&path, flags, DEFAULT_MODE).unwrap();
    h.write(hello).unwrap();
    h.close().unwrap();

    let contents = read_first_64(&path);
    assert_eq!(contents.len(), 24);
    assert_eq!(contents, b"Hello World!Hello World!");
}

#[test]
fn append_ignores_seek_for_writes() {
    let dir = scratch();
    let path = dir.path().join("log.txt");
    std::fs::write(&path, b"abc").unwrap();

    let h = OwnedHandle::open(&path, parse_flags("a").unwrap(), DEFAULT_MODE).unwrap();
    h.seek(0, SeekOrigin::Begin).unwrap();
    h.write(b"def").unwrap();
    drop(h);

    assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
}

#[test]
fn append_handle_truncates_at_current_offset() {
    let dir = scratch();
    let path = dir.path().join("cut.txt");
    std::fs::write(&path, b"abcdef").unwrap();

    let h = OwnedHandle::open(&path, parse_flags("a").unwrap(), DEFAULT_MODE).unwrap();
    h.seek(2, SeekOrigin::Begin).unwrap();
    h.truncate().unwrap();
    h.write(b"Z").unwrap();
    drop(h);

    assert_eq!(std::fs::read(&path).unwrap(), b"abZ");
}

#[test]
fn append_with_truncate_empties_existing_file() {
    let dir = scratch();
    let path = dir.path().join("reset.txt");
    std::fs::write(&path, b"stale contents").unwrap();

    let flags = OpenFlags::WRITE_ONLY | OpenFlags::APPEND | OpenFlags::TRUNCATE;
    let h = OwnedHandle::open(&path, flags, DEFAULT_MODE).unwrap();
    h.write(b"new").unwrap();
    h.seek(0, SeekOrigin::Begin).unwrap();
    h.write(b"!").unwrap();
    drop(h);

    assert_eq!(std::fs::read(&path).unwrap(), b"new!");
}

// =============================================================================
// Ownership
// =============================================================================

#[test]
fn move_leaves_source_invalid() {
    let dir = scratch();
    let path = dir.path().join("move.txt");
    let flags = OpenFlags::CREATE | OpenFlags::WRITE_ONLY | OpenFlags::TRUNCATE;
    let raw = sys::open(&path, flags, DEFAULT_MODE);
    assert!(is_valid_handle(raw));

    // SAFETY: `raw` was just opened and has no other owner.
    let mut h = unsafe { OwnedHandle::from_raw(raw) };
    assert!(h.is_valid());
    assert_eq!(h.raw(), raw);

    let mut h2 = std::mem::take(&mut h);
    assert!(h2.is_valid());
    assert!(!h.is_valid());
    assert_eq!(h2.raw(), raw);

    h2.close().unwrap();
    assert!(!h2.is_valid());
    h2.close().unwrap();
}

#[test]
fn detached_handle_survives_drop() {
    let dir = scratch();
    let path = dir.path().join("detach.txt");
    std::fs::write(&path, b"keep").unwrap();

    let mut input = Input::from_path(&path).unwrap();
    let mut raw = input.detach();
    drop(input);

    let mut buf = [0u8; 4];
    assert_eq!(sys::read(raw, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"keep");
    sys::close(&mut raw).unwrap();
}

// =============================================================================
// Exact vs. short reads
// =============================================================================

#[test]
fn exact_read_fails_where_fetch_succeeds_short() {
    let dir = scratch();
    let path = dir.path().join("short.txt");
    std::fs::write(&path, b"12345").unwrap();

    let input = Input::from_path(&path).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(input.fetch(&mut buf).unwrap(), 5);

    input.seek(0, SeekOrigin::Begin).unwrap();
    let err = input.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFailed);
}

#[test]
fn read_all_collects_everything() {
    let dir = scratch();
    let path = dir.path().join("all.bin");
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    std::fs::write(&path, &data).unwrap();

    let input = Input::from_path(&path).unwrap();
    let mut out = Vec::new();
    assert_eq!(input.read_all(&mut out, Some(4096)).unwrap(), data.len());
    assert_eq!(out, data);
}

// =============================================================================
// Interop with std::io
// =============================================================================

#[test]
fn std_io_copy_between_handles() {
    let dir = scratch();
    let src = dir.path().join("src.txt");
    let dst = dir.path().join("dst.txt");
    std::fs::write(&src, b"copied through std::io").unwrap();

    let mut from = OwnedHandle::from(Input::from_path(&src).unwrap());
    let mut to = OwnedHandle::from(Output::from_path(&dst).unwrap());
    std::io::copy(&mut from, &mut to).unwrap();
    to.close().unwrap();

    assert_eq!(std::fs::read(&dst).unwrap(), b"copied through std::io");
}

#[test]
fn lowio_errors_convert_to_io_errors() {
    fn fails() -> std::io::Result<()> {
        parse_flags("!")?;
        Ok(())
    }
    assert_eq!(fails().unwrap_err().kind(), std::io::ErrorKind::InvalidInput);
}

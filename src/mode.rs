//! `fopen`-style mode strings.
//!
//! Grammar: `[RrWwAa][+]?[BbXx]*`
//!
//! | Mode | Flags |
//! |------|-------|
//! | `r`  | read-only |
//! | `r+` | read-write |
//! | `w`  | write-only, create, truncate |
//! | `w+` | read-write, create, truncate |
//! | `a`  | write-only, create, append |
//! | `a+` | read-write, create, append |
//!
//! A trailing `b` is accepted and ignored; `x` adds exclusive creation.

use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorKind, OpenFlags, Result};

/// Parse a mode string such as `"r"`, `"w+"` or `"ax"` into [`OpenFlags`].
///
/// # Errors
///
/// [`ErrorKind::BadParameter`] for an empty string, an unknown leading
/// character, or an unknown suffix character. The message names the
/// offending character and the whole input.
///
/// # Example
///
/// ```rust
/// use lowio::{parse_flags, OpenFlags};
///
/// let flags = parse_flags("ax").unwrap();
/// assert_eq!(
///     flags,
///     OpenFlags::WRITE_ONLY | OpenFlags::CREATE | OpenFlags::APPEND | OpenFlags::EXCLUDE
/// );
/// ```
pub fn parse_flags(mode: &str) -> Result<OpenFlags> {
    let mut chars = mode.chars().peekable();

    let first = chars.next().ok_or_else(|| {
        Error::new(
            ErrorKind::BadParameter,
            format!("missing open mode character in \"{mode}\""),
        )
    })?;

    let mut flags = match first.to_ascii_lowercase() {
        'r' => OpenFlags::default(),
        'w' => OpenFlags::CREATE | OpenFlags::TRUNCATE,
        'a' => OpenFlags::CREATE | OpenFlags::APPEND,
        _ => return Err(invalid_mode(first, mode)),
    };

    if chars.next_if_eq(&'+').is_some() {
        flags |= OpenFlags::READ_WRITE;
    } else if first.eq_ignore_ascii_case(&'r') {
        flags |= OpenFlags::READ_ONLY;
    } else {
        flags |= OpenFlags::WRITE_ONLY;
    }

    for ch in chars {
        match ch.to_ascii_lowercase() {
            'b' => {}
            'x' => flags |= OpenFlags::EXCLUDE,
            _ => return Err(invalid_mode(ch, mode)),
        }
    }
    Ok(flags)
}

/// Render [`OpenFlags`] back into a mode string.
///
/// Best effort: `create|append` gives `"a"`, any other `create` gives `"w"`,
/// everything else `"r"`; then `"+"` for read-write and `"x"` for exclusive.
/// Combinations with no mode-string spelling (e.g. `append` without
/// `create`) lose the extra bits.
pub fn unparse_flags(flags: OpenFlags) -> String {
    let mut mode = String::with_capacity(3);
    mode.push(match (flags.create, flags.append) {
        (true, true) => 'a',
        (true, false) => 'w',
        (false, _) => 'r',
    });
    if flags.read && flags.write {
        mode.push('+');
    }
    if flags.exclusive {
        mode.push('x');
    }
    mode
}

fn invalid_mode(ch: char, mode: &str) -> Error {
    Error::new(
        ErrorKind::BadParameter,
        format!("invalid open mode '{ch}' found in \"{mode}\""),
    )
}

impl FromStr for OpenFlags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_flags(s)
    }
}

impl fmt::Display for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&unparse_flags(*self))
    }
}

//! Custom format language for [`ApiVersion`]
//!
//! | Specifier | Output |
//! |-----------|--------|
//! | `F` | `[group][.major[.minor]][-status]` (the `Display` form) |
//! | `FF` | as `F`, with `.0` when only the major version is set |
//! | `G` | group version as `yyyy-MM-dd` |
//! | `GG` | group version with `-status` |
//! | `M`..`MMMM`, `d`..`dddd`, `y`..`yyyy` | group version month, day and year |
//! | `V` / `v` | major / minor version |
//! | `VV` | `major[.minor]` |
//! | `VVV` | `major[.minor][-status]` |
//! | `VVVV` | `major.minor[-status]`, minor defaulting to `0` |
//! | `P` / `p` | major / minor padded to two digits, `P(n)` / `p(n)` to `n` digits |
//! | `PP`, `PPP`, `PPPP` | padded forms of `VV`, `VVV`, `VVVV` |
//! | `S` | status |
//!
//! Any other character is copied as-is. Text inside single or double quotes
//! and characters escaped with `\` are always literal, so `'v'VV` renders as
//! `v1.0`.

use super::ApiVersion;
use chrono::Datelike;
use std::fmt::{self, Write};

/// Error produced by the strict formatting entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The format string contains an unknown specifier at the given byte offset
    #[error("unknown API version format specifier at offset {position}")]
    InvalidSpecifier {
        /// Byte offset of the offending token
        position: usize,
    },
    /// The destination buffer is too small for the output
    #[error("destination buffer is too small for the formatted API version")]
    BufferTooSmall,
    /// The underlying writer failed
    #[error("failed to write the formatted API version")]
    Write,
}

const DEFAULT_PADDING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Specifier {
    Full,
    FullWithMinor,
    Group,
    GroupWithStatus,
    Month(usize),
    Day(usize),
    Year(usize),
    Major,
    Minor,
    MajorMinor,
    MajorMinorStatus,
    MajorZeroMinorStatus,
    PaddedMajor(usize),
    PaddedMinor(usize),
    PaddedMajorMinor,
    PaddedMajorMinorStatus,
    PaddedMajorZeroMinorStatus,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Specifier(Specifier),
    Invalid(usize),
}

/// Splits a format string into literal runs and specifier runs.
struct Tokens<'a> {
    format: &'a str,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(format: &'a str) -> Self {
        Self {
            format,
            position: 0,
        }
    }

    fn specifier(&mut self, letter: u8, start: usize) -> Token<'a> {
        let bytes = self.format.as_bytes();
        let mut end = start;
        while end < bytes.len() && bytes[end] == letter {
            end += 1;
        }
        let count = end - start;
        self.position = end;

        if count == 1 && (letter == b'P' || letter == b'p') && bytes.get(end) == Some(&b'(') {
            return match self.format[end + 1..].find(')') {
                Some(close) => {
                    let digits = &self.format[end + 1..end + 1 + close];
                    self.position = end + close + 2;
                    match digits.parse::<usize>() {
                        Ok(width) if letter == b'P' => Token::Specifier(Specifier::PaddedMajor(width)),
                        Ok(width) => Token::Specifier(Specifier::PaddedMinor(width)),
                        Err(_) => Token::Invalid(start),
                    }
                }
                None => {
                    self.position = bytes.len();
                    Token::Invalid(start)
                }
            };
        }

        let specifier = match (letter, count) {
            (b'F', 1) => Specifier::Full,
            (b'F', 2) => Specifier::FullWithMinor,
            (b'G', 1) => Specifier::Group,
            (b'G', 2) => Specifier::GroupWithStatus,
            (b'M', 1..=4) => Specifier::Month(count),
            (b'd', 1..=4) => Specifier::Day(count),
            (b'y', 1..=4) => Specifier::Year(count),
            (b'V', 1) => Specifier::Major,
            (b'V', 2) => Specifier::MajorMinor,
            (b'V', 3) => Specifier::MajorMinorStatus,
            (b'V', 4) => Specifier::MajorZeroMinorStatus,
            (b'v', 1) => Specifier::Minor,
            (b'P', 1) => Specifier::PaddedMajor(DEFAULT_PADDING),
            (b'P', 2) => Specifier::PaddedMajorMinor,
            (b'P', 3) => Specifier::PaddedMajorMinorStatus,
            (b'P', 4) => Specifier::PaddedMajorZeroMinorStatus,
            (b'p', 1) => Specifier::PaddedMinor(DEFAULT_PADDING),
            (b'S', 1) => Specifier::Status,
            _ => return Token::Invalid(start),
        };
        Token::Specifier(specifier)
    }

    fn quoted(&mut self, quote: u8, start: usize) -> Token<'a> {
        let body = start + 1;
        let end = self.format[body..]
            .find(quote as char)
            .map_or(self.format.len(), |offset| body + offset);
        self.position = (end + 1).min(self.format.len());
        Token::Literal(&self.format[body..end])
    }
}

fn is_specifier_letter(b: u8) -> bool {
    matches!(b, b'F' | b'G' | b'M' | b'd' | b'y' | b'V' | b'v' | b'P' | b'p' | b'S')
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.format.as_bytes();
        let start = self.position;
        let first = *bytes.get(start)?;

        match first {
            b'\'' | b'"' => Some(self.quoted(first, start)),
            b'\\' => {
                let ch = self.format[start + 1..].chars().next();
                let end = start + 1 + ch.map_or(0, char::len_utf8);
                self.position = end;
                Some(Token::Literal(&self.format[start + 1..end]))
            }
            b if is_specifier_letter(b) => Some(self.specifier(b, start)),
            _ => {
                let end = self.format[start..]
                    .find(|c: char| c.is_ascii() && (is_specifier_letter(c as u8) || matches!(c, '\'' | '"' | '\\')))
                    .map_or(bytes.len(), |offset| start + offset);
                self.position = end;
                Some(Token::Literal(&self.format[start..end]))
            }
        }
    }
}

/// Write the `F` or `FF` form.
pub(super) fn write_full<W: Write>(version: &ApiVersion, out: &mut W, force_minor: bool) -> fmt::Result {
    if let Some(group) = version.group_version() {
        write!(out, "{:04}-{:02}-{:02}", group.year(), group.month(), group.day())?;
    }

    if let Some(major) = version.major_version() {
        if version.group_version().is_some() {
            out.write_char('.')?;
        }
        write!(out, "{}", major)?;
        match version.minor_version() {
            Some(minor) => write!(out, ".{}", minor)?,
            None if force_minor => out.write_str(".0")?,
            None => {}
        }
    }

    write_status(version, out)
}

fn write_status<W: Write>(version: &ApiVersion, out: &mut W) -> fmt::Result {
    match version.status() {
        Some(status) => write!(out, "-{}", status),
        None => Ok(()),
    }
}

fn write_numbers<W: Write>(
    version: &ApiVersion,
    out: &mut W,
    padding: usize,
    force_minor: bool,
    status: bool,
) -> fmt::Result {
    let Some(major) = version.major_version() else {
        return Ok(());
    };

    write!(out, "{:0width$}", major, width = padding)?;
    match version.minor_version() {
        Some(minor) => write!(out, ".{:0width$}", minor, width = padding)?,
        None if force_minor => write!(out, ".{:0width$}", 0, width = padding)?,
        None => {}
    }

    if status {
        write_status(version, out)?;
    }
    Ok(())
}

fn write_specifier<W: Write>(version: &ApiVersion, specifier: Specifier, out: &mut W) -> fmt::Result {
    let group = version.group_version();

    match specifier {
        Specifier::Full => write_full(version, out, false),
        Specifier::FullWithMinor => write_full(version, out, true),
        Specifier::Group | Specifier::GroupWithStatus => {
            if let Some(group) = group {
                write!(out, "{:04}-{:02}-{:02}", group.year(), group.month(), group.day())?;
                if specifier == Specifier::GroupWithStatus {
                    write_status(version, out)?;
                }
            }
            Ok(())
        }
        Specifier::Month(count) => match group {
            Some(group) => match count {
                1 => write!(out, "{}", group.month()),
                2 => write!(out, "{:02}", group.month()),
                3 => write!(out, "{}", group.format("%b")),
                _ => write!(out, "{}", group.format("%B")),
            },
            None => Ok(()),
        },
        Specifier::Day(count) => match group {
            Some(group) => match count {
                1 => write!(out, "{}", group.day()),
                2 => write!(out, "{:02}", group.day()),
                3 => write!(out, "{}", group.format("%a")),
                _ => write!(out, "{}", group.format("%A")),
            },
            None => Ok(()),
        },
        Specifier::Year(count) => match group {
            Some(group) => match count {
                1 => write!(out, "{}", group.year() % 100),
                2 => write!(out, "{:02}", group.year() % 100),
                _ => write!(out, "{:0width$}", group.year(), width = count),
            },
            None => Ok(()),
        },
        Specifier::Major => match version.major_version() {
            Some(major) => write!(out, "{}", major),
            None => Ok(()),
        },
        Specifier::Minor => match version.minor_version() {
            Some(minor) => write!(out, "{}", minor),
            None => Ok(()),
        },
        Specifier::MajorMinor => write_numbers(version, out, 0, false, false),
        Specifier::MajorMinorStatus => write_numbers(version, out, 0, false, true),
        Specifier::MajorZeroMinorStatus => write_numbers(version, out, 0, true, true),
        Specifier::PaddedMajor(width) => match version.major_version() {
            Some(major) => write!(out, "{:0width$}", major, width = width),
            None => Ok(()),
        },
        Specifier::PaddedMinor(width) => match version.minor_version() {
            Some(minor) => write!(out, "{:0width$}", minor, width = width),
            None => Ok(()),
        },
        Specifier::PaddedMajorMinor => write_numbers(version, out, DEFAULT_PADDING, false, false),
        Specifier::PaddedMajorMinorStatus => write_numbers(version, out, DEFAULT_PADDING, false, true),
        Specifier::PaddedMajorZeroMinorStatus => {
            write_numbers(version, out, DEFAULT_PADDING, true, true)
        }
        Specifier::Status => match version.status() {
            Some(status) => out.write_str(status),
            None => Ok(()),
        },
    }
}

/// Display adapter returned by [`ApiVersion::format`].
///
/// Rendering is lenient: unknown specifiers produce no output and the rest of
/// the template is still rendered.
#[derive(Debug, Clone, Copy)]
pub struct FormattedApiVersion<'a> {
    version: &'a ApiVersion,
    format: &'a str,
}

impl fmt::Display for FormattedApiVersion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format.is_empty() {
            return write_full(self.version, f, false);
        }

        for token in Tokens::new(self.format) {
            match token {
                Token::Literal(text) => f.write_str(text)?,
                Token::Specifier(specifier) => write_specifier(self.version, specifier, f)?,
                Token::Invalid(_) => {}
            }
        }
        Ok(())
    }
}

/// Byte-slice writer that fails instead of growing.
struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    written: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.written + s.len();
        if end > self.buffer.len() {
            return Err(fmt::Error);
        }
        self.buffer[self.written..end].copy_from_slice(s.as_bytes());
        self.written = end;
        Ok(())
    }
}

impl ApiVersion {
    /// Render this version with a custom format, leniently.
    ///
    /// ```
    /// use verso_core::ApiVersion;
    ///
    /// let version = ApiVersion::parse("1.2-beta").unwrap();
    /// assert_eq!(version.format("'v'VV").to_string(), "v1.2");
    /// assert_eq!(version.format("PPP").to_string(), "01.02-beta");
    /// ```
    pub fn format<'a>(&'a self, format: &'a str) -> FormattedApiVersion<'a> {
        FormattedApiVersion {
            version: self,
            format,
        }
    }

    /// Render this version with a custom format into `out`, strictly.
    ///
    /// Fails on the first unknown specifier; nothing is written past it.
    pub fn write_format<W: Write>(&self, format: &str, out: &mut W) -> Result<(), FormatError> {
        if format.is_empty() {
            return write_full(self, out, false).map_err(|_| FormatError::Write);
        }

        for token in Tokens::new(format) {
            match token {
                Token::Literal(text) => out.write_str(text).map_err(|_| FormatError::Write)?,
                Token::Specifier(specifier) => {
                    write_specifier(self, specifier, out).map_err(|_| FormatError::Write)?
                }
                Token::Invalid(position) => return Err(FormatError::InvalidSpecifier { position }),
            }
        }
        Ok(())
    }

    /// Render this version into a byte buffer without allocating.
    ///
    /// Returns the number of bytes written.
    pub fn try_format(&self, format: &str, destination: &mut [u8]) -> Result<usize, FormatError> {
        let mut writer = SliceWriter {
            buffer: destination,
            written: 0,
        };

        match self.write_format(format, &mut writer) {
            Ok(()) => Ok(writer.written),
            Err(FormatError::Write) => Err(FormatError::BufferTooSmall),
            Err(error) => Err(error),
        }
    }
}

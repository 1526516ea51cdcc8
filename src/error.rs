//! # Error Codes
//!
//! The closed set of error conditions the parsing engine can report.
//! Everything here is `Copy` and allocation-free: parse results are
//! produced millions of times per second, so the error channel must never
//! touch the heap. `ErrorCode` implements [`std::error::Error`], so results
//! still compose with `eyre` at the call sites that want context.

use std::fmt;

/// Error conditions reported by field extraction and record iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error recorded.
    #[default]
    Ok = 0,
    /// Slice is not a whole base-10 integer.
    InvalidInteger,
    /// Slice is not a whole decimal or scientific float.
    InvalidFloat,
    /// Slice is not a recognized boolean token.
    InvalidBool,
    /// Slice is not a calendar-valid `YYYY-MM-DD`.
    InvalidDate,
    /// Slice is not a valid `YYYY-MM-DD HH:MM:SS` (or `T`-separated).
    InvalidDateTime,
    /// Field matched the configured null vocabulary.
    NullValue,
    /// Numeric value does not fit the requested type.
    OutOfRange,
    /// Row produced a different number of fields than the reader expects.
    ColumnCountMismatch,
    /// No further records in the mapped range.
    EndOfFile,
    /// The source file could not be opened or mapped.
    FileOpenError,
}

impl ErrorCode {
    /// Returns true when no error is recorded.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, ErrorCode::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorCode::Ok => "ok",
            ErrorCode::InvalidInteger => "invalid integer",
            ErrorCode::InvalidFloat => "invalid float",
            ErrorCode::InvalidBool => "invalid boolean",
            ErrorCode::InvalidDate => "invalid date",
            ErrorCode::InvalidDateTime => "invalid date-time",
            ErrorCode::NullValue => "null value",
            ErrorCode::OutOfRange => "value out of range",
            ErrorCode::ColumnCountMismatch => "column count mismatch",
            ErrorCode::EndOfFile => "end of file",
            ErrorCode::FileOpenError => "file open error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ErrorCode {}

/// Diagnostic record for the most recent reader-level error.
///
/// `line` and `column` are populated only when the active
/// [`ErrorPolicy`](crate::policy::ErrorPolicy) tracks them; otherwise they
/// stay zero. `line` is 1-based and counts physical lines including the
/// header and skipped empty lines. `column` holds the number of fields the
/// offending row actually produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub line: u32,
    pub column: u8,
}

impl ErrorInfo {
    /// Returns true when no error is recorded.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ok() {
        assert!(ErrorCode::default().is_ok());
        assert!(ErrorInfo::default().is_ok());
    }

    #[test]
    fn display_is_lowercase_prose() {
        assert_eq!(ErrorCode::ColumnCountMismatch.to_string(), "column count mismatch");
        assert_eq!(ErrorCode::OutOfRange.to_string(), "value out of range");
    }

    #[test]
    fn error_code_is_one_byte() {
        assert_eq!(std::mem::size_of::<ErrorCode>(), 1);
    }

    #[test]
    fn composes_with_eyre() {
        fn parse_it() -> eyre::Result<()> {
            Err(ErrorCode::InvalidInteger)?
        }
        let err = parse_it().unwrap_err();
        assert!(err.to_string().contains("invalid integer"));
    }
}

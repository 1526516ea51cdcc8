//! # Compile-Time Parsing Policies
//!
//! This module provides the policy bundles that parameterize
//! [`Reader`](crate::reader::Reader): error tracking and null-value
//! vocabulary. Both are resolved at monomorphization time so that a
//! disabled feature costs nothing — no branches in the hot loop and no
//! bytes in the reader.
//!
//! ## Zero-Size Storage
//!
//! Runtime flags would make every reader pay for diagnostics it never
//! asked for. Instead each [`ErrorPolicy`] names its own storage types:
//!
//! ```text
//! NoErrorCheck:    ErrorSlot = ()          LineSlot = ()     (0 bytes)
//! ErrorCheckBasic: ErrorSlot = ErrorInfo   LineSlot = u32
//! ErrorCheckFull:  ErrorSlot = ErrorInfo   LineSlot = u32
//! ```
//!
//! The `()` implementations compile to nothing; the compiler deletes the
//! recording calls entirely. A unit test below pins the zero-size
//! guarantee.
//!
//! ## Null Vocabulary
//!
//! [`NullPolicy`] carries five independent toggles. The full vocabulary
//! (case-sensitive, matched by length first):
//!
//! | Toggle  | Matches                 |
//! |---------|-------------------------|
//! | `EMPTY` | zero-length field       |
//! | `NA`    | `NA`, `N/A`, `n/a`      |
//! | `NULL`  | `null`, `NULL`          |
//! | `NONE`  | `None`, `none`, `NONE`  |
//! | `DASH`  | `-`                     |

use crate::error::ErrorInfo;

/// Storage slot for the most recent reader error.
///
/// Implemented by `ErrorInfo` (real storage) and `()` (compiled out).
pub trait ErrorSlot: Default + Copy {
    fn record(&mut self, info: ErrorInfo);
    fn get(&self) -> ErrorInfo;
}

impl ErrorSlot for ErrorInfo {
    #[inline]
    fn record(&mut self, info: ErrorInfo) {
        *self = info;
    }

    #[inline]
    fn get(&self) -> ErrorInfo {
        *self
    }
}

impl ErrorSlot for () {
    #[inline]
    fn record(&mut self, _info: ErrorInfo) {}

    #[inline]
    fn get(&self) -> ErrorInfo {
        ErrorInfo::default()
    }
}

/// Storage slot for the physical line counter.
pub trait LineSlot: Default + Copy {
    fn bump(&mut self);
    fn get(&self) -> u32;
}

impl LineSlot for u32 {
    #[inline]
    fn bump(&mut self) {
        *self += 1;
    }

    #[inline]
    fn get(&self) -> u32 {
        *self
    }
}

impl LineSlot for () {
    #[inline]
    fn bump(&mut self) {}

    #[inline]
    fn get(&self) -> u32 {
        0
    }
}

/// Compile-time error-tracking configuration for a reader.
pub trait ErrorPolicy {
    /// Whether malformed rows are detected and skipped at all.
    const ENABLED: bool;
    /// Whether the reader maintains a physical line counter.
    const TRACK_LINE: bool;
    /// Whether the reported [`ErrorInfo`] carries the observed field count.
    const TRACK_COLUMN: bool;

    type ErrorSlot: ErrorSlot;
    type LineSlot: LineSlot;
}

/// No error tracking at all: malformed rows reach the callback as-is and
/// the reader carries zero diagnostic state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoErrorCheck;

/// Malformed rows are skipped; the latest error and its line are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorCheckBasic;

/// Malformed rows are skipped; line and field count are both kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorCheckFull;

impl ErrorPolicy for NoErrorCheck {
    const ENABLED: bool = false;
    const TRACK_LINE: bool = false;
    const TRACK_COLUMN: bool = false;
    type ErrorSlot = ();
    type LineSlot = ();
}

impl ErrorPolicy for ErrorCheckBasic {
    const ENABLED: bool = true;
    const TRACK_LINE: bool = true;
    const TRACK_COLUMN: bool = false;
    type ErrorSlot = ErrorInfo;
    type LineSlot = u32;
}

impl ErrorPolicy for ErrorCheckFull {
    const ENABLED: bool = true;
    const TRACK_LINE: bool = true;
    const TRACK_COLUMN: bool = true;
    type ErrorSlot = ErrorInfo;
    type LineSlot = u32;
}

/// Compile-time null-value vocabulary.
///
/// The provided [`check`](NullPolicy::check) is written so every disabled
/// toggle folds away after monomorphization; with all toggles off it
/// becomes `false` outright.
pub trait NullPolicy {
    const EMPTY_IS_NULL: bool;
    const NA_IS_NULL: bool;
    const NULL_IS_NULL: bool;
    const NONE_IS_NULL: bool;
    const DASH_IS_NULL: bool;

    /// Returns true when `bytes` matches the enabled vocabulary.
    #[inline]
    fn check(bytes: &[u8]) -> bool {
        let len = bytes.len();

        if Self::EMPTY_IS_NULL && len == 0 {
            return true;
        }

        if Self::NULL_IS_NULL && len == 4 && (bytes == b"null" || bytes == b"NULL") {
            return true;
        }

        if Self::NONE_IS_NULL
            && len == 4
            && (bytes == b"None" || bytes == b"none" || bytes == b"NONE")
        {
            return true;
        }

        if Self::NA_IS_NULL {
            if len == 2 && bytes == b"NA" {
                return true;
            }
            if len == 3 && (bytes == b"N/A" || bytes == b"n/a") {
                return true;
            }
        }

        if Self::DASH_IS_NULL && len == 1 && bytes[0] == b'-' {
            return true;
        }

        false
    }
}

macro_rules! null_policy {
    ($(#[$doc:meta])* $name:ident: empty=$empty:literal, na=$na:literal, null=$null:literal, none=$none:literal, dash=$dash:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NullPolicy for $name {
            const EMPTY_IS_NULL: bool = $empty;
            const NA_IS_NULL: bool = $na;
            const NULL_IS_NULL: bool = $null;
            const NONE_IS_NULL: bool = $none;
            const DASH_IS_NULL: bool = $dash;
        }
    };
}

null_policy! {
    /// Only the empty field is null.
    NullStrict: empty=true, na=false, null=false, none=false, dash=false
}

null_policy! {
    /// Empty fields plus the `NA` and `null` families.
    NullStandard: empty=true, na=true, null=true, none=false, dash=false
}

null_policy! {
    /// Every supported null spelling, including `None` and `-`.
    NullLenient: empty=true, na=true, null=true, none=true, dash=true
}

null_policy! {
    /// Null detection disabled; every field reports not-null.
    NoNullCheck: empty=false, na=false, null=false, none=false, dash=false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_error_storage_is_zero_sized() {
        assert_eq!(std::mem::size_of::<<NoErrorCheck as ErrorPolicy>::ErrorSlot>(), 0);
        assert_eq!(std::mem::size_of::<<NoErrorCheck as ErrorPolicy>::LineSlot>(), 0);
        assert!(std::mem::size_of::<<ErrorCheckFull as ErrorPolicy>::ErrorSlot>() > 0);
    }

    #[test]
    fn unit_slots_are_inert() {
        let mut slot = ();
        ErrorSlot::record(
            &mut slot,
            ErrorInfo { code: crate::ErrorCode::InvalidBool, line: 7, column: 2 },
        );
        assert!(ErrorSlot::get(&slot).is_ok());

        let mut line = ();
        LineSlot::bump(&mut line);
        assert_eq!(LineSlot::get(&line), 0);
    }

    #[test]
    fn real_slots_store() {
        let mut slot = ErrorInfo::default();
        let info = ErrorInfo { code: crate::ErrorCode::ColumnCountMismatch, line: 3, column: 2 };
        slot.record(info);
        assert_eq!(slot.get(), info);

        let mut line = 0u32;
        line.bump();
        line.bump();
        assert_eq!(LineSlot::get(&line), 2);
    }

    #[test]
    fn strict_matches_only_empty() {
        assert!(NullStrict::check(b""));
        assert!(!NullStrict::check(b"NA"));
        assert!(!NullStrict::check(b"null"));
        assert!(!NullStrict::check(b"None"));
        assert!(!NullStrict::check(b"-"));
    }

    #[test]
    fn standard_matches_na_and_null_families() {
        assert!(NullStandard::check(b""));
        assert!(NullStandard::check(b"NA"));
        assert!(NullStandard::check(b"N/A"));
        assert!(NullStandard::check(b"n/a"));
        assert!(NullStandard::check(b"null"));
        assert!(NullStandard::check(b"NULL"));
        assert!(!NullStandard::check(b"None"));
        assert!(!NullStandard::check(b"none"));
        assert!(!NullStandard::check(b"-"));
    }

    #[test]
    fn lenient_matches_everything_enumerated() {
        for token in
            [&b""[..], b"NA", b"N/A", b"n/a", b"null", b"NULL", b"None", b"none", b"NONE", b"-"]
        {
            assert!(NullLenient::check(token), "{:?} should be null", token);
        }
        assert!(!NullLenient::check(b"Na"));
        assert!(!NullLenient::check(b"nil"));
        assert!(!NullLenient::check(b"--"));
        assert!(!NullLenient::check(b"nul"));
    }

    #[test]
    fn no_check_matches_nothing() {
        for token in [&b""[..], b"NA", b"null", b"None", b"-"] {
            assert!(!NoNullCheck::check(token));
        }
    }

    #[test]
    fn vocabulary_is_case_sensitive() {
        assert!(!NullLenient::check(b"Null"));
        assert!(!NullLenient::check(b"nA"));
        assert!(!NullLenient::check(b"nOnE"));
    }
}

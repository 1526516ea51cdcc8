//! # Record Iterator
//!
//! `Reader` walks the mapped byte range, slices each logical row into
//! exactly `N` field references, and hands them to a user callback. The
//! callback type is a generic parameter, so the per-row dispatch inlines;
//! there is no virtual call on the hot path.
//!
//! ## Record Walk
//!
//! For every record:
//!
//! 1. Empty lines (`\n`, `\r`, `\r\n`) are skipped; they are not rows.
//! 2. The physical line counter bumps (when the policy tracks lines),
//!    including for skipped empty lines, so reported error lines match
//!    the file as an editor shows it.
//! 3. The line terminator is located with [`scan::find_newline`]; a
//!    trailing `\r` before it is stripped (CRLF input).
//! 4. The row is cut at delimiters with [`scan::find_field_end`]. A
//!    delimiter as the last byte of a row yields one trailing empty
//!    field. Missing columns are handed to the callback as empty slices.
//! 5. With error checking enabled, a row that does not produce exactly
//!    `N` fields is skipped and recorded as the latest error instead of
//!    reaching the callback.
//!
//! The file may or may not end with a newline; the final record is
//! emitted either way.
//!
//! ## Compile-Time Configuration
//!
//! Column count `N` and delimiter `D` are const parameters; the error and
//! null policies are type parameters. A `Reader` built with
//! [`NoErrorCheck`] carries zero bytes of diagnostic state — see
//! [`crate::policy`].
//!
//! ## Header
//!
//! Unless constructed with [`Reader::open_headerless`], the first line is
//! captured at construction and exposed through [`Reader::headers`]. The
//! header cells are stored as offset spans into the mapping, never as
//! copies.

use std::marker::PhantomData;
use std::path::Path;

use eyre::Result;

use crate::error::{ErrorCode, ErrorInfo};
use crate::field::FieldRef;
use crate::policy::{
    ErrorCheckBasic, ErrorCheckFull, ErrorPolicy, ErrorSlot, LineSlot, NoErrorCheck, NoNullCheck,
    NullLenient, NullPolicy, NullStandard,
};
use crate::scan;
use crate::source::MmapSource;

/// Cuts one row (terminator already stripped) into at most `N` fields.
///
/// Fills `fields[..col]` and returns `col`. Slots beyond the return value
/// are left untouched; callers pre-fill them with empty slices. A
/// delimiter as the final byte of the row produces one trailing empty
/// field, so `"1,2,"` is three fields.
#[inline]
pub(crate) fn split_record<'b, const N: usize, const D: u8>(
    row: &'b [u8],
    fields: &mut [&'b [u8]; N],
) -> usize {
    let len = row.len();
    let mut pos = 0;
    let mut col = 0;
    let mut last_end = 0;

    while col < N && pos < len {
        let start = pos;
        pos += scan::find_field_end(&row[pos..], D);
        fields[col] = &row[start..pos];
        last_end = pos;
        col += 1;
        if pos < len && row[pos] == D {
            pos += 1;
        }
    }

    if col > 0 && col < N && last_end < len && row[last_end] == D {
        fields[col] = &row[pos..pos];
        col += 1;
    }

    col
}

/// Compile-time parameterized record iterator over a mapped file.
///
/// `N` is the column count, `D` the delimiter byte, `E` the error policy
/// and `P` the null policy the presets bundle for field inspection.
#[repr(align(64))]
#[derive(Debug)]
pub struct Reader<
    const N: usize,
    const D: u8,
    E: ErrorPolicy = NoErrorCheck,
    P: NullPolicy = NullStandard,
> {
    source: MmapSource,
    cursor: usize,
    headers: [(usize, usize); N],
    last_error: E::ErrorSlot,
    line: E::LineSlot,
    _policies: PhantomData<fn() -> (E, P)>,
}

impl<const N: usize, const D: u8, E: ErrorPolicy, P: NullPolicy> Reader<N, D, E, P> {
    /// Maps `path` and captures the first line as the header. A file that
    /// cannot be opened yields a reader over an invalid source: empty
    /// headers, zero records.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::from_source(MmapSource::open(path), true)
    }

    /// Like [`Reader::open`], but line 1 is data, not a header.
    pub fn open_headerless(path: impl AsRef<Path>) -> Self {
        Self::from_source(MmapSource::open(path), false)
    }

    /// Fallible variant of [`Reader::open`] for callers that want the
    /// open/map failure cause instead of an invalid reader.
    pub fn try_open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_source(MmapSource::try_open(path)?, true))
    }

    fn from_source(source: MmapSource, skip_header: bool) -> Self {
        let mut headers = [(0usize, 0usize); N];
        let mut cursor = 0usize;
        let mut line = E::LineSlot::default();

        if skip_header && source.valid() {
            let data = source.as_bytes();
            line.bump();

            let line_end = scan::find_newline(data);
            let mut effective_end = line_end;
            if effective_end > 0 && data[effective_end - 1] == b'\r' {
                effective_end -= 1;
            }

            let mut pos = 0;
            let mut col = 0;
            while col < N && pos < effective_end {
                let start = pos;
                pos += scan::find_field_end(&data[pos..effective_end], D);
                headers[col] = (start, pos);
                col += 1;
                if pos < effective_end && data[pos] == D {
                    pos += 1;
                }
            }

            cursor = if line_end < data.len() { line_end + 1 } else { data.len() };
            tracing::debug!(columns = col, "header captured");
        }

        Self {
            source,
            cursor,
            headers,
            last_error: E::ErrorSlot::default(),
            line,
            _policies: PhantomData,
        }
    }

    /// The `N` header cells as borrowed slices. Cells beyond what the
    /// header line provided are empty.
    pub fn headers(&self) -> [&[u8]; N] {
        let data = self.source.as_bytes();
        std::array::from_fn(|i| {
            let (start, end) = self.headers[i];
            &data[start..end]
        })
    }

    /// Header cell `idx`, or an empty slice when out of range.
    pub fn column_name(&self, idx: usize) -> &[u8] {
        match self.headers.get(idx) {
            Some(&(start, end)) => &self.source.as_bytes()[start..end],
            None => &[],
        }
    }

    /// Index of the header cell equal to `name`.
    pub fn column_index(&self, name: impl AsRef<[u8]>) -> Option<usize> {
        let name = name.as_ref();
        let data = self.source.as_bytes();
        self.headers.iter().position(|&(start, end)| &data[start..end] == name)
    }

    /// The most recent reader-level error. Always `Ok` when the error
    /// policy is disabled.
    pub fn last_error(&self) -> ErrorInfo {
        self.last_error.get()
    }

    pub fn has_error(&self) -> bool {
        !self.last_error.get().is_ok()
    }

    /// True when the underlying mapping was established.
    pub fn valid(&self) -> bool {
        self.source.valid()
    }

    /// The shared walk behind every iteration surface. `emit` returns
    /// false to stop after the current record.
    fn drive<F>(&mut self, mut emit: F) -> usize
    where
        F: for<'b> FnMut(&[&'b [u8]; N]) -> bool,
    {
        let data = self.source.as_bytes();
        let end = data.len();
        let mut count = 0;

        while self.cursor < end {
            scan::prefetch_ahead(data, self.cursor);
            self.line.bump();

            match data[self.cursor] {
                b'\n' => {
                    self.cursor += 1;
                    continue;
                }
                b'\r' => {
                    self.cursor += 1;
                    if self.cursor < end && data[self.cursor] == b'\n' {
                        self.cursor += 1;
                    }
                    continue;
                }
                _ => {}
            }

            let line_end = self.cursor + scan::find_newline(&data[self.cursor..]);
            let mut effective_end = line_end;
            if effective_end > self.cursor && data[effective_end - 1] == b'\r' {
                effective_end -= 1;
            }

            let row = &data[self.cursor..effective_end];
            let mut fields: [&[u8]; N] = [&[]; N];
            let col = split_record::<N, D>(row, &mut fields);

            self.cursor = if line_end < end { line_end + 1 } else { end };

            if E::ENABLED && col != N {
                self.last_error.record(ErrorInfo {
                    code: ErrorCode::ColumnCountMismatch,
                    line: if E::TRACK_LINE { self.line.get() } else { 0 },
                    column: if E::TRACK_COLUMN { col as u8 } else { 0 },
                });
                continue;
            }

            count += 1;
            if !emit(&fields) {
                break;
            }
        }

        count
    }

    /// Iterates every record, handing the callback the bare field slices.
    /// Returns the number of callback invocations.
    pub fn for_each_raw<F>(&mut self, mut callback: F) -> usize
    where
        F: for<'b> FnMut(&[&'b [u8]; N]),
    {
        self.drive(|fields| {
            callback(fields);
            true
        })
    }

    /// Iterates every record as an array of [`FieldRef`]s. Returns the
    /// number of callback invocations.
    pub fn for_each<F>(&mut self, mut callback: F) -> usize
    where
        F: for<'b> FnMut(&[FieldRef<'b>; N]),
    {
        self.drive(|fields| {
            callback(&fields.map(FieldRef::new));
            true
        })
    }

    /// Like [`Reader::for_each`], but the callback returns `false` to stop
    /// iterating. The count includes the record the callback stopped on.
    pub fn for_each_until<F>(&mut self, mut callback: F) -> usize
    where
        F: for<'b> FnMut(&[FieldRef<'b>; N]) -> bool,
    {
        self.drive(|fields| callback(&fields.map(FieldRef::new)))
    }
}

/// Maximum throughput: no error tracking, no null detection.
pub type TurboReader<const N: usize, const D: u8> = Reader<N, D, NoErrorCheck, NoNullCheck>;

/// Balanced: malformed rows skipped with line tracking, standard nulls.
pub type CheckedReader<const N: usize, const D: u8> = Reader<N, D, ErrorCheckBasic, NullStandard>;

/// Full diagnostics: line and column tracking, lenient nulls.
pub type SafeReader<const N: usize, const D: u8> = Reader<N, D, ErrorCheckFull, NullLenient>;

/// Tab-separated variants.
pub type TsvReader<const N: usize> = TurboReader<N, b'\t'>;
pub type TsvTurboReader<const N: usize> = TurboReader<N, b'\t'>;
pub type TsvCheckedReader<const N: usize> = CheckedReader<N, b'\t'>;
pub type TsvSafeReader<const N: usize> = SafeReader<N, b'\t'>;

#[cfg(test)]
mod tests {
    use super::*;

    fn split<const N: usize>(row: &[u8]) -> (usize, Vec<Vec<u8>>) {
        let mut fields: [&[u8]; N] = [&[]; N];
        let col = split_record::<N, b','>(row, &mut fields);
        (col, fields.iter().map(|f| f.to_vec()).collect())
    }

    #[test]
    fn splits_exact_column_count() {
        let (col, fields) = split::<3>(b"1,2,3");
        assert_eq!(col, 3);
        assert_eq!(fields, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn short_row_reports_fewer_columns() {
        let (col, _) = split::<3>(b"1,2");
        assert_eq!(col, 2);
        let (col, _) = split::<3>(b"only");
        assert_eq!(col, 1);
    }

    #[test]
    fn trailing_delimiter_yields_empty_field() {
        let (col, fields) = split::<3>(b"1,2,");
        assert_eq!(col, 3);
        assert!(fields[2].is_empty());
    }

    #[test]
    fn interior_empty_fields() {
        let (col, fields) = split::<3>(b"1,,3");
        assert_eq!(col, 3);
        assert!(fields[1].is_empty());

        let (col, fields) = split::<3>(b",,");
        assert_eq!(col, 3);
        assert!(fields.iter().all(|f| f.is_empty()));
    }

    #[test]
    fn extra_columns_are_truncated() {
        // The walk stops once N fields are cut; bytes past the Nth
        // delimiter are ignored. Only rows with too few fields are
        // detectable as mismatches.
        let (col, fields) = split::<3>(b"1,2,3,4");
        assert_eq!(col, 3);
        assert_eq!(fields[2], b"3".to_vec());
    }

    #[test]
    fn empty_row_produces_nothing() {
        let (col, _) = split::<3>(b"");
        assert_eq!(col, 0);
    }

    #[test]
    fn carriage_return_terminates_a_field() {
        // An interior CR is a terminator for the field scanner but not a
        // delimiter, so the walk cannot advance past it: the first field
        // ends at the CR and the remaining slots fill with empty fields
        // anchored there. The bytes after the CR are unreachable.
        let (col, fields) = split::<2>(b"a\rb,c");
        assert_eq!(col, 2);
        assert_eq!(fields[0], b"a".to_vec());
        assert!(fields[1].is_empty());
    }

    #[test]
    fn reader_carries_no_diagnostics_when_disabled() {
        // Cursor + header spans + mapping only; both policy slots are ().
        assert!(
            std::mem::size_of::<TurboReader<4, b','>>()
                <= std::mem::size_of::<SafeReader<4, b','>>()
        );
        let reader = TurboReader::<1, b','>::open("/no/such/file.csv");
        assert!(!reader.valid());
        assert!(reader.last_error().is_ok());
    }
}

//! # Parallel Record Iterator
//!
//! `ParallelReader` fans the single-threaded record walk out over `K`
//! worker threads. The post-header byte range is cut into roughly equal
//! chunks whose boundaries are advanced to the byte just past the next
//! `\n`, so every chunk starts at a record boundary and contains whole
//! rows only:
//!
//! ```text
//! +----------------+----------------+----------------+---------------+
//! | chunk 0        | chunk 1        | chunk 2        | chunk 3       |
//! +----------------+----------------+----------------+---------------+
//! ^ post-header    ^ just past \n   ^ just past \n   ^         end ^
//! ```
//!
//! ## Contract
//!
//! Column-count checking is implicitly enabled: a chunk worker silently
//! skips rows that do not produce exactly `N` fields. Callers that need
//! the error details use the single-threaded [`Reader`](crate::Reader).
//!
//! Record order is preserved within a chunk but unspecified across
//! chunks; the return value is the total callback invocation count.
//!
//! ## Thread Safety
//!
//! Workers share the mapping as immutable data, so the callback must be
//! `Fn + Sync` and tolerate concurrent invocation. All workers are joined
//! before `for_each_parallel` returns, on every path — a panic in one
//! worker is re-raised on the calling thread after the others finish, and
//! the mapping is released as usual.

use std::marker::PhantomData;
use std::path::Path;

use eyre::Result;
use smallvec::SmallVec;

use crate::field::FieldRef;
use crate::policy::{NullPolicy, NullStandard};
use crate::reader::split_record;
use crate::scan;
use crate::source::MmapSource;

/// Multi-threaded record iterator over a mapped file.
pub struct ParallelReader<const N: usize, const D: u8, P: NullPolicy = NullStandard> {
    source: MmapSource,
    data_start: usize,
    headers: [(usize, usize); N],
    workers: usize,
    _policy: PhantomData<fn() -> P>,
}

impl<const N: usize, const D: u8, P: NullPolicy> ParallelReader<N, D, P> {
    /// Maps `path`, captures the header line, and prepares to parse with
    /// `workers` threads (clamped to at least one). Open failures yield a
    /// reader over an invalid source, like [`Reader::open`](crate::Reader::open).
    pub fn open(path: impl AsRef<Path>, workers: usize) -> Self {
        Self::from_source(MmapSource::open(path), workers, true)
    }

    /// Like [`ParallelReader::open`], but line 1 is data, not a header.
    pub fn open_headerless(path: impl AsRef<Path>, workers: usize) -> Self {
        Self::from_source(MmapSource::open(path), workers, false)
    }

    /// Fallible variant of [`ParallelReader::open`].
    pub fn try_open(path: impl AsRef<Path>, workers: usize) -> Result<Self> {
        Ok(Self::from_source(MmapSource::try_open(path)?, workers, true))
    }

    fn from_source(source: MmapSource, workers: usize, skip_header: bool) -> Self {
        let mut headers = [(0usize, 0usize); N];
        let mut data_start = 0usize;

        if skip_header && source.valid() {
            let data = source.as_bytes();
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

            data_start = if line_end < data.len() { line_end + 1 } else { data.len() };
        }

        Self { source, data_start, headers, workers: workers.max(1), _policy: PhantomData }
    }

    /// The `N` header cells as borrowed slices.
    pub fn headers(&self) -> [&[u8]; N] {
        let data = self.source.as_bytes();
        std::array::from_fn(|i| {
            let (start, end) = self.headers[i];
            &data[start..end]
        })
    }

    /// True when the underlying mapping was established.
    pub fn valid(&self) -> bool {
        self.source.valid()
    }

    /// Parses the post-header range with one thread per chunk and returns
    /// the total number of callback invocations. Blocks until every
    /// worker has joined.
    pub fn for_each_parallel<F>(&self, callback: F) -> usize
    where
        F: for<'b> Fn(&[FieldRef<'b>; N]) + Sync,
    {
        let data = &self.source.as_bytes()[self.data_start..];
        let size = data.len();
        if size == 0 {
            return 0;
        }

        let chunks = partition(data, self.workers);
        tracing::debug!(chunks = chunks.len(), bytes = size, "partitioned for parallel parse");

        let callback = &callback;
        std::thread::scope(|scope| {
            let handles: SmallVec<[_; 8]> = chunks
                .iter()
                .map(|&(start, end)| {
                    let chunk = &data[start..end];
                    scope.spawn(move || parse_chunk::<N, D, F>(chunk, callback))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .sum()
        })
    }
}

/// Tab-separated variant.
pub type TsvParallelReader<const N: usize> = ParallelReader<N, b'\t', NullStandard>;

/// Cuts `data` into up to `workers` disjoint, covering sub-ranges whose
/// boundaries sit just past a `\n` (except the final end-of-range).
fn partition(data: &[u8], workers: usize) -> SmallVec<[(usize, usize); 8]> {
    let size = data.len();
    let chunk_size = size / workers;

    let mut chunks: SmallVec<[(usize, usize); 8]> = SmallVec::new();
    let mut chunk_start = 0;

    for _ in 0..workers.saturating_sub(1) {
        if chunk_start >= size {
            break;
        }
        let mut chunk_end = chunk_start + chunk_size;
        if chunk_end >= size {
            chunk_end = size;
        } else {
            chunk_end += scan::find_newline(&data[chunk_end..]);
            if chunk_end < size {
                chunk_end += 1;
            }
        }
        chunks.push((chunk_start, chunk_end));
        chunk_start = chunk_end;
    }

    if chunk_start < size {
        chunks.push((chunk_start, size));
    }

    chunks
}

/// The single-threaded record walk over one chunk, with column-count
/// checking implicitly enabled (short rows skipped without diagnostics).
fn parse_chunk<const N: usize, const D: u8, F>(chunk: &[u8], callback: &F) -> usize
where
    F: for<'b> Fn(&[FieldRef<'b>; N]) + Sync,
{
    let end = chunk.len();
    let mut cursor = 0;
    let mut count = 0;

    while cursor < end {
        scan::prefetch_ahead(chunk, cursor);

        match chunk[cursor] {
            b'\n' => {
                cursor += 1;
                continue;
            }
            b'\r' => {
                cursor += 1;
                if cursor < end && chunk[cursor] == b'\n' {
                    cursor += 1;
                }
                continue;
            }
            _ => {}
        }

        let line_end = cursor + scan::find_newline(&chunk[cursor..]);
        let mut effective_end = line_end;
        if effective_end > cursor && chunk[effective_end - 1] == b'\r' {
            effective_end -= 1;
        }

        let row = &chunk[cursor..effective_end];
        let mut fields: [&[u8]; N] = [&[]; N];
        let col = split_record::<N, D>(row, &mut fields);

        cursor = if line_end < end { line_end + 1 } else { end };

        if col == N {
            callback(&fields.map(FieldRef::new));
            count += 1;
        }
    }

    count
}

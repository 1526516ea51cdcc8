//! # Memory-Mapped Byte Source
//!
//! `MmapSource` opens a file read-only and exposes its entire contents as
//! one contiguous `&[u8]`. Every field reference the engine hands out
//! borrows from this region, so the mapping is the single owner of all
//! parsed data: nothing is copied out of the file until the caller asks
//! for an owned value.
//!
//! ## Design Philosophy
//!
//! Reading a multi-gigabyte table through `read()` means one copy from the
//! kernel page cache into user buffers. Mapping the file skips that copy
//! and lets the OS fault pages in as the cursor sweeps forward; with
//! `MADV_SEQUENTIAL` the kernel reads ahead aggressively and drops pages
//! behind the cursor.
//!
//! ## Failure Contract
//!
//! Construction never fails loudly: [`MmapSource::open`] degrades to an
//! *invalid* source (zero length, empty slice) on any error and records
//! the cause at `debug!` level. Readers built over an invalid source
//! report empty headers and iterate zero records. Callers that want the
//! underlying error use [`MmapSource::try_open`].
//!
//! An empty file also maps to an invalid source: there is nothing to map
//! and nothing to parse.
//!
//! ## Lifetime
//!
//! The mapping is released when the source is dropped, on every exit path
//! including panics raised from user callbacks. `MmapSource` is movable
//! but not clonable; borrows of the byte range prevent it from being
//! dropped while any field reference is alive.

use std::fs::File;
use std::path::Path;

use eyre::{Result, WrapErr};
use memmap2::Mmap;

#[derive(Debug, Default)]
pub struct MmapSource {
    mmap: Option<Mmap>,
}

impl MmapSource {
    /// Maps `path` read-only. Any failure (missing file, permission,
    /// empty file, mmap error) yields an invalid source instead of an
    /// error; see the module docs for the contract.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_open(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "mapping failed");
                Self { mmap: None }
            }
        }
    }

    /// Maps `path` read-only, propagating the failure cause. An empty
    /// file is not an error; it produces an invalid (zero-length) source.
    pub fn try_open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open '{}'", path.display()))?;

        let len = file
            .metadata()
            .wrap_err_with(|| format!("failed to stat '{}'", path.display()))?
            .len();

        if len == 0 {
            tracing::debug!(path = %path.display(), "empty file, nothing to map");
            return Ok(Self { mmap: None });
        }

        // SAFETY: Mmap::map is unsafe because another process could mutate
        // the file underneath us. This is safe for our purposes because:
        // 1. The mapping is read-only (PROT_READ); we never write through it
        // 2. Input tables are treated as immutable for the parsing session,
        //    the same assumption every mmap-based reader makes
        // 3. The mmap's lifetime is tied to MmapSource, and all field
        //    references borrow from it, so use-after-unmap cannot compile
        let mmap = unsafe {
            Mmap::map(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        #[cfg(unix)]
        // SAFETY: madvise with MADV_SEQUENTIAL is a hint and cannot cause
        // undefined behavior for a valid region; the pointer and length
        // describe exactly the mapping created above.
        unsafe {
            libc::madvise(
                mmap.as_ptr() as *mut libc::c_void,
                mmap.len(),
                libc::MADV_SEQUENTIAL,
            );
        }

        tracing::debug!(path = %path.display(), bytes = mmap.len(), "mapped");

        Ok(Self { mmap: Some(mmap) })
    }

    /// The mapped bytes; empty when the source is invalid.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Size of the mapping in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when construction produced a usable mapping.
    #[inline]
    pub fn valid(&self) -> bool {
        self.mmap.is_some()
    }
}

//! Fuzz testing for the terminator scanners.
//!
//! Feeds the vectorized paths exactly-sized heap buffers so a read past
//! the slice trips the sanitizer, and cross-checks every result against
//! the scalar reference implementation.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use flashcsv::scan;

#[derive(Debug, Arbitrary)]
struct ScannerInput {
    delim: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: ScannerInput| {
    // Exact-size allocation: no slack past the slice end.
    let buf: Box<[u8]> = input.data.into_boxed_slice();
    let len = buf.len();

    let field_end = scan::find_field_end(&buf, input.delim);
    assert!(field_end <= len);
    assert_eq!(field_end, scan::find_field_end_scalar(&buf, input.delim));
    if field_end < len {
        let b = buf[field_end];
        assert!(b == input.delim || b == b'\n' || b == b'\r');
    }

    let newline = scan::find_newline(&buf);
    assert!(newline <= len);
    assert_eq!(newline, scan::find_newline_scalar(&buf));
    if newline < len {
        assert_eq!(buf[newline], b'\n');
    }
});

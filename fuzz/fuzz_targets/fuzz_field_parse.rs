//! Fuzz testing for field value extraction.
//!
//! Every parse must return cleanly on arbitrary bytes, and successful
//! parses must honor the whole-slice and shape rules.

#![no_main]

use libfuzzer_sys::fuzz_target;

use flashcsv::{FieldRef, NullLenient};

fuzz_target!(|data: &[u8]| {
    let field = FieldRef::new(data);

    if let Ok(value) = field.parse::<i64>() {
        // A successful integer parse must round-trip through the value.
        let rendered = value.to_string();
        assert_eq!(FieldRef::new(rendered.as_bytes()).parse::<i64>(), Ok(value));
    }
    let _ = field.parse::<u64>();
    let _ = field.parse::<i32>();
    let _ = field.parse::<u8>();

    if field.parse::<f64>().is_ok() {
        assert!(!data.is_empty());
    }
    let _ = field.parse::<f32>();

    if field.parse::<bool>().is_ok() {
        assert!((1..=5).contains(&data.len()));
    }

    if let Ok(date) = field.parse_date() {
        assert_eq!(data.len(), 10);
        assert!((1..=12).contains(&date.month));
        assert!((1..=31).contains(&date.day));
    }

    if field.parse_datetime().is_ok() {
        assert_eq!(data.len(), 19);
    }

    // Null checks and infallible extraction never panic.
    let _ = field.is_null::<NullLenient>();
    let _ = field.parse::<String>();
    let _ = field.view();
});

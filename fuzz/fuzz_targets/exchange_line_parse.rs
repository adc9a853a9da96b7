//! Fuzz target for exchange file parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the line-oriented
//! exchange parser, checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlabel::import::parse_lines_lenient;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = parse_lines_lenient(data);
});

//! Fuzz target: `LineAssembler::push`
//!
//! Streams arbitrary bytes through the SPP line splitter and asserts that
//! every emitted line is non-empty, bounded and free of line terminators,
//! and that the pending buffer never grows past its capacity.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaypanel::adapters::bt_serial::{LineAssembler, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let mut asm = LineAssembler::new();

    for &b in data {
        if let Some(line) = asm.push(b) {
            assert!(!line.is_empty(), "empty lines must be dropped");
            assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
            assert!(!line.contains(['\r', '\n']));
        }
        assert!(asm.pending_len() <= MAX_LINE_LEN);
    }

    asm.reset();
    assert_eq!(asm.pending_len(), 0);
});

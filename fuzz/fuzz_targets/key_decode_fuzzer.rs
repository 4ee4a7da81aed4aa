//! Fuzz target for the terminal input decoder
//!
//! Feeds arbitrary byte chunks, as an SSH client could send them, to
//! `input::decode` and to a streaming `KeyDecoder` in two pieces.
//!
//! # Invariants
//!
//! - Never panics
//! - Never yields more keys than input bytes
//! - Plain printable ASCII decodes to exactly one `Char` per byte
//! - Short input decodes the same wherever it is split

#![no_main]

use folio_app::KeyInput;
use folio_tui::input::{self, KeyDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let keys = input::decode(data);
    assert!(keys.len() <= data.len());

    if data.iter().all(|b| (0x20..0x7f).contains(b)) {
        let expected: Vec<_> = data.iter().map(|&b| KeyInput::Char(char::from(b))).collect();
        assert_eq!(keys, expected);
    }

    if let Some((&split, rest)) = data.split_first() {
        let rest = &rest[..rest.len().min(16)];
        let split = usize::from(split) % (rest.len() + 1);

        let mut whole = KeyDecoder::new();
        let expected = whole.feed(rest);

        let mut chunked = KeyDecoder::new();
        let mut keys = chunked.feed(&rest[..split]);
        keys.extend(chunked.feed(&rest[split..]));
        assert_eq!(keys, expected);
    }
});

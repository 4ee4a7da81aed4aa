//! Raw terminal byte decoding.
//!
//! An SSH session delivers whatever bytes the visitor's terminal emits in
//! raw mode, split into data messages wherever the client's writes happened
//! to fall. A pasted string or a burst of keys arrives as a single chunk and
//! yields several keys, while one escape sequence can straddle two chunks.
//!
//! [`KeyDecoder`] keeps an unfinished sequence until the rest of it arrives.
//! [`decode`] is the one-shot form for input that is known to be complete.

use std::mem;

use folio_app::KeyInput;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Longest unfinished sequence held back for the next chunk.
const MAX_PENDING: usize = 16;

/// Streaming decoder for one session's input.
///
/// A lone ESC at the end of a chunk is held too: it may be the start of an
/// arrow key, so it only becomes [`KeyInput::Esc`] once the next chunk shows
/// that nothing follows it.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    /// Create a decoder with nothing held back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk of input.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyInput> {
        let mut input = mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let (keys, consumed) = decode_prefix(&input);
        let tail = input.get(consumed..).unwrap_or_default();
        if tail.len() <= MAX_PENDING {
            self.pending = tail.to_vec();
        }
        keys
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Decode a complete chunk of terminal input into keys.
///
/// Unknown escape sequences, stray control bytes and invalid UTF-8 are
/// dropped. A trailing ESC is the Esc key. Never panics.
pub fn decode(bytes: &[u8]) -> Vec<KeyInput> {
    let (mut keys, consumed) = decode_prefix(bytes);
    if bytes.get(consumed..) == Some(&[ESC][..]) {
        keys.push(KeyInput::Esc);
    }
    keys
}

enum Step {
    /// Bytes consumed, with the key they encode if any.
    Key(Option<KeyInput>, usize),
    /// More bytes are needed to tell what this is.
    Incomplete,
}

/// Decode every complete key at the start of `bytes`, returning the keys
/// and the number of bytes they used.
fn decode_prefix(bytes: &[u8]) -> (Vec<KeyInput>, usize) {
    let mut keys = Vec::new();
    let mut offset = 0;

    while let Some(rest) = bytes.get(offset..).filter(|rest| !rest.is_empty()) {
        match step(rest) {
            Step::Key(key, consumed) => {
                keys.extend(key);
                offset += consumed.max(1);
            },
            Step::Incomplete => break,
        }
    }

    (keys, offset)
}

fn step(bytes: &[u8]) -> Step {
    let Some(&first) = bytes.first() else {
        return Step::Incomplete;
    };

    match first {
        ESC => decode_escape(bytes),
        b'\t' => Step::Key(Some(KeyInput::Tab), 1),
        b'\r' | b'\n' => Step::Key(Some(KeyInput::Enter), 1),
        DEL | 0x08 => Step::Key(Some(KeyInput::Backspace), 1),
        0x01..=0x1a => Step::Key(Some(KeyInput::Ctrl(char::from(b'a' + first - 1))), 1),
        0x00..=0x1f => Step::Key(None, 1),
        _ => decode_char(bytes),
    }
}

/// Decode an escape sequence starting at `bytes[0] == ESC`.
fn decode_escape(bytes: &[u8]) -> Step {
    match bytes.get(1) {
        None => Step::Incomplete,
        // CSI: parameters, then a final byte in 0x40..=0x7e.
        Some(b'[') => match bytes.iter().skip(2).position(|b| (0x40..=0x7e).contains(b)) {
            Some(end) => Step::Key(csi_key(&bytes[2..=end + 2]), end + 3),
            None => Step::Incomplete,
        },
        // SS3: exactly one final byte.
        Some(b'O') => match bytes.get(2) {
            Some(&code) => Step::Key(ss3_key(code), 3),
            None => Step::Incomplete,
        },
        Some(&key @ 0x20..=0x7e) => Step::Key(Some(KeyInput::Alt(char::from(key))), 2),
        // Escape followed by another control byte: the Esc key on its own.
        Some(_) => Step::Key(Some(KeyInput::Esc), 1),
    }
}

fn csi_key(sequence: &[u8]) -> Option<KeyInput> {
    match sequence {
        b"A" => Some(KeyInput::Up),
        b"B" => Some(KeyInput::Down),
        b"C" => Some(KeyInput::Right),
        b"D" => Some(KeyInput::Left),
        b"H" | b"1~" | b"7~" => Some(KeyInput::Home),
        b"F" | b"4~" | b"8~" => Some(KeyInput::End),
        b"3~" => Some(KeyInput::Delete),
        _ => None,
    }
}

fn ss3_key(code: u8) -> Option<KeyInput> {
    match code {
        b'A' => Some(KeyInput::Up),
        b'B' => Some(KeyInput::Down),
        b'C' => Some(KeyInput::Right),
        b'D' => Some(KeyInput::Left),
        b'H' => Some(KeyInput::Home),
        b'F' => Some(KeyInput::End),
        _ => None,
    }
}

/// Decode one UTF-8 encoded character.
fn decode_char(bytes: &[u8]) -> Step {
    let len = match bytes.first() {
        Some(0xc0..=0xdf) => 2,
        Some(0xe0..=0xef) => 3,
        Some(0xf0..=0xf7) => 4,
        _ => 1,
    };

    let Some(encoded) = bytes.get(..len) else {
        return Step::Incomplete;
    };

    match std::str::from_utf8(encoded).ok().and_then(|s| s.chars().next()) {
        Some(c) => Step::Key(Some(KeyInput::Char(c)), len),
        None => Step::Key(None, 1),
    }
}

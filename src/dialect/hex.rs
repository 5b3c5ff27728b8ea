// Copyright (C) 2025 The project contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Hex dialect translation (`lib/search/hex.c`).
//!
//! Tokens are whitespace-separated; each is either a bare hexadecimal byte
//! value or a double-quoted byte string with C-style backslash escapes.
//! Every byte produced is emitted into the canonical regex as `\xHH` so the
//! rest of the pipeline never special-cases hex.

use crate::error::SearchError;

/// Translate a hex pattern into canonical regex source.
///
/// Errors carry the byte offset into `pattern` of the offending token, per
/// the original's convention of reporting positions against the raw
/// user-typed string rather than a decoded/recoded view of it.
pub fn translate_to_regex(pattern: &[u8]) -> Result<String, SearchError> {
    let mut out = String::new();
    let mut i = 0;

    while i < pattern.len() {
        if pattern[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if pattern[i] == b'"' {
            let start = i;
            i += 1;
            let mut bytes = Vec::new();
            loop {
                if i >= pattern.len() {
                    return Err(SearchError::invalid_input(
                        "unmatched quote in hex pattern",
                        start,
                    ));
                }
                match pattern[i] {
                    b'"' => {
                        i += 1;
                        break;
                    }
                    b'\\' if i + 1 < pattern.len() => {
                        let (byte, consumed) = decode_c_escape(&pattern[i..]);
                        bytes.push(byte);
                        i += consumed;
                    }
                    other => {
                        bytes.push(other);
                        i += 1;
                    }
                }
            }
            for b in bytes {
                push_hex_escape(&mut out, b);
            }
            continue;
        }

        // bare hex token
        let start = i;
        while i < pattern.len() && !pattern[i].is_ascii_whitespace() && pattern[i] != b'"' {
            i += 1;
        }
        let token = &pattern[start..i];
        if token.iter().any(|b| !b.is_ascii_hexdigit()) {
            return Err(SearchError::invalid_input(
                format!(
                    "invalid character in hex token '{}'",
                    String::from_utf8_lossy(token)
                ),
                start,
            ));
        }
        let text = std::str::from_utf8(token).unwrap();
        let value = u32::from_str_radix(text, 16)
            .map_err(|_| SearchError::invalid_input("invalid hex token", start))?;
        if value > 0xFF {
            return Err(SearchError::invalid_input(
                format!("hex value '{}' out of range [0,255]", text),
                start,
            ));
        }
        push_hex_escape(&mut out, value as u8);
    }

    Ok(out)
}

fn push_hex_escape(out: &mut String, byte: u8) {
    out.push_str(&format!("\\x{:02x}", byte));
}

/// Decode one C-style escape sequence starting at `bytes[0] == '\\'`.
/// Returns the decoded byte and the number of input bytes consumed.
fn decode_c_escape(bytes: &[u8]) -> (u8, usize) {
    debug_assert_eq!(bytes[0], b'\\');
    if bytes.len() < 2 {
        return (b'\\', 1);
    }
    let (byte, extra) = match bytes[1] {
        b'n' => (b'\n', 0),
        b't' => (b'\t', 0),
        b'r' => (b'\r', 0),
        b'0' => (0u8, 0),
        b'\\' => (b'\\', 0),
        b'"' => (b'"', 0),
        other => (other, 0),
    };
    (byte, 2 + extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_hex_tokens() {
        let out = translate_to_regex(b"48 65 6C 6C 6F").unwrap();
        assert_eq!(out, r"\x48\x65\x6c\x6c\x6f");
    }

    #[test]
    fn quoted_string_mixed_with_hex() {
        let out = translate_to_regex(br#"48 65 "ll" 6F"#).unwrap();
        assert_eq!(out, r"\x48\x65\x6c\x6c\x6f");
    }

    #[test]
    fn out_of_range_value_errors_with_position() {
        let err = translate_to_regex(b"FF 100").unwrap_err();
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn invalid_character_errors() {
        let err = translate_to_regex(b"ZZ").unwrap_err();
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn unmatched_quote_errors() {
        let err = translate_to_regex(br#"48 "abc"#).unwrap_err();
        assert_eq!(err.position(), Some(3));
    }
}

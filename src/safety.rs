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

//! UTF-8 Safety Layer (spec §4.E).
//!
//! Regex engines that run in Unicode mode panic or refuse to match across
//! invalid UTF-8. Editor buffers routinely contain it anyway (a user
//! mid-edit, a binary file opened by mistake), so before a UTF-8-mode
//! condition ever sees a window of bytes, this scrubs the invalid
//! subsequences to `0x00` in place — preserving every valid byte and the
//! buffer's length and offsets, so match positions reported back to the
//! caller still index into the original bytes.

/// Replace each byte that is part of an invalid UTF-8 subsequence with
/// `0x00`, one byte at a time. Valid sequences, including non-ASCII
/// multi-byte ones, are left untouched.
pub fn scrub(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    let mut i = 0;
    while i < out.len() {
        match std::str::from_utf8(&out[i..]) {
            Ok(_) => break,
            Err(e) => {
                let good = e.valid_up_to();
                i += good;
                let bad_len = e.error_len().unwrap_or(out.len() - i);
                for b in &mut out[i..i + bad_len] {
                    *b = 0;
                }
                i += bad_len.max(1);
            }
        }
    }
    out
}

/// Whether `bytes` is already valid UTF-8 and can skip scrubbing entirely.
pub fn is_clean(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_untouched() {
        let data = "hello wörld".as_bytes();
        assert!(is_clean(data));
        assert_eq!(scrub(data), data);
    }

    #[test]
    fn invalid_byte_is_zeroed_preserving_length() {
        let mut data = "ab".as_bytes().to_vec();
        data.push(0xFF);
        data.extend_from_slice("cd".as_bytes());
        let scrubbed = scrub(&data);
        assert_eq!(scrubbed.len(), data.len());
        assert_eq!(scrubbed, b"ab\x00cd");
    }

    #[test]
    fn truncated_multibyte_sequence_is_zeroed() {
        let mut data = b"x".to_vec();
        data.push(0xE2); // start of a 3-byte sequence, truncated
        let scrubbed = scrub(&data);
        assert_eq!(scrubbed.len(), 2);
        assert_eq!(scrubbed[0], b'x');
        assert_eq!(scrubbed[1], 0);
    }
}

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

//! Charset Case Tables (spec §6.2).
//!
//! The real file manager loads its codepage tables from disk (explicitly a
//! Non-goal here); this module supplies the same pure-function contract
//! backed by `encoding_rs`, which already ships the label/table pairs for
//! every charset the rest of the crate needs to reason about.

use encoding_rs::Encoding;

/// A charset identifies both a byte encoding and whether the execution
/// kernel should run in UTF-8 (Unicode-aware) or raw-byte mode.
#[derive(Debug, Clone)]
pub enum Charset {
    Utf8,
    /// Any non-UTF-8 8-bit or multi-byte charset known to `encoding_rs`,
    /// addressed by its standard label (e.g. "ISO-8859-1", "windows-1251").
    Named(&'static Encoding),
}

impl Charset {
    /// Resolve a caller-supplied charset name. Unknown names fall back to
    /// `ASCII` (a strict subset of every `encoding_rs` table), matching the
    /// original's behavior of never refusing to construct a handle over a
    /// charset name it doesn't recognize.
    pub fn by_name(name: &str) -> Charset {
        if name.eq_ignore_ascii_case("utf-8") || name.eq_ignore_ascii_case("utf8") {
            return Charset::Utf8;
        }
        match Encoding::for_label(name.as_bytes()) {
            Some(enc) if enc == encoding_rs::UTF_8 => Charset::Utf8,
            Some(enc) => Charset::Named(enc),
            None => Charset::Named(encoding_rs::WINDOWS_1252),
        }
    }

    pub fn ascii() -> Charset {
        Charset::Named(encoding_rs::WINDOWS_1252)
    }

    pub fn is_utf8(&self) -> bool {
        matches!(self, Charset::Utf8)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Named(enc) => enc.name(),
        }
    }

    /// Decode one code point starting at `bytes[0]`, returning the code
    /// point and the number of input bytes it consumed. Returns `None` for
    /// an empty slice or bytes that don't begin a valid sequence.
    pub fn decode_one(&self, bytes: &[u8]) -> Option<(char, usize)> {
        if bytes.is_empty() {
            return None;
        }
        match self {
            Charset::Utf8 => {
                let s = std::str::from_utf8(bytes).ok()?;
                let c = s.chars().next()?;
                Some((c, c.len_utf8()))
            }
            Charset::Named(enc) => {
                // Single-byte and DBCS encodings in encoding_rs decode greedily;
                // decode just the first byte (or two, for DBCS) by feeding a
                // small prefix and reading back exactly one scalar value.
                let mut decoder = enc.new_decoder_without_bom_handling();
                let mut out = [0u8; 4];
                let mut consumed = 0usize;
                for take in 1..=bytes.len().min(4) {
                    let (result, read, written, _) =
                        decoder.decode_to_utf8(&bytes[..take], &mut out, true);
                    if written > 0 {
                        if let Ok(s) = std::str::from_utf8(&out[..written]) {
                            if let Some(c) = s.chars().next() {
                                consumed = read;
                                return Some((c, consumed.max(1)));
                            }
                        }
                    }
                    if matches!(result, encoding_rs::CoderResult::InputEmpty) && written == 0 {
                        continue;
                    }
                }
                let _ = consumed;
                None
            }
        }
    }

    pub fn to_upper(&self, c: char) -> char {
        c.to_uppercase().next().unwrap_or(c)
    }

    pub fn to_lower(&self, c: char) -> char {
        c.to_lowercase().next().unwrap_or(c)
    }

    pub fn is_alphanumeric(c: char) -> bool {
        c.is_alphanumeric()
    }

    pub fn is_digit(c: char) -> bool {
        c.is_ascii_digit() || c.is_numeric()
    }

    /// Encode a code point back into this charset's bytes.
    pub fn encode_char(&self, c: char) -> Vec<u8> {
        match self {
            Charset::Utf8 => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf).as_bytes().to_vec()
            }
            Charset::Named(enc) => {
                let mut encoder = enc.new_encoder();
                let mut tmp = [0u8; 4];
                let src = c.encode_utf8(&mut tmp);
                let mut out = vec![0u8; 8];
                let (_, _, written, _) = encoder.encode_from_utf8(src, &mut out, true);
                out.truncate(written);
                out
            }
        }
    }

    /// Recode a byte string from this charset into `to`, for `all_charsets`
    /// condition compilation (original's `mc_search__recode_str`).
    pub fn recode(&self, bytes: &[u8], to: &Charset) -> Vec<u8> {
        let text = match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Named(enc) => {
                let (cow, _, _) = enc.decode(bytes);
                cow.into_owned()
            }
        };
        match to {
            Charset::Utf8 => text.into_bytes(),
            Charset::Named(enc) => {
                let (cow, _, _) = enc.encode(&text);
                cow.into_owned()
            }
        }
    }
}

/// The small set of charsets `all_charsets` compiles a condition per,
/// standing in for the real file manager's configured codepage list.
pub fn known_charsets() -> Vec<Charset> {
    vec![
        Charset::Utf8,
        Charset::Named(encoding_rs::WINDOWS_1252),
        Charset::Named(encoding_rs::ISO_8859_2),
        Charset::Named(encoding_rs::KOI8_U),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decode_one_multibyte() {
        let cs = Charset::Utf8;
        let (c, len) = cs.decode_one("ß".as_bytes()).unwrap();
        assert_eq!(c, 'ß');
        assert_eq!(len, 2);
    }

    #[test]
    fn ascii_upper_lower_roundtrip() {
        let cs = Charset::ascii();
        assert_eq!(cs.to_upper('a'), 'A');
        assert_eq!(cs.to_lower('A'), 'a');
    }

    #[test]
    fn recode_utf8_to_latin1() {
        let utf8 = Charset::Utf8;
        let latin1 = Charset::Named(encoding_rs::WINDOWS_1252);
        let recoded = utf8.recode("ß".as_bytes(), &latin1);
        assert_eq!(recoded, vec![0xDF]);
    }

    #[test]
    fn by_name_recognizes_utf8_aliases() {
        assert!(Charset::by_name("utf8").is_utf8());
        assert!(Charset::by_name("UTF-8").is_utf8());
        assert!(!Charset::by_name("ISO-8859-1").is_utf8());
    }
}

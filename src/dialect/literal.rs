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

//! Literal dialect translation (`lib/search/normal.c`).
//!
//! Every byte that means something in some other dialect is backslash-escaped
//! so the canonical regex sees it as a literal. The escape set is the union
//! of what Glob, Hex's quoting and the bare regex metasequences ever assign
//! meaning to.

const ESCAPE_SET: &[u8] = b"*?,{}[]\\+.$()^-|";

/// Translate a literal pattern into canonical regex source. Never fails.
///
/// `utf8` must be true exactly when `pattern` is valid UTF-8 text (the
/// handle's declared charset is `Charset::Utf8`). A multi-byte UTF-8
/// sequence is pushed as its own code point so the regex engine's Unicode
/// mode matches it against the same bytes it came from; escaping it
/// byte-by-byte as `\xHH` would instead ask the engine to match each byte
/// as an *independent* Latin-1 code point, re-encoding it into a different,
/// longer UTF-8 byte sequence. Non-UTF-8 charsets have no such structure to
/// preserve, so each non-ASCII byte goes through `\xHH` individually, the
/// same representation the Hex dialect emits for every byte.
pub fn translate_to_regex(pattern: &[u8], utf8: bool) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    if utf8 {
        let text = String::from_utf8_lossy(pattern);
        for c in text.chars() {
            if c.is_ascii() && ESCAPE_SET.contains(&(c as u8)) {
                out.push('\\');
            }
            out.push(c);
        }
        return out;
    }
    for &b in pattern {
        if b.is_ascii() {
            if ESCAPE_SET.contains(&b) {
                out.push('\\');
            }
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
    out
}

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

//! Canonical regex post-translation and compilation (spec §4.A,
//! "Post-translation").
//!
//! Every dialect bottoms out here: wrap with word-boundary or line-anchor
//! assertions as the handle's flags demand, then hand the result to the
//! `regex` crate, the crate-wide stand-in for the original's GRegex/PCRE
//! engine.

use regex::bytes::{Regex, RegexBuilder};

use crate::dialect::{Dialect, Flags};
use crate::error::SearchError;

// The `regex` crate's finite-automaton engine has no lookaround, so the
// literal `(?<!...)`/`(?!...)` assertions the original describes aren't
// expressible here; `\b` is the crate-supported equivalent zero-width
// word/non-word transition assertion. Its definition (Unicode vs. ASCII
// word chars) follows the builder's `unicode()` setting, which `compile`
// sets from the same `unicode_mode` passed here.
const WORD_BOUNDARY: &str = r"\b";

/// Translate `pattern` under `dialect` into canonical regex source.
/// `Dialect::Hex` is handled by its caller separately since it also forces
/// the condition's charset to ASCII — see `condition::compile`.
///
/// `utf8` must be true exactly when `pattern`'s target charset is UTF-8;
/// Literal and Glob use it to decide whether a non-ASCII byte run is a
/// multi-byte code point to preserve whole or a raw byte to `\xHH`-escape
/// individually (see `dialect::literal`/`dialect::glob`).
pub fn translate(pattern: &[u8], dialect: Dialect, utf8: bool) -> Result<String, SearchError> {
    match dialect {
        Dialect::Literal => Ok(crate::dialect::literal::translate_to_regex(pattern, utf8)),
        Dialect::Glob => crate::dialect::glob::translate_to_regex(pattern, utf8),
        Dialect::Hex => crate::dialect::hex::translate_to_regex(pattern),
        Dialect::Regex => Ok(String::from_utf8_lossy(pattern).into_owned()),
    }
}

/// Apply whole-word and entire-line wrapping (spec §4.A "Post-translation").
pub fn wrap(mut source: String, flags: &Flags, _unicode_mode: bool) -> String {
    if flags.entire_line {
        source = format!("^{}$", source);
    } else if flags.whole_words {
        source = format!("{}{}{}", WORD_BOUNDARY, source, WORD_BOUNDARY);
    }
    source
}

/// Compile canonical regex source into the execution engine's regex object.
///
/// `unicode_mode` selects UTF-8-aware matching (the charset is UTF-8);
/// `case_insensitive` is only honored here when `unicode_mode` is true —
/// non-UTF-8 case-insensitivity is the Case-Fold Expander's job
/// (`casefold::expand_case_insensitive`), applied by the caller before this
/// is ever reached for that path.
pub fn compile(
    source: &str,
    unicode_mode: bool,
    case_insensitive: bool,
) -> Result<Regex, SearchError> {
    RegexBuilder::new(source)
        .dot_matches_new_line(true)
        .unicode(unicode_mode)
        .case_insensitive(unicode_mode && case_insensitive)
        .build()
        .map_err(|e| SearchError::compile(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entire_line_anchors() {
        let wrapped = wrap(
            "abc".to_string(),
            &Flags { entire_line: true, ..Default::default() },
            true,
        );
        assert_eq!(wrapped, "^abc$");
    }

    #[test]
    fn whole_words_wraps_with_boundaries() {
        let wrapped = wrap(
            "abc".to_string(),
            &Flags { whole_words: true, ..Default::default() },
            true,
        );
        assert!(wrapped.starts_with(WORD_BOUNDARY));
        assert!(wrapped.ends_with(WORD_BOUNDARY));
    }

    #[test]
    fn compile_rejects_malformed_regex() {
        assert!(compile("(unclosed", true, false).is_err());
    }

    #[test]
    fn compile_accepts_valid_regex() {
        assert!(compile(r"a\.b", true, false).is_ok());
    }
}

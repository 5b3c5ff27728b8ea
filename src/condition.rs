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

//! Compiled Condition (spec §3) and the orchestration that builds a
//! handle's condition list from `(pattern, dialect, charset, flags)`.

use regex::bytes::Regex;

use crate::casefold;
use crate::charset::{self, Charset};
use crate::dialect::{canonical, Dialect, Flags};
use crate::error::SearchError;

/// One compiled pattern variant inside a handle. Exactly one of
/// `regex_handle` or `{upper_bytes, lower_bytes}` is populated; which path
/// is chosen is decided once, at compile time, in `compile`.
pub struct CompiledCondition {
    pub source_bytes: Vec<u8>,
    pub upper_bytes: Option<Vec<u8>>,
    pub lower_bytes: Option<Vec<u8>>,
    pub regex_handle: Option<Regex>,
    pub charset: Charset,
}

impl CompiledCondition {
    /// Whether this condition uses the `memchr` literal fast path rather
    /// than the regex engine.
    pub fn is_literal_fast_path(&self) -> bool {
        self.regex_handle.is_none()
    }
}

/// Build the condition list for a handle. Mirrors `mc_search__run_init`'s
/// dispatch: translate the pattern for `dialect`, optionally expand for
/// case-folding, optionally loop over every known charset, and compile.
///
/// On `all_charsets`, per-charset compile failures are swallowed as long as
/// at least one condition compiles; if none do, the first encountered error
/// is returned.
pub fn compile(
    pattern: &[u8],
    dialect: Dialect,
    charset: &Charset,
    flags: &Flags,
) -> Result<Vec<CompiledCondition>, SearchError> {
    // Hex forces ASCII regardless of the caller's charset (spec §9 Open
    // Question, preserved as-is).
    if dialect == Dialect::Hex {
        let source = canonical::translate(pattern, dialect, false)?;
        let cond = compile_one(&source, pattern, &Charset::ascii(), flags)?;
        return Ok(vec![cond]);
    }

    if flags.all_charsets {
        let mut compiled = Vec::new();
        let mut first_error = None;
        for cs in charset::known_charsets() {
            let recoded = charset.recode(pattern, &cs);
            match canonical::translate(&recoded, dialect, cs.is_utf8())
                .and_then(|source| compile_one(&source, &recoded, &cs, flags))
            {
                Ok(cond) => compiled.push(cond),
                Err(e) => {
                    log::debug!("all_charsets: condition for {} failed: {}", cs.label(), e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if compiled.is_empty() {
            return Err(first_error.unwrap_or_else(|| SearchError::compile("no charset compiled")));
        }
        return Ok(compiled);
    }

    let source = canonical::translate(pattern, dialect, charset.is_utf8())?;
    Ok(vec![compile_one(&source, pattern, charset, flags)?])
}

fn compile_one(
    canonical_source: &str,
    original_pattern: &[u8],
    charset: &Charset,
    flags: &Flags,
) -> Result<CompiledCondition, SearchError> {
    let unicode_mode = charset.is_utf8();

    // Literal dialect's memchr fast path only applies when nothing else
    // needs the regex engine's lookaround-free `\b`/anchors/recoding: no
    // word/line wrapping, single charset, case-sensitive-or-ASCII-foldable.
    if is_plain_literal_source(canonical_source, original_pattern)
        && !flags.whole_words
        && !flags.entire_line
    {
        let lower = to_case_bytes(original_pattern, charset, false);
        let upper = to_case_bytes(original_pattern, charset, true);
        // The fast path's byte-window scan assumes upper/lower folding
        // never changes the pattern's byte length (true for ASCII and for
        // almost every single-byte charset). A charset whose casing does
        // change length (e.g. German sharp s -> "SS") falls back to the
        // regex path, where the Case-Fold Expander folds per character
        // instead of per fixed-width window.
        let length_stable = flags.case_sensitive
            || (lower.len() == original_pattern.len() && upper.len() == original_pattern.len());
        if length_stable {
            return Ok(CompiledCondition {
                source_bytes: original_pattern.to_vec(),
                upper_bytes: Some(upper),
                lower_bytes: Some(lower),
                regex_handle: None,
                charset: charset.clone(),
            });
        }
    }

    let mut source = canonical_source.to_string();
    if !flags.case_sensitive && !unicode_mode {
        source = casefold::expand_case_insensitive(&source, charset);
    }
    source = canonical::wrap(source, flags, unicode_mode);

    let regex = canonical::compile(&source, unicode_mode, !flags.case_sensitive)?;

    Ok(CompiledCondition {
        source_bytes: source.into_bytes(),
        upper_bytes: None,
        lower_bytes: None,
        regex_handle: Some(regex),
        charset: charset.clone(),
    })
}

/// True when the canonical translation of `original_pattern` contains no
/// regex metacharacters — i.e. the dialect translation was a no-op escape
/// pass over a plain run of literal bytes (always true for the Literal
/// dialect; occasionally true for Glob/Regex patterns with nothing special
/// in them, which also benefit from the fast path).
fn is_plain_literal_source(canonical_source: &str, original_pattern: &[u8]) -> bool {
    canonical_source.len() >= original_pattern.len()
        && !canonical_source
            .bytes()
            .any(|b| matches!(b, b'(' | b')' | b'[' | b']' | b'|' | b'\\' | b'.' | b'*' | b'+' | b'?' | b'^' | b'$'))
}

fn to_case_bytes(pattern: &[u8], charset: &Charset, upper: bool) -> Vec<u8> {
    let text = match charset {
        Charset::Utf8 => String::from_utf8_lossy(pattern).into_owned(),
        Charset::Named(enc) => {
            let (cow, _, _) = enc.decode(pattern);
            cow.into_owned()
        }
    };
    let folded: String = text
        .chars()
        .map(|c| if upper { charset.to_upper(c) } else { charset.to_lower(c) })
        .collect();
    match charset {
        Charset::Utf8 => folded.into_bytes(),
        Charset::Named(enc) => {
            let (cow, _, _) = enc.encode(&folded);
            cow.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_plain_pattern_uses_fast_path() {
        let conds = compile(b"hello", Dialect::Literal, &Charset::Utf8, &Flags::default()).unwrap();
        assert_eq!(conds.len(), 1);
        assert!(conds[0].is_literal_fast_path());
    }

    #[test]
    fn literal_with_whole_words_uses_regex_path() {
        let flags = Flags { whole_words: true, ..Default::default() };
        let conds = compile(b"hello", Dialect::Literal, &Charset::Utf8, &flags).unwrap();
        assert!(!conds[0].is_literal_fast_path());
    }

    #[test]
    fn hex_forces_ascii_charset() {
        let conds = compile(b"48 65", Dialect::Hex, &Charset::Utf8, &Flags::default()).unwrap();
        assert_eq!(conds.len(), 1);
        assert!(!conds[0].charset.is_utf8());
    }

    #[test]
    fn regex_dialect_passes_through() {
        let conds = compile(b"h.llo", Dialect::Regex, &Charset::Utf8, &Flags::default()).unwrap();
        assert!(!conds[0].is_literal_fast_path());
    }
}

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

//! Case-Fold Expander (spec §4.B).
//!
//! The execution kernel's regex engine has its own `(?i)` flag, which is
//! enough for ASCII and for charsets whose upper/lower mapping agrees with
//! Unicode's. It is not enough once a caller picks a charset whose case
//! folding a generic regex engine can't be taught about, so — mirroring
//! the original's `mc_search__cond_struct_new_regex_ci_str` — this walks
//! the canonical pattern source and rewrites each literal letter outside
//! an escape or character class into an explicit `[aA]` alternation built
//! from the charset's own case tables.

use crate::charset::Charset;

/// Expand every case-foldable literal character in `pattern` into a
/// two-way character class using `charset`'s case mapping. Metacharacters,
/// escape sequences and existing `[...]` classes pass through unchanged.
pub fn expand_case_insensitive(pattern: &str, charset: &Charset) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    let mut in_class = false;

    while i < chars.len() {
        let c = chars[i];

        if !in_class && c == '\\' {
            // Escape sequence: copy the backslash and whatever it escapes
            // verbatim — \d, \w, \x41, \n, etc. must not be folded. \x is
            // special: its hex digits (or a `{...}` run) belong to the
            // escape and must be consumed with it, not folded as letters.
            out.push(c);
            i += 1;
            if i < chars.len() {
                let esc = chars[i];
                out.push(esc);
                i += 1;
                if esc == 'x' {
                    if i < chars.len() && chars[i] == '{' {
                        out.push(chars[i]);
                        i += 1;
                        while i < chars.len() && chars[i] != '}' {
                            out.push(chars[i]);
                            i += 1;
                        }
                        if i < chars.len() {
                            out.push(chars[i]);
                            i += 1;
                        }
                    } else {
                        for _ in 0..2 {
                            if i < chars.len() && chars[i].is_ascii_hexdigit() {
                                out.push(chars[i]);
                                i += 1;
                            }
                        }
                    }
                }
            }
            continue;
        }

        if c == '[' && !in_class {
            in_class = true;
            out.push(c);
            i += 1;
            // A leading `]` or `^]` right after `[` is a literal bracket,
            // not the class terminator.
            if i < chars.len() && chars[i] == '^' {
                out.push(chars[i]);
                i += 1;
            }
            if i < chars.len() && chars[i] == ']' {
                out.push(chars[i]);
                i += 1;
            }
            continue;
        }

        if c == ']' && in_class {
            in_class = false;
            out.push(c);
            i += 1;
            continue;
        }

        if in_class {
            // Inside a class the regex engine already folds what's there
            // via (?i); case tables for named charsets are applied per
            // character so odd charset mappings still line up.
            out.push(c);
            i += 1;
            continue;
        }

        if is_regex_metachar(c) {
            out.push(c);
            i += 1;
            continue;
        }

        let upper = charset.to_upper(c);
        let lower = charset.to_lower(c);
        if upper != lower {
            out.push('[');
            push_class_char(&mut out, lower);
            push_class_char(&mut out, upper);
            out.push(']');
        } else {
            push_literal_char(&mut out, c);
        }
        i += 1;
    }

    out
}

fn is_regex_metachar(c: char) -> bool {
    matches!(
        c,
        '.' | '*' | '+' | '?' | '(' | ')' | '{' | '}' | '|' | '^' | '$'
    )
}

fn push_class_char(out: &mut String, c: char) {
    if c == ']' || c == '^' || c == '\\' || c == '-' {
        out.push('\\');
    }
    out.push(c);
}

fn push_literal_char(out: &mut String, c: char) {
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_plain_letters() {
        let out = expand_case_insensitive("cat", &Charset::ascii());
        assert_eq!(out, "[cC][aA][tT]");
    }

    #[test]
    fn leaves_metacharacters_and_digits_alone() {
        let out = expand_case_insensitive("a.b+3", &Charset::ascii());
        assert_eq!(out, "[aA].[bB]+3");
    }

    #[test]
    fn leaves_escapes_alone() {
        let out = expand_case_insensitive("a\\d.b", &Charset::ascii());
        assert_eq!(out, "[aA]\\d.[bB]");
    }

    #[test]
    fn leaves_character_classes_alone() {
        let out = expand_case_insensitive("[a-z]", &Charset::ascii());
        assert_eq!(out, "[a-z]");
    }

    #[test]
    fn hex_escape_digits_are_not_folded_as_letters() {
        let out = expand_case_insensitive(r"\xdf", &Charset::ascii());
        assert_eq!(out, r"\xdf");
    }

    #[test]
    fn braced_hex_escape_is_consumed_whole() {
        let out = expand_case_insensitive(r"\x{1F600}ab", &Charset::ascii());
        assert_eq!(out, r"\x{1F600}[aA][bB]");
    }
}

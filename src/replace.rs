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

//! Replacement Transformer (spec §4.D).
//!
//! Walks a replacement template left to right, substituting capture
//! references and applying a small case-transform state machine, grounded
//! on `original_source/lib/search/regex.c`'s `mc_search_regex__*` family
//! (`REPLACE_T_*` transform bitflags, `mc_search_regex__process_escape_sequence`).

use crate::charset::Charset;
use crate::error::SearchError;

/// `MC_SEARCH__NUM_REPLACE_ARGS` in the original's `internal.h`: the fixed
/// capture-reference ceiling, independent of how many groups the compiled
/// regex actually has.
const CAPTURE_CEILING: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    None,
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy)]
struct CaseState {
    run: RunMode,
    one_shot: Option<bool>, // Some(true) = uppercase next char, Some(false) = lowercase next char
}

impl CaseState {
    fn new() -> Self {
        CaseState { run: RunMode::None, one_shot: None }
    }

    /// Consume the transform that applies to the *next* emitted character,
    /// clearing the one-shot flag (run-mode flags persist until `\E`).
    fn take_for_next_char(&mut self) -> Option<bool> {
        if let Some(upper) = self.one_shot.take() {
            return Some(upper);
        }
        match self.run {
            RunMode::Upper => Some(true),
            RunMode::Lower => Some(false),
            RunMode::None => None,
        }
    }
}

/// Render `template` against a completed match's captures.
///
/// `haystack` is the buffer the match was found in (captures are byte
/// ranges into it); `charset` drives both case folding and how numeric
/// escapes are encoded; `utf8_mode` mirrors the handle's derived flag.
pub fn render(
    template: &[u8],
    captures: &[Option<(usize, usize)>],
    haystack: &[u8],
    charset: &Charset,
    utf8_mode: bool,
) -> Result<Vec<u8>, SearchError> {
    preflight(template, captures)?;

    let mut out = Vec::with_capacity(template.len() * 2);
    let mut state = CaseState::new();
    let mut i = 0;

    while i < template.len() {
        let b = template[i];

        if b == b'\\' {
            let (consumed, action) = parse_escape(template, i)?;
            i += consumed;
            match action {
                EscapeAction::Literal(byte) => emit_literal_bytes(&mut out, &[byte], &mut state, charset),
                EscapeAction::Control(byte) => out.push(byte),
                EscapeAction::Numeric(code_point) => emit_numeric(&mut out, code_point, utf8_mode),
                EscapeAction::Capture(n) => emit_capture(&mut out, n, captures, haystack, &mut state, charset)?,
                EscapeAction::CaseFlag(flag) => apply_case_flag(&mut state, flag),
            }
            continue;
        }

        if b == b'$' && template.get(i + 1) == Some(&b'{') {
            if let Some((n, consumed)) = parse_brace_capture(template, i) {
                emit_capture(&mut out, n, captures, haystack, &mut state, charset)?;
                i += consumed;
                continue;
            }
        }

        // One unescaped literal byte. Non-ASCII bytes in a non-UTF-8
        // template can't be decoded one-at-a-time reliably here without
        // knowing their charset boundary, so only ASCII goes through the
        // case-transform path; non-ASCII passes through untouched (it is
        // already whatever byte the caller typed).
        if b.is_ascii() {
            emit_literal_bytes(&mut out, &[b], &mut state, charset);
        } else {
            out.push(b);
        }
        i += 1;
    }

    Ok(out)
}

/// Walk `template` with the same escape-pair-consuming dispatch `render`
/// uses (`parse_escape`/`parse_brace_capture`), checking only the capture
/// references it turns up. Driving this off the real parser rather than a
/// second hand-rolled scan is what keeps `\\5` (an escaped backslash
/// followed by a literal digit) and `\${1}` (an escaped dollar followed by
/// plain text) from being misread as capture references here when `render`
/// itself never treats them as one.
fn preflight(template: &[u8], captures: &[Option<(usize, usize)>]) -> Result<(), SearchError> {
    let available = captures.len().saturating_sub(1); // group 0 is the whole match
    let mut i = 0;
    while i < template.len() {
        let b = template[i];
        if b == b'\\' {
            let (consumed, action) = parse_escape(template, i)?;
            if let EscapeAction::Capture(n) = action {
                check_capture_ref(n, available, i)?;
            }
            i += consumed;
            continue;
        }
        if b == b'$' && template.get(i + 1) == Some(&b'{') {
            if let Some((n, consumed)) = parse_brace_capture(template, i) {
                check_capture_ref(n, available, i)?;
                i += consumed;
                continue;
            }
        }
        i += 1;
    }
    Ok(())
}

fn check_capture_ref(n: usize, available: usize, position: usize) -> Result<(), SearchError> {
    if n > CAPTURE_CEILING {
        return Err(SearchError::replace(
            format!("replacement references group {n}, exceeding the capture ceiling of {CAPTURE_CEILING}"),
            position,
        ));
    }
    if n > available {
        return Err(SearchError::replace(
            format!("replacement references group {n}, but the match only has {available}"),
            position,
        ));
    }
    Ok(())
}

enum EscapeAction {
    Literal(u8),
    Control(u8),
    Numeric(u32),
    Capture(usize),
    CaseFlag(u8),
}

/// Parse one `\...` escape starting at `template[at] == '\\'`. Returns how
/// many bytes were consumed (including the backslash) and what to do.
fn parse_escape(template: &[u8], at: usize) -> Result<(usize, EscapeAction), SearchError> {
    let next = *template.get(at + 1).ok_or_else(|| {
        SearchError::replace("trailing backslash in replacement template", at)
    })?;

    match next {
        b'0'..=b'9' => Ok((2, EscapeAction::Capture((next - b'0') as usize))),
        b'U' | b'L' | b'u' | b'l' | b'E' => Ok((2, EscapeAction::CaseFlag(next))),
        b'n' => Ok((2, EscapeAction::Control(b'\n'))),
        b't' => Ok((2, EscapeAction::Control(b'\t'))),
        b'v' => Ok((2, EscapeAction::Control(0x0B))),
        b'b' => Ok((2, EscapeAction::Control(0x08))),
        b'r' => Ok((2, EscapeAction::Control(b'\r'))),
        b'f' => Ok((2, EscapeAction::Control(0x0C))),
        b'a' => Ok((2, EscapeAction::Control(0x07))),
        b'\\' => Ok((2, EscapeAction::Literal(b'\\'))),
        b'$' => Ok((2, EscapeAction::Literal(b'$'))),
        b'x' => parse_hex_escape(template, at),
        b'{' => parse_octal_escape(template, at),
        other => Err(SearchError::replace(
            format!("unrecognized escape '\\{}' in replacement template", other as char),
            at,
        )),
    }
}

fn parse_hex_escape(template: &[u8], at: usize) -> Result<(usize, EscapeAction), SearchError> {
    // at points at '\\', at+1 is 'x'
    if template.get(at + 2) == Some(&b'{') {
        let mut j = at + 3;
        let digits_start = j;
        while j < template.len() && template[j] != b'}' {
            j += 1;
        }
        if j >= template.len() {
            return Err(SearchError::replace("unterminated \\x{...} escape", at));
        }
        let digits = std::str::from_utf8(&template[digits_start..j]).unwrap_or("");
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| SearchError::replace("invalid hex digits in \\x{...} escape", at))?;
        Ok((j + 1 - at, EscapeAction::Numeric(value)))
    } else {
        let digits = template.get(at + 2..at + 4).ok_or_else(|| {
            SearchError::replace("incomplete \\xHH escape", at)
        })?;
        let text = std::str::from_utf8(digits)
            .map_err(|_| SearchError::replace("invalid \\xHH escape", at))?;
        let value = u32::from_str_radix(text, 16)
            .map_err(|_| SearchError::replace("invalid hex digits in \\xHH escape", at))?;
        Ok((4, EscapeAction::Numeric(value)))
    }
}

fn parse_octal_escape(template: &[u8], at: usize) -> Result<(usize, EscapeAction), SearchError> {
    // at points at '\\', at+1 is '{'
    let digits_start = at + 2;
    let mut j = digits_start;
    while j < template.len() && template[j] != b'}' {
        j += 1;
    }
    if j >= template.len() {
        return Err(SearchError::replace("unterminated \\{...} octal escape", at));
    }
    let digits = std::str::from_utf8(&template[digits_start..j]).unwrap_or("");
    let value = u32::from_str_radix(digits, 8)
        .map_err(|_| SearchError::replace("invalid octal digits in \\{...} escape", at))?;
    Ok((j + 1 - at, EscapeAction::Numeric(value)))
}

/// Parse `${N}` starting at `template[at] == '$'`, `template[at+1] == '{'`.
/// Returns `(N, bytes_consumed)` or `None` if the braces aren't a pure
/// decimal run (in which case `$` is emitted as a literal byte instead).
fn parse_brace_capture(template: &[u8], at: usize) -> Option<(usize, usize)> {
    let digits_start = at + 2;
    let mut j = digits_start;
    while j < template.len() && template[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits_start || template.get(j) != Some(&b'}') {
        return None;
    }
    let text = std::str::from_utf8(&template[digits_start..j]).ok()?;
    let n: usize = text.parse().ok()?;
    Some((n, j + 1 - at))
}

fn apply_case_flag(state: &mut CaseState, flag: u8) {
    match flag {
        b'U' => state.run = RunMode::Upper,
        b'L' => state.run = RunMode::Lower,
        b'E' => {
            state.run = RunMode::None;
            state.one_shot = None;
        }
        b'u' => state.one_shot = Some(true),
        b'l' => state.one_shot = Some(false),
        _ => unreachable!("apply_case_flag only called with U/L/u/l/E"),
    }
}

fn emit_numeric(out: &mut Vec<u8>, code_point: u32, utf8_mode: bool) {
    if utf8_mode {
        if let Some(c) = char::from_u32(code_point) {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            return;
        }
    }
    out.push((code_point & 0xFF) as u8);
}

fn emit_capture(
    out: &mut Vec<u8>,
    n: usize,
    captures: &[Option<(usize, usize)>],
    haystack: &[u8],
    state: &mut CaseState,
    charset: &Charset,
) -> Result<(), SearchError> {
    let bytes = match captures.get(n).and_then(|c| *c) {
        Some((s, e)) => &haystack[s..e],
        None => &[][..], // group didn't participate in this match
    };
    emit_literal_bytes(out, bytes, state, charset);
    Ok(())
}

/// Emit `bytes`, applying the current case-transform state one code point
/// at a time (spec §4.D: "applies only to emitted literal or captured
/// bytes, not to escape-derived bytes").
fn emit_literal_bytes(out: &mut Vec<u8>, bytes: &[u8], state: &mut CaseState, charset: &Charset) {
    let mut rest = bytes;
    while !rest.is_empty() {
        match charset.decode_one(rest) {
            Some((c, len)) => {
                let transformed = match state.take_for_next_char() {
                    Some(true) => charset.to_upper(c),
                    Some(false) => charset.to_lower(c),
                    None => c,
                };
                out.extend_from_slice(&charset.encode_char(transformed));
                rest = &rest[len..];
            }
            None => {
                // Undecodable byte (stray continuation byte, etc): pass
                // through untouched and don't consume a case-transform slot.
                out.push(rest[0]);
                rest = &rest[1..];
            }
        }
    }
}

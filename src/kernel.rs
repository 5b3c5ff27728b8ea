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

//! Execution Kernel (spec §4.C).
//!
//! Scans a `Source` line by line, scrubbing each line through the UTF-8
//! Safety Layer when the condition set runs in Unicode mode, and tries
//! every compiled condition in order. Mirrors
//! `original_source/lib/search/regex.c:883-991`
//! (`mc_search__run_regex`)'s `current_pos`/`virtual_pos` line-fill split,
//! which now lives in `Source::fill_line`.

use crate::condition::CompiledCondition;
use crate::producer::{Progress, ProgressSignal, Source};
use crate::safety;

/// A successful match: absolute byte offsets into the source, plus every
/// capture group (group 0 is always the whole match, per spec §3).
#[derive(Debug, Clone)]
pub struct MatchInfo {
    pub start: usize,
    pub length: usize,
    pub captures: Vec<Option<(usize, usize)>>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Found(MatchInfo),
    NotFound,
    Aborted,
}

/// Whether `run` should scan forward across line boundaries looking for a
/// match anywhere in the remaining range (`Scan`), or only check whether a
/// condition matches anchored at `start` within a single fetched window
/// (`AnchoredOnce`) — the primitive backward search is built from (spec
/// §4.C "Edge cases: Backwards search").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Scan,
    AnchoredOnce,
}

/// Run the compiled condition list against `source` over `[start, end)`.
///
/// `case_sensitive` and `utf8_mode` come from the owning handle's flags;
/// they're threaded through explicitly rather than stored on
/// `CompiledCondition` because they govern how a match is *located*
/// (literal fast-path folding, safety scrubbing) rather than anything the
/// condition itself owns.
pub fn run(
    conditions: &[CompiledCondition],
    case_sensitive: bool,
    utf8_mode: bool,
    source: &mut Source,
    start: usize,
    end: usize,
    mut progress: Option<&mut dyn Progress>,
    mode: RunMode,
) -> Outcome {
    if conditions.is_empty() {
        return Outcome::NotFound;
    }
    if start >= end {
        return Outcome::NotFound;
    }

    let mut cursor = start;
    loop {
        if cursor >= end {
            return Outcome::NotFound;
        }

        let fill = source.fill_line(cursor, end);
        if fill.aborted {
            return Outcome::Aborted;
        }
        if fill.bytes.is_empty() {
            return Outcome::NotFound;
        }

        let buf = if utf8_mode && !safety::is_clean(&fill.bytes) {
            safety::scrub(&fill.bytes)
        } else {
            fill.bytes
        };

        for cond in conditions {
            if let Some(mut captures) = match_condition(cond, &buf, case_sensitive) {
                if mode == RunMode::AnchoredOnce {
                    match captures.first() {
                        Some(Some((0, _))) => {}
                        _ => continue,
                    }
                }
                for c in captures.iter_mut().flatten() {
                    c.0 += fill.start;
                    c.1 += fill.start;
                }
                let whole = captures[0].expect("group 0 always present on a match");
                return Outcome::Found(MatchInfo {
                    start: whole.0,
                    length: whole.1 - whole.0,
                    captures,
                });
            }
        }

        if mode == RunMode::AnchoredOnce {
            return Outcome::NotFound;
        }

        if let Some(p) = progress.as_deref_mut() {
            if p.report(fill.next_cursor) == ProgressSignal::Abort {
                return Outcome::Aborted;
            }
        }

        // Defensive: a producer that returns Skip forever could otherwise
        // stall the scan without making progress.
        if fill.next_cursor <= cursor {
            return Outcome::NotFound;
        }
        cursor = fill.next_cursor;
    }
}

/// Try one condition against `buf`; returns capture offsets relative to
/// `buf`'s start, group 0 first.
fn match_condition(
    cond: &CompiledCondition,
    buf: &[u8],
    case_sensitive: bool,
) -> Option<Vec<Option<(usize, usize)>>> {
    if let Some(regex) = &cond.regex_handle {
        let caps = regex.captures(buf)?;
        let mut out = Vec::with_capacity(caps.len());
        for i in 0..caps.len() {
            out.push(caps.get(i).map(|m| (m.start(), m.end())));
        }
        Some(out)
    } else {
        let (start, len) = literal_find(cond, buf, case_sensitive)?;
        Some(vec![Some((start, start + len))])
    }
}

/// `memchr`-backed scan for the Literal dialect's fast path (spec §3
/// invariant; see `condition::compile_one`'s `length_stable` guard for why
/// this never runs against a charset whose casing changes byte length).
fn literal_find(cond: &CompiledCondition, buf: &[u8], case_sensitive: bool) -> Option<(usize, usize)> {
    if case_sensitive {
        let needle = &cond.source_bytes;
        if needle.is_empty() {
            return Some((0, 0));
        }
        memchr::memmem::find(buf, needle).map(|pos| (pos, needle.len()))
    } else {
        let lower = cond.lower_bytes.as_deref()?;
        let upper = cond.upper_bytes.as_deref()?;
        if lower.is_empty() {
            return Some((0, 0));
        }
        if buf.len() < lower.len() {
            return None;
        }
        let (first_lower, first_upper) = (lower[0], upper[0]);
        let last_start = buf.len() - lower.len();
        let mut pos = 0;
        while pos <= last_start {
            let haystack = &buf[pos..=last_start];
            let found = if first_lower == first_upper {
                memchr::memchr(first_lower, haystack)
            } else {
                memchr::memchr2(first_lower, first_upper, haystack)
            };
            match found {
                Some(off) => {
                    let candidate = pos + off;
                    let window = &buf[candidate..candidate + lower.len()];
                    if window.eq_ignore_ascii_case(lower) {
                        return Some((candidate, lower.len()));
                    }
                    pos = candidate + 1;
                }
                None => return None,
            }
        }
        None
    }
}

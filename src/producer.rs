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

//! Byte Producer protocol (spec §6.1).
//!
//! The real file manager's editor stores text in a piece table, so the
//! search engine never assumes a contiguous buffer: it pulls bytes one at a
//! time through a callback and reports progress back the same way. A plain
//! `&[u8]` is still the common case, so `Source` wraps either.

/// Outcome of a single `Producer::next_byte` call. Mirrors the five
/// statuses in spec §3's Producer Callback Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteStatus {
    /// A byte was produced at the requested offset; the position advances.
    Ok(u8),
    /// The position advances but the byte is not part of the logical
    /// stream (e.g. a piece-table gap marker) — nothing is appended.
    Skip,
    /// Transient: the producer could not answer for this offset yet.
    /// The position does not advance; the kernel retries the same offset.
    Invalid,
    /// The caller asked the producer to stop (e.g. the user cancelled).
    Abort,
    /// End of the producer's data, independent of the `len` the caller
    /// passed to `Source::from_producer`.
    NotFound,
}

/// A source of bytes addressed by absolute offset, for buffers that are not
/// laid out contiguously in memory (spec §6.1).
pub trait Producer {
    fn next_byte(&mut self, offset: usize) -> ByteStatus;
}

/// What a `Progress::report` call asks the kernel to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    Continue,
    Abort,
}

/// Reports scan progress back to the caller so a UI can render a progress
/// bar and observe cancellation over long-running searches (spec §3's
/// `progress` callback); entirely optional.
pub trait Progress {
    fn report(&mut self, current_offset: usize) -> ProgressSignal;
}

/// No-op `Progress` implementation, used when the caller doesn't care.
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _current_offset: usize) -> ProgressSignal {
        ProgressSignal::Continue
    }
}

/// The buffer a search runs over: either a contiguous slice (the common,
/// fast case) or an arbitrary callback-driven producer.
pub enum Source<'a> {
    Slice(&'a [u8]),
    Callback {
        producer: &'a mut dyn Producer,
        len: usize,
    },
}

/// One line-sized chunk pulled out of a `Source`, ready for the Safety
/// Layer and regex engine.
pub struct LineFill {
    pub bytes: Vec<u8>,
    /// Absolute offset the chunk started at (`start_of_buffer` in §4.C).
    pub start: usize,
    /// The next `cursor` value the kernel should resume scanning from.
    pub next_cursor: usize,
    pub aborted: bool,
}

impl<'a> Source<'a> {
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Source::Slice(bytes)
    }

    pub fn from_producer(producer: &'a mut dyn Producer, len: usize) -> Self {
        Source::Callback { producer, len }
    }

    pub fn len(&self) -> usize {
        match self {
            Source::Slice(s) => s.len(),
            Source::Callback { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `offset` as a single byte, or `None` at or past the end.
    /// Used by backwards search (§4.C edge cases), which walks one byte at
    /// a time rather than through `fill_line`.
    pub fn byte_at(&mut self, offset: usize) -> Option<u8> {
        match self {
            Source::Slice(s) => s.get(offset).copied(),
            Source::Callback { producer, len } => {
                if offset >= *len {
                    return None;
                }
                let mut pos = offset;
                loop {
                    match producer.next_byte(pos) {
                        ByteStatus::Ok(b) => return Some(b),
                        ByteStatus::Skip => {
                            pos += 1;
                            if pos >= *len {
                                return None;
                            }
                        }
                        ByteStatus::Invalid => continue,
                        ByteStatus::Abort | ByteStatus::NotFound => return None,
                    }
                }
            }
        }
    }

    /// Materialize `[start, end)` into an owned buffer without line
    /// semantics, for callers (tests, `slice_owned`-style helpers) that
    /// just want a flat read.
    pub fn slice_owned(&mut self, start: usize, end: usize) -> Vec<u8> {
        match self {
            Source::Slice(s) => {
                let end = end.min(s.len());
                if start >= end {
                    Vec::new()
                } else {
                    s[start..end].to_vec()
                }
            }
            Source::Callback { .. } => {
                let mut out = Vec::new();
                let mut pos = start;
                while pos < end {
                    match self.byte_at(pos) {
                        Some(b) => out.push(b),
                        None => break,
                    }
                    pos += 1;
                }
                out
            }
        }
    }

    /// Fill one line buffer starting at `cursor`, stopping at the first
    /// newline byte (inclusive) or at `end`, whichever comes first.
    /// Mirrors `mc_search__run_regex`'s `current_pos`/`virtual_pos` split
    /// (original_source/lib/search/regex.c): `current_pos` is the raw
    /// source offset (what `Skip`/`Invalid` reason about), `virtual_pos`
    /// counts only bytes actually appended to the line buffer and is what
    /// gets compared against `end`.
    pub fn fill_line(&mut self, cursor: usize, end: usize) -> LineFill {
        match self {
            Source::Slice(s) => {
                let limit = end.min(s.len());
                if cursor >= limit {
                    return LineFill { bytes: Vec::new(), start: cursor, next_cursor: cursor, aborted: false };
                }
                let mut pos = cursor;
                while pos < limit {
                    if s[pos] == b'\n' {
                        pos += 1;
                        break;
                    }
                    pos += 1;
                }
                LineFill {
                    bytes: s[cursor..pos].to_vec(),
                    start: cursor,
                    next_cursor: pos,
                    aborted: false,
                }
            }
            Source::Callback { producer, len } => {
                let mut current_pos = cursor;
                let mut out = Vec::with_capacity(64);
                let mut aborted = false;
                if current_pos >= *len {
                    return LineFill { bytes: out, start: cursor, next_cursor: current_pos, aborted: false };
                }
                loop {
                    if current_pos >= *len {
                        break;
                    }
                    match producer.next_byte(current_pos) {
                        ByteStatus::Abort => {
                            aborted = true;
                            break;
                        }
                        ByteStatus::Invalid => continue,
                        ByteStatus::NotFound => break,
                        ByteStatus::Skip => {
                            current_pos += 1;
                            continue;
                        }
                        ByteStatus::Ok(b) => {
                            current_pos += 1;
                            out.push(b);
                            if b == b'\n' || current_pos > end {
                                break;
                            }
                        }
                    }
                }
                LineFill { bytes: out, start: cursor, next_cursor: current_pos, aborted }
            }
        }
    }
}

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

//! Search Handle (spec §3, §6.3), mirroring `original_source/lib/search/search.c`'s
//! `mc_search_new`/`mc_search_prepare`/`mc_search_run` lifecycle without the
//! manual `mc_search_free` — `Drop` does that job here.

use crate::charset::Charset;
use crate::condition::{self, CompiledCondition};
use crate::dialect::{Dialect, Flags};
use crate::error::{ErrorKind, SearchError};
use crate::kernel::{self, MatchInfo, Outcome as KernelOutcome, RunMode};
use crate::producer::{Progress, Source};
use crate::replace;

/// Result of a `run` call, re-exported at the crate root as the public
/// outcome type (spec §4.C).
#[derive(Debug, Clone)]
pub enum Outcome {
    Found { start: usize, length: usize },
    NotFound,
    Aborted,
}

/// A reusable search configuration plus, after a successful `run`, the last
/// match's capture offsets (spec §3 "Search Handle").
pub struct SearchHandle {
    pattern: Vec<u8>,
    charset: Charset,
    dialect: Dialect,
    flags: Flags,
    conditions: Vec<CompiledCondition>,
    last_match: Option<MatchInfo>,
    error: Option<SearchError>,
}

impl SearchHandle {
    /// `mc_search_new`: construct a handle over a pattern and its declared
    /// charset. The handle is not usable for `run` until `prepare` succeeds.
    pub fn new(pattern: &[u8], charset: Charset) -> Self {
        SearchHandle {
            pattern: pattern.to_vec(),
            charset,
            dialect: Dialect::Literal,
            flags: Flags::default(),
            conditions: Vec::new(),
            last_match: None,
            error: None,
        }
    }

    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        self.conditions.clear();
    }

    pub fn set_case_sensitive(&mut self, value: bool) {
        self.flags.case_sensitive = value;
        self.conditions.clear();
    }

    pub fn set_whole_words(&mut self, value: bool) {
        self.flags.whole_words = value;
        self.conditions.clear();
    }

    pub fn set_entire_line(&mut self, value: bool) {
        self.flags.entire_line = value;
        self.conditions.clear();
    }

    pub fn set_all_charsets(&mut self, value: bool) {
        self.flags.all_charsets = value;
        self.conditions.clear();
    }

    /// `mc_search_prepare`: force compilation, returning whether the handle
    /// is now usable. A handle whose compilation failed keeps an empty
    /// condition list and a populated `error` (spec §3 invariant).
    pub fn prepare(&mut self) -> bool {
        match condition::compile(&self.pattern, self.dialect, &self.charset, &self.flags) {
            Ok(conditions) => {
                self.conditions = conditions;
                self.error = None;
                true
            }
            Err(e) => {
                log::debug!("condition compile failed: {e}");
                self.conditions.clear();
                self.error = Some(e);
                false
            }
        }
    }

    /// Whether this handle's declared charset runs the kernel in UTF-8 mode
    /// (and therefore through the Safety Layer).
    fn utf8_mode(&self) -> bool {
        // Hex conditions force ASCII regardless of the handle's declared
        // charset (spec §9 Open Question); once compiled, the condition's
        // own charset is authoritative.
        self.conditions.first().map(|c| c.charset.is_utf8()).unwrap_or(self.charset.is_utf8())
    }

    /// `mc_search_run`: execute the compiled conditions over `[start, end)`
    /// of `source`. Implicitly calls `prepare` first if the handle has no
    /// compiled conditions and no recorded compile error.
    pub fn run(&mut self, source: &mut Source, start: usize, end: usize) -> Outcome {
        self.run_with_progress(source, start, end, None)
    }

    pub fn run_with_progress(
        &mut self,
        source: &mut Source,
        start: usize,
        end: usize,
        progress: Option<&mut dyn Progress>,
    ) -> Outcome {
        if self.conditions.is_empty() {
            if self.error.is_some() {
                return Outcome::NotFound;
            }
            if !self.prepare() {
                return Outcome::NotFound;
            }
        }

        let outcome = kernel::run(
            &self.conditions,
            self.flags.case_sensitive,
            self.utf8_mode(),
            source,
            start,
            end,
            progress,
            RunMode::Scan,
        );

        match outcome {
            KernelOutcome::Found(m) => {
                let result = Outcome::Found { start: m.start, length: m.length };
                self.last_match = Some(m);
                result
            }
            KernelOutcome::NotFound => {
                self.last_match = None;
                Outcome::NotFound
            }
            KernelOutcome::Aborted => {
                self.last_match = None;
                Outcome::Aborted
            }
        }
    }

    /// Backward search (spec §4.C "Edge cases: Backwards search"): the
    /// kernel has no native reverse scan, so this walks `saved_start - 1,
    /// saved_start - 2, ...` down to `lower_bound`, anchoring each attempt
    /// at that exact offset, and returns the first (highest) position that
    /// matches.
    pub fn run_backwards(&mut self, source: &mut Source, saved_start: usize, lower_bound: usize) -> Outcome {
        if self.conditions.is_empty() && !self.prepare() {
            return Outcome::NotFound;
        }

        let mut pos = saved_start;
        loop {
            if pos < lower_bound {
                return Outcome::NotFound;
            }
            let outcome = kernel::run(
                &self.conditions,
                self.flags.case_sensitive,
                self.utf8_mode(),
                source,
                pos,
                source.len(),
                None,
                RunMode::AnchoredOnce,
            );
            match outcome {
                KernelOutcome::Found(m) => {
                    let result = Outcome::Found { start: m.start, length: m.length };
                    self.last_match = Some(m);
                    return result;
                }
                KernelOutcome::Aborted => return Outcome::Aborted,
                KernelOutcome::NotFound => {
                    if pos == 0 {
                        return Outcome::NotFound;
                    }
                    pos -= 1;
                }
            }
        }
    }

    /// `match_start`/`match_end` report `-1` for a group that didn't
    /// participate in the match or is out of range, matching the C
    /// original's sentinel convention at this boundary.
    pub fn match_start(&self, group_index: usize) -> i32 {
        self.last_match
            .as_ref()
            .and_then(|m| m.captures.get(group_index).copied().flatten())
            .map(|(s, _)| s as i32)
            .unwrap_or(-1)
    }

    pub fn match_end(&self, group_index: usize) -> i32 {
        self.last_match
            .as_ref()
            .and_then(|m| m.captures.get(group_index).copied().flatten())
            .map(|(_, e)| e as i32)
            .unwrap_or(-1)
    }

    /// `mc_search_prepare_replace_str`: render `template` against
    /// `last_match`, reading captured substrings out of `haystack` (the same
    /// buffer bytes `run` most recently matched against — the handle does
    /// not retain a reference to the source it ran over, so the caller
    /// supplies it again here).
    pub fn prepare_replacement(&mut self, template: &[u8], haystack: &[u8]) -> Result<Vec<u8>, SearchError> {
        let m = self.last_match.as_ref().ok_or_else(|| {
            SearchError::replace("prepare_replacement called with no successful match", 0)
        })?;

        let translated;
        let template = if self.dialect == Dialect::Glob {
            translated = crate::dialect::glob::translate_replace_to_regex(template);
            &translated[..]
        } else {
            template
        };

        match replace::render(template, &m.captures, haystack, &self.charset, self.utf8_mode()) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// `mc_search_error` / `mc_search_get_error`: uniform `(kind, message)`
    /// view regardless of whether the caller unwrapped a `Result` or drove
    /// the handle through the `prepare`/`run` protocol.
    pub fn get_error(&self) -> (ErrorKind, String) {
        match &self.error {
            Some(e) => (e.kind(), e.to_string()),
            None => (ErrorKind::Ok, String::new()),
        }
    }
}

/// `mc_search_types_list_get`: the four dialects and their human-readable
/// names, for populating a dialect picker (spec §6.3).
pub fn types_list() -> Vec<(&'static str, &'static str)> {
    [Dialect::Literal, Dialect::Glob, Dialect::Hex, Dialect::Regex]
        .iter()
        .map(|d| (d.tag(), d.human_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_search_happy_path() {
        let mut h = SearchHandle::new(b"world", Charset::Utf8);
        assert!(h.prepare());
        let mut src = Source::from_slice(b"hello world\n");
        match h.run(&mut src, 0, 12) {
            Outcome::Found { start, length } => {
                assert_eq!(start, 6);
                assert_eq!(length, 5);
            }
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(h.match_start(0), 6);
        assert_eq!(h.match_end(0), 11);
    }

    #[test]
    fn invalid_pattern_leaves_handle_unusable() {
        let mut h = SearchHandle::new(b"a{bc", Charset::Utf8);
        h.set_dialect(Dialect::Glob);
        assert!(!h.prepare());
        let (kind, message) = h.get_error();
        assert_eq!(kind, ErrorKind::InvalidInput);
        assert!(!message.is_empty());
        let mut src = Source::from_slice(b"a{bc\n");
        assert!(matches!(h.run(&mut src, 0, 5), Outcome::NotFound));
    }

    #[test]
    fn glob_wildcard_pattern_matches_and_captures_prefix() {
        let mut h = SearchHandle::new(b"*.c", Charset::Utf8);
        h.set_dialect(Dialect::Glob);
        assert!(h.prepare());
        let haystack = b"main.c";
        let mut src = Source::from_slice(haystack);
        match h.run(&mut src, 0, haystack.len()) {
            Outcome::Found { start, length } => {
                assert_eq!(start, 0);
                assert_eq!(length, 6);
            }
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(h.match_start(1), 0);
        assert_eq!(h.match_end(1), 4);
    }

    #[test]
    fn glob_star_backtracks_to_the_last_matching_alternative() {
        // Pattern "*.c," against "main.c,util.c,": `*` outside braces
        // translates to greedy `(.*)`, so the leftmost-first match is the
        // whole string, with capture1 absorbing everything up to the last
        // ".c," rather than stopping at the first one.
        let mut h = SearchHandle::new(b"*.c,", Charset::Utf8);
        h.set_dialect(Dialect::Glob);
        assert!(h.prepare());
        let haystack = b"main.c,util.c,";
        let mut src = Source::from_slice(haystack);
        match h.run(&mut src, 0, haystack.len()) {
            Outcome::Found { start, length } => {
                assert_eq!(start, 0);
                assert_eq!(length, haystack.len());
            }
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(h.match_start(1), 0);
        assert_eq!(h.match_end(1), 11);
    }

    #[test]
    fn hex_pattern_with_out_of_range_byte_value_is_rejected() {
        let mut h = SearchHandle::new(b"FF 100", Charset::Utf8);
        h.set_dialect(Dialect::Hex);
        assert!(!h.prepare());
        let (kind, _) = h.get_error();
        assert_eq!(kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn regex_replacement_applies_case_transform_run() {
        let mut h = SearchHandle::new(b"(hello) (world)", Charset::Utf8);
        h.set_dialect(Dialect::Regex);
        h.set_case_sensitive(false);
        assert!(h.prepare());
        let haystack = b"Hello World";
        let mut src = Source::from_slice(haystack);
        assert!(matches!(h.run(&mut src, 0, haystack.len()), Outcome::Found { .. }));
        let rendered = h.prepare_replacement(br"\U\2 \1\E!", haystack).unwrap();
        assert_eq!(rendered, b"WORLD Hello!");
    }

    #[test]
    fn backwards_search_finds_earlier_occurrence() {
        let mut h = SearchHandle::new(b"cat", Charset::Utf8);
        assert!(h.prepare());
        let haystack = b"cat sat on the cat mat";
        let mut src = Source::from_slice(haystack);
        match h.run_backwards(&mut src, 10, 0) {
            Outcome::Found { start, .. } => assert_eq!(start, 0),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn types_list_has_four_dialects() {
        let types = types_list();
        assert_eq!(types.len(), 4);
        assert!(types.contains(&("literal", "Normal")));
    }
}

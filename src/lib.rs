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

//! A pluggable literal/glob/hex/regex search-and-replace engine.
//!
//! Four pattern surface languages ([`Dialect::Literal`], [`Dialect::Glob`],
//! [`Dialect::Hex`], [`Dialect::Regex`]) are normalized to a single
//! regex-based execution kernel that runs over either a contiguous byte
//! slice or a callback-driven [`Producer`] (for callers whose buffer, like
//! an editor's piece table, is not laid out contiguously in memory).
//!
//! A [`SearchHandle`] owns one compiled pattern configuration and is reused
//! across many [`SearchHandle::run`] calls:
//!
//! ```
//! use search_engine::{Charset, Dialect, Outcome, SearchHandle, Source};
//!
//! let mut handle = SearchHandle::new(b"world", Charset::Utf8);
//! handle.set_dialect(Dialect::Literal);
//! assert!(handle.prepare());
//!
//! let mut source = Source::from_slice(b"hello world\n");
//! match handle.run(&mut source, 0, 12) {
//!     Outcome::Found { start, length } => assert_eq!((start, length), (6, 5)),
//!     _ => unreachable!(),
//! }
//! ```

mod casefold;
mod charset;
mod condition;
mod dialect;
mod error;
mod handle;
mod kernel;
mod producer;
mod replace;
mod safety;

pub use charset::Charset;
pub use dialect::Dialect;
pub use error::{ErrorKind, SearchError};
pub use handle::{types_list, Outcome, SearchHandle};
pub use producer::{ByteStatus, NoProgress, Producer, Progress, ProgressSignal, Source};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Bytes with nothing that any dialect's translator treats specially,
    /// so a Literal/Glob/Hex/Regex compile of the same bytes all reduce to
    /// matching the bytes themselves (spec §8 property 1).
    fn plain_byte() -> impl Strategy<Value = u8> {
        prop::sample::select(&b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"[..])
    }

    fn plain_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(plain_byte(), 1..12)
    }

    proptest! {
        /// Property 1: dialect neutrality of literal bytes.
        #[test]
        fn dialect_neutrality_of_literal_bytes(s in plain_bytes()) {
            for dialect in [Dialect::Literal, Dialect::Glob, Dialect::Regex] {
                let mut handle = SearchHandle::new(&s, Charset::Utf8);
                handle.set_dialect(dialect);
                prop_assert!(handle.prepare());
                let mut source = Source::from_slice(&s);
                match handle.run(&mut source, 0, s.len()) {
                    Outcome::Found { start, length } => {
                        prop_assert_eq!(start, 0);
                        prop_assert_eq!(length, s.len());
                    }
                    other => prop_assert!(false, "dialect {:?} did not match its own literal bytes: {:?}", dialect, other),
                }
            }
        }

        /// Property 2: case-insensitive idempotence.
        #[test]
        fn case_insensitive_idempotence(s in plain_bytes()) {
            let upper: Vec<u8> = s.iter().map(u8::to_ascii_uppercase).collect();
            let lower: Vec<u8> = s.iter().map(u8::to_ascii_lowercase).collect();

            let mut h_upper = SearchHandle::new(&upper, Charset::Utf8);
            h_upper.set_case_sensitive(false);
            prop_assert!(h_upper.prepare());
            let mut src_upper = Source::from_slice(&upper);
            let upper_matches = matches!(h_upper.run(&mut src_upper, 0, upper.len()), Outcome::Found { .. });

            let mut h_lower = SearchHandle::new(&lower, Charset::Utf8);
            h_lower.set_case_sensitive(false);
            prop_assert!(h_lower.prepare());
            let mut src_lower = Source::from_slice(&lower);
            let lower_matches = matches!(h_lower.run(&mut src_lower, 0, lower.len()), Outcome::Found { .. });

            prop_assert_eq!(upper_matches, lower_matches);
        }

        /// Property 3: replacement round-trip via the whole-match token.
        #[test]
        fn replacement_round_trip(s in plain_bytes()) {
            let mut handle = SearchHandle::new(&s, Charset::Utf8);
            prop_assert!(handle.prepare());
            let mut source = Source::from_slice(&s);
            match handle.run(&mut source, 0, s.len()) {
                Outcome::Found { start, length } => {
                    let rendered = handle.prepare_replacement(b"\\0", &s).unwrap();
                    prop_assert_eq!(&rendered, &s[start..start + length]);
                }
                other => prop_assert!(false, "expected Found, got {:?}", other),
            }
        }

        /// Property 4: whole-word boundary never matches mid-word.
        #[test]
        fn whole_word_boundary_respected(word in plain_bytes(), prefix in plain_bytes(), suffix in plain_bytes()) {
            let mut haystack = prefix.clone();
            haystack.extend_from_slice(&word);
            haystack.extend_from_slice(&suffix);

            let mut handle = SearchHandle::new(&word, Charset::Utf8);
            handle.set_whole_words(true);
            prop_assert!(handle.prepare());
            let mut source = Source::from_slice(&haystack);
            if let Outcome::Found { start, length } = handle.run(&mut source, 0, haystack.len()) {
                let before_is_word = start > 0 && is_word_byte(haystack[start - 1]);
                let after_is_word = start + length < haystack.len() && is_word_byte(haystack[start + length]);
                prop_assert!(!before_is_word);
                prop_assert!(!after_is_word);
            }
        }

        /// Property 5: offset preservation under safety scrub is exercised
        /// directly against `safety::scrub`'s contract (module-private, so
        /// checked through the byte-length-preserving behavior `run`
        /// depends on: a match found against a scrubbed UTF-8 buffer keeps
        /// offsets consistent with the original buffer's length).
        #[test]
        fn offset_preservation_length_is_stable(s in prop::collection::vec(any::<u8>(), 0..32)) {
            let mut handle = SearchHandle::new(b"a", Charset::Utf8);
            prop_assert!(handle.prepare());
            let original_len = s.len();
            let mut source = Source::from_slice(&s);
            let _ = handle.run(&mut source, 0, original_len);
            // The source itself is never mutated by `run` even when it
            // contains invalid UTF-8 the kernel scrubs internally before
            // matching; this documents the invariant the kernel relies on
            // rather than re-deriving `safety::scrub`'s own unit tests.
            prop_assert_eq!(source.len(), original_len);
        }
    }

    fn is_word_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn hex_dialect_matches_quoted_and_bare_tokens() {
        let mut handle = SearchHandle::new(b"48 65 \"ll\" 6F", Charset::Utf8);
        handle.set_dialect(Dialect::Hex);
        assert!(handle.prepare());
        let haystack = [0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x00];
        let mut source = Source::from_slice(&haystack);
        match handle.run(&mut source, 0, haystack.len()) {
            Outcome::Found { start, length } => {
                assert_eq!(start, 0);
                assert_eq!(length, 5);
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn all_charsets_matches_pattern_recoded_into_each_charset() {
        let mut handle = SearchHandle::new("ß".as_bytes(), Charset::Utf8);
        handle.set_all_charsets(true);
        assert!(handle.prepare());

        let utf8_input = "ß".as_bytes().to_vec();
        let mut src_utf8 = Source::from_slice(&utf8_input);
        assert!(matches!(handle.run(&mut src_utf8, 0, utf8_input.len()), Outcome::Found { .. }));

        let latin1_input = [0xDFu8];
        let mut src_latin1 = Source::from_slice(&latin1_input);
        assert!(matches!(handle.run(&mut src_latin1, 0, latin1_input.len()), Outcome::Found { .. }));
    }

    #[test]
    fn invalid_utf8_byte_is_scrubbed_without_spurious_match() {
        let mut handle = SearchHandle::new(br"\x28", Charset::Utf8);
        handle.set_dialect(Dialect::Regex);
        assert!(handle.prepare());
        let haystack = [0xC3, 0x28];
        let mut source = Source::from_slice(&haystack);
        match handle.run(&mut source, 0, haystack.len()) {
            Outcome::Found { start, length } => {
                assert_eq!(start, 1);
                assert_eq!(length, 1);
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    struct AbortImmediately;
    impl Progress for AbortImmediately {
        fn report(&mut self, _current_offset: usize) -> ProgressSignal {
            ProgressSignal::Abort
        }
    }

    #[test]
    fn abort_is_prompt() {
        let mut handle = SearchHandle::new(b"zzz", Charset::Utf8);
        assert!(handle.prepare());
        let haystack = b"a\nb\nc\nzzz\n";
        let mut source = Source::from_slice(haystack);
        let mut progress = AbortImmediately;
        let outcome = handle.run_with_progress(&mut source, 0, haystack.len(), Some(&mut progress));
        assert!(matches!(outcome, Outcome::Aborted));
    }
}

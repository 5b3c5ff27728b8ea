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

//! Pattern Compiler (spec §4.A): one translator per surface dialect, all
//! targeting the canonical regex dialect that `canonical` compiles.

pub mod canonical;
pub mod glob;
pub mod hex;
pub mod literal;

/// The four pattern surface languages a `SearchHandle` can be configured
/// with (spec §3, §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Literal,
    Glob,
    Hex,
    Regex,
}

impl Dialect {
    pub fn tag(&self) -> &'static str {
        match self {
            Dialect::Literal => "literal",
            Dialect::Glob => "glob",
            Dialect::Hex => "hex",
            Dialect::Regex => "regex",
        }
    }

    pub fn human_name(&self) -> &'static str {
        match self {
            Dialect::Literal => "Normal",
            Dialect::Glob => "Wildcard search",
            Dialect::Hex => "Hexadecimal search",
            Dialect::Regex => "Regular expression search",
        }
    }
}

/// The boolean search-behavior flags a handle carries (spec §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub case_sensitive: bool,
    pub whole_words: bool,
    pub entire_line: bool,
    pub all_charsets: bool,
}

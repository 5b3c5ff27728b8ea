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

/// Error kinds and diagnostics for the search engine (spec §7).

/// The coarse error classification exposed through `get_error`.
///
/// `Ok`, `NotFound` and `Aborted` are not carried by `SearchError` itself
/// (they're outcomes of `run`, not failures); this enum exists so callers
/// that inspect `SearchHandle::get_error` after a non-`Found` outcome see a
/// uniform `(kind, message)` pair regardless of how the outcome arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Ok,
    NotFound,
    Aborted,
    InvalidInput,
    CompileError,
    ReplaceError,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// A dialect rejected the pattern before it ever reached the regex
    /// compiler (hex syntax, glob brace mismatch).
    #[error("{message}")]
    InvalidInput { message: String, position: usize },

    /// The canonicalized regex was rejected by the regex engine.
    #[error("{message}")]
    CompileError { message: String },

    /// The replacement template references a capture that doesn't exist,
    /// overflows the capture ceiling, or uses an unrecognized escape.
    #[error("{message}")]
    ReplaceError { message: String, position: usize },
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidInput { .. } => ErrorKind::InvalidInput,
            SearchError::CompileError { .. } => ErrorKind::CompileError,
            SearchError::ReplaceError { .. } => ErrorKind::ReplaceError,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            SearchError::InvalidInput { position, .. } => Some(*position),
            SearchError::ReplaceError { position, .. } => Some(*position),
            SearchError::CompileError { .. } => None,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>, position: usize) -> Self {
        SearchError::InvalidInput {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn compile(message: impl Into<String>) -> Self {
        SearchError::CompileError {
            message: message.into(),
        }
    }

    pub(crate) fn replace(message: impl Into<String>, position: usize) -> Self {
        SearchError::ReplaceError {
            message: message.into(),
            position,
        }
    }
}

// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// Errors raised while building a score or moving a track's cursor.
///
/// None of these are retried. The first two classes reject a malformed score at load time,
/// the last two mean the score or region table was built incorrectly.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown MIDI message type for status byte {0:#04x}")]
    UnknownMessageType(u8),

    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("cannot merge a moment at {other} into a moment at {position}")]
    InconsistentMerge { position: u64, other: u64 },

    #[error("region {0} has no successor")]
    MissingRegionSuccessor(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Error {
        Error::InvalidArgument(message.into())
    }
}

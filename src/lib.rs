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
//! Score-driven MIDI playback: per-track cursors over a pre-computed score, region jumps with
//! controller state kept consistent, and a sequencer that dispatches timed moments to a MIDI
//! output.

pub mod conductor;
pub mod config;
pub mod controls;
pub mod error;
pub mod message;
pub mod midi;
pub mod moment;
pub mod object;
pub mod playsync;
pub mod region;
pub mod score;
pub mod sequencer;
pub mod track;
pub mod util;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};

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

//! Builders shared by the unit tests.

use std::error::Error;

use crate::message::Message;
use crate::moment::Moment;
use crate::object::MidiObject;
use crate::score::TrackScore;

/// Converts region names into an owned performance sequence.
pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Chords on channel 0 every `spacing` ms, each with a note on at its start and the matching
/// note off halfway through.
pub fn simple_objects(count: usize, spacing: u64) -> Result<Vec<MidiObject>, Box<dyn Error>> {
    chords(0, count, spacing)
}

/// A track of `count` half second chords on the given channel.
pub fn simple_track(name: &str, channel: u8, count: usize) -> Result<TrackScore, Box<dyn Error>> {
    Ok(TrackScore::new(name, channel, chords(channel, count, 500)?)?)
}

fn chords(channel: u8, count: usize, spacing: u64) -> Result<Vec<MidiObject>, Box<dyn Error>> {
    (0..count)
        .map(|index| -> Result<MidiObject, Box<dyn Error>> {
            let key = 60 + u8::try_from(index % 60)?;
            Ok(MidiObject::chord(
                index as u64 * spacing,
                spacing,
                vec![
                    Moment::new(0, vec![Message::note_on(channel, key, 100)?]),
                    Moment::new(spacing / 2, vec![Message::note_off(channel, key, 0)?]),
                ],
            )?)
        })
        .collect()
}

/// The absolute positions a track plays, starting with its current moment.
pub fn drain_positions(track: &mut crate::track::Track) -> Vec<u64> {
    let mut positions = Vec::new();
    while track.current_moment().is_some() {
        positions.push(track.current_ms_position());
        track.advance_current_moment();
    }
    positions
}

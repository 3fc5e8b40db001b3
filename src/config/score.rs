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
use std::error::Error;
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;
use tracing::debug;

use crate::message::Message;
use crate::object::MidiObject;
use crate::region::RegionDef;
use crate::score::TrackScore;

use super::error::ConfigError;
use super::midi::{self, Event};

/// A YAML representation of a score.
#[derive(Deserialize)]
pub struct Score {
    /// The name of the score.
    name: String,
    /// The named regions of the score. Defaults to a single region covering everything.
    #[serde(default)]
    regions: Vec<Region>,
    /// The region names to play, in order. Defaults to every region once.
    #[serde(default)]
    performance: Vec<String>,
    /// The tracks of the score.
    tracks: Vec<Track>,
}

impl Score {
    /// Deserializes a file from the path into a score configuration struct.
    pub fn deserialize(path: &Path) -> Result<Score, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Score>()?)
    }

    /// Gets the name of the score.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the playable score.
    pub fn to_score(&self) -> Result<crate::score::Score, Box<dyn Error>> {
        let tracks = self
            .tracks
            .iter()
            .map(|track| track.to_track_score())
            .collect::<Result<Vec<TrackScore>, Box<dyn Error>>>()?;
        let regions = self
            .regions
            .iter()
            .map(|region| RegionDef::new(&region.name, region.start, region.end))
            .collect::<crate::Result<Vec<RegionDef>>>()?;

        debug!(
            score = self.name,
            tracks = tracks.len(),
            regions = regions.len(),
            "Building score."
        );
        Ok(crate::score::Score::new(
            &self.name,
            tracks,
            regions,
            self.performance.clone(),
        )?)
    }
}

/// A named region of the score.
#[derive(Deserialize)]
struct Region {
    name: String,
    /// Where the region starts, in milliseconds.
    start: u64,
    /// Where the region ends, in milliseconds. Exclusive.
    end: u64,
}

/// A YAML representation of a track.
#[derive(Deserialize)]
struct Track {
    /// The name of the track.
    name: String,
    /// The MIDI channel of the track, [1, 16].
    channel: u8,
    /// The chords and rests of the track.
    objects: Vec<Object>,
}

impl Track {
    fn to_track_score(&self) -> Result<TrackScore, Box<dyn Error>> {
        let channel = midi::parse_channel(self.channel)?.as_int();
        let objects = self
            .objects
            .iter()
            .map(|object| object.to_midi_object())
            .collect::<Result<Vec<MidiObject>, Box<dyn Error>>>()
            .map_err(|e| format!("error in track {}: {}", self.name, e))?;
        Ok(TrackScore::new(&self.name, channel, objects)?)
    }
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum Kind {
    Chord,
    Rest,
}

/// A YAML representation of a chord or rest.
#[derive(Deserialize)]
struct Object {
    kind: Kind,
    /// The score position of the object, in milliseconds.
    position: u64,
    /// How long the object lasts, in milliseconds.
    duration: u64,
    #[serde(default)]
    moments: Vec<Moment>,
}

impl Object {
    fn to_midi_object(&self) -> Result<MidiObject, Box<dyn Error>> {
        let moments = self
            .moments
            .iter()
            .map(|moment| moment.to_moment())
            .collect::<Result<Vec<crate::moment::Moment>, Box<dyn Error>>>()?;
        Ok(match self.kind {
            Kind::Chord => MidiObject::chord(self.position, self.duration, moments)?,
            Kind::Rest => MidiObject::rest(self.position, self.duration, moments)?,
        })
    }
}

/// A YAML representation of a group of events sent together.
#[derive(Deserialize)]
struct Moment {
    /// The position relative to the start of the object, in milliseconds.
    position: u64,
    events: Vec<Event>,
}

impl Moment {
    fn to_moment(&self) -> Result<crate::moment::Moment, Box<dyn Error>> {
        let messages = self
            .events
            .iter()
            .map(|event| event.to_message())
            .collect::<Result<Vec<Message>, Box<dyn Error>>>()?;
        Ok(crate::moment::Moment::new(self.position, messages))
    }
}

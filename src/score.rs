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
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::object::MidiObject;
use crate::region::{self, RegionDef};

/// The immutable material of one track: its objects in score order.
#[derive(Clone, Debug)]
pub struct TrackScore {
    name: String,
    /// The output channel, 0-15.
    channel: u8,
    objects: Arc<[MidiObject]>,
}

impl TrackScore {
    /// Creates a track. Objects must be in score order and must not overlap.
    pub fn new(name: &str, channel: u8, objects: Vec<MidiObject>) -> Result<TrackScore> {
        if channel > 15 {
            return Err(Error::invalid(format!(
                "track {} has channel {}, expected 0-15",
                name, channel
            )));
        }
        if let Some(pair) = objects
            .windows(2)
            .find(|pair| pair[1].score_position() < pair[0].end_position())
        {
            return Err(Error::invalid(format!(
                "track {}: object at {} overlaps the object at {}",
                name,
                pair[1].score_position(),
                pair[0].score_position()
            )));
        }

        Ok(TrackScore {
            name: name.to_string(),
            channel,
            objects: objects.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn objects(&self) -> &[MidiObject] {
        &self.objects
    }

    pub(crate) fn shared_objects(&self) -> Arc<[MidiObject]> {
        Arc::clone(&self.objects)
    }

    /// The total number of moments in the track.
    pub fn moment_count(&self) -> usize {
        self.objects
            .iter()
            .map(|object| object.moments().len())
            .sum()
    }

    /// The position just past the last object.
    pub fn end_position(&self) -> u64 {
        self.objects
            .last()
            .map(|object| object.end_position())
            .unwrap_or(0)
    }
}

/// A loaded score: tracks, region definitions and the default region performance sequence.
#[derive(Clone, Debug)]
pub struct Score {
    name: String,
    tracks: Vec<TrackScore>,
    regions: Vec<RegionDef>,
    performance: Vec<String>,
}

impl Score {
    /// Creates a score. When no regions are given, the whole score becomes a single region
    /// named "all". When no performance is given, every region is played once in order.
    pub fn new(
        name: &str,
        tracks: Vec<TrackScore>,
        regions: Vec<RegionDef>,
        performance: Vec<String>,
    ) -> Result<Score> {
        if tracks.is_empty() {
            return Err(Error::invalid(format!("score {} has no tracks", name)));
        }

        let duration = tracks
            .iter()
            .map(|track| track.end_position())
            .max()
            .unwrap_or(0);
        let regions = if regions.is_empty() {
            vec![RegionDef::new("all", 0, duration.max(1))?]
        } else {
            regions
        };

        for (index, region) in regions.iter().enumerate() {
            if regions[..index]
                .iter()
                .any(|other| other.name() == region.name())
            {
                return Err(Error::invalid(format!(
                    "region {} is defined twice",
                    region.name()
                )));
            }
        }

        let performance = if performance.is_empty() {
            regions
                .iter()
                .map(|region| region.name().to_string())
                .collect()
        } else {
            performance
        };
        region::resolve_sequence(&regions, &performance)?;

        Ok(Score {
            name: name.to_string(),
            tracks,
            regions,
            performance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[TrackScore] {
        &self.tracks
    }

    pub fn regions(&self) -> &[RegionDef] {
        &self.regions
    }

    pub fn performance(&self) -> &[String] {
        &self.performance
    }

    /// The end of the latest track.
    pub fn duration(&self) -> u64 {
        self.tracks
            .iter()
            .map(|track| track.end_position())
            .max()
            .unwrap_or(0)
    }

    /// The distinct region start positions in ascending order, always including 0.
    pub fn region_starts(&self) -> Vec<u64> {
        let mut starts = self
            .regions
            .iter()
            .map(|region| region.start())
            .chain([0])
            .collect::<Vec<u64>>();
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Looks up a region definition by name.
    pub fn region(&self, name: &str) -> Option<&RegionDef> {
        self.regions.iter().find(|region| region.name() == name)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Tracks: {}, Regions: {}, Duration: {})",
            self.name,
            self.tracks.len(),
            self.regions.len(),
            crate::util::duration_minutes_seconds(std::time::Duration::from_millis(
                self.duration()
            ))
        )
    }
}

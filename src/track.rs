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
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::controls::ControllerState;
use crate::error::{Error, Result};
use crate::moment::Moment;
use crate::object::MidiObject;
use crate::region::{self, MomentLocation, RegionDef, RegionLinks};
use crate::score::TrackScore;

/// The position reported by a track that has nothing left to play.
pub const ENDED_POSITION: u64 = u64::MAX;

/// Where a track's cursor currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    /// No output span or region has been set yet.
    Idle,
    /// There is a current moment.
    Playing,
    /// The current region is finished and the track waits for the next region.
    RegionBoundary,
    /// There is nothing left to play.
    Ended,
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackState::Idle => write!(f, "idle"),
            TrackState::Playing => write!(f, "playing"),
            TrackState::RegionBoundary => write!(f, "region boundary"),
            TrackState::Ended => write!(f, "ended"),
        }
    }
}

/// The playback cursor over one track of a score.
///
/// The score's objects are shared and never modified. Each track keeps its own cursor table (one
/// moment cursor per object) and its own controller snapshots, so a performance can be rewound
/// or restarted elsewhere without touching the score.
pub struct Track {
    name: String,
    channel: u8,
    objects: Arc<[MidiObject]>,
    /// The moment cursor of every object. None when the object has nothing more to play.
    cursors: Vec<Option<usize>>,
    /// Moments rewritten with a controller snapshot at region and start boundaries.
    backfilled: HashMap<MomentLocation, Moment>,
    region_links: Option<RegionLinks>,
    current_region: usize,
    current_object_index: usize,
    current_moment_index: Option<usize>,
    /// Moments at or after this position are not played.
    end_position: u64,
    entered: bool,
    is_on: bool,
    has_ended_region: bool,
}

impl Track {
    /// Creates an idle track over the given score material.
    pub fn new(score: &TrackScore) -> Track {
        let objects = score.shared_objects();
        Track {
            name: score.name().to_string(),
            channel: score.channel(),
            cursors: vec![None; objects.len()],
            objects,
            backfilled: HashMap::new(),
            region_links: None,
            current_region: 0,
            current_object_index: 0,
            current_moment_index: None,
            end_position: ENDED_POSITION,
            entered: false,
            is_on: true,
            has_ended_region: false,
        }
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

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn set_on(&mut self, is_on: bool) {
        self.is_on = is_on;
    }

    pub fn has_ended_region(&self) -> bool {
        self.has_ended_region
    }

    /// The index of the region being performed.
    pub fn current_region(&self) -> usize {
        self.current_region
    }

    pub fn region_links(&self) -> Option<&RegionLinks> {
        self.region_links.as_ref()
    }

    pub fn current_object_index(&self) -> usize {
        self.current_object_index
    }

    /// The moment cursor of the given object.
    pub fn object_cursor(&self, object_index: usize) -> Option<usize> {
        self.cursors.get(object_index).copied().flatten()
    }

    pub fn state(&self) -> TrackState {
        if !self.entered {
            TrackState::Idle
        } else if self.has_ended_region {
            TrackState::RegionBoundary
        } else if self.current_moment_index.is_some()
            && self.current_object_index < self.objects.len()
        {
            TrackState::Playing
        } else {
            TrackState::Ended
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == TrackState::Playing
    }

    /// The location of the current moment, if there is one.
    pub fn current_location(&self) -> Option<MomentLocation> {
        if self.state() != TrackState::Playing {
            return None;
        }
        self.current_moment_index.map(|moment_index| MomentLocation {
            object_index: self.current_object_index,
            moment_index,
        })
    }

    /// The moment that will be played next, including any controller snapshot written into it.
    pub fn current_moment(&self) -> Option<&Moment> {
        self.current_location()
            .and_then(|location| self.effective_moment(location))
    }

    /// The moment at the given location as it will be played.
    pub fn effective_moment(&self, location: MomentLocation) -> Option<&Moment> {
        self.backfilled.get(&location).or_else(|| {
            self.objects
                .get(location.object_index)
                .and_then(|object| object.moments().get(location.moment_index))
        })
    }

    /// The score position of the current moment. Tracks that have nothing left to play report
    /// [ENDED_POSITION].
    pub fn current_ms_position(&self) -> u64 {
        if self.state() == TrackState::Ended {
            return ENDED_POSITION;
        }

        match self.objects.get(self.current_object_index) {
            Some(object) => match self
                .current_moment_index
                .and_then(|index| object.moments().get(index))
            {
                Some(moment) => object.score_position() + moment.relative_position(),
                None => object.score_position(),
            },
            None => ENDED_POSITION,
        }
    }

    /// Positions the track to play the moments in [start, end) and writes the controller state
    /// that is in effect at each boundary into the first moment at or after it.
    ///
    /// The boundaries are the given region starts, 0 and the start position itself. The
    /// controller state is always accumulated from the start of the track, so the track sounds
    /// right wherever playback begins. Installing an output span leaves region playback.
    pub fn set_output_span(&mut self, start: u64, end: u64, region_starts: &[u64]) -> Result<()> {
        if start >= end {
            return Err(Error::invalid(format!(
                "output span starts at {} but ends at {}",
                start, end
            )));
        }

        self.region_links = None;
        self.current_region = 0;
        self.end_position = end;
        self.entered = true;
        self.cursors.iter_mut().for_each(|cursor| *cursor = None);

        let mut entry: Option<MomentLocation> = None;
        for (object_index, object) in self.objects.iter().enumerate() {
            if object.score_position() >= end {
                break;
            }
            if object.end_position() <= start {
                continue;
            }

            if entry.is_some() {
                self.cursors[object_index] = object.start_cursor();
                continue;
            }

            // The first object reached either straddles the start or begins at or after it.
            let cursor = if object.score_position() < start {
                object.first_moment_at_or_after(start)
            } else {
                object.start_cursor()
            };
            self.cursors[object_index] = cursor;
            entry = cursor.map(|moment_index| MomentLocation {
                object_index,
                moment_index,
            });
        }

        self.backfill(start, end, region_starts);
        self.settle(entry);

        info!(
            track = self.name,
            start,
            end,
            state = %self.state(),
            position = self.current_ms_position(),
            "Set output span."
        );
        Ok(())
    }

    fn backfill(&mut self, start: u64, end: u64, region_starts: &[u64]) {
        self.backfilled.clear();

        let mut boundaries = region_starts
            .iter()
            .copied()
            .chain([0, start])
            .filter(|boundary| *boundary < end)
            .collect::<Vec<u64>>();
        boundaries.sort_unstable();
        boundaries.dedup();
        let mut boundaries = boundaries.into_iter().peekable();

        let mut state = ControllerState::new(self.channel);
        'objects: for (object_index, object) in self.objects.iter().enumerate() {
            for (moment_index, moment) in object.moments().iter().enumerate() {
                let position = object.score_position() + moment.relative_position();
                if position >= end {
                    break 'objects;
                }

                state.update_from(moment);

                let mut crossed = false;
                while boundaries.next_if(|boundary| *boundary <= position).is_some() {
                    crossed = true;
                }
                if crossed {
                    let mut snapshot = moment.clone();
                    state.update(&mut snapshot);
                    self.backfilled.insert(
                        MomentLocation {
                            object_index,
                            moment_index,
                        },
                        snapshot,
                    );
                }
            }
        }

        debug!(
            track = self.name,
            snapshots = self.backfilled.len(),
            "Backfilled controller state."
        );
    }

    /// Builds the region links for the given performance sequence. The track is positioned at
    /// the first region by [Track::set_to_first_region].
    pub fn set_region_links(&mut self, defs: &[RegionDef], sequence: &[String]) -> Result<()> {
        let links = region::build_region_links(&self.objects, defs, sequence)?;
        debug!(track = self.name, regions = links.len(), "Set region links.");
        self.region_links = Some(links);
        self.current_region = 0;
        Ok(())
    }

    /// Moves to the next moment. Returns the new current moment, or None if the track has
    /// reached the end of its region or of its output span.
    pub fn advance_current_moment(&mut self) -> Option<&Moment> {
        let location = self.current_location()?;

        let object = &self.objects[location.object_index];
        let next_moment_index = location.moment_index + 1;
        let candidate = if next_moment_index < object.moments().len() {
            self.cursors[location.object_index] = Some(next_moment_index);
            Some(MomentLocation {
                object_index: location.object_index,
                moment_index: next_moment_index,
            })
        } else {
            self.cursors[location.object_index] = None;
            self.next_object_location(location.object_index + 1)
        };

        self.settle(candidate);
        self.current_moment()
    }

    /// The start of the first object from the given index that still has something to play.
    fn next_object_location(&self, from: usize) -> Option<MomentLocation> {
        let limit = self.play_limit();
        for (object_index, object) in self.objects.iter().enumerate().skip(from) {
            if object.score_position() >= limit {
                return None;
            }
            if let Some(moment_index) = self.cursors[object_index] {
                return Some(MomentLocation {
                    object_index,
                    moment_index,
                });
            }
        }
        None
    }

    /// Makes the candidate the current moment if it lies before the play limit. Otherwise the
    /// track waits at the region boundary when another region follows, or ends.
    fn settle(&mut self, candidate: Option<MomentLocation>) {
        let limit = self.play_limit();
        let playable = candidate.filter(|location| {
            self.objects
                .get(location.object_index)
                .and_then(|object| object.moment_position(location.moment_index))
                .is_some_and(|position| position < limit)
        });

        match playable {
            Some(location) => {
                self.current_object_index = location.object_index;
                self.current_moment_index = Some(location.moment_index);
                self.has_ended_region = false;
            }
            None => {
                self.current_moment_index = None;
                if self.has_successor() {
                    self.has_ended_region = true;
                    self.current_object_index = candidate
                        .map(|location| location.object_index)
                        .unwrap_or(self.objects.len());
                    debug!(
                        track = self.name,
                        region = self.current_region,
                        "Reached the end of the region."
                    );
                } else {
                    self.has_ended_region = false;
                    self.current_object_index = self.objects.len();
                    debug!(track = self.name, "Reached the end of the track.");
                }
            }
        }
    }

    /// Moments at or after this position are not played in the current region.
    fn play_limit(&self) -> u64 {
        match self
            .region_links
            .as_ref()
            .and_then(|links| links.get(self.current_region))
        {
            Some(link) => link.end_of_region_position.min(self.end_position),
            None => self.end_position,
        }
    }

    fn has_successor(&self) -> bool {
        self.region_links
            .as_ref()
            .and_then(|links| links.get(self.current_region))
            .and_then(|link| link.next_location())
            .is_some()
    }

    /// Jumps to the start of the region that follows the given one in the performance.
    ///
    /// The objects of the new region are reset to play from their start. Objects before the
    /// jump target are left alone.
    pub fn move_to_next_region(&mut self, region_index: usize) -> Result<()> {
        let links = self
            .region_links
            .as_ref()
            .ok_or_else(|| Error::invalid(format!("track {} has no region links", self.name)))?;
        let link = links.get(region_index).ok_or_else(|| {
            Error::invalid(format!(
                "track {} has no region link {}",
                self.name, region_index
            ))
        })?;
        let location = link
            .next_location()
            .ok_or(Error::MissingRegionSuccessor(region_index))?;
        let next_end = links
            .get(region_index + 1)
            .map(|next| next.end_of_region_position)
            .ok_or(Error::MissingRegionSuccessor(region_index))?;
        let object_count = link.object_count_in_region;

        if location.object_index < self.objects.len() {
            self.cursors[location.object_index] = Some(location.moment_index);
            for object_index in location.object_index + 1..self.objects.len() {
                let object = &self.objects[object_index];
                if object.score_position() >= next_end {
                    break;
                }
                self.cursors[object_index] = object.start_cursor();
            }
        }

        self.current_region = region_index + 1;
        self.entered = true;
        self.settle(Some(location));

        info!(
            track = self.name,
            region = self.current_region,
            object = location.object_index,
            moment = location.moment_index,
            object_count,
            state = %self.state(),
            "Moved to next region."
        );
        Ok(())
    }

    /// Rewinds the track to the start of the first region of the performance.
    pub fn set_to_first_region(&mut self) -> Result<()> {
        let links = self
            .region_links
            .as_ref()
            .ok_or_else(|| Error::invalid(format!("track {} has no region links", self.name)))?;
        let first = links.first();
        let first_end = links
            .get(0)
            .map(|link| link.end_of_region_position)
            .ok_or_else(|| Error::invalid(format!("track {} has no regions", self.name)))?;

        for (object_index, object) in self.objects.iter().enumerate() {
            if object.score_position() >= first_end {
                break;
            }
            self.cursors[object_index] = object.start_cursor();
        }
        if first.object_index < self.objects.len() {
            self.cursors[first.object_index] = Some(first.moment_index);
        }

        self.current_region = 0;
        self.entered = true;
        self.settle(Some(first));

        info!(
            track = self.name,
            state = %self.state(),
            position = self.current_ms_position(),
            "Set to first region."
        );
        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channel: {}, Objects: {}, State: {})",
            self.name,
            self.channel + 1,
            self.objects.len(),
            self.state()
        )
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::message::Message;
    use crate::moment::Moment;
    use crate::object::MidiObject;
    use crate::region::{MomentLocation, RegionDef};
    use crate::score::TrackScore;
    use crate::testutil::{drain_positions, names, simple_track};

    use super::{Track, TrackState, ENDED_POSITION};

    #[test]
    fn idle_until_positioned() -> Result<(), Box<dyn Error>> {
        let mut track = Track::new(&simple_track("piano", 0, 2)?);
        assert_eq!(TrackState::Idle, track.state());
        assert!(track.current_moment().is_none());
        assert!(track.advance_current_moment().is_none());
        assert!(track.set_output_span(100, 100, &[0]).is_err());
        assert!(track.move_to_next_region(0).is_err());
        assert!(track.set_to_first_region().is_err());
        Ok(())
    }

    #[test]
    fn advancing_through_every_moment_ends_the_track() -> Result<(), Box<dyn Error>> {
        let score = simple_track("piano", 0, 3)?;
        let mut track = Track::new(&score);
        track.set_output_span(0, ENDED_POSITION, &[0])?;
        assert_eq!(TrackState::Playing, track.state());

        let mut positions = vec![track.current_ms_position()];
        for _ in 0..score.moment_count() - 1 {
            assert!(track.advance_current_moment().is_some());
            positions.push(track.current_ms_position());
        }
        assert_eq!(vec![0, 250, 500, 750, 1000, 1250], positions);

        assert!(track.advance_current_moment().is_none());
        assert_eq!(TrackState::Ended, track.state());
        assert_eq!(ENDED_POSITION, track.current_ms_position());
        assert_eq!(3, track.current_object_index());
        Ok(())
    }

    #[test]
    fn start_inside_an_object() -> Result<(), Box<dyn Error>> {
        let mut track = Track::new(&simple_track("piano", 0, 3)?);
        track.set_output_span(600, 1500, &[0])?;

        assert_eq!(
            Some(MomentLocation {
                object_index: 1,
                moment_index: 1
            }),
            track.current_location()
        );
        assert_eq!(vec![750, 1000, 1250], drain_positions(&mut track));
        Ok(())
    }

    #[test]
    fn end_of_span_stops_playback() -> Result<(), Box<dyn Error>> {
        let mut track = Track::new(&simple_track("piano", 0, 4)?);
        track.set_output_span(0, 1000, &[0])?;

        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        assert_eq!(TrackState::Ended, track.state());
        Ok(())
    }

    #[test]
    fn span_after_the_last_moment() -> Result<(), Box<dyn Error>> {
        let mut track = Track::new(&simple_track("piano", 0, 2)?);
        track.set_output_span(800, 5000, &[0])?;

        assert_eq!(TrackState::Ended, track.state());
        assert_eq!(ENDED_POSITION, track.current_ms_position());
        Ok(())
    }

    #[test]
    fn empty_rests_are_skipped() -> Result<(), Box<dyn Error>> {
        let score = TrackScore::new(
            "sparse",
            0,
            vec![
                MidiObject::chord(0, 500, vec![Moment::new(0, vec![Message::note_on(0, 60, 90)?])])?,
                MidiObject::rest(500, 500, vec![])?,
                MidiObject::rest(
                    1000,
                    500,
                    vec![Moment::new(100, vec![Message::control_change(0, 7, 30)?])],
                )?,
                MidiObject::chord(1500, 500, vec![Moment::new(0, vec![Message::note_on(0, 62, 90)?])])?,
            ],
        )?;
        let mut track = Track::new(&score);
        track.set_output_span(0, 2000, &[])?;

        assert_eq!(vec![0, 1100, 1500], drain_positions(&mut track));
        Ok(())
    }

    #[test]
    fn rest_at_the_start_position() -> Result<(), Box<dyn Error>> {
        let score = TrackScore::new(
            "rests",
            0,
            vec![
                MidiObject::rest(0, 500, vec![])?,
                MidiObject::chord(500, 500, vec![Moment::new(0, vec![Message::note_on(0, 60, 90)?])])?,
            ],
        )?;
        let mut track = Track::new(&score);
        track.set_output_span(0, 1000, &[])?;

        assert_eq!(500, track.current_ms_position());
        assert_eq!(1, track.current_object_index());
        Ok(())
    }

    fn controller_track() -> Result<TrackScore, Box<dyn Error>> {
        let note = |key: u8| Message::note_on(0, key, 100);
        Ok(TrackScore::new(
            "controls",
            0,
            vec![
                MidiObject::chord(
                    0,
                    500,
                    vec![Moment::new(
                        0,
                        vec![
                            Message::program_change(0, 5)?,
                            Message::control_change(0, 7, 100)?,
                            note(60)?,
                        ],
                    )],
                )?,
                MidiObject::rest(
                    500,
                    500,
                    vec![Moment::new(0, vec![Message::control_change(0, 10, 20)?])],
                )?,
                MidiObject::chord(
                    1000,
                    500,
                    vec![
                        Moment::new(0, vec![note(62)?]),
                        Moment::new(
                            250,
                            vec![
                                Message::control_change(0, 7, 80)?,
                                Message::pitch_wheel(0, 0, 0x50)?,
                            ],
                        ),
                    ],
                )?,
                MidiObject::chord(1500, 500, vec![Moment::new(0, vec![note(64)?])])?,
                MidiObject::chord(2000, 500, vec![Moment::new(0, vec![note(65)?])])?,
                MidiObject::chord(
                    2500,
                    500,
                    vec![Moment::new(
                        0,
                        vec![Message::program_change(0, 9)?, note(67)?],
                    )],
                )?,
            ],
        )?)
    }

    #[test]
    fn backfill_at_start_position() -> Result<(), Box<dyn Error>> {
        let score = controller_track()?;
        let mut track = Track::new(&score);
        track.set_output_span(1500, 3000, &[0, 1000, 2500])?;

        assert_eq!(1500, track.current_ms_position());
        assert_eq!(
            vec![
                Message::program_change(0, 5)?,
                Message::pitch_wheel(0, 0, 0x50)?,
                Message::control_change(0, 7, 80)?,
                Message::control_change(0, 10, 20)?,
                Message::note_on(0, 64, 100)?,
            ],
            track.current_moment().map(|moment| moment.messages().to_vec()).unwrap_or_default()
        );

        // The score itself is untouched.
        assert_eq!(
            &[Message::note_on(0, 64, 100)?],
            score.objects()[3].moments()[0].messages()
        );
        Ok(())
    }

    #[test]
    fn backfill_at_region_starts() -> Result<(), Box<dyn Error>> {
        let mut track = Track::new(&controller_track()?);
        track.set_output_span(1500, 3000, &[0, 1000, 2500])?;

        let at_region_two = track
            .effective_moment(MomentLocation {
                object_index: 2,
                moment_index: 0,
            })
            .map(|moment| moment.messages().to_vec())
            .unwrap_or_default();
        assert_eq!(
            vec![
                Message::program_change(0, 5)?,
                Message::pitch_wheel(0, 0, 0x40)?,
                Message::control_change(0, 7, 100)?,
                Message::control_change(0, 10, 20)?,
                Message::note_on(0, 62, 100)?,
            ],
            at_region_two
        );

        // A boundary moment keeps its own controller messages.
        let at_region_three = track
            .effective_moment(MomentLocation {
                object_index: 5,
                moment_index: 0,
            })
            .map(|moment| moment.messages().to_vec())
            .unwrap_or_default();
        assert_eq!(Message::program_change(0, 9)?, at_region_three[0]);
        assert_eq!(Message::note_on(0, 67, 100)?, at_region_three[4]);

        // Moments between boundaries are played as written.
        let between = track
            .effective_moment(MomentLocation {
                object_index: 4,
                moment_index: 0,
            })
            .map(|moment| moment.messages().to_vec())
            .unwrap_or_default();
        assert_eq!(vec![Message::note_on(0, 65, 100)?], between);
        Ok(())
    }

    fn region_track(count: usize) -> Result<Track, Box<dyn Error>> {
        let mut track = Track::new(&simple_track("piano", 0, count)?);
        let defs = vec![RegionDef::new("a", 0, 1000)?, RegionDef::new("b", 1000, 2000)?];
        track.set_output_span(0, 2000, &[0, 1000])?;
        track.set_region_links(&defs, &names(&["a", "b", "a"]))?;
        track.set_to_first_region()?;
        Ok(track)
    }

    #[test]
    fn regions_wait_at_the_boundary() -> Result<(), Box<dyn Error>> {
        let mut track = region_track(4)?;

        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        assert_eq!(TrackState::RegionBoundary, track.state());
        assert!(track.has_ended_region());
        assert!(track.advance_current_moment().is_none());
        Ok(())
    }

    #[test]
    fn move_to_next_region_jumps_to_the_link() -> Result<(), Box<dyn Error>> {
        let mut track = region_track(4)?;
        drain_positions(&mut track);

        let link = track
            .region_links()
            .and_then(|links| links.get(0))
            .cloned()
            .ok_or("missing link")?;
        track.move_to_next_region(0)?;
        assert_eq!(1, track.current_region());
        assert_eq!(link.next_location(), track.current_location());

        assert_eq!(vec![1000, 1250, 1500, 1750], drain_positions(&mut track));
        assert_eq!(TrackState::RegionBoundary, track.state());

        // The performance repeats the first region.
        track.move_to_next_region(1)?;
        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        assert_eq!(TrackState::Ended, track.state());
        assert_eq!(ENDED_POSITION, track.current_ms_position());

        assert_eq!(
            Err(crate::Error::MissingRegionSuccessor(2)),
            track.move_to_next_region(2)
        );
        Ok(())
    }

    #[test]
    fn region_without_material_on_this_track() -> Result<(), Box<dyn Error>> {
        // Only the first region has material.
        let mut track = region_track(2)?;

        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        track.move_to_next_region(0)?;
        assert_eq!(TrackState::RegionBoundary, track.state());
        assert!(track.current_moment().is_none());

        track.move_to_next_region(1)?;
        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        assert_eq!(TrackState::Ended, track.state());
        Ok(())
    }

    #[test]
    fn set_to_first_region_rewinds() -> Result<(), Box<dyn Error>> {
        let mut track = region_track(4)?;
        drain_positions(&mut track);
        track.move_to_next_region(0)?;
        track.advance_current_moment();

        track.set_to_first_region()?;
        assert_eq!(0, track.current_region());
        assert_eq!(TrackState::Playing, track.state());
        assert_eq!(vec![0, 250, 500, 750], drain_positions(&mut track));
        Ok(())
    }

    #[test]
    fn output_span_leaves_region_playback() -> Result<(), Box<dyn Error>> {
        let mut track = region_track(4)?;
        track.set_output_span(0, 2000, &[0, 1000])?;

        assert!(track.region_links().is_none());
        assert_eq!(
            vec![0, 250, 500, 750, 1000, 1250, 1500, 1750],
            drain_positions(&mut track)
        );
        Ok(())
    }

    #[test]
    fn display() -> Result<(), Box<dyn Error>> {
        let track = Track::new(&simple_track("piano", 2, 2)?);
        assert_eq!("piano (Channel: 3, Objects: 2, State: idle)", track.to_string());
        Ok(())
    }
}

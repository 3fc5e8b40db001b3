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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, span, warn, Level};

use crate::conductor::Conductor;
use crate::error::Result;
use crate::midi;
use crate::moment::Moment;
use crate::playsync::{StopHandle, StopMode};
use crate::region::{self, RegionDef};
use crate::score::Score;
use crate::track::Track;

/// The longest the sequencer sleeps before checking for a stop request or a clock change.
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(50);

/// How often a conducted performance looks at the conductor while waiting.
const CONDUCTED_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// The performance clock the sequencer schedules against.
pub trait Clock: Send + Sync {
    /// The current performance time.
    fn now(&self) -> Duration;

    /// How long to sleep in real time before looking at the clock again, given how much
    /// performance time remains until the next moment.
    fn sleep_hint(&self, remaining: Duration) -> Duration;

    /// Called when the sequencer starts dispatching from a segment of the score: at the start of
    /// every play call and after every region jump. Performance time carries on across the call.
    fn enter_segment(&self, _segment: Segment) {}

    /// Called after the performance is rewound. Performance time returns to the segment origin.
    fn restart(&self, _segment: Segment) {}
}

/// A stretch of the performance that plays the score without jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// The score position the segment starts at.
    pub start: u64,
    /// The performance time at which the segment starts.
    pub origin_ms: u64,
}

impl Segment {
    /// Converts a score position inside this segment into performance time. Positions before
    /// the segment start give a time before the origin.
    fn performance_ms(&self, score_position: f64) -> f64 {
        self.origin_ms as f64 + score_position - self.start as f64
    }

    /// Converts performance time into the score position inside this segment.
    fn score_position(&self, performance_ms: f64) -> f64 {
        self.start as f64 + performance_ms - self.origin_ms as f64
    }
}

/// A clock that follows the host clock, scaled by a speed ratio.
pub struct WallClock {
    origin: Instant,
    offset: Duration,
    speed: f64,
}

impl WallClock {
    /// Starts a clock at performance time zero.
    pub fn new(speed: f64) -> WallClock {
        WallClock::starting_at(Duration::ZERO, speed)
    }

    /// Starts a clock at the given performance time, for resuming a paused performance.
    pub fn starting_at(offset: Duration, speed: f64) -> WallClock {
        WallClock {
            origin: Instant::now(),
            offset,
            speed: if speed.is_finite() && speed > 0.0 {
                speed
            } else {
                1.0
            },
        }
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.offset + self.origin.elapsed().mul_f64(self.speed)
    }

    fn sleep_hint(&self, remaining: Duration) -> Duration {
        remaining.div_f64(self.speed)
    }
}

/// A clock driven by a conductor's time pointer. The pointer marks a score position; the clock
/// maps it into performance time through the segment being played. On a region jump the pointer
/// is moved to the score position that keeps performance time where it was.
pub struct ConductedClock {
    conductor: Arc<Mutex<Conductor>>,
    segment: Mutex<Option<Segment>>,
}

impl ConductedClock {
    pub fn new(conductor: Arc<Mutex<Conductor>>) -> ConductedClock {
        ConductedClock {
            conductor,
            segment: Mutex::new(None),
        }
    }

    fn performance_ms(&self, pointer: f64) -> f64 {
        match *self.segment.lock() {
            Some(segment) => segment.performance_ms(pointer),
            None => pointer,
        }
    }
}

impl Clock for ConductedClock {
    fn now(&self) -> Duration {
        let pointer = self.conductor.lock().now().unwrap_or(0.0);
        Duration::from_secs_f64(self.performance_ms(pointer).max(0.0) / 1000.0)
    }

    fn sleep_hint(&self, _remaining: Duration) -> Duration {
        CONDUCTED_POLL_INTERVAL
    }

    fn enter_segment(&self, segment: Segment) {
        let mut conductor = self.conductor.lock();
        if let Some(pointer) = conductor.now() {
            let performance_ms = self.performance_ms(pointer);
            conductor.seek(segment.score_position(performance_ms));
        }
        *self.segment.lock() = Some(segment);
        debug!(
            start = segment.start,
            origin_ms = segment.origin_ms,
            pointer = conductor.now(),
            "Conducted clock entered segment."
        );
    }

    fn restart(&self, segment: Segment) {
        let mut conductor = self.conductor.lock();
        conductor.seek(segment.start as f64);
        *self.segment.lock() = Some(segment);
    }
}

/// A clock that only moves when the sequencer waits on it. Every moment is dispatched exactly
/// at its performance time, as fast as possible.
#[derive(Default)]
pub struct ImmediateClock {
    now_micros: AtomicU64,
}

impl Clock for ImmediateClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.now_micros.load(Ordering::Relaxed))
    }

    fn sleep_hint(&self, remaining: Duration) -> Duration {
        let remaining = u64::try_from(remaining.as_micros()).unwrap_or(u64::MAX);
        self.now_micros.fetch_add(remaining, Ordering::Relaxed);
        Duration::ZERO
    }

    fn restart(&self, segment: Segment) {
        self.now_micros
            .store(segment.origin_ms.saturating_mul(1000), Ordering::Relaxed);
    }
}

/// A moment taken from a track, ready to be dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledMoment {
    /// The index of the track the moment came from.
    pub track: usize,
    /// The absolute score position of the moment.
    pub score_position: u64,
    /// When the moment is due, measured from the start of the performance.
    pub performance_ms: u64,
    /// A copy of the moment. The sequencer stamps it right before handing it to the device.
    pub moment: Moment,
}

enum Mode {
    Span { start: u64, end: u64 },
    Regions { regions: Vec<RegionDef> },
}

/// The tracks of one performance of a score, stepped together.
pub struct Performance {
    tracks: Vec<Track>,
    mode: Mode,
    region_starts: Vec<u64>,
    /// The index into the region sequence being played.
    current_region: usize,
    /// The score position where the current segment of the performance begins.
    segment_start: u64,
    /// The performance time at which the current segment begins.
    segment_origin_ms: u64,
    /// A moment that was taken but not dispatched before a pause.
    pending: Option<ScheduledMoment>,
}

impl Performance {
    /// Plays the score from `start` up to `end`.
    pub fn span(score: &Score, start: u64, end: u64) -> Result<Performance> {
        let region_starts = score.region_starts();
        let tracks = score
            .tracks()
            .iter()
            .map(|track_score| -> Result<Track> {
                let mut track = Track::new(track_score);
                track.set_output_span(start, end, &region_starts)?;
                Ok(track)
            })
            .collect::<Result<Vec<Track>>>()?;

        info!(score = score.name(), start, end, "Prepared span performance.");
        Ok(Performance {
            tracks,
            mode: Mode::Span { start, end },
            region_starts,
            current_region: 0,
            segment_start: start,
            segment_origin_ms: 0,
            pending: None,
        })
    }

    /// Plays the given sequence of region names. Regions may repeat.
    pub fn regions(score: &Score, sequence: &[String]) -> Result<Performance> {
        let regions = region::resolve_sequence(score.regions(), sequence)?
            .into_iter()
            .cloned()
            .collect::<Vec<RegionDef>>();
        let start = regions.first().map(|region| region.start()).unwrap_or(0);
        let region_starts = score.region_starts();

        let tracks = score
            .tracks()
            .iter()
            .map(|track_score| -> Result<Track> {
                let mut track = Track::new(track_score);
                track.set_output_span(start, u64::MAX, &region_starts)?;
                track.set_region_links(score.regions(), sequence)?;
                track.set_to_first_region()?;
                Ok(track)
            })
            .collect::<Result<Vec<Track>>>()?;

        info!(
            score = score.name(),
            regions = sequence.join(", "),
            "Prepared region performance."
        );
        Ok(Performance {
            tracks,
            mode: Mode::Regions { regions },
            region_starts,
            current_region: 0,
            segment_start: start,
            segment_origin_ms: 0,
            pending: None,
        })
    }

    /// Plays the score's default region sequence.
    pub fn from_score(score: &Score) -> Result<Performance> {
        Performance::regions(score, score.performance())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The index into the region sequence being played.
    pub fn current_region(&self) -> usize {
        self.current_region
    }

    /// The segment being played.
    pub fn segment(&self) -> Segment {
        Segment {
            start: self.segment_start,
            origin_ms: self.segment_origin_ms,
        }
    }

    /// Turns a track on or off. Off tracks keep moving with the performance but are not played.
    pub fn set_track_on(&mut self, index: usize, is_on: bool) -> Result<()> {
        let track = self.tracks.get_mut(index).ok_or_else(|| {
            crate::Error::InvalidArgument(format!("there is no track {}", index))
        })?;
        track.set_on(is_on);
        Ok(())
    }

    /// The performance length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        match &self.mode {
            Mode::Span { start, end } => {
                let last = self
                    .tracks
                    .iter()
                    .map(|track| {
                        track
                            .objects()
                            .last()
                            .map(|object| object.end_position())
                            .unwrap_or(0)
                    })
                    .max()
                    .unwrap_or(0);
                (*end).min(last).saturating_sub(*start)
            }
            Mode::Regions { regions } => regions
                .iter()
                .map(|region| region.end() - region.start())
                .sum(),
        }
    }

    /// Takes the next moment across all playing tracks: the earliest one, the lowest track index
    /// on a tie. Moments of off tracks are passed over. When every track has finished the
    /// current region, all tracks move to the next region together.
    pub fn next_moment(&mut self) -> Result<Option<ScheduledMoment>> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        loop {
            let next = self
                .tracks
                .iter()
                .enumerate()
                .filter(|(_, track)| track.is_playing())
                .min_by_key(|(_, track)| track.current_ms_position())
                .map(|(index, _)| index);

            let index = match next {
                Some(index) => index,
                None => {
                    if self.advance_region()? {
                        continue;
                    }
                    return Ok(None);
                }
            };

            let track = &mut self.tracks[index];
            if !track.is_on() {
                track.advance_current_moment();
                continue;
            }
            let score_position = track.current_ms_position();
            let moment = match track.current_moment() {
                Some(moment) => moment.clone(),
                None => return Ok(None),
            };
            track.advance_current_moment();

            let performance_ms =
                self.segment_origin_ms + score_position.saturating_sub(self.segment_start);
            return Ok(Some(ScheduledMoment {
                track: index,
                score_position,
                performance_ms,
                moment,
            }));
        }
    }

    /// Puts back a moment that was taken but not dispatched.
    pub fn push_back(&mut self, scheduled: ScheduledMoment) {
        self.pending = Some(scheduled);
    }

    /// Moves every track to the next region. Returns false if the sequence is finished.
    fn advance_region(&mut self) -> Result<bool> {
        let regions = match &self.mode {
            Mode::Regions { regions } => regions,
            Mode::Span { .. } => return Ok(false),
        };
        let (current, next) = match (
            regions.get(self.current_region),
            regions.get(self.current_region + 1),
        ) {
            (Some(current), Some(next)) => (current, next),
            _ => return Ok(false),
        };

        self.segment_origin_ms += current.end().saturating_sub(self.segment_start);
        self.segment_start = next.start();
        let next_name = next.name().to_string();

        // Every track changes region at the same point of the performance.
        for track in self.tracks.iter_mut() {
            track.move_to_next_region(self.current_region)?;
        }
        self.current_region += 1;

        info!(
            region = next_name,
            index = self.current_region,
            performance_ms = self.segment_origin_ms,
            "Moved to next region."
        );
        Ok(true)
    }

    /// Rewinds the performance to its start.
    pub fn rewind(&mut self) -> Result<()> {
        self.pending = None;
        self.current_region = 0;
        self.segment_origin_ms = 0;

        match &self.mode {
            Mode::Span { start, end } => {
                self.segment_start = *start;
                for track in self.tracks.iter_mut() {
                    track.set_output_span(*start, *end, &self.region_starts)?;
                }
            }
            Mode::Regions { regions } => {
                self.segment_start = regions.first().map(|region| region.start()).unwrap_or(0);
                for track in self.tracks.iter_mut() {
                    track.set_to_first_region()?;
                }
            }
        }

        debug!("Rewound performance.");
        Ok(())
    }
}

/// How a call to [Sequencer::play] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every moment was dispatched.
    Finished,
    /// A stop was requested.
    Stopped(StopMode),
}

/// Dispatches a performance's moments to a MIDI device at the right time.
pub struct Sequencer {
    playback_delay: Duration,
}

impl Sequencer {
    pub fn new(playback_delay: Duration) -> Sequencer {
        Sequencer { playback_delay }
    }

    /// Plays the performance until it finishes or the stop handle is triggered. A paused
    /// performance can be passed to play again to continue where it left off.
    pub fn play(
        &self,
        performance: &mut Performance,
        device: &dyn midi::Device,
        clock: &dyn Clock,
        stop_handle: &StopHandle,
    ) -> std::result::Result<PlayOutcome, Box<dyn Error>> {
        let span = span!(Level::INFO, "play performance");
        let _enter = span.enter();

        info!(
            device = device.name(),
            duration_ms = performance.duration_ms(),
            "Playing performance."
        );

        if !self.playback_delay.is_zero() && stop_handle.wait_for(self.playback_delay) {
            return self.stopped(performance, clock, stop_handle);
        }

        let mut dispatched = 0usize;
        let mut segment = None;
        while let Some(mut scheduled) = performance.next_moment()? {
            let current = performance.segment();
            if segment != Some(current) {
                clock.enter_segment(current);
                segment = Some(current);
            }

            let due = Duration::from_millis(scheduled.performance_ms);
            loop {
                let now = clock.now();
                if now >= due {
                    break;
                }
                let sleep = clock.sleep_hint(due - now).min(MAX_SLEEP_SLICE);
                if stop_handle.wait_for(sleep) {
                    break;
                }
            }
            if stop_handle.is_stopped() {
                performance.push_back(scheduled);
                return self.stopped(performance, clock, stop_handle);
            }

            scheduled.moment.set_timestamp(clock.now());
            debug!(
                track = scheduled.track,
                score_position = scheduled.score_position,
                performance_ms = scheduled.performance_ms,
                messages = scheduled.moment.messages().len(),
                "Dispatching moment."
            );
            device.emit(&scheduled.moment)?;
            dispatched += 1;
        }

        info!(dispatched, "Performance finished.");
        Ok(PlayOutcome::Finished)
    }

    fn stopped(
        &self,
        performance: &mut Performance,
        clock: &dyn Clock,
        stop_handle: &StopHandle,
    ) -> std::result::Result<PlayOutcome, Box<dyn Error>> {
        let mode = stop_handle.stop_mode().unwrap_or(StopMode::Pause);
        if mode == StopMode::Reset {
            performance.rewind()?;
            clock.restart(performance.segment());
        }
        warn!(mode = ?mode, "Performance stopped.");
        Ok(PlayOutcome::Stopped(mode))
    }
}

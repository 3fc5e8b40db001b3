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
use tracing::debug;

use crate::error::{Error, Result};

/// A pointer position in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> PointerSample {
        PointerSample { x, y }
    }

    fn distance(&self, other: &PointerSample) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Something that marks the current performance position and can be moved forward.
pub trait TimePointer: Send {
    /// Moves the pointer forward by the given number of milliseconds.
    fn advance(&mut self, ms: f64);

    /// The current position in milliseconds.
    fn position(&self) -> f64;

    /// Moves the pointer straight to a position, for jumps in the performance.
    fn seek(&mut self, position: f64);

    /// Shows or hides the pointer.
    fn set_visible(&mut self, visible: bool);
}

/// A time pointer that stops at the end of the performance.
#[derive(Clone, Debug, PartialEq)]
pub struct ScorePointer {
    position: f64,
    end: f64,
    visible: bool,
}

impl ScorePointer {
    pub fn new(start: f64, end: f64) -> ScorePointer {
        ScorePointer {
            position: start,
            end,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl TimePointer for ScorePointer {
    fn advance(&mut self, ms: f64) {
        self.position = (self.position + ms).min(self.end);
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        self.position = position.min(self.end);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Turns pointer movement into performance time. The further the pointer travels, the further
/// the performance moves, regardless of how fast the gesture is.
pub struct Conductor {
    time_pointer: Option<Box<dyn TimePointer>>,
    previous: Option<PointerSample>,
    ms_per_pixel: f64,
    speed: f64,
}

impl Conductor {
    /// Creates a conductor that converts one pixel of movement into `ms_per_pixel` milliseconds
    /// at speed 1.0.
    pub fn new(ms_per_pixel: f64) -> Result<Conductor> {
        validate_ratio("ms per pixel", ms_per_pixel)?;
        Ok(Conductor {
            time_pointer: None,
            previous: None,
            ms_per_pixel,
            speed: 1.0,
        })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Sets the distance to time ratio. Fixed for the duration of a conducted performance.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        validate_ratio("speed", speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Swaps in a new time pointer, hiding the previous one. The next sample only records the
    /// pointer position.
    pub fn set_time_pointer(&mut self, mut time_pointer: Box<dyn TimePointer>) {
        if let Some(previous) = self.time_pointer.as_mut() {
            previous.set_visible(false);
        }
        time_pointer.set_visible(true);
        self.time_pointer = Some(time_pointer);
        self.previous = None;
    }

    /// Detaches and hides the current time pointer.
    pub fn release(&mut self) -> Option<Box<dyn TimePointer>> {
        self.previous = None;
        self.time_pointer.take().map(|mut time_pointer| {
            time_pointer.set_visible(false);
            time_pointer
        })
    }

    /// Advances the time pointer by the distance travelled since the previous sample and returns
    /// the elapsed milliseconds.
    pub fn conduct(&mut self, sample: PointerSample) -> f64 {
        let elapsed = match self.previous {
            Some(previous) => previous.distance(&sample) * self.ms_per_pixel * self.speed,
            None => 0.0,
        };
        self.previous = Some(sample);

        match self.time_pointer.as_mut() {
            Some(time_pointer) => {
                time_pointer.advance(elapsed);
                debug!(
                    elapsed,
                    position = time_pointer.position(),
                    "Conducted."
                );
                elapsed
            }
            None => 0.0,
        }
    }

    /// Moves the current time pointer to a position without conducting. The next sample keeps
    /// measuring from the previous one.
    pub fn seek(&mut self, position: f64) {
        if let Some(time_pointer) = self.time_pointer.as_mut() {
            debug!(from = time_pointer.position(), to = position, "Seeking time pointer.");
            time_pointer.seek(position);
        }
    }

    /// The position of the current time pointer.
    pub fn now(&self) -> Option<f64> {
        self.time_pointer
            .as_ref()
            .map(|time_pointer| time_pointer.position())
    }
}

fn validate_ratio(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("{} must be positive, got {}", name, value)))
    }
}

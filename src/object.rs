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

use crate::error::{Error, Result};
use crate::moment::Moment;

/// Whether a MIDI object sounds or is silent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Sounding material. Always has at least one moment.
    Chord,
    /// Silence. May still carry controller-only moments.
    Rest,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Chord => write!(f, "chord"),
            ObjectKind::Rest => write!(f, "rest"),
        }
    }
}

/// A chord or rest anchored at an absolute score position, holding its moments in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiObject {
    kind: ObjectKind,
    score_position: u64,
    duration: u64,
    moments: Vec<Moment>,
}

impl MidiObject {
    /// Creates a new object. Moments are sorted by relative position and moments that share a
    /// position are merged in the order they were given.
    pub fn new(
        kind: ObjectKind,
        score_position: u64,
        duration: u64,
        moments: Vec<Moment>,
    ) -> Result<MidiObject> {
        if duration == 0 {
            return Err(Error::invalid(format!(
                "{} at {} has a zero duration",
                kind, score_position
            )));
        }
        if score_position.checked_add(duration).is_none() {
            return Err(Error::invalid(format!(
                "{} at {} with duration {} ends past the last representable position",
                kind, score_position, duration
            )));
        }
        if kind == ObjectKind::Chord && moments.is_empty() {
            return Err(Error::invalid(format!(
                "chord at {} has no moments",
                score_position
            )));
        }
        if let Some(moment) = moments
            .iter()
            .find(|moment| moment.relative_position() >= duration)
        {
            return Err(Error::invalid(format!(
                "moment at {} lies outside the {} at {} (duration {})",
                moment.relative_position(),
                kind,
                score_position,
                duration
            )));
        }

        let mut sorted = moments;
        // Stable, so merged moments keep their input order.
        sorted.sort_by_key(|moment| moment.relative_position());

        let mut merged: Vec<Moment> = Vec::with_capacity(sorted.len());
        for moment in sorted {
            if let Some(last) = merged.last_mut() {
                if last.relative_position() == moment.relative_position() {
                    last.merge_moment(moment)?;
                    continue;
                }
            }
            merged.push(moment);
        }

        Ok(MidiObject {
            kind,
            score_position,
            duration,
            moments: merged,
        })
    }

    /// Creates a chord.
    pub fn chord(score_position: u64, duration: u64, moments: Vec<Moment>) -> Result<MidiObject> {
        MidiObject::new(ObjectKind::Chord, score_position, duration, moments)
    }

    /// Creates a rest.
    pub fn rest(score_position: u64, duration: u64, moments: Vec<Moment>) -> Result<MidiObject> {
        MidiObject::new(ObjectKind::Rest, score_position, duration, moments)
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn score_position(&self) -> u64 {
        self.score_position
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// The score position just past this object. Construction guarantees it does not overflow.
    pub fn end_position(&self) -> u64 {
        self.score_position + self.duration
    }

    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// The absolute score position of the moment at the given index.
    pub fn moment_position(&self, index: usize) -> Option<u64> {
        self.moments
            .get(index)
            .map(|moment| self.score_position + moment.relative_position())
    }

    /// The index of the first moment at or after the given absolute score position.
    pub fn first_moment_at_or_after(&self, position: u64) -> Option<usize> {
        self.moments
            .iter()
            .position(|moment| self.score_position + moment.relative_position() >= position)
    }

    /// The cursor for starting this object from the beginning. None if there is nothing to play.
    pub fn start_cursor(&self) -> Option<usize> {
        if self.moments.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::message::Message;
    use crate::moment::Moment;

    use super::{MidiObject, ObjectKind};

    fn moment(position: u64, key: u8) -> Result<Moment, Box<dyn Error>> {
        Ok(Moment::new(position, vec![Message::note_on(0, key, 100)?]))
    }

    #[test]
    fn sorts_and_merges_moments() -> Result<(), Box<dyn Error>> {
        let chord = MidiObject::chord(
            1000,
            500,
            vec![moment(200, 64)?, moment(0, 60)?, moment(200, 67)?],
        )?;

        assert_eq!(2, chord.moments().len());
        assert_eq!(0, chord.moments()[0].relative_position());
        let keys = chord.moments()[1]
            .messages()
            .iter()
            .map(|message| message.data1())
            .collect::<Vec<u8>>();
        assert_eq!(vec![64, 67], keys);
        assert_eq!(Some(1200), chord.moment_position(1));
        assert_eq!(1500, chord.end_position());
        Ok(())
    }

    #[test]
    fn rejects_positions_past_the_end_of_time() -> Result<(), Box<dyn Error>> {
        assert!(matches!(
            MidiObject::rest(u64::MAX - 10, 20, vec![]),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert!(MidiObject::chord(u64::MAX, 1, vec![moment(0, 60)?]).is_err());
        assert_eq!(
            u64::MAX,
            MidiObject::rest(u64::MAX - 10, 10, vec![])?.end_position()
        );
        Ok(())
    }

    #[test]
    fn first_moment_at_or_after() -> Result<(), Box<dyn Error>> {
        let chord = MidiObject::chord(100, 300, vec![moment(0, 60)?, moment(100, 62)?])?;
        assert_eq!(Some(0), chord.first_moment_at_or_after(50));
        assert_eq!(Some(1), chord.first_moment_at_or_after(150));
        assert_eq!(None, chord.first_moment_at_or_after(250));
        Ok(())
    }

    #[test]
    fn validation() -> Result<(), Box<dyn Error>> {
        assert!(MidiObject::chord(0, 100, vec![]).is_err());
        assert!(MidiObject::rest(0, 0, vec![]).is_err());
        assert!(MidiObject::chord(0, 100, vec![moment(100, 60)?]).is_err());

        let rest = MidiObject::rest(0, 100, vec![])?;
        assert_eq!(ObjectKind::Rest, rest.kind());
        assert_eq!(None, rest.start_cursor());
        Ok(())
    }
}

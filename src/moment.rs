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
use std::time::Duration;

use crate::error::{Error, Result};
use crate::message::Message;

/// An ordered bundle of messages that are sent together at one position inside a MIDI object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moment {
    /// The position of this moment relative to the start of its object, in milliseconds.
    relative_position: u64,
    /// When this moment was dispatched, measured from the performance origin.
    timestamp: Option<Duration>,
    /// The messages to send.
    messages: Vec<Message>,
}

impl Moment {
    /// Creates a new, unstamped moment.
    pub fn new(relative_position: u64, messages: Vec<Message>) -> Moment {
        Moment {
            relative_position,
            timestamp: None,
            messages,
        }
    }

    pub fn relative_position(&self) -> u64 {
        self.relative_position
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    /// Records the dispatch time. Each dispatched copy is stamped once, right before it is sent.
    pub fn set_timestamp(&mut self, timestamp: Duration) {
        debug_assert!(self.timestamp.is_none(), "moment stamped twice");
        self.timestamp = Some(timestamp);
    }

    /// Appends the other moment's messages after this moment's messages. Both moments must sit at
    /// the same relative position.
    pub fn merge_moment(&mut self, other: Moment) -> Result<()> {
        if other.relative_position != self.relative_position {
            return Err(Error::InconsistentMerge {
                position: self.relative_position,
                other: other.relative_position,
            });
        }

        self.messages.extend(other.messages);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, time::Duration};

    use crate::message::Message;

    use super::Moment;

    fn moment(position: u64, keys: &[u8]) -> Result<Moment, Box<dyn Error>> {
        Ok(Moment::new(
            position,
            keys.iter()
                .map(|key| Message::note_on(0, *key, 64))
                .collect::<crate::Result<Vec<Message>>>()?,
        ))
    }

    #[test]
    fn merge_preserves_order() -> Result<(), Box<dyn Error>> {
        let mut first = moment(20, &[60, 61])?;
        first.merge_moment(moment(20, &[62])?)?;

        let keys = first
            .messages()
            .iter()
            .map(|message| message.data1())
            .collect::<Vec<u8>>();
        assert_eq!(vec![60, 61, 62], keys);
        Ok(())
    }

    #[test]
    fn merge_is_associative() -> Result<(), Box<dyn Error>> {
        let mut left = moment(5, &[1, 2])?;
        left.merge_moment(moment(5, &[3])?)?;
        left.merge_moment(moment(5, &[4, 5])?)?;

        let mut tail = moment(5, &[3])?;
        tail.merge_moment(moment(5, &[4, 5])?)?;
        let mut right = moment(5, &[1, 2])?;
        right.merge_moment(tail)?;

        assert_eq!(left, right);
        Ok(())
    }

    #[test]
    fn merge_rejects_different_positions() -> Result<(), Box<dyn Error>> {
        let mut first = moment(0, &[60])?;
        assert_eq!(
            Err(crate::Error::InconsistentMerge {
                position: 0,
                other: 10
            }),
            first.merge_moment(moment(10, &[61])?)
        );
        assert_eq!(1, first.messages().len());
        Ok(())
    }

    #[test]
    fn timestamp() -> Result<(), Box<dyn Error>> {
        let mut moment = moment(0, &[60])?;
        assert_eq!(None, moment.timestamp());
        moment.set_timestamp(Duration::from_millis(250));
        assert_eq!(Some(Duration::from_millis(250)), moment.timestamp());
        Ok(())
    }
}

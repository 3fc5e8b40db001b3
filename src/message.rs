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

pub mod tables;

use tables::command;

/// A single 1 to 3 byte MIDI message. The length is always derived from the status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    bytes: [u8; 3],
}

impl Message {
    /// Creates a message from a status byte and up to two data bytes. Missing data bytes are
    /// zero filled.
    pub fn new(status: u8, data: &[u8]) -> Result<Message> {
        if tables::is_variable_length(status) {
            return Err(Error::invalid(format!(
                "status {:#04x} is a variable length message",
                status
            )));
        }
        if let Some(byte) = data.iter().find(|byte| **byte > 0x7F) {
            return Err(Error::invalid(format!(
                "data byte {} is out of range [0, 127]",
                byte
            )));
        }

        let length = tables::message_length(status).ok_or(Error::UnknownMessageType(status))?;
        if data.len() > length - 1 {
            return Err(Error::invalid(format!(
                "status {:#04x} takes {} data bytes, got {}",
                status,
                length - 1,
                data.len()
            )));
        }

        let mut bytes = [status, 0, 0];
        bytes[1..=data.len()].copy_from_slice(data);
        Ok(Message { bytes })
    }

    /// Parses a raw message. The slice must be exactly as long as the status byte requires.
    pub fn from_bytes(bytes: &[u8]) -> Result<Message> {
        let (status, data) = bytes
            .split_first()
            .ok_or_else(|| Error::invalid("empty message"))?;

        if bytes.len() > 3 {
            return Err(Error::UnsupportedConstruct(format!(
                "{} byte messages are not supported",
                bytes.len()
            )));
        }

        let message = Message::new(*status, data)?;
        if message.len() != bytes.len() {
            return Err(Error::UnsupportedConstruct(format!(
                "status {:#04x} needs {} bytes, got {}",
                status,
                message.len(),
                bytes.len()
            )));
        }
        Ok(message)
    }

    /// Builds a message from values already known to be in range.
    const fn raw(status: u8, data1: u8, data2: u8) -> Message {
        Message {
            bytes: [status, data1 & 0x7F, data2 & 0x7F],
        }
    }

    /// A program change on the given channel (0-15).
    pub fn program_change(channel: u8, program: u8) -> Result<Message> {
        Message::new(channel_status(command::PROGRAM_CHANGE, channel)?, &[program])
    }

    /// A control change on the given channel (0-15).
    pub fn control_change(channel: u8, control: u8, value: u8) -> Result<Message> {
        Message::new(channel_status(command::CONTROL_CHANGE, channel)?, &[control, value])
    }

    /// A pitch wheel message on the given channel (0-15).
    pub fn pitch_wheel(channel: u8, lsb: u8, msb: u8) -> Result<Message> {
        Message::new(channel_status(command::PITCH_WHEEL, channel)?, &[lsb, msb])
    }

    /// A note on message on the given channel (0-15).
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Result<Message> {
        Message::new(channel_status(command::NOTE_ON, channel)?, &[key, velocity])
    }

    /// A note off message on the given channel (0-15).
    pub fn note_off(channel: u8, key: u8, velocity: u8) -> Result<Message> {
        Message::new(channel_status(command::NOTE_OFF, channel)?, &[key, velocity])
    }

    /// Program 0 on the given channel.
    pub(crate) const fn default_program(channel: u8) -> Message {
        Message::raw(command::PROGRAM_CHANGE | (channel & 0xF), 0, 0)
    }

    /// A centred pitch wheel on the given channel.
    pub(crate) const fn centred_pitch_wheel(channel: u8) -> Message {
        Message::raw(command::PITCH_WHEEL | (channel & 0xF), 0, 0x40)
    }

    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    pub fn data1(&self) -> u8 {
        self.bytes[1]
    }

    pub fn data2(&self) -> u8 {
        self.bytes[2]
    }

    /// The number of bytes this message occupies on the wire.
    pub fn len(&self) -> usize {
        // Construction rejects every status without a fixed length.
        tables::message_length(self.bytes[0]).unwrap_or(self.bytes.len())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The wire bytes of this message.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn command(&self) -> u8 {
        self.bytes[0] & 0xF0
    }

    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0xF
    }

    pub fn is_program_change(&self) -> bool {
        !self.is_system() && self.command() == command::PROGRAM_CHANGE
    }

    pub fn is_pitch_wheel(&self) -> bool {
        !self.is_system() && self.command() == command::PITCH_WHEEL
    }

    pub fn is_control_change(&self) -> bool {
        !self.is_system() && self.command() == command::CONTROL_CHANGE
    }

    /// Returns true for the three kinds of message that make up a channel's controller state.
    pub fn is_controller_state(&self) -> bool {
        self.is_program_change() || self.is_pitch_wheel() || self.is_control_change()
    }

    fn is_system(&self) -> bool {
        self.bytes[0] >= 0xF0
    }
}

/// Combines a channel command with a channel (0-15).
fn channel_status(command: u8, channel: u8) -> Result<u8> {
    if channel > 0xF {
        return Err(Error::invalid(format!(
            "channel {} is out of range [0, 15]",
            channel
        )));
    }
    Ok(command | channel)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self
            .as_bytes()
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<String>>();
        write!(f, "[{}]", hex.join(" "))
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use super::tables::{command, realtime};
    use super::Message;

    #[test]
    fn three_byte_commands_zero_fill() -> Result<(), Box<dyn Error>> {
        let message = Message::new(0x93, &[60])?;
        assert_eq!(&[0x93, 60, 0], message.as_bytes());

        let message = Message::new(0xB1, &[])?;
        assert_eq!(&[0xB1, 0, 0], message.as_bytes());
        assert_eq!(3, message.len());
        Ok(())
    }

    #[test]
    fn two_byte_commands() -> Result<(), Box<dyn Error>> {
        let message = Message::program_change(4, 19)?;
        assert_eq!(&[0xC4, 19], message.as_bytes());
        assert_eq!(command::PROGRAM_CHANGE, message.command());
        assert_eq!(4, message.channel());
        assert!(Message::new(0xD0, &[1, 2]).is_err());
        Ok(())
    }

    #[test]
    fn realtime_messages() -> Result<(), Box<dyn Error>> {
        let clock = Message::new(realtime::TIMING_CLOCK, &[])?;
        assert_eq!(&[0xF8], clock.as_bytes());
        assert!(!clock.is_controller_state());

        let position = Message::new(realtime::SONG_POSITION_POINTER, &[1, 2])?;
        assert_eq!(3, position.len());
        Ok(())
    }

    #[test]
    fn invalid_messages() {
        assert!(matches!(
            Message::new(0x90, &[128, 0]),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Message::new(realtime::SYSEX_START, &[]),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert_eq!(
            Err(crate::Error::UnknownMessageType(0xF4)),
            Message::new(0xF4, &[])
        );
        assert_eq!(
            Err(crate::Error::UnknownMessageType(0x45)),
            Message::new(0x45, &[])
        );
    }

    #[test]
    fn channel_out_of_range() -> Result<(), Box<dyn Error>> {
        assert_eq!(&[0xBF, 7, 100], Message::control_change(15, 7, 100)?.as_bytes());
        for result in [
            Message::program_change(16, 0),
            Message::control_change(16, 7, 100),
            Message::pitch_wheel(16, 0, 0x40),
            Message::note_on(16, 60, 100),
            Message::note_off(255, 60, 0),
        ] {
            assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));
        }
        Ok(())
    }

    #[test]
    fn from_bytes() -> Result<(), Box<dyn Error>> {
        let message = Message::from_bytes(&[0xE2, 0x10, 0x40])?;
        assert!(message.is_pitch_wheel());
        assert_eq!(2, message.channel());

        assert!(matches!(
            Message::from_bytes(&[0x90, 1, 2, 3]),
            Err(crate::Error::UnsupportedConstruct(_))
        ));
        assert!(matches!(
            Message::from_bytes(&[0x90, 1]),
            Err(crate::Error::UnsupportedConstruct(_))
        ));
        assert!(Message::from_bytes(&[]).is_err());
        Ok(())
    }

    #[test]
    fn clone_is_byte_identical() -> Result<(), Box<dyn Error>> {
        for status in [0x80u8, 0x9F, 0xA3, 0xB7, 0xC0, 0xDA, 0xE5, 0xF2, 0xF3, 0xFE] {
            let original = Message::new(status, &[])?;
            let copy = original;
            assert_eq!(original.as_bytes(), copy.as_bytes());
            assert_eq!(original, copy);
        }
        Ok(())
    }

    #[test]
    fn display() -> Result<(), Box<dyn Error>> {
        assert_eq!("[B0 07 64]", Message::control_change(0, 7, 100)?.to_string());
        Ok(())
    }
}

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

//! Status byte lookup tables.

/// Channel message commands (the high nibble of the status byte).
pub mod command {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const AFTERTOUCH: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_WHEEL: u8 = 0xE0;
}

/// System common and realtime status bytes.
pub mod realtime {
    pub const SYSEX_START: u8 = 0xF0;
    pub const MTC_QUARTER_FRAME: u8 = 0xF1;
    pub const SONG_POSITION_POINTER: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const SYSEX_END: u8 = 0xF7;
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
    pub const RESET: u8 = 0xFF;
}

/// Common control change numbers.
pub mod control {
    pub const BANK_SELECT: u8 = 0;
    pub const MODWHEEL: u8 = 1;
    pub const VOLUME: u8 = 7;
    pub const PAN: u8 = 10;
    pub const EXPRESSION: u8 = 11;
}

const THREE_BYTE_COMMANDS: [u8; 5] = [
    command::NOTE_OFF,
    command::NOTE_ON,
    command::AFTERTOUCH,
    command::CONTROL_CHANGE,
    command::PITCH_WHEEL,
];

const TWO_BYTE_COMMANDS: [u8; 2] = [command::PROGRAM_CHANGE, command::CHANNEL_PRESSURE];

const SINGLE_BYTE_REALTIME: [u8; 7] = [
    realtime::TUNE_REQUEST,
    realtime::TIMING_CLOCK,
    realtime::START,
    realtime::CONTINUE,
    realtime::STOP,
    realtime::ACTIVE_SENSING,
    realtime::RESET,
];

const DOUBLE_BYTE_REALTIME: [u8; 2] = [realtime::MTC_QUARTER_FRAME, realtime::SONG_SELECT];

const TRIPLE_BYTE_REALTIME: [u8; 1] = [realtime::SONG_POSITION_POINTER];

/// Returns the length in bytes of a message with the given status, or None when the status
/// has no fixed length (data bytes, system exclusive and the undefined system codes).
///
/// Channel commands are matched first, then the system status table.
pub fn message_length(status: u8) -> Option<usize> {
    if status < 0x80 {
        return None;
    }

    if status < 0xF0 {
        let command = status & 0xF0;
        if THREE_BYTE_COMMANDS.contains(&command) {
            return Some(3);
        }
        if TWO_BYTE_COMMANDS.contains(&command) {
            return Some(2);
        }
    }

    if SINGLE_BYTE_REALTIME.contains(&status) {
        Some(1)
    } else if DOUBLE_BYTE_REALTIME.contains(&status) {
        Some(2)
    } else if TRIPLE_BYTE_REALTIME.contains(&status) {
        Some(3)
    } else {
        None
    }
}

/// Returns true if the status is a system common or realtime status with a fixed length.
pub fn is_realtime_status(status: u8) -> bool {
    SINGLE_BYTE_REALTIME.contains(&status)
        || DOUBLE_BYTE_REALTIME.contains(&status)
        || TRIPLE_BYTE_REALTIME.contains(&status)
}

/// Returns true if the status starts or ends a variable length system exclusive message.
pub fn is_variable_length(status: u8) -> bool {
    status == realtime::SYSEX_START || status == realtime::SYSEX_END
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn channel_commands() {
        for channel in 0..16u8 {
            assert_eq!(Some(3), message_length(command::NOTE_ON | channel));
            assert_eq!(Some(3), message_length(command::NOTE_OFF | channel));
            assert_eq!(Some(3), message_length(command::AFTERTOUCH | channel));
            assert_eq!(Some(3), message_length(command::CONTROL_CHANGE | channel));
            assert_eq!(Some(3), message_length(command::PITCH_WHEEL | channel));
            assert_eq!(Some(2), message_length(command::PROGRAM_CHANGE | channel));
            assert_eq!(Some(2), message_length(command::CHANNEL_PRESSURE | channel));
        }
    }

    #[test]
    fn system_status() {
        assert_eq!(Some(1), message_length(realtime::TIMING_CLOCK));
        assert_eq!(Some(1), message_length(realtime::RESET));
        assert_eq!(Some(2), message_length(realtime::SONG_SELECT));
        assert_eq!(Some(3), message_length(realtime::SONG_POSITION_POINTER));
        assert!(is_realtime_status(realtime::START));
        assert!(!is_realtime_status(command::NOTE_ON));
    }

    #[test]
    fn unresolvable() {
        assert_eq!(None, message_length(0x40));
        assert_eq!(None, message_length(0xF4));
        assert_eq!(None, message_length(0xFD));
        assert_eq!(None, message_length(realtime::SYSEX_START));
        assert!(is_variable_length(realtime::SYSEX_START));
        assert!(is_variable_length(realtime::SYSEX_END));
    }
}

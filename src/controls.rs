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
use crate::message::Message;
use crate::moment::Moment;

/// The running program, pitch wheel and control change state of one channel.
///
/// Used to write a full snapshot into the first moment after a region boundary so playback can
/// start there with the synth in the right state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerState {
    program_change: Message,
    pitch_wheel: Message,
    /// At most one message per control number, kept in the order each number was first seen.
    control_changes: Vec<Message>,
}

impl ControllerState {
    /// Program 0 and a centred pitch wheel on the given channel, no control changes.
    pub fn new(channel: u8) -> ControllerState {
        ControllerState {
            program_change: Message::default_program(channel),
            pitch_wheel: Message::centred_pitch_wheel(channel),
            control_changes: Vec::new(),
        }
    }

    pub fn program_change(&self) -> Message {
        self.program_change
    }

    pub fn pitch_wheel(&self) -> Message {
        self.pitch_wheel
    }

    pub fn control_changes(&self) -> &[Message] {
        &self.control_changes
    }

    /// Folds every program change, pitch wheel and control change in the moment into the state.
    pub fn update_from(&mut self, moment: &Moment) {
        for message in moment.messages() {
            if message.is_program_change() {
                self.program_change = *message;
            } else if message.is_pitch_wheel() {
                self.pitch_wheel = *message;
            } else if message.is_control_change() {
                match self
                    .control_changes
                    .iter_mut()
                    .find(|stored| stored.data1() == message.data1())
                {
                    Some(stored) => *stored = *message,
                    None => self.control_changes.push(*message),
                }
            }
        }
    }

    /// Replaces the moment's controller messages with this snapshot.
    ///
    /// The moment ends up as: program change, pitch wheel, control changes in stored order, then
    /// its original non-controller messages.
    pub fn update(&self, moment: &mut Moment) {
        let messages = moment.messages_mut();
        messages.retain(|message| !message.is_controller_state());

        let mut snapshot = Vec::with_capacity(2 + self.control_changes.len() + messages.len());
        snapshot.push(self.program_change);
        snapshot.push(self.pitch_wheel);
        snapshot.extend(self.control_changes.iter().copied());
        snapshot.append(messages);
        *messages = snapshot;
    }
}

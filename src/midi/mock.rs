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
#[cfg(test)]
use std::time::Duration;
use std::{error::Error, fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::debug;

#[cfg(test)]
use crate::message::Message;
use crate::moment::Moment;

/// A mock device. Records every moment it is sent.
#[derive(Clone)]
pub struct Device {
    name: String,
    emitted: Arc<Mutex<Vec<Moment>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            emitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    /// Gets every emitted moment, in order.
    pub fn emitted(&self) -> Vec<Vec<Message>> {
        self.emitted
            .lock()
            .iter()
            .map(|moment| moment.messages().to_vec())
            .collect()
    }

    #[cfg(test)]
    /// Gets the dispatch timestamp of every emitted moment, in order.
    pub fn emitted_timestamps(&self) -> Vec<Option<Duration>> {
        self.emitted.lock().iter().map(Moment::timestamp).collect()
    }

    #[cfg(test)]
    /// Gets every emitted message, flattened.
    pub fn emitted_messages(&self) -> Vec<Message> {
        self.emitted
            .lock()
            .iter()
            .flat_map(|moment| moment.messages().iter().copied())
            .collect()
    }

    #[cfg(test)]
    /// Forgets everything emitted so far.
    pub fn reset_emitted(&self) {
        self.emitted.lock().clear();
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn emit(&self, moment: &Moment) -> Result<(), Box<dyn Error>> {
        debug!(
            device = self.name,
            position = moment.relative_position(),
            messages = moment.messages().len(),
            "Emitting (mock)."
        );
        self.emitted.lock().push(moment.clone());
        Ok(())
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<Device>, Box<dyn Error>> {
        Ok(Arc::new(self.clone()))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

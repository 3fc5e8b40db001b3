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
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// What to do with the track cursors when a performance is stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopMode {
    /// Leave the cursors where they are so the performance can resume.
    Pause,
    /// Rewind every track to the start of the performance.
    Reset,
}

/// Represents the current stop state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StopState {
    Running,
    Stopped(StopMode),
}

/// A stop handle is shared between the sequencer and whoever controls it. The sequencer checks
/// it between moments and while waiting for the next one.
#[derive(Clone)]
pub struct StopHandle {
    state: Arc<Mutex<StopState>>,
    condvar: Arc<Condvar>,
}

impl Default for StopHandle {
    fn default() -> Self {
        StopHandle::new()
    }
}

impl StopHandle {
    /// Creates a new, running stop handle.
    pub fn new() -> StopHandle {
        StopHandle {
            state: Arc::new(Mutex::new(StopState::Running)),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Returns true if a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.state.lock() != StopState::Running
    }

    /// The requested stop mode, if any.
    pub fn stop_mode(&self) -> Option<StopMode> {
        match *self.state.lock() {
            StopState::Running => None,
            StopState::Stopped(mode) => Some(mode),
        }
    }

    /// Requests a stop. The first request wins.
    pub fn stop(&self, mode: StopMode) {
        let mut state = self.state.lock();
        if *state == StopState::Running {
            *state = StopState::Stopped(mode);
            self.condvar.notify_all();
        }
    }

    /// Clears a previous stop request so the handle can drive another pass.
    pub fn resume(&self) {
        *self.state.lock() = StopState::Running;
    }

    /// Waits until the deadline or until a stop is requested. Returns true if stopped.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();
        while *state == StopState::Running {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        *state != StopState::Running
    }

    /// Waits for at most the given duration. Returns true if stopped.
    pub fn wait_for(&self, duration: Duration) -> bool {
        self.wait_until(Instant::now() + duration)
    }
}

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
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Outputs the given duration in a minutes:seconds format.
pub fn duration_minutes_seconds(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let secs = duration.as_secs() - minutes * 60;
    format!("{}:{:02}", minutes, secs)
}

/// Parses a score position given either as milliseconds ("1500") or as minutes and seconds
/// ("1:05", "0:01.5").
pub fn parse_position(position: &str) -> Result<u64> {
    let invalid = || Error::invalid(format!("invalid score position {:?}", position));
    match position.split_once(':') {
        None => position.trim().parse::<u64>().map_err(|_| invalid()),
        Some((minutes, seconds)) => {
            let minutes = minutes.trim().parse::<u64>().map_err(|_| invalid())?;
            let seconds = seconds.trim().parse::<f64>().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            minutes
                .checked_mul(60_000)
                .and_then(|ms| ms.checked_add((seconds * 1000.0).round() as u64))
                .ok_or_else(invalid)
        }
    }
}

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

use config::{Config, Environment, File};
use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;

const DEFAULT_PLAYBACK_DELAY: Duration = Duration::ZERO;
const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_MS_PER_PIXEL: f64 = 10.0;

/// The configuration for the score player.
#[derive(Deserialize, Debug)]
pub struct Player {
    /// The MIDI device to play through.
    midi_device: String,
    /// How long to wait before the first moment is sent.
    playback_delay: Option<String>,
    /// The playback speed ratio.
    speed: Option<f64>,
    /// How many milliseconds of score one pixel of conducting covers.
    ms_per_pixel: Option<f64>,
}

impl Player {
    /// Loads the player configuration from the path. SCOREPLAY_* environment variables
    /// override values from the file.
    pub fn deserialize(path: &Path) -> Result<Player, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("SCOREPLAY").try_parsing(true))
            .build()?
            .try_deserialize::<Player>()?)
    }

    /// Returns the MIDI device name.
    pub fn midi_device(&self) -> &str {
        &self.midi_device
    }

    /// Returns the playback delay.
    pub fn playback_delay(&self) -> Result<Duration, ConfigError> {
        match &self.playback_delay {
            Some(playback_delay) => Ok(DurationString::from_string(playback_delay.clone())
                .map_err(|reason| ConfigError::Duration {
                    field: "playback_delay",
                    value: playback_delay.clone(),
                    reason: reason.to_string(),
                })?
                .into()),
            None => Ok(DEFAULT_PLAYBACK_DELAY),
        }
    }

    /// Returns the playback speed ratio.
    pub fn speed(&self) -> Result<f64, ConfigError> {
        positive("speed", self.speed.unwrap_or(DEFAULT_SPEED))
    }

    /// Returns the conducting scale.
    pub fn ms_per_pixel(&self) -> Result<f64, ConfigError> {
        positive("ms_per_pixel", self.ms_per_pixel.unwrap_or(DEFAULT_MS_PER_PIXEL))
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::io::Write;
    use std::time::Duration;

    use serial_test::serial;

    use super::Player;

    fn write_player(yaml: &str) -> Result<tempfile::NamedTempFile, Box<dyn Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        file.write_all(yaml.as_bytes())?;
        Ok(file)
    }

    #[test]
    #[serial]
    fn defaults() -> Result<(), Box<dyn Error>> {
        let file = write_player("midi_device: mock-output\n")?;
        let player = Player::deserialize(file.path())?;

        assert_eq!("mock-output", player.midi_device());
        assert_eq!(Duration::ZERO, player.playback_delay()?);
        assert_eq!(1.0, player.speed()?);
        assert_eq!(10.0, player.ms_per_pixel()?);
        Ok(())
    }

    #[test]
    #[serial]
    fn full_config() -> Result<(), Box<dyn Error>> {
        let file = write_player(
            r#"
midi_device: UM-ONE
playback_delay: 500ms
speed: 0.5
ms_per_pixel: 4
"#,
        )?;
        let player = Player::deserialize(file.path())?;

        assert_eq!("UM-ONE", player.midi_device());
        assert_eq!(Duration::from_millis(500), player.playback_delay()?);
        assert_eq!(0.5, player.speed()?);
        assert_eq!(4.0, player.ms_per_pixel()?);
        Ok(())
    }

    #[test]
    #[serial]
    fn invalid_values() -> Result<(), Box<dyn Error>> {
        let file = write_player("midi_device: mock\nplayback_delay: soon\nspeed: -1\n")?;
        let player = Player::deserialize(file.path())?;

        assert!(player.playback_delay().is_err());
        assert!(player.speed().is_err());
        Ok(())
    }

    #[test]
    #[serial]
    fn environment_overrides() -> Result<(), Box<dyn Error>> {
        let file = write_player("midi_device: mock-output\nspeed: 1.0\n")?;
        std::env::set_var("SCOREPLAY_SPEED", "2.5");
        let player = Player::deserialize(file.path());
        std::env::remove_var("SCOREPLAY_SPEED");

        assert_eq!(2.5, player?.speed()?);
        Ok(())
    }
}

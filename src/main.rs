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
use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::{crate_version, Parser, Subcommand};
use parking_lot::Mutex;
use scoreplay::conductor::{Conductor, PointerSample, ScorePointer};
use scoreplay::playsync::{StopHandle, StopMode};
use scoreplay::sequencer::{
    Clock, ConductedClock, Performance, PlayOutcome, Sequencer, WallClock,
};
use scoreplay::{config, midi, util};
use tracing::{info, warn};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A score-driven MIDI player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available MIDI output devices.
    Devices {},
    /// Verifies and summarises a score file, or every score in a directory.
    Score {
        /// The path to the score file or directory.
        path: String,
    },
    /// Lists the regions and the performance sequence of a score.
    Regions {
        /// The path to the score file.
        path: String,
    },
    /// Plays a score through the configured MIDI device.
    Play {
        /// The path to the player config.
        player_path: String,
        /// The path to the score file.
        score_path: String,
        /// Where to start, in milliseconds or minutes:seconds. Plays a span instead of regions.
        #[arg(long)]
        from: Option<String>,
        /// Where to stop, in milliseconds or minutes:seconds. Defaults to the end of the score.
        #[arg(long)]
        to: Option<String>,
        /// The regions to play, separated by commas. Defaults to the score's performance.
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        regions: Option<String>,
        /// Conducts the performance instead of following the wall clock. Pointer samples are read
        /// from stdin, one "x y" pair in pixels per line.
        #[arg(short, long)]
        conduct: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Score { path } => {
            let path = PathBuf::from(&path);
            let scores = if path.is_dir() {
                config::get_all_scores(&path)?
            } else {
                vec![config::parse_score(&path)?]
            };

            if scores.is_empty() {
                println!("No scores found in {}.", path.display());
                return Ok(());
            }

            println!("Scores (count: {}):", scores.len());
            for score in scores.iter() {
                println!("- {}", score);
                for track in score.tracks() {
                    println!(
                        "  - {} (Channel: {}, Objects: {}, Moments: {})",
                        track.name(),
                        track.channel() + 1,
                        track.objects().len(),
                        track.moment_count()
                    );
                }
            }
        }
        Commands::Regions { path } => {
            let score = config::parse_score(&PathBuf::from(&path))?;

            println!("Regions (count: {}):", score.regions().len());
            for region in score.regions() {
                println!("- {}", region);
            }
            println!("\nPerformance: {}", score.performance().join(", "));
        }
        Commands::Play {
            player_path,
            score_path,
            from,
            to,
            regions,
            conduct,
        } => {
            let player = config::parse_player(&PathBuf::from(player_path))?;
            let score = config::parse_score(&PathBuf::from(score_path))?;
            let device = midi::get_device(player.midi_device())?;

            let mut performance = if from.is_some() || to.is_some() {
                let start = from
                    .map(|from| util::parse_position(&from))
                    .transpose()?
                    .unwrap_or(0);
                let end = to
                    .map(|to| util::parse_position(&to))
                    .transpose()?
                    .unwrap_or(score.duration());
                Performance::span(&score, start, end)?
            } else if let Some(regions) = regions {
                let sequence = regions
                    .split(',')
                    .map(|region| region.trim().to_string())
                    .collect::<Vec<String>>();
                Performance::regions(&score, &sequence)?
            } else {
                Performance::from_score(&score)?
            };

            let sequencer = Sequencer::new(player.playback_delay()?);
            let clock: Box<dyn Clock> = if conduct {
                let mut conductor = Conductor::new(player.ms_per_pixel()?)?;
                conductor.set_speed(player.speed()?)?;
                conductor.set_time_pointer(Box::new(ScorePointer::new(
                    0.0,
                    score.duration() as f64,
                )));
                let conductor = Arc::new(Mutex::new(conductor));
                read_pointer_samples(Arc::clone(&conductor));
                Box::new(ConductedClock::new(conductor))
            } else {
                Box::new(WallClock::new(player.speed()?))
            };
            let stop_handle = StopHandle::new();

            let signal_handle = stop_handle.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal_handle.stop(StopMode::Reset);
                }
            });

            info!(score = score.name(), device = device.name(), "Starting playback.");
            let outcome = tokio::task::spawn_blocking(move || {
                sequencer
                    .play(&mut performance, device.as_ref(), clock.as_ref(), &stop_handle)
                    .map_err(|e| e.to_string())
            })
            .await??;

            match outcome {
                PlayOutcome::Finished => println!("Finished {}.", score.name()),
                PlayOutcome::Stopped(_) => println!("Stopped {}.", score.name()),
            }
        }
    }

    Ok(())
}

/// Feeds pointer samples from stdin to the conductor until stdin closes.
fn read_pointer_samples(conductor: Arc<Mutex<Conductor>>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(err = %e, "Unable to read pointer samples.");
                    return;
                }
            };

            match parse_pointer_sample(&line) {
                Some(sample) => {
                    conductor.lock().conduct(sample);
                }
                None => warn!(line, "Ignoring malformed pointer sample."),
            }
        }
    });
}

fn parse_pointer_sample(line: &str) -> Option<PointerSample> {
    let mut coordinates = line.split_whitespace().map(|value| value.parse::<f64>());
    match (coordinates.next(), coordinates.next(), coordinates.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => {
            Some(PointerSample::new(x, y))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::parse_pointer_sample;
    use scoreplay::conductor::PointerSample;

    #[test]
    fn pointer_samples() {
        assert_eq!(
            Some(PointerSample::new(12.0, -3.5)),
            parse_pointer_sample("  12 -3.5 ")
        );
        assert_eq!(None, parse_pointer_sample("12"));
        assert_eq!(None, parse_pointer_sample("12 3 4"));
        assert_eq!(None, parse_pointer_sample("x 3"));
        assert_eq!(None, parse_pointer_sample("NaN 3"));
    }
}

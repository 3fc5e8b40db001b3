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
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use tracing::error;

use crate::util::filename_display;

pub mod error;
mod midi;
mod player;
mod score;

pub use self::player::Player;

/// Parses a score from a YAML file and checks that it can be played.
pub fn parse_score(file: &Path) -> Result<crate::score::Score, Box<dyn Error>> {
    let score = match score::Score::deserialize(file) {
        Ok(score) => score,
        Err(e) => return Err(format!("error parsing file {}: {}", file.display(), e).into()),
    };

    score
        .to_score()
        .map_err(|e| format!("error in score {}: {}", score.name(), e).into())
}

/// Recurse into the given path and return all valid scores found, sorted by name.
pub fn get_all_scores(path: &Path) -> Result<Vec<crate::score::Score>, Box<dyn Error>> {
    let mut scores: BTreeMap<String, crate::score::Score> = BTreeMap::new();
    collect_scores(path, &mut scores)?;
    Ok(scores.into_values().collect())
}

fn collect_scores(
    path: &Path,
    scores: &mut BTreeMap<String, crate::score::Score>,
) -> Result<(), Box<dyn Error>> {
    for entry in fs::read_dir(path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_scores(&path, scores)?;
            continue;
        }

        let extension = path.extension();
        if extension.is_some_and(|ext| ext == "yaml" || ext == "yml") {
            match parse_score(&path) {
                Ok(score) => {
                    scores.insert(score.name().to_string(), score);
                }
                Err(e) => error!(
                    file = filename_display(&path),
                    err = e.as_ref(),
                    "Error while parsing score"
                ),
            }
        }
    }

    Ok(())
}

/// Loads the player configuration.
pub fn parse_player(file: &Path) -> Result<Player, Box<dyn Error>> {
    Ok(Player::deserialize(file)?)
}

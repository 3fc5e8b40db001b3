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

use tracing::debug;

use crate::error::{Error, Result};
use crate::object::MidiObject;

/// A named range of the score that can be performed on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionDef {
    name: String,
    start: u64,
    end: u64,
}

impl RegionDef {
    /// Creates a new region definition covering [start, end).
    pub fn new(name: &str, start: u64, end: u64) -> Result<RegionDef> {
        if start >= end {
            return Err(Error::invalid(format!(
                "region {} starts at {} but ends at {}",
                name, start, end
            )));
        }

        Ok(RegionDef {
            name: name.to_string(),
            start,
            end,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }
}

impl fmt::Display for RegionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {})", self.name, self.start, self.end)
    }
}

/// An (object, moment) pair within a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MomentLocation {
    pub object_index: usize,
    pub moment_index: usize,
}

/// The jump table entry for one performed region.
///
/// The next fields describe where the following region begins on this track. They stay unset on
/// the last region of a performance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionLink {
    pub end_of_region_position: u64,
    pub next_object_index: Option<usize>,
    pub next_moment_index: Option<usize>,
    pub object_count_in_region: Option<usize>,
}

impl RegionLink {
    /// Where the next region begins, if there is one.
    pub fn next_location(&self) -> Option<MomentLocation> {
        match (self.next_object_index, self.next_moment_index) {
            (Some(object_index), Some(moment_index)) => Some(MomentLocation {
                object_index,
                moment_index,
            }),
            _ => None,
        }
    }
}

/// The region links for one track, along with where the first region begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionLinks {
    first: MomentLocation,
    links: Vec<RegionLink>,
}

impl RegionLinks {
    pub fn first(&self) -> MomentLocation {
        self.first
    }

    pub fn links(&self) -> &[RegionLink] {
        &self.links
    }

    pub fn get(&self, index: usize) -> Option<&RegionLink> {
        self.links.get(index)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Looks up each name of the performance sequence in the region definitions.
pub fn resolve_sequence<'a>(
    defs: &'a [RegionDef],
    sequence: &[String],
) -> Result<Vec<&'a RegionDef>> {
    if sequence.is_empty() {
        return Err(Error::invalid("the region sequence is empty"));
    }

    sequence
        .iter()
        .map(|name| {
            defs.iter()
                .find(|def| def.name() == name)
                .ok_or_else(|| Error::invalid(format!("unknown region {}", name)))
        })
        .collect()
}

/// Builds one link per entry of the performance sequence. Names may repeat.
///
/// Each region's entry point is found by scanning from the start of the track, since a repeated
/// region jumps back to an earlier position. A region without any moment on this track points
/// past the last object. Only objects wholly inside a region are counted in it.
pub fn build_region_links(
    objects: &[MidiObject],
    defs: &[RegionDef],
    sequence: &[String],
) -> Result<RegionLinks> {
    let regions = resolve_sequence(defs, sequence)?;

    let mut first: Option<MomentLocation> = None;
    let mut links: Vec<RegionLink> = Vec::with_capacity(regions.len());
    for region in regions {
        let location = entry_location(objects, region.start()).unwrap_or(MomentLocation {
            object_index: objects.len(),
            moment_index: 0,
        });
        let object_count = objects
            .iter()
            .filter(|object| {
                object.score_position() >= region.start() && object.end_position() <= region.end()
            })
            .count();

        debug!(
            region = region.name(),
            object = location.object_index,
            moment = location.moment_index,
            object_count,
            "Linked region."
        );

        match links.last_mut() {
            Some(previous) => {
                previous.next_object_index = Some(location.object_index);
                previous.next_moment_index = Some(location.moment_index);
                previous.object_count_in_region = Some(object_count);
            }
            None => first = Some(location),
        }

        links.push(RegionLink {
            end_of_region_position: region.end(),
            next_object_index: None,
            next_moment_index: None,
            object_count_in_region: None,
        });
    }

    let first = first.ok_or_else(|| Error::invalid("the region sequence is empty"))?;
    Ok(RegionLinks { first, links })
}

/// The first moment at or after the given score position.
fn entry_location(objects: &[MidiObject], position: u64) -> Option<MomentLocation> {
    objects
        .iter()
        .enumerate()
        .filter(|(_, object)| object.end_position() > position)
        .find_map(|(object_index, object)| {
            object
                .first_moment_at_or_after(position)
                .map(|moment_index| MomentLocation {
                    object_index,
                    moment_index,
                })
        })
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::testutil::{names, simple_objects};

    use super::{build_region_links, MomentLocation, RegionDef};

    #[test]
    fn region_def_validation() {
        assert!(RegionDef::new("a", 10, 10).is_err());
        assert!(RegionDef::new("a", 10, 5).is_err());
        assert!(RegionDef::new("a", 0, 5).is_ok());
    }

    #[test]
    fn links_point_at_the_next_region() -> Result<(), Box<dyn Error>> {
        // Chords every 500ms from 0 to 2500, each with moments at 0 and 250.
        let objects = simple_objects(6, 500)?;
        let defs = vec![RegionDef::new("a", 0, 1000)?, RegionDef::new("b", 1000, 3000)?];

        let links = build_region_links(&objects, &defs, &names(&["a", "b", "a"]))?;
        assert_eq!(3, links.len());
        assert_eq!(
            MomentLocation {
                object_index: 0,
                moment_index: 0
            },
            links.first()
        );

        let a = &links.links()[0];
        assert_eq!(1000, a.end_of_region_position);
        assert_eq!(Some(2), a.next_object_index);
        assert_eq!(Some(0), a.next_moment_index);
        assert_eq!(Some(4), a.object_count_in_region);

        let b = &links.links()[1];
        assert_eq!(3000, b.end_of_region_position);
        assert_eq!(Some(0), b.next_object_index);
        assert_eq!(Some(0), b.next_moment_index);
        assert_eq!(Some(2), b.object_count_in_region);

        let last = &links.links()[2];
        assert_eq!(None, last.next_location());
        assert_eq!(None, last.object_count_in_region);
        Ok(())
    }

    #[test]
    fn region_starting_inside_an_object() -> Result<(), Box<dyn Error>> {
        let objects = simple_objects(4, 500)?;
        let defs = vec![RegionDef::new("a", 0, 750)?, RegionDef::new("b", 750, 2000)?];

        let links = build_region_links(&objects, &defs, &names(&["a", "b"]))?;
        let a = &links.links()[0];
        assert_eq!(
            Some(MomentLocation {
                object_index: 1,
                moment_index: 1
            }),
            a.next_location()
        );
        // The object at 500 straddles 750 and is not counted.
        assert_eq!(Some(2), a.object_count_in_region);
        Ok(())
    }

    #[test]
    fn objects_straddling_the_end_are_not_counted() -> Result<(), Box<dyn Error>> {
        let objects = simple_objects(4, 500)?;
        let defs = vec![RegionDef::new("a", 0, 500)?, RegionDef::new("b", 500, 1250)?];

        let links = build_region_links(&objects, &defs, &names(&["a", "b"]))?;
        // b holds the object at 500, the one at 1000 runs past 1250.
        assert_eq!(Some(1), links.links()[0].object_count_in_region);
        Ok(())
    }

    #[test]
    fn region_without_material() -> Result<(), Box<dyn Error>> {
        let objects = simple_objects(2, 500)?;
        let defs = vec![RegionDef::new("a", 0, 1000)?, RegionDef::new("b", 1000, 2000)?];

        let links = build_region_links(&objects, &defs, &names(&["a", "b"]))?;
        assert_eq!(Some(2), links.links()[0].next_object_index);
        assert_eq!(Some(0), links.links()[0].object_count_in_region);
        Ok(())
    }

    #[test]
    fn unknown_region() -> Result<(), Box<dyn Error>> {
        let objects = simple_objects(2, 500)?;
        let defs = vec![RegionDef::new("a", 0, 1000)?];

        assert!(build_region_links(&objects, &defs, &names(&["a", "c"])).is_err());
        assert!(build_region_links(&objects, &defs, &[]).is_err());
        Ok(())
    }
}

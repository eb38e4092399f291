//! Neighbor resolution along the series and lateral axes.
//!
//! Vertical movement walks a series in episode order and wraps at both ends.
//! Lateral movement prefers authored alternate versions and falls back to
//! tag similarity, computing `right` before `left` so the two never collide.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogIndex, ContentId, ContentItem};

/// One of the four navigation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction that undoes a move in this direction along the series axis.
    ///
    /// Lateral moves are not generally reversible (tag fallbacks are not
    /// symmetric), so this is only a hint for the UI.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {s}")),
        }
    }
}

/// Neighbors of the current item. Absent directions are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NeighborSet {
    pub up: Option<ContentId>,
    pub down: Option<ContentId>,
    pub left: Option<ContentId>,
    pub right: Option<ContentId>,
}

impl NeighborSet {
    /// Returns the neighbor in `direction`, if any.
    pub fn get(&self, direction: Direction) -> Option<&ContentId> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
            Direction::Left => self.left.as_ref(),
            Direction::Right => self.right.as_ref(),
        }
    }

    /// Present neighbors paired with their direction, in `Direction::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &ContentId)> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.get(direction).map(|id| (direction, id)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Computes the neighbor set for `item`.
///
/// Pure and deterministic: the same item and catalog always yield the same
/// neighbors, and every returned id resolves in `catalog`.
pub fn resolve_neighbors(item: &ContentItem, catalog: &CatalogIndex) -> NeighborSet {
    let (up, down) = series_neighbors(item, catalog);
    let mut neighbors = NeighborSet {
        up,
        down,
        left: None,
        right: None,
    };

    if let Some(series) = &item.series_id {
        neighbors.left = catalog
            .items()
            .iter()
            .find(|candidate| {
                candidate.series_id.is_some()
                    && candidate.series_id.as_ref() != Some(series)
                    && candidate.episode_number == Some(1)
                    && candidate.shares_tag_with(item)
            })
            .map(|candidate| candidate.id.clone());
    } else if let Some(ring) = item
        .alternate_version_ids
        .as_deref()
        .filter(|ring| ring.len() >= 2)
    {
        if let Some(position) = ring.iter().position(|id| *id == item.id) {
            let next = &ring[(position + 1) % ring.len()];
            let previous = &ring[(position + ring.len() - 1) % ring.len()];
            neighbors.left = Some(next.clone()).filter(|id| catalog.contains(id));
            neighbors.right = Some(previous.clone()).filter(|id| catalog.contains(id));
        }
    }

    if neighbors.right.is_none() {
        neighbors.right = catalog
            .items_with_any_tag(&item.tags, &item.id)
            .find(|candidate| candidate.series_id.is_none())
            .map(|candidate| candidate.id.clone());
    }

    if neighbors.left.is_none() {
        let right = neighbors.right.as_ref();
        neighbors.left = catalog
            .items_with_any_tag(&item.tags, &item.id)
            .find(|candidate| {
                Some(&candidate.id) != right
                    && !item
                        .series_id
                        .as_ref()
                        .is_some_and(|series| candidate.in_series(series))
            })
            .map(|candidate| candidate.id.clone());
    }

    neighbors
}

fn series_neighbors(
    item: &ContentItem,
    catalog: &CatalogIndex,
) -> (Option<ContentId>, Option<ContentId>) {
    let Some(series) = &item.series_id else {
        return (None, None);
    };

    let episodes: Vec<&ContentItem> = catalog.items_in_series(series).collect();
    let length = episodes.len();
    if length < 2 {
        return (None, None);
    }

    let Some(index) = episodes.iter().position(|episode| episode.id == item.id) else {
        return (None, None);
    };

    let up = episodes[(index + 1) % length].id.clone();
    let down = episodes[(index + length - 1) % length].id.clone();
    (Some(up), Some(down))
}

//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the geometry primitives the rest of the simulation
//! builds on:
//! - `HexCoord`: identifies a single hex of the (unbounded) world
//! - `hexes_in_radius`: the filled disc of hexes around a center
//! - `reachable`: bounded breadth-first movement search
//! - `attackable`: adjacency-based attack targeting
//!
//! The world has no edges, so nothing here clamps coordinates. Callers supply
//! predicates for visibility, passability and occupancy; geometry never looks
//! at game state directly.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Axial offsets of the six neighbors, clockwise starting from East.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The origin of the world
    pub const ORIGIN: HexCoord = HexCoord::new(0, 0);

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        DIRECTIONS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = other.q - self.q;
        let dr = other.r - self.r;
        dq.abs().max(dr.abs()).max((dq + dr).abs()) as u32
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((q, r): (i32, i32)) -> Self {
        HexCoord::new(q, r)
    }
}

/// Distance between two hexes: `max(|dq|, |dr|, |dq + dr|)`.
pub fn distance(a: HexCoord, b: HexCoord) -> u32 {
    a.distance_to(&b)
}

/// Number of hexes in a filled disc of the given radius (3N² + 3N + 1).
pub const fn disc_size(radius: u32) -> usize {
    let n = radius as usize;
    3 * n * n + 3 * n + 1
}

/// Enumerate every hex within `radius` steps of `center`.
///
/// Order is column-major (ascending dq, then ascending dr), which keeps the
/// enumeration deterministic.
pub fn hexes_in_radius(center: HexCoord, radius: u32) -> Vec<HexCoord> {
    let n = radius as i32;
    let mut hexes = Vec::with_capacity(disc_size(radius));
    for dq in -n..=n {
        let r_min = (-n).max(-dq - n);
        let r_max = n.min(-dq + n);
        for dr in r_min..=r_max {
            hexes.push(HexCoord::new(center.q + dq, center.r + dr));
        }
    }
    hexes
}

/// Hexes a mover standing on `start` can reach within `range` steps.
///
/// Breadth-first search outward from `start`. A hex is entered only when
/// `can_enter` accepts it; the caller folds fog of war and terrain
/// passability into that predicate. Rejected hexes are pruned, so nothing
/// behind them is reached through them. The start hex itself is never part
/// of the result.
pub fn reachable<F>(start: HexCoord, range: u32, can_enter: F) -> HashSet<HexCoord>
where
    F: Fn(HexCoord) -> bool,
{
    let mut reached = HashSet::new();
    let mut visited = HashSet::from([start]);
    let mut frontier = VecDeque::from([(start, 0u32)]);

    while let Some((hex, steps)) = frontier.pop_front() {
        if steps > 0 {
            reached.insert(hex);
        }
        if steps >= range {
            continue;
        }
        for next in hex.neighbors() {
            if !visited.insert(next) {
                continue;
            }
            if !can_enter(next) {
                continue;
            }
            frontier.push_back((next, steps + 1));
        }
    }

    reached
}

/// Neighbors of `start` that hold a valid attack target.
///
/// `is_visible` is the attacker's fog of war; `has_enemy` reports whether a
/// hex contains at least one live unit the attacker does not own.
pub fn attackable<V, E>(start: HexCoord, is_visible: V, has_enemy: E) -> Vec<HexCoord>
where
    V: Fn(HexCoord) -> bool,
    E: Fn(HexCoord) -> bool,
{
    start
        .neighbors()
        .into_iter()
        .filter(|&hex| is_visible(hex) && has_enemy(hex))
        .collect()
}

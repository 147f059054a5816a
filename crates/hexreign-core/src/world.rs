//! Procedural world generation.
//!
//! Every coordinate of the unbounded map has a fixed terrain, base yield and
//! hidden deposit, derived from a hash of the coordinate alone. Generating a
//! hex never depends on call order or on any stored state, so tiles can be
//! materialized on demand anywhere on the map.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::player::{ResourceKind, Resources};

/// Salt selecting the terrain roll
const TERRAIN_SALT: u32 = 1;
/// Salt selecting which hidden resource (if any) a hex holds
const DEPOSIT_SALT: u32 = 2;
/// Salt selecting the size of the hidden deposit
const AMOUNT_SALT: u32 = 3;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
/// Shifts coordinates so small negative values hash like positive ones
const COORD_BIAS: i32 = 10_000;

/// Type of terrain on a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Plains,
    Desert,
    Mountain,
    Forest,
    River,
    Sea,
}

impl Terrain {
    /// Whether land units can enter this terrain
    pub fn is_passable(&self) -> bool {
        !matches!(self, Terrain::Sea | Terrain::Mountain)
    }

    /// Per-tick yield of an owned hex before improvements and deposits
    pub fn base_yield(&self) -> Resources {
        match self {
            Terrain::Plains => Resources::with_amounts(2, 0, 0, 0),
            Terrain::Desert => Resources::with_amounts(0, 1, 1, 0),
            Terrain::Mountain => Resources::with_amounts(0, 3, 0, 0),
            Terrain::Forest => Resources::with_amounts(1, 1, 0, 0),
            Terrain::River => Resources::with_amounts(1, 0, 2, 0),
            Terrain::Sea => Resources::with_amounts(0, 0, 1, 1),
        }
    }
}

/// A resource deposit hidden under a hex until revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub kind: ResourceKind,
    pub amount: u32,
}

/// The immutable, coordinate-derived part of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSeed {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub base_yield: Resources,
    pub deposit: Option<Deposit>,
}

/// Uniform value in [0, 1) derived from `(q, r, salt)`.
///
/// 32-bit FNV-1a over the biased coordinates and the salt.
pub fn seeded_unit(coord: HexCoord, salt: u32) -> f64 {
    let mut h = FNV_OFFSET;
    h ^= coord.q.wrapping_add(COORD_BIAS) as u32;
    h = h.wrapping_mul(FNV_PRIME);
    h ^= coord.r.wrapping_add(COORD_BIAS) as u32;
    h = h.wrapping_mul(FNV_PRIME);
    h ^= salt;
    h = h.wrapping_mul(FNV_PRIME);
    f64::from(h) / 4_294_967_296.0
}

fn terrain_at(coord: HexCoord) -> Terrain {
    let v = seeded_unit(coord, TERRAIN_SALT);
    if v < 0.05 {
        Terrain::Sea
    } else if v < 0.15 {
        Terrain::River
    } else if v < 0.30 {
        Terrain::Mountain
    } else if v < 0.45 {
        Terrain::Forest
    } else if v < 0.65 {
        Terrain::Desert
    } else {
        Terrain::Plains
    }
}

fn deposit_at(coord: HexCoord) -> Option<Deposit> {
    let roll = seeded_unit(coord, DEPOSIT_SALT);
    let (kind, max) = if roll < 0.40 {
        return None;
    } else if roll < 0.65 {
        (ResourceKind::Grain, 5)
    } else if roll < 0.85 {
        (ResourceKind::Stone, 5)
    } else if roll < 0.95 {
        (ResourceKind::Gold, 3)
    } else {
        (ResourceKind::Knowledge, 3)
    };
    let amount = (seeded_unit(coord, AMOUNT_SALT) * f64::from(max)).floor() as u32 + 1;
    Some(Deposit { kind, amount })
}

/// Generate the fixed properties of the hex at `(q, r)`.
pub fn generate(q: i32, r: i32) -> TileSeed {
    let coord = HexCoord::new(q, r);
    let terrain = terrain_at(coord);
    TileSeed {
        coord,
        terrain,
        base_yield: terrain.base_yield(),
        deposit: deposit_at(coord),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::hexes_in_radius;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_pure() {
        for hex in hexes_in_radius(HexCoord::new(17, -40), 4) {
            let first = generate(hex.q, hex.r);
            // Unrelated work in between must not matter
            let _ = generate(hex.q + 1000, hex.r - 1000);
            let second = generate(hex.q, hex.r);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_seeded_unit_in_range() {
        for hex in hexes_in_radius(HexCoord::ORIGIN, 10) {
            for salt in 0..4 {
                let v = seeded_unit(hex, salt);
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_base_yield_follows_terrain() {
        for hex in hexes_in_radius(HexCoord::new(-30, 12), 5) {
            let seed = generate(hex.q, hex.r);
            assert_eq!(seed.base_yield, seed.terrain.base_yield());
        }
    }

    #[test]
    fn test_deposit_amounts_bounded() {
        for hex in hexes_in_radius(HexCoord::ORIGIN, 12) {
            if let Some(deposit) = generate(hex.q, hex.r).deposit {
                let max = match deposit.kind {
                    ResourceKind::Grain | ResourceKind::Stone => 5,
                    ResourceKind::Gold | ResourceKind::Knowledge => 3,
                };
                assert!((1..=max).contains(&deposit.amount));
            }
        }
    }

    #[test]
    fn test_world_is_varied() {
        let terrains: HashSet<Terrain> = hexes_in_radius(HexCoord::ORIGIN, 15)
            .into_iter()
            .map(|h| generate(h.q, h.r).terrain)
            .collect();
        assert!(terrains.len() >= 4, "only saw {:?}", terrains);
        assert!(terrains.iter().any(|t| t.is_passable()));
        assert!(terrains.iter().any(|t| !t.is_passable()));
    }

    #[test]
    fn test_passability() {
        assert!(!Terrain::Sea.is_passable());
        assert!(!Terrain::Mountain.is_passable());
        assert!(Terrain::Plains.is_passable());
        assert!(Terrain::River.is_passable());
    }
}

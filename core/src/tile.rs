//! Tile graph nodes.
//!
//! A tile has up to four directed neighbor slots (N/E/S/W). Links are
//! directed: A pointing at B says nothing about B pointing back at A.
//! The registry owns symmetry checks; a tile only stores its own side.

use crate::types::{Money, PlayerId, TileId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PURCHASE_PRICE: Money = 500;
pub const DEFAULT_RENT_PRICE: Money = 200;
pub const DEFAULT_STANDING_SLOTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileCategory {
    Empty,
    Bank,
    Hospital,
    Prison,
    Treasure,
    Shop,
    Park,
    Trap,
    Station,
}

impl TileCategory {
    /// Only Empty land can be bought, rented, and built on.
    pub fn is_ownable(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Categories that carry a fixed landmark structure from board setup.
    pub fn has_landmark(&self) -> bool {
        !matches!(self, Self::Empty | Self::Trap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East  => 1,
            Self::South => 2,
            Self::West  => 3,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East  => Self::West,
            Self::South => Self::North,
            Self::West  => Self::East,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id:              TileId,
    pub category:        TileCategory,
    pub purchase_price:  Money,
    pub rent_price:      Money,
    pub owner:           Option<PlayerId>,
    /// A permanent structure: a house on owned land, or a landmark.
    pub has_building:    bool,
    /// A transient obstruction that halts movement on contact.
    pub has_obstruction: bool,
    neighbors:           [Option<TileId>; 4],
    slots:               Vec<Option<PlayerId>>,
}

impl Tile {
    pub fn new(id: TileId, category: TileCategory) -> Self {
        Self {
            id,
            category,
            purchase_price:  DEFAULT_PURCHASE_PRICE,
            rent_price:      DEFAULT_RENT_PRICE,
            owner:           None,
            has_building:    false,
            has_obstruction: false,
            neighbors:       [None; 4],
            slots:           vec![None; DEFAULT_STANDING_SLOTS],
        }
    }

    pub fn with_prices(mut self, purchase_price: Money, rent_price: Money) -> Self {
        self.purchase_price = purchase_price;
        self.rent_price = rent_price;
        self
    }

    pub fn with_neighbor(mut self, dir: Direction, to: TileId) -> Self {
        self.set_neighbor(dir, Some(to));
        self
    }

    pub fn with_neighbors(mut self, neighbors: [Option<TileId>; 4]) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_standing_slots(mut self, count: usize) -> Self {
        self.slots = vec![None; count.max(1)];
        self
    }

    pub fn neighbor(&self, dir: Direction) -> Option<TileId> {
        self.neighbors[dir.index()]
    }

    pub fn set_neighbor(&mut self, dir: Direction, to: Option<TileId>) {
        self.neighbors[dir.index()] = to;
    }

    /// Outgoing links in N/E/S/W order, null slots and repeats removed.
    pub fn neighbors(&self) -> Vec<TileId> {
        let mut out = Vec::with_capacity(4);
        for id in self.neighbors.iter().flatten() {
            if !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }

    pub fn links_to(&self, other: TileId) -> bool {
        self.neighbors.contains(&Some(other))
    }

    /// Two registrations describe the same tile when their authored
    /// shape matches. Runtime state (owner, structures, tokens) is ignored.
    pub fn same_shape(&self, other: &Tile) -> bool {
        self.id == other.id
            && self.category == other.category
            && self.purchase_price == other.purchase_price
            && self.rent_price == other.rent_price
            && self.neighbors == other.neighbors
    }

    /// Clear ownership and any house. Landmarks stay.
    pub fn reset_ownership(&mut self) {
        self.owner = None;
        if self.category.is_ownable() {
            self.has_building = false;
        }
    }

    // ── Standing slots ─────────────────────────────────────────────

    /// Put a token on this tile. Returns its slot index.
    /// Takes the lowest free slot; overflow shares slot 0 (tile centre).
    pub fn enter(&mut self, player: PlayerId) -> usize {
        if let Some(idx) = self.slot_of(player) {
            return idx;
        }
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(player);
                idx
            }
            None => 0,
        }
    }

    pub fn leave(&mut self, player: PlayerId) {
        for slot in self.slots.iter_mut() {
            if *slot == Some(player) {
                *slot = None;
            }
        }
    }

    pub fn slot_of(&self, player: PlayerId) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(player))
    }

    pub fn occupants(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.slots.iter().flatten().copied()
    }
}

//! Tile registry: the authoritative id → tile lookup.
//!
//! RULE: Every other layer resolves tiles through the registry.
//! A lookup miss is never fatal; callers skip the operation.
//! A duplicate id bound to a different tile is always fatal.

use crate::{
    config::AdjacencyPolicy,
    error::{GameError, GameResult},
    tile::{Direction, Tile},
    types::TileId,
};
use std::collections::BTreeMap;

/// One directed link, `from` → `to`, stored in `from`'s `dir` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub from: TileId,
    pub dir:  Direction,
    pub to:   TileId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyReport {
    /// Links whose target does not link back.
    pub one_way:  Vec<Link>,
    /// Links whose target id is not registered.
    pub dangling: Vec<Link>,
}

impl AdjacencyReport {
    pub fn is_clean(&self) -> bool {
        self.one_way.is_empty() && self.dangling.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileRegistry {
    tiles: BTreeMap<TileId, Tile>,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tile under its own id.
    ///
    /// Re-registering the same tile is a no-op and keeps the live state
    /// already held for it. A different tile under a taken id is rejected.
    pub fn register(&mut self, tile: Tile) -> GameResult<TileId> {
        let id = tile.id;
        match self.tiles.get(&id) {
            Some(existing) if existing.same_shape(&tile) => Ok(id),
            Some(_) => Err(GameError::DuplicateTile { id }),
            None => {
                self.tiles.insert(id, tile);
                Ok(id)
            }
        }
    }

    /// Register a tile that has no id yet. Assigns the next free id.
    pub fn register_new(&mut self, mut tile: Tile) -> TileId {
        let id = self.next_free_id();
        tile.id = id;
        self.tiles.insert(id, tile);
        id
    }

    /// Rescan a full set of tiles. Safe to call any number of times.
    pub fn rebuild(&mut self, tiles: impl IntoIterator<Item = Tile>) -> GameResult<usize> {
        let mut added = 0;
        for tile in tiles {
            let before = self.tiles.len();
            self.register(tile)?;
            added += self.tiles.len() - before;
        }
        Ok(added)
    }

    pub fn lookup(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn lookup_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// All tiles in ascending id order.
    pub fn all_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn all_tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Registered outgoing neighbors of `id`. Dangling links are skipped.
    pub fn neighbors_of(&self, id: TileId) -> Vec<TileId> {
        self.lookup(id)
            .map(|t| t.neighbors().into_iter().filter(|n| self.contains(*n)).collect())
            .unwrap_or_default()
    }

    fn next_free_id(&self) -> TileId {
        self.tiles.keys().next_back().map_or(0, |max| max + 1)
    }

    // ── Adjacency validation ──────────────────────────────────────

    pub fn adjacency_report(&self) -> AdjacencyReport {
        let mut report = AdjacencyReport::default();
        for tile in self.tiles.values() {
            for dir in Direction::ALL {
                let Some(to) = tile.neighbor(dir) else { continue };
                let link = Link { from: tile.id, dir, to };
                match self.tiles.get(&to) {
                    None => report.dangling.push(link),
                    Some(target) if !target.links_to(tile.id) => report.one_way.push(link),
                    Some(_) => {}
                }
            }
        }
        report
    }

    /// Add the missing reverse side of every one-way link.
    ///
    /// The reverse link goes into the opposite slot when it is free,
    /// otherwise into the first free slot. Returns (added, unrepaired).
    pub fn symmetrize(&mut self) -> (usize, usize) {
        let one_way = self.adjacency_report().one_way;
        let mut added = 0;
        let mut unrepaired = 0;
        for link in one_way {
            let Some(target) = self.tiles.get_mut(&link.to) else { continue };
            if target.links_to(link.from) {
                continue;
            }
            let preferred = link.dir.opposite();
            let slot = if target.neighbor(preferred).is_none() {
                Some(preferred)
            } else {
                Direction::ALL.into_iter().find(|d| target.neighbor(*d).is_none())
            };
            match slot {
                Some(dir) => {
                    target.set_neighbor(dir, Some(link.from));
                    added += 1;
                }
                None => {
                    log::warn!(
                        "registry: tile {} has no free slot for reverse link to {}",
                        link.to, link.from
                    );
                    unrepaired += 1;
                }
            }
        }
        (added, unrepaired)
    }

    /// Check adjacency at load time and apply the configured policy.
    /// Dangling links are always rejected.
    pub fn validate(&mut self, policy: AdjacencyPolicy) -> GameResult<AdjacencyReport> {
        let report = self.adjacency_report();
        if let Some(link) = report.dangling.first() {
            return Err(GameError::InvalidBoard {
                reason: format!(
                    "tile {} links {:?} to unregistered tile {} ({} dangling links)",
                    link.from, link.dir, link.to, report.dangling.len()
                ),
            });
        }
        if report.one_way.is_empty() {
            return Ok(report);
        }
        match policy {
            AdjacencyPolicy::Directed => {
                log::info!("registry: keeping {} one-way links", report.one_way.len());
            }
            AdjacencyPolicy::Symmetrize => {
                let (added, unrepaired) = self.symmetrize();
                log::info!("registry: symmetrized {added} links, {unrepaired} unrepaired");
                if unrepaired > 0 {
                    return Err(GameError::InvalidBoard {
                        reason: format!("{unrepaired} one-way links could not be mirrored"),
                    });
                }
            }
            AdjacencyPolicy::RejectAsymmetric => {
                let link = report.one_way[0];
                return Err(GameError::InvalidBoard {
                    reason: format!(
                        "tile {} links {:?} to {} with no link back ({} one-way links)",
                        link.from, link.dir, link.to, report.one_way.len()
                    ),
                });
            }
        }
        Ok(report)
    }
}

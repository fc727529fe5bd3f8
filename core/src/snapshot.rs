//! Snapshot serialization: full player and tile state to/from JSON.
//!
//! A snapshot is a flat, id-keyed copy with no live references. Restore
//! resolves every id through the registry and roster of the world it is
//! applied to, so it works after the world has been torn down and rebuilt.
//!
//! RULE: Applying the same snapshot twice is the same as applying it once.
//! Structure effects fire only when a flag actually changes.

use crate::{
    error::GameResult,
    player::Roster,
    registry::TileRegistry,
    types::{Money, PlayerId, TileId},
    world::World,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id:                PlayerId,
    pub current_tile_id:   TileId,
    #[serde(with = "id_or_none")]
    pub previous_tile_id:  Option<TileId>,
    pub money:             Money,
    pub frozen_turns:      u32,
    pub card_template_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub id:              TileId,
    /// -1 on the wire when unowned.
    #[serde(with = "id_or_none")]
    pub owner_id:        Option<PlayerId>,
    pub has_obstruction: bool,
    /// Purchased houses only. Landmarks belong to the board, not the save.
    pub has_building:    bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<PlayerRecord>,
    pub tiles:   Vec<TileRecord>,
}

/// What a restore could not resolve. Misses are skipped, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub players_restored: usize,
    pub tiles_restored:   usize,
    pub unknown_players:  Vec<PlayerId>,
    pub unknown_tiles:    Vec<TileId>,
    pub skipped_cards:    Vec<String>,
}

impl Snapshot {
    /// Pure read of the current state.
    pub fn capture(roster: &Roster, registry: &TileRegistry) -> Self {
        let players = roster
            .iter()
            .map(|p| PlayerRecord {
                id:                p.id,
                current_tile_id:   p.current_tile,
                previous_tile_id:  p.previous_tile,
                money:             p.money,
                frozen_turns:      p.frozen_turns,
                card_template_ids: p.template_ids(),
            })
            .collect();
        let tiles = registry
            .all_tiles()
            .map(|t| TileRecord {
                id:              t.id,
                owner_id:        t.owner,
                has_obstruction: t.has_obstruction,
                has_building:    t.category.is_ownable() && t.has_building,
            })
            .collect();
        Self { players, tiles }
    }

    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn apply(&self, world: &mut World) -> RestoreReport {
        let mut report = RestoreReport::default();

        for rec in &self.tiles {
            let Some(tile) = world.registry.lookup_mut(rec.id) else {
                log::warn!("snapshot: tile {} not on this board, skipped", rec.id);
                report.unknown_tiles.push(rec.id);
                continue;
            };
            if tile.category.is_ownable() {
                let owner = match rec.owner_id {
                    Some(id) if !world.roster.contains(id) => {
                        log::warn!("snapshot: tile {} owner {id} not in roster, left unowned", rec.id);
                        report.unknown_players.push(id);
                        None
                    }
                    other => other,
                };
                tile.owner = owner;
                let wants_building = owner.is_some() && rec.has_building;
                match (tile.has_building, wants_building) {
                    (false, true) => {
                        tile.has_building = true;
                        world.effects.spawn_structure(rec.id);
                    }
                    (true, false) => tile.has_building = false,
                    _ => {}
                }
            }
            match (tile.has_obstruction, rec.has_obstruction) {
                (false, true) => {
                    tile.has_obstruction = true;
                    world.effects.spawn_obstruction(rec.id);
                }
                (true, false) => {
                    tile.has_obstruction = false;
                    world.effects.clear_obstruction(rec.id);
                }
                _ => {}
            }
            report.tiles_restored += 1;
        }

        for rec in &self.players {
            let Some(player) = world.roster.get_mut(rec.id) else {
                log::warn!("snapshot: player {} not in roster, skipped", rec.id);
                report.unknown_players.push(rec.id);
                continue;
            };
            player.money = rec.money;
            player.frozen_turns = rec.frozen_turns;
            player.clear_inventory();
            for name in &rec.card_template_ids {
                let Some(card) = world.catalog.instantiate(name) else {
                    log::warn!("snapshot: card template '{name}' not in catalog, skipped");
                    report.skipped_cards.push(name.clone());
                    continue;
                };
                if let Err(full) = player.try_add_card(card, world.rules.hand_limit) {
                    log::warn!("snapshot: player {} {full}, dropped '{name}'", rec.id);
                    report.skipped_cards.push(name.clone());
                }
            }

            let previous = rec.previous_tile_id.filter(|id| world.registry.contains(*id));
            if world.registry.contains(rec.current_tile_id) {
                world.place_token(rec.id, rec.current_tile_id, previous);
            } else {
                log::warn!(
                    "snapshot: player {} stood on unknown tile {}, position kept",
                    rec.id,
                    rec.current_tile_id
                );
                report.unknown_tiles.push(rec.current_tile_id);
            }
            report.players_restored += 1;
        }

        report
    }
}

/// Holds at most one snapshot across a world rebuild.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    retained: Option<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retain(&mut self, snapshot: Snapshot) {
        self.retained = Some(snapshot);
    }

    pub fn retained(&self) -> Option<&Snapshot> {
        self.retained.as_ref()
    }

    /// Apply `snapshot` and drop whatever was retained, so a stale copy
    /// cannot be reapplied by a later restore.
    pub fn restore(&mut self, snapshot: &Snapshot, world: &mut World) -> RestoreReport {
        let report = snapshot.apply(world);
        self.retained = None;
        report
    }

    /// Apply and clear the retained snapshot. None if nothing is retained.
    pub fn restore_retained(&mut self, world: &mut World) -> Option<RestoreReport> {
        let snapshot = self.retained.take()?;
        Some(snapshot.apply(world))
    }
}

mod id_or_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(id.map_or(-1, i64::from))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(u32::try_from(raw).ok())
    }
}

//! Players and the session roster.

use crate::{
    card::CardInstance,
    types::{CardInstanceId, Money, PlayerId, TileId},
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("hand is full ({limit} cards)")]
pub struct HandFull {
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id:            PlayerId,
    pub current_tile:  TileId,
    /// Anti-backtrack memory: the tile entered from on the last step.
    pub previous_tile: Option<TileId>,
    pub money:         Money,
    pub frozen_turns:  u32,
    inventory:         Vec<CardInstance>,
}

impl Player {
    pub fn new(id: PlayerId, start_tile: TileId, money: Money) -> Self {
        Self {
            id,
            current_tile: start_tile,
            previous_tile: None,
            money,
            frozen_turns: 0,
            inventory: Vec::new(),
        }
    }

    pub fn change_money(&mut self, delta: Money) {
        self.money += delta;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_turns > 0
    }

    /// Freeze for `turns`. An existing longer freeze is kept.
    pub fn freeze(&mut self, turns: u32) {
        self.frozen_turns = self.frozen_turns.max(turns);
    }

    pub fn inventory(&self) -> &[CardInstance] {
        &self.inventory
    }

    pub fn card(&self, instance_id: CardInstanceId) -> Option<&CardInstance> {
        self.inventory.iter().find(|c| c.instance_id == instance_id)
    }

    pub fn has_room(&self, hand_limit: usize) -> bool {
        self.inventory.len() < hand_limit
    }

    /// Add a card, rejecting before any mutation if the hand is full.
    pub fn try_add_card(&mut self, card: CardInstance, hand_limit: usize) -> Result<(), HandFull> {
        if !self.has_room(hand_limit) {
            return Err(HandFull { limit: hand_limit });
        }
        self.inventory.push(card);
        Ok(())
    }

    pub fn remove_card(&mut self, instance_id: CardInstanceId) -> Option<CardInstance> {
        let idx = self.inventory.iter().position(|c| c.instance_id == instance_id)?;
        Some(self.inventory.remove(idx))
    }

    pub fn clear_inventory(&mut self) {
        self.inventory.clear();
    }

    pub fn template_ids(&self) -> Vec<String> {
        self.inventory.iter().map(|c| c.template_id.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: BTreeMap<PlayerId, Player>,
}

impl Roster {
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn insert(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Player ids in ascending order.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Ids of players standing on `tile`, excluding `except`.
    pub fn occupants_of(&self, tile: TileId, except: Option<PlayerId>) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.current_tile == tile && Some(p.id) != except)
            .map(|p| p.id)
            .collect()
    }

    pub fn total_money(&self) -> Money {
        self.players.values().map(|p| p.money).sum()
    }
}

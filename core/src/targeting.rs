//! Card targeting engine.
//!
//! Range is a breadth-first walk along the same links movement uses.
//! A card is consumed only when its effect lands; a rejected card leaves
//! the hand and the board exactly as they were.

use crate::{
    card::CardEffect,
    effects::WorldEffects,
    player::Roster,
    registry::TileRegistry,
    types::{CardInstanceId, PlayerId, TileId, Turn},
};
use std::collections::{HashSet, VecDeque};

/// Tiles within `radius` links of `origin`, in BFS order.
/// The origin itself is never included.
pub fn compute_range(registry: &TileRegistry, origin: TileId, radius: u32) -> Vec<TileId> {
    let mut result = Vec::new();
    if !registry.contains(origin) {
        return result;
    }
    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([(origin, 0u32)]);

    while let Some((node, dist)) = queue.pop_front() {
        if dist > 0 {
            result.push(node);
        }
        if dist >= radius {
            continue;
        }
        for next in registry.neighbors_of(node) {
            if visited.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardResult {
    Froze { players: Vec<PlayerId>, turns: u32 },
    Obstructed { tile: TileId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardRejection {
    #[error("card {0} is not in hand")]
    NotInHand(CardInstanceId),
    #[error("acting player {0} not found")]
    UnknownPlayer(PlayerId),
    #[error("tile {0} not found")]
    UnknownTile(TileId),
    #[error("tile {0} is out of range")]
    OutOfRange(TileId),
    #[error("tile {0} is already obstructed")]
    AlreadyObstructed(TileId),
    #[error("no opposing player on tile {0}")]
    NoTarget(TileId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    Played { template_id: String, result: CardResult },
    Rejected(CardRejection),
}

impl CardOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Played { .. })
    }
}

/// Adjudicate and, on success, execute a card against `target`.
pub fn apply_card(
    turn:     Turn,
    actor:    PlayerId,
    card_id:  CardInstanceId,
    target:   TileId,
    registry: &mut TileRegistry,
    roster:   &mut Roster,
    effects:  &mut dyn WorldEffects,
) -> CardOutcome {
    let Some(player) = roster.get(actor) else {
        return CardOutcome::Rejected(CardRejection::UnknownPlayer(actor));
    };
    let Some(card) = player.card(card_id).cloned() else {
        return CardOutcome::Rejected(CardRejection::NotInHand(card_id));
    };
    if !registry.contains(target) {
        return CardOutcome::Rejected(CardRejection::UnknownTile(target));
    }
    if !compute_range(registry, player.current_tile, card.range).contains(&target) {
        return CardOutcome::Rejected(CardRejection::OutOfRange(target));
    }

    let result = match card.effect {
        CardEffect::Barricade => {
            let Some(tile) = registry.lookup_mut(target) else {
                return CardOutcome::Rejected(CardRejection::UnknownTile(target));
            };
            if tile.has_obstruction {
                return CardOutcome::Rejected(CardRejection::AlreadyObstructed(target));
            }
            tile.has_obstruction = true;
            effects.spawn_obstruction(target);
            CardResult::Obstructed { tile: target }
        }
        CardEffect::Freeze { turns } => {
            let victims = roster.occupants_of(target, Some(actor));
            if victims.is_empty() {
                return CardOutcome::Rejected(CardRejection::NoTarget(target));
            }
            for id in &victims {
                if let Some(victim) = roster.get_mut(*id) {
                    victim.freeze(turns);
                }
            }
            CardResult::Froze { players: victims, turns }
        }
    };

    if let Some(player) = roster.get_mut(actor) {
        player.remove_card(card_id);
    }
    log::info!(
        "turn={turn} targeting: player {actor} played '{}' on tile {target}",
        card.template_id
    );
    CardOutcome::Played { template_id: card.template_id, result }
}

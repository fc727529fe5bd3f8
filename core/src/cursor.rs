//! Turn cursor: whose turn it is.
//!
//! Three construction paths, one per way a round can begin:
//!   - shuffled:   fresh random order
//!   - roll-off:   descending setup roll, ties by ascending id
//!   - reload:     ascending id, used after a snapshot restore
//!
//! The order is never empty, so `index` is always in range.

use crate::{
    error::{GameError, GameResult},
    rng::StreamRng,
    types::PlayerId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBasis {
    Shuffled,
    RollOff,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnCursor {
    order: Vec<PlayerId>,
    index: usize,
    basis: OrderBasis,
}

impl TurnCursor {
    pub fn new(order: Vec<PlayerId>, basis: OrderBasis) -> GameResult<Self> {
        if order.is_empty() {
            return Err(GameError::EmptyTurnOrder);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = order.iter().find(|id| !seen.insert(**id)) {
            return Err(GameError::DuplicatePlayer { id: *dup });
        }
        Ok(Self { order, index: 0, basis })
    }

    pub fn shuffled(players: &[PlayerId], rng: &mut StreamRng) -> GameResult<Self> {
        let mut order = players.to_vec();
        rng.shuffle(&mut order);
        Self::new(order, OrderBasis::Shuffled)
    }

    /// Order by setup roll, highest first. Equal rolls keep ascending id.
    pub fn from_rolls(rolls: &[(PlayerId, u32)]) -> GameResult<Self> {
        let mut sorted = rolls.to_vec();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Self::new(sorted.into_iter().map(|(id, _)| id).collect(), OrderBasis::RollOff)
    }

    pub fn from_reload(players: &[PlayerId]) -> GameResult<Self> {
        let mut order = players.to_vec();
        order.sort_unstable();
        Self::new(order, OrderBasis::Reload)
    }

    pub fn current(&self) -> PlayerId {
        self.order[self.index]
    }

    /// Move to the next player, wrapping. Returns the new current player.
    pub fn advance(&mut self) -> PlayerId {
        self.index = (self.index + 1) % self.order.len();
        self.current()
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn basis(&self) -> OrderBasis {
        self.basis
    }
}

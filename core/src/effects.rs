//! Outbound collaborator capability.
//!
//! The core tells the presentation layer *when* a world-building side
//! effect happens. Calls are fire-and-forget: nothing returned feeds back
//! into game state.

use crate::types::{PlayerId, TileId};
use std::any::Any;

pub trait WorldEffects: Send {
    fn spawn_structure(&mut self, _tile: TileId) {}
    fn spawn_obstruction(&mut self, _tile: TileId) {}
    fn clear_obstruction(&mut self, _tile: TileId) {}
    fn shop_opened(&mut self, _player: PlayerId, _tile: TileId) {}
    fn shop_closed(&mut self, _player: PlayerId) {}

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl WorldEffects for NoopEffects {
    fn as_any(&self) -> &dyn Any { self }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectCall {
    SpawnStructure(TileId),
    SpawnObstruction(TileId),
    ClearObstruction(TileId),
    ShopOpened(PlayerId, TileId),
    ShopClosed(PlayerId),
}

/// Records every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordedEffects {
    pub calls: Vec<EffectCall>,
}

impl RecordedEffects {
    pub fn count(&self, call: EffectCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl WorldEffects for RecordedEffects {
    fn spawn_structure(&mut self, tile: TileId) {
        self.calls.push(EffectCall::SpawnStructure(tile));
    }
    fn spawn_obstruction(&mut self, tile: TileId) {
        self.calls.push(EffectCall::SpawnObstruction(tile));
    }
    fn clear_obstruction(&mut self, tile: TileId) {
        self.calls.push(EffectCall::ClearObstruction(tile));
    }
    fn shop_opened(&mut self, player: PlayerId, tile: TileId) {
        self.calls.push(EffectCall::ShopOpened(player, tile));
    }
    fn shop_closed(&mut self, player: PlayerId) {
        self.calls.push(EffectCall::ShopClosed(player));
    }
    fn as_any(&self) -> &dyn Any { self }
}

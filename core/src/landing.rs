//! Tile event resolver: what happens where a token comes to rest.
//!
//! Runs once per turn on the final tile only. Rules, first match wins:
//!   1. Unowned Empty land the mover can afford: offer a purchase.
//!   2. Empty land owned by someone else: pay rent to the owner.
//!   3. Shop: open the shop and hold the turn until it closes.
//!   4. Anything else: no effect here.
//!
//! Rent is a closed-loop transfer. It never creates or destroys money.

use crate::{
    effects::WorldEffects,
    registry::TileRegistry,
    player::Roster,
    tile::TileCategory,
    types::{Money, PlayerId, TileId, Turn},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingOutcome {
    PurchaseOffered { tile: TileId, price: Money },
    RentPaid { owner: PlayerId, amount: Money },
    ShopOpened { tile: TileId },
    NoEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { tile: TileId, price: Money },
    Declined { tile: TileId },
    InsufficientFunds { balance: Money, price: Money },
    /// The tile vanished, was taken, or no offer was pending.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPurchase {
    player: PlayerId,
    tile:   TileId,
}

#[derive(Debug, Clone, Default)]
pub struct TileEventResolver {
    pending:   Option<PendingPurchase>,
    shop_open: bool,
}

impl TileEventResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shop_open(&self) -> bool {
        self.shop_open
    }

    pub fn pending_purchase(&self) -> Option<(PlayerId, TileId)> {
        self.pending.map(|p| (p.player, p.tile))
    }

    pub fn resolve(
        &mut self,
        turn:     Turn,
        player:   PlayerId,
        tile_id:  TileId,
        registry: &TileRegistry,
        roster:   &mut Roster,
    ) -> LandingOutcome {
        let Some(tile) = registry.lookup(tile_id) else {
            log::warn!("turn={turn} landing: tile {tile_id} not found");
            return LandingOutcome::NoEffect;
        };
        let Some(balance) = roster.get(player).map(|p| p.money) else {
            log::warn!("turn={turn} landing: player {player} not found");
            return LandingOutcome::NoEffect;
        };

        match (tile.category, tile.owner) {
            (TileCategory::Empty, None) => {
                if balance < tile.purchase_price {
                    log::info!(
                        "turn={turn} landing: player {player} cannot afford tile {tile_id} \
                         (${balance} < ${})",
                        tile.purchase_price
                    );
                    return LandingOutcome::NoEffect;
                }
                self.pending = Some(PendingPurchase { player, tile: tile_id });
                LandingOutcome::PurchaseOffered { tile: tile_id, price: tile.purchase_price }
            }
            (TileCategory::Empty, Some(owner)) if owner != player => {
                if !roster.contains(owner) {
                    log::warn!("turn={turn} landing: owner {owner} of tile {tile_id} not found");
                    return LandingOutcome::NoEffect;
                }
                let amount = tile.rent_price;
                if let Some(payer) = roster.get_mut(player) {
                    payer.change_money(-amount);
                }
                if let Some(payee) = roster.get_mut(owner) {
                    payee.change_money(amount);
                }
                log::info!("turn={turn} landing: player {player} paid ${amount} rent to {owner}");
                LandingOutcome::RentPaid { owner, amount }
            }
            (TileCategory::Shop, _) => {
                self.shop_open = true;
                LandingOutcome::ShopOpened { tile: tile_id }
            }
            _ => LandingOutcome::NoEffect,
        }
    }

    /// Settle a pending purchase offer. Re-checks the price and owner
    /// at decision time; nothing is mutated unless the purchase goes through.
    pub fn decide_purchase(
        &mut self,
        turn:     Turn,
        accept:   bool,
        registry: &mut TileRegistry,
        roster:   &mut Roster,
        effects:  &mut dyn WorldEffects,
    ) -> PurchaseOutcome {
        let Some(PendingPurchase { player, tile: tile_id }) = self.pending.take() else {
            return PurchaseOutcome::Unavailable;
        };
        if !accept {
            log::info!("turn={turn} landing: player {player} declined tile {tile_id}");
            return PurchaseOutcome::Declined { tile: tile_id };
        }
        let (Some(tile), Some(buyer)) = (registry.lookup_mut(tile_id), roster.get_mut(player)) else {
            return PurchaseOutcome::Unavailable;
        };
        if tile.owner.is_some() || !tile.category.is_ownable() {
            return PurchaseOutcome::Unavailable;
        }
        let price = tile.purchase_price;
        if buyer.money < price {
            return PurchaseOutcome::InsufficientFunds { balance: buyer.money, price };
        }

        buyer.change_money(-price);
        tile.owner = Some(player);
        tile.has_building = true;
        effects.spawn_structure(tile_id);
        log::info!("turn={turn} landing: player {player} bought tile {tile_id} for ${price}");
        PurchaseOutcome::Purchased { tile: tile_id, price }
    }

    /// The external "shop interaction complete" signal.
    /// Returns false if no shop was open.
    pub fn close_shop(&mut self) -> bool {
        std::mem::replace(&mut self.shop_open, false)
    }
}

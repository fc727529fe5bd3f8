//! Shop session: card offers drawn when a token lands on a Shop tile.
//!
//! Offers are drawn uniformly with replacement from the catalog.
//! A purchase is checked against balance and hand limit before anything
//! is mutated; the bought card is a fresh instance.

use crate::{
    card::CardCatalog,
    player::Roster,
    rng::StreamRng,
    types::{Money, PlayerId, TileId, Turn},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopPurchase {
    Bought { template_id: String, price: Money },
    InsufficientFunds { balance: Money, price: Money },
    HandFull { limit: usize },
    NoSuchOffer { offer: usize },
    UnknownTemplate { template_id: String },
    UnknownPlayer,
}

impl ShopPurchase {
    pub fn status_message(&self) -> Option<String> {
        match self {
            Self::Bought { .. } => None,
            Self::InsufficientFunds { balance, price } => {
                Some(format!("Not enough money: ${balance} < ${price}"))
            }
            Self::HandFull { limit } => Some(format!("Hand is full ({limit} cards)")),
            Self::NoSuchOffer { offer } => Some(format!("No card in offer slot {offer}")),
            Self::UnknownTemplate { template_id } => {
                Some(format!("Card '{template_id}' is no longer sold"))
            }
            Self::UnknownPlayer => Some("No such player".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSession {
    pub player: PlayerId,
    pub tile:   TileId,
    offers:     Vec<String>,
}

impl ShopSession {
    pub fn open(
        player:  PlayerId,
        tile:    TileId,
        catalog: &CardCatalog,
        count:   usize,
        rng:     &mut StreamRng,
    ) -> Self {
        let ids = catalog.template_ids();
        let offers = (0..count)
            .filter_map(|_| rng.pick_index(ids.len()).map(|i| ids[i].to_string()))
            .collect();
        Self { player, tile, offers }
    }

    pub fn offers(&self) -> &[String] {
        &self.offers
    }

    pub fn buy(
        &mut self,
        turn:       Turn,
        offer:      usize,
        roster:     &mut Roster,
        catalog:    &mut CardCatalog,
        hand_limit: usize,
    ) -> ShopPurchase {
        let Some(template_id) = self.offers.get(offer).cloned() else {
            return ShopPurchase::NoSuchOffer { offer };
        };
        let Some(price) = catalog.get(&template_id).map(|t| t.price) else {
            return ShopPurchase::UnknownTemplate { template_id };
        };
        let Some(buyer) = roster.get_mut(self.player) else {
            return ShopPurchase::UnknownPlayer;
        };
        if buyer.money < price {
            return ShopPurchase::InsufficientFunds { balance: buyer.money, price };
        }
        if !buyer.has_room(hand_limit) {
            return ShopPurchase::HandFull { limit: hand_limit };
        }
        let Some(card) = catalog.instantiate(&template_id) else {
            return ShopPurchase::UnknownTemplate { template_id };
        };
        if let Err(full) = buyer.try_add_card(card, hand_limit) {
            return ShopPurchase::HandFull { limit: full.limit };
        }
        buyer.change_money(-price);
        self.offers.remove(offer);
        log::info!("turn={turn} shop: player {} bought '{template_id}' for ${price}", self.player);
        ShopPurchase::Bought { template_id, price }
    }
}

use crate::types::{CardInstanceId, TileId};
use serde::{Deserialize, Serialize};

/// Every external signal the turn sequencer accepts.
/// Variants are appended only, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Turn flow ─────────────────────────────────
    RollDice,
    ChooseDirection { tile: TileId },

    // ── Landing decisions ─────────────────────────
    AcceptPurchase,
    DeclinePurchase,
    BuyShopCard { offer: usize },
    LeaveShop,

    // ── Card targeting ────────────────────────────
    BeginCardTargeting { card: CardInstanceId },
    TargetTile { tile: TileId },
    CancelCardTargeting,
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RollDice                 => "roll_dice",
            Self::ChooseDirection { .. }   => "choose_direction",
            Self::AcceptPurchase           => "accept_purchase",
            Self::DeclinePurchase          => "decline_purchase",
            Self::BuyShopCard { .. }       => "buy_shop_card",
            Self::LeaveShop                => "leave_shop",
            Self::BeginCardTargeting { .. }=> "begin_card_targeting",
            Self::TargetTile { .. }        => "target_tile",
            Self::CancelCardTargeting      => "cancel_card_targeting",
        }
    }
}

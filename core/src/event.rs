//! Outbound game events.
//!
//! RULE: Every state change the sequencer makes is announced as an event.
//! Presentation layers render from events; the store persists them.

use crate::{
    cursor::OrderBasis,
    error::GameResult,
    movement::HaltReason,
    types::{CardInstanceId, Money, PlayerId, RunId, TileId, Turn},
};
use serde::{Deserialize, Serialize};

/// Variants are added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session events ─────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed:   u64,
    },
    TurnOrderSet {
        order: Vec<PlayerId>,
        basis: OrderBasis,
    },
    SetupRoll {
        player: PlayerId,
        value:  u32,
    },

    // ── Turn flow ──────────────────────────────────
    TurnStarted {
        turn:   Turn,
        player: PlayerId,
    },
    TurnSkipped {
        turn:             Turn,
        player:           PlayerId,
        frozen_remaining: u32,
    },
    DiceRolled {
        turn:   Turn,
        player: PlayerId,
        value:  u32,
    },
    TurnCompleted {
        turn:   Turn,
        player: PlayerId,
    },
    SequencerHalted {
        turn:   Turn,
        reason: String,
    },

    // ── Movement ───────────────────────────────────
    TokenStepped {
        turn:   Turn,
        player: PlayerId,
        from:   TileId,
        to:     TileId,
    },
    DirectionRequested {
        turn:       Turn,
        player:     PlayerId,
        at:         TileId,
        candidates: Vec<TileId>,
    },
    ObstructionCleared {
        turn:   Turn,
        player: PlayerId,
        tile:   TileId,
    },
    MovementFinished {
        turn:        Turn,
        player:      PlayerId,
        tile:        TileId,
        steps_taken: u32,
        halt:        HaltReason,
    },

    // ── Landing ────────────────────────────────────
    PurchaseOffered {
        turn:   Turn,
        player: PlayerId,
        tile:   TileId,
        price:  Money,
    },
    TilePurchased {
        turn:   Turn,
        player: PlayerId,
        tile:   TileId,
        price:  Money,
    },
    PurchaseDeclined {
        turn:   Turn,
        player: PlayerId,
        tile:   TileId,
    },
    RentPaid {
        turn:   Turn,
        payer:  PlayerId,
        owner:  PlayerId,
        tile:   TileId,
        amount: Money,
    },

    // ── Shop ───────────────────────────────────────
    ShopOpened {
        turn:   Turn,
        player: PlayerId,
        tile:   TileId,
        offers: Vec<String>,
    },
    ShopCardBought {
        turn:        Turn,
        player:      PlayerId,
        template_id: String,
        price:       Money,
    },
    ShopClosed {
        turn:   Turn,
        player: PlayerId,
    },

    // ── Cards ──────────────────────────────────────
    CardTargetingStarted {
        turn:   Turn,
        player: PlayerId,
        card:   CardInstanceId,
        range:  Vec<TileId>,
    },
    CardTargetingCancelled {
        turn:   Turn,
        player: PlayerId,
    },
    CardPlayed {
        turn:        Turn,
        player:      PlayerId,
        template_id: String,
        target:      TileId,
    },
    CardRejected {
        turn:   Turn,
        player: PlayerId,
        target: TileId,
        reason: String,
    },
    PlayerFrozen {
        turn:   Turn,
        player: PlayerId,
        by:     PlayerId,
        turns:  u32,
    },
    ObstructionPlaced {
        turn: Turn,
        tile: TileId,
        by:   PlayerId,
    },

    // ── Snapshots ──────────────────────────────────
    SnapshotCaptured {
        turn:    Turn,
        players: usize,
        tiles:   usize,
    },
    SnapshotRestored {
        turn:          Turn,
        players:       usize,
        tiles:         usize,
        skipped_cards: Vec<String>,
    },

    // ── User-visible status ────────────────────────
    CommandRejected {
        turn:    Turn,
        command: String,
        phase:   String,
    },
    Status {
        turn:    Turn,
        message: String,
    },
}

impl GameEvent {
    /// The turn the event belongs to. Setup events precede every turn.
    pub fn turn(&self) -> Option<Turn> {
        match self {
            Self::RunInitialized { .. } | Self::TurnOrderSet { .. } | Self::SetupRoll { .. } => None,
            Self::TurnStarted { turn, .. }
            | Self::TurnSkipped { turn, .. }
            | Self::DiceRolled { turn, .. }
            | Self::TurnCompleted { turn, .. }
            | Self::SequencerHalted { turn, .. }
            | Self::TokenStepped { turn, .. }
            | Self::DirectionRequested { turn, .. }
            | Self::ObstructionCleared { turn, .. }
            | Self::MovementFinished { turn, .. }
            | Self::PurchaseOffered { turn, .. }
            | Self::TilePurchased { turn, .. }
            | Self::PurchaseDeclined { turn, .. }
            | Self::RentPaid { turn, .. }
            | Self::ShopOpened { turn, .. }
            | Self::ShopCardBought { turn, .. }
            | Self::ShopClosed { turn, .. }
            | Self::CardTargetingStarted { turn, .. }
            | Self::CardTargetingCancelled { turn, .. }
            | Self::CardPlayed { turn, .. }
            | Self::CardRejected { turn, .. }
            | Self::PlayerFrozen { turn, .. }
            | Self::ObstructionPlaced { turn, .. }
            | Self::SnapshotCaptured { turn, .. }
            | Self::SnapshotRestored { turn, .. }
            | Self::CommandRejected { turn, .. }
            | Self::Status { turn, .. } => Some(*turn),
        }
    }

    /// Stable name of the variant. Used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }         => "run_initialized",
            Self::TurnOrderSet { .. }           => "turn_order_set",
            Self::SetupRoll { .. }              => "setup_roll",
            Self::TurnStarted { .. }            => "turn_started",
            Self::TurnSkipped { .. }            => "turn_skipped",
            Self::DiceRolled { .. }             => "dice_rolled",
            Self::TurnCompleted { .. }          => "turn_completed",
            Self::SequencerHalted { .. }        => "sequencer_halted",
            Self::TokenStepped { .. }           => "token_stepped",
            Self::DirectionRequested { .. }     => "direction_requested",
            Self::ObstructionCleared { .. }     => "obstruction_cleared",
            Self::MovementFinished { .. }       => "movement_finished",
            Self::PurchaseOffered { .. }        => "purchase_offered",
            Self::TilePurchased { .. }          => "tile_purchased",
            Self::PurchaseDeclined { .. }       => "purchase_declined",
            Self::RentPaid { .. }               => "rent_paid",
            Self::ShopOpened { .. }             => "shop_opened",
            Self::ShopCardBought { .. }         => "shop_card_bought",
            Self::ShopClosed { .. }             => "shop_closed",
            Self::CardTargetingStarted { .. }   => "card_targeting_started",
            Self::CardTargetingCancelled { .. } => "card_targeting_cancelled",
            Self::CardPlayed { .. }             => "card_played",
            Self::CardRejected { .. }           => "card_rejected",
            Self::PlayerFrozen { .. }           => "player_frozen",
            Self::ObstructionPlaced { .. }      => "obstruction_placed",
            Self::SnapshotCaptured { .. }       => "snapshot_captured",
            Self::SnapshotRestored { .. }       => "snapshot_restored",
            Self::CommandRejected { .. }        => "command_rejected",
            Self::Status { .. }                 => "status",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub turn:       Turn,
    pub event_type: String,
    pub payload:    String, // JSON-serialized GameEvent
}

impl EventLogEntry {
    pub fn from_event(run_id: &str, turn: Turn, event: &GameEvent) -> GameResult<Self> {
        Ok(Self {
            id:         None,
            run_id:     run_id.to_string(),
            turn,
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }
}

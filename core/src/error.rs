use crate::types::{PlayerId, TileId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tile id {id} is already registered to a different tile")]
    DuplicateTile { id: TileId },

    #[error("Invalid board: {reason}")]
    InvalidBoard { reason: String },

    #[error("Turn order is empty")]
    EmptyTurnOrder,

    #[error("Turn order references unknown player {id}")]
    UnknownPlayer { id: PlayerId },

    #[error("Player {id} appears more than once in the turn order")]
    DuplicatePlayer { id: PlayerId },

    #[error("Card template '{template_id}' not found in catalog")]
    UnknownCardTemplate { template_id: String },

    #[error("Turn sequencer halted: {reason}")]
    SequencerHalted { reason: String },

    #[error("Game not started")]
    NotStarted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;

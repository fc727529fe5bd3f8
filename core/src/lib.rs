//! Headless core of a turn-based board game: the tile graph, movement,
//! landing effects, cards, the turn state machine, and snapshots.

pub mod card;
pub mod command;
pub mod config;
pub mod cursor;
pub mod effects;
pub mod engine;
pub mod error;
pub mod event;
pub mod landing;
pub mod movement;
pub mod player;
pub mod registry;
pub mod rng;
pub mod shop;
pub mod snapshot;
pub mod store;
pub mod targeting;
pub mod tile;
pub mod turn;
pub mod types;
pub mod world;

//! Shared primitive types used across the entire game core.

/// A board tile identifier. Assigned once by the registry.
pub type TileId = u32;

/// A player identifier, unique within a session.
pub type PlayerId = u32;

/// Count of turns entered so far. Turn 0 is the pre-game setup.
pub type Turn = u64;

/// Currency amount. Signed: rent may drive a balance below zero.
pub type Money = i64;

/// Identifier of one live card instance held in a hand.
pub type CardInstanceId = u64;

/// The canonical run identifier.
pub type RunId = String;

//! Deterministic random number generation.
//!
//! RULE: Nothing in the game core may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed stored on the run record.
//!
//! Each consumer gets its own stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Dice rolls stay reproducible no matter how often the shop draws.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

/// A named, deterministic RNG stream.
#[derive(Debug, Clone)]
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll an integer in [1, faces]. `faces` of 0 is treated as 1.
    pub fn roll_die(&mut self, faces: u32) -> u32 {
        self.inner.gen_range(1..=faces.max(1))
    }

    /// Pick an index in [0, len). Returns None for an empty range.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.inner.gen_range(0..len))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Dice = 0,
    TurnOrder = 1,
    Shop = 2,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dice => "dice",
            Self::TurnOrder => "turn_order",
            Self::Shop => "shop",
        }
    }
}

/// All non-dice streams for a single run.
/// Dice live behind [`DiceSource`] so they can be substituted.
#[derive(Debug, Clone)]
pub struct RngBank {
    master_seed: u64,
    turn_order:  StreamRng,
    shop:        StreamRng,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            turn_order: Self::stream(master_seed, RngSlot::TurnOrder),
            shop:       Self::stream(master_seed, RngSlot::Shop),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn dice(&self) -> StreamRng {
        Self::stream(self.master_seed, RngSlot::Dice)
    }

    pub fn turn_order(&mut self) -> &mut StreamRng {
        &mut self.turn_order
    }

    pub fn shop(&mut self) -> &mut StreamRng {
        &mut self.shop
    }

    fn stream(master_seed: u64, slot: RngSlot) -> StreamRng {
        StreamRng::new(master_seed, slot as u64).with_name(slot.name())
    }
}

/// The pluggable random-integer source behind every dice roll.
pub trait DiceSource: Send {
    /// Produce a value in [1, faces].
    fn roll(&mut self, faces: u32) -> u32;
}

impl DiceSource for StreamRng {
    fn roll(&mut self, faces: u32) -> u32 {
        self.roll_die(faces)
    }
}

/// Replays a fixed list of rolls. Values are clamped into [1, faces].
/// Once the script runs dry every further roll returns 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self { rolls: rolls.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, faces: u32) -> u32 {
        match self.rolls.pop_front() {
            Some(v) => v.clamp(1, faces.max(1)),
            None => {
                log::warn!("scripted dice exhausted, rolling 1");
                1
            }
        }
    }
}

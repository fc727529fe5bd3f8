//! Movement resolver: walks a token across the tile graph.
//!
//! Per step:
//!   1. Candidates = outgoing neighbors minus the previous tile.
//!   2. No candidates but a previous tile: reverse onto it (dead end).
//!   3. No candidates and no previous tile: halt, budget is lost.
//!   4. One candidate: take it.
//!   5. Several: suspend until an external choice arrives.
//!   6. Entering an obstructed tile clears the obstruction and ends the move.
//!
//! A [`MoveSession`] holds all walk state, so every call starts clean.

use crate::{
    effects::WorldEffects,
    registry::TileRegistry,
    types::TileId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum HaltReason {
    BudgetSpent,
    NoLegalMove,
    Obstructed { tile: TileId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Tiles entered, in order. The start tile is not included.
    pub visited:       Vec<TileId>,
    pub final_tile:    TileId,
    pub previous_tile: Option<TileId>,
    pub halt:          HaltReason,
    /// How many times the walk waited for a direction choice.
    pub suspensions:   usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStep {
    Stepped { from: TileId, to: TileId, obstructed: bool },
    AwaitingDirection { at: TileId, candidates: Vec<TileId> },
    Finished(MoveOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceRejected {
    #[error("no direction choice is pending")]
    NotPending,
    #[error("tile {0} is not one of the offered directions")]
    NotACandidate(TileId),
}

/// Legal next tiles from `current` given the anti-backtrack memory.
pub fn legal_moves(registry: &TileRegistry, current: TileId, previous: Option<TileId>) -> Vec<TileId> {
    let candidates: Vec<TileId> = registry
        .neighbors_of(current)
        .into_iter()
        .filter(|n| Some(*n) != previous)
        .collect();
    match (candidates.is_empty(), previous) {
        (true, Some(back)) if registry.contains(back) => vec![back],
        _ => candidates,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSession {
    current:     TileId,
    previous:    Option<TileId>,
    remaining:   u32,
    visited:     Vec<TileId>,
    pending:     Option<Vec<TileId>>,
    chosen:      Option<TileId>,
    halt:        Option<HaltReason>,
    suspensions: usize,
}

impl MoveSession {
    pub fn new(start: TileId, budget: u32, previous: Option<TileId>) -> Self {
        Self {
            current: start,
            previous,
            remaining: budget,
            visited: Vec::new(),
            pending: None,
            chosen: None,
            halt: None,
            suspensions: 0,
        }
    }

    pub fn current(&self) -> TileId {
        self.current
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn pending_choices(&self) -> Option<&[TileId]> {
        self.pending.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.halt.is_some()
    }

    /// Supply the direction for a pending branch.
    pub fn choose(&mut self, tile: TileId) -> Result<(), ChoiceRejected> {
        let pending = self.pending.as_ref().ok_or(ChoiceRejected::NotPending)?;
        if !pending.contains(&tile) {
            return Err(ChoiceRejected::NotACandidate(tile));
        }
        self.pending = None;
        self.chosen = Some(tile);
        Ok(())
    }

    /// Advance by at most one step.
    pub fn step(&mut self, registry: &mut TileRegistry, effects: &mut dyn WorldEffects) -> MoveStep {
        if self.halt.is_some() {
            return MoveStep::Finished(self.outcome());
        }
        if let Some(candidates) = &self.pending {
            return MoveStep::AwaitingDirection { at: self.current, candidates: candidates.clone() };
        }
        if self.remaining == 0 {
            return self.finish(HaltReason::BudgetSpent);
        }

        let next = match self.chosen.take() {
            Some(tile) => tile,
            None => {
                let candidates = legal_moves(registry, self.current, self.previous);
                match candidates.as_slice() {
                    [] => return self.finish(HaltReason::NoLegalMove),
                    [only] => *only,
                    _ => {
                        self.suspensions += 1;
                        self.pending = Some(candidates.clone());
                        return MoveStep::AwaitingDirection { at: self.current, candidates };
                    }
                }
            }
        };

        let from = self.current;
        self.previous = Some(from);
        self.current = next;
        self.remaining -= 1;
        self.visited.push(next);

        let obstructed = match registry.lookup_mut(next) {
            Some(tile) if tile.has_obstruction => {
                tile.has_obstruction = false;
                effects.clear_obstruction(next);
                self.halt = Some(HaltReason::Obstructed { tile: next });
                true
            }
            _ => false,
        };
        log::debug!("movement: {from} -> {next} ({} left{})",
            self.remaining, if obstructed { ", obstructed" } else { "" });

        MoveStep::Stepped { from, to: next, obstructed }
    }

    pub fn outcome(&self) -> MoveOutcome {
        MoveOutcome {
            visited:       self.visited.clone(),
            final_tile:    self.current,
            previous_tile: self.previous,
            halt:          self.halt.unwrap_or(HaltReason::BudgetSpent),
            suspensions:   self.suspensions,
        }
    }

    fn finish(&mut self, reason: HaltReason) -> MoveStep {
        self.halt = Some(reason);
        MoveStep::Finished(self.outcome())
    }
}

/// Supplies a direction whenever the walk reaches a branch.
pub trait DirectionChooser {
    fn choose_direction(&mut self, at: TileId, candidates: &[TileId]) -> TileId;
}

impl<F> DirectionChooser for F
where
    F: FnMut(TileId, &[TileId]) -> TileId,
{
    fn choose_direction(&mut self, at: TileId, candidates: &[TileId]) -> TileId {
        self(at, candidates)
    }
}

/// Run a whole walk, asking `chooser` at every branch.
///
/// A chooser answer outside the offered set is replaced by the first
/// candidate.
pub fn resolve_path(
    registry: &mut TileRegistry,
    effects:  &mut dyn WorldEffects,
    start:    TileId,
    budget:   u32,
    previous: Option<TileId>,
    chooser:  &mut dyn DirectionChooser,
) -> MoveOutcome {
    let mut session = MoveSession::new(start, budget, previous);
    loop {
        match session.step(registry, effects) {
            MoveStep::Stepped { .. } => {}
            MoveStep::AwaitingDirection { at, candidates } => {
                let pick = chooser.choose_direction(at, &candidates);
                if session.choose(pick).is_err() {
                    log::warn!("movement: chooser picked {pick} at {at}, not in {candidates:?}");
                    if let Some(first) = candidates.first() {
                        let _ = session.choose(*first);
                    }
                }
            }
            MoveStep::Finished(outcome) => return outcome,
        }
    }
}

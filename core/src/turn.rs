//! Turn sequencer: drives one player's turn at a time.
//!
//! ```text
//! AwaitingRoll ─roll─▶ (Rolling) ─▶ Moving ─▶ (ResolvingLanding) ─▶ TurnComplete
//!      ▲   │                         │  ▲            │    │                 │
//!      │   └▶ CardTargeting          └──┘ direction  │    └▶ AwaitingPurchase / ShopOpen
//!      │        (same player)                        │                      │
//!      └──────────────── next player ◀───────────────┴──────────────────────┘
//! ```
//! Rolling and ResolvingLanding never wait for input, so they pass within
//! a single command. A frozen player's turn goes straight to TurnComplete.
//!
//! RULES:
//!   - Only this sequencer moves the turn cursor.
//!   - Movement finishes before landing resolves; landing finishes before
//!     the cursor advances.
//!   - A command that does not fit the current phase changes nothing.
//!   - The sequencer halts only on configuration errors.

use crate::{
    command::PlayerCommand,
    cursor::TurnCursor,
    error::{GameError, GameResult},
    event::GameEvent,
    landing::{LandingOutcome, PurchaseOutcome, TileEventResolver},
    movement::{MoveSession, MoveStep},
    shop::{ShopPurchase, ShopSession},
    targeting::{apply_card, compute_range, CardOutcome, CardRejection, CardResult},
    types::{CardInstanceId, Money, PlayerId, TileId, Turn},
    world::World,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPhase {
    NotStarted,
    AwaitingRoll,
    /// A walk in progress. Waiting on a direction when the session has
    /// pending choices.
    Moving(MoveSession),
    AwaitingPurchase { tile: TileId, price: Money },
    ShopOpen(ShopSession),
    CardTargeting { card: CardInstanceId, range: Vec<TileId> },
    TurnComplete,
    Halted { reason: String },
}

impl TurnPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted               => "not_started",
            Self::AwaitingRoll             => "awaiting_roll",
            Self::Moving(s) if s.pending_choices().is_some() => "awaiting_direction",
            Self::Moving(_)                => "moving",
            Self::AwaitingPurchase { .. }  => "awaiting_purchase",
            Self::ShopOpen(_)              => "shop_open",
            Self::CardTargeting { .. }     => "card_targeting",
            Self::TurnComplete             => "turn_complete",
            Self::Halted { .. }            => "halted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnSequencer {
    cursor:  Option<TurnCursor>,
    phase:   TurnPhase,
    turn:    Turn,
    landing: TileEventResolver,
}

impl Default for TurnSequencer {
    fn default() -> Self { Self::new() }
}

impl TurnSequencer {
    pub fn new() -> Self {
        Self {
            cursor:  None,
            phase:   TurnPhase::NotStarted,
            turn:    0,
            landing: TileEventResolver::new(),
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn cursor(&self) -> Option<&TurnCursor> {
        self.cursor.as_ref()
    }

    pub fn landing(&self) -> &TileEventResolver {
        &self.landing
    }

    /// The player whose turn is active. None before the first round
    /// and after a halt.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::NotStarted | TurnPhase::Halted { .. } => None,
            _ => self.cursor.as_ref().map(TurnCursor::current),
        }
    }

    pub fn pending_directions(&self) -> Option<&[TileId]> {
        match &self.phase {
            TurnPhase::Moving(session) => session.pending_choices(),
            _ => None,
        }
    }

    pub fn shop_offers(&self) -> Option<&[String]> {
        match &self.phase {
            TurnPhase::ShopOpen(shop) => Some(shop.offers()),
            _ => None,
        }
    }

    /// Install a new turn order and enter the first player's turn.
    /// Replaces any round in progress.
    pub fn begin_round(
        &mut self,
        cursor: TurnCursor,
        world:  &mut World,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        log::info!("turn={} sequencer: new round, order {:?}", self.turn, cursor.order());
        events.push(GameEvent::TurnOrderSet {
            order: cursor.order().to_vec(),
            basis: cursor.basis(),
        });
        self.cursor = Some(cursor);
        self.landing = TileEventResolver::new();
        self.enter_turn(world, events)
    }

    /// Feed one external signal into the state machine.
    /// Events emitted before a halt are kept in `events`.
    pub fn handle(
        &mut self,
        cmd:    &PlayerCommand,
        world:  &mut World,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        match &self.phase {
            TurnPhase::Halted { reason } => {
                return Err(GameError::SequencerHalted { reason: reason.clone() });
            }
            TurnPhase::NotStarted => return Err(GameError::NotStarted),
            _ => {}
        }
        let Some(player) = self.cursor.as_ref().map(TurnCursor::current) else {
            return Err(GameError::NotStarted);
        };
        let turn = self.turn;

        let phase = std::mem::replace(&mut self.phase, TurnPhase::TurnComplete);
        match (phase, cmd) {
            (TurnPhase::AwaitingRoll, PlayerCommand::RollDice) => {
                let value = world.dice.roll(world.rules.dice_faces);
                log::info!("turn={turn} sequencer: player {player} rolled {value}");
                events.push(GameEvent::DiceRolled { turn, player, value });
                let Some(p) = world.roster.get(player) else {
                    return self.halt(GameError::UnknownPlayer { id: player }, events);
                };
                let session = MoveSession::new(p.current_tile, value, p.previous_tile);
                self.drive_movement(session, player, world, events)?;
            }

            (TurnPhase::Moving(mut session), PlayerCommand::ChooseDirection { tile }) => {
                match session.choose(*tile) {
                    Ok(()) => self.drive_movement(session, player, world, events)?,
                    Err(e) => {
                        events.push(GameEvent::Status { turn, message: e.to_string() });
                        self.phase = TurnPhase::Moving(session);
                    }
                }
            }

            (
                TurnPhase::AwaitingPurchase { .. },
                PlayerCommand::AcceptPurchase | PlayerCommand::DeclinePurchase,
            ) => {
                let accept = matches!(cmd, PlayerCommand::AcceptPurchase);
                let outcome = self.landing.decide_purchase(
                    turn,
                    accept,
                    &mut world.registry,
                    &mut world.roster,
                    world.effects.as_mut(),
                );
                match outcome {
                    PurchaseOutcome::Purchased { tile, price } => {
                        events.push(GameEvent::TilePurchased { turn, player, tile, price });
                    }
                    PurchaseOutcome::Declined { tile } => {
                        events.push(GameEvent::PurchaseDeclined { turn, player, tile });
                    }
                    PurchaseOutcome::InsufficientFunds { balance, price } => {
                        events.push(GameEvent::Status {
                            turn,
                            message: format!("Not enough money: ${balance} < ${price}"),
                        });
                    }
                    PurchaseOutcome::Unavailable => {
                        events.push(GameEvent::Status {
                            turn,
                            message: "This land is no longer for sale".into(),
                        });
                    }
                }
                self.complete_turn(player, world, events)?;
            }

            (TurnPhase::ShopOpen(mut shop), PlayerCommand::BuyShopCard { offer }) => {
                let outcome = shop.buy(
                    turn,
                    *offer,
                    &mut world.roster,
                    &mut world.catalog,
                    world.rules.hand_limit,
                );
                match outcome {
                    ShopPurchase::Bought { template_id, price } => {
                        events.push(GameEvent::ShopCardBought { turn, player, template_id, price });
                    }
                    other => {
                        let message = other.status_message().unwrap_or_default();
                        events.push(GameEvent::Status { turn, message });
                    }
                }
                self.phase = TurnPhase::ShopOpen(shop);
            }

            (TurnPhase::ShopOpen(shop), PlayerCommand::LeaveShop) => {
                self.landing.close_shop();
                world.effects.shop_closed(shop.player);
                events.push(GameEvent::ShopClosed { turn, player });
                self.complete_turn(player, world, events)?;
            }

            (TurnPhase::AwaitingRoll, PlayerCommand::BeginCardTargeting { card }) => {
                let target = world
                    .roster
                    .get(player)
                    .and_then(|p| p.card(*card).map(|c| (p.current_tile, c.range)));
                match target {
                    Some((origin, radius)) => {
                        let range = compute_range(&world.registry, origin, radius);
                        events.push(GameEvent::CardTargetingStarted {
                            turn,
                            player,
                            card: *card,
                            range: range.clone(),
                        });
                        self.phase = TurnPhase::CardTargeting { card: *card, range };
                    }
                    None => {
                        events.push(GameEvent::Status {
                            turn,
                            message: CardRejection::NotInHand(*card).to_string(),
                        });
                        self.phase = TurnPhase::AwaitingRoll;
                    }
                }
            }

            (TurnPhase::CardTargeting { card, range }, PlayerCommand::TargetTile { tile }) => {
                let outcome = apply_card(
                    turn,
                    player,
                    card,
                    *tile,
                    &mut world.registry,
                    &mut world.roster,
                    world.effects.as_mut(),
                );
                match outcome {
                    CardOutcome::Played { template_id, result } => {
                        events.push(GameEvent::CardPlayed {
                            turn,
                            player,
                            template_id,
                            target: *tile,
                        });
                        match result {
                            CardResult::Froze { players, turns } => {
                                for victim in players {
                                    events.push(GameEvent::PlayerFrozen {
                                        turn,
                                        player: victim,
                                        by: player,
                                        turns,
                                    });
                                }
                            }
                            CardResult::Obstructed { tile } => {
                                events.push(GameEvent::ObstructionPlaced { turn, tile, by: player });
                            }
                        }
                        self.phase = TurnPhase::AwaitingRoll;
                    }
                    CardOutcome::Rejected(reason) => {
                        events.push(GameEvent::CardRejected {
                            turn,
                            player,
                            target: *tile,
                            reason: reason.to_string(),
                        });
                        self.phase = match reason {
                            CardRejection::NotInHand(_) => TurnPhase::AwaitingRoll,
                            _ => TurnPhase::CardTargeting { card, range },
                        };
                    }
                }
            }

            (TurnPhase::CardTargeting { .. }, PlayerCommand::CancelCardTargeting) => {
                events.push(GameEvent::CardTargetingCancelled { turn, player });
                self.phase = TurnPhase::AwaitingRoll;
            }

            (phase, cmd) => {
                log::warn!(
                    "turn={turn} sequencer: rejected {} in phase {}",
                    cmd.name(),
                    phase.name()
                );
                events.push(GameEvent::CommandRejected {
                    turn,
                    command: cmd.name().to_string(),
                    phase:   phase.name().to_string(),
                });
                self.phase = phase;
            }
        }
        Ok(())
    }

    fn drive_movement(
        &mut self,
        mut session: MoveSession,
        player:      PlayerId,
        world:       &mut World,
        events:      &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let turn = self.turn;
        loop {
            match session.step(&mut world.registry, world.effects.as_mut()) {
                MoveStep::Stepped { from, to, obstructed } => {
                    world.place_token(player, to, Some(from));
                    events.push(GameEvent::TokenStepped { turn, player, from, to });
                    if obstructed {
                        events.push(GameEvent::ObstructionCleared { turn, player, tile: to });
                    }
                }
                MoveStep::AwaitingDirection { at, candidates } => {
                    events.push(GameEvent::DirectionRequested { turn, player, at, candidates });
                    self.phase = TurnPhase::Moving(session);
                    return Ok(());
                }
                MoveStep::Finished(outcome) => {
                    events.push(GameEvent::MovementFinished {
                        turn,
                        player,
                        tile: outcome.final_tile,
                        steps_taken: outcome.visited.len() as u32,
                        halt: outcome.halt,
                    });
                    return self.resolve_landing(player, outcome.final_tile, world, events);
                }
            }
        }
    }

    fn resolve_landing(
        &mut self,
        player: PlayerId,
        tile:   TileId,
        world:  &mut World,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let turn = self.turn;
        match self.landing.resolve(turn, player, tile, &world.registry, &mut world.roster) {
            LandingOutcome::PurchaseOffered { tile, price } => {
                events.push(GameEvent::PurchaseOffered { turn, player, tile, price });
                self.phase = TurnPhase::AwaitingPurchase { tile, price };
                Ok(())
            }
            LandingOutcome::RentPaid { owner, amount } => {
                events.push(GameEvent::RentPaid { turn, payer: player, owner, tile, amount });
                self.complete_turn(player, world, events)
            }
            LandingOutcome::ShopOpened { tile } => {
                let shop = ShopSession::open(
                    player,
                    tile,
                    &world.catalog,
                    world.rules.shop_offer_count,
                    world.rng.shop(),
                );
                world.effects.shop_opened(player, tile);
                events.push(GameEvent::ShopOpened {
                    turn,
                    player,
                    tile,
                    offers: shop.offers().to_vec(),
                });
                self.phase = TurnPhase::ShopOpen(shop);
                Ok(())
            }
            LandingOutcome::NoEffect => self.complete_turn(player, world, events),
        }
    }

    fn complete_turn(
        &mut self,
        player: PlayerId,
        world:  &mut World,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        events.push(GameEvent::TurnCompleted { turn: self.turn, player });
        self.phase = TurnPhase::TurnComplete;
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.advance();
        }
        self.enter_turn(world, events)
    }

    /// Start the current player's turn. Frozen players burn one frozen
    /// turn and hand off; the loop ends because every skip decrements.
    fn enter_turn(&mut self, world: &mut World, events: &mut Vec<GameEvent>) -> GameResult<()> {
        loop {
            let Some(cursor) = self.cursor.as_mut() else {
                return Err(GameError::NotStarted);
            };
            let id = cursor.current();
            self.turn += 1;
            let turn = self.turn;

            let Some(player) = world.roster.get_mut(id) else {
                return self.halt(GameError::UnknownPlayer { id }, events);
            };
            if player.is_frozen() {
                player.frozen_turns -= 1;
                let frozen_remaining = player.frozen_turns;
                log::info!("turn={turn} sequencer: player {id} frozen, {frozen_remaining} left");
                events.push(GameEvent::TurnSkipped { turn, player: id, frozen_remaining });
                events.push(GameEvent::TurnCompleted { turn, player: id });
                cursor.advance();
                continue;
            }

            log::info!("turn={turn} sequencer: player {id} to roll");
            events.push(GameEvent::TurnStarted { turn, player: id });
            self.phase = TurnPhase::AwaitingRoll;
            return Ok(());
        }
    }

    fn halt(&mut self, err: GameError, events: &mut Vec<GameEvent>) -> GameResult<()> {
        let reason = err.to_string();
        log::error!("turn={} sequencer: halted: {reason}", self.turn);
        events.push(GameEvent::SequencerHalted { turn: self.turn, reason: reason.clone() });
        self.phase = TurnPhase::Halted { reason };
        Err(err)
    }
}

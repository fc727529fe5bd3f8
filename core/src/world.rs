//! The session context: every piece of mutable game state plus the
//! capabilities injected by collaborators.
//!
//! RULE: No component keeps ambient static state. Each one receives the
//! parts of the world it needs as arguments, so two sessions never share
//! anything.

use crate::{
    card::CardCatalog,
    config::{GameConfig, RulesConfig},
    effects::{NoopEffects, WorldEffects},
    error::{GameError, GameResult},
    player::{Player, Roster},
    registry::{AdjacencyReport, TileRegistry},
    rng::{DiceSource, RngBank},
    tile::Tile,
    types::{CardInstanceId, PlayerId, TileId},
};

pub struct World {
    pub rules:      RulesConfig,
    pub registry:   TileRegistry,
    pub roster:     Roster,
    pub catalog:    CardCatalog,
    pub rng:        RngBank,
    pub dice:       Box<dyn DiceSource>,
    pub effects:    Box<dyn WorldEffects>,
    pub start_tile: TileId,
    pub adjacency:  AdjacencyReport,
    landmarks_spawned: bool,
}

impl World {
    /// Build the board, the catalog, and a roster of fresh players on the
    /// start tile. Landmark flags are set here; their spawn effects are
    /// sent when a round begins.
    pub fn from_config(config: GameConfig, seed: u64) -> GameResult<Self> {
        let GameConfig { rules, board, cards } = config;

        let mut registry = TileRegistry::new();
        for tc in &board.tiles {
            let mut tile = Tile::new(tc.id, tc.category)
                .with_prices(tc.purchase_price, tc.rent_price)
                .with_neighbors(tc.neighbors)
                .with_standing_slots(rules.standing_slots);
            tile.has_building = tc.category.has_landmark();
            registry.register(tile)?;
        }
        let adjacency = registry.validate(rules.adjacency_policy)?;

        if !registry.contains(board.start_tile) {
            return Err(GameError::InvalidBoard {
                reason: format!("start tile {} is not on the board", board.start_tile),
            });
        }

        let rng = RngBank::new(seed);
        let mut world = Self {
            dice: Box::new(rng.dice()),
            effects: Box::new(NoopEffects),
            catalog: CardCatalog::new(cards),
            roster: Roster::default(),
            start_tile: board.start_tile,
            rules,
            registry,
            rng,
            adjacency,
            landmarks_spawned: false,
        };
        world.reset_players();
        log::info!(
            "world: board '{}' with {} tiles, {} players",
            board.name,
            world.registry.len(),
            world.roster.len()
        );
        Ok(world)
    }

    /// Explicit session reset: players back to defaults on the start tile,
    /// every tile unowned and unobstructed.
    pub fn reset_session(&mut self) {
        for tile in self.registry.all_tiles_mut() {
            tile.reset_ownership();
            if tile.has_obstruction {
                tile.has_obstruction = false;
                self.effects.clear_obstruction(tile.id);
            }
            let occupants: Vec<PlayerId> = tile.occupants().collect();
            for id in occupants {
                tile.leave(id);
            }
        }
        self.reset_players();
    }

    fn reset_players(&mut self) {
        self.roster = Roster::default();
        for id in 1..=self.rules.player_count {
            self.roster.insert(Player::new(id, self.start_tile, self.rules.starting_money));
            if let Some(tile) = self.registry.lookup_mut(self.start_tile) {
                tile.enter(id);
            }
        }
    }

    /// Move a token onto `to`, keeping tile standing slots in step.
    /// Returns false if the player is unknown.
    pub fn place_token(&mut self, player_id: PlayerId, to: TileId, previous: Option<TileId>) -> bool {
        let Some(player) = self.roster.get_mut(player_id) else {
            return false;
        };
        let from = player.current_tile;
        player.current_tile = to;
        player.previous_tile = previous;
        if from != to {
            if let Some(tile) = self.registry.lookup_mut(from) {
                tile.leave(player_id);
            }
            if let Some(tile) = self.registry.lookup_mut(to) {
                tile.enter(player_id);
            }
        }
        true
    }

    /// Hand a fresh copy of a catalog card to a player.
    /// Ok(None) when the hand is already full.
    pub fn grant_card(
        &mut self,
        player_id:   PlayerId,
        template_id: &str,
    ) -> GameResult<Option<CardInstanceId>> {
        let player = self
            .roster
            .get_mut(player_id)
            .ok_or(GameError::UnknownPlayer { id: player_id })?;
        if !player.has_room(self.rules.hand_limit) {
            log::info!("world: player {player_id} hand full, '{template_id}' not granted");
            return Ok(None);
        }
        let card = self
            .catalog
            .instantiate(template_id)
            .ok_or_else(|| GameError::UnknownCardTemplate { template_id: template_id.to_string() })?;
        let id = card.instance_id;
        if player.try_add_card(card, self.rules.hand_limit).is_err() {
            return Ok(None);
        }
        Ok(Some(id))
    }

    /// Tell the presentation layer about every landmark on the board.
    /// Sent once per world; later calls are no-ops.
    pub fn spawn_landmarks(&mut self) {
        if self.landmarks_spawned {
            return;
        }
        self.landmarks_spawned = true;
        for tile in self.registry.all_tiles() {
            if tile.category.has_landmark() && tile.has_building {
                self.effects.spawn_structure(tile.id);
            }
        }
    }
}

//! The game engine: one session of the board game.
//!
//! The engine owns the world, the turn sequencer, the snapshot store, and
//! the event store. Collaborators talk to it through commands in and
//! events out.
//!
//! RULES:
//!   - Every event the sequencer emits is persisted before it is returned.
//!   - All randomness flows through the RngBank or the injected dice.
//!   - Two engines never share state; build one per session.

use crate::{
    command::PlayerCommand,
    config::GameConfig,
    cursor::TurnCursor,
    effects::{NoopEffects, WorldEffects},
    error::GameResult,
    event::{EventLogEntry, GameEvent},
    player::{Player, Roster},
    registry::TileRegistry,
    rng::DiceSource,
    snapshot::{RestoreReport, Snapshot, SnapshotStore},
    store::GameStore,
    tile::Tile,
    turn::{TurnPhase, TurnSequencer},
    types::{PlayerId, RunId, TileId, Turn},
    world::World,
};

pub struct GameEngine {
    pub run_id: RunId,
    seed:       u64,
    world:      World,
    sequencer:  TurnSequencer,
    snapshots:  SnapshotStore,
    store:      GameStore,
}

impl GameEngine {
    /// The store must already be migrated.
    pub fn new(run_id: RunId, seed: u64, config: GameConfig, store: GameStore) -> GameResult<Self> {
        let world = World::from_config(config, seed)?;
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;
        Ok(Self {
            seed,
            world,
            sequencer: TurnSequencer::new(),
            snapshots: SnapshotStore::new(),
            store,
            run_id,
        })
    }

    /// In-memory store, test board, seeded dice.
    pub fn build_test(run_id: RunId, seed: u64) -> GameResult<Self> {
        let store = GameStore::in_memory()?;
        store.migrate()?;
        Self::new(run_id, seed, GameConfig::default_test(), store)
    }

    pub fn with_dice(mut self, dice: Box<dyn DiceSource>) -> Self {
        self.world.dice = dice;
        self
    }

    pub fn with_effects(mut self, effects: Box<dyn WorldEffects>) -> Self {
        self.world.effects = effects;
        self
    }

    // ── Session boundaries ─────────────────────────────────────

    /// Fresh game: landmarks spawn, every player rolls once, and the
    /// roll-off decides the turn order.
    pub fn start_new_game(&mut self) -> GameResult<Vec<GameEvent>> {
        let mut events = vec![GameEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.seed,
        }];
        self.world.spawn_landmarks();

        let faces = self.world.rules.dice_faces;
        let mut rolls = Vec::with_capacity(self.world.roster.len());
        for id in self.world.roster.ids() {
            let value = self.world.dice.roll(faces);
            events.push(GameEvent::SetupRoll { player: id, value });
            rolls.push((id, value));
        }
        let cursor = TurnCursor::from_rolls(&rolls)?;
        self.begin(cursor, events)
    }

    /// Fresh game with the order drawn from the turn-order stream.
    pub fn start_shuffled(&mut self) -> GameResult<Vec<GameEvent>> {
        let events = vec![GameEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.seed,
        }];
        self.world.spawn_landmarks();
        let ids = self.world.roster.ids();
        let cursor = TurnCursor::shuffled(&ids, self.world.rng.turn_order())?;
        self.begin(cursor, events)
    }

    /// Start a round with an order chosen by the caller.
    pub fn start_with_cursor(&mut self, cursor: TurnCursor) -> GameResult<Vec<GameEvent>> {
        self.begin(cursor, Vec::new())
    }

    fn begin(&mut self, cursor: TurnCursor, mut events: Vec<GameEvent>) -> GameResult<Vec<GameEvent>> {
        let result = self.sequencer.begin_round(cursor, &mut self.world, &mut events);
        self.persist(&events)?;
        result?;
        Ok(events)
    }

    /// Feed one external signal to the sequencer.
    pub fn submit(&mut self, cmd: &PlayerCommand) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        let result = self.sequencer.handle(cmd, &mut self.world, &mut events);
        self.persist(&events)?;
        result?;
        Ok(events)
    }

    /// Back to defaults: players on the start tile, tiles unowned.
    /// The sequencer waits for a new round.
    pub fn reset_session(&mut self) {
        log::info!("turn={} engine: session reset", self.sequencer.turn());
        self.world.reset_session();
        self.sequencer = TurnSequencer::new();
    }

    // ── Snapshots ──────────────────────────────────────────────

    /// Capture the current state and save it to the store.
    pub fn capture_snapshot(&mut self) -> GameResult<Snapshot> {
        let snapshot = Snapshot::capture(&self.world.roster, &self.world.registry);
        let turn = self.sequencer.turn();
        self.store.save_snapshot(&self.run_id, turn, &snapshot.to_json()?)?;
        self.persist(&[GameEvent::SnapshotCaptured {
            turn,
            players: snapshot.players.len(),
            tiles:   snapshot.tiles.len(),
        }])?;
        log::debug!("turn={turn} engine: snapshot saved");
        Ok(snapshot)
    }

    /// Capture and hold a snapshot for the next world rebuild.
    pub fn retain_snapshot(&mut self) -> GameResult<()> {
        let snapshot = self.capture_snapshot()?;
        self.snapshots.retain(snapshot);
        Ok(())
    }

    pub fn retained_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.retained()
    }

    /// Apply a snapshot without touching the turn order.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> GameResult<RestoreReport> {
        let report = self.snapshots.restore(snapshot, &mut self.world);
        self.record_restore(&report)?;
        Ok(report)
    }

    /// Apply a snapshot, then start a round ordered by ascending player id.
    pub fn resume_from_snapshot(&mut self, snapshot: &Snapshot) -> GameResult<Vec<GameEvent>> {
        self.restore_snapshot(snapshot)?;
        self.resume_in_reload_order()
    }

    /// Apply the retained snapshot if there is one and resume play.
    pub fn resume_retained(&mut self) -> GameResult<Option<Vec<GameEvent>>> {
        let Some(report) = self.snapshots.restore_retained(&mut self.world) else {
            return Ok(None);
        };
        self.record_restore(&report)?;
        self.resume_in_reload_order().map(Some)
    }

    /// Resume from the newest snapshot saved for this run.
    pub fn resume_latest_from_store(&mut self) -> GameResult<Option<Vec<GameEvent>>> {
        let Some((turn, json)) = self.store.latest_snapshot(&self.run_id)? else {
            return Ok(None);
        };
        log::info!("turn={turn} engine: resuming from stored snapshot");
        let snapshot = Snapshot::from_json(&json)?;
        self.resume_from_snapshot(&snapshot).map(Some)
    }

    /// Tear the world down and build it again from `config`. Dice and
    /// effects carry over; the retained snapshot survives the rebuild.
    pub fn rebuild_world(&mut self, config: GameConfig) -> GameResult<()> {
        let mut world = World::from_config(config, self.seed)?;
        world.dice = std::mem::replace(&mut self.world.dice, Box::new(self.world.rng.dice()));
        world.effects = std::mem::replace(&mut self.world.effects, Box::new(NoopEffects));
        self.world = world;
        self.sequencer = TurnSequencer::new();
        self.world.spawn_landmarks();
        log::info!("engine: world rebuilt");
        Ok(())
    }

    fn resume_in_reload_order(&mut self) -> GameResult<Vec<GameEvent>> {
        let cursor = TurnCursor::from_reload(&self.world.roster.ids())?;
        self.begin(cursor, Vec::new())
    }

    fn record_restore(&mut self, report: &RestoreReport) -> GameResult<()> {
        self.persist(&[GameEvent::SnapshotRestored {
            turn:          self.sequencer.turn(),
            players:       report.players_restored,
            tiles:         report.tiles_restored,
            skipped_cards: report.skipped_cards.clone(),
        }])
    }

    fn persist(&mut self, events: &[GameEvent]) -> GameResult<()> {
        let fallback = self.sequencer.turn();
        let entries = events
            .iter()
            .map(|e| EventLogEntry::from_event(&self.run_id, e.turn().unwrap_or(fallback), e))
            .collect::<GameResult<Vec<_>>>()?;
        self.store.append_events(&entries)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn(&self) -> Turn {
        self.sequencer.turn()
    }

    pub fn phase(&self) -> &TurnPhase {
        self.sequencer.phase()
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.sequencer.current_player()
    }

    pub fn sequencer(&self) -> &TurnSequencer {
        &self.sequencer
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.world.registry
    }

    pub fn roster(&self) -> &Roster {
        &self.world.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.world.roster.get(id)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.world.registry.lookup(id)
    }

    /// Downcast the installed effects sink, e.g. to a `RecordedEffects`.
    pub fn effects_as<T: 'static>(&self) -> Option<&T> {
        self.world.effects.as_any().downcast_ref::<T>()
    }

    pub fn store_events_for_turn(&self, turn: Turn) -> GameResult<Vec<EventLogEntry>> {
        self.store.events_for_turn(&self.run_id, turn)
    }

    pub fn store_events(&self) -> GameResult<Vec<EventLogEntry>> {
        self.store.events_for_run(&self.run_id)
    }

    pub fn store_event_count(&self) -> GameResult<u64> {
        self.store.event_count(&self.run_id)
    }
}

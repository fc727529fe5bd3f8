//! Loading rules, the board, and the card catalog from data/.

use tileboard_core::{
    config::{AdjacencyPolicy, GameConfig},
    engine::GameEngine,
    error::GameError,
    store::GameStore,
    tile::TileCategory,
    world::World,
};

fn data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn shipped_data_loads() {
    let config = GameConfig::load(&data_dir(), "default_board").expect("data/ must load");

    assert_eq!(config.rules.player_count, 4);
    assert_eq!(config.rules.starting_money, 2000);
    assert_eq!(config.rules.hand_limit, 5);
    assert_eq!(config.rules.adjacency_policy, AdjacencyPolicy::Symmetrize);
    assert_eq!(config.board.tiles.len(), 16);
    assert!(config.cards.iter().any(|c| c.template_id == "freeze"));
    assert!(config.cards.iter().any(|c| c.template_id == "barricade"));
}

#[test]
fn shipped_board_is_symmetrized_on_load() {
    let config = GameConfig::load(&data_dir(), "default_board").unwrap();
    let world = World::from_config(config, 1).expect("board builds");

    assert!(!world.adjacency.one_way.is_empty(), "the file authors links one way");
    assert!(world.registry.adjacency_report().is_clean(), "every link mirrored after load");
    assert_eq!(world.roster.len(), 4);
    assert!(world.roster.iter().all(|p| p.current_tile == 0 && p.money == 2000));
    assert_eq!(world.registry.lookup(4).unwrap().category, TileCategory::Shop);
}

#[test]
fn omitted_prices_fall_back_to_defaults() {
    let config = GameConfig::load(&data_dir(), "default_board").unwrap();
    let bank = config.board.tiles.iter().find(|t| t.id == 0).unwrap();
    assert_eq!(bank.purchase_price, 500);
    assert_eq!(bank.rent_price, 200);
}

#[test]
fn missing_board_names_the_path() {
    let err = GameConfig::load(&data_dir(), "no_such_board").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Cannot read") && msg.contains("no_such_board.json"), "got: {msg}");
}

#[test]
fn engine_runs_on_shipped_data() {
    let config = GameConfig::load(&data_dir(), "default_board").unwrap();
    let store = GameStore::in_memory().unwrap();
    store.migrate().unwrap();
    let mut engine = GameEngine::new("cfg-shipped".into(), 3, config, store).unwrap();

    let events = engine.start_new_game().unwrap();
    assert!(engine.current_player().is_some());
    assert_eq!(engine.store_event_count().unwrap(), events.len() as u64);
}

#[test]
fn default_test_board_is_directed() {
    let world = World::from_config(GameConfig::default_test(), 1).unwrap();
    assert_eq!(world.registry.len(), 12);
    assert_eq!(world.roster.len(), 2);
    assert!(!world.registry.lookup(1).unwrap().links_to(0), "no reverse links are added");
}

#[test]
fn start_tile_must_be_on_the_board() {
    let mut config = GameConfig::default_test();
    config.board.start_tile = 77;
    let result = World::from_config(config, 1);
    assert!(matches!(result, Err(GameError::InvalidBoard { .. })));
}

#[test]
fn reject_policy_refuses_the_test_board() {
    let mut config = GameConfig::default_test();
    config.rules.adjacency_policy = AdjacencyPolicy::RejectAsymmetric;
    assert!(matches!(World::from_config(config, 1), Err(GameError::InvalidBoard { .. })));
}

#[test]
fn conflicting_tile_ids_fail_to_load() {
    let mut config = GameConfig::default_test();
    let mut clash = config.board.tiles[1].clone();
    clash.category = TileCategory::Prison;
    config.board.tiles.push(clash);
    assert!(matches!(World::from_config(config, 1), Err(GameError::DuplicateTile { id: 1 })));
}

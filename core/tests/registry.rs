//! Tile registry and tile graph.
//!
//! Registration is idempotent for the same tile and fatal for a
//! conflicting one. Adjacency is validated at load time under one of
//! three policies; dangling links never load.

use tileboard_core::{
    config::AdjacencyPolicy,
    error::GameError,
    registry::TileRegistry,
    tile::{Direction, Tile, TileCategory},
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn empty(id: u32) -> Tile {
    Tile::new(id, TileCategory::Empty)
}

/// 0 → 1 → 2 → 0, one-way only.
fn one_way_triangle() -> TileRegistry {
    let mut reg = TileRegistry::new();
    reg.register(empty(0).with_neighbor(Direction::East, 1)).unwrap();
    reg.register(empty(1).with_neighbor(Direction::East, 2)).unwrap();
    reg.register(empty(2).with_neighbor(Direction::East, 0)).unwrap();
    reg
}

// ── Registration ────────────────────────────────────────────────────────────

#[test]
fn register_then_lookup_returns_the_tile() {
    let mut reg = TileRegistry::new();
    let id = reg.register(empty(7).with_prices(650, 170)).unwrap();
    assert_eq!(id, 7);
    let tile = reg.lookup(7).expect("tile 7 registered");
    assert_eq!(tile.purchase_price, 650);
    assert_eq!(tile.rent_price, 170);
    assert!(reg.lookup(8).is_none(), "unregistered id must be a miss, not a panic");
}

#[test]
fn re_registering_the_same_tile_is_a_no_op() {
    let mut reg = TileRegistry::new();
    reg.register(empty(3)).unwrap();
    reg.lookup_mut(3).unwrap().owner = Some(1);

    reg.register(empty(3)).expect("same tile again must be accepted");

    assert_eq!(reg.len(), 1);
    assert_eq!(
        reg.lookup(3).unwrap().owner,
        Some(1),
        "re-registration must not wipe live state"
    );
}

#[test]
fn a_different_tile_under_a_taken_id_is_rejected() {
    let mut reg = TileRegistry::new();
    reg.register(empty(3)).unwrap();

    let clash = Tile::new(3, TileCategory::Shop);
    let result = reg.register(clash);

    assert!(matches!(result, Err(GameError::DuplicateTile { id: 3 })), "got {result:?}");
    assert_eq!(reg.lookup(3).unwrap().category, TileCategory::Empty, "original must survive");
}

#[test]
fn register_new_assigns_the_next_free_id() {
    let mut reg = TileRegistry::new();
    assert_eq!(reg.register_new(empty(999)), 0);
    reg.register(empty(5)).unwrap();
    assert_eq!(reg.register_new(empty(999)), 6);
    assert!(reg.contains(6));
}

#[test]
fn rebuild_counts_only_new_tiles() {
    let mut reg = one_way_triangle();
    let tiles: Vec<Tile> = reg.all_tiles().cloned().collect();

    assert_eq!(reg.rebuild(tiles.clone()).unwrap(), 0, "rescan of known tiles adds nothing");
    let mut more = tiles;
    more.push(empty(3));
    assert_eq!(reg.rebuild(more).unwrap(), 1);
    assert_eq!(reg.len(), 4);
}

// ── Neighbors ───────────────────────────────────────────────────────────────

#[test]
fn neighbors_come_out_in_compass_order_without_repeats() {
    let tile = empty(0)
        .with_neighbor(Direction::West, 4)
        .with_neighbor(Direction::North, 1)
        .with_neighbor(Direction::South, 1);
    assert_eq!(tile.neighbors(), vec![1, 4]);
}

#[test]
fn neighbors_of_skips_unregistered_targets() {
    let mut reg = TileRegistry::new();
    reg.register(empty(0).with_neighbor(Direction::East, 1).with_neighbor(Direction::South, 42))
        .unwrap();
    reg.register(empty(1)).unwrap();
    assert_eq!(reg.neighbors_of(0), vec![1]);
    assert!(reg.neighbors_of(42).is_empty());
}

// ── Adjacency validation ────────────────────────────────────────────────────

#[test]
fn report_lists_every_one_way_link() {
    let reg = one_way_triangle();
    let report = reg.adjacency_report();
    assert_eq!(report.one_way.len(), 3);
    assert!(report.dangling.is_empty());
    assert!(!report.is_clean());
}

#[test]
fn directed_policy_keeps_links_as_authored() {
    let mut reg = one_way_triangle();
    let report = reg.validate(AdjacencyPolicy::Directed).unwrap();
    assert_eq!(report.one_way.len(), 3);
    assert!(!reg.lookup(1).unwrap().links_to(0), "directed policy must not add reverse links");
}

#[test]
fn symmetrize_policy_mirrors_into_the_opposite_slot() {
    let mut reg = one_way_triangle();
    reg.validate(AdjacencyPolicy::Symmetrize).unwrap();

    assert!(reg.adjacency_report().is_clean(), "every link must now have a reverse");
    assert_eq!(reg.lookup(1).unwrap().neighbor(Direction::West), Some(0));
    assert_eq!(reg.lookup(0).unwrap().neighbor(Direction::West), Some(2));
}

#[test]
fn symmetrize_falls_back_to_the_first_free_slot() {
    let mut reg = TileRegistry::new();
    reg.register(empty(0).with_neighbor(Direction::East, 1)).unwrap();
    reg.register(empty(1).with_neighbor(Direction::West, 2)).unwrap();
    reg.register(empty(2).with_neighbor(Direction::East, 1)).unwrap();

    let (added, unrepaired) = reg.symmetrize();

    assert_eq!((added, unrepaired), (1, 0), "only 0 → 1 lacks a reverse");
    let t1 = reg.lookup(1).unwrap();
    assert_eq!(t1.neighbor(Direction::West), Some(2), "authored link untouched");
    assert_eq!(t1.neighbor(Direction::North), Some(0), "West taken, so first free slot");
}

#[test]
fn reject_policy_refuses_one_way_links() {
    let mut reg = one_way_triangle();
    let result = reg.validate(AdjacencyPolicy::RejectAsymmetric);
    assert!(matches!(result, Err(GameError::InvalidBoard { .. })), "got {result:?}");
}

#[test]
fn dangling_links_fail_under_every_policy() {
    for policy in [
        AdjacencyPolicy::Directed,
        AdjacencyPolicy::Symmetrize,
        AdjacencyPolicy::RejectAsymmetric,
    ] {
        let mut reg = TileRegistry::new();
        reg.register(empty(0).with_neighbor(Direction::East, 5)).unwrap();
        let result = reg.validate(policy);
        assert!(
            matches!(result, Err(GameError::InvalidBoard { .. })),
            "{policy:?} accepted a dangling link: {result:?}"
        );
    }
}

// ── Standing slots ──────────────────────────────────────────────────────────

#[test]
fn tokens_take_the_lowest_free_slot() {
    let mut tile = empty(0).with_standing_slots(3);
    assert_eq!(tile.enter(1), 0);
    assert_eq!(tile.enter(2), 1);
    assert_eq!(tile.enter(3), 2);
    assert_eq!(tile.enter(2), 1, "entering twice keeps the same slot");

    tile.leave(1);
    assert_eq!(tile.enter(4), 0, "freed slot is reused first");
    assert_eq!(tile.enter(5), 0, "overflow shares the centre slot");
    assert_eq!(tile.slot_of(5), None, "an overflow token holds no slot");

    let mut occupants: Vec<u32> = tile.occupants().collect();
    occupants.sort_unstable();
    assert_eq!(occupants, vec![2, 3, 4]);
}

#[test]
fn ownership_reset_keeps_landmarks() {
    let mut land = empty(1);
    land.owner = Some(2);
    land.has_building = true;
    land.reset_ownership();
    assert_eq!(land.owner, None);
    assert!(!land.has_building, "houses go with ownership");

    let mut bank = Tile::new(0, TileCategory::Bank);
    bank.has_building = true;
    bank.reset_ownership();
    assert!(bank.has_building, "landmarks are part of the board");
}

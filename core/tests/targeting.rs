//! Card targeting engine.
//!
//! Range is a BFS over tile links that never includes the origin. A card
//! leaves the hand only when its effect lands.

use tileboard_core::{
    card::{CardCatalog, CardEffect, CardTemplate},
    config::GameConfig,
    effects::{EffectCall, NoopEffects, RecordedEffects},
    player::{Player, Roster},
    registry::TileRegistry,
    targeting::{apply_card, compute_range, CardOutcome, CardRejection, CardResult},
    tile::{Direction, Tile, TileCategory},
    types::{CardInstanceId, PlayerId, TileId},
};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Bidirectional line 0 – 1 – 2 – 3 – 4 – 5.
fn line() -> TileRegistry {
    let mut reg = TileRegistry::new();
    for id in 0..6 {
        let mut tile = Tile::new(id, TileCategory::Empty);
        if id > 0 {
            tile.set_neighbor(Direction::West, Some(id - 1));
        }
        if id < 5 {
            tile.set_neighbor(Direction::East, Some(id + 1));
        }
        reg.register(tile).unwrap();
    }
    reg
}

fn catalog() -> CardCatalog {
    CardCatalog::new(GameConfig::default_test().cards)
}

/// Gives `player` a fresh copy of `template` and returns its instance id.
fn give(roster: &mut Roster, catalog: &mut CardCatalog, player: PlayerId, template: &str) -> CardInstanceId {
    let card = catalog.instantiate(template).unwrap();
    let id = card.instance_id;
    roster.get_mut(player).unwrap().try_add_card(card, 5).unwrap();
    id
}

fn players_at(positions: &[(PlayerId, TileId)]) -> Roster {
    Roster::new(positions.iter().map(|(id, tile)| Player::new(*id, *tile, 1000)))
}

// ── Range ───────────────────────────────────────────────────────────────────

#[test]
fn range_excludes_the_origin_and_respects_radius() {
    let reg = line();
    let mut r1 = compute_range(&reg, 2, 1);
    r1.sort_unstable();
    assert_eq!(r1, vec![1, 3]);
    let mut r2 = compute_range(&reg, 2, 2);
    r2.sort_unstable();
    assert_eq!(r2, vec![0, 1, 3, 4]);
    assert!(compute_range(&reg, 2, 0).is_empty());
}

#[test]
fn range_from_an_unknown_origin_is_empty() {
    assert!(compute_range(&line(), 42, 3).is_empty());
}

#[test]
fn range_on_a_cycle_lists_each_tile_once() {
    let config = GameConfig::default_test();
    let mut reg = TileRegistry::new();
    for tc in &config.board.tiles {
        reg.register(Tile::new(tc.id, tc.category).with_neighbors(tc.neighbors)).unwrap();
    }
    let all = compute_range(&reg, 0, 50);
    let mut dedup = all.clone();
    dedup.sort_unstable();
    dedup.dedup();
    assert_eq!(all.len(), dedup.len(), "duplicate tiles in range: {all:?}");
    assert_eq!(all.len(), 11, "every tile but the origin is reachable");
    assert!(!all.contains(&0));
}

#[test]
fn range_follows_link_direction() {
    let config = GameConfig::default_test();
    let mut reg = TileRegistry::new();
    for tc in &config.board.tiles {
        reg.register(Tile::new(tc.id, tc.category).with_neighbors(tc.neighbors)).unwrap();
    }
    assert_eq!(compute_range(&reg, 1, 2), vec![2, 10, 3]);
}

// ── Freeze ──────────────────────────────────────────────────────────────────

#[test]
fn freeze_hits_every_opponent_on_the_target() {
    let mut reg = line();
    let mut roster = players_at(&[(1, 0), (2, 2), (3, 2), (4, 4)]);
    let mut cat = catalog();
    let card = give(&mut roster, &mut cat, 1, "freeze");

    let outcome = apply_card(1, 1, card, 2, &mut reg, &mut roster, &mut NoopEffects);

    assert_eq!(
        outcome,
        CardOutcome::Played {
            template_id: "freeze".into(),
            result:      CardResult::Froze { players: vec![2, 3], turns: 2 },
        }
    );
    assert_eq!(roster.get(2).unwrap().frozen_turns, 2);
    assert_eq!(roster.get(3).unwrap().frozen_turns, 2);
    assert_eq!(roster.get(4).unwrap().frozen_turns, 0);
    assert!(roster.get(1).unwrap().inventory().is_empty(), "played card is consumed");
}

#[test]
fn freeze_never_shortens_an_existing_freeze() {
    let mut reg = line();
    let mut roster = players_at(&[(1, 0), (2, 1)]);
    roster.get_mut(2).unwrap().frozen_turns = 5;
    let mut cat = catalog();
    let card = give(&mut roster, &mut cat, 1, "freeze");

    assert!(apply_card(1, 1, card, 1, &mut reg, &mut roster, &mut NoopEffects).is_success());
    assert_eq!(roster.get(2).unwrap().frozen_turns, 5);
}

#[test]
fn freeze_on_an_empty_tile_is_rejected_and_kept() {
    let mut reg = line();
    let mut roster = players_at(&[(1, 0), (2, 5)]);
    let mut cat = catalog();
    let card = give(&mut roster, &mut cat, 1, "freeze");

    let outcome = apply_card(1, 1, card, 2, &mut reg, &mut roster, &mut NoopEffects);

    assert_eq!(outcome, CardOutcome::Rejected(CardRejection::NoTarget(2)));
    assert!(roster.get(1).unwrap().card(card).is_some(), "rejected card stays in hand");
}

// ── Barricade ───────────────────────────────────────────────────────────────

#[test]
fn barricade_places_an_obstruction_once() {
    let mut reg = line();
    let mut roster = players_at(&[(1, 0)]);
    let mut cat = catalog();
    let first = give(&mut roster, &mut cat, 1, "barricade");
    let second = give(&mut roster, &mut cat, 1, "barricade");
    let mut effects = RecordedEffects::default();

    let outcome = apply_card(1, 1, first, 3, &mut reg, &mut roster, &mut effects);
    assert_eq!(
        outcome,
        CardOutcome::Played {
            template_id: "barricade".into(),
            result:      CardResult::Obstructed { tile: 3 },
        }
    );
    assert!(reg.lookup(3).unwrap().has_obstruction);

    let again = apply_card(1, 1, second, 3, &mut reg, &mut roster, &mut effects);
    assert_eq!(again, CardOutcome::Rejected(CardRejection::AlreadyObstructed(3)));
    assert_eq!(effects.calls, vec![EffectCall::SpawnObstruction(3)]);
    assert_eq!(roster.get(1).unwrap().inventory().len(), 1);
}

// ── Rejections ──────────────────────────────────────────────────────────────

#[test]
fn out_of_range_unknown_tile_and_missing_card_are_rejected() {
    let mut reg = line();
    let mut roster = players_at(&[(1, 0)]);
    let mut cat = catalog();
    let card = give(&mut roster, &mut cat, 1, "barricade");

    assert_eq!(
        apply_card(1, 1, card, 5, &mut reg, &mut roster, &mut NoopEffects),
        CardOutcome::Rejected(CardRejection::OutOfRange(5))
    );
    assert_eq!(
        apply_card(1, 1, card, 0, &mut reg, &mut roster, &mut NoopEffects),
        CardOutcome::Rejected(CardRejection::OutOfRange(0)),
        "the caster's own tile is never in range"
    );
    assert_eq!(
        apply_card(1, 1, card, 40, &mut reg, &mut roster, &mut NoopEffects),
        CardOutcome::Rejected(CardRejection::UnknownTile(40))
    );
    assert_eq!(
        apply_card(1, 1, 999, 1, &mut reg, &mut roster, &mut NoopEffects),
        CardOutcome::Rejected(CardRejection::NotInHand(999))
    );
    assert_eq!(
        apply_card(1, 7, card, 1, &mut reg, &mut roster, &mut NoopEffects),
        CardOutcome::Rejected(CardRejection::UnknownPlayer(7))
    );
    assert!(!reg.all_tiles().any(|t| t.has_obstruction));
    assert_eq!(roster.get(1).unwrap().inventory().len(), 1);
}

#[test]
fn each_instance_is_an_independent_copy() {
    let mut cat = CardCatalog::new([CardTemplate {
        template_id: "freeze".into(),
        name:        "Freeze".into(),
        description: String::new(),
        effect:      CardEffect::Freeze { turns: 2 },
        range:       3,
        price:       250,
    }]);
    let a = cat.instantiate("freeze").unwrap();
    let b = cat.instantiate("freeze").unwrap();
    assert_ne!(a.instance_id, b.instance_id);
    assert_eq!(a.template_id, b.template_id);
    assert!(cat.instantiate("nope").is_none());
}

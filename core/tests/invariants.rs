//! Properties that hold over long seeded runs.

use tileboard_core::{
    command::PlayerCommand,
    engine::GameEngine,
    event::GameEvent,
    turn::TurnPhase,
};

/// Plays `turns` turns, buying land and one shop card per visit, and
/// returns every event.
fn run(seed: u64, turns: u64) -> (GameEngine, Vec<GameEvent>) {
    let mut engine = GameEngine::build_test(format!("inv-{seed}"), seed).unwrap();
    let mut events = engine.start_new_game().unwrap();
    let mut bought_this_visit = false;
    while engine.turn() <= turns {
        let cmd = match engine.phase() {
            TurnPhase::AwaitingRoll => {
                bought_this_visit = false;
                PlayerCommand::RollDice
            }
            TurnPhase::Moving(session) => PlayerCommand::ChooseDirection {
                tile: *session.pending_choices().unwrap().last().unwrap(),
            },
            TurnPhase::AwaitingPurchase { .. } => PlayerCommand::AcceptPurchase,
            TurnPhase::ShopOpen(_) if !bought_this_visit => {
                bought_this_visit = true;
                PlayerCommand::BuyShopCard { offer: 0 }
            }
            TurnPhase::ShopOpen(_) => PlayerCommand::LeaveShop,
            other => panic!("unexpected phase {}", other.name()),
        };
        events.extend(engine.submit(&cmd).unwrap());
    }
    (engine, events)
}

#[test]
fn money_only_leaves_the_players_through_purchases() {
    for seed in [1, 2, 3] {
        let (engine, events) = run(seed, 80);
        let spent: i64 = events
            .iter()
            .map(|e| match e {
                GameEvent::TilePurchased { price, .. } => *price,
                GameEvent::ShopCardBought { price, .. } => *price,
                _ => 0,
            })
            .sum();
        assert_eq!(
            engine.roster().total_money(),
            4000 - spent,
            "seed {seed}: rent must be a closed transfer"
        );
    }
}

#[test]
fn hands_never_exceed_the_limit() {
    let (engine, _) = run(7, 120);
    let limit = engine.world().rules.hand_limit;
    for p in engine.roster().iter() {
        assert!(p.inventory().len() <= limit, "player {} holds {}", p.id, p.inventory().len());
    }
}

#[test]
fn a_walk_never_exceeds_its_roll() {
    let (_, events) = run(11, 80);
    let mut last_roll = None;
    for e in &events {
        match e {
            GameEvent::DiceRolled { value, .. } => last_roll = Some(*value),
            GameEvent::MovementFinished { steps_taken, .. } => {
                let roll = last_roll.take().expect("movement without a roll");
                assert!(*steps_taken <= roll, "walked {steps_taken} on a roll of {roll}");
            }
            _ => {}
        }
    }
}

#[test]
fn turns_hand_off_strictly_in_order() {
    let (_, events) = run(13, 40);
    let mut active = None;
    for e in &events {
        match e {
            GameEvent::TurnStarted { player, .. } => {
                assert_eq!(active, None, "turn started while player {active:?} was active");
                active = Some(*player);
            }
            GameEvent::TurnCompleted { player, .. } if active.is_some() => {
                assert_eq!(active, Some(*player), "completed a turn that was not active");
                active = None;
            }
            _ => {}
        }
    }
}

#[test]
fn owned_tiles_are_always_empty_category_with_a_house() {
    let (engine, _) = run(17, 80);
    for tile in engine.registry().all_tiles().filter(|t| t.owner.is_some()) {
        assert!(tile.category.is_ownable(), "tile {} owned but not ownable", tile.id);
        assert!(tile.has_building, "tile {} owned without a house", tile.id);
    }
}

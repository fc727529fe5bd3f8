//! board-runner: headless driver for the board game core.
//!
//! Usage:
//!   board-runner --seed 12345 --turns 40 --db run.db
//!   board-runner --seed 12345 --data-dir ./data --board default_board
//!   board-runner --seed 12345 --ipc-mode

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use tileboard_core::{
    command::PlayerCommand,
    config::GameConfig,
    engine::GameEngine,
    event::GameEvent,
    store::GameStore,
    turn::TurnPhase,
    types::{CardInstanceId, Money, PlayerId, TileId, Turn},
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Command { command: PlayerCommand },
    Snapshot,
    ResumeLatest,
    Quit,
}

#[derive(serde::Serialize)]
struct PlayerView {
    id:           PlayerId,
    tile:         TileId,
    money:        Money,
    frozen_turns: u32,
    cards:        Vec<(CardInstanceId, String)>,
}

#[derive(serde::Serialize)]
struct UiState {
    turn:               Turn,
    phase:              &'static str,
    current_player:     Option<PlayerId>,
    pending_directions: Option<Vec<TileId>>,
    shop_offers:        Option<Vec<String>>,
    players:            Vec<PlayerView>,
    events:             Vec<GameEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let turns = parse_arg(&args, "--turns", 40u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = str_arg(&args, "--db", ":memory:");
    let data_dir = str_arg(&args, "--data-dir", "./data");
    let board = str_arg(&args, "--board", "default_board");

    if !ipc_mode {
        println!("board-runner");
        println!("  seed:      {seed}");
        println!("  turns:     {turns}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  board:     {board}");
        println!();
    }

    let store = if db == ":memory:" { GameStore::in_memory()? } else { GameStore::open(db)? };
    store.migrate()?;

    let config = GameConfig::load(data_dir, board)?;
    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    let mut engine = GameEngine::new(run_id, seed, config, store)?;

    if ipc_mode {
        let events = engine.start_new_game()?;
        emit(&mut io::stdout(), &engine, events)?;
        run_ipc_loop(&mut engine)?;
    } else {
        let started = chrono::Utc::now();
        engine.start_new_game()?;
        autoplay(&mut engine, turns)?;
        print_summary(&engine, started)?;
    }

    Ok(())
}

/// Plays every seat with a fixed policy: take the first branch, buy what
/// is offered, buy one shop card per visit, play a held card on the first
/// tile in range.
#[derive(Default)]
struct AutoPlayer {
    turn:        Turn,
    shop_bought: bool,
    card_tried:  bool,
    targeted:    bool,
}

impl AutoPlayer {
    fn next_command(&mut self, engine: &GameEngine) -> Option<PlayerCommand> {
        if engine.turn() != self.turn {
            *self = Self { turn: engine.turn(), ..Self::default() };
        }
        let player = engine.current_player().and_then(|id| engine.player(id))?;
        let cmd = match engine.phase() {
            TurnPhase::AwaitingRoll => match player.inventory().first() {
                Some(card) if !self.card_tried => {
                    self.card_tried = true;
                    PlayerCommand::BeginCardTargeting { card: card.instance_id }
                }
                _ => PlayerCommand::RollDice,
            },
            TurnPhase::Moving(session) => {
                let tile = session.pending_choices()?.first().copied()?;
                PlayerCommand::ChooseDirection { tile }
            }
            TurnPhase::AwaitingPurchase { .. } => PlayerCommand::AcceptPurchase,
            TurnPhase::ShopOpen(shop) if !self.shop_bought && !shop.offers().is_empty() => {
                self.shop_bought = true;
                PlayerCommand::BuyShopCard { offer: 0 }
            }
            TurnPhase::ShopOpen(_) => PlayerCommand::LeaveShop,
            TurnPhase::CardTargeting { range, .. } => match range.first() {
                Some(tile) if !self.targeted => {
                    self.targeted = true;
                    PlayerCommand::TargetTile { tile: *tile }
                }
                _ => PlayerCommand::CancelCardTargeting,
            },
            TurnPhase::NotStarted | TurnPhase::TurnComplete | TurnPhase::Halted { .. } => {
                return None;
            }
        };
        Some(cmd)
    }
}

fn autoplay(engine: &mut GameEngine, turns: u64) -> Result<()> {
    let mut bot = AutoPlayer::default();
    while engine.turn() <= turns {
        let Some(cmd) = bot.next_command(engine) else {
            log::warn!("turn={} runner: no command for phase {}", engine.turn(), engine.phase().name());
            break;
        };
        for event in engine.submit(&cmd)? {
            log::debug!("{event:?}");
        }
    }
    Ok(())
}

fn run_ipc_loop(engine: &mut GameEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let events = match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => Vec::new(),
            IpcRequest::Command { command } => match engine.submit(&command) {
                Ok(events) => events,
                Err(e) => {
                    let err_json = serde_json::json!({ "error": e.to_string() });
                    writeln!(stdout, "{err_json}")?;
                    stdout.flush()?;
                    continue;
                }
            },
            IpcRequest::Snapshot => {
                engine.capture_snapshot()?;
                Vec::new()
            }
            IpcRequest::ResumeLatest => engine.resume_latest_from_store()?.unwrap_or_default(),
        };
        emit(&mut stdout, engine, events)?;
    }
    Ok(())
}

fn emit(out: &mut impl Write, engine: &GameEngine, events: Vec<GameEvent>) -> Result<()> {
    let state = build_ui_state(engine, events);
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    out.flush()?;
    Ok(())
}

fn build_ui_state(engine: &GameEngine, events: Vec<GameEvent>) -> UiState {
    let players = engine
        .roster()
        .iter()
        .map(|p| PlayerView {
            id:           p.id,
            tile:         p.current_tile,
            money:        p.money,
            frozen_turns: p.frozen_turns,
            cards:        p
                .inventory()
                .iter()
                .map(|c| (c.instance_id, c.template_id.clone()))
                .collect(),
        })
        .collect();
    UiState {
        turn:               engine.turn(),
        phase:              engine.phase().name(),
        current_player:     engine.current_player(),
        pending_directions: engine.sequencer().pending_directions().map(<[TileId]>::to_vec),
        shop_offers:        engine.sequencer().shop_offers().map(<[String]>::to_vec),
        players,
        events,
    }
}

fn print_summary(engine: &GameEngine, started: chrono::DateTime<chrono::Utc>) -> Result<()> {
    let elapsed = chrono::Utc::now() - started;
    let owned = engine.registry().all_tiles().filter(|t| t.owner.is_some()).count();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  final turn:     {}", engine.turn());
    println!("  phase:          {}", engine.phase().name());
    println!("  tiles owned:    {owned}/{}", engine.registry().len());
    println!("  events logged:  {}", engine.store_event_count()?);
    println!("  money in play:  ${}", engine.roster().total_money());
    println!("  elapsed:        {}ms", elapsed.num_milliseconds());
    println!();
    println!("=== PLAYERS ===");
    for p in engine.roster().iter() {
        let owned = engine
            .registry()
            .all_tiles()
            .filter(|t| t.owner == Some(p.id))
            .count();
        println!(
            "  player {} | tile {:>3} | ${:>6} | {} tiles | {} cards | frozen {}",
            p.id,
            p.current_tile,
            p.money,
            owned,
            p.inventory().len(),
            p.frozen_turns
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str, default: &'a str) -> &'a str {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .unwrap_or(default)
}

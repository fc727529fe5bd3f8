use crate::{
    card::{CardEffect, CardTemplate},
    tile::{TileCategory, DEFAULT_PURCHASE_PRICE, DEFAULT_RENT_PRICE, DEFAULT_STANDING_SLOTS},
    types::{Money, TileId},
};
use serde::{Deserialize, Serialize};

/// What to do with one-way links found when a board is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyPolicy {
    /// Keep links exactly as authored.
    #[default]
    Directed,
    /// Add every missing reverse link.
    Symmetrize,
    /// Refuse to load a board with any one-way link.
    RejectAsymmetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_player_count")]
    pub player_count:     u32,
    #[serde(default = "default_starting_money")]
    pub starting_money:   Money,
    #[serde(default = "default_hand_limit")]
    pub hand_limit:       usize,
    #[serde(default = "default_dice_faces")]
    pub dice_faces:       u32,
    #[serde(default = "default_shop_offer_count")]
    pub shop_offer_count: usize,
    #[serde(default = "default_standing_slots")]
    pub standing_slots:   usize,
    #[serde(default)]
    pub adjacency_policy: AdjacencyPolicy,
}

fn default_player_count() -> u32 { 4 }
fn default_starting_money() -> Money { 2000 }
fn default_hand_limit() -> usize { 5 }
fn default_dice_faces() -> u32 { 6 }
fn default_shop_offer_count() -> usize { 5 }
fn default_standing_slots() -> usize { DEFAULT_STANDING_SLOTS }
fn default_purchase_price() -> Money { DEFAULT_PURCHASE_PRICE }
fn default_rent_price() -> Money { DEFAULT_RENT_PRICE }

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            player_count:     default_player_count(),
            starting_money:   default_starting_money(),
            hand_limit:       default_hand_limit(),
            dice_faces:       default_dice_faces(),
            shop_offer_count: default_shop_offer_count(),
            standing_slots:   default_standing_slots(),
            adjacency_policy: AdjacencyPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    pub id:             TileId,
    pub category:       TileCategory,
    #[serde(default = "default_purchase_price")]
    pub purchase_price: Money,
    #[serde(default = "default_rent_price")]
    pub rent_price:     Money,
    /// N, E, S, W. `null` for no link.
    #[serde(default)]
    pub neighbors:      [Option<TileId>; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name:       String,
    pub start_tile: TileId,
    pub tiles:      Vec<TileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct CardCatalogFile {
    cards: Vec<CardTemplate>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub board: BoardConfig,
    pub cards: Vec<CardTemplate>,
}

impl GameConfig {
    /// Load from the data/ directory using the board named in `board`.
    /// In tests, use GameConfig::default_test().
    pub fn load(data_dir: &str, board: &str) -> anyhow::Result<Self> {
        let rules_path = format!("{data_dir}/rules.json");
        let rules: RulesConfig = read_json(&rules_path)?;

        let board_path = format!("{data_dir}/boards/{board}.json");
        let board: BoardConfig = read_json(&board_path)?;

        let cards_path = format!("{data_dir}/cards/card_catalog.json");
        let cards_file: CardCatalogFile = read_json(&cards_path)?;

        log::info!(
            "config: loaded board '{}' ({} tiles) and {} card templates",
            board.name,
            board.tiles.len(),
            cards_file.cards.len()
        );

        Ok(Self { rules, board, cards: cards_file.cards })
    }

    /// A small fixed board for tests. No filesystem access.
    ///
    /// Tiles 0..=9 form a one-way ring (each links East to the next).
    /// Tile 2 forks: North leads to 10 → 11 → back into the ring at 5.
    /// ```text
    ///        10 → 11
    ///        ↑     ↓
    ///  0 → 1 → 2 → 3 → 4 → 5 → 6 → 7 → 8 → 9 → (0)
    /// ```
    pub fn default_test() -> Self {
        use TileCategory::*;
        let ring = [Bank, Empty, Empty, Empty, Shop, Empty, Park, Empty, Trap, Empty];
        let n = ring.len() as TileId;
        let mut tiles: Vec<TileConfig> = ring
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let id = i as TileId;
                TileConfig {
                    id,
                    category: *category,
                    purchase_price: 300 + 50 * id as Money,
                    rent_price: 100 + 10 * id as Money,
                    neighbors: [None, Some((id + 1) % n), None, None],
                }
            })
            .collect();
        tiles[2].neighbors[0] = Some(10);
        tiles.push(TileConfig {
            id: 10,
            category: Empty,
            purchase_price: DEFAULT_PURCHASE_PRICE,
            rent_price: DEFAULT_RENT_PRICE,
            neighbors: [None, Some(11), None, None],
        });
        tiles.push(TileConfig {
            id: 11,
            category: Station,
            purchase_price: DEFAULT_PURCHASE_PRICE,
            rent_price: DEFAULT_RENT_PRICE,
            neighbors: [None, None, Some(5), None],
        });

        Self {
            rules: RulesConfig {
                player_count: 2,
                ..RulesConfig::default()
            },
            board: BoardConfig {
                name: "test_ring".into(),
                start_tile: 0,
                tiles,
            },
            cards: vec![
                CardTemplate {
                    template_id: "barricade".into(),
                    name: "Barricade".into(),
                    description: "Block a tile. The next token to arrive stops there.".into(),
                    effect: CardEffect::Barricade,
                    range: 3,
                    price: 150,
                },
                CardTemplate {
                    template_id: "freeze".into(),
                    name: "Freeze".into(),
                    description: "Opponents on the target tile lose two turns.".into(),
                    effect: CardEffect::Freeze { turns: 2 },
                    range: 3,
                    price: 250,
                },
            ],
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}

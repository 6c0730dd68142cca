//! Built-in themes

use crate::error::{ConfigError, ConfigResult};
use crate::money::Money;
use crate::symbols::{Symbol, SymbolCatalog, SymbolKind, SymbolTier};

use super::{
    BoardSpecialRules, BonusShape, BuyBonus, CoinValueTable, Dampening, GridShape, JackpotTier,
    SpecialCoinOdds, ThemeConfig, TriggerRule, WeightTable, WinMode,
};

const PLANE: u32 = 1;
const LOCK: u32 = 2;
const SHIELD: u32 = 3;
const BOT: u32 = 4;
const STAR: u32 = 5;
const GIFT: u32 = 6;
const DIAMOND: u32 = 7;
const HASH: u32 = 8;
const NUM: u32 = 9;
const WILD: u32 = 10;
const COIN: u32 = 11;
const EMPTY: u32 = 12;
const GEM: u32 = 13;

/// Ids of every built-in theme
pub fn builtin_theme_ids() -> &'static [&'static str] {
    &["durov", "flour", "coin_up", "gems"]
}

/// Look up a built-in theme by id
pub fn builtin_theme(id: &str) -> ConfigResult<ThemeConfig> {
    match id {
        "durov" => Ok(durov()),
        "flour" => Ok(flour()),
        "coin_up" => Ok(coin_up()),
        "gems" => Ok(gems()),
        other => Err(ConfigError::UnknownTheme(other.to_string())),
    }
}

/// Nine paying symbols shared by the line themes
fn line_symbols() -> Vec<Symbol> {
    vec![
        Symbol::regular(PLANE, "PLANE", SymbolTier::High, 6.0),
        Symbol::regular(LOCK, "LOCK", SymbolTier::High, 10.0),
        Symbol::regular(SHIELD, "SHIELD", SymbolTier::Low, 1.0),
        Symbol::regular(BOT, "BOT", SymbolTier::Mid, 1.5),
        Symbol::regular(STAR, "STAR", SymbolTier::Mid, 2.0),
        Symbol::regular(GIFT, "GIFT", SymbolTier::Mid, 2.5),
        Symbol::regular(DIAMOND, "DIAMOND", SymbolTier::High, 4.0),
        Symbol::regular(HASH, "HASH", SymbolTier::Filler, 0.7),
        Symbol::regular(NUM, "NUM", SymbolTier::Filler, 0.8),
        Symbol::wild(WILD, "WILD"),
        Symbol::coin(COIN, "COIN"),
        Symbol::empty(EMPTY),
    ]
}

fn classic_bonus_weights() -> WeightTable {
    WeightTable::from_pairs(&[(EMPTY, 300.0), (COIN, 10.0)])
}

fn base_theme(id: &str, name: &str, base_weights: WeightTable) -> ThemeConfig {
    let grid = GridShape::new(4, 5);
    ThemeConfig {
        id: id.to_string(),
        name: name.to_string(),
        symbols: SymbolCatalog::new(line_symbols()),
        grid,
        bonus_grid: BonusShape::same_as(grid),
        base_weights,
        bonus_weights: classic_bonus_weights(),
        bonus_top_row_weights: None,
        trigger: TriggerRule::CoinCount { threshold: 5 },
        win_mode: WinMode::Lines,
        expanding_wild: false,
        one_wild_per_column: true,
        length_bonus: vec![1.0, 2.0, 5.0],
        coin_values: CoinValueTable::default(),
        special_coins: SpecialCoinOdds::default(),
        dampening: None,
        initial_turns: 3,
        board_specials: BoardSpecialRules::default(),
        sticky_scatter_spins: None,
        buy_bonus: Some(BuyBonus::default()),
    }
}

/// 4×5 line theme; top-tier coins may upgrade to 5× bet
pub fn durov() -> ThemeConfig {
    let mut theme = base_theme(
        "durov",
        "Durov",
        WeightTable::from_pairs(&[
            (PLANE, 5.0),
            (LOCK, 3.0),
            (SHIELD, 90.0),
            (BOT, 30.0),
            (STAR, 25.0),
            (GIFT, 20.0),
            (DIAMOND, 8.0),
            (HASH, 100.0),
            (NUM, 100.0),
            (WILD, 5.0),
            (COIN, 15.0),
        ]),
    );
    theme.coin_values.jackpot = Some(JackpotTier {
        chance: 0.2,
        multiple: 5.0,
    });
    theme.dampening = Some(Dampening {
        bet_threshold: Money::from_major(50.0),
        high_scale: 0.5,
        wild_scale: 0.5,
        filler_scale: 1.25,
    });
    theme
}

/// 4×5 line theme with wilds expanding one row down
pub fn flour() -> ThemeConfig {
    let mut theme = base_theme(
        "flour",
        "Flour",
        WeightTable::from_pairs(&[
            (PLANE, 10.0),
            (LOCK, 5.0),
            (SHIELD, 80.0),
            (BOT, 60.0),
            (STAR, 50.0),
            (GIFT, 40.0),
            (DIAMOND, 15.0),
            (HASH, 60.0),
            (NUM, 60.0),
            (WILD, 30.0),
            (COIN, 25.0),
        ]),
    );
    theme.expanding_wild = true;
    theme
}

/// Scatter-pay theme; landed gems stay pinned for two spins
pub fn gems() -> ThemeConfig {
    let mut symbols = line_symbols();
    symbols.retain(|s| s.kind != SymbolKind::Wild);
    symbols.push(Symbol::scatter(GEM, "GEM"));

    let mut theme = base_theme(
        "gems",
        "Gems",
        WeightTable::from_pairs(&[
            (SHIELD, 90.0),
            (BOT, 30.0),
            (STAR, 25.0),
            (GIFT, 20.0),
            (HASH, 100.0),
            (NUM, 100.0),
            (GEM, 12.0),
            (COIN, 15.0),
        ]),
    );
    theme.symbols = SymbolCatalog::new(symbols);
    theme.win_mode = WinMode::Scatter {
        symbol: GEM,
        min_count: 3,
        pay_multiple: 5.0,
    };
    theme.sticky_scatter_spins = Some(2);
    theme.buy_bonus = None;
    theme
}

/// 3×3 base game that only pays through a 4×3 bonus with board specials
pub fn coin_up() -> ThemeConfig {
    const CU_A: u32 = 1;
    const CU_K: u32 = 2;
    const CU_Q: u32 = 3;
    const CU_J: u32 = 4;
    const CU_COIN: u32 = 5;
    const CU_COIN_UP: u32 = 6;
    const CU_MULTI_UP: u32 = 7;
    const CU_MYSTERY: u32 = 8;
    const CU_EMPTY: u32 = 9;

    ThemeConfig {
        id: "coin_up".to_string(),
        name: "Coin Up".to_string(),
        symbols: SymbolCatalog::new(vec![
            Symbol::regular(CU_A, "A", SymbolTier::Low, 0.0),
            Symbol::regular(CU_K, "K", SymbolTier::Low, 0.0),
            Symbol::regular(CU_Q, "Q", SymbolTier::Low, 0.0),
            Symbol::regular(CU_J, "J", SymbolTier::Low, 0.0),
            Symbol::coin(CU_COIN, "COIN"),
            Symbol::special(CU_COIN_UP, "COIN_UP", SymbolKind::CoinUp),
            Symbol::special(CU_MULTI_UP, "MULTI_UP", SymbolKind::MultiUp),
            Symbol::special(CU_MYSTERY, "MYSTERY", SymbolKind::Mystery),
            Symbol::empty(CU_EMPTY),
        ]),
        grid: GridShape::new(3, 3),
        bonus_grid: BonusShape {
            rows: 4,
            cols: 3,
            row_offset: 1,
        },
        base_weights: WeightTable::from_pairs(&[
            (CU_COIN, 20.0),
            (CU_A, 20.0),
            (CU_K, 20.0),
            (CU_Q, 20.0),
            (CU_J, 20.0),
        ]),
        bonus_weights: WeightTable::from_pairs(&[(CU_EMPTY, 80.0), (CU_COIN, 10.0)]),
        bonus_top_row_weights: Some(WeightTable::from_pairs(&[
            (CU_EMPTY, 80.0),
            (CU_COIN, 10.0),
            (CU_COIN_UP, 2.0),
            (CU_MULTI_UP, 2.0),
            (CU_MYSTERY, 1.0),
        ])),
        trigger: TriggerRule::FullRow { row: 1 },
        win_mode: WinMode::BonusOnly,
        expanding_wild: false,
        one_wild_per_column: false,
        length_bonus: vec![1.0, 2.0, 5.0],
        coin_values: CoinValueTable::default(),
        special_coins: SpecialCoinOdds::none(),
        dampening: None,
        initial_turns: 3,
        board_specials: BoardSpecialRules::default(),
        sticky_scatter_spins: None,
        buy_bonus: Some(BuyBonus::default()),
    }
}

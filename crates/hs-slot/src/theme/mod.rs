//! Theme configuration
//!
//! A theme is pure data: symbol catalog, weight tables, board shapes,
//! trigger rule, win mode and coin economics. The engine never branches on
//! a theme id; every behavioural difference between themes is a field here.

mod builtin;

pub use builtin::*;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::{Board, Position};
use crate::money::Money;
use crate::rng::DrawContext;
use crate::symbols::{Symbol, SymbolCatalog, SymbolId, SymbolKind, SymbolTier};

// ═══════════════════════════════════════════════════════════════════════════════
// WEIGHT TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// One (symbol, weight) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub symbol: SymbolId,
    pub weight: f64,
}

/// Ordered weight table; draw order is table order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    pub fn new(entries: Vec<WeightEntry>) -> Self {
        Self { entries }
    }

    pub fn from_pairs(pairs: &[(SymbolId, f64)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|&(symbol, weight)| WeightEntry { symbol, weight })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn weight_of(&self, symbol: SymbolId) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.symbol == symbol)
            .map(|e| e.weight)
            .sum()
    }

    /// Select the entry a roll in `[0, total)` lands on.
    ///
    /// Weights are consumed in table order. A roll left over by floating
    /// point rounding selects the last positive entry.
    pub fn pick(&self, roll: f64) -> Option<SymbolId> {
        let mut remaining = roll;
        for entry in &self.entries {
            if remaining < entry.weight {
                return Some(entry.symbol);
            }
            remaining -= entry.weight;
        }
        self.entries
            .iter()
            .rev()
            .find(|e| e.weight > 0.0)
            .map(|e| e.symbol)
    }

    /// Keep only entries whose symbol passes `keep`
    pub fn filtered(&self, keep: impl Fn(SymbolId) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| keep(e.symbol))
                .copied()
                .collect(),
        }
    }

    /// Scale each weight by a per-symbol factor
    pub fn reweighted(&self, factor: impl Fn(SymbolId) -> f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| WeightEntry {
                    symbol: e.symbol,
                    weight: e.weight * factor(e.symbol),
                })
                .collect(),
        }
    }

    fn validate(&self, name: &'static str, symbols: &SymbolCatalog) -> ConfigResult<()> {
        if self.entries.is_empty() {
            return Err(ConfigError::EmptyTable(name));
        }
        for entry in &self.entries {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    table: name,
                    symbol: entry.symbol,
                    weight: entry.weight,
                });
            }
            if symbols.get(entry.symbol).is_none() {
                return Err(ConfigError::UnknownSymbol {
                    table: name,
                    symbol: entry.symbol,
                });
            }
        }
        let non_wild: f64 = self
            .entries
            .iter()
            .filter(|e| symbols.kind_of(e.symbol) != SymbolKind::Wild)
            .map(|e| e.weight)
            .sum();
        if non_wild <= 0.0 {
            return Err(ConfigError::NoNonWildMass(name));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOARD SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Base game board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u8,
    pub cols: u8,
}

impl GridShape {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Bonus board dimensions; base rows land `row_offset` rows down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusShape {
    pub rows: u8,
    pub cols: u8,
    #[serde(default)]
    pub row_offset: u8,
}

impl BonusShape {
    /// Same shape as the base board
    pub fn same_as(grid: GridShape) -> Self {
        Self {
            rows: grid.rows,
            cols: grid.cols,
            row_offset: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// What starts a Hold & Win round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerRule {
    /// At least `threshold` coins anywhere on the base board
    CoinCount { threshold: usize },
    /// Every cell of `row` is a coin
    FullRow { row: u8 },
}

impl Default for TriggerRule {
    fn default() -> Self {
        Self::CoinCount { threshold: 5 }
    }
}

impl TriggerRule {
    pub fn is_met(&self, board: &Board) -> bool {
        match *self {
            Self::CoinCount { threshold } => board.coin_count() >= threshold,
            Self::FullRow { row } => {
                row < board.rows()
                    && (0..board.cols())
                        .all(|col| board.get(Position::new(row, col)).is_some_and(|c| c.is_coin()))
            }
        }
    }

    /// Non-coin positions whose conversion to a coin moves the board
    /// toward meeting this rule
    pub fn conversion_candidates(&self, board: &Board) -> Vec<Position> {
        board
            .iter()
            .filter(|(pos, cell)| {
                !cell.is_coin()
                    && match *self {
                        Self::CoinCount { .. } => true,
                        Self::FullRow { row } => pos.row == row,
                    }
            })
            .map(|(pos, _)| pos)
            .collect()
    }
}

/// How base spins pay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WinMode {
    /// Horizontal runs from the leftmost column
    Lines,
    /// Count of one symbol anywhere on the board
    Scatter {
        symbol: SymbolId,
        min_count: usize,
        /// Payout as a multiple of bet
        pay_multiple: f64,
    },
    /// No base game wins; the theme pays only through the bonus
    BonusOnly,
}

/// One coin-value band: `chance` of landing `multiple` × bet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinBand {
    pub chance: f64,
    pub multiple: f64,
}

/// Rare upgrade of a top-tier coin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JackpotTier {
    pub chance: f64,
    pub multiple: f64,
}

/// Coin value distribution as bet multiples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinValueTable {
    /// Bands in ascending order; leftover probability is the top tier
    pub bands: Vec<CoinBand>,
    /// Bets below this use `small_bet_top`, others `large_bet_top`
    pub small_bet_threshold: Money,
    pub small_bet_top: f64,
    pub large_bet_top: f64,
    #[serde(default)]
    pub jackpot: Option<JackpotTier>,
}

impl Default for CoinValueTable {
    fn default() -> Self {
        let band = |chance, multiple| CoinBand { chance, multiple };
        Self {
            bands: vec![
                band(0.20, 0.1),
                band(0.20, 0.3),
                band(0.20, 0.5),
                band(0.15, 1.0),
                band(0.10, 1.2),
                band(0.08, 1.5),
                band(0.04, 2.0),
            ],
            small_bet_threshold: Money::from_minor(100),
            small_bet_top: 3.0,
            large_bet_top: 2.0,
            jackpot: None,
        }
    }
}

impl CoinValueTable {
    /// Bet multiple for a band roll in `[0, 1)`; `jackpot_roll` is only
    /// consulted when the top tier is hit
    pub fn multiple_for(&self, roll: f64, jackpot_roll: f64, bet: Money) -> f64 {
        let mut remaining = roll;
        for band in &self.bands {
            if remaining < band.chance {
                return band.multiple;
            }
            remaining -= band.chance;
        }
        match self.jackpot {
            Some(jackpot) if jackpot_roll < jackpot.chance => jackpot.multiple,
            _ if bet < self.small_bet_threshold => self.small_bet_top,
            _ => self.large_bet_top,
        }
    }

    /// Coin value for a multiple, floored at one minor unit
    pub fn value_for(&self, bet: Money, multiple: f64) -> Money {
        bet.scale(multiple).max(Money::MINOR_UNIT)
    }

    fn validate(&self) -> ConfigResult<()> {
        let mut total = 0.0;
        for band in &self.bands {
            if !(0.0..=1.0).contains(&band.chance) || band.multiple <= 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "coin band {:?} out of range",
                    band
                )));
            }
            total += band.chance;
        }
        if total > 1.0 + 1e-9 {
            return Err(ConfigError::InvalidValue(format!(
                "coin band chances sum to {total} > 1"
            )));
        }
        if self.small_bet_top <= 0.0 || self.large_bet_top <= 0.0 {
            return Err(ConfigError::InvalidValue("top tier multiple must be positive".into()));
        }
        Ok(())
    }
}

/// Bonus-context odds of a coin landing as a multiplier or collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCoinOdds {
    pub multiplier: f64,
    pub collector: f64,
    /// Multiplier factors, chosen uniformly at landing
    pub factors: Vec<u32>,
}

impl Default for SpecialCoinOdds {
    fn default() -> Self {
        Self {
            multiplier: 0.05,
            collector: 0.05,
            factors: vec![2, 3],
        }
    }
}

impl SpecialCoinOdds {
    /// Odds for themes whose coins never change kind
    pub fn none() -> Self {
        Self {
            multiplier: 0.0,
            collector: 0.0,
            factors: Vec::new(),
        }
    }
}

/// High-bet weight scaling applied before the draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dampening {
    /// Active when the bet exceeds this amount
    pub bet_threshold: Money,
    pub high_scale: f64,
    pub wild_scale: f64,
    pub filler_scale: f64,
}

impl Dampening {
    pub fn factor(&self, symbol: Option<&Symbol>) -> f64 {
        match symbol {
            Some(s) if s.kind == SymbolKind::Wild => self.wild_scale,
            Some(s) if s.tier == SymbolTier::High => self.high_scale,
            Some(s) if s.tier == SymbolTier::Filler => self.filler_scale,
            _ => 1.0,
        }
    }
}

/// Effects of the top-row board specials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSpecialRules {
    /// Coin Up adds `bet × coin_up_increment` to every locked coin
    pub coin_up_increment: f64,
    /// Multi Up multiplies the locked coins of its column
    pub multi_up_factor: u32,
    /// Mystery becomes a coin worth `bet × mystery_multiple`
    pub mystery_multiple: f64,
}

impl Default for BoardSpecialRules {
    fn default() -> Self {
        Self {
            coin_up_increment: 0.5,
            multi_up_factor: 2,
            mystery_multiple: 50.0,
        }
    }
}

/// Bonus buy pricing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyBonus {
    pub cost_multiple: f64,
}

impl Default for BuyBonus {
    fn default() -> Self {
        Self { cost_multiple: 100.0 }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// THEME
// ═══════════════════════════════════════════════════════════════════════════════

fn default_true() -> bool {
    true
}

fn default_length_bonus() -> Vec<f64> {
    vec![1.0, 2.0, 5.0]
}

fn default_initial_turns() -> u8 {
    3
}

/// Complete theme configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub id: String,
    pub name: String,
    pub symbols: SymbolCatalog,
    pub grid: GridShape,
    pub bonus_grid: BonusShape,
    pub base_weights: WeightTable,
    pub bonus_weights: WeightTable,
    /// Row 0 of the bonus board draws from this table when present
    #[serde(default)]
    pub bonus_top_row_weights: Option<WeightTable>,
    #[serde(default)]
    pub trigger: TriggerRule,
    pub win_mode: WinMode,
    /// A wild also acts as wild on the cell directly below it
    #[serde(default)]
    pub expanding_wild: bool,
    #[serde(default = "default_true")]
    pub one_wild_per_column: bool,
    /// Pay factor for runs of 3, 4, 5 (longer runs use the last entry)
    #[serde(default = "default_length_bonus")]
    pub length_bonus: Vec<f64>,
    #[serde(default)]
    pub coin_values: CoinValueTable,
    #[serde(default)]
    pub special_coins: SpecialCoinOdds,
    #[serde(default)]
    pub dampening: Option<Dampening>,
    #[serde(default = "default_initial_turns")]
    pub initial_turns: u8,
    #[serde(default)]
    pub board_specials: BoardSpecialRules,
    /// Landed scatters stay pinned for this many following base spins
    #[serde(default)]
    pub sticky_scatter_spins: Option<u8>,
    #[serde(default)]
    pub buy_bonus: Option<BuyBonus>,
}

impl ThemeConfig {
    /// Weight table for a draw context, after dampening and wild exclusion
    pub fn table_for(&self, ctx: &DrawContext) -> Cow<'_, WeightTable> {
        let base = if ctx.bonus {
            match (&self.bonus_top_row_weights, ctx.row) {
                (Some(top), 0) => top,
                _ => &self.bonus_weights,
            }
        } else {
            &self.base_weights
        };

        let mut table = Cow::Borrowed(base);
        if !ctx.bonus {
            if let Some(dampening) = self.dampening.filter(|d| ctx.bet > d.bet_threshold) {
                table = Cow::Owned(base.reweighted(|id| dampening.factor(self.symbols.get(id))));
            }
        }
        if ctx.exclude_wild {
            table = Cow::Owned(table.filtered(|id| self.symbols.kind_of(id) != SymbolKind::Wild));
        }
        table
    }

    /// Pay factor for a run of `length` cells (0 below 3)
    pub fn length_bonus_for(&self, length: usize) -> f64 {
        if length < 3 {
            return 0.0;
        }
        let idx = (length - 3).min(self.length_bonus.len().saturating_sub(1));
        self.length_bonus.get(idx).copied().unwrap_or(0.0)
    }

    /// Symbol id used for blank bonus cells
    pub fn empty_symbol(&self) -> SymbolId {
        self.symbols.empty_id().unwrap_or_default()
    }

    /// Symbol id used for coins
    pub fn coin_symbol(&self) -> SymbolId {
        self.symbols.coin_id().unwrap_or_default()
    }

    /// Run every load-time configuration check
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("theme id cannot be empty".into()));
        }
        if self.symbols.is_empty() || !self.symbols.has_unique_ids() {
            return Err(ConfigError::InvalidValue(
                "symbol catalog must be non-empty with unique ids".into(),
            ));
        }
        if self.symbols.coin_id().is_none() {
            return Err(ConfigError::MissingSymbol("coin"));
        }
        if self.symbols.empty_id().is_none() {
            return Err(ConfigError::MissingSymbol("empty"));
        }

        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::InvalidDimensions(format!(
                "base grid {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.bonus_grid.cols != self.grid.cols
            || self.bonus_grid.rows < self.grid.rows.saturating_add(self.bonus_grid.row_offset)
        {
            return Err(ConfigError::InvalidDimensions(format!(
                "bonus grid {}x{} (offset {}) cannot hold base grid {}x{}",
                self.bonus_grid.rows,
                self.bonus_grid.cols,
                self.bonus_grid.row_offset,
                self.grid.rows,
                self.grid.cols
            )));
        }

        self.base_weights.validate("base", &self.symbols)?;
        self.bonus_weights.validate("bonus", &self.symbols)?;
        if let Some(top) = &self.bonus_top_row_weights {
            top.validate("bonus_top_row", &self.symbols)?;
        }
        if let Some(dampening) = self.dampening {
            let scales = [dampening.high_scale, dampening.wild_scale, dampening.filler_scale];
            if scales.iter().any(|s| !s.is_finite() || *s < 0.0) || dampening.bet_threshold < Money::ZERO {
                return Err(ConfigError::InvalidValue(format!(
                    "dampening scales must be finite and non-negative: {dampening:?}"
                )));
            }
            self.base_weights
                .reweighted(|id| dampening.factor(self.symbols.get(id)))
                .validate("base_dampened", &self.symbols)?;
        }

        match self.trigger {
            TriggerRule::CoinCount { threshold } => {
                if threshold == 0 || threshold > self.grid.cell_count() {
                    return Err(ConfigError::InvalidValue(format!(
                        "coin trigger threshold {threshold} impossible on {} cells",
                        self.grid.cell_count()
                    )));
                }
            }
            TriggerRule::FullRow { row } => {
                if row >= self.grid.rows {
                    return Err(ConfigError::InvalidValue(format!(
                        "trigger row {row} outside a {}-row grid",
                        self.grid.rows
                    )));
                }
            }
        }

        match self.win_mode {
            WinMode::Lines => {
                if self.length_bonus.is_empty() {
                    return Err(ConfigError::InvalidValue("length bonus table is empty".into()));
                }
            }
            WinMode::Scatter {
                symbol,
                min_count,
                pay_multiple,
            } => {
                if self.symbols.kind_of(symbol) != SymbolKind::Scatter {
                    return Err(ConfigError::InvalidValue(format!(
                        "scatter pay symbol {symbol} is not a scatter"
                    )));
                }
                if min_count == 0 || pay_multiple < 0.0 {
                    return Err(ConfigError::InvalidValue("invalid scatter pay".into()));
                }
            }
            WinMode::BonusOnly => {}
        }

        self.coin_values.validate()?;

        let odds = &self.special_coins;
        if odds.multiplier < 0.0 || odds.collector < 0.0 || odds.multiplier + odds.collector > 1.0 {
            return Err(ConfigError::InvalidValue("special coin odds out of range".into()));
        }
        if odds.multiplier > 0.0 && (odds.factors.is_empty() || odds.factors.contains(&0)) {
            return Err(ConfigError::InvalidValue(
                "multiplier coins need non-zero factors".into(),
            ));
        }

        if self.initial_turns == 0 {
            return Err(ConfigError::InvalidValue("initial turns must be at least 1".into()));
        }
        if self.sticky_scatter_spins.is_some() && !matches!(self.win_mode, WinMode::Scatter { .. }) {
            return Err(ConfigError::InvalidValue(
                "sticky scatters require scatter win mode".into(),
            ));
        }
        if let Some(buy) = self.buy_bonus {
            if buy.cost_multiple <= 0.0 {
                return Err(ConfigError::InvalidValue("bonus buy cost must be positive".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_walks_table_order() {
        let table = WeightTable::from_pairs(&[(1, 5.0), (2, 0.0), (3, 15.0)]);
        assert_eq!(table.total(), 20.0);
        assert_eq!(table.pick(0.0), Some(1));
        assert_eq!(table.pick(4.999), Some(1));
        assert_eq!(table.pick(5.0), Some(3));
        assert_eq!(table.pick(19.999), Some(3));
    }

    #[test]
    fn test_pick_rounding_overflow_selects_last_positive() {
        let table = WeightTable::from_pairs(&[(1, 1.0), (2, 1.0), (3, 0.0)]);
        assert_eq!(table.pick(2.0000001), Some(2));
        assert_eq!(WeightTable::default().pick(0.5), None);
    }

    #[test]
    fn test_coin_bands_follow_roll() {
        let table = CoinValueTable::default();
        let bet = Money::from_major(10.0);
        assert_eq!(table.multiple_for(0.0, 0.9, bet), 0.1);
        assert_eq!(table.multiple_for(0.65, 0.9, bet), 1.0);
        assert_eq!(table.multiple_for(0.96, 0.9, bet), 2.0);
        assert_eq!(table.multiple_for(0.99, 0.9, bet), 2.0);
        assert_eq!(table.multiple_for(0.99, 0.9, Money::from_major(0.5)), 3.0);

        let jackpot = CoinValueTable {
            jackpot: Some(JackpotTier {
                chance: 0.2,
                multiple: 5.0,
            }),
            ..CoinValueTable::default()
        };
        assert_eq!(jackpot.multiple_for(0.99, 0.1, bet), 5.0);
        assert_eq!(jackpot.multiple_for(0.99, 0.5, bet), 2.0);
    }

    #[test]
    fn test_dampening_scales_are_validated() {
        let mut theme = durov();
        theme.dampening = theme.dampening.map(|d| Dampening {
            filler_scale: -1.0,
            ..d
        });
        assert!(matches!(theme.validate(), Err(ConfigError::InvalidValue(_))));

        theme.dampening = theme.dampening.map(|d| Dampening {
            filler_scale: f64::NAN,
            ..d
        });
        assert!(matches!(theme.validate(), Err(ConfigError::InvalidValue(_))));

        // only PLANE carries non-wild mass, and dampening zeroes it
        let mut theme = durov();
        theme.base_weights = WeightTable::from_pairs(&[(10, 5.0), (1, 5.0)]);
        assert!(theme.validate().is_ok());
        theme.dampening = theme.dampening.map(|d| Dampening {
            high_scale: 0.0,
            ..d
        });
        assert_eq!(theme.validate(), Err(ConfigError::NoNonWildMass("base_dampened")));
    }

    #[test]
    fn test_coin_value_floor() {
        let table = CoinValueTable::default();
        assert_eq!(table.value_for(Money::from_minor(1), 0.1), Money::MINOR_UNIT);
        assert_eq!(table.value_for(Money::from_major(10.0), 1.2), Money::from_major(12.0));
    }

    #[test]
    fn test_length_bonus() {
        let theme = durov();
        assert_eq!(theme.length_bonus_for(2), 0.0);
        assert_eq!(theme.length_bonus_for(3), 1.0);
        assert_eq!(theme.length_bonus_for(4), 2.0);
        assert_eq!(theme.length_bonus_for(5), 5.0);
        assert_eq!(theme.length_bonus_for(7), 5.0);
    }

    #[test]
    fn test_dampening_applies_above_threshold_only() {
        let theme = durov();
        let dampening = theme.dampening.unwrap();
        let wild = theme.symbols.wild_id().unwrap();

        let low = theme.table_for(&DrawContext::base(dampening.bet_threshold));
        assert!(matches!(low, Cow::Borrowed(_)));

        let high = theme.table_for(&DrawContext::base(dampening.bet_threshold + Money::MINOR_UNIT));
        assert!(high.weight_of(wild) < theme.base_weights.weight_of(wild));
    }

    #[test]
    fn test_table_for_excludes_wild() {
        let theme = flour();
        let wild = theme.symbols.wild_id().unwrap();
        let ctx = DrawContext::base(Money::from_major(1.0)).without_wild();
        assert_eq!(theme.table_for(&ctx).weight_of(wild), 0.0);
    }

    #[test]
    fn test_top_row_table() {
        let theme = coin_up();
        let top = theme.table_for(&DrawContext::bonus(Money::from_major(1.0), 0));
        let other = theme.table_for(&DrawContext::bonus(Money::from_major(1.0), 2));
        let mystery = theme.symbols.first_of(SymbolKind::Mystery).unwrap().id;
        assert!(top.weight_of(mystery) > 0.0);
        assert_eq!(other.weight_of(mystery), 0.0);
    }

    #[test]
    fn test_validation_rejects_all_wild_table() {
        let mut theme = durov();
        let wild = theme.symbols.wild_id().unwrap();
        theme.base_weights = WeightTable::from_pairs(&[(wild, 10.0)]);
        assert_eq!(theme.validate(), Err(ConfigError::NoNonWildMass("base")));
    }

    #[test]
    fn test_validation_rejects_bad_tables() {
        let mut theme = durov();
        theme.bonus_weights = WeightTable::default();
        assert_eq!(theme.validate(), Err(ConfigError::EmptyTable("bonus")));

        let mut theme = durov();
        theme.base_weights = WeightTable::from_pairs(&[(999, 1.0)]);
        assert!(matches!(
            theme.validate(),
            Err(ConfigError::UnknownSymbol { symbol: 999, .. })
        ));

        let mut theme = durov();
        theme.base_weights = WeightTable::from_pairs(&[(1, -1.0)]);
        assert!(matches!(theme.validate(), Err(ConfigError::InvalidWeight { .. })));
    }

    #[test]
    fn test_validation_rejects_impossible_trigger() {
        let mut theme = coin_up();
        theme.trigger = TriggerRule::FullRow { row: 3 };
        assert!(theme.validate().is_err());

        let mut theme = durov();
        theme.trigger = TriggerRule::CoinCount { threshold: 21 };
        assert!(theme.validate().is_err());
    }
}

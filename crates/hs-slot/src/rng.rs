//! Random symbol generation
//!
//! All randomness the engine consumes flows through [`CellSource`]. The
//! production source wraps any `rand` RNG; tests and forced scenarios swap in
//! a scripted source without touching the resolution code.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::grid::{Cell, Coin, CoinKind};
use crate::money::Money;
use crate::symbols::SymbolKind;
use crate::theme::{SpecialCoinOdds, ThemeConfig};

/// Where a draw happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawContext {
    pub bet: Money,
    /// Bonus board draw (coin subtypes enabled, bonus tables)
    pub bonus: bool,
    /// Board row being filled
    pub row: u8,
    /// Draw conditioned on the symbol not being wild
    pub exclude_wild: bool,
}

impl DrawContext {
    pub fn base(bet: Money) -> Self {
        Self {
            bet,
            bonus: false,
            row: 0,
            exclude_wild: false,
        }
    }

    pub fn bonus(bet: Money, row: u8) -> Self {
        Self {
            bet,
            bonus: true,
            row,
            exclude_wild: false,
        }
    }

    pub fn at_row(mut self, row: u8) -> Self {
        self.row = row;
        self
    }

    pub fn without_wild(mut self) -> Self {
        self.exclude_wild = true;
        self
    }
}

/// Supplier of every random decision in a round
pub trait CellSource {
    /// One weighted symbol draw, with coin data when a coin lands
    fn draw(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Cell;

    /// A fresh coin from the theme's value distribution
    fn coin(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Coin;

    /// Uniform index in `0..len` (`len` > 0)
    fn pick(&mut self, len: usize) -> usize;
}

/// `CellSource` backed by a `rand` RNG
#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn coin_kind(&mut self, odds: &SpecialCoinOdds) -> CoinKind {
        let roll: f64 = self.rng.random();
        if roll >= 1.0 - odds.collector {
            CoinKind::Collector
        } else if roll >= 1.0 - odds.collector - odds.multiplier {
            let factor = odds.factors.choose(&mut self.rng).copied().unwrap_or(2);
            CoinKind::Multiplier { factor }
        } else {
            CoinKind::Standard
        }
    }
}

impl<R: Rng> CellSource for RandomSource<R> {
    fn draw(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Cell {
        let table = theme.table_for(ctx);
        let roll = self.rng.random::<f64>() * table.total();
        let symbol = table.pick(roll).unwrap_or_else(|| theme.empty_symbol());

        match theme.symbols.kind_of(symbol) {
            SymbolKind::Coin => Cell::coin(symbol, self.coin(theme, ctx)),
            kind => Cell::new(symbol, kind),
        }
    }

    fn coin(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Coin {
        let table = &theme.coin_values;
        let band_roll: f64 = self.rng.random();
        let jackpot_roll: f64 = self.rng.random();
        let value = table.value_for(ctx.bet, table.multiple_for(band_roll, jackpot_roll, ctx.bet));

        let kind = if ctx.bonus {
            self.coin_kind(&theme.special_coins)
        } else {
            CoinKind::Standard
        };
        Coin::new(value, kind)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{coin_up, durov};

    #[test]
    fn test_seeded_sources_repeat() {
        let theme = durov();
        let ctx = DrawContext::base(Money::from_major(1.0));
        let mut a = RandomSource::seeded(7);
        let mut b = RandomSource::seeded(7);
        for _ in 0..200 {
            assert_eq!(a.draw(&theme, &ctx), b.draw(&theme, &ctx));
        }
    }

    #[test]
    fn test_base_coins_are_standard() {
        let theme = durov();
        let ctx = DrawContext::base(Money::from_major(10.0));
        let mut source = RandomSource::seeded(3);
        for _ in 0..2_000 {
            let coin = source.coin(&theme, &ctx);
            assert_eq!(coin.kind, CoinKind::Standard);
            assert!(coin.value >= Money::MINOR_UNIT);
            assert!(coin.value <= Money::from_major(50.0));
        }
    }

    #[test]
    fn test_bonus_coins_get_special_kinds() {
        let theme = durov();
        let ctx = DrawContext::bonus(Money::from_major(10.0), 0);
        let mut source = RandomSource::seeded(11);
        let kinds: Vec<CoinKind> = (0..5_000).map(|_| source.coin(&theme, &ctx).kind).collect();
        let collectors = kinds.iter().filter(|k| **k == CoinKind::Collector).count();
        let multipliers = kinds
            .iter()
            .filter(|k| matches!(k, CoinKind::Multiplier { factor } if *factor == 2 || *factor == 3))
            .count();
        // 5% each, wide margin
        assert!((150..=350).contains(&collectors));
        assert!((150..=350).contains(&multipliers));
    }

    #[test]
    fn test_exclude_wild_never_draws_wild() {
        let theme = durov();
        let ctx = DrawContext::base(Money::from_major(1.0)).without_wild();
        let mut source = RandomSource::seeded(5);
        for _ in 0..5_000 {
            assert!(!source.draw(&theme, &ctx).is_wild());
        }
    }

    #[test]
    fn test_lower_bonus_rows_never_draw_specials() {
        let theme = coin_up();
        let mut source = RandomSource::seeded(9);
        let bet = Money::from_major(1.0);
        for row in 1..4 {
            for _ in 0..1_000 {
                let cell = source.draw(&theme, &DrawContext::bonus(bet, row));
                assert!(!cell.kind.is_board_special());
            }
        }
    }

    #[test]
    fn test_pick_in_range() {
        let mut source = RandomSource::seeded(1);
        assert_eq!(source.pick(0), 0);
        assert_eq!(source.pick(1), 0);
        for _ in 0..100 {
            assert!(source.pick(4) < 4);
        }
    }
}

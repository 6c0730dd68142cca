//! Scripted outcomes
//!
//! [`ScriptedSource`] is a [`CellSource`] that replays queued draws. Forced
//! scenarios and tests use it to land exact boards without touching the
//! resolution code. Once a queue runs dry the source falls back to a
//! neutral draw (a blank in the bonus, plain symbols in rotation in the base
//! game) so rounds still terminate and base boards stay losing.

use std::collections::VecDeque;

use crate::grid::{Cell, Coin};
use crate::money::Money;
use crate::rng::{CellSource, DrawContext};
use crate::symbols::SymbolKind;
use crate::theme::ThemeConfig;

/// Replays queued cells, coins and picks in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    cells: VecDeque<Cell>,
    coins: VecDeque<Coin>,
    picks: VecDeque<usize>,
    fallbacks: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one drawn cell
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cells.push_back(cell);
        self
    }

    pub fn with_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Queue a whole board given row by row.
    ///
    /// The generator draws column by column, so the cells are queued in
    /// column-major order.
    pub fn with_board(mut self, rows: &[Vec<Cell>]) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for col in 0..cols {
            for row in rows {
                if let Some(cell) = row.get(col) {
                    self.cells.push_back(cell.clone());
                }
            }
        }
        self
    }

    /// Queue a coin returned by [`CellSource::coin`]
    pub fn with_coin(mut self, coin: Coin) -> Self {
        self.coins.push_back(coin);
        self
    }

    /// Queue an index returned by [`CellSource::pick`]
    pub fn with_pick(mut self, index: usize) -> Self {
        self.picks.push_back(index);
        self
    }

    /// Queued cells not yet drawn
    pub fn remaining(&self) -> usize {
        self.cells.len()
    }

    fn fallback(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Cell {
        if ctx.bonus {
            return Cell::empty(theme.empty_symbol());
        }
        let regular = theme.symbols.regular_ids();
        if regular.is_empty() {
            return Cell::empty(theme.empty_symbol());
        }
        let id = regular[self.fallbacks % regular.len()];
        self.fallbacks += 1;
        Cell::new(id, SymbolKind::Regular)
    }
}

impl CellSource for ScriptedSource {
    fn draw(&mut self, theme: &ThemeConfig, ctx: &DrawContext) -> Cell {
        match self.cells.pop_front() {
            Some(cell) if ctx.exclude_wild && cell.is_wild() => self.fallback(theme, ctx),
            Some(cell) => cell,
            None => self.fallback(theme, ctx),
        }
    }

    fn coin(&mut self, _theme: &ThemeConfig, ctx: &DrawContext) -> Coin {
        self.coins
            .pop_front()
            .unwrap_or_else(|| Coin::standard(ctx.bet.max(Money::MINOR_UNIT)))
    }

    fn pick(&mut self, len: usize) -> usize {
        let index = self.picks.pop_front().unwrap_or(0);
        index.min(len.saturating_sub(1))
    }
}

//! Boards, cells and the grid generator

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::rng::{CellSource, DrawContext};
use crate::symbols::{SymbolId, SymbolKind};
use crate::theme::{ThemeConfig, WinMode};

/// Redraw attempts for a second wild in a column before the draw is
/// conditioned on non-wild
pub const MAX_WILD_REDRAWS: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// CELLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Board coordinate; ordering is row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Coin subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoinKind {
    Standard,
    /// Multiplies one other coin, then unlocks
    Multiplier { factor: u32 },
    /// Absorbs the value of every other locked coin
    Collector,
}

/// Coin payload of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub value: Money,
    pub kind: CoinKind,
    /// Already multiplied once
    #[serde(default)]
    pub boosted: bool,
}

impl Coin {
    pub fn new(value: Money, kind: CoinKind) -> Self {
        Self {
            value,
            kind,
            boosted: false,
        }
    }

    pub fn standard(value: Money) -> Self {
        Self::new(value, CoinKind::Standard)
    }
}

/// One board position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: SymbolId,
    pub kind: SymbolKind,
    #[serde(default)]
    pub coin: Option<Coin>,
    #[serde(default)]
    pub locked: bool,
    /// Remaining pinned spins for a sticky scatter
    #[serde(default)]
    pub sticky: Option<u8>,
}

impl Cell {
    pub fn new(symbol: SymbolId, kind: SymbolKind) -> Self {
        Self {
            symbol,
            kind,
            coin: None,
            locked: false,
            sticky: None,
        }
    }

    pub fn coin(symbol: SymbolId, coin: Coin) -> Self {
        Self {
            coin: Some(coin),
            ..Self::new(symbol, SymbolKind::Coin)
        }
    }

    pub fn empty(symbol: SymbolId) -> Self {
        Self::new(symbol, SymbolKind::Empty)
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_coin(&self) -> bool {
        self.kind == SymbolKind::Coin && self.coin.is_some()
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    /// Coin value, zero for non-coins
    pub fn value(&self) -> Money {
        self.coin.map(|c| c.value).unwrap_or(Money::ZERO)
    }

    /// State this cell has on the next regeneration, or `None` when it is
    /// drawn fresh
    fn carried(&self) -> Option<Cell> {
        if !self.locked {
            return None;
        }
        match self.sticky {
            None => Some(self.clone()),
            Some(0) => None,
            Some(n) => Some(Cell {
                sticky: Some(n - 1),
                ..self.clone()
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOARD
// ═══════════════════════════════════════════════════════════════════════════════

/// rows × cols matrix of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    rows: u8,
    cols: u8,
    cells: Vec<Cell>,
}

impl Board {
    /// Board with every position set to `cell`
    pub fn filled(rows: u8, cols: u8, cell: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell; rows as usize * cols as usize],
        }
    }

    /// Board from explicit rows; `None` when empty or ragged
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Option<Self> {
        let cols = rows.first()?.len();
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: u8::try_from(rows.len()).ok()?,
            cols: u8::try_from(cols).ok()?,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols)
            .then(|| pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        let i = self.index(pos)?;
        self.cells.get(i)
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        self.cells.get_mut(i)
    }

    /// Replace a cell; returns false when `pos` is off the board
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.get_mut(pos) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Cells in row-major order with their positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let cols = self.cols as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (Position::new((i / cols) as u8, (i % cols) as u8), cell)
        })
    }

    pub fn row(&self, row: u8) -> &[Cell] {
        let cols = self.cols as usize;
        let start = (row as usize * cols).min(self.cells.len());
        let end = (start + cols).min(self.cells.len());
        &self.cells[start..end]
    }

    /// Symbol ids of a column, top to bottom
    pub fn column_symbols(&self, col: u8) -> Vec<SymbolId> {
        (0..self.rows)
            .filter_map(|row| self.get(Position::new(row, col)))
            .map(|c| c.symbol)
            .collect()
    }

    pub fn coin_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_coin()).count()
    }

    /// Positions holding locked coins, row-major
    pub fn locked_coins(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, c)| c.locked && c.is_coin())
            .map(|(p, _)| p)
            .collect()
    }

    /// Sum of locked coin values
    pub fn locked_total(&self) -> Money {
        self.cells
            .iter()
            .filter(|c| c.locked && c.is_coin())
            .map(Cell::value)
            .sum()
    }

    /// Every position holds a locked coin
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.locked && c.is_coin())
    }

    /// Number of wilds in a column
    pub fn wilds_in_column(&self, col: u8) -> usize {
        (0..self.rows)
            .filter_map(|row| self.get(Position::new(row, col)))
            .filter(|c| c.is_wild())
            .count()
    }

    /// Unlock every pinned scatter
    pub fn release_pins(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.sticky.is_some()) {
            cell.sticky = None;
            cell.locked = false;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Shape and context of one board generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRequest {
    pub rows: u8,
    pub cols: u8,
    pub bonus: bool,
    pub bet: Money,
}

impl GridRequest {
    /// Base game board for a theme
    pub fn base(theme: &ThemeConfig, bet: Money) -> Self {
        Self {
            rows: theme.grid.rows,
            cols: theme.grid.cols,
            bonus: false,
            bet,
        }
    }

    /// Bonus board for a theme
    pub fn bonus(theme: &ThemeConfig, bet: Money) -> Self {
        Self {
            rows: theme.bonus_grid.rows,
            cols: theme.bonus_grid.cols,
            bonus: true,
            bet,
        }
    }
}

/// Build a new board column by column, top to bottom.
///
/// Locked cells of `carry` are copied over (sticky countdowns tick down);
/// every other cell is drawn from `source`. With `one_wild_per_column`, a
/// second wild in a column is redrawn.
pub fn generate<S>(
    req: &GridRequest,
    theme: &ThemeConfig,
    source: &mut S,
    carry: Option<&Board>,
) -> Board
where
    S: CellSource + ?Sized,
{
    let mut board = Board::filled(req.rows, req.cols, Cell::empty(theme.empty_symbol()));

    for col in 0..req.cols {
        let mut wild_in_column = false;
        for row in 0..req.rows {
            let pos = Position::new(row, col);

            let kept = carry.and_then(|b| b.get(pos)).and_then(Cell::carried);
            let cell = match kept {
                Some(cell) => cell,
                None => {
                    let ctx = DrawContext {
                        bet: req.bet,
                        bonus: req.bonus,
                        row,
                        exclude_wild: false,
                    };
                    let drawn = source.draw(theme, &ctx);
                    if theme.one_wild_per_column && wild_in_column && drawn.is_wild() {
                        redraw_non_wild(theme, source, &ctx)
                    } else {
                        drawn
                    }
                }
            };

            wild_in_column |= cell.is_wild();
            board.set(pos, cell);
        }
    }

    board
}

fn redraw_non_wild<S>(theme: &ThemeConfig, source: &mut S, ctx: &DrawContext) -> Cell
where
    S: CellSource + ?Sized,
{
    for _ in 0..MAX_WILD_REDRAWS {
        let cell = source.draw(theme, ctx);
        if !cell.is_wild() {
            return cell;
        }
    }
    log::debug!("wild redraw bound reached at row {}, drawing without wilds", ctx.row);
    source.draw(theme, &ctx.without_wild())
}

/// Pin freshly landed scatters on themes with sticky scatters
pub fn pin_scatters(board: &mut Board, theme: &ThemeConfig) {
    let (Some(spins), WinMode::Scatter { symbol, .. }) = (theme.sticky_scatter_spins, theme.win_mode)
    else {
        return;
    };
    for cell in board.cells.iter_mut() {
        if cell.symbol == symbol && !cell.locked {
            cell.locked = true;
            cell.sticky = Some(spins);
        }
    }
}

//! Payline and scatter evaluation
//!
//! `evaluate` is a pure function of (board, bet, theme).

use serde::{Deserialize, Serialize};

use crate::grid::{Board, Position};
use crate::money::Money;
use crate::symbols::SymbolId;
use crate::theme::{ThemeConfig, WinMode};

/// A horizontal run starting at column 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Run {
    /// First non-wild symbol; `None` for an all-wild row
    pub symbol: Option<SymbolId>,
    pub length: usize,
}

/// One paying row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    pub row: u8,
    pub symbol: SymbolId,
    pub length: usize,
    pub amount: Money,
}

/// Result of evaluating a base board
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WinEvaluation {
    pub amount: Money,
    /// Cells to highlight
    pub cells: Vec<Position>,
    pub lines: Vec<LineWin>,
    /// Scatter occurrences counted (scatter mode only)
    pub scatter_count: usize,
}

impl WinEvaluation {
    pub fn is_win(&self) -> bool {
        self.amount.is_positive()
    }
}

/// Scan a row of `(symbol, is_wild)` pairs from the left.
///
/// Wilds extend the run; the first non-wild fixes the run symbol; the run
/// stops at the first cell that is neither wild nor that symbol.
pub fn scan_run(cells: impl IntoIterator<Item = (SymbolId, bool)>) -> Run {
    let mut run = Run::default();
    for (symbol, wild) in cells {
        if wild {
            run.length += 1;
            continue;
        }
        match run.symbol {
            None => {
                run.symbol = Some(symbol);
                run.length += 1;
            }
            Some(current) if current == symbol => run.length += 1,
            Some(_) => break,
        }
    }
    run
}

/// Run of one board row; with `expanding_wild` a wild directly above a
/// cell makes that cell wild
pub fn row_run(board: &Board, row: u8, expanding_wild: bool) -> Run {
    let wild_above = |col: u8| {
        expanding_wild
            && row > 0
            && board
                .get(Position::new(row - 1, col))
                .is_some_and(|c| c.is_wild())
    };
    scan_run(
        board
            .row(row)
            .iter()
            .enumerate()
            .map(|(col, cell)| (cell.symbol, cell.is_wild() || wild_above(col as u8))),
    )
}

/// Evaluate a base board
pub fn evaluate(board: &Board, bet: Money, theme: &ThemeConfig) -> WinEvaluation {
    match theme.win_mode {
        WinMode::Lines => evaluate_lines(board, bet, theme),
        WinMode::Scatter {
            symbol,
            min_count,
            pay_multiple,
        } => {
            let cells: Vec<Position> = board
                .iter()
                .filter(|(_, c)| c.symbol == symbol)
                .map(|(p, _)| p)
                .collect();
            let scatter_count = cells.len();
            if scatter_count >= min_count {
                WinEvaluation {
                    amount: bet.scale(pay_multiple),
                    cells,
                    lines: Vec::new(),
                    scatter_count,
                }
            } else {
                WinEvaluation {
                    scatter_count,
                    ..WinEvaluation::default()
                }
            }
        }
        WinMode::BonusOnly => WinEvaluation::default(),
    }
}

fn evaluate_lines(board: &Board, bet: Money, theme: &ThemeConfig) -> WinEvaluation {
    let mut result = WinEvaluation::default();

    for row in 0..board.rows() {
        let run = row_run(board, row, theme.expanding_wild);
        if run.length < 3 {
            continue;
        }
        let Some(symbol) = run.symbol else {
            continue;
        };
        let Some(def) = theme.symbols.get(symbol).filter(|s| s.pays_on_line()) else {
            continue;
        };

        let amount = bet.scale(def.multiplier * theme.length_bonus_for(run.length));
        if !amount.is_positive() {
            continue;
        }
        result.amount += amount;
        result
            .cells
            .extend((0..run.length).map(|col| Position::new(row, col as u8)));
        result.lines.push(LineWin {
            row,
            symbol,
            length: run.length,
            amount,
        });
    }

    result
}

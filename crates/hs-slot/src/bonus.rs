//! Hold & Win bonus round
//!
//! ## Flow
//!
//! ```text
//! trigger → [turn]* → Settled
//! ```
//!
//! Each turn re-spins the unlocked cells and resolves in a fixed order:
//! lock new coins, classify them, apply board specials, resolve multipliers,
//! resolve collectors, update the running total, then check for exit.
//! The round settles when the board is full of locked coins or the turn
//! budget runs out; any new lock resets the budget.

use serde::{Deserialize, Serialize};

pub use hs_stage::BonusEndReason;
use hs_stage::TransferKind;

use crate::error::{EngineError, EngineResult};
use crate::grid::{generate, Board, Cell, Coin, CoinKind, GridRequest, Position};
use crate::money::Money;
use crate::rng::CellSource;
use crate::symbols::SymbolKind;
use crate::theme::ThemeConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// What a transfer edge represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Multiplier coin boosting its target
    Multiply { factor: u32 },
    /// Source coin feeding a collector
    Collect,
    /// Coin Up adding to a coin
    CoinUp,
    /// Multi Up multiplying a coin in its column
    MultiUp { factor: u32 },
}

impl EffectKind {
    /// Presentation family of this edge
    pub fn transfer_kind(&self) -> TransferKind {
        match self {
            Self::Multiply { .. } => TransferKind::Multiply,
            Self::Collect => TransferKind::Collect,
            Self::CoinUp => TransferKind::CoinUp,
            Self::MultiUp { .. } => TransferKind::MultiUp,
        }
    }
}

/// Value transfer edge between two cells, recorded at the moment it happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEffect {
    pub from: Position,
    pub to: Position,
    pub kind: EffectKind,
    /// Value added to the receiving side
    pub amount: Money,
}

/// Lifecycle of a bonus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum BonusPhase {
    Active,
    Settled(BonusEndReason),
}

/// A coin as it landed, before any transfer touched it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedCoin {
    pub position: Position,
    pub coin: Coin,
}

/// A board special that landed and acted this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedSpecial {
    pub position: Position,
    pub kind: SymbolKind,
}

/// Everything that happened in one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// 1-based turn number
    pub turn: u32,
    /// Board after the turn resolved
    pub board: Board,
    /// Coins that locked this turn as they landed, row-major (includes
    /// multipliers that spun away)
    pub landed: Vec<LandedCoin>,
    /// Board specials that acted this turn, row-major
    pub specials: Vec<LandedSpecial>,
    pub effects: Vec<SpecialEffect>,
    /// The turn budget was reset
    pub new_lock: bool,
    pub running_total: Money,
    pub turns_left: u8,
    pub phase: BonusPhase,
}

/// Final result of a bonus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub bet: Money,
    /// Sum of locked coin values, credited exactly once
    pub payout: Money,
    pub reason: BonusEndReason,
    pub turns_played: u32,
    pub coins: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND
// ═══════════════════════════════════════════════════════════════════════════════

/// A Hold & Win round in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusRound {
    board: Board,
    bet: Money,
    initial_turns: u8,
    turns_left: u8,
    turns_played: u32,
    running_total: Money,
    trigger_coins: usize,
    phase: BonusPhase,
}

impl BonusRound {
    /// Enter the bonus from a base board.
    ///
    /// Every coin locks, every other cell becomes empty and the board takes
    /// the theme's bonus shape, base rows shifted down by `row_offset`.
    pub fn trigger(base: &Board, theme: &ThemeConfig, bet: Money) -> Self {
        let shape = theme.bonus_grid;
        let mut board = Board::filled(shape.rows, shape.cols, Cell::empty(theme.empty_symbol()));

        for (pos, cell) in base.iter().filter(|(_, c)| c.is_coin()) {
            let target = Position::new(pos.row.saturating_add(shape.row_offset), pos.col);
            let locked = Cell {
                sticky: None,
                ..cell.clone().locked()
            };
            board.set(target, locked);
        }

        let trigger_coins = board.locked_coins().len();
        let running_total = board.locked_total();
        log::info!(
            "bonus triggered: {} coins worth {} on a {}x{} board",
            trigger_coins,
            running_total,
            shape.rows,
            shape.cols
        );

        Self {
            board,
            bet,
            initial_turns: theme.initial_turns,
            turns_left: theme.initial_turns,
            turns_played: 0,
            running_total,
            trigger_coins,
            phase: BonusPhase::Active,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bet(&self) -> Money {
        self.bet
    }

    pub fn turns_left(&self) -> u8 {
        self.turns_left
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Live sum of locked coins (feedback only; settlement recomputes)
    pub fn running_total(&self) -> Money {
        self.running_total
    }

    pub fn trigger_coins(&self) -> usize {
        self.trigger_coins
    }

    pub fn phase(&self) -> BonusPhase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, BonusPhase::Settled(_))
    }

    /// Play one turn
    pub fn play_turn<S>(&mut self, theme: &ThemeConfig, source: &mut S) -> EngineResult<TurnReport>
    where
        S: CellSource + ?Sized,
    {
        if self.is_settled() {
            return Err(EngineError::NoBonusActive);
        }

        // 1. Re-spin unlocked cells; coins lock where they land
        let req = GridRequest {
            rows: self.board.rows(),
            cols: self.board.cols(),
            bonus: true,
            bet: self.bet,
        };
        let mut next = generate(&req, theme, source, Some(&self.board));

        let mut landed = Vec::new();
        let mut specials = Vec::new();
        for (pos, previous) in self.board.iter() {
            if previous.locked {
                continue;
            }
            let Some(cell) = next.get_mut(pos) else {
                continue;
            };
            if cell.is_coin() {
                cell.locked = true;
                landed.push(pos);
            } else if cell.kind.is_board_special() {
                specials.push(LandedSpecial {
                    position: pos,
                    kind: cell.kind,
                });
            }
        }

        // 2. Collectors and multipliers land showing nothing
        let mut pending = Vec::new();
        for &pos in &landed {
            if let Some(coin) = next.get_mut(pos).and_then(|c| c.coin.as_mut()) {
                if coin.kind != CoinKind::Standard {
                    coin.value = Money::ZERO;
                    pending.push(pos);
                }
            }
        }

        let mut arrivals = snapshot(&next, &landed);
        let mut effects = Vec::new();

        // 3. Board specials, row-major
        let before_specials = landed.len();
        for special in &specials {
            self.apply_board_special(theme, &mut next, *special, &pending, &mut landed, &mut effects);
        }
        arrivals.extend(snapshot(&next, &landed[before_specials..]));

        // 4. Multipliers against the pre-resolution snapshot
        self.resolve_multipliers(theme, &mut next, &landed, source, &mut effects);

        // 5. Collectors
        resolve_collectors(&mut next, &landed, &mut effects);

        // 6. Running total
        self.running_total = next.locked_total();
        self.board = next;
        self.turns_played += 1;

        // 7. Exit check
        let new_lock = !landed.is_empty() || !specials.is_empty();
        if self.board.is_full() {
            self.phase = BonusPhase::Settled(BonusEndReason::BoardFull);
        } else if new_lock {
            self.turns_left = self.initial_turns;
        } else {
            self.turns_left = self.turns_left.saturating_sub(1);
            if self.turns_left == 0 {
                self.phase = BonusPhase::Settled(BonusEndReason::OutOfTurns);
            }
        }

        log::debug!(
            "bonus turn {}: {} landed, {} effects, total {}, {} turns left",
            self.turns_played,
            landed.len(),
            effects.len(),
            self.running_total,
            self.turns_left
        );

        arrivals.sort_unstable_by_key(|a| a.position);
        Ok(TurnReport {
            turn: self.turns_played,
            board: self.board.clone(),
            landed: arrivals,
            specials,
            effects,
            new_lock,
            running_total: self.running_total,
            turns_left: self.turns_left,
            phase: self.phase,
        })
    }

    /// Final payout once the round has settled
    pub fn settle(&self) -> Option<Settlement> {
        let BonusPhase::Settled(reason) = self.phase else {
            return None;
        };
        let payout = self.board.locked_total();
        log::info!(
            "bonus settled ({:?}) after {} turns: {}",
            reason,
            self.turns_played,
            payout
        );
        Some(Settlement {
            bet: self.bet,
            payout,
            reason,
            turns_played: self.turns_played,
            coins: self.board.locked_coins().len(),
        })
    }

    fn apply_board_special(
        &self,
        theme: &ThemeConfig,
        board: &mut Board,
        special: LandedSpecial,
        pending: &[Position],
        landed: &mut Vec<Position>,
        effects: &mut Vec<SpecialEffect>,
    ) {
        let rules = theme.board_specials;
        let pos = special.position;

        match special.kind {
            SymbolKind::CoinUp => {
                let increment = self.bet.scale(rules.coin_up_increment);
                for target in valued_coins(board, pending, None) {
                    if let Some(coin) = board.get_mut(target).and_then(|c| c.coin.as_mut()) {
                        coin.value += increment;
                        effects.push(SpecialEffect {
                            from: pos,
                            to: target,
                            kind: EffectKind::CoinUp,
                            amount: increment,
                        });
                    }
                }
                board.set(pos, Cell::empty(theme.empty_symbol()));
            }
            SymbolKind::MultiUp => {
                let factor = rules.multi_up_factor;
                for target in valued_coins(board, pending, Some(pos.col)) {
                    if let Some(coin) = board.get_mut(target).and_then(|c| c.coin.as_mut()) {
                        let before = coin.value;
                        coin.value = before.times(factor);
                        effects.push(SpecialEffect {
                            from: pos,
                            to: target,
                            kind: EffectKind::MultiUp { factor },
                            amount: coin.value - before,
                        });
                    }
                }
                board.set(pos, Cell::empty(theme.empty_symbol()));
            }
            SymbolKind::Mystery => {
                let value = self.bet.scale(rules.mystery_multiple);
                board.set(pos, Cell::coin(theme.coin_symbol(), Coin::standard(value)).locked());
                landed.push(pos);
            }
            _ => {}
        }
    }

    fn resolve_multipliers<S>(
        &self,
        theme: &ThemeConfig,
        board: &mut Board,
        landed: &[Position],
        source: &mut S,
        effects: &mut Vec<SpecialEffect>,
    ) where
        S: CellSource + ?Sized,
    {
        let mut multipliers: Vec<(Position, u32)> = landed
            .iter()
            .filter_map(|&pos| match board.get(pos)?.coin?.kind {
                CoinKind::Multiplier { factor } => Some((pos, factor)),
                _ => None,
            })
            .collect();
        multipliers.sort_unstable_by_key(|(pos, _)| *pos);

        // Eligible targets: locked standard coins with value, never boosted
        let mut candidates: Vec<Position> = board
            .iter()
            .filter(|(_, c)| {
                c.locked
                    && c.coin.is_some_and(|coin| {
                        coin.kind == CoinKind::Standard && coin.value.is_positive() && !coin.boosted
                    })
            })
            .map(|(p, _)| p)
            .collect();

        for (pos, factor) in multipliers {
            if candidates.is_empty() {
                log::debug!("multiplier at {:?} found no target", pos);
            } else {
                let idx = source.pick(candidates.len()).min(candidates.len() - 1);
                let target = candidates.remove(idx);
                if let Some(coin) = board.get_mut(target).and_then(|c| c.coin.as_mut()) {
                    let before = coin.value;
                    coin.value = before.times(factor);
                    coin.boosted = true;
                    effects.push(SpecialEffect {
                        from: pos,
                        to: target,
                        kind: EffectKind::Multiply { factor },
                        amount: coin.value - before,
                    });
                }
            }
            // The multiplier spins away
            board.set(pos, Cell::empty(theme.empty_symbol()));
        }
    }
}

fn snapshot(board: &Board, positions: &[Position]) -> Vec<LandedCoin> {
    positions
        .iter()
        .filter_map(|&position| {
            let coin = board.get(position)?.coin?;
            Some(LandedCoin { position, coin })
        })
        .collect()
}

/// Locked coins that already carry their value (optionally one column)
fn valued_coins(board: &Board, pending: &[Position], column: Option<u8>) -> Vec<Position> {
    board
        .iter()
        .filter(|(pos, cell)| {
            cell.locked
                && cell.is_coin()
                && !pending.contains(pos)
                && column.is_none_or(|c| pos.col == c)
        })
        .map(|(pos, _)| pos)
        .collect()
}

fn resolve_collectors(board: &mut Board, landed: &[Position], effects: &mut Vec<SpecialEffect>) {
    let mut collectors: Vec<Position> = landed
        .iter()
        .copied()
        .filter(|&pos| {
            board
                .get(pos)
                .and_then(|c| c.coin)
                .is_some_and(|coin| coin.kind == CoinKind::Collector)
        })
        .collect();
    collectors.sort_unstable();

    for collector in collectors {
        let sources: Vec<(Position, Money)> = board
            .iter()
            .filter(|(pos, cell)| {
                *pos != collector
                    && cell.locked
                    && cell.coin.is_some_and(|coin| {
                        coin.kind != CoinKind::Collector && coin.value.is_positive()
                    })
            })
            .map(|(pos, cell)| (pos, cell.value()))
            .collect();

        let total: Money = sources.iter().map(|(_, value)| *value).sum();
        if let Some(coin) = board.get_mut(collector).and_then(|c| c.coin.as_mut()) {
            coin.value = total;
        }
        effects.extend(sources.into_iter().map(|(from, amount)| SpecialEffect {
            from,
            to: collector,
            kind: EffectKind::Collect,
            amount,
        }));
    }
}

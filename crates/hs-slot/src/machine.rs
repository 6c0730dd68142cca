//! Slot machine session
//!
//! ## Round flow
//!
//! ```text
//! Idle ──spin──▶ Spinning (debit → generate) ──▶ PaylineWin | Idle
//!                          │ trigger
//!                          ▼
//!                   BonusTransition ──turn──▶ BonusActive ──turn──▶ … ──▶ BonusSettled
//! ```
//!
//! A triggering board goes straight to the bonus; its paylines are not
//! evaluated. `PaylineWin` and `BonusSettled` are terminal: they are
//! reported on the outcome, and the session itself is back to `Idle`.
//!
//! A session owns one account, one theme and one [`CellSource`]. The bet is
//! debited before any board exists; credits only happen from a resolved
//! payout and go through the [`Cashier`] so a ledger outage never loses them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bonus::{BonusRound, Settlement, TurnReport};
use crate::error::{EngineError, EngineResult};
use crate::grid::{generate, pin_scatters, Board, Cell, GridRequest};
use crate::ledger::{Account, Cashier, CreditStatus, Ledger, Transaction, TransactionKind};
use crate::money::Money;
use crate::paytable::{evaluate, WinEvaluation};
use crate::rng::{CellSource, DrawContext, RandomSource};
use crate::stats::SessionStats;
use crate::theme::{ThemeConfig, WinMode};

/// Where the session is between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoundState {
    /// Ready for a spin or a bonus buy
    Idle,
    /// Bet debited, board being generated
    Spinning,
    /// Base spin paid a line or scatter win
    PaylineWin,
    /// Bonus board built, no turn played yet
    BonusTransition,
    /// Bonus in progress; `turn` turns played
    BonusActive { turn: u32 },
    /// Bonus paid out
    BonusSettled,
}

impl RoundState {
    /// Final state of a round; the session is idle again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Idle | Self::PaylineWin | Self::BonusSettled)
    }
}

/// Result of one base spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub round_id: Uuid,
    pub bet: Money,
    pub board: Board,
    pub evaluation: WinEvaluation,
    /// A bonus round is now waiting to be played
    pub triggered: bool,
    /// `PaylineWin`, `Idle` (nothing paid) or `BonusTransition`
    pub state: RoundState,
    /// Status of the line win credit, if anything paid
    pub credit: Option<CreditStatus>,
}

/// Result of a bonus buy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOutcome {
    pub round_id: Uuid,
    pub bet: Money,
    pub cost: Money,
    /// Synthesized base board that met the trigger rule
    pub board: Board,
}

/// Result of one bonus turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusStep {
    pub report: TurnReport,
    /// Present on the turn the round settled
    pub settlement: Option<Settlement>,
    pub credit: Option<CreditStatus>,
    /// `BonusActive` or, on the settling turn, `BonusSettled`
    pub state: RoundState,
}

/// A bonus round played to the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSummary {
    /// Board the bonus started from
    pub start: Board,
    /// Turn budget when the first turn started
    pub start_turns: u8,
    pub turns: Vec<TurnReport>,
    pub settlement: Settlement,
    pub credit: Option<CreditStatus>,
}

/// One player's session on one theme
pub struct SlotMachine<S: CellSource = RandomSource> {
    theme: Arc<ThemeConfig>,
    ledger: Arc<dyn Ledger>,
    source: S,
    account: Account,
    state: RoundState,
    board: Board,
    bonus: Option<BonusRound>,
    round_id: Option<Uuid>,
    cashier: Cashier,
    stats: SessionStats,
}

impl SlotMachine<RandomSource> {
    /// Session drawing from an OS-seeded RNG
    pub fn new(theme: Arc<ThemeConfig>, ledger: Arc<dyn Ledger>, account: Account) -> Self {
        Self::with_source(theme, ledger, account, RandomSource::from_entropy())
    }
}

impl<S: CellSource> SlotMachine<S> {
    pub fn with_source(
        theme: Arc<ThemeConfig>,
        ledger: Arc<dyn Ledger>,
        account: Account,
        source: S,
    ) -> Self {
        let board = Board::filled(
            theme.grid.rows,
            theme.grid.cols,
            Cell::empty(theme.empty_symbol()),
        );
        Self {
            theme,
            ledger,
            source,
            account,
            state: RoundState::Idle,
            board,
            bonus: None,
            round_id: None,
            cashier: Cashier::new(),
            stats: SessionStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Board on screen: the bonus board while a bonus runs, else the base board
    pub fn board(&self) -> &Board {
        self.bonus.as_ref().map_or(&self.board, BonusRound::board)
    }

    pub fn bonus(&self) -> Option<&BonusRound> {
        self.bonus.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn balance(&self) -> EngineResult<Money> {
        Ok(self.ledger.balance(&self.account)?)
    }

    /// Credits waiting for the ledger to come back
    pub fn pending_credits(&self) -> usize {
        self.cashier.pending_count()
    }

    pub fn retry_pending_credits(&mut self) -> usize {
        self.cashier.retry_pending(self.ledger.as_ref())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BASE GAME
    // ═══════════════════════════════════════════════════════════════════════

    /// Play one base spin
    pub fn spin(&mut self, bet: Money) -> EngineResult<SpinOutcome> {
        self.ensure_idle()?;
        if !bet.is_positive() {
            return Err(EngineError::InvalidBet(bet));
        }
        let round_id = self.debit(bet, TransactionKind::Bet)?;
        self.state = RoundState::Spinning;
        self.stats.record_spin(bet);

        let req = GridRequest::base(&self.theme, bet);
        let mut board = generate(&req, &self.theme, &mut self.source, Some(&self.board));
        pin_scatters(&mut board, &self.theme);

        let triggered = self.theme.trigger.is_met(&board);
        let (evaluation, credit, state) = if triggered {
            self.stats.record_trigger();
            self.bonus = Some(BonusRound::trigger(&board, &self.theme, bet));
            self.state = RoundState::BonusTransition;
            (WinEvaluation::default(), None, RoundState::BonusTransition)
        } else {
            self.state = RoundState::Idle;
            let evaluation = evaluate(&board, bet, &self.theme);
            if evaluation.is_win() {
                if matches!(self.theme.win_mode, WinMode::Scatter { .. }) {
                    board.release_pins();
                }
                self.stats.record_win(evaluation.amount, bet);
                let credit = self.credit(round_id, TransactionKind::LineWin, evaluation.amount);
                (evaluation, Some(credit), RoundState::PaylineWin)
            } else {
                (evaluation, None, RoundState::Idle)
            }
        };

        log::debug!(
            "spin {} on {}: bet {}, win {}, triggered {}",
            round_id,
            self.theme.id,
            bet,
            evaluation.amount,
            triggered
        );

        self.board = board.clone();
        Ok(SpinOutcome {
            round_id,
            bet,
            board,
            evaluation,
            triggered,
            credit,
            state,
        })
    }

    /// Pay a multiple of the bet to start a bonus directly.
    ///
    /// Builds a base board, converts random non-coin cells into coins until
    /// the trigger rule holds, then triggers as if the board had landed.
    pub fn buy_bonus(&mut self, bet: Money) -> EngineResult<BuyOutcome> {
        self.ensure_idle()?;
        if !bet.is_positive() {
            return Err(EngineError::InvalidBet(bet));
        }
        let buy = self
            .theme
            .buy_bonus
            .ok_or_else(|| EngineError::BuyBonusUnavailable(self.theme.id.clone()))?;
        let cost = bet.scale(buy.cost_multiple);
        let round_id = self.debit(cost, TransactionKind::BonusBuy)?;
        self.stats.record_buy(cost);

        let req = GridRequest::base(&self.theme, bet);
        let mut board = generate(&req, &self.theme, &mut self.source, None);
        let ctx = DrawContext::base(bet);
        while !self.theme.trigger.is_met(&board) {
            let candidates = self.theme.trigger.conversion_candidates(&board);
            let Some(last) = candidates.len().checked_sub(1) else {
                break;
            };
            let pos = candidates[self.source.pick(candidates.len()).min(last)];
            let coin = self.source.coin(&self.theme, &ctx);
            board.set(pos, Cell::coin(self.theme.coin_symbol(), coin));
        }

        log::info!("bonus bought on {} for {} (round {})", self.theme.id, cost, round_id);
        self.bonus = Some(BonusRound::trigger(&board, &self.theme, bet));
        self.state = RoundState::BonusTransition;
        self.board = board.clone();
        Ok(BuyOutcome {
            round_id,
            bet,
            cost,
            board,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BONUS
    // ═══════════════════════════════════════════════════════════════════════

    /// Play one bonus turn; the settling turn credits the payout once
    pub fn play_bonus_turn(&mut self) -> EngineResult<BonusStep> {
        let (report, settlement) = {
            let bonus = self.bonus.as_mut().ok_or(EngineError::NoBonusActive)?;
            let report = bonus.play_turn(&self.theme, &mut self.source)?;
            (report, bonus.settle())
        };
        self.state = RoundState::BonusActive { turn: report.turn };
        let state = if settlement.is_some() {
            RoundState::BonusSettled
        } else {
            self.state
        };

        let credit = match settlement {
            Some(settlement) => {
                self.bonus = None;
                self.state = RoundState::Idle;
                self.stats.record_win(settlement.payout, settlement.bet);
                match self.round_id {
                    Some(round_id) if settlement.payout.is_positive() => {
                        Some(self.credit(round_id, TransactionKind::BonusWin, settlement.payout))
                    }
                    _ => None,
                }
            }
            None => None,
        };

        Ok(BonusStep {
            report,
            settlement,
            credit,
            state,
        })
    }

    /// Play the pending bonus to settlement
    pub fn run_bonus(&mut self) -> EngineResult<BonusSummary> {
        let (start, start_turns) = self
            .bonus
            .as_ref()
            .map(|b| (b.board().clone(), b.turns_left()))
            .ok_or(EngineError::NoBonusActive)?;
        let mut turns = Vec::new();
        loop {
            let step = self.play_bonus_turn()?;
            turns.push(step.report);
            if let Some(settlement) = step.settlement {
                return Ok(BonusSummary {
                    start,
                    start_turns,
                    turns,
                    settlement,
                    credit: step.credit,
                });
            }
        }
    }

    /// Drop an unfinished bonus without crediting anything
    pub fn abandon(&mut self) -> bool {
        match self.bonus.take() {
            Some(bonus) => {
                log::info!(
                    "bonus abandoned after {} turns (running total {})",
                    bonus.turns_played(),
                    bonus.running_total()
                );
                self.state = RoundState::Idle;
                true
            }
            None => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LEDGER
    // ═══════════════════════════════════════════════════════════════════════

    fn ensure_idle(&self) -> EngineResult<()> {
        match self.state {
            RoundState::Idle => Ok(()),
            state => Err(EngineError::RoundInProgress(state)),
        }
    }

    /// Check the balance and post the debit; nothing else changes on failure
    fn debit(&mut self, amount: Money, kind: TransactionKind) -> EngineResult<Uuid> {
        let balance = self.ledger.balance(&self.account)?;
        if balance < amount {
            return Err(EngineError::InsufficientBalance {
                balance,
                required: amount,
            });
        }
        let round_id = Uuid::new_v4();
        let tx = Transaction::for_round(round_id, &self.account, kind, amount);
        if let Err(err) = self.ledger.post(&tx) {
            log::warn!("debit of {} for {} failed: {}", amount, self.account, err);
            return Err(err.into());
        }
        self.round_id = Some(round_id);
        log::info!("round {} started: {} {}", round_id, kind.as_str(), amount);
        Ok(round_id)
    }

    fn credit(&mut self, round_id: Uuid, kind: TransactionKind, amount: Money) -> CreditStatus {
        let tx = Transaction::for_round(round_id, &self.account, kind, amount);
        self.cashier.credit(self.ledger.as_ref(), tx)
    }
}

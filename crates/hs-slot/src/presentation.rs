//! Presentation timeline
//!
//! Turns resolved outcomes into timestamped [`hs_stage`] events. Everything
//! is already settled by the time the presenter runs; timing only decides
//! when the host shows it.

use hs_stage::{CellRef, CoinStyle, Stage, StageEvent, StageTrace};
use uuid::Uuid;

use crate::bonus::{LandedCoin, SpecialEffect, TurnReport};
use crate::grid::{Board, CoinKind, Position};
use crate::ledger::CreditStatus;
use crate::machine::{BonusSummary, BuyOutcome, SpinOutcome};
use crate::money::Money;
use crate::paytable::WinEvaluation;
use crate::timing::{TimestampGenerator, TimingConfig};

/// Builds stage traces for finished rounds
#[derive(Debug, Clone, Default)]
pub struct Presenter {
    timing: TimingConfig,
    /// Wall-clock cap for one round's display
    budget_ms: Option<f64>,
}

/// Line win part of a round
struct LineResult<'a> {
    evaluation: &'a WinEvaluation,
    credit: Option<CreditStatus>,
}

impl Presenter {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            budget_ms: None,
        }
    }

    /// Compress display timing so a round fits in `budget_ms`
    pub fn with_budget(mut self, budget_ms: f64) -> Self {
        self.budget_ms = Some(budget_ms);
        self
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Trace for a base spin, followed by its bonus when one triggered
    pub fn spin_trace(
        &self,
        game_id: &str,
        outcome: &SpinOutcome,
        bonus: Option<&BonusSummary>,
    ) -> StageTrace {
        let line = LineResult {
            evaluation: &outcome.evaluation,
            credit: outcome.credit,
        };
        self.build(game_id, outcome.round_id, outcome.bet, &outcome.board, Some(line), bonus)
            .with_metadata("kind", serde_json::Value::from("spin"))
    }

    /// Trace for a bought bonus
    pub fn buy_trace(&self, game_id: &str, buy: &BuyOutcome, bonus: &BonusSummary) -> StageTrace {
        self.build(game_id, buy.round_id, buy.cost, &buy.board, None, Some(bonus))
            .with_metadata("kind", serde_json::Value::from("bonus_buy"))
    }

    /// Timing for one round, compressed to the budget when one is set
    pub fn timing_for(&self, reels: u8, bonus_turns: Option<u32>) -> TimingConfig {
        let Some(budget) = self.budget_ms else {
            return self.timing.clone();
        };
        let mut estimate = self.timing.total_spin_duration(reels) + self.timing.win_display_ms;
        if let Some(turns) = bonus_turns {
            estimate += self.timing.bonus_duration(turns);
        }
        self.timing.within_budget(estimate, budget)
    }

    fn build(
        &self,
        game_id: &str,
        round_id: Uuid,
        stake: Money,
        board: &Board,
        line: Option<LineResult<'_>>,
        bonus: Option<&BonusSummary>,
    ) -> StageTrace {
        let timing = self.timing_for(board.cols(), bonus.map(|b| b.turns.len() as u32));
        let mut ts = TimestampGenerator::new(timing);
        let mut trace =
            StageTrace::new(format!("trace-{}", round_id), game_id).with_round(round_id.to_string());

        trace.push(StageEvent::new(
            Stage::SpinStart {
                bet: stake.to_major(),
            },
            ts.current(),
        ));
        for col in 0..board.cols() {
            trace.push(StageEvent::new(
                Stage::ReelStop {
                    reel_index: col,
                    symbols: board.column_symbols(col),
                },
                ts.reel_stop(col),
            ));
        }
        trace.push(StageEvent::new(Stage::EvaluateWins, ts.advance(0.0)));

        if let Some(line) = line.filter(|l| l.evaluation.is_win()) {
            let amount = line.evaluation.amount;
            trace.push(StageEvent::new(
                Stage::WinPresent {
                    win_amount: amount.to_major(),
                    cells: line.evaluation.cells.iter().map(|&p| cell_ref(p)).collect(),
                },
                ts.win_present(),
            ));
            if line.credit == Some(CreditStatus::Queued) {
                trace.push(credit_queued(amount, &mut ts));
            }
        }

        if let Some(summary) = bonus {
            trace.push(StageEvent::new(
                Stage::BonusTrigger {
                    coin_count: board.coin_count() as u16,
                },
                ts.bonus_trigger(),
            ));
            trace.push(StageEvent::new(
                Stage::BonusEnter {
                    rows: summary.start.rows(),
                    cols: summary.start.cols(),
                    turns: summary.start_turns,
                    total: summary.start.locked_total().to_major(),
                },
                ts.bonus_enter(),
            ));

            let mut turns_left = summary.start_turns;
            for turn in &summary.turns {
                push_turn(&mut trace, turn, turns_left, &mut ts);
                turns_left = turn.turns_left;
            }

            let settlement = summary.settlement;
            trace.push(StageEvent::new(
                Stage::BonusExit {
                    payout: settlement.payout.to_major(),
                    turns_played: settlement.turns_played,
                    reason: settlement.reason,
                },
                ts.payout(),
            ));
            if summary.credit == Some(CreditStatus::Queued) {
                trace.push(credit_queued(settlement.payout, &mut ts));
            }
        }

        trace.push(StageEvent::new(Stage::SpinEnd, ts.advance(0.0)));
        trace
    }
}

fn cell_ref(pos: Position) -> CellRef {
    CellRef::new(pos.row, pos.col)
}

fn credit_queued(amount: Money, ts: &mut TimestampGenerator) -> StageEvent {
    StageEvent::new(
        Stage::CreditQueued {
            amount: amount.to_major(),
        },
        ts.advance(0.0),
    )
    .with_tag("ledger_retry")
}

fn coin_land(landed: &LandedCoin) -> Stage {
    let (style, factor) = match landed.coin.kind {
        CoinKind::Standard => (CoinStyle::Standard, None),
        CoinKind::Multiplier { factor } => (CoinStyle::Multiplier, Some(factor)),
        CoinKind::Collector => (CoinStyle::Collector, None),
    };
    Stage::CoinLand {
        cell: cell_ref(landed.position),
        value: landed.coin.value.to_major(),
        style,
        factor,
    }
}

fn transfer(effect: &SpecialEffect) -> Stage {
    Stage::SpecialTransfer {
        from: cell_ref(effect.from),
        to: cell_ref(effect.to),
        kind: effect.kind.transfer_kind(),
        amount: effect.amount.to_major(),
    }
}

/// Spin, landings, transfers and running total of one bonus turn
fn push_turn(trace: &mut StageTrace, turn: &TurnReport, turns_left: u8, ts: &mut TimestampGenerator) {
    trace.push(StageEvent::new(
        Stage::BonusSpinStart {
            turn: turn.turn,
            turns_left,
        },
        ts.bonus_spin(),
    ));

    let landing = ts.landing();
    for special in &turn.specials {
        trace.push(StageEvent::new(
            Stage::BoardSpecialLand {
                cell: cell_ref(special.position),
                special: special.kind.as_str().to_string(),
            },
            landing,
        ));
    }
    for landed in &turn.landed {
        trace.push(StageEvent::new(coin_land(landed), landing));
    }
    for effect in &turn.effects {
        trace.push(StageEvent::new(transfer(effect), ts.advance(0.0)));
    }
    trace.push(StageEvent::new(
        Stage::BonusTotal {
            total: turn.running_total.to_major(),
            turns_left: turn.turns_left,
        },
        ts.advance(0.0),
    ));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::grid::{Cell, Coin};
    use crate::ledger::{Account, Currency, InMemoryLedger, Ledger};
    use crate::machine::SlotMachine;
    use crate::scenario::ScriptedSource;
    use crate::symbols::SymbolKind;
    use crate::theme::durov;

    fn triggered_machine(ledger: Arc<InMemoryLedger>) -> SlotMachine<ScriptedSource> {
        let theme = durov();
        let coin = Cell::coin(theme.coin_symbol(), Coin::standard(Money::from_minor(100)));
        let multiplier = Cell::coin(
            theme.coin_symbol(),
            Coin::new(Money::from_minor(100), CoinKind::Multiplier { factor: 2 }),
        );
        // base: five coins in columns 0-1 then filler; first bonus turn lands
        // a multiplier at (0,2)
        let source = ScriptedSource::new()
            .with_cells(vec![coin; 5])
            .with_cells(vec![Cell::new(3, SymbolKind::Regular); 15])
            .with_cells(vec![Cell::empty(theme.empty_symbol()); 3])
            .with_cell(multiplier);
        let account = Account::new("p", Currency::Stars);
        ledger.deposit(&account, Money::from_major(10.0));
        SlotMachine::with_source(Arc::new(theme), ledger, account, source)
    }

    #[test]
    fn test_spin_with_bonus_trace() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut machine = triggered_machine(ledger);
        let outcome = machine.spin(Money::from_major(1.0)).unwrap();
        let summary = machine.run_bonus().unwrap();

        let trace = Presenter::new(TimingConfig::normal()).spin_trace("durov", &outcome, Some(&summary));
        let validation = trace.validate();
        assert!(validation.is_valid(), "{:?}", validation.warnings());
        assert_eq!(validation.reel_stop_count, 5);
        assert!(trace.has_bonus());
        assert_eq!(trace.events_by_type("special_transfer").len(), 1);
        assert_eq!(trace.events_by_type("bonus_spin_start").len(), summary.turns.len());
        assert_eq!(trace.total_win(), summary.settlement.payout.to_major());

        let coin_lands = trace.events_by_type("coin_land");
        assert!(matches!(
            coin_lands[0].stage,
            Stage::CoinLand {
                style: CoinStyle::Multiplier,
                factor: Some(2),
                value,
                ..
            } if value == 0.0
        ));
    }

    #[test]
    fn test_reel_cadence() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut machine = triggered_machine(ledger);
        let outcome = machine.spin(Money::from_major(1.0)).unwrap();
        machine.abandon();

        let trace = Presenter::new(TimingConfig::normal()).spin_trace("durov", &outcome, None);
        let stops: Vec<f64> = trace
            .events_by_type("reel_stop")
            .iter()
            .map(|e| e.timestamp_ms)
            .collect();
        assert_eq!(stops, vec![1500.0, 1800.0, 2100.0, 2400.0, 2700.0]);
    }

    #[test]
    fn test_budget_compresses_display_only() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut machine = triggered_machine(ledger);
        let outcome = machine.spin(Money::from_major(1.0)).unwrap();
        let summary = machine.run_bonus().unwrap();

        let full = Presenter::new(TimingConfig::normal()).spin_trace("durov", &outcome, Some(&summary));
        let capped = Presenter::new(TimingConfig::normal())
            .with_budget(5_000.0)
            .spin_trace("durov", &outcome, Some(&summary));

        assert!(capped.duration_ms() < full.duration_ms());
        assert_eq!(capped.events.len(), full.events.len());
        assert_eq!(capped.total_win(), full.total_win());
    }

    #[test]
    fn test_queued_credit_is_shown() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut machine = triggered_machine(ledger.clone());
        let outcome = machine.spin(Money::from_major(1.0)).unwrap();
        ledger.set_available(false);
        let summary = machine.run_bonus().unwrap();
        assert_eq!(summary.credit, Some(CreditStatus::Queued));

        let trace = Presenter::default().spin_trace("durov", &outcome, Some(&summary));
        let queued = trace.events_by_type("credit_queued");
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].tags, vec!["ledger_retry".to_string()]);

        ledger.set_available(true);
        assert_eq!(machine.retry_pending_credits(), 1);
        assert!(ledger.balance(machine.account()).unwrap().is_positive());
    }
}

//! Bonus round scenarios
//!
//! Scripted rounds with exact expected totals, plus seeded random rounds
//! checked for conservation:
//! - payout equals the locked coin sum of the final board
//! - locked coins never lose value or unlock
//! - the turn budget never exceeds its initial value

use std::sync::Arc;

use hs_slot::{
    Account, Board, BonusEndReason, BonusRound, BonusSummary, Cell, Coin, CoinKind, CreditStatus,
    Currency, EffectKind, InMemoryLedger, LandedCoin, Money, Position, RandomSource, RoundState,
    ScriptedSource, SlotMachine, SpecialEffect, SymbolId, ThemeConfig, coin_up, durov, flour,
};

const SHIELD: SymbolId = 3;
const BOT: SymbolId = 4;
const STAR: SymbolId = 5;
const GIFT: SymbolId = 6;
const HASH: SymbolId = 8;
const NUM: SymbolId = 9;
const COIN: SymbolId = 11;
const EMPTY: SymbolId = 12;

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

fn sym(theme: &ThemeConfig, id: SymbolId) -> Cell {
    Cell::new(id, theme.symbols.kind_of(id))
}

fn coin(major: f64) -> Cell {
    Cell::coin(COIN, Coin::standard(Money::from_major(major)))
}

/// Durov base board with coins worth 1, 3, 5, 10 down column 0 and 12 at (0,1)
fn reference_board(theme: &ThemeConfig) -> Vec<Vec<Cell>> {
    vec![
        vec![coin(1.0), coin(12.0), sym(theme, HASH), sym(theme, NUM), sym(theme, SHIELD)],
        vec![coin(3.0), sym(theme, BOT), sym(theme, STAR), sym(theme, GIFT), sym(theme, HASH)],
        vec![coin(5.0), sym(theme, NUM), sym(theme, SHIELD), sym(theme, BOT), sym(theme, STAR)],
        vec![coin(10.0), sym(theme, GIFT), sym(theme, HASH), sym(theme, NUM), sym(theme, SHIELD)],
    ]
}

fn session<S: hs_slot::CellSource>(
    theme: ThemeConfig,
    balance: Money,
    source: S,
) -> (SlotMachine<S>, Arc<InMemoryLedger>) {
    let account = Account::new("player", Currency::Stars);
    let ledger = Arc::new(InMemoryLedger::with_balance(&account, balance));
    let machine = SlotMachine::with_source(Arc::new(theme), ledger.clone(), account, source);
    (machine, ledger)
}

/// Check every turn of a finished bonus against the previous board
fn assert_conserved(summary: &BonusSummary, initial_turns: u8) {
    let mut previous: &Board = &summary.start;
    for report in &summary.turns {
        assert_eq!(report.running_total, report.board.locked_total());
        assert!(report.turns_left <= initial_turns);

        for (pos, cell) in previous.iter().filter(|(_, c)| c.locked && c.is_coin()) {
            let now = report.board.get(pos).unwrap();
            assert!(now.locked && now.is_coin(), "coin at {:?} unlocked", pos);
            assert!(now.value() >= cell.value(), "coin at {:?} lost value", pos);
        }
        previous = &report.board;
    }

    let last = summary.turns.last().unwrap();
    assert_eq!(summary.settlement.payout, last.board.locked_total());
    assert_eq!(summary.settlement.turns_played as usize, summary.turns.len());
    match summary.settlement.reason {
        BonusEndReason::BoardFull => assert!(last.board.is_full()),
        BonusEndReason::OutOfTurns => assert_eq!(last.turns_left, 0),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCRIPTED ROUNDS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reference_round_end_to_end() {
    let theme = durov();
    let multiplier = Cell::coin(
        COIN,
        Coin::new(Money::from_major(2.0), CoinKind::Multiplier { factor: 2 }),
    );
    // turn 1 lands nothing; turn 2 lands a 2x multiplier at (1,1) aimed at
    // the 12 (index 1 of the row-major candidates)
    let source = ScriptedSource::new()
        .with_board(&reference_board(&theme))
        .with_cells(vec![Cell::empty(EMPTY); 15])
        .with_cell(multiplier)
        .with_pick(1);
    let (mut m, _) = session(theme, Money::from_major(100.0), source);

    let outcome = m.spin(Money::from_major(10.0)).unwrap();
    assert!(outcome.triggered);
    assert!(!outcome.evaluation.is_win());
    assert_eq!(m.bonus().unwrap().running_total(), Money::from_major(31.0));
    assert_eq!(m.bonus().unwrap().trigger_coins(), 5);

    let first = m.play_bonus_turn().unwrap();
    assert_eq!(first.report.running_total, Money::from_major(31.0));
    assert_eq!(first.report.turns_left, 2);
    assert!(!first.report.new_lock);
    assert!(first.report.landed.is_empty());
    assert_eq!(m.state(), RoundState::BonusActive { turn: 1 });

    let second = m.play_bonus_turn().unwrap();
    assert_eq!(
        second.report.landed,
        vec![LandedCoin {
            position: Position::new(1, 1),
            coin: Coin::new(Money::ZERO, CoinKind::Multiplier { factor: 2 }),
        }]
    );
    assert_eq!(
        second.report.effects,
        vec![SpecialEffect {
            from: Position::new(1, 1),
            to: Position::new(0, 1),
            kind: EffectKind::Multiply { factor: 2 },
            amount: Money::from_major(12.0),
        }]
    );
    assert_eq!(second.report.running_total, Money::from_major(43.0));
    assert_eq!(second.report.turns_left, 3);
    assert!(second.report.new_lock);
    assert_eq!(
        second.report.board.get(Position::new(1, 1)).map(|c| c.kind),
        Some(hs_slot::SymbolKind::Empty)
    );

    let summary = m.run_bonus().unwrap();
    assert_eq!(summary.turns.len(), 3);
    assert_eq!(summary.settlement.payout, Money::from_major(43.0));
    assert_eq!(summary.settlement.reason, BonusEndReason::OutOfTurns);
    assert_eq!(summary.settlement.turns_played, 5);
    assert_eq!(summary.credit, Some(CreditStatus::Applied));
    assert_eq!(m.state(), RoundState::Idle);
    assert_eq!(m.balance().unwrap(), Money::from_major(100.0 - 10.0 + 43.0));
}

#[test]
fn test_two_multipliers_boost_distinct_coins() {
    let theme = durov();
    let mut base = Board::filled(4, 5, Cell::empty(EMPTY));
    base.set(Position::new(0, 0), Cell::coin(COIN, Coin::standard(Money::from_minor(100))));
    base.set(Position::new(0, 1), Cell::coin(COIN, Coin::standard(Money::from_minor(200))));
    let mut round = BonusRound::trigger(&base, &theme, Money::from_major(1.0));

    let mult = |factor| Cell::coin(COIN, Coin::new(Money::from_minor(100), CoinKind::Multiplier { factor }));
    // both land in column 0 below the first coin; both picks take index 0
    let mut source = ScriptedSource::new()
        .with_cell(mult(2))
        .with_cell(mult(3))
        .with_pick(0)
        .with_pick(0);

    let report = round.play_turn(&theme, &mut source).unwrap();
    let targets: Vec<Position> = report.effects.iter().map(|e| e.to).collect();
    assert_eq!(targets, vec![Position::new(0, 0), Position::new(0, 1)]);
    assert_eq!(report.running_total, Money::from_minor(200 + 600));
    assert_eq!(report.board.locked_coins().len(), 2);
    assert!(report.board.get(Position::new(0, 0)).and_then(|c| c.coin).unwrap().boosted);
}

#[test]
fn test_lock_resets_budget_after_empty_turns() {
    let theme = durov();
    let mut base = Board::filled(4, 5, Cell::empty(EMPTY));
    base.set(Position::new(3, 4), Cell::coin(COIN, Coin::standard(Money::from_minor(50))));
    let mut round = BonusRound::trigger(&base, &theme, Money::from_major(1.0));

    // two empty turns consume 19 draws each, then a coin lands at (0,0)
    let mut source = ScriptedSource::new()
        .with_cells(vec![Cell::empty(EMPTY); 38])
        .with_cell(Cell::coin(COIN, Coin::standard(Money::from_minor(70))));

    assert_eq!(round.play_turn(&theme, &mut source).unwrap().turns_left, 2);
    assert_eq!(round.play_turn(&theme, &mut source).unwrap().turns_left, 1);
    let third = round.play_turn(&theme, &mut source).unwrap();
    assert!(third.new_lock);
    assert_eq!(third.turns_left, 3);
    assert_eq!(third.running_total, Money::from_minor(120));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEEDED ROUNDS
// ═══════════════════════════════════════════════════════════════════════════════

fn bought_rounds_conserve(theme: ThemeConfig, seed: u64, rounds: usize) {
    let initial_turns = theme.initial_turns;
    let start = Money::from_major(1_000_000.0);
    let (mut m, _) = session(theme, start, RandomSource::seeded(seed));
    let bet = Money::from_major(1.0);

    for _ in 0..rounds {
        m.buy_bonus(bet).unwrap();
        let summary = m.run_bonus().unwrap();
        assert_conserved(&summary, initial_turns);
        if summary.settlement.payout.is_positive() {
            assert_eq!(summary.credit, Some(CreditStatus::Applied));
        }
    }

    let stats = m.stats().clone();
    assert_eq!(stats.bonuses_bought, rounds as u64);
    assert_eq!(m.balance().unwrap(), start - stats.total_bet + stats.total_win);
}

#[test]
fn test_conservation_durov() {
    bought_rounds_conserve(durov(), 17, 40);
}

#[test]
fn test_conservation_flour() {
    bought_rounds_conserve(flour(), 23, 40);
}

#[test]
fn test_conservation_coin_up() {
    bought_rounds_conserve(coin_up(), 5, 40);
}

#[test]
fn test_coin_up_bonus_enters_on_lower_rows() {
    let (mut m, _) = session(coin_up(), Money::from_major(1_000.0), RandomSource::seeded(9));
    let buy = m.buy_bonus(Money::from_major(1.0)).unwrap();
    assert!(buy.board.row(1).iter().all(Cell::is_coin));

    let bonus = m.bonus().unwrap();
    assert_eq!((bonus.board().rows(), bonus.board().cols()), (4, 3));
    assert!(bonus.board().row(0).iter().all(|c| !c.is_coin()));
    assert!(bonus.board().row(2).iter().all(|c| c.locked && c.is_coin()));
    assert_eq!(bonus.trigger_coins(), buy.board.coin_count());
}

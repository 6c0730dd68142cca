//! Parallel round runner

use std::sync::Arc;

use hs_slot::{
    Account, BonusSummary, CellSource, Currency, InMemoryLedger, Money, RandomSource, SlotMachine,
    ThemeConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::report::{ChunkStats, SimReport};
use crate::{SimError, SimResult};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub rounds: u64,
    pub bet: Money,
    pub seed: u64,
    /// Start every round with a bonus buy instead of a spin
    pub buy_bonus: bool,
    /// Rounds per independent session
    pub chunk_size: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rounds: 100_000,
            bet: Money::from_major(1.0),
            seed: 0,
            buy_bonus: false,
            chunk_size: 10_000,
        }
    }
}

impl SimConfig {
    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_bet(mut self, bet: Money) -> Self {
        self.bet = bet;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_buy_bonus(mut self, buy_bonus: bool) -> Self {
        self.buy_bonus = buy_bonus;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    fn validate(&self, theme: &ThemeConfig) -> SimResult<()> {
        if self.rounds == 0 {
            return Err(SimError::InvalidConfig("rounds must be positive".into()));
        }
        if self.chunk_size == 0 {
            return Err(SimError::InvalidConfig("chunk size must be positive".into()));
        }
        if !self.bet.is_positive() {
            return Err(SimError::InvalidConfig(format!("bet {} must be positive", self.bet)));
        }
        if self.buy_bonus && theme.buy_bonus.is_none() {
            return Err(SimError::InvalidConfig(format!(
                "theme '{}' has no bonus buy",
                theme.id
            )));
        }
        Ok(())
    }

    /// Amount debited at the start of each round
    fn stake(&self, theme: &ThemeConfig) -> Money {
        match theme.buy_bonus {
            Some(buy) if self.buy_bonus => self.bet.scale(buy.cost_multiple),
            _ => self.bet,
        }
    }
}

/// Run `config.rounds` rounds of `theme` across the rayon pool
pub fn simulate(theme: Arc<ThemeConfig>, config: &SimConfig) -> SimResult<SimReport> {
    config.validate(&theme)?;
    let chunks = config.rounds.div_ceil(config.chunk_size);
    log::info!(
        "simulating {} rounds of '{}' in {} chunks (seed {})",
        config.rounds,
        theme.id,
        chunks,
        config.seed
    );

    let results: Vec<ChunkStats> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * config.chunk_size;
            let rounds = config.chunk_size.min(config.rounds - start);
            run_chunk(&theme, config, chunk, rounds)
        })
        .collect::<SimResult<_>>()?;

    let mut total = ChunkStats::default();
    for stats in &results {
        total.merge(stats);
    }

    let report = SimReport::from_stats(theme.id.clone(), config.buy_bonus, &total);
    if report.is_conserved() {
        log::info!("'{}' done: RTP {:.2}%", theme.id, report.rtp);
    } else {
        log::error!(
            "'{}' done with {} conservation violations",
            theme.id,
            report.conservation_violations
        );
    }
    Ok(report)
}

/// One independent session of `rounds` rounds
fn run_chunk(theme: &Arc<ThemeConfig>, config: &SimConfig, chunk: u64, rounds: u64) -> SimResult<ChunkStats> {
    let stake = config.stake(theme);
    let deposit = Money::from_minor(stake.minor().saturating_mul(rounds as i64));
    let account = Account::new(format!("sim-{chunk}"), Currency::Stars);
    let ledger = Arc::new(InMemoryLedger::with_balance(&account, deposit));
    let source = RandomSource::new(ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(chunk)));
    let mut machine = SlotMachine::with_source(theme.clone(), ledger, account, source);

    let mut stats = ChunkStats::default();
    for _ in 0..rounds {
        let (line_win, bonus) = play_round(&mut machine, config)?;
        let bonus_payout = match &bonus {
            Some(summary) => {
                if !conserved(summary) {
                    stats.conservation_violations += 1;
                }
                stats.record_bonus(summary.settlement.payout);
                summary.settlement.payout
            }
            None => Money::ZERO,
        };
        stats.record_round(stake, config.bet, line_win + bonus_payout);
    }

    // Every debit and credit must have reached the ledger
    let expected = deposit - stats.total_bet + stats.total_win;
    let balance = machine.balance()?;
    if balance != expected || machine.pending_credits() > 0 {
        log::warn!("chunk {}: balance {} but expected {}", chunk, balance, expected);
        stats.conservation_violations += 1;
    }

    log::debug!(
        "chunk {} finished: {} rounds, win {}",
        chunk,
        stats.rounds,
        stats.total_win
    );
    Ok(stats)
}

/// Spin (or buy), then play any triggered bonus to the end
fn play_round<S: CellSource>(
    machine: &mut SlotMachine<S>,
    config: &SimConfig,
) -> SimResult<(Money, Option<BonusSummary>)> {
    let line_win = if config.buy_bonus {
        machine.buy_bonus(config.bet)?;
        Money::ZERO
    } else {
        let outcome = machine.spin(config.bet)?;
        if !outcome.triggered {
            return Ok((outcome.evaluation.amount, None));
        }
        outcome.evaluation.amount
    };
    let summary = machine.run_bonus()?;
    Ok((line_win, Some(summary)))
}

/// The payout equals the final locked coin sum
fn conserved(summary: &BonusSummary) -> bool {
    let final_board = summary.turns.last().map_or(&summary.start, |t| &t.board);
    summary.settlement.payout == final_board.locked_total()
}

//! Per-session counters

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    /// Stakes debited, bonus buys included
    pub total_bet: Money,
    pub total_win: Money,
    /// Paying outcomes; a line win and a bonus payout count separately
    pub hits: u64,
    pub bonuses_triggered: u64,
    pub bonuses_bought: u64,
    pub max_win: Money,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Return to player, percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet.is_positive() {
            self.total_win.ratio_to(self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Share of spins that paid, percent
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.hits as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn record_spin(&mut self, bet: Money) {
        self.spins += 1;
        self.total_bet += bet;
    }

    pub fn record_buy(&mut self, cost: Money) {
        self.bonuses_bought += 1;
        self.total_bet += cost;
    }

    pub fn record_trigger(&mut self) {
        self.bonuses_triggered += 1;
    }

    /// Count a paying outcome against the stake it came from
    pub fn record_win(&mut self, win: Money, bet: Money) {
        if !win.is_positive() {
            return;
        }
        self.hits += 1;
        self.total_win += win;
        if win > self.max_win {
            self.max_win = win;
        }
        if bet.is_positive() {
            self.max_win_ratio = self.max_win_ratio.max(win.ratio_to(bet));
        }
    }
}

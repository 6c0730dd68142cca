//! Simulation report

use hs_slot::Money;
use serde::{Deserialize, Serialize};

/// Counters gathered by one chunk of rounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkStats {
    pub rounds: u64,
    pub total_bet: Money,
    pub total_win: Money,
    /// Rounds whose combined line win and bonus payout was positive
    pub paying_rounds: u64,
    pub bonus_count: u64,
    pub bonus_payout: Money,
    /// Largest single round win
    pub max_win: Money,
    pub max_win_ratio: f64,
    pub conservation_violations: u64,
}

impl ChunkStats {
    /// Record one finished round
    pub fn record_round(&mut self, stake: Money, bet: Money, win: Money) {
        self.rounds += 1;
        self.total_bet += stake;
        self.total_win += win;
        if win.is_positive() {
            self.paying_rounds += 1;
        }
        if win > self.max_win {
            self.max_win = win;
        }
        if bet.is_positive() {
            self.max_win_ratio = self.max_win_ratio.max(win.ratio_to(bet));
        }
    }

    pub fn record_bonus(&mut self, payout: Money) {
        self.bonus_count += 1;
        self.bonus_payout += payout;
    }

    pub fn merge(&mut self, other: &ChunkStats) {
        self.rounds += other.rounds;
        self.total_bet += other.total_bet;
        self.total_win += other.total_win;
        self.paying_rounds += other.paying_rounds;
        self.bonus_count += other.bonus_count;
        self.bonus_payout += other.bonus_payout;
        self.max_win = self.max_win.max(other.max_win);
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
        self.conservation_violations += other.conservation_violations;
    }
}

/// Aggregate results for one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub theme_id: String,
    pub rounds: u64,
    pub bought: bool,
    pub total_bet: Money,
    pub total_win: Money,
    /// Return to player, percent
    pub rtp: f64,
    /// Paying rounds, percent
    pub hit_rate: f64,
    /// Bonuses per round
    pub bonus_frequency: f64,
    pub bonus_count: u64,
    pub mean_bonus_payout: Money,
    pub max_win: Money,
    /// Largest round win as a multiple of the bet
    pub max_win_ratio: f64,
    /// Rounds where the settled payout or the ledger balance disagreed
    /// with the board; always zero for a correct engine
    pub conservation_violations: u64,
}

impl SimReport {
    pub fn from_stats(theme_id: impl Into<String>, bought: bool, stats: &ChunkStats) -> Self {
        let per_round = |n: u64| {
            if stats.rounds > 0 {
                n as f64 / stats.rounds as f64
            } else {
                0.0
            }
        };
        let rtp = if stats.total_bet.is_positive() {
            stats.total_win.ratio_to(stats.total_bet) * 100.0
        } else {
            0.0
        };
        let mean_bonus_payout = if stats.bonus_count > 0 {
            Money::from_minor(stats.bonus_payout.minor() / stats.bonus_count as i64)
        } else {
            Money::ZERO
        };

        Self {
            theme_id: theme_id.into(),
            rounds: stats.rounds,
            bought,
            total_bet: stats.total_bet,
            total_win: stats.total_win,
            rtp,
            hit_rate: per_round(stats.paying_rounds) * 100.0,
            bonus_frequency: per_round(stats.bonus_count),
            bonus_count: stats.bonus_count,
            mean_bonus_payout,
            max_win: stats.max_win,
            max_win_ratio: stats.max_win_ratio,
            conservation_violations: stats.conservation_violations,
        }
    }

    /// Conservation held for every round
    pub fn is_conserved(&self) -> bool {
        self.conservation_violations == 0
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Theme '{}': {} {}\n",
            self.theme_id,
            self.rounds,
            if self.bought { "bought bonuses" } else { "spins" }
        );
        s.push_str(&format!("  Bet: {}  Win: {}\n", self.total_bet, self.total_win));
        s.push_str(&format!("  RTP: {:.2}%  Hit rate: {:.2}%\n", self.rtp, self.hit_rate));
        if self.bonus_count > 0 {
            s.push_str(&format!(
                "  Bonuses: {} (1 in {:.1}), mean payout {}\n",
                self.bonus_count,
                1.0 / self.bonus_frequency,
                self.mean_bonus_payout
            ));
        }
        s.push_str(&format!("  Max win: {} ({:.1}x)\n", self.max_win, self.max_win_ratio));
        if !self.is_conserved() {
            s.push_str(&format!(
                "  CONSERVATION VIOLATIONS: {}\n",
                self.conservation_violations
            ));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_merge_and_report() {
        let bet = Money::from_major(1.0);
        let mut a = ChunkStats::default();
        a.record_round(bet, bet, Money::ZERO);
        a.record_round(bet, bet, Money::from_major(3.0));
        let mut b = ChunkStats::default();
        b.record_round(bet, bet, Money::from_major(1.0));
        b.record_bonus(Money::from_major(1.0));
        b.record_round(bet, bet, Money::ZERO);
        a.merge(&b);

        let report = SimReport::from_stats("durov", false, &a);
        assert_eq!(report.rounds, 4);
        assert_relative_eq!(report.rtp, 100.0);
        assert_relative_eq!(report.hit_rate, 50.0);
        assert_relative_eq!(report.bonus_frequency, 0.25);
        assert_eq!(report.mean_bonus_payout, Money::from_major(1.0));
        assert_eq!(report.max_win, Money::from_major(3.0));
        assert!(report.is_conserved());
        assert!(report.summary().contains("RTP: 100.00%"));
    }

    #[test]
    fn test_empty_report() {
        let report = SimReport::from_stats("gems", false, &ChunkStats::default());
        assert_eq!(report.rtp, 0.0);
        assert_eq!(report.hit_rate, 0.0);
        assert_eq!(report.mean_bonus_payout, Money::ZERO);
    }
}

//! Stage - The core enum defining all canonical round phases
//!
//! A Stage is NOT an animation, NOT an engine event.
//! A Stage is the SEMANTIC MEANING of a moment in the round flow.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{BonusEndReason, CellRef, CoinStyle, TransferKind};

/// Canonical round stage
///
/// Amounts are carried in major currency units (e.g. `12.5` TON) because the
/// renderer only ever displays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Bet accepted, reels start
    SpinStart {
        /// Bet debited for this round
        bet: f64,
    },

    /// Reel has stopped, showing final symbols
    ReelStop {
        /// Which reel stopped (0-indexed)
        reel_index: u8,
        /// Symbol ids on this reel (top to bottom)
        #[serde(default)]
        symbols: Vec<u32>,
    },

    /// All reels stopped, wins being evaluated
    EvaluateWins,

    /// Round complete, ready for next spin
    SpinEnd,

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Base-game win presentation
    WinPresent {
        win_amount: f64,
        /// Cells to highlight
        #[serde(default)]
        cells: Vec<CellRef>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // HOLD & WIN
    // ═══════════════════════════════════════════════════════════════════════
    /// Trigger condition met on the base board
    BonusTrigger { coin_count: u16 },

    /// Bonus board shown, coins locked
    BonusEnter {
        rows: u8,
        cols: u8,
        turns: u8,
        total: f64,
    },

    /// One re-spin of the unlocked cells begins
    BonusSpinStart { turn: u32, turns_left: u8 },

    /// A coin landed and locked
    CoinLand {
        cell: CellRef,
        value: f64,
        style: CoinStyle,
        /// Multiplier factor when `style` is multiplier
        #[serde(default)]
        factor: Option<u32>,
    },

    /// A board special landed on the top row
    BoardSpecialLand { cell: CellRef, special: String },

    /// Value moves from one cell to another (animation edge)
    SpecialTransfer {
        from: CellRef,
        to: CellRef,
        kind: TransferKind,
        amount: f64,
    },

    /// Running total after a turn resolved
    BonusTotal { total: f64, turns_left: u8 },

    /// Round settled
    BonusExit {
        payout: f64,
        turns_played: u32,
        reason: BonusEndReason,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // LEDGER
    // ═══════════════════════════════════════════════════════════════════════
    /// Win computed but the ledger was unreachable; payment is queued
    CreditQueued { amount: f64 },
}

impl Stage {
    /// Get the stage category for grouping
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::SpinStart { .. }
            | Stage::ReelStop { .. }
            | Stage::EvaluateWins
            | Stage::SpinEnd => StageCategory::SpinLifecycle,

            Stage::WinPresent { .. } => StageCategory::WinLifecycle,

            Stage::BonusTrigger { .. }
            | Stage::BonusEnter { .. }
            | Stage::BonusSpinStart { .. }
            | Stage::CoinLand { .. }
            | Stage::BoardSpecialLand { .. }
            | Stage::SpecialTransfer { .. }
            | Stage::BonusTotal { .. }
            | Stage::BonusExit { .. } => StageCategory::Bonus,

            Stage::CreditQueued { .. } => StageCategory::Ledger,
        }
    }

    /// Get a simple string name for this stage type
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart { .. } => "spin_start",
            Stage::ReelStop { .. } => "reel_stop",
            Stage::EvaluateWins => "evaluate_wins",
            Stage::SpinEnd => "spin_end",
            Stage::WinPresent { .. } => "win_present",
            Stage::BonusTrigger { .. } => "bonus_trigger",
            Stage::BonusEnter { .. } => "bonus_enter",
            Stage::BonusSpinStart { .. } => "bonus_spin_start",
            Stage::CoinLand { .. } => "coin_land",
            Stage::BoardSpecialLand { .. } => "board_special_land",
            Stage::SpecialTransfer { .. } => "special_transfer",
            Stage::BonusTotal { .. } => "bonus_total",
            Stage::BonusExit { .. } => "bonus_exit",
            Stage::CreditQueued { .. } => "credit_queued",
        }
    }

    /// Stages during which the renderer keeps a glow running
    pub fn is_looping(&self) -> bool {
        matches!(self, Stage::BonusSpinStart { .. } | Stage::SpecialTransfer { .. })
    }

    /// Get all valid stage type names for validation
    pub fn all_type_names() -> &'static [&'static str] {
        &[
            "spin_start",
            "reel_stop",
            "evaluate_wins",
            "spin_end",
            "win_present",
            "bonus_trigger",
            "bonus_enter",
            "bonus_spin_start",
            "coin_land",
            "board_special_land",
            "special_transfer",
            "bonus_total",
            "bonus_exit",
            "credit_queued",
        ]
    }

    /// Check if a type name is valid
    pub fn is_valid_type_name(name: &str) -> bool {
        Self::all_type_names().contains(&name.to_lowercase().as_str())
    }

    /// Win amount carried by this stage, if any
    pub fn win_amount(&self) -> Option<f64> {
        match self {
            Stage::WinPresent { win_amount, .. } => Some(*win_amount),
            Stage::BonusExit { payout, .. } => Some(*payout),
            _ => None,
        }
    }
}

/// Stage category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    SpinLifecycle,
    WinLifecycle,
    Bonus,
    Ledger,
}

impl StageCategory {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            StageCategory::SpinLifecycle => "Spin Lifecycle",
            StageCategory::WinLifecycle => "Win Lifecycle",
            StageCategory::Bonus => "Hold & Win",
            StageCategory::Ledger => "Ledger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_categories() {
        assert_eq!(
            Stage::SpinStart { bet: 1.0 }.category(),
            StageCategory::SpinLifecycle
        );
        assert_eq!(
            Stage::BonusTotal {
                total: 31.0,
                turns_left: 3
            }
            .category(),
            StageCategory::Bonus
        );
        assert_eq!(
            Stage::CreditQueued { amount: 2.0 }.category(),
            StageCategory::Ledger
        );
    }

    #[test]
    fn test_type_names_are_registered() {
        let stages = [
            Stage::SpinStart { bet: 1.0 },
            Stage::EvaluateWins,
            Stage::SpinEnd,
            Stage::BonusTrigger { coin_count: 5 },
            Stage::BonusExit {
                payout: 1.0,
                turns_played: 3,
                reason: BonusEndReason::OutOfTurns,
            },
        ];
        for stage in stages {
            assert!(Stage::is_valid_type_name(stage.type_name()));
        }
        assert!(!Stage::is_valid_type_name("reel_spin_loop"));
    }

    #[test]
    fn test_stage_serialization() {
        let stage = Stage::CoinLand {
            cell: CellRef::new(1, 2),
            value: 12.0,
            style: CoinStyle::Standard,
            factor: None,
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("\"type\":\"coin_land\""));
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stage);
    }
}

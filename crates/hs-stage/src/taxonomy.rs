//! Taxonomy - shared vocabulary used inside stage payloads

use serde::{Deserialize, Serialize};

/// Board coordinate as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u8,
    pub col: u8,
}

impl CellRef {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Visual family of a coin (blue / red / gold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinStyle {
    /// Plain value coin
    Standard,
    /// Multiplies one other coin, then spins away
    Multiplier,
    /// Absorbs the value of all other coins
    Collector,
}

impl CoinStyle {
    /// Short label printed on the coin face
    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Multiplier => "X",
            Self::Collector => "SUM",
        }
    }
}

/// Kind of value transfer drawn between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Multiplier coin boosting a target coin
    Multiply,
    /// Source coin feeding a collector
    Collect,
    /// Board special adding to every coin
    CoinUp,
    /// Board special multiplying its column
    MultiUp,
}

impl TransferKind {
    /// Glow colour family used by the renderer
    pub fn glow(&self) -> &'static str {
        match self {
            Self::Multiply | Self::MultiUp => "red",
            Self::Collect | Self::CoinUp => "yellow",
        }
    }
}

/// Why a bonus round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusEndReason {
    /// Every cell holds a locked coin
    BoardFull,
    /// Turn budget reached zero
    OutOfTurns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_labels() {
        assert_eq!(CoinStyle::Multiplier.label(), "X");
        assert_eq!(CoinStyle::Collector.label(), "SUM");
    }

    #[test]
    fn test_transfer_serde() {
        let json = serde_json::to_string(&TransferKind::MultiUp).unwrap();
        assert_eq!(json, "\"multi_up\"");
        let back: TransferKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransferKind::MultiUp);
    }
}

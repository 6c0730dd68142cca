//! Symbol definitions and per-theme symbol catalogs

use serde::{Deserialize, Serialize};

/// Numeric symbol id, unique within a theme
pub type SymbolId = u32;

/// Symbol kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular,
    /// Wild - substitutes for regular symbols inside a run
    Wild,
    /// Coin - carries a value, triggers and feeds the bonus round
    Coin,
    /// Scatter - pays by count anywhere
    Scatter,
    /// Blank bonus position
    Empty,
    /// Board special: every locked coin gains a bet fraction
    CoinUp,
    /// Board special: multiplies the locked coins of its column
    MultiUp,
    /// Board special: turns into a fixed high-value coin
    Mystery,
}

impl SymbolKind {
    /// Check if this is one of the top-row board specials
    pub fn is_board_special(&self) -> bool {
        matches!(self, Self::CoinUp | Self::MultiUp | Self::Mystery)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Wild => "wild",
            Self::Coin => "coin",
            Self::Scatter => "scatter",
            Self::Empty => "empty",
            Self::CoinUp => "coin_up",
            Self::MultiUp => "multi_up",
            Self::Mystery => "mystery",
        }
    }
}

/// Payout tier, used only by high-bet dampening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolTier {
    High,
    Mid,
    #[default]
    Low,
    /// Very common, low multiplier symbols
    Filler,
    /// Non-paying specials (wild, coin, empty, board specials)
    Special,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID
    pub id: SymbolId,
    /// Theme-specific name (e.g. "PLANE", "WILD")
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Base payout multiplier (0 for specials)
    #[serde(default)]
    pub multiplier: f64,
    #[serde(default)]
    pub tier: SymbolTier,
}

impl Symbol {
    /// Create a regular paying symbol
    pub fn regular(id: SymbolId, name: impl Into<String>, tier: SymbolTier, multiplier: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Regular,
            multiplier,
            tier,
        }
    }

    /// Create a non-paying symbol of the given kind
    pub fn special(id: SymbolId, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            multiplier: 0.0,
            tier: SymbolTier::Special,
        }
    }

    pub fn wild(id: SymbolId, name: impl Into<String>) -> Self {
        Self::special(id, name, SymbolKind::Wild)
    }

    pub fn coin(id: SymbolId, name: impl Into<String>) -> Self {
        Self::special(id, name, SymbolKind::Coin)
    }

    pub fn empty(id: SymbolId) -> Self {
        Self::special(id, "EMPTY", SymbolKind::Empty)
    }

    /// Create a scatter symbol (its pay lives in the theme's win mode)
    pub fn scatter(id: SymbolId, name: impl Into<String>) -> Self {
        Self::special(id, name, SymbolKind::Scatter)
    }

    /// Check if this symbol can start or extend a paying run
    pub fn pays_on_line(&self) -> bool {
        self.kind == SymbolKind::Regular && self.multiplier > 0.0
    }
}

/// The set of symbols a theme uses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
}

impl SymbolCatalog {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Get symbol by name
    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// First symbol of a kind
    pub fn first_of(&self, kind: SymbolKind) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.kind == kind)
    }

    /// Kind of a symbol id (unknown ids read as empty)
    pub fn kind_of(&self, id: SymbolId) -> SymbolKind {
        self.get(id).map(|s| s.kind).unwrap_or(SymbolKind::Empty)
    }

    pub fn wild_id(&self) -> Option<SymbolId> {
        self.first_of(SymbolKind::Wild).map(|s| s.id)
    }

    pub fn coin_id(&self) -> Option<SymbolId> {
        self.first_of(SymbolKind::Coin).map(|s| s.id)
    }

    pub fn empty_id(&self) -> Option<SymbolId> {
        self.first_of(SymbolKind::Empty).map(|s| s.id)
    }

    /// Get all regular symbol IDs
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .map(|s| s.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Check that every id appears once
    pub fn has_unique_ids(&self) -> bool {
        let mut ids: Vec<SymbolId> = self.symbols.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }
}

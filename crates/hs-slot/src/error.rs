//! Error types for theme loading, ledger access and round operations

use thiserror::Error;

use crate::machine::RoundState;
use crate::money::Money;
use crate::symbols::SymbolId;

/// Theme configuration errors (load time, always fatal)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unsupported theme file format: {0}")]
    UnsupportedFormat(String),

    #[error("Limit exceeded: {0}")]
    Limit(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Weight table '{0}' is empty")]
    EmptyTable(&'static str),

    #[error("Weight table '{table}' has invalid weight {weight} for symbol {symbol}")]
    InvalidWeight {
        table: &'static str,
        symbol: SymbolId,
        weight: f64,
    },

    #[error("Weight table '{table}' references unknown symbol {symbol}")]
    UnknownSymbol { table: &'static str, symbol: SymbolId },

    #[error("Weight table '{0}' has no non-wild mass; wild redraws could not terminate")]
    NoNonWildMass(&'static str),

    #[error("Theme is missing a {0} symbol")]
    MissingSymbol(&'static str),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type for theme configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors reported by an external balance ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Money, requested: Money },

    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors from round operations on a slot machine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    #[error("Invalid bet: {0}")]
    InvalidBet(Money),

    #[error("Round in progress ({0:?})")]
    RoundInProgress(RoundState),

    #[error("No bonus round is active")]
    NoBonusActive,

    #[error("Theme '{0}' does not offer a bonus buy")]
    BuyBonusUnavailable(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result type for round operations
pub type EngineResult<T> = Result<T, EngineError>;

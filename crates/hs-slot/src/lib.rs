//! # hs-slot - Hold & Win Slot Engine
//!
//! Resolves spins for multi-theme Hold & Win slots: weighted symbol draws,
//! column-constrained grid generation, payline/scatter evaluation, the
//! coin-locking bonus round and ledger settlement.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine (session, RoundState)
//!     │
//!     ├── ThemeConfig (weights, trigger rule, win mode, coin bands)
//!     ├── CellSource (RandomSource | ScriptedSource)
//!     ├── grid::generate → Board
//!     ├── paytable::evaluate → WinEvaluation
//!     ├── BonusRound (trigger → turns → Settlement)
//!     └── Cashier → Ledger (debit / idempotent credit / retry queue)
//!           │
//!           v
//!     Presenter → hs_stage::StageTrace
//! ```
//!
//! Every resolution function is synchronous and pure apart from the
//! `CellSource` it draws from. Money is carried in integer minor units.

pub mod bonus;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod machine;
pub mod money;
pub mod parser;
pub mod paytable;
pub mod presentation;
pub mod rng;
pub mod scenario;
pub mod stats;
pub mod symbols;
pub mod theme;
pub mod timing;

pub use bonus::*;
pub use error::*;
pub use grid::*;
pub use ledger::*;
pub use machine::*;
pub use money::*;
pub use parser::*;
pub use paytable::*;
pub use presentation::*;
pub use rng::*;
pub use scenario::*;
pub use stats::*;
pub use symbols::*;
pub use theme::*;
pub use timing::*;

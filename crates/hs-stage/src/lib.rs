//! # hs-stage - Hold & Win Stage System
//!
//! Defines the stages a presentation layer reacts to while a spin or a
//! Hold & Win round resolves. The engine never talks to the renderer in
//! engine terms, only in STAGES.
//!
//! ## Philosophy
//!
//! Every round passes through the same semantic phases:
//! - Spin starts → Reels stop → Wins evaluated → Bonus entered → Turns → Payout
//!
//! Stages are one-way: the presentation layer consumes them and never feeds
//! anything back into resolution.

pub mod event;
pub mod stage;
pub mod taxonomy;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use taxonomy::*;
pub use trace::*;

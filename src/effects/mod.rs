//! Effect system for unit powers.
//!
//! Resolution is a three-stage pipeline:
//! - `translate`: declared powers to effects, pure and state-free
//! - `compute`: state-dependent powers (counts, tiers, dice triggers,
//!   once-only memory, charge costs) to effects
//! - `apply`: effects folded into state, with damage, healing and line
//!   gains deferred into the pending accumulator until end-of-turn
//!
//! ## Design Philosophy
//!
//! Effects are plain data. Nothing in this module rolls dice, reads a
//! clock, or mutates the caller's state; every stage takes a state and
//! returns a new one, which keeps any permutation of the same effect
//! batch landing on identical end-of-turn totals.

pub mod apply;
pub mod computed;
pub mod effect;
pub mod resolve;
pub mod translate;

pub use apply::{aggregate_pending, apply, Applied};
pub use computed::compute;
pub use effect::{Effect, EffectId, EffectIds, EffectKind, EffectSource, EffectTarget};
pub use resolve::resolve_phase;
pub use translate::{translate, TranslateContext};

//! # starline
//!
//! A server-authoritative rules engine for a synchronous, turn-based
//! two-player space strategy game.
//!
//! ## Design Principles
//!
//! 1. **Pure over state**: The engine is a function from a state value
//!    plus an intent to a new state value (or a typed rejection). Time
//!    and dice are injected; nothing here reads a clock or seeds RNG.
//!
//! 2. **Deferred mutation**: Damage, healing and line gains accrue into
//!    a pending accumulator and fold into authoritative values exactly
//!    once, at end-of-turn, making resolution order irrelevant.
//!
//! 3. **Hidden choices by commitment**: Simultaneous decisions (species,
//!    battle plans) go through hash commit/reveal; payloads become
//!    public atomically, all at once, never early.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) state cloning via `im-rs`,
//!   so every operation can return a new state cheaply.
//!
//! - **Typed Events**: The append-only event log is the single
//!   observability channel; auditors replay it, presentation renders it.
//!
//! ## Modules
//!
//! - `core`: Players, state, events, errors, injected RNG
//! - `units`: Unit catalog and structured power definitions
//! - `effects`: Translate / compute / apply resolution pipeline
//! - `phases`: Phase sequence, state machine, chess clocks
//! - `commit`: Commit/reveal protocol and per-player views
//! - `intent`: The validated entry point for player actions

pub mod commit;
pub mod core;
pub mod effects;
pub mod intent;
pub mod phases;
pub mod units;

// Re-export commonly used types
pub use crate::core::{
    DiceSource, EngineError, FixedDice, GameEvent, GameId, GameOutcome, GameRng, GameRngState,
    GameState, GameStatus, IntentError, MatchResult, PlayerId, PlayerState, Rejection, ShipId,
    ShipInstance, TerminalReason, Timestamp,
};

pub use crate::units::{
    Activation, CountSpec, PowerAction, PowerAmount, PowerCondition, PowerTarget, PowerTiming,
    StructuredPower, UnitCatalog, UnitDefinition, UnitRegistry, UnitTypeId,
};

pub use crate::effects::{
    aggregate_pending, apply, resolve_phase, Applied, Effect, EffectKind, EffectSource,
    EffectTarget,
};

pub use crate::phases::{
    advance_phase, on_enter_phase, sync_phase_fields, AdvanceOptions, BattlePhase, BuildPhase,
    ChessClock, PhaseAdvance, PhaseKey, SetupPhase, BASE_TIME_MS, PHASE_SEQUENCE,
    TURN_INCREMENT_MS,
};

pub use crate::commit::{
    commitment_hash, store_commit, validate_and_store_reveal, view_for, BattlePlan, CommitKey,
    CommitRecord, CommitState, DecisionKind, PlayerView, RevealPayload, Stance,
};

pub use crate::intent::{apply_intent, Intent, IntentKind, IntentOutcome};

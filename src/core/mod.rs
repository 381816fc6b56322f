//! Core engine types: players, game state, events, errors, RNG.

pub mod error;
pub mod event;
pub mod player;
pub mod rng;
pub mod state;

pub use error::{EngineError, IntentError, Rejection};
pub use event::{GameEvent, PlanChoice, SpeciesChoice};
pub use player::{PlayerId, PlayerRole, PlayerState, STARTING_HEALTH};
pub use rng::{DiceSource, FixedDice, GameRng, GameRngState};
pub use state::{
    GameData, GameId, GameOutcome, GameState, GameStatus, MatchResult, OncePowerKey, PendingTurn,
    PlayerDelta, PowerMemory, ShipId, ShipInstance, TerminalReason, Timestamp, TurnData,
};

//! Player identification and per-player public state.
//!
//! ## PlayerId
//!
//! Type-safe player identifier. The engine is two-player; spectators get
//! ids past the seats.
//!
//! ## PlayerState
//!
//! Health, lines (the spendable build resource), the revealed species,
//! and the player's chess clock. Health and lines are authoritative
//! values: health is written only by end-of-turn aggregation, lines by
//! the line-generation grant and by construction spending.

use serde::{Deserialize, Serialize};

use crate::phases::clock::ChessClock;

/// Starting (and maximum) health for a seat.
pub const STARTING_HEALTH: i64 = 30;

/// Player identifier. Seats are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Whether a participant plays or watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Player,
    Spectator,
}

/// Public per-player state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Seat identifier.
    pub id: PlayerId,

    /// Player or spectator.
    pub role: PlayerRole,

    /// Current health. Written only by end-of-turn aggregation.
    pub health: i64,

    /// Health ceiling for clamping heals.
    pub max_health: i64,

    /// Spendable build resource.
    pub lines: i64,

    /// Chosen species. `None` until revealed through the commit/reveal
    /// protocol; never set from an unrevealed payload.
    pub species: Option<String>,

    /// This player's chess clock.
    pub clock: ChessClock,
}

impl PlayerState {
    /// Create an active player seat with starting values.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            role: PlayerRole::Player,
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            lines: 0,
            species: None,
            clock: ChessClock::new(),
        }
    }

    /// Create a spectator seat.
    #[must_use]
    pub fn spectator(id: PlayerId) -> Self {
        Self {
            role: PlayerRole::Spectator,
            ..Self::new(id)
        }
    }

    /// Whether this seat participates in play.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.role == PlayerRole::Player
    }
}

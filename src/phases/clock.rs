//! Per-player chess clock.
//!
//! Each player has 10 minutes of base time plus a 15-second increment
//! applied at most once per player per turn. The clock is inactive until
//! the player has chosen a species and the game has reached turn 1; the
//! engine only tracks the budget, wall-clock enforcement belongs to the
//! caller (who injects `now`).

use serde::{Deserialize, Serialize};

/// Base time budget per player: 10 minutes.
pub const BASE_TIME_MS: i64 = 600_000;

/// Increment granted once per player per turn: 15 seconds.
pub const TURN_INCREMENT_MS: i64 = 15_000;

/// A single player's clock state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessClock {
    remaining_ms: i64,
    /// Highest turn for which the increment was already granted.
    incremented_through: u32,
}

impl ChessClock {
    /// A fresh clock with the full base budget.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining_ms: BASE_TIME_MS,
            incremented_through: 0,
        }
    }

    /// Remaining budget in milliseconds.
    #[must_use]
    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    /// Whether the clock is running for this player.
    ///
    /// Inactive until the player has chosen a species and turn >= 1.
    #[must_use]
    pub fn is_active(&self, species_chosen: bool, turn: u32) -> bool {
        species_chosen && turn >= 1
    }

    /// Grant the per-turn increment.
    ///
    /// Idempotent per turn: returns `false` without changing the budget
    /// if the increment for `turn` was already applied.
    pub fn apply_increment_for_turn(&mut self, turn: u32) -> bool {
        if turn <= self.incremented_through {
            return false;
        }
        self.incremented_through = turn;
        self.remaining_ms += TURN_INCREMENT_MS;
        true
    }

    /// Deduct elapsed thinking time, clamped at zero.
    pub fn deduct(&mut self, elapsed_ms: i64) {
        self.remaining_ms = (self.remaining_ms - elapsed_ms.max(0)).max(0);
    }
}

impl Default for ChessClock {
    fn default() -> Self {
        Self::new()
    }
}

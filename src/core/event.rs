//! The typed event log.
//!
//! Events are the engine's single observability channel: everything the
//! presentation layer shows, and everything an auditor replays, comes
//! from here. They are append-only, JSON-serializable, and tagged with
//! stable SCREAMING_SNAKE_CASE codes.

use serde::{Deserialize, Serialize};

use crate::commit::record::Stance;
use crate::phases::sequence::PhaseKey;
use crate::units::definition::UnitTypeId;

use super::player::PlayerId;
use super::state::{GameOutcome, PlayerDelta, ShipId};

/// A player's resolved species choice, as surfaced by
/// `SPECIES_RESOLVED`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesChoice {
    pub player: PlayerId,
    pub species: String,
}

/// A player's resolved battle plan, as surfaced by
/// `BATTLE_PLAN_RESOLVED`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanChoice {
    pub player: PlayerId,
    pub stance: Stance,
}

/// One entry of the append-only event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    /// The server rolled the turn die.
    DiceRolled { turn: u32, value: u8 },

    /// A player received the dice-driven line grant.
    LinesGranted { player: PlayerId, amount: i64 },

    /// All species reveals verified; choices are now public.
    SpeciesResolved { choices: Vec<SpeciesChoice> },

    /// All battle-plan reveals verified; stances are now public.
    BattlePlanResolved { plans: Vec<PlanChoice> },

    /// Damage accrued into the pending accumulator.
    DamageAccrued { target: PlayerId, amount: i64 },

    /// Healing accrued into the pending accumulator.
    HealAccrued { target: PlayerId, amount: i64 },

    /// Line gain accrued into the pending accumulator.
    LinesAccrued { target: PlayerId, amount: i64 },

    /// A ship was built or created by a power.
    UnitCreated {
        owner: PlayerId,
        ship: ShipId,
        unit_type: UnitTypeId,
        turn: u32,
    },

    /// A ship was destroyed (swept at turn wrap).
    UnitDestroyed { owner: PlayerId, ship: ShipId },

    /// A ship gained charges.
    ChargeGained {
        owner: PlayerId,
        ship: ShipId,
        amount: u32,
    },

    /// A ship spent charges to fire a power.
    ChargeSpent {
        owner: PlayerId,
        ship: ShipId,
        amount: u32,
    },

    /// The phase machine advanced.
    PhaseAdvanced {
        from: PhaseKey,
        to: PhaseKey,
        turn: u32,
    },

    /// End-of-turn aggregation applied pending totals.
    TurnResolved { deltas: Vec<PlayerDelta> },

    /// The game reached a terminal state.
    GameFinished { outcome: GameOutcome },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_tags() {
        let event = GameEvent::DiceRolled { turn: 1, value: 4 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "DICE_ROLLED");
        assert_eq!(json["value"], 4);

        let event = GameEvent::SpeciesResolved { choices: vec![] };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SPECIES_RESOLVED");
    }

    #[test]
    fn test_event_roundtrip() {
        let event = GameEvent::LinesGranted {
            player: PlayerId::new(1),
            amount: 4,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}

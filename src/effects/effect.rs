//! Effect definitions.
//!
//! An [`Effect`] is the canonical description of one state change:
//! kind, source, target, timing, activation tag, survivability, amount.
//! Pure data with no behavior; the translator and the computed engine
//! produce effects, the applier folds them into state.

use serde::{Deserialize, Serialize};

use crate::core::player::PlayerId;
use crate::core::state::ShipId;
use crate::phases::sequence::PhaseKey;
use crate::units::definition::{Activation, UnitTypeId};

/// Identifier of an effect within one resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

/// Where an effect came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSource {
    /// A unit instance's declared power.
    Unit { ship: ShipId, unit_type: UnitTypeId },
    /// A named game rule (dice grant, plan resolution, ...).
    Rule { name: String },
}

/// Who or what an effect hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    Player(PlayerId),
    Unit { owner: PlayerId, ship: ShipId },
}

/// What kind of state change an effect describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Accrue damage against a player (deferred to end-of-turn).
    Damage,
    /// Accrue healing for a player (deferred to end-of-turn).
    Heal,
    /// Mark a unit destroyed.
    Destroy,
    /// Create a unit for the owning player.
    CreateUnit { unit_type: UnitTypeId },
    /// Accrue line gain for a player (deferred to end-of-turn).
    GainLines,
    /// Add charges to a unit.
    GainEnergy,
    /// Remove charges from a unit.
    SpendCharge,
}

/// A canonical, phase-scoped state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,

    /// The player whose power produced this effect.
    pub owner: PlayerId,

    pub source: EffectSource,

    /// The phase this effect belongs to.
    pub timing: PhaseKey,

    pub activation: Activation,

    /// Does the effect still apply if its source was destroyed this
    /// turn?
    pub survives_source_loss: bool,

    pub target: EffectTarget,
    pub kind: EffectKind,
    pub amount: i64,
}

impl Effect {
    /// Create an effect with explicit parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: EffectId,
        owner: PlayerId,
        source: EffectSource,
        timing: PhaseKey,
        activation: Activation,
        survives_source_loss: bool,
        target: EffectTarget,
        kind: EffectKind,
        amount: i64,
    ) -> Self {
        Self {
            id,
            owner,
            source,
            timing,
            activation,
            survives_source_loss,
            target,
            kind,
            amount,
        }
    }
}

/// Allocator for effect ids within a resolution pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectIds {
    next: u32,
}

impl EffectIds {
    /// Create a fresh allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> EffectId {
        let id = EffectId(self.next);
        self.next += 1;
        id
    }
}

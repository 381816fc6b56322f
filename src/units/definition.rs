//! Unit definitions and the structured power schema.
//!
//! The unit catalog itself is an external collaborator; the engine only
//! fixes the schema. A power is declared data, not free text: a timing
//! (exact phase key or sub-phase name), an activation tag, an action, an
//! amount formula, and a target. Catalog data may be partially
//! specified, so the required parts are `Option`s and translation skips
//! (with a debug log) anything incomplete rather than failing the whole
//! resolution pass.

use serde::{Deserialize, Serialize};

use crate::phases::sequence::PhaseKey;

/// Unique identifier for a unit type (the catalog key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(pub u32);

impl UnitTypeId {
    /// Create a new unit type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unit({})", self.0)
    }
}

/// When a power is allowed to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Fires every time its phase resolves.
    Automatic,
    /// Fires at most once per unit instance, on its creation turn.
    OnceOnly,
    /// Fires only when its condition holds.
    Conditional,
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Automatic
    }
}

/// Declared timing: an exact phase key or a bare sub-phase name.
///
/// There is no inference from free text; a power with no declared
/// timing never translates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PowerTiming {
    /// Full `"major.sub"` phase key.
    Phase(PhaseKey),
    /// Bare sub-phase name (e.g. `"resolution"`), matching that
    /// sub-phase in any segment.
    Sub(String),
}

impl PowerTiming {
    /// Whether this declaration matches the given phase.
    #[must_use]
    pub fn matches(&self, phase: PhaseKey) -> bool {
        match self {
            PowerTiming::Phase(key) => *key == phase,
            PowerTiming::Sub(name) => name == phase.sub_name(),
        }
    }
}

/// What a power does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    Damage,
    Heal,
    Destroy,
    CreateUnit { unit_type: UnitTypeId },
    GainLines,
    GainEnergy,
}

/// A live count over the owner's fleet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSpec {
    /// All of the owner's surviving units.
    OwnUnits,
    /// The owner's surviving units excluding the power's source.
    OwnOtherUnits,
    /// The owner's surviving units of one type.
    OwnUnitsOfType { unit_type: UnitTypeId },
    /// Distinct unit types in the owner's fleet (the source counts
    /// itself as a type).
    DistinctOwnTypes,
    /// Units the owner created this turn.
    BuiltThisTurn,
}

/// Amount formula for a power.
///
/// `Fixed` is pure and handled by the translator; the rest require live
/// state and are handled by the computed-effects engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAmount {
    /// A constant.
    Fixed(i64),
    /// The raw count.
    Count(CountSpec),
    /// `floor(count / group_size)`, as in "1 damage per N of X".
    PerGroup { count: CountSpec, group_size: i64 },
    /// Ascending thresholds mapped to an integer tier 0..N.
    Tiered { count: CountSpec, thresholds: Vec<i64> },
}

/// Who the power hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerTarget {
    /// The opposing player (the default for damage).
    Opponent,
    /// The owning player (healing, resource gain).
    Owner,
}

impl Default for PowerTarget {
    fn default() -> Self {
        PowerTarget::Opponent
    }
}

/// Conditions for `Activation::Conditional` powers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCondition {
    /// Fires only if the turn's die equals the instance's chosen
    /// trigger number (1..=6).
    DiceTrigger,
}

/// One declared power in the fixed schema.
///
/// Required parts (`timing`, `action`, `amount`) are optional at the
/// type level because upstream catalog data may be incomplete; the
/// translator skips incomplete powers instead of rejecting the unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredPower {
    /// Declared timing. No timing, no translation.
    pub timing: Option<PowerTiming>,

    /// Activation tag.
    #[serde(default)]
    pub activation: Activation,

    /// What the power does.
    pub action: Option<PowerAction>,

    /// How much.
    pub amount: Option<PowerAmount>,

    /// Who it hits.
    #[serde(default)]
    pub target: PowerTarget,

    /// Condition for conditional activation.
    #[serde(default)]
    pub condition: Option<PowerCondition>,

    /// Charges the source must spend to fire, if any.
    #[serde(default)]
    pub charge_cost: Option<u32>,

    /// Does the effect still apply if the source is destroyed this
    /// turn?
    #[serde(default)]
    pub survives_destruction: bool,
}

impl StructuredPower {
    /// A fully-specified automatic power.
    #[must_use]
    pub fn automatic(timing: PowerTiming, action: PowerAction, amount: PowerAmount) -> Self {
        Self {
            timing: Some(timing),
            activation: Activation::Automatic,
            action: Some(action),
            amount: Some(amount),
            target: PowerTarget::default(),
            condition: None,
            charge_cost: None,
            survives_destruction: false,
        }
    }

    /// Set the activation tag.
    #[must_use]
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set the target.
    #[must_use]
    pub fn targeting(mut self, target: PowerTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the condition (implies conditional activation).
    #[must_use]
    pub fn with_condition(mut self, condition: PowerCondition) -> Self {
        self.condition = Some(condition);
        self.activation = Activation::Conditional;
        self
    }

    /// Set a charge cost.
    #[must_use]
    pub fn with_charge_cost(mut self, cost: u32) -> Self {
        self.charge_cost = Some(cost);
        self
    }

    /// Mark the effect as surviving source destruction.
    #[must_use]
    pub fn surviving_destruction(mut self) -> Self {
        self.survives_destruction = true;
        self
    }

    /// Whether resolving this power needs live state.
    ///
    /// True for non-fixed amounts, non-automatic activation, conditions
    /// and charge costs. State-needing powers belong to the
    /// computed-effects engine; the translator handles the rest.
    #[must_use]
    pub fn requires_state(&self) -> bool {
        self.activation != Activation::Automatic
            || self.condition.is_some()
            || self.charge_cost.is_some()
            || !matches!(self.amount, Some(PowerAmount::Fixed(_)))
    }
}

/// Static unit definition, as returned by the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Catalog key.
    pub id: UnitTypeId,

    /// Display name.
    pub name: String,

    /// Construction cost in lines.
    pub cost_lines: i64,

    /// Charge ceiling for charge-based powers.
    #[serde(default)]
    pub max_charges: u32,

    /// Declared powers, in catalog order. Power index is part of the
    /// once-only memory key, so order is significant.
    #[serde(default)]
    pub powers: Vec<StructuredPower>,
}

impl UnitDefinition {
    /// Create a unit definition with no powers.
    #[must_use]
    pub fn new(id: UnitTypeId, name: impl Into<String>, cost_lines: i64) -> Self {
        Self {
            id,
            name: name.into(),
            cost_lines,
            max_charges: 0,
            powers: Vec::new(),
        }
    }

    /// Add a power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: StructuredPower) -> Self {
        self.powers.push(power);
        self
    }

    /// Set the charge ceiling.
    #[must_use]
    pub fn with_max_charges(mut self, max: u32) -> Self {
        self.max_charges = max;
        self
    }
}

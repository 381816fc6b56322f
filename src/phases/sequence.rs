//! The canonical phase sequence.
//!
//! Every turn walks a fixed, totally ordered list of phases: a build
//! segment (dice roll, line generation, construction, drawing, end of
//! build) followed by a battle segment (first strike, simultaneous
//! declaration, conditional response, end-of-turn resolution). Setup is
//! a single pre-game phase that exits into the first build phase of
//! turn 1.
//!
//! Phase keys render as `"major.sub"` strings (e.g. `build.dice_roll`)
//! so catalog data and serialized state can reference them by name.

use serde::{Deserialize, Serialize};

/// Sub-phases of the setup segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetupPhase {
    /// Players commit and reveal their species choice.
    SpeciesSelect,
}

/// Sub-phases of the build segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    /// Server rolls the turn die.
    DiceRoll,
    /// Each player gains lines equal to the die value.
    LineGain,
    /// Players spend lines to build ships.
    Construction,
    /// Players draw options for the turn.
    Draw,
    /// Last chance for build-timed powers.
    End,
}

/// Sub-phases of the battle segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    /// First-strike powers resolve before declarations.
    FirstStrike,
    /// Simultaneous hidden battle-plan declaration.
    Declaration,
    /// Conditional responses to revealed plans.
    Response,
    /// End-of-turn resolution: structured powers fire and pending
    /// damage/healing is aggregated.
    Resolution,
}

/// A phase key: one step of one turn segment.
///
/// The set of keys is closed; an invalid phase is unrepresentable.
/// Total order is given by position in [`PHASE_SEQUENCE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PhaseKey {
    Setup(SetupPhase),
    Build(BuildPhase),
    Battle(BattlePhase),
}

/// The fixed phase order. Setup appears once at the head; play wraps
/// from the last battle phase back to the first build phase.
pub const PHASE_SEQUENCE: [PhaseKey; 10] = [
    PhaseKey::Setup(SetupPhase::SpeciesSelect),
    PhaseKey::Build(BuildPhase::DiceRoll),
    PhaseKey::Build(BuildPhase::LineGain),
    PhaseKey::Build(BuildPhase::Construction),
    PhaseKey::Build(BuildPhase::Draw),
    PhaseKey::Build(BuildPhase::End),
    PhaseKey::Battle(BattlePhase::FirstStrike),
    PhaseKey::Battle(BattlePhase::Declaration),
    PhaseKey::Battle(BattlePhase::Response),
    PhaseKey::Battle(BattlePhase::Resolution),
];

impl PhaseKey {
    /// The first phase of a playing turn.
    #[must_use]
    pub const fn first_build() -> Self {
        PhaseKey::Build(BuildPhase::DiceRoll)
    }

    /// The end-of-turn resolution phase.
    #[must_use]
    pub const fn resolution() -> Self {
        PhaseKey::Battle(BattlePhase::Resolution)
    }

    /// Position in [`PHASE_SEQUENCE`].
    #[must_use]
    pub fn index(self) -> usize {
        PHASE_SEQUENCE
            .iter()
            .position(|p| *p == self)
            .expect("every PhaseKey appears in PHASE_SEQUENCE")
    }

    /// The next phase in sequence, or `None` past the last entry.
    ///
    /// Wrapping to the next turn is the state machine's job, not the
    /// sequence's.
    #[must_use]
    pub fn next_in_sequence(self) -> Option<PhaseKey> {
        PHASE_SEQUENCE.get(self.index() + 1).copied()
    }

    /// The major segment name.
    #[must_use]
    pub fn major(self) -> &'static str {
        match self {
            PhaseKey::Setup(_) => "setup",
            PhaseKey::Build(_) => "build",
            PhaseKey::Battle(_) => "battle",
        }
    }

    /// The sub-phase name, as used by catalog timing declarations.
    #[must_use]
    pub fn sub_name(self) -> &'static str {
        match self {
            PhaseKey::Setup(SetupPhase::SpeciesSelect) => "species_select",
            PhaseKey::Build(BuildPhase::DiceRoll) => "dice_roll",
            PhaseKey::Build(BuildPhase::LineGain) => "line_gain",
            PhaseKey::Build(BuildPhase::Construction) => "construction",
            PhaseKey::Build(BuildPhase::Draw) => "draw",
            PhaseKey::Build(BuildPhase::End) => "end",
            PhaseKey::Battle(BattlePhase::FirstStrike) => "first_strike",
            PhaseKey::Battle(BattlePhase::Declaration) => "declaration",
            PhaseKey::Battle(BattlePhase::Response) => "response",
            PhaseKey::Battle(BattlePhase::Resolution) => "resolution",
        }
    }
}

impl std::fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major(), self.sub_name())
    }
}

impl std::str::FromStr for PhaseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PHASE_SEQUENCE
            .iter()
            .find(|p| p.to_string() == s)
            .copied()
            .ok_or_else(|| format!("unknown phase key: {s}"))
    }
}

impl From<PhaseKey> for String {
    fn from(key: PhaseKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for PhaseKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

//! Commitment records for hidden choices.
//!
//! A record tracks one (commit key, player) pair through the
//! `Uncommitted -> Committed -> Revealed` lifecycle. Keys are scoped by
//! decision type and turn, so records from earlier turns are superseded
//! rather than removed.

use serde::{Deserialize, Serialize};

use crate::core::state::Timestamp;

/// The kind of hidden decision a commitment protects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Pre-game species/faction choice.
    Species,
    /// Per-turn simultaneous battle-plan declaration.
    BattlePlan,
}

/// Scope of one hidden decision: the decision type plus the turn it
/// belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitKey {
    pub decision: DecisionKind,
    pub turn: u32,
}

impl CommitKey {
    /// Key for the species decision (committed during setup, turn 0).
    #[must_use]
    pub const fn species(turn: u32) -> Self {
        Self {
            decision: DecisionKind::Species,
            turn,
        }
    }

    /// Key for a turn's battle-plan declaration.
    #[must_use]
    pub const fn battle_plan(turn: u32) -> Self {
        Self {
            decision: DecisionKind::BattlePlan,
            turn,
        }
    }
}

/// A battle stance declared simultaneously during the declaration
/// phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Attack,
    Defend,
    Hold,
}

/// The hidden payload of a battle-plan commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlan {
    pub stance: Stance,
}

/// A revealed hidden choice. This is what commitment hashes are
/// computed over (together with the nonce).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealPayload {
    Species { species: String },
    BattlePlan { plan: BattlePlan },
}

impl RevealPayload {
    /// The decision kind this payload belongs to.
    #[must_use]
    pub fn decision(&self) -> DecisionKind {
        match self {
            RevealPayload::Species { .. } => DecisionKind::Species,
            RevealPayload::BattlePlan { .. } => DecisionKind::BattlePlan,
        }
    }
}

/// The reveal half of a record, only present once verified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealData {
    pub payload: RevealPayload,
    pub nonce: String,
    pub revealed_at: Timestamp,
}

/// Lifecycle position of a (key, player) record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Uncommitted,
    Committed,
    Revealed,
}

/// Stored commitment for one (key, player) pair.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Hex SHA-256 of `json(payload) || nonce`.
    pub commit_hash: Option<String>,
    pub committed_at: Option<Timestamp>,

    /// Present only after a verified reveal.
    pub reveal: Option<RevealData>,
}

impl CommitRecord {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CommitState {
        if self.reveal.is_some() {
            CommitState::Revealed
        } else if self.commit_hash.is_some() {
            CommitState::Committed
        } else {
            CommitState::Uncommitted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_lifecycle_states() {
        let mut record = CommitRecord::default();
        assert_eq!(record.state(), CommitState::Uncommitted);

        record.commit_hash = Some("abc".into());
        record.committed_at = Some(Timestamp(1));
        assert_eq!(record.state(), CommitState::Committed);

        record.reveal = Some(RevealData {
            payload: RevealPayload::Species {
                species: "meklar".into(),
            },
            nonce: "n".into(),
            revealed_at: Timestamp(2),
        });
        assert_eq!(record.state(), CommitState::Revealed);
    }

    #[test]
    fn test_payload_decision_kind() {
        let species = RevealPayload::Species {
            species: "human".into(),
        };
        assert_eq!(species.decision(), DecisionKind::Species);

        let plan = RevealPayload::BattlePlan {
            plan: BattlePlan {
                stance: Stance::Attack,
            },
        };
        assert_eq!(plan.decision(), DecisionKind::BattlePlan);
    }

    #[test]
    fn test_keys_are_turn_scoped() {
        assert_ne!(CommitKey::battle_plan(1), CommitKey::battle_plan(2));
        assert_ne!(CommitKey::species(0), CommitKey::battle_plan(0));
    }
}

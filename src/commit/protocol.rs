//! The commit/reveal protocol.
//!
//! Hidden simultaneous choices (species, battle plans) are protected by
//! hash commitments: a player first submits `sha256(json(payload) ||
//! nonce)` in hex, and later reveals the payload and nonce. The reveal
//! verifies against the stored hash before anything becomes visible,
//! and a failed verification leaves state untouched.
//!
//! Resolution is atomic: the moment the last required reveal verifies,
//! all payloads become public together, through a single `*_RESOLVED`
//! event. Until then no query path exposes another player's payload.

use im::HashMap as ImHashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::error::Rejection;
use crate::core::event::{GameEvent, PlanChoice, SpeciesChoice};
use crate::core::player::PlayerId;
use crate::core::state::{GameState, GameStatus, Timestamp};

use super::record::{
    CommitKey, CommitRecord, CommitState, DecisionKind, RevealData, RevealPayload,
};

/// Hex SHA-256 over the canonical JSON of the payload followed by the
/// raw nonce bytes.
#[must_use]
pub fn commitment_hash<T: Serialize>(payload: &T, nonce: &str) -> String {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&json);
    hasher.update(nonce.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lifecycle state of one (key, player) record.
#[must_use]
pub fn commit_state(state: &GameState, key: CommitKey, player: PlayerId) -> CommitState {
    state
        .data
        .commits
        .get(&key)
        .and_then(|records| records.get(&player))
        .map_or(CommitState::Uncommitted, CommitRecord::state)
}

/// Whether the player has committed (or further) for the key.
#[must_use]
pub fn has_committed(state: &GameState, key: CommitKey, player: PlayerId) -> bool {
    commit_state(state, key, player) != CommitState::Uncommitted
}

/// Whether the player's reveal for the key has verified.
#[must_use]
pub fn has_revealed(state: &GameState, key: CommitKey, player: PlayerId) -> bool {
    commit_state(state, key, player) == CommitState::Revealed
}

/// Whether every active player has a verified reveal for the key.
#[must_use]
pub fn all_revealed(state: &GameState, key: CommitKey) -> bool {
    state
        .active_player_ids()
        .into_iter()
        .all(|p| has_revealed(state, key, p))
}

/// Store a commitment hash for a player.
///
/// A second commit for the same key is rejected; the first hash is
/// binding.
pub fn store_commit(
    state: &GameState,
    key: CommitKey,
    player: PlayerId,
    hash: String,
    now: Timestamp,
) -> Result<GameState, Rejection> {
    if has_committed(state, key, player) {
        return Err(Rejection::BadPayload("already committed".into()));
    }

    let mut next = state.clone();
    let records = next.data.commits.entry(key).or_insert_with(ImHashMap::new);
    records.insert(
        player,
        CommitRecord {
            commit_hash: Some(hash),
            committed_at: Some(now),
            reveal: None,
        },
    );
    Ok(next)
}

/// Verify a reveal against the stored hash and record it.
///
/// Returns the next state plus the events emitted, which include the
/// `*_RESOLVED` event when this reveal was the last one required. On
/// any rejection the caller's state stands unchanged.
pub fn validate_and_store_reveal(
    state: &GameState,
    key: CommitKey,
    player: PlayerId,
    payload: RevealPayload,
    nonce: String,
    now: Timestamp,
) -> Result<(GameState, Vec<GameEvent>), Rejection> {
    if payload.decision() != key.decision {
        return Err(Rejection::BadPayload(
            "payload kind does not match the decision being revealed".into(),
        ));
    }

    let record = state
        .data
        .commits
        .get(&key)
        .and_then(|records| records.get(&player))
        .cloned()
        .unwrap_or_default();

    // Reveal-before-commit verifies against nothing, so it fails the
    // same way a wrong hash does.
    let Some(expected) = &record.commit_hash else {
        return Err(Rejection::HashMismatch);
    };
    if record.reveal.is_some() {
        return Err(Rejection::BadPayload("already revealed".into()));
    }
    if commitment_hash(&payload, &nonce) != *expected {
        return Err(Rejection::HashMismatch);
    }

    let mut next = state.clone();
    let mut verified = record;
    verified.reveal = Some(RevealData {
        payload,
        nonce,
        revealed_at: now,
    });
    next.data
        .commits
        .entry(key)
        .or_insert_with(ImHashMap::new)
        .insert(player, verified);

    let mut events = Vec::new();
    if all_revealed(&next, key) {
        resolve_all(&mut next, key, &mut events);
    }
    next.push_events(&events);
    Ok((next, events))
}

/// Make every payload under the key public at once.
fn resolve_all(state: &mut GameState, key: CommitKey, events: &mut Vec<GameEvent>) {
    let records = state.data.commits.get(&key).cloned().unwrap_or_default();

    match key.decision {
        DecisionKind::Species => {
            let mut choices = Vec::new();
            for player in state.active_player_ids() {
                let Some(RevealPayload::Species { species }) = records
                    .get(&player)
                    .and_then(|r| r.reveal.as_ref())
                    .map(|r| r.payload.clone())
                else {
                    continue;
                };
                if let Some(seat) = state.player_mut(player) {
                    seat.species = Some(species.clone());
                }
                choices.push(SpeciesChoice { player, species });
            }
            choices.sort_by_key(|c| c.player);
            if state.status == GameStatus::Waiting {
                state.status = GameStatus::Active;
            }
            events.push(GameEvent::SpeciesResolved { choices });
        }
        DecisionKind::BattlePlan => {
            let mut plans = Vec::new();
            for player in state.active_player_ids() {
                let Some(RevealPayload::BattlePlan { plan }) = records
                    .get(&player)
                    .and_then(|r| r.reveal.as_ref())
                    .map(|r| r.payload.clone())
                else {
                    continue;
                };
                state.data.turn.plans.insert(player, plan.stance);
                plans.push(PlanChoice {
                    player,
                    stance: plan.stance,
                });
            }
            plans.sort_by_key(|c| c.player);
            events.push(GameEvent::BattlePlanResolved { plans });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::record::{BattlePlan, Stance};
    use crate::core::state::GameId;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn species(name: &str) -> RevealPayload {
        RevealPayload::Species {
            species: name.into(),
        }
    }

    #[test]
    fn test_hash_is_stable_and_nonce_sensitive() {
        let payload = species("meklar");
        let a = commitment_hash(&payload, "n1");
        let b = commitment_hash(&payload, "n1");
        let c = commitment_hash(&payload, "n2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_commit_then_reveal_verifies() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);
        let payload = species("human");
        let hash = commitment_hash(&payload, "nonce");

        let state = store_commit(&state, key, P0, hash, Timestamp(1)).unwrap();
        assert!(has_committed(&state, key, P0));
        assert!(!has_revealed(&state, key, P0));

        let (state, events) =
            validate_and_store_reveal(&state, key, P0, payload, "nonce".into(), Timestamp(2))
                .unwrap();
        assert!(has_revealed(&state, key, P0));
        // Only one of two players revealed: not resolved yet.
        assert!(events.is_empty());
        assert!(state.player(P0).unwrap().species.is_none());
    }

    #[test]
    fn test_wrong_nonce_rejects_and_leaves_state_unchanged() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);
        let payload = species("human");
        let hash = commitment_hash(&payload, "nonce");

        let committed = store_commit(&state, key, P0, hash, Timestamp(1)).unwrap();
        let err = validate_and_store_reveal(
            &committed,
            key,
            P0,
            payload,
            "other".into(),
            Timestamp(2),
        )
        .unwrap_err();

        assert_eq!(err, Rejection::HashMismatch);
        assert!(!has_revealed(&committed, key, P0));
    }

    #[test]
    fn test_reveal_before_commit_is_hash_mismatch() {
        let state = GameState::new(GameId::new("g"));
        let err = validate_and_store_reveal(
            &state,
            CommitKey::species(0),
            P0,
            species("human"),
            "n".into(),
            Timestamp(1),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::HashMismatch);
    }

    #[test]
    fn test_double_commit_is_rejected() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);
        let state = store_commit(&state, key, P0, "h1".into(), Timestamp(1)).unwrap();

        let err = store_commit(&state, key, P0, "h2".into(), Timestamp(2)).unwrap_err();
        assert!(matches!(err, Rejection::BadPayload(_)));
    }

    #[test]
    fn test_mismatched_payload_kind_is_bad_payload() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::battle_plan(1);
        let state = store_commit(&state, key, P0, "h".into(), Timestamp(1)).unwrap();

        let err = validate_and_store_reveal(
            &state,
            key,
            P0,
            species("human"),
            "n".into(),
            Timestamp(2),
        )
        .unwrap_err();
        assert!(matches!(err, Rejection::BadPayload(_)));
    }

    #[test]
    fn test_species_resolution_is_atomic_and_activates_the_game() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);

        let a = species("human");
        let b = species("meklar");
        let state =
            store_commit(&state, key, P0, commitment_hash(&a, "na"), Timestamp(1)).unwrap();
        let state =
            store_commit(&state, key, P1, commitment_hash(&b, "nb"), Timestamp(1)).unwrap();

        let (state, events) =
            validate_and_store_reveal(&state, key, P0, a, "na".into(), Timestamp(2)).unwrap();
        assert!(events.is_empty());
        assert_eq!(state.status, GameStatus::Waiting);

        let (state, events) =
            validate_and_store_reveal(&state, key, P1, b, "nb".into(), Timestamp(3)).unwrap();

        assert_eq!(state.status, GameStatus::Active);
        assert_eq!(state.player(P0).unwrap().species.as_deref(), Some("human"));
        assert_eq!(state.player(P1).unwrap().species.as_deref(), Some("meklar"));
        assert!(matches!(
            events.as_slice(),
            [GameEvent::SpeciesResolved { choices }] if choices.len() == 2
        ));
    }

    #[test]
    fn test_battle_plan_resolution_fills_turn_plans() {
        let mut state = GameState::new(GameId::new("g"));
        state.status = GameStatus::Active;
        state.data.turn_number = 1;
        let key = CommitKey::battle_plan(1);

        let a = RevealPayload::BattlePlan {
            plan: BattlePlan {
                stance: Stance::Attack,
            },
        };
        let b = RevealPayload::BattlePlan {
            plan: BattlePlan {
                stance: Stance::Defend,
            },
        };

        let state =
            store_commit(&state, key, P0, commitment_hash(&a, "na"), Timestamp(1)).unwrap();
        let state =
            store_commit(&state, key, P1, commitment_hash(&b, "nb"), Timestamp(1)).unwrap();
        let (state, _) =
            validate_and_store_reveal(&state, key, P0, a, "na".into(), Timestamp(2)).unwrap();
        let (state, events) =
            validate_and_store_reveal(&state, key, P1, b, "nb".into(), Timestamp(3)).unwrap();

        assert_eq!(state.data.turn.plans.get(&P0), Some(&Stance::Attack));
        assert_eq!(state.data.turn.plans.get(&P1), Some(&Stance::Defend));
        assert!(matches!(
            events.as_slice(),
            [GameEvent::BattlePlanResolved { plans }] if plans.len() == 2
        ));
    }
}

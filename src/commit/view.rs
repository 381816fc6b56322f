//! Per-player projections of game state.
//!
//! The full state value holds every commitment record, including
//! verified reveals that are not yet public knowledge. A projection
//! keeps the viewer's own records whole and reduces everyone else's to
//! a bare lifecycle tag, so no query path can leak another player's
//! payload before resolution. Everything else (seats, fleets, the turn
//! die, last turn's deltas) is public.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::player::{PlayerId, PlayerState};
use crate::core::state::{GameState, GameStatus, PlayerDelta, ShipInstance};
use crate::phases::sequence::PhaseKey;

use super::record::{CommitKey, CommitRecord, CommitState};

/// One commitment as seen by a viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", untagged)]
pub enum CommitView {
    /// The viewer's own record, complete.
    Own(CommitRecord),
    /// Someone else's record: lifecycle tag only.
    Other { state: CommitState },
}

/// What one player (or spectator) is allowed to see.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub viewer: PlayerId,
    pub status: GameStatus,
    pub turn_number: u32,
    pub phase: PhaseKey,

    /// Public seat data: health, lines, resolved species, clocks.
    pub players: Vec<PlayerState>,

    /// All fleets are public once built.
    pub fleets: BTreeMap<PlayerId, Vec<ShipInstance>>,

    /// The turn die, once rolled.
    pub dice: Option<u8>,

    /// Last turn's aggregated deltas.
    pub last_turn: BTreeMap<PlayerId, PlayerDelta>,

    /// Commitment records, filtered per viewer.
    pub commits: Vec<(CommitKey, BTreeMap<PlayerId, CommitView>)>,
}

/// Project the state for one viewer.
///
/// Spectators get the same projection as a player who owns no records.
#[must_use]
pub fn view_for(state: &GameState, viewer: PlayerId) -> PlayerView {
    let fleets = state
        .data
        .fleets
        .iter()
        .map(|(player, fleet)| (*player, fleet.iter().copied().collect()))
        .collect();

    let last_turn = state
        .data
        .last_turn
        .iter()
        .map(|(player, delta)| (*player, *delta))
        .collect();

    let mut commits: Vec<(CommitKey, BTreeMap<PlayerId, CommitView>)> = state
        .data
        .commits
        .iter()
        .map(|(key, records)| {
            let filtered = records
                .iter()
                .map(|(player, record)| {
                    let view = if *player == viewer {
                        CommitView::Own(record.clone())
                    } else {
                        CommitView::Other {
                            state: record.state(),
                        }
                    };
                    (*player, view)
                })
                .collect();
            (*key, filtered)
        })
        .collect();
    commits.sort_by_key(|(key, _)| (key.turn, key.decision as u8));

    PlayerView {
        viewer,
        status: state.status,
        turn_number: state.data.turn_number,
        phase: state.data.phase,
        players: state.players.iter().cloned().collect(),
        fleets,
        dice: state.data.turn.dice,
        last_turn,
        commits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::protocol::{commitment_hash, store_commit};
    use crate::commit::record::RevealPayload;
    use crate::core::state::{GameId, Timestamp};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    #[test]
    fn test_own_record_is_whole_others_are_tags() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);
        let payload = RevealPayload::Species {
            species: "human".into(),
        };
        let hash = commitment_hash(&payload, "n");

        let state = store_commit(&state, key, P0, hash.clone(), Timestamp(1)).unwrap();
        let state = store_commit(&state, key, P1, "other-hash".into(), Timestamp(1)).unwrap();

        let view = view_for(&state, P0);
        let (_, records) = &view.commits[0];

        match records.get(&P0).unwrap() {
            CommitView::Own(record) => assert_eq!(record.commit_hash.as_deref(), Some(&*hash)),
            CommitView::Other { .. } => panic!("viewer's own record was filtered"),
        }
        match records.get(&P1).unwrap() {
            CommitView::Other { state } => assert_eq!(*state, CommitState::Committed),
            CommitView::Own(_) => panic!("opponent record leaked"),
        }
    }

    #[test]
    fn test_view_never_serializes_another_players_payload() {
        let state = GameState::new(GameId::new("g"));
        let key = CommitKey::species(0);
        let secret = RevealPayload::Species {
            species: "silicoid".into(),
        };
        let state = store_commit(
            &state,
            key,
            P1,
            commitment_hash(&secret, "n"),
            Timestamp(1),
        )
        .unwrap();

        let json = serde_json::to_string(&view_for(&state, P0)).unwrap();
        assert!(!json.contains("silicoid"));
    }

    #[test]
    fn test_public_fields_present_for_spectators() {
        let mut state = GameState::new(GameId::new("g"));
        state.add_spectator(PlayerId::new(5));
        state.data.turn.dice = Some(4);

        let view = view_for(&state, PlayerId::new(5));
        assert_eq!(view.dice, Some(4));
        assert_eq!(view.players.len(), 3);
        assert_eq!(view.fleets.len(), 2);
    }
}

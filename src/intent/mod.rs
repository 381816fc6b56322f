//! The intent layer: the engine's single entry point for player input.
//!
//! Every action a player can take arrives as an [`Intent`] and goes
//! through [`apply_intent`], which validates the common gates (terminal
//! state, participation, game id, turn number) before dispatching. A
//! rejected intent is a pure no-op: the state value the caller holds is
//! unchanged and still authoritative.
//!
//! Readiness is the only pacing mechanism. When the last active player
//! readies up, the phase advances and the entered phase's server-side
//! work runs in the same call; the returned event list covers the whole
//! chain.

use serde::{Deserialize, Serialize};

use crate::commit::protocol::{store_commit, validate_and_store_reveal};
use crate::commit::record::{BattlePlan, CommitKey, RevealPayload};
use crate::core::error::{IntentError, Rejection};
use crate::core::event::GameEvent;
use crate::core::rng::DiceSource;
use crate::core::state::{
    GameId, GameOutcome, GameState, GameStatus, MatchResult, ShipId, ShipInstance,
    TerminalReason, Timestamp,
};
use crate::phases::machine::{advance_phase, on_enter_phase, AdvanceOptions};
use crate::phases::sequence::{BattlePhase, BuildPhase, PhaseKey};
use crate::core::player::PlayerId;
use crate::units::definition::UnitTypeId;
use crate::units::registry::UnitCatalog;

/// One player action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// The game this intent addresses.
    pub game_id: GameId,

    /// The turn the player believes is current; stale intents are
    /// rejected rather than misapplied.
    pub turn_number: u32,

    pub kind: IntentKind,
}

/// The action itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentKind {
    /// Commit a hidden species choice (setup only).
    CommitSpecies { hash: String },

    /// Reveal the species choice against the stored hash.
    RevealSpecies { species: String, nonce: String },

    /// Commit a hidden battle plan (declaration phase only).
    CommitBattlePlan { hash: String },

    /// Reveal the battle plan against the stored hash.
    RevealBattlePlan { plan: BattlePlan, nonce: String },

    /// Spend lines to build a ship (construction phase only).
    BuildShip { unit_type: UnitTypeId },

    /// Choose a dice trigger number for an owned ship.
    ChooseTriggerNumber { ship: ShipId, trigger: u8 },

    /// Declare readiness to leave the current phase.
    Ready,

    /// Resign the game.
    Concede,
}

/// A successfully applied intent: the next state and the events it
/// produced (including any chained phase work).
#[derive(Clone, Debug)]
pub struct IntentOutcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Validate and apply one intent.
pub fn apply_intent(
    state: &GameState,
    catalog: &dyn UnitCatalog,
    dice: &mut dyn DiceSource,
    player: PlayerId,
    intent: &Intent,
    now: Timestamp,
) -> Result<IntentOutcome, IntentError> {
    if state.is_finished() {
        return Err(Rejection::GameFinished.into());
    }
    if !state.is_participant(player) {
        return Err(Rejection::NotParticipant.into());
    }
    if intent.game_id != state.id {
        return Err(Rejection::BadPayload("intent addresses a different game".into()).into());
    }
    if intent.turn_number != state.data.turn_number {
        return Err(Rejection::BadTurn {
            expected: state.data.turn_number,
            got: intent.turn_number,
        }
        .into());
    }

    match &intent.kind {
        IntentKind::CommitSpecies { hash } => {
            require_phase(state, |p| matches!(p, PhaseKey::Setup(_)))?;
            let key = CommitKey::species(state.data.turn_number);
            let next = store_commit(state, key, player, hash.clone(), now)
                .map_err(IntentError::from)?;
            Ok(IntentOutcome {
                state: next,
                events: Vec::new(),
            })
        }

        IntentKind::RevealSpecies { species, nonce } => {
            require_phase(state, |p| matches!(p, PhaseKey::Setup(_)))?;
            let key = CommitKey::species(state.data.turn_number);
            let payload = RevealPayload::Species {
                species: species.clone(),
            };
            let (next, mut events) =
                validate_and_store_reveal(state, key, player, payload, nonce.clone(), now)
                    .map_err(IntentError::from)?;

            // The last species reveal activates the game; leave setup
            // immediately and run the first turn's entry work.
            if next.status == GameStatus::Active && matches!(next.data.phase, PhaseKey::Setup(_)) {
                let (chained, chained_events) = advance_and_enter(
                    &next,
                    catalog,
                    dice,
                    AdvanceOptions {
                        ignore_readiness: true,
                    },
                )?;
                events.extend(chained_events);
                return Ok(IntentOutcome {
                    state: chained,
                    events,
                });
            }
            Ok(IntentOutcome {
                state: next,
                events,
            })
        }

        IntentKind::CommitBattlePlan { hash } => {
            require_phase(state, |p| p == PhaseKey::Battle(BattlePhase::Declaration))?;
            let key = CommitKey::battle_plan(state.data.turn_number);
            let next = store_commit(state, key, player, hash.clone(), now)
                .map_err(IntentError::from)?;
            Ok(IntentOutcome {
                state: next,
                events: Vec::new(),
            })
        }

        IntentKind::RevealBattlePlan { plan, nonce } => {
            require_phase(state, |p| p == PhaseKey::Battle(BattlePhase::Declaration))?;
            let key = CommitKey::battle_plan(state.data.turn_number);
            let payload = RevealPayload::BattlePlan { plan: *plan };
            let (next, events) =
                validate_and_store_reveal(state, key, player, payload, nonce.clone(), now)
                    .map_err(IntentError::from)?;
            Ok(IntentOutcome {
                state: next,
                events,
            })
        }

        IntentKind::BuildShip { unit_type } => {
            require_phase(state, |p| p == PhaseKey::Build(BuildPhase::Construction))?;
            build_ship(state, catalog, player, *unit_type)
        }

        IntentKind::ChooseTriggerNumber { ship, trigger } => {
            if !(1..=6).contains(trigger) {
                return Err(
                    Rejection::BadPayload(format!("trigger {trigger} outside 1..=6")).into(),
                );
            }
            if state.ship(player, *ship).is_none() {
                return Err(Rejection::BadPayload(format!("no owned {ship}")).into());
            }
            let mut next = state.clone();
            next.data.power_memory.dice_triggers.insert(*ship, *trigger);
            Ok(IntentOutcome {
                state: next,
                events: Vec::new(),
            })
        }

        IntentKind::Ready => {
            if matches!(state.data.phase, PhaseKey::Setup(_)) {
                return Err(Rejection::BadPayload(
                    "setup is paced by species resolution, not readiness".into(),
                )
                .into());
            }
            let mut next = state.clone();
            next.data.turn.ready.insert(player);

            let all_ready = next
                .active_player_ids()
                .into_iter()
                .all(|p| next.data.turn.ready.contains(&p));
            if !all_ready {
                return Ok(IntentOutcome {
                    state: next,
                    events: Vec::new(),
                });
            }

            let (chained, events) =
                advance_and_enter(&next, catalog, dice, AdvanceOptions::default())?;
            Ok(IntentOutcome {
                state: chained,
                events,
            })
        }

        IntentKind::Concede => {
            let mut next = state.clone();
            let result = match state.opponent_of(player) {
                Some(winner) => MatchResult::Winner(winner),
                None => MatchResult::Draw,
            };
            let outcome = GameOutcome {
                result,
                reason: TerminalReason::Concession,
            };
            next.status = GameStatus::Finished;
            next.outcome = Some(outcome);
            let event = GameEvent::GameFinished { outcome };
            next.push_event(event.clone());
            Ok(IntentOutcome {
                state: next,
                events: vec![event],
            })
        }
    }
}

fn require_phase(
    state: &GameState,
    allowed: impl Fn(PhaseKey) -> bool,
) -> Result<(), IntentError> {
    if allowed(state.data.phase) {
        Ok(())
    } else {
        Err(Rejection::BadPayload(format!("not legal during {}", state.data.phase)).into())
    }
}

/// Advance the phase and run the entered phase's server-side work.
fn advance_and_enter(
    state: &GameState,
    catalog: &dyn UnitCatalog,
    dice: &mut dyn DiceSource,
    options: AdvanceOptions,
) -> Result<(GameState, Vec<GameEvent>), IntentError> {
    let advance = advance_phase(state, options).map_err(IntentError::from)?;
    let mut events = vec![GameEvent::PhaseAdvanced {
        from: advance.from,
        to: advance.to,
        turn: advance.state.data.turn_number,
    }];

    let entered = on_enter_phase(&advance.state, catalog, dice, advance.to)
        .map_err(IntentError::from)?;
    events.extend(entered.events);
    Ok((entered.state, events))
}

fn build_ship(
    state: &GameState,
    catalog: &dyn UnitCatalog,
    player: PlayerId,
    unit_type: UnitTypeId,
) -> Result<IntentOutcome, IntentError> {
    let Some(def) = catalog.get_unit(unit_type) else {
        return Err(Rejection::BadPayload(format!("unknown unit type {unit_type}")).into());
    };

    let lines = state
        .player(player)
        .map(|seat| seat.lines)
        .unwrap_or_default();
    if lines < def.cost_lines {
        return Err(Rejection::BadPayload(format!(
            "{} costs {} lines, have {lines}",
            def.name, def.cost_lines
        ))
        .into());
    }

    let mut next = state.clone();
    if let Some(seat) = next.player_mut(player) {
        seat.lines -= def.cost_lines;
    }
    let turn = next.data.turn_number;
    let id = next.data.alloc_ship_id();
    if let Some(fleet) = next.data.fleets.get_mut(&player) {
        fleet.push_back(ShipInstance::new(id, unit_type, turn));
    }
    let event = GameEvent::UnitCreated {
        owner: player,
        ship: id,
        unit_type,
        turn,
    };
    next.push_event(event.clone());
    Ok(IntentOutcome {
        state: next,
        events: vec![event],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::protocol::commitment_hash;
    use crate::core::rng::FixedDice;
    use crate::units::definition::UnitDefinition;
    use crate::units::registry::UnitRegistry;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);
    const FRIGATE: UnitTypeId = UnitTypeId::new(1);

    fn catalog() -> UnitRegistry {
        let mut registry = UnitRegistry::new();
        registry.register(UnitDefinition::new(FRIGATE, "Frigate", 3));
        registry
    }

    fn intent(state: &GameState, kind: IntentKind) -> Intent {
        Intent {
            game_id: state.id.clone(),
            turn_number: state.data.turn_number,
            kind,
        }
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(GameId::new("g"));
        state.status = GameStatus::Active;
        for player in state.active_player_ids() {
            state.player_mut(player).unwrap().species = Some("human".into());
        }
        state.data.turn_number = 1;
        state.data.phase = PhaseKey::Build(BuildPhase::Construction);
        state
    }

    fn apply(
        state: &GameState,
        player: PlayerId,
        kind: IntentKind,
    ) -> Result<IntentOutcome, IntentError> {
        let registry = catalog();
        let mut dice = FixedDice(4);
        let i = intent(state, kind);
        apply_intent(state, &registry, &mut dice, player, &i, Timestamp(100))
    }

    #[test]
    fn test_stale_turn_is_rejected() {
        let state = playing_state();
        let mut stale = intent(&state, IntentKind::Ready);
        stale.turn_number = 0;

        let err = apply_intent(
            &state,
            &catalog(),
            &mut FixedDice(1),
            P0,
            &stale,
            Timestamp(0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadTurn { expected: 1, got: 0 })
        ));
    }

    #[test]
    fn test_wrong_game_id_is_rejected() {
        let state = playing_state();
        let mut wrong = intent(&state, IntentKind::Ready);
        wrong.game_id = GameId::new("other");

        let err = apply_intent(
            &state,
            &catalog(),
            &mut FixedDice(1),
            P0,
            &wrong,
            Timestamp(0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));
    }

    #[test]
    fn test_spectator_is_rejected() {
        let mut state = playing_state();
        state.add_spectator(PlayerId::new(9));

        let err = apply(&state, PlayerId::new(9), IntentKind::Ready).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::NotParticipant)
        ));
    }

    #[test]
    fn test_finished_game_rejects_everything() {
        let mut state = playing_state();
        state.status = GameStatus::Finished;

        let err = apply(&state, P0, IntentKind::Ready).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::GameFinished)
        ));
    }

    #[test]
    fn test_build_ship_spends_lines() {
        let mut state = playing_state();
        state.player_mut(P0).unwrap().lines = 5;

        let outcome = apply(&state, P0, IntentKind::BuildShip { unit_type: FRIGATE }).unwrap();

        assert_eq!(outcome.state.player(P0).unwrap().lines, 2);
        assert_eq!(outcome.state.fleet(P0).len(), 1);
        assert!(matches!(
            outcome.events.as_slice(),
            [GameEvent::UnitCreated { owner, .. }] if *owner == P0
        ));
        // Caller's state untouched.
        assert!(state.fleet(P0).is_empty());
    }

    #[test]
    fn test_build_ship_requires_lines_and_phase() {
        let mut state = playing_state();
        state.player_mut(P0).unwrap().lines = 1;
        let err = apply(&state, P0, IntentKind::BuildShip { unit_type: FRIGATE }).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));

        state.player_mut(P0).unwrap().lines = 5;
        state.data.phase = PhaseKey::Build(BuildPhase::Draw);
        let err = apply(&state, P0, IntentKind::BuildShip { unit_type: FRIGATE }).unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));
    }

    #[test]
    fn test_choose_trigger_validates_range_and_ownership() {
        let mut state = playing_state();
        let ship = state.data.alloc_ship_id();
        state
            .data
            .fleets
            .get_mut(&P0)
            .unwrap()
            .push_back(ShipInstance::new(ship, FRIGATE, 1));

        let err = apply(&state, P0, IntentKind::ChooseTriggerNumber { ship, trigger: 7 })
            .unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));

        // Not the opponent's ship.
        let err = apply(&state, P1, IntentKind::ChooseTriggerNumber { ship, trigger: 3 })
            .unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));

        let outcome =
            apply(&state, P0, IntentKind::ChooseTriggerNumber { ship, trigger: 3 }).unwrap();
        assert_eq!(
            outcome.state.data.power_memory.dice_triggers.get(&ship),
            Some(&3)
        );
    }

    #[test]
    fn test_ready_advances_only_when_everyone_is() {
        let state = playing_state();

        let first = apply(&state, P0, IntentKind::Ready).unwrap();
        assert_eq!(
            first.state.data.phase,
            PhaseKey::Build(BuildPhase::Construction)
        );
        assert!(first.events.is_empty());

        let second = apply(&first.state, P1, IntentKind::Ready).unwrap();
        assert_eq!(second.state.data.phase, PhaseKey::Build(BuildPhase::Draw));
        assert!(matches!(
            second.events.first(),
            Some(GameEvent::PhaseAdvanced { .. })
        ));
    }

    #[test]
    fn test_species_flow_activates_and_enters_turn_one() {
        let state = GameState::new(GameId::new("g"));
        let a = RevealPayload::Species {
            species: "human".into(),
        };
        let b = RevealPayload::Species {
            species: "meklar".into(),
        };

        let state = apply(
            &state,
            P0,
            IntentKind::CommitSpecies {
                hash: commitment_hash(&a, "na"),
            },
        )
        .unwrap()
        .state;
        let state = apply(
            &state,
            P1,
            IntentKind::CommitSpecies {
                hash: commitment_hash(&b, "nb"),
            },
        )
        .unwrap()
        .state;

        let state = apply(
            &state,
            P0,
            IntentKind::RevealSpecies {
                species: "human".into(),
                nonce: "na".into(),
            },
        )
        .unwrap()
        .state;
        assert_eq!(state.status, GameStatus::Waiting);

        let outcome = apply(
            &state,
            P1,
            IntentKind::RevealSpecies {
                species: "meklar".into(),
                nonce: "nb".into(),
            },
        )
        .unwrap();

        let state = outcome.state;
        assert_eq!(state.status, GameStatus::Active);
        assert_eq!(state.data.turn_number, 1);
        assert_eq!(state.data.phase, PhaseKey::first_build());
        // FixedDice(4) rolled on entering the first phase.
        assert_eq!(state.data.turn.dice, Some(4));
        assert!(matches!(
            outcome.events.first(),
            Some(GameEvent::SpeciesResolved { .. })
        ));
    }

    #[test]
    fn test_battle_plan_commit_outside_declaration_is_rejected() {
        let state = playing_state();
        let err = apply(
            &state,
            P0,
            IntentKind::CommitBattlePlan { hash: "h".into() },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntentError::Rejected(Rejection::BadPayload(_))
        ));
    }

    #[test]
    fn test_concede_finishes_with_opponent_winning() {
        let state = playing_state();
        let outcome = apply(&state, P0, IntentKind::Concede).unwrap();

        assert!(outcome.state.is_finished());
        let result = outcome.state.outcome.unwrap();
        assert_eq!(result.result, MatchResult::Winner(P1));
        assert_eq!(result.reason, TerminalReason::Concession);
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let state = playing_state();
        let before = state.clone();
        let _ = apply(&state, P0, IntentKind::BuildShip { unit_type: UnitTypeId::new(99) });
        assert_eq!(state, before);
    }
}

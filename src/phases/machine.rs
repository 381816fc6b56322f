//! The phase state machine.
//!
//! Phase transitions have two halves. `advance_phase` validates the
//! gates (terminal state, species chosen, readiness) and moves the
//! phase pointer, handling the turn wrap from `battle.resolution` back
//! to `build.dice_roll`. `on_enter_phase` then runs the entered phase's
//! server-side work: the dice roll, the line grant, power resolution,
//! and at resolution the end-of-turn aggregation.
//!
//! Both halves take a state and return a new one; a rejected advance
//! leaves the caller's value authoritative.

use log::info;

use crate::core::error::{EngineError, Rejection};
use crate::core::event::GameEvent;
use crate::core::rng::DiceSource;
use crate::core::state::{GameState, TurnData};
use crate::effects::apply::{aggregate_pending, Applied};
use crate::effects::resolve::resolve_phase;
use crate::phases::sequence::{BuildPhase, PhaseKey};
use crate::units::registry::UnitCatalog;

/// Options for a phase advance.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvanceOptions {
    /// Skip the readiness gate (used when the engine itself forces the
    /// advance, e.g. leaving setup after species resolution).
    pub ignore_readiness: bool,
}

/// A successful phase transition.
#[derive(Clone, Debug)]
pub struct PhaseAdvance {
    pub state: GameState,
    pub from: PhaseKey,
    pub to: PhaseKey,
}

/// Move the phase pointer one step, without gates.
///
/// Leaving setup enters turn 1. Leaving resolution wraps to the next
/// turn: turn-scoped data resets, destroyed ships are swept, and each
/// species-chosen player receives the turn's clock increment. Readiness
/// is cleared on every advance.
#[must_use]
pub fn advance_phase_core(state: &GameState) -> PhaseAdvance {
    let from = state.data.phase;
    let mut next = state.clone();

    let to = match from.next_in_sequence() {
        Some(PhaseKey::Build(BuildPhase::DiceRoll)) | None => {
            // Entering play (from setup) or wrapping a finished turn.
            if from == PhaseKey::resolution() {
                wrap_turn(&mut next);
            } else {
                next.data.turn_number = 1;
            }
            PhaseKey::first_build()
        }
        Some(phase) => phase,
    };

    next.data.phase = to;
    next.data.turn.ready.clear();

    let turn = next.data.turn_number;
    info!("game {}: phase {} -> {} (turn {})", next.id, from, to, turn);
    next.push_event(GameEvent::PhaseAdvanced { from, to, turn });

    let next = sync_phase_fields(&next);
    PhaseAdvance {
        state: next,
        from,
        to,
    }
}

fn wrap_turn(state: &mut GameState) {
    state.data.turn_number += 1;
    let turn = state.data.turn_number;

    state.data.turn = TurnData::default();

    // Sweep ships destroyed last turn. The UNIT_DESTROYED event was
    // already logged when the destroy landed.
    for (_, fleet) in state.data.fleets.iter_mut() {
        fleet.retain(|s| !s.destroyed);
    }

    for seat in state.players.iter_mut().filter(|p| p.is_active()) {
        if seat.species.is_some() {
            seat.clock.apply_increment_for_turn(turn);
        }
    }
}

/// Gate-checked phase advance.
pub fn advance_phase(
    state: &GameState,
    options: AdvanceOptions,
) -> Result<PhaseAdvance, Rejection> {
    if state.is_finished() {
        return Err(Rejection::GameFinished);
    }

    if matches!(state.data.phase, PhaseKey::Setup(_)) {
        let all_chosen = state
            .players
            .iter()
            .filter(|p| p.is_active())
            .all(|p| p.species.is_some());
        if !all_chosen {
            return Err(Rejection::NotReadyPrecondition(
                "all players must choose a species".into(),
            ));
        }
    } else if !options.ignore_readiness {
        let ready = &state.data.turn.ready;
        let waiting: Vec<_> = state
            .active_player_ids()
            .into_iter()
            .filter(|p| !ready.contains(p))
            .collect();
        if !waiting.is_empty() {
            return Err(Rejection::NotReadyPrecondition(format!(
                "{} player(s) not ready",
                waiting.len()
            )));
        }
    }

    Ok(advance_phase_core(state))
}

/// Run the entered phase's server-side work.
///
/// Always resolves unit powers timed to the entered phase; dice-roll
/// and line-gain additionally run their rule-driven steps, and
/// resolution ends with pending aggregation.
pub fn on_enter_phase(
    state: &GameState,
    catalog: &dyn UnitCatalog,
    dice: &mut dyn DiceSource,
    to: PhaseKey,
) -> Result<Applied, EngineError> {
    let mut current = state.clone();
    let mut events = Vec::new();

    match to {
        PhaseKey::Build(BuildPhase::DiceRoll) => {
            let value = dice.roll_die();
            current.data.turn.dice = Some(value);
            let event = GameEvent::DiceRolled {
                turn: current.data.turn_number,
                value,
            };
            current.push_event(event.clone());
            events.push(event);
        }
        PhaseKey::Build(BuildPhase::LineGain) => {
            let Some(value) = current.data.turn.dice else {
                return Err(EngineError::CorruptState(
                    "line gain entered with no die rolled".into(),
                ));
            };
            let grant = i64::from(value);
            for player in current.active_player_ids() {
                if let Some(seat) = current.player_mut(player) {
                    seat.lines += grant;
                }
                let event = GameEvent::LinesGranted {
                    player,
                    amount: grant,
                };
                current.push_event(event.clone());
                events.push(event);
            }
        }
        _ => {}
    }

    let resolved = resolve_phase(&current, catalog, to);
    current = resolved.state;
    events.extend(resolved.events);

    if to == PhaseKey::resolution() {
        let aggregated = aggregate_pending(&current);
        current = aggregated.state;
        events.extend(aggregated.events);
    }

    Ok(Applied {
        state: current,
        events,
    })
}

/// Normalize the legacy mirror fields against their single sources.
///
/// `turn_number` mirrors `data.turn_number`; `phase_label`, when
/// present, mirrors the phase key's display form. Idempotent.
#[must_use]
pub fn sync_phase_fields(state: &GameState) -> GameState {
    let mut next = state.clone();
    next.turn_number = next.data.turn_number;
    if next.data.phase_label.is_some() {
        let label = next.data.phase.to_string();
        if next.data.phase_label.as_deref() != Some(&label) {
            next.data.phase_label = Some(label);
        }
    }
    next
}

//! The computed-effects engine.
//!
//! Derives effects that need live state: fleet counts, distinct-type
//! counts, grouped "per N" counts, tiered thresholds, dice-trigger
//! matches, once-only firing memory, built-this-turn tracking, and
//! charge costs. Everything the pure translator cannot know.
//!
//! Once-only powers are recorded in power memory *before* the effects
//! are returned, so re-resolving the same phase in the same turn (a
//! caller retry) can never double-fire them.

use log::{debug, warn};
use rustc_hash::FxHashSet;

use crate::core::player::PlayerId;
use crate::core::state::{GameState, OncePowerKey, ShipInstance};
use crate::phases::sequence::PhaseKey;
use crate::units::definition::{
    Activation, CountSpec, PowerAction, PowerAmount, PowerCondition, PowerTarget, StructuredPower,
};
use crate::units::registry::UnitCatalog;

use super::effect::{Effect, EffectIds, EffectKind, EffectSource, EffectTarget};

/// Derive state-dependent effects for the given phase.
///
/// Returns the state (updated with any once-only memory marks) and
/// the derived effects. Phases with no state-inspecting powers yield
/// the state unchanged and no effects.
#[must_use]
pub fn compute(
    state: &GameState,
    phase: PhaseKey,
    catalog: &dyn UnitCatalog,
    ids: &mut EffectIds,
) -> (GameState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    let turn = state.data.turn_number;
    let dice = state.data.turn.dice;

    for owner in state.active_player_ids() {
        let opponent = state.opponent_of(owner);
        let fleet = state.fleet(owner);
        let alive: Vec<&ShipInstance> = fleet.iter().filter(|s| !s.destroyed).collect();

        for ship in &alive {
            let Some(def) = catalog.get_unit(ship.unit_type) else {
                warn!("no definition for {}, skipping its powers", ship.unit_type);
                continue;
            };

            for (index, power) in def.powers.iter().enumerate() {
                let Some(timing) = &power.timing else {
                    continue;
                };
                if !timing.matches(phase) || !power.requires_state() {
                    continue;
                }

                let Some(action) = power.action else {
                    debug!("{} power #{index}: no action, skipping", ship.unit_type);
                    continue;
                };
                let Some(amount_spec) = &power.amount else {
                    debug!("{} power #{index}: no amount, skipping", ship.unit_type);
                    continue;
                };

                // Once-only gate: only on the creation turn, and only if
                // this (instance, type, slot) has never fired.
                if power.activation == Activation::OnceOnly {
                    if ship.created_turn != turn {
                        continue;
                    }
                    let key = OncePowerKey {
                        ship: ship.id,
                        unit_type: ship.unit_type,
                        power_index: index as u32,
                    };
                    if state.data.power_memory.fired.contains(&key)
                        || next.data.power_memory.fired.contains(&key)
                    {
                        continue;
                    }
                    next.data.power_memory.fired.insert(key);
                }

                // Dice trigger: the instance must have a chosen number
                // and the turn die must match it.
                if power.condition == Some(PowerCondition::DiceTrigger) {
                    let chosen = state.data.power_memory.dice_triggers.get(&ship.id).copied();
                    match (dice, chosen) {
                        (Some(rolled), Some(trigger)) if rolled == trigger => {}
                        _ => continue,
                    }
                }

                // Charge cost: skip when the instance cannot pay. The
                // spend itself is only emitted once the action effect
                // is known to fire, so charges are never drained for a
                // power that does nothing.
                let cost = power.charge_cost.unwrap_or(0);
                if cost > 0 && ship.charges < cost {
                    continue;
                }

                let amount = eval_amount(amount_spec, &alive, ship, turn);
                if amount <= 0 {
                    continue;
                }

                let Some(effect) =
                    build_effect(power, action, amount, owner, opponent, ship, phase, ids)
                else {
                    continue;
                };
                if cost > 0 {
                    effects.push(Effect::new(
                        ids.next_id(),
                        owner,
                        EffectSource::Unit {
                            ship: ship.id,
                            unit_type: ship.unit_type,
                        },
                        phase,
                        power.activation,
                        power.survives_destruction,
                        EffectTarget::Unit {
                            owner,
                            ship: ship.id,
                        },
                        EffectKind::SpendCharge,
                        i64::from(cost),
                    ));
                }
                effects.push(effect);
            }
        }
    }

    (next, effects)
}

/// Evaluate an amount formula against the owner's live fleet.
fn eval_amount(
    amount: &PowerAmount,
    alive: &[&ShipInstance],
    source: &ShipInstance,
    turn: u32,
) -> i64 {
    match amount {
        PowerAmount::Fixed(n) => *n,
        PowerAmount::Count(spec) => eval_count(spec, alive, source, turn),
        PowerAmount::PerGroup { count, group_size } => {
            if *group_size <= 0 {
                debug!("per-group power with group_size {group_size}, skipping");
                return 0;
            }
            eval_count(count, alive, source, turn) / group_size
        }
        PowerAmount::Tiered { count, thresholds } => {
            let value = eval_count(count, alive, source, turn);
            thresholds.iter().filter(|t| value >= **t).count() as i64
        }
    }
}

/// Evaluate a count spec over the owner's surviving units.
fn eval_count(spec: &CountSpec, alive: &[&ShipInstance], source: &ShipInstance, turn: u32) -> i64 {
    match spec {
        CountSpec::OwnUnits => alive.len() as i64,
        CountSpec::OwnOtherUnits => alive.iter().filter(|s| s.id != source.id).count() as i64,
        CountSpec::OwnUnitsOfType { unit_type } => {
            alive.iter().filter(|s| s.unit_type == *unit_type).count() as i64
        }
        CountSpec::DistinctOwnTypes => {
            let types: FxHashSet<_> = alive.iter().map(|s| s.unit_type).collect();
            types.len() as i64
        }
        CountSpec::BuiltThisTurn => alive.iter().filter(|s| s.created_turn == turn).count() as i64,
    }
}

/// Resolve target and kind for a derived power.
#[allow(clippy::too_many_arguments)]
fn build_effect(
    power: &StructuredPower,
    action: PowerAction,
    amount: i64,
    owner: PlayerId,
    opponent: Option<PlayerId>,
    source: &ShipInstance,
    phase: PhaseKey,
    ids: &mut EffectIds,
) -> Option<Effect> {
    let kind = match action {
        PowerAction::Damage => EffectKind::Damage,
        PowerAction::Heal => EffectKind::Heal,
        PowerAction::GainLines => EffectKind::GainLines,
        PowerAction::GainEnergy => EffectKind::GainEnergy,
        PowerAction::CreateUnit { unit_type } => EffectKind::CreateUnit { unit_type },
        PowerAction::Destroy => {
            debug!("{} derived destroy has no unit target, skipping", source.unit_type);
            return None;
        }
    };

    let target = match action {
        PowerAction::GainEnergy => EffectTarget::Unit {
            owner,
            ship: source.id,
        },
        _ => match power.target {
            PowerTarget::Owner => EffectTarget::Player(owner),
            PowerTarget::Opponent => EffectTarget::Player(opponent?),
        },
    };

    Some(Effect::new(
        ids.next_id(),
        owner,
        EffectSource::Unit {
            ship: source.id,
            unit_type: source.unit_type,
        },
        phase,
        power.activation,
        power.survives_destruction,
        target,
        kind,
        amount,
    ))
}

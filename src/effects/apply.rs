//! The effect applier and the end-of-turn aggregator.
//!
//! `apply` folds a batch of effects into state. Damage, healing and
//! line gains never touch authoritative player values here; they accrue
//! into [`PendingTurn`] and fold in exactly once, in
//! [`aggregate_pending`]. That deferral is what makes resolution order
//! irrelevant: any permutation of the same batch yields the same
//! end-of-turn totals.
//!
//! Survivability is judged against a snapshot of the destroyed set
//! taken when the batch arrives, so a destroy earlier in the batch
//! cannot silently cancel a sibling effect that was produced while the
//! source still stood.

use log::warn;
use rustc_hash::FxHashSet;

use crate::core::event::GameEvent;
use crate::core::player::PlayerId;
use crate::core::state::{
    GameOutcome, GameState, GameStatus, MatchResult, PlayerDelta, ShipId, ShipInstance,
    TerminalReason,
};

use super::effect::{Effect, EffectKind, EffectSource, EffectTarget};

/// Result of folding effects into state: the next state plus the events
/// describing what happened.
#[derive(Clone, Debug)]
pub struct Applied {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl Applied {
    /// A no-op application of the given state.
    #[must_use]
    pub fn unchanged(state: GameState) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }
}

/// Fold a batch of effects into state.
#[must_use]
pub fn apply(state: &GameState, effects: &[Effect]) -> Applied {
    let mut next = state.clone();
    let mut events = Vec::new();

    // Ships already destroyed when the batch arrived. Effects from a
    // ship destroyed within this same batch still land unless it was
    // dead at entry and the power does not survive destruction.
    let dead_at_entry: FxHashSet<ShipId> = state
        .data
        .fleets
        .values()
        .flat_map(|fleet| fleet.iter().filter(|s| s.destroyed).map(|s| s.id))
        .collect();

    for effect in effects {
        if let EffectSource::Unit { ship, .. } = &effect.source {
            if dead_at_entry.contains(ship) && !effect.survives_source_loss {
                continue;
            }
        }
        apply_one(&mut next, effect, &mut events);
    }

    next.push_events(&events);
    Applied {
        state: next,
        events,
    }
}

fn apply_one(state: &mut GameState, effect: &Effect, events: &mut Vec<GameEvent>) {
    match (effect.kind, effect.target) {
        (EffectKind::Damage, EffectTarget::Player(target)) => {
            state.data.pending.add_damage(target, effect.amount);
            events.push(GameEvent::DamageAccrued {
                target,
                amount: effect.amount,
            });
        }
        (EffectKind::Heal, EffectTarget::Player(target)) => {
            state.data.pending.add_heal(target, effect.amount);
            events.push(GameEvent::HealAccrued {
                target,
                amount: effect.amount,
            });
        }
        (EffectKind::GainLines, EffectTarget::Player(target)) => {
            state.data.pending.add_lines(target, effect.amount);
            events.push(GameEvent::LinesAccrued {
                target,
                amount: effect.amount,
            });
        }
        (EffectKind::Destroy, EffectTarget::Unit { owner, ship }) => {
            if let Some(instance) = state.ship_mut(owner, ship) {
                if !instance.destroyed {
                    instance.destroyed = true;
                    events.push(GameEvent::UnitDestroyed { owner, ship });
                }
            }
        }
        (EffectKind::CreateUnit { unit_type }, _) => {
            let turn = state.data.turn_number;
            let id = state.data.alloc_ship_id();
            if let Some(fleet) = state.data.fleets.get_mut(&effect.owner) {
                fleet.push_back(ShipInstance::new(id, unit_type, turn));
                events.push(GameEvent::UnitCreated {
                    owner: effect.owner,
                    ship: id,
                    unit_type,
                    turn,
                });
            }
        }
        (EffectKind::GainEnergy, EffectTarget::Unit { owner, ship }) => {
            if let Some(instance) = state.ship_mut(owner, ship) {
                let amount = u32::try_from(effect.amount).unwrap_or(0);
                instance.charges = instance.charges.saturating_add(amount);
                events.push(GameEvent::ChargeGained {
                    owner,
                    ship,
                    amount,
                });
            }
        }
        (EffectKind::SpendCharge, EffectTarget::Unit { owner, ship }) => {
            if let Some(instance) = state.ship_mut(owner, ship) {
                let amount = u32::try_from(effect.amount).unwrap_or(0);
                instance.charges = instance.charges.saturating_sub(amount);
                events.push(GameEvent::ChargeSpent {
                    owner,
                    ship,
                    amount,
                });
            }
        }
        (kind, target) => {
            warn!("effect {:?} has mismatched target {:?}, skipping", kind, target);
        }
    }
}

/// Fold the pending accumulator into authoritative player values.
///
/// This is the only place player health is ever written. Health clamps
/// to `0..=max_health`; a player at zero ends the game, both at zero is
/// a draw.
#[must_use]
pub fn aggregate_pending(state: &GameState) -> Applied {
    let mut next = state.clone();
    let mut events = Vec::new();

    let pending = std::mem::take(&mut next.data.pending);
    let active = next.active_player_ids();

    let mut deltas = Vec::with_capacity(active.len());
    for player in &active {
        let delta = PlayerDelta {
            player: *player,
            damage: pending.damage_for(*player),
            heal: pending.heal_for(*player),
            lines: pending.lines_for(*player),
        };
        deltas.push(delta);

        if let Some(seat) = next.player_mut(*player) {
            let healed = seat.health - delta.damage + delta.heal;
            seat.health = healed.clamp(0, seat.max_health);
            seat.lines += delta.lines;
        }
        next.data.last_turn.insert(*player, delta);
    }

    events.push(GameEvent::TurnResolved {
        deltas: deltas.clone(),
    });

    let depleted: Vec<PlayerId> = active
        .iter()
        .copied()
        .filter(|p| next.player(*p).is_some_and(|seat| seat.health <= 0))
        .collect();

    if !depleted.is_empty() {
        let result = if depleted.len() == active.len() {
            MatchResult::Draw
        } else {
            let survivor = active
                .iter()
                .copied()
                .find(|p| !depleted.contains(p));
            match survivor {
                Some(winner) => MatchResult::Winner(winner),
                None => MatchResult::Draw,
            }
        };
        let outcome = GameOutcome {
            result,
            reason: TerminalReason::HealthDepleted,
        };
        next.status = GameStatus::Finished;
        next.outcome = Some(outcome);
        events.push(GameEvent::GameFinished { outcome });
    }

    next.push_events(&events);
    Applied {
        state: next,
        events,
    }
}

//! The power translator.
//!
//! `translate` maps a unit's declared powers plus the current phase key
//! to effects. It is pure and deterministic: no state inspection beyond
//! the context passed in, no clock, no randomness. A power only
//! translates when it explicitly declares a matching phase key or
//! sub-phase name; incomplete powers are skipped with a debug log so
//! partially-specified catalog data degrades gracefully instead of
//! failing the resolution pass.
//!
//! Powers whose amount or condition needs live state (counts, tiers,
//! dice triggers, once-only memory, charge costs) are left untouched
//! here; the computed-effects engine owns those.

use log::debug;
use smallvec::SmallVec;

use crate::core::player::PlayerId;
use crate::core::state::ShipId;
use crate::phases::sequence::PhaseKey;
use crate::units::definition::{PowerAction, PowerAmount, PowerTarget, StructuredPower, UnitTypeId};

use super::effect::{Effect, EffectIds, EffectKind, EffectSource, EffectTarget};

/// Context for one unit's translation: ownership and opposition only,
/// never live state.
#[derive(Clone, Copy, Debug)]
pub struct TranslateContext {
    pub owner: PlayerId,
    pub opponent: Option<PlayerId>,
    pub ship: ShipId,
    pub unit_type: UnitTypeId,
}

/// Translate a unit's declared powers for the given phase.
#[must_use]
pub fn translate(
    powers: &[StructuredPower],
    phase: PhaseKey,
    ctx: &TranslateContext,
    ids: &mut EffectIds,
) -> SmallVec<[Effect; 4]> {
    let mut effects = SmallVec::new();

    for (index, power) in powers.iter().enumerate() {
        let Some(timing) = &power.timing else {
            debug!("{} power #{index}: no declared timing, skipping", ctx.unit_type);
            continue;
        };
        if !timing.matches(phase) {
            continue;
        }
        if power.requires_state() {
            // Computed-effects engine territory.
            continue;
        }

        let Some(action) = power.action else {
            debug!("{} power #{index}: no action, skipping", ctx.unit_type);
            continue;
        };
        let Some(PowerAmount::Fixed(amount)) = power.amount else {
            debug!("{} power #{index}: no amount, skipping", ctx.unit_type);
            continue;
        };

        let kind = match action {
            PowerAction::Damage => EffectKind::Damage,
            PowerAction::Heal => EffectKind::Heal,
            PowerAction::GainLines => EffectKind::GainLines,
            PowerAction::GainEnergy => EffectKind::GainEnergy,
            PowerAction::CreateUnit { unit_type } => EffectKind::CreateUnit { unit_type },
            PowerAction::Destroy => {
                debug!(
                    "{} power #{index}: destroy needs computed targeting, skipping",
                    ctx.unit_type
                );
                continue;
            }
        };

        let target = match action {
            // Energy always goes to the source instance.
            PowerAction::GainEnergy => EffectTarget::Unit {
                owner: ctx.owner,
                ship: ctx.ship,
            },
            _ => match power.target {
                PowerTarget::Owner => EffectTarget::Player(ctx.owner),
                PowerTarget::Opponent => match ctx.opponent {
                    Some(opponent) => EffectTarget::Player(opponent),
                    None => {
                        debug!("{} power #{index}: no opponent, skipping", ctx.unit_type);
                        continue;
                    }
                },
            },
        };

        effects.push(Effect::new(
            ids.next_id(),
            ctx.owner,
            EffectSource::Unit {
                ship: ctx.ship,
                unit_type: ctx.unit_type,
            },
            phase,
            power.activation,
            power.survives_destruction,
            target,
            kind,
            amount,
        ));
    }

    effects
}

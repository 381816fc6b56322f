//! Phase resolution: translate, compute, apply.
//!
//! One pass over every active player's surviving ships for the phase
//! being entered. Declared powers go through the pure translator,
//! state-dependent powers through the computed engine, and the combined
//! batch folds into state through the applier. A phase in which nothing
//! fires resolves to the unchanged state and an empty event list.

use log::warn;

use crate::core::state::GameState;
use crate::phases::sequence::PhaseKey;
use crate::units::registry::UnitCatalog;

use super::apply::{apply, Applied};
use super::computed::compute;
use super::effect::{Effect, EffectIds};
use super::translate::{translate, TranslateContext};

/// Resolve all unit powers that fire on the given phase.
#[must_use]
pub fn resolve_phase(state: &GameState, catalog: &dyn UnitCatalog, phase: PhaseKey) -> Applied {
    let mut ids = EffectIds::new();
    let mut effects: Vec<Effect> = Vec::new();

    for owner in state.active_player_ids() {
        let opponent = state.opponent_of(owner);
        for ship in state.fleet(owner).iter().filter(|s| !s.destroyed) {
            let Some(def) = catalog.get_unit(ship.unit_type) else {
                warn!("no definition for {}, skipping its powers", ship.unit_type);
                continue;
            };
            let ctx = TranslateContext {
                owner,
                opponent,
                ship: ship.id,
                unit_type: ship.unit_type,
            };
            effects.extend(translate(&def.powers, phase, &ctx, &mut ids));
        }
    }

    // Computed effects may mark once-only memory; that state flows
    // onward into the applier.
    let (marked, derived) = compute(state, phase, catalog, &mut ids);
    effects.extend(derived);

    if effects.is_empty() {
        return Applied::unchanged(marked);
    }
    apply(&marked, &effects)
}

//! Turn structure: the phase sequence, the state machine, and clocks.

pub mod clock;
pub mod machine;
pub mod sequence;

pub use clock::{ChessClock, BASE_TIME_MS, TURN_INCREMENT_MS};
pub use machine::{
    advance_phase, advance_phase_core, on_enter_phase, sync_phase_fields, AdvanceOptions,
    PhaseAdvance,
};
pub use sequence::{BattlePhase, BuildPhase, PhaseKey, SetupPhase, PHASE_SEQUENCE};

//! Hash commitments for hidden simultaneous choices.
//!
//! - `record`: lifecycle data (`Uncommitted -> Committed -> Revealed`)
//! - `protocol`: hashing, verification, atomic resolution
//! - `view`: per-player projections that never leak unresolved payloads

pub mod protocol;
pub mod record;
pub mod view;

pub use protocol::{
    all_revealed, commit_state, commitment_hash, has_committed, has_revealed, store_commit,
    validate_and_store_reveal,
};
pub use record::{
    BattlePlan, CommitKey, CommitRecord, CommitState, DecisionKind, RevealData, RevealPayload,
    Stance,
};
pub use view::{view_for, CommitView, PlayerView};

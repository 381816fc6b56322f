//! Error taxonomy.
//!
//! Two tiers, deliberately kept apart:
//!
//! - [`Rejection`]: expected validation failures (stale turn, bad hash,
//!   unmet readiness). Returned as values, never panicked; the caller's
//!   state is left untouched and the stable `code()` maps to a
//!   user-facing message.
//! - [`EngineError`]: programming-invariant violations. These indicate
//!   corrupted or externally tampered state and must propagate.

use thiserror::Error;

/// An expected, recoverable validation failure.
///
/// Every rejection carries a stable wire code for the presentation
/// layer. Rejected operations are no-ops: the state value the caller
/// holds is still authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The game has finished; no further intents apply.
    #[error("game is finished")]
    GameFinished,

    /// The acting session is not an active player in this game.
    #[error("not a participant in this game")]
    NotParticipant,

    /// The intent's turn number does not match the live turn.
    #[error("turn mismatch: expected {expected}, got {got}")]
    BadTurn { expected: u32, got: u32 },

    /// A reveal did not reproduce the stored commitment hash, or no
    /// commitment exists to reveal against.
    #[error("commitment hash mismatch")]
    HashMismatch,

    /// The intent payload is malformed or not legal right now.
    #[error("bad payload: {0}")]
    BadPayload(String),

    /// A phase-advance precondition (species chosen, readiness) is
    /// unmet. Retryable.
    #[error("precondition not met: {0}")]
    NotReadyPrecondition(String),
}

impl Rejection {
    /// Stable wire code for this rejection.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::GameFinished => "GAME_FINISHED",
            Rejection::NotParticipant => "NOT_PARTICIPANT",
            Rejection::BadTurn { .. } => "BAD_TURN",
            Rejection::HashMismatch => "HASH_MISMATCH",
            Rejection::BadPayload(_) => "BAD_PAYLOAD",
            Rejection::NotReadyPrecondition(_) => "NOT_READY_PRECONDITION",
        }
    }
}

/// A fatal invariant violation.
///
/// Reaching one of these means the state value is corrupt (or was
/// tampered with outside the engine); callers should abort the
/// operation, not retry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("corrupt state: {0}")]
    CorruptState(String),
}

/// Failure modes of intent application: recoverable rejection or fatal
/// invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Fatal(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_codes_are_stable() {
        assert_eq!(Rejection::GameFinished.code(), "GAME_FINISHED");
        assert_eq!(Rejection::NotParticipant.code(), "NOT_PARTICIPANT");
        assert_eq!(Rejection::BadTurn { expected: 2, got: 1 }.code(), "BAD_TURN");
        assert_eq!(Rejection::HashMismatch.code(), "HASH_MISMATCH");
        assert_eq!(Rejection::BadPayload("x".into()).code(), "BAD_PAYLOAD");
        assert_eq!(
            Rejection::NotReadyPrecondition("species".into()).code(),
            "NOT_READY_PRECONDITION"
        );
    }

    #[test]
    fn test_intent_error_wraps_both_tiers() {
        let rejected: IntentError = Rejection::HashMismatch.into();
        assert!(matches!(rejected, IntentError::Rejected(_)));

        let fatal: IntentError = EngineError::CorruptState("bad".into()).into();
        assert!(matches!(fatal, IntentError::Fatal(_)));
    }
}

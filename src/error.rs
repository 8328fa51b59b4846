// Error taxonomy for the draft and scoring core.
//
// Every variant is a local, recoverable condition returned to the caller.
// A failed call never leaves partial state behind: the engine and the
// roster store reject before they mutate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    /// Bad draft setup: zero participants, zero rounds, odd championship
    /// seat count, skipping in a league that disallows it, and similar
    /// configuration-level misuse.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The pick targets a movie that already has an owner in this league.
    #[error("movie `{movie_id}` is already owned by `{owner_id}`")]
    MovieUnavailable { movie_id: String, owner_id: String },

    /// A participant other than the one on the clock attempted to pick.
    #[error("not `{attempted_id}`'s turn; `{expected_id}` is on the clock")]
    TurnMismatch {
        expected_id: String,
        attempted_id: String,
    },

    /// An action was submitted after all rounds were consumed (or after
    /// the draft was aborted).
    #[error("draft is already complete")]
    DraftAlreadyComplete,

    /// Attempt to change the slot type of a roster slot whose movie has
    /// already been released.
    #[error("roster slot for movie `{movie_id}` is locked; released movies cannot change slot type")]
    LockedSlotMutation { movie_id: String },
}

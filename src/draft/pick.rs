// Individual pick representation and pick-log validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DraftError;

/// A single entry in the append-only pick log.
///
/// Created exactly once per turn, in turn order; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    /// 1-indexed overall sequence number. Monotonically increasing with no
    /// gaps across the whole draft.
    pub overall_number: u32,
    /// 0-indexed round this pick belongs to.
    pub round: usize,
    /// 0-indexed slot within the round.
    pub slot_in_round: usize,
    /// The participant whose turn it was.
    pub participant_id: String,
    /// The drafted movie, or `None` for a skipped turn (voluntary or
    /// timed out).
    pub movie_id: Option<String>,
    /// True when the turn clock expired rather than the participant acting.
    /// Distinguishes a timeout from a voluntary skip; bonus eligibility is
    /// a policy decision made by the engine, not encoded here.
    #[serde(default)]
    pub timed_out: bool,
    /// Seconds left on the clock when the pick was recorded. Zero for a
    /// timeout by definition.
    pub time_remaining: u32,
    pub timestamp: DateTime<Utc>,
}

impl Pick {
    /// Whether this entry represents a pass (voluntary skip or timeout)
    /// rather than a drafted movie.
    pub fn is_skip(&self) -> bool {
        self.movie_id.is_none()
    }
}

/// Validate the pick-log ordering invariant: `overall_number` runs 1, 2, 3…
/// with no gaps. Checked on restore so a corrupted persisted log is caught
/// before it is replayed.
pub fn validate_sequence(picks: &[Pick]) -> Result<(), DraftError> {
    for (i, pick) in picks.iter().enumerate() {
        let expected = (i + 1) as u32;
        if pick.overall_number != expected {
            return Err(DraftError::InvalidConfiguration(format!(
                "pick log out of sequence: position {i} has overall_number {} (expected {expected})",
                pick.overall_number
            )));
        }
    }
    Ok(())
}

// Snake draft order generation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Participant;
use crate::error::DraftError;

/// The complete pick order for a draft: one inner sequence of participant
/// indices per round.
///
/// Generated wholesale before the draft starts (and replaced wholesale on a
/// manual reshuffle); never mutated once picks are on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
    rounds: Vec<Vec<usize>>,
}

impl DraftOrder {
    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Number of participants (the length of every round).
    pub fn participants_per_round(&self) -> usize {
        self.rounds.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn rounds(&self) -> &[Vec<usize>] {
        &self.rounds
    }

    /// Participant index at (0-indexed) `round` / `slot`, if in bounds.
    pub fn participant_at(&self, round: usize, slot: usize) -> Option<usize> {
        self.rounds.get(round).and_then(|r| r.get(slot)).copied()
    }
}

/// Generate a snake order for the given participants over `total_rounds`.
///
/// Round 1 runs ascending `[0..n)`, round 2 descending, alternating. The
/// participant who picks last in a round picks first in the next, so the sum
/// of any participant's pick positions across two consecutive rounds is
/// constant.
pub fn generate(
    participants: &[Participant],
    total_rounds: usize,
) -> Result<DraftOrder, DraftError> {
    if participants.is_empty() {
        return Err(DraftError::InvalidConfiguration(
            "cannot generate a draft order for zero participants".into(),
        ));
    }
    if total_rounds == 0 {
        return Err(DraftError::InvalidConfiguration(
            "cannot generate a draft order for zero rounds".into(),
        ));
    }

    let n = participants.len();
    let rounds = (0..total_rounds)
        .map(|r| {
            if r % 2 == 0 {
                (0..n).collect()
            } else {
                (0..n).rev().collect()
            }
        })
        .collect();

    debug!(participants = n, total_rounds, "generated snake draft order");
    Ok(DraftOrder { rounds })
}

// Draft turn engine: turn derivation, pick legality, and the per-turn
// countdown.
//
// The engine is a strict sequential state machine. It is single-writer by
// construction (`&mut self`); the only background activity is the countdown,
// driven by an external scheduler through `tick()`. The race between a
// manual submission and timer expiry resolves to whichever call reaches the
// engine first -- the loser's expiry is a no-op and a late submission fails
// turn validation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::order::{self, DraftOrder};
use super::pick::{self, Pick};
use super::roster::RosterStore;
use super::Participant;
use crate::config::DraftConfig;
use crate::error::DraftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftPhase {
    NotStarted,
    InProgress,
    Complete,
    Aborted,
}

/// Who is on the clock, derived purely from the pick count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    OnClock {
        participant_index: usize,
        /// 0-indexed round.
        round: usize,
        /// 0-indexed slot within the round.
        slot_in_round: usize,
        /// 1-indexed overall pick number this turn will produce.
        overall_number: u32,
    },
    Complete,
}

/// Countdown state for the active turn. One logical timer exists at a time,
/// armed for a specific overall pick number; once that pick is recorded the
/// clock re-arms for the next turn and stale expiries become no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TurnClock {
    armed_for: u32,
    remaining: u32,
    paused: bool,
}

/// Per-participant aggregate view of the draft so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub participant_id: String,
    pub display_name: String,
    pub picks_made: usize,
    pub skips: usize,
    pub timeouts: usize,
    pub skip_bonus_total: f64,
}

#[derive(Debug)]
pub struct DraftEngine {
    participants: Vec<Participant>,
    order: DraftOrder,
    picks: Vec<Pick>,
    roster: Arc<RosterStore>,
    config: DraftConfig,
    phase: DraftPhase,
    clock: TurnClock,
    /// Running skip-bonus totals, indexed like `participants`. Tracked
    /// outside the pick log; a Pick records only what happened.
    skip_bonuses: Vec<f64>,
}

impl DraftEngine {
    /// Create an engine for the given participants and draft configuration.
    /// The snake order is generated immediately and stays fixed once the
    /// draft starts.
    pub fn new(
        participants: Vec<Participant>,
        config: DraftConfig,
        roster: Arc<RosterStore>,
    ) -> Result<Self, DraftError> {
        if config.pick_seconds == 0 {
            return Err(DraftError::InvalidConfiguration(
                "per-pick time limit must be at least one second".into(),
            ));
        }
        let order = order::generate(&participants, config.total_rounds)?;
        let n = participants.len();
        Ok(DraftEngine {
            participants,
            order,
            picks: Vec::new(),
            roster,
            phase: DraftPhase::NotStarted,
            clock: TurnClock {
                armed_for: 1,
                remaining: config.pick_seconds,
                paused: false,
            },
            skip_bonuses: vec![0.0; n],
            config,
        })
    }

    // --- Pre-draft setup ---

    /// Toggle a participant's ready flag. Only legal before the draft starts.
    pub fn set_ready(&mut self, participant_id: &str, ready: bool) -> Result<(), DraftError> {
        if self.phase != DraftPhase::NotStarted {
            return Err(DraftError::InvalidConfiguration(
                "ready flags are frozen once the draft starts".into(),
            ));
        }
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                DraftError::InvalidConfiguration(format!(
                    "unknown participant `{participant_id}`"
                ))
            })?;
        participant.ready = ready;
        Ok(())
    }

    pub fn all_ready(&self) -> bool {
        self.participants.iter().all(|p| p.ready)
    }

    /// Replace the pick order wholesale (manual reshuffle). Only legal
    /// before the draft starts; the new order must cover the same
    /// participants and rounds.
    pub fn set_order(&mut self, order: DraftOrder) -> Result<(), DraftError> {
        if self.phase != DraftPhase::NotStarted {
            return Err(DraftError::InvalidConfiguration(
                "the pick order cannot change once the draft starts".into(),
            ));
        }
        if order.total_rounds() != self.config.total_rounds
            || order.participants_per_round() != self.participants.len()
        {
            return Err(DraftError::InvalidConfiguration(
                "replacement order does not match the league's participants and rounds".into(),
            ));
        }
        self.order = order;
        Ok(())
    }

    /// Begin the draft. Requires every participant to be ready; arms the
    /// clock for pick 1.
    pub fn start(&mut self) -> Result<(), DraftError> {
        match self.phase {
            DraftPhase::NotStarted => {}
            DraftPhase::InProgress => {
                return Err(DraftError::InvalidConfiguration(
                    "draft is already in progress".into(),
                ))
            }
            DraftPhase::Complete | DraftPhase::Aborted => {
                return Err(DraftError::DraftAlreadyComplete)
            }
        }
        let unready: Vec<&str> = self
            .participants
            .iter()
            .filter(|p| !p.ready)
            .map(|p| p.id.as_str())
            .collect();
        if !unready.is_empty() {
            return Err(DraftError::InvalidConfiguration(format!(
                "cannot start with unready participants: {}",
                unready.join(", ")
            )));
        }
        self.phase = DraftPhase::InProgress;
        self.clock = TurnClock {
            armed_for: 1,
            remaining: self.config.pick_seconds,
            paused: false,
        };
        info!(
            participants = self.participants.len(),
            rounds = self.config.total_rounds,
            "draft started"
        );
        Ok(())
    }

    // --- Turn derivation ---

    /// Whose turn it is, computed purely from the number of recorded picks.
    /// Deterministic and idempotent: the same pick count always yields the
    /// same turn.
    pub fn current_turn(&self) -> Turn {
        let k = self.picks.len();
        let n = self.participants.len();
        if k >= self.config.total_rounds * n {
            return Turn::Complete;
        }
        let round = k / n;
        let slot_in_round = k % n;
        let participant_index = self
            .order
            .participant_at(round, slot_in_round)
            .unwrap_or(slot_in_round);
        Turn::OnClock {
            participant_index,
            round,
            slot_in_round,
            overall_number: (k + 1) as u32,
        }
    }

    /// The participant currently on the clock, if the draft is not done.
    pub fn participant_on_clock(&self) -> Option<&Participant> {
        match self.current_turn() {
            Turn::OnClock {
                participant_index, ..
            } => self.participants.get(participant_index),
            Turn::Complete => None,
        }
    }

    // --- Turn actions ---

    /// Submit a pick for the participant on the clock.
    ///
    /// Validation order: draft phase, turn identity, then the atomic
    /// ownership claim. Nothing is mutated until every check has passed, so
    /// a failed call leaves the engine exactly as it was.
    pub fn submit_pick(
        &mut self,
        participant_id: &str,
        movie_id: &str,
        time_remaining: u32,
    ) -> Result<Pick, DraftError> {
        self.require_in_progress()?;
        let (participant_index, round, slot_in_round, overall_number) = self.on_clock()?;

        let expected = &self.participants[participant_index];
        if expected.id != participant_id {
            return Err(DraftError::TurnMismatch {
                expected_id: expected.id.clone(),
                attempted_id: participant_id.to_string(),
            });
        }

        self.roster
            .record(movie_id, participant_id, round, overall_number)?;

        let pick = Pick {
            overall_number,
            round,
            slot_in_round,
            participant_id: participant_id.to_string(),
            movie_id: Some(movie_id.to_string()),
            timed_out: false,
            time_remaining: time_remaining.min(self.config.pick_seconds),
            timestamp: Utc::now(),
        };
        info!(
            overall_number,
            round,
            participant_id,
            movie_id,
            "pick recorded"
        );
        self.picks.push(pick.clone());
        self.advance_clock();
        Ok(pick)
    }

    /// Voluntarily pass on the current turn, crediting the skip bonus.
    /// Only legal when the league's draft type allows skipping.
    pub fn skip_turn(&mut self, time_remaining: u32) -> Result<Pick, DraftError> {
        self.require_in_progress()?;
        if !self.config.allow_skips {
            return Err(DraftError::InvalidConfiguration(
                "skipping is not allowed in this league".into(),
            ));
        }
        let (participant_index, round, slot_in_round, overall_number) = self.on_clock()?;

        let participant_id = self.participants[participant_index].id.clone();
        let pick = Pick {
            overall_number,
            round,
            slot_in_round,
            participant_id: participant_id.clone(),
            movie_id: None,
            timed_out: false,
            time_remaining: time_remaining.min(self.config.pick_seconds),
            timestamp: Utc::now(),
        };
        self.skip_bonuses[participant_index] += self.config.skip_bonus_amount;
        info!(
            overall_number,
            participant_id,
            bonus = self.config.skip_bonus_amount,
            "turn skipped"
        );
        self.picks.push(pick.clone());
        self.advance_clock();
        Ok(pick)
    }

    /// Advance the countdown by `elapsed_secs`. Fires expiry exactly once
    /// when the clock reaches zero; returns the expiry pick when that
    /// happens. Paused clocks do not tick.
    pub fn tick(&mut self, elapsed_secs: u32) -> Option<Pick> {
        if self.phase != DraftPhase::InProgress || self.clock.paused {
            return None;
        }
        self.clock.remaining = self.clock.remaining.saturating_sub(elapsed_secs);
        if self.clock.remaining == 0 {
            self.expire_turn()
        } else {
            None
        }
    }

    /// Fire the timeout for the turn the clock is armed for.
    ///
    /// Idempotent: once the turn has advanced (by submission, skip, or a
    /// prior expiry) the clock re-arms with a fresh countdown, so a second
    /// trigger is a no-op rather than a double-skip. A timeout records a
    /// skipped pick with `timed_out = true` and `time_remaining = 0`; the
    /// skip bonus is only credited when the league's policy says a timeout
    /// earns it (off by default).
    pub fn expire_turn(&mut self) -> Option<Pick> {
        if self.phase != DraftPhase::InProgress || self.clock.remaining != 0 {
            return None;
        }
        let (participant_index, round, slot_in_round, overall_number) = match self.current_turn() {
            Turn::OnClock {
                participant_index,
                round,
                slot_in_round,
                overall_number,
            } => (participant_index, round, slot_in_round, overall_number),
            Turn::Complete => return None,
        };
        if self.clock.armed_for != overall_number {
            // Stale trigger for a turn that already advanced.
            return None;
        }

        let participant_id = self.participants[participant_index].id.clone();
        if self.config.skip_bonus_on_timeout {
            self.skip_bonuses[participant_index] += self.config.skip_bonus_amount;
        }
        let pick = Pick {
            overall_number,
            round,
            slot_in_round,
            participant_id: participant_id.clone(),
            movie_id: None,
            timed_out: true,
            time_remaining: 0,
            timestamp: Utc::now(),
        };
        warn!(overall_number, participant_id, "turn expired with no pick");
        self.picks.push(pick.clone());
        self.advance_clock();
        Some(pick)
    }

    /// Suspend the countdown without resetting it.
    pub fn pause(&mut self) {
        if self.phase == DraftPhase::InProgress {
            self.clock.paused = true;
        }
    }

    /// Resume a paused countdown from where it stopped.
    pub fn resume(&mut self) {
        self.clock.paused = false;
    }

    /// Abort an in-progress draft: the clock stops and the pick log is
    /// frozen as the final append-only record. No picks are rolled back.
    pub fn abort(&mut self) -> Result<(), DraftError> {
        match self.phase {
            DraftPhase::InProgress => {
                self.phase = DraftPhase::Aborted;
                info!(picks = self.picks.len(), "draft aborted");
                Ok(())
            }
            DraftPhase::NotStarted => Err(DraftError::InvalidConfiguration(
                "cannot abort a draft that has not started".into(),
            )),
            DraftPhase::Complete | DraftPhase::Aborted => Err(DraftError::DraftAlreadyComplete),
        }
    }

    // --- Crash recovery ---

    /// Rebuild engine state by replaying a persisted pick log through the
    /// normal validation path. Everything is checked before anything is
    /// applied, so a corrupt log leaves the engine untouched.
    pub fn restore(&mut self, picks: Vec<Pick>) -> Result<(), DraftError> {
        if self.phase != DraftPhase::NotStarted {
            return Err(DraftError::InvalidConfiguration(
                "restore is only legal on a fresh engine".into(),
            ));
        }
        pick::validate_sequence(&picks)?;

        let n = self.participants.len();
        let total = self.config.total_rounds * n;
        if picks.len() > total {
            return Err(DraftError::InvalidConfiguration(format!(
                "pick log has {} entries but the draft only has {total} turns",
                picks.len()
            )));
        }

        // Validation pass: every entry must match the order, and no movie
        // may appear twice.
        let mut seen_movies = HashSet::new();
        for (k, entry) in picks.iter().enumerate() {
            let round = k / n;
            let slot = k % n;
            let expected_idx = self.order.participant_at(round, slot).unwrap_or(slot);
            let expected_id = &self.participants[expected_idx].id;
            if entry.round != round || entry.slot_in_round != slot {
                return Err(DraftError::InvalidConfiguration(format!(
                    "pick {} does not match the draft order (expected round {round}, slot {slot})",
                    entry.overall_number
                )));
            }
            if &entry.participant_id != expected_id {
                return Err(DraftError::InvalidConfiguration(format!(
                    "pick {} belongs to `{}` but the order expects `{expected_id}`",
                    entry.overall_number, entry.participant_id
                )));
            }
            if let Some(movie_id) = &entry.movie_id {
                if !seen_movies.insert(movie_id.clone()) {
                    return Err(DraftError::InvalidConfiguration(format!(
                        "movie `{movie_id}` appears in more than one pick"
                    )));
                }
            }
        }

        // Apply pass: rebuild ownership and bonus aggregates.
        for entry in &picks {
            match &entry.movie_id {
                Some(movie_id) => {
                    self.roster.record(
                        movie_id,
                        &entry.participant_id,
                        entry.round,
                        entry.overall_number,
                    )?;
                }
                None => {
                    let credited = if entry.timed_out {
                        self.config.skip_bonus_on_timeout
                    } else {
                        true
                    };
                    if credited {
                        let idx = self.order.participant_at(entry.round, entry.slot_in_round);
                        if let Some(idx) = idx {
                            self.skip_bonuses[idx] += self.config.skip_bonus_amount;
                        }
                    }
                }
            }
        }

        let count = picks.len();
        self.picks = picks;
        if count == total {
            self.phase = DraftPhase::Complete;
        } else {
            self.phase = DraftPhase::InProgress;
            self.clock = TurnClock {
                armed_for: (count + 1) as u32,
                remaining: self.config.pick_seconds,
                paused: false,
            };
        }
        info!(restored = count, phase = ?self.phase, "draft state restored from pick log");
        Ok(())
    }

    // --- Accessors ---

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn order(&self) -> &DraftOrder {
        &self.order
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn roster(&self) -> &Arc<RosterStore> {
        &self.roster
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    /// Seconds remaining on the active turn's clock.
    pub fn time_remaining(&self) -> u32 {
        self.clock.remaining
    }

    /// Advisory paused flag. Submissions are still accepted while paused;
    /// honoring the pause is the caller's choice.
    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    pub fn skip_bonus_total(&self, participant_id: &str) -> Option<f64> {
        self.participants
            .iter()
            .position(|p| p.id == participant_id)
            .map(|idx| self.skip_bonuses[idx])
    }

    /// Per-participant aggregates over the pick log.
    pub fn summaries(&self) -> Vec<ParticipantSummary> {
        self.participants
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let mine = self.picks.iter().filter(|k| k.participant_id == p.id);
                let (mut picks_made, mut skips, mut timeouts) = (0, 0, 0);
                for pick in mine {
                    if pick.timed_out {
                        timeouts += 1;
                    } else if pick.is_skip() {
                        skips += 1;
                    } else {
                        picks_made += 1;
                    }
                }
                ParticipantSummary {
                    participant_id: p.id.clone(),
                    display_name: p.display_name.clone(),
                    picks_made,
                    skips,
                    timeouts,
                    skip_bonus_total: self.skip_bonuses[idx],
                }
            })
            .collect()
    }

    // --- Internals ---

    fn require_in_progress(&self) -> Result<(), DraftError> {
        match self.phase {
            DraftPhase::InProgress => Ok(()),
            DraftPhase::NotStarted => Err(DraftError::InvalidConfiguration(
                "draft has not started".into(),
            )),
            DraftPhase::Complete | DraftPhase::Aborted => Err(DraftError::DraftAlreadyComplete),
        }
    }

    fn on_clock(&self) -> Result<(usize, usize, usize, u32), DraftError> {
        match self.current_turn() {
            Turn::OnClock {
                participant_index,
                round,
                slot_in_round,
                overall_number,
            } => Ok((participant_index, round, slot_in_round, overall_number)),
            Turn::Complete => Err(DraftError::DraftAlreadyComplete),
        }
    }

    /// After a recorded turn: arm the clock for the next pick, or close out
    /// the draft. The optional inter-pick pause starts the next clock
    /// paused; resuming is the caller's responsibility and submissions are
    /// never blocked by it.
    fn advance_clock(&mut self) {
        let total = self.config.total_rounds * self.participants.len();
        if self.picks.len() >= total {
            self.phase = DraftPhase::Complete;
            info!(picks = self.picks.len(), "draft complete");
            return;
        }
        self.clock = TurnClock {
            armed_for: (self.picks.len() + 1) as u32,
            remaining: self.config.pick_seconds,
            paused: self.config.pause_between_picks_seconds > 0,
        };
    }
}

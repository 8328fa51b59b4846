// Exclusive-ownership ledger and starter/reserve slot tracking.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DraftError;
use crate::movie::DraftableMovie;

/// How and when a movie was claimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    pub participant_id: String,
    /// 0-indexed round of the claiming pick.
    pub round: usize,
    /// Overall sequence number of the claiming pick.
    pub overall_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotType {
    Starter,
    Reserve,
}

/// One of the two scoring windows (summer, awards season).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    One,
    Two,
}

/// A movie's placement on a participant's roster for one period.
///
/// `locked` becomes true irreversibly once the movie's release date has
/// passed; after that the slot type can never change in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSlot {
    pub movie_id: String,
    pub participant_id: String,
    pub slot_type: SlotType,
    pub period: Period,
    pub locked: bool,
}

#[derive(Debug, Default)]
struct StoreInner {
    owners: HashMap<String, Ownership>,
    slots: Vec<RosterSlot>,
}

/// Exclusive-ownership ledger: which movie belongs to which participant.
///
/// `record` is the single atomic claim point. The check-then-insert runs
/// under one lock, so two concurrent claims for the same movie can never
/// both succeed; share the store across tasks as `Arc<RosterStore>`.
#[derive(Debug, Default)]
pub struct RosterStore {
    inner: Mutex<StoreInner>,
}

impl RosterStore {
    pub fn new() -> Self {
        RosterStore::default()
    }

    pub fn is_owned(&self, movie_id: &str) -> bool {
        self.lock().owners.contains_key(movie_id)
    }

    pub fn owner_of(&self, movie_id: &str) -> Option<String> {
        self.lock()
            .owners
            .get(movie_id)
            .map(|o| o.participant_id.clone())
    }

    pub fn ownership_of(&self, movie_id: &str) -> Option<Ownership> {
        self.lock().owners.get(movie_id).cloned()
    }

    /// Atomically claim a movie for a participant. Fails with
    /// `MovieUnavailable` if any prior claim exists; the store is unchanged
    /// on failure.
    pub fn record(
        &self,
        movie_id: &str,
        participant_id: &str,
        round: usize,
        overall_number: u32,
    ) -> Result<(), DraftError> {
        let mut inner = self.lock();
        match inner.owners.entry(movie_id.to_string()) {
            Entry::Occupied(existing) => Err(DraftError::MovieUnavailable {
                movie_id: movie_id.to_string(),
                owner_id: existing.get().participant_id.clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(Ownership {
                    participant_id: participant_id.to_string(),
                    round,
                    overall_number,
                });
                debug!(movie_id, participant_id, overall_number, "movie claimed");
                Ok(())
            }
        }
    }

    /// Filter a pool down to the movies no one owns yet. Read-only.
    pub fn available_from(&self, pool: &[DraftableMovie]) -> Vec<DraftableMovie> {
        let inner = self.lock();
        pool.iter()
            .filter(|m| !inner.owners.contains_key(&m.id))
            .cloned()
            .collect()
    }

    pub fn owned_count(&self) -> usize {
        self.lock().owners.len()
    }

    // --- Roster slot ledger ---

    /// Place an owned movie into a starter or reserve slot for a period.
    /// Slot capacity (5 starters + 5 reserves per participant per period)
    /// is enforced by the collaborator UI, not here.
    pub fn assign_slot(
        &self,
        movie_id: &str,
        participant_id: &str,
        slot_type: SlotType,
        period: Period,
    ) {
        let mut inner = self.lock();
        inner.slots.push(RosterSlot {
            movie_id: movie_id.to_string(),
            participant_id: participant_id.to_string(),
            slot_type,
            period,
            locked: false,
        });
    }

    /// Change a slot between starter and reserve. Rejected with
    /// `LockedSlotMutation` once the slot is locked, in either direction.
    pub fn set_slot_type(
        &self,
        movie_id: &str,
        period: Period,
        slot_type: SlotType,
    ) -> Result<(), DraftError> {
        let mut inner = self.lock();
        let slot = inner
            .slots
            .iter_mut()
            .find(|s| s.movie_id == movie_id && s.period == period);
        match slot {
            Some(slot) if slot.locked => Err(DraftError::LockedSlotMutation {
                movie_id: movie_id.to_string(),
            }),
            Some(slot) => {
                slot.slot_type = slot_type;
                Ok(())
            }
            None => Err(DraftError::InvalidConfiguration(format!(
                "no roster slot for movie `{movie_id}` in the requested period"
            ))),
        }
    }

    /// Lock every slot whose movie has been released as of `as_of`.
    /// Locking is irreversible. Returns the number of newly locked slots.
    pub fn lock_released(&self, pool: &[DraftableMovie], as_of: NaiveDate) -> usize {
        let mut inner = self.lock();
        let mut newly_locked = 0;
        for slot in inner.slots.iter_mut().filter(|s| !s.locked) {
            let released = pool
                .iter()
                .find(|m| m.id == slot.movie_id)
                .is_some_and(|m| m.is_released(as_of));
            if released {
                slot.locked = true;
                newly_locked += 1;
            }
        }
        if newly_locked > 0 {
            info!(newly_locked, %as_of, "locked roster slots for released movies");
        }
        newly_locked
    }

    pub fn slots(&self) -> Vec<RosterSlot> {
        self.lock().slots.clone()
    }

    /// All slots for one participant in one period.
    pub fn slots_for(&self, participant_id: &str, period: Period) -> Vec<RosterSlot> {
        self.lock()
            .slots
            .iter()
            .filter(|s| s.participant_id == participant_id && s.period == period)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("roster store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn movie(id: &str, release: &str) -> DraftableMovie {
        DraftableMovie {
            id: id.into(),
            title: format!("Movie {id}"),
            release_date: release.parse().unwrap(),
            budget: 40.0,
            projected_domestic: 100.0,
            projected_worldwide: 250.0,
            projected_opening: 35.0,
            box_office: 0.0,
            imdb_rating: None,
            draft_rank: 1,
            confidence: 0.5,
        }
    }

    #[test]
    fn record_then_lookup() {
        let store = RosterStore::new();
        assert!(!store.is_owned("m1"));
        store.record("m1", "p1", 0, 1).unwrap();
        assert!(store.is_owned("m1"));
        assert_eq!(store.owner_of("m1"), Some("p1".to_string()));
        assert_eq!(store.owner_of("m2"), None);
        let own = store.ownership_of("m1").unwrap();
        assert_eq!(own.overall_number, 1);
    }

    #[test]
    fn second_claim_rejected() {
        let store = RosterStore::new();
        store.record("m1", "p1", 0, 1).unwrap();
        let err = store.record("m1", "p2", 0, 2).unwrap_err();
        match err {
            DraftError::MovieUnavailable { movie_id, owner_id } => {
                assert_eq!(movie_id, "m1");
                assert_eq!(owner_id, "p1");
            }
            other => panic!("unexpected error: {other}"),
        }
        // First claim still stands.
        assert_eq!(store.owner_of("m1"), Some("p1".to_string()));
    }

    #[test]
    fn concurrent_claims_exactly_one_succeeds() {
        let store = Arc::new(RosterStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.record("m1", &format!("p{i}"), 0, 1).is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(successes, 1);
        assert!(store.is_owned("m1"));
    }

    #[test]
    fn available_from_filters_owned() {
        let store = RosterStore::new();
        let pool = vec![movie("m1", "2026-06-01"), movie("m2", "2026-07-01")];
        store.record("m1", "p1", 0, 1).unwrap();
        let available = store.available_from(&pool);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "m2");
    }

    #[test]
    fn slot_type_change_before_lock() {
        let store = RosterStore::new();
        store.assign_slot("m1", "p1", SlotType::Reserve, Period::One);
        store
            .set_slot_type("m1", Period::One, SlotType::Starter)
            .unwrap();
        assert_eq!(store.slots()[0].slot_type, SlotType::Starter);
    }

    #[test]
    fn locked_slot_rejects_promotion_and_demotion() {
        let store = RosterStore::new();
        let pool = vec![movie("m1", "2026-06-01")];
        store.assign_slot("m1", "p1", SlotType::Starter, Period::One);
        let locked = store.lock_released(&pool, "2026-06-02".parse().unwrap());
        assert_eq!(locked, 1);

        let err = store
            .set_slot_type("m1", Period::One, SlotType::Reserve)
            .unwrap_err();
        assert!(matches!(err, DraftError::LockedSlotMutation { .. }));
        let err = store
            .set_slot_type("m1", Period::One, SlotType::Starter)
            .unwrap_err();
        assert!(matches!(err, DraftError::LockedSlotMutation { .. }));
    }

    #[test]
    fn lock_released_skips_unreleased_and_is_idempotent() {
        let store = RosterStore::new();
        let pool = vec![movie("m1", "2026-06-01"), movie("m2", "2026-12-25")];
        store.assign_slot("m1", "p1", SlotType::Starter, Period::One);
        store.assign_slot("m2", "p1", SlotType::Reserve, Period::Two);

        let as_of = "2026-07-01".parse().unwrap();
        assert_eq!(store.lock_released(&pool, as_of), 1);
        assert_eq!(store.lock_released(&pool, as_of), 0);

        let slots = store.slots();
        assert!(slots.iter().find(|s| s.movie_id == "m1").unwrap().locked);
        assert!(!slots.iter().find(|s| s.movie_id == "m2").unwrap().locked);
        // The unreleased movie's slot is still mutable.
        store
            .set_slot_type("m2", Period::Two, SlotType::Starter)
            .unwrap();
    }

    #[test]
    fn slots_for_filters_by_participant_and_period() {
        let store = RosterStore::new();
        store.assign_slot("m1", "p1", SlotType::Starter, Period::One);
        store.assign_slot("m2", "p1", SlotType::Reserve, Period::Two);
        store.assign_slot("m3", "p2", SlotType::Starter, Period::One);

        let slots = store.slots_for("p1", Period::One);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].movie_id, "m1");
    }

    #[test]
    fn slot_change_for_unknown_movie_errors() {
        let store = RosterStore::new();
        assert!(store
            .set_slot_type("ghost", Period::One, SlotType::Starter)
            .is_err());
    }
}

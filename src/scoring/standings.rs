// Standings aggregation: per-roster totals, ranking, and championship
// gating.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::score::ScoreRecord;
use crate::draft::roster::{RosterSlot, SlotType};
use crate::error::DraftError;
use crate::movie::DraftableMovie;

/// Aggregate totals for one participant's roster in one period.
///
/// Only the starter total is official; the reserve total is tracked
/// separately and never folded in unless a caller does so explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterScore {
    pub total_starter_score: f64,
    pub total_reserve_score: f64,
    pub movies_released: usize,
    pub movies_unreleased: usize,
}

/// Sum score records across a set of roster slots.
///
/// The scorer closes over whatever rule set and awards data apply; this
/// function only walks slots and splits starter from reserve. Slots whose
/// movie is missing from the pool are logged and skipped.
pub fn aggregate_roster<F>(
    slots: &[RosterSlot],
    pool: &[DraftableMovie],
    as_of: NaiveDate,
    scorer: F,
) -> RosterScore
where
    F: Fn(&DraftableMovie) -> ScoreRecord,
{
    let mut totals = RosterScore {
        total_starter_score: 0.0,
        total_reserve_score: 0.0,
        movies_released: 0,
        movies_unreleased: 0,
    };
    for slot in slots {
        let Some(movie) = pool.iter().find(|m| m.id == slot.movie_id) else {
            warn!(movie_id = %slot.movie_id, "roster slot references a movie missing from the pool");
            continue;
        };
        if movie.is_released(as_of) {
            totals.movies_released += 1;
        } else {
            totals.movies_unreleased += 1;
        }
        let record = scorer(movie);
        match slot.slot_type {
            SlotType::Starter => totals.total_starter_score += record.total_score,
            SlotType::Reserve => totals.total_reserve_score += record.total_score,
        }
    }
    totals
}

/// One row of ranked standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub participant_id: String,
    pub score: f64,
    /// 1-indexed position after sorting.
    pub rank: usize,
}

/// Rank participants by score, descending. The sort is stable: ties keep
/// their input order, first-seen wins.
pub fn rank(entries: &[(String, f64)]) -> Vec<StandingsRow> {
    let mut sorted: Vec<(String, f64)> = entries.to_vec();
    // Vec::sort_by is stable, so equal scores preserve input order.
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (participant_id, score))| StandingsRow {
            participant_id,
            score,
            rank: i + 1,
        })
        .collect()
}

/// Sum two periods' scores into overall totals, keyed by participant.
/// Output order follows period one's order, with participants seen only in
/// period two appended.
pub fn combine_periods(
    period_one: &[(String, f64)],
    period_two: &[(String, f64)],
) -> Vec<(String, f64)> {
    let mut combined: Vec<(String, f64)> = period_one.to_vec();
    for (id, score) in period_two {
        match combined.iter_mut().find(|(cid, _)| cid == id) {
            Some((_, total)) => *total += score,
            None => combined.push((id.clone(), *score)),
        }
    }
    combined
}

/// The championship field: the top `seats` participants by overall score.
/// The seat count is a league constant and must be even (head-to-head
/// pairings); zero seats is also rejected.
pub fn championship_field(
    ranked: &[StandingsRow],
    seats: usize,
) -> Result<Vec<StandingsRow>, DraftError> {
    if seats == 0 || seats % 2 != 0 {
        return Err(DraftError::InvalidConfiguration(format!(
            "championship seat count must be a positive even number, got {seats}"
        )));
    }
    Ok(ranked.iter().take(seats).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::roster::Period;
    use crate::scoring::rules::ScoringRuleSet;
    use crate::scoring::score::score_movie;

    fn movie(id: &str, release: &str, budget: f64, box_office: f64) -> DraftableMovie {
        DraftableMovie {
            id: id.into(),
            title: format!("Movie {id}"),
            release_date: release.parse().unwrap(),
            budget,
            projected_domestic: 0.0,
            projected_worldwide: 0.0,
            projected_opening: 0.0,
            box_office,
            imdb_rating: None,
            draft_rank: 1,
            confidence: 0.5,
        }
    }

    fn slot(movie_id: &str, slot_type: SlotType) -> RosterSlot {
        RosterSlot {
            movie_id: movie_id.into(),
            participant_id: "p1".into(),
            slot_type,
            period: Period::One,
            locked: false,
        }
    }

    #[test]
    fn starter_and_reserve_totals_stay_separate() {
        let pool = vec![
            movie("m1", "2026-06-01", 60.0, 160.0), // +100
            movie("m2", "2026-06-01", 60.0, 90.0),  // +30
            movie("m3", "2026-12-25", 60.0, 0.0),   // -60, unreleased
        ];
        let slots = vec![
            slot("m1", SlotType::Starter),
            slot("m2", SlotType::Reserve),
            slot("m3", SlotType::Starter),
        ];
        let rules = ScoringRuleSet::default();
        let as_of = "2026-08-01".parse().unwrap();
        let totals = aggregate_roster(&slots, &pool, as_of, |m| score_movie(m, &rules, &[], &[]));

        assert_eq!(totals.total_starter_score, 40.0);
        assert_eq!(totals.total_reserve_score, 30.0);
        assert_eq!(totals.movies_released, 2);
        assert_eq!(totals.movies_unreleased, 1);
    }

    #[test]
    fn missing_pool_movie_skipped() {
        let pool = vec![movie("m1", "2026-06-01", 60.0, 100.0)];
        let slots = vec![slot("m1", SlotType::Starter), slot("ghost", SlotType::Starter)];
        let rules = ScoringRuleSet::default();
        let as_of = "2026-08-01".parse().unwrap();
        let totals = aggregate_roster(&slots, &pool, as_of, |m| score_movie(m, &rules, &[], &[]));
        assert_eq!(totals.total_starter_score, 40.0);
        assert_eq!(totals.movies_released + totals.movies_unreleased, 1);
    }

    #[test]
    fn rank_descending() {
        let ranked = rank(&[
            ("a".into(), 10.0),
            ("b".into(), 50.0),
            ("c".into(), 30.0),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ranked = rank(&[
            ("first".into(), 20.0),
            ("second".into(), 20.0),
            ("third".into(), 20.0),
            ("top".into(), 21.0),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["top", "first", "second", "third"]);
    }

    #[test]
    fn rank_handles_negative_scores() {
        let ranked = rank(&[("flop".into(), -120.0), ("hit".into(), 80.0)]);
        assert_eq!(ranked[0].participant_id, "hit");
        assert_eq!(ranked[1].score, -120.0);
    }

    #[test]
    fn combine_periods_sums_by_participant() {
        let overall = combine_periods(
            &[("a".into(), 10.0), ("b".into(), 20.0)],
            &[("b".into(), 5.0), ("c".into(), 7.0)],
        );
        assert_eq!(
            overall,
            vec![
                ("a".to_string(), 10.0),
                ("b".to_string(), 25.0),
                ("c".to_string(), 7.0)
            ]
        );
    }

    #[test]
    fn championship_takes_top_k() {
        let ranked = rank(&[
            ("a".into(), 1.0),
            ("b".into(), 4.0),
            ("c".into(), 3.0),
            ("d".into(), 2.0),
        ]);
        let field = championship_field(&ranked, 2).unwrap();
        let ids: Vec<&str> = field.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn odd_or_zero_seat_count_rejected() {
        let ranked = rank(&[("a".into(), 1.0), ("b".into(), 2.0)]);
        assert!(matches!(
            championship_field(&ranked, 3),
            Err(DraftError::InvalidConfiguration(_))
        ));
        assert!(championship_field(&ranked, 0).is_err());
    }
}

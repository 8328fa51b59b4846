// Per-movie score computation.
//
// A ScoreRecord is a pure derived view: recomputed on demand whenever
// box-office or awards data changes, never stored or incrementally
// maintained. Identical inputs always produce an identical record.

use serde::{Deserialize, Serialize};

use super::rules::ScoringRuleSet;
use crate::movie::DraftableMovie;

/// One Oscar nomination or win from the external awards feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub movie_id: String,
    pub category: String,
}

/// The score breakdown for one movie under one rule set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Total box office to date minus production budget. Negative for
    /// flops, which is valid and expected.
    pub base_score: f64,
    pub imdb_bonus: f64,
    pub budget_multiplier_bonus: f64,
    pub oscar_points: f64,
    pub total_score: f64,
}

/// Score a movie under the given rules and awards data.
///
/// Budget and box-office figures are in millions of dollars; the tier
/// thresholds assume that unit and it is the caller's contract to supply
/// matching values. Wins are not auto-derived into nominations unless the
/// rule set's `wins_imply_nomination` flag says so.
pub fn score_movie(
    movie: &DraftableMovie,
    rules: &ScoringRuleSet,
    nominations: &[AwardRecord],
    wins: &[AwardRecord],
) -> ScoreRecord {
    let base_score = movie.box_office - movie.budget;

    // Tiers are mutually exclusive, evaluated highest-first. A missing
    // rating earns nothing; it is not an error.
    let imdb_bonus = match movie.imdb_rating {
        Some(r) if r >= 8.5 => rules.imdb_bonus_85_plus,
        Some(r) if r >= 8.0 => rules.imdb_bonus_80_to_84,
        Some(r) if r >= 7.5 => rules.imdb_bonus_75_to_79,
        _ => 0.0,
    };

    let budget_multiplier_bonus = if movie.budget < 20.0 {
        movie.budget * (rules.budget_multiplier_under_20m - 1.0)
    } else if movie.budget < 50.0 {
        movie.budget * (rules.budget_multiplier_under_50m - 1.0)
    } else {
        0.0
    };

    let win_count = wins.iter().filter(|w| w.movie_id == movie.id).count() as f64;
    let mut nom_count = nominations
        .iter()
        .filter(|n| n.movie_id == movie.id)
        .count() as f64;
    if rules.wins_imply_nomination {
        nom_count += win_count;
    }
    let oscar_points =
        nom_count * rules.oscar_nomination_points + win_count * rules.oscar_win_points;

    let total_score = base_score + imdb_bonus + budget_multiplier_bonus + oscar_points;

    ScoreRecord {
        base_score,
        imdb_bonus,
        budget_multiplier_bonus,
        oscar_points,
        total_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(budget: f64, box_office: f64, rating: Option<f64>) -> DraftableMovie {
        DraftableMovie {
            id: "m1".into(),
            title: "Test Movie".into(),
            release_date: "2026-07-04".parse().unwrap(),
            budget,
            projected_domestic: 0.0,
            projected_worldwide: 0.0,
            projected_opening: 0.0,
            box_office,
            imdb_rating: rating,
            draft_rank: 1,
            confidence: 0.5,
        }
    }

    fn award(movie_id: &str, category: &str) -> AwardRecord {
        AwardRecord {
            movie_id: movie_id.into(),
            category: category.into(),
        }
    }

    #[test]
    fn worked_scenario_totals_163() {
        // budget $15M, box office $90M, rating 8.6, 1 nomination, 1 win.
        let rules = ScoringRuleSet::default();
        let m = movie(15.0, 90.0, Some(8.6));
        let noms = [award("m1", "Best Picture")];
        let wins = [award("m1", "Best Director")];

        let record = score_movie(&m, &rules, &noms, &wins);
        assert_eq!(record.base_score, 75.0);
        assert_eq!(record.imdb_bonus, 75.0);
        assert_eq!(record.budget_multiplier_bonus, 15.0 * 0.4);
        assert_eq!(record.oscar_points, 7.0);
        assert_eq!(record.total_score, 163.0);
    }

    #[test]
    fn scoring_is_pure() {
        let rules = ScoringRuleSet::default();
        let m = movie(35.0, 12.0, Some(7.9));
        let noms = [award("m1", "Best Picture")];
        let a = score_movie(&m, &rules, &noms, &[]);
        let b = score_movie(&m, &rules, &noms, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn flop_scores_negative() {
        let record = score_movie(
            &movie(200.0, 80.0, None),
            &ScoringRuleSet::default(),
            &[],
            &[],
        );
        assert_eq!(record.base_score, -120.0);
        assert_eq!(record.total_score, -120.0);
    }

    #[test]
    fn imdb_tiers_are_exclusive_and_highest_first() {
        let rules = ScoringRuleSet::default();
        let cases = [
            (Some(9.1), 75.0),
            (Some(8.5), 75.0),
            (Some(8.49), 37.5),
            (Some(8.0), 37.5),
            (Some(7.99), 17.5),
            (Some(7.5), 17.5),
            (Some(7.49), 0.0),
            (None, 0.0),
        ];
        for (rating, expected) in cases {
            // budget 60 keeps the multiplier bonus out of the way
            let record = score_movie(&movie(60.0, 60.0, rating), &rules, &[], &[]);
            assert_eq!(record.imdb_bonus, expected, "rating {rating:?}");
        }
    }

    #[test]
    fn budget_tier_boundaries() {
        let rules = ScoringRuleSet::default();
        let under_20 = score_movie(&movie(19.9, 0.0, None), &rules, &[], &[]);
        assert!((under_20.budget_multiplier_bonus - 19.9 * 0.4).abs() < 1e-9);

        let at_20 = score_movie(&movie(20.0, 0.0, None), &rules, &[], &[]);
        assert!((at_20.budget_multiplier_bonus - 20.0 * 0.2).abs() < 1e-9);

        let at_50 = score_movie(&movie(50.0, 0.0, None), &rules, &[], &[]);
        assert_eq!(at_50.budget_multiplier_bonus, 0.0);
    }

    #[test]
    fn awards_for_other_movies_ignored() {
        let rules = ScoringRuleSet::default();
        let noms = [award("other", "Best Picture")];
        let wins = [award("other", "Best Director")];
        let record = score_movie(&movie(60.0, 60.0, None), &rules, &noms, &wins);
        assert_eq!(record.oscar_points, 0.0);
    }

    #[test]
    fn win_without_nomination_counts_only_the_win_by_default() {
        let rules = ScoringRuleSet::default();
        let wins = [award("m1", "Best Picture")];
        let record = score_movie(&movie(60.0, 60.0, None), &rules, &[], &wins);
        assert_eq!(record.oscar_points, 5.0);
    }

    #[test]
    fn wins_imply_nomination_adds_the_nomination_points() {
        let rules = ScoringRuleSet {
            wins_imply_nomination: true,
            ..Default::default()
        };
        let wins = [award("m1", "Best Picture")];
        let record = score_movie(&movie(60.0, 60.0, None), &rules, &[], &wins);
        assert_eq!(record.oscar_points, 7.0);

        // A separately listed nomination still counts once more.
        let noms = [award("m1", "Best Picture")];
        let record = score_movie(&movie(60.0, 60.0, None), &rules, &noms, &wins);
        assert_eq!(record.oscar_points, 9.0);
    }
}

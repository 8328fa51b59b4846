// The league's scoring rule set: named numeric knobs plus the two policy
// flags the commissioner can set. Immutable once a draft or scoring period
// begins; edited only during league setup.

use serde::{Deserialize, Serialize};

use crate::error::DraftError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRuleSet {
    /// Flat bonus for an IMDB rating of 8.5 or higher.
    pub imdb_bonus_85_plus: f64,
    /// Flat bonus for a rating in 8.0..8.5.
    pub imdb_bonus_80_to_84: f64,
    /// Flat bonus for a rating in 7.5..8.0.
    pub imdb_bonus_75_to_79: f64,
    /// Multiplier (>= 1.0) applied to budgets under $20M; the bonus is
    /// `budget * (multiplier - 1)`.
    pub budget_multiplier_under_20m: f64,
    /// Multiplier (>= 1.0) applied to budgets under $50M.
    pub budget_multiplier_under_50m: f64,
    pub oscar_nomination_points: f64,
    pub oscar_win_points: f64,
    /// Flat bonus credited for a voluntary skip.
    pub skip_bonus: f64,
    /// Whether an Oscar win also counts as a nomination for scoring.
    /// The awards feed does not always list a nomination alongside a win,
    /// so this is an explicit league policy rather than an assumption.
    #[serde(default)]
    pub wins_imply_nomination: bool,
}

impl Default for ScoringRuleSet {
    fn default() -> Self {
        ScoringRuleSet {
            imdb_bonus_85_plus: 75.0,
            imdb_bonus_80_to_84: 37.5,
            imdb_bonus_75_to_79: 17.5,
            budget_multiplier_under_20m: 1.4,
            budget_multiplier_under_50m: 1.2,
            oscar_nomination_points: 2.0,
            oscar_win_points: 5.0,
            skip_bonus: 25.0,
            wins_imply_nomination: false,
        }
    }
}

impl ScoringRuleSet {
    /// Validate the knobs that have hard constraints.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.budget_multiplier_under_20m < 1.0 || self.budget_multiplier_under_50m < 1.0 {
            return Err(DraftError::InvalidConfiguration(
                "budget multipliers must be at least 1.0".into(),
            ));
        }
        Ok(())
    }
}

// Scoring core: the configurable rule set, per-movie score computation,
// and standings aggregation.

pub mod rules;
pub mod score;
pub mod standings;

pub use rules::ScoringRuleSet;
pub use score::{score_movie, AwardRecord, ScoreRecord};

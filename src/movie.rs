// Draftable movie records supplied by the external metadata/estimation layer.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to read movie pool file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse movie pool file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A theatrical release eligible for drafting.
///
/// All financial figures are in millions of dollars. Budget and box-office
/// numbers are opaque inputs computed upstream; this crate never estimates
/// or fetches them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftableMovie {
    pub id: String,
    pub title: String,
    pub release_date: NaiveDate,
    /// Production budget ($M).
    pub budget: f64,
    /// Projected domestic gross ($M).
    pub projected_domestic: f64,
    /// Projected worldwide gross ($M).
    pub projected_worldwide: f64,
    /// Projected opening-weekend gross ($M).
    pub projected_opening: f64,
    /// Actual total box office to date ($M). Updated by the data layer as
    /// grosses come in; zero until the movie opens.
    #[serde(default)]
    pub box_office: f64,
    /// IMDB rating (0.0..=10.0), once enough votes exist.
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    /// Point-in-time draft rank computed when the pool was assembled.
    pub draft_rank: u32,
    /// Confidence (0.0..=1.0) attached to the rank.
    pub confidence: f64,
}

impl DraftableMovie {
    /// Whether the movie has been released as of the given date.
    /// Release day itself counts as released.
    pub fn is_released(&self, as_of: NaiveDate) -> bool {
        self.release_date <= as_of
    }
}

/// Load a movie pool from a JSON file (an array of `DraftableMovie`).
pub fn load_pool(path: &Path) -> Result<Vec<DraftableMovie>, PoolError> {
    let text = std::fs::read_to_string(path).map_err(|e| PoolError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| PoolError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

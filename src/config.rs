// Configuration loading and parsing (league.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::draft::Participant;
use crate::scoring::ScoringRuleSet;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub draft: DraftConfig,
    pub scoring: ScoringRuleSet,
    pub data_paths: DataPaths,
}

impl Config {
    /// Materialize the configured participants, in display order, with
    /// ready flags unset.
    pub fn participants(&self) -> Vec<Participant> {
        self.league
            .participants
            .iter()
            .map(|p| Participant::new(p.id.clone(), p.name.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    draft: DraftSection,
    scoring: ScoringRuleSet,
    data: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub total_rounds: usize,
    /// Number of championship seats; a league constant, must be even.
    pub championship_seats: usize,
    /// League members in display order. The draft order is derived from
    /// this ordering.
    pub participants: Vec<ParticipantEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantEntry {
    pub id: String,
    pub name: String,
}

/// Raw `[draft]` table.
#[derive(Debug, Clone, Deserialize)]
struct DraftSection {
    pick_seconds: u32,
    #[serde(default)]
    pause_between_picks_seconds: u32,
    allow_skips: bool,
    #[serde(default)]
    skip_bonus_on_timeout: bool,
}

/// The assembled draft-engine configuration. `skip_bonus_amount` comes from
/// the `[scoring]` table's `skip_bonus` so the two engines never disagree
/// about the bonus value.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    pub total_rounds: usize,
    pub pick_seconds: u32,
    pub pause_between_picks_seconds: u32,
    pub allow_skips: bool,
    pub skip_bonus_on_timeout: bool,
    pub skip_bonus_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// JSON movie pool produced by the external metadata layer.
    pub movies: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let text = read_file(&league_path)?;
    let file: LeagueFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let draft = DraftConfig {
        total_rounds: file.league.total_rounds,
        pick_seconds: file.draft.pick_seconds,
        pause_between_picks_seconds: file.draft.pause_between_picks_seconds,
        allow_skips: file.draft.allow_skips,
        skip_bonus_on_timeout: file.draft.skip_bonus_on_timeout,
        skip_bonus_amount: file.scoring.skip_bonus,
    };

    let config = Config {
        league: file.league,
        draft,
        scoring: file.scoring,
        data_paths: file.data,
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from the current directory, copying missing config
/// files from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let base_dir = std::env::current_dir().map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot determine current directory: {e}"),
    })?;
    ensure_config_files(&base_dir)?;
    load_config_from(&base_dir)
}

/// Ensure `config/` exists by copying missing files from `defaults/`.
/// Existing files in `config/` are never overwritten. Returns the list of
/// files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }
    Ok(copied)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.participants.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.participants".into(),
            message: "at least one participant is required".into(),
        });
    }
    let mut seen = std::collections::HashSet::new();
    for p in &config.league.participants {
        if !seen.insert(&p.id) {
            return Err(ConfigError::ValidationError {
                field: "league.participants".into(),
                message: format!("duplicate participant id `{}`", p.id),
            });
        }
    }
    if config.league.total_rounds == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.total_rounds".into(),
            message: "must be at least 1".into(),
        });
    }
    if config.league.championship_seats == 0 || config.league.championship_seats % 2 != 0 {
        return Err(ConfigError::ValidationError {
            field: "league.championship_seats".into(),
            message: format!(
                "must be a positive even number, got {}",
                config.league.championship_seats
            ),
        });
    }
    if config.draft.pick_seconds == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.pick_seconds".into(),
            message: "must be at least 1 second".into(),
        });
    }
    if config.scoring.budget_multiplier_under_20m < 1.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.budget_multiplier_under_20m".into(),
            message: "must be at least 1.0".into(),
        });
    }
    if config.scoring.budget_multiplier_under_50m < 1.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.budget_multiplier_under_50m".into(),
            message: "must be at least 1.0".into(),
        });
    }
    Ok(())
}

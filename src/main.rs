// Demo entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, env-filtered)
// 2. Load config (copying defaults/ into config/ on first run)
// 3. Load the movie pool
// 4. Build the roster store and draft engine
// 5. Run an automated draft driven by the real one-second ticker
// 6. Assign roster slots, score period one, and print standings

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use movie_league::config;
use movie_league::draft::engine::{DraftEngine, DraftPhase};
use movie_league::draft::roster::{Period, RosterStore, SlotType};
use movie_league::draft::timer;
use movie_league::movie::{self, DraftableMovie};
use movie_league::scoring::{self, standings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("movie league starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} participants, {} rounds",
        config.league.name,
        config.league.participants.len(),
        config.league.total_rounds
    );

    let pool = movie::load_pool(Path::new(&config.data_paths.movies))
        .context("failed to load movie pool")?;
    info!("Loaded {} draftable movies", pool.len());

    let roster = Arc::new(RosterStore::new());
    let mut engine = DraftEngine::new(
        config.participants(),
        config.draft.clone(),
        Arc::clone(&roster),
    )
    .context("failed to build draft engine")?;

    let participant_ids: Vec<String> = config
        .league
        .participants
        .iter()
        .map(|p| p.id.clone())
        .collect();
    for id in &participant_ids {
        engine.set_ready(id, true).context("ready check failed")?;
    }
    engine.start().context("failed to start draft")?;

    // Drive the draft with the real ticker; one auto-pick per tick.
    let (tx, mut rx) = mpsc::channel(64);
    let ticker = timer::spawn_ticker(tx);
    while engine.phase() == DraftPhase::InProgress {
        let Some(tick) = rx.recv().await else { break };
        if let Some(expired) = engine.tick(tick.elapsed_secs) {
            info!(pick = expired.overall_number, "turn timed out");
            continue;
        }
        if engine.phase() != DraftPhase::InProgress {
            break;
        }
        if engine.is_paused() {
            engine.resume();
        }
        let Some(on_clock) = engine.participant_on_clock().map(|p| p.id.clone()) else {
            break;
        };
        let available = engine.roster().available_from(&pool);
        match available.iter().min_by_key(|m| m.draft_rank) {
            Some(best) => {
                let pick = engine.submit_pick(&on_clock, &best.id, engine.time_remaining())?;
                println!(
                    "pick {:>2}  round {}  {:<12} {}",
                    pick.overall_number,
                    pick.round + 1,
                    on_clock,
                    best.title
                );
            }
            None => {
                engine.skip_turn(engine.time_remaining())?;
                println!("pool exhausted; {on_clock} skipped");
            }
        }
    }
    ticker.abort();
    info!("draft complete after {} picks", engine.picks().len());

    // Period-one rosters: first three picks start, the rest sit in reserve.
    let mut starter_counts: HashMap<String, usize> = HashMap::new();
    for pick in engine.picks() {
        if let Some(movie_id) = &pick.movie_id {
            let count = starter_counts.entry(pick.participant_id.clone()).or_insert(0);
            let slot_type = if *count < 3 {
                SlotType::Starter
            } else {
                SlotType::Reserve
            };
            *count += 1;
            roster.assign_slot(movie_id, &pick.participant_id, slot_type, Period::One);
        }
    }
    let today = Utc::now().date_naive();
    roster.lock_released(&pool, today);

    // Score period one. No awards feed in the demo, so Oscars contribute
    // nothing yet.
    let rules = config.scoring.clone();
    let scorer = |m: &DraftableMovie| scoring::score_movie(m, &rules, &[], &[]);
    let entries: Vec<(String, f64)> = participant_ids
        .iter()
        .map(|id| {
            let slots = roster.slots_for(id, Period::One);
            let totals = standings::aggregate_roster(&slots, &pool, today, &scorer);
            (id.clone(), totals.total_starter_score)
        })
        .collect();

    println!("\n--- Period 1 standings (starters only) ---");
    let ranked = standings::rank(&entries);
    for row in &ranked {
        println!("{:>2}. {:<12} {:>8.1}", row.rank, row.participant_id, row.score);
    }

    let field = standings::championship_field(&ranked, config.league.championship_seats)
        .context("championship gating failed")?;
    let names: Vec<&str> = field.iter().map(|r| r.participant_id.as_str()).collect();
    println!("\nChampionship field ({} seats): {}", field.len(), names.join(", "));

    Ok(())
}

/// Initialize tracing to stderr so the demo output stays readable on stdout.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_league=info,movieleague=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

// Wall-clock driver for the per-turn countdown.
//
// The engine's countdown is logically synchronous: `tick(elapsed)` advanced
// by whoever owns the clock. This module supplies real one-second ticks
// from a tokio task over an mpsc channel, so the host's event loop can
// feed the engine alongside pick submissions.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// One countdown tick.
#[derive(Debug, Clone, Copy)]
pub struct TimerTick {
    pub elapsed_secs: u32,
}

/// Spawn a task that sends one `TimerTick` per second until the receiver
/// is dropped. The first tick arrives a full second after spawn.
pub fn spawn_ticker(tx: mpsc::Sender<TimerTick>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so the
        // countdown starts one second after spawn.
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(TimerTick { elapsed_secs: 1 }).await.is_err() {
                debug!("tick receiver dropped; stopping ticker");
                break;
            }
        }
    })
}

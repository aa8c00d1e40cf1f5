//! Trigger tick: evaluate pile thresholds and due delayed stages, then
//! execute the returned effects (notifications, bus publishes) outside the
//! state lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

pub fn spawn(
    state: Arc<AppState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "starting trigger engine");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let effects = state.store.tick(Utc::now()).await;
                    state.apply_effects(effects).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("trigger engine stopped");
    })
}

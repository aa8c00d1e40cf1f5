//! Autosave tick: snapshot the live state to disk on a fixed interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hearth_core::{persist, StateStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

pub fn spawn(
    store: Arc<StateStore>,
    state_path: PathBuf,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), state_path = %state_path.display(), "starting autosave");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = store.snapshot().await;
                    if let Err(err) = persist::save_state(&state_path, &snapshot) {
                        error!(error = %err, "state autosave failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("autosave stopped");
    })
}

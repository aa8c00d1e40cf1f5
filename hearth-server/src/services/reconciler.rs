//! Reconciliation tick: re-read the declarative configuration and fold it
//! into the live pile forest on a fixed interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hearth_core::{config, StateStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub fn spawn(
    store: Arc<StateStore>,
    config_path: PathBuf,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), config_path = %config_path.display(), "starting reconciler");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Reconciliation itself never fails; a broken config file
                    // just skips the pass and keeps the last good state.
                    match config::load_config(&config_path) {
                        Ok(cfg) => {
                            store.reconcile(&cfg.piles).await;
                            debug!("reconcile pass complete");
                        }
                        Err(err) => {
                            warn!(error = %err, "config reload failed, skipping reconcile pass");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("reconciler stopped");
    })
}

//! Display refresh background task

use std::{collections::HashMap, sync::Arc};
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Re-derive running timers on a short interval and publish a snapshot
/// whenever the displayed second changes.
///
/// Purely presentational: the timers stay correct without it. Stops when
/// `shutdown` flips to true or its sender is dropped.
pub async fn display_refresh_task(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    info!("Starting display refresh task every {:?}", state.refresh_interval);

    let mut interval = tokio::time::interval(state.refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown: HashMap<String, u64> = HashMap::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let running = state.running_matches();
                shown.retain(|match_id, _| running.contains(match_id));

                for match_id in running {
                    match state.timer_snapshot(&match_id) {
                        Ok(snapshot) => {
                            if shown.get(&match_id) != Some(&snapshot.elapsed_seconds) {
                                shown.insert(match_id, snapshot.elapsed_seconds);
                                state.publish(snapshot);
                            }
                        }
                        Err(e) => warn!("Failed to refresh timer for match {}: {}", match_id, e),
                    }
                }
            }

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("Display refresh task received shutdown");
                    break;
                }
            }
        }
    }

    info!("Display refresh task stopped");
}

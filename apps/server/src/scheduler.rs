//! Background scheduler for periodic goal recalculation.
//!
//! Every tick recalculates the goals of each owner that still has an active
//! goal. A failing owner is logged and skipped; the loop keeps running.

use mindquest_core::goals::GoalServiceTrait;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Delay before the first pass so startup traffic is not competing with it.
const INITIAL_DELAY_SECS: u64 = 30;

pub fn start_goal_recalc_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("Goal recalculation scheduler started ({}s interval)", every.as_secs());

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_recalculation_pass(state.goal_service.as_ref()).await;
        }
    });
}

/// Recalculates every owner's goals once. Returns the number of goals whose
/// stored value changed or that completed during the pass.
pub async fn run_recalculation_pass(goal_service: &dyn GoalServiceTrait) -> usize {
    let owners = match goal_service.list_goal_owners() {
        Ok(owners) => owners,
        Err(e) => {
            warn!("Goal recalculation skipped, could not list owners: {}", e);
            return 0;
        }
    };

    let mut touched = 0;
    for owner_id in &owners {
        match goal_service.recalculate_all_goals(owner_id).await {
            Ok(results) => {
                let changed = results
                    .iter()
                    .filter(|r| r.completed || (r.current_value - r.previous_value).abs() > 1e-9)
                    .count();
                debug!(
                    "Recalculated {} goals for {} ({} changed)",
                    results.len(),
                    owner_id,
                    changed
                );
                touched += changed;
            }
            Err(e) => warn!("Goal recalculation failed for {}: {}", owner_id, e),
        }
    }

    info!(
        "Goal recalculation pass finished: {} owners, {} goals changed",
        owners.len(),
        touched
    );
    touched
}

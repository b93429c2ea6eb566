//! In-process scheduler that runs a dispatch cycle at a fixed cadence.

use chrono::{DateTime, Utc};
use dosewatch_config::SchedulerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::context::ReminderContext;
use crate::dispatcher::run_dispatch_cycle;

/// Time from `now` until the next multiple of `interval_secs` since the epoch.
pub fn until_next_boundary(now: DateTime<Utc>, interval_secs: u64) -> Duration {
    let interval_ms = interval_secs.max(1) * 1000;
    let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let remainder = now_ms % interval_ms;
    if remainder == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(interval_ms - remainder)
    }
}

/// Spawns the scheduler loop, or returns `None` when it is disabled.
pub fn spawn_scheduler(ctx: Arc<ReminderContext>, config: &SchedulerConfig) -> Option<JoinHandle<()>> {
    if !config.enabled {
        info!("Reminder scheduler disabled; dispatch only runs via POST /api/reminders/dispatch");
        return None;
    }
    let interval_secs = config.interval_secs.max(1);
    Some(tokio::spawn(run_scheduler(ctx, interval_secs)))
}

/// Runs one cycle per interval, aligned to interval boundaries. Cycle errors
/// are logged and the loop keeps going.
pub async fn run_scheduler(ctx: Arc<ReminderContext>, interval_secs: u64) {
    let first = Instant::now() + until_next_boundary(ctx.clock.now(), interval_secs);
    let mut ticker = interval_at(first, Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("Reminder scheduler started, every {}s", interval_secs);

    loop {
        ticker.tick().await;
        match run_dispatch_cycle(&ctx).await {
            Ok(report) if report.claimed > 0 => info!(
                "Scheduled dispatch: {} claimed, {} sent, {} failed",
                report.claimed, report.succeeded, report.failed
            ),
            Ok(_) => {}
            Err(err) => error!("Scheduled dispatch cycle failed: {}", err),
        }
    }
}

//! Runs the reminder scan once per minute.

use std::sync::Arc;

use tokio::time::{Instant, MissedTickBehavior};

use crate::{notify, prelude::*, state::AppState};

pub struct Reminder;

/// Time left until the next wall-clock minute starts.
fn until_next_minute(now: DateTime) -> Duration {
  let into_minute = Duration::from_secs(now.second() as u64)
    + Duration::from_nanos(now.nanosecond() as u64 % 1_000_000_000);
  Duration::from_secs(60).saturating_sub(into_minute)
}

/// Minute a tick stands for: ticks land on minute boundaries, so the wall
/// clock is rounded to the nearest minute.
fn scan_minute(now: DateTime) -> DateTime {
  let shifted = now + TimeDelta::seconds(30);
  shifted
    .with_second(0)
    .and_then(|at| at.with_nanosecond(0))
    .unwrap_or(shifted)
}

#[async_trait]
impl super::Plugin for Reminder {
  fn name(&self) -> &'static str {
    "reminder"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let start = Instant::now() + until_next_minute(Utc::now().naive_utc());
    let mut interval = time::interval_at(start, app.config.scan_interval);
    // a late tick must not fire twice for the same minute
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
      interval.tick().await;

      let minute = scan_minute(Utc::now().naive_utc());
      match notify::scan(&app.db, &app.queue, minute).await {
        Ok(0) => {}
        Ok(count) => info!("Queued {count} reminder(s)"),
        Err(err) => error!("Reminder scan failed: {err}"),
      }
    }
  }
}

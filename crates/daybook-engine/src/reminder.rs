//! The daily "did you record anything today?" check.

use std::time::Duration;

use chrono::NaiveTime;
use tracing::{debug, warn};

use daybook_core::{
  schedule::{self, Clock, Notifier},
  store::JournalStore,
};

/// Stable job id — re-arming under the same id keeps the existing schedule.
pub const REMINDER_JOB_ID: &str = "record-reminder";

pub const REMINDER_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Local wall-clock time the reminder targets by default.
pub const DEFAULT_REMINDER_TIME: NaiveTime =
  NaiveTime::from_hms_opt(21, 0, 0).unwrap();

pub const REMINDER_TITLE: &str = "How was your day?";
pub const REMINDER_BODY: &str =
  "Take a moment to write down today's thoughts.";

/// One firing of the reminder job: if nothing was recorded within today's
/// local-date window, nudge the user. Store and notifier failures are logged
/// and swallowed — the job retries on its next scheduled occurrence.
pub async fn run_reminder_check<S: JournalStore>(
  store: &S,
  notifier: &dyn Notifier,
  clock: &dyn Clock,
) {
  let (start_of_day, end_of_day) = schedule::local_day_bounds(clock);

  let today = match store.records_in_range(start_of_day, end_of_day).await {
    Ok(records) => records,
    Err(e) => {
      warn!(error = %e, "reminder: range query failed; retrying next cycle");
      return;
    }
  };

  if !today.is_empty() {
    debug!(count = today.len(), "reminder: records exist today");
    return;
  }

  if let Err(e) = notifier.notify(REMINDER_TITLE, REMINDER_BODY) {
    warn!(error = %e, "reminder: notification failed");
  }
}

//! Contracts for the external collaborators — the job host, the notifier,
//! and the clock — plus the pure scheduling arithmetic built on them.
//!
//! The schedulers in `daybook-engine` depend only on these traits, never on
//! a concrete platform API. The clock is injectable so day boundaries and
//! delay computations are testable without waiting for wall time.

use std::{future::Future, pin::Pin, time::Duration};

use chrono::{
  DateTime, Duration as ChronoDuration, FixedOffset, NaiveDateTime,
  NaiveTime, TimeZone, Utc,
};

use crate::Result;

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of current time and the local UTC offset used for day boundaries.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
  fn local_offset(&self) -> FixedOffset;
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Fire-and-forget notification delivery. Failure is non-fatal: callers log
/// and move on, never surfacing it to the user.
pub trait Notifier: Send + Sync {
  fn notify(&self, title: &str, body: &str) -> Result<()>;
}

// ─── Job host ────────────────────────────────────────────────────────────────

pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type JobFn = Box<dyn Fn() -> JobFuture + Send + Sync>;

/// Abstraction over the background work-scheduling platform.
///
/// Both methods are idempotent by `job_id`. A one-shot schedule for an id
/// that is already pending replaces it; a recurring schedule for an id that
/// is already armed keeps the existing schedule (so re-arming the daily
/// reminder at every startup never creates duplicate jobs).
pub trait JobHost: Send + Sync {
  fn schedule_once(&self, job_id: &str, delay: Duration, job: JobFuture);

  fn schedule_recurring(
    &self,
    job_id: &str,
    interval: Duration,
    initial_delay: Duration,
    job: JobFn,
  );

  /// Cancel all scheduled jobs. Safe at any point — every job write is
  /// independently idempotent, so no rollback is needed.
  fn shutdown(&self);
}

// ─── Scheduling arithmetic ───────────────────────────────────────────────────

/// Convert a naive local timestamp to the UTC instant it names.
fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
  let shift = ChronoDuration::seconds(i64::from(offset.local_minus_utc()));
  Utc.from_utc_datetime(&(local - shift))
}

/// Today's local-date window `[start_of_day, end_of_day)` as UTC instants.
pub fn local_day_bounds(clock: &dyn Clock) -> (DateTime<Utc>, DateTime<Utc>) {
  let offset = clock.local_offset();
  let start = clock
    .now()
    .with_timezone(&offset)
    .date_naive()
    .and_time(NaiveTime::MIN);
  let end = start + ChronoDuration::days(1);
  (local_to_utc(start, offset), local_to_utc(end, offset))
}

/// Delay from now to the next occurrence of `target` local wall-clock time.
///
/// If the target time today has already passed, the result points at the
/// same time tomorrow. Never negative; a call exactly at the target time
/// yields zero.
pub fn delay_until(clock: &dyn Clock, target: NaiveTime) -> Duration {
  let offset = clock.local_offset();
  let now_local = clock.now().with_timezone(&offset).naive_local();

  let mut due = now_local.date().and_time(target);
  if due < now_local {
    due += ChronoDuration::days(1);
  }

  (local_to_utc(due, offset) - clock.now())
    .to_std()
    .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  struct FixedClock {
    now:    DateTime<Utc>,
    offset: FixedOffset,
  }

  impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.now }

    fn local_offset(&self) -> FixedOffset { self.offset }
  }

  fn clock(local: &str, offset_hours: i32) -> FixedClock {
    let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
    let naive =
      NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S").unwrap();
    FixedClock { now: local_to_utc(naive, offset), offset }
  }

  const NINE_PM: NaiveTime = NaiveTime::from_hms_opt(21, 0, 0).unwrap();

  #[test]
  fn delay_before_target_lands_today() {
    let c = clock("2024-05-10 20:00:00", 9);
    assert_eq!(delay_until(&c, NINE_PM), Duration::from_secs(3600));
  }

  #[test]
  fn delay_after_target_rolls_to_tomorrow() {
    let c = clock("2024-05-10 22:00:00", 9);
    assert_eq!(delay_until(&c, NINE_PM), Duration::from_secs(23 * 3600));
  }

  #[test]
  fn delay_exactly_at_target_is_zero() {
    let c = clock("2024-05-10 21:00:00", 9);
    assert_eq!(delay_until(&c, NINE_PM), Duration::ZERO);
  }

  #[test]
  fn delay_is_never_negative() {
    for hour in 0..24 {
      let c = clock(&format!("2024-05-10 {hour:02}:30:00"), -5);
      let d = delay_until(&c, NINE_PM);
      assert!(d <= Duration::from_secs(24 * 3600));
    }
  }

  #[test]
  fn day_bounds_respect_local_offset() {
    // 01:00 on May 10th in UTC+9 is still May 9th in UTC.
    let c = clock("2024-05-10 01:00:00", 9);
    let (start, end) = local_day_bounds(&c);

    let expected_start = Utc
      .from_utc_datetime(
        &NaiveDate::from_ymd_opt(2024, 5, 9)
          .unwrap()
          .and_hms_opt(15, 0, 0)
          .unwrap(),
      );
    assert_eq!(start, expected_start);
    assert_eq!(end - start, ChronoDuration::days(1));
  }

  #[test]
  fn day_bounds_are_half_open_width() {
    let c = clock("2024-05-10 12:00:00", 0);
    let (start, end) = local_day_bounds(&c);
    assert!(start <= c.now() && c.now() < end);
  }
}

//! Integration tests for the service layer against an in-memory store.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use daybook_core::{
  record::RecordPatch,
  schedule::{Clock, JobFn, JobFuture, JobHost, Notifier},
  Result,
};
use daybook_store_sqlite::SqliteStore;

use crate::{reindex, reminder, Journal, TokioJobHost};

// ─── Test doubles ────────────────────────────────────────────────────────────

/// Job host that queues one-shot jobs for the test to drain and run.
#[derive(Default)]
struct DrainHost {
  once:      Mutex<Vec<(String, JobFuture)>>,
  recurring: Mutex<Vec<String>>,
}

impl DrainHost {
  fn drain_once(&self) -> Vec<(String, JobFuture)> {
    std::mem::take(&mut *self.once.lock().unwrap())
  }

  fn recurring_ids(&self) -> Vec<String> {
    self.recurring.lock().unwrap().clone()
  }
}

impl JobHost for DrainHost {
  fn schedule_once(
    &self,
    job_id: &str,
    _delay: std::time::Duration,
    job: JobFuture,
  ) {
    self.once.lock().unwrap().push((job_id.to_owned(), job));
  }

  fn schedule_recurring(
    &self,
    job_id: &str,
    _interval: std::time::Duration,
    _initial_delay: std::time::Duration,
    _job: JobFn,
  ) {
    self.recurring.lock().unwrap().push(job_id.to_owned());
  }

  fn shutdown(&self) {}
}

#[derive(Default)]
struct RecordingNotifier {
  sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
  fn sent(&self) -> Vec<(String, String)> { self.sent.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, title: &str, body: &str) -> Result<()> {
    self.sent.lock().unwrap().push((title.to_owned(), body.to_owned()));
    Ok(())
  }
}

struct FixedClock {
  now:    DateTime<Utc>,
  offset: FixedOffset,
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.now }

  fn local_offset(&self) -> FixedOffset { self.offset }
}

fn noon_utc() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

struct Fixture {
  journal:  Journal<SqliteStore>,
  host:     Arc<DrainHost>,
  notifier: Arc<RecordingNotifier>,
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let host = Arc::new(DrainHost::default());
  let notifier = Arc::new(RecordingNotifier::default());
  let clock = Arc::new(FixedClock {
    now:    noon_utc(),
    offset: FixedOffset::east_opt(0).unwrap(),
  });

  let journal =
    Journal::new(store, host.clone(), notifier.clone(), clock);
  Fixture { journal, host, notifier }
}

// ─── Write-time tagging ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_record_tags_against_active_keywords() {
  let f = fixture().await;
  f.journal.register_keyword("coffee").await.unwrap();
  f.journal.register_keyword("rain").await.unwrap();
  f.journal.register_keyword("gym").await.unwrap();

  let record = f
    .journal
    .create_record("Coffee in the rain".into(), noon_utc())
    .await
    .unwrap();

  let fetched = f.journal.get_record(record.id).await.unwrap().unwrap();
  let texts: Vec<_> =
    fetched.keywords.iter().map(|k| k.text.as_str()).collect();
  assert_eq!(texts, ["coffee", "rain"]);
}

#[tokio::test]
async fn soft_deleted_keywords_do_not_tag_new_records() {
  let f = fixture().await;
  let keyword = f.journal.register_keyword("coffee").await.unwrap();
  f.journal.soft_delete_keyword(keyword.id).await.unwrap();

  let record = f
    .journal
    .create_record("coffee again".into(), noon_utc())
    .await
    .unwrap();

  let fetched = f.journal.get_record(record.id).await.unwrap().unwrap();
  assert!(fetched.keywords.is_empty());
}

#[tokio::test]
async fn edit_appends_new_matches_and_keeps_stale_ones() {
  let f = fixture().await;
  f.journal.register_keyword("coffee").await.unwrap();
  f.journal.register_keyword("tea").await.unwrap();

  let record = f
    .journal
    .create_record("had coffee".into(), noon_utc())
    .await
    .unwrap();

  f.journal
    .update_record(
      record.id,
      RecordPatch { text: Some("had tea".into()), ..Default::default() },
    )
    .await
    .unwrap();

  let fetched = f.journal.get_record(record.id).await.unwrap().unwrap();
  let texts: Vec<_> =
    fetched.keywords.iter().map(|k| k.text.as_str()).collect();
  // "coffee" no longer occurs in the text but its association stays.
  assert_eq!(texts, ["coffee", "tea"]);
}

// ─── Reindex ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_keyword_schedules_backfill_over_old_records() {
  let f = fixture().await;
  let record = f
    .journal
    .create_record("morning Coffee before work".into(), noon_utc())
    .await
    .unwrap();

  f.journal.register_keyword("coffee").await.unwrap();

  let queued = f.host.drain_once();
  assert_eq!(queued.len(), 1);
  assert_eq!(queued[0].0, "reindex:coffee");

  for (_, job) in queued {
    job.await;
  }

  let hits = f.journal.records_by_keyword("coffee").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].record.id, record.id);
}

#[tokio::test]
async fn reregistering_a_keyword_does_not_reindex() {
  let f = fixture().await;
  f.journal.register_keyword("coffee").await.unwrap();
  f.host.drain_once();

  f.journal.register_keyword("coffee").await.unwrap();
  assert!(f.host.drain_once().is_empty());
}

#[tokio::test]
async fn reactivating_a_soft_deleted_keyword_does_not_reindex() {
  let f = fixture().await;
  let keyword = f.journal.register_keyword("coffee").await.unwrap();
  f.host.drain_once();

  f.journal.soft_delete_keyword(keyword.id).await.unwrap();
  f.journal.register_keyword("coffee").await.unwrap();
  assert!(f.host.drain_once().is_empty());
}

#[tokio::test]
async fn backfill_skips_already_associated_records() {
  let f = fixture().await;
  f.journal.register_keyword("coffee").await.unwrap();
  f.host.drain_once();

  // Tagged at write time already.
  f.journal
    .create_record("coffee break".into(), noon_utc())
    .await
    .unwrap();

  // Running the pass again must not duplicate anything.
  reindex::run_backfill(f.journal.store(), "coffee").await;
  reindex::run_backfill(f.journal.store(), "coffee").await;

  let top = f.journal.top_keywords(5).await.unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].count, 1);
}

// ─── Reminder ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reminder_fires_when_nothing_recorded_today() {
  let f = fixture().await;
  let clock = FixedClock {
    now:    noon_utc(),
    offset: FixedOffset::east_opt(0).unwrap(),
  };

  reminder::run_reminder_check(
    f.journal.store(),
    f.notifier.as_ref(),
    &clock,
  )
  .await;

  let sent = f.notifier.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0, reminder::REMINDER_TITLE);
}

#[tokio::test]
async fn reminder_stays_quiet_when_today_has_a_record() {
  let f = fixture().await;
  f.journal
    .create_record("already wrote".into(), noon_utc())
    .await
    .unwrap();

  let clock = FixedClock {
    now:    noon_utc(),
    offset: FixedOffset::east_opt(0).unwrap(),
  };
  reminder::run_reminder_check(
    f.journal.store(),
    f.notifier.as_ref(),
    &clock,
  )
  .await;

  assert!(f.notifier.sent().is_empty());
}

#[tokio::test]
async fn reminder_ignores_records_from_other_days() {
  let f = fixture().await;
  let yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 12, 0, 0).unwrap();
  f.journal
    .create_record("old entry".into(), yesterday)
    .await
    .unwrap();

  let clock = FixedClock {
    now:    noon_utc(),
    offset: FixedOffset::east_opt(0).unwrap(),
  };
  reminder::run_reminder_check(
    f.journal.store(),
    f.notifier.as_ref(),
    &clock,
  )
  .await;

  assert_eq!(f.notifier.sent().len(), 1);
}

#[tokio::test]
async fn arm_reminder_uses_the_stable_job_id() {
  let f = fixture().await;
  f.journal.arm_reminder();
  assert_eq!(f.host.recurring_ids(), [reminder::REMINDER_JOB_ID]);
}

// ─── TokioJobHost ────────────────────────────────────────────────────────────

fn counting_job(counter: &Arc<AtomicUsize>) -> JobFn {
  let counter = Arc::clone(counter);
  Box::new(move || {
    let counter = Arc::clone(&counter);
    Box::pin(async move {
      counter.fetch_add(1, Ordering::SeqCst);
    })
  })
}

#[tokio::test(start_paused = true)]
async fn recurring_arm_keeps_the_existing_schedule() {
  let host = TokioJobHost::new();
  let first = Arc::new(AtomicUsize::new(0));
  let second = Arc::new(AtomicUsize::new(0));
  let minute = std::time::Duration::from_secs(60);

  host.schedule_recurring(
    "reminder",
    minute,
    std::time::Duration::ZERO,
    counting_job(&first),
  );
  host.schedule_recurring(
    "reminder",
    minute,
    std::time::Duration::ZERO,
    counting_job(&second),
  );

  tokio::time::sleep(std::time::Duration::from_secs(150)).await;

  assert!(first.load(Ordering::SeqCst) >= 2);
  assert_eq!(second.load(Ordering::SeqCst), 0);
  host.shutdown();
}

#[tokio::test(start_paused = true)]
async fn one_shot_reschedule_replaces_the_pending_job() {
  let host = TokioJobHost::new();
  let first = Arc::new(AtomicUsize::new(0));
  let second = Arc::new(AtomicUsize::new(0));

  let a = Arc::clone(&first);
  host.schedule_once(
    "reindex:coffee",
    std::time::Duration::from_secs(60),
    Box::pin(async move {
      a.fetch_add(1, Ordering::SeqCst);
    }),
  );

  let b = Arc::clone(&second);
  host.schedule_once(
    "reindex:coffee",
    std::time::Duration::from_secs(1),
    Box::pin(async move {
      b.fetch_add(1, Ordering::SeqCst);
    }),
  );

  tokio::time::sleep(std::time::Duration::from_secs(120)).await;

  assert_eq!(first.load(Ordering::SeqCst), 0);
  assert_eq!(second.load(Ordering::SeqCst), 1);
  host.shutdown();
}

#[tokio::test(start_paused = true)]
async fn finished_one_shots_are_pruned_on_insert() {
  let host = TokioJobHost::new();

  // One registration per keyword over the process lifetime.
  for keyword in ["coffee", "rain", "gym", "tea", "walk"] {
    host.schedule_once(
      &format!("reindex:{keyword}"),
      std::time::Duration::ZERO,
      Box::pin(async {}),
    );
  }
  tokio::time::sleep(std::time::Duration::from_secs(1)).await;

  host.schedule_once(
    "reindex:late",
    std::time::Duration::from_secs(60),
    Box::pin(async {}),
  );

  // Only the still-pending job survives in the table.
  assert_eq!(host.job_count(), 1);
  host.shutdown();
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_jobs() {
  let host = TokioJobHost::new();
  let counter = Arc::new(AtomicUsize::new(0));

  let c = Arc::clone(&counter);
  host.schedule_once(
    "job",
    std::time::Duration::from_secs(60),
    Box::pin(async move {
      c.fetch_add(1, Ordering::SeqCst);
    }),
  );
  host.shutdown();

  tokio::time::sleep(std::time::Duration::from_secs(120)).await;
  assert_eq!(counter.load(Ordering::SeqCst), 0);
}

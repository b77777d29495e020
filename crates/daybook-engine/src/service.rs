//! [`Journal`] — the service surface consumed by front ends.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveTime, Utc};
use tracing::warn;

use daybook_core::{
  keyword::{Keyword, KeywordId},
  record::{KeywordCount, NewRecord, Record, RecordId, RecordPatch, RecordWithKeywords},
  schedule::{self, Clock, JobHost, Notifier},
  store::JournalStore,
  Error, Result,
};

use crate::{reindex, reminder};

/// One explicitly constructed journal instance, handed by reference to
/// whatever needs it — there is no process-wide store handle.
pub struct Journal<S> {
  store:         S,
  host:          Arc<dyn JobHost>,
  notifier:      Arc<dyn Notifier>,
  clock:         Arc<dyn Clock>,
  reminder_time: NaiveTime,
}

impl<S> Journal<S>
where
  S: JournalStore + Clone + 'static,
{
  pub fn new(
    store: S,
    host: Arc<dyn JobHost>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      store,
      host,
      notifier,
      clock,
      reminder_time: reminder::DEFAULT_REMINDER_TIME,
    }
  }

  /// Override the local wall-clock time the daily reminder targets.
  pub fn with_reminder_time(mut self, time: NaiveTime) -> Self {
    self.reminder_time = time;
    self
  }

  /// Direct access to the underlying store.
  pub fn store(&self) -> &S { &self.store }

  // ── Records ───────────────────────────────────────────────────────────────

  /// Create a record and tag it against the currently active keywords.
  pub async fn create_record(
    &self,
    text: String,
    occurred_at: DateTime<Utc>,
  ) -> Result<Record> {
    let record = self
      .store
      .create_record(NewRecord { text, occurred_at })
      .await
      .map_err(Into::into)?;

    self.apply_keywords(record.id, &record.text).await?;
    Ok(record)
  }

  /// Edit a record. When the text changes, newly matched keywords are
  /// associated — existing associations are never removed, even if the new
  /// text no longer contains their keyword. Associations are additive; a
  /// cleanup on edit is an explicit product decision that has not been made.
  pub async fn update_record(
    &self,
    id: RecordId,
    patch: RecordPatch,
  ) -> Result<()> {
    let retag_text = patch.text.clone();
    self.store.update_record(id, patch).await.map_err(Into::into)?;

    if let Some(text) = retag_text {
      self.apply_keywords(id, &text).await?;
    }
    Ok(())
  }

  pub async fn delete_record(&self, id: RecordId) -> Result<()> {
    self.store.delete_record(id).await.map_err(Into::into)
  }

  pub async fn get_record(
    &self,
    id: RecordId,
  ) -> Result<Option<RecordWithKeywords>> {
    self.store.get_record(id).await.map_err(Into::into)
  }

  /// Match `text` against the active keywords and insert an association per
  /// hit. Individual insert failures are logged and skipped — associations
  /// are idempotent and re-derivable from the stored text by a later
  /// reindex pass.
  async fn apply_keywords(&self, record_id: RecordId, text: &str) -> Result<()> {
    let active = self.store.list_active_keywords().await.map_err(Into::into)?;

    for keyword in daybook_core::tagging::match_keywords(text, &active) {
      if let Err(e) = self.store.add_association(record_id, &keyword.text).await
      {
        let e: Error = e.into();
        warn!(record_id, keyword = %keyword.text, error = %e,
          "failed to add association; a later reindex can recover");
      }
    }
    Ok(())
  }

  // ── Keywords ──────────────────────────────────────────────────────────────

  /// Register a keyword. A brand-new keyword triggers the retroactive
  /// reindex job over the whole record history; re-registration of an
  /// existing or soft-deleted text does not.
  pub async fn register_keyword(&self, text: &str) -> Result<Keyword> {
    let registered =
      self.store.register_keyword(text).await.map_err(Into::into)?;

    if registered.newly_created {
      self.on_keyword_registered(&registered.keyword.text);
    }
    Ok(registered.keyword)
  }

  /// Schedule the one-shot backfill that retroactively applies
  /// `keyword_text` to existing records. The caller is not blocked on the
  /// pass; it runs on the job host with at-least-once semantics.
  pub fn on_keyword_registered(&self, keyword_text: &str) {
    let store = self.store.clone();
    let text = keyword_text.to_owned();
    let job_id = format!("reindex:{keyword_text}");

    self.host.schedule_once(
      &job_id,
      Duration::ZERO,
      Box::pin(async move {
        reindex::run_backfill(&store, &text).await;
      }),
    );
  }

  pub async fn soft_delete_keyword(&self, id: KeywordId) -> Result<()> {
    self.store.soft_delete_keyword(id).await.map_err(Into::into)
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  pub async fn records_in_range(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<RecordWithKeywords>> {
    self.store.records_in_range(start, end).await.map_err(Into::into)
  }

  pub async fn records_by_keyword(
    &self,
    keyword_text: &str,
  ) -> Result<Vec<RecordWithKeywords>> {
    self.store.records_by_keyword(keyword_text).await.map_err(Into::into)
  }

  pub async fn list_records(&self) -> Result<Vec<RecordWithKeywords>> {
    self.store.list_records().await.map_err(Into::into)
  }

  pub async fn top_keywords(&self, n: u32) -> Result<Vec<KeywordCount>> {
    self.store.top_keywords(n).await.map_err(Into::into)
  }

  pub async fn list_active_keywords(&self) -> Result<Vec<Keyword>> {
    self.store.list_active_keywords().await.map_err(Into::into)
  }

  // ── Reminder ──────────────────────────────────────────────────────────────

  /// Idle → Armed. Registers the recurring daily reminder under its stable
  /// job id, with the initial delay pointing at the next occurrence of the
  /// target local time. The host keeps an existing schedule for the same
  /// id, so calling this at every startup is safe.
  pub fn arm_reminder(&self) {
    let initial_delay =
      schedule::delay_until(self.clock.as_ref(), self.reminder_time);

    let store = self.store.clone();
    let notifier = Arc::clone(&self.notifier);
    let clock = Arc::clone(&self.clock);

    self.host.schedule_recurring(
      reminder::REMINDER_JOB_ID,
      reminder::REMINDER_INTERVAL,
      initial_delay,
      Box::new(move || {
        let store = store.clone();
        let notifier = Arc::clone(&notifier);
        let clock = Arc::clone(&clock);
        Box::pin(async move {
          reminder::run_reminder_check(
            &store,
            notifier.as_ref(),
            clock.as_ref(),
          )
          .await;
        })
      }),
    );
  }

  /// Cancel all background jobs. Safe mid-pass: every job write is
  /// independently idempotent.
  pub fn shutdown(&self) { self.host.shutdown(); }
}

//! The `JournalStore` trait.
//!
//! Implemented by storage backends (e.g. `daybook-store-sqlite`). Higher
//! layers (`daybook-engine`, `daybook-api`) depend on this abstraction, not
//! on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes. Backend errors must convert into the core
//! [`Error`](crate::Error) taxonomy so callers can classify them without
//! knowing the backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  keyword::{Keyword, KeywordId, RegisteredKeyword},
  record::{KeywordCount, NewRecord, Record, RecordId, RecordPatch, RecordWithKeywords},
};

pub trait JournalStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Records ───────────────────────────────────────────────────────────

  /// Persist a new record. The id and `created_at` are store-assigned.
  /// Blank text is a validation error.
  fn create_record(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Apply a partial update. Fails with not-found if the id is absent.
  fn update_record(
    &self,
    id: RecordId,
    patch: RecordPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a record and all of its associations. Fails with not-found if
  /// the id is absent.
  fn delete_record(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch one record with its keywords. `None` if absent.
  fn get_record(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<RecordWithKeywords>, Self::Error>> + Send + '_;

  // ── Keywords ──────────────────────────────────────────────────────────

  /// Idempotent keyword registration: an active keyword with this text is
  /// returned unchanged, a soft-deleted one is un-deleted in place (same
  /// id), otherwise a new row is created.
  fn register_keyword(
    &self,
    text: &str,
  ) -> impl Future<Output = Result<RegisteredKeyword, Self::Error>> + Send;

  /// Hide a keyword from listings without destroying its associations.
  fn soft_delete_keyword(
    &self,
    id: KeywordId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Associations ──────────────────────────────────────────────────────

  /// Insert-or-ignore on the `(record_id, keyword_text)` composite key.
  ///
  /// The record must exist and the text must belong to a known keyword —
  /// soft-deleted keywords are acceptable, since historical text
  /// associations are allowed.
  fn add_association(
    &self,
    record_id: RecordId,
    keyword_text: &str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  // ── Queries ───────────────────────────────────────────────────────────

  /// All records joined with their keywords, newest-created first. Feeds
  /// the reindex backfill, which intentionally walks the entire history.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<RecordWithKeywords>, Self::Error>> + Send + '_;

  /// Records with `occurred_at` in the half-open window `[start, end)`,
  /// ordered by `occurred_at` descending.
  fn records_in_range(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<RecordWithKeywords>, Self::Error>> + Send + '_;

  /// Records associated with `keyword_text`, ordered by `occurred_at`
  /// descending.
  fn records_by_keyword(
    &self,
    keyword_text: &str,
  ) -> impl Future<Output = Result<Vec<RecordWithKeywords>, Self::Error>> + Send;

  /// Top-N keyword frequencies across all time, soft-deleted keywords'
  /// historical rows included. Ordered by count descending, ties broken by
  /// keyword text ascending.
  fn top_keywords(
    &self,
    n: u32,
  ) -> impl Future<Output = Result<Vec<KeywordCount>, Self::Error>> + Send + '_;

  /// Non-deleted keywords, text ascending.
  fn list_active_keywords(
    &self,
  ) -> impl Future<Output = Result<Vec<Keyword>, Self::Error>> + Send + '_;
}

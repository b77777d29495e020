//! Retroactive keyword backfill.
//!
//! When a keyword is newly registered, this pass walks the *entire* record
//! history — a newly remembered keyword should surface old matches too —
//! and associates every record whose text already contains it. At-least-once
//! and fire-and-forget: association inserts are idempotent, and a dropped
//! pass is recovered by a future registration or a manual
//! [`Journal::on_keyword_registered`](crate::Journal::on_keyword_registered).

use tracing::{info, warn};

use daybook_core::{store::JournalStore, tagging};

/// Apply `keyword_text` to all existing records that contain it.
///
/// Individual record failures are logged and skipped; they never abort the
/// pass. A failure to load the history drops the pass entirely.
pub async fn run_backfill<S: JournalStore>(store: &S, keyword_text: &str) {
  let records = match store.list_records().await {
    Ok(records) => records,
    Err(e) => {
      warn!(keyword = keyword_text, error = %e,
        "reindex: loading record history failed; dropping pass");
      return;
    }
  };

  let mut applied = 0usize;
  for entry in records {
    let already_tagged = entry
      .keywords
      .iter()
      .any(|k| tagging::same_keyword(&k.text, keyword_text));
    if already_tagged || !tagging::text_contains(&entry.record.text, keyword_text)
    {
      continue;
    }

    match store.add_association(entry.record.id, keyword_text).await {
      Ok(()) => applied += 1,
      Err(e) => warn!(record_id = entry.record.id, error = %e,
        "reindex: association insert failed; skipping record"),
    }
  }

  info!(keyword = keyword_text, applied, "reindex pass complete");
}

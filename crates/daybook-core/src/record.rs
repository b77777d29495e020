//! Record — a dated, free-text journal entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keyword::Keyword;

/// Monotonically assigned store identifier (sqlite rowid).
pub type RecordId = i64;

/// A journal entry. `occurred_at` is the calendar date/time the entry
/// logically belongs to and is user-chosen; `created_at` is the wall-clock
/// creation time and is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
  pub id:          RecordId,
  pub text:        String,
  pub occurred_at: DateTime<Utc>,
  pub created_at:  DateTime<Utc>,
}

/// Input for creating a record. The id and `created_at` are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
  pub text:        String,
  pub occurred_at: DateTime<Utc>,
}

/// Partial update for an existing record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
  pub text:        Option<String>,
  pub occurred_at: Option<DateTime<Utc>>,
}

/// A record joined with its resolved keyword set. Soft-deleted keywords stay
/// visible here — historical associations outlive keyword deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWithKeywords {
  pub record:   Record,
  pub keywords: Vec<Keyword>,
}

/// One row of the top-N keyword frequency aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
  pub keyword: String,
  pub count:   u64,
}

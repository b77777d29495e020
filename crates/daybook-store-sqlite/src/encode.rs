//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings, which keeps lexicographic
//! column order equal to chronological order — the range queries rely on
//! that.

use chrono::{DateTime, Utc};
use daybook_core::{keyword::Keyword, record::Record};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:   i64,
  pub text:        String,
  pub occurred_at: String,
  pub created_at:  String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      id:          self.record_id,
      text:        self.text,
      occurred_at: decode_dt(&self.occurred_at)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `keywords` row.
pub struct RawKeyword {
  pub keyword_id: i64,
  pub text:       String,
  pub is_deleted: bool,
}

impl RawKeyword {
  pub fn into_keyword(self) -> Keyword {
    Keyword {
      id:         self.keyword_id,
      text:       self.text,
      is_deleted: self.is_deleted,
    }
  }
}

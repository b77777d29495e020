//! Error taxonomy for the Daybook core.
//!
//! Storage backends keep their own richer error enums and convert into this
//! taxonomy at the [`JournalStore`](crate::store::JournalStore) boundary, so
//! callers above the store see exactly these categories.

use thiserror::Error;

use crate::record::RecordId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("record not found: {0}")]
  RecordNotFound(RecordId),

  #[error("keyword not found: {0}")]
  KeywordNotFound(i64),

  #[error("unknown keyword text: {0:?}")]
  UnknownKeywordText(String),

  #[error("record text must not be blank")]
  EmptyRecordText,

  #[error("keyword text must not be blank")]
  EmptyKeywordText,

  #[error("store error: {0}")]
  Store(String),

  /// Schema upgrade failed. Fatal — the store refuses to open rather than
  /// run against an inconsistent schema.
  #[error("migration failed: {0}")]
  Migration(String),

  #[error("notification failed: {0}")]
  Notification(String),
}

impl Error {
  /// True for the not-found family (unknown record or keyword reference).
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::RecordNotFound(_)
        | Self::KeywordNotFound(_)
        | Self::UnknownKeywordText(_)
    )
  }

  /// True for validation failures on caller-supplied input.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::EmptyRecordText | Self::EmptyKeywordText)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Keyword — a reusable tag string.
//!
//! Keyword text is the stable matching handle: associations join on it, so
//! it is unique (case-sensitive identity) and never rewritten. Removal is a
//! soft-delete; historical associations are retained for statistics.

use serde::{Deserialize, Serialize};

pub type KeywordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
  pub id:         KeywordId,
  pub text:       String,
  pub is_deleted: bool,
}

/// Outcome of [`register_keyword`](crate::store::JournalStore::register_keyword).
///
/// `newly_created` is `true` only when a brand-new row was inserted — not
/// when an active keyword was returned unchanged or a soft-deleted one was
/// re-activated. It decides whether the retroactive reindex job runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredKeyword {
  pub keyword:       Keyword,
  pub newly_created: bool,
}

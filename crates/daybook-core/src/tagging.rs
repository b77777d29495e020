//! The tagging engine: pure matching logic deciding which keywords apply to
//! a piece of text.
//!
//! Used at write-time (record create/edit) and at backfill-time (reindex
//! after a new keyword is registered). No I/O; deterministic for a given
//! input. Result order is irrelevant — matches are inserted as a set.

use crate::keyword::Keyword;

/// Case-insensitive substring containment of `keyword` within `text`.
pub fn text_contains(text: &str, keyword: &str) -> bool {
  if keyword.is_empty() {
    return false;
  }
  text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Case-insensitive equality on keyword text.
pub fn same_keyword(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}

/// Return the subset of `keywords` whose text occurs in `text`.
pub fn match_keywords<'a>(
  text: &str,
  keywords: &'a [Keyword],
) -> Vec<&'a Keyword> {
  keywords
    .iter()
    .filter(|k| text_contains(text, &k.text))
    .collect()
}

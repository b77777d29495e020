//! Error type for `daybook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] daybook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Schema upgrade failed. Raised during `open`, which refuses to hand out
  /// a store over a half-migrated schema.
  #[error("migration to version {version} failed: {message}")]
  Migration { version: i64, message: String },
}

/// Collapse backend detail into the core taxonomy at the trait boundary.
impl From<Error> for daybook_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(inner) => daybook_core::Error::Store(inner.to_string()),
      Error::DateParse(msg) => daybook_core::Error::Store(msg),
      Error::Migration { version, message } => daybook_core::Error::Migration(
        format!("version {version}: {message}"),
      ),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Error::Database(tokio_rusqlite::Error::Rusqlite(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

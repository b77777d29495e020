//! Versioned SQL migrations for the Daybook SQLite store.
//!
//! Gated on `PRAGMA user_version`: each migration runs at most once, in
//! version order, inside its own transaction. The statements themselves are
//! written to be harmless on reapplication (`IF NOT EXISTS`,
//! `INSERT OR IGNORE`), so a replayed migration cannot duplicate data.

/// Executed at every open, before migrations.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

pub struct Migration {
  pub version: i64,
  pub sql:     &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
  Migration { version: 1, sql: V1_INITIAL },
  Migration { version: 2, sql: V2_ASSOCIATIONS },
];

/// Original layout: tag data lived in a single nullable `keyword` column on
/// the record row.
const V1_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS records (
    record_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    text        TEXT NOT NULL,
    occurred_at TEXT NOT NULL,   -- RFC 3339 UTC; user-chosen calendar time
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    keyword     TEXT             -- legacy single-keyword column, see v2
);

CREATE TABLE IF NOT EXISTS keywords (
    keyword_id INTEGER PRIMARY KEY AUTOINCREMENT,
    text       TEXT NOT NULL UNIQUE,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS records_occurred_idx ON records(occurred_at);
CREATE INDEX IF NOT EXISTS records_created_idx  ON records(created_at);
";

/// Move tag data into discrete association rows, one per non-empty legacy
/// value. The legacy column is kept so a rollback to v1 loses nothing.
const V2_ASSOCIATIONS: &str = "
CREATE TABLE IF NOT EXISTS associations (
    record_id    INTEGER NOT NULL REFERENCES records(record_id),
    keyword_text TEXT    NOT NULL,
    PRIMARY KEY (record_id, keyword_text)
);

INSERT OR IGNORE INTO associations (record_id, keyword_text)
    SELECT record_id, keyword FROM records
    WHERE keyword IS NOT NULL AND keyword != '';

CREATE INDEX IF NOT EXISTS associations_keyword_idx
    ON associations(keyword_text);
";

//! [`SqliteStore`] — the SQLite implementation of [`JournalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use daybook_core::{
  keyword::{Keyword, KeywordId, RegisteredKeyword},
  record::{
    KeywordCount, NewRecord, Record, RecordId, RecordPatch, RecordWithKeywords,
  },
  store::JournalStore,
};

use crate::{
  encode::{encode_dt, RawKeyword, RawRecord},
  schema::{MIGRATIONS, PRAGMAS},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Daybook journal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// statements run serially on its dedicated thread, so concurrent use from
/// user actions and background jobs is safe.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring the schema up to date.
  ///
  /// A failed migration aborts the open — the store never hands out a
  /// connection over a half-migrated schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;

    for migration in MIGRATIONS {
      let version = migration.version;
      let sql = migration.sql;
      self
        .conn
        .call(move |conn| {
          let current: i64 =
            conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
          if current >= version {
            return Ok(());
          }

          let tx = conn.transaction()?;
          tx.execute_batch(sql)?;
          tx.pragma_update(None, "user_version", version)?;
          tx.commit()?;
          Ok(())
        })
        .await
        .map_err(|e| Error::Migration { version, message: e.to_string() })?;
    }

    Ok(())
  }

  /// Current `PRAGMA user_version`, exposed for migration tests.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn read_keywords_for(
  conn: &rusqlite::Connection,
  record_id: RecordId,
) -> rusqlite::Result<Vec<RawKeyword>> {
  let mut stmt = conn.prepare(
    "SELECT k.keyword_id, k.text, k.is_deleted
     FROM associations a
     JOIN keywords k ON k.text = a.keyword_text
     WHERE a.record_id = ?1
     ORDER BY k.text ASC",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![record_id], |row| {
      Ok(RawKeyword {
        keyword_id: row.get(0)?,
        text:       row.get(1)?,
        is_deleted: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Run a record query and attach each row's keyword set, all on the same
/// connection so the join sees a consistent view.
fn read_records_with_keywords(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<(RawRecord, Vec<RawKeyword>)>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(params, |row| {
      Ok(RawRecord {
        record_id:   row.get(0)?,
        text:        row.get(1)?,
        occurred_at: row.get(2)?,
        created_at:  row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  drop(stmt);

  let mut out = Vec::with_capacity(raws.len());
  for raw in raws {
    let keywords = read_keywords_for(conn, raw.record_id)?;
    out.push((raw, keywords));
  }
  Ok(out)
}

fn decode_rows(
  rows: Vec<(RawRecord, Vec<RawKeyword>)>,
) -> Result<Vec<RecordWithKeywords>> {
  rows
    .into_iter()
    .map(|(raw, keywords)| {
      Ok(RecordWithKeywords {
        record:   raw.into_record()?,
        keywords: keywords.into_iter().map(RawKeyword::into_keyword).collect(),
      })
    })
    .collect()
}

const RECORD_COLUMNS: &str = "record_id, text, occurred_at, created_at";

// ─── JournalStore impl ───────────────────────────────────────────────────────

impl JournalStore for SqliteStore {
  type Error = Error;

  // ── Records ───────────────────────────────────────────────────────────────

  async fn create_record(&self, input: NewRecord) -> Result<Record> {
    if input.text.trim().is_empty() {
      return Err(daybook_core::Error::EmptyRecordText.into());
    }

    let created_at = Utc::now();
    let text = input.text.clone();
    let occurred_str = encode_dt(input.occurred_at);
    let created_str = encode_dt(created_at);

    let id: RecordId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (text, occurred_at, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![text, occurred_str, created_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Record {
      id,
      text: input.text,
      occurred_at: input.occurred_at,
      created_at,
    })
  }

  async fn update_record(&self, id: RecordId, patch: RecordPatch) -> Result<()> {
    if let Some(text) = &patch.text
      && text.trim().is_empty()
    {
      return Err(daybook_core::Error::EmptyRecordText.into());
    }

    let text = patch.text;
    let occurred_str = patch.occurred_at.map(encode_dt);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records
           SET text        = COALESCE(?2, text),
               occurred_at = COALESCE(?3, occurred_at)
           WHERE record_id = ?1",
          rusqlite::params![id, text, occurred_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(daybook_core::Error::RecordNotFound(id).into());
    }
    Ok(())
  }

  async fn delete_record(&self, id: RecordId) -> Result<()> {
    let deleted: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM associations WHERE record_id = ?1",
          rusqlite::params![id],
        )?;
        let deleted = tx.execute(
          "DELETE FROM records WHERE record_id = ?1",
          rusqlite::params![id],
        )?;
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    if deleted == 0 {
      return Err(daybook_core::Error::RecordNotFound(id).into());
    }
    Ok(())
  }

  async fn get_record(&self, id: RecordId) -> Result<Option<RecordWithKeywords>> {
    let rows = self
      .conn
      .call(move |conn| {
        Ok(read_records_with_keywords(
          conn,
          &format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1"),
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(decode_rows(rows)?.into_iter().next())
  }

  // ── Keywords ──────────────────────────────────────────────────────────────

  async fn register_keyword(&self, text: &str) -> Result<RegisteredKeyword> {
    if text.trim().is_empty() {
      return Err(daybook_core::Error::EmptyKeywordText.into());
    }

    let text_owned = text.to_owned();
    let (id, newly_created): (KeywordId, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<(KeywordId, bool)> = tx
          .query_row(
            "SELECT keyword_id, is_deleted FROM keywords WHERE text = ?1",
            rusqlite::params![text_owned],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        let result = match existing {
          // Active keyword: returned unchanged.
          Some((id, false)) => (id, false),
          // Soft-deleted keyword: un-delete in place, keeping the id.
          Some((id, true)) => {
            tx.execute(
              "UPDATE keywords SET is_deleted = 0 WHERE keyword_id = ?1",
              rusqlite::params![id],
            )?;
            (id, false)
          }
          None => {
            tx.execute(
              "INSERT INTO keywords (text) VALUES (?1)",
              rusqlite::params![text_owned],
            )?;
            (tx.last_insert_rowid(), true)
          }
        };

        tx.commit()?;
        Ok(result)
      })
      .await?;

    Ok(RegisteredKeyword {
      keyword: Keyword { id, text: text.to_owned(), is_deleted: false },
      newly_created,
    })
  }

  async fn soft_delete_keyword(&self, id: KeywordId) -> Result<()> {
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE keywords SET is_deleted = 1 WHERE keyword_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(daybook_core::Error::KeywordNotFound(id).into());
    }
    Ok(())
  }

  // ── Associations ──────────────────────────────────────────────────────────

  async fn add_association(
    &self,
    record_id: RecordId,
    keyword_text: &str,
  ) -> Result<()> {
    let text = keyword_text.to_owned();

    let (record_exists, keyword_exists): (bool, bool) = self
      .conn
      .call(move |conn| {
        let record_exists: bool = conn
          .query_row(
            "SELECT 1 FROM records WHERE record_id = ?1",
            rusqlite::params![record_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        // Soft-deleted keywords still qualify: historical text
        // associations are allowed.
        let keyword_exists: bool = conn
          .query_row(
            "SELECT 1 FROM keywords WHERE text = ?1",
            rusqlite::params![text],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if record_exists && keyword_exists {
          conn.execute(
            "INSERT OR IGNORE INTO associations (record_id, keyword_text)
             VALUES (?1, ?2)",
            rusqlite::params![record_id, text],
          )?;
        }

        Ok((record_exists, keyword_exists))
      })
      .await?;

    if !record_exists {
      return Err(daybook_core::Error::RecordNotFound(record_id).into());
    }
    if !keyword_exists {
      return Err(
        daybook_core::Error::UnknownKeywordText(keyword_text.to_owned()).into(),
      );
    }
    Ok(())
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn list_records(&self) -> Result<Vec<RecordWithKeywords>> {
    let rows = self
      .conn
      .call(|conn| {
        Ok(read_records_with_keywords(
          conn,
          &format!(
            "SELECT {RECORD_COLUMNS} FROM records ORDER BY created_at DESC"
          ),
          rusqlite::params![],
        )?)
      })
      .await?;
    decode_rows(rows)
  }

  async fn records_in_range(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<RecordWithKeywords>> {
    let start_str = encode_dt(start);
    let end_str = encode_dt(end);

    let rows = self
      .conn
      .call(move |conn| {
        Ok(read_records_with_keywords(
          conn,
          &format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE occurred_at >= ?1 AND occurred_at < ?2
             ORDER BY occurred_at DESC"
          ),
          rusqlite::params![start_str, end_str],
        )?)
      })
      .await?;
    decode_rows(rows)
  }

  async fn records_by_keyword(
    &self,
    keyword_text: &str,
  ) -> Result<Vec<RecordWithKeywords>> {
    let text = keyword_text.to_owned();

    let rows = self
      .conn
      .call(move |conn| {
        Ok(read_records_with_keywords(
          conn,
          &format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE record_id IN
               (SELECT record_id FROM associations WHERE keyword_text = ?1)
             ORDER BY occurred_at DESC"
          ),
          rusqlite::params![text],
        )?)
      })
      .await?;
    decode_rows(rows)
  }

  async fn top_keywords(&self, n: u32) -> Result<Vec<KeywordCount>> {
    let limit = i64::from(n);

    let counts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT keyword_text, COUNT(*) AS cnt
           FROM associations
           GROUP BY keyword_text
           ORDER BY cnt DESC, keyword_text ASC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(KeywordCount {
              keyword: row.get(0)?,
              count:   row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(counts)
  }

  async fn list_active_keywords(&self) -> Result<Vec<Keyword>> {
    let keywords = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT keyword_id, text, is_deleted
           FROM keywords
           WHERE is_deleted = 0
           ORDER BY text ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawKeyword {
              keyword_id: row.get(0)?,
              text:       row.get(1)?,
              is_deleted: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(keywords.into_iter().map(RawKeyword::into_keyword).collect())
  }
}

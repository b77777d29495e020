//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | `?start`+`?end` range, or `?keyword`, or everything |
//! | `GET`    | `/records/{id}` | Single record with its keywords |
//! | `POST`   | `/records` | Body: [`NewRecordBody`]; returns 201 + stored record |
//! | `PATCH`  | `/records/{id}` | Body: [`RecordPatch`]; partial update |
//! | `DELETE` | `/records/{id}` | Removes the record and its associations |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use daybook_core::{
  record::{RecordId, RecordPatch, RecordWithKeywords},
  store::JournalStore,
};
use daybook_engine::Journal;
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Inclusive lower bound on `occurred_at`. Requires `end`.
  pub start:   Option<DateTime<Utc>>,
  /// Exclusive upper bound on `occurred_at`. Requires `start`.
  pub end:     Option<DateTime<Utc>>,
  /// Restrict to records associated with this keyword text.
  pub keyword: Option<String>,
}

/// `GET /records[?start=...&end=...][?keyword=...]`
pub async fn list<S>(
  State(journal): State<Arc<Journal<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RecordWithKeywords>>, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  let records = match (params.keyword, params.start, params.end) {
    (Some(keyword), None, None) => journal.records_by_keyword(&keyword).await?,
    (None, Some(start), Some(end)) => {
      journal.records_in_range(start, end).await?
    }
    (None, None, None) => journal.list_records().await?,
    _ => {
      return Err(ApiError::BadRequest(
        "use either keyword, or start and end together".into(),
      ));
    }
  };
  Ok(Json(records))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/{id}`
pub async fn get_one<S>(
  State(journal): State<Arc<Journal<S>>>,
  Path(id): Path<RecordId>,
) -> Result<Json<RecordWithKeywords>, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  let record = journal
    .get_record(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(record))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /records`.
#[derive(Debug, Deserialize)]
pub struct NewRecordBody {
  pub text:        String,
  pub occurred_at: DateTime<Utc>,
}

/// `POST /records` — returns 201 + the stored
/// [`Record`](daybook_core::record::Record), already tagged against the
/// active keywords.
pub async fn create<S>(
  State(journal): State<Arc<Journal<S>>>,
  Json(body): Json<NewRecordBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  let record = journal.create_record(body.text, body.occurred_at).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /records/{id}` — body is a partial [`RecordPatch`]. Tagging is
/// additive: keywords matched by the new text are associated, stale ones
/// are left in place.
pub async fn update_one<S>(
  State(journal): State<Arc<Journal<S>>>,
  Path(id): Path<RecordId>,
  Json(patch): Json<RecordPatch>,
) -> Result<StatusCode, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  journal.update_record(id, patch).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /records/{id}`
pub async fn delete_one<S>(
  State(journal): State<Arc<Journal<S>>>,
  Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  journal.delete_record(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

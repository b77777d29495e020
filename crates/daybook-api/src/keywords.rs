//! Handlers for `/keywords` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/keywords` | Active keywords, text ascending |
//! | `POST`   | `/keywords` | Body: `{"text":"..."}`; idempotent registration |
//! | `GET`    | `/keywords/top` | `?n=` top keyword frequencies, default 5 |
//! | `DELETE` | `/keywords/{id}` | Soft-delete; associations are retained |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use daybook_core::{
  keyword::{Keyword, KeywordId},
  record::KeywordCount,
  store::JournalStore,
};
use daybook_engine::Journal;
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /keywords`
pub async fn list<S>(
  State(journal): State<Arc<Journal<S>>>,
) -> Result<Json<Vec<Keyword>>, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  Ok(Json(journal.list_active_keywords().await?))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub text: String,
}

/// `POST /keywords` — idempotent: re-posting an existing text returns the
/// same keyword. A brand-new keyword kicks off the retroactive reindex job
/// in the background; this call does not wait for it.
pub async fn create<S>(
  State(journal): State<Arc<Journal<S>>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  let keyword = journal.register_keyword(&body.text).await?;
  Ok((StatusCode::CREATED, Json(keyword)))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
  pub n: Option<u32>,
}

/// `GET /keywords/top?n=5`
pub async fn top<S>(
  State(journal): State<Arc<Journal<S>>>,
  Query(params): Query<TopParams>,
) -> Result<Json<Vec<KeywordCount>>, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  Ok(Json(journal.top_keywords(params.n.unwrap_or(5)).await?))
}

/// `DELETE /keywords/{id}`
pub async fn delete_one<S>(
  State(journal): State<Arc<Journal<S>>>,
  Path(id): Path<KeywordId>,
) -> Result<StatusCode, ApiError>
where
  S: JournalStore + Clone + 'static,
{
  journal.soft_delete_keyword(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

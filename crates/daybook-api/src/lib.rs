//! JSON REST API for Daybook.
//!
//! Exposes an axum [`Router`] backed by a [`Journal`] over any
//! [`daybook_core::store::JournalStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", daybook_api::api_router(journal.clone()))
//! ```

pub mod error;
pub mod keywords;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use daybook_core::store::JournalStore;
use daybook_engine::Journal;

pub use error::ApiError;

/// Build a fully-materialised API router for `journal`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(journal: Arc<Journal<S>>) -> Router<()>
where
  S: JournalStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route(
      "/records/{id}",
      get(records::get_one::<S>)
        .patch(records::update_one::<S>)
        .delete(records::delete_one::<S>),
    )
    // Keywords
    .route("/keywords", get(keywords::list::<S>).post(keywords::create::<S>))
    .route("/keywords/top", get(keywords::top::<S>))
    .route("/keywords/{id}", delete(keywords::delete_one::<S>))
    .with_state(journal)
}

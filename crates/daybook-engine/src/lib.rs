//! The UI-agnostic service layer for Daybook.
//!
//! [`Journal`] composes a [`JournalStore`](daybook_core::store::JournalStore)
//! with the platform contracts (job host, notifier, clock) and owns the
//! behavior that spans them: write-time keyword tagging, the retroactive
//! reindex job, and the daily reminder. Any front end — HTTP, CLI, tests —
//! drives the same `Journal` surface.

pub mod host;
pub mod reindex;
pub mod reminder;
pub mod service;

pub use host::{LogNotifier, SystemClock, TokioJobHost};
pub use service::Journal;

#[cfg(test)]
mod tests;

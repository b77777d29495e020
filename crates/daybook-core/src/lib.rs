//! Core types and trait definitions for the Daybook journaling store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than
//! `chrono` and `serde`.

pub mod error;
pub mod keyword;
pub mod record;
pub mod schedule;
pub mod store;
pub mod tagging;

pub use error::{Error, Result};

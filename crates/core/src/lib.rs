//! Core types and shared functionality for listenup.
//!
//! This crate provides:
//! - The aggregated book record and its merge key
//! - Search cache and favorites with SQLite backend
//! - Retry/backoff/timeout policy
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod record;
pub mod resilience;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError, GutenbergSettings};
pub use error::Error;
pub use record::{AggregatedRecord, ReaderTarget, SourceKind, TextUrls, UNTITLED, normalized_key, rank};
pub use resilience::{RetryError, RetryPolicy};

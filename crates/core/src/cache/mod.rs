//! SQLite-backed cache for search results and favorites.
//!
//! This module provides a persistent local store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Search results keyed by raw query string with age-based invalidation
//! - Favorites keyed by normalized `title|author`
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod favorites;
pub mod migrations;
pub mod search;

pub use crate::Error;

pub use connection::CacheDb;

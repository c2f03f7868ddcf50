//! Catalog clients for listenup.
//!
//! This crate provides one client per public-domain catalog (text, audio,
//! bibliographic) behind the [`SourceClient`] trait, and the [`Aggregator`]
//! that fans a query out to all of them and merges the answers.

pub mod aggregate;
pub mod error;
pub mod gutenberg;
mod http;
pub mod librivox;
pub mod openlibrary;
pub mod source;

#[cfg(test)]
mod test_support;

pub use aggregate::{AggregateError, Aggregator, merge};
pub use error::SourceError;
pub use gutenberg::{GutenbergClient, GutenbergConfig};
pub use librivox::{LibriVoxClient, LibriVoxConfig};
pub use openlibrary::{OpenLibraryClient, OpenLibraryConfig};
pub use source::{SourceClient, SourceRecord};
